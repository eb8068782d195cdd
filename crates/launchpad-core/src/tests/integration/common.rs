#![cfg(test)]

use std::any::Any;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use zip::write::SimpleFileOptions;

use crate::plugin_system::environment::Environment;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::MANIFEST_PATH;
use crate::plugin_system::registry::LoaderCatalog;
use crate::plugin_system::resource::{PluginResource, ResourceKind};
use crate::plugin_system::traits::{LanguageLoader, PluginCandidate, PluginContainer};

/// Shared call journal, one entry per loader callback: `"<loader>:<call>"`.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn write_jar(root: &Path, name: &str, manifest: &str) -> PathBuf {
    let path = root.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();
    writer.add_directory("META-INF/", options).unwrap();
    writer.start_file(MANIFEST_PATH, options).unwrap();
    writer.write_all(manifest.as_bytes()).unwrap();
    writer.start_file("com/example/Main.class", options).unwrap();
    writer.write_all(&[0xca, 0xfe, 0xba, 0xbe]).unwrap();
    writer.finish().unwrap();
    path
}

pub fn write_plain_dir(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.txt"), "no descriptor here").unwrap();
    dir
}

#[derive(Debug)]
pub struct JournalContainer {
    pub id: String,
    pub source: PathBuf,
}

impl PluginContainer for JournalContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Loader that records every callback. With `directory_fallback` it also
/// claims any directory resource, the way convention-based loaders do.
pub struct JournalLoader {
    pub name: String,
    pub directory_fallback: bool,
    pub journal: Journal,
}

impl JournalLoader {
    fn record(&self, call: &str) {
        self.journal.lock().unwrap().push(format!("{}:{}", self.name, call));
    }
}

impl LanguageLoader for JournalLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, _environment: &Environment) -> Result<(), PluginSystemError> {
        self.record("initialize");
        Ok(())
    }

    fn claim_resources(&self, _environment: &Environment, resources: &[PluginResource]) -> Vec<PluginCandidate> {
        let offered: Vec<String> = resources.iter().map(|r| r.file_name()).collect();
        self.record(&format!("claim[{}]", offered.join(",")));
        resources
            .iter()
            .filter(|r| {
                r.declares_loader(&self.name) || (self.directory_fallback && r.kind() == ResourceKind::Directory)
            })
            .map(|r| PluginCandidate::new(r.clone(), self.name.as_str()))
            .collect()
    }

    fn create_container(
        &self,
        _environment: &Environment,
        candidate: &PluginCandidate,
    ) -> Result<Box<dyn PluginContainer>, PluginSystemError> {
        let resource = candidate.resource();
        self.record(&format!("create[{}]", resource.file_name()));
        Ok(Box::new(JournalContainer {
            id: resource.file_name(),
            source: resource.root_path().to_path_buf(),
        }))
    }
}

/// Catalog with `"java"` registered before `"script"`.
pub fn java_then_script(journal: &Journal, script_fallback: bool) -> LoaderCatalog {
    let java_journal = journal.clone();
    let script_journal = journal.clone();
    LoaderCatalog::new()
        .with("java", move || {
            Box::new(JournalLoader {
                name: "java".to_string(),
                directory_fallback: false,
                journal: java_journal.clone(),
            }) as Box<dyn LanguageLoader>
        })
        .with("script", move || {
            Box::new(JournalLoader {
                name: "script".to_string(),
                directory_fallback: script_fallback,
                journal: script_journal.clone(),
            }) as Box<dyn LanguageLoader>
        })
}
