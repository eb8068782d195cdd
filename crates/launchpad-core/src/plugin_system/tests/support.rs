// crates/launchpad-core/src/plugin_system/tests/support.rs
//! Fixtures shared by the plugin system tests: on-disk resources and a
//! configurable mock language loader.
use std::any::Any;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zip::write::SimpleFileOptions;

use crate::plugin_system::environment::Environment;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::MANIFEST_PATH;
use crate::plugin_system::registry::LoaderCatalog;
use crate::plugin_system::resource::PluginResource;
use crate::plugin_system::traits::{LanguageLoader, PluginCandidate, PluginContainer};

/// Manifest text declaring `loader` and `id`.
pub fn manifest_for(loader: &str, id: &str) -> String {
    format!(
        "Manifest-Version: 1.0\nPlugin-Loader: {}\nPlugin-Id: {}\nPlugin-Version: 1.0.0\n",
        loader, id
    )
}

/// Create `root/name/` with an optional `META-INF/MANIFEST.MF`.
pub fn write_dir_resource(root: &Path, name: &str, manifest: Option<&str>) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    if let Some(text) = manifest {
        let manifest_path = dir.join(MANIFEST_PATH);
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        fs::write(manifest_path, text).unwrap();
    }
    dir
}

/// Create a zip archive `root/name` with an optional manifest entry and a dummy payload.
pub fn write_archive_resource(root: &Path, name: &str, manifest: Option<&str>) -> PathBuf {
    let path = root.join(name);
    let file = File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    if let Some(text) = manifest {
        writer.start_file(MANIFEST_PATH, options).unwrap();
        writer.write_all(text.as_bytes()).unwrap();
    }
    writer.start_file("payload.txt", options).unwrap();
    writer.write_all(b"payload").unwrap();
    writer.finish().unwrap();
    path
}

#[derive(Debug)]
pub struct MockContainer {
    pub id: String,
    pub source: PathBuf,
}

impl PluginContainer for MockContainer {
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

/// Which resources a [`MockLoader`] claims.
#[derive(Clone)]
pub enum ClaimRule {
    /// Resources whose manifest names this loader
    Declared,
    /// Everything offered
    All,
    /// Nothing
    None,
}

/// Observations recorded by a [`MockLoader`].
#[derive(Default)]
pub struct MockProbe {
    pub initialized: AtomicUsize,
    /// Number of resources offered on each `claim_resources` call
    pub offered: Mutex<Vec<usize>>,
}

#[derive(Clone)]
pub struct MockLoader {
    pub name: String,
    pub rule: ClaimRule,
    pub fail_init: bool,
    /// File names whose container creation fails
    pub failing: HashSet<String>,
    /// Extra path claimed on top of the rule (to simulate bogus claims)
    pub phantom_claim: Option<PathBuf>,
    pub panic_on_init: bool,
    pub panic_on_claim: bool,
    /// File names whose container creation panics
    pub panicking: HashSet<String>,
    pub probe: Arc<MockProbe>,
}

impl MockLoader {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rule: ClaimRule::Declared,
            fail_init: false,
            failing: HashSet::new(),
            phantom_claim: None,
            panic_on_init: false,
            panic_on_claim: false,
            panicking: HashSet::new(),
            probe: Arc::new(MockProbe::default()),
        }
    }

    pub fn claiming(mut self, rule: ClaimRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub fn panicking_on_init(mut self) -> Self {
        self.panic_on_init = true;
        self
    }

    pub fn panicking_on_claim(mut self) -> Self {
        self.panic_on_claim = true;
        self
    }

    pub fn panicking_on(mut self, file_name: &str) -> Self {
        self.panicking.insert(file_name.to_string());
        self
    }
}

impl LanguageLoader for MockLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, _environment: &Environment) -> Result<(), PluginSystemError> {
        self.probe.initialized.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_init {
            panic!("mock loader '{}' blew up during init", self.name);
        }
        if self.fail_init {
            return Err(PluginSystemError::LoaderInitialization {
                loader: self.name.clone(),
                message: "mock refused to start".to_string(),
            });
        }
        Ok(())
    }

    fn claim_resources(&self, _environment: &Environment, resources: &[PluginResource]) -> Vec<PluginCandidate> {
        self.probe.offered.lock().unwrap().push(resources.len());
        if self.panic_on_claim {
            panic!("mock loader '{}' blew up while claiming", self.name);
        }
        let mut claims: Vec<PluginCandidate> = resources
            .iter()
            .filter(|r| match self.rule {
                ClaimRule::Declared => r.declares_loader(&self.name),
                ClaimRule::All => true,
                ClaimRule::None => false,
            })
            .map(|r| PluginCandidate::new(r.clone(), self.name.as_str()))
            .collect();
        if let Some(path) = &self.phantom_claim {
            claims.push(PluginCandidate::new(
                PluginResource::new(path, crate::plugin_system::resource::ResourceKind::Directory),
                self.name.as_str(),
            ));
        }
        claims
    }

    fn create_container(
        &self,
        _environment: &Environment,
        candidate: &PluginCandidate,
    ) -> Result<Box<dyn PluginContainer>, PluginSystemError> {
        let resource = candidate.resource();
        let file_name = resource.file_name();
        if self.panicking.contains(&file_name) {
            panic!("mock loader '{}' blew up on {}", self.name, file_name);
        }
        if self.failing.contains(&file_name) {
            return Err(PluginSystemError::MalformedResource {
                path: resource.root_path().to_path_buf(),
                message: "mock cannot build this one".to_string(),
            });
        }
        Ok(Box::new(MockContainer {
            id: file_name,
            source: resource.root_path().to_path_buf(),
        }))
    }
}

/// Catalog registering clones of `loaders` in order.
pub fn catalog_of(loaders: &[MockLoader]) -> LoaderCatalog {
    let mut catalog = LoaderCatalog::new();
    for loader in loaders {
        let template = loader.clone();
        catalog.register(loader.name.clone(), move || {
            Box::new(template.clone()) as Box<dyn LanguageLoader>
        });
    }
    catalog
}
