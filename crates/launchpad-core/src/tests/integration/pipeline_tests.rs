#![cfg(test)]

use tempfile::tempdir;

use super::common::{entries, java_then_script, journal, write_jar, write_plain_dir};
use crate::config::LaunchConfig;
use crate::kernel::bootstrap::Launcher;
use crate::plugin_system::environment::Environment;
use crate::plugin_system::loader::{LoaderState, PluginLoader};
use crate::plugin_system::resource::{ResourceKind, UNASSIGNED_AFFINITY};

const JAVA_MANIFEST: &str = "Manifest-Version: 1.0\r\nPlugin-Loader: java\r\nPlugin-Id: plugin_a\r\n\r\n";

#[test]
fn test_host_bootstrap_sequence_with_unclaimed_directory() {
    let root = tempdir().unwrap();
    write_jar(root.path(), "pluginA.jar", JAVA_MANIFEST);
    write_plain_dir(root.path(), "pluginB.dir");
    let calls = journal();

    let mut loader = PluginLoader::new(Environment::default(), java_then_script(&calls, false));
    assert_eq!(loader.discover_services(), 2);
    assert!(loader.initialize_services().is_empty());
    loader.initialize(root.path()).unwrap();

    let resources = loader.discover_resources().unwrap();
    assert_eq!(resources.values().map(Vec::len).sum::<usize>(), 2);
    assert_eq!(resources["java"][0].kind(), ResourceKind::Archive);
    assert!(!resources[UNASSIGNED_AFFINITY][0].metadata().is_present());

    loader.determine_candidates().unwrap();
    assert_eq!(loader.candidates_for("java").len(), 1);
    assert!(loader.candidates_for("script").is_empty());
    assert_eq!(loader.unclaimed()[0].file_name(), "pluginB.dir");

    assert_eq!(loader.create_containers().unwrap(), 1);
    assert_eq!(loader.state(), LoaderState::ContainersCreated);

    assert_eq!(
        entries(&calls),
        vec![
            "java:initialize",
            "script:initialize",
            "java:claim[pluginA.jar,pluginB.dir]",
            "script:claim[pluginB.dir]",
            "java:create[pluginA.jar]",
        ]
    );
}

#[test]
fn test_directory_convention_fallback_claims_leftover() {
    let root = tempdir().unwrap();
    write_jar(root.path(), "pluginA.jar", JAVA_MANIFEST);
    write_plain_dir(root.path(), "pluginB.dir");
    let calls = journal();

    let launcher = Launcher::new(LaunchConfig::default(), java_then_script(&calls, true)).unwrap();
    let report = launcher.load_plugins(Some(root.path())).unwrap();

    let loaded: Vec<(&str, &str)> = report
        .containers
        .iter()
        .map(|l| (l.loader.as_str(), l.container.id()))
        .collect();
    assert_eq!(loaded, vec![("java", "pluginA.jar"), ("script", "pluginB.dir")]);
    assert!(report.unclaimed.is_empty());
    assert!(report.is_clean());
}

#[test]
fn test_repeated_runs_are_identical() {
    let root = tempdir().unwrap();
    for i in 0..5 {
        write_jar(root.path(), &format!("mod{}.jar", i), JAVA_MANIFEST);
        write_plain_dir(root.path(), &format!("dir{}", i));
    }
    let calls = journal();
    let launcher = Launcher::new(LaunchConfig::default(), java_then_script(&calls, true)).unwrap();

    let first = launcher.load_plugins(Some(root.path())).unwrap();
    let second = launcher.load_plugins(Some(root.path())).unwrap();
    assert_eq!(first.resources, second.resources);
    let ids = |r: &crate::kernel::bootstrap::LoadReport| -> Vec<String> {
        r.containers.iter().map(|l| l.container.id().to_string()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.containers.len(), 10);
}
