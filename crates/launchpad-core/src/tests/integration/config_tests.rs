#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use super::common::{java_then_script, journal, write_jar, write_plain_dir};
use crate::config::LaunchConfig;
use crate::kernel::bootstrap::Launcher;

#[test]
fn test_json_config_drives_the_launcher() {
    let workspace = tempdir().unwrap();
    let game = workspace.path().join("game");
    fs::create_dir(&game).unwrap();
    write_jar(&game, "pluginA.jar", "Plugin-Loader: java\nMixinConfigs: a.mixins.json\n");
    write_plain_dir(&game, "pluginB.dir");

    let extras = workspace.path().join("extras");
    fs::create_dir(&extras).unwrap();
    write_jar(&extras, "extra.jar", "Plugin-Loader: script\n");

    fs::write(workspace.path().join("loaders.services"), "script\njava\n").unwrap();
    let config_path = workspace.path().join("launchpad.json");
    fs::write(
        &config_path,
        r#"{
            "game_directory": "game",
            "extra_resources": ["extras/extra.jar"],
            "services_manifest": "loaders.services",
            "properties": { "side": "server" }
        }"#,
    )
    .unwrap();

    let config = LaunchConfig::load(&config_path).unwrap();
    let calls = journal();
    let launcher = Launcher::new(config, java_then_script(&calls, false)).unwrap();
    assert_eq!(launcher.catalog().names(), vec!["script", "java"]);
    assert_eq!(launcher.environment().property("side"), Some("server"));

    let report = launcher.load_plugins(None).unwrap();
    let loaded: Vec<(&str, &str)> = report
        .containers
        .iter()
        .map(|l| (l.loader.as_str(), l.container.id()))
        .collect();
    assert_eq!(loaded, vec![("script", "extra.jar"), ("java", "pluginA.jar")]);
    assert_eq!(report.unclaimed.len(), 1);

    let launch = launcher.launch_resources(None).unwrap();
    assert_eq!(launch.len(), 1);
    assert_eq!(launch[0].name, "pluginA.jar");
}
