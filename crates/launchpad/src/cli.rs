//! Console rendering for the `launchpad` subcommands. Results go to stdout;
//! diagnostics go through `log` to stderr.
use launchpad_core::kernel::LoadReport;
use launchpad_core::plugin_system::registry::LoaderStatus;
use launchpad_core::plugin_system::resource::PluginResource;
use launchpad_core::plugin_system::scanner::ResourceMap;
use launchpad_core::plugin_system::service::LaunchResource;

pub fn print_loaders(loaders: &[(String, LoaderStatus)]) {
    println!("Language loaders:");
    if loaders.is_empty() {
        println!("  No language loaders registered.");
        return;
    }
    for (name, status) in loaders {
        println!("  - {} ({})", name, status);
    }
}

pub fn print_resources(resources: &ResourceMap) {
    let total: usize = resources.values().map(Vec::len).sum();
    println!("Discovered {} resource(s):", total);
    for (affinity, group) in resources {
        println!("  [{}]", affinity);
        for resource in group {
            println!("    - {}", describe(resource));
        }
    }
}

pub fn print_report(report: &LoadReport) {
    println!("Loaded {} plugin(s):", report.containers.len());
    for loaded in &report.containers {
        let container = &loaded.container;
        println!(
            "  - {} v{} [{}] from {}",
            container.name(),
            container.version(),
            loaded.loader,
            container.source().display()
        );
    }
    if !report.unclaimed.is_empty() {
        println!("Unclaimed resources:");
        for resource in &report.unclaimed {
            println!("  - {}", describe(resource));
        }
    }
    if !report.failures.is_empty() {
        println!("Failures:");
        for failure in &report.failures {
            println!("  - {}", failure);
        }
    }
}

pub fn print_launch_resources(resources: &[LaunchResource]) {
    if resources.is_empty() {
        println!("No launch resources.");
        return;
    }
    for resource in resources {
        println!("{}\t{}", resource.name, resource.path.display());
    }
}

fn describe(resource: &PluginResource) -> String {
    let metadata = if resource.metadata().is_present() {
        "manifest"
    } else {
        "no manifest"
    };
    format!("{} ({}, {})", resource.root_path().display(), resource.kind(), metadata)
}
