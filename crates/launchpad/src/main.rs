mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use launchpad_core::config::LaunchConfig;
use launchpad_core::kernel::constants;
use launchpad_core::kernel::{Launcher, Result};
use launchpad_core::plugin_system::registry::LoaderCatalog;
use log::{debug, error};

use manifest_loader::ManifestLoader;
use script_loader::ScriptLoader;

/// Launchpad: plugin discovery and loading for game directories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Configuration file (JSON, YAML or TOML). Defaults to ./launchpad.toml when present.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered language loaders and their status
    Loaders,
    /// List the plugin resources found in a directory
    Scan {
        /// Game directory (defaults to the configured one)
        dir: Option<PathBuf>,
    },
    /// Run the full discovery pipeline and print the loaded plugins
    Load {
        /// Game directory (defaults to the configured one)
        dir: Option<PathBuf>,
    },
    /// Print the artifacts the host must put on its launch path
    LaunchResources {
        /// Game directory (defaults to the configured one)
        dir: Option<PathBuf>,
    },
}

/// The language loaders bundled with this binary, in claim order.
fn bundled_loaders() -> LoaderCatalog {
    LoaderCatalog::new()
        .with(manifest_loader::LOADER_NAME, ManifestLoader::boxed)
        .with(script_loader::LOADER_NAME, ScriptLoader::boxed)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Failed to initialize env_logger: {}", e);
    }
}

fn load_config(path: Option<&Path>) -> Result<LaunchConfig> {
    match path {
        Some(path) => Ok(LaunchConfig::load(path)?),
        None => {
            let default = Path::new(constants::DEFAULT_CONFIG_FILE);
            if default.is_file() {
                debug!("Using {}", default.display());
                Ok(LaunchConfig::load(default)?)
            } else {
                Ok(LaunchConfig::default())
            }
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let launcher = Launcher::new(config, bundled_loaders())?;

    match args.command.unwrap_or(Commands::Load { dir: None }) {
        Commands::Loaders => cli::print_loaders(&launcher.loaders()),
        Commands::Scan { dir } => cli::print_resources(&launcher.scan(dir.as_deref())?),
        Commands::Load { dir } => cli::print_report(&launcher.load_plugins(dir.as_deref())?),
        Commands::LaunchResources { dir } => cli::print_launch_resources(&launcher.launch_resources(dir.as_deref())?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
