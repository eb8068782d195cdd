//! # Launchpad Core Kernel
//!
//! The `kernel` module wires the plugin system together for a host.
//!
//! - **Bootstrap**: [`Launcher`](bootstrap::Launcher) is the explicit context
//!   object built from a [`LaunchConfig`](crate::config::LaunchConfig) and a
//!   [`LoaderCatalog`](crate::plugin_system::LoaderCatalog). It runs the
//!   discovery pipeline in the order hosts are expected to call it.
//! - **Core Constants**: names and the loader API version in `constants`.
//! - **Error Handling**: [`Error`](error::Error) and a `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Launcher, LoadReport};
pub use error::{Error, Result};
