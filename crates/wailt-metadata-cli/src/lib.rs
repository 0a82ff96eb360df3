//! wailt-metadata CLI — fetch, inspect and query track metadata from a terminal.

pub mod commands;
pub mod config;

pub use config::{resolve_config, resolve_data_dir, MetadataConfig, Overrides};
