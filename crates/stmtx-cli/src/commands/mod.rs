//! Subcommands of the `stmtx` binary.

pub mod config;
pub mod extract;
pub mod inspect;

use std::path::Path;

use stmtx_core::StmtxConfig;

/// Configuration from `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StmtxConfig> {
    let config = match config_path {
        Some(path) => StmtxConfig::from_file(Path::new(path))?,
        None => StmtxConfig::default(),
    };
    Ok(config)
}
