//! TOML pool file.
//!
//! ```toml
//! [pool]
//! threads = 4
//!
//! [engine]
//! command = "babel"
//! args = ["--presets", "@babel/preset-env"]
//! out_dir = "target/js"
//! extension = "js"
//! ```

use crate::engine::CommandSpec;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolFile {
    #[serde(default)]
    pub pool: PoolSection,
    pub engine: Option<CommandSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolSection {
    pub threads: Option<i64>,
}

impl PoolFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
