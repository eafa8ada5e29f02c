//! CLI argument parsing.

use std::path::PathBuf;

use argh::FromArgs;

use crate::errors::*;

#[derive(Clone, Debug, FromArgs)]
#[argh(description = "Conduit command API server")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,

    /// Data directory path that will override the path in the config toml.
    #[argh(option, short = 'd', description = "datadir path used for databases")]
    pub datadir: Option<PathBuf>,

    /// Host the HTTP server binds to.
    #[argh(option, description = "http host")]
    pub host: Option<String>,

    /// Port the HTTP server binds to.
    #[argh(option, description = "http port")]
    pub port: Option<u16>,

    /// Other generic overrides to the config toml.
    /// Will be used, for example, as `-o auth.enabled=false -o server.port=9000`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub overrides: Vec<String>,
}

impl Args {
    /// Get strings of overrides gathered from user and internal attributes.
    pub(crate) fn get_all_overrides(&self) -> Result<Vec<String>, InitError> {
        let mut overrides = self.overrides.clone();
        overrides.extend_from_slice(&self.get_internal_overrides()?);
        Ok(overrides)
    }

    /// Overrides passed directly as args attributes.
    fn get_internal_overrides(&self) -> Result<Vec<String>, InitError> {
        let mut overrides = Vec::new();
        if let Some(datadir) = &self.datadir {
            let dd = datadir
                .to_str()
                .ok_or_else(|| InitError::InvalidDatadirPath(datadir.clone()))?;
            overrides.push(format!("storage.datadir={dd}"));
        }
        if let Some(host) = &self.host {
            overrides.push(format!("server.host={host}"));
        }
        if let Some(port) = &self.port {
            overrides.push(format!("server.port={port}"));
        }

        Ok(overrides)
    }
}
