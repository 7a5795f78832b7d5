//! # Configuration
//!
//! The server needs three values: where boxes are stored, the shared
//! access-token secret, and the listen address. They are read once at
//! startup, in increasing precedence, from:
//!
//! 1. built-in defaults (`0.0.0.0:8099`, `./data`),
//! 2. a YAML file (`filestore_path`, `access_token`, `bind`),
//! 3. environment variables `VAGRANCY_FILESTORE_PATH`,
//!    `VAGRANCY_ACCESS_TOKEN`, `VAGRANCY_BIND`, and `PORT`,
//! 4. command-line flags (applied by `main`).
//!
//! The access token has no default; starting without one is an error.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use vagrancy_core::AccessToken;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8099";

/// Default storage root, relative to the working directory.
pub const DEFAULT_FILESTORE_PATH: &str = "data";

/// Configuration file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Errors while assembling [`AppConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`FileConfig`].
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No access token was configured anywhere.
    #[error("no access token configured (set access_token or VAGRANCY_ACCESS_TOKEN)")]
    MissingAccessToken,

    /// The listen address or port does not parse.
    #[error("invalid listen address {0:?}")]
    InvalidBind(String),
}

/// On-disk configuration file shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub filestore_path: Option<PathBuf>,
    pub access_token: Option<String>,
    pub bind: Option<String>,
}

impl FileConfig {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        // An empty file is an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved server configuration.
///
/// `AccessToken` redacts itself in `Debug` output.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Storage root directory.
    pub filestore_path: PathBuf,
    /// Shared secret clients present (base64-encoded) as `access_token`.
    pub access_token: AccessToken,
}

impl AppConfig {
    /// Merge defaults, an optional file and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::resolve(file, &env)
    }

    /// Merge a parsed file with an environment snapshot.
    pub fn resolve(file: FileConfig, env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let filestore_path = env
            .get("VAGRANCY_FILESTORE_PATH")
            .map(PathBuf::from)
            .or(file.filestore_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILESTORE_PATH));

        let access_token = env
            .get("VAGRANCY_ACCESS_TOKEN")
            .cloned()
            .or(file.access_token)
            .map(AccessToken::new)
            .ok_or(ConfigError::MissingAccessToken)?;

        let bind_str = env
            .get("VAGRANCY_BIND")
            .cloned()
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let mut bind = parse_bind(&bind_str)?;

        if let Some(port) = env.get("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::InvalidBind(format!("PORT={port}")))?;
            bind.set_port(port);
        }

        Ok(Self {
            bind,
            filestore_path,
            access_token,
        })
    }
}

/// Parse a `host:port` listen address.
pub fn parse_bind(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidBind(value.to_string()))
}
