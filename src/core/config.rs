use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::core::errors::{Error, Result};

/// Runtime configuration for the file-sharing server.
#[derive(Debug, Clone, Parser)]
#[command(name = "stockshare", version, about = "Browse, upload and download files under a fixed root")]
pub struct ServerConfig {
    /// Directory that every browsed path is scoped beneath. Must already exist.
    #[arg(long, env = "STOCKSHARE_ROOT")]
    pub root: PathBuf,

    /// Prefix all routes and download URLs are mounted under.
    #[arg(long, env = "STOCKSHARE_BASE_URL", default_value = "/share")]
    pub base_url: String,

    #[arg(long, env = "STOCKSHARE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    #[arg(long, env = "STOCKSHARE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "STOCKSHARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Largest accepted upload body, in mebibytes.
    #[arg(long, env = "STOCKSHARE_MAX_UPLOAD_MB", default_value_t = 512)]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_absolute() {
            return Err(Error::Config(format!(
                "root '{}' must be an absolute path",
                self.root.display()
            )));
        }
        if !self.base_url.is_empty() && !self.base_url.starts_with('/') {
            return Err(Error::Config(format!(
                "base url '{}' must start with '/'",
                self.base_url
            )));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(Error::Config(
                "username and password must be configured together".to_string(),
            ));
        }
        if self.max_upload_mb == 0 {
            return Err(Error::Config("max upload size must be positive".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash; empty when mounted at `/`.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
