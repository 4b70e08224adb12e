use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use dvorfs_client::DEFAULT_BASE_URL;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub download_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub session_idle: Duration
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = get("API_URL_BACKEND").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let download_url = get("API_URL_DOWNLOAD").unwrap_or_else(|| backend_url.clone());

        let port = match get("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT: {port}"))?,
            None => 3000
        };

        let session_idle = match get("SESSION_IDLE_SECS") {
            Some(secs) => secs
                .trim()
                .parse()
                .map(Duration::from_secs)
                .with_context(|| format!("invalid SESSION_IDLE_SECS: {secs}"))?,
            None => Duration::from_secs(24 * 60 * 60)
        };

        Ok(Self {
            backend_url,
            download_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            static_dir: get("STATIC_DIR").map_or_else(|| PathBuf::from("static"), PathBuf::from),
            session_idle
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .with_context(|| format!("invalid listen address: {addr}"))
    }
}
