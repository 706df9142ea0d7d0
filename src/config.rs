use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub harness: HarnessConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig { pub host: String, pub port: u16, pub request_timeout_secs: u64 }
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Wall time one latency unit stands for. `find_one_slowly(class, id)`
    /// sleeps `class` units before answering.
    pub latency_unit_ms: u64,
}

impl StoreConfig {
    pub fn latency_unit(&self) -> Duration {
        Duration::from_millis(self.latency_unit_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    pub batch_total: u64,
    /// 0 = unbounded, one in-flight task per slot.
    pub max_in_flight: usize,
    pub progress_log_every: u64,
    pub sweep_max_id: u64,
    pub latency_classes: Vec<u32>,
    pub sweep_timeout_secs: u64,
    pub seed_on_start: bool,
}

impl HarnessConfig {
    pub fn sweep_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep_timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("USERBENCH__").split("__"));
        Ok(figment.extract()?)
    }
}
