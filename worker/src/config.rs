use std::{path::PathBuf, time::Duration};

use common::config::{env_or, master_base_url};

pub const DEFAULT_POLL_MS: u64 = 1000;
pub const DEFAULT_MAX_FAILURES: u32 = 2;
pub const DEFAULT_APP: &str = "wc";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// URL base del coordinador
    pub master_url: String,
    /// Directorio compartido donde viven intermedios y salidas
    pub work_dir: PathBuf,
    /// Pausa entre iteraciones del loop (y tras un fallo de transporte)
    pub poll_interval: Duration,
    /// Fallos de transporte consecutivos antes de abandonar
    pub max_failures: u32,
    /// Aplicación MapReduce a ejecutar (`wc`, `indexer`)
    pub app: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            master_url: common::config::DEFAULT_MASTER_URL.to_string(),
            work_dir: PathBuf::from("."),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            max_failures: DEFAULT_MAX_FAILURES,
            app: DEFAULT_APP.to_string(),
        }
    }
}

impl WorkerConfig {
    /// - MASTER_URL: coordinador (default http://127.0.0.1:8080)
    /// - MR_WORK_DIR: directorio de trabajo (default ".")
    /// - MR_POLL_MS: pausa entre pedidos en ms (default 1000)
    /// - MR_MAX_FAILURES: fallos seguidos tolerados (default 2)
    /// - MR_APP: aplicación (default "wc")
    pub fn from_env() -> Self {
        Self {
            master_url: master_base_url(),
            work_dir: PathBuf::from(env_or("MR_WORK_DIR", ".".to_string())),
            poll_interval: Duration::from_millis(env_or("MR_POLL_MS", DEFAULT_POLL_MS)),
            max_failures: env_or("MR_MAX_FAILURES", DEFAULT_MAX_FAILURES).max(1),
            app: env_or("MR_APP", DEFAULT_APP.to_string()),
        }
    }
}
