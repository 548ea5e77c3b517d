use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use worker::{Worker, WorkerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::from_env();
    let workload = common::apps::try_named(&config.app)
        .ok_or_else(|| anyhow!("la aplicación `{}` no existe", config.app))?;

    // Nombre de host (solo para info)
    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    info!(
        "worker en {} (app={}, dir={}) contra {}",
        hostname,
        config.app,
        config.work_dir.display(),
        config.master_url
    );

    Worker::new(config, workload)?.run().await
}
