use anyhow::Result;
use common::engine::{self, ReduceOutcome};
use common::{Job, Task, Workload};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::RpcClient;
use crate::config::WorkerConfig;

pub struct Worker {
    config: WorkerConfig,
    workload: Workload,
    rpc: RpcClient,
}

impl Worker {
    pub fn new(config: WorkerConfig, workload: Workload) -> Result<Self> {
        let rpc = RpcClient::new(config.master_url.clone())?;
        Ok(Self {
            config,
            workload,
            rpc,
        })
    }

    /// Loop principal del worker:
    /// - pide una tarea al coordinador
    /// - si el coordinador no responde `max_failures` veces seguidas, sale
    /// - ejecuta maps y reduces hasta recibir `Exit`
    ///
    /// Un error de lectura/escritura de archivos corta el loop con `Err`: la
    /// tarea no se reporta y el coordinador la reasigna cuando vence su lease.
    pub async fn run(&self) -> Result<()> {
        let mut failures: u32 = 0;

        loop {
            let Some(job) = self.rpc.request_task().await else {
                failures += 1;
                if failures >= self.config.max_failures {
                    warn!(
                        "coordinador inalcanzable {} veces seguidas, saliendo",
                        failures
                    );
                    return Ok(());
                }
                sleep(self.config.poll_interval).await;
                continue;
            };
            failures = 0;

            match job {
                Job::Exit => {
                    info!("el coordinador indica que el job terminó, saliendo");
                    return Ok(());
                }
                Job::Wait => {
                    debug!("no hay tareas libres, esperando");
                }
                Job::Map(task) => self.run_map(task).await?,
                Job::Reduce(task) => self.run_reduce(task).await?,
            }

            sleep(self.config.poll_interval).await;
        }
    }

    async fn run_map(&self, task: Task) -> Result<()> {
        info!(task_id = task.id, inputs = ?task.inputs, "ejecutando map");

        let map_fn = self.workload.map_fn;
        let dir = self.config.work_dir.clone();
        let t = task.clone();
        let files =
            tokio::task::spawn_blocking(move || engine::execute_map(&t, map_fn, &dir)).await??;

        info!(task_id = task.id, files = files.len(), "map terminado, reportando");
        self.rpc.map_done(files, task).await;
        Ok(())
    }

    async fn run_reduce(&self, task: Task) -> Result<()> {
        info!(task_id = task.id, inputs = task.inputs.len(), "ejecutando reduce");

        let reduce_fn = self.workload.reduce_fn;
        let dir = self.config.work_dir.clone();
        let t = task.clone();
        let outcome =
            tokio::task::spawn_blocking(move || engine::execute_reduce(&t, reduce_fn, &dir))
                .await??;

        match outcome {
            ReduceOutcome::NoInputs => {
                debug!(task_id = task.id, "reduce sin entradas, nada que hacer");
                return Ok(());
            }
            ReduceOutcome::Committed(path) => {
                info!(task_id = task.id, output = %path.display(), "salida confirmada");
            }
            ReduceOutcome::AlreadyCommitted(path) => {
                info!(
                    task_id = task.id,
                    output = %path.display(),
                    "la salida ya existía, se descarta la nuestra"
                );
            }
        }

        self.rpc.reduce_done(task).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Puerto local en el que seguro no escucha nadie.
    async fn dead_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn sale_tras_fallos_consecutivos_de_transporte() {
        let config = WorkerConfig {
            master_url: dead_endpoint().await,
            poll_interval: Duration::from_millis(10),
            max_failures: 2,
            ..WorkerConfig::default()
        };
        let worker = Worker::new(config, common::apps::try_named("wc").unwrap()).unwrap();

        let res = tokio::time::timeout(Duration::from_secs(20), worker.run()).await;

        assert!(res.is_ok(), "el worker no abandonó");
        assert!(res.unwrap().is_ok());
    }
}
