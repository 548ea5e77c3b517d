use std::time::Duration;

use anyhow::Result;
use common::rpc::{MAP_DONE_PATH, REDUCE_DONE_PATH, TASK_REQUEST_PATH};
use common::{Job, MapDoneRequest, ReduceDoneRequest, ReportReply, Task, TaskReply, TaskRequest};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

const RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Cliente de las tres RPC del coordinador.
///
/// Cualquier fallo (coordinador caído, timeout, status HTTP de error, JSON
/// inválido) se registra y se colapsa en `None` / `false`: para el worker
/// todos significan "coordinador no disponible ahora".
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(RPC_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<Req: Serialize, Resp: DeserializeOwned>(&self, path: &str, req: &Req) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// `TaskRequest`. `None` si la llamada falló.
    pub async fn request_task(&self) -> Option<Job> {
        match self.call::<_, TaskReply>(TASK_REQUEST_PATH, &TaskRequest::default()).await {
            Ok(reply) => Some(reply.job),
            Err(e) => {
                warn!("fallo pidiendo tarea al coordinador: {:#}", e);
                None
            }
        }
    }

    /// `ReceiveTask`. `true` si el coordinador recibió el reporte (aunque lo
    /// haya descartado por tardío).
    pub async fn map_done(&self, files: Vec<String>, task: Task) -> bool {
        let id = task.id;
        match self
            .call::<_, ReportReply>(MAP_DONE_PATH, &MapDoneRequest { files, task })
            .await
        {
            Ok(reply) => {
                if !reply.accepted {
                    debug!(task_id = id, "el coordinador descartó el reporte del map");
                }
                true
            }
            Err(e) => {
                warn!(task_id = id, "fallo reportando map: {:#}", e);
                false
            }
        }
    }

    /// `ReduceDone`.
    pub async fn reduce_done(&self, task: Task) -> bool {
        let id = task.id;
        match self
            .call::<_, ReportReply>(REDUCE_DONE_PATH, &ReduceDoneRequest { task })
            .await
        {
            Ok(reply) => {
                if !reply.accepted {
                    debug!(task_id = id, "el coordinador descartó el reporte del reduce");
                }
                true
            }
            Err(e) => {
                warn!(task_id = id, "fallo reportando reduce: {:#}", e);
                false
            }
        }
    }
}
