use serde::{Deserialize, Serialize};

use crate::job::{Job, Task};

pub const TASK_REQUEST_PATH: &str = "/api/v1/tasks/request";
pub const MAP_DONE_PATH: &str = "/api/v1/tasks/map-done";
pub const REDUCE_DONE_PATH: &str = "/api/v1/tasks/reduce-done";
pub const STATUS_PATH: &str = "/api/v1/status";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReply {
    pub job: Job,
}

/// Reporte de un map terminado (`ReceiveTask`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDoneRequest {
    /// Identificadores de los archivos intermedios producidos
    pub files: Vec<String>,
    pub task: Task,
}

/// Reporte de un reduce terminado (`ReduceDone`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReduceDoneRequest {
    pub task: Task,
}

/// Acuse de recibo. `accepted = false` significa que el id ya no estaba en
/// vuelo (reporte tardío); no es un error para el worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportReply {
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub map_tasks: usize,
    pub n_reduce: usize,
    pub idle: usize,
    pub in_progress: usize,
    pub done: bool,
}
