use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::rpc::{MAP_DONE_PATH, REDUCE_DONE_PATH, STATUS_PATH, TASK_REQUEST_PATH};
use common::{
    MapDoneRequest, ReduceDoneRequest, ReportReply, StatusResponse, TaskReply, TaskRequest,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::Coordinator;

pub fn build_router(state: Coordinator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(TASK_REQUEST_PATH, post(request_task))
        .route(MAP_DONE_PATH, post(map_done))
        .route(REDUCE_DONE_PATH, post(reduce_done))
        .route(STATUS_PATH, get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Worker pide trabajo
async fn request_task(
    State(state): State<Coordinator>,
    Json(_req): Json<TaskRequest>,
) -> Json<TaskReply> {
    let job = state.request_task();
    if let Some(task) = job.task() {
        info!(
            task_id = task.id,
            kind = job.kind(),
            inputs = task.inputs.len(),
            "tarea asignada"
        );
    }
    Json(TaskReply { job })
}

// Worker reporta un map terminado con sus archivos intermedios
async fn map_done(
    State(state): State<Coordinator>,
    Json(req): Json<MapDoneRequest>,
) -> Json<ReportReply> {
    let accepted = state.receive_map(&req);
    if accepted {
        info!(task_id = req.task.id, files = req.files.len(), "map completado");
    }
    Json(ReportReply { accepted })
}

// Worker reporta un reduce terminado
async fn reduce_done(
    State(state): State<Coordinator>,
    Json(req): Json<ReduceDoneRequest>,
) -> Json<ReportReply> {
    let accepted = state.reduce_done(&req);
    if accepted {
        info!(task_id = req.task.id, "reduce completado");
    }
    Json(ReportReply { accepted })
}

async fn status(State(state): State<Coordinator>) -> Json<StatusResponse> {
    Json(state.status())
}
