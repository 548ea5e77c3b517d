//! Coordinador MapReduce: reparte maps y reduces a los workers, vigila los
//! leases y decide cuándo terminó el job.

pub mod handlers;
pub mod inputs;
pub mod lease;
pub mod scheduler;
pub mod state;

pub use scheduler::Scheduler;
pub use state::{Coordinator, DEFAULT_LEASE};

use tokio::net::TcpListener;

/// Sirve la API RPC del coordinador sobre `listener` hasta que el proceso
/// termine.
pub async fn serve(listener: TcpListener, coordinator: Coordinator) -> std::io::Result<()> {
    let app = handlers::build_router(coordinator);
    axum::serve(listener, app).await
}
