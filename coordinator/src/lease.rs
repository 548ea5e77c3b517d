use tokio::time::sleep;
use tracing::debug;

use common::TaskId;

use crate::state::Coordinator;

/// Arma el lease de una tarea recién despachada.
///
/// El timer nunca se cancela: al vencer entrega `expire_lease(id)` al
/// coordinador, que sólo reencola si el id sigue en vuelo.
pub fn arm(coordinator: Coordinator, id: TaskId) {
    let lease = coordinator.lease();
    tokio::spawn(async move {
        sleep(lease).await;
        if coordinator.expire_lease(id).is_none() {
            debug!(task_id = id, "lease vencido de tarea ya resuelta");
        }
    });
}
