use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common::{Job, MapDoneRequest, ReduceDoneRequest, StatusResponse, TaskId};

use crate::lease;
use crate::scheduler::Scheduler;

pub const DEFAULT_LEASE: Duration = Duration::from_secs(10);

/// Handle compartido del coordinador: el `Scheduler` tras un único mutex.
///
/// Los handlers HTTP y los timers de lease pasan todos por aquí, así que cada
/// transición de estado ocurre con el lock tomado y nunca se espera (await)
/// con el lock tomado.
#[derive(Clone)]
pub struct Coordinator {
    scheduler: Arc<Mutex<Scheduler>>,
    lease: Duration,
}

impl Coordinator {
    pub fn new(files: Vec<String>, n_reduce: usize, lease: Duration) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(Scheduler::new(files, n_reduce))),
            lease,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Scheduler> {
        // un panic en otro handler no invalida el estado: cada operación
        // deja el scheduler consistente antes de soltar el lock
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// `TaskRequest`. Si se despachó una tarea, arma su lease después de
    /// soltar el lock. Debe llamarse dentro de un runtime de tokio.
    pub fn request_task(&self) -> Job {
        let job = self.lock().request_task();
        if let Some(id) = job.id() {
            lease::arm(self.clone(), id);
        }
        job
    }

    /// `ReceiveTask`.
    pub fn receive_map(&self, req: &MapDoneRequest) -> bool {
        self.lock().receive_map(req.task.id, &req.files)
    }

    /// `ReduceDone`.
    pub fn reduce_done(&self, req: &ReduceDoneRequest) -> bool {
        self.lock().reduce_done(req.task.id)
    }

    /// Evento de vencimiento de lease, entregado por el timer.
    pub fn expire_lease(&self, id: TaskId) -> Option<TaskId> {
        self.lock().expire_lease(id)
    }

    pub fn done(&self) -> bool {
        self.lock().done()
    }

    pub fn status(&self) -> StatusResponse {
        self.lock().status()
    }

    pub fn is_in_progress(&self, id: TaskId) -> bool {
        self.lock().is_in_progress(id)
    }

    pub fn partition_files(&self, p: usize) -> Vec<String> {
        self.lock().partition_files(p).to_vec()
    }
}
