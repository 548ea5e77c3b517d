use std::collections::{HashMap, VecDeque};

use common::engine::parse_intermediate;
use common::{Job, StatusResponse, Task, TaskId};
use tracing::{debug, info, warn};

/// Máquina de estados de tareas del coordinador.
///
/// No hace I/O ni conoce el reloj: el dueño (`Coordinator`) la guarda tras un
/// único mutex y le entrega, en un solo orden total, los pedidos de los
/// workers, sus reportes y los vencimientos de lease.
#[derive(Debug)]
pub struct Scheduler {
    map_tasks: usize,
    n_reduce: usize,
    // tareas pendientes de asignar (FIFO)
    idle: VecDeque<Job>,
    // tareas ya asignadas pero no completadas
    in_progress: HashMap<TaskId, Job>,
    // archivos intermedios reportados por partición
    partitions: Vec<Vec<String>>,
    next_id: TaskId,
}

impl Scheduler {
    /// Crea un map por split, todos en `idle`.
    pub fn new(files: Vec<String>, n_reduce: usize) -> Self {
        let n_reduce = n_reduce.max(1);
        let mut s = Self {
            map_tasks: files.len(),
            n_reduce,
            idle: VecDeque::with_capacity(files.len()),
            in_progress: HashMap::new(),
            partitions: vec![Vec::new(); n_reduce],
            next_id: 0,
        };

        for file in files {
            let id = s.alloc_id();
            s.idle.push_back(Job::Map(Task {
                id,
                inputs: vec![file],
                n_reduce,
            }));
        }

        s
    }

    fn alloc_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// `TaskRequest`: `Exit` si no queda nada, `Wait` si sólo queda trabajo
    /// en vuelo, y si no la cabeza de `idle` pasa a `in_progress`.
    pub fn request_task(&mut self) -> Job {
        if self.idle.is_empty() && self.in_progress.is_empty() {
            return Job::Exit;
        }

        let Some(job) = self.idle.pop_front() else {
            return Job::Wait;
        };

        if let Some(id) = job.id() {
            debug!(task_id = id, kind = job.kind(), "despachando tarea");
            self.in_progress.insert(id, job.clone());
        }
        job
    }

    /// Vencimiento del lease de `id`. Si la tarea sigue en vuelo se saca y se
    /// reencola al final de `idle` con un id nuevo, que se devuelve. Si ya no
    /// estaba (completada o reclamada antes) no hace nada.
    pub fn expire_lease(&mut self, id: TaskId) -> Option<TaskId> {
        let job = self.in_progress.remove(&id)?;
        let new_id = self.alloc_id();
        warn!(
            task_id = id,
            new_id,
            kind = job.kind(),
            "lease vencido, reencolando tarea"
        );
        self.idle.push_back(job.with_id(new_id));
        Some(new_id)
    }

    /// `ReceiveTask`: un map terminó y produjo `files`.
    ///
    /// Devuelve `false` si `id` ya no estaba en vuelo (reporte tardío); en ese
    /// caso no cambia nada. Cada partición cuyo acumulado llega exactamente a
    /// `map_tasks` genera su reduce, sin esperar al resto de particiones.
    ///
    /// Un mismo reporte aporta a lo sumo un archivo por partición, y sólo
    /// cuentan los archivos `mr-<id>-<p>` de este mismo map.
    pub fn receive_map(&mut self, id: TaskId, files: &[String]) -> bool {
        if self.in_progress.remove(&id).is_none() {
            debug!(task_id = id, "reporte de map tardío, ignorado");
            return false;
        }

        let mut seen = vec![false; self.n_reduce];
        for file in files {
            let p = match parse_intermediate(file) {
                Some((map_id, p)) if map_id == id && p < self.n_reduce => p,
                _ => {
                    warn!(task_id = id, file = %file, "archivo intermedio inválido o de otro map");
                    continue;
                }
            };
            if seen[p] {
                warn!(task_id = id, file = %file, partition = p, "partición repetida en el reporte");
                continue;
            }
            seen[p] = true;

            self.partitions[p].push(file.clone());

            if self.partitions[p].len() == self.map_tasks {
                let reduce_id = self.alloc_id();
                info!(partition = p, task_id = reduce_id, "partición completa, encolando reduce");
                self.idle.push_back(Job::Reduce(Task {
                    id: reduce_id,
                    inputs: self.partitions[p].clone(),
                    n_reduce: self.n_reduce,
                }));
            }
        }

        true
    }

    /// `ReduceDone`: saca `id` de `in_progress` si estaba.
    pub fn reduce_done(&mut self, id: TaskId) -> bool {
        let accepted = self.in_progress.remove(&id).is_some();
        if !accepted {
            debug!(task_id = id, "reporte de reduce tardío, ignorado");
        }
        accepted
    }

    pub fn done(&self) -> bool {
        self.idle.is_empty() && self.in_progress.is_empty()
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            map_tasks: self.map_tasks,
            n_reduce: self.n_reduce,
            idle: self.idle.len(),
            in_progress: self.in_progress.len(),
            done: self.done(),
        }
    }

    pub fn is_in_progress(&self, id: TaskId) -> bool {
        self.in_progress.contains_key(&id)
    }

    /// Archivos intermedios acumulados para la partición `p`.
    pub fn partition_files(&self, p: usize) -> &[String] {
        self.partitions.get(p).map(Vec::as_slice).unwrap_or(&[])
    }
}
