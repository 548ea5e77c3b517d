use serde::{Deserialize, Serialize};

/// Identificador asignado por el coordinador. Único al crearse, pero una
/// tarea reencolada por lease vencido recibe uno nuevo.
pub type TaskId = u64;

/// Unidad de trabajo despachable (map o reduce).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Archivos de entrada: splits para un map, intermedios para un reduce
    pub inputs: Vec<String>,
    /// Número de particiones de reduce, fijo para todo el job
    pub n_reduce: usize,
}

/// Respuesta a `TaskRequest`: qué tiene que hacer el worker ahora.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "task", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Job {
    Map(Task),
    Reduce(Task),
    /// No hay trabajo libre pero quedan tareas en vuelo: reintentar luego
    Wait,
    /// Todo terminado: el worker debe salir
    Exit,
}

impl Job {
    /// La tarea que lleva el job, si es despachable.
    pub fn task(&self) -> Option<&Task> {
        match self {
            Job::Map(t) | Job::Reduce(t) => Some(t),
            Job::Wait | Job::Exit => None,
        }
    }

    pub fn id(&self) -> Option<TaskId> {
        self.task().map(|t| t.id)
    }

    /// Copia equivalente (mismo tipo, entradas y particiones) con otro id.
    pub fn with_id(&self, id: TaskId) -> Job {
        match self {
            Job::Map(t) => Job::Map(Task { id, ..t.clone() }),
            Job::Reduce(t) => Job::Reduce(Task { id, ..t.clone() }),
            Job::Wait => Job::Wait,
            Job::Exit => Job::Exit,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Job::Map(_) => "map",
            Job::Reduce(_) => "reduce",
            Job::Wait => "wait",
            Job::Exit => "exit",
        }
    }
}
