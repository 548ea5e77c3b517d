//! Tipos compartidos entre coordinador, workers y cliente, más el motor
//! que ejecuta los maps y reduces en disco.

pub mod apps;
pub mod config;
pub mod engine;
pub mod job;
pub mod rpc;

pub use apps::{KeyValue, MapFn, ReduceFn, Workload};
pub use job::{Job, Task, TaskId};
pub use rpc::{
    MapDoneRequest, ReduceDoneRequest, ReportReply, StatusResponse, TaskReply, TaskRequest,
};
