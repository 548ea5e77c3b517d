//! Worker MapReduce: pide tareas al coordinador, las ejecuta sobre el
//! directorio compartido y reporta el resultado.

pub mod client;
pub mod config;
pub mod worker;

pub use client::RpcClient;
pub use config::WorkerConfig;
pub use worker::Worker;
