//! Aplicaciones MapReduce que los workers pueden ejecutar.
//!
//! Una aplicación es un par de funciones puras (`map`, `reduce`). El
//! coordinador no sabe nada de ellas; cada worker se lanza con una.

use serde::{Deserialize, Serialize};

pub mod indexer;
pub mod wc;

/// Par clave/valor emitido por `map` y consumido por `reduce`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `map(nombre_de_entrada, contenido) -> pares`
pub type MapFn = fn(input: &str, contents: &str) -> Vec<KeyValue>;

/// `reduce(clave, valores) -> valor de salida`
pub type ReduceFn = fn(key: &str, values: &[String]) -> String;

#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/// Busca una aplicación por nombre (`wc`, `indexer`).
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "wc" => Some(Workload {
            map_fn: wc::map,
            reduce_fn: wc::reduce,
        }),
        "indexer" => Some(Workload {
            map_fn: indexer::map,
            reduce_fn: indexer::reduce,
        }),
        _ => None,
    }
}
