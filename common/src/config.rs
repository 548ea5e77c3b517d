use std::{env, str::FromStr};

pub const DEFAULT_MASTER_URL: &str = "http://127.0.0.1:8080";

/// URL base del coordinador.
/// - `MASTER_URL` si está definida
/// - si no, http://127.0.0.1:8080 (el mismo endpoint fijo que usa el coordinador)
pub fn master_base_url() -> String {
    env::var("MASTER_URL").unwrap_or_else(|_| DEFAULT_MASTER_URL.to_string())
}

/// Lee una variable de entorno y la parsea; si no existe o no parsea,
/// devuelve `default`.
pub fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}
