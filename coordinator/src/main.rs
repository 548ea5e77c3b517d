use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, time::sleep};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coordinator::{inputs::expand_inputs, Coordinator, DEFAULT_LEASE};

#[derive(Parser, Debug)]
#[command(name = "coordinator")]
#[command(about = "Coordinador MapReduce: reparte tareas y espera a que el job termine")]
struct Args {
    /// Endpoint donde escuchan las RPC de los workers
    #[arg(long, env = "MR_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Número de particiones de reduce
    #[arg(long, env = "MR_N_REDUCE", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    n_reduce: u64,

    /// Segundos que una tarea puede estar asignada sin reportar
    #[arg(long, env = "MR_LEASE_SECS", default_value_t = DEFAULT_LEASE.as_secs())]
    lease_secs: u64,

    /// Segundos que se sigue respondiendo Exit tras terminar el job
    #[arg(long, default_value_t = 3)]
    grace_secs: u64,

    /// Archivos o patrones glob de entrada (un map por archivo)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        warn!("no hay archivos de entrada, el job termina sin tareas");
    }

    let state = Coordinator::new(
        files.clone(),
        args.n_reduce as usize,
        Duration::from_secs(args.lease_secs),
    );

    // si no se puede abrir el endpoint no hay job posible
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", args.bind))?;
    info!(
        "coordinador escuchando en {} ({} maps, {} reduces, lease {}s)",
        listener.local_addr()?,
        files.len(),
        args.n_reduce,
        args.lease_secs
    );

    let server = tokio::spawn(coordinator::serve(listener, state.clone()));

    loop {
        if state.done() {
            break;
        }
        if server.is_finished() {
            bail!("el servidor RPC terminó antes que el job");
        }
        sleep(Duration::from_secs(1)).await;
    }

    info!("job terminado, respondiendo Exit durante {}s", args.grace_secs);
    sleep(Duration::from_secs(args.grace_secs)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_por_defecto_es_el_del_coordinador() {
        let args = Args::try_parse_from(["coordinator", "pg-0.txt"]).unwrap();
        assert_eq!(Duration::from_secs(args.lease_secs), DEFAULT_LEASE);
    }
}
