use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::config::master_base_url;
use common::rpc::STATUS_PATH;
use common::StatusResponse;
use reqwest::Client;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para consultar al coordinador")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Muestra cuántas tareas quedan y si el job terminó
    Status,
    /// Espera hasta que el job termine
    Wait {
        /// Segundos entre consultas
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
}

async fn fetch_status(client: &Client, base_url: &str) -> Result<StatusResponse> {
    let url = format!("{}{}", base_url, STATUS_PATH);
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinador en {}", base_url))?
        .error_for_status()?;
    Ok(resp.json().await?)
}

fn print_status(status: &StatusResponse) {
    println!("Job:");
    println!("  maps: {}", status.map_tasks);
    println!("  particiones: {}", status.n_reduce);
    println!("  pendientes: {}", status.idle);
    println!("  en vuelo: {}", status.in_progress);
    println!("  terminado: {}", status.done);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = master_base_url();

    match cli.command {
        Commands::Status => {
            let status = fetch_status(&client, &base_url).await?;
            print_status(&status);
        }
        Commands::Wait { interval } => loop {
            let status = fetch_status(&client, &base_url).await?;
            if status.done {
                println!("Job terminado");
                break;
            }
            println!(
                "esperando: {} pendientes, {} en vuelo",
                status.idle, status.in_progress
            );
            tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
        },
    }

    Ok(())
}
