use std::path::PathBuf;

use clap::Parser;
use lumen_display_shared::ControlEvent;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use tokio::io::AsyncReadExt;

use display::Display;
use printer::VirtualPrinter;
use rest::serve_rest_endpoint;

mod display;
mod pages;
mod printer;
mod rest;

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    port: u16,
    log_location: PathBuf,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

impl Args {
    async fn get_config_file(&self) -> Configuration {
        let config = File::open(&self.config).await.unwrap();
        let mut config_file = String::new();
        BufReader::new(config)
            .read_to_string(&mut config_file)
            .await
            .unwrap();
        serde_yaml::from_str::<Configuration>(&config_file).unwrap()
    }
}

#[tokio::main(worker_threads = 2)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lumen_server=debug")),
        )
        .init();

    let args = Args::parse();
    let config = args.get_config_file().await;

    let display = Display::new();
    let (events_tx, events_rx) = mpsc::channel::<ControlEvent>(100);

    let printer_display = display.clone();
    tokio::task::spawn(async move { VirtualPrinter::new(printer_display, events_rx).run().await });

    serve_rest_endpoint(display, events_tx, &config).await;
}

#[cfg(test)]
mod test {
    use super::*;
    #[tokio::test]
    pub async fn deserializes_sample_config() {
        let config = File::open("config-sample.yaml").await.unwrap();
        let mut config_file = String::new();
        BufReader::new(config)
            .read_to_string(&mut config_file)
            .await
            .unwrap();
        serde_yaml::from_str::<Configuration>(&config_file).unwrap();
    }
}
