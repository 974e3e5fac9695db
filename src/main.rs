use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;

use gcs_resource::config::StorageSettings;
use gcs_resource::logging::{self, LogSettings};
use gcs_resource::resource::models::{CheckRequest, InRequest, OutRequest};
use gcs_resource::resource::{CheckCommand, InCommand, OutCommand};
use gcs_resource::storage::GcsStorage;

#[derive(Parser)]
#[command(name = "gcs-resource")]
#[command(version, about = "Track, fetch and publish versioned artifacts in Google Cloud Storage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report versions newer than the one given on stdin
    Check,
    /// Fetch the version given on stdin into DEST
    In { dest: PathBuf },
    /// Publish a file found under SOURCE
    Out { source: PathBuf },
}

fn read_request<T: DeserializeOwned>() -> anyhow::Result<T> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading request from stdin")?;
    serde_json::from_str(&input).context("parsing request")
}

fn write_response<T: Serialize>(response: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response).context("writing response")?;
    writeln!(stdout).context("writing response")
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Check => {
            let request: CheckRequest = read_request()?;
            let storage = GcsStorage::new(&StorageSettings::from(&request.source))?;
            let versions = CheckCommand::new(&storage).run(&request).await?;
            write_response(&versions)
        }
        Command::In { dest } => {
            let request: InRequest = read_request()?;
            let storage = GcsStorage::new(&StorageSettings::from(&request.source))?;
            let response = InCommand::new(&storage).run(&dest, &request).await?;
            write_response(&response)
        }
        Command::Out { source } => {
            let request: OutRequest = read_request()?;
            let storage = GcsStorage::new(&StorageSettings::from(&request.source))?;
            let response = OutCommand::new(&storage).run(&source, &request).await?;
            write_response(&response)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&LogSettings::from_env());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command))
}
