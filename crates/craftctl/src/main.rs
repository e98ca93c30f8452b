//! Interactive console for a single cloud-hosted Minecraft server instance.
//!
//! Reads the access key file once at startup, checks the instance, then
//! hands control to a blocking read-eval-print loop on stdin.

mod console;
mod format;

use std::io::Write;

use anyhow::Result;
use craftctl_cloud::{AliyunEcsClient, CloudControlError, Credentials, DEFAULT_CREDENTIALS_PATH};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::console::{CommandOutcome, Console};
use crate::format as fmt;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("{}", fmt::header("Minecraft server console"));
    println!("Checking instance state...");

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let console = match boot().await {
        Ok(console) => console,
        Err(e) => {
            // The startup describe is the only fatal failure path: a console
            // that cannot reach its instance is useless.
            println!("{}", fmt::error(&e.to_string()));
            println!("Press Enter to exit.");
            let _ = input.next_line().await;
            return Ok(());
        }
    };

    println!("Type {} for the list of commands.", fmt::entity("help"));
    run_loop(&console, &mut input).await?;

    Ok(())
}

async fn boot() -> Result<Console<AliyunEcsClient>, CloudControlError> {
    let credentials = Credentials::load(DEFAULT_CREDENTIALS_PATH)?;
    debug!(
        instance_id = %credentials.instance_id,
        region_id = %credentials.region_id,
        "credentials loaded"
    );

    let client = AliyunEcsClient::new(&credentials)?;
    let console = Console::new(client, credentials.instance_id);

    println!("{}\n", console.status().await?);
    Ok(console)
}

async fn run_loop(
    console: &Console<AliyunEcsClient>,
    input: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        // None means stdin closed; treat it like exit.
        let Some(line) = input.next_line().await? else {
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match console.dispatch(line).await {
            CommandOutcome::Reply(text) => println!("{}\n", text),
            CommandOutcome::Exit(text) => {
                println!("{}", text);
                break;
            }
        }
    }

    Ok(())
}
