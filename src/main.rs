use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gdrive_fetch::{
    google_drive::{oauth, OAuthClient},
    Config, Downloader, StdinPrompt,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fetch single Google Drive files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the OAuth consent flow once and store the token
    Setup {
        #[arg(long, default_value = "credentials.json")]
        credentials: PathBuf,

        #[arg(long, default_value = "token.json")]
        token: PathBuf,

        /// Comma separated scopes, asked for interactively when omitted
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
    },

    /// Download one file using a JSON config
    Fetch {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        file_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Setup {
            credentials,
            token,
            scopes,
        } => setup(credentials, token, scopes).await,
        Command::Fetch { config, file_id } => fetch(config, file_id).await,
    }
}

async fn setup(credentials: PathBuf, token: PathBuf, scopes: Vec<String>) -> anyhow::Result<()> {
    if !tokio::fs::try_exists(&credentials).await.unwrap_or(false) {
        anyhow::bail!(
            "{} not found. Download it from the Google Cloud console and try again.",
            credentials.display()
        );
    }

    let scopes = match scopes.is_empty() {
        true => ask("Enter the scopes: ")
            .await?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        false => scopes,
    };

    let client = OAuthClient::from_file(&credentials).await?;
    let t = oauth::consent(&client, &scopes, &StdinPrompt)
        .await
        .context("Error retrieving access token")?;

    oauth::save_token(&token, &t)
        .await
        .with_context(|| format!("Could not write token to '{}'", token.display()))?;

    println!("Token stored to {}", token.display());
    println!("Installation complete");

    Ok(())
}

async fn fetch(config: PathBuf, file_id: String) -> anyhow::Result<()> {
    let config = Config::from_file(&config).await?;
    let result = Downloader::new(config)?.download(&file_id).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

async fn ask(question: &str) -> anyhow::Result<String> {
    let mut out = tokio::io::stdout();
    out.write_all(question.as_bytes()).await?;
    out.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .with_context(|| "Could not read from stdin")?;

    Ok(line)
}
