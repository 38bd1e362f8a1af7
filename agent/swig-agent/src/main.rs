use anyhow::{bail, Context as _};
use clap::Parser;
use std::sync::Arc;
use swig_agent::{Agent, AgentConfig, EnvSettings, Message, OperationKind};
use swig_sdk::RpcConnection;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run one message through the Swig wallet agent and print the reply as JSON.
#[derive(Parser, Debug)]
#[command(name = "swig-agent", version, about)]
struct Cli {
    /// The message, e.g. "transfer 1 SOL to swig"
    #[arg(required = true, num_args = 1..)]
    message: Vec<String>,

    /// Run this action instead of the first one the message matches
    #[arg(long)]
    action: Option<OperationKind>,

    /// Print the matching actions without running anything
    #[arg(long)]
    list: bool,

    /// Source tag echoed in the reply
    #[arg(long, default_value = "cli")]
    source: String,

    #[arg(long, env = "SOLANA_RPC_URL")]
    rpc_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swig_agent=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let text = cli.message.join(" ");

    let mut config =
        AgentConfig::from_settings(&EnvSettings).context("failed to load agent settings")?;
    if let Some(url) = cli.rpc_url {
        config = config.with_rpc_url(url);
    }

    let connection = Arc::new(RpcConnection::new(config.rpc_url.clone(), config.commitment));
    info!(rpc = %connection.url(), "connected");
    let agent = Agent::new(config, connection);

    let matching = agent.matching_actions(&text);
    if cli.list {
        let names: Vec<&str> = matching.iter().map(|kind| kind.name()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    let message = Message::new(text, cli.source);
    let response = match cli.action {
        Some(kind) => agent.handle(kind, &message).await,
        None => match agent.dispatch(&message).await {
            Some(response) => response,
            None => bail!("no Swig action matches {:?}", message.text),
        },
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
