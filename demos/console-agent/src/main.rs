//! Console Agent
//!
//! Chats with the demo agent on the terminal. Menus are printed with numbered
//! entries; type a number to tap one, or `!<action-id>` to send any intent.
//!
//! ```bash
//! cargo run --package console-agent
//! cargo run --package console-agent -- mentions "gm @alice and @vitalik.eth" --offline
//! cargo run --package console-agent -- balance 0x...
//! ```
//!
//! Settings come from `tapkit.toml` / `TAPKIT_*` variables; `WEB3_BIO_API_KEY`
//! and `NETWORK_ID` from `.env` are honoured too.

mod agent;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tapkit::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::agent::{DemoAgent, default_app};
use crate::console::ConsoleConversation;

const CONVERSATION_ID: &str = "console";
const USER_INBOX: &str = "console-user";
const AGENT_INBOX: &str = "console-agent";
const DEFAULT_SENDER: &str = "0x1111111111111111111111111111111111111111";
const DEFAULT_AGENT: &str = "0x2222222222222222222222222222222222222222";

#[derive(Parser)]
#[command(name = "console-agent", about = "Chat with an inline actions agent")]
struct Cli {
    /// Configuration file, instead of searching for `tapkit.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `dev` or `prod`.
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat (the default).
    Chat {
        /// Your wallet address, used as the sender of transfers.
        #[arg(long, default_value = DEFAULT_SENDER)]
        sender: String,
        /// Address that receives transfers and tips.
        #[arg(long, default_value = DEFAULT_AGENT)]
        agent: String,
    },
    /// Lists the mentions in a message and resolves them.
    Mentions {
        text: String,
        /// Only extract, skip lookups.
        #[arg(long)]
        offline: bool,
    },
    /// Shows the Farcaster profile behind a name or address.
    Profile { name: String },
    /// Prints the wallet request for a USDC transfer.
    Transfer {
        from: String,
        to: String,
        /// Human readable amount, e.g. `0.5`.
        amount: String,
    },
    /// Reads a USDC balance.
    Balance { address: String },
}

fn load_config(cli: &Cli) -> Result<TapkitConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(profile) = &cli.profile {
        loader = loader.profile(profile);
    }
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    loader.load().context("loading configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    let command = cli.command.unwrap_or(Command::Chat {
        sender: DEFAULT_SENDER.into(),
        agent: DEFAULT_AGENT.into(),
    });

    match command {
        Command::Chat { sender, agent } => {
            config.app.get_or_insert_with(default_app);
            chat(config, sender, agent).await
        }
        Command::Mentions { text, offline } => {
            let mentions = extract_mentions(&text);
            if offline || mentions.is_empty() {
                for mention in mentions {
                    println!("{mention}");
                }
                return Ok(());
            }
            let services = AgentServices::from_config(&config)?;
            for (identifier, address) in services.resolver.resolve_mentions_in_message(&text, None).await {
                println!("{identifier} → {}", address.as_deref().unwrap_or("not found"));
            }
            Ok(())
        }
        Command::Profile { name } => {
            let services = AgentServices::from_config(&config)?;
            let profile = services.profiles.fetch_farcaster_profile(&name).await;
            if profile.is_empty() {
                println!("No Farcaster profile for {name}");
            } else {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
            Ok(())
        }
        Command::Transfer { from, to, amount } => {
            let services = AgentServices::from_config(&config)?;
            let usdc = &services.usdc;
            let value = to_base_units(&amount, usdc.network().decimals)?;
            let calls = usdc.create_transfer_calls(&from, &to, value)?;
            println!("{}", serde_json::to_string_pretty(&calls)?);
            Ok(())
        }
        Command::Balance { address } => {
            let services = AgentServices::from_config(&config)?;
            let balance = services.usdc.get_balance(&address).await?;
            println!("{balance} USDC on {}", services.usdc.network().network_name);
            Ok(())
        }
    }
}

async fn chat(config: TapkitConfig, sender: String, agent_address: String) -> Result<()> {
    let services = AgentServices::from_config(&config)?;
    let agent = DemoAgent::new(services, agent_address.clone());
    let runtime = AgentRuntime::from_config(agent.dispatcher(), config);
    runtime.install_configured_app(agent.handlers());

    let conversation = Arc::new(ConsoleConversation::new(
        CONVERSATION_ID,
        vec![
            Member::with_address(USER_INBOX, sender.clone()),
            Member::with_address(AGENT_INBOX, agent_address),
        ],
    ));

    println!("Type /help for the menu, a number to pick an entry, `quit` to leave.");

    let (tx, rx) = runtime.channel();
    tokio::spawn(read_stdin(Arc::clone(&conversation), sender, tx));

    let stats = runtime.run(rx).await;
    println!(
        "Bye! {} messages, {} taps ({} failed).",
        stats.received, stats.intents, stats.failed_intents
    );
    Ok(())
}

async fn read_stdin(
    conversation: Arc<ConsoleConversation>,
    sender: String,
    tx: mpsc::Sender<Incoming>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let content = conversation.parse_input(line);
        let message = InboundMessage::new(conversation.id(), USER_INBOX, content)
            .with_sender_address(sender.as_str());
        let boxed: BoxedConversation = conversation.clone();
        if tx.send((message, boxed)).await.is_err() {
            break;
        }
    }
}
