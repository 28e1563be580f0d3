//! convmem - conversational memory log CLI
//!
//! Thin host over `convmem_core::ConversationMemory`.
//!
//! ## Commands
//!
//! - `record`: append one turn to a conversation
//! - `turn`: print the current context, then log a user message and its reply
//! - `context`: print the recent-memory block for a conversation
//! - `recent-files`: list the newest record names of a conversation
//! - `scan`: dump stored events as JSON lines

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use convmem_core::{
    sort_events, Author, ConversationMemory, EventDraft, EventKind, EventStore, FsEventStore,
    MemoryConfig, RecencyWindow, METRICS,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "convmem")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bounded conversational memory log", long_about = None)]
struct Cli {
    /// Store root (records live under <data-dir>/events)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct WindowArgs {
    /// Keep at most this many events (default: CONVMEM_MAX_ENTRIES or 10)
    #[arg(long)]
    max_entries: Option<usize>,

    /// Drop events older than this many days (default: CONVMEM_MAX_DAYS or 2)
    #[arg(long)]
    max_days: Option<u32>,
}

impl WindowArgs {
    fn resolve(self, base: RecencyWindow) -> RecencyWindow {
        RecencyWindow::new(
            self.max_entries.unwrap_or(base.max_entries),
            self.max_days.unwrap_or(base.max_days),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Append one turn and print the stored event
    Record {
        /// Conversation the turn belongs to
        #[arg(short, long)]
        conversation: String,

        /// Turn kind: user | bot
        #[arg(short, long, default_value = "user")]
        kind: EventKind,

        /// Message body
        #[arg(short, long)]
        text: String,

        /// Author display name
        #[arg(short, long)]
        author: Option<String>,

        /// Stable author identity (account id)
        #[arg(long)]
        identity: Option<String>,

        /// Backend that produced a bot reply (default: AI_MODEL)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the context for a message, then log the message and the reply
    Turn {
        #[arg(short, long)]
        conversation: String,

        /// Incoming user message
        #[arg(short, long)]
        text: String,

        /// Reply that was sent back
        #[arg(short, long)]
        reply: String,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Print the recent-memory block for a conversation
    Context {
        #[arg(short, long)]
        conversation: String,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// List the newest record names of a conversation
    RecentFiles {
        #[arg(short, long)]
        conversation: String,

        /// Number of records to list
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Print stored events as JSON lines, oldest first
    Scan {
        /// Only events of this conversation
        #[arg(short, long)]
        conversation: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    convmem_core::init_tracing(cli.json, level);

    let mut config = MemoryConfig::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let memory = ConversationMemory::from_config(&config);

    let result = match cli.command {
        Commands::Record {
            conversation,
            kind,
            text,
            author,
            identity,
            model,
        } => {
            let draft = EventDraft::new(
                kind,
                conversation,
                author_of(author, identity),
                text,
                model.or_else(|| config.model_tag.clone()),
            );
            cmd_record(&memory, draft).await
        }
        Commands::Turn {
            conversation,
            text,
            reply,
            author,
            model,
            window,
        } => {
            let model = model.or_else(|| config.model_tag.clone());
            cmd_turn(
                &memory,
                &conversation,
                &text,
                &reply,
                author_of(author, None),
                model,
                window.resolve(config.window),
            )
            .await
        }
        Commands::Context {
            conversation,
            window,
        } => cmd_context(&memory, &conversation, window.resolve(config.window)).await,
        Commands::RecentFiles {
            conversation,
            limit,
        } => cmd_recent_files(&memory, &conversation, limit),
        Commands::Scan { conversation } => cmd_scan(&config, conversation.as_deref()),
    };

    METRICS.flush();
    result
}

fn author_of(name: Option<String>, identity: Option<String>) -> Option<Author> {
    if name.is_none() && identity.is_none() {
        return None;
    }
    Some(Author { name, identity })
}

async fn cmd_record(memory: &ConversationMemory, draft: EventDraft) -> Result<()> {
    let event = memory
        .append_async(draft)
        .await
        .context("Failed to record turn")?;
    info!(id = %event.id, "turn recorded");
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// Mirrors a chat host: the context is produced (and the reply delivered)
/// before the audit writes, and each write stands alone.
async fn cmd_turn(
    memory: &ConversationMemory,
    conversation: &str,
    text: &str,
    reply: &str,
    author: Option<Author>,
    model: Option<String>,
    window: RecencyWindow,
) -> Result<()> {
    let context = memory
        .recent_context_async(conversation, window)
        .await
        .context("Failed to read recent context")?;
    println!("{context}");

    let drafts = [
        EventDraft::user_message(conversation, author, text),
        EventDraft::bot_reply(conversation, reply, model),
    ];

    let mut failures = 0;
    for draft in drafts {
        let kind = draft.kind;
        if let Err(e) = memory.append_async(draft).await {
            warn!(kind = %kind, error = %e, "audit write failed");
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of 2 audit writes failed");
    }
    Ok(())
}

async fn cmd_context(
    memory: &ConversationMemory,
    conversation: &str,
    window: RecencyWindow,
) -> Result<()> {
    let context = memory
        .recent_context_async(conversation, window)
        .await
        .context("Failed to read recent context")?;
    println!("{context}");
    Ok(())
}

fn cmd_recent_files(memory: &ConversationMemory, conversation: &str, limit: usize) -> Result<()> {
    let names = memory
        .recent_record_names(conversation, limit)
        .context("Failed to list recent records")?;
    if names.is_empty() {
        println!("No records for conversation {conversation}.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn cmd_scan(config: &MemoryConfig, conversation: Option<&str>) -> Result<()> {
    let store = FsEventStore::new(&config.data_dir);
    let mut events = store
        .scan_all()
        .with_context(|| format!("Failed to scan {:?}", store.events_dir()))?;
    if let Some(conversation) = conversation {
        events.retain(|e| e.conversation_id == conversation);
    }
    sort_events(&mut events);

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
