//! # Sanad: bilingual retrieval-augmented assistant
//!
//! Usage:
//!   sanad ask "When is Event A?"         # One-shot answer
//!   sanad set-corpus ./faq.txt --build   # Replace the corpus and index it
//!   sanad status                         # Config, corpus and index summary
//!   sanad chat                           # Interactive conversation on stdin
//!   sanad reply 201000000000 "متى يبدأ التسجيل؟"  # Answer over WhatsApp

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sanad_channels::{
    ConversationHandler, FileAboutText, FileCorpusSource, JsonSeenStore, StdoutSink, WhatsAppSink,
};
use sanad_core::traits::DeliverySink;
use sanad_core::SanadConfig;
use sanad_core::traits::CorpusSource;
use sanad_core::types::{IncomingMessage, LanguageTag};
use sanad_knowledge::{Chunker, Retriever};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sanad",
    version,
    about = "🤖 Sanad — bilingual (English/Arabic) answers from your own corpus"
)]
struct Cli {
    /// Config file (default: ~/.sanad/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question from the corpus
    Ask {
        /// The question, in English or Arabic
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show configuration, corpus and index state
    Status {
        /// Also build the index to check the embedding provider
        #[arg(long)]
        build: bool,
    },
    /// Replace the corpus text with the contents of a file
    SetCorpus {
        file: PathBuf,
        /// Build the index right away instead of on the first question
        #[arg(long)]
        build: bool,
    },
    /// Replace the welcome/about text for one language
    SetAbout {
        /// `en` or `ar`
        language: String,
        file: PathBuf,
    },
    /// Forget which conversations were already welcomed
    ClearSeen,
    /// Chat interactively through the full conversation flow
    Chat {
        /// Conversation id used for the session
        #[arg(long, default_value = "cli")]
        id: String,
    },
    /// Handle one inbound WhatsApp message and reply through the Cloud API
    Reply {
        /// Sender's WhatsApp number
        from: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Send a text to a WhatsApp number, split to the message size cap
    Send {
        to: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn load_config(path: Option<&str>) -> Result<SanadConfig> {
    let config = match path {
        Some(p) => SanadConfig::load_from(&expand_path(p))?,
        None => SanadConfig::load()?,
    };
    Ok(config)
}

fn parse_language(s: &str) -> Result<LanguageTag> {
    match s.trim().to_lowercase().as_str() {
        "en" | "english" => Ok(LanguageTag::En),
        "ar" | "arabic" => Ok(LanguageTag::Ar),
        other => anyhow::bail!("Invalid language '{other}'. Use \"en\" or \"ar\""),
    }
}

/// Wire the retrieval pipeline from config. A generator that cannot be
/// created leaves the pipeline extractive.
fn build_retriever(config: &SanadConfig, data_dir: &Path) -> Result<Arc<Retriever>> {
    let corpus = Arc::new(FileCorpusSource::new(data_dir));
    let embedder = sanad_providers::create_embedder(&config.embedding)?;
    let generator = match sanad_providers::create_generator(&config.llm) {
        Ok(generator) => Some(generator),
        Err(e) => {
            tracing::warn!("⚠️ No generative model ({e}), answering from retrieved text only");
            None
        }
    };
    Ok(Arc::new(Retriever::from_config(config, corpus, embedder, generator)))
}

fn build_handler(
    config: &SanadConfig,
    data_dir: &Path,
    sink: Arc<dyn DeliverySink>,
) -> Result<ConversationHandler> {
    let retriever = build_retriever(config, data_dir)?;
    Ok(ConversationHandler::new(
        retriever,
        Arc::new(JsonSeenStore::open(data_dir)),
        sink,
        FileAboutText::new(data_dir),
        config.identity.clone(),
    )
    .with_part_delay(Duration::from_millis(config.whatsapp.part_delay_ms)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sanad=debug,sanad_core=debug,sanad_providers=debug,sanad_knowledge=debug,sanad_channels=debug"
    } else {
        "sanad=info,sanad_core=info,sanad_providers=info,sanad_knowledge=info,sanad_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let data_dir = config.data.resolved_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    match cli.command {
        Commands::Ask { query } => {
            let retriever = build_retriever(&config, &data_dir)?;
            let outcome = retriever.answer_with_outcome(&query.join(" ")).await?;
            println!("{}", outcome.reply);
            tracing::debug!("Reply tier: {}", outcome.tier);
        }

        Commands::Status { build } => {
            let corpus = FileCorpusSource::new(&data_dir);
            let text = corpus.corpus_text().await?;
            let chunks = Chunker::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap).chunk(&text);
            let seen = JsonSeenStore::open(&data_dir).stats().await;

            println!("🤖 Sanad v{}", env!("CARGO_PKG_VERSION"));
            println!("   🧠 LLM:        {} ({})", config.llm.provider, config.llm.model);
            println!("   🔢 Embeddings: {} ({})", config.embedding.provider, config.embedding.model);
            println!("   📂 Data Dir:   {}", data_dir.display());
            println!("   📄 Corpus:     {} chars, {} chunks", text.chars().count(), chunks.len());
            println!("   💬 Seen chats: {} (updated {})", seen.seen_chats, seen.last_updated.to_rfc3339());

            if build {
                let retriever = build_retriever(&config, &data_dir)?;
                match retriever.rebuild().await {
                    Ok(status) => println!(
                        "   ✅ Index:      {:?}, {} chunks, {} vectors",
                        status.state, status.chunk_count, status.vector_count
                    ),
                    Err(e) => println!("   ❌ Index:      build failed: {e}"),
                }
            }
        }

        Commands::SetCorpus { file, build } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let retriever = build_retriever(&config, &data_dir)?;
            retriever.set_corpus_text(&text).await?;
            println!("✅ Corpus updated ({} chars)", text.chars().count());

            if build {
                let status = retriever.rebuild().await?;
                println!("   Indexed {} chunks", status.chunk_count);
            }
        }

        Commands::SetAbout { language, file } => {
            let language = parse_language(&language)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            FileAboutText::new(&data_dir).set(language, &text).await?;
            println!("✅ About text updated ({language})");
        }

        Commands::ClearSeen => {
            JsonSeenStore::open(&data_dir).clear().await?;
            println!("✅ Cleared all seen chats");
        }

        Commands::Chat { id } => {
            let handler = build_handler(&config, &data_dir, Arc::new(StdoutSink))?;

            println!("💬 Type a message (Ctrl-D to quit)\n");
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                let outcome = handler
                    .handle_message(&IncomingMessage::direct(id.as_str(), line))
                    .await?;
                tracing::debug!("Handled as {outcome:?}");
            }
        }

        Commands::Reply { from, text } => {
            let sink = Arc::new(WhatsAppSink::new(&config.whatsapp)?);
            let handler = build_handler(&config, &data_dir, sink)?;
            let outcome = handler
                .handle_message(&IncomingMessage::direct(from.as_str(), text.join(" ")))
                .await?;
            println!("✅ {from}: {outcome:?}");
        }

        Commands::Send { to, text } => {
            let sink = Arc::new(WhatsAppSink::new(&config.whatsapp)?);
            let handler = build_handler(&config, &data_dir, sink)?;
            handler.deliver(&to, &text.join(" ")).await?;
            println!("✅ Sent to {to}");
        }
    }

    Ok(())
}
