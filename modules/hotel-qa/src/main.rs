use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ai_client::OpenAi;
use anyhow::{Context, Result};
use clap::Parser;
use hotel_qa_core::file_config::load_config;
use hotel_qa_core::prompt::{load_system_prompt, SYSTEM_PROMPT};
use hotel_qa_core::{AppConfig, ChatSession, DatasetStore, TranscriptEntry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Ask questions about the hotel dataset in plain language.
#[derive(Debug, Parser)]
#[command(name = "hotel-qa", version)]
struct Args {
    /// TOML config file with model, dataset and agent settings
    #[arg(long, env = "HOTEL_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Hotel CSV file (overrides HOTELS_CSV and the config file)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Chat model name
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tool rounds per question
    #[arg(long)]
    max_tool_rounds: Option<usize>,

    /// Answer a single question and exit
    #[arg(long, short)]
    query: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before tracing so RUST_LOG set there takes effect.
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_json)?;

    if let Err(e) = run(args).await {
        error!(error = %format!("{e:#}"), "hotel-qa failed to start");
        return Err(e);
    }
    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "hotel_qa=info,hotel_qa_core=info";

/// `RUST_LOG` replaces the default filter entirely when it is set and valid.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing(json: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Resolve configuration in order: env, then config file, then CLI flags.
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;

    if let Some(ref path) = args.config {
        let file = load_config(path)?;
        config = config.with_file(&file)?;
    }

    if let Some(ref data) = args.data {
        config.hotels_csv = data.clone();
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(rounds) = args.max_tool_rounds {
        config.max_tool_rounds = rounds;
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    config.log_keys();

    let store = DatasetStore::new(&config.hotels_csv);
    let dataset = store.load()?;

    let system_prompt = match config.system_prompt_path {
        Some(ref path) => load_system_prompt(path)?,
        None => SYSTEM_PROMPT.to_string(),
    };

    let mut model = OpenAi::new(&config.openai_api_key, &config.model)
        .with_temperature(config.temperature);
    if let Some(ref url) = config.openai_base_url {
        model = model.with_base_url(url);
    }

    let mut session = ChatSession::builder(Arc::new(model), dataset)
        .system_prompt(system_prompt)
        .max_tool_rounds(config.max_tool_rounds)
        .build();

    info!(model = %config.model, "Hotel QA assistant ready");

    if let Some(ref question) = args.query {
        let reply = session.send(question).await;
        println!("{}", reply.text());
        if reply.is_error() {
            anyhow::bail!("question could not be answered");
        }
        return Ok(());
    }

    chat(&mut session).await
}

async fn chat(session: &mut ChatSession) -> Result<()> {
    println!("Hotel QA Agent");
    println!("--------------");
    println!("Ask about hotels in the dataset, e.g. \"cleanest 4-star hotels in Paris\".");
    println!("Type '/clear' to start over, 'exit' or Ctrl-D to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        if line == "/clear" {
            session.clear();
            println!("Conversation cleared.\n");
            continue;
        }

        match session.send(line).await {
            TranscriptEntry::Error(notice) => eprintln!("Assistant: {notice}\n"),
            reply => println!("Assistant: {}\n", reply.text()),
        }
    }

    println!("Goodbye!");
    Ok(())
}
