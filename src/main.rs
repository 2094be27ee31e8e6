use std::path::PathBuf;

use anyhow::{Context, bail};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsmood::{Config, NewsItem, SentimentClassifier};

const USAGE: &str = "usage: newsmood [--config <path>] [demo]";

/// Sample items with the label a reasonable model should produce.
const DEMO_ITEMS: &[(&str, &str, &str)] = &[
    (
        "Groundbreaking Discovery Promises Cure for Major Disease",
        "Scientists today announced a revolutionary breakthrough that could lead to a complete cure for a widespread ailment, bringing hope to millions worldwide.",
        "positive",
    ),
    (
        "Global Markets Plunge Amidst Economic Uncertainty",
        "Stock markets around the world experienced a sharp decline today as investors reacted to growing fears of an impending recession and geopolitical tensions.",
        "negative",
    ),
    (
        "City Council Announces New Public Transportation Schedule",
        "The city council has released an updated schedule for public bus routes, effective next Monday. Commuters are advised to check the new timings.",
        "neutral",
    ),
    ("Company Reports Record Profits This Quarter", "", "positive"),
    (
        "Tech Giant Faces Scrutiny Over Data Privacy Practices",
        "Regulators are launching an investigation into how the company handles user data, raising concerns among privacy advocates.",
        "negative",
    ),
    (
        "New Smartphone Model Unveiled with Enhanced Camera Features",
        "The latest iteration of the popular smartphone boasts an upgraded camera system and faster processing speeds, available for pre-order next week.",
        "positive or neutral",
    ),
    ("", "", "neutral"),
];

enum Mode {
    Demo,
    Interactive,
}

struct Args {
    config: Option<PathBuf>,
    mode: Mode,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut mode = Mode::Interactive;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "demo" => mode = Mode::Demo,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }
    Ok(Args { config, mode })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsmood=info")),
        )
        .init();

    let args = parse_args()?;

    let base = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = base.with_env(|key| std::env::var(key).ok())?;
    let classifier = SentimentClassifier::from_config(&config);
    info!(
        provider = ?config.provider,
        model = config.model(),
        configured = classifier.is_configured(),
        "classifier ready"
    );

    match args.mode {
        Mode::Demo => run_demo(&classifier).await,
        Mode::Interactive => run_interactive(&classifier).await,
    }
}

async fn run_demo(classifier: &SentimentClassifier) -> anyhow::Result<()> {
    if !classifier.is_configured() {
        println!("Provider not configured. Skipping examples.");
        return Ok(());
    }
    for (n, (title, description, expected)) in DEMO_ITEMS.iter().enumerate() {
        let sentiment = classifier.classify(&NewsItem::new(*title, *description)).await;
        println!("News {} Sentiment: {sentiment} (Expected: {expected})", n + 1);
    }
    Ok(())
}

async fn run_interactive(classifier: &SentimentClassifier) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("Enter a headline and description (Ctrl-D to quit).");

    loop {
        let Some(title) = read_field(&mut rl, "title> ")? else {
            break;
        };
        let Some(description) = read_field(&mut rl, "description> ")? else {
            break;
        };
        let sentiment = classifier.classify(&NewsItem::new(title, description)).await;
        println!("{sentiment}");
    }
    Ok(())
}

/// `None` on Ctrl-C / Ctrl-D.
fn read_field(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
