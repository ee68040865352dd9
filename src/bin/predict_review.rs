//! Sends one review to the model server and prints what came back.
//!
//! Reads the review from `--text`, or from stdin when omitted.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::io::Read;

use review_highlighter::config::Config;
use review_highlighter::highlight;
use review_highlighter::ml::{ModelVariant, PredictionClient};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Qa,
    Seq2seq,
}

impl From<Variant> for ModelVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Qa => ModelVariant::Qa,
            Variant::Seq2seq => ModelVariant::Seq2seq,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "predict-review", about = "Highlight benefits and drawbacks in a single review")]
struct Cli {
    /// Review text; read from stdin if omitted
    #[arg(long)]
    text: Option<String>,

    /// Model variant forwarded to the server
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Print the highlight structure as JSON instead of the summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let review_text = match cli.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading review from stdin")?;
            buf
        }
    };

    let config = Config::from_env()?;
    let client = PredictionClient::from_config(&config)?;

    eprintln!("🔍 Sending review to {}", client.endpoint());
    let prediction = client
        .predict_with_variant(&review_text, cli.variant.map(Into::into))
        .await?;

    if cli.json {
        let highlighted = highlight::render(&review_text, &prediction);
        println!("{}", serde_json::to_string_pretty(&highlighted)?);
    } else {
        println!("{}", highlight::summary_text(&prediction));
    }

    Ok(())
}
