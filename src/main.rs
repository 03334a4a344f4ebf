#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tweetforge::cli::Cli;
use tweetforge::engine::{Engine, GenerationRequest};
use tweetforge::gateway::AnthropicGateway;
use tweetforge::rules::{RuleStore, Tier};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let input = match cli.input {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading input from stdin")?;
            buffer
        }
    };

    let conversation = cli
        .context
        .map(|path| {
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading context file {}", path.display()))
        })
        .transpose()?;

    let rules = RuleStore::new(cli.rules_dir).load(cli.rules.as_deref())?;

    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .context("ANTHROPIC_API_KEY must be set to call the completion service")?;
    let mut gateway = AnthropicGateway::new(api_key);
    if let Some(model) = cli.model {
        gateway = gateway.with_model(model);
    }

    let tier = if cli.authenticated {
        Tier::Authenticated
    } else {
        Tier::Guest
    };

    let mut request = GenerationRequest::new(input, tier);
    if let Some(conversation) = conversation {
        request = request.with_conversation(conversation);
    }
    if let Some(url) = cli.source_url {
        request = request.with_source_url(url);
    }
    if let Some(budget) = cli.max_tokens {
        request = request.with_token_budget(budget);
    }

    let engine = Engine::new(Box::new(gateway), Arc::new(rules));
    let posts = engine.generate(request).await?;

    for post in posts {
        println!("{post}");
    }
    Ok(())
}
