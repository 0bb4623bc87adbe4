//! Interactive command line for the MDR classifier.

use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdr_classifier::adapters::{
    AnthropicConfig, AnthropicProvider, FileRulesSource, OpenAIConfig, OpenAIProvider,
    PacedAIProvider,
};
use mdr_classifier::application::ClassificationSession;
use mdr_classifier::config::{
    AiConfig, AiProvider, AppConfig, SessionConfig, ValidationError, ANTHROPIC_API_KEY_ENV,
    OPENAI_API_KEY_ENV,
};
use mdr_classifier::domain::conversation::{ConversationState, Message, MessageKind};
use mdr_classifier::ports::{AIProvider, RulesSource};

/// Classify a medical device under EU MDR Annex VIII by answering questions.
#[derive(Debug, Parser)]
#[command(name = "mdr-classifier", version)]
struct Cli {
    /// Rules file handed to the classifier
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Model provider: openai or anthropic
    #[arg(long)]
    provider: Option<AiProvider>,

    /// Do not print section status updates
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdr_classifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(rules) = cli.rules {
        config.session.rules_path = rules;
    }
    if let Some(provider) = cli.provider {
        config.ai.provider = provider;
    }
    if cli.quiet {
        config.session.echo_status = false;
    }
    config.validate()?;

    let provider = build_provider(&config.ai)?;
    let rules = load_rules(&config.session).await;
    let session = ClassificationSession::with_provider(provider, rules);
    let mut state = session.start()?;

    println!("🏥 MDR Classifier | 'exit' = quit | 'state' = show\n");
    for message in state.messages() {
        render(message, true);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.to_ascii_lowercase().as_str() {
            "exit" | "quit" => break,
            "state" => {
                print_state(&state);
                continue;
            }
            _ => {}
        }

        let result = tokio::select! {
            result = session.process_turn(&mut state, input) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(result) = result else {
            println!();
            break;
        };
        match result {
            Ok(replies) => {
                for message in &replies {
                    render(message, config.session.echo_status);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                println!("[Error]: {}\n", e);
            }
        }
    }

    tracing::info!(session_id = %state.id(), "Session ended");
    Ok(())
}

/// Builds the configured provider behind the pacing policy.
fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>, Box<dyn Error>> {
    let interval = ai.min_call_interval();

    let provider: Arc<dyn AIProvider> = match ai.provider {
        AiProvider::OpenAI => {
            let key = ai
                .openai_api_key
                .clone()
                .ok_or(ValidationError::MissingRequired(OPENAI_API_KEY_ENV))?;
            let mut openai = OpenAIConfig::from_secret(key).with_timeout(ai.timeout());
            if let Some(model) = &ai.model {
                openai = openai.with_model(model.as_str());
            }
            if let Some(url) = &ai.base_url {
                openai = openai.with_base_url(url.as_str());
            }
            Arc::new(PacedAIProvider::new(OpenAIProvider::new(openai)?, interval))
        }
        AiProvider::Anthropic => {
            let key = ai
                .anthropic_api_key
                .clone()
                .ok_or(ValidationError::MissingRequired(ANTHROPIC_API_KEY_ENV))?;
            let mut anthropic = AnthropicConfig::from_secret(key).with_timeout(ai.timeout());
            if let Some(model) = &ai.model {
                anthropic = anthropic.with_model(model.as_str());
            }
            if let Some(url) = &ai.base_url {
                anthropic = anthropic.with_base_url(url.as_str());
            }
            Arc::new(PacedAIProvider::new(
                AnthropicProvider::new(anthropic)?,
                interval,
            ))
        }
    };

    let info = provider.provider_info();
    tracing::info!(
        provider = %info.name,
        model = %info.model,
        min_interval_ms = interval.as_millis() as u64,
        "AI provider ready"
    );
    Ok(provider)
}

/// Reads the rule text; without it the classifier works from the facts alone.
async fn load_rules(session: &SessionConfig) -> String {
    let source = FileRulesSource::new(&session.rules_path);
    match source.load().await {
        Ok(text) => {
            tracing::info!(path = %source.path().display(), bytes = text.len(), "Rules loaded");
            text
        }
        Err(e) => {
            tracing::warn!(error = %e, "Classification rules unavailable, continuing without them");
            String::new()
        }
    }
}

fn render(message: &Message, echo_status: bool) {
    match message.kind() {
        MessageKind::Question => println!("Bot: {}\n", message.content()),
        MessageKind::Status if echo_status => println!("Bot: ✓ {}\n", message.content()),
        MessageKind::Report => {
            println!("Bot: 📋 CLASSIFICATION REPORT:\n\n{}\n", message.content())
        }
        MessageKind::Status | MessageKind::Utterance => {}
    }
}

fn print_state(state: &ConversationState) {
    println!("\n--- CURRENT STATE ---");
    for (name, value) in state.facts().known_in_catalog_order() {
        println!("{}: {}", name, value);
    }
    let pending: Vec<&str> = state.pending_sections().iter().map(|s| s.as_str()).collect();
    println!("triage_complete: {}", state.triage_complete());
    if let Some(last) = state.last_message() {
        println!("last_message_at: {}", last.created_at().clock());
    }
    println!("pending_sections: [{}]", pending.join(", "));
    println!("---------------------\n");
}
