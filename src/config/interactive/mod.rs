
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;
use std::time::Duration;

use super::{ChatConfig, Config, ConfigError, OllamaConfig, RetrievalConfig, RoutingConfig};
use crate::embeddings::OllamaClient;
use crate::router::{FallbackStrategy, MaybePolicy};

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 RAG Router Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("Chat Model").bold().yellow());
    eprintln!("Configure the Gemini model used for answers and routing decisions.");
    eprintln!();
    configure_chat(&mut config.chat)?;

    eprintln!();
    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure your Ollama instance for embedding generation.");
    eprintln!();
    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Retrieval").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Routing").bold().yellow());
    configure_routing(&mut config.routing)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!(
            "You can continue, but make sure Ollama is running and the model is pulled before chatting."
        );
    }

    if config.chat.api_key().is_err() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set in the environment",
                config.chat.api_key_env
            ))
            .yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Chat Settings:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.chat.base_url).cyan());
    eprintln!("  Model: {}", style(&config.chat.model).cyan());
    eprintln!("  Temperature: {}", style(config.chat.temperature).cyan());
    eprintln!("  API key variable: {}", style(&config.chat.api_key_env).cyan());

    eprintln!();
    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Segments: {} chars, {} overlap",
        style(config.chunking.max_segment_chars).cyan(),
        style(config.chunking.overlap_chars).cyan()
    );
    eprintln!(
        "  Max results: {}",
        style(config.retrieval.max_results).cyan()
    );
    eprintln!("  Min score: {}", style(config.retrieval.min_score).cyan());
    eprintln!(
        "  Memory window: {} messages",
        style(config.memory.max_messages).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Routing:").bold().yellow());
    eprintln!(
        "  Gate 'peut-être': {}",
        style(format!("{:?}", config.routing.maybe_policy)).cyan()
    );
    eprintln!(
        "  Classifier fallback: {}",
        style(format!("{:?}", config.routing.classifier_fallback)).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Documents:").bold().yellow());
    eprintln!(
        "  AI: {}",
        style(config.document_path(&config.documents.ai).display()).cyan()
    );
    eprintln!(
        "  Cooking: {}",
        style(config.document_path(&config.documents.cooking).display()).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No valid configuration found. Using defaults.").yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_chat(chat: &mut ChatConfig) -> Result<()> {
    let model: String = Input::new()
        .with_prompt("Gemini model")
        .default(chat.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let temperature: f64 = Input::new()
        .with_prompt("Temperature")
        .default(chat.temperature)
        .validate_with(|input: &f64| -> Result<(), &str> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err("Temperature must be between 0 and 2")
            }
        })
        .interact_text()?;

    chat.set_model(model)?;
    chat.set_temperature(temperature)?;

    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_model(model)?;
    ollama.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let max_results: usize = Input::new()
        .with_prompt("Segments retrieved per document")
        .default(retrieval.max_results)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("At least one segment must be retrieved")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let min_score: f64 = Input::new()
        .with_prompt("Minimum relevance score")
        .default(retrieval.min_score)
        .validate_with(|input: &f64| -> Result<(), &str> {
            if (0.0..=1.0).contains(input) {
                Ok(())
            } else {
                Err("Score must be between 0 and 1")
            }
        })
        .interact_text()?;

    retrieval.set_max_results(max_results)?;
    retrieval.set_min_score(min_score)?;

    Ok(())
}

/// True when the server answers and the embedding model is pulled
fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaClient::new(ollama).is_ok_and(|client| {
        client
            .with_timeout(Duration::from_secs(5))
            .with_retry_attempts(1)
            .health_check()
            .is_ok()
    })
}

fn configure_routing(routing: &mut RoutingConfig) -> Result<()> {
    let maybe_policies = [MaybePolicy::Retrieve, MaybePolicy::Skip];
    let maybe_index = Select::new()
        .with_prompt("When the gate answers 'peut-être'")
        .default(
            maybe_policies
                .iter()
                .position(|&p| p == routing.maybe_policy)
                .unwrap_or(0),
        )
        .items(&["Retrieve from the document", "Answer without retrieval"])
        .interact()?;

    let fallbacks = [
        FallbackStrategy::DoNotRoute,
        FallbackStrategy::RouteToAll,
        FallbackStrategy::Fail,
    ];
    let fallback_index = Select::new()
        .with_prompt("When the classifier answer is unusable")
        .default(
            fallbacks
                .iter()
                .position(|&f| f == routing.classifier_fallback)
                .unwrap_or(0),
        )
        .items(&[
            "Answer without retrieval",
            "Retrieve from every document",
            "Stop with an error",
        ])
        .interact()?;

    routing.maybe_policy = maybe_policies[maybe_index];
    routing.classifier_fallback = fallbacks[fallback_index];

    Ok(())
}
