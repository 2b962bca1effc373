//! Backend command implementations (check, classify)

use anyhow::{Context, Result};
use serde_json::json;
use triage_core::{
    ai::{default_categories, AIClient, OllamaBackend, TextGenerator},
    preprocess::clean_text,
    Classification, Config,
};

pub async fn cmd_check(config: &Config) -> Result<()> {
    println!("🔍 Testing Ollama connection...\n");
    println!("  LLM_HOST:  {}", config.host);
    println!("  LLM_MODEL: {}\n", config.model);

    let client = OllamaBackend::from_config(config);

    print!("Checking Ollama availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not connect to Ollama at {}", config.host);
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", config.model);
        println!("  4. Set environment variable: export LLM_HOST={}", config.host);
        return Ok(());
    }

    if config.provider != "ollama" {
        println!(
            "\n💡 Tip: Set LLM_PROVIDER=ollama to use this server (current provider: {})",
            config.provider
        );
    }

    Ok(())
}

/// Summarize and classify one text with the configured backend
pub async fn classify_text(client: &AIClient, text: &str) -> (String, Classification) {
    let text = clean_text(text);
    let summary = client.summarize(&text).await;
    let classification = client.classify(&text, &default_categories()).await;
    (summary, classification)
}

pub async fn cmd_classify(config: &Config, text: &str, as_json: bool) -> Result<()> {
    let client = AIClient::from_config(config).context("Failed to select LLM provider")?;
    let (summary, classification) = classify_text(&client, text).await;

    if as_json {
        let output = json!({
            "provider": client.provider().as_str(),
            "model": client.model(),
            "summary": summary,
            "category": classification.category,
            "confidence": classification.confidence,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("🤖 Provider: {} ({})\n", client.provider(), client.model());
    if summary.is_empty() {
        println!("  Summary:    (none)");
    } else {
        println!("  Summary:    {}", summary);
    }
    println!("  Category:   {}", classification.category);
    print!("  Confidence: {:.2}", classification.confidence);
    if classification.is_fallback() {
        print!(" (fallback)");
    }
    println!();

    Ok(())
}
