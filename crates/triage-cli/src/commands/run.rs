//! Pipeline command implementations and shared utilities
//!
//! This module contains:
//! - `load_env_file` - Load a `.env` file into the environment
//! - `load_config` - Resolve configuration from the environment plus CLI overrides
//! - `cmd_run` - Enrich the ticket table
//! - `cmd_config` - Print the resolved configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use triage_core::{
    ai::{AIClient, TextGenerator, CATEGORIES, FALLBACK_CONFIDENCE},
    pipeline::{CATEGORY_COLUMN, CONFIDENCE_COLUMN, SUMMARY_COLUMN},
    Config, ConfigOverrides, Pipeline, TicketTable,
};

use super::truncate;

/// Rows shown in the post-run preview
const PREVIEW_ROWS: usize = 5;

/// Load `path`, or the first `.env` found from the working directory up
///
/// Variables already set in the environment win. Finding no `.env` while
/// searching is not an error; a missing explicit path or a malformed file is.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file: {}", path.display()))?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e).context("Failed to load .env"),
        },
    }
}

/// Resolve configuration from the environment and apply CLI overrides
pub fn load_config(overrides: ConfigOverrides) -> Result<Config> {
    Config::from_env()
        .and_then(|config| config.with_overrides(overrides))
        .context("Failed to resolve configuration")
}

pub async fn cmd_run(config: &Config, dry_run: bool) -> Result<Option<TicketTable>> {
    println!("⚙️  Configuration:");
    println!("{}", config);
    println!();

    // Unknown providers are a configuration error: abort before touching any file
    let client = AIClient::from_config(config).context("Failed to select LLM provider")?;
    println!("🤖 Using LLM provider: {} ({})", client.provider(), client.model());

    println!("📥 Loading tickets from {}...", config.input_path().display());
    let tickets = TicketTable::load(config.input_path()).with_context(|| {
        format!(
            "Failed to read ticket table: {}",
            config.input_path().display()
        )
    })?;
    println!("   Loaded {} tickets", tickets.len());

    if tickets.is_empty() {
        println!("⚠️  No tickets to process. Exiting.");
        return Ok(None);
    }

    println!("🏷️  Running pipeline...");
    let pipeline = Pipeline::new(&client);
    let enriched = if dry_run {
        pipeline.enrich(&tickets).await?
    } else {
        pipeline
            .run(&tickets, config.output_path())
            .await
            .with_context(|| {
                format!(
                    "Failed to write enriched tickets: {}",
                    config.output_path().display()
                )
            })?
    };

    let Some(enriched) = enriched else {
        println!("⚠️  No tickets left after preprocessing. Nothing written.");
        return Ok(None);
    };

    print_breakdown(&enriched);
    print_preview(&enriched);

    println!();
    if dry_run {
        println!("✅ Dry run complete ({} tickets, nothing written)", enriched.len());
    } else {
        println!("✅ Results saved to {}", config.output_path().display());
    }

    Ok(Some(enriched))
}

pub fn cmd_config(config: &Config) -> Result<()> {
    println!("⚙️  Configuration:");
    println!("{}", config);

    match config.provider.parse::<triage_core::Provider>() {
        Ok(provider) => println!("\n   Provider '{}' is valid", provider),
        Err(e) => {
            let known: Vec<&str> = triage_core::Provider::all()
                .iter()
                .map(|p| p.as_str())
                .collect();
            println!("\n   ⚠️  {} (known: {})", e, known.join(", "));
        }
    }

    Ok(())
}

/// Per-category counts in category-set order
pub fn category_counts(table: &TicketTable) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = CATEGORIES.iter().map(|c| (c.to_string(), 0)).collect();

    for category in table.column(CATEGORY_COLUMN) {
        match counts.iter_mut().find(|(c, _)| c == category) {
            Some(entry) => entry.1 += 1,
            None => counts.push((category.to_string(), 1)),
        }
    }

    counts
}

/// Number of rows at the fallback confidence floor
pub fn low_confidence_count(table: &TicketTable) -> usize {
    table
        .column(CONFIDENCE_COLUMN)
        .filter_map(|c| c.parse::<f64>().ok())
        .filter(|c| *c <= FALLBACK_CONFIDENCE)
        .count()
}

fn print_breakdown(table: &TicketTable) {
    println!();
    println!("📊 Categories:");
    for (category, count) in category_counts(table) {
        if count > 0 {
            println!("   {:<24} {}", category, count);
        }
    }

    let low = low_confidence_count(table);
    if low > 0 {
        println!("   Low confidence (fallback): {}", low);
    }
}

fn print_preview(table: &TicketTable) {
    println!();
    println!("📝 Preview:");
    for row in 0..table.len().min(PREVIEW_ROWS) {
        let category = table.get(row, CATEGORY_COLUMN).unwrap_or("");
        let confidence = table.get(row, CONFIDENCE_COLUMN).unwrap_or("");
        let summary = table.get(row, SUMMARY_COLUMN).unwrap_or("");
        let summary = if summary.is_empty() {
            "(no summary)".to_string()
        } else {
            truncate(summary, 60)
        };
        println!(
            "   #{:<3} {} ({}) → {}",
            row + 1,
            category,
            confidence,
            summary
        );
    }
}
