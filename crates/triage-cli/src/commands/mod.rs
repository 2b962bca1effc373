//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `run` - Pipeline commands (run, config) and shared utilities (load_config)
//! - `ollama` - Backend commands (check, classify)

pub mod ollama;
pub mod run;

// Re-export command functions for main.rs
pub use ollama::*;
pub use run::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
