//! Shared types for AI backends

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The fixed ticket category set, in tie-breaking order
pub const CATEGORIES: [&str; 5] = [
    "Reclamação",
    "Suporte técnico",
    "Feedback",
    "Dúvida",
    "Solicitação de serviço",
];

/// Category returned when nothing usable comes out of a backend
pub const FALLBACK_CATEGORY: &str = "Dúvida";

/// Reserved low-confidence floor, also used for fallback results
pub const FALLBACK_CONFIDENCE: f64 = 0.35;

/// Upper bound for any reported confidence
pub const MAX_CONFIDENCE: f64 = 0.99;

/// The category set as owned strings, ready to pass to `classify`
pub fn default_categories() -> Vec<String> {
    CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// Result of classifying a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    /// Always within [`FALLBACK_CONFIDENCE`, `MAX_CONFIDENCE`]
    pub confidence: f64,
}

impl Classification {
    pub fn new(category: impl Into<String>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            confidence: confidence.clamp(FALLBACK_CONFIDENCE, MAX_CONFIDENCE),
        }
    }

    /// The low-confidence fallback for `categories`
    ///
    /// Uses [`FALLBACK_CATEGORY`] when it is part of the set, otherwise the
    /// first category, so the result stays a member of what was asked for.
    pub fn fallback(categories: &[String]) -> Self {
        let category = if categories.is_empty() || categories.iter().any(|c| c == FALLBACK_CATEGORY)
        {
            FALLBACK_CATEGORY
        } else {
            categories[0].as_str()
        };
        Self::new(category, FALLBACK_CONFIDENCE)
    }

    pub fn is_fallback(&self) -> bool {
        self.confidence <= FALLBACK_CONFIDENCE
    }
}

/// Text generation provider, resolved once per run from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Offline keyword heuristics, no network
    Mock,
    /// Ollama HTTP API
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Ollama => "ollama",
        }
    }

    pub fn all() -> &'static [Provider] {
        &[Self::Mock, Self::Ollama]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "ollama" => Ok(Self::Ollama),
            _ => Err(Error::UnknownProvider(s.to_string())),
        }
    }
}
