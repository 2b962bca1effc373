//! Offline heuristic backend
//!
//! Deterministic string heuristics for summarization and keyword-based
//! classification of support tickets. No network access.

use async_trait::async_trait;

use super::types::Classification;
use super::TextGenerator;

/// Summaries built from a short first sentence also take the next one
const SHORT_SENTENCE_CHARS: usize = 180;

/// Longest single-sentence summary before truncation
const MAX_SUMMARY_CHARS: usize = 200;

/// Keyword → category, in scoring order
///
/// Keywords are matched as substrings of the lower-cased ticket text.
const KEYWORDS: &[(&str, &str)] = &[
    ("reclam", "Reclamação"),
    ("fatura", "Reclamação"),
    ("erro", "Suporte técnico"),
    ("falha", "Suporte técnico"),
    ("login", "Suporte técnico"),
    ("dúvid", "Dúvida"),
    ("como", "Dúvida"),
    ("solicit", "Solicitação de serviço"),
    ("pedido", "Solicitação de serviço"),
    ("feedback", "Feedback"),
    ("sugest", "Feedback"),
];

/// Offline heuristic backend
#[derive(Clone, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

/// First one or two sentences of `text`
///
/// A single sentence of at most 200 characters produces an empty summary.
pub fn heuristic_summary(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let sentences: Vec<&str> = text.split('.').collect();
    let candidate = sentences[0].trim();

    if candidate.chars().count() < SHORT_SENTENCE_CHARS && sentences.len() > 1 {
        let second = sentences[1].trim();
        return if second.is_empty() {
            candidate.to_string()
        } else {
            format!("{}. {}", candidate, second)
        };
    }

    if candidate.chars().count() > MAX_SUMMARY_CHARS {
        let truncated: String = candidate.chars().take(MAX_SUMMARY_CHARS).collect();
        format!("{}...", truncated).trim().to_string()
    } else {
        String::new()
    }
}

/// Keyword-score classification restricted to `categories`
///
/// Ties go to the category listed first. No keyword hits yields the
/// fallback classification.
pub fn heuristic_classification(text: &str, categories: &[String]) -> Classification {
    let lowered = text.to_lowercase();
    let mut scores: Vec<(&str, f64)> = categories.iter().map(|c| (c.as_str(), 0.0)).collect();

    for (keyword, category) in KEYWORDS {
        if !lowered.contains(keyword) {
            continue;
        }
        if let Some(entry) = scores.iter_mut().find(|(c, _)| c == category) {
            entry.1 += 1.0;
        }
    }

    // First maximum wins on ties
    let best = scores
        .iter()
        .fold(None::<(&str, f64)>, |best, &(category, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((category, score)),
        });

    match best {
        Some((category, top)) if top > 0.0 => {
            let total: f64 = scores.iter().map(|(_, s)| s).sum();
            Classification::new(category, top / total)
        }
        _ => Classification::fallback(categories),
    }
}

#[async_trait]
impl TextGenerator for MockBackend {
    async fn summarize(&self, text: &str) -> String {
        heuristic_summary(text)
    }

    async fn classify(&self, text: &str, categories: &[String]) -> Classification {
        heuristic_classification(text, categories)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
