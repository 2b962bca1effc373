//! Text cleanup applied before the pipeline reads a row

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::table::{TicketTable, DESCRIPTION_COLUMN};

/// Cleaned description column added by [`preprocess`]
pub const CLEAN_DESCRIPTION_COLUMN: &str = "descricao_clean";

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Collapse whitespace runs to a single space and trim the ends
pub fn clean_text(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// Return a copy of `tickets` with a cleaned description column
///
/// An empty table is returned unchanged. A table without a description
/// column gets an empty cleaned column for every row.
pub fn preprocess(tickets: &TicketTable) -> TicketTable {
    if tickets.is_empty() {
        debug!("Ticket table is empty, nothing to preprocess");
        return tickets.clone();
    }

    let mut cleaned = tickets.clone();
    let values: Vec<String> = if tickets.has_column(DESCRIPTION_COLUMN) {
        tickets.column(DESCRIPTION_COLUMN).map(clean_text).collect()
    } else {
        warn!("'{}' column not found in ticket table", DESCRIPTION_COLUMN);
        vec![String::new(); tickets.len()]
    };

    // Lengths match by construction: one value per row.
    if let Err(e) = cleaned.set_column(CLEAN_DESCRIPTION_COLUMN, values) {
        warn!("Failed to attach cleaned descriptions: {}", e);
    }
    cleaned
}
