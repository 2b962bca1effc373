//! Row processing pipeline
//!
//! Preprocess → iterate → persist. Rows are handled one at a time in input
//! order; each row gets a summary, a category and a confidence from the
//! configured backend, and the enriched table is written once at the end.

use std::path::Path;

use tracing::info;

use crate::ai::{default_categories, TextGenerator};
use crate::error::Result;
use crate::preprocess::{preprocess, CLEAN_DESCRIPTION_COLUMN};
use crate::table::TicketTable;

pub const SUMMARY_COLUMN: &str = "summary";
pub const CATEGORY_COLUMN: &str = "category";
pub const CONFIDENCE_COLUMN: &str = "confidence";

/// Drives a text generation backend over a ticket table
pub struct Pipeline<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    categories: Vec<String>,
}

impl<'a, G: TextGenerator + ?Sized> Pipeline<'a, G> {
    /// Pipeline over the fixed ticket category set
    pub fn new(generator: &'a G) -> Self {
        Self::with_categories(generator, default_categories())
    }

    pub fn with_categories(generator: &'a G, categories: Vec<String>) -> Self {
        Self {
            generator,
            categories,
        }
    }

    /// Preprocess and enrich `tickets` without writing anything
    ///
    /// Returns `None` when preprocessing leaves no rows. The caller's table
    /// is never modified.
    pub async fn enrich(&self, tickets: &TicketTable) -> Result<Option<TicketTable>> {
        let mut table = preprocess(tickets);

        if table.is_empty() {
            info!("No tickets to process after preprocessing");
            return Ok(None);
        }

        let total = table.len();
        let mut summaries = Vec::with_capacity(total);
        let mut categories = Vec::with_capacity(total);
        let mut confidences = Vec::with_capacity(total);

        info!("Processing {} tickets", total);

        for row in 0..total {
            let text = table.get(row, CLEAN_DESCRIPTION_COLUMN).unwrap_or("");

            let summary = self.generator.summarize(text).await;
            let classification = self.generator.classify(text, &self.categories).await;

            summaries.push(summary);
            categories.push(classification.category);
            confidences.push(classification.confidence.to_string());

            let processed = row + 1;
            let percentage = processed as f64 / total as f64 * 100.0;
            info!(
                "Processed {}/{} rows ({:.2}%)",
                processed, total, percentage
            );
        }

        table.set_column(SUMMARY_COLUMN, summaries)?;
        table.set_column(CATEGORY_COLUMN, categories)?;
        table.set_column(CONFIDENCE_COLUMN, confidences)?;

        Ok(Some(table))
    }

    /// Enrich `tickets` and write the result to `output`
    ///
    /// Nothing is written when there are no rows to process.
    pub async fn run(&self, tickets: &TicketTable, output: &Path) -> Result<Option<TicketTable>> {
        let Some(table) = self.enrich(tickets).await? else {
            return Ok(None);
        };

        table.write(output)?;
        info!("Results saved to {}", output.display());

        Ok(Some(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Classification, MockBackend, FALLBACK_CONFIDENCE, MAX_CONFIDENCE};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const TICKETS: &str = "\
id;descricao
1;Estou com erro de login no sistema.
2;Primeira frase curta. Segunda frase também curta.
3;Ola, bom dia.
4;
5;  Quero   reclamar da fatura.  Veio   duplicada.
";

    fn tickets() -> TicketTable {
        TicketTable::from_reader(TICKETS.as_bytes()).unwrap()
    }

    /// Records the order of backend calls
    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn summarize(&self, text: &str) -> String {
            self.calls.lock().unwrap().push(format!("summarize:{}", text));
            format!("resumo de {}", text)
        }

        async fn classify(&self, text: &str, categories: &[String]) -> Classification {
            self.calls.lock().unwrap().push(format!("classify:{}", text));
            Classification::new(categories[0].clone(), 0.5)
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn model(&self) -> &str {
            "recording"
        }

        fn host(&self) -> &str {
            "memory://"
        }
    }

    #[tokio::test]
    async fn test_enrich_with_mock_backend() {
        let mock = MockBackend::new();
        let pipeline = Pipeline::new(&mock);

        let enriched = pipeline.enrich(&tickets()).await.unwrap().unwrap();

        assert_eq!(enriched.len(), 5);
        assert_eq!(
            enriched.column(CATEGORY_COLUMN).collect::<Vec<_>>(),
            vec!["Suporte técnico", "Dúvida", "Dúvida", "Dúvida", "Reclamação"]
        );
        assert_eq!(enriched.get(0, CONFIDENCE_COLUMN), Some("0.99"));
        assert_eq!(enriched.get(2, CONFIDENCE_COLUMN), Some("0.35"));
        assert_eq!(
            enriched.get(1, SUMMARY_COLUMN),
            Some("Primeira frase curta. Segunda frase também curta")
        );
        assert_eq!(enriched.get(3, SUMMARY_COLUMN), Some(""));
        assert_eq!(
            enriched.get(4, SUMMARY_COLUMN),
            Some("Quero reclamar da fatura. Veio duplicada")
        );
    }

    #[tokio::test]
    async fn test_enrich_does_not_mutate_input() {
        let mock = MockBackend::new();
        let input = tickets();
        let before = input.clone();

        Pipeline::new(&mock).enrich(&input).await.unwrap();

        assert_eq!(input, before);
    }

    #[tokio::test]
    async fn test_summarize_called_before_classify_in_row_order() {
        let generator = RecordingGenerator::default();
        let pipeline = Pipeline::new(&generator);

        let enriched = pipeline.enrich(&tickets()).await.unwrap().unwrap();

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 10);
        assert_eq!(calls[0], "summarize:Estou com erro de login no sistema.");
        assert_eq!(calls[1], "classify:Estou com erro de login no sistema.");
        assert_eq!(calls[2], "summarize:Primeira frase curta. Segunda frase também curta.");
        assert_eq!(calls[8], "summarize:Quero reclamar da fatura. Veio duplicada.");
        assert_eq!(calls[9], "classify:Quero reclamar da fatura. Veio duplicada.");

        // Output rows line up with input rows
        assert_eq!(
            enriched.column("id").collect::<Vec<_>>(),
            vec!["1", "2", "3", "4", "5"]
        );
        assert_eq!(enriched.get(2, SUMMARY_COLUMN), Some("resumo de Ola, bom dia."));
    }

    #[tokio::test]
    async fn test_missing_description_column_classifies_empty_text() {
        let table = TicketTable::from_reader("id;outro\n1;erro\n".as_bytes()).unwrap();
        let mock = MockBackend::new();

        let enriched = Pipeline::new(&mock).enrich(&table).await.unwrap().unwrap();

        assert_eq!(enriched.get(0, SUMMARY_COLUMN), Some(""));
        assert_eq!(enriched.get(0, CATEGORY_COLUMN), Some("Dúvida"));
        assert_eq!(enriched.get(0, CONFIDENCE_COLUMN), Some("0.35"));
    }

    #[tokio::test]
    async fn test_empty_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let mock = MockBackend::new();

        let result = Pipeline::new(&mock)
            .run(&TicketTable::default(), &output)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_header_only_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let table = TicketTable::from_reader("id;descricao\n".as_bytes()).unwrap();
        let mock = MockBackend::new();

        let result = Pipeline::new(&mock).run(&table, &output).await.unwrap();

        assert!(result.is_none());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_run_writes_semicolon_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let mock = MockBackend::new();

        Pipeline::new(&mock).run(&tickets(), &output).await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("id;descricao;descricao_clean;summary;category;confidence")
        );
        assert_eq!(
            lines.next(),
            Some("1;Estou com erro de login no sistema.;Estou com erro de login no sistema.;Estou com erro de login no sistema;Suporte técnico;0.99")
        );
    }

    #[tokio::test]
    async fn test_ollama_backend_with_unusable_labels() {
        use crate::ai::OllamaBackend;
        use crate::test_utils::MockOllamaServer;

        let mut server = MockOllamaServer::with_response("Não sei").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        let enriched = Pipeline::new(&backend)
            .enrich(&tickets())
            .await
            .unwrap()
            .unwrap();

        // Row 4 has an empty description, so its summarize call never hits the server
        assert_eq!(server.requests().len(), 9);
        assert_eq!(enriched.get(0, SUMMARY_COLUMN), Some("Não sei"));
        assert_eq!(enriched.get(3, SUMMARY_COLUMN), Some(""));
        assert!(enriched.column(CATEGORY_COLUMN).all(|c| c == "Dúvida"));
        assert!(enriched.column(CONFIDENCE_COLUMN).all(|c| c == "0.35"));

        server.stop();
    }

    #[tokio::test]
    async fn test_confidence_column_in_range() {
        let mock = MockBackend::new();
        let enriched = Pipeline::new(&mock).enrich(&tickets()).await.unwrap().unwrap();

        for value in enriched.column(CONFIDENCE_COLUMN) {
            let confidence: f64 = value.parse().unwrap();
            assert!((FALLBACK_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence));
        }
    }
}
