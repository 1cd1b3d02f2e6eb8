//! Batch ingestion: turns a blob of uploaded text into classified entries.
//!
//! Best effort: unparsable lines are skipped and logged, never reported as
//! errors. The caller decides where the accepted entries go.

use std::sync::LazyLock;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::CoreError;
use crate::parser::LineParser;
use crate::types::IngestBatch;

/// Line parser plus classifier, built once and reused for every batch.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    parser: LineParser,
    classifier: Classifier,
}

impl Ingestor {
    pub fn new(parser: LineParser, classifier: Classifier) -> Self {
        Self { parser, classifier }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, CoreError> {
        Ok(Self::new(
            LineParser::new(cfg.ingest.timestamp_policy),
            Classifier::from_config(&cfg.classifier)?,
        ))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Parse and classify every non-blank line of `content`, in order.
    pub fn ingest(&self, content: &str) -> IngestBatch {
        let mut accepted = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in content.split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(parsed) = self.parser.parse(line) else {
                skipped += 1;
                if warns_on_skip(skipped) {
                    tracing::warn!(line_no = index + 1, line, "could not parse log line");
                } else {
                    tracing::debug!(line_no = index + 1, line, "could not parse log line");
                }
                continue;
            };
            if parsed.has_legacy_level() {
                tracing::debug!(
                    line_no = index + 1,
                    token = %parsed.level_token,
                    "discarding legacy level token"
                );
            }
            let level = self.classifier.classify(&parsed.code, &parsed.message);
            accepted.push(parsed.into_entry(level));
        }

        tracing::info!(accepted = accepted.len(), skipped, "ingested batch");
        let count = accepted.len();
        IngestBatch { accepted, count }
    }
}

/// Unparsable lines reported at `warn` per batch; the rest go to `debug`.
const SKIP_WARN_SAMPLE: usize = 5;

fn warns_on_skip(skipped: usize) -> bool {
    skipped <= SKIP_WARN_SAMPLE
}

static DEFAULT_INGESTOR: LazyLock<Ingestor> = LazyLock::new(Ingestor::default);

/// Ingest with the default parser and classifier.
pub fn ingest(content: &str) -> IngestBatch {
    DEFAULT_INGESTOR.ingest(content)
}
