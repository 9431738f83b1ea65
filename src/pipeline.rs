use tracing::{debug, info, warn};

use crate::bold::extract_bold;
use crate::cse::{CseError, SearchClient, SearchResultSet};
use crate::locale::Locale;
use crate::table::{DerivedFields, TITLE_SLOTS, Table};

/// What happens when a search fails for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure; no table is returned.
    #[default]
    Abort,
    /// Leave the failing row's derived fields empty, record the failure, continue.
    Isolate,
}

#[derive(Debug)]
pub struct EnrichmentReport {
    pub table: Table,
    pub searched: usize,
    pub skipped: usize,
    pub failed_rows: Vec<FailedRow>,
}

#[derive(Debug)]
pub struct FailedRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub query: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("search failed on row {row} ({query:?}): {source}")]
    Search {
        row: usize,
        query: String,
        #[source]
        source: CseError,
    },
}

pub struct EnrichmentPipeline<C> {
    client: C,
    locale: Locale,
    policy: FailurePolicy,
}

impl<C: SearchClient> EnrichmentPipeline<C> {
    pub fn new(client: C, locale: Locale) -> Self {
        Self {
            client,
            locale,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs one search per non-blank query, strictly in row order.
    pub async fn process(&self, mut table: Table) -> Result<EnrichmentReport, PipelineError> {
        let mut searched = 0;
        let mut skipped = 0;
        let mut failed_rows = Vec::new();

        for (index, record) in table.records_mut().iter_mut().enumerate() {
            let row = index + 1;
            let Some(query) = record.query().map(str::to_string) else {
                debug!(row, "blank query, skipping");
                skipped += 1;
                continue;
            };

            debug!(row, query = %query, "searching");
            match self.client.search(&query, &self.locale).await {
                Ok(results) => {
                    if results.is_empty() {
                        info!(row, "no results returned");
                    } else {
                        info!(row, items = results.len(), "row enriched");
                    }
                    record.derived = derive_fields(&results);
                    searched += 1;
                }
                Err(source) => match self.policy {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::Search { row, query, source });
                    }
                    FailurePolicy::Isolate => {
                        warn!(row, query = %query, error = %source, "search failed, leaving row empty");
                        failed_rows.push(FailedRow {
                            row,
                            query,
                            reason: source.to_string(),
                        });
                    }
                },
            }
        }

        Ok(EnrichmentReport {
            table,
            searched,
            skipped,
            failed_rows,
        })
    }
}

/// Titles from the first three items; bold text from every item.
fn derive_fields(results: &SearchResultSet) -> DerivedFields {
    let mut derived = DerivedFields::default();
    for (slot, item) in derived.titles.iter_mut().zip(results.items.iter().take(TITLE_SLOTS)) {
        slot.clone_from(&item.title);
    }
    derived.bold_text = extract_bold(results.snippets());
    derived
}
