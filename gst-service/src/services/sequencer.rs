//! Fiscal document numbering.

use crate::models::DocumentFamily;
use chrono::NaiveDate;
use compliance_core::{ComplianceError, RecordStore};
use std::sync::Arc;
use tracing::{instrument, warn};

const COUNTER_COLLECTION: &str = "document_sequences";

/// Issues fiscal-period-scoped sequential document numbers.
///
/// The increment is a single atomic operation against the counter store,
/// so concurrent callers never observe duplicates. Issued numbers are
/// consumed even if the surrounding document creation later fails;
/// numbering is append-only and gaps are cosmetic.
#[derive(Clone)]
pub struct DocumentSequencer {
    store: Arc<dyn RecordStore>,
}

impl DocumentSequencer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Next formatted number for a family on a date, e.g. `INV/2526/00042`.
    ///
    /// When the counter store is unreachable this falls back to a
    /// timestamp-based number whose value segment carries a `TS` marker —
    /// it breaks the gapless invariant and must never look like a normal
    /// sequence number. Document creation never fails for numbering.
    #[instrument(skip(self), fields(family = family.as_str()))]
    pub async fn next_number(&self, family: DocumentFamily, on_date: NaiveDate) -> String {
        let period = family.period_key(on_date);
        let counter = family.counter_name(on_date);

        match self
            .store
            .increment(COUNTER_COLLECTION, &counter, "value", 1)
            .await
        {
            Ok(value) => format!(
                "{}/{}/{:0width$}",
                family.prefix(),
                period,
                value,
                width = family.pad_width()
            ),
            Err(err) => {
                let fallback = Self::timestamp_fallback(family, &period);
                warn!(
                    counter = %counter,
                    error = %err,
                    fallback = %fallback,
                    "counter store unreachable, issuing timestamp fallback number"
                );
                fallback
            }
        }
    }

    fn timestamp_fallback(family: DocumentFamily, period: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{}/{}/TS{}", family.prefix(), period, millis)
    }
}

/// Whether a document number came from the timestamp fallback rather
/// than the gapless sequence.
pub fn is_fallback_number(number: &str) -> bool {
    number
        .rsplit('/')
        .next()
        .map_or(false, |segment| segment.starts_with("TS"))
}
