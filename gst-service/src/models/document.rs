//! Taxable document model.
//!
//! Invoices and delivery challans share one body shape but are distinct
//! document kinds; the enum keeps the distinction explicit so callers
//! dispatch with an exhaustive match instead of probing fields.

use super::tax::TaxLineItem;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate totals mirroring the per-line sums.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub cess_amount: Decimal,
    pub grand_total: Decimal,
}

/// Body shared by both document kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentContents {
    /// Assigned exactly once by the sequencer at persistence time;
    /// `None` while the document is a draft.
    pub number: Option<String>,
    pub date: NaiveDate,
    pub seller_state_code: String,
    pub buyer_state_code: String,
    pub buyer_gstin: Option<String>,
    pub line_items: Vec<TaxLineItem>,
    pub totals: DocumentTotals,
}

/// An invoice or a delivery challan. Internally tagged so stored records
/// keep their fields at the top level alongside the `kind` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxableDocument {
    Invoice(DocumentContents),
    Challan(DocumentContents),
}

impl TaxableDocument {
    pub fn contents(&self) -> &DocumentContents {
        match self {
            TaxableDocument::Invoice(c) => c,
            TaxableDocument::Challan(c) => c,
        }
    }

    pub fn contents_mut(&mut self) -> &mut DocumentContents {
        match self {
            TaxableDocument::Invoice(c) => c,
            TaxableDocument::Challan(c) => c,
        }
    }

    pub fn is_invoice(&self) -> bool {
        matches!(self, TaxableDocument::Invoice(_))
    }

    /// Assign the permanent document number. Numbers are immutable once
    /// set; a second assignment is a caller bug and is rejected.
    pub fn assign_number(&mut self, number: String) -> Result<(), compliance_core::ComplianceError> {
        let contents = self.contents_mut();
        if contents.number.is_some() {
            return Err(compliance_core::ComplianceError::Validation(format!(
                "document already numbered as '{}'",
                contents.number.as_deref().unwrap_or_default()
            )));
        }
        contents.number = Some(number);
        Ok(())
    }
}
