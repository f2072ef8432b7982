//! Document number sequence model.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The four numbered document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFamily {
    Invoice,
    PurchaseOrder,
    GoodsReceipt,
    DeliveryChallan,
}

impl DocumentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFamily::Invoice => "invoice",
            DocumentFamily::PurchaseOrder => "purchase_order",
            DocumentFamily::GoodsReceipt => "goods_receipt",
            DocumentFamily::DeliveryChallan => "delivery_challan",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentFamily::Invoice => "INV",
            DocumentFamily::PurchaseOrder => "PO",
            DocumentFamily::GoodsReceipt => "GRN",
            DocumentFamily::DeliveryChallan => "DC",
        }
    }

    pub fn pad_width(&self) -> usize {
        match self {
            DocumentFamily::Invoice | DocumentFamily::DeliveryChallan => 5,
            DocumentFamily::PurchaseOrder | DocumentFamily::GoodsReceipt => 4,
        }
    }

    /// Period key for a date. Invoices run on the Indian financial year
    /// (April to March) as the two-digit start/end years; the other
    /// families reset monthly on `YYMM`.
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            DocumentFamily::Invoice => {
                let start_year = if date.month() >= 4 {
                    date.year()
                } else {
                    date.year() - 1
                };
                format!("{:02}{:02}", start_year % 100, (start_year + 1) % 100)
            }
            _ => format!("{:02}{:02}", date.year() % 100, date.month()),
        }
    }

    /// Name of the counter row for a period: `<family>_<periodKey>`.
    pub fn counter_name(&self, date: NaiveDate) -> String {
        format!("{}_{}", self.prefix().to_lowercase(), self.period_key(date))
    }
}

/// A named counter row: one per (family, period). Mutated only by the
/// store's atomic increment; never decremented, never reused across
/// period boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSequence {
    pub name: String,
    pub value: i64,
    pub prefix: String,
    pub pad_width: usize,
}
