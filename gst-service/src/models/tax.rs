//! Tax line item and calculation result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single taxable line on a document. Immutable once computed; owned by
/// the document that contains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLineItem {
    pub description: String,
    pub hsn_code: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub taxable_amount: Decimal,
    pub gst_rate: Decimal,
    pub cess_rate: Decimal,
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
    pub cess_amount: Decimal,
}

/// Result of a single tax computation. Value type, produced fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub taxable_amount: Decimal,
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
    pub cess_rate: Decimal,
    pub cess_amount: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub is_inter_state: bool,
}
