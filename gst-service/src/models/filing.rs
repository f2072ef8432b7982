//! GSTR-1 filing wire models.
//!
//! Field names follow the regulator's filing schema; these shapes exist
//! only at the filing boundary and stay separate from the internal
//! document model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate-and-amounts detail for one reported item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Effective tax rate, percent.
    pub rt: Decimal,
    /// Taxable value.
    pub txval: Decimal,
    /// Integrated tax amount.
    pub iamt: Decimal,
    /// Central tax amount.
    pub camt: Decimal,
    /// State tax amount.
    pub samt: Decimal,
    /// Cess amount.
    pub csamt: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingInvoiceItem {
    pub num: u32,
    pub itm_det: ItemDetail,
}

/// One invoice nested under a B2B party entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2bInvoice {
    pub inum: String,
    /// Invoice date, `dd-mm-yyyy`.
    pub idt: String,
    /// Invoice grand total.
    pub val: Decimal,
    /// Place of supply state code.
    pub pos: String,
    /// Reverse charge flag, "Y"/"N".
    pub rchrg: String,
    /// Invoice type; always "R" (regular) for this core.
    pub inv_typ: String,
    pub itms: Vec<FilingInvoiceItem>,
}

/// Registered-buyer bucket: one entry per counterparty GSTIN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2bEntry {
    pub ctin: String,
    pub inv: Vec<B2bInvoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2clInvoice {
    pub inum: String,
    pub idt: String,
    pub val: Decimal,
    pub itms: Vec<FilingInvoiceItem>,
}

/// Large unregistered-buyer bucket: one entry per place of supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2clEntry {
    pub pos: String,
    pub inv: Vec<B2clInvoice>,
}

/// Small unregistered-buyer bucket: lossy running sums keyed by
/// (supply type, rate, registration type, place of supply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2csEntry {
    /// "INTER" or "INTRA".
    pub sply_ty: String,
    pub rt: Decimal,
    /// Registration type flag; "OE" (other than e-commerce).
    pub typ: String,
    pub pos: String,
    pub txval: Decimal,
    pub iamt: Decimal,
    pub camt: Decimal,
    pub samt: Decimal,
    pub csamt: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsnEntry {
    pub num: u32,
    pub hsn_sc: String,
    pub desc: String,
    /// Unit quantity code.
    pub uqc: String,
    pub qty: Decimal,
    /// Total value including tax.
    pub val: Decimal,
    pub txval: Decimal,
    pub iamt: Decimal,
    pub camt: Decimal,
    pub samt: Decimal,
    pub csamt: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsnSummary {
    pub data: Vec<HsnEntry>,
}

/// The assembled outward-supply filing for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gstr1Report {
    pub gstin: String,
    /// Filing period, `MMYYYY`, derived from the report's end date.
    pub fp: String,
    pub b2b: Vec<B2bEntry>,
    pub b2cl: Vec<B2clEntry>,
    pub b2cs: Vec<B2csEntry>,
    pub hsn: HsnSummary,
    /// Documents skipped for missing fields; the run never aborts for
    /// one bad record.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}
