//! Domain models for gst-service.

mod document;
mod filing;
mod sequence;
mod tax;

pub use document::{DocumentContents, DocumentTotals, TaxableDocument};
pub use filing::{
    B2bEntry, B2bInvoice, B2clEntry, B2clInvoice, B2csEntry, FilingInvoiceItem, Gstr1Report,
    HsnEntry, HsnSummary, ItemDetail,
};
pub use sequence::{DocumentFamily, DocumentSequence};
pub use tax::{TaxCalculationResult, TaxLineItem};
