//! Caller-side gate deciding whether a movement needs a permit at all.

use rust_decimal::Decimal;

/// Statutory document-value threshold in rupees.
const THRESHOLD: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

/// A bill is required only when the document value exceeds the statutory
/// threshold. Callers check this before ever touching the client.
pub fn eway_bill_required(document_value: Decimal) -> bool {
    document_value > THRESHOLD
}
