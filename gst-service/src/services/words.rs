//! Amount-in-words rendering in the Indian numbering system.

use compliance_core::ComplianceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Words for 1..=99.
fn two_digits(n: u64) -> String {
    debug_assert!((1..=99).contains(&n));
    if n < 20 {
        ONES[n as usize].to_string()
    } else {
        let tens = TENS[(n / 10) as usize];
        match n % 10 {
            0 => tens.to_string(),
            unit => format!("{} {}", tens, ONES[unit as usize]),
        }
    }
}

/// Words for a positive integer: peel crore, then lakh, thousand,
/// hundred, then the 0-99 remainder. Crore recurses so arbitrarily
/// large amounts keep the Indian grouping.
fn integer_words(n: u64) -> String {
    let mut parts = Vec::new();

    let crore = n / 10_000_000;
    if crore > 0 {
        parts.push(format!("{} Crore", integer_words(crore)));
    }
    let lakh = (n / 100_000) % 100;
    if lakh > 0 {
        parts.push(format!("{} Lakh", two_digits(lakh)));
    }
    let thousand = (n / 1_000) % 100;
    if thousand > 0 {
        parts.push(format!("{} Thousand", two_digits(thousand)));
    }
    let hundred = (n / 100) % 10;
    if hundred > 0 {
        parts.push(format!("{} Hundred", ONES[hundred as usize]));
    }
    let rest = n % 100;
    if rest > 0 {
        parts.push(two_digits(rest));
    }

    parts.join(" ")
}

/// Render a non-negative amount as Indian-numbering words, with the
/// fractional part as a paise run and a terminal "Only".
pub fn amount_to_words(amount: Decimal, currency: &str) -> Result<String, ComplianceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ComplianceError::Validation(format!(
            "cannot render negative amount {} in words",
            amount
        )));
    }

    let total_paise = (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| {
            ComplianceError::Validation(format!("amount {} too large to render in words", amount))
        })?;

    let rupees = total_paise / 100;
    let paise = total_paise % 100;

    if rupees == 0 && paise == 0 {
        return Ok(format!("Zero {} Only", currency));
    }

    let mut words = if rupees == 0 {
        format!("Zero {}", currency)
    } else {
        format!("{} {}", integer_words(rupees), currency)
    };
    if paise > 0 {
        words.push_str(&format!(" and {} Paise", two_digits(paise)));
    }
    words.push_str(" Only");
    Ok(words)
}
