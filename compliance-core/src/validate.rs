//! Format checks for regulator-issued identifiers.

use crate::error::ComplianceError;

/// Structural GSTIN check: 15 characters — two state digits, ten-character
/// PAN (5 letters, 4 digits, 1 letter), entity code, the literal 'Z', and
/// a check character.
pub fn validate_gstin(gstin: &str) -> Result<(), ComplianceError> {
    let bytes = gstin.as_bytes();
    if bytes.len() != 15 {
        return Err(ComplianceError::Validation(format!(
            "GSTIN '{}' must be 15 characters, got {}",
            gstin,
            bytes.len()
        )));
    }

    let ok = bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2..7].iter().all(u8::is_ascii_uppercase)
        && bytes[7..11].iter().all(u8::is_ascii_digit)
        && bytes[11].is_ascii_uppercase()
        && bytes[12].is_ascii_alphanumeric()
        && bytes[13] == b'Z'
        && bytes[14].is_ascii_alphanumeric();

    if !ok {
        return Err(ComplianceError::Validation(format!(
            "GSTIN '{}' has an invalid format",
            gstin
        )));
    }
    Ok(())
}

/// State codes on the wire are two-digit strings ("01".."38").
pub fn validate_state_code(code: &str) -> Result<(), ComplianceError> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ComplianceError::Validation(format!(
            "state code '{}' must be two digits",
            code
        )))
    }
}
