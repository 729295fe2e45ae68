use crate::error::{AppError, Result};

/// The shortest accepted PAN.
pub const MIN_PAN_LENGTH: usize = 12;
/// The longest accepted PAN.
pub const MAX_PAN_LENGTH: usize = 19;

/// The visible parts of a PAN that are stored in clear for masking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanParts {
    /// The first six digits (issuer identification number).
    pub first6: String,
    /// The last four digits.
    pub last4: String,
    /// The total number of digits.
    pub length: usize,
}

/// Validates a PAN.
///
/// # Arguments
///
/// * `pan` - The PAN to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the PAN is valid.
pub fn validate_pan(pan: &str) -> Result<()> {
    if pan.is_empty() || !pan.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidPan(
            "PAN must contain only digits".to_string(),
        ));
    }

    if pan.len() < MIN_PAN_LENGTH || pan.len() > MAX_PAN_LENGTH {
        return Err(AppError::InvalidPan(format!(
            "PAN must be between {} and {} digits long",
            MIN_PAN_LENGTH, MAX_PAN_LENGTH
        )));
    }

    Ok(())
}

/// Validates a PAN and splits off the parts kept for masking.
pub fn split_pan(pan: &str) -> Result<PanParts> {
    validate_pan(pan)?;

    let length = pan.len();
    Ok(PanParts {
        first6: pan[..6].to_string(),
        last4: pan[length - 4..].to_string(),
        length,
    })
}
