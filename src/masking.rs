//! Display-safe rendering of a PAN from its stored first-6/last-4 digits.

/// The character that replaces hidden digits.
pub const MASK_CHAR: char = '*';

/// Builds the masked form of a PAN.
///
/// The result is `first6`, then one [`MASK_CHAR`] for every hidden digit,
/// then `last4`, so its length equals `total_length`. A `total_length`
/// shorter than the visible parts yields no mask characters.
pub fn mask_pan(first6: &str, last4: &str, total_length: usize) -> String {
    let hidden = total_length.saturating_sub(first6.len() + last4.len());

    let mut masked = String::with_capacity(first6.len() + hidden + last4.len());
    masked.push_str(first6);
    masked.extend(std::iter::repeat_n(MASK_CHAR, hidden));
    masked.push_str(last4);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_sixteen_digit_visa() {
        assert_eq!(mask_pan("411111", "1111", 16), "411111******1111");
    }

    #[test]
    fn masks_shortest_and_longest_pans() {
        assert_eq!(mask_pan("123456", "9012", 12), "123456**9012");
        assert_eq!(mask_pan("123456", "6789", 19), "123456*********6789");
    }

    #[test]
    fn mask_preserves_length_for_every_valid_length() {
        for len in 12..=19 {
            let masked = mask_pan("400000", "0002", len);
            assert_eq!(masked.len(), len);
            assert!(masked.starts_with("400000"));
            assert!(masked.ends_with("0002"));
            assert!(masked[6..len - 4].chars().all(|c| c == MASK_CHAR));
        }
    }

    #[test]
    fn short_length_yields_no_stars() {
        assert_eq!(mask_pan("123456", "7890", 8), "1234567890");
    }
}
