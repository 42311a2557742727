//! Post-processing of raw recognition output into a product number.

/// Shortest digit run accepted as a product number.
pub const MIN_DIGITS: usize = 4;
/// Longest digit run accepted as a product number.
pub const MAX_DIGITS: usize = 20;

/// Strips whitespace and every non-digit character from the engine output,
/// then rejects runs outside the plausible product-number length range.
///
/// Returns the empty string for rejected results. Idempotent: feeding a
/// cleaned value back through produces the same value.
pub fn clean_product_number(text: &str) -> String {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
        return String::new();
    }

    digits
}
