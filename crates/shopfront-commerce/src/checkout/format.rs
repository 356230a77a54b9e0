//! Keystroke formatting for payment inputs.
//!
//! Each formatter is idempotent: feeding its own output back in returns the
//! same string.

/// Keep digits only, at most 16, grouped in blocks of four.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).take(16).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep up to four digits and insert `/` after the month.
pub fn format_expiry(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Keep up to four digits.
pub fn format_cvv(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(4).collect()
}
