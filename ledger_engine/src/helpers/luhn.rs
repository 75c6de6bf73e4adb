/// Returns true if `number` is a non-empty string of ASCII digits whose last digit is a valid Luhn check digit.
pub fn is_valid_luhn(number: &str) -> bool {
    !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) && luhn_sum(number.bytes().rev(), false) % 10 == 0
}

/// Appends the Luhn check digit to a string of digits. Non-digit characters are not checked; callers are expected to
/// pass digits only.
pub fn append_check_digit(payload: &str) -> String {
    let sum = luhn_sum(payload.bytes().rev(), true);
    let check = (10 - sum % 10) % 10;
    format!("{payload}{check}")
}

// Sums digits from the right, doubling every second one. When `double_first` is set, the rightmost digit is doubled,
// which is what you want when the check digit has not been appended yet.
fn luhn_sum<I: Iterator<Item = u8>>(digits: I, double_first: bool) -> u32 {
    digits
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b.wrapping_sub(b'0'));
            if (i % 2 == 1) != double_first {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum()
}
