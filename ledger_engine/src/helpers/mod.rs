mod luhn;

pub use luhn::{append_check_digit, is_valid_luhn};
