/// Parse a numeric setting from a string value. Missing or unparseable values yield `None`, so that callers can log
/// and fall back to their own default.
pub fn parse_numeric<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse::<T>().ok())
}
