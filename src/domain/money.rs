use thiserror::Error;

/// Amounts are held as integer cents so balances never drift.
/// 1 unit = 100 cents, so 1500.00 = 150000 cents.
pub type Cents = i64;

/// Format cents as a plain decimal string.
/// Example: 150000 -> "1500.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "500" -> 50000, "12.5" -> 1250, ".50" -> 50
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    if digits.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (units_str, fraction_str) = match digits.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (digits, ""),
    };

    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::OutOfRange(input.to_string()))?
    };

    // Pad to two digits, truncate anything past the cent.
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction_str[..2].parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(|| ParseCentsError::OutOfRange(input.to_string()))?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("empty amount")]
    Empty,

    #[error("invalid money format: {0}")]
    InvalidFormat(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}
