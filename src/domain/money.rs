use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision
/// issues. Summing i64 cents is exact at any realistic ledger size, so report
/// totals never accumulate rounding drift.
pub type Cents = i64;

/// Format cents as a human-readable decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, (cents / 100).abs(), (cents % 100).abs())
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// More than two decimal places is an error rather than a silent truncation:
/// sub-cent input is almost always a typo, not a real amount.
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if digits.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (units_str, decimals_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if !units_str.bytes().all(|b| b.is_ascii_digit())
        || !decimals_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseAmountError::InvalidDigits);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseAmountError::InvalidDigits)?
    };

    let decimal_cents: i64 = match decimals_str.len() {
        0 => 0,
        // A single digit like "5" means 50 cents
        1 => {
            decimals_str
                .parse::<i64>()
                .map_err(|_| ParseAmountError::InvalidDigits)?
                * 10
        }
        2 => decimals_str
            .parse()
            .map_err(|_| ParseAmountError::InvalidDigits)?,
        _ => return Err(ParseAmountError::TooManyDecimals),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseAmountError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("empty amount")]
    Empty,

    #[error("amount contains invalid characters")]
    InvalidDigits,

    #[error("amounts are limited to two decimal places")]
    TooManyDecimals,

    #[error("amount is too large")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("  150 "), Ok(15000));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseAmountError::Empty));
        assert_eq!(parse_cents("-"), Err(ParseAmountError::Empty));
        assert_eq!(parse_cents("abc"), Err(ParseAmountError::InvalidDigits));
        assert_eq!(parse_cents("12.3x"), Err(ParseAmountError::InvalidDigits));
        assert_eq!(parse_cents("12.34.56"), Err(ParseAmountError::InvalidDigits));
        assert_eq!(
            parse_cents("100.999"),
            Err(ParseAmountError::TooManyDecimals)
        );
        assert_eq!(
            parse_cents("99999999999999999"),
            Err(ParseAmountError::Overflow)
        );
    }
}
