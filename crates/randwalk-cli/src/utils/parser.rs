use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' is not a number.")]
    InvalidNumber(String),

    #[error("'{0}' is not a finite number.")]
    NonFinite(String),

    #[error("Invalid assignment '{0}'. Expected KEY=VALUE (e.g., 'simulation.bits=32').")]
    InvalidAssignment(String),
}

/// Parses a float and rejects NaN and the infinities.
pub fn parse_finite_f64(s: &str) -> Result<f64, ParseError> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber(s.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite(s.to_string()))
    }
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_assignment(s: &str) -> Result<(&str, &str), ParseError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidAssignment(s.to_string())),
    }
}
