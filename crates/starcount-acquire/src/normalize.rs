use starcount_model::STARS_UNKNOWN;
use thiserror::Error;

/// Suffix marking a count in thousands ("1.2k").
const THOUSANDS_SUFFIX: &str = "k";

#[derive(Debug, Error, PartialEq)]
#[error("unparsable star count '{text}'")]
pub struct NormalizeError {
    pub text: String,
}

/// Convert star-counter text into an integer count.
///
/// - `"1.2k"` / `"1.2K"` → 1200 (decimal mantissa times 1000, truncated)
/// - `""` → [`STARS_UNKNOWN`]
/// - `"532"` → 532
///
/// Anything else, including other scale suffixes such as "m" and
/// non-finite mantissas such as "infk", is an error. Signs are accepted here;
/// callers decide whether a negative count is meaningful.
pub fn normalize_count(raw: &str) -> Result<i64, NormalizeError> {
    let text = raw.to_lowercase();
    let err = || NormalizeError { text: raw.to_string() };

    if let Some(mantissa) = text.strip_suffix(THOUSANDS_SUFFIX) {
        let value: f64 = mantissa.parse().map_err(|_| err())?;
        if !value.is_finite() || (value * 1000.0).abs() >= i64::MAX as f64 {
            return Err(err());
        }
        return Ok((value * 1000.0) as i64);
    }

    if text.is_empty() {
        return Ok(STARS_UNKNOWN);
    }

    text.parse().map_err(|_| err())
}
