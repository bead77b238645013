use thiserror::Error;

/// Errors surfaced by the valuation engine.
///
/// Missing or malformed *data* never produces an error: it degrades to
/// `None` / `"na"` in the result. Only caller-supplied configuration and
/// data-source failures are reported here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Data source error: {0}")]
    DataSource(String),
}

pub type Result<T> = std::result::Result<T, ValuationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValuationError::InvalidConfig("wacc must exceed terminal growth".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: wacc must exceed terminal growth"
        );

        let err = ValuationError::DataSource("file not found".to_string());
        assert_eq!(err.to_string(), "Data source error: file not found");
    }
}
