//! Domain error types.

/// Top-level error type for stocksig.
#[derive(Debug, thiserror::Error)]
pub enum StocksigError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StocksigError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StocksigError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn data(reason: impl Into<String>) -> Self {
        StocksigError::Data {
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for StocksigError {
    fn from(err: csv::Error) -> Self {
        StocksigError::Data {
            reason: format!("CSV error: {err}"),
        }
    }
}

impl From<&StocksigError> for std::process::ExitCode {
    fn from(err: &StocksigError) -> Self {
        let code: u8 = match err {
            StocksigError::Io(_) => 1,
            StocksigError::ConfigParse { .. }
            | StocksigError::ConfigMissing { .. }
            | StocksigError::ConfigInvalid { .. } => 2,
            StocksigError::Data { .. } => 3,
            StocksigError::InvalidInput { .. } => 4,
            StocksigError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message() {
        let err = StocksigError::invalid_input("series is empty");
        assert_eq!(err.to_string(), "invalid input: series is empty");
    }

    #[test]
    fn config_invalid_message() {
        let err = StocksigError::ConfigInvalid {
            section: "signals".into(),
            key: "ma_period".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [signals] ma_period: must be positive"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StocksigError = io.into();
        assert!(matches!(err, StocksigError::Io(_)));
    }

    #[test]
    fn exit_codes_are_distinct_per_category() {
        use std::process::ExitCode;

        let cases = [
            StocksigError::Io(std::io::Error::other("x")),
            StocksigError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            },
            StocksigError::data("bad row"),
            StocksigError::invalid_input("empty"),
            StocksigError::NoData {
                ticker: "AAPL".into(),
            },
        ];
        let codes: Vec<ExitCode> = cases.iter().map(ExitCode::from).collect();
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
