use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("No capabilities registered for {0}")]
    UnsupportedGame(String),

    #[error("Unknown value for enum metric {metric}: {value}")]
    UnknownEnumValue { metric: String, value: String },

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Chart lookup failed: {0}")]
    ChartLookup(String),
}
