use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Malformed bar dated '{date}' dropped from series: {reason}")]
    MalformedSeries { date: String, reason: String },

    #[error("No current price available for {0}")]
    NoCurrentPrice(String),

    #[error("Value of {0} exceeds the representable decimal range")]
    Overflow(String),
}
