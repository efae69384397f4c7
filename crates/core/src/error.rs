/// Result alias that carries the custom [`PintographError`] type.
pub type Result<T> = std::result::Result<T, PintographError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum PintographError {
    /// Free-form message, mostly produced while parsing command line input.
    #[error("{0}")]
    Message(String),
    /// A parameter name that does not match any field of the live config.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    /// A write that falls outside the parameter's declared range.
    #[error("`{name}` = {value} is outside the declared range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// A write carrying NaN or an infinity.
    #[error("`{name}` must be a finite number")]
    NonFinite { name: &'static str },
    /// Serialising the configuration snapshot failed.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl PintographError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for PintographError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PintographError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
