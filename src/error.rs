use thiserror::Error;

pub type Result<T> = std::result::Result<T, FractalError>;

/// Failures surfaced to callers of the generators, the fit scaler and the render
/// entry point. A superseded render is not an error; see `scheduler::TickStatus`.
#[derive(Debug, Error)]
pub enum FractalError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("session encode failed: {0}")]
    SessionEncode(#[from] bincode::error::EncodeError),
    #[error("session decode failed: {0}")]
    SessionDecode(#[from] bincode::error::DecodeError),
}

impl FractalError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        FractalError::InvalidParameter(msg.into())
    }
}

/// Rejects `value` outside `[min, max]` with an `InvalidParameter` naming `what`.
pub fn ensure_range(what: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(FractalError::invalid(format!(
            "{what} must be in [{min}, {max}], got {value}"
        )));
    }
    Ok(())
}
