use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DracoError {
    #[error("General error: {0}")]
    DracoError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("Buffer decode error: {0}")]
    BufferError(String),
}

pub type Status = Result<(), DracoError>;

pub type StatusOr<T> = Result<T, DracoError>;

pub fn ok_status() -> Status {
    Ok(())
}

pub fn error_status(msg: impl Into<String>) -> DracoError {
    DracoError::DracoError(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DracoError::InvalidParameter("quantization bits".into());
        assert_eq!(err.to_string(), "Invalid parameter: quantization bits");

        let err = error_status("cycle in attribute dependencies");
        assert_eq!(err, DracoError::DracoError("cycle in attribute dependencies".into()));
        assert!(ok_status().is_ok());
    }
}
