//! Crate-wide error type.
//!
//! Every failure carries a kind (which decides the exit code) and a message
//! that is safe to show to the user as-is.

/// Failure categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flag/prompt input or unreadable reference data.
    Input,
    /// The model artifact is missing, undeserializable or invalid.
    ModelLoad,
    /// The model's input contract cannot be assembled from the raw input.
    SchemaMismatch,
    /// The pipeline failed while predicting.
    Prediction,
    /// Writing an output file failed.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Input => 2,
            ErrorKind::ModelLoad => 3,
            ErrorKind::SchemaMismatch => 4,
            ErrorKind::Prediction => 5,
            ErrorKind::Io => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Input => "input error",
            ErrorKind::ModelLoad => "model load error",
            ErrorKind::SchemaMismatch => "schema mismatch",
            ErrorKind::Prediction => "prediction error",
            ErrorKind::Io => "i/o error",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelLoad, message)
    }

    /// A contract column that could not be assembled.
    pub fn schema_mismatch(column: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::SchemaMismatch, format!("column `{column}`: {detail}"))
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Prediction, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_the_column() {
        let err = AppError::schema_mismatch("Ward", "no source field");
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "schema mismatch: column `Ward`: no source field");
    }
}
