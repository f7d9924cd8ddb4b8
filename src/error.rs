/// Failure category for a pipeline run.
///
/// Each kind maps to a stable process exit code so wrapper scripts can
/// distinguish "no dataset" from "broken spec" without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// None of the candidate dataset paths exist.
    DatasetNotFound,
    /// A layer's declared widths disagree with its weight/bias tensor sizes.
    DimensionMismatch,
    /// The serialized spec violates an invariant the patcher cannot repair.
    SpecIntegrity,
    /// Output path unwritable or encoding error.
    Serialization,
    /// Bad flags or malformed input schema.
    Usage,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::DatasetNotFound => 2,
            ErrorKind::Usage => 2,
            ErrorKind::DimensionMismatch => 3,
            ErrorKind::Serialization => 4,
            ErrorKind::SpecIntegrity => 5,
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

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
