//! Read/write the binary model-spec artifact.
//!
//! Pure boundary I/O: the spec is encoded with the standard protobuf binary
//! encoding and written in one shot. A failure here is fatal and reported
//! verbatim; there is no retry, and a failed write means no artifact was
//! produced.

use std::path::Path;

use prost::Message;

use crate::error::{AppError, ErrorKind};
use crate::proto;

/// Serialize the finished spec to `path`.
pub fn write_model(path: &Path, model: &proto::Model) -> Result<(), AppError> {
    let bytes = model.encode_to_vec();
    std::fs::write(path, bytes).map_err(|e| {
        AppError::new(
            ErrorKind::Serialization,
            format!("Failed to write model spec '{}': {e}", path.display()),
        )
    })
}

/// Decode a previously saved spec (used by `vibegen inspect`).
pub fn read_model(path: &Path) -> Result<proto::Model, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::new(
            ErrorKind::Serialization,
            format!("Failed to read model spec '{}': {e}", path.display()),
        )
    })?;
    proto::Model::decode(bytes.as_slice()).map_err(|e| {
        AppError::new(
            ErrorKind::Serialization,
            format!("Invalid model spec '{}': {e}", path.display()),
        )
    })
}
