//! Extractors that validate input before a handler runs.
//!
//! Each one rejects with [`AppError`](crate::errors::AppError), so handlers
//! see only well-formed values and every failure shares one response shape.

pub mod object_id_path;
pub mod validated_json;

pub use object_id_path::ObjectIdPath;
pub use validated_json::ValidatedJson;
