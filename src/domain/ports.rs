use crate::domain::model::DecodeResult;
use crate::utils::error::DecodeError;
use async_trait::async_trait;
use std::path::Path;

/// Extracts structured fields from a document image on disk.
///
/// Implementations must not retain `image_path` past the call; the caller
/// deletes the file as soon as `decode` returns.
#[async_trait]
pub trait Decoder: Send + Sync {
    async fn decode(&self, image_path: &Path) -> Result<DecodeResult, DecodeError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
