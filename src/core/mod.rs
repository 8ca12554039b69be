pub mod decoder;
pub mod scoring;
pub mod scratch;
pub mod verify;

pub use crate::domain::model::{Classification, DecodeResult, DocumentRecord, Score, ScoreReport};
pub use crate::domain::ports::Decoder;
pub use crate::utils::error::Result;
