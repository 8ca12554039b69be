pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{ScoreArgs, ServerArgs};

pub use config::{DecoderKind, DecoderSettings, ServerConfig};
pub use core::scoring::{score_document, validate_aadhaar_checksum};
pub use core::verify::Verifier;
pub use domain::model::{Classification, DecodeResult, DocumentRecord, Score, ScoreReport};
pub use server::{build_router, start_server, state::AppState};
pub use utils::error::{DecodeError, Result, VerifyError};
