use crate::core::scoring::score_document;
use crate::core::scratch::Upload;
use crate::domain::model::{DecodeResult, ScoreReport};
use crate::domain::ports::Decoder;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Instant;

/// Runs an upload through the decoder and releases it.
#[derive(Clone)]
pub struct Verifier {
    decoder: Arc<dyn Decoder>,
}

impl Verifier {
    pub fn new(decoder: Arc<dyn Decoder>) -> Self {
        Self { decoder }
    }

    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// 上傳檔案在解碼完成後一律刪除，無論成功或失敗
    pub async fn verify(&self, upload: Upload) -> Result<DecodeResult> {
        let started = Instant::now();
        tracing::info!(
            "Decoding {} with {} decoder",
            upload.original_name().unwrap_or("<unnamed>"),
            self.decoder.name()
        );

        let outcome = self.decoder.decode(upload.path()).await;
        upload.discard();

        match &outcome {
            Ok(_) => tracing::info!("Decode finished in {:?}", started.elapsed()),
            Err(e) => tracing::warn!("Decode failed after {:?}: {}", started.elapsed(), e),
        }

        Ok(outcome?)
    }

    pub async fn score(&self, upload: Upload, expected_name: Option<&str>) -> Result<ScoreReport> {
        let result = self.verify(upload).await?;
        let record = result.to_record();
        let score = score_document(&record, expected_name);

        tracing::info!("Document scored {} ({})", score, score.classification());
        Ok(ScoreReport::new(score, record))
    }
}
