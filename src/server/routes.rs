use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::{
    core::scratch::{ScratchDir, Upload},
    domain::model::ScoreReport,
    server::state::AppState,
    utils::error::{Result, VerifyError},
};

pub const UPLOAD_FIELD: &str = "aadhaar";
pub const NAME_FIELD: &str = "name";

type MultipartBody = std::result::Result<Multipart, MultipartRejection>;

/// Parsed multipart body: at most one upload plus any text fields.
pub struct UploadForm {
    pub upload: Option<Upload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn require_upload(self) -> Result<(Upload, HashMap<String, String>)> {
        match self.upload {
            Some(upload) => Ok((upload, self.fields)),
            None => Err(VerifyError::MissingFile),
        }
    }
}

fn malformed(e: MultipartError) -> VerifyError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return VerifyError::UploadTooLarge;
    }
    VerifyError::MalformedUpload {
        message: e.body_text(),
    }
}

async fn store_field(scratch: &ScratchDir, mut field: Field<'_>) -> Result<Upload> {
    let upload = scratch.create(field.file_name())?;

    // 分段寫入，避免整個檔案留在記憶體；中途失敗時 upload 被 drop 而刪除
    let mut file = upload.writer().await?;

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;

    tracing::debug!("Stored {} bytes at {}", written, upload.path().display());
    Ok(upload)
}

/// A request that is not `multipart/form-data` at all carries no file.
fn require_multipart(multipart: MultipartBody) -> Result<Multipart> {
    multipart.map_err(|rejection| {
        tracing::debug!("Rejected non-multipart request: {}", rejection.body_text());
        VerifyError::MissingFile
    })
}

pub async fn read_upload_form(scratch: &ScratchDir, mut multipart: Multipart) -> Result<UploadForm> {
    let mut upload = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == UPLOAD_FIELD && upload.is_none() {
            upload = Some(store_field(scratch, field).await?);
        } else if field.file_name().is_none() {
            let text = field.text().await.map_err(malformed)?;
            fields.insert(name, text);
        } else {
            tracing::debug!("Ignoring extra file field {:?}", name);
        }
    }

    Ok(UploadForm { upload, fields })
}

pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    multipart: MultipartBody,
) -> Result<Json<Value>> {
    let (upload, _) = read_upload_form(&state.scratch, require_multipart(multipart)?)
        .await?
        .require_upload()?;

    let result = state.verifier.verify(upload).await?;
    Ok(Json(result.into_inner()))
}

pub async fn score_handler(
    State(state): State<Arc<AppState>>,
    multipart: MultipartBody,
) -> Result<Json<ScoreReport>> {
    let (upload, fields) = read_upload_form(&state.scratch, require_multipart(multipart)?)
        .await?
        .require_upload()?;

    let expected_name = fields.get(NAME_FIELD).map(String::as_str);
    let report = state.verifier.score(upload, expected_name).await?;
    Ok(Json(report))
}
