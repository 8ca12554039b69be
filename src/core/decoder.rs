use crate::domain::model::DecodeResult;
use crate::domain::ports::Decoder;
use crate::utils::error::DecodeError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How to launch an external decoder process.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    /// Arguments placed before the image path.
    pub args: Vec<String>,
    /// Arguments placed after the image path.
    pub trailing_args: Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            trailing_args: Vec::new(),
            timeout,
        }
    }

    pub fn with_trailing_args(mut self, trailing_args: Vec<String>) -> Self {
        self.trailing_args = trailing_args;
        self
    }
}

/// 執行外部程序並等待結束。非零結束碼、啟動失敗、逾時都視為解碼失敗，不重試
async fn run_command(spec: &CommandSpec, image_path: &Path) -> Result<String, DecodeError> {
    tracing::debug!(
        "Running decoder: {} {:?} {} {:?}",
        spec.program,
        spec.args,
        image_path.display(),
        spec.trailing_args
    );

    let child = Command::new(&spec.program)
        .args(&spec.args)
        .arg(image_path)
        .args(&spec.trailing_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            tracing::warn!("Failed to spawn decoder {}: {}", spec.program, e);
            DecodeError::Failed {
                stderr: format!("failed to spawn {}: {}", spec.program, e),
            }
        })?;

    let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(DecodeError::Failed {
                stderr: e.to_string(),
            })
        }
        Err(_) => {
            // child 已被 drop，kill_on_drop 會終止程序
            tracing::warn!(
                "Decoder {} timed out after {}s",
                spec.program,
                spec.timeout.as_secs()
            );
            return Err(DecodeError::TimedOut(spec.timeout));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        tracing::warn!("Decoder {} exited with {}", spec.program, output.status);
        return Err(DecodeError::Failed { stderr });
    }

    if !stderr.trim().is_empty() {
        tracing::debug!("Decoder stderr: {}", stderr.trim());
    }

    Ok(stdout)
}

/// Runs a script that prints the decoded QR payload as JSON.
#[derive(Debug, Clone)]
pub struct ScriptDecoder {
    spec: CommandSpec,
}

impl ScriptDecoder {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Decoder for ScriptDecoder {
    async fn decode(&self, image_path: &Path) -> Result<DecodeResult, DecodeError> {
        let stdout = run_command(&self.spec, image_path).await?;

        match serde_json::from_str::<Value>(&stdout) {
            Ok(value) => Ok(DecodeResult(value)),
            Err(e) => {
                tracing::warn!("Decoder output is not JSON: {}", e);
                Err(DecodeError::Malformed { stdout })
            }
        }
    }

    fn name(&self) -> &'static str {
        "script"
    }
}

/// Runs an OCR engine that prints plain text, e.g. `tesseract <image> stdout`.
#[derive(Debug, Clone)]
pub struct OcrTextDecoder {
    spec: CommandSpec,
}

impl OcrTextDecoder {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Decoder for OcrTextDecoder {
    async fn decode(&self, image_path: &Path) -> Result<DecodeResult, DecodeError> {
        let text = run_command(&self.spec, image_path).await?;
        tracing::debug!("OCR extracted {} characters", text.len());
        Ok(DecodeResult(json!({ "text": text })))
    }

    fn name(&self) -> &'static str {
        "ocr"
    }
}

/// Returns a fixed record without reading the image. Used for local development.
#[derive(Debug, Clone)]
pub struct StaticDecoder {
    result: DecodeResult,
}

impl StaticDecoder {
    pub fn new(result: DecodeResult) -> Self {
        Self { result }
    }

    pub fn mock_record() -> Self {
        Self::new(DecodeResult(json!({
            "verified": true,
            "name": "John Doe",
            "dob": "1990-01-01",
            "uid": "123456789012",
            "gender": "Male",
            "mobile": "9876543210",
            "email": "john.doe@example.com",
            "photo": null
        })))
    }
}

#[async_trait]
impl Decoder for StaticDecoder {
    async fn decode(&self, image_path: &Path) -> Result<DecodeResult, DecodeError> {
        tracing::debug!("Using static decoder for {}", image_path.display());
        Ok(self.result.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
