#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::decoder::{CommandSpec, OcrTextDecoder, ScriptDecoder, StaticDecoder};
use crate::domain::ports::Decoder;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_dir_path, validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_DECODE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// JSON-printing QR script
    Script,
    /// Plain-text OCR engine
    Ocr,
    /// Fixed development record
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderSettings {
    pub kind: DecoderKind,
    pub program: String,
    pub args: Vec<String>,
    pub trailing_args: Vec<String>,
    pub timeout_secs: u64,
}

impl DecoderSettings {
    pub fn for_kind(kind: DecoderKind) -> Self {
        let (program, args, trailing_args) = match kind {
            DecoderKind::Script => ("python", vec!["scripts/decode_qr.py".to_string()], vec![]),
            DecoderKind::Ocr => ("tesseract", vec![], vec!["stdout".to_string()]),
            DecoderKind::Mock => ("", vec![], vec![]),
        };

        Self {
            kind,
            program: program.to_string(),
            args,
            trailing_args,
            timeout_secs: DEFAULT_DECODE_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn build(&self) -> Arc<dyn Decoder> {
        let spec = CommandSpec::new(self.program.clone(), self.args.clone(), self.timeout())
            .with_trailing_args(self.trailing_args.clone());

        match self.kind {
            DecoderKind::Script => Arc::new(ScriptDecoder::new(spec)),
            DecoderKind::Ocr => Arc::new(OcrTextDecoder::new(spec)),
            DecoderKind::Mock => Arc::new(StaticDecoder::mock_record()),
        }
    }
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self::for_kind(DecoderKind::Script)
    }
}

impl Validate for DecoderSettings {
    fn validate(&self) -> Result<()> {
        if self.kind != DecoderKind::Mock {
            validate_non_empty_string("decoder.program", &self.program)?;
        }
        validate_positive_number("decoder.timeout_secs", self.timeout_secs, 1)?;
        Ok(())
    }
}

/// Partial decoder settings from a config file or the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderOverrides {
    pub kind: Option<DecoderKind>,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub trailing_args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl DecoderOverrides {
    pub fn apply_to(&self, settings: &mut DecoderSettings) {
        // 切換解碼器種類時先回到該種類的預設指令
        if let Some(kind) = self.kind {
            if kind != settings.kind {
                let timeout_secs = settings.timeout_secs;
                *settings = DecoderSettings::for_kind(kind);
                settings.timeout_secs = timeout_secs;
            }
        }
        if let Some(program) = &self.program {
            settings.program = program.clone();
        }
        if let Some(args) = &self.args {
            settings.args = args.clone();
        }
        if let Some(trailing_args) = &self.trailing_args {
            settings.trailing_args = trailing_args.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub decoder: DecoderSettings,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            decoder: DecoderSettings::default(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.host)?;
        validate_range("server.port", self.port, 1, u16::MAX)?;
        validate_dir_path("server.upload_dir", &self.upload_dir)?;
        validate_positive_number("server.max_upload_bytes", self.max_upload_bytes as u64, 1)?;
        self.decoder.validate()
    }
}

/// Partial server settings from a config file or the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
}

impl ServerOverrides {
    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(upload_dir) = &self.upload_dir {
            config.upload_dir = upload_dir.clone();
        }
        if let Some(max_upload_bytes) = self.max_upload_bytes {
            config.max_upload_bytes = max_upload_bytes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.decoder.program, "python");
        assert_eq!(config.decoder.args, vec!["scripts/decode_qr.py"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_switching_kind_resets_command() {
        let mut settings = DecoderSettings::default();
        settings.timeout_secs = 5;

        DecoderOverrides {
            kind: Some(DecoderKind::Ocr),
            ..Default::default()
        }
        .apply_to(&mut settings);

        assert_eq!(settings.program, "tesseract");
        assert!(settings.args.is_empty());
        assert_eq!(settings.trailing_args, vec!["stdout"]);
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.decoder.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.decoder.program = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.decoder = DecoderSettings::for_kind(DecoderKind::Mock);
        assert!(config.validate().is_ok());

        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mock_decoder_is_built() {
        let decoder = DecoderSettings::for_kind(DecoderKind::Mock).build();
        assert_eq!(decoder.name(), "mock");
    }
}
