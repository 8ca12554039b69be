use crate::config::toml_config::TomlConfig;
use crate::config::{DecoderKind, DecoderOverrides, DecoderSettings, ServerConfig, ServerOverrides};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "aadhaar-verify")]
#[command(about = "HTTP service that verifies uploaded Aadhaar images with an external decoder")]
pub struct ServerArgs {
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PORT", help = "Listen port [default: 5000]")]
    pub port: Option<u16>,

    #[arg(long, help = "Scratch directory for uploads [default: uploads]")]
    pub upload_dir: Option<PathBuf>,

    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    #[command(flatten)]
    pub decoder: DecoderArgs,

    #[arg(long, help = "TOML file with [server] and [decoder] sections")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ServerArgs {
    /// 優先順序：預設值 < 設定檔 < 命令列/環境變數
    pub fn load(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        if let Some(path) = &self.config {
            tracing::info!("Loading config file {}", path.display());
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }

        ServerOverrides {
            host: self.host.clone(),
            port: self.port,
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
        .apply_to(&mut config);

        self.decoder.overrides().apply_to(&mut config.decoder);

        Ok(config)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct DecoderArgs {
    #[arg(long = "decoder", value_enum)]
    pub kind: Option<DecoderKind>,

    #[arg(long = "decoder-program")]
    pub program: Option<String>,

    /// Argument placed before the image path (repeatable)
    #[arg(long = "decoder-arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Argument placed after the image path (repeatable)
    #[arg(long = "decoder-trailing-arg", allow_hyphen_values = true)]
    pub trailing_args: Vec<String>,

    #[arg(long = "decode-timeout-secs")]
    pub timeout_secs: Option<u64>,
}

impl DecoderArgs {
    pub fn overrides(&self) -> DecoderOverrides {
        DecoderOverrides {
            kind: self.kind,
            program: self.program.clone(),
            args: (!self.args.is_empty()).then(|| self.args.clone()),
            trailing_args: (!self.trailing_args.is_empty()).then(|| self.trailing_args.clone()),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "score_document")]
#[command(about = "Decode an Aadhaar image and print its verification score")]
pub struct ScoreArgs {
    pub image_path: Option<PathBuf>,

    pub expected_name: Option<String>,

    #[command(flatten)]
    pub decoder: DecoderArgs,

    #[arg(long, help = "TOML file with a [decoder] section")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ScoreArgs {
    pub const USAGE: &'static str = "Usage: score_document <image_file_path> <user_name>";

    /// The scoring tool reads OCR text unless told otherwise.
    pub fn decoder_settings(&self) -> Result<DecoderSettings> {
        let mut settings = DecoderSettings::for_kind(DecoderKind::Ocr);

        if let Some(path) = &self.config {
            TomlConfig::from_file(path)?.decoder.apply_to(&mut settings);
        }

        self.decoder.overrides().apply_to(&mut settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_server_args_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nport = 8080\nupload_dir = \"/tmp/scratch\"\n")
            .unwrap();

        let args = ServerArgs::try_parse_from([
            "aadhaar-verify",
            "--config",
            file.path().to_str().unwrap(),
            "--port",
            "9090",
            "--decoder",
            "mock",
        ])
        .unwrap();

        let config = args.load().unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/scratch"));
        assert_eq!(config.decoder.kind, DecoderKind::Mock);
    }

    #[test]
    fn test_decoder_args_are_collected() {
        let args = ServerArgs::try_parse_from([
            "aadhaar-verify",
            "--decoder-program",
            "python3",
            "--decoder-arg",
            "-u",
            "--decoder-arg",
            "decode.py",
            "--decode-timeout-secs",
            "5",
        ])
        .unwrap();

        let config = args.load().unwrap();
        assert_eq!(config.decoder.program, "python3");
        assert_eq!(config.decoder.args, vec!["-u", "decode.py"]);
        assert_eq!(config.decoder.timeout_secs, 5);
    }

    #[test]
    fn test_score_args_default_to_ocr() {
        let args = ScoreArgs::try_parse_from(["score_document", "card.png", "Jane Doe"]).unwrap();

        assert_eq!(args.image_path, Some(PathBuf::from("card.png")));
        assert_eq!(args.expected_name.as_deref(), Some("Jane Doe"));
        assert_eq!(args.decoder_settings().unwrap().kind, DecoderKind::Ocr);
    }

    #[test]
    fn test_score_args_allow_missing_path() {
        let args = ScoreArgs::try_parse_from(["score_document"]).unwrap();
        assert!(args.image_path.is_none());
    }
}
