use crate::config::{DecoderOverrides, ServerConfig, ServerOverrides};
use crate::utils::error::{Result, VerifyError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `[server]` / `[decoder]` overrides read from a TOML file.
///
/// ```toml
/// [server]
/// port = 8080
/// upload_dir = "/var/tmp/aadhaar"
///
/// [decoder]
/// kind = "script"
/// program = "${PYTHON_BIN}"
/// args = ["scripts/decode_qr.py"]
/// timeout_secs = 20
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerOverrides,
    #[serde(default)]
    pub decoder: DecoderOverrides,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| VerifyError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${PYTHON_BIN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("valid regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn apply_to(&self, config: &mut ServerConfig) {
        self.server.apply_to(config);
        self.decoder.apply_to(&mut config.decoder);
    }
}
