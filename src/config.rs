use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 检验结果 API 配置 ---
    pub lab_api_base_url: String,
    /// 为空时不发送 Authorization 头
    pub lab_api_token: String,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 同时处理的结果单数量
    pub max_concurrent_exams: usize,
    /// 结果单 TOML 文件存放目录
    pub sheet_folder: String,
    /// 处理成功后是否删除结果单文件
    pub remove_processed_sheets: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lab_api_base_url: "http://localhost:8000/api".to_string(),
            lab_api_token: String::new(),
            request_timeout_secs: 30,
            max_concurrent_exams: 8,
            sheet_folder: "result_sheets".to_string(),
            remove_processed_sheets: false,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 若设置了 `LAB_CONFIG`，先读取该 TOML 文件作为基础值，
    /// 其余环境变量再覆盖对应字段。
    pub fn from_env() -> AppResult<Self> {
        let base = match std::env::var("LAB_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        let config = Self {
            lab_api_base_url: std::env::var("LAB_API_BASE_URL").unwrap_or(self.lab_api_base_url),
            lab_api_token: std::env::var("LAB_API_TOKEN").unwrap_or(self.lab_api_token),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            max_concurrent_exams: parse_env("MAX_CONCURRENT_EXAMS", "usize")?
                .unwrap_or(self.max_concurrent_exams),
            sheet_folder: std::env::var("SHEET_FOLDER").unwrap_or(self.sheet_folder),
            remove_processed_sheets: parse_env("REMOVE_PROCESSED_SHEETS", "bool")?
                .unwrap_or(self.remove_processed_sheets),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验配置值
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_exams == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_concurrent_exams".to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        if self.lab_api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "lab_api_base_url".to_string(),
                reason: "不能为空".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// 读取并解析环境变量；未设置时返回 `None`，无法解析时报错
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            lab_api_base_url = "https://lab.example.org/api"
            max_concurrent_exams = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.lab_api_base_url, "https://lab.example.org/api");
        assert_eq!(config.max_concurrent_exams, 2);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.sheet_folder, "result_sheets");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = Config {
            max_concurrent_exams: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidValue { .. })));
    }
}
