use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "CLASSIFIER_CONFIG";

/// 程序配置文件
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 推理服务地址
    pub api_base_url: String,
    /// 待分类图片目录
    pub image_folder: String,
    /// 成功后展示"分析中"的沉淀时长（毫秒）
    pub settle_delay_ms: u64,
    /// 阶段推进间隔（毫秒）
    pub stage_tick_ms: u64,
    /// 阶段推进最长持续时间（毫秒）
    pub stage_total_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 分类报告输出文件
    pub report_file: String,
    /// 启动时是否检查推理服务健康状态
    pub check_health: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            image_folder: "images".to_string(),
            settle_delay_ms: 2000,
            stage_tick_ms: 800,
            stage_total_ms: 4000,
            verbose_logging: false,
            report_file: "classification_report.json".to_string(),
            check_health: true,
        }
    }
}

/// 编排层使用的时间参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingSettings {
    pub settle_delay: Duration,
    pub stage_tick: Duration,
    pub stage_total: Duration,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Config::default().timing()
    }
}

impl Config {
    /// 加载配置：先读 `CLASSIFIER_CONFIG` 指定的文件（若有），再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 在默认值上叠加环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺失的键使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖已有配置，无法解析的值保持原样
    pub fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            image_folder: std::env::var("IMAGE_FOLDER").unwrap_or(self.image_folder),
            settle_delay_ms: env_parse("SETTLE_DELAY_MS").unwrap_or(self.settle_delay_ms),
            stage_tick_ms: env_parse("STAGE_TICK_MS").unwrap_or(self.stage_tick_ms),
            stage_total_ms: env_parse("STAGE_TOTAL_MS").unwrap_or(self.stage_total_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            report_file: std::env::var("REPORT_FILE").unwrap_or(self.report_file),
            check_health: env_parse("CHECK_HEALTH").unwrap_or(self.check_health),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config("api_base_url 不能为空".to_string()));
        }
        if self.stage_tick_ms == 0 {
            return Err(AppError::Config("stage_tick_ms 必须大于 0".to_string()));
        }
        Ok(())
    }

    pub fn timing(&self) -> TimingSettings {
        TimingSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            stage_tick: Duration::from_millis(self.stage_tick_ms),
            stage_total: Duration::from_millis(self.stage_total_ms),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
