use crate::error::ConfigError;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 收集端地址（接收 JSON 并写入表格）
    pub collector_url: String,
    /// 本地快照文件路径
    pub storage_path: String,
    /// 自定义题目 TOML 文件（为空时使用内置题目）
    pub questions_file: Option<String>,
    /// 单选题自动翻页延迟（毫秒）
    pub auto_advance_delay_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector_url: "https://script.google.com/macros/s/AKfycbx_0ceWBWxqDHWD1o1IDTRRhO5brmfzabQSpO-cspQB7fzhRUeJbxFEbIalFptYL63T/exec".to_string(),
            storage_path: "wizard_state.json".to_string(),
            questions_file: None,
            auto_advance_delay_ms: 300,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            collector_url: std::env::var("COLLECTOR_URL").unwrap_or(default.collector_url),
            storage_path: std::env::var("STORAGE_PATH").unwrap_or(default.storage_path),
            questions_file: std::env::var("QUESTIONS_FILE").ok().filter(|v| !v.trim().is_empty()),
            auto_advance_delay_ms: std::env::var("AUTO_ADVANCE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.auto_advance_delay_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "COLLECTOR_URL".to_string(),
                reason: "不能为空".to_string(),
            });
        }
        if self.auto_advance_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "AUTO_ADVANCE_DELAY_MS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}
