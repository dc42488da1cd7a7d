use thiserror::Error;

/// 问卷向导错误类型
///
/// 所有错误都在产生它的操作边界上被捕获，不会导致进程退出
#[derive(Debug, Error)]
pub enum WizardError {
    /// 必填项未作答（阻止翻页，交给展示层提示）
    #[error("必填项未作答 ({question_id}): {message}")]
    Validation { question_id: String, message: String },

    /// 选择的文件数量超过上限（在输入层拒绝）
    #[error("文件数量超出上限 ({question_id}): 最多 {max} 个, 实际选择 {got} 个")]
    TooManyFiles {
        question_id: String,
        max: usize,
        got: usize,
    },

    /// 文件无法读取或转换为 base64（该文件会被跳过）
    #[error("读取文件失败 ({name}): {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// 网络请求失败或响应无法解析
    #[error("网络请求失败: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// 收集端返回 status != "success"
    #[error("{message}")]
    Server { message: String },

    /// 本地快照损坏（静默丢弃）
    #[error("本地快照解析失败: {source}")]
    PersistenceParse {
        #[from]
        source: serde_json::Error,
    },

    /// 题目列表定义不合法
    #[error("题目定义错误: {0}")]
    Registry(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl WizardError {
    /// 创建必填项校验错误
    pub fn validation(question_id: impl Into<String>, message: impl Into<String>) -> Self {
        WizardError::Validation {
            question_id: question_id.into(),
            message: message.into(),
        }
    }

    /// 创建服务端错误
    pub fn server(message: impl Into<String>) -> Self {
        WizardError::Server {
            message: message.into(),
        }
    }

    /// 创建文件读取错误
    pub fn file_read(name: impl Into<String>, source: std::io::Error) -> Self {
        WizardError::FileRead {
            name: name.into(),
            source,
        }
    }

    /// 是否为提交阶段的错误（网络或服务端）
    pub fn is_submission_error(&self) -> bool {
        matches!(self, WizardError::Network { .. } | WizardError::Server { .. })
    }
}

// ========== Result 类型别名 ==========

/// 问卷向导结果类型
pub type WizardResult<T> = Result<T, WizardError>;
