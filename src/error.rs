use thiserror::Error;

use crate::models::ItemId;

/// 分类客户端错误
///
/// 每一种错误的 `Display` 文本就是写回条目的 `error_message`。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// 网络传输失败（连接失败、读取响应体失败等）
    #[error("网络请求失败: {0}")]
    Network(String),

    /// 服务端返回非成功状态码
    #[error("{}", server_error_message(.status, .body))]
    Server { status: u16, body: String },

    /// 响应内容不符合分类结果结构
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),
}

/// 服务端错误的展示文本
///
/// FastAPI 风格的 `{"detail": "..."}` 取 `detail`；否则原样使用响应体；
/// 响应体为空或只有空白时给出包含状态码的通用提示。
fn server_error_message(status: &u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|v| v.as_str()) {
            return detail.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("服务器错误: HTTP {}", status)
    } else {
        body.to_string()
    }
}

impl From<reqwest::Error> for ClassifyError {
    fn from(err: reqwest::Error) -> Self {
        ClassifyError::Network(err.to_string())
    }
}

/// 编排层拒绝执行的原因
///
/// 这些都不是致命错误，只表示本次调用被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("条目不存在: {0}")]
    ItemNotFound(ItemId),

    #[error("条目 {0} 正在分析中")]
    AlreadyAnalyzing(ItemId),

    #[error("条目 {0} 已完成分析")]
    AlreadyCompleted(ItemId),

    #[error("批量分析正在进行中")]
    SweepInProgress,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 图片加载错误
    #[error("图片加载失败 ({path}): {message}")]
    Ingest { path: String, message: String },

    /// 文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML 解析错误
    #[error("TOML解析失败: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP 客户端错误
    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    /// 编排层拒绝执行
    #[error("编排错误: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

impl AppError {
    /// 创建图片加载错误
    pub fn ingest(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Ingest {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
