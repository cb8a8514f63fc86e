//! 转换链路错误类型。

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("请求参数错误：{0}")]
    InvalidRequest(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("服务端错误（HTTP {status}）：{message}")]
    Server { status: u16, message: String },

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("配置错误：{0}")]
    Config(String),
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::Network(_) => "E_NETWORK",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Server { .. } => "E_SERVER",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Config(_) => "E_CONFIG",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::Config(_) => "prepare",
            Self::Network(_) | Self::Timeout(_) => "upload",
            Self::Server { .. } | Self::ResourceLimit(_) => "response",
        }
    }
}
