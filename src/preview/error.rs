//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载预览链路中的所有错误来源，避免字符串拼接式错误处理。
//! 渲染器本身不产生错误，这里的分支全部来自加载、解码与导出阶段。

/// 预览链路统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("参数错误：{0}")]
    InvalidParameter(String),
}

impl PreviewError {
    /// 稳定错误码，供宿主层按分支展示。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Encode(_) => "E_ENCODE",
            Self::InvalidParameter(_) => "E_INVALID_PARAMETER",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) => "load",
            Self::Decode(_) | Self::InvalidFormat(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "export",
            Self::InvalidParameter(_) => "params",
        }
    }
}
