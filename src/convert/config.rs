//! 转换客户端配置。

use serde::{Deserialize, Serialize};

use super::ConvertError;

/// 未显式配置 `api_base_url` 时读取的环境变量。
pub const API_BASE_URL_ENV: &str = "IMAGE_CONVERTER_API_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// 远程 API 根地址，例如 `https://convert.example.com`。
    pub api_base_url: Option<String>,
    /// 整体请求超时时间（秒）。
    pub request_timeout: u64,
    /// 建立连接超时时间（秒）。
    pub connect_timeout: u64,
    /// 允许的最大响应体积（字节）。
    pub max_response_bytes: u64,
    /// 单次请求允许上传的总体积（字节）。
    pub max_upload_bytes: u64,
    /// 响应头到达后，等待首个数据块的超时时间（毫秒）。
    pub stream_first_byte_timeout_ms: u64,
    /// 相邻数据块之间的超时时间（毫秒）。
    pub stream_chunk_timeout_ms: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout: 120,
            connect_timeout: 8,
            max_response_bytes: 512 * 1024 * 1024,
            max_upload_bytes: 200 * 1024 * 1024,
            stream_first_byte_timeout_ms: 30_000,
            stream_chunk_timeout_ms: 15_000,
        }
    }
}

impl ConvertConfig {
    /// 用环境变量补全未配置的根地址。
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_base_url.is_none() {
            self.api_base_url = std::env::var(API_BASE_URL_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty());
        }
        self
    }

    /// 拼出 `<base>/api/convert`。
    pub fn endpoint(&self) -> Result<reqwest::Url, ConvertError> {
        let base = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| {
                ConvertError::Config(format!("未配置 API 地址（可设置 {}）", API_BASE_URL_ENV))
            })?;

        let url = format!("{}/api/convert", base.trim_end_matches('/'));
        reqwest::Url::parse(&url)
            .map_err(|e| ConvertError::Config(format!("API 地址格式错误：{}", e)))
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if !(1..=3600).contains(&self.request_timeout) {
            return Err(ConvertError::Config("request_timeout 必须在 1~3600 秒之间".to_string()));
        }
        if !(1..=120).contains(&self.connect_timeout) {
            return Err(ConvertError::Config("connect_timeout 必须在 1~120 秒之间".to_string()));
        }
        if self.max_response_bytes == 0 || self.max_upload_bytes == 0 {
            return Err(ConvertError::Config("体积上限不能为 0".to_string()));
        }
        if self.stream_first_byte_timeout_ms == 0 || self.stream_chunk_timeout_ms == 0 {
            return Err(ConvertError::Config("数据流读取超时不能为 0".to_string()));
        }
        Ok(())
    }
}
