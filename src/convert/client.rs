//! # 转换 API 客户端
//!
//! ## 实现思路
//!
//! - 复用同一个 `reqwest::Client`，超时来自 `ConvertConfig`。
//! - 请求体为 multipart：文件字段 `images`（可重复），其余字段见 `form_fields()`。
//! - 响应为二进制：单文件结果或 zip 包；失败时尽量读取服务端 JSON 中的 `error` 字段。
//! - 响应体积先看 `Content-Length`，再按数据块累计：超过 `max_response_bytes` 立即中止，
//!   分块传输（无 `Content-Length`）时同样有界；首包与块间各有独立超时。
//! - 错误响应体只读取前 `MAX_ERROR_BODY_BYTES` 字节用于提取 `error` 字段。

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use reqwest::multipart::{Form, Part};

use super::{ConversionRequest, ConvertConfig, ConvertError};

/// 错误响应体的读取上限。
const MAX_ERROR_BODY_BYTES: u64 = 64 * 1024;
const BUFFER_INITIAL_CAPACITY: usize = 64 * 1024;

/// 转换结果。
#[derive(Debug, Clone)]
pub struct ConvertedOutput {
    /// 建议的下载文件名。
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ConvertedOutput {
    pub fn is_archive(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/zip"))
            || self.file_name.ends_with(".zip")
    }
}

pub struct ConversionClient {
    config: ConvertConfig,
    endpoint: reqwest::Url,
    http_client: reqwest::Client,
}

impl ConversionClient {
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .build()
            .map_err(|e| ConvertError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            config,
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    fn build_form(request: &ConversionRequest) -> Result<Form, ConvertError> {
        let mut form = Form::new();
        for file in request.files() {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(file.mime_type())
                .map_err(|e| ConvertError::InvalidRequest(format!("无效 MIME 类型：{}", e)))?;
            form = form.part("images", part);
        }
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }

    /// 上传并等待转换结果。
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConvertedOutput, ConvertError> {
        request.validate()?;

        let upload_bytes = request.total_upload_bytes();
        if upload_bytes > self.config.max_upload_bytes {
            return Err(ConvertError::ResourceLimit(format!(
                "上传体积过大：{:.2} MB（限制：{:.2} MB）",
                upload_bytes as f64 / 1024.0 / 1024.0,
                self.config.max_upload_bytes as f64 / 1024.0 / 1024.0
            )));
        }
        if !request.format.is_lossy() {
            log::debug!("ℹ️ {} 为无损格式，quality={} 仅供服务端参考", request.format, request.quality);
        }

        log::info!(
            "📤 开始上传转换请求 - files={} size={}KB format={} quality={}",
            request.files().len(),
            upload_bytes / 1024,
            request.format,
            request.quality
        );

        let start = Instant::now();
        let form = Self::build_form(request)?;
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = self
                .read_body(response, MAX_ERROR_BODY_BYTES)
                .await
                .unwrap_or_default();
            let message = Self::server_error_message(&body)
                .unwrap_or_else(|| "Failed to convert images.".to_string());
            log::warn!("⚠️ 转换失败 - HTTP {}: {}", status.as_u16(), message);
            return Err(ConvertError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if let Some(length) = response.content_length() {
            self.check_response_size(length)?;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = self.read_body(response, self.config.max_response_bytes).await?;

        let output = ConvertedOutput {
            file_name: request.download_file_name(),
            content_type,
            bytes,
        };

        log::info!(
            "✅ 转换完成 - {} ({}KB) elapsed={}ms",
            output.file_name,
            output.bytes.len() / 1024,
            start.elapsed().as_millis()
        );

        Ok(output)
    }

    /// 逐块读取响应体，累计体积超过 `limit` 时立即中止。
    async fn read_body(
        &self,
        mut response: reqwest::Response,
        limit: u64,
    ) -> Result<Bytes, ConvertError> {
        let initial_capacity = response
            .content_length()
            .map(|len| len.min(limit).min(usize::MAX as u64) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = BytesMut::with_capacity(initial_capacity);
        let mut total: u64 = 0;
        let mut received_first_chunk = false;

        loop {
            let read_timeout = if received_first_chunk {
                Duration::from_millis(self.config.stream_chunk_timeout_ms)
            } else {
                Duration::from_millis(self.config.stream_first_byte_timeout_ms)
            };

            let next_chunk_result = tokio::time::timeout(read_timeout, response.chunk())
                .await
                .map_err(|_| {
                    if received_first_chunk {
                        ConvertError::Timeout("响应数据流读取超时".to_string())
                    } else {
                        ConvertError::Timeout("响应首包超时".to_string())
                    }
                })?;

            let Some(chunk) = next_chunk_result.map_err(Self::map_reqwest_error)? else {
                break;
            };
            received_first_chunk = true;

            total = total.saturating_add(chunk.len() as u64);
            if total > limit {
                return Err(ConvertError::ResourceLimit(format!(
                    "响应体积超过限制：{:.2} MB",
                    limit as f64 / 1024.0 / 1024.0
                )));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("📥 响应读取完成 - {} bytes", total);
        Ok(buffer.freeze())
    }

    fn check_response_size(&self, length: u64) -> Result<(), ConvertError> {
        if length > self.config.max_response_bytes {
            return Err(ConvertError::ResourceLimit(format!(
                "响应体积过大：{:.2} MB（限制：{:.2} MB）",
                length as f64 / 1024.0 / 1024.0,
                self.config.max_response_bytes as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    /// 服务端错误体形如 `{"error": "..."}`。
    pub(crate) fn server_error_message(body: &[u8]) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        value
            .get("error")
            .and_then(|error| error.as_str())
            .map(str::to_string)
    }

    fn map_reqwest_error(e: reqwest::Error) -> ConvertError {
        if e.is_timeout() {
            ConvertError::Timeout(format!("请求超时：{}", e))
        } else {
            ConvertError::Network(format!("请求失败：{}", e))
        }
    }
}
