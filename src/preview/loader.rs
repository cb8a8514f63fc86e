//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（Base64 / 本地文件 / 内存字节）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - Base64：格式解析 + 解码前体积估算 + 解码后体积限制。
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 所有来源最后都做一次魔数签名校验，只接受图片类型。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawImageData;
use super::{PreviewConfig, PreviewError, PreviewHandler};

impl PreviewHandler {
    /// 从 Base64 字符串加载图片原始字节。
    pub(super) fn load_from_base64(
        &self,
        data: &str,
        config: &PreviewConfig,
    ) -> Result<RawImageData, PreviewError> {
        log::info!("📝 开始处理 base64 图片");

        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;

        if bytes.len() as u64 > config.max_file_size {
            return Err(PreviewError::ResourceLimit(format!(
                "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    /// 从本地路径加载图片原始字节。
    pub(super) fn load_from_file(
        &self,
        path: &str,
        config: &PreviewConfig,
    ) -> Result<RawImageData, PreviewError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(PreviewError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| PreviewError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_file_size {
            return Err(PreviewError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(file_path)
            .map_err(|e| PreviewError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }

    /// 接收已在内存中的上传文件。
    pub(super) fn load_from_bytes(
        &self,
        bytes: Vec<u8>,
        config: &PreviewConfig,
    ) -> Result<RawImageData, PreviewError> {
        if bytes.len() as u64 > config.max_file_size {
            return Err(PreviewError::ResourceLimit(format!(
                "上传文件过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "upload",
        })
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, PreviewError> {
        let len = base64_data.trim().len() as u64;
        if len == 0 {
            return Err(PreviewError::InvalidFormat("Base64 内容为空".to_string()));
        }

        len.div_ceil(4)
            .checked_mul(3)
            .ok_or_else(|| PreviewError::ResourceLimit("Base64 体积估算溢出".to_string()))
    }

    pub(super) fn parse_base64_with_limit(
        data: &str,
        max_file_size: u64,
    ) -> Result<Vec<u8>, PreviewError> {
        let normalized = data.trim();

        let base64_data = if normalized.starts_with("data:image/") {
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| PreviewError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(base64_data)?;
        if estimated_len > max_file_size {
            return Err(PreviewError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(base64_data)
            .map_err(|e| PreviewError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), PreviewError> {
        if bytes.is_empty() {
            return Err(PreviewError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| PreviewError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(PreviewError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn load_from_base64_rejects_non_image_payload() {
        let handler = PreviewHandler::new(PreviewConfig::default()).expect("handler init failed");
        let encoded = general_purpose::STANDARD.encode(b"%PDF-1.7 not an image");

        let result = handler.load_from_base64(&encoded, &PreviewConfig::default());
        assert!(matches!(result, Err(PreviewError::InvalidFormat(_))));
    }

    #[test]
    fn parse_base64_with_limit_rejects_large_payload_before_decode() {
        let huge = "A".repeat(1024 * 1024);
        let result = PreviewHandler::parse_base64_with_limit(&huge, 32);

        assert!(matches!(result, Err(PreviewError::ResourceLimit(_))));
    }

    #[test]
    fn parse_base64_accepts_data_url_prefix() {
        let encoded = general_purpose::STANDARD.encode(PNG_SIGNATURE);
        let data_url = format!("data:image/png;base64,{}", encoded);

        let decoded = PreviewHandler::parse_base64_with_limit(&data_url, 1024).expect("parse failed");
        assert_eq!(decoded, PNG_SIGNATURE);
    }

    #[test]
    fn data_url_without_base64_marker_is_rejected() {
        let result = PreviewHandler::parse_base64_with_limit("data:image/png,abcd", 1024);
        assert!(matches!(result, Err(PreviewError::InvalidFormat(_))));
    }

    #[test]
    fn load_from_file_reports_missing_file() {
        let handler = PreviewHandler::new(PreviewConfig::default()).expect("handler init failed");
        let result = handler.load_from_file("/definitely/not/here.png", &PreviewConfig::default());

        assert!(matches!(result, Err(PreviewError::FileSystem(_))));
    }

    #[test]
    fn load_from_bytes_enforces_size_limit() {
        let handler = PreviewHandler::new(PreviewConfig::default()).expect("handler init failed");
        let mut config = PreviewConfig::default();
        config.max_file_size = 4;

        let result = handler.load_from_bytes(PNG_SIGNATURE.to_vec(), &config);
        assert!(matches!(result, Err(PreviewError::ResourceLimit(_))));
    }
}
