//! # 远程转换客户端（convert）
//!
//! ## 设计思路
//!
//! 真正的格式转换、压缩、缩放都在远程 API 完成，这里只负责：
//! - `request`：组装并校验转换请求、决定下载文件名
//! - `client`：以 multipart 上传并取回二进制结果（单文件或 zip）
//! - `config/error`：配置与错误
//!
//! 调用链：
//!
//! ```text
//! ConversionRequest::new() + add_file()
//!    ↓ format / quality / preset / width / height
//! validate()
//!    ↓
//! ConversionClient::convert()  ──POST <base>/api/convert──▶ 远程 API
//!    ↓
//! ConvertedOutput { file_name, content_type, bytes }
//! ```

mod client;
mod config;
mod error;
mod request;

pub use client::{ConversionClient, ConvertedOutput};
pub use config::{ConvertConfig, API_BASE_URL_ENV};
pub use error::ConvertError;
pub use request::{CompressionPreset, ConversionRequest, OutputFormat, UploadFile};
