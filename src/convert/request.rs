//! # 转换请求模型
//!
//! ## 设计思路
//!
//! UI 上分散的格式、质量、尺寸控件在这里收敛为一个 `ConversionRequest` 值，
//! 发送前统一校验，避免把非法参数交给远程 API 再等它报错。

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConvertError;

pub const DEFAULT_QUALITY: u8 = 90;
pub const ARCHIVE_FILE_NAME: &str = "converted-images.zip";

/// 远程 API 支持的输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    #[default]
    Png,
    Webp,
    Tiff,
    Gif,
    Avif,
    Bmp,
    Heif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 8] = [
        Self::Jpeg,
        Self::Png,
        Self::Webp,
        Self::Tiff,
        Self::Gif,
        Self::Avif,
        Self::Bmp,
        Self::Heif,
    ];

    /// 表单字段值，同时也是下载文件的扩展名。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
            Self::Gif => "gif",
            Self::Avif => "avif",
            Self::Bmp => "bmp",
            Self::Heif => "heif",
        }
    }

    /// 有损格式才会用到 quality。
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp | Self::Avif | Self::Heif)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "tiff" | "tif" => Ok(Self::Tiff),
            "gif" => Ok(Self::Gif),
            "avif" => Ok(Self::Avif),
            "bmp" => Ok(Self::Bmp),
            "heif" | "heic" => Ok(Self::Heif),
            other => Err(ConvertError::InvalidRequest(format!("不支持的输出格式：{}", other))),
        }
    }
}

/// 压缩预设，映射到具体 quality。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionPreset {
    Web,
    Print,
    Maximum,
    Balanced,
    Custom,
}

impl CompressionPreset {
    /// `Custom` 不改动当前 quality。
    pub fn quality(self) -> Option<u8> {
        match self {
            Self::Web => Some(80),
            Self::Print => Some(95),
            Self::Maximum => Some(60),
            Self::Balanced => Some(85),
            Self::Custom => None,
        }
    }
}

impl FromStr for CompressionPreset {
    type Err = ConvertError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "print" => Ok(Self::Print),
            "maximum" => Ok(Self::Maximum),
            "balanced" => Ok(Self::Balanced),
            "custom" => Ok(Self::Custom),
            other => Err(ConvertError::InvalidRequest(format!(
                "未知压缩预设：{}（可选：web / print / maximum / balanced / custom）",
                other
            ))),
        }
    }
}

/// 待上传的单个文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ConvertError::InvalidRequest(format!("无效文件名：{}", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)
            .map_err(|e| ConvertError::InvalidRequest(format!("无法读取 {}：{}", path.display(), e)))?;
        Ok(Self::new(name, bytes))
    }

    /// 按魔数推断 MIME，识别不出时退回通用二进制类型。
    pub fn mime_type(&self) -> &'static str {
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream")
    }

    pub fn is_image(&self) -> bool {
        infer::is_image(&self.bytes)
    }
}

/// 一次转换请求。
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    files: Vec<UploadFile>,
    pub format: OutputFormat,
    pub quality: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
            width: None,
            height: None,
        }
    }
}

impl ConversionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    /// 添加文件；同名同大小的文件视为重复，不再添加。
    pub fn add_file(&mut self, file: UploadFile) -> bool {
        let duplicate = self
            .files
            .iter()
            .any(|existing| existing.name == file.name && existing.bytes.len() == file.bytes.len());
        if duplicate {
            log::debug!("📎 跳过重复文件：{}", file.name);
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_preset(mut self, preset: CompressionPreset) -> Self {
        if let Some(quality) = preset.quality() {
            self.quality = quality;
        }
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn total_upload_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.bytes.len() as u64).sum()
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.files.is_empty() {
            return Err(ConvertError::InvalidRequest("请至少选择一张图片".to_string()));
        }
        if let Some(file) = self.files.iter().find(|file| !file.is_image()) {
            return Err(ConvertError::InvalidRequest(format!("不是图片文件：{}", file.name)));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConvertError::InvalidRequest(format!(
                "quality 必须在 1~100 之间：{}",
                self.quality
            )));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ConvertError::InvalidRequest("宽高必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 非文件表单字段，按发送顺序排列；文件统一以 `images` 字段上传。
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("format", self.format.as_str().to_string()),
            ("quality", self.quality.to_string()),
        ];
        if let Some(width) = self.width {
            fields.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            fields.push(("height", height.to_string()));
        }
        fields
    }

    /// 单文件：`<首个 . 之前的文件名>-converted.<format>`；多文件：zip 包。
    pub fn download_file_name(&self) -> String {
        match self.files.as_slice() {
            [single] => {
                let stem = single.name.split('.').next().unwrap_or_default();
                format!("{}-converted.{}", stem, self.format.as_str())
            }
            _ => ARCHIVE_FILE_NAME.to_string(),
        }
    }
}
