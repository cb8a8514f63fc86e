//! # 配置模块
//!
//! ## 设计思路
//!
//! 将预览链路的“可调策略”集中到 `PreviewConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供平衡配置。
//! - `PreviewPerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体阈值。
//! - `infer_performance_profile` 用于从当前配置反推档位。

use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::PreviewError;

/// 预览处理配置。
///
/// 字段覆盖了读取、解码与预览降采样三个阶段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 是否对大图做预览降采样。
    pub adaptive_resize: bool,
    /// 降采样后目标像素上限。
    pub preview_target_pixels: u64,
    /// 降采样后宽/高单边最大值。
    pub preview_max_dimension: u32,
    /// 降采样滤镜策略。
    #[serde(with = "filter_type_serde")]
    pub resize_filter: FilterType,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            adaptive_resize: true,
            preview_target_pixels: 5_000_000,
            preview_max_dimension: 2560,
            resize_filter: FilterType::Triangle,
        }
    }
}

/// 预览性能档位。
///
/// - `Quality`：不降采样，按原图渲染
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先交互响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl FromStr for PreviewPerformanceProfile {
    type Err = PreviewError;

    fn from_str(profile: &str) -> Result<Self, Self::Err> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(PreviewError::InvalidParameter(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }
}

impl PreviewPerformanceProfile {
    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl PreviewConfig {
    /// 基于当前参数反推性能档位。
    pub fn infer_performance_profile(&self) -> PreviewPerformanceProfile {
        if !self.adaptive_resize {
            return PreviewPerformanceProfile::Quality;
        }

        if self.preview_target_pixels <= 2_000_000 || self.preview_max_dimension <= 1920 {
            return PreviewPerformanceProfile::Speed;
        }

        PreviewPerformanceProfile::Balanced
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_performance_profile(&mut self, profile: PreviewPerformanceProfile) {
        match profile {
            PreviewPerformanceProfile::Quality => {
                self.adaptive_resize = false;
                self.preview_target_pixels = self.max_decoded_pixels;
                self.preview_max_dimension = 8192;
                self.resize_filter = FilterType::CatmullRom;
            }
            PreviewPerformanceProfile::Balanced => {
                self.adaptive_resize = true;
                self.preview_target_pixels = 5_000_000;
                self.preview_max_dimension = 2560;
                self.resize_filter = FilterType::Triangle;
            }
            PreviewPerformanceProfile::Speed => {
                self.adaptive_resize = true;
                self.preview_target_pixels = 2_000_000;
                self.preview_max_dimension = 1920;
                self.resize_filter = FilterType::Nearest;
            }
        }
    }

    /// 校验配置是否自洽。
    pub fn validate(&self) -> Result<(), PreviewError> {
        if self.max_file_size == 0 {
            return Err(PreviewError::InvalidParameter("max_file_size 不能为 0".to_string()));
        }
        if self.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(PreviewError::InvalidParameter("max_decoded_bytes 不能小于 8MB".to_string()));
        }
        if self.preview_max_dimension == 0 || self.preview_target_pixels == 0 {
            return Err(PreviewError::InvalidParameter("预览降采样目标不能为 0".to_string()));
        }
        Ok(())
    }
}

/// `FilterType` 没有实现 serde，这里以小写名称存取。
mod filter_type_serde {
    use image::imageops::FilterType;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(filter: &FilterType, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let name = match filter {
            FilterType::Nearest => "nearest",
            FilterType::Triangle => "triangle",
            FilterType::CatmullRom => "catmull-rom",
            FilterType::Gaussian => "gaussian",
            FilterType::Lanczos3 => "lanczos3",
        };
        serializer.serialize_str(name)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<FilterType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "triangle" => Ok(FilterType::Triangle),
            "catmull-rom" => Ok(FilterType::CatmullRom),
            "gaussian" => Ok(FilterType::Gaussian),
            "lanczos3" => Ok(FilterType::Lanczos3),
            other => Err(serde::de::Error::custom(format!("unknown resize filter: {other}"))),
        }
    }
}
