//! # 解码与预览降采样模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低异常输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 根据配置决定是否降采样（预览本就是近似结果）
//! 5. 转换 RGBA，作为只读 `SourceImage` 交给渲染器

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba};
use std::io::Cursor;

use super::render::SourceImage;
use super::source::RawImageData;
use super::{PreviewConfig, PreviewError, PreviewHandler};

impl PreviewHandler {
    /// 将原始字节解码为渲染器可用的只读源图。
    pub(crate) fn decode_source(
        &self,
        raw: RawImageData,
        config: &PreviewConfig,
    ) -> Result<SourceImage, PreviewError> {
        image::guess_format(&raw.bytes)
            .map_err(|e| PreviewError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| PreviewError::Decode(format!("图片解码失败：{}", e)))?;

        let (raw_width, raw_height) = decoded.dimensions();
        if raw_width == 0 || raw_height == 0 {
            return Err(PreviewError::Decode("图片尺寸为 0".to_string()));
        }
        Self::validate_pixel_limits(config, raw_width, raw_height)?;
        Self::validate_decoded_memory_limits(config, raw_width, raw_height)?;

        let optimized = Self::maybe_downscale_for_preview(decoded, config);
        let rgba = optimized.to_rgba8();

        log::info!(
            "✅ 图片解码成功 - 来源: {} 原始尺寸: {}x{} 预览尺寸: {}x{}",
            raw.source_hint,
            raw_width,
            raw_height,
            rgba.width(),
            rgba.height()
        );

        Ok(SourceImage::from_rgba(rgba))
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), PreviewError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PreviewError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| PreviewError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    fn validate_pixel_limits(
        config: &PreviewConfig,
        width: u32,
        height: u32,
    ) -> Result<(), PreviewError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| PreviewError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(PreviewError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &PreviewConfig,
        width: u32,
        height: u32,
    ) -> Result<(), PreviewError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| PreviewError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(PreviewError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 计算预览降采样目标尺寸；无需降采样时返回 `None`。
    pub(super) fn preview_target_size(
        width: u32,
        height: u32,
        config: &PreviewConfig,
    ) -> Option<(u32, u32)> {
        if !config.adaptive_resize {
            return None;
        }

        let source_pixels = width as u64 * height as u64;
        let over_dimension =
            width > config.preview_max_dimension || height > config.preview_max_dimension;
        let over_pixels = source_pixels > config.preview_target_pixels;

        if !over_dimension && !over_pixels {
            return None;
        }

        let dimension_scale = (config.preview_max_dimension as f64 / width as f64)
            .min(config.preview_max_dimension as f64 / height as f64);
        let pixel_scale = (config.preview_target_pixels as f64 / source_pixels as f64).sqrt();
        let scale = dimension_scale.min(pixel_scale).min(1.0);

        let target_width = ((width as f64 * scale).floor() as u32).max(1);
        let target_height = ((height as f64 * scale).floor() as u32).max(1);
        Some((target_width, target_height))
    }

    fn maybe_downscale_for_preview(image: DynamicImage, config: &PreviewConfig) -> DynamicImage {
        let (width, height) = image.dimensions();
        let Some((target_width, target_height)) = Self::preview_target_size(width, height, config)
        else {
            return image;
        };

        log::info!(
            "🧩 预览降采样：{}x{} -> {}x{}（filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            config.resize_filter
        );

        match Self::resize_with_fast_image_resize(&image, target_width, target_height, config.resize_filter)
        {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
                image.resize_exact(target_width, target_height, config.resize_filter)
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, PreviewError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| PreviewError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| PreviewError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| PreviewError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Gaussian,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
