//! # 预览渲染器
//!
//! ## 设计思路
//!
//! `render(source, params)` 是 (源图, 参数) → 新图 的纯函数：
//! 不修改源图、不保留状态，每次参数变化都从原始解码结果全量重算，
//! 避免多次编辑之间的取整误差累积。
//!
//! ## 阶段顺序（固定）
//!
//! ```text
//! geometry（旋转 → 镜像）
//!    ↓
//! color（灰度 → 怀旧 → 反相 → 亮度 → 对比度 → 饱和度 → 叠加色 → 收敛取整）
//!    ↓
//! blur（仅 blur > 0）
//!    ↓
//! sharpen（仅开启时）
//! ```
//!
//! 几何变换在颜色之前，保证颜色与卷积阶段看到的是最终的像素邻域；
//! 模糊与锐化依赖已完成调色的邻居像素，所以放在最后。

pub mod blur;
pub mod color;
pub mod geometry;
mod params;
pub mod sharpen;

use std::time::Instant;

use image::RgbaImage;

pub use color::PixelColor;
pub use params::{
    FilterParameters, Rotation, TintColor, BLUR_RANGE, BRIGHTNESS_RANGE, CONTRAST_RANGE,
    SATURATION_RANGE,
};

/// 渲染输出，每次渲染新分配，归调用方所有。
pub type RenderedImage = RgbaImage;

/// 已解码的只读源图。
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// 以上一次的渲染结果作为新的源图（例如连续旋转）。
impl From<RenderedImage> for SourceImage {
    fn from(rendered: RenderedImage) -> Self {
        Self::from_rgba(rendered)
    }
}

/// 按固定阶段顺序渲染预览图。
///
/// 参数需由调用方预先收敛到合法范围（见 [`FilterParameters::clamped`]），
/// 渲染器对任何合法参数都不会失败。
///
/// # 示例
/// ```rust
/// use image::{Rgba, RgbaImage};
/// use image_converter::preview::{render, FilterParameters, Rotation, SourceImage};
///
/// let source = SourceImage::from_rgba(RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255])));
/// let params = FilterParameters {
///     rotation: Rotation::Deg90,
///     negative: true,
///     ..FilterParameters::default()
/// };
///
/// let out = render(&source, &params);
/// assert_eq!(out.dimensions(), (2, 4));
/// assert_eq!(out.get_pixel(0, 0), &Rgba([245, 235, 225, 255]));
/// ```
pub fn render(source: &SourceImage, params: &FilterParameters) -> RenderedImage {
    let start = Instant::now();

    let mut output = geometry::apply(
        source.as_rgba(),
        params.rotation,
        params.flip_horizontal,
        params.flip_vertical,
    );

    if params.has_color_adjustments() {
        color::apply(&mut output, params);
    }

    if params.blur > 0.0 {
        output = blur::gaussian_blur_rgb(&output, params.blur);
    }

    if params.sharpen {
        output = sharpen::sharpen_rgb(&output);
    }

    log::debug!(
        "🖼️ 预览渲染完成 - {}x{} -> {}x{} rotation={} blur={} sharpen={} elapsed={}ms",
        source.width(),
        source.height(),
        output.width(),
        output.height(),
        params.rotation.degrees(),
        params.blur,
        params.sharpen,
        start.elapsed().as_millis()
    );

    output
}
