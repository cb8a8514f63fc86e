//! 逐像素颜色阶段。
//!
//! 每个子阶段都是 `PixelColor -> PixelColor` 的纯函数，按固定顺序串联：
//! 灰度 → 怀旧 → 反相 → 亮度 → 对比度 → 饱和度 → 叠加色 → 收敛取整。
//! 中间值使用 `f64`，只在最后一步取整，alpha 不参与计算。

use image::RgbaImage;

use super::{FilterParameters, TintColor};

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// 颜色阶段的运行状态。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl PixelColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f64, g as f64, b as f64)
    }

    pub fn luminance(self) -> f64 {
        LUMA_R * self.r + LUMA_G * self.g + LUMA_B * self.b
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

pub fn grayscale(color: PixelColor) -> PixelColor {
    let gray = color.luminance();
    PixelColor::new(gray, gray, gray)
}

/// 输入非负，只需要上限截断。
pub fn sepia(color: PixelColor) -> PixelColor {
    let PixelColor { r, g, b } = color;
    PixelColor::new(
        (0.393 * r + 0.769 * g + 0.189 * b).min(255.0),
        (0.349 * r + 0.686 * g + 0.168 * b).min(255.0),
        (0.272 * r + 0.534 * g + 0.131 * b).min(255.0),
    )
}

pub fn negative(color: PixelColor) -> PixelColor {
    color.map(|c| 255.0 - c)
}

pub fn brightness(color: PixelColor, factor: f64) -> PixelColor {
    color.map(|c| c * factor)
}

pub fn contrast(color: PixelColor, factor: f64) -> PixelColor {
    color.map(|c| (c - 128.0) * factor + 128.0)
}

/// 以当前值的亮度为中心缩放各通道。
pub fn saturation(color: PixelColor, factor: f64) -> PixelColor {
    let gray = color.luminance();
    color.map(|c| gray + (c - gray) * factor)
}

/// 与叠加色五五混合。
pub fn tint(color: PixelColor, tint: TintColor) -> PixelColor {
    PixelColor::new(
        (color.r + tint.r as f64) / 2.0,
        (color.g + tint.g as f64) / 2.0,
        (color.b + tint.b as f64) / 2.0,
    )
}

/// 收敛到 [0, 255] 并四舍五入（.5 远离零）。
///
/// 注意：浏览器画布的 `Uint8ClampedArray` 对 .5 采用银行家舍入（126.5 → 126），
/// 这里统一取 127，恰好落在 .5 上的通道值与浏览器预览可能相差 1。
pub fn clamp_to_u8(color: PixelColor) -> [u8; 3] {
    let channel = |c: f64| c.clamp(0.0, 255.0).round() as u8;
    [channel(color.r), channel(color.g), channel(color.b)]
}

/// 按参数对单个像素执行完整颜色阶段。
pub fn adjust_pixel(rgb: [u8; 3], params: &FilterParameters, tint_color: Option<TintColor>) -> [u8; 3] {
    let mut color = PixelColor::from_rgb(rgb);

    if params.grayscale {
        color = grayscale(color);
    }
    if params.sepia {
        color = sepia(color);
    }
    if params.negative {
        color = negative(color);
    }
    if params.brightness != 1.0 {
        color = brightness(color, params.brightness);
    }
    if params.contrast != 1.0 {
        color = contrast(color, params.contrast);
    }
    if params.saturation != 1.0 {
        color = saturation(color, params.saturation);
    }
    if let Some(tint_color) = tint_color {
        color = tint(color, tint_color);
    }

    clamp_to_u8(color)
}

/// 原地对整张图执行颜色阶段。
pub fn apply(image: &mut RgbaImage, params: &FilterParameters) {
    let tint_color = params.tint_color();
    if !params.tint.is_empty() && tint_color.is_none() {
        log::debug!("🎨 叠加色格式无效，跳过：{:?}", params.tint);
    }

    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let [r, g, b] = adjust_pixel([r, g, b], params, tint_color);
        pixel.0[0] = r;
        pixel.0[1] = g;
        pixel.0[2] = b;
    }
}
