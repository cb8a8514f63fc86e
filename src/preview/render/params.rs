//! # 滤镜参数模型
//!
//! ## 设计思路
//!
//! 宿主 UI 的十几个开关/滑块不再作为散落的可变字段存在，
//! 而是每次渲染都整体下发一个不可变的 `FilterParameters` 值。
//! 渲染器假定数值已在范围内，范围收敛由调用方通过 `clamped()` 完成。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::preview::PreviewError;

pub const BRIGHTNESS_RANGE: (f64, f64) = (0.5, 2.0);
pub const CONTRAST_RANGE: (f64, f64) = (0.5, 2.0);
pub const SATURATION_RANGE: (f64, f64) = (0.0, 2.0);
pub const BLUR_RANGE: (f64, f64) = (0.0, 10.0);

/// `#rrggbb`，与取色器输出一致；`#` 可省略。
static TINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#?([0-9a-f]{2})([0-9a-f]{2})([0-9a-f]{2})$")
        .expect("tint pattern is a valid regex")
});

/// 旋转角度，只允许 90° 的整数倍（顺时针）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// 顺时针再转 90°。
    pub fn clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// 逆时针再转 90°。
    pub fn counter_clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg270,
            Self::Deg90 => Self::Deg0,
            Self::Deg180 => Self::Deg90,
            Self::Deg270 => Self::Deg180,
        }
    }

    /// 90° 与 270° 会交换输出宽高。
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = PreviewError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(PreviewError::InvalidParameter(format!(
                "旋转角度必须是 90 的整数倍：{}",
                degrees
            ))),
        }
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// 解析后的叠加色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TintColor {
    /// 解析 `#rrggbb`；空串或格式错误返回 `None`，此时叠加色阶段跳过。
    pub fn parse(value: &str) -> Option<Self> {
        let caps = TINT_PATTERN.captures(value.trim())?;
        let channel = |idx: usize| u8::from_str_radix(&caps[idx], 16).ok();

        Some(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
        })
    }
}

/// 单次渲染的完整参数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterParameters {
    pub grayscale: bool,
    pub sepia: bool,
    pub negative: bool,
    pub sharpen: bool,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    /// 模糊半径（像素），允许小数。
    pub blur: f64,
    /// `#rrggbb` 或空串。
    pub tint: String,
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            grayscale: false,
            sepia: false,
            negative: false,
            sharpen: false,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            blur: 0.0,
            tint: String::new(),
            rotation: Rotation::Deg0,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

fn clamp_or_default(value: f64, (min, max): (f64, f64), default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

impl FilterParameters {
    /// 返回各数值字段收敛到合法范围后的副本；非有限值回退为默认值。
    pub fn clamped(&self) -> Self {
        Self {
            brightness: clamp_or_default(self.brightness, BRIGHTNESS_RANGE, 1.0),
            contrast: clamp_or_default(self.contrast, CONTRAST_RANGE, 1.0),
            saturation: clamp_or_default(self.saturation, SATURATION_RANGE, 1.0),
            blur: clamp_or_default(self.blur, BLUR_RANGE, 0.0),
            tint: self.tint.trim().to_string(),
            ..self.clone()
        }
    }

    /// 仅重置颜色/效果类滤镜，保留旋转与翻转。
    pub fn reset_filters(&mut self) {
        *self = Self {
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
            ..Self::default()
        };
    }

    pub fn tint_color(&self) -> Option<TintColor> {
        if self.tint.is_empty() {
            return None;
        }
        TintColor::parse(&self.tint)
    }

    pub fn has_geometry(&self) -> bool {
        self.rotation != Rotation::Deg0 || self.flip_horizontal || self.flip_vertical
    }

    pub fn has_color_adjustments(&self) -> bool {
        self.grayscale
            || self.sepia
            || self.negative
            || self.brightness != 1.0
            || self.contrast != 1.0
            || self.saturation != 1.0
            || self.tint_color().is_some()
    }

    /// 所有阶段都会被跳过时为 `true`。
    pub fn is_identity(&self) -> bool {
        !self.has_geometry() && !self.has_color_adjustments() && self.blur <= 0.0 && !self.sharpen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity() {
        let params = FilterParameters::default();
        assert!(params.is_identity());
        assert_eq!(params.rotation.degrees(), 0);
        assert!(params.tint.is_empty());
    }

    #[test]
    fn tint_parse_accepts_hex_and_rejects_garbage() {
        assert_eq!(TintColor::parse("#ff0000"), Some(TintColor { r: 255, g: 0, b: 0 }));
        assert_eq!(TintColor::parse("#0A1b2C"), Some(TintColor { r: 10, g: 27, b: 44 }));
        assert_eq!(TintColor::parse("00ff00"), Some(TintColor { r: 0, g: 255, b: 0 }));
        assert_eq!(TintColor::parse("#fff"), None);
        assert_eq!(TintColor::parse("#gg0000"), None);
        assert_eq!(TintColor::parse("red"), None);
        assert_eq!(TintColor::parse(""), None);
    }

    #[test]
    fn malformed_tint_is_not_an_adjustment() {
        let params = FilterParameters {
            tint: "#12345".to_string(),
            ..FilterParameters::default()
        };
        assert!(params.tint_color().is_none());
        assert!(params.is_identity());
    }

    #[test]
    fn rotation_normalizes_and_rejects_odd_angles() {
        assert_eq!(Rotation::try_from(450).expect("450 is valid"), Rotation::Deg90);
        assert_eq!(Rotation::try_from(-90).expect("-90 is valid"), Rotation::Deg270);
        assert!(matches!(Rotation::try_from(45), Err(PreviewError::InvalidParameter(_))));
    }

    #[test]
    fn rotation_buttons_cycle() {
        let mut rotation = Rotation::Deg0;
        for _ in 0..4 {
            rotation = rotation.clockwise();
        }
        assert_eq!(rotation, Rotation::Deg0);
        assert_eq!(Rotation::Deg0.counter_clockwise(), Rotation::Deg270);
        assert!(Rotation::Deg270.swaps_dimensions());
        assert!(!Rotation::Deg180.swaps_dimensions());
    }

    #[test]
    fn clamped_limits_every_numeric_field() {
        let params = FilterParameters {
            brightness: 9.0,
            contrast: 0.1,
            saturation: -1.0,
            blur: f64::NAN,
            tint: "  #00ff00 ".to_string(),
            ..FilterParameters::default()
        }
        .clamped();

        assert_eq!(params.brightness, 2.0);
        assert_eq!(params.contrast, 0.5);
        assert_eq!(params.saturation, 0.0);
        assert_eq!(params.blur, 0.0);
        assert_eq!(params.tint, "#00ff00");
    }

    #[test]
    fn reset_filters_keeps_geometry() {
        let mut params = FilterParameters {
            grayscale: true,
            blur: 3.5,
            tint: "#ff0000".to_string(),
            rotation: Rotation::Deg180,
            flip_vertical: true,
            ..FilterParameters::default()
        };
        params.reset_filters();

        assert!(!params.grayscale);
        assert_eq!(params.blur, 0.0);
        assert!(params.tint.is_empty());
        assert_eq!(params.rotation, Rotation::Deg180);
        assert!(params.flip_vertical);
    }

    #[test]
    fn json_uses_ui_field_names() {
        let json = r##"{"grayscale":true,"rotation":270,"flipHorizontal":true,"tint":"#336699"}"##;
        let params: FilterParameters = serde_json::from_str(json).expect("deserialize failed");

        assert!(params.grayscale);
        assert!(params.flip_horizontal);
        assert_eq!(params.rotation, Rotation::Deg270);
        assert_eq!(params.brightness, 1.0);

        let bad = r#"{"rotation":45}"#;
        assert!(serde_json::from_str::<FilterParameters>(bad).is_err());
    }
}
