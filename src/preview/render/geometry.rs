//! 几何阶段：先在源图坐标系中镜像，再按 90° 整数倍顺时针旋转。
//!
//! 与画布的 `rotate` 后接 `scale(-1, 1)` 等价：镜像作用于旋转前的图像。
//! 输出画布总是恰好容纳变换结果（90°/270° 时宽高互换），不存在裁剪。

use image::{imageops, RgbaImage};

use super::Rotation;

pub fn apply(
    source: &RgbaImage,
    rotation: Rotation,
    flip_horizontal: bool,
    flip_vertical: bool,
) -> RgbaImage {
    let mirrored = (flip_horizontal || flip_vertical).then(|| {
        let mut copy = source.clone();
        if flip_horizontal {
            imageops::flip_horizontal_in_place(&mut copy);
        }
        if flip_vertical {
            imageops::flip_vertical_in_place(&mut copy);
        }
        copy
    });

    let base = mirrored.as_ref().unwrap_or(source);
    let rotated = match rotation {
        Rotation::Deg0 => None,
        Rotation::Deg90 => Some(imageops::rotate90(base)),
        Rotation::Deg180 => Some(imageops::rotate180(base)),
        Rotation::Deg270 => Some(imageops::rotate270(base)),
    };

    rotated.or(mirrored).unwrap_or_else(|| source.clone())
}
