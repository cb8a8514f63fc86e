//! 模糊阶段：可分离高斯模糊，只作用于 RGB。
//!
//! 半径语义与 CSS `blur(<length>)` 相同，即半径就是高斯标准差 sigma。
//! 核半宽取 `ceil(3 * sigma)`，边缘按复制边界像素处理；小数半径会连续改变核权重，
//! 不会截断到整数半径。

use image::RgbaImage;

/// 低于该值的 sigma 视为不模糊；否则 `2σ²` 会下溢为 0，核权重变成 NaN。
pub const MIN_SIGMA: f64 = 1e-3;

/// 归一化的一维高斯核，长度为 `2 * radius + 1`。`sigma < MIN_SIGMA` 时为单位核 `[1.0]`。
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma.is_nan() || sigma < MIN_SIGMA {
        return vec![1.0];
    }

    let radius = (3.0 * sigma).ceil().max(1.0) as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

/// 沿一个方向卷积。`horizontal` 为 `false` 时沿列方向。
fn convolve_pass(
    input: &[f64],
    width: usize,
    height: usize,
    kernel: &[f64],
    horizontal: bool,
) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut output = vec![0.0; input.len()];

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f64; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let offset = k as isize - radius;
                let (sx, sy) = if horizontal {
                    ((x as isize + offset).clamp(0, width as isize - 1) as usize, y)
                } else {
                    (x, (y as isize + offset).clamp(0, height as isize - 1) as usize)
                };
                let idx = (sy * width + sx) * 3;
                acc[0] += input[idx] * weight;
                acc[1] += input[idx + 1] * weight;
                acc[2] += input[idx + 2] * weight;
            }
            let idx = (y * width + x) * 3;
            output[idx..idx + 3].copy_from_slice(&acc);
        }
    }

    output
}

/// `sigma < MIN_SIGMA` 时原样返回；alpha 通道原样复制。
pub fn gaussian_blur_rgb(image: &RgbaImage, sigma: f64) -> RgbaImage {
    if sigma.is_nan() || sigma < MIN_SIGMA {
        return image.clone();
    }

    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let rgb: Vec<f64> = image
        .pixels()
        .flat_map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
        .collect();

    let horizontal = convolve_pass(&rgb, width, height, &kernel, true);
    let blurred = convolve_pass(&horizontal, width, height, &kernel, false);

    let mut output = image.clone();
    for (i, pixel) in output.pixels_mut().enumerate() {
        for c in 0..3 {
            pixel.0[c] = blurred[i * 3 + c].clamp(0.0, 255.0).round() as u8;
        }
    }
    output
}
