//! 锐化阶段：固定 3x3 核 `[[0,-1,0],[-1,5,-1],[0,-1,0]]`。
//!
//! 卷积只在完整 3x3 邻域存在的位置计算，最外一圈像素原样保留；alpha 不变。

use image::RgbaImage;

pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

pub fn sharpen_rgb(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut output = image.clone();
    if width < 3 || height < 3 {
        return output;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0i32; 3];
            for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    if weight == 0 {
                        continue;
                    }
                    let p = image.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for c in 0..3 {
                        acc[c] += p.0[c] as i32 * weight;
                    }
                }
            }

            let pixel = output.get_pixel_mut(x, y);
            for c in 0..3 {
                pixel.0[c] = acc[c].clamp(0, 255) as u8;
            }
        }
    }

    output
}
