//! # 导出模块
//!
//! 本地预览的下载路径固定使用 PNG（无损）；其他格式由远程转换 API 负责。

use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

use super::{PreviewError, RenderedImage};

/// 将渲染结果编码为 PNG 字节。
pub fn encode_png(image: &RenderedImage) -> Result<Vec<u8>, PreviewError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| PreviewError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

/// 下载文件名：`<原文件名去掉最后一个扩展名>-filtered.png`。
pub fn filtered_file_name(original: &str) -> String {
    let stem = match original.rfind('.') {
        Some(idx) if idx > 0 => &original[..idx],
        _ => original,
    };
    format!("{}-filtered.png", stem)
}

/// 将渲染结果写入本地 PNG 文件。
pub fn write_png(image: &RenderedImage, path: impl AsRef<Path>) -> Result<(), PreviewError> {
    let path = path.as_ref();
    let bytes = encode_png(image)?;
    std::fs::write(path, &bytes)
        .map_err(|e| PreviewError::FileSystem(format!("写入 {} 失败：{}", path.display(), e)))?;

    log::info!(
        "💾 预览已导出 - {} ({}x{}, {}KB)",
        path.display(),
        image.width(),
        image.height(),
        bytes.len() / 1024
    );
    Ok(())
}
