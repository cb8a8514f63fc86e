//! 设置与滤镜参数的 JSON 持久化。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::convert::ConvertConfig;
use crate::error::AppError;
use crate::preview::{FilterParameters, PreviewConfig};

/// 应用设置。缺失的字段取默认值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub preview: PreviewConfig,
    pub convert: ConvertConfig,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<T>(&content)
        .map_err(|e| AppError::Settings(format!("解析 {} 失败: {}", path.display(), e)))?;

    Ok(Some(parsed))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Settings(format!("序列化失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

/// 读取设置文件；文件不存在时返回 `None`。
pub fn load_settings(path: impl AsRef<Path>) -> Result<Option<AppSettings>, AppError> {
    read_json(path.as_ref())
}

pub fn save_settings(path: impl AsRef<Path>, settings: &AppSettings) -> Result<(), AppError> {
    write_json(path.as_ref(), settings)
}

/// 读取滤镜参数（UI 字段名，camelCase），并收敛到合法范围。
pub fn load_filter_parameters(path: impl AsRef<Path>) -> Result<FilterParameters, AppError> {
    let path = path.as_ref();
    let params: FilterParameters = read_json(path)?
        .ok_or_else(|| AppError::Settings(format!("参数文件不存在: {}", path.display())))?;
    Ok(params.clamped())
}

pub fn save_filter_parameters(
    path: impl AsRef<Path>,
    params: &FilterParameters,
) -> Result<(), AppError> {
    write_json(path.as_ref(), params)
}
