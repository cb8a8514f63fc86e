//! # 实时预览模块（preview）
//!
//! ## 设计思路
//!
//! 该模块将“图片来源识别 → 加载校验 → 解码降采样 → 滤镜渲染 → 导出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `session`：持有当前源图与参数，保证只有最新参数的渲染结果有效
//! - `handler`：编排加载与解码，记录阶段耗时
//! - `loader`：负责 Base64/文件/内存字节加载与签名校验
//! - `decoder`：负责解码、像素限制、预览降采样
//! - `render`：纯函数渲染器（几何 → 颜色 → 模糊 → 锐化）
//! - `export`：PNG 编码与下载文件名
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 调用方
//!    ↓
//! session.rs（源图 + 参数 + 代次）
//!    ├─ handler.rs（统一编排 + 阶段耗时日志）
//!    │   ├─ loader.rs（来源加载 + 体积/签名校验）
//!    │   └─ decoder.rs（解码 + 像素限制 + 降采样）
//!    └─ render/（每次从源图全量重算）
//!    ↓
//! export.rs（PNG 下载）
//! ```
//!
//! ## 分层职责建议
//!
//! - 滤镜算法或阶段顺序变更优先改 `render/`
//! - 配置与策略变更优先改 `config.rs`
//! - 输入来源与校验变更优先改 `loader.rs`

mod config;
mod decoder;
mod error;
mod export;
mod handler;
mod loader;
pub mod render;
mod session;
mod source;

pub use config::{PreviewConfig, PreviewPerformanceProfile};
pub use error::PreviewError;
pub use export::{encode_png, filtered_file_name, write_png};
pub use handler::PreviewHandler;
pub use render::{
    render, FilterParameters, PixelColor, RenderedImage, Rotation, SourceImage, TintColor,
};
pub use session::{PreviewFrame, PreviewSession};
pub use source::ImageSource;
