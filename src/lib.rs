//! # 图片转换客户端：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  调用方 (CLI / 宿主 UI)                   │
//! │                                                          │
//! │   FilterParameters（单一不可变参数值，每次全量下发）      │
//! └───────┬──────────────────────────────┬───────────────────┘
//!         ↓                              ↓
//! ┌───────┼──────────────────────────────┼───────────────────┐
//! │       ↓          本地 (Rust)          ↓                   │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ preview ──── 实时预览                                │
//! │  │   ├─ loader/decoder   来源加载·签名校验·解码·降采样    │
//! │  │   ├─ render           几何 → 颜色 → 模糊 → 锐化        │
//! │  │   ├─ session          最新参数优先，旧帧作废           │
//! │  │   └─ export           PNG 编码与下载文件名             │
//! │  │                                                       │
//! │  ├─ convert ──── 远程转换 API 客户端 (multipart)          │
//! │  └─ settings ─── JSON 参数/配置读写                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，CLI 与宿主层的返回类型 |
//! | [`preview`] | 解码用户图片并按滤镜参数生成近似预览 |
//! | [`convert`] | 组装转换请求、上传并取回转换结果 |
//! | [`settings`] | 滤镜参数与配置的 JSON 持久化 |

pub mod convert;
pub mod error;
pub mod preview;
pub mod settings;
