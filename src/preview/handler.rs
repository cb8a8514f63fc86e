//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `PreviewHandler` 只负责流程编排与配置管理，不持有任何图片状态。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节
//! 3. 解码并准备只读源图
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<PreviewConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/total` 阶段耗时，便于性能诊断。
//! - 解码是整条预览链路中唯一的挂起点，异步入口放到阻塞线程池执行。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::render::SourceImage;
use super::{ImageSource, PreviewConfig, PreviewError, PreviewPerformanceProfile};

/// 预览加载器。
#[derive(Clone)]
pub struct PreviewHandler {
    pub(super) config: Arc<RwLock<PreviewConfig>>,
}

impl PreviewHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use image_converter::preview::{PreviewConfig, PreviewHandler};
    ///
    /// let handler = PreviewHandler::new(PreviewConfig::default())?;
    /// # Ok::<(), image_converter::preview::PreviewError>(())
    /// ```
    pub fn new(config: PreviewConfig) -> Result<Self, PreviewError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照，保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<PreviewConfig, PreviewError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| PreviewError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置性能档位。
    pub fn set_performance_profile(
        &self,
        profile: PreviewPerformanceProfile,
    ) -> Result<(), PreviewError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| PreviewError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换预览性能档位：{:?}（adaptive_resize={}, target_pixels={}, max_dim={}, filter={:?}）",
            profile,
            config.adaptive_resize,
            config.preview_target_pixels,
            config.preview_max_dimension,
            config.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<PreviewPerformanceProfile, PreviewError> {
        let config = self
            .config
            .read()
            .map_err(|_| PreviewError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 整体替换配置（例如从设置文件载入后）。
    pub fn replace_config(&self, new_config: PreviewConfig) -> Result<(), PreviewError> {
        new_config.validate()?;
        let mut config = self
            .config
            .write()
            .map_err(|_| PreviewError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        *config = new_config;
        Ok(())
    }

    /// 处理主入口：从任意来源加载并解码为源图。
    ///
    /// 解码失败会作为独立错误返回，而不是产出空白预览。
    pub fn load_source(&self, source: ImageSource) -> Result<SourceImage, PreviewError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = match source {
            ImageSource::FilePath(path) => self.load_from_file(&path, &config)?,
            ImageSource::Base64(data) => self.load_from_base64(&data, &config)?,
            ImageSource::Bytes { bytes, .. } => self.load_from_bytes(bytes, &config)?,
        };
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let decoded = self.decode_source(raw, &config)?;
        let decode_elapsed = decode_start.elapsed();

        log::info!(
            "✅ 源图准备完成 - load={}ms decode={}ms total={}ms",
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(decoded)
    }

    /// 异步入口：在阻塞线程池中加载与解码。
    pub async fn load_source_async(&self, source: ImageSource) -> Result<SourceImage, PreviewError> {
        let handler = self.clone();
        tokio::task::spawn_blocking(move || handler.load_source(source))
            .await
            .map_err(|e| PreviewError::Decode(format!("解码任务异常退出：{}", e)))?
    }
}
