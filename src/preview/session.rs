//! # 预览会话
//!
//! ## 设计思路
//!
//! 会话只保存“当前源图 + 当前参数”，渲染结果不入会话：
//! - 源图或任一参数变化都会让代次 +1；
//! - 每次渲染都从保存的源图重新开始，从不在上一帧上叠加；
//! - 帧携带生成时的代次，代次落后即视为已被取代，调用方直接丢弃，不排队。

use std::sync::Arc;

use super::render::{self, FilterParameters, RenderedImage, SourceImage};

/// 一次渲染的产物。
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub generation: u64,
    pub image: RenderedImage,
}

/// 单个用户图片的预览会话。
#[derive(Debug, Default)]
pub struct PreviewSession {
    source: Option<Arc<SourceImage>>,
    params: FilterParameters,
    generation: u64,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_deref()
    }

    /// 替换源图（新选择的文件）。参数保持不变。
    pub fn set_source(&mut self, source: SourceImage) {
        self.source = Some(Arc::new(source));
        self.bump();
    }

    /// 移除当前图片。
    pub fn clear_source(&mut self) {
        self.source = None;
        self.bump();
    }

    /// 整体替换参数；数值字段先收敛到合法范围。
    pub fn set_params(&mut self, params: FilterParameters) {
        let params = params.clamped();
        if params != self.params {
            self.params = params;
            self.bump();
        }
    }

    /// 在当前参数副本上修改后整体替换。
    pub fn update_params(&mut self, update: impl FnOnce(&mut FilterParameters)) {
        let mut params = self.params.clone();
        update(&mut params);
        self.set_params(params);
    }

    /// 对应 UI 上的“重置全部滤镜”，保留旋转与翻转。
    pub fn reset_filters(&mut self) {
        self.update_params(FilterParameters::reset_filters);
    }

    /// 用最新的源图与参数渲染；没有源图时返回 `None`。
    pub fn render_latest(&self) -> Option<PreviewFrame> {
        let source = self.source.as_ref()?;
        Some(PreviewFrame {
            generation: self.generation,
            image: render::render(source, &self.params),
        })
    }

    /// 帧是否仍对应当前的源图与参数。
    pub fn is_current(&self, frame: &PreviewFrame) -> bool {
        frame.generation == self.generation
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        log::debug!("🔁 预览参数变更，代次 -> {}", self.generation);
    }
}
