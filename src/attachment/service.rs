//! # 服务层（会话级状态）
//!
//! ## 设计思路
//!
//! 暂存状态属于某一个聊天输入会话，由 `ChatInputSession` 显式持有，而不是进程级单例。
//! 好处：
//! 1. 生命周期清晰：创建即挂载，`reset` 对应卸载/重新挂载
//! 2. 不同视图之间不会串状态
//! 3. 测试可创建独立实例
//!
//! ## 实现思路
//!
//! 对外暴露的稳定 API：
//! - `select_files` / `drop_files` / `paste`：三种输入入口
//! - `remove_image` / `remove_file`：按位置移除（同步扣减总体积）
//! - `open_preview` / `close_preview` / `after_preview_leave`：全屏预览
//! - `submit`：生成发送载荷并立即清空暂存

use std::sync::{Arc, Mutex};

use super::handler::{IntakeOrigin, IntakeReport, PasteOutcome};
use super::notify::Notifier;
use super::source::{CandidateFile, ClipboardItem, PendingFile, PendingImage};
use super::{IntakeConfig, IntakeError, IntakeHandler, ModelCapability, ResizeProfile};
use crate::outgoing::{SendGate, SendPayload};

/// 全屏预览状态。
///
/// 关闭时先只收起（`is_open = false`），等关闭过渡结束后再清掉图片引用，
/// 避免过渡期间出现空白预览。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreviewState {
    pub image: Option<String>,
    pub is_open: bool,
}

/// 聊天输入会话。
pub struct ChatInputSession {
    handler: IntakeHandler,
    preview: Mutex<PreviewState>,
}

impl ChatInputSession {
    /// 使用默认配置创建会话。
    ///
    /// # 示例
    /// ```rust
    /// use std::sync::Arc;
    /// use chat_intake::attachment::{ChatInputSession, LogNotifier, ModelCapability};
    ///
    /// let session = ChatInputSession::new(
    ///     ModelCapability::for_model("claude-v3-sonnet"),
    ///     Arc::new(LogNotifier::new()),
    /// );
    /// assert_eq!(session.budget()?, 0);
    /// # Ok::<(), chat_intake::attachment::IntakeError>(())
    /// ```
    pub fn new(capability: ModelCapability, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(IntakeConfig::default(), capability, notifier)
    }

    /// 使用自定义配置创建会话，主要用于测试。
    pub fn with_config(config: IntakeConfig, capability: ModelCapability, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            handler: IntakeHandler::new(config, capability, notifier),
            preview: Mutex::new(PreviewState::default()),
        }
    }

    /// 文件选择入口。
    pub async fn select_files(&self, files: Vec<CandidateFile>) -> IntakeReport {
        self.handler.ingest_batch(files, IntakeOrigin::Picker).await
    }

    /// 拖放入口，与文件选择走同一条链路。
    pub async fn drop_files(&self, files: Vec<CandidateFile>) -> IntakeReport {
        self.handler.ingest_batch(files, IntakeOrigin::Drop).await
    }

    /// 粘贴入口。
    pub async fn paste(&self, items: Vec<ClipboardItem>) -> PasteOutcome {
        self.handler.ingest_paste(items).await
    }

    pub fn images(&self) -> Result<Vec<PendingImage>, IntakeError> {
        self.handler.with_staging(|staging| staging.images().to_vec())
    }

    pub fn files(&self) -> Result<Vec<PendingFile>, IntakeError> {
        self.handler.with_staging(|staging| staging.files().to_vec())
    }

    /// 当前编码后总体积。
    pub fn budget(&self) -> Result<u64, IntakeError> {
        self.handler.with_staging(|staging| staging.budget())
    }

    pub fn remove_image(&self, index: usize) -> Result<Option<PendingImage>, IntakeError> {
        self.handler.with_staging(|staging| staging.remove_image(index))
    }

    pub fn remove_file(&self, index: usize) -> Result<Option<PendingFile>, IntakeError> {
        self.handler.with_staging(|staging| staging.remove_file(index))
    }

    /// 清空暂存与预览，对应输入组件的挂载/卸载。
    pub fn reset(&self) -> Result<(), IntakeError> {
        self.handler.with_staging(|staging| staging.clear())?;
        *self.lock_preview()? = PreviewState::default();
        Ok(())
    }

    /// 切换当前模型（影响可接受的图片类型与发送时是否附带图片）。
    pub fn set_model(&self, capability: ModelCapability) -> Result<(), IntakeError> {
        self.handler.set_capability(capability)
    }

    pub fn model(&self) -> Result<ModelCapability, IntakeError> {
        self.handler.capability_snapshot()
    }

    /// 设置缩放档位（`quality` / `balanced` / `speed`）。
    pub fn set_resize_profile(&self, profile: &str) -> Result<(), IntakeError> {
        let profile = ResizeProfile::from_str(profile)?;
        self.handler.set_resize_profile(profile)
    }

    pub fn resize_profile(&self) -> Result<ResizeProfile, IntakeError> {
        Ok(self.handler.config_snapshot()?.resize_profile())
    }

    fn lock_preview(&self) -> Result<std::sync::MutexGuard<'_, PreviewState>, IntakeError> {
        self.preview
            .lock()
            .map_err(|_| IntakeError::ResourceLimit("预览状态锁已中毒".to_string()))
    }

    /// 打开第 `index` 张暂存图片的预览；越界时返回 `false`。
    pub fn open_preview(&self, index: usize) -> Result<bool, IntakeError> {
        let image = self
            .handler
            .with_staging(|staging| staging.images().get(index).map(|img| img.data_uri.clone()))?;
        let Some(image) = image else {
            return Ok(false);
        };

        let mut preview = self.lock_preview()?;
        preview.image = Some(image);
        preview.is_open = true;
        Ok(true)
    }

    /// 收起预览，图片引用保留到过渡结束。
    pub fn close_preview(&self) -> Result<(), IntakeError> {
        self.lock_preview()?.is_open = false;
        Ok(())
    }

    /// 关闭过渡结束后清除图片引用。
    pub fn after_preview_leave(&self) -> Result<(), IntakeError> {
        let mut preview = self.lock_preview()?;
        if !preview.is_open {
            preview.image = None;
        }
        Ok(())
    }

    pub fn preview(&self) -> Result<PreviewState, IntakeError> {
        Ok(self.lock_preview()?.clone())
    }

    /// 生成发送载荷并清空暂存。
    ///
    /// 内容为空或发送被禁用时返回 `None`，暂存保持不变。
    pub fn submit(&self, content: &str, gate: SendGate) -> Result<Option<SendPayload>, IntakeError> {
        if !gate.allows(content) {
            return Ok(None);
        }

        let capability = self.handler.capability_snapshot()?;
        let (images, files) = self.handler.with_staging(|staging| staging.take())?;
        let payload = SendPayload::compose(content, images, files, capability.disabled_image_upload);

        log::info!(
            "📤 已提交消息 - 图片 {} 张 附件 {} 个",
            payload.base64_encoded_images.as_ref().map_or(0, Vec::len),
            payload.attachments.as_ref().map_or(0, Vec::len)
        );
        Ok(Some(payload))
    }
}
