//! # 附件接入模块（attachment）
//!
//! ## 设计思路
//!
//! 该模块把“分类 → 数量检查 → 读取校验 → 解码缩放 → 编码 → 检查并暂存”按职责拆分：
//!
//! - `events`：界面事件适配（薄封装，决定是否阻止默认行为）
//! - `service`：会话级状态（`ChatInputSession`），替代全局单例
//! - `handler`：编排整批处理与每个文件的顺序链路
//! - `loader`：分类、单文件体积检查、读取、签名校验、base64
//! - `pipeline`：解码、长边缩放、PNG data URI
//! - `staging`：暂存区与总体积不变量
//! - `notify`：面向用户的提示与翻译协作方
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 调用链
//!
//! ```text
//! 界面事件（选择 / 拖放 / 粘贴 / 回车）
//!    ↓
//! events.rs（参数适配）
//!    ↓
//! service.rs（会话状态、发送）
//!    ↓
//! handler.rs（批次编排 + 阶段耗时日志）
//!    ├─ loader.rs（分类 + 体积检查 + 读取）
//!    ├─ pipeline.rs（解码 + 缩放 + 编码，spawn_blocking）
//!    └─ staging.rs（检查并提交，单次加锁）
//!    ↓
//! notify.rs（拒绝原因 → 提示）
//! ```

pub mod events;
mod config;
mod error;
mod handler;
mod loader;
mod notify;
mod pipeline;
mod service;
mod source;
mod staging;

#[cfg(test)]
mod test_support;

pub use config::{
    IntakeConfig, ResizeProfile, MAX_ATTACHED_FILES, MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_TO_SEND_BYTES,
    MAX_FILE_SIZE_TO_SEND_MB, MAX_IMAGE_EDGE, SUPPORTED_FILE_EXTENSIONS,
};
pub use error::IntakeError;
pub use handler::{IntakeOrigin, IntakeReport, PasteOutcome};
pub use notify::{CollectingNotifier, KeyTranslator, LogNotifier, Notice, Notifier, Translator};
pub use pipeline::scaled_dimensions;
pub use service::{ChatInputSession, PreviewState};
pub use source::{AttachmentKind, CandidateFile, CandidateSource, ClipboardItem, PendingFile, PendingImage};
pub use staging::StagingArea;

pub use crate::model::ModelCapability;

/// 内部编排器，不直接暴露给界面层。
pub(crate) use handler::IntakeHandler;
