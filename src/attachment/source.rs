//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `CandidateFile` / `ClipboardItem` 表示用户刚选中、拖入或粘贴的原始输入
//! - `RawAttachment` 表示已读取但未处理的字节
//! - `PendingImage` / `PendingFile` 表示已暂存、等待随消息发送的附件

use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;

/// 候选文件的字节来源。
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// 已在内存中的字节（粘贴、拖放或测试）。
    Memory(Bytes),
    /// 本地文件路径，读取推迟到流水线内部。
    Path(PathBuf),
}

/// 一个待处理的候选文件。
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// 文件名（含扩展名）。
    pub name: String,
    /// 浏览器/系统报告的媒体类型，可能为空。
    pub media_type: String,
    /// 报告的原始体积（字节）。
    pub size: u64,
    pub source: CandidateSource,
}

impl CandidateFile {
    /// 由内存字节构造。
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            source: CandidateSource::Memory(bytes),
        }
    }

    /// 由本地路径构造。`size` 取自文件元数据。
    pub fn from_path(path: impl Into<PathBuf>, media_type: impl Into<String>) -> std::io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            name,
            media_type: media_type.into(),
            size,
            source: CandidateSource::Path(path),
        })
    }
}

/// 剪贴板中的一项。
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub media_type: String,
    /// 该项能否取到文件（纯文本项为 `None`）。
    pub file: Option<CandidateFile>,
}

/// 候选文件的分类结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Image,
    Unsupported,
}

/// 加载阶段输出。
pub(crate) struct RawAttachment {
    pub(crate) name: String,
    pub(crate) media_type: String,
    pub(crate) size: u64,
    pub(crate) bytes: Bytes,
}

/// 已暂存的图片。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingImage {
    /// `data:image/png;base64,...`
    pub data_uri: String,
    pub media_type: String,
    pub width: u32,
    pub height: u32,
}

impl PendingImage {
    /// 计入发送总体积的长度：整段 data URI。
    pub fn encoded_len(&self) -> u64 {
        self.data_uri.len() as u64
    }
}

/// 已暂存的文档附件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub base64_content: String,
}

impl PendingFile {
    /// 计入发送总体积的长度：base64 文本长度。
    pub fn encoded_len(&self) -> u64 {
        self.base64_content.len() as u64
    }
}
