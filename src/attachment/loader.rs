//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理候选文件的字节读取，并在“尽可能早”的阶段做校验，尽快失败。
//!
//! ## 实现思路
//!
//! - 分类：文档扩展名优先，其次是模型可接受的图片扩展名/媒体类型。
//! - 文档：先按报告体积做单文件上限检查，再读取。
//! - 路径来源通过 `tokio::fs` 异步读取；内存来源直接复用 `Bytes`。
//! - 图片：读取后用文件签名（magic bytes）确认确实是图片。

use base64::{Engine as _, engine::general_purpose};

use super::config::ends_with_ignore_ascii_case;
use super::source::{AttachmentKind, CandidateFile, CandidateSource, RawAttachment};
use super::{IntakeConfig, IntakeError, IntakeHandler, ModelCapability};

impl IntakeHandler {
    /// 候选文件分类。
    ///
    /// 文档白名单优先于图片白名单；两者都不命中时为 `Unsupported`。
    pub(crate) fn classify(
        candidate: &CandidateFile,
        config: &IntakeConfig,
        capability: &ModelCapability,
    ) -> AttachmentKind {
        if config.is_document_name(&candidate.name) {
            return AttachmentKind::Document;
        }

        let accepted = capability
            .accept_extensions()
            .iter()
            .any(|ext| ends_with_ignore_ascii_case(&candidate.name, ext));
        if accepted {
            return AttachmentKind::Image;
        }

        AttachmentKind::Unsupported
    }

    /// 文档单文件体积检查，在读取之前按报告体积执行。
    pub(crate) fn validate_document_size(
        candidate: &CandidateFile,
        config: &IntakeConfig,
    ) -> Result<(), IntakeError> {
        Self::check_document_size(&candidate.name, candidate.size, config)
    }

    /// 读取之后按实际体积再检查一次，报告体积可能偏小。
    pub(crate) fn validate_loaded_document_size(
        raw: &RawAttachment,
        config: &IntakeConfig,
    ) -> Result<(), IntakeError> {
        Self::check_document_size(&raw.name, raw.size, config)
    }

    fn check_document_size(name: &str, size: u64, config: &IntakeConfig) -> Result<(), IntakeError> {
        if size > config.max_file_size_bytes {
            return Err(IntakeError::FileTooLarge {
                name: name.to_string(),
                size,
                max: config.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// 读取候选文件的全部字节。
    pub(crate) async fn load_candidate(candidate: CandidateFile) -> Result<RawAttachment, IntakeError> {
        let CandidateFile {
            name,
            media_type,
            size,
            source,
        } = candidate;

        let bytes = match source {
            CandidateSource::Memory(bytes) => bytes,
            CandidateSource::Path(path) => {
                log::debug!("📁 读取附件 - 路径: {}", path.display());
                tokio::fs::read(&path)
                    .await
                    .map(bytes::Bytes::from)
                    .map_err(|e| IntakeError::Unreadable {
                        name: name.clone(),
                        reason: format!("读取文件失败：{}", e),
                    })?
            }
        };

        // 读取后以实际长度为准
        let size = size.max(bytes.len() as u64);

        Ok(RawAttachment {
            name,
            media_type,
            size,
            bytes,
        })
    }

    /// 字节转标准 base64 文本。
    pub(crate) fn encode_base64(bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(bytes)
    }

    /// 通过文件签名校验输入是否为图片。
    pub(crate) fn validate_image_signature(raw: &RawAttachment) -> Result<(), IntakeError> {
        if raw.bytes.is_empty() {
            return Err(IntakeError::Unreadable {
                name: raw.name.clone(),
                reason: "图片内容为空".to_string(),
            });
        }

        let kind = infer::get(&raw.bytes).ok_or_else(|| IntakeError::Unreadable {
            name: raw.name.clone(),
            reason: "无法识别图片类型".to_string(),
        })?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(IntakeError::Unreadable {
                name: raw.name.clone(),
                reason: format!("文件签名不是图片类型：{}", kind.mime_type()),
            });
        }

        Ok(())
    }
}
