//! # 发送载荷模块
//!
//! ## 设计思路
//!
//! 暂存区里的内容在发送时要变成两种形状：
//! - `SendPayload`：交给发送协作方的 JSON（camelCase）
//! - `MessageContent`：后端按块存储的消息内容（文本 / 图片 / 附件）
//!
//! 这里同时提供文档格式识别与文件名清洗，保证附件块在下游可直接使用。

use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attachment::{PendingFile, PendingImage};
use crate::error::AppError;

/// 文档名中允许保留的字符之外的全部字符。
static DISALLOWED_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s\-\(\)\[\]]").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const DOCUMENT_FORMATS: &[&str] = &["pdf", "csv", "doc", "docx", "xls", "xlsx", "html", "txt", "md"];

/// 发送门控：任一条件成立都不允许发送。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SendGate {
    /// 上层显式禁用发送（例如正在生成回复）。
    pub disabled_send: bool,
    /// 当前会话处于错误状态。
    pub has_error: bool,
    /// 整个输入框被禁用。
    pub disabled: bool,
}

impl SendGate {
    pub fn allows(&self, content: &str) -> bool {
        !content.is_empty() && !self.disabled_send && !self.has_error && !self.disabled
    }
}

/// 附件记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRecord {
    pub file_name: String,
    /// 原始媒体类型。
    pub file_type: String,
    /// base64 编码的文件内容。
    pub extracted_content: String,
}

/// 交给发送协作方的载荷。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_encoded_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentRecord>>,
}

impl SendPayload {
    /// 由暂存内容组装载荷。
    ///
    /// 模型禁用图片上传或没有图片时不带 `base64_encoded_images`；没有附件时不带 `attachments`。
    pub fn compose(
        content: &str,
        images: Vec<PendingImage>,
        files: Vec<PendingFile>,
        disabled_image_upload: bool,
    ) -> Self {
        let base64_encoded_images = if !disabled_image_upload && !images.is_empty() {
            Some(images.into_iter().map(|image| image.data_uri).collect())
        } else {
            None
        };

        let attachments = if files.is_empty() {
            None
        } else {
            Some(
                files
                    .into_iter()
                    .map(|file| AttachmentRecord {
                        file_name: file.name,
                        file_type: file.media_type,
                        extracted_content: file.base64_content,
                    })
                    .collect(),
            )
        };

        Self {
            content: content.to_string(),
            base64_encoded_images,
            attachments,
        }
    }

    /// 转成按块存储的消息内容：文本在前，其后依次是图片、附件。
    pub fn to_contents(&self) -> Result<Vec<MessageContent>, AppError> {
        let mut contents = vec![MessageContent::Text {
            body: self.content.clone(),
        }];

        for data_uri in self.base64_encoded_images.iter().flatten() {
            let (media_type, body) = parse_data_uri(data_uri)?;
            contents.push(MessageContent::Image {
                media_type: Some(media_type.to_string()),
                body: body.to_string(),
            });
        }

        for record in self.attachments.iter().flatten() {
            contents.push(MessageContent::Attachment {
                file_name: record.file_name.clone(),
                body: record.extracted_content.clone(),
            });
        }

        for content in &contents {
            content.validate()?;
        }
        Ok(contents)
    }
}

/// 一条消息中的单个内容块。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        body: String,
    },
    Image {
        media_type: Option<String>,
        /// 不带 data URI 前缀的 base64。
        body: String,
    },
    Attachment {
        file_name: String,
        body: String,
    },
}

impl MessageContent {
    /// 图片必须带媒体类型；图片和附件的 body 必须是合法 base64。
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Self::Text { .. } => Ok(()),
            Self::Image { media_type, body } => {
                if media_type.as_deref().is_none_or(str::is_empty) {
                    return Err(AppError::InvalidContent("图片内容缺少 media_type".to_string()));
                }
                ensure_base64(body, "图片")
            }
            Self::Attachment { body, .. } => ensure_base64(body, "附件"),
        }
    }
}

fn ensure_base64(body: &str, what: &str) -> Result<(), AppError> {
    general_purpose::STANDARD
        .decode(body)
        .map(|_| ())
        .map_err(|e| AppError::InvalidContent(format!("{}内容不是合法的 base64：{}", what, e)))
}

/// 拆分 `data:<media>;base64,<body>`。
fn parse_data_uri(data_uri: &str) -> Result<(&str, &str), AppError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| AppError::InvalidContent("图片不是 data URI".to_string()))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| AppError::InvalidContent("data URI 缺少逗号分隔".to_string()))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::InvalidContent("data URI 不是 base64 编码".to_string()))?;
    Ok((media_type, body))
}

/// 按扩展名识别文档格式，未知扩展名按 `txt` 处理。
pub fn document_format(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    DOCUMENT_FORMATS
        .iter()
        .copied()
        .find(|format| *format == extension)
        .unwrap_or("txt")
}

/// 清洗文档名：去掉扩展名，只保留字母数字、空白和 `-()[]`，合并连续空白并去掉首尾空白。
pub fn sanitize_document_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    let cleaned = DISALLOWED_NAME_CHARS.replace_all(stem, "");
    let collapsed = WHITESPACE_RUN.replace_all(&cleaned, " ");
    collapsed.trim().to_string()
}
