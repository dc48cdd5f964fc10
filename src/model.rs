//! # 模型能力模块
//!
//! 描述当前选中模型能接收哪些图片类型，以及发送时是否附带图片。
//! 只有 Claude 3 系列支持图片输入，其余模型都是纯文本。

use serde::{Deserialize, Serialize};

/// Claude 3 系列可接收的图片媒体类型。
const VISION_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// 已知模型：(模型 ID, 显示名称, 是否支持图片)。
const MODEL_CATALOG: &[(&str, &str, bool)] = &[
    ("claude-instant-v1", "Claude Instant", false),
    ("claude-v2", "Claude v2", false),
    ("claude-v3-haiku", "Claude 3 (Haiku)", true),
    ("claude-v3.5-sonnet", "Claude 3.5 (Sonnet)", true),
    ("claude-v3-sonnet", "Claude 3 (Sonnet)", true),
    ("claude-v3-opus", "Claude 3 (Opus)", true),
    ("mistral-7b-instruct", "Mistral 7B", false),
    ("mixtral-8x7b-instruct", "Mixtral-8x7B", false),
    ("mistral-large", "Mistral Large", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapability {
    pub model_id: String,
    pub label: String,
    pub support_media_types: Vec<String>,
    /// 为 `true` 时发送载荷不带图片。
    pub disabled_image_upload: bool,
}

impl ModelCapability {
    /// 按模型 ID 查表；未知模型按纯文本处理，标签沿用 ID。
    pub fn for_model(model_id: &str) -> Self {
        match MODEL_CATALOG.iter().find(|(id, _, _)| *id == model_id) {
            Some((id, label, vision)) => Self::build(id, label, *vision),
            None => {
                log::warn!("⚠️ 未知模型 {}，按纯文本模型处理", model_id);
                Self::build(model_id, model_id, false)
            }
        }
    }

    fn build(model_id: &str, label: &str, vision: bool) -> Self {
        let support_media_types = if vision {
            VISION_MEDIA_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            model_id: model_id.to_string(),
            label: label.to_string(),
            support_media_types,
            disabled_image_upload: !vision,
        }
    }

    /// 全部已知模型，顺序与模型选择列表一致。
    pub fn catalog() -> Vec<ModelCapability> {
        MODEL_CATALOG
            .iter()
            .map(|(id, label, vision)| Self::build(id, label, *vision))
            .collect()
    }

    /// 由媒体类型推导出的可接受图片扩展名（带点，小写）。
    ///
    /// `image/jpeg` 同时对应 `.jpg` 与 `.jpeg`。
    pub fn accept_extensions(&self) -> Vec<String> {
        self.support_media_types
            .iter()
            .filter_map(|media_type| media_type.strip_prefix("image/"))
            .flat_map(|subtype| match subtype {
                "jpeg" => vec![".jpg".to_string(), ".jpeg".to_string()],
                other => vec![format!(".{}", other)],
            })
            .collect()
    }

    pub fn supports_media_type(&self, media_type: &str) -> bool {
        self.support_media_types
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(media_type))
    }
}

/// 默认模型：标签包含 “Claude 3.5”（不区分大小写）的第一个，否则取第一个。
pub fn preferred_model(models: &[ModelCapability]) -> Option<&ModelCapability> {
    models
        .iter()
        .find(|model| model.label.to_lowercase().contains("claude 3.5"))
        .or_else(|| models.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude3_family_accepts_images() {
        for id in ["claude-v3-sonnet", "claude-v3.5-sonnet", "claude-v3-haiku", "claude-v3-opus"] {
            let model = ModelCapability::for_model(id);
            assert!(!model.disabled_image_upload, "{} should accept images", id);
            assert!(model.supports_media_type("image/png"));
            assert!(model.supports_media_type("IMAGE/JPEG"));
        }
    }

    #[test]
    fn text_only_models_have_no_image_types() {
        for id in ["claude-v2", "claude-instant-v1", "mistral-large", "mixtral-8x7b-instruct"] {
            let model = ModelCapability::for_model(id);
            assert!(model.disabled_image_upload);
            assert!(model.accept_extensions().is_empty());
        }
    }

    #[test]
    fn unknown_model_falls_back_to_text_only() {
        let model = ModelCapability::for_model("gpt-something");
        assert_eq!(model.label, "gpt-something");
        assert!(model.disabled_image_upload);
    }

    #[test]
    fn jpeg_maps_to_two_extensions() {
        let exts = ModelCapability::for_model("claude-v3-opus").accept_extensions();
        assert_eq!(exts, vec![".png", ".jpg", ".jpeg", ".gif", ".webp"]);
    }

    #[test]
    fn preferred_model_picks_claude_35() {
        let catalog = ModelCapability::catalog();
        let preferred = preferred_model(&catalog).expect("catalog is not empty");
        assert_eq!(preferred.model_id, "claude-v3.5-sonnet");
    }

    #[test]
    fn preferred_model_falls_back_to_first() {
        let models = vec![
            ModelCapability::for_model("claude-v2"),
            ModelCapability::for_model("mistral-large"),
        ];
        assert_eq!(preferred_model(&models).map(|m| m.model_id.as_str()), Some("claude-v2"));
        assert!(preferred_model(&[]).is_none());
    }
}
