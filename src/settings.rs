//! 设置文件读写
//!
//! JSON 文件，缺失时使用默认值；未知字段忽略，缺失字段取默认。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attachment::{IntakeConfig, ModelCapability, ResizeProfile};
use crate::error::AppError;
use crate::model::preferred_model;

/// 未指定 `--settings` 时使用的文件名（当前目录下）。
pub const DEFAULT_SETTINGS_FILE: &str = "chat-intake.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 模型 ID；为空时按默认模型规则选择。
    pub model: Option<String>,
    /// `quality` / `balanced` / `speed`
    pub resize_profile: String,
    /// 覆盖默认日志过滤（`RUST_LOG` 优先）。
    pub log_filter: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model: None,
            resize_profile: ResizeProfile::Balanced.as_str().to_string(),
            log_filter: None,
        }
    }
}

impl AppSettings {
    /// 当前设置对应的模型能力。
    pub fn model_capability(&self) -> ModelCapability {
        match &self.model {
            Some(id) => ModelCapability::for_model(id),
            None => {
                let catalog = ModelCapability::catalog();
                preferred_model(&catalog)
                    .cloned()
                    .unwrap_or_else(|| ModelCapability::for_model("claude-v3.5-sonnet"))
            }
        }
    }

    /// 由设置构造接入配置。
    pub fn intake_config(&self) -> Result<IntakeConfig, AppError> {
        let profile = ResizeProfile::from_str(&self.resize_profile)
            .map_err(|e| AppError::Settings(e.to_string()))?;
        let mut config = IntakeConfig::default();
        config.apply_resize_profile(profile);
        Ok(config)
    }
}

pub fn settings_file_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// 读取设置；文件不存在时返回默认值。
pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::debug!("设置文件不存在，使用默认设置：{}", path.display());
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    Ok(parsed)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("chat-intake-test-{nanos}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = unique_temp_dir();
        let settings = load_settings(&dir.join("absent.json")).expect("load");

        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.model_capability().model_id, "claude-v3.5-sonnet");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = unique_temp_dir();
        let path = dir.join("nested").join("settings.json");
        let settings = AppSettings {
            model: Some("claude-v3-haiku".to_string()),
            resize_profile: "speed".to_string(),
            log_filter: Some("debug".to_string()),
        };

        save_settings(&path, &settings).expect("save");
        assert_eq!(load_settings(&path).expect("load"), settings);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = unique_temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, r#"{ "model": "mistral-large" }"#).expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.resize_profile, "balanced");
        assert!(settings.model_capability().disabled_image_upload);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let dir = unique_temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, "{ not json").expect("write");

        assert!(matches!(load_settings(&path), Err(AppError::Settings(_))));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unknown_resize_profile_is_rejected() {
        let settings = AppSettings {
            resize_profile: "ultra".to_string(),
            ..AppSettings::default()
        };
        assert!(matches!(settings.intake_config(), Err(AppError::Settings(_))));
    }
}
