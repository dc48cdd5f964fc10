//! # 提示输出
//!
//! ## 设计思路
//!
//! 拒绝原因对用户可见，但文案翻译属于外部协作方。这里只产出
//! “翻译键 + 参数”的 `Notice`，由注入的 `Notifier` 决定如何展示（snackbar、日志……），
//! 由 `Translator` 决定如何渲染成文本。

use std::sync::Mutex;

use serde::Serialize;

use super::{IntakeConfig, IntakeError};

/// 一条面向用户的提示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: &'static str,
    pub key: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl Notice {
    /// 由拒绝原因构造提示，参数与翻译文案中的占位符一一对应。
    pub fn from_error(error: &IntakeError, config: &IntakeConfig) -> Self {
        let params = match error {
            IntakeError::CountExceeded { max, .. } => vec![("maxCount", max.to_string())],
            IntakeError::FileTooLarge { name, .. } => vec![
                ("maxSize", config.max_file_size_label()),
                ("fileName", name.clone()),
            ],
            IntakeError::AggregateExceeded { .. } => {
                vec![("maxSize", config.max_send_size_label())]
            }
            IntakeError::UnsupportedFormat(name) => vec![("fileName", name.clone())],
            IntakeError::Unreadable { name, .. } => vec![("fileName", name.clone())],
            IntakeError::ResourceLimit(reason) | IntakeError::InvalidConfig(reason) => {
                vec![("reason", reason.clone())]
            }
        };

        Self {
            code: error.code(),
            key: error.message_key(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 提示接收方。
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 翻译协作方。
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

/// 不做翻译：输出 `key` 与参数，便于日志与测试。
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return key.to_string();
        }
        let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{} ({})", key, rendered.join(", "))
    }
}

/// 将提示写入日志。
pub struct LogNotifier<T: Translator = KeyTranslator> {
    translator: T,
}

impl LogNotifier<KeyTranslator> {
    pub fn new() -> Self {
        Self {
            translator: KeyTranslator,
        }
    }
}

impl Default for LogNotifier<KeyTranslator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Translator> LogNotifier<T> {
    pub fn with_translator(translator: T) -> Self {
        Self { translator }
    }
}

impl<T: Translator> Notifier for LogNotifier<T> {
    fn notify(&self, notice: Notice) {
        log::warn!(
            "🔔 [{}] {}",
            notice.code,
            self.translator.translate(notice.key, &notice.params)
        );
    }
}

/// 收集提示，供界面层轮询展示或测试断言。
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取走已收集的提示。锁中毒时返回空列表。
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }

    pub fn codes(&self) -> Vec<&'static str> {
        match self.notices.lock() {
            Ok(guard) => guard.iter().map(|n| n.code).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(_) => log::error!("提示收集锁已中毒，丢弃提示：{}", notice.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_notice_carries_max_size_label() {
        let config = IntakeConfig::default();
        let notice = Notice::from_error(
            &IntakeError::FileTooLarge {
                name: "big.pdf".into(),
                size: 10 * 1024 * 1024,
                max: config.max_file_size_bytes,
            },
            &config,
        );

        assert_eq!(notice.key, "error.attachment.fileSizeExceeded");
        assert_eq!(notice.param("maxSize"), Some("6 MB"));
        assert_eq!(notice.param("fileName"), Some("big.pdf"));
    }

    #[test]
    fn count_notice_carries_max_count() {
        let config = IntakeConfig::default();
        let notice = Notice::from_error(
            &IntakeError::CountExceeded {
                current: 3,
                incoming: 3,
                max: 5,
            },
            &config,
        );

        assert_eq!(notice.param("maxCount"), Some("5"));
    }

    #[test]
    fn key_translator_renders_params() {
        let text = KeyTranslator.translate(
            "error.totalFileSizeToSendExceeded",
            &[("maxSize", "6 MB".to_string())],
        );
        assert_eq!(text, "error.totalFileSizeToSendExceeded (maxSize=6 MB)");
        assert_eq!(KeyTranslator.translate("plain", &[]), "plain");
    }

    #[test]
    fn collecting_notifier_drains_in_order() {
        let notifier = CollectingNotifier::new();
        let config = IntakeConfig::default();
        notifier.notify(Notice::from_error(&IntakeError::UnsupportedFormat("a".into()), &config));
        notifier.notify(Notice::from_error(
            &IntakeError::AggregateExceeded {
                current: 0,
                incoming: 1,
                max: 0,
            },
            &config,
        ));

        assert_eq!(notifier.codes(), vec!["E_UNSUPPORTED_FORMAT", "E_AGGREGATE_EXCEEDED"]);
        assert_eq!(notifier.drain().len(), 2);
        assert!(notifier.drain().is_empty());
    }
}
