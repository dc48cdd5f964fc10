//! # 顶栏标题模块
//!
//! 结合路由解析结果、对话标题和“标题生成中”状态，决定顶栏显示什么。
//! 标题生成中时按字符逐个展开（打字机效果）。

use std::time::Duration;

use crate::attachment::Translator;
use crate::routes::{page_label_key, resolve_title_pattern};

/// 打字机效果默认的帧间隔。
pub const DEFAULT_TYPEWRITER_INTERVAL: Duration = Duration::from_millis(30);

/// 顶栏应显示的内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderTitle {
    /// 静态页面；没有标签的页面为 `None`。
    Page { label: Option<String> },
    /// 对话标题；`animated` 为真时交给 [`TitleTypewriter`] 播放。
    Conversation { title: String, animated: bool },
}

impl HeaderTitle {
    /// 不考虑动画时的最终文本。
    pub fn text(&self) -> &str {
        match self {
            Self::Page { label } => label.as_deref().unwrap_or(""),
            Self::Conversation { title, .. } => title,
        }
    }
}

/// 解析顶栏标题。
pub fn resolve_header_title(
    path: &str,
    conversation_title: &str,
    is_generated_title: bool,
    translator: &dyn Translator,
) -> HeaderTitle {
    let pattern = resolve_title_pattern(path);
    if pattern.is_conversation_or_new_chat {
        return HeaderTitle::Conversation {
            title: conversation_title.to_string(),
            animated: is_generated_title,
        };
    }

    HeaderTitle::Page {
        label: page_label_key(pattern.path_pattern).map(|key| translator.translate(key, &[])),
    }
}

/// 按 Unicode 标量逐个展开标题。
///
/// 作为迭代器依次产出 1..=n 个字符的前缀；空标题不产出任何帧。
///
/// ```rust
/// use chat_intake::header::TitleTypewriter;
///
/// let frames: Vec<String> = TitleTypewriter::new("日本語").collect();
/// assert_eq!(frames, vec!["日", "日本", "日本語"]);
/// ```
#[derive(Debug, Clone)]
pub struct TitleTypewriter {
    title: String,
    /// 已输出部分的字节偏移。
    cursor: usize,
}

impl TitleTypewriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cursor: 0,
        }
    }

    /// 以固定间隔播放，每一帧回调一次，返回最终文本。
    pub async fn play<F>(self, interval: Duration, mut on_frame: F) -> String
    where
        F: FnMut(&str),
    {
        let title = self.title.clone();
        let mut ticker = tokio::time::interval(interval);
        for frame in self {
            ticker.tick().await;
            on_frame(&frame);
        }
        title
    }
}

impl Iterator for TitleTypewriter {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.title[self.cursor..].chars().next()?;
        self.cursor += next.len_utf8();
        Some(self.title[..self.cursor].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::KeyTranslator;

    #[test]
    fn conversation_route_shows_title() {
        let title = resolve_header_title("/01HABC", "Trip plan", false, &KeyTranslator);
        assert_eq!(
            title,
            HeaderTitle::Conversation {
                title: "Trip plan".to_string(),
                animated: false,
            }
        );
    }

    #[test]
    fn generating_title_is_animated() {
        let title = resolve_header_title("/", "New chat", true, &KeyTranslator);
        assert!(matches!(title, HeaderTitle::Conversation { animated: true, .. }));
    }

    #[test]
    fn static_page_shows_translated_label() {
        let title = resolve_header_title("/admin/api-management", "ignored", true, &KeyTranslator);
        assert_eq!(title.text(), "admin.apiManagement.label.pageTitle");
    }

    #[test]
    fn unlabeled_page_shows_nothing() {
        let title = resolve_header_title("/admin/users", "ignored", false, &KeyTranslator);
        assert_eq!(title, HeaderTitle::Page { label: None });
    }

    #[test]
    fn empty_title_has_no_frames() {
        assert_eq!(TitleTypewriter::new("").count(), 0);
    }

    #[tokio::test]
    async fn play_emits_every_prefix() {
        let mut frames = Vec::new();
        let done = TitleTypewriter::new("Hi!")
            .play(Duration::from_millis(1), |frame| frames.push(frame.to_string()))
            .await;

        assert_eq!(done, "Hi!");
        assert_eq!(frames, vec!["H", "Hi", "Hi!"]);
    }
}
