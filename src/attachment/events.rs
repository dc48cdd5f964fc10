//! # 界面事件适配层
//!
//! 只做事件参数到会话 API 的转换，以及“是否阻止默认行为”的判定，不承载业务逻辑。

use super::handler::IntakeReport;
use super::source::{CandidateFile, ClipboardItem};
use super::{ChatInputSession, IntakeError};
use crate::outgoing::{SendGate, SendPayload};

/// 事件处理后需要回传给界面的动作。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventResponse {
    pub prevent_default: bool,
}

/// 拖拽经过输入框：始终阻止默认行为，否则浏览器会直接打开文件。
pub fn on_drag_over() -> EventResponse {
    EventResponse {
        prevent_default: true,
    }
}

/// 文件选择器变更。
pub async fn on_change_file(session: &ChatInputSession, files: Vec<CandidateFile>) -> IntakeReport {
    session.select_files(files).await
}

/// 放下拖拽的文件。
pub async fn on_drop(session: &ChatInputSession, files: Vec<CandidateFile>) -> (EventResponse, IntakeReport) {
    let report = session.drop_files(files).await;
    (
        EventResponse {
            prevent_default: true,
        },
        report,
    )
}

/// 粘贴。
pub async fn on_paste(session: &ChatInputSession, items: Vec<ClipboardItem>) -> (EventResponse, IntakeReport) {
    if items.is_empty() {
        return (EventResponse::default(), IntakeReport::default());
    }

    let outcome = session.paste(items).await;
    (
        EventResponse {
            prevent_default: outcome.default_prevented,
        },
        outcome.report,
    )
}

/// 按键：Enter（不含 Shift）阻止换行并在允许时发送。
pub fn on_keypress(
    session: &ChatInputSession,
    key: &str,
    shift: bool,
    content: &str,
    gate: SendGate,
) -> Result<(EventResponse, Option<SendPayload>), IntakeError> {
    if key != "Enter" || shift {
        return Ok((EventResponse::default(), None));
    }

    let payload = session.submit(content, gate)?;
    Ok((
        EventResponse {
            prevent_default: true,
        },
        payload,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::attachment::{CollectingNotifier, ModelCapability};

    fn session() -> ChatInputSession {
        ChatInputSession::new(
            ModelCapability::for_model("claude-v3-opus"),
            Arc::new(CollectingNotifier::new()),
        )
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let session = session();
        let (response, payload) =
            on_keypress(&session, "Enter", true, "hi", SendGate::default()).expect("keypress");

        assert!(!response.prevent_default);
        assert!(payload.is_none());
    }

    #[test]
    fn enter_sends_when_allowed() {
        let session = session();
        let (response, payload) =
            on_keypress(&session, "Enter", false, "hi", SendGate::default()).expect("keypress");

        assert!(response.prevent_default);
        assert_eq!(payload.map(|p| p.content), Some("hi".to_string()));
    }

    #[test]
    fn enter_with_error_state_is_swallowed() {
        let session = session();
        let gate = SendGate {
            has_error: true,
            ..SendGate::default()
        };
        let (response, payload) = on_keypress(&session, "Enter", false, "hi", gate).expect("keypress");

        assert!(response.prevent_default);
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn empty_paste_keeps_default_behaviour() {
        let session = session();
        let (response, report) = on_paste(&session, Vec::new()).await;

        assert!(!response.prevent_default);
        assert_eq!(report, IntakeReport::default());
    }

    #[test]
    fn drag_over_always_prevents_default() {
        assert!(on_drag_over().prevent_default);
    }
}
