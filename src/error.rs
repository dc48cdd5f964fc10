//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 附件流水线内部使用细粒度的 `IntakeError`（带错误码与阶段），
//! 跨模块边界（设置文件、命令行、消息内容校验）统一收敛为 `AppError`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `IntakeError` / `std::io::Error` / `serde_json::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于直接放进 JSON 输出。

use serde::Serialize;

use crate::attachment::IntakeError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 附件接入失败
    #[error("{0}")]
    Intake(#[from] IntakeError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用或内容非法
    #[error("设置错误: {0}")]
    Settings(String),

    /// JSON 序列化 / 反序列化失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 消息内容块校验失败
    #[error("消息内容非法: {0}")]
    InvalidContent(String),

    /// 系统剪贴板读取失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_error_converts_transparently() {
        let err: AppError = IntakeError::UnsupportedFormat("a.exe".to_string()).into();
        assert_eq!(err.to_string(), IntakeError::UnsupportedFormat("a.exe".to_string()).to_string());
    }

    #[test]
    fn serializes_as_plain_string() {
        let err = AppError::Settings("bad profile".to_string());
        let json = serde_json::to_string(&err).expect("serialize");
        assert_eq!(json, "\"设置错误: bad profile\"");
    }
}
