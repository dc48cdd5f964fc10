//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 单一枚举承载附件链路的全部拒绝原因。每个分支既是调用方可匹配的信号，
//! 也能直接转换为面向用户的提示（`message_key` + `message_params`）。

/// 附件链路统一错误类型。
///
/// 在会话边界上不会向外传播：每个错误都会被转成一条提示，然后跳过对应文件/批次。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    /// 本批文档会使附件总数超过上限，整批拒绝。
    #[error("附件数量超过上限：已有 {current} 个，新增 {incoming} 个（限制：{max} 个）")]
    CountExceeded {
        current: usize,
        incoming: usize,
        max: usize,
    },

    /// 单个文档超过体积上限。
    #[error("文件过大：{name} {size} 字节（限制：{max} 字节）")]
    FileTooLarge { name: String, size: u64, max: u64 },

    /// 加入后编码总体积会超过单次发送上限。
    #[error("发送总体积超过上限：当前 {current} 字节，新增 {incoming} 字节（限制：{max} 字节）")]
    AggregateExceeded {
        current: u64,
        incoming: u64,
        max: u64,
    },

    /// 扩展名/媒体类型均不在白名单中。
    #[error("不支持的文件格式：{0}")]
    UnsupportedFormat(String),

    /// 内容无法读取或无法解码为图片。
    #[error("无法读取附件 {name}：{reason}")]
    Unreadable { name: String, reason: String },

    /// 解码资源限制（像素数/预计内存）。
    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 配置值非法。
    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl IntakeError {
    /// 稳定错误码，供前端或日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::CountExceeded { .. } => "E_COUNT_EXCEEDED",
            Self::FileTooLarge { .. } => "E_FILE_TOO_LARGE",
            Self::AggregateExceeded { .. } => "E_AGGREGATE_EXCEEDED",
            Self::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            Self::Unreadable { .. } => "E_UNREADABLE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::InvalidConfig(_) => "E_INVALID_CONFIG",
        }
    }

    /// 出错所处阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::CountExceeded { .. } | Self::UnsupportedFormat(_) => "classify",
            Self::FileTooLarge { .. } | Self::Unreadable { .. } => "load",
            Self::ResourceLimit(_) => "decode",
            Self::AggregateExceeded { .. } => "commit",
            Self::InvalidConfig(_) => "config",
        }
    }

    /// 翻译键。
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::CountExceeded { .. } => "error.attachment.fileCountExceeded",
            Self::FileTooLarge { .. } => "error.attachment.fileSizeExceeded",
            Self::AggregateExceeded { .. } => "error.totalFileSizeToSendExceeded",
            Self::UnsupportedFormat(_) => "error.unsupportedFileFormat",
            Self::Unreadable { .. } | Self::ResourceLimit(_) => "error.attachment.unreadable",
            Self::InvalidConfig(_) => "error.attachment.invalidConfig",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_kinds_map_to_distinct_message_keys() {
        let errors = [
            IntakeError::CountExceeded {
                current: 4,
                incoming: 2,
                max: 5,
            },
            IntakeError::FileTooLarge {
                name: "a.pdf".into(),
                size: 10,
                max: 5,
            },
            IntakeError::AggregateExceeded {
                current: 1,
                incoming: 2,
                max: 2,
            },
            IntakeError::UnsupportedFormat("a.exe".into()),
        ];

        let mut keys: Vec<_> = errors.iter().map(IntakeError::message_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), errors.len());
    }

    #[test]
    fn stage_follows_pipeline_order() {
        assert_eq!(IntakeError::UnsupportedFormat("x".into()).stage(), "classify");
        assert_eq!(
            IntakeError::AggregateExceeded {
                current: 0,
                incoming: 1,
                max: 0
            }
            .stage(),
            "commit"
        );
    }
}
