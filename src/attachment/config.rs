//! # 配置模块
//!
//! ## 设计思路
//!
//! 附件链路的上限值都是编译期常量，集中放在这里；`IntakeConfig` 只是把这些常量
//! 打包成一个可克隆的快照，供单次批处理使用，测试时也可以构造更小的上限。
//!
//! ## 实现思路
//!
//! - `Default` 直接取常量，生产环境不做运行时修改。
//! - `ResizeProfile` 只影响缩放滤镜（质量/速度取舍），不改变任何尺寸或体积上限。
//! - 文档扩展名匹配按 ASCII 大小写不敏感的后缀比较。

use image::imageops::FilterType;

use super::IntakeError;

/// 图片长边上限（像素）。
pub const MAX_IMAGE_EDGE: u32 = 1568;

/// 单个文档附件的原始体积上限：6 MB。
pub const MAX_FILE_SIZE_BYTES: u64 = 6 * 1024 * 1024;

/// 单次发送允许的编码后总体积上限（MB）。
pub const MAX_FILE_SIZE_TO_SEND_MB: u64 = 6;

/// 单次发送允许的编码后总体积上限（字节）。
pub const MAX_FILE_SIZE_TO_SEND_BYTES: u64 = MAX_FILE_SIZE_TO_SEND_MB * 1024 * 1024;

/// 单条消息允许附带的文档数量上限。
pub const MAX_ATTACHED_FILES: usize = 5;

/// 文档类附件允许的扩展名。
pub const SUPPORTED_FILE_EXTENSIONS: &[&str] = &[
    ".csv", ".doc", ".docx", ".html", ".md", ".pdf", ".txt", ".xls", ".xlsx",
];

/// 附件链路配置快照。
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// 缩放后宽/高的最大值。
    pub max_image_edge: u32,
    /// 单个文档的原始体积上限（字节）。
    pub max_file_size_bytes: u64,
    /// 单次发送的编码后总体积上限（字节）。
    pub max_send_bytes: u64,
    /// 文档附件数量上限。
    pub max_attached_files: usize,
    /// 文档扩展名白名单（含前导点）。
    pub supported_file_extensions: Vec<String>,
    /// 解码前按图片头拒绝的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_image_edge: MAX_IMAGE_EDGE,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_send_bytes: MAX_FILE_SIZE_TO_SEND_BYTES,
            max_attached_files: MAX_ATTACHED_FILES,
            supported_file_extensions: SUPPORTED_FILE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl IntakeConfig {
    /// 文件名是否命中文档扩展名白名单。
    pub fn is_document_name(&self, name: &str) -> bool {
        self.supported_file_extensions
            .iter()
            .any(|ext| ends_with_ignore_ascii_case(name, ext))
    }

    /// 以 MB 为单位的单文件上限文案（如 `6 MB`），用于提示参数。
    pub(crate) fn max_file_size_label(&self) -> String {
        format_megabytes(self.max_file_size_bytes)
    }

    /// 以 MB 为单位的总上限文案（如 `6 MB`）。
    pub(crate) fn max_send_size_label(&self) -> String {
        format_megabytes(self.max_send_bytes)
    }
}

pub(crate) fn ends_with_ignore_ascii_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

fn format_megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    if (mb - mb.round()).abs() < f64::EPSILON {
        format!("{} MB", mb.round() as u64)
    } else {
        format!("{:.1} MB", mb)
    }
}

/// 缩放档位。
///
/// - `Quality`：CatmullRom，边缘更锐利
/// - `Balanced`：Triangle（默认）
/// - `Speed`：Nearest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeProfile {
    Quality,
    Balanced,
    Speed,
}

impl ResizeProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use chat_intake::attachment::ResizeProfile;
    ///
    /// let p = ResizeProfile::from_str("Balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), chat_intake::attachment::IntakeError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, IntakeError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(IntakeError::InvalidConfig(format!(
                "未知缩放档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    pub(crate) fn filter(self) -> FilterType {
        match self {
            Self::Quality => FilterType::CatmullRom,
            Self::Balanced => FilterType::Triangle,
            Self::Speed => FilterType::Nearest,
        }
    }
}

impl IntakeConfig {
    /// 应用缩放档位。
    pub fn apply_resize_profile(&mut self, profile: ResizeProfile) {
        self.resize_filter = profile.filter();
    }

    /// 从当前滤镜反推档位；未知滤镜按 `Balanced` 处理。
    pub fn resize_profile(&self) -> ResizeProfile {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Lanczos3 => ResizeProfile::Quality,
            FilterType::Nearest => ResizeProfile::Speed,
            _ => ResizeProfile::Balanced,
        }
    }
}
