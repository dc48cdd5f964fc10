//! # 解码与缩放流水线模块
//!
//! ## 设计思路
//!
//! 把“字节 → 图像 → 缩放 → PNG data URI”集中在一处，并在完整解码之前先按图片头
//! 做像素与内存上限检查，降低超大图片带来的内存峰值。
//!
//! ## 实现思路
//!
//! 1. 文件签名确认是图片
//! 2. 读取 header 尺寸并做资源上限检查
//! 3. 完整解码
//! 4. 按长边限制计算目标尺寸（宽高比 > 1 时以宽为准，否则以高为准）
//! 5. `fast_image_resize` 缩放，失败时回退 `image::resize_exact`
//! 6. 重新编码为 PNG，拼成 data URI
//!
//! 这里都是 CPU 密集的同步代码，由编排层放进 `spawn_blocking` 执行。

use std::io::Cursor;

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, ImageReader, Rgba};

use super::source::{PendingImage, RawAttachment};
use super::{IntakeConfig, IntakeError, IntakeHandler};

const PNG_MEDIA_TYPE: &str = "image/png";

/// 按长边限制计算缩放后的尺寸。
///
/// 宽高比 > 1 时只看宽是否超限，否则只看高；结果截断为整数且不小于 1。
///
/// ```rust
/// use chat_intake::attachment::scaled_dimensions;
///
/// assert_eq!(scaled_dimensions(3136, 1568, 1568), (1568, 784));
/// assert_eq!(scaled_dimensions(800, 600, 1568), (800, 600));
/// ```
pub fn scaled_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }

    let aspect_ratio = width as f64 / height as f64;
    let (new_width, new_height) = if aspect_ratio > 1.0 {
        if width > max_edge {
            (max_edge as f64, max_edge as f64 / aspect_ratio)
        } else {
            (width as f64, height as f64)
        }
    } else if height > max_edge {
        (max_edge as f64 * aspect_ratio, max_edge as f64)
    } else {
        (width as f64, height as f64)
    };

    (
        (new_width.trunc() as u32).max(1),
        (new_height.trunc() as u32).max(1),
    )
}

impl IntakeHandler {
    /// 将原始图片字节处理为可暂存的 PNG data URI。
    pub(crate) fn prepare_image(
        raw: RawAttachment,
        config: &IntakeConfig,
    ) -> Result<PendingImage, IntakeError> {
        Self::validate_image_signature(&raw)?;

        let (header_width, header_height) = Self::inspect_dimensions(&raw)?;
        Self::validate_decode_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes).map_err(|e| IntakeError::Unreadable {
            name: raw.name.clone(),
            reason: format!("图片解码失败：{}", e),
        })?;

        let (raw_width, raw_height) = decoded.dimensions();
        Self::validate_decode_limits(config, raw_width, raw_height)?;

        let (target_width, target_height) =
            scaled_dimensions(raw_width, raw_height, config.max_image_edge);

        let resized = if (target_width, target_height) == (raw_width, raw_height) {
            decoded
        } else {
            Self::resize(&decoded, target_width, target_height, config.resize_filter)
        };

        let png = Self::encode_png(&resized, &raw.name)?;
        let data_uri = format!(
            "data:{};base64,{}",
            PNG_MEDIA_TYPE,
            Self::encode_base64(&png)
        );

        log::info!(
            "✅ 图片处理完成 - {} 原始: {}x{}（{}） 输出: {}x{} data URI {} 字节",
            raw.name,
            raw_width,
            raw_height,
            raw.media_type,
            target_width,
            target_height,
            data_uri.len()
        );

        Ok(PendingImage {
            data_uri,
            media_type: PNG_MEDIA_TYPE.to_string(),
            width: target_width,
            height: target_height,
        })
    }

    /// 仅通过图片头读取宽高。
    fn inspect_dimensions(raw: &RawAttachment) -> Result<(u32, u32), IntakeError> {
        let reader = ImageReader::new(Cursor::new(&raw.bytes[..]))
            .with_guessed_format()
            .map_err(|e| IntakeError::Unreadable {
                name: raw.name.clone(),
                reason: format!("无法识别图片格式：{}", e),
            })?;

        reader.into_dimensions().map_err(|e| IntakeError::Unreadable {
            name: raw.name.clone(),
            reason: format!("无法读取图片尺寸：{}", e),
        })
    }

    fn validate_decode_limits(config: &IntakeConfig, width: u32, height: u32) -> Result<(), IntakeError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| IntakeError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(IntakeError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| IntakeError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(IntakeError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    fn resize(image: &DynamicImage, target_width: u32, target_height: u32, filter: FilterType) -> DynamicImage {
        match Self::resize_with_fast_image_resize(image, target_width, target_height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
                image.resize_exact(target_width, target_height, filter)
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<DynamicImage, IntakeError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image =
            fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
                .map_err(|e| IntakeError::ResourceLimit(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| IntakeError::ResourceLimit(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| IntakeError::ResourceLimit("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }

    fn encode_png(image: &DynamicImage, name: &str) -> Result<Vec<u8>, IntakeError> {
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| IntakeError::Unreadable {
                name: name.to_string(),
                reason: format!("PNG 编码失败：{}", e),
            })?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::test_support::png_bytes;

    fn raw(name: &str, bytes: Vec<u8>) -> RawAttachment {
        RawAttachment {
            name: name.to_string(),
            media_type: "image/png".to_string(),
            size: bytes.len() as u64,
            bytes: bytes.into(),
        }
    }

    #[test]
    fn landscape_is_limited_by_width() {
        assert_eq!(scaled_dimensions(4704, 3136, 1568), (1568, 1045));
        assert_eq!(scaled_dimensions(3200, 1600, 1568), (1568, 784));
    }

    #[test]
    fn portrait_is_limited_by_height() {
        assert_eq!(scaled_dimensions(1000, 2000, 1568), (784, 1568));
    }

    #[test]
    fn square_uses_height_branch() {
        assert_eq!(scaled_dimensions(2000, 2000, 1568), (1568, 1568));
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(scaled_dimensions(640, 480, 1568), (640, 480));
        assert_eq!(scaled_dimensions(1568, 1568, 1568), (1568, 1568));
    }

    #[test]
    fn extreme_aspect_never_collapses_to_zero() {
        assert_eq!(scaled_dimensions(100_000, 10, 1568), (1568, 1));
    }

    #[test]
    fn prepare_image_downscales_and_emits_png_data_uri() {
        let config = IntakeConfig::default();
        let prepared = IntakeHandler::prepare_image(raw("wide.png", png_bytes(2400, 1200)), &config)
            .expect("prepare should succeed");

        assert_eq!((prepared.width, prepared.height), (1568, 784));
        assert!(prepared.data_uri.starts_with("data:image/png;base64,"));
        assert_eq!(prepared.media_type, "image/png");
    }

    #[test]
    fn prepare_image_keeps_small_image_dimensions() {
        let config = IntakeConfig::default();
        let prepared = IntakeHandler::prepare_image(raw("small.png", png_bytes(64, 32)), &config)
            .expect("prepare should succeed");

        assert_eq!((prepared.width, prepared.height), (64, 32));
    }

    #[test]
    fn prepare_image_rejects_too_many_pixels_before_decode() {
        let mut config = IntakeConfig::default();
        config.max_decoded_pixels = 1_000;

        let result = IntakeHandler::prepare_image(raw("big.png", png_bytes(100, 100)), &config);
        assert!(matches!(result, Err(IntakeError::ResourceLimit(_))));
    }

    #[test]
    fn prepare_image_rejects_non_image_bytes() {
        let config = IntakeConfig::default();
        let result = IntakeHandler::prepare_image(raw("fake.png", b"not an image".to_vec()), &config);

        assert!(matches!(result, Err(IntakeError::Unreadable { .. })));
    }
}
