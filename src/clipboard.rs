//! # 系统剪贴板读取
//!
//! 命令行没有浏览器的粘贴事件，这里用 `arboard` 读取系统剪贴板中的图片，
//! 转成 PNG 后包装成一个粘贴项，交给与界面粘贴相同的链路处理。

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::attachment::{CandidateFile, ClipboardItem};
use crate::error::AppError;

/// 剪贴板图片统一使用的文件名。
pub const CLIPBOARD_IMAGE_NAME: &str = "clipboard.png";

/// 读取剪贴板图片；剪贴板里没有图片时返回 `None`。
pub fn read_clipboard_image() -> Result<Option<ClipboardItem>, AppError> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;

    let image_data = match clipboard.get_image() {
        Ok(image_data) => image_data,
        Err(arboard::Error::ContentNotAvailable) => {
            log::debug!("📋 剪贴板中没有图片");
            return Ok(None);
        }
        Err(e) => return Err(AppError::Clipboard(e.to_string())),
    };

    let png = rgba_to_png(
        image_data.width as u32,
        image_data.height as u32,
        image_data.bytes.into_owned(),
    )?;
    log::info!("📋 已读取剪贴板图片 {}x{}", image_data.width, image_data.height);

    Ok(Some(clipboard_item_from_png(png)))
}

/// 把一段 PNG 字节包装成粘贴项。
pub fn clipboard_item_from_png(png: Vec<u8>) -> ClipboardItem {
    ClipboardItem {
        media_type: "image/png".to_string(),
        file: Some(CandidateFile::from_bytes(CLIPBOARD_IMAGE_NAME, "image/png", png)),
    }
}

fn rgba_to_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>, AppError> {
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| AppError::Clipboard("创建图像缓冲区失败".to_string()))?;

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| AppError::Clipboard(format!("PNG 编码失败: {}", e)))?;
    Ok(cursor.into_inner())
}
