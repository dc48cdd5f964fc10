//! # 暂存区
//!
//! 持有待发送的图片、文档以及编码后总体积（`budget`）。
//!
//! 不变量：`budget == Σ encoded_len(images) + Σ encoded_len(files)`。
//! 超限的加入在修改任何状态之前就被拒绝；按位置移除会同步扣减体积，清空时归零。
//! 检查与提交都在 `&mut self` 内完成，外层互斥锁保证其原子性。

use super::source::{PendingFile, PendingImage};
use super::{IntakeConfig, IntakeError};

#[derive(Debug, Default, Clone)]
pub struct StagingArea {
    images: Vec<PendingImage>,
    files: Vec<PendingFile>,
    budget: u64,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[PendingImage] {
        &self.images
    }

    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }

    /// 当前编码后总体积（字节）。
    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.files.is_empty()
    }

    /// 已暂存文件中命中文档扩展名的数量。
    pub fn document_count(&self, config: &IntakeConfig) -> usize {
        self.files
            .iter()
            .filter(|file| config.is_document_name(&file.name))
            .count()
    }

    fn check_budget(&self, incoming: u64, max: u64) -> Result<u64, IntakeError> {
        self.budget
            .checked_add(incoming)
            .filter(|total| *total <= max)
            .ok_or(IntakeError::AggregateExceeded {
                current: self.budget,
                incoming,
                max,
            })
    }

    /// 检查总体积后提交图片。
    pub fn try_push_image(&mut self, image: PendingImage, max_send_bytes: u64) -> Result<(), IntakeError> {
        let total = self.check_budget(image.encoded_len(), max_send_bytes)?;
        self.images.push(image);
        self.budget = total;
        Ok(())
    }

    /// 检查总体积后提交文档。
    pub fn try_push_file(&mut self, file: PendingFile, max_send_bytes: u64) -> Result<(), IntakeError> {
        let total = self.check_budget(file.encoded_len(), max_send_bytes)?;
        self.files.push(file);
        self.budget = total;
        Ok(())
    }

    /// 按位置移除图片；越界时不做任何事。
    pub fn remove_image(&mut self, index: usize) -> Option<PendingImage> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.budget = self.budget.saturating_sub(removed.encoded_len());
        Some(removed)
    }

    /// 按位置移除文档；越界时不做任何事。
    pub fn remove_file(&mut self, index: usize) -> Option<PendingFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.budget = self.budget.saturating_sub(removed.encoded_len());
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.files.clear();
        self.budget = 0;
    }

    /// 取走全部暂存内容并清空。
    pub fn take(&mut self) -> (Vec<PendingImage>, Vec<PendingFile>) {
        self.budget = 0;
        (std::mem::take(&mut self.images), std::mem::take(&mut self.files))
    }

    /// 按当前内容重新求和。
    pub fn recomputed_budget(&self) -> u64 {
        self.images.iter().map(PendingImage::encoded_len).sum::<u64>()
            + self.files.iter().map(PendingFile::encoded_len).sum::<u64>()
    }
}
