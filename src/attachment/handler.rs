//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `IntakeHandler` 负责一批候选文件的完整编排，不关心它们来自文件选择、拖放还是粘贴：
//! 1. 读取配置与模型能力快照
//! 2. 逐个分类（文档优先于图片）
//! 3. 批次级数量检查：已暂存文档数 + 本批文档数超限则整批拒绝，任何文件都不读取
//! 4. 每个文件一条独立的顺序异步链路：读取 → （解码 → 缩放 → 编码）→ 检查并提交
//!
//! ## 实现思路
//!
//! - 内部状态全部是 `Arc`，`Clone` 后即可移入 tokio 任务。
//! - 批内文件各自作为 `JoinSet` 任务并发执行，完成顺序不做保证。
//! - 图片的解码缩放放在 `spawn_blocking`，不占用异步工作线程。
//! - 总体积的“检查 + 提交”在同一次加锁内完成，并发完成的文件不会联合超限。
//! - 所有失败都只转成提示并跳过该文件/批次，不向调用方传播。

use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use tokio::task::JoinSet;

use super::notify::{Notice, Notifier};
use super::source::{AttachmentKind, CandidateFile, ClipboardItem, PendingFile, PendingImage};
use super::staging::StagingArea;
use super::{IntakeConfig, IntakeError, ModelCapability, ResizeProfile};

/// 输入来源，仅用于日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOrigin {
    Picker,
    Drop,
    Paste,
}

impl IntakeOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Picker => "picker",
            Self::Drop => "drop",
            Self::Paste => "paste",
        }
    }
}

/// 一批处理的结果汇总。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IntakeReport {
    pub accepted_images: usize,
    pub accepted_files: usize,
    pub rejected: Vec<IntakeError>,
}

impl IntakeReport {
    /// 整批是否因数量超限被拒绝。
    pub fn batch_rejected(&self) -> bool {
        self.rejected
            .iter()
            .any(|err| matches!(err, IntakeError::CountExceeded { .. }))
    }

    fn merge(&mut self, other: IntakeReport) {
        self.accepted_images += other.accepted_images;
        self.accepted_files += other.accepted_files;
        self.rejected.extend(other.rejected);
    }
}

/// 粘贴处理结果。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PasteOutcome {
    /// 是否需要阻止默认粘贴行为。
    pub default_prevented: bool,
    pub report: IntakeReport,
}

enum Accepted {
    Image,
    File,
}

/// 附件编排器。
#[derive(Clone)]
pub struct IntakeHandler {
    pub(super) config: Arc<RwLock<IntakeConfig>>,
    pub(super) capability: Arc<RwLock<ModelCapability>>,
    pub(super) staging: Arc<Mutex<StagingArea>>,
    pub(super) notifier: Arc<dyn Notifier>,
}

impl IntakeHandler {
    pub fn new(config: IntakeConfig, capability: ModelCapability, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            capability: Arc::new(RwLock::new(capability)),
            staging: Arc::new(Mutex::new(StagingArea::new())),
            notifier,
        }
    }

    /// 获取配置快照，保证单批处理使用一致参数。
    pub(super) fn config_snapshot(&self) -> Result<IntakeConfig, IntakeError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| IntakeError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    pub(super) fn capability_snapshot(&self) -> Result<ModelCapability, IntakeError> {
        self.capability
            .read()
            .map(|cap| cap.clone())
            .map_err(|_| IntakeError::ResourceLimit("模型能力读取锁已中毒".to_string()))
    }

    pub(super) fn set_capability(&self, capability: ModelCapability) -> Result<(), IntakeError> {
        let mut guard = self
            .capability
            .write()
            .map_err(|_| IntakeError::ResourceLimit("模型能力写入锁已中毒".to_string()))?;
        log::info!(
            "⚙️ 已切换模型：{}（图片类型: {:?}）",
            capability.model_id,
            capability.support_media_types
        );
        *guard = capability;
        Ok(())
    }

    pub(super) fn set_resize_profile(&self, profile: ResizeProfile) -> Result<(), IntakeError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| IntakeError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_resize_profile(profile);
        log::info!("⚙️ 已切换缩放档位：{}（filter={:?}）", profile.as_str(), config.resize_filter);
        Ok(())
    }

    /// 在锁内读取或修改暂存区。
    pub(super) fn with_staging<R>(&self, f: impl FnOnce(&mut StagingArea) -> R) -> Result<R, IntakeError> {
        let mut guard = self
            .staging
            .lock()
            .map_err(|_| IntakeError::ResourceLimit("暂存区锁已中毒".to_string()))?;
        Ok(f(&mut guard))
    }

    fn report_rejection(&self, error: &IntakeError, config: &IntakeConfig) {
        log::warn!("🚫 附件被拒绝 [{}/{}]：{}", error.stage(), error.code(), error);
        self.notifier.notify(Notice::from_error(error, config));
    }

    /// 处理文件选择或拖放得到的一批候选文件。
    pub async fn ingest_batch(&self, files: Vec<CandidateFile>, origin: IntakeOrigin) -> IntakeReport {
        let mut report = IntakeReport::default();
        let (config, capability) = match (self.config_snapshot(), self.capability_snapshot()) {
            (Ok(config), Ok(capability)) => (config, capability),
            (Err(err), _) | (_, Err(err)) => {
                log::error!("附件处理无法开始：{}", err);
                report.rejected.push(err);
                return report;
            }
        };

        let classified: Vec<(CandidateFile, AttachmentKind)> = files
            .into_iter()
            .map(|file| {
                let kind = Self::classify(&file, &config, &capability);
                log::debug!("🔎 [{}] {} -> {:?}", origin.as_str(), file.name, kind);
                (file, kind)
            })
            .collect();

        let incoming = classified
            .iter()
            .filter(|(_, kind)| *kind == AttachmentKind::Document)
            .count();
        let current = match self.with_staging(|staging| staging.document_count(&config)) {
            Ok(current) => current,
            Err(err) => {
                self.report_rejection(&err, &config);
                report.rejected.push(err);
                return report;
            }
        };

        if current + incoming > config.max_attached_files {
            let err = IntakeError::CountExceeded {
                current,
                incoming,
                max: config.max_attached_files,
            };
            self.report_rejection(&err, &config);
            report.rejected.push(err);
            return report;
        }

        let mut accepted_candidates = Vec::with_capacity(classified.len());
        for (file, kind) in classified {
            if kind == AttachmentKind::Unsupported {
                let err = IntakeError::UnsupportedFormat(file.name);
                self.report_rejection(&err, &config);
                report.rejected.push(err);
            } else {
                accepted_candidates.push((file, kind));
            }
        }

        report.merge(self.run_chains(accepted_candidates, config).await);
        report
    }

    /// 处理一次粘贴事件。
    ///
    /// 媒体类型在模型支持列表中且能取到文件的项按图片处理，并要求阻止默认粘贴；
    /// 其余项静默忽略。
    pub async fn ingest_paste(&self, items: Vec<ClipboardItem>) -> PasteOutcome {
        let mut outcome = PasteOutcome::default();
        let (config, capability) = match (self.config_snapshot(), self.capability_snapshot()) {
            (Ok(config), Ok(capability)) => (config, capability),
            (Err(err), _) | (_, Err(err)) => {
                log::error!("粘贴处理无法开始：{}", err);
                outcome.report.rejected.push(err);
                return outcome;
            }
        };

        let images: Vec<(CandidateFile, AttachmentKind)> = items
            .into_iter()
            .filter(|item| capability.supports_media_type(&item.media_type))
            .filter_map(|item| item.file)
            .map(|file| (file, AttachmentKind::Image))
            .collect();

        if images.is_empty() {
            return outcome;
        }

        log::debug!("📋 [{}] 捕获 {} 张图片", IntakeOrigin::Paste.as_str(), images.len());
        outcome.default_prevented = true;
        outcome.report = self.run_chains(images, config).await;
        outcome
    }

    async fn run_chains(&self, candidates: Vec<(CandidateFile, AttachmentKind)>, config: IntakeConfig) -> IntakeReport {
        let mut report = IntakeReport::default();
        let mut tasks = JoinSet::new();

        for (file, kind) in candidates {
            let handler = self.clone();
            let config = config.clone();
            tasks.spawn(async move {
                let result = match kind {
                    AttachmentKind::Document => handler.intake_document(file, &config).await,
                    _ => handler.intake_image(file, &config).await,
                };
                if let Err(err) = &result {
                    handler.report_rejection(err, &config);
                }
                result
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Accepted::Image)) => report.accepted_images += 1,
                Ok(Ok(Accepted::File)) => report.accepted_files += 1,
                Ok(Err(err)) => report.rejected.push(err),
                Err(join_err) => log::error!("附件处理任务异常退出：{}", join_err),
            }
        }

        report
    }

    async fn intake_document(&self, candidate: CandidateFile, config: &IntakeConfig) -> Result<Accepted, IntakeError> {
        let start = Instant::now();
        Self::validate_document_size(&candidate, config)?;

        let raw = Self::load_candidate(candidate).await?;
        Self::validate_loaded_document_size(&raw, config)?;
        let base64_content = Self::encode_base64(&raw.bytes);
        let pending = PendingFile {
            name: raw.name,
            media_type: raw.media_type,
            size_bytes: raw.size,
            base64_content,
        };

        let name = pending.name.clone();
        let encoded_len = pending.encoded_len();
        self.with_staging(|staging| staging.try_push_file(pending, config.max_send_bytes))??;

        log::info!(
            "📎 文档已暂存 - {} base64 {} 字节 耗时 {}ms",
            name,
            encoded_len,
            start.elapsed().as_millis()
        );
        Ok(Accepted::File)
    }

    async fn intake_image(&self, candidate: CandidateFile, config: &IntakeConfig) -> Result<Accepted, IntakeError> {
        let start = Instant::now();
        let name = candidate.name.clone();

        let raw = Self::load_candidate(candidate).await?;
        let load_elapsed = start.elapsed();

        let decode_config = config.clone();
        let prepared: PendingImage = tokio::task::spawn_blocking(move || Self::prepare_image(raw, &decode_config))
            .await
            .map_err(|e| IntakeError::Unreadable {
                name: name.clone(),
                reason: format!("图片处理任务异常：{}", e),
            })??;

        self.with_staging(|staging| staging.try_push_image(prepared, config.max_send_bytes))??;

        log::info!(
            "🖼️ 图片已暂存 - {} load={}ms total={}ms",
            name,
            load_elapsed.as_millis(),
            start.elapsed().as_millis()
        );
        Ok(Accepted::Image)
    }
}
