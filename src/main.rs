//! # 聊天输入附件接入 — 命令行入口
//!
//! 本文件只负责参数解析、日志初始化与会话装配。
//! 业务逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chat_intake::attachment::{CandidateFile, ChatInputSession, IntakeReport, LogNotifier, ModelCapability};
use chat_intake::clipboard::read_clipboard_image;
use chat_intake::error::AppError;
use chat_intake::outgoing::SendGate;
use chat_intake::settings::{AppSettings, load_settings, settings_file_path};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chat-intake", about = "Stage chat attachments and print the send payload")]
struct Cli {
    /// Settings file (defaults to ./chat-intake.json).
    #[arg(long, env = "CHAT_INTAKE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Model ID (overrides the settings file).
    #[arg(long)]
    model: Option<String>,

    /// Also stage the image currently on the system clipboard.
    #[arg(long, default_value_t = false)]
    paste: bool,

    /// Message text.
    #[arg(short, long)]
    message: String,

    /// Files to attach.
    files: Vec<PathBuf>,
}

/// 文档按扩展名给出媒体类型，其它文件按签名识别。
fn guess_media_type(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let by_extension = match extension.as_str() {
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "html" => Some("text/html"),
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "xls" => Some("application/vnd.ms-excel"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        _ => None,
    };
    if let Some(media_type) = by_extension {
        return media_type.to_string();
    }

    match infer::get_from_path(path) {
        Ok(Some(kind)) => kind.mime_type().to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

fn collect_candidates(paths: &[PathBuf]) -> Vec<CandidateFile> {
    paths
        .iter()
        .filter_map(|path| match CandidateFile::from_path(path, guess_media_type(path)) {
            Ok(candidate) => Some(candidate),
            Err(err) => {
                log::error!("❌ 无法读取文件 {}：{}", path.display(), err);
                None
            }
        })
        .collect()
}

fn log_report(label: &str, report: &IntakeReport) {
    log::info!(
        "📊 [{}] 接收图片 {} 张 附件 {} 个 拒绝 {} 项",
        label,
        report.accepted_images,
        report.accepted_files,
        report.rejected.len()
    );
}

async fn run(cli: Cli, settings: AppSettings) -> Result<(), AppError> {
    let capability = match &cli.model {
        Some(id) => ModelCapability::for_model(id),
        None => settings.model_capability(),
    };
    log::info!("⚙️ 使用模型：{}（{}）", capability.label, capability.model_id);

    let session = ChatInputSession::with_config(settings.intake_config()?, capability, Arc::new(LogNotifier::new()));

    let candidates = collect_candidates(&cli.files);
    if !candidates.is_empty() {
        let report = session.select_files(candidates).await;
        log_report("files", &report);
    }

    if cli.paste {
        match read_clipboard_image()? {
            Some(item) => {
                let outcome = session.paste(vec![item]).await;
                log_report("paste", &outcome.report);
            }
            None => log::warn!("⚠️ 剪贴板中没有可用的图片"),
        }
    }

    match session.submit(&cli.message, SendGate::default())? {
        Some(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        None => Err(AppError::Settings("消息内容为空，未生成发送载荷".to_string())),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings_path = settings_file_path(cli.settings.as_deref());
    let settings = match load_settings(&settings_path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let default_filter = settings.log_filter.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}
