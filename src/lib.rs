//! # 聊天输入附件接入 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            界面事件（选择 / 拖放 / 粘贴 / 回车）         │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ attachment ── ChatInputSession（会话级暂存）         │
//! │  │   ├─ events     事件适配（是否阻止默认行为）          │
//! │  │   ├─ handler    批次编排（JoinSet + spawn_blocking）  │
//! │  │   ├─ loader     分类·体积检查·读取                    │
//! │  │   ├─ pipeline   解码·缩放·PNG data URI                │
//! │  │   ├─ staging    暂存区 + 总体积不变量                 │
//! │  │   └─ notify     拒绝提示 → Notifier / Translator      │
//! │  │                                                       │
//! │  ├─ outgoing ──── SendPayload / MessageContent           │
//! │  ├─ model ─────── 模型能力（可接收的图片类型）          │
//! │  ├─ routes ────── 路由表与标题模式                       │
//! │  ├─ header ────── 顶栏标题 + 打字机效果                  │
//! │  ├─ clipboard ─── 系统剪贴板图片（arboard）              │
//! │  ├─ settings ──── JSON 设置文件                          │
//! │  └─ error ─────── AppError（统一错误类型）               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`attachment`] | 附件接入流水线与会话状态 |
//! | [`outgoing`] | 发送载荷组装、消息内容块校验、文档名清洗 |
//! | [`model`] | 模型目录与图片能力 |
//! | [`routes`] | 路由模式匹配、标题模式、公开页面判断 |
//! | [`header`] | 顶栏标题解析与逐字动画 |
//! | [`clipboard`] | 读取系统剪贴板图片（命令行 `--paste`） |
//! | [`settings`] | 设置文件读写 |
//! | [`error`] | 统一错误类型 `AppError` |

pub mod attachment;
pub mod clipboard;
pub mod error;
pub mod header;
pub mod model;
pub mod outgoing;
pub mod routes;
pub mod settings;
