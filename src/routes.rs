//! # 路由标题解析模块
//!
//! ## 设计思路
//!
//! 顶栏标题只分两种情况：
//! - 当前地址命中某个静态页面（探索、管理、协议等），显示该页面的标签
//! - 其余情况（首页、新对话、按 ID 打开的对话、机器人对话、未知地址）显示对话标题
//!
//! 因此匹配时把“对话形态”的路由（`/:conversationId`、`/bot/:botId`、`/`、`*`）
//! 从完整路由表中剔除，剩下的才是静态页面；一个都没命中就是对话。
//!
//! ## 实现思路
//!
//! 路由模式在首次使用时编译为正则（`once_cell::Lazy`），语义与前端路由一致：
//! - `:param` 匹配一个非空路径段
//! - `*` 匹配剩余全部
//! - 不区分大小写，允许末尾斜杠

use once_cell::sync::Lazy;
use regex::Regex;

/// 完整路由表，顺序即匹配优先级。
pub const ALL_ROUTES: &[&str] = &[
    "/",
    "/bot/explore",
    "/bot/new",
    "/bot/edit/:botId",
    "/bot/api-settings/:botId",
    "/bot/:botId",
    "/admin/shared-bot-analytics",
    "/admin/api-management",
    "/admin/bot/:botId",
    "/admin/users",
    "/:conversationId",
    "*",
    "/usage-rules",
    "/agreement",
];

/// 对话形态的路由，不参与静态页面匹配。
pub const CONVERSATION_ROUTES: &[&str] = &["/:conversationId", "/bot/:botId", "/", "*"];

/// 不显示对话列表抽屉的公开页面。
pub const PUBLIC_ROUTES: &[&str] = &["/usage-rules", "/agreement"];

/// 静态页面的标签翻译 key。
const PAGE_LABEL_KEYS: &[(&str, &str)] = &[
    ("/agreement", "usrAgreement.pageTitle"),
    ("/usage-rules", "usageRules.pageTitle"),
    ("/bot/explore", "bot.explore.label.pageTitle"),
    ("/admin/shared-bot-analytics", "admin.sharedBotAnalytics.label.pageTitle"),
    ("/admin/api-management", "admin.apiManagement.label.pageTitle"),
];

/// 未命中静态页面时使用的模式。
pub const DEFAULT_PATTERN: &str = "/";

struct CompiledRoute {
    pattern: &'static str,
    regex: Regex,
}

static PAGE_ROUTES: Lazy<Vec<CompiledRoute>> = Lazy::new(|| {
    ALL_ROUTES
        .iter()
        .copied()
        .filter(|pattern| !CONVERSATION_ROUTES.contains(pattern))
        .map(|pattern| CompiledRoute {
            pattern,
            regex: Regex::new(&pattern_to_regex(pattern)).unwrap(),
        })
        .collect()
});

static PUBLIC_ROUTE_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    PUBLIC_ROUTES
        .iter()
        .map(|pattern| Regex::new(&pattern_to_regex(pattern)).unwrap())
        .collect()
});

/// 把路由模式转换为锚定的正则表达式。
fn pattern_to_regex(pattern: &str) -> String {
    let body: Vec<String> = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment == "*" {
                ".*".to_string()
            } else if segment.starts_with(':') {
                "[^/]+".to_string()
            } else {
                regex::escape(segment)
            }
        })
        .collect();

    if body.is_empty() {
        return "(?i)^/?$".to_string();
    }
    format!("(?i)^/{}/?$", body.join("/"))
}

/// 去掉查询串与片段，空路径视为根路径。
fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.is_empty() { "/" } else { path }
}

/// 顶栏标题的匹配结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitlePattern {
    /// 没有命中任何静态页面。
    pub is_conversation_or_new_chat: bool,
    /// 命中的静态页面模式；未命中时为 `/`。
    pub path_pattern: &'static str,
}

/// 解析当前地址对应的标题模式。
///
/// ```rust
/// use chat_intake::routes::resolve_title_pattern;
///
/// let page = resolve_title_pattern("/bot/explore");
/// assert!(!page.is_conversation_or_new_chat);
/// assert_eq!(page.path_pattern, "/bot/explore");
///
/// let chat = resolve_title_pattern("/01HXYZ");
/// assert!(chat.is_conversation_or_new_chat);
/// assert_eq!(chat.path_pattern, "/");
/// ```
pub fn resolve_title_pattern(path: &str) -> TitlePattern {
    let path = normalize_path(path);
    match PAGE_ROUTES.iter().find(|route| route.regex.is_match(path)) {
        Some(route) => TitlePattern {
            is_conversation_or_new_chat: false,
            path_pattern: route.pattern,
        },
        None => TitlePattern {
            is_conversation_or_new_chat: true,
            path_pattern: DEFAULT_PATTERN,
        },
    }
}

/// 静态页面模式对应的标签 key；没有标签的页面返回 `None`。
pub fn page_label_key(pattern: &str) -> Option<&'static str> {
    PAGE_LABEL_KEYS
        .iter()
        .find(|(path, _)| *path == pattern)
        .map(|(_, key)| *key)
}

/// 当前地址是否是公开页面。
pub fn is_public_route(path: &str) -> bool {
    let path = normalize_path(path);
    PUBLIC_ROUTE_REGEXES.iter().any(|regex| regex.is_match(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_shaped_paths_fall_back_to_root_pattern() {
        for path in ["/", "", "/abc123", "/bot/some-bot", "/x/y/z"] {
            let pattern = resolve_title_pattern(path);
            assert!(pattern.is_conversation_or_new_chat, "{} should be a conversation", path);
            assert_eq!(pattern.path_pattern, "/");
        }
    }

    #[test]
    fn static_pages_match_their_pattern() {
        assert_eq!(resolve_title_pattern("/admin/users").path_pattern, "/admin/users");
        assert_eq!(resolve_title_pattern("/bot/edit/42").path_pattern, "/bot/edit/:botId");
        assert_eq!(resolve_title_pattern("/bot/new").path_pattern, "/bot/new");
        assert_eq!(resolve_title_pattern("/agreement").path_pattern, "/agreement");
    }

    #[test]
    fn matching_ignores_case_trailing_slash_and_query() {
        assert_eq!(resolve_title_pattern("/Bot/Explore/").path_pattern, "/bot/explore");
        assert_eq!(resolve_title_pattern("/usage-rules?lang=ja").path_pattern, "/usage-rules");
    }

    #[test]
    fn param_segment_must_be_non_empty() {
        assert!(resolve_title_pattern("/bot/edit/").is_conversation_or_new_chat);
        assert!(resolve_title_pattern("/bot/edit/1/extra").is_conversation_or_new_chat);
    }

    #[test]
    fn label_keys_exist_only_for_titled_pages() {
        assert_eq!(page_label_key("/bot/explore"), Some("bot.explore.label.pageTitle"));
        assert_eq!(page_label_key("/agreement"), Some("usrAgreement.pageTitle"));
        assert_eq!(page_label_key("/admin/users"), None);
        assert_eq!(page_label_key("/"), None);
    }

    #[test]
    fn public_routes_are_detected() {
        assert!(is_public_route("/usage-rules"));
        assert!(is_public_route("/Agreement/"));
        assert!(!is_public_route("/"));
        assert!(!is_public_route("/bot/explore"));
    }
}
