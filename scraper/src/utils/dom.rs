//! HTML快照遍历工具
//!
//! 抽取器和分类器都在渲染后的HTML快照上工作,这里集中放置
//! 帖子链接识别、文本收集、祖先判断等共用逻辑。

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// 编译静态选择器 (字面量在编译期已知,失败即为编码错误)
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("无效的静态选择器 {}: {:?}", css, e))
}

/// 帖子链接
pub const POST_LINK_CSS: &str = r#"a[href*="/post/"]"#;
pub static POST_LINK: Lazy<Selector> = Lazy::new(|| selector(POST_LINK_CSS));

/// 带方向标记的文本节点
pub static DIR_TEXT: Lazy<Selector> = Lazy::new(|| selector("[dir]"));

/// 可交互控件
pub static ACTION_CONTROL: Lazy<Selector> =
    Lazy::new(|| selector(r#"[role="button"], button"#));

pub static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
pub static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));
pub static VIDEO: Lazy<Selector> = Lazy::new(|| selector("video"));
pub static VIDEO_SOURCE: Lazy<Selector> = Lazy::new(|| selector("source[src]"));
pub static TIME: Lazy<Selector> = Lazy::new(|| selector("time"));
pub static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3"));
pub static LABELLED: Lazy<Selector> = Lazy::new(|| selector("[aria-label]"));
pub static MAIN_REGION: Lazy<Selector> = Lazy::new(|| selector(r#"[role="main"], main"#));
pub static DIALOG: Lazy<Selector> =
    Lazy::new(|| selector(r#"[role="dialog"], [aria-modal="true"]"#));
pub static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));

/// 帖子路径: /@{username}/post/{id}
static POST_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/@([A-Za-z0-9._]+)/post/([A-Za-z0-9_-]+)").expect("帖子链接正则有效")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("空白正则有效"));

/// 从链接中解析 (用户名, 帖子ID)
pub fn parse_post_href(href: &str) -> Option<(String, String)> {
    POST_HREF
        .captures(href)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// 按文档顺序收集去重后的帖子ID
pub fn collect_post_ids(document: &Html) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    document
        .select(&POST_LINK)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(parse_post_href)
        .filter_map(|(_, id)| seen.insert(id.clone()).then_some(id))
        .collect()
}

/// 元素全部文本,空白折叠为单个空格
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// 元素的"标签文本": aria-label 与可见文本拼接
///
/// 按钮通常用 svg 的 aria-label 表示含义,用子元素文本表示数量
pub fn label_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(label) = element.value().attr("aria-label") {
        parts.push(label.to_string());
    }
    for labelled in element.select(&LABELLED) {
        if labelled.id() == element.id() {
            continue;
        }
        if let Some(label) = labelled.value().attr("aria-label") {
            parts.push(label.to_string());
        }
    }
    let text = element_text(element);
    if !text.is_empty() {
        parts.push(text);
    }
    parts.join(" ")
}

/// 页面可见文本 (跳过 script/style/noscript/template)
pub fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut pieces = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor.value().as_element().is_some_and(|el| {
                matches!(el.name(), "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden && !text.trim().is_empty() {
            pieces.push(text.trim().to_string());
        }
    }
    pieces.join(" ")
}

/// 是否为可交互元素 (链接或按钮)
pub fn is_interactive(element: ElementRef<'_>) -> bool {
    let value = element.value();
    matches!(value.name(), "a" | "button")
        || matches!(value.attr("role"), Some("button") | Some("link"))
}

/// 是否为操作控件 (`button` 或 `[role=button]`)
pub fn is_action_control(element: ElementRef<'_>) -> bool {
    element.value().name() == "button" || element.value().attr("role") == Some("button")
}

/// 在 `scope` 之内 (不含 scope 本身) 是否存在满足条件的祖先
pub fn has_ancestor_within<F>(element: ElementRef<'_>, scope: ElementRef<'_>, predicate: F) -> bool
where
    F: Fn(ElementRef<'_>) -> bool,
{
    for node in element.ancestors() {
        if node.id() == scope.id() {
            return false;
        }
        if let Some(ancestor) = ElementRef::wrap(node) {
            if predicate(ancestor) {
                return true;
            }
        }
    }
    false
}

/// `element` 是否位于 `scope` 之内
pub fn is_within(element: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| node.id() == scope.id())
}

/// 收集方向标记文本
///
/// 取 scope 内最外层的 `[dir]` 元素,排除位于按钮或链接中的节点,
/// 返回折叠空白后的非空文本,保持文档顺序。
pub fn direction_texts(scope: ElementRef<'_>) -> Vec<String> {
    scope
        .select(&DIR_TEXT)
        .filter(|el| el.id() != scope.id())
        .filter(|el| !is_interactive(*el))
        .filter(|el| !has_ancestor_within(*el, scope, |a| a.value().attr("dir").is_some()))
        .filter(|el| !has_ancestor_within(*el, scope, is_interactive))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// 链接的主机名 (相对链接返回 None)
pub fn link_host(href: &str) -> Option<String> {
    url::Url::parse(href)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// 主机是否属于平台自身域名 (含子域名)
pub fn is_platform_host(host: &str, platform_host: &str) -> bool {
    let base = platform_host.trim_start_matches("www.").to_ascii_lowercase();
    host == base || host.ends_with(&format!(".{}", base))
}
