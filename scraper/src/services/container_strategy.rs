//! 帖子容器定位策略
//!
//! 从帖子链接向上查找包含该帖子全部内容的结构容器。
//! 这一步依赖页面结构,平台改版时最容易失效,因此抽象为可替换的策略:
//! 一个 (元素, 深度上限) → 可选容器 的函数。

use scraper::ElementRef;

use crate::utils::dom;
use crate::utils::phrases::{self, LIKE, REPLY, REPOST};

/// 默认的祖先遍历深度上限
///
/// 过深会选中包含多条帖子的外层列表
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// 容器识别所需的最少操作控件数
const MIN_ACTION_CONTROLS: usize = 2;

/// 容器定位策略
pub trait ContainerStrategy: Send + Sync {
    /// 从 `link` 向上最多 `max_depth` 层查找容器
    fn resolve<'a>(&self, link: ElementRef<'a>, max_depth: usize) -> Option<ElementRef<'a>>;
}

/// 任意满足签名的函数都可以作为策略
impl<F> ContainerStrategy for F
where
    F: for<'a> Fn(ElementRef<'a>, usize) -> Option<ElementRef<'a>> + Send + Sync,
{
    fn resolve<'a>(&self, link: ElementRef<'a>, max_depth: usize) -> Option<ElementRef<'a>> {
        self(link, max_depth)
    }
}

/// 操作控件策略 (默认)
///
/// 逐层向上,第一个包含至少两个 赞/回复/转发 控件的祖先即为容器
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionControlStrategy;

impl ContainerStrategy for ActionControlStrategy {
    fn resolve<'a>(&self, link: ElementRef<'a>, max_depth: usize) -> Option<ElementRef<'a>> {
        link.ancestors()
            .filter_map(ElementRef::wrap)
            .take(max_depth)
            .find(|candidate| count_action_controls(*candidate) >= MIN_ACTION_CONTROLS)
    }
}

/// 统计元素内可识别的操作控件数量
///
/// 只计最外层控件: 嵌套在另一个控件里的 `button` 与外层算同一个
pub fn count_action_controls(element: ElementRef<'_>) -> usize {
    element
        .select(&dom::ACTION_CONTROL)
        .filter(|control| !dom::has_ancestor_within(*control, element, dom::is_action_control))
        .filter(|control| action_kind(&dom::label_text(*control)).is_some())
        .count()
}

/// 操作控件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Like,
    Reply,
    Repost,
}

/// 按多语言标签判断控件类别
pub fn action_kind(label: &str) -> Option<ActionKind> {
    if phrases::label_matches(label, LIKE) {
        Some(ActionKind::Like)
    } else if phrases::label_matches(label, REPLY) {
        Some(ActionKind::Reply)
    } else if phrases::label_matches(label, REPOST) {
        Some(ActionKind::Repost)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    const FEED: &str = r#"<body><div id="feed">
        <div id="post-1">
            <div id="header"><a id="link" href="/@alice/post/C1"><time>5m</time></a></div>
            <div role="button"><svg aria-label="讚"></svg><span>3</span></div>
            <div role="button"><svg aria-label="回覆"></svg></div>
        </div>
        <div id="post-2">
            <a href="/@bob/post/C2">x</a>
            <div role="button"><svg aria-label="Like"></svg></div>
            <div role="button"><svg aria-label="Reply"></svg></div>
        </div>
    </div></body>"#;

    fn link(html: &Html) -> ElementRef<'_> {
        html.select(&Selector::parse("#link").unwrap()).next().unwrap()
    }

    #[test]
    fn test_resolves_nearest_container_with_controls() {
        let html = Html::parse_document(FEED);
        let container = ActionControlStrategy.resolve(link(&html), DEFAULT_MAX_DEPTH);
        assert_eq!(container.and_then(|c| c.value().id()), Some("post-1"));
    }

    #[test]
    fn test_depth_bound_limits_walk() {
        let html = Html::parse_document(FEED);
        assert!(ActionControlStrategy.resolve(link(&html), 1).is_none());
    }

    fn parent_only<'a>(el: ElementRef<'a>, _depth: usize) -> Option<ElementRef<'a>> {
        el.parent().and_then(ElementRef::wrap)
    }

    #[test]
    fn test_function_strategy() {
        let html = Html::parse_document(FEED);
        let container = ContainerStrategy::resolve(&parent_only, link(&html), DEFAULT_MAX_DEPTH);
        assert_eq!(container.and_then(|c| c.value().id()), Some("header"));
    }

    #[test]
    fn test_nested_button_counts_once() {
        let html = Html::parse_document(
            r#"<body><div id="outer">
                <div id="post">
                    <a id="link" href="/@alice/post/C1">x</a>
                    <div role="button"><button aria-label="Like"></button></div>
                </div>
                <div role="button"><svg aria-label="Reply"></svg></div>
            </div></body>"#,
        );
        let post = html
            .select(&Selector::parse("#post").unwrap())
            .next()
            .unwrap();

        assert_eq!(count_action_controls(post), 1);
        let container = ActionControlStrategy.resolve(link(&html), DEFAULT_MAX_DEPTH);
        assert_eq!(container.and_then(|c| c.value().id()), Some("outer"));
    }

    #[test]
    fn test_action_kind_labels() {
        assert_eq!(action_kind("讚 2,049"), Some(ActionKind::Like));
        assert_eq!(action_kind("Reply 12"), Some(ActionKind::Reply));
        assert_eq!(action_kind("轉發"), Some(ActionKind::Repost));
        assert_eq!(action_kind("Share"), None);
    }
}
