//! 页面状态分类器
//!
//! 区分"真的没有结果"和"被平台拦截"(限流、登录墙、错误页)。
//! 只在等待内容超时后作为兜底调用,正常路径不付出这部分开销。

use scraper::Html;

use crate::models::{DocumentError, PageStateClassification};
use crate::services::document::Document;
use crate::utils::dom;
use crate::utils::phrases::{self, ERROR_PAGE, LOGIN, NOT_FOUND, RATE_LIMIT};

/// 可见文本少于该长度且无帖子链接时视为空页面
const MIN_CONTENT_TEXT_LEN: usize = 50;

/// 登录按钮文本的最大长度,超过的视为正文而非按钮
const MAX_LOGIN_CONTROL_TEXT_LEN: usize = 40;

/// 读取文档快照并分类
pub async fn classify(document: &dyn Document) -> Result<PageStateClassification, DocumentError> {
    let html = document.content().await?;
    let classification = classify_html(&html);

    tracing::debug!(
        限流 = classification.is_rate_limited,
        错误页 = classification.is_error_page,
        登录墙 = classification.is_login_wall,
        空页面 = classification.is_empty,
        帖子链接数 = classification.post_link_count,
        "页面状态分类完成"
    );

    Ok(classification)
}

/// 对HTML快照分类 (纯函数,不修改任何状态)
pub fn classify_html(html: &str) -> PageStateClassification {
    let document = Html::parse_document(html);
    let text = dom::visible_text(&document);

    let rate_limit_phrase = phrases::find_in(&text, RATE_LIMIT);
    let error_phrase = phrases::find_in(&text, ERROR_PAGE);
    let not_found_phrase = phrases::find_in(&text, NOT_FOUND);
    let login_control = find_login_control(&document);

    let post_link_count = document.select(&dom::POST_LINK).count();
    let has_main_content = document
        .select(&dom::MAIN_REGION)
        .any(|main| main.children().any(|child| child.value().is_element()));
    let is_empty = post_link_count == 0
        && (!has_main_content || text.chars().count() < MIN_CONTENT_TEXT_LEN);

    let error_message = if let Some(phrase) = rate_limit_phrase {
        format!("rate limited: \"{}\"", phrase)
    } else if let Some(phrase) = error_phrase {
        format!("error page: \"{}\"", phrase)
    } else if let Some(control) = &login_control {
        format!("login wall: \"{}\"", control)
    } else if is_empty {
        "no content found".to_string()
    } else {
        String::new()
    };

    PageStateClassification {
        is_login_wall: login_control.is_some(),
        is_error_page: error_phrase.is_some(),
        is_not_found: not_found_phrase.is_some(),
        is_rate_limited: rate_limit_phrase.is_some(),
        is_empty,
        has_main_content,
        post_link_count,
        error_message,
    }
}

/// 查找登录控件
///
/// 命中条件 (任一):
/// - 链接/按钮的文本是登录短语
/// - 模态对话框内有指向登录页的链接
fn find_login_control(document: &Html) -> Option<String> {
    let control_text = document
        .select(&dom::ANCHOR)
        .chain(document.select(&dom::ACTION_CONTROL))
        .map(dom::element_text)
        .filter(|text| !text.is_empty() && text.chars().count() <= MAX_LOGIN_CONTROL_TEXT_LEN)
        .find(|text| phrases::find_in(text, LOGIN).is_some());
    if control_text.is_some() {
        return control_text;
    }

    document.select(&dom::DIALOG).find_map(|dialog| {
        dialog
            .select(&dom::ANCHOR)
            .find(|link| {
                link.value()
                    .attr("href")
                    .is_some_and(|href| href.contains("/login"))
            })
            .map(|link| {
                let text = dom::element_text(link);
                if text.is_empty() {
                    "/login".to_string()
                } else {
                    text
                }
            })
    })
}
