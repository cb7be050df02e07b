//! 用户主页资料抽取

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::models::{ProfileRecord, ScrapeError};
use crate::services::document::Document;
use crate::services::media_capture;
use crate::utils::dom::{self, selector};
use crate::utils::number_parser::{parse_compact_number, parse_follower_count};
use crate::utils::phrases::{self, FOLLOWERS, LOGIN, PROFILE_PICTURE, VERIFIED};

/// 简介的最短长度
const MIN_BIO_LEN: usize = 10;

/// 粉丝数文本的最大长度,超过的视为外层容器
const MAX_FOLLOWER_TEXT_LEN: usize = 40;

static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:description"], meta[name="description"]"#));
static ANY_ELEMENT: Lazy<Selector> = Lazy::new(|| selector("body *"));
static TITLED: Lazy<Selector> = Lazy::new(|| selector("[title]"));

/// 从文档当前状态抽取用户资料
pub async fn extract_profile(
    document: &dyn Document,
    username: &str,
    platform_host: &str,
) -> Result<Option<ProfileRecord>, ScrapeError> {
    let html = document.content().await?;
    Ok(extract_profile_html(&html, username, platform_host))
}

/// 从HTML快照抽取用户资料
///
/// 页面上完全没有出现该用户名时返回 `None`。
/// 抽取结果未经校验,partial/missing_fields 由校验器填充。
pub fn extract_profile_html(html: &str, username: &str, platform_host: &str) -> Option<ProfileRecord> {
    let document = Html::parse_document(html);
    let username_lower = username.to_lowercase();
    if !dom::visible_text(&document).to_lowercase().contains(&username_lower)
        && !html.to_lowercase().contains(&format!("/@{}", username_lower))
    {
        tracing::warn!(用户名 = %username, "页面中未出现该用户名,无法抽取资料");
        return None;
    }

    let mut profile = ProfileRecord::new(platform_host, username);
    profile.display_name = extract_display_name(&document, username);
    profile.bio = extract_bio(&document, username, profile.display_name.as_deref());
    profile.is_verified = document.select(&dom::LABELLED).any(|el| {
        el.value()
            .attr("aria-label")
            .is_some_and(|label| phrases::label_matches(label, VERIFIED))
    });
    profile.avatar_url = extract_avatar(&document);
    profile.followers_count = extract_followers(&document);

    tracing::debug!(
        用户名 = %username,
        显示名 = ?profile.display_name,
        粉丝数 = ?profile.followers_count,
        "用户资料抽取完成"
    );
    Some(profile)
}

/// 显示名: 第一个不是用户名本身、也不是 "@用户名" 的标题
fn extract_display_name(document: &Html, username: &str) -> Option<String> {
    document
        .select(&dom::HEADING)
        .map(dom::element_text)
        .find(|text| !text.is_empty() && !is_username_echo(text, username))
}

fn is_username_echo(text: &str, username: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case(username)
        || trimmed
            .strip_prefix('@')
            .is_some_and(|handle| handle.eq_ignore_ascii_case(username))
}

/// 简介: 交互元素之外第一个足够长的方向文本
///
/// 排除用户名、显示名、粉丝数与登录提示
fn extract_bio(document: &Html, username: &str, display_name: Option<&str>) -> Option<String> {
    let scope = document
        .select(&dom::MAIN_REGION)
        .next()
        .or_else(|| document.select(&dom::BODY).next())?;

    dom::direction_texts(scope).into_iter().find(|text| {
        text.chars().count() >= MIN_BIO_LEN
            && !is_username_echo(text, username)
            && display_name != Some(text.as_str())
            && phrases::find_in(text, FOLLOWERS).is_none()
            && phrases::find_in(text, LOGIN).is_none()
    })
}

/// 头像: alt 为头像短语的图片,回退到 og:image
fn extract_avatar(document: &Html) -> Option<String> {
    document
        .select(&dom::IMAGE)
        .filter(|img| {
            img.value()
                .attr("alt")
                .is_some_and(|alt| phrases::find_in(alt, PROFILE_PICTURE).is_some())
        })
        .filter_map(|img| img.value().attr("src"))
        .find(|src| media_capture::is_resolvable(src))
        .or_else(|| {
            document
                .select(&OG_IMAGE)
                .filter_map(|meta| meta.value().attr("content"))
                .find(|src| media_capture::is_resolvable(src))
        })
        .map(str::to_string)
}

/// 粉丝数
///
/// 优先使用带纯数字 title 的元素 (精确值),其次解析可见文本,
/// 最后回退到页面描述 meta
fn extract_followers(document: &Html) -> Option<u64> {
    let candidate = document.select(&ANY_ELEMENT).find(|el| {
        let text = dom::element_text(*el);
        text.chars().count() <= MAX_FOLLOWER_TEXT_LEN && phrases::find_in(&text, FOLLOWERS).is_some()
    });

    if let Some(element) = candidate {
        if let Some(exact) = titled_count(element) {
            return Some(exact);
        }
        if let Some(count) = parse_follower_count(&dom::element_text(element)) {
            return Some(count);
        }
    }

    document
        .select(&OG_DESCRIPTION)
        .filter_map(|meta| meta.value().attr("content"))
        .find_map(parse_follower_count)
}

/// 元素自身或后代上的数字 title,例如 `title="12,345"`
fn titled_count(element: ElementRef<'_>) -> Option<u64> {
    std::iter::once(element)
        .chain(element.select(&TITLED))
        .filter_map(|el| el.value().attr("title"))
        .map(str::trim)
        .find(|title| {
            !title.is_empty() && title.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        })
        .map(parse_compact_number)
}
