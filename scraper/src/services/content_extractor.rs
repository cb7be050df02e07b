//! 帖子内容抽取器
//!
//! 在最终滚动状态的HTML快照上一次性抽取帖子:
//! 1. 先定位所有帖子链接,按ID去重 (ID嵌在链接路径里,便宜且无歧义)
//! 2. 对每个ID用容器策略向上找到帖子容器
//! 3. 在容器内收集作者、正文、时间、互动数、媒体、外链、引用帖
//!
//! 单条帖子解析失败只跳过该条,不影响其他帖子。

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::models::{Author, PostRecord, PostStats, ScrapeError};
use crate::services::container_strategy::{
    self, ActionControlStrategy, ActionKind, ContainerStrategy, DEFAULT_MAX_DEPTH,
};
use crate::services::document::Document;
use crate::services::media_capture::{self, MediaCapture};
use crate::utils::dom;
use crate::utils::number_parser::parse_compact_number;
use crate::utils::phrases::{
    self, JUST_NOW, LIKE, PROFILE_PICTURE, REPLY, REPOST, SHARE, TRAILING_UI, VERIFIED,
};
use crate::utils::time_utils::normalize_timestamp;

/// 引用帖子容器的向上查找层数
const QUOTE_WALK_DEPTH: usize = 4;

/// 引用帖子正文的最短长度
const MIN_QUOTE_TEXT_LEN: usize = 10;

/// 单独出现的时间或数字: "5m"、"3 小時"、"2,049"、"1.5K"
static BARE_TIME_OR_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:\d[\d,.]*\s*[km萬万]?|\d+\s?[smhdw]|\d+\s*(?:秒|分鐘|分钟|分|小時|小时|時間|時|天|日|週|周|星期|個月|个月|か月|ヶ月|月)前?)$",
    )
    .expect("时间/数字正则有效")
});

/// 单独出现的日期: "2025-10-07"、"10/07/2025"、"10月7日"、"Oct 7, 2025"
static BARE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}/\d{1,2}/\d{2,4}|(?:\d{4}\s*年\s*)?\d{1,2}\s*月\s*\d{1,2}\s*日|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:,\s*\d{4})?|\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:\s+\d{4})?)$",
    )
    .expect("日期正则有效")
});

/// 正文末尾的 "翻译/了解更多" 残留 (跟在 换行、·、… 之后)
static TRAILING_REMNANT: Lazy<Regex> = Lazy::new(|| {
    let alternatives = phrases::all(TRAILING_UI)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i)(?:\s*\n\s*|\s*[·…]\s*|\s*\.\.\.\s*)(?:{})\s*$",
        alternatives
    ))
    .expect("尾部残留正则有效")
});

/// 帖子内容抽取器
pub struct ContentExtractor {
    platform_host: String,
    strategy: Box<dyn ContainerStrategy>,
    max_depth: usize,
}

impl ContentExtractor {
    /// 使用默认容器策略 (操作控件计数) 创建抽取器
    pub fn new(platform_host: impl Into<String>) -> Self {
        Self {
            platform_host: platform_host.into(),
            strategy: Box::new(ActionControlStrategy),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// 替换容器策略
    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: ContainerStrategy + 'static,
    {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 从文档当前状态抽取至多 `limit` 条帖子
    ///
    /// 先排出本任务文档捕获的网络响应,用于补全视频和图片地址
    pub async fn extract_items(
        &self,
        document: &dyn Document,
        limit: usize,
        media: &mut MediaCapture,
    ) -> Result<Vec<PostRecord>, ScrapeError> {
        let html = document.content().await?;
        let captured = media.ingest(document.drain_responses().await);
        tracing::debug!(新增媒体 = captured, "已排出网络响应");

        Ok(self.extract_posts(&html, limit, Utc::now(), media))
    }

    /// 从HTML快照抽取帖子 (纯函数,除媒体分配外无副作用)
    pub fn extract_posts(
        &self,
        html: &str,
        limit: usize,
        now: DateTime<Utc>,
        media: &mut MediaCapture,
    ) -> Vec<PostRecord> {
        let document = Html::parse_document(html);
        let mut seen_ids = HashSet::new();
        let mut claimed_containers = HashSet::new();
        let mut records = Vec::new();

        for link in document.select(&dom::POST_LINK) {
            if records.len() >= limit {
                break;
            }
            let Some((username, id)) = link.value().attr("href").and_then(dom::parse_post_href)
            else {
                continue;
            };
            if !seen_ids.insert(id.clone()) {
                continue;
            }

            let container = match self.resolve_container(link, &id) {
                Ok(container) => container,
                Err(e) => {
                    tracing::warn!(帖子ID = %id, 错误 = %e, "单条帖子解析失败,已跳过");
                    continue;
                }
            };

            // 同一容器只产出一条记录,后续链接多为引用帖
            if !claimed_containers.insert(container.id()) {
                tracing::debug!(帖子ID = %id, "容器已被前序帖子占用,跳过");
                continue;
            }

            records.push(self.build_post(container, &username, &id, now, media));
        }

        tracing::info!(
            帖子链接数 = seen_ids.len(),
            抽取数量 = records.len(),
            "帖子抽取完成"
        );
        records
    }

    fn resolve_container<'a>(
        &self,
        link: ElementRef<'a>,
        id: &str,
    ) -> Result<ElementRef<'a>, ScrapeError> {
        self.strategy.resolve(link, self.max_depth).ok_or_else(|| {
            ScrapeError::Extraction(format!(
                "帖子 {} 在 {} 层内未找到容器",
                id, self.max_depth
            ))
        })
    }

    fn build_post(
        &self,
        container: ElementRef<'_>,
        username: &str,
        id: &str,
        now: DateTime<Utc>,
        media: &mut MediaCapture,
    ) -> PostRecord {
        let host = self.platform_host.as_str();
        let author = extract_author(container, host, username);
        let quote = find_quote(container, id);
        let quote_scope = quote.as_ref().map(|q| q.scope);

        let excluded: HashSet<String> = quote_scope
            .map(|scope| dom::direction_texts(scope).into_iter().collect())
            .unwrap_or_default();
        let content = assemble_content(
            dom::direction_texts(container)
                .into_iter()
                .filter(|text| !excluded.contains(text)),
            &author,
        );

        let mut record = PostRecord::new(
            id,
            post_url(host, username, id),
            author,
            content,
            extract_timestamp(container, id, quote_scope, now),
            extract_stats(container),
        );
        record.images = extract_images(container, media);
        record.videos = extract_videos(container, media);
        record.links = extract_links(container, host);

        if let Some(quote) = quote {
            let quoted = PostRecord::new(
                quote.id.as_str(),
                post_url(host, &quote.username, &quote.id),
                Author::new(host, quote.username.as_str(), quote.username.as_str(), None, false),
                quote_content(quote.scope),
                quote
                    .link
                    .select(&dom::TIME)
                    .next()
                    .map(|time| {
                        normalize_timestamp(
                            time.value().attr("datetime"),
                            &dom::element_text(time),
                            now,
                        )
                    })
                    .unwrap_or_default(),
                PostStats::default(),
            );
            record = record.with_quoted(quoted);
        }

        record
    }
}

/// 帖子地址: `https://{host}/@{username}/post/{id}`
pub fn post_url(platform_host: &str, username: &str, id: &str) -> String {
    format!("https://{}/@{}/post/{}", platform_host, username, id)
}

/// 引用帖子
struct QuotedLink<'a> {
    link: ElementRef<'a>,
    scope: ElementRef<'a>,
    username: String,
    id: String,
}

/// 容器内第一个ID不同于本帖的帖子链接即为引用帖
///
/// 只取第一个,同一容器内的多个嵌套帖子只保留一个
fn find_quote<'a>(container: ElementRef<'a>, own_id: &str) -> Option<QuotedLink<'a>> {
    container.select(&dom::POST_LINK).find_map(|link| {
        let (username, id) = dom::parse_post_href(link.value().attr("href")?)?;
        if id == own_id {
            return None;
        }
        let scope = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take(QUOTE_WALK_DEPTH)
            .take_while(|ancestor| ancestor.id() != container.id())
            .last()
            .unwrap_or(link);
        Some(QuotedLink {
            link,
            scope,
            username,
            id,
        })
    })
}

/// 引用帖正文: 子容器内第一个足够长且不是时间/日期的文本
fn quote_content(scope: ElementRef<'_>) -> String {
    dom::direction_texts(scope)
        .into_iter()
        .find(|text| {
            text.chars().count() >= MIN_QUOTE_TEXT_LEN
                && !BARE_TIME_OR_NUMBER.is_match(text)
                && !BARE_DATE.is_match(text)
        })
        .unwrap_or_default()
}

fn extract_author(container: ElementRef<'_>, host: &str, username: &str) -> Author {
    let profile_path = format!("/@{}", username);
    let is_profile_link = |el: ElementRef<'_>| {
        el.value().name() == "a"
            && el
                .value()
                .attr("href")
                .is_some_and(|href| href.trim_end_matches('/').ends_with(&profile_path))
    };

    let display_name = container
        .select(&dom::ANCHOR)
        .filter(|a| is_profile_link(*a))
        .map(dom::element_text)
        .find(|text| !text.is_empty() && !text.starts_with('@'))
        .unwrap_or_default();

    let avatar_url = container
        .select(&dom::IMAGE)
        .filter(|img| {
            img.value()
                .attr("alt")
                .is_some_and(|alt| phrases::find_in(alt, PROFILE_PICTURE).is_some())
                || dom::has_ancestor_within(*img, container, is_profile_link)
        })
        .filter_map(|img| img.value().attr("src"))
        .find(|src| media_capture::is_resolvable(src))
        .map(str::to_string);

    let is_verified = container.select(&dom::LABELLED).any(|el| {
        el.value()
            .attr("aria-label")
            .is_some_and(|label| phrases::label_matches(label, VERIFIED))
    });

    Author::new(host, username, display_name, avatar_url, is_verified)
}

/// 过滤噪声文本、去重、拼接并去掉尾部界面残留
fn assemble_content<I>(texts: I, author: &Author) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let parts: Vec<String> = texts
        .into_iter()
        .filter(|text| !is_noise(text, author))
        .filter(|text| seen.insert(text.clone()))
        .collect();

    strip_trailing_ui(&parts.join("\n"))
}

/// 是否为正文之外的噪声文本
fn is_noise(text: &str, author: &Author) -> bool {
    let trimmed = text.trim();
    let username = author.username();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case(username)
        || trimmed
            .strip_prefix('@')
            .is_some_and(|handle| handle.eq_ignore_ascii_case(username))
        || trimmed == author.display_name()
        || !trimmed.chars().any(char::is_alphanumeric)
        || BARE_TIME_OR_NUMBER.is_match(trimmed)
        || BARE_DATE.is_match(trimmed)
        || phrases::equals_any(trimmed, JUST_NOW)
        || [LIKE, REPLY, REPOST, SHARE, TRAILING_UI]
            .into_iter()
            .any(|table| phrases::equals_any(trimmed, table))
}

/// 去掉末尾的 "翻译"/"了解更多" 等残留
pub fn strip_trailing_ui(text: &str) -> String {
    let mut result = text.trim().to_string();
    while let Some(found) = TRAILING_REMNANT.find(&result) {
        result.truncate(found.start());
        result = result.trim_end().to_string();
    }
    result
}

/// 帖子时间: 优先取指向本帖链接内的 `<time>`
fn extract_timestamp(
    container: ElementRef<'_>,
    id: &str,
    quote_scope: Option<ElementRef<'_>>,
    now: DateTime<Utc>,
) -> String {
    let own_path = format!("/post/{}", id);
    let mut times = container
        .select(&dom::TIME)
        .filter(|time| !quote_scope.is_some_and(|scope| dom::is_within(*time, scope)));

    let own_time = container.select(&dom::TIME).find(|time| {
        dom::has_ancestor_within(*time, container, |a| {
            a.value().name() == "a"
                && a.value()
                    .attr("href")
                    .is_some_and(|href| href.contains(&own_path))
        })
    });

    own_time
        .or_else(|| times.next())
        .map(|time| normalize_timestamp(time.value().attr("datetime"), &dom::element_text(time), now))
        .unwrap_or_default()
}

/// 互动数: 按控件标签识别类别,每类取第一个控件
fn extract_stats(container: ElementRef<'_>) -> PostStats {
    let mut likes = None;
    let mut replies = None;
    let mut reposts = None;

    for control in container.select(&dom::ACTION_CONTROL) {
        let label = dom::label_text(control);
        let slot = match container_strategy::action_kind(&label) {
            Some(ActionKind::Like) => &mut likes,
            Some(ActionKind::Reply) => &mut replies,
            Some(ActionKind::Repost) => &mut reposts,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(parse_compact_number(&label));
        }
    }

    PostStats {
        likes: likes.unwrap_or(0),
        replies: replies.unwrap_or(0),
        reposts: reposts.unwrap_or(0),
    }
}

/// 帖子图片 (排除头像)
///
/// 没有可用地址 (blob:/data: 或缺失) 的图片按顺序使用本任务捕获的地址
fn extract_images(container: ElementRef<'_>, media: &mut MediaCapture) -> Vec<String> {
    let inside_profile_link = |el: ElementRef<'_>| {
        el.value().name() == "a"
            && el
                .value()
                .attr("href")
                .is_some_and(|href| href.contains("/@") && !href.contains("/post/"))
    };

    let mut images: Vec<String> = Vec::new();
    for img in container
        .select(&dom::IMAGE)
        .filter(|img| {
            !img.value()
                .attr("alt")
                .is_some_and(|alt| phrases::find_in(alt, PROFILE_PICTURE).is_some())
        })
        .filter(|img| !dom::has_ancestor_within(*img, container, inside_profile_link))
    {
        let url = match img.value().attr("src") {
            Some(src) if media_capture::is_resolvable(src) => {
                if media_capture::is_profile_picture_url(src) {
                    continue;
                }
                Some(src.to_string())
            }
            // blob:/data: 或缺失地址
            _ => media.take_image(),
        };
        if let Some(url) = url {
            if !images.contains(&url) {
                images.push(url);
            }
        }
    }
    images
}

/// 帖子视频
///
/// 没有可用地址 (blob: 或缺失) 的视频按顺序使用本任务捕获的地址
fn extract_videos(container: ElementRef<'_>, media: &mut MediaCapture) -> Vec<String> {
    let mut videos = Vec::new();
    for video in container.select(&dom::VIDEO) {
        let direct = video
            .value()
            .attr("src")
            .into_iter()
            .chain(
                video
                    .select(&dom::VIDEO_SOURCE)
                    .filter_map(|source| source.value().attr("src")),
            )
            .find(|src| media_capture::is_resolvable(src))
            .map(str::to_string);

        if let Some(url) = direct.or_else(|| media.take_video()) {
            if !videos.contains(&url) {
                videos.push(url);
            }
        }
    }
    videos
}

/// 外部链接 (主机不属于平台域名)
fn extract_links(container: ElementRef<'_>, platform_host: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for href in container
        .select(&dom::ANCHOR)
        .filter_map(|a| a.value().attr("href"))
    {
        if let Some(link) = external_link(href, platform_host) {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

/// 解析外部链接
///
/// 平台跳转链接 (`l.threads.net/?u=<目标>`) 还原为目标地址
fn external_link(href: &str, platform_host: &str) -> Option<String> {
    let parsed = url::Url::parse(href).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    if !dom::is_platform_host(&host, platform_host) {
        return Some(href.to_string());
    }

    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())?;
    let target_host = dom::link_host(&target)?;
    (!dom::is_platform_host(&target_host, platform_host)).then_some(target)
}
