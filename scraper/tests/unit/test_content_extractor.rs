//! 帖子抽取单元测试
//!
//! 覆盖范围:
//! 1. 作者、正文、时间、互动数
//! 2. 引用帖、外链 (含平台跳转链接)、图片
//! 3. 视频与图片地址由本任务捕获的网络响应补全
//! 4. 找不到容器的帖子被跳过;自定义容器策略

use chrono::{DateTime, NaiveDate, Utc};
use scraper::ElementRef;
use threads_scraper::models::PostStats;
use threads_scraper::services::content_extractor::strip_trailing_ui;
use threads_scraper::services::{ContentExtractor, MediaCapture, NetworkResponse};

const HOST: &str = "www.threads.net";

const FEED: &str = r#"<html><body><div role="main"><div>
    <div id="p1">
        <div><a href="/@alice"><img alt="alice的大頭貼照" src="https://scontent.cdninstagram.com/t51.2885-19/alice.jpg"></a></div>
        <div><a href="/@alice"><span>Alice Chen</span></a><svg aria-label="已驗證"></svg></div>
        <a href="/@alice/post/P1"><time datetime="2025-10-07T10:00:00.000Z">2h</time></a>
        <div><span dir="auto">Rust 1.80 發布了!</span></div>
        <div><span dir="auto">See translation</span></div>
        <div><a href="https://l.threads.net/?u=https%3A%2F%2Fblog.rust-lang.org%2F">blog.rust-lang.org</a></div>
        <div><img alt="" src="https://scontent.cdninstagram.com/v/photo1.jpg"></div>
        <div role="button"><svg aria-label="讚"></svg><span>2,049</span></div>
        <div role="button"><svg aria-label="回覆"></svg><span>31</span></div>
        <div role="button"><svg aria-label="轉發"></svg><span>1.5K</span></div>
    </div>
    <div id="p2">
        <a href="/@bob"><span>Bob</span></a>
        <a href="/@bob/post/P2"><time>5m</time></a>
        <div><span dir="auto">Look at this quote</span></div>
        <div class="quote"><div>
            <a href="/@carol/post/Q1"><span>carol</span><time datetime="2025-10-01T00:00:00.000Z">6d</time></a>
            <span dir="auto">Quoted text that is long enough</span>
        </div></div>
        <video src="blob:https://www.threads.net/abc"></video>
        <div role="button"><svg aria-label="Like"></svg><span>7</span></div>
        <div role="button"><svg aria-label="Reply"></svg></div>
    </div>
</div></div></body></html>"#;

fn fixed_now() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 10, 7)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

fn captured_media() -> MediaCapture {
    let mut media = MediaCapture::new();
    media.ingest(vec![
        NetworkResponse::new("https://video.cdninstagram.com/v/clip.mp4?x=1", "video/mp4"),
        NetworkResponse::new("https://scontent.cdninstagram.com/s150x150/pp.jpg", "image/jpeg"),
    ]);
    media
}

// ============================================================================
// 1. 基本字段
// ============================================================================

#[test]
fn test_extract_posts_基本字段() {
    let extractor = ContentExtractor::new(HOST);
    let mut media = captured_media();
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut media);

    assert_eq!(posts.len(), 2);
    let first = &posts[0];
    assert_eq!(first.id, "P1");
    assert_eq!(first.url, "https://www.threads.net/@alice/post/P1");
    assert_eq!(first.author.username(), "alice");
    assert_eq!(first.author.display_name(), "Alice Chen");
    assert!(first.author.is_verified());
    assert_eq!(
        first.author.avatar_url(),
        Some("https://scontent.cdninstagram.com/t51.2885-19/alice.jpg")
    );
    assert_eq!(first.content, "Rust 1.80 發布了!");
    assert_eq!(first.timestamp, "2025-10-07T10:00:00.000Z");
    assert_eq!(
        first.stats,
        PostStats {
            likes: 2049,
            replies: 31,
            reposts: 1500,
        }
    );
}

#[test]
fn test_extract_posts_相对时间() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut MediaCapture::new());

    assert_eq!(posts[1].timestamp, "2025-10-07T11:55:00.000Z");
    assert_eq!(posts[1].stats.likes, 7);
    assert_eq!(posts[1].stats.replies, 0);
}

#[test]
fn test_extract_posts_遵守数量上限() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(FEED, 1, fixed_now(), &mut MediaCapture::new());

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "P1");
}

// ============================================================================
// 2. 引用帖、外链、图片
// ============================================================================

#[test]
fn test_extract_posts_引用帖只保留一层() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut MediaCapture::new());

    let second = &posts[1];
    assert_eq!(second.content, "Look at this quote");
    let quoted = second.quoted_post.as_ref().expect("应识别出引用帖");
    assert_eq!(quoted.id, "Q1");
    assert_eq!(quoted.author.username(), "carol");
    assert_eq!(quoted.content, "Quoted text that is long enough");
    assert_eq!(quoted.timestamp, "2025-10-01T00:00:00.000Z");
    assert!(quoted.quoted_post.is_none());

    // 引用帖所在容器不会再产出一条独立记录
    assert!(posts.iter().all(|post| post.id != "Q1"));
}

#[test]
fn test_extract_posts_外链与图片() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut MediaCapture::new());

    assert_eq!(posts[0].links, vec!["https://blog.rust-lang.org/"]);
    assert_eq!(
        posts[0].images,
        vec!["https://scontent.cdninstagram.com/v/photo1.jpg"]
    );
    assert!(posts[1].links.is_empty());
}

// ============================================================================
// 3. 视频补全
// ============================================================================

#[test]
fn test_extract_posts_视频地址来自捕获的响应() {
    let extractor = ContentExtractor::new(HOST);
    let mut media = captured_media();
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut media);

    assert!(posts[0].videos.is_empty());
    assert_eq!(
        posts[1].videos,
        vec!["https://video.cdninstagram.com/v/clip.mp4?x=1"]
    );
    assert_eq!(media.pending_videos(), 0);
}

#[test]
fn test_extract_posts_没有捕获时不编造视频地址() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(FEED, 10, fixed_now(), &mut MediaCapture::new());

    assert!(posts[1].videos.is_empty());
}

const BLOB_IMAGES: &str = r#"<html><body><div role="main">
    <div class="post">
        <a href="/@erin/post/P4"><time datetime="2025-10-07T11:00:00.000Z">1h</time></a>
        <span dir="auto">Two photos from today</span>
        <img alt="" src="blob:https://www.threads.net/i1">
        <img alt="">
        <div role="button"><svg aria-label="Like"></svg></div>
        <div role="button"><svg aria-label="Reply"></svg></div>
    </div>
</div></body></html>"#;

#[test]
fn test_extract_posts_图片地址来自捕获的响应() {
    let extractor = ContentExtractor::new(HOST);
    let mut media = MediaCapture::new();
    media.ingest(vec![
        NetworkResponse::new("https://scontent.cdninstagram.com/v/a.jpg", "image/jpeg"),
        NetworkResponse::new("https://scontent.cdninstagram.com/v/b.jpg", "image/jpeg"),
        NetworkResponse::new("https://scontent.cdninstagram.com/v/c.jpg", "image/jpeg"),
    ]);

    let posts = extractor.extract_posts(BLOB_IMAGES, 10, fixed_now(), &mut media);

    assert_eq!(
        posts[0].images,
        vec![
            "https://scontent.cdninstagram.com/v/a.jpg",
            "https://scontent.cdninstagram.com/v/b.jpg",
        ]
    );
    assert_eq!(media.pending_images(), 1);
}

#[test]
fn test_extract_posts_没有捕获时不编造图片地址() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(BLOB_IMAGES, 10, fixed_now(), &mut MediaCapture::new());

    assert!(posts[0].images.is_empty());
}

// ============================================================================
// 4. 容器定位
// ============================================================================

const ORPHAN: &str = r#"<html><body><div role="main">
    <div class="post">
        <a href="/@dave"><span>Dave</span></a>
        <a href="/@dave/post/P3"><time datetime="2025-10-07T11:00:00.000Z">1h</time></a>
        <span dir="auto">Plain post without controls</span>
    </div>
</div></body></html>"#;

#[test]
fn test_extract_posts_找不到容器时跳过() {
    let extractor = ContentExtractor::new(HOST);
    let posts = extractor.extract_posts(ORPHAN, 10, fixed_now(), &mut MediaCapture::new());

    assert!(posts.is_empty());
}

fn by_post_class<'a>(link: ElementRef<'a>, max_depth: usize) -> Option<ElementRef<'a>> {
    link.ancestors()
        .filter_map(ElementRef::wrap)
        .take(max_depth)
        .find(|el| el.value().attr("class") == Some("post"))
}

#[test]
fn test_extract_posts_自定义容器策略() {
    let extractor = ContentExtractor::new(HOST).with_strategy(by_post_class);
    let posts = extractor.extract_posts(ORPHAN, 10, fixed_now(), &mut MediaCapture::new());

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "P3");
    assert_eq!(posts[0].author.display_name(), "Dave");
    assert_eq!(posts[0].content, "Plain post without controls");
    assert_eq!(posts[0].stats, PostStats::default());
}

#[test]
fn test_strip_trailing_ui_多重残留() {
    assert_eq!(strip_trailing_ui("Great news\nTranslate\nLearn more"), "Great news");
    assert_eq!(strip_trailing_ui("沒有殘留"), "沒有殘留");
}
