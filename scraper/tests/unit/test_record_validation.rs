//! 记录校验单元测试
//!
//! 覆盖范围:
//! 1. 帖子: 正文/作者/时间缺失时拒绝
//! 2. 资料: 只要求用户名,其余缺失标记为 partial
//! 3. location/joinedDate 的 null 与空字符串区分

use threads_scraper::models::{Author, PostRecord, PostStats, ProfileRecord, UNKNOWN_AUTHOR};
use threads_scraper::services::record_validator::{
    apply_profile_validation, validate_post, validate_profile,
};
use threads_scraper::services::ValidationReason;

const HOST: &str = "www.threads.net";

fn post(content: &str, author: Author, timestamp: &str) -> PostRecord {
    PostRecord::new(
        "C1",
        "https://www.threads.net/@alice/post/C1",
        author,
        content,
        timestamp,
        PostStats::default(),
    )
}

fn alice() -> Author {
    Author::new(HOST, "alice", "Alice", None, false)
}

fn unknown_author() -> Author {
    Author::new(HOST, UNKNOWN_AUTHOR, "", None, false)
}

fn complete_profile() -> ProfileRecord {
    let mut profile = ProfileRecord::new(HOST, "alice");
    profile.display_name = Some("Alice Chen".into());
    profile.avatar_url = Some("https://scontent.cdninstagram.com/a.jpg".into());
    profile.followers_count = Some(12_000);
    profile.bio = Some("Rustacean".into());
    profile.location = Some("Taipei".into());
    profile.joined_date = Some("2023-07".into());
    profile
}

// ============================================================================
// 1. 帖子校验
// ============================================================================

#[test]
fn test_validate_post_正文过短() {
    let result = validate_post(&post("hi", alice(), "2025-10-07T10:00:00.000Z"));
    assert!(!result.valid);
    assert_eq!(result.reason, Some(ValidationReason::NoContent));
}

#[test]
fn test_validate_post_空白不计入长度() {
    let result = validate_post(&post("  a  ", alice(), "2025-10-07T10:00:00.000Z"));
    assert_eq!(result.reason, Some(ValidationReason::NoContent));
}

#[test]
fn test_validate_post_占位作者() {
    let result = validate_post(&post("hello world", unknown_author(), "2025-10-07T10:00:00.000Z"));
    assert!(!result.valid);
    assert_eq!(result.reason, Some(ValidationReason::NoAuthor));
}

#[test]
fn test_validate_post_时间为空() {
    let result = validate_post(&post("hello world", alice(), ""));
    assert!(!result.valid);
    assert_eq!(result.reason, Some(ValidationReason::NoTimestamp));
}

#[test]
fn test_validate_post_字段齐全() {
    let result = validate_post(&post("你好嗎", alice(), "2025-10-07T10:00:00.000Z"));
    assert!(result.valid);
    assert_eq!(result.reason, None);
}

#[test]
fn test_validate_post_按正文作者时间顺序报告() {
    let result = validate_post(&post("", unknown_author(), ""));
    assert_eq!(result.reason, Some(ValidationReason::NoContent));
}

// ============================================================================
// 2. 资料校验
// ============================================================================

#[test]
fn test_validate_profile_字段齐全() {
    let result = validate_profile(&complete_profile());
    assert!(result.valid);
    assert!(!result.partial);
    assert!(result.missing.is_empty());
}

#[test]
fn test_validate_profile_缺少简介和粉丝数() {
    let mut profile = ProfileRecord::new(HOST, "alice");
    profile.display_name = Some("Alice Chen".into());
    profile.avatar_url = Some("https://scontent.cdninstagram.com/a.jpg".into());

    let result = validate_profile(&profile);

    assert!(result.valid);
    assert!(result.partial);
    assert_eq!(
        result.missing,
        vec!["followersCount", "bio", "location", "joinedDate"]
    );
}

#[test]
fn test_validate_profile_缺少用户名() {
    let result = validate_profile(&ProfileRecord::new(HOST, ""));
    assert!(!result.valid);
    assert_eq!(result.reason, Some(ValidationReason::NoUsername));
}

// ============================================================================
// 3. null 与空字符串
// ============================================================================

#[test]
fn test_validate_profile_空字符串地点不算缺失() {
    let mut profile = complete_profile();
    profile.location = Some(String::new());
    profile.joined_date = None;

    let result = validate_profile(&profile);

    assert_eq!(result.missing, vec!["joinedDate"]);
}

#[test]
fn test_apply_profile_validation_写回记录() {
    let mut profile = complete_profile();
    profile.bio = None;

    let result = apply_profile_validation(&mut profile);

    assert!(profile.partial);
    assert_eq!(profile.missing_fields, vec!["bio".to_string()]);
    assert_eq!(profile.missing_fields, result.missing);

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["type"], "profile");
    assert_eq!(json["missingFields"][0], "bio");
}
