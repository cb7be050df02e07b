//! 相对时间解析单元测试
//!
//! 覆盖范围:
//! 1. 拉丁紧凑格式与本地化格式
//! 2. "刚刚" 短语
//! 3. 无法识别的输入返回空字符串,而不是当前时间
//! 4. 数值超出时间范围时返回空字符串,不会 panic

use chrono::{DateTime, Duration, NaiveDate, Utc};
use threads_scraper::utils::time_utils::{normalize_timestamp, parse_relative_time, to_iso_string};

fn parsed(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&parse_relative_time(text, now))
        .unwrap()
        .with_timezone(&Utc)
}

fn fixed_now() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 10, 7)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

// ============================================================================
// 1. 相对时间
// ============================================================================

#[test]
fn test_parse_relative_time_五分钟前() {
    let now = Utc::now();
    let delta = now - parsed("5m", now);
    // 毫秒截断带来的误差
    assert!((delta - Duration::minutes(5)).num_milliseconds().abs() < 1000);
}

#[test]
fn test_parse_relative_time_三天前() {
    let now = Utc::now();
    let delta = now - parsed("3d", now);
    assert!((delta - Duration::days(3)).num_milliseconds().abs() < 1000);
}

#[test]
fn test_parse_relative_time_大写单位() {
    assert_eq!(
        parse_relative_time("4H", fixed_now()),
        "2025-10-07T08:00:00.000Z"
    );
}

#[test]
fn test_parse_relative_time_日文单位() {
    assert_eq!(
        parse_relative_time("2日前", fixed_now()),
        "2025-10-05T12:00:00.000Z"
    );
    assert_eq!(
        parse_relative_time("1週", fixed_now()),
        "2025-09-30T12:00:00.000Z"
    );
}

#[test]
fn test_parse_relative_time_月按三十天() {
    assert_eq!(
        parse_relative_time("1个月", fixed_now()),
        "2025-09-07T12:00:00.000Z"
    );
}

// ============================================================================
// 2. 刚刚
// ============================================================================

#[test]
fn test_parse_relative_time_刚刚() {
    assert_eq!(parse_relative_time("刚刚", fixed_now()), to_iso_string(fixed_now()));
    assert_eq!(parse_relative_time("たった今", fixed_now()), to_iso_string(fixed_now()));
}

// ============================================================================
// 3. 无法识别
// ============================================================================

#[test]
fn test_parse_relative_time_无法识别返回空() {
    assert_eq!(parse_relative_time("last tuesday", fixed_now()), "");
    assert_eq!(parse_relative_time("", fixed_now()), "");
}

#[test]
fn test_parse_relative_time_超大数值返回空() {
    assert_eq!(parse_relative_time("99999999999w", fixed_now()), "");
    assert_eq!(parse_relative_time("9999999999999999d", fixed_now()), "");
    // 时长可表示,但减去后超出日期范围
    assert_eq!(parse_relative_time("100000000d", fixed_now()), "");
    assert_eq!(parse_relative_time("9999999999999999個月", fixed_now()), "");
    assert_eq!(
        normalize_timestamp(None, "99999999999w", fixed_now()),
        ""
    );
}

#[test]
fn test_normalize_timestamp_属性与文本都无效() {
    assert_eq!(normalize_timestamp(None, "whenever", fixed_now()), "");
    assert_eq!(normalize_timestamp(Some(""), "", fixed_now()), "");
}
