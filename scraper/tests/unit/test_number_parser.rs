//! 计数文本解析单元测试
//!
//! 覆盖范围:
//! 1. 互动按钮上的紧凑数字
//! 2. 粉丝数的多语言格式 (含 萬/万)

use threads_scraper::utils::number_parser::{parse_compact_number, parse_follower_count};

// ============================================================================
// 1. 紧凑数字
// ============================================================================

#[test]
fn test_parse_compact_number_千分位() {
    assert_eq!(parse_compact_number("讚 2,049"), 2049);
}

#[test]
fn test_parse_compact_number_k后缀() {
    assert_eq!(parse_compact_number("1.5K"), 1500);
}

#[test]
fn test_parse_compact_number_m后缀() {
    assert_eq!(parse_compact_number("2M"), 2_000_000);
}

#[test]
fn test_parse_compact_number_无数字为零() {
    assert_eq!(parse_compact_number("Like"), 0);
    assert_eq!(parse_compact_number("轉發"), 0);
}

#[test]
fn test_parse_compact_number_只取第一个数字() {
    assert_eq!(parse_compact_number("12 replies · 3 reposts"), 12);
}

#[test]
fn test_parse_compact_number_小数后缀() {
    assert_eq!(parse_compact_number("3.7K"), 3700);
    assert_eq!(parse_compact_number("0.5m"), 500_000);
}

// ============================================================================
// 2. 粉丝数
// ============================================================================

#[test]
fn test_parse_follower_count_万单位() {
    assert_eq!(parse_follower_count("3.5萬位粉絲"), Some(35_000));
    assert_eq!(parse_follower_count("粉丝 2万"), Some(20_000));
}

#[test]
fn test_parse_follower_count_英文() {
    assert_eq!(parse_follower_count("1.1M followers"), Some(1_100_000));
}

#[test]
fn test_parse_follower_count_没有粉丝短语() {
    assert_eq!(parse_follower_count("1,234 likes"), None);
}
