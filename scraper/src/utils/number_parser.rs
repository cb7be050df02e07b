//! 计数文本解析
//!
//! 平台按语言显示紧凑数字: "2,049"、"1.5K"、"2M"、"1.2萬"。
//! 这里统一转换为整数。

use once_cell::sync::Lazy;
use regex::Regex;

use super::phrases::{self, FOLLOWERS};

/// 数字(可含千分位与小数点) + 可选 K/M 后缀
static COMPACT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)([KkMm])?").expect("数字正则有效"));

/// 数字 + 可选 萬/万/K/M 单位
static UNIT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*(萬|万|[KkMm])?").expect("单位数字正则有效")
});

/// 解析紧凑数字
///
/// 取第一个匹配,去掉千分位;有 K/M 后缀时乘以 1,000 / 1,000,000 并四舍五入。
/// 没有数字时返回 0。
///
/// # 示例
/// - `"讚 2,049"` → 2049
/// - `"1.5K"` → 1500
/// - `"2M"` → 2000000
pub fn parse_compact_number(text: &str) -> u64 {
    let Some(caps) = COMPACT_NUMBER.captures(text) else {
        return 0;
    };

    let digits = caps[1].replace(',', "");
    let Ok(value) = digits.parse::<f64>() else {
        return 0;
    };

    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("K") | Some("k") => 1_000.0,
        Some("M") | Some("m") => 1_000_000.0,
        _ => 1.0,
    };

    (value * multiplier).round() as u64
}

/// 解析粉丝数
///
/// 识别 "1.2萬 位粉絲"、"3,456 followers"、"粉絲 12.5K" 等组合,
/// 除 K/M 外还支持"萬/万"(×10,000)。文本中没有粉丝短语时返回 `None`。
pub fn parse_follower_count(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    let phrase = phrases::all(FOLLOWERS).find(|p| lower.contains(p))?;
    let phrase_at = lower.find(phrase)?;

    // 优先取短语前面最近的数字,其次取短语后面的第一个数字
    let before = &lower[..phrase_at];
    let after = &lower[phrase_at + phrase.len()..];

    UNIT_NUMBER
        .captures_iter(before)
        .last()
        .or_else(|| UNIT_NUMBER.captures(after))
        .and_then(|caps| {
            let value = caps[1].replace(',', "").parse::<f64>().ok()?;
            let multiplier = match caps.get(2).map(|m| m.as_str()) {
                Some("萬") | Some("万") => 10_000.0,
                Some("k") => 1_000.0,
                Some("m") => 1_000_000.0,
                _ => 1.0,
            };
            Some((value * multiplier).round() as u64)
        })
}
