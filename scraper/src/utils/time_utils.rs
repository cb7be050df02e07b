use chrono::{DateTime, Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::phrases::{self, JUST_NOW};

/// 拉丁紧凑格式: "5m"、"3d"、"2 w"
static LATIN_RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s?([smhdw])\b").expect("相对时间正则有效"));

/// 中日文单位格式: "5分鐘前"、"3 小时"、"2個月"
static NATIVE_RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*(秒|分鐘|分钟|分|小時|小时|時間|時|天|日|週|周|星期|個月|个月|か月|ヶ月|月)")
        .expect("本地化相对时间正则有效")
});

/// 相对时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    /// 按30天近似
    Month,
}

impl RelativeUnit {
    /// 超出可表示范围时返回 None
    fn duration(self, amount: i64) -> Option<Duration> {
        match self {
            RelativeUnit::Second => Duration::try_seconds(amount),
            RelativeUnit::Minute => Duration::try_minutes(amount),
            RelativeUnit::Hour => Duration::try_hours(amount),
            RelativeUnit::Day => Duration::try_days(amount),
            RelativeUnit::Week => Duration::try_weeks(amount),
            RelativeUnit::Month => amount.checked_mul(30).and_then(Duration::try_days),
        }
    }

    fn from_latin(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "s" => Some(RelativeUnit::Second),
            "m" => Some(RelativeUnit::Minute),
            "h" => Some(RelativeUnit::Hour),
            "d" => Some(RelativeUnit::Day),
            "w" => Some(RelativeUnit::Week),
            _ => None,
        }
    }

    fn from_native(unit: &str) -> Option<Self> {
        match unit {
            "秒" => Some(RelativeUnit::Second),
            "分鐘" | "分钟" | "分" => Some(RelativeUnit::Minute),
            "小時" | "小时" | "時間" | "時" => Some(RelativeUnit::Hour),
            "天" | "日" => Some(RelativeUnit::Day),
            "週" | "周" | "星期" => Some(RelativeUnit::Week),
            "個月" | "个月" | "か月" | "ヶ月" | "月" => Some(RelativeUnit::Month),
            _ => None,
        }
    }
}

/// 格式化为 ISO-8601 (毫秒精度, UTC, 以 Z 结尾)
///
/// 例: 2025-10-07T12:34:56.000Z
pub fn to_iso_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 解析相对时间
///
/// - 空输入 → 空字符串
/// - "刚刚"/"just now" → now
/// - `\d+[smhdw]` → now 减去对应时长
/// - 中日文单位 (秒/分/时/天/周/月,月按30天) → now 减去对应时长
/// - 其他格式或数值超出时间范围 → 空字符串
///
/// 空字符串表示"无法解析",调用方必须按缺失处理,不能当作当前时间。
pub fn parse_relative_time(text: &str, now: DateTime<Utc>) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if phrases::equals_any(trimmed, JUST_NOW) {
        return to_iso_string(now);
    }

    if let Some(caps) = LATIN_RELATIVE.captures(trimmed) {
        if let (Ok(amount), Some(unit)) = (
            caps[1].parse::<i64>(),
            RelativeUnit::from_latin(&caps[2]),
        ) {
            return shift_back(now, unit, amount);
        }
    }

    if let Some(caps) = NATIVE_RELATIVE.captures(trimmed) {
        if let (Ok(amount), Some(unit)) = (
            caps[1].parse::<i64>(),
            RelativeUnit::from_native(&caps[2]),
        ) {
            return shift_back(now, unit, amount);
        }
    }

    String::new()
}

/// now 减去 amount 个单位;数值过大无法表示时视为无法解析
fn shift_back(now: DateTime<Utc>, unit: RelativeUnit, amount: i64) -> String {
    unit.duration(amount)
        .and_then(|delta| now.checked_sub_signed(delta))
        .map(to_iso_string)
        .unwrap_or_default()
}

/// 归一化帖子时间
///
/// 优先使用 `<time datetime="...">` 属性中的绝对时间,
/// 属性缺失或无法解析时回退到相对时间文本。
pub fn normalize_timestamp(datetime_attr: Option<&str>, text: &str, now: DateTime<Utc>) -> String {
    if let Some(attr) = datetime_attr {
        if let Ok(dt) = DateTime::parse_from_rfc3339(attr.trim()) {
            return to_iso_string(dt.with_timezone(&Utc));
        }
    }
    parse_relative_time(text, now)
}
