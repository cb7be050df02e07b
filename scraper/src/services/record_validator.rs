//! 记录校验
//!
//! 帖子与资料采用不同的策略:
//! - 帖子缺少正文/作者/时间 → 直接丢弃
//! - 资料只要有用户名就保留,缺失的可选字段记录在 missing_fields 中

use serde::{Deserialize, Serialize};

use crate::models::{PostRecord, ProfileRecord, UNKNOWN_AUTHOR};

/// 正文最短长度 (字符数)
pub const MIN_CONTENT_LEN: usize = 3;

/// 校验失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationReason {
    NoContent,
    NoAuthor,
    NoTimestamp,
    NoUsername,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::NoContent => "noContent",
            ValidationReason::NoAuthor => "noAuthor",
            ValidationReason::NoTimestamp => "noTimestamp",
            ValidationReason::NoUsername => "noUsername",
        }
    }
}

/// 帖子校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostValidation {
    pub valid: bool,
    pub reason: Option<ValidationReason>,
}

/// 资料校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileValidation {
    pub valid: bool,
    pub reason: Option<ValidationReason>,
    pub partial: bool,
    pub missing: Vec<String>,
}

/// 校验帖子
///
/// 按 正文 → 作者 → 时间 的顺序返回第一个失败原因
pub fn validate_post(record: &PostRecord) -> PostValidation {
    let reason = if record.content.trim().chars().count() < MIN_CONTENT_LEN {
        Some(ValidationReason::NoContent)
    } else if record.author.username().trim().is_empty()
        || record.author.username() == UNKNOWN_AUTHOR
    {
        Some(ValidationReason::NoAuthor)
    } else if record.timestamp.trim().is_empty() {
        Some(ValidationReason::NoTimestamp)
    } else {
        None
    };

    PostValidation {
        valid: reason.is_none(),
        reason,
    }
}

/// 校验资料
///
/// 只有用户名缺失时无效;其他可选字段缺失时标记 partial。
/// displayName/avatarUrl/bio 为空字符串也算缺失,
/// followersCount/location/joinedDate 只在未取得 (None) 时算缺失。
pub fn validate_profile(record: &ProfileRecord) -> ProfileValidation {
    if record.username.trim().is_empty() {
        return ProfileValidation {
            valid: false,
            reason: Some(ValidationReason::NoUsername),
            partial: true,
            missing: Vec::new(),
        };
    }

    let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
    let checks = [
        ("displayName", blank(&record.display_name)),
        ("avatarUrl", blank(&record.avatar_url)),
        ("followersCount", record.followers_count.is_none()),
        ("bio", blank(&record.bio)),
        ("location", record.location.is_none()),
        ("joinedDate", record.joined_date.is_none()),
    ];

    let missing: Vec<String> = checks
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(field, _)| field.to_string())
        .collect();

    ProfileValidation {
        valid: true,
        reason: None,
        partial: !missing.is_empty(),
        missing,
    }
}

/// 校验资料并把结果写回记录
pub fn apply_profile_validation(record: &mut ProfileRecord) -> ProfileValidation {
    let validation = validate_profile(record);
    record.partial = validation.partial;
    record.missing_fields = validation.missing.clone();
    validation
}
