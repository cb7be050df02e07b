//! 用户资料记录模型

use serde::{Deserialize, Serialize};

/// 用户资料记录
///
/// partial / missing_fields 由校验器在抽取后填充。
/// location / joined_date 为 `None` 表示页面上确实没有该信息(输出为 null),
/// 空字符串则表示存在但内容为空,两者语义不同。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// 用户名 (主键,必填)
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub profile_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_count: Option<u64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub joined_date: Option<String>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// 固定为 "profile"
    #[serde(rename = "type", default = "profile_tag")]
    pub record_type: String,
    /// 固定为 "profile"
    #[serde(default = "profile_tag")]
    pub source: String,
}

fn profile_tag() -> String {
    "profile".to_string()
}

impl ProfileRecord {
    /// 创建只有用户名的空白资料
    pub fn new(platform_host: &str, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            profile_url: super::author::profile_url(platform_host, &username),
            username,
            display_name: None,
            avatar_url: None,
            bio: None,
            is_verified: false,
            followers_count: None,
            following_count: None,
            posts_count: None,
            location: None,
            joined_date: None,
            partial: false,
            missing_fields: Vec::new(),
            record_type: profile_tag(),
            source: profile_tag(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
