//! 作者模型

use serde::{Deserialize, Serialize};

/// 无法识别作者时使用的占位用户名
///
/// 校验器会拒绝作者为该值的帖子
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// 帖子作者
///
/// 构造后不可变: 字段只读,profile_url 由 username 推导
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    username: String,
    display_name: String,
    profile_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(default)]
    is_verified: bool,
}

impl Author {
    /// 创建作者
    ///
    /// display_name 为空时回退为 username
    pub fn new(
        platform_host: &str,
        username: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
        is_verified: bool,
    ) -> Self {
        let username = username.into();
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            username.clone()
        } else {
            display_name
        };

        Self {
            profile_url: profile_url(platform_host, &username),
            username,
            display_name,
            avatar_url,
            is_verified,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }
}

/// 由用户名推导主页地址: `https://{host}/@{username}`
pub fn profile_url(platform_host: &str, username: &str) -> String {
    format!("https://{}/@{}", platform_host, username)
}
