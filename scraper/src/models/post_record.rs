//! 帖子记录模型
//!
//! 输出结构:
//! `{id, url, author, content, timestamp, stats, images?, videos?, links?, quotedPost?, source, parentId?, profile?}`

use serde::{Deserialize, Serialize};

use super::author::Author;

/// 互动统计 (均为非负整数)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub likes: u64,
    pub replies: u64,
    pub reposts: u64,
}

/// 记录来源
///
/// 标识记录由哪种采集任务产生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSource {
    /// 关键字搜索
    Search,
    /// 话题标签
    Hashtag,
    /// 帖子回复 (附带 parentId)
    Reply,
    /// 用户主页帖子 (附带 profile)
    ProfilePosts,
}

impl PostSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSource::Search => "search",
            PostSource::Hashtag => "hashtag",
            PostSource::Reply => "reply",
            PostSource::ProfilePosts => "profile_posts",
        }
    }
}

/// 帖子记录
///
/// 由内容抽取器创建,经校验器过滤后交给输出端。
/// quoted_post 最多嵌套一层: 被引用帖子自身不再携带 quoted_post。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// 平台分配的帖子ID (去重主键)
    pub id: String,
    pub url: String,
    pub author: Author,
    /// 正文 (校验前可能为空)
    pub content: String,
    /// ISO-8601 时间,无法解析时为空字符串
    pub timestamp: String,
    pub stats: PostStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_post: Option<Box<PostRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PostSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// 来源为 profile_posts 时的主页用户名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl PostRecord {
    /// 创建不带媒体与来源标签的基础记录
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        author: Author,
        content: impl Into<String>,
        timestamp: impl Into<String>,
        stats: PostStats,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            author,
            content: content.into(),
            timestamp: timestamp.into(),
            stats,
            images: Vec::new(),
            videos: Vec::new(),
            links: Vec::new(),
            quoted_post: None,
            source: None,
            parent_id: None,
            profile: None,
        }
    }

    /// 设置被引用帖子
    ///
    /// 被引用帖子自身的 quoted_post 会被丢弃,保证嵌套深度不超过一层
    pub fn with_quoted(mut self, mut quoted: PostRecord) -> Self {
        quoted.quoted_post = None;
        self.quoted_post = Some(Box::new(quoted));
        self
    }

    /// 标记来源
    pub fn tag_source(&mut self, source: PostSource) {
        self.source = Some(source);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
