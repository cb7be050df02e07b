//! 采集任务模型
//!
//! 一个采集任务对应一个关键字、标签、用户名或帖子URL

use serde::{Deserialize, Serialize};

use super::post_record::PostSource;

/// 采集任务类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TaskKind {
    /// 关键字搜索
    Search { keyword: String },

    /// 话题标签 (不含 #)
    Hashtag { tag: String },

    /// 用户主页,可选同时采集其帖子
    Profile {
        username: String,
        #[serde(default, rename = "includePosts")]
        include_posts: bool,
    },

    /// 帖子回复
    Replies {
        #[serde(rename = "postUrl")]
        post_url: String,
    },
}

/// 采集任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlTask {
    #[serde(flatten)]
    pub kind: TaskKind,

    /// 期望的最大记录数,缺省使用全局配置
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl CrawlTask {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            max_items: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// 任务名称 (用于日志与批量报告)
    pub fn name(&self) -> String {
        match &self.kind {
            TaskKind::Search { keyword } => format!("search:{}", keyword),
            TaskKind::Hashtag { tag } => format!("#{}", tag.trim_start_matches('#')),
            TaskKind::Profile { username, .. } => format!("@{}", username.trim_start_matches('@')),
            TaskKind::Replies { post_url } => format!("replies:{}", post_url),
        }
    }

    /// 该任务产出帖子的来源标签
    pub fn post_source(&self) -> PostSource {
        match &self.kind {
            TaskKind::Search { .. } => PostSource::Search,
            TaskKind::Hashtag { .. } => PostSource::Hashtag,
            TaskKind::Profile { .. } => PostSource::ProfilePosts,
            TaskKind::Replies { .. } => PostSource::Reply,
        }
    }

    /// 任务入口地址
    pub fn target_url(&self, platform_host: &str) -> String {
        match &self.kind {
            TaskKind::Search { keyword } => format!(
                "https://{}/search?q={}&serp_type=default",
                platform_host,
                encode_query(keyword)
            ),
            TaskKind::Hashtag { tag } => format!(
                "https://{}/search?q={}&serp_type=tags",
                platform_host,
                encode_query(&format!("#{}", tag.trim_start_matches('#')))
            ),
            TaskKind::Profile { username, .. } => format!(
                "https://{}/@{}",
                platform_host,
                username.trim_start_matches('@')
            ),
            TaskKind::Replies { post_url } => post_url.clone(),
        }
    }
}

/// 查询参数编码
fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
