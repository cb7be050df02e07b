//! 记录输出端
//!
//! - `JsonLinesSink`: 每行一个JSON对象,追加写入文件
//! - `RedisSink`: 帖子按任务写入列表,资料写入哈希,通过集合去重
//! - `MemorySink`: 收集在内存中,供测试与库调用方使用
//!
//! 帖子按ID去重: 重复写入返回 `Ok(false)`,不算错误。

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{PostRecord, ProfileRecord, StorageError};

/// 已写入帖子ID集合
pub const SEEN_POSTS_KEY: &str = "threads:seen";

/// 资料哈希
pub const PROFILES_KEY: &str = "threads:profiles";

/// 按任务名组织的帖子列表键: `threads:posts:{task}`
pub fn posts_key(task_name: &str) -> String {
    format!("threads:posts:{}", task_name)
}

/// 记录输出端
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 写入帖子,返回是否为新记录
    async fn write_post(&self, task_name: &str, post: &PostRecord) -> Result<bool, StorageError>;

    /// 写入资料 (同一用户名覆盖)
    async fn write_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError>;

    /// 刷新缓冲
    async fn flush(&self) -> Result<(), StorageError>;
}

/// JSON Lines 文件输出
pub struct JsonLinesSink {
    path: PathBuf,
    state: Mutex<JsonLinesState>,
}

struct JsonLinesState {
    file: tokio::fs::File,
    seen: HashSet<String>,
}

impl JsonLinesSink {
    /// 以追加模式打开文件 (不存在时创建,包括父目录)
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        tracing::info!(输出文件 = %path.display(), "JSON Lines 输出已打开");
        Ok(Self {
            path,
            state: Mutex::new(JsonLinesState {
                file,
                seen: HashSet::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn write_post(&self, task_name: &str, post: &PostRecord) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        if !state.seen.insert(post.id.clone()) {
            tracing::debug!(任务 = %task_name, 帖子ID = %post.id, "重复帖子,跳过写入");
            return Ok(false);
        }

        let mut line = post.to_json()?;
        line.push('\n');
        state.file.write_all(line.as_bytes()).await?;
        Ok(true)
    }

    async fn write_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        let mut line = profile.to_json()?;
        line.push('\n');
        let mut state = self.state.lock().await;
        state.file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        state.file.flush().await?;
        Ok(())
    }
}

/// Redis 输出
///
/// Redis数据结构:
/// - `threads:seen` (Set): 已写入的帖子ID
/// - `threads:posts:{task}` (List): 帖子JSON,按抽取顺序追加
/// - `threads:profiles` (Hash): 用户名 → 资料JSON
pub struct RedisSink {
    pool: Pool,
}

impl RedisSink {
    /// 创建连接池
    ///
    /// # 参数
    /// - `redis_url`: `redis://host:port` 或 `redis://host:port/db`
    pub fn new(redis_url: &str) -> Result<Self, StorageError> {
        let config = Config::from_url(redis_url);
        let pool = config.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            tracing::error!(
                Redis连接URL = %redis_url,
                错误 = %e,
                "创建Redis连接池失败"
            );
            StorageError::RedisConnectionFailed(e.to_string())
        })?;

        tracing::info!(Redis连接URL = %redis_url, "Redis连接池创建成功");
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::RedisConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl RecordSink for RedisSink {
    async fn write_post(&self, task_name: &str, post: &PostRecord) -> Result<bool, StorageError> {
        let json = post.to_json()?;
        let mut conn = self.connection().await?;

        let added: i64 = conn
            .sadd(SEEN_POSTS_KEY, &post.id)
            .await
            .map_err(|e| StorageError::CommandFailed(e.to_string()))?;
        if added == 0 {
            tracing::debug!(任务 = %task_name, 帖子ID = %post.id, "重复帖子,跳过写入");
            return Ok(false);
        }

        conn.rpush::<_, _, ()>(posts_key(task_name), json)
            .await
            .map_err(|e| StorageError::CommandFailed(e.to_string()))?;
        Ok(true)
    }

    async fn write_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        let json = profile.to_json()?;
        let mut conn = self.connection().await?;

        redis::pipe()
            .atomic()
            .hset(PROFILES_KEY, &profile.username, json)
            .ignore()
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| StorageError::CommandFailed(e.to_string()))?;

        tracing::debug!(用户名 = %profile.username, 部分资料 = profile.partial, "资料已写入Redis");
        Ok(())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// 内存输出
#[derive(Default)]
pub struct MemorySink {
    posts: Mutex<Vec<(String, PostRecord)>>,
    profiles: Mutex<Vec<ProfileRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的帖子 (按写入顺序)
    pub async fn posts(&self) -> Vec<PostRecord> {
        self.posts
            .lock()
            .await
            .iter()
            .map(|(_, post)| post.clone())
            .collect()
    }

    /// 某个任务写入的帖子
    pub async fn posts_for(&self, task_name: &str) -> Vec<PostRecord> {
        self.posts
            .lock()
            .await
            .iter()
            .filter(|(task, _)| task == task_name)
            .map(|(_, post)| post.clone())
            .collect()
    }

    pub async fn profiles(&self) -> Vec<ProfileRecord> {
        self.profiles.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write_post(&self, task_name: &str, post: &PostRecord) -> Result<bool, StorageError> {
        let mut posts = self.posts.lock().await;
        if posts.iter().any(|(_, existing)| existing.id == post.id) {
            return Ok(false);
        }
        posts.push((task_name.to_string(), post.clone()));
        Ok(true)
    }

    async fn write_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        let mut profiles = self.profiles.lock().await;
        profiles.retain(|existing| existing.username != profile.username);
        profiles.push(profile.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
