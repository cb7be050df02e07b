//! Playwright Server 文档后端
//!
//! 每个采集任务建立一条独立的WebSocket连接,服务端为该连接打开一个页面。
//!
//! 协议 (JSON文本帧):
//! - 请求: `{"id": 1, "action": "goto", "payload": {...}}`
//! - 响应: `{"id": 1, "success": true, "data": ..., "error": null}`
//!
//! 每次调用都有超时上限,不会无限等待。

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::models::DocumentError;
use crate::services::document::{Document, DocumentFactory, NetworkResponse};

/// 单次调用的默认超时
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// 等待类调用在请求时长之外额外预留的时间
const WAIT_GRACE: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Connection {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

/// 请求帧
#[derive(Debug, Serialize)]
struct PlaywrightRequest<'a> {
    id: u64,
    action: &'a str,
    payload: Value,
}

/// 响应帧
#[derive(Debug, Deserialize)]
struct PlaywrightResponse {
    #[serde(default)]
    id: Option<u64>,
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// 通过 Playwright Server 驱动的文档
pub struct PlaywrightDocument {
    server_url: String,
    connection: Mutex<Connection>,
    next_id: AtomicU64,
    call_timeout: Duration,
}

impl PlaywrightDocument {
    /// 连接服务端并打开新页面
    pub async fn connect(server_url: &str) -> Result<Self, DocumentError> {
        let (ws_stream, _) = tokio::time::timeout(DEFAULT_CALL_TIMEOUT, connect_async(server_url))
            .await
            .map_err(|_| DocumentError::Timeout(format!("连接 {} 超时", server_url)))?
            .map_err(|e| {
                tracing::error!(服务地址 = %server_url, 错误 = %e, "连接Playwright服务器失败");
                DocumentError::Transport(e.to_string())
            })?;

        let (write, read) = ws_stream.split();
        let document = Self {
            server_url: server_url.to_string(),
            connection: Mutex::new(Connection { write, read }),
            next_id: AtomicU64::new(1),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        };

        document.call::<Value>("newPage", json!({}), None).await?;
        tracing::info!(服务地址 = %server_url, "Playwright页面已打开");
        Ok(document)
    }

    /// 发送请求并等待同ID的响应
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: Value,
        wait: Option<Duration>,
    ) -> Result<T, DocumentError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = serde_json::to_string(&PlaywrightRequest {
            id,
            action,
            payload,
        })
        .map_err(|e| DocumentError::Transport(format!("序列化请求失败: {}", e)))?;

        let limit = wait
            .map(|w| (w + WAIT_GRACE).max(self.call_timeout))
            .unwrap_or(self.call_timeout);

        let mut connection = self.connection.lock().await;
        connection
            .write
            .send(Message::Text(text))
            .await
            .map_err(|e| DocumentError::Transport(format!("发送消息失败: {}", e)))?;

        tracing::trace!(请求ID = id, 动作 = %action, "请求已发送");

        let response = tokio::time::timeout(limit, read_response(&mut connection.read, id))
            .await
            .map_err(|_| DocumentError::Timeout(format!("{} 等待响应超时", action)))??;

        decode_response(action, response)
    }
}

/// 读取直到拿到指定ID的响应 (忽略其他帧)
async fn read_response(
    read: &mut SplitStream<WsStream>,
    id: u64,
) -> Result<PlaywrightResponse, DocumentError> {
    while let Some(frame) = read.next().await {
        let frame = frame.map_err(|e| DocumentError::Transport(format!("接收响应失败: {}", e)))?;
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let response: PlaywrightResponse = serde_json::from_str(&text)
            .map_err(|e| DocumentError::Transport(format!("解析响应JSON失败: {}", e)))?;
        if response.id.map_or(true, |rid| rid == id) {
            return Ok(response);
        }
        tracing::debug!(期望ID = id, 收到ID = ?response.id, "忽略不匹配的响应");
    }
    Err(DocumentError::Transport("连接已关闭".to_string()))
}

fn decode_response<T: DeserializeOwned>(
    action: &str,
    response: PlaywrightResponse,
) -> Result<T, DocumentError> {
    if !response.success {
        let error = response.error.unwrap_or_else(|| "未知错误".to_string());
        return Err(DocumentError::Evaluation(format!("{}: {}", action, error)));
    }
    serde_json::from_value(response.data.unwrap_or(Value::Null))
        .map_err(|e| DocumentError::Transport(format!("{} 响应数据格式错误: {}", action, e)))
}

#[async_trait]
impl Document for PlaywrightDocument {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DocumentError> {
        let payload = json!({
            "url": url,
            "waitUntil": "domcontentloaded",
            "timeoutMs": timeout.as_millis() as u64,
        });
        self.call::<Value>("goto", payload, Some(timeout))
            .await
            .map(|_| ())
            .map_err(|e| match e {
                DocumentError::Evaluation(message) => DocumentError::Navigation {
                    url: url.to_string(),
                    message,
                },
                other => other,
            })
    }

    async fn content(&self) -> Result<String, DocumentError> {
        self.call("content", json!({}), None).await
    }

    async fn viewport_height(&self) -> Result<f64, DocumentError> {
        self.call("viewportHeight", json!({}), None).await
    }

    async fn scroll_by(&self, delta_y: f64) -> Result<(), DocumentError> {
        self.call::<Value>("scrollBy", json!({ "deltaY": delta_y }), None)
            .await
            .map(|_| ())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DocumentError> {
        let payload = json!({
            "selector": selector,
            "state": "attached",
            "timeoutMs": timeout.as_millis() as u64,
        });
        self.call("waitForSelector", payload, Some(timeout)).await
    }

    async fn wait_for_selector_hidden(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DocumentError> {
        let payload = json!({
            "selector": selector,
            "state": "hidden",
            "timeoutMs": timeout.as_millis() as u64,
        });
        self.call("waitForSelector", payload, Some(timeout)).await
    }

    async fn drain_responses(&self) -> Vec<NetworkResponse> {
        match self.call("drainResponses", json!({}), None).await {
            Ok(responses) => responses,
            Err(e) => {
                tracing::warn!(服务地址 = %self.server_url, 错误 = %e, "读取网络响应失败");
                Vec::new()
            }
        }
    }

    async fn close(&self) -> Result<(), DocumentError> {
        let closed = self.call::<Value>("closePage", json!({}), None).await;
        let mut connection = self.connection.lock().await;
        if let Err(e) = connection.write.send(Message::Close(None)).await {
            tracing::debug!(错误 = %e, "关闭WebSocket失败");
        }
        closed.map(|_| ())
    }
}

/// 为每个任务打开独立的 Playwright 连接
#[derive(Debug, Clone)]
pub struct PlaywrightSessions {
    server_url: String,
}

impl PlaywrightSessions {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }
}

#[async_trait]
impl DocumentFactory for PlaywrightSessions {
    async fn open(&self) -> Result<Box<dyn Document>, DocumentError> {
        Ok(Box::new(PlaywrightDocument::connect(&self.server_url).await?))
    }
}
