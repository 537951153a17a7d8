use crate::config::PeerConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, MenuItem, Restaurant};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// 同时在途的 fire-and-forget 复制任务上限，超出的直接丢弃并记日志
const REPLICATE_MAX_IN_FLIGHT: usize = 32;

/// 对端孪生服务的 HTTP 客户端。
///
/// 两档超时：gated 档用于结果影响响应的调用（登录/注册回退、读时合并），
/// replicate 档用于结果被丢弃的复制调用。任何网络错误或非 2xx
/// 一律视为「对端缺席」，调用方据此回退到本地数据，从不重试、不排队。
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: Client,
    base_url: String,
    gated_timeout: Duration,
    replicate_timeout: Duration,
    replicate_permits: Arc<Semaphore>,
}

impl PeerClient {
    pub fn new(config: PeerConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url,
            gated_timeout: Duration::from_millis(config.gated_timeout_ms),
            replicate_timeout: Duration::from_millis(config.replicate_timeout_ms),
            replicate_permits: Arc::new(Semaphore::new(REPLICATE_MAX_IN_FLIGHT)),
        }
    }

    /// 把注册请求委托给对端，成功时返回对端的权威应答
    pub async fn register(&self, body: &serde_json::Value) -> AppResult<AuthResponse> {
        self.post_json("/api/auth/register", body).await
    }

    /// 在对端尝试登录（本地无此用户时的回退路径）
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_json("/api/auth/login", &body).await
    }

    pub async fn fetch_restaurants(&self) -> AppResult<Vec<Restaurant>> {
        self.get_json("/api/restaurants").await
    }

    pub async fn fetch_menu(&self, restaurant_id: i64) -> AppResult<Vec<MenuItem>> {
        self.get_json(&format!("/api/restaurants/{restaurant_id}/menu"))
            .await
    }

    /// fire-and-forget 复制：在后台任务里发出 POST，结果只记日志。
    /// 不会阻塞响应路径，也不会把失败传回调用方。
    pub fn replicate(&self, path: &str, body: serde_json::Value) {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, path);
        let timeout = self.replicate_timeout;
        let permits = self.replicate_permits.clone();
        tokio::spawn(async move {
            let _permit = match permits.try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Replication backlog full, dropping call to {url}");
                    return;
                }
            };
            match client.post(&url).timeout(timeout).json(&body).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    log::debug!("Peer replication to {url} returned {}", response.status());
                }
                Err(e) => {
                    log::debug!("Peer replication to {url} failed: {e}");
                }
            }
        });
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .timeout(self.gated_timeout)
            .send()
            .await
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(self.gated_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| AppError::PeerUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_peer() -> PeerClient {
        PeerClient::new(PeerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            gated_timeout_ms: 200,
            replicate_timeout_ms: 200,
        })
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_peer_unavailable() {
        let peer = unreachable_peer();
        let result = peer.fetch_restaurants().await;
        assert!(matches!(result, Err(AppError::PeerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_replicate_never_fails_the_caller() {
        let peer = unreachable_peer();
        // 只要不 panic 即可，结果被丢弃
        peer.replicate("/api/restaurants", serde_json::json!({ "name": "x" }));
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
