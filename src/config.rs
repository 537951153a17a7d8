use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub peer: PeerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// 对端孪生服务的基础地址，例如 http://localhost:3002
    pub base_url: String,
    /// 影响响应的调用（登录/注册回退、读时合并）的超时
    #[serde(default = "default_gated_timeout_ms")]
    pub gated_timeout_ms: u64,
    /// fire-and-forget 复制调用的超时
    #[serde(default = "default_replicate_timeout_ms")]
    pub replicate_timeout_ms: u64,
}

fn default_gated_timeout_ms() -> u64 {
    2000
}

fn default_replicate_timeout_ms() -> u64 {
    1000
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量与默认值
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Config {
                server: ServerConfig {
                    host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                    port: env::var("SERVER_PORT")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(3001),
                },
                peer: PeerConfig {
                    base_url: env::var("PEER_BASE_URL")
                        .unwrap_or_else(|_| "http://localhost:3002".to_string()),
                    gated_timeout_ms: env::var("PEER_GATED_TIMEOUT_MS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(default_gated_timeout_ms),
                    replicate_timeout_ms: env::var("PEER_REPLICATE_TIMEOUT_MS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(default_replicate_timeout_ms),
                },
            },
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("PEER_BASE_URL") {
            config.peer.base_url = v;
        }
        if let Ok(v) = env::var("PEER_GATED_TIMEOUT_MS")
            && let Ok(ms) = v.parse()
        {
            config.peer.gated_timeout_ms = ms;
        }
        if let Ok(v) = env::var("PEER_REPLICATE_TIMEOUT_MS")
            && let Ok(ms) = v.parse()
        {
            config.peer.replicate_timeout_ms = ms;
        }

        Ok(config)
    }
}
