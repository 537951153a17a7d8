use crate::error::{AppError, AppResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 令牌载荷。令牌是 {userId, timestamp} 的可逆 base64 编码，
/// 不做签名，只作为会话占位符，不是安全边界。
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub timestamp: i64,
}

/// 为用户签发 bearer 令牌
pub fn issue_token(user_id: &str) -> String {
    let payload = TokenPayload {
        user_id: user_id.to_string(),
        timestamp: Utc::now().timestamp_millis(),
    };
    // 载荷只含字符串与整数，序列化不会失败
    let json = serde_json::to_string(&payload).unwrap_or_default();
    STANDARD.encode(json.as_bytes())
}

/// 解码令牌并还原其中的用户标识
pub fn verify_token(token: &str) -> AppResult<TokenPayload> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::AuthError("Invalid token".to_string()))
}
