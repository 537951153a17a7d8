use crate::error::{AppError, AppResult};
use crate::external::PeerClient;
use crate::models::*;
use crate::store::Store;
use crate::utils::{generate_user_id, hash_password, issue_token, verify_password, verify_token};
use chrono::Utc;

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    peer: PeerClient,
}

impl AuthService {
    pub fn new(store: Store, peer: PeerClient) -> Self {
        Self { store, peer }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let (Some(email), Some(password), Some(name)) =
            (request.email, request.password, request.name)
        else {
            return Err(AppError::ValidationError(
                "Email, password, and name are required".to_string(),
            ));
        };
        let phone = request.phone.unwrap_or_default();

        {
            let state = self.store.read().await;
            if state.user_by_email(&email).is_some() {
                return Err(AppError::ValidationError(
                    "User with this email already exists".to_string(),
                ));
            }
        }

        // 先把注册委托给对端：对端成功时以其返回的记录为权威，
        // 密码改存本地明文的哈希（对端不回传哈希）
        let delegate = serde_json::json!({
            "email": email,
            "password": password,
            "name": name,
            "phone": phone,
        });
        match self.peer.register(&delegate).await {
            Ok(peer_response) => {
                let mut state = self.store.write().await;
                if state.user_by_email(&email).is_none() {
                    let user = User {
                        id: peer_response.user.id.clone(),
                        email: email.clone(),
                        password_hash: hash_password(&password),
                        name: peer_response.user.name.clone(),
                        phone: peer_response.user.phone.clone(),
                        created_at: Utc::now(),
                    };
                    state.users.insert(user.id.clone(), user);
                }
                return Ok(peer_response);
            }
            Err(e) => {
                log::debug!("Peer register delegation unavailable: {e}");
            }
        }

        // 对端缺席：本地铸造 id 并异步告知对端以便最终同步
        let user = User {
            id: generate_user_id(),
            email: email.clone(),
            password_hash: hash_password(&password),
            name,
            phone,
            created_at: Utc::now(),
        };
        {
            let mut state = self.store.write().await;
            // 写锁下复查，防止并发注册同一邮箱
            if state.user_by_email(&email).is_some() {
                return Err(AppError::ValidationError(
                    "User with this email already exists".to_string(),
                ));
            }
            state.users.insert(user.id.clone(), user.clone());
        }

        self.peer.replicate(
            "/api/auth/register",
            serde_json::json!({
                "email": user.email,
                "password": password,
                "name": user.name,
                "phone": user.phone,
            }),
        );

        let token = issue_token(&user.id);
        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let (Some(email), Some(password)) = (request.email, request.password) else {
            return Err(AppError::ValidationError(
                "Email and password are required".to_string(),
            ));
        };

        let local = {
            let state = self.store.read().await;
            state
                .user_by_email(&email)
                .filter(|u| verify_password(&password, &u.password_hash))
                .cloned()
        };
        if let Some(user) = local {
            let token = issue_token(&user.id);
            return Ok(AuthResponse {
                message: "Login successful".to_string(),
                user: user.into(),
                token,
            });
        }

        // 本地未命中：尝试对端，成功则同步一条影子记录
        match self.peer.login(&email, &password).await {
            Ok(peer_response) => {
                let mut state = self.store.write().await;
                if state.user_by_email(&email).is_none() {
                    let user = User {
                        id: peer_response.user.id.clone(),
                        email,
                        password_hash: hash_password(&password),
                        name: peer_response.user.name.clone(),
                        phone: peer_response.user.phone.clone(),
                        created_at: Utc::now(),
                    };
                    state.users.insert(user.id.clone(), user);
                }
                Ok(peer_response)
            }
            Err(e) => {
                log::debug!("Peer login fallback unavailable: {e}");
                Err(AppError::AuthError("Invalid email or password".to_string()))
            }
        }
    }

    /// 解码 bearer 令牌并返回其对应用户的公开视图
    pub async fn me(&self, token: &str) -> AppResult<UserResponse> {
        let payload = verify_token(token)?;
        let state = self.store.read().await;
        state
            .users
            .get(&payload.user_id)
            .cloned()
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeerConfig;

    fn service() -> AuthService {
        AuthService::new(
            Store::new(),
            PeerClient::new(PeerConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                gated_timeout_ms: 200,
                replicate_timeout_ms: 200,
            }),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some("hunter2secret".to_string()),
            name: Some("Alice".to_string()),
            phone: Some("+1234567890".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_mints_local_id_when_peer_absent() {
        let auth = service();
        let response = auth.register(register_request("alice@example.com")).await.unwrap();
        assert_eq!(response.message, "User registered successfully");
        assert!(response.user.id.starts_with("USER-"));
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let auth = service();
        auth.register(register_request("alice@example.com")).await.unwrap();
        let result = auth.register(register_request("alice@example.com")).await;
        match result {
            Err(AppError::ValidationError(msg)) => {
                assert_eq!(msg, "User with this email already exists");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_round_trip_and_bad_password() {
        let auth = service();
        auth.register(register_request("alice@example.com")).await.unwrap();

        let response = auth
            .login(LoginRequest {
                email: Some("alice@example.com".to_string()),
                password: Some("hunter2secret".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(response.message, "Login successful");
        assert_eq!(response.user.email, "alice@example.com");

        let result = auth
            .login(LoginRequest {
                email: Some("alice@example.com".to_string()),
                password: Some("wrong".to_string()),
            })
            .await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_token_resolves_issuing_user() {
        let auth = service();
        let registered = auth.register(register_request("alice@example.com")).await.unwrap();

        let me = auth.me(&registered.token).await.unwrap();
        assert_eq!(me.id, registered.user.id);
        assert_eq!(me.email, "alice@example.com");

        assert!(matches!(auth.me("bogus").await, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let auth = service();
        let result = auth
            .register(RegisterRequest {
                email: Some("alice@example.com".to_string()),
                password: None,
                name: None,
                phone: None,
            })
            .await;
        match result {
            Err(AppError::ValidationError(msg)) => {
                assert_eq!(msg, "Email, password, and name are required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
