use sha2::{Digest, Sha256};

/// 对密码取 SHA-256 十六进制摘要。
/// 确定性哈希便于本地比对与对端同步（真实的密码安全不在范围内）。
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 校验密码与存储的摘要是否一致
pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let h1 = hash_password("hunter2secret");
        let h2 = hash_password("hunter2secret");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("hunter2secret");
        assert!(verify_password("hunter2secret", &hash));
        assert!(!verify_password("wrong", &hash));
    }
}
