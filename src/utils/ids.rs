use chrono::Utc;
use rand::Rng;

/// 生成本地用户 id：`USER-<毫秒时间戳>-<4 位随机后缀>`
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "USER-{}-{}",
        Utc::now().timestamp_millis(),
        rng.gen_range(1000..=9999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_format() {
        let id = generate_user_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "USER");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        let suffix: u32 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }
}
