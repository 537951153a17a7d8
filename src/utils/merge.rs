use std::collections::HashSet;
use std::hash::Hash;

/// 读时合并：本地序列优先并保持原有顺序，对端记录仅在去重键
/// 未出现过时按对端顺序追加。键冲突时本地记录胜出，不做字段级合并。
pub fn merge_by_key<T, K, F>(local: Vec<T>, peer: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = local.iter().map(&key).collect();
    let mut merged = local;
    for record in peer {
        if seen.insert(key(&record)) {
            merged.push(record);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_wins_on_key_collision() {
        let local = vec![("a", 1), ("b", 2)];
        let peer = vec![("a", 99), ("c", 3)];
        let merged = merge_by_key(local, peer, |r| r.0);
        assert_eq!(merged, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn test_peer_order_preserved_for_new_keys() {
        let local: Vec<(&str, i32)> = vec![];
        let peer = vec![("x", 1), ("y", 2), ("x", 3)];
        let merged = merge_by_key(local, peer, |r| r.0);
        // 对端内部的重复键也只保留第一条
        assert_eq!(merged, vec![("x", 1), ("y", 2)]);
    }

    #[test]
    fn test_empty_peer_returns_local_unchanged() {
        let local = vec![("a", 1)];
        let merged = merge_by_key(local.clone(), vec![], |r| r.0);
        assert_eq!(merged, local);
    }
}
