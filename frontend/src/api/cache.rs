//! 查询缓存
//!
//! 以 (角色, 请求键) 为索引保存原始响应体及其标签。
//! 每次失效都会推进该角色的 epoch，发出请求时记录的 epoch
//! 与写回时不一致则放弃写回，避免旧响应覆盖失效后的状态。

use std::collections::HashMap;
use taxi_shared::Role;
use taxi_shared::protocol::CacheTag;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    tags: Vec<CacheTag>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<(Role, String), CacheEntry>,
    epochs: HashMap<Role, u64>,
}

impl QueryCache {
    pub fn get(&self, role: Role, key: &str) -> Option<&str> {
        self.entries
            .get(&(role, key.to_string()))
            .map(|entry| entry.body.as_str())
    }

    pub fn epoch(&self, role: Role) -> u64 {
        self.epochs.get(&role).copied().unwrap_or(0)
    }

    /// 写入缓存；`epoch` 已过期时返回 `false` 且不写入
    pub fn insert(
        &mut self,
        role: Role,
        key: String,
        body: String,
        tags: &[CacheTag],
        epoch: u64,
    ) -> bool {
        if epoch != self.epoch(role) {
            return false;
        }
        self.entries.insert(
            (role, key),
            CacheEntry {
                body,
                tags: tags.to_vec(),
            },
        );
        true
    }

    /// 丢弃该角色下与 `tags` 相交的缓存项，返回丢弃数量
    pub fn invalidate(&mut self, role: Role, tags: &[CacheTag]) -> usize {
        *self.epochs.entry(role).or_default() += 1;
        let before = self.entries.len();
        self.entries.retain(|(entry_role, _), entry| {
            *entry_role != role || !entry.tags.iter().any(|tag| tags.contains(tag))
        });
        before - self.entries.len()
    }

    /// 丢弃该角色的全部缓存（登录身份变化时）
    pub fn forget(&mut self, role: Role) {
        *self.epochs.entry(role).or_default() += 1;
        self.entries.retain(|(entry_role, _), _| *entry_role != role);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(entries: &[(Role, &str, &[CacheTag])]) -> QueryCache {
        let mut cache = QueryCache::default();
        for (role, key, tags) in entries {
            let epoch = cache.epoch(*role);
            assert!(cache.insert(*role, key.to_string(), "[]".into(), tags, epoch));
        }
        cache
    }

    #[test]
    fn test_invalidate_only_matching_tags_of_same_role() {
        let mut cache = cache_with(&[
            (Role::Driver, "orders", &[CacheTag::Orders]),
            (Role::Driver, "shifts", &[CacheTag::Shifts]),
            (Role::User, "orders", &[CacheTag::Orders]),
        ]);

        assert_eq!(cache.invalidate(Role::Driver, &[CacheTag::Orders]), 1);
        assert!(cache.get(Role::Driver, "orders").is_none());
        assert!(cache.get(Role::Driver, "shifts").is_some());
        assert!(cache.get(Role::User, "orders").is_some());
    }

    #[test]
    fn test_stale_epoch_is_not_written() {
        let mut cache = QueryCache::default();
        let epoch = cache.epoch(Role::Driver);
        cache.invalidate(Role::Driver, &[CacheTag::Orders]);

        assert!(!cache.insert(
            Role::Driver,
            "orders".into(),
            "[]".into(),
            &[CacheTag::Orders],
            epoch
        ));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_forget_drops_whole_role() {
        let mut cache = cache_with(&[
            (Role::Staff, "tickets", &[CacheTag::Tickets]),
            (Role::User, "me", &[CacheTag::UserInfo]),
        ]);
        cache.forget(Role::Staff);
        assert!(cache.get(Role::Staff, "tickets").is_none());
        assert_eq!(cache.len(), 1);
    }
}
