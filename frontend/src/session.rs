//! 会话模型
//!
//! 纯逻辑层，不依赖 DOM 与响应式系统：
//! - `Session`：单个角色的令牌对，认证标志由访问令牌派生
//! - `CredentialStore`：持久化边界（浏览器 LocalStorage / 测试内存存储）
//!
//! 只有 `Session::establish` 与 `Session::clear` 会写入存储，
//! 只有 `Session::restore` 会读取存储。

use serde::{Deserialize, Serialize};
use taxi_shared::{AuthTokens, Role};

// =========================================================
// 存储边界 (Credential Store)
// =========================================================

/// 持久化键值存储
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

/// 乘客会话的 JSON 快照键
const USER_SNAPSHOT_KEY: &str = "persist:user";

fn access_key(role: Role) -> String {
    format!("{}.access_token", role.as_str())
}

fn refresh_key(role: Role) -> String {
    format!("{}.refresh_token", role.as_str())
}

/// 空白字符串视为不存在
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionSnapshot {
    #[serde(rename = "AccessToken", default)]
    access_token: Option<String>,
    #[serde(rename = "RefreshToken", default)]
    refresh_token: Option<String>,
}

// =========================================================
// 会话服务 (Session Service)
// =========================================================

/// API 客户端与登录流程访问会话的接口
///
/// 浏览器中由 `AuthContext` 实现（响应式信号 + LocalStorage）。
pub trait SessionService {
    fn access_token(&self, role: Role) -> Option<String>;
    fn establish(&self, role: Role, tokens: AuthTokens);
    fn clear(&self, role: Role);

    fn is_authenticated(&self, role: Role) -> bool {
        self.access_token(role).is_some()
    }
}

// =========================================================
// 会话 (Session)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    /// 匿名会话
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 启动时从存储中恢复会话
    ///
    /// 乘客角色在独立键缺失时回退到 `persist:user` 快照。
    pub fn restore(role: Role, store: &impl CredentialStore) -> Self {
        let mut access_token = non_blank(store.get(&access_key(role)));
        let mut refresh_token = non_blank(store.get(&refresh_key(role)));

        if access_token.is_none() && role == Role::User {
            let snapshot = store
                .get(USER_SNAPSHOT_KEY)
                .and_then(|raw| serde_json::from_str::<SessionSnapshot>(&raw).ok());
            if let Some(snapshot) = snapshot {
                access_token = non_blank(snapshot.access_token);
                refresh_token = refresh_token.or(non_blank(snapshot.refresh_token));
            }
        }

        if access_token.is_none() {
            return Self::anonymous();
        }

        log::debug!("[Session] restored {} session", role);
        Self {
            access_token,
            refresh_token,
        }
    }

    /// 登录成功：保存令牌并写入存储
    pub fn establish(role: Role, tokens: AuthTokens, store: &impl CredentialStore) -> Self {
        let session = Self {
            access_token: non_blank(Some(tokens.access_token)),
            refresh_token: non_blank(Some(tokens.refresh_token)),
        };
        session.persist(role, store);
        log::info!("[Session] {} signed in", role);
        session
    }

    /// 注销或登录失败：丢弃令牌并清除存储，可重复调用
    pub fn clear(role: Role, store: &impl CredentialStore) -> Self {
        store.delete(&access_key(role));
        store.delete(&refresh_key(role));
        if role == Role::User {
            store.delete(USER_SNAPSHOT_KEY);
        }
        log::info!("[Session] {} session cleared", role);
        Self::anonymous()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    fn persist(&self, role: Role, store: &impl CredentialStore) {
        let writes = [
            (access_key(role), self.access_token.as_deref()),
            (refresh_key(role), self.refresh_token.as_deref()),
        ];
        for (key, value) in writes {
            let ok = match value {
                Some(value) => store.set(&key, value),
                None => store.delete(&key),
            };
            if !ok {
                log::warn!("[Session] failed to persist {}", key);
            }
        }

        if role == Role::User {
            let snapshot = SessionSnapshot {
                access_token: self.access_token.clone(),
                refresh_token: self.refresh_token.clone(),
            };
            match serde_json::to_string(&snapshot) {
                Ok(raw) => {
                    store.set(USER_SNAPSHOT_KEY, &raw);
                }
                Err(e) => log::warn!("[Session] failed to encode snapshot: {}", e),
            }
        }
    }
}

// =========================================================
// 测试工具: MemoryStore
// =========================================================

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    pub entries: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }

    pub fn keys_for(&self, role: Role) -> Vec<String> {
        let prefix = format!("{}.", role.as_str());
        let mut keys: Vec<_> = self
            .entries
            .borrow()
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str, refresh: &str) -> AuthTokens {
        AuthTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[test]
    fn test_establish_authenticates_with_exact_tokens() {
        let store = MemoryStore::default();
        let session = Session::establish(Role::Driver, tokens("A", "B"), &store);

        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("A"));
        assert_eq!(session.refresh_token(), Some("B"));
        assert_eq!(store.get("driver.access_token").as_deref(), Some("A"));
        assert_eq!(store.get("driver.refresh_token").as_deref(), Some("B"));
    }

    #[test]
    fn test_clear_after_establish_leaves_nothing() {
        let store = MemoryStore::default();
        Session::establish(Role::User, tokens("A", "B"), &store);
        let session = Session::clear(Role::User, &store);

        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert!(store.keys_for(Role::User).is_empty());
        assert!(store.get(USER_SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = MemoryStore::default();
        let first = Session::clear(Role::Staff, &store);
        let second = Session::clear(Role::Staff, &store);
        assert_eq!(first, second);
    }

    #[test]
    fn test_roles_do_not_share_tokens() {
        let store = MemoryStore::default();
        Session::establish(Role::Staff, tokens("S", "R"), &store);
        Session::clear(Role::Driver, &store);

        assert!(Session::restore(Role::Staff, &store).is_authenticated());
        assert!(!Session::restore(Role::Driver, &store).is_authenticated());
        assert!(!Session::restore(Role::User, &store).is_authenticated());
    }

    #[test]
    fn test_restore_reads_persisted_token() {
        let store = MemoryStore::with(&[("user.access_token", "T1"), ("user.refresh_token", "T2")]);
        let session = Session::restore(Role::User, &store);
        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("T1"));
    }

    #[test]
    fn test_restore_falls_back_to_user_snapshot() {
        let store = MemoryStore::with(&[(
            "persist:user",
            r#"{"AccessToken":"T1","RefreshToken":"T2"}"#,
        )]);
        let session = Session::restore(Role::User, &store);
        assert_eq!(session.access_token(), Some("T1"));
        assert_eq!(session.refresh_token(), Some("T2"));

        // 快照只属于乘客
        let store = MemoryStore::with(&[("persist:user", r#"{"AccessToken":"T1"}"#)]);
        assert!(!Session::restore(Role::Driver, &store).is_authenticated());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let store = MemoryStore::with(&[
            ("driver.access_token", "   "),
            ("driver.refresh_token", "R"),
            ("persist:user", r#"{"AccessToken":""}"#),
        ]);
        assert_eq!(Session::restore(Role::Driver, &store), Session::anonymous());
        assert_eq!(Session::restore(Role::User, &store), Session::anonymous());
    }

    #[test]
    fn test_corrupt_snapshot_is_ignored() {
        let store = MemoryStore::with(&[("persist:user", "{not json")]);
        assert!(!Session::restore(Role::User, &store).is_authenticated());
    }
}
