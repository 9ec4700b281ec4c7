use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Deref;

pub mod date;
pub mod driver;
pub mod order;
pub mod protocol;
pub mod staff;
pub mod user;

pub use driver::*;
pub use order::*;
pub use staff::*;
pub use user::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// =========================================================
// 角色 (Role)
// =========================================================

/// 用户角色
///
/// 三个角色的会话、存储键、API 前缀互相独立。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 乘客
    User,
    /// 司机
    Driver,
    /// 客服/调度人员（后端契约中的路径段为 `stuff`）
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Driver, Role::Staff];

    /// 路径段，同时用于后端 API 前缀、前端路由与存储键
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Driver => "driver",
            Role::Staff => "stuff",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == segment)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::User => "Пассажир",
            Role::Driver => "Водитель",
            Role::Staff => "Сотрудник",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

/// 登录成功后后端返回的令牌对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "RefreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// 通用确认响应
///
/// 后端在不同接口中返回 `{"message": ..}`、`{"status": "ok"}` 或
/// `{"success": .., "message": ..}`，统一用一个宽松结构接收。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub success: Option<bool>,
}

// =========================================================
// 列表包装 (List)
// =========================================================

/// 列表响应
///
/// 后端在没有数据时会返回 `null` 而不是 `[]`，这里统一视为空列表。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct List<T>(pub Vec<T>);

impl<T> Default for List<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for List<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Vec<T>>::deserialize(deserializer).map(|items| Self(items.unwrap_or_default()))
    }
}

impl<T> Deref for List<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 修改表单时使用：新值与旧值不同才返回 `Some`
pub fn changed(before: &str, after: &str) -> Option<String> {
    let after = after.trim();
    (after != before.trim()).then(|| after.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_segments_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_segment(role.as_str()), Some(role));
        }
        assert_eq!(Role::Staff.as_str(), "stuff");
        assert_eq!(Role::from_segment("staff"), None);
    }

    #[test]
    fn test_auth_tokens_use_backend_field_names() {
        let tokens: AuthTokens =
            serde_json::from_str(r#"{"AccessToken":"T1","RefreshToken":"T2"}"#).unwrap();
        assert_eq!(tokens.access_token, "T1");
        assert_eq!(tokens.refresh_token, "T2");
    }

    #[test]
    fn test_list_accepts_null() {
        let list: List<u32> = serde_json::from_str("null").unwrap();
        assert!(list.is_empty());

        let list: List<u32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(list.0, vec![1, 2]);
    }

    #[test]
    fn test_message_response_accepts_status_only() {
        let ack: MessageResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(ack.status, "ok");
        assert!(ack.message.is_empty());
    }

    #[test]
    fn test_changed_ignores_whitespace_only_edits() {
        assert_eq!(changed("Ivan", " Ivan "), None);
        assert_eq!(changed("Ivan", "Petr"), Some("Petr".to_string()));
    }
}
