//! 乘客侧模型

use serde::{Deserialize, Serialize};

use crate::changed;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

impl UserInfo {
    pub fn full_name(&self) -> String {
        [&self.surname, &self.name, &self.lastname]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 部分更新请求，仅序列化发生变化的字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl UpdateUserInfo {
    /// 比较原始资料与编辑后的资料，生成最小更新
    ///
    /// 邮箱不可修改，因此不参与比较。
    pub fn diff(before: &UserInfo, after: &UserInfo) -> Self {
        Self {
            name: changed(&before.name, &after.name),
            surname: changed(&before.surname, &after.surname),
            lastname: changed(&before.lastname, &after.lastname),
            country: changed(&before.country, &after.country),
            city: changed(&before.city, &after.city),
            date_of_birth: changed(&before.date_of_birth, &after.date_of_birth),
            phone_number: changed(&before.phone_number, &after.phone_number),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 乘客/司机提交的工单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTicket {
    pub issue: String,
    pub details: String,
    pub order_id: String,
    pub status: String,
    pub solution: String,
}

impl CreateTicket {
    /// 新工单的初始状态
    pub const INITIAL_STATUS: &'static str = "Created";

    pub fn new(issue: String, details: String, order_id: String) -> Self {
        Self {
            issue,
            details,
            order_id,
            status: Self::INITIAL_STATUS.to_string(),
            solution: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_only_contains_changes() {
        let before = UserInfo {
            name: "Ivan".into(),
            surname: "Petrov".into(),
            city: "Moscow".into(),
            ..Default::default()
        };
        let after = UserInfo {
            city: "Saint-Petersburg".into(),
            ..before.clone()
        };

        let update = UpdateUserInfo::diff(&before, &after);
        assert_eq!(update.city.as_deref(), Some("Saint-Petersburg"));
        assert!(update.name.is_none());

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Saint-Petersburg" }));
    }

    #[test]
    fn test_diff_of_identical_profiles_is_empty() {
        let info = UserInfo {
            name: "Anna".into(),
            ..Default::default()
        };
        assert!(UpdateUserInfo::diff(&info, &info).is_empty());
    }

    #[test]
    fn test_full_name_skips_blank_parts() {
        let info = UserInfo {
            name: "Anna".into(),
            surname: "Ivanova".into(),
            ..Default::default()
        };
        assert_eq!(info.full_name(), "Ivanova Anna");
    }
}
