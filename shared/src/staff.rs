//! 客服侧模型：创建司机、处理工单

use serde::{Deserialize, Serialize};

use crate::DriverLicense;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDriver {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub driver_license: DriverLicense,
}

impl CreateDriver {
    /// (字段名, 展示名, 取值)
    pub fn profile_fields(&self) -> [(&'static str, &'static str, &str); 5] {
        [
            ("name", "Имя", &self.name),
            ("surname", "Фамилия", &self.surname),
            ("email", "Email", &self.email),
            ("password", "Пароль", &self.password),
            ("phone_number", "Телефон", &self.phone_number),
        ]
    }

    /// 按字段名取可写引用，驾照字段使用 `driver_license.` 前缀
    pub fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "surname" => Some(&mut self.surname),
            "email" => Some(&mut self.email),
            "password" => Some(&mut self.password),
            "phone_number" => Some(&mut self.phone_number),
            other => self.driver_license.field_mut(other),
        }
    }
}

/// 对应后端 `sql.NullString` 的序列化形式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullableString {
    #[serde(rename = "String", default)]
    pub value: String,
    #[serde(rename = "Valid", default)]
    pub valid: bool,
}

impl NullableString {
    pub fn get(&self) -> Option<&str> {
        self.valid.then_some(self.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// 新建工单，后端初始状态为 `Created`
    #[serde(alias = "Created", alias = "created")]
    Open,
    InProgress,
    Resolved,
    Closed,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    /// 客服可设置的状态
    pub const SELECTABLE: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Открыт",
            TicketStatus::InProgress => "В работе",
            TicketStatus::Resolved => "Решён",
            TicketStatus::Closed => "Закрыт",
            TicketStatus::Unknown => "Неизвестно",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::SELECTABLE.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(rename = "claiment_driver", default)]
    pub claimant_is_driver: bool,
    #[serde(rename = "stuff_id", default)]
    pub assignee: NullableString,
    pub status: TicketStatus,
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_driver_field_mut_reaches_license() {
        let mut request = CreateDriver::default();
        *request.field_mut("email").unwrap() = "d@taxi.ru".into();
        *request.field_mut("driver_license.series").unwrap() = "7700".into();
        assert_eq!(request.email, "d@taxi.ru");
        assert_eq!(request.driver_license.series, "7700");
        assert!(request.field_mut("unknown").is_none());
    }

    #[test]
    fn test_ticket_from_backend_payload() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"id":"t1","issue":"Оплата","details":"...","order_id":"o1",
                "claiment_driver":true,"stuff_id":{"String":"","Valid":false},
                "status":"Created","solution":""}"#,
        )
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.claimant_is_driver);
        assert_eq!(ticket.assignee.get(), None);
    }

    #[test]
    fn test_update_ticket_serializes_snake_case_status() {
        let update = UpdateTicket {
            status: Some(TicketStatus::InProgress),
            solution: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "status": "in_progress" })
        );
    }
}
