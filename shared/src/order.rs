//! 订单领域模型
//!
//! 乘客与司机共用同一订单结构；司机侧通过 `OrderStatus::actions`
//! 决定可执行的状态迁移（接单 → 开始行程 → 完成）。

use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// 服务等级与附加选项
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    #[default]
    Business,
    Comfort,
    Econom,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 3] = [
        ServiceCategory::Business,
        ServiceCategory::Comfort,
        ServiceCategory::Econom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Business => "business",
            ServiceCategory::Comfort => "comfort",
            ServiceCategory::Econom => "econom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Business => "Business",
            ServiceCategory::Comfort => "Comfort",
            ServiceCategory::Econom => "Econom",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderOptions {
    #[serde(default)]
    pub child: bool,
    #[serde(default)]
    pub pet: bool,
}

impl OrderOptions {
    pub fn any(&self) -> bool {
        self.child || self.pet
    }
}

// =========================================================
// 订单状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 新建，等待司机接单（后端也会返回 `Created`）
    #[serde(alias = "Created", alias = "created")]
    Pending,
    #[serde(alias = "Accepted")]
    Accepted,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Cancelled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// 司机对订单可执行的状态迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    Accept,
    StartTrip,
    Complete,
}

impl OrderAction {
    /// 后端路径段：`/orders/{id}/{segment}`
    pub fn segment(&self) -> &'static str {
        match self {
            OrderAction::Accept => "accept",
            OrderAction::StartTrip => "start",
            OrderAction::Complete => "complete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderAction::Accept => "Принять заказ",
            OrderAction::StartTrip => "Начать поездку",
            OrderAction::Complete => "Завершить заказ",
        }
    }

    pub fn pending_label(&self) -> &'static str {
        match self {
            OrderAction::Accept => "Принятие...",
            OrderAction::StartTrip => "Запуск...",
            OrderAction::Complete => "Завершение...",
        }
    }
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Ожидает",
            OrderStatus::Accepted => "Принят",
            OrderStatus::InProgress => "В пути",
            OrderStatus::Completed => "Завершён",
            OrderStatus::Cancelled => "Отменён",
            OrderStatus::Unknown => "Неизвестно",
        }
    }

    /// 当前状态下允许的操作
    pub fn actions(&self) -> &'static [OrderAction] {
        match self {
            OrderStatus::Pending => &[OrderAction::Accept],
            OrderStatus::Accepted => &[OrderAction::StartTrip, OrderAction::Complete],
            OrderStatus::InProgress => &[OrderAction::Complete],
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Unknown => &[],
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "badge badge-warning",
            OrderStatus::Accepted => "badge badge-info",
            OrderStatus::InProgress => "badge badge-secondary",
            OrderStatus::Completed => "badge badge-success",
            OrderStatus::Cancelled => "badge badge-error",
            OrderStatus::Unknown => "badge badge-ghost",
        }
    }
}

// =========================================================
// 订单
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSummary {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub start_trip_street: String,
    #[serde(default)]
    pub start_trip_house: String,
    #[serde(default)]
    pub start_trip_build: String,
    #[serde(default)]
    pub destination_street: String,
    #[serde(default)]
    pub destination_house: String,
    #[serde(default)]
    pub destination_build: String,
    #[serde(default)]
    pub service_category: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub driver_name: Option<String>,
    // 后端该字段没有 json tag，因此键名为 "Car"
    #[serde(default, rename = "Car", alias = "car")]
    pub car: Option<CarSummary>,
    #[serde(default)]
    pub options: Option<OrderOptions>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Order {
    pub fn origin(&self) -> String {
        format_address(
            &self.start_trip_street,
            &self.start_trip_house,
            &self.start_trip_build,
        )
    }

    pub fn destination(&self) -> String {
        format_address(
            &self.destination_street,
            &self.destination_house,
            &self.destination_build,
        )
    }

    /// 工单下拉框中的展示文本
    pub fn display_name(&self) -> String {
        format!("Заказ {} ({})", self.id, self.status.label())
    }
}

fn format_address(street: &str, house: &str, build: &str) -> String {
    if build.trim().is_empty() {
        format!("{}, {}", street, house)
    } else {
        format!("{}, {}, {}", street, house, build)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub city: String,
    pub start_trip_street: String,
    pub start_trip_house: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_trip_build: String,
    pub destination_street: String,
    pub destination_house: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_build: String,
    pub service_category: ServiceCategory,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OrderOptions>,
}

// =========================================================
// 报价
// =========================================================

/// 报价金额，后端可能以字符串或数字返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Number(value) => Some(*value),
            Price::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Price,
}

/// 以卢布格式展示金额，如 `1 250 ₽`
pub fn format_rub(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} ₽", sign, grouped)
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_backend_spellings() {
        let parse = |raw: &str| serde_json::from_str::<OrderStatus>(raw).unwrap();
        assert_eq!(parse("\"pending\""), OrderStatus::Pending);
        assert_eq!(parse("\"Created\""), OrderStatus::Pending);
        assert_eq!(parse("\"in_progress\""), OrderStatus::InProgress);
        assert_eq!(parse("\"something_else\""), OrderStatus::Unknown);
    }

    #[test]
    fn test_actions_follow_trip_lifecycle() {
        assert_eq!(OrderStatus::Pending.actions(), &[OrderAction::Accept]);
        assert_eq!(
            OrderStatus::Accepted.actions(),
            &[OrderAction::StartTrip, OrderAction::Complete]
        );
        assert_eq!(OrderStatus::InProgress.actions(), &[OrderAction::Complete]);
        assert!(OrderStatus::Completed.actions().is_empty());
    }

    #[test]
    fn test_order_reads_car_without_tag() {
        let order: Order = serde_json::from_str(
            r#"{"id":"o1","status":"accepted","price":540,
                "Car":{"brand":"Kia","model":"Rio","number":"A001AA"}}"#,
        )
        .unwrap();
        assert_eq!(order.car.unwrap().brand, "Kia");
        assert_eq!(order.price, 540.0);
    }

    #[test]
    fn test_create_order_omits_empty_optional_fields() {
        let order = CreateOrder {
            city: "Saint-Petersburg".into(),
            start_trip_street: "Nevsky".into(),
            start_trip_house: "1".into(),
            start_trip_build: String::new(),
            destination_street: "Moika".into(),
            destination_house: "12".into(),
            destination_build: String::new(),
            service_category: ServiceCategory::Comfort,
            price: 420.0,
            options: None,
        };
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("start_trip_build").is_none());
        assert!(value.get("options").is_none());
        assert_eq!(value["service_category"], "comfort");
    }

    #[test]
    fn test_price_accepts_string_and_number() {
        let quote: PriceQuote = serde_json::from_str(r#"{"price":"1250"}"#).unwrap();
        assert_eq!(quote.price.amount(), Some(1250.0));
        let quote: PriceQuote = serde_json::from_str(r#"{"price":99.5}"#).unwrap();
        assert_eq!(quote.price.amount(), Some(99.5));
    }

    #[test]
    fn test_format_rub_groups_thousands() {
        assert_eq!(format_rub(1250.0), "1 250 ₽");
        assert_eq!(format_rub(999.4), "999 ₽");
        assert_eq!(format_rub(1234567.0), "1 234 567 ₽");
    }
}
