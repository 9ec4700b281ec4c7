//! 表单校验
//!
//! 纯函数，不依赖响应式系统。每个校验器返回按字段名索引的错误表，
//! 错误表非空时页面不会构建请求。

use std::collections::BTreeMap;
use taxi_shared::protocol::GetOrderPrice;
use taxi_shared::{
    Car, CreateDriver, CreateOrder, Credentials, OrderOptions, RegisterRequest, ServiceCategory,
};

pub const REQUIRED: &str = "Обязательное поле";
/// 无字段归属的错误（如“没有修改”）
pub const FORM: &str = "form";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// 值为空白时记录错误
    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<String> {
        self.0.get(field).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 用户修改某字段后清除其错误
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.insert("email", "Введите email");
    } else if !email.contains('@') {
        errors.insert("email", "Некорректный email");
    }
}

// =========================================================
// 登录与注册
// =========================================================

pub fn validate_sign_in(credentials: &Credentials) -> FieldErrors {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, &credentials.email);
    errors.require("password", &credentials.password, "Введите пароль");
    errors
}

pub fn validate_registration(request: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("name", &request.name, "Введите имя");
    errors.require("surname", &request.surname, "Введите фамилию");
    check_email(&mut errors, &request.email);
    errors.require("password", &request.password, "Введите пароль");
    errors
}

// =========================================================
// 订单
// =========================================================

/// 下单表单的草稿
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub city: String,
    pub start_trip_street: String,
    pub start_trip_house: String,
    pub start_trip_build: String,
    pub destination_street: String,
    pub destination_house: String,
    pub destination_build: String,
    pub service_category: ServiceCategory,
    pub options: OrderOptions,
}

impl OrderDraft {
    pub fn price_request(&self) -> GetOrderPrice {
        GetOrderPrice {
            start_trip_street: self.start_trip_street.trim().to_string(),
            start_trip_house: self.start_trip_house.trim().to_string(),
            start_trip_build: self.start_trip_build.trim().to_string(),
            destination_street: self.destination_street.trim().to_string(),
            destination_house: self.destination_house.trim().to_string(),
            destination_build: self.destination_build.trim().to_string(),
            service_category: self.service_category,
        }
    }

    pub fn into_request(self, price: f64) -> CreateOrder {
        CreateOrder {
            city: self.city.trim().to_string(),
            start_trip_street: self.start_trip_street.trim().to_string(),
            start_trip_house: self.start_trip_house.trim().to_string(),
            start_trip_build: self.start_trip_build.trim().to_string(),
            destination_street: self.destination_street.trim().to_string(),
            destination_house: self.destination_house.trim().to_string(),
            destination_build: self.destination_build.trim().to_string(),
            service_category: self.service_category,
            price,
            options: self.options.any().then_some(self.options),
        }
    }
}

pub fn validate_order(draft: &OrderDraft, quote: Option<f64>) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("city", &draft.city, "Укажите город");
    errors.require("start_trip_street", &draft.start_trip_street, "Укажите улицу отправления");
    errors.require("start_trip_house", &draft.start_trip_house, "Укажите дом отправления");
    errors.require("destination_street", &draft.destination_street, "Укажите улицу назначения");
    errors.require("destination_house", &draft.destination_house, "Укажите дом назначения");
    if quote.is_none() {
        errors.insert("price", "Сначала узнайте стоимость поездки");
    }
    errors
}

// =========================================================
// 工单
// =========================================================

pub fn validate_ticket(issue: &str, details: &str, order_id: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("issue", issue, "Укажите тему обращения");
    errors.require("details", details, "Опишите проблему подробнее");
    errors.require("order_id", order_id, "Выберите заказ");
    errors
}

// =========================================================
// 司机与车辆
// =========================================================

pub fn validate_create_driver(request: &CreateDriver) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for (field, _, value) in request.profile_fields() {
        errors.require(field, value, REQUIRED);
    }
    for (field, _, value) in request.driver_license.fields() {
        errors.require(field, value, REQUIRED);
    }
    if !request.email.trim().is_empty() && !request.email.contains('@') {
        errors.insert("email", "Некорректный email");
    }
    errors
}

pub fn validate_car(car: &Car) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("brand", &car.brand, REQUIRED);
    errors.require("model", &car.model, REQUIRED);
    errors.require("year", &car.year, REQUIRED);
    errors.require("color", &car.color, REQUIRED);
    errors.require("license_plate", &car.license_plate, REQUIRED);
    if !car.year.trim().is_empty() && car.year.trim().parse::<u16>().is_err() {
        errors.insert("year", "Год должен быть числом");
    }
    errors
}

/// 资料修改至少要有一个字段发生变化
pub fn validate_has_changes(is_empty: bool) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if is_empty {
        errors.insert(FORM, "Нет изменений для сохранения");
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> OrderDraft {
        OrderDraft {
            city: "Kazan".into(),
            start_trip_street: "Baumana".into(),
            start_trip_house: "5".into(),
            destination_street: "Pushkina".into(),
            destination_house: "10".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sign_in_requires_email_and_password() {
        let errors = validate_sign_in(&Credentials::default());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email").as_deref(), Some("Введите email"));

        let errors = validate_sign_in(&Credentials {
            email: "not-an-email".into(),
            password: "x".into(),
        });
        assert_eq!(errors.get("email").as_deref(), Some("Некорректный email"));
        assert!(errors.get("password").is_none());
    }

    #[test]
    fn test_registration_also_needs_names() {
        let errors = validate_registration(&RegisterRequest {
            email: "a@b.com".into(),
            password: "x".into(),
            ..Default::default()
        });
        assert!(errors.get("name").is_some());
        assert!(errors.get("surname").is_some());
        assert!(errors.get("phone_number").is_none());
    }

    #[test]
    fn test_order_needs_quote() {
        let draft = complete_draft();
        let errors = validate_order(&draft, None);
        assert_eq!(errors.len(), 1);
        assert!(errors.get("price").is_some());
        assert!(validate_order(&draft, Some(350.0)).is_empty());
    }

    #[test]
    fn test_order_reports_each_missing_address_field() {
        let errors = validate_order(&OrderDraft::default(), Some(100.0));
        for field in [
            "city",
            "start_trip_street",
            "start_trip_house",
            "destination_street",
            "destination_house",
        ] {
            assert!(errors.get(field).is_some(), "{} should be required", field);
        }
        assert!(errors.get("start_trip_build").is_none());
    }

    #[test]
    fn test_order_request_drops_unset_options() {
        let request = complete_draft().into_request(350.0);
        assert!(request.options.is_none());

        let mut draft = complete_draft();
        draft.options.pet = true;
        assert_eq!(draft.into_request(350.0).options.map(|o| o.pet), Some(true));
    }

    #[test]
    fn test_ticket_fields_are_required() {
        let errors = validate_ticket(" ", "", "");
        assert_eq!(errors.len(), 3);
        assert!(validate_ticket("Оплата", "Списали дважды", "o1").is_empty());
    }

    #[test]
    fn test_create_driver_requires_license_fields() {
        let mut request = CreateDriver {
            name: "Oleg".into(),
            surname: "Ivanov".into(),
            email: "oleg@taxi.ru".into(),
            password: "secret".into(),
            phone_number: "+79990000000".into(),
            ..Default::default()
        };
        let errors = validate_create_driver(&request);
        assert_eq!(errors.len(), 12);
        assert_eq!(errors.get("driver_license.series").as_deref(), Some(REQUIRED));

        request.driver_license.series = "1234".into();
        assert!(validate_create_driver(&request).get("driver_license.series").is_none());
    }

    #[test]
    fn test_car_year_must_be_numeric() {
        let car = Car {
            brand: "Kia".into(),
            model: "Rio".into(),
            year: "new".into(),
            color: "white".into(),
            license_plate: "A001AA".into(),
            ..Default::default()
        };
        let errors = validate_car(&car);
        assert_eq!(errors.get("year").as_deref(), Some("Год должен быть числом"));
    }

    #[test]
    fn test_unchanged_profile_is_rejected() {
        assert!(validate_has_changes(true).get(FORM).is_some());
        assert!(validate_has_changes(false).is_empty());
    }

    #[test]
    fn test_clear_removes_single_field() {
        let mut errors = validate_ticket("", "", "");
        errors.clear("issue");
        assert!(errors.get("issue").is_none());
        assert_eq!(errors.len(), 2);
    }
}
