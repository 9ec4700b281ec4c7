use crate::{
    AuthTokens, Car, CreateDriver, CreateOrder, CreateTicket, Credentials, DriverInfo,
    EndShiftResponse, List, MessageResponse, Order, OrderAction, PriceQuote, RegisterRequest, Role,
    ServiceCategory, Shift, StartShiftResponse, Ticket, UpdateDriverInfo, UpdateTicket,
    UpdateUserInfo, UserInfo,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// 缓存标签
///
/// 查询声明自己提供哪些标签，变更声明会让哪些标签失效；
/// 同一角色下标签相交的缓存项会在变更成功后被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheTag {
    UserInfo,
    DriverInfo,
    Orders,
    Cars,
    Shifts,
    Tickets,
    Drivers,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Tags attached to the cached response of a query.
    const PROVIDES: &'static [CacheTag] = &[];
    /// Tags dropped from the cache once this mutation succeeds.
    const INVALIDATES: &'static [CacheTag] = &[];
    /// Whether the serialized request is sent as the JSON body.
    const HAS_BODY: bool = true;

    /// 请求所属角色，决定 API 前缀与携带的令牌
    fn role(&self) -> Role;

    /// 相对于 `/{role}` 的路径
    fn path(&self) -> String;

    /// 查询字符串参数
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// 是否为只读查询
    fn is_query() -> bool {
        matches!(Self::METHOD, HttpMethod::Get)
    }
}

// =========================================================
// 认证 (Auth)
// =========================================================

/// 任一角色登录
#[derive(Debug, Clone, Serialize)]
pub struct SignIn {
    #[serde(skip)]
    pub role: Role,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl ApiRequest for SignIn {
    type Response = AuthTokens;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn role(&self) -> Role {
        self.role
    }

    fn path(&self) -> String {
        "/auth/sign-in".to_string()
    }
}

/// 乘客注册
impl ApiRequest for RegisterRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/auth/sign-up".to_string()
    }
}

// =========================================================
// 乘客 (User)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetUserInfo;

impl ApiRequest for GetUserInfo {
    type Response = UserInfo;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::UserInfo];

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/api/".to_string()
    }
}

impl ApiRequest for UpdateUserInfo {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Patch;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::UserInfo];

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/api/personal/update".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUserOrders;

impl ApiRequest for GetUserOrders {
    type Response = List<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Orders];

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/api/orders".to_string()
    }
}

/// 报价查询，参数全部放在查询字符串中
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetOrderPrice {
    pub start_trip_street: String,
    pub start_trip_house: String,
    pub start_trip_build: String,
    pub destination_street: String,
    pub destination_house: String,
    pub destination_build: String,
    pub service_category: ServiceCategory,
}

impl GetOrderPrice {
    /// 起点与终点的街道、门牌号齐全时才能报价
    pub fn is_complete(&self) -> bool {
        [
            &self.start_trip_street,
            &self.start_trip_house,
            &self.destination_street,
            &self.destination_house,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }
}

impl ApiRequest for GetOrderPrice {
    type Response = PriceQuote;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/api/orders/price".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_trip_street", self.start_trip_street.clone()),
            ("start_trip_house", self.start_trip_house.clone()),
            ("start_trip_build", self.start_trip_build.clone()),
            ("destination_street", self.destination_street.clone()),
            ("destination_house", self.destination_house.clone()),
            ("destination_build", self.destination_build.clone()),
            ("service_category", self.service_category.as_str().to_string()),
        ]
    }
}

impl ApiRequest for CreateOrder {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Orders];

    fn role(&self) -> Role {
        Role::User
    }

    fn path(&self) -> String {
        "/api/orders/create".to_string()
    }
}

// =========================================================
// 工单 (Tickets)
// =========================================================

/// 乘客与司机共用的建单请求
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTicket {
    #[serde(skip)]
    pub role: Role,
    #[serde(flatten)]
    pub ticket: CreateTicket,
}

impl ApiRequest for SubmitTicket {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Tickets];

    fn role(&self) -> Role {
        self.role
    }

    fn path(&self) -> String {
        "/api/tickets/create".to_string()
    }
}

// =========================================================
// 司机 (Driver)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetDriverInfo;

impl ApiRequest for GetDriverInfo {
    type Response = DriverInfo;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::DriverInfo];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/".to_string()
    }
}

impl ApiRequest for UpdateDriverInfo {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Patch;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::DriverInfo];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/update".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetDriverOrders;

impl ApiRequest for GetDriverOrders {
    type Response = List<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Orders];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/orders".to_string()
    }
}

/// 接单 / 开始行程 / 完成订单
#[derive(Debug, Clone, Serialize)]
pub struct OrderTransition {
    #[serde(skip)]
    pub order_id: String,
    #[serde(skip)]
    pub action: OrderAction,
}

impl ApiRequest for OrderTransition {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Orders];
    const HAS_BODY: bool = false;

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        format!("/api/orders/{}/{}", self.order_id, self.action.segment())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCars;

impl ApiRequest for GetCars {
    type Response = List<Car>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Cars];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/cars".to_string()
    }
}

impl ApiRequest for Car {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Cars];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/cars".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetShifts;

impl ApiRequest for GetShifts {
    type Response = List<Shift>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Shifts];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/shifts".to_string()
    }
}

/// 没有进行中的班次时后端返回 `null`
#[derive(Debug, Clone, Serialize)]
pub struct GetActiveShift;

impl ApiRequest for GetActiveShift {
    type Response = Option<Shift>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Shifts];

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/shifts/active".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartShift;

impl ApiRequest for StartShift {
    type Response = StartShiftResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Shifts, CacheTag::Orders];
    const HAS_BODY: bool = false;

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/shifts/start".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EndShift;

impl ApiRequest for EndShift {
    type Response = EndShiftResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Shifts, CacheTag::Orders];
    const HAS_BODY: bool = false;

    fn role(&self) -> Role {
        Role::Driver
    }

    fn path(&self) -> String {
        "/api/shifts/end".to_string()
    }
}

// =========================================================
// 客服 (Staff)
// =========================================================

impl ApiRequest for CreateDriver {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Drivers];

    fn role(&self) -> Role {
        Role::Staff
    }

    fn path(&self) -> String {
        "/manager/driver/create".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetTickets;

impl ApiRequest for GetTickets {
    type Response = List<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: &'static [CacheTag] = &[CacheTag::Tickets];

    fn role(&self) -> Role {
        Role::Staff
    }

    fn path(&self) -> String {
        "/manager/tickets".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveTicket {
    #[serde(skip)]
    pub ticket_id: String,
    #[serde(flatten)]
    pub update: UpdateTicket,
}

impl ApiRequest for ResolveTicket {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Patch;
    const INVALIDATES: &'static [CacheTag] = &[CacheTag::Tickets];

    fn role(&self) -> Role {
        Role::Staff
    }

    fn path(&self) -> String {
        format!("/manager/tickets/{}", self.ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_body_has_only_credentials() {
        let request = SignIn {
            role: Role::Driver,
            credentials: Credentials {
                email: "a@b.com".into(),
                password: "x".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "email": "a@b.com", "password": "x" })
        );
        assert_eq!(request.path(), "/auth/sign-in");
        assert_eq!(request.role(), Role::Driver);
    }

    #[test]
    fn test_order_transition_paths() {
        let request = OrderTransition {
            order_id: "42".into(),
            action: OrderAction::StartTrip,
        };
        assert_eq!(request.path(), "/api/orders/42/start");
        assert!(!OrderTransition::HAS_BODY);
        assert_eq!(OrderTransition::INVALIDATES, &[CacheTag::Orders]);
    }

    #[test]
    fn test_shift_mutations_refresh_orders_too() {
        for tags in [StartShift::INVALIDATES, EndShift::INVALIDATES] {
            assert!(tags.contains(&CacheTag::Shifts));
            assert!(tags.contains(&CacheTag::Orders));
        }
        assert!(GetActiveShift::PROVIDES.contains(&CacheTag::Shifts));
    }

    #[test]
    fn test_queries_and_mutations() {
        assert!(GetDriverOrders::is_query());
        assert!(GetOrderPrice::is_query());
        assert!(!ResolveTicket::is_query());
        assert_eq!(ResolveTicket::METHOD.as_str(), "PATCH");
    }

    #[test]
    fn test_price_query_carries_every_address_field() {
        let request = GetOrderPrice {
            start_trip_street: "Nevsky".into(),
            start_trip_house: "1".into(),
            destination_street: "Moika".into(),
            destination_house: "12".into(),
            service_category: ServiceCategory::Econom,
            ..Default::default()
        };
        assert!(request.is_complete());
        let query = request.query();
        assert_eq!(query.len(), 7);
        assert!(query.contains(&("service_category", "econom".to_string())));
        assert!(query.contains(&("start_trip_build", String::new())));
    }

    #[test]
    fn test_price_query_requires_both_addresses() {
        let request = GetOrderPrice {
            start_trip_street: "Nevsky".into(),
            start_trip_house: "1".into(),
            ..Default::default()
        };
        assert!(!request.is_complete());
    }

    #[test]
    fn test_staff_ticket_update_path() {
        let request = ResolveTicket {
            ticket_id: "t7".into(),
            update: UpdateTicket {
                status: None,
                solution: Some("Возврат средств".into()),
            },
        };
        assert_eq!(request.path(), "/manager/tickets/t7");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "solution": "Возврат средств" })
        );
    }
}
