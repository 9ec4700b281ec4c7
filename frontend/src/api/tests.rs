use super::*;
use crate::auth::{logout, sign_in};
use crate::session::{CredentialStore, MemoryStore, Session};
use crate::web::MockHttpClient;
use crate::web::route::{AppRoute, AuthStatus, Resolution};
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use taxi_shared::protocol::{
    GetActiveShift, GetDriverOrders, GetOrderPrice, GetUserInfo, GetUserOrders, HttpMethod,
    OrderTransition, StartShift,
};
use taxi_shared::{AuthTokens, Credentials, OrderAction, OrderStatus, ServiceCategory};

const BASE: &str = "http://api.test";

// =========================================================
// 测试工具
// =========================================================

#[derive(Default)]
struct TestSessions {
    sessions: RefCell<HashMap<Role, Session>>,
    store: MemoryStore,
}

impl TestSessions {
    fn status(&self) -> AuthStatus {
        AuthStatus {
            user: self.is_authenticated(Role::User),
            driver: self.is_authenticated(Role::Driver),
            staff: self.is_authenticated(Role::Staff),
        }
    }
}

impl SessionService for TestSessions {
    fn access_token(&self, role: Role) -> Option<String> {
        self.sessions
            .borrow()
            .get(&role)
            .and_then(|s| s.access_token().map(str::to_string))
    }

    fn establish(&self, role: Role, tokens: AuthTokens) {
        let session = Session::establish(role, tokens, &self.store);
        self.sessions.borrow_mut().insert(role, session);
    }

    fn clear(&self, role: Role) {
        let session = Session::clear(role, &self.store);
        self.sessions.borrow_mut().insert(role, session);
    }
}

type TestClient = ApiClient<MockHttpClient, TestSessions>;

fn client() -> TestClient {
    ApiClient::new(BASE, MockHttpClient::new(), TestSessions::default())
}

fn signed_in(role: Role, token: &str) -> TestClient {
    let client = client();
    client.sessions().establish(
        role,
        AuthTokens {
            access_token: token.to_string(),
            refresh_token: format!("{}-refresh", token),
        },
    );
    client
}

fn http(client: &TestClient) -> &MockHttpClient {
    &client.inner.http
}

fn order(id: &str, status: &str) -> serde_json::Value {
    json!({ "id": id, "status": status, "price": 500, "city": "Kazan" })
}

// =========================================================
// 登录 (Sign-in)
// =========================================================

#[tokio::test]
async fn test_sign_in_establishes_and_persists_tokens() {
    let client = client();
    http(&client).mock_response(
        HttpMethod::Post,
        "http://api.test/user/auth/sign-in",
        200,
        json!({ "AccessToken": "T1", "RefreshToken": "T2" }),
    );

    let credentials = Credentials {
        email: "a@b.com".into(),
        password: "x".into(),
    };
    sign_in(&client, Role::User, credentials).await.unwrap();

    assert_eq!(client.sessions().access_token(Role::User).as_deref(), Some("T1"));
    let store = &client.sessions().store;
    assert_eq!(store.get("user.access_token").as_deref(), Some("T1"));
    assert_eq!(store.get("user.refresh_token").as_deref(), Some("T2"));

    let sent = http(&client).last_request().unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(sent.body.as_deref().unwrap()).unwrap(),
        json!({ "email": "a@b.com", "password": "x" })
    );
    assert!(sent.header("Authorization").is_none());

    assert_eq!(
        AppRoute::Account(Role::User).resolve(&client.sessions().status()),
        Resolution::Render(AppRoute::Account(Role::User))
    );
}

#[tokio::test]
async fn test_failed_sign_in_clears_existing_session() {
    let client = signed_in(Role::Driver, "OLD");
    http(&client).mock_response(
        HttpMethod::Post,
        "http://api.test/driver/auth/sign-in",
        401,
        json!({ "error": "invalid credentials" }),
    );

    let err = sign_in(&client, Role::Driver, Credentials::default())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!client.sessions().is_authenticated(Role::Driver));
    assert!(client.sessions().store.keys_for(Role::Driver).is_empty());
    assert_eq!(
        AppRoute::Account(Role::Driver).resolve(&client.sessions().status()),
        Resolution::Redirect(AppRoute::Auth(Role::Driver))
    );
}

#[tokio::test]
async fn test_undecodable_sign_in_response_is_a_failure() {
    let client = client();
    http(&client).mock_raw(
        HttpMethod::Post,
        "http://api.test/stuff/auth/sign-in",
        200,
        "<html>gateway</html>",
    );

    let err = sign_in(&client, Role::Staff, Credentials::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!client.sessions().is_authenticated(Role::Staff));
}

#[tokio::test]
async fn test_sign_in_with_blank_token_clears_session() {
    let client = signed_in(Role::Driver, "OLD");
    http(&client).mock_response(
        HttpMethod::Post,
        "http://api.test/driver/auth/sign-in",
        200,
        json!({ "AccessToken": "", "RefreshToken": "R" }),
    );

    let err = sign_in(&client, Role::Driver, Credentials::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!client.sessions().is_authenticated(Role::Driver));
    let store = &client.sessions().store;
    assert!(store.get("driver.access_token").is_none());
    assert!(store.get("driver.refresh_token").is_none());
    assert!(store.keys_for(Role::Driver).is_empty());
    assert_eq!(
        AppRoute::Auth(Role::Driver).resolve(&client.sessions().status()),
        Resolution::Render(AppRoute::Auth(Role::Driver))
    );
}

#[tokio::test]
async fn test_transport_failure_clears_session() {
    let client = signed_in(Role::User, "T1");
    http(&client).fail_with(HttpError::NetworkError("offline".into()));

    let err = sign_in(&client, Role::User, Credentials::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!client.sessions().is_authenticated(Role::User));
}

#[tokio::test]
async fn test_logout_clears_session_and_cache() {
    let client = signed_in(Role::User, "T1");
    http(&client).mock_response(
        HttpMethod::Get,
        "http://api.test/user/api/",
        200,
        json!({ "name": "Anna" }),
    );
    client.query(&GetUserInfo).await.unwrap();

    logout(&client, Role::User);

    assert!(!client.sessions().is_authenticated(Role::User));
    assert_eq!(lock(&client.inner.cache).len(), 0);
}

// =========================================================
// 请求构建 (Request building)
// =========================================================

#[tokio::test]
async fn test_bearer_header_only_for_own_role() {
    let client = signed_in(Role::Driver, "D1");
    http(&client).mock_response(HttpMethod::Get, "http://api.test/driver/api/orders", 200, json!([]));
    http(&client).mock_response(HttpMethod::Get, "http://api.test/user/api/", 200, json!({}));

    client.query(&GetDriverOrders).await.unwrap();
    let sent = http(&client).last_request().unwrap();
    assert_eq!(sent.header("Authorization"), Some("Bearer D1"));
    assert!(sent.body.is_none());

    client.query(&GetUserInfo).await.unwrap();
    let sent = http(&client).last_request().unwrap();
    assert!(sent.header("Authorization").is_none());
}

#[tokio::test]
async fn test_price_query_string_is_encoded() {
    let client = signed_in(Role::User, "U1");
    let request = GetOrderPrice {
        start_trip_street: "Невский проспект".into(),
        start_trip_house: "1".into(),
        destination_street: "Moika".into(),
        destination_house: "12".into(),
        service_category: ServiceCategory::Comfort,
        ..Default::default()
    };
    let url = client.url_for(&request);
    assert!(url.starts_with("http://api.test/user/api/orders/price?start_trip_street="));
    assert!(url.contains("start_trip_house=1&"));
    assert!(url.contains("service_category=comfort"));
    assert!(!url.contains(' '));

    http(&client).mock_response(HttpMethod::Get, &url, 200, json!({ "price": "640" }));
    let quote = client.query(&request).await.unwrap();
    assert_eq!(quote.price.amount(), Some(640.0));
}

#[tokio::test]
async fn test_untagged_query_always_hits_network() {
    let client = signed_in(Role::User, "U1");
    let request = GetOrderPrice {
        start_trip_street: "Moika".into(),
        start_trip_house: "1".into(),
        destination_street: "Sadovaya".into(),
        destination_house: "5".into(),
        ..Default::default()
    };
    let url = client.url_for(&request);
    http(&client).mock_response(HttpMethod::Get, &url, 200, json!({ "price": 300 }));

    client.query(&request).await.unwrap();
    client.query(&request).await.unwrap();

    assert_eq!(http(&client).count(HttpMethod::Get, &url), 2);
    assert!(http(&client).last_request().unwrap().body.is_none());
    assert_eq!(lock(&client.inner.cache).len(), 0);
}

#[tokio::test]
async fn test_unauthorized_is_surfaced_without_retry() {
    let client = signed_in(Role::Driver, "EXPIRED");
    http(&client).mock_response(
        HttpMethod::Get,
        "http://api.test/driver/api/orders",
        401,
        json!({ "error": "token expired" }),
    );

    let err = client.query(&GetDriverOrders).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "token expired".into()
        }
    );
    assert_eq!(http(&client).count(HttpMethod::Get, "http://api.test/driver/api/orders"), 1);
    // 401 不会自动清除会话
    assert!(client.sessions().is_authenticated(Role::Driver));
}

#[tokio::test]
async fn test_null_active_shift_decodes_to_none() {
    let client = signed_in(Role::Driver, "D1");
    http(&client).mock_raw(HttpMethod::Get, "http://api.test/driver/api/shifts/active", 200, "null");
    assert_eq!(client.query(&GetActiveShift).await.unwrap(), None);
}

// =========================================================
// 缓存与失效 (Cache & invalidation)
// =========================================================

#[tokio::test]
async fn test_accept_order_refreshes_cached_orders() {
    let client = signed_in(Role::Driver, "D1");
    let orders_url = "http://api.test/driver/api/orders";
    http(&client).mock_response(HttpMethod::Get, orders_url, 200, json!([order("42", "pending")]));
    http(&client).mock_response(HttpMethod::Get, orders_url, 200, json!([order("42", "accepted")]));
    http(&client).mock_response(
        HttpMethod::Post,
        "http://api.test/driver/api/orders/42/accept",
        200,
        json!({ "message": "Order accepted successfully" }),
    );

    let notified = Arc::new(Mutex::new(Vec::new()));
    let sink = notified.clone();
    client.subscribe(move |role, tags| lock(&sink).push((role, tags.to_vec())));

    let before = client.query(&GetDriverOrders).await.unwrap();
    assert_eq!(before[0].status, OrderStatus::Pending);

    // 命中缓存，不发请求
    client.query(&GetDriverOrders).await.unwrap();
    assert_eq!(http(&client).count(HttpMethod::Get, orders_url), 1);

    let accept = OrderTransition {
        order_id: "42".into(),
        action: OrderAction::Accept,
    };
    client.mutate(&accept).await.unwrap();
    assert_eq!(
        *lock(&notified),
        vec![(Role::Driver, vec![CacheTag::Orders])]
    );

    let after = client.query(&GetDriverOrders).await.unwrap();
    assert_eq!(after[0].status, OrderStatus::Accepted);
    assert_eq!(http(&client).count(HttpMethod::Get, orders_url), 2);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let client = signed_in(Role::Driver, "D1");
    let orders_url = "http://api.test/driver/api/orders";
    http(&client).mock_response(HttpMethod::Get, orders_url, 200, json!([order("7", "accepted")]));
    http(&client).mock_response(
        HttpMethod::Post,
        "http://api.test/driver/api/orders/7/start",
        500,
        json!({ "error": "order not assigned" }),
    );

    client.query(&GetDriverOrders).await.unwrap();
    let start = OrderTransition {
        order_id: "7".into(),
        action: OrderAction::StartTrip,
    };
    let err = client.mutate(&start).await.unwrap_err();
    assert_eq!(err.user_message(), "order not assigned");

    client.query(&GetDriverOrders).await.unwrap();
    assert_eq!(http(&client).count(HttpMethod::Get, orders_url), 1);
}

#[tokio::test]
async fn test_invalidation_is_scoped_to_role() {
    let client = signed_in(Role::User, "U1");
    client.sessions().establish(
        Role::Driver,
        AuthTokens {
            access_token: "D1".into(),
            refresh_token: "R".into(),
        },
    );
    let user_orders = "http://api.test/user/api/orders";
    http(&client).mock_response(HttpMethod::Get, user_orders, 200, json!([]));

    client.query(&GetUserOrders).await.unwrap();
    client.invalidate(Role::Driver, &[CacheTag::Orders]);
    client.query(&GetUserOrders).await.unwrap();

    assert_eq!(http(&client).count(HttpMethod::Get, user_orders), 1);
}

// =========================================================
// 重复提交 (Duplicate submission)
// =========================================================

#[tokio::test]
async fn test_double_start_shift_sends_one_request() {
    let client = signed_in(Role::Driver, "D1");
    let url = "http://api.test/driver/api/shifts/start";
    http(&client).mock_response(
        HttpMethod::Post,
        url,
        200,
        json!({ "shift_id": "s1", "message": "Shift started" }),
    );
    let release = http(&client).hold_next();

    let request = StartShift;
    let first = client.mutate(&request);
    let second = async {
        let result = client.mutate(&request).await;
        let _ = release.send(());
        result
    };
    let (first, second) = futures::join!(first, second);

    assert_eq!(first.unwrap().shift_id, "s1");
    assert_eq!(second.unwrap_err(), ApiError::InFlight);
    assert_eq!(http(&client).count(HttpMethod::Post, url), 1);
    assert!(http(&client).last_request().unwrap().body.is_none());

    // 完成后可以再次发起
    client.mutate(&StartShift).await.unwrap();
    assert_eq!(http(&client).count(HttpMethod::Post, url), 2);
}

#[tokio::test]
async fn test_response_outdated_by_invalidation_is_not_cached() {
    let client = signed_in(Role::Driver, "D1");
    let orders_url = "http://api.test/driver/api/orders";
    http(&client).mock_response(HttpMethod::Get, orders_url, 200, json!([order("1", "pending")]));
    let release = http(&client).hold_next();

    let fetch = client.query(&GetDriverOrders);
    let invalidate = async {
        client.invalidate(Role::Driver, &[CacheTag::Orders]);
        let _ = release.send(());
    };
    let (fetched, ()) = futures::join!(fetch, invalidate);
    fetched.unwrap();

    client.query(&GetDriverOrders).await.unwrap();
    assert_eq!(http(&client).count(HttpMethod::Get, orders_url), 2);
}
