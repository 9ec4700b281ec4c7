//! 出租车调度前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 会话与持久化（纯逻辑）
//! - `auth`: 三个角色的会话上下文、登录与注销
//! - `api`: 带标签缓存的 API 客户端
//! - `query`: 查询的响应式封装
//! - `web::route` / `web::router`: 路由定义与守卫
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod query;
mod session;
mod components {
    pub mod driver;
    pub mod forms;
    pub mod info;
    pub mod login;
    pub mod rider;
    pub mod staff;
    pub mod support;
    pub mod ui;
}

use crate::api::ApiClient;
use crate::auth::AuthContext;
use crate::components::driver::{DriverAccountPage, DriverPersonalPage};
use crate::components::info::InfoPage;
use crate::components::login::AuthPage;
use crate::components::rider::{
    OrderManagerPage, TicketManagerPage, UserAccountPage, UserPersonalPage,
};
use crate::components::staff::StaffAccountPage;
use crate::config::AppConfig;
use crate::query::provide_query_client;

use leptos::prelude::*;
use taxi_shared::Role;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    #[cfg(test)]
    pub use http::MockHttpClient;
    pub use http::{FetchHttpClient, HttpClient, HttpError, HttpRequest};
    pub use storage::LocalStorage;
    pub use timer::Timeout;
}

use web::FetchHttpClient;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据守卫计算后的 AppRoute 返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Auth(role) => view! { <AuthPage role=role /> }.into_any(),
        AppRoute::Account(Role::User) => view! { <UserAccountPage /> }.into_any(),
        AppRoute::Account(Role::Driver) => view! { <DriverAccountPage /> }.into_any(),
        AppRoute::Account(Role::Staff) => view! { <StaffAccountPage /> }.into_any(),
        AppRoute::UserPersonal => view! { <UserPersonalPage /> }.into_any(),
        AppRoute::UserOrderManager => view! { <OrderManagerPage /> }.into_any(),
        AppRoute::UserTicketManager => view! { <TicketManagerPage /> }.into_any(),
        AppRoute::DriverPersonal => view! { <DriverPersonalPage /> }.into_any(),
        // 守卫会把根路径与未知路径重定向到信息页
        AppRoute::Home | AppRoute::Info | AppRoute::NotFound => view! { <InfoPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 读取配置
    let config = AppConfig::from_env();
    log::info!("[App] API base: {}", config.api_base_url);

    // 2. 从 LocalStorage 恢复三个角色的会话
    let auth_ctx = AuthContext::restore();

    // 3. API 客户端与查询上下文
    let api = ApiClient::new(&config.api_base_url, FetchHttpClient, auth_ctx);
    provide_context(api.clone());
    provide_query_client(&api);
    provide_context(config);

    // 4. 获取认证状态信号，用于注入路由服务（解耦！）
    let status = auth_ctx.status_signal();

    view! {
        // 5. 路由器组件：注入认证信号实现守卫
        <Router status=status>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
