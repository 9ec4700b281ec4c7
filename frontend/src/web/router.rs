//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//!
//! 路由状态分为两层：
//! - `requested`：地址栏/导航请求的路由
//! - `resolved`：经守卫计算后实际渲染的路由（`Memo`，随认证状态自动更新）
//!
//! 两者不一致即为重定向，此时用 `replaceState` 同步地址栏。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, AuthStatus, Resolution};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 通过注入认证状态信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 请求的路由
    requested: RwSignal<AppRoute>,
    /// 守卫计算后的路由
    resolved: Memo<AppRoute>,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// # Arguments
    /// * `status` - 各角色认证状态信号，由外部注入实现解耦
    fn new(status: Signal<AuthStatus>) -> Self {
        // 1. 初始化请求路由（从 URL 解析）
        let requested = RwSignal::new(AppRoute::from_path(&current_path()));

        // 2. 守卫：请求路由 + 认证状态 -> 渲染路由
        let resolved = Memo::new(move |_| {
            let route = requested.get();
            match status.with(|status| route.resolve(status)) {
                Resolution::Render(route) => route,
                Resolution::Redirect(target) => {
                    log::info!("[Router] {} -> {}", route, target);
                    target
                }
            }
        });

        Self {
            requested,
            resolved,
        }
    }

    /// 获取当前渲染的路由
    pub fn current_route(&self) -> Memo<AppRoute> {
        self.resolved
    }

    /// 导航到指定路由（pushState）
    pub fn navigate_to(&self, route: AppRoute) {
        push_history_state(&route.to_path());
        self.requested.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let requested = self.requested;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时重新走一遍守卫
            requested.set(AppRoute::from_path(&current_path()));
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 渲染路由变化时同步地址栏
    fn sync_address_bar(&self) {
        let resolved = self.resolved;

        Effect::new(move |_| {
            let path = resolved.get().to_path();
            if current_path().trim_end_matches('/') != path.trim_end_matches('/') {
                replace_history_state(&path);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(status: Signal<AuthStatus>) -> RouterService {
    let router = RouterService::new(status);

    // 初始化监听器
    router.init_popstate_listener();
    router.sync_address_bar();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 各角色认证状态信号
    status: Signal<AuthStatus>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(status);

    children()
}

/// 路由出口组件
///
/// 根据守卫计算后的路由渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时使用 pushState 导航而不是整页刷新
#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to);
    };

    view! {
        <a href=to.to_path() class=class on:click=on_click>
            {children()}
        </a>
    }
}
