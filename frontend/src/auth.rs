//! 认证模块
//!
//! 管理三个角色的会话状态，与路由系统解耦。
//! 路由服务通过注入的 `Signal<AuthStatus>` 检查认证状态。

use crate::api::{ApiClient, ApiError};
use crate::session::{Session, SessionService};
use crate::web::route::AuthStatus;
use crate::web::{HttpClient, LocalStorage};
use leptos::prelude::*;
use taxi_shared::protocol::SignIn;
use taxi_shared::{AuthTokens, Credentials, Role};

/// 认证上下文
///
/// 每个角色一个会话信号，通过 Context 在组件间共享。
/// 建立与清除会话都是对整个 `Session` 的一次写入，
/// 读取方不会看到只更新了一半的状态。
#[derive(Clone, Copy)]
pub struct AuthContext {
    user: RwSignal<Session>,
    driver: RwSignal<Session>,
    staff: RwSignal<Session>,
}

impl AuthContext {
    /// 启动时从 LocalStorage 恢复三个角色的会话
    ///
    /// 这是应用中唯一一次读取持久化凭据的地方。
    pub fn restore() -> Self {
        let store = LocalStorage;
        Self {
            user: RwSignal::new(Session::restore(Role::User, &store)),
            driver: RwSignal::new(Session::restore(Role::Driver, &store)),
            staff: RwSignal::new(Session::restore(Role::Staff, &store)),
        }
    }

    fn session(&self, role: Role) -> RwSignal<Session> {
        match role {
            Role::User => self.user,
            Role::Driver => self.driver,
            Role::Staff => self.staff,
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn status_signal(&self) -> Signal<AuthStatus> {
        let ctx = *self;
        Signal::derive(move || AuthStatus {
            user: ctx.user.with(Session::is_authenticated),
            driver: ctx.driver.with(Session::is_authenticated),
            staff: ctx.staff.with(Session::is_authenticated),
        })
    }
}

impl SessionService for AuthContext {
    fn access_token(&self, role: Role) -> Option<String> {
        self.session(role)
            .with_untracked(|session| session.access_token().map(str::to_string))
    }

    fn establish(&self, role: Role, tokens: AuthTokens) {
        self.session(role)
            .set(Session::establish(role, tokens, &LocalStorage));
    }

    fn clear(&self, role: Role) {
        self.session(role).set(Session::clear(role, &LocalStorage));
    }
}

/// 登录
///
/// 成功时建立会话；任何失败（网络、非 2xx、响应无法解析）都会清除该角色的会话。
/// 导航由路由服务根据认证状态自动处理。
pub async fn sign_in<C, S>(
    api: &ApiClient<C, S>,
    role: Role,
    credentials: Credentials,
) -> Result<(), ApiError>
where
    C: HttpClient,
    S: SessionService,
{
    let request = SignIn { role, credentials };
    let result = api.mutate(&request).await.and_then(|tokens| {
        // 2xx 但令牌为空同样视为失败，避免留下半个会话
        if tokens.access_token.trim().is_empty() || tokens.refresh_token.trim().is_empty() {
            Err(ApiError::Decode("登录响应缺少令牌".to_string()))
        } else {
            Ok(tokens)
        }
    });
    match result {
        Ok(tokens) => {
            api.forget(role);
            api.sessions().establish(role, tokens);
            Ok(())
        }
        // 重复提交：前一次登录仍在进行，不影响会话
        Err(ApiError::InFlight) => Err(ApiError::InFlight),
        Err(e) => {
            log::warn!("[Auth] {} sign-in failed: {}", role, e);
            logout(api, role);
            Err(e)
        }
    }
}

/// 注销并清除状态
///
/// 不需要手动导航，路由服务会监听认证状态变化并自动重定向。
pub fn logout<C, S>(api: &ApiClient<C, S>, role: Role)
where
    C: HttpClient,
    S: SessionService,
{
    api.sessions().clear(role);
    api.forget(role);
}
