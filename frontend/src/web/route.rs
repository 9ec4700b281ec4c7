//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由，以及按角色认证状态计算重定向的守卫规则。

use std::fmt::Display;
use taxi_shared::Role;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 根路径，总是重定向到信息页
    Home,
    /// 公开的信息页
    #[default]
    Info,
    /// 角色登录页
    Auth(Role),
    /// 角色个人主页
    Account(Role),
    UserPersonal,
    UserOrderManager,
    UserTicketManager,
    DriverPersonal,
    /// 页面未找到
    NotFound,
}

/// 每个角色的认证状态，由会话派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthStatus {
    pub user: bool,
    pub driver: bool,
    pub staff: bool,
}

impl AuthStatus {
    pub fn is_authenticated(&self, role: Role) -> bool {
        match role {
            Role::User => self.user,
            Role::Driver => self.driver,
            Role::Staff => self.staff,
        }
    }
}

/// 守卫对一次渲染请求的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(AppRoute),
    Redirect(AppRoute),
}

impl Resolution {
    /// 最终渲染的路由
    pub fn route(&self) -> AppRoute {
        match self {
            Resolution::Render(route) | Resolution::Redirect(route) => *route,
        }
    }
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["info"] => Self::Info,
            ["auth", role] => Role::from_segment(role).map_or(Self::NotFound, Self::Auth),
            ["account", role] => Role::from_segment(role).map_or(Self::NotFound, Self::Account),
            ["account", "user", "personal"] => Self::UserPersonal,
            ["account", "user", "order"] => Self::UserOrderManager,
            ["account", "user", "ticket"] => Self::UserTicketManager,
            ["account", "driver", "personal"] => Self::DriverPersonal,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Info => "/info".to_string(),
            Self::Auth(role) => format!("/auth/{}", role.as_str()),
            Self::Account(role) => format!("/account/{}", role.as_str()),
            Self::UserPersonal => "/account/user/personal".to_string(),
            Self::UserOrderManager => "/account/user/order".to_string(),
            Self::UserTicketManager => "/account/user/ticket".to_string(),
            Self::DriverPersonal => "/account/driver/personal".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 该路由所属的个人主页族（需要对应角色已认证）
    pub fn account_role(&self) -> Option<Role> {
        match self {
            Self::Account(role) => Some(*role),
            Self::UserPersonal | Self::UserOrderManager | Self::UserTicketManager => {
                Some(Role::User)
            }
            Self::DriverPersonal => Some(Role::Driver),
            Self::Home | Self::Info | Self::Auth(_) | Self::NotFound => None,
        }
    }

    /// **核心守卫逻辑**
    ///
    /// 每个角色独立判断：
    /// - 已认证：登录页重定向到个人主页
    /// - 未认证：个人主页族重定向到登录页
    /// - 根路径与未知路径重定向到信息页
    pub fn resolve(self, status: &AuthStatus) -> Resolution {
        match self {
            Self::Home | Self::NotFound => Resolution::Redirect(Self::Info),
            Self::Auth(role) if status.is_authenticated(role) => {
                Resolution::Redirect(Self::Account(role))
            }
            route => match route.account_role() {
                Some(role) if !status.is_authenticated(role) => {
                    Resolution::Redirect(Self::Auth(role))
                }
                _ => Resolution::Render(route),
            },
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANONYMOUS: AuthStatus = AuthStatus {
        user: false,
        driver: false,
        staff: false,
    };

    #[test]
    fn test_paths_parse_back_to_routes() {
        let routes = [
            AppRoute::Info,
            AppRoute::Auth(Role::User),
            AppRoute::Auth(Role::Driver),
            AppRoute::Auth(Role::Staff),
            AppRoute::Account(Role::User),
            AppRoute::Account(Role::Driver),
            AppRoute::Account(Role::Staff),
            AppRoute::UserPersonal,
            AppRoute::UserOrderManager,
            AppRoute::UserTicketManager,
            AppRoute::DriverPersonal,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_staff_uses_stuff_segment() {
        assert_eq!(AppRoute::Auth(Role::Staff).to_path(), "/auth/stuff");
        assert_eq!(AppRoute::from_path("/auth/staff"), AppRoute::NotFound);
    }

    #[test]
    fn test_trailing_slash_and_query_are_ignored() {
        assert_eq!(
            AppRoute::from_path("/account/driver/"),
            AppRoute::Account(Role::Driver)
        );
        assert_eq!(AppRoute::from_path("/info?from=mail"), AppRoute::Info);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
    }

    #[test]
    fn test_authenticated_driver_leaves_sign_in() {
        let status = AuthStatus {
            driver: true,
            ..ANONYMOUS
        };
        assert_eq!(
            AppRoute::from_path("/auth/driver").resolve(&status),
            Resolution::Redirect(AppRoute::Account(Role::Driver))
        );
        assert_eq!(
            AppRoute::Account(Role::Driver).resolve(&status),
            Resolution::Render(AppRoute::Account(Role::Driver))
        );
    }

    #[test]
    fn test_anonymous_user_is_sent_to_sign_in() {
        for path in [
            "/account/user",
            "/account/user/personal",
            "/account/user/order",
            "/account/user/ticket",
        ] {
            assert_eq!(
                AppRoute::from_path(path).resolve(&ANONYMOUS),
                Resolution::Redirect(AppRoute::Auth(Role::User))
            );
        }
        assert_eq!(
            AppRoute::Auth(Role::User).resolve(&ANONYMOUS),
            Resolution::Render(AppRoute::Auth(Role::User))
        );
    }

    #[test]
    fn test_roles_are_guarded_independently() {
        let status = AuthStatus {
            user: true,
            ..ANONYMOUS
        };
        assert_eq!(
            AppRoute::DriverPersonal.resolve(&status),
            Resolution::Redirect(AppRoute::Auth(Role::Driver))
        );
        assert_eq!(
            AppRoute::Auth(Role::Staff).resolve(&status),
            Resolution::Render(AppRoute::Auth(Role::Staff))
        );
        assert_eq!(
            AppRoute::UserOrderManager.resolve(&status),
            Resolution::Render(AppRoute::UserOrderManager)
        );
    }

    #[test]
    fn test_root_and_unknown_go_to_info() {
        let status = AuthStatus {
            user: true,
            driver: true,
            staff: true,
        };
        for s in [&ANONYMOUS, &status] {
            assert_eq!(
                AppRoute::from_path("/").resolve(s),
                Resolution::Redirect(AppRoute::Info)
            );
            assert_eq!(
                AppRoute::from_path("/nowhere/at/all").resolve(s),
                Resolution::Redirect(AppRoute::Info)
            );
            assert_eq!(AppRoute::Info.resolve(s), Resolution::Render(AppRoute::Info));
        }
    }
}
