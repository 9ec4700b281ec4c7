//! 运行时配置
//!
//! 前端在编译期通过环境变量覆盖默认值（`option_env!`），
//! 构建时未设置则使用下方的默认常量。

// =========================================================
// 默认值 (Defaults)
// =========================================================

/// 后端 API 根地址
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// 创建订单/工单成功后跳回个人主页前的等待时间
pub const DEFAULT_REDIRECT_DELAY_MS: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub redirect_delay_ms: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("TAXI_API_BASE_URL"),
            option_env!("TAXI_REDIRECT_DELAY_MS"),
        )
    }

    fn from_values(api_base_url: Option<&str>, redirect_delay_ms: Option<&str>) -> Self {
        Self {
            api_base_url: api_base_url
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),

            redirect_delay_ms: redirect_delay_ms
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_REDIRECT_DELAY_MS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}
