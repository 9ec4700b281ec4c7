//! API 客户端层
//!
//! 每个请求类型通过 `ApiRequest` 声明角色、路径、方法与缓存标签，
//! `ApiClient` 负责：
//! - 按角色拼接 URL 并附加 Bearer 令牌
//! - 查询结果按 (角色, URL) 缓存，并打上 `PROVIDES` 标签
//! - 变更成功后让同角色下 `INVALIDATES` 标签相交的缓存失效，并通知订阅者
//! - 同一变更在完成前不会被重复发出

mod cache;
mod lifecycle;
#[cfg(test)]
mod tests;

pub use lifecycle::{InFlight, ScreenScope, use_screen_scope};

use crate::auth::AuthContext;
use crate::session::SessionService;
use crate::web::{FetchHttpClient, HttpClient, HttpError, HttpRequest};
use cache::QueryCache;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taxi_shared::protocol::{ApiRequest, CacheTag};
use taxi_shared::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, Role};
use thiserror::Error;

/// 浏览器中使用的客户端
pub type AppApi = ApiClient<FetchHttpClient, AuthContext>;

// =========================================================
// 错误类型 (Errors)
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("请求编码失败: {0}")]
    Encode(String),
    #[error("响应解析失败: {0}")]
    Decode(String),
    #[error("相同的请求正在处理中")]
    InFlight,
}

impl ApiError {
    #[cfg(test)]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// 展示给用户的提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => {
                "Не удалось связаться с сервером. Проверьте подключение.".to_string()
            }
            ApiError::Status { status: 401, .. } => {
                "Сессия истекла или доступ запрещён. Войдите снова.".to_string()
            }
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Status { status, .. } => format!("Ошибка сервера ({})", status),
            ApiError::Encode(_) => "Не удалось сформировать запрос".to_string(),
            ApiError::Decode(_) => "Сервер вернул некорректный ответ".to_string(),
            ApiError::InFlight => "Запрос уже выполняется".to_string(),
        }
    }
}

/// 后端错误响应体：`{"error": ".."}` 或 `{"message": ".."}`
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.or(parsed.message).unwrap_or_default(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =========================================================
// 客户端 (ApiClient)
// =========================================================

type Listener = Box<dyn Fn(Role, &[CacheTag]) + Send + Sync>;

struct Inner<C, S> {
    base_url: String,
    http: C,
    sessions: S,
    cache: Mutex<QueryCache>,
    in_flight: InFlight,
    listeners: Mutex<Vec<Listener>>,
}

pub struct ApiClient<C, S> {
    inner: Arc<Inner<C, S>>,
}

impl<C, S> Clone for ApiClient<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: HttpClient, S: SessionService> ApiClient<C, S> {
    pub fn new(base_url: &str, http: C, sessions: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                base_url: base_url.trim_end_matches('/').to_string(),
                http,
                sessions,
                cache: Mutex::new(QueryCache::default()),
                in_flight: InFlight::default(),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn sessions(&self) -> &S {
        &self.inner.sessions
    }

    /// 完整请求 URL：`{base}/{role}{path}[?query]`
    pub fn url_for<R: ApiRequest>(&self, request: &R) -> String {
        let mut url = format!(
            "{}/{}{}",
            self.inner.base_url,
            request.role().as_str(),
            request.path()
        );
        let query = request.query();
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    fn build<R: ApiRequest>(&self, request: &R) -> Result<HttpRequest, ApiError> {
        let mut http_request = HttpRequest::new(&self.url_for(request), R::METHOD);

        if let Some(token) = self.inner.sessions.access_token(request.role()) {
            http_request =
                http_request.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        if R::HAS_BODY && !R::is_query() {
            let body = serde_json::to_string(request).map_err(|e| ApiError::Encode(e.to_string()))?;
            http_request = http_request
                .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
                .with_body(body);
        }

        Ok(http_request)
    }

    /// 发送请求，2xx 返回原始响应体
    async fn execute(&self, request: HttpRequest) -> Result<String, ApiError> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.inner.http.send(request).await.map_err(|e| {
            log::warn!("[Api] {} {} failed: {}", method.as_str(), url, e);
            ApiError::from(e)
        })?;

        if !response.ok() {
            let error = ApiError::Status {
                status: response.status,
                message: error_message(&response.body),
            };
            log::warn!("[Api] {} {} -> {}", method.as_str(), url, error);
            return Err(error);
        }

        log::debug!("[Api] {} {} -> {}", method.as_str(), url, response.status);
        Ok(response.body)
    }

    /// 只读查询，带 `PROVIDES` 标签的结果会被缓存
    pub async fn query<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let role = request.role();
        let http_request = self.build(request)?;
        let key = http_request.url.clone();
        let cacheable = R::is_query() && !R::PROVIDES.is_empty();

        let epoch = {
            let cache = lock(&self.inner.cache);
            if cacheable {
                if let Some(body) = cache.get(role, &key) {
                    return decode(body);
                }
            }
            cache.epoch(role)
        };

        let body = self.execute(http_request).await?;
        let value = decode(&body)?;

        if cacheable && !lock(&self.inner.cache).insert(role, key, body, R::PROVIDES, epoch) {
            log::debug!("[Api] response outdated by invalidation, not cached");
        }
        Ok(value)
    }

    /// 变更请求
    ///
    /// 相同的请求（方法、URL、请求体一致）在完成前再次调用会直接返回
    /// `ApiError::InFlight`，不会发出网络请求。
    pub async fn mutate<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let role = request.role();
        let http_request = self.build(request)?;
        let key = format!(
            "{} {} {}",
            http_request.method.as_str(),
            http_request.url,
            http_request.body.as_deref().unwrap_or_default()
        );

        let Some(_ticket) = self.inner.in_flight.try_begin(key) else {
            log::debug!("[Api] duplicate {} ignored", http_request.url);
            return Err(ApiError::InFlight);
        };

        let body = self.execute(http_request).await?;

        if !R::INVALIDATES.is_empty() {
            self.invalidate(role, R::INVALIDATES);
        }

        decode(&body)
    }

    /// 让缓存失效并通知订阅者
    pub fn invalidate(&self, role: Role, tags: &[CacheTag]) {
        let dropped = lock(&self.inner.cache).invalidate(role, tags);
        log::info!("[Api] invalidated {:?} for {} ({} entries)", tags, role, dropped);

        for listener in lock(&self.inner.listeners).iter() {
            listener(role, tags);
        }
    }

    /// 清空该角色的全部缓存（登录、注销时）
    pub fn forget(&self, role: Role) {
        lock(&self.inner.cache).forget(role);
    }

    /// 订阅失效通知
    pub fn subscribe(&self, listener: impl Fn(Role, &[CacheTag]) + Send + Sync + 'static) {
        lock(&self.inner.listeners).push(Box::new(listener));
    }
}
