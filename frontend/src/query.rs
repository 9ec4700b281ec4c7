//! 查询的响应式封装
//!
//! `QueryClient` 为每个 (角色, 标签) 维护一个版本号。`ApiClient` 的失效通知
//! 会推进对应版本号，`use_query` 创建的资源在请求闭包中读取版本号，
//! 因此变更成功后已挂载的页面会自动重新获取数据。

use crate::api::{ApiError, AppApi};
use leptos::prelude::*;
use std::collections::HashMap;
use taxi_shared::Role;
use taxi_shared::protocol::{ApiRequest, CacheTag};

#[derive(Clone, Copy)]
pub struct QueryClient {
    versions: RwSignal<HashMap<(Role, CacheTag), u64>>,
}

impl QueryClient {
    fn new() -> Self {
        Self {
            versions: RwSignal::new(HashMap::new()),
        }
    }

    /// 读取并追踪标签版本
    pub fn version(&self, role: Role, tags: &[CacheTag]) -> u64 {
        self.versions.with(|versions| {
            tags.iter()
                .map(|tag| versions.get(&(role, *tag)).copied().unwrap_or(0))
                .sum()
        })
    }

    fn bump(&self, role: Role, tags: &[CacheTag]) {
        let bumped = self.versions.try_update(|versions| {
            for tag in tags {
                *versions.entry((role, *tag)).or_default() += 1;
            }
        });
        if bumped.is_none() {
            log::debug!("[Query] client disposed, skipping refresh");
        }
    }
}

/// 创建 `QueryClient`，订阅 API 的失效通知并提供到 Context
pub fn provide_query_client(api: &AppApi) -> QueryClient {
    let client = QueryClient::new();
    api.subscribe(move |role, tags| client.bump(role, tags));
    provide_context(client);
    client
}

pub fn use_api() -> AppApi {
    use_context::<AppApi>().expect("AppApi should be provided")
}

pub fn use_query_client() -> QueryClient {
    use_context::<QueryClient>().expect("QueryClient should be provided")
}

/// 查询结果
pub type Query<R> = LocalResource<Result<<R as ApiRequest>::Response, ApiError>>;

/// 创建一个随标签失效自动刷新的查询资源
///
/// `request` 中读取的信号同样会被追踪，参数变化时重新请求。
pub fn use_query<R, F>(request: F) -> Query<R>
where
    R: ApiRequest + 'static,
    R::Response: Clone + 'static,
    F: Fn() -> R + 'static,
{
    let api = use_api();
    let queries = use_query_client();

    LocalResource::new(move || {
        let request = request();
        queries.version(request.role(), R::PROVIDES);
        let api = api.clone();
        async move { api.query(&request).await }
    })
}
