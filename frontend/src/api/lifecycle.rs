//! 请求生命周期工具
//!
//! - `InFlight`：同一操作在完成前不会被再次发出
//! - `ScreenScope`：页面卸载后丢弃迟到的异步结果

use leptos::prelude::on_cleanup;
use leptos::task::spawn_local;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::lock;

// =========================================================
// 重复提交闸门 (InFlight)
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// 持有期间该键被占用，drop 时释放
#[derive(Debug)]
pub struct InFlightTicket {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    /// 占用 `key`，已被占用时返回 `None`
    pub fn try_begin(&self, key: impl Into<String>) -> Option<InFlightTicket> {
        let key = key.into();
        if !lock(&self.keys).insert(key.clone()) {
            return None;
        }
        Some(InFlightTicket {
            keys: self.keys.clone(),
            key,
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, key: &str) -> bool {
        lock(&self.keys).contains(key)
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        lock(&self.keys).remove(&self.key);
    }
}

// =========================================================
// 页面存活令牌 (ScreenScope)
// =========================================================

#[derive(Debug, Clone)]
pub struct ScreenScope {
    alive: Arc<AtomicBool>,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// 执行异步任务，页面仍存活时才把结果交给 `apply`
    pub fn spawn<T, Fut, F>(&self, task: Fut, apply: F)
    where
        T: 'static,
        Fut: Future<Output = T> + 'static,
        F: FnOnce(T) + 'static,
    {
        let scope = self.clone();
        spawn_local(async move {
            let output = task.await;
            if scope.is_alive() {
                apply(output);
            } else {
                log::debug!("[Scope] screen gone, dropping late result");
            }
        });
    }
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

/// 创建与当前组件生命周期绑定的 `ScreenScope`
pub fn use_screen_scope() -> ScreenScope {
    let scope = ScreenScope::new();
    let on_unmount = scope.clone();
    on_cleanup(move || on_unmount.close());
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected_until_release() {
        let gate = InFlight::default();
        let ticket = gate.try_begin("POST /driver/api/shifts/start");
        assert!(ticket.is_some());
        assert!(gate.try_begin("POST /driver/api/shifts/start").is_none());
        assert!(gate.is_busy("POST /driver/api/shifts/start"));

        drop(ticket);
        assert!(!gate.is_busy("POST /driver/api/shifts/start"));
        assert!(gate.try_begin("POST /driver/api/shifts/start").is_some());
    }

    #[test]
    fn test_different_keys_do_not_block() {
        let gate = InFlight::default();
        let _start = gate.try_begin("start");
        assert!(gate.try_begin("end").is_some());
    }

    #[test]
    fn test_closed_scope_is_shared_by_clones() {
        let scope = ScreenScope::new();
        let handle = scope.clone();
        assert!(handle.is_alive());
        scope.close();
        assert!(!handle.is_alive());
    }
}
