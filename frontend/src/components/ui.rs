//! 通用 UI 组件
//!
//! 加载指示、错误提示、表单输入框，以及页面顶部的导航栏。

use crate::api::ApiError;
use crate::auth::logout;
use crate::components::forms::{FORM, FieldErrors};
use crate::config::AppConfig;
use crate::query::use_api;
use crate::web::Timeout;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use taxi_shared::date::format_timestamp;
use taxi_shared::{Order, Role, ServiceCategory, format_rub};

#[component]
pub fn Loader() -> impl IntoView {
    view! {
        <div class="flex justify-center py-8">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 请求失败提示，可选“重试”按钮
#[component]
pub fn ErrorMessage(
    error: ApiError,
    #[prop(optional)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div role="alert" class="alert alert-error text-sm">
            <span>{error.user_message()}</span>
            {on_retry.map(|retry| {
                view! {
                    <button class="btn btn-sm btn-ghost" on:click=move |_| retry.run(())>
                        "Повторить"
                    </button>
                }
            })}
        </div>
    }
}

/// 按查询状态渲染，失败时提供重试
pub fn render_query<T, V, F>(
    query: LocalResource<Result<T, ApiError>>,
    view_fn: F,
) -> impl IntoView
where
    T: Clone + 'static,
    V: IntoView + 'static,
    F: Fn(T) -> V + Send + Sync + 'static,
{
    move || match query.get() {
        None => view! { <Loader /> }.into_any(),
        Some(Err(error)) => {
            let retry = Callback::new(move |_| query.refetch());
            view! { <ErrorMessage error=error on_retry=retry /> }.into_any()
        }
        Some(Ok(data)) => view_fn(data).into_any(),
    }
}

// =========================================================
// 通知 (Notice)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn from_error(error: &ApiError) -> Self {
        Notice::Error(error.user_message())
    }
}

#[component]
pub fn NoticeBanner(notice: RwSignal<Option<Notice>>) -> impl IntoView {
    move || {
        notice.get().map(|notice| {
            let (class, text) = match notice {
                Notice::Success(text) => ("alert alert-success text-sm", text),
                Notice::Error(text) => ("alert alert-error text-sm", text),
            };
            view! {
                <div role="alert" class=class>
                    <span>{text}</span>
                </div>
            }
        })
    }
}

// =========================================================
// 表单输入 (Form fields)
// =========================================================

#[component]
pub fn FieldError(field: &'static str, errors: RwSignal<FieldErrors>) -> impl IntoView {
    move || {
        errors.with(|e| e.get(field)).map(|message| {
            view! {
                <div class="label">
                    <span class="label-text-alt text-error">{message}</span>
                </div>
            }
        })
    }
}

/// 整个表单层面的错误（不属于某个字段）
#[component]
pub fn FormError(errors: RwSignal<FieldErrors>) -> impl IntoView {
    move || {
        errors.with(|e| e.get(FORM)).map(|message| {
            view! {
                <div role="alert" class="alert alert-warning text-sm py-2">
                    <span>{message}</span>
                </div>
            }
        })
    }
}

/// 带标签的输入框
///
/// 输入时清除该字段的错误。
#[component]
pub fn TextField(
    label: &'static str,
    value: RwSignal<String>,
    /// 错误表中的字段名
    field: &'static str,
    errors: RwSignal<FieldErrors>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
    let class = move || {
        if errors.with(|e| e.get(field).is_some()) {
            "input input-bordered input-error w-full"
        } else {
            "input input-bordered w-full"
        }
    };

    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">{label}</span>
            </div>
            <input
                type=input_type
                placeholder=placeholder
                class=class
                prop:value=move || value.get()
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|e| e.clear(field));
                }
            />
            <FieldError field=field errors=errors />
        </label>
    }
}

/// 可编辑字段：(字段名, 标签, 值)
pub type FieldBinding = (&'static str, &'static str, RwSignal<String>);

/// 查看/编辑两种模式的资料卡片
///
/// 查看模式显示只读行，编辑模式显示输入框与“保存/取消”按钮。
#[component]
pub fn EditableCard(
    title: &'static str,
    fields: Vec<FieldBinding>,
    editing: RwSignal<bool>,
    is_saving: RwSignal<bool>,
    errors: RwSignal<FieldErrors>,
    on_save: Callback<()>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let body = move || {
        let fields = fields.clone();
        if editing.get() {
            view! {
                <div class="space-y-1">
                    <FormError errors=errors />
                    {fields
                        .into_iter()
                        .map(|(field, label, value)| {
                            view! { <TextField label=label value=value field=field errors=errors /> }
                        })
                        .collect_view()}
                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-ghost btn-sm" on:click=move |_| on_cancel.run(())>
                            "Отмена"
                        </button>
                        <button
                            class="btn btn-primary btn-sm"
                            disabled=move || is_saving.get()
                            on:click=move |_| on_save.run(())
                        >
                            {move || if is_saving.get() { "Сохранение..." } else { "Сохранить" }}
                        </button>
                    </div>
                </div>
            }
            .into_any()
        } else {
            view! {
                <div>
                    {fields
                        .into_iter()
                        .map(|(_, label, value)| view! { <InfoRow label=label value=value.get() /> })
                        .collect_view()}
                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-outline btn-sm" on:click=move |_| editing.set(true)>
                            "Редактировать"
                        </button>
                    </div>
                </div>
            }
            .into_any()
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">{title}</h2>
                {body}
            </div>
        </div>
    }
}

/// 只读的“标签: 值”行
#[component]
pub fn InfoRow(label: &'static str, #[prop(into)] value: String) -> impl IntoView {
    let value = if value.trim().is_empty() {
        "-".to_string()
    } else {
        value
    };
    view! {
        <div class="flex justify-between gap-4 py-1 border-b border-base-200 last:border-0">
            <span class="text-base-content/60">{label}</span>
            <span class="font-medium text-right">{value}</span>
        </div>
    }
}

/// 订单卡片，`children` 用于附加操作按钮
#[component]
pub fn OrderCard(order: Order, #[prop(optional)] children: Option<Children>) -> impl IntoView {
    let category = order
        .service_category
        .as_deref()
        .and_then(ServiceCategory::from_value)
        .map(|c| c.label().to_string())
        .or_else(|| order.service_category.clone())
        .unwrap_or_default();
    let car = order
        .car
        .as_ref()
        .map(|car| format!("{} {} ({})", car.brand, car.model, car.number))
        .unwrap_or_default();
    let options = order
        .options
        .filter(|o| o.any())
        .map(|o| {
            let mut labels = Vec::new();
            if o.child {
                labels.push("с ребёнком");
            }
            if o.pet {
                labels.push("с питомцем");
            }
            labels.join(", ")
        })
        .unwrap_or_default();
    let created_at = order
        .created_at
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_default();

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body p-4">
                <div class="flex items-center justify-between gap-2">
                    <h3 class="card-title text-base">{order.origin()} " → " {order.destination()}</h3>
                    <span class=order.status.badge_class()>{order.status.label()}</span>
                </div>
                <div class="text-sm">
                    <InfoRow label="Город" value=order.city.clone() />
                    <InfoRow label="Класс" value=category />
                    <InfoRow label="Стоимость" value=format_rub(order.price) />
                    <InfoRow label="Водитель" value=order.driver_name.clone().unwrap_or_default() />
                    <InfoRow label="Автомобиль" value=car />
                    <InfoRow label="Опции" value=options />
                    <InfoRow label="Создан" value=created_at />
                </div>
                {children.map(|children| view! { <div class="card-actions justify-end">{children()}</div> })}
            </div>
        </div>
    }
}

// =========================================================
// 页面框架 (Page shell)
// =========================================================

#[component]
pub fn LogoutButton(role: Role) -> impl IntoView {
    let api = use_api();
    let on_logout = move |_| logout(&api, role);

    view! {
        <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
            "Выйти"
        </button>
    }
}

/// 页面外壳：顶部导航栏 + 内容
#[component]
pub fn PageShell(
    title: &'static str,
    role: Role,
    /// 返回按钮的目标，`None` 时不显示
    #[prop(optional)]
    back: Option<AppRoute>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <span class="text-xl font-bold px-2">{title}</span>
                        <span class="badge badge-neutral hidden md:inline-flex">{role.title()}</span>
                    </div>
                    <div class="flex-none gap-2">
                        {back.map(|route| {
                            view! {
                                <Link to=route class="btn btn-ghost btn-sm">
                                    "Назад"
                                </Link>
                            }
                        })}
                        <LogoutButton role=role />
                    </div>
                </div>
                {children()}
            </div>
        </div>
    }
}

/// 延迟跳转
///
/// 返回的闭包启动一个定时器，`AppConfig::redirect_delay_ms` 后导航到目标路由。
/// 定时器随组件一起释放，页面卸载后不会再跳转。
pub fn use_delayed_redirect() -> impl Fn(AppRoute) + Copy + 'static {
    let router = use_router();
    let delay = use_context::<AppConfig>()
        .unwrap_or_default()
        .redirect_delay_ms;
    let pending = StoredValue::new_local(None::<Timeout>);

    move |route: AppRoute| {
        let timeout = Timeout::new(delay, move || router.navigate_to(route));
        if timeout.is_none() {
            log::warn!("[Ui] setTimeout unavailable, navigating immediately");
            router.navigate_to(route);
        }
        pending.set_value(timeout);
    }
}
