//! 工单表单，乘客与司机共用

use crate::api::{ApiError, use_screen_scope};
use crate::components::forms::{FieldErrors, validate_ticket};
use crate::components::ui::{FieldError, Notice, NoticeBanner, TextField, render_query};
use crate::query::use_api;
use leptos::prelude::*;
use taxi_shared::protocol::SubmitTicket;
use taxi_shared::{CreateTicket, List, Order, Role};

#[component]
fn OrderSelect(
    orders: Vec<Order>,
    order_id: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
) -> impl IntoView {
    let has_orders = !orders.is_empty();
    let options = orders
        .into_iter()
        .map(|order| view! { <option value=order.id.clone()>{order.display_name()}</option> })
        .collect_view();

    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">"Связанный заказ *"</span>
            </div>
            <select
                class="select select-bordered"
                disabled=!has_orders
                prop:value=move || order_id.get()
                on:change=move |ev| {
                    order_id.set(event_target_value(&ev));
                    errors.update(|e| e.clear("order_id"));
                }
            >
                <option value="">"Выберите заказ"</option>
                {options}
            </select>
            <div class="label">
                <span class="label-text-alt text-base-content/60">
                    {if has_orders {
                        "Выберите заказ, к которому относится ваше обращение"
                    } else {
                        "У вас нет доступных заказов. Сначала создайте заказ."
                    }}
                </span>
            </div>
            <FieldError field="order_id" errors=errors />
        </label>
    }
}

/// 创建工单
///
/// `orders` 为该角色的订单查询，用于选择关联订单。
#[component]
pub fn TicketForm(
    role: Role,
    orders: LocalResource<Result<List<Order>, ApiError>>,
    on_created: Callback<()>,
) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let issue = RwSignal::new(String::new());
    let details = RwSignal::new(String::new());
    let order_id = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(None::<Notice>);
    let is_submitting = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let ticket = CreateTicket::new(
            issue.get_untracked().trim().to_string(),
            details.get_untracked().trim().to_string(),
            order_id.get_untracked(),
        );
        let found = validate_ticket(&ticket.issue, &ticket.details, &ticket.order_id);
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_submitting.set(true);
        notice.set(None);
        let request = SubmitTicket { role, ticket };
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&request).await },
            move |result| {
                is_submitting.set(false);
                match result {
                    Ok(_) => {
                        issue.set(String::new());
                        details.set(String::new());
                        order_id.set(String::new());
                        on_created.run(());
                    }
                    Err(ApiError::InFlight) => {}
                    Err(e) => {
                        log::warn!("[Ticket] {} ticket failed: {}", role, e);
                        notice.set(Some(Notice::from_error(&e)));
                    }
                }
            },
        );
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <NoticeBanner notice=notice />
            <TextField
                label="Тема обращения *"
                value=issue
                field="issue"
                errors=errors
                placeholder="Например: Проблема с оплатой заказа"
            />
            {render_query(orders, move |orders: List<Order>| {
                view! { <OrderSelect orders=orders.0 order_id=order_id errors=errors /> }
            })}
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">"Подробное описание проблемы *"</span>
                </div>
                <textarea
                    class="textarea textarea-bordered h-32"
                    placeholder="Опишите вашу проблему максимально подробно..."
                    prop:value=move || details.get()
                    on:input=move |ev| {
                        details.set(event_target_value(&ev));
                        errors.update(|e| e.clear("details"));
                    }
                ></textarea>
                <FieldError field="details" errors=errors />
            </label>
            <div class="flex justify-end mt-4">
                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                    {move || {
                        if is_submitting.get() { "Создание обращения..." } else { "Создать обращение" }
                    }}
                </button>
            </div>
        </form>
    }
}
