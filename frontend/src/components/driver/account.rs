use crate::api::{ApiError, use_screen_scope};
use crate::components::support::TicketForm;
use crate::components::ui::{InfoRow, Notice, NoticeBanner, OrderCard, PageShell, render_query};
use crate::query::{use_api, use_query};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use taxi_shared::date::format_timestamp;
use taxi_shared::protocol::{
    EndShift, GetActiveShift, GetDriverInfo, GetDriverOrders, GetShifts, OrderTransition,
    StartShift,
};
use taxi_shared::{DriverInfo, List, Order, OrderAction, Role, Shift, ShiftStatus, format_rub};

#[component]
fn DriverSummary(info: DriverInfo) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">{info.full_name()}</h2>
                <InfoRow label="Email" value=info.email.clone() />
                <InfoRow label="Телефон" value=info.phone_number.clone() />
                <InfoRow label="Категория прав" value=info.driver_license.license_category.clone() />
                <div class="card-actions mt-2">
                    <Link to=AppRoute::DriverPersonal class="btn btn-outline btn-sm">
                        "Профиль"
                    </Link>
                </div>
            </div>
        </div>
    }
}

// =========================================================
// 班次 (Shift)
// =========================================================

#[component]
fn ShiftCard(shift: Option<Shift>, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();
    let is_busy = RwSignal::new(false);
    let is_active = shift.is_some();

    let on_toggle = move |_| {
        if is_busy.get_untracked() {
            return;
        }
        is_busy.set(true);
        notice.set(None);
        let api = api.clone();

        if is_active {
            scope.spawn(async move { api.mutate(&EndShift).await }, move |result| {
                is_busy.set(false);
                match result {
                    Ok(summary) => notice.set(Some(Notice::Success(format!(
                        "Смена завершена. Заказов выполнено: {}, заработок: {}",
                        summary.total_orders,
                        format_rub(summary.total_earnings)
                    )))),
                    Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(Notice::from_error(&e))),
                }
            });
        } else {
            scope.spawn(async move { api.mutate(&StartShift).await }, move |result| {
                is_busy.set(false);
                match result {
                    Ok(_) => notice.set(Some(Notice::Success("Смена начата".to_string()))),
                    Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(Notice::from_error(&e))),
                }
            });
        }
    };

    let body = match shift {
        Some(shift) => view! {
            <div>
                <div class="flex items-center gap-2 mb-2">
                    <span class="badge badge-success">"Активна"</span>
                    <span class="text-sm text-base-content/60">
                        "Начало: " {format_timestamp(&shift.start_time)}
                    </span>
                </div>
                <InfoRow label="Заказов выполнено" value=shift.total_orders.unwrap_or(0).to_string() />
                <InfoRow label="Заработок" value=format_rub(shift.total_earnings.unwrap_or(0.0)) />
            </div>
        }
        .into_any(),
        None => view! { <p class="text-base-content/60">"Смена не активна"</p> }.into_any(),
    };

    let button_class = if is_active {
        "btn btn-error btn-sm"
    } else {
        "btn btn-success btn-sm"
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Рабочая смена"</h2>
                {body}
                <div class="card-actions justify-end mt-2">
                    <button
                        class=button_class
                        disabled=move || is_busy.get()
                        on:click=on_toggle
                    >
                        {move || match (is_active, is_busy.get()) {
                            (true, true) => "Завершение...",
                            (true, false) => "Завершить смену",
                            (false, true) => "Запуск...",
                            (false, false) => "Начать смену",
                        }}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn ShiftHistory(shifts: Vec<Shift>) -> impl IntoView {
    let ended: Vec<Shift> = shifts
        .into_iter()
        .filter(|s| s.status == ShiftStatus::Ended)
        .collect();
    if ended.is_empty() {
        return view! { <p class="text-base-content/60 text-sm">"Завершённых смен пока нет"</p> }
            .into_any();
    }

    view! {
        <div class="overflow-x-auto">
            <table class="table table-zebra table-sm">
                <thead>
                    <tr>
                        <th>"Начало"</th>
                        <th>"Окончание"</th>
                        <th>"Заказов"</th>
                        <th>"Заработок"</th>
                    </tr>
                </thead>
                <tbody>
                    {ended
                        .into_iter()
                        .map(|shift| {
                            view! {
                                <tr>
                                    <td>{format_timestamp(&shift.start_time)}</td>
                                    <td>{shift.end_time.as_deref().map(format_timestamp).unwrap_or_default()}</td>
                                    <td>{shift.total_orders.unwrap_or(0)}</td>
                                    <td>{format_rub(shift.total_earnings.unwrap_or(0.0))}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
    .into_any()
}

// =========================================================
// 订单 (Orders)
// =========================================================

/// 按订单状态给出可执行的操作按钮
///
/// 同一订单同时只允许一个操作在进行。
#[component]
fn OrderActions(order: Order, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();
    let pending = RwSignal::new(None::<OrderAction>);

    order
        .status
        .actions()
        .iter()
        .copied()
        .map(|action| {
            let api = api.clone();
            let scope = scope.clone();
            let order_id = order.id.clone();
            let on_click = move |_| {
                if pending.get_untracked().is_some() {
                    return;
                }
                pending.set(Some(action));
                let request = OrderTransition {
                    order_id: order_id.clone(),
                    action,
                };
                let api = api.clone();
                scope.spawn(async move { api.mutate(&request).await }, move |result| {
                    pending.set(None);
                    match result {
                        Ok(_) | Err(ApiError::InFlight) => {}
                        Err(e) => notice.set(Some(Notice::from_error(&e))),
                    }
                });
            };

            view! {
                <button
                    class="btn btn-primary btn-sm"
                    disabled=move || pending.get().is_some()
                    on:click=on_click
                >
                    {move || {
                        if pending.get() == Some(action) {
                            action.pending_label()
                        } else {
                            action.label()
                        }
                    }}
                </button>
            }
        })
        .collect_view()
}

#[component]
fn DriverOrders(orders: Vec<Order>, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    if orders.is_empty() {
        return view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center text-center">
                    <h3 class="font-semibold">"Заказов пока нет"</h3>
                    <p class="text-base-content/60">
                        "Новые заказы появятся здесь, когда начнется смена"
                    </p>
                </div>
            </div>
        }
        .into_any();
    }

    view! {
        <div class="space-y-3">
            <p class="text-base-content/60">{format!("Доступно заказов: {}", orders.len())}</p>
            {orders
                .into_iter()
                .map(|order| {
                    let actions = order.clone();
                    view! {
                        <OrderCard order=order>
                            <OrderActions order=actions notice=notice />
                        </OrderCard>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

/// 司机工作台：资料摘要、班次、订单处理
#[component]
pub fn DriverAccountPage() -> impl IntoView {
    let info = use_query(|| GetDriverInfo);
    let active_shift = use_query(|| GetActiveShift);
    let shifts = use_query(|| GetShifts);
    let orders = use_query(|| GetDriverOrders);
    let notice = RwSignal::new(None::<Notice>);
    let show_support = RwSignal::new(false);

    let on_ticket_created = Callback::new(move |_| {
        show_support.set(false);
        notice.set(Some(Notice::Success(
            "Обращение успешно создано! Ваше обращение принято в обработку.".to_string(),
        )));
    });

    view! {
        <PageShell title="Обработка заказов" role=Role::Driver>
            <NoticeBanner notice=notice />
            <div class="grid gap-6 md:grid-cols-3">
                <div class="space-y-6 md:col-span-1">
                    {render_query(info, |info| view! { <DriverSummary info=info /> })}
                    {render_query(active_shift, move |shift| view! { <ShiftCard shift=shift notice=notice /> })}
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h2 class="card-title">"История смен"</h2>
                            {render_query(shifts, |shifts: List<Shift>| view! { <ShiftHistory shifts=shifts.0 /> })}
                        </div>
                    </div>
                </div>
                <div class="space-y-4 md:col-span-2">
                    <div class="flex items-center justify-between">
                        <h2 class="text-2xl font-bold">"Заказы"</h2>
                        <button class="btn btn-secondary btn-sm" on:click=move |_| show_support.update(|v| *v = !*v)>
                            "Обратиться в поддержку"
                        </button>
                    </div>
                    <Show when=move || show_support.get()>
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h2 class="card-title">"Информация об обращении"</h2>
                                <TicketForm role=Role::Driver orders=orders on_created=on_ticket_created />
                            </div>
                        </div>
                    </Show>
                    {render_query(orders, move |orders: List<Order>| {
                        view! { <DriverOrders orders=orders.0 notice=notice /> }
                    })}
                </div>
            </div>
        </PageShell>
    }
}
