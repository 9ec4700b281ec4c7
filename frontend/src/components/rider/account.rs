use crate::components::ui::{InfoRow, OrderCard, PageShell, render_query};
use crate::query::use_query;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use taxi_shared::protocol::{GetUserInfo, GetUserOrders};
use taxi_shared::{List, Order, Role, UserInfo};

#[component]
fn ProfileCard(info: UserInfo) -> impl IntoView {
    let initials: String = [&info.name, &info.surname]
        .iter()
        .filter_map(|s| s.chars().next())
        .collect();

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center gap-3">
                    <div class="avatar placeholder">
                        <div class="bg-primary text-primary-content rounded-full w-12">
                            <span>{initials}</span>
                        </div>
                    </div>
                    <h2 class="card-title">{info.full_name()}</h2>
                </div>
                <InfoRow label="Страна" value=info.country.clone() />
                <InfoRow label="Город" value=info.city.clone() />
                <InfoRow label="Дата рождения" value=info.date_of_birth.clone() />
                <InfoRow label="Телефон" value=info.phone_number.clone() />
                <div class="card-actions mt-2">
                    <Link to=AppRoute::UserPersonal class="btn btn-outline btn-sm">
                        "Перейти в профиль"
                    </Link>
                </div>
            </div>
        </div>
    }
}

#[component]
fn OrderHistory(orders: Vec<Order>) -> impl IntoView {
    if orders.is_empty() {
        return view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center text-center">
                    <h3 class="font-semibold">"Заказов пока нет"</h3>
                    <p class="text-base-content/60">"Создайте ваш первый заказ такси"</p>
                    <Link to=AppRoute::UserOrderManager class="btn btn-primary btn-sm">
                        "Создать первый заказ"
                    </Link>
                </div>
            </div>
        }
        .into_any();
    }

    view! {
        <div class="space-y-3">
            <p class="text-base-content/60">{format!("Всего заказов: {}", orders.len())}</p>
            {orders
                .into_iter()
                .map(|order| view! { <OrderCard order=order /> })
                .collect_view()}
        </div>
    }
    .into_any()
}

/// 乘客个人主页：资料卡片与订单历史
#[component]
pub fn UserAccountPage() -> impl IntoView {
    let info = use_query(|| GetUserInfo);
    let orders = use_query(|| GetUserOrders);

    view! {
        <PageShell title="Личный кабинет" role=Role::User>
            <div class="grid gap-6 md:grid-cols-3">
                <div class="md:col-span-1">
                    {render_query(info, |info| view! { <ProfileCard info=info /> })}
                </div>
                <div class="md:col-span-2 space-y-4">
                    <div class="flex flex-wrap items-center justify-between gap-2">
                        <h2 class="text-2xl font-bold">"История заказов"</h2>
                        <div class="flex gap-2">
                            <Link to=AppRoute::UserOrderManager class="btn btn-primary btn-sm">
                                "Создать заказ"
                            </Link>
                            <Link to=AppRoute::UserTicketManager class="btn btn-secondary btn-sm">
                                "Обратиться в поддержку"
                            </Link>
                        </div>
                    </div>
                    {render_query(orders, |orders: List<Order>| view! { <OrderHistory orders=orders.0 /> })}
                </div>
            </div>
        </PageShell>
    }
}
