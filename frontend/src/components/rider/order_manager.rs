use crate::api::{ApiError, use_screen_scope};
use crate::components::forms::{FieldErrors, OrderDraft, validate_order};
use crate::components::ui::{FieldError, Notice, NoticeBanner, PageShell, TextField, use_delayed_redirect};
use crate::query::use_api;
use crate::web::route::AppRoute;
use leptos::prelude::*;
use taxi_shared::protocol::GetOrderPrice;
use taxi_shared::{OrderOptions, Role, ServiceCategory, format_rub};

/// 下单页
///
/// 报价与请求参数绑定：地址或服务类别变化后旧报价自动失效，
/// 必须重新报价才能下单。
#[component]
pub fn OrderManagerPage() -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();
    let redirect = use_delayed_redirect();

    let city = RwSignal::new(String::new());
    let start_trip_street = RwSignal::new(String::new());
    let start_trip_house = RwSignal::new(String::new());
    let start_trip_build = RwSignal::new(String::new());
    let destination_street = RwSignal::new(String::new());
    let destination_house = RwSignal::new(String::new());
    let destination_build = RwSignal::new(String::new());
    let service_category = RwSignal::new(ServiceCategory::default());
    let child = RwSignal::new(false);
    let pet = RwSignal::new(false);

    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(None::<Notice>);
    let is_pricing = RwSignal::new(false);
    let is_submitting = RwSignal::new(false);
    let created = RwSignal::new(false);

    let draft = move || OrderDraft {
        city: city.get(),
        start_trip_street: start_trip_street.get(),
        start_trip_house: start_trip_house.get(),
        start_trip_build: start_trip_build.get(),
        destination_street: destination_street.get(),
        destination_house: destination_house.get(),
        destination_build: destination_build.get(),
        service_category: service_category.get(),
        options: OrderOptions {
            child: child.get(),
            pet: pet.get(),
        },
    };

    // 最近一次报价及其对应的请求
    let quoted = RwSignal::new(None::<(GetOrderPrice, f64)>);
    let price_request = Memo::new(move |_| draft().price_request());
    let quote = Memo::new(move |_| {
        let current = price_request.get();
        quoted.with(|q| {
            q.as_ref()
                .filter(|(request, _)| *request == current)
                .map(|(_, price)| *price)
        })
    });

    let on_price = {
        let api = api.clone();
        let scope = scope.clone();
        move |_| {
            if is_pricing.get_untracked() {
                return;
            }
            let request = price_request.get_untracked();
            if !request.is_complete() {
                let mut found = validate_order(&untrack(draft), Some(0.0));
                found.clear("city");
                errors.set(found);
                return;
            }

            is_pricing.set(true);
            errors.update(|e| e.clear("price"));
            let api = api.clone();
            scope.spawn(
                async move {
                    let result = api.query(&request).await;
                    (request, result)
                },
                move |(request, result)| {
                    is_pricing.set(false);
                    match result.map(|q| q.price.amount()) {
                        Ok(Some(price)) => quoted.set(Some((request, price))),
                        Ok(None) => notice.set(Some(Notice::Error(
                            "Не удалось рассчитать стоимость".to_string(),
                        ))),
                        Err(e) => notice.set(Some(Notice::from_error(&e))),
                    }
                },
            );
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let draft = untrack(draft);
        let price = quote.get_untracked();
        let found = validate_order(&draft, price);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        let Some(price) = price else { return };

        is_submitting.set(true);
        notice.set(None);
        let request = draft.into_request(price);
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&request).await },
            move |result| {
                is_submitting.set(false);
                match result {
                    Ok(_) => {
                        created.set(true);
                        redirect(AppRoute::Account(Role::User));
                    }
                    Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(Notice::from_error(&e))),
                }
            },
        );
    };

    let form = move || {
        view! {
            <form class="card bg-base-100 shadow-xl" on:submit=on_submit.clone()>
                <div class="card-body space-y-2">
                    <NoticeBanner notice=notice />
                    <TextField label="Город" value=city field="city" errors=errors />

                    <h3 class="font-semibold mt-2">"Откуда"</h3>
                    <div class="grid gap-2 md:grid-cols-3">
                        <TextField label="Улица" value=start_trip_street field="start_trip_street" errors=errors />
                        <TextField label="Дом" value=start_trip_house field="start_trip_house" errors=errors />
                        <TextField label="Корпус" value=start_trip_build field="start_trip_build" errors=errors />
                    </div>

                    <h3 class="font-semibold mt-2">"Куда"</h3>
                    <div class="grid gap-2 md:grid-cols-3">
                        <TextField label="Улица" value=destination_street field="destination_street" errors=errors />
                        <TextField label="Дом" value=destination_house field="destination_house" errors=errors />
                        <TextField label="Корпус" value=destination_build field="destination_build" errors=errors />
                    </div>

                    <label class="form-control w-full">
                        <div class="label">
                            <span class="label-text">"Класс обслуживания"</span>
                        </div>
                        <select
                            class="select select-bordered"
                            prop:value=move || service_category.get().as_str()
                            on:change=move |ev| {
                                if let Some(category) = ServiceCategory::from_value(&event_target_value(&ev)) {
                                    service_category.set(category);
                                }
                            }
                        >
                            {ServiceCategory::ALL
                                .into_iter()
                                .map(|category| {
                                    view! { <option value=category.as_str()>{category.label()}</option> }
                                })
                                .collect_view()}
                        </select>
                    </label>

                    <div class="flex gap-6">
                        <label class="label cursor-pointer gap-2">
                            <input type="checkbox" class="checkbox" prop:checked=move || child.get() on:change=move |ev| child.set(event_target_checked(&ev)) />
                            <span class="label-text">"Поездка с ребёнком"</span>
                        </label>
                        <label class="label cursor-pointer gap-2">
                            <input type="checkbox" class="checkbox" prop:checked=move || pet.get() on:change=move |ev| pet.set(event_target_checked(&ev)) />
                            <span class="label-text">"Поездка с питомцем"</span>
                        </label>
                    </div>

                    <div class="flex flex-wrap items-center gap-4 mt-2">
                        <button type="button" class="btn btn-outline" disabled=move || is_pricing.get() on:click=on_price.clone()>
                            {move || if is_pricing.get() { "Расчёт..." } else { "Узнать стоимость" }}
                        </button>
                        <span class="text-xl font-bold">
                            {move || quote.get().map(format_rub)}
                        </span>
                    </div>
                    <FieldError field="price" errors=errors />

                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-primary" disabled=move || is_submitting.get() || quote.get().is_none()>
                            {move || if is_submitting.get() { "Оформление..." } else { "Заказать такси" }}
                        </button>
                    </div>
                </div>
            </form>
        }
    };

    view! {
        <PageShell title="Новый заказ" role=Role::User back=AppRoute::Account(Role::User)>
            <Show
                when=move || created.get()
                fallback=form
            >
                <div role="alert" class="alert alert-success">
                    <span>"Заказ создан! Перенаправление в личный кабинет..."</span>
                </div>
            </Show>
        </PageShell>
    }
}
