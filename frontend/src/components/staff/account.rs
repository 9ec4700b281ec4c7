use crate::api::{ApiError, use_screen_scope};
use crate::components::forms::{FieldErrors, validate_create_driver};
use crate::components::ui::{
    FieldBinding, InfoRow, Notice, NoticeBanner, PageShell, TextField, render_query,
};
use crate::query::{use_api, use_query};
use leptos::prelude::*;
use taxi_shared::protocol::{GetTickets, ResolveTicket};
use taxi_shared::{CreateDriver, List, Role, Ticket, TicketStatus, UpdateTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaffTab {
    Drivers,
    Tickets,
}

// =========================================================
// 创建司机 (Create driver)
// =========================================================

fn input_type(field: &str) -> &'static str {
    match field {
        "email" => "email",
        "password" => "password",
        "phone_number" => "tel",
        _ => "text",
    }
}

#[component]
fn CreateDriverForm() -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let blank = CreateDriver::default();
    let bind = |(field, label, _): (&'static str, &'static str, &str)| -> FieldBinding {
        (field, label, RwSignal::new(String::new()))
    };
    let profile: Vec<FieldBinding> = blank.profile_fields().into_iter().map(bind).collect();
    let license: Vec<FieldBinding> = blank
        .driver_license
        .fields()
        .into_iter()
        .map(bind)
        .collect();
    let bindings = StoredValue::new((profile.clone(), license.clone()));

    let errors = RwSignal::new(FieldErrors::default());
    let notice = RwSignal::new(None::<Notice>);
    let is_creating = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_creating.get_untracked() {
            return;
        }

        let mut request = CreateDriver::default();
        bindings.with_value(|(profile, license)| {
            for (field, _, value) in profile.iter().chain(license.iter()) {
                if let Some(slot) = request.field_mut(field) {
                    *slot = value.get_untracked().trim().to_string();
                }
            }
        });
        let found = validate_create_driver(&request);
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_creating.set(true);
        notice.set(None);
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&request).await },
            move |result| {
                is_creating.set(false);
                match result {
                    Ok(_) => {
                        bindings.with_value(|(profile, license)| {
                            for (_, _, value) in profile.iter().chain(license.iter()) {
                                value.set(String::new());
                            }
                        });
                        notice.set(Some(Notice::Success("Водитель успешно создан!".to_string())));
                    }
                    Err(ApiError::InFlight) => {}
                    Err(e) => {
                        log::warn!("[Staff] create driver failed: {}", e);
                        notice.set(Some(Notice::Error(format!(
                            "Не удалось создать водителя. {}",
                            e.user_message()
                        ))));
                    }
                }
            },
        );
    };

    let render_fields = move |fields: Vec<FieldBinding>| {
        fields
            .into_iter()
            .map(|(field, label, value)| {
                view! {
                    <TextField
                        label=label
                        value=value
                        field=field
                        errors=errors
                        input_type=input_type(field)
                        placeholder=label
                    />
                }
            })
            .collect_view()
    };

    view! {
        <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
            <div class="card-body">
                <h2 class="card-title">"Создание нового водителя"</h2>
                <NoticeBanner notice=notice />
                <h3 class="font-semibold mt-2">"Основная информация"</h3>
                <div class="grid gap-2 md:grid-cols-2">{render_fields(profile)}</div>
                <h3 class="font-semibold mt-4">"Водительские права"</h3>
                <div class="grid gap-2 md:grid-cols-3">{render_fields(license)}</div>
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-primary" disabled=move || is_creating.get()>
                        {move || if is_creating.get() { "Создание..." } else { "Создать водителя" }}
                    </button>
                </div>
            </div>
        </form>
    }
}

// =========================================================
// 工单处理 (Tickets)
// =========================================================

#[component]
fn TicketCard(ticket: Ticket, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();
    let is_updating = RwSignal::new(false);
    let status = RwSignal::new(ticket.status);
    let solution = RwSignal::new(ticket.solution.clone());

    let ticket_id = ticket.id.clone();
    let update = move |update: UpdateTicket| {
        if is_updating.get_untracked() {
            return;
        }
        is_updating.set(true);
        let request = ResolveTicket {
            ticket_id: ticket_id.clone(),
            update,
        };
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&request).await },
            move |result| {
                is_updating.set(false);
                match result {
                    Ok(_) | Err(ApiError::InFlight) => {}
                    Err(e) => {
                        log::warn!("[Staff] ticket update failed: {}", e);
                        notice.set(Some(Notice::from_error(&e)));
                    }
                }
            },
        );
    };

    let on_status = {
        let update = update.clone();
        move |ev: leptos::ev::Event| {
            if let Some(next) = TicketStatus::from_value(&event_target_value(&ev)) {
                status.set(next);
                update(UpdateTicket {
                    status: Some(next),
                    solution: None,
                });
            }
        }
    };
    let on_solution = move |_| {
        update(UpdateTicket {
            status: None,
            solution: Some(solution.get_untracked().trim().to_string()),
        })
    };

    let claimant = if ticket.claimant_is_driver {
        "Водитель"
    } else {
        "Пользователь"
    };
    let assignee = ticket.assignee.get().unwrap_or_default().to_string();

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body p-4 space-y-2">
                <div class="flex items-start justify-between gap-2">
                    <div>
                        <h3 class="card-title text-base">{ticket.issue.clone()}</h3>
                        <span class="text-xs text-base-content/50">{format!("ID: {}", ticket.id)}</span>
                    </div>
                    <select
                        class="select select-bordered select-sm"
                        disabled=move || is_updating.get()
                        prop:value=move || status.get().as_str()
                        on:change=on_status
                    >
                        {TicketStatus::SELECTABLE
                            .into_iter()
                            .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                            .collect_view()}
                    </select>
                </div>
                <p class="text-sm">{ticket.details.clone()}</p>
                <div class="text-sm">
                    <InfoRow label="Заявитель" value=claimant />
                    <InfoRow label="Заказ" value=ticket.order_id.clone() />
                    <InfoRow label="Ответственный" value=assignee />
                </div>
                <div class="join w-full">
                    <input
                        class="input input-bordered input-sm join-item w-full"
                        placeholder="Решение"
                        prop:value=move || solution.get()
                        on:input=move |ev| solution.set(event_target_value(&ev))
                    />
                    <button
                        class="btn btn-sm join-item"
                        disabled=move || is_updating.get()
                        on:click=on_solution
                    >
                        "Сохранить"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn TicketList(tickets: Vec<Ticket>, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    if tickets.is_empty() {
        return view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center text-center">
                    <h3 class="font-semibold">"Тикетов пока нет"</h3>
                    <p class="text-base-content/60">"Новые тикеты появятся здесь"</p>
                </div>
            </div>
        }
        .into_any();
    }

    view! {
        <div class="grid gap-4 md:grid-cols-2">
            {tickets
                .into_iter()
                .map(|ticket| view! { <TicketCard ticket=ticket notice=notice /> })
                .collect_view()}
        </div>
    }
    .into_any()
}

/// 客服工作台：创建司机与处理工单
#[component]
pub fn StaffAccountPage() -> impl IntoView {
    let tab = RwSignal::new(StaffTab::Drivers);
    let tickets = use_query(|| GetTickets);
    let notice = RwSignal::new(None::<Notice>);

    let tab_class = move |target: StaffTab| {
        move || {
            if tab.get() == target {
                "tab tab-active"
            } else {
                "tab"
            }
        }
    };

    view! {
        <PageShell title="Личный кабинет сотрудника" role=Role::Staff>
            <div role="tablist" class="tabs tabs-boxed w-fit">
                <a role="tab" class=tab_class(StaffTab::Drivers) on:click=move |_| tab.set(StaffTab::Drivers)>
                    "Создание водителей"
                </a>
                <a role="tab" class=tab_class(StaffTab::Tickets) on:click=move |_| tab.set(StaffTab::Tickets)>
                    "Разбор тикетов"
                </a>
            </div>
            {move || match tab.get() {
                StaffTab::Drivers => view! { <CreateDriverForm /> }.into_any(),
                StaffTab::Tickets => view! {
                    <div class="space-y-4">
                        <h2 class="text-2xl font-bold">"Разбор тикетов"</h2>
                        <NoticeBanner notice=notice />
                        {render_query(tickets, move |tickets: List<Ticket>| {
                            view! { <TicketList tickets=tickets.0 notice=notice /> }
                        })}
                    </div>
                }
                .into_any(),
            }}
        </PageShell>
    }
}
