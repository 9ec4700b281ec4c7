use crate::api::{ApiError, use_screen_scope};
use crate::components::forms::{FieldErrors, validate_car, validate_has_changes};
use crate::components::ui::{
    EditableCard, FieldBinding, InfoRow, Notice, NoticeBanner, PageShell, TextField, render_query,
};
use crate::query::{use_api, use_query};
use crate::web::route::AppRoute;
use leptos::prelude::*;
use taxi_shared::protocol::{GetCars, GetDriverInfo};
use taxi_shared::{Car, DriverInfo, DriverLicense, List, Role, UpdateDriverInfo};

/// 驾照中司机可以修改的字段
fn editable_license(license: &DriverLicense) -> [(&'static str, &'static str, String); 7] {
    [
        ("driver_license.series", "Серия", license.series.clone()),
        ("driver_license.doc_number", "Номер", license.doc_number.clone()),
        ("driver_license.date_of_issue", "Дата выдачи", license.date_of_issue.clone()),
        ("driver_license.valid_until", "Действует до", license.valid_until.clone()),
        ("driver_license.residence", "Место жительства", license.residence.clone()),
        ("driver_license.issued_unit", "Кем выдано", license.issued_unit.clone()),
        ("driver_license.license_category", "Категория", license.license_category.clone()),
    ]
}

#[component]
fn DriverProfileEditor(info: DriverInfo, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let editing_personal = RwSignal::new(false);
    let editing_license = RwSignal::new(false);
    let is_saving = RwSignal::new(false);
    let errors = RwSignal::new(FieldErrors::default());

    let personal: Vec<FieldBinding> = vec![
        ("name", "Имя", RwSignal::new(info.name.clone())),
        ("surname", "Фамилия", RwSignal::new(info.surname.clone())),
        ("lastname", "Отчество", RwSignal::new(info.lastname.clone())),
        ("phone_number", "Телефон", RwSignal::new(info.phone_number.clone())),
    ];
    let license: Vec<FieldBinding> = editable_license(&info.driver_license)
        .into_iter()
        .map(|(field, label, value)| (field, label, RwSignal::new(value)))
        .collect();
    let holder = info.driver_license.clone();
    let original = StoredValue::new(info);
    let bindings = StoredValue::new((personal.clone(), license.clone()));

    let edited = move || {
        let mut info = original.get_value();
        bindings.with_value(|(personal, license)| {
            for (field, _, value) in personal.iter().chain(license.iter()) {
                let value = value.get_untracked();
                match *field {
                    "name" => info.name = value,
                    "surname" => info.surname = value,
                    "lastname" => info.lastname = value,
                    "phone_number" => info.phone_number = value,
                    key => {
                        if let Some(slot) = info.driver_license.field_mut(key) {
                            *slot = value;
                        }
                    }
                }
            }
        });
        info
    };

    let on_cancel = Callback::new(move |_| {
        let info = original.get_value();
        bindings.with_value(|(personal, license)| {
            let before = [
                ("name", info.name.clone()),
                ("surname", info.surname.clone()),
                ("lastname", info.lastname.clone()),
                ("phone_number", info.phone_number.clone()),
            ];
            for ((_, _, value), (_, initial)) in personal.iter().zip(before) {
                value.set(initial);
            }
            for ((_, _, value), (_, _, initial)) in
                license.iter().zip(editable_license(&info.driver_license))
            {
                value.set(initial);
            }
        });
        errors.set(FieldErrors::default());
        editing_personal.set(false);
        editing_license.set(false);
    });

    let on_save = Callback::new(move |_| {
        if is_saving.get_untracked() {
            return;
        }
        let update = original.with_value(|before| UpdateDriverInfo::diff(before, &edited()));
        let found = validate_has_changes(update.is_empty());
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_saving.set(true);
        notice.set(None);
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&update).await },
            move |result| {
                is_saving.set(false);
                match result {
                    Ok(_) => {
                        editing_personal.set(false);
                        editing_license.set(false);
                        notice.set(Some(Notice::Success("Данные сохранены".to_string())));
                    }
                    Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(Notice::from_error(&e))),
                }
            },
        );
    });

    view! {
        <div class="grid gap-6 md:grid-cols-2">
            <EditableCard
                title="Персональная информация"
                fields=personal
                editing=editing_personal
                is_saving=is_saving
                errors=errors
                on_save=on_save
                on_cancel=on_cancel
            />
            <div class="space-y-6">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"Владелец прав"</h2>
                        <InfoRow label="ФИО" value=format!("{} {} {}", holder.surname, holder.name, holder.lastname) />
                        <InfoRow label="Дата рождения" value=holder.date_of_birth.clone() />
                        <InfoRow label="Место рождения" value=holder.place_of_birth.clone() />
                    </div>
                </div>
                <EditableCard
                    title="Водительские права"
                    fields=license
                    editing=editing_license
                    is_saving=is_saving
                    errors=errors
                    on_save=on_save
                    on_cancel=on_cancel
                />
            </div>
        </div>
    }
}

// =========================================================
// 车辆 (Cars)
// =========================================================

#[component]
fn CarList(cars: Vec<Car>) -> impl IntoView {
    if cars.is_empty() {
        return view! { <p class="text-base-content/60">"Автомобили не добавлены"</p> }.into_any();
    }

    view! {
        <ul class="space-y-2">
            {cars
                .into_iter()
                .map(|car| {
                    view! {
                        <li class="flex items-center justify-between rounded-box bg-base-200 px-4 py-2">
                            <div>
                                <div class="font-semibold">{format!("{} {}", car.brand, car.model)}</div>
                                <div class="text-sm text-base-content/60">
                                    {format!("{} • {} • {}", car.year, car.color, car.license_plate)}
                                </div>
                            </div>
                            {car.is_active.unwrap_or(false).then(|| view! {
                                <span class="badge badge-success">"Активный"</span>
                            })}
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}

#[component]
fn AddCarForm(on_close: Callback<()>, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let brand = RwSignal::new(String::new());
    let model = RwSignal::new(String::new());
    let year = RwSignal::new(String::new());
    let color = RwSignal::new(String::new());
    let license_plate = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let is_adding = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_adding.get_untracked() {
            return;
        }
        let car = Car {
            brand: brand.get_untracked().trim().to_string(),
            model: model.get_untracked().trim().to_string(),
            year: year.get_untracked().trim().to_string(),
            color: color.get_untracked().trim().to_string(),
            license_plate: license_plate.get_untracked().trim().to_string(),
            ..Default::default()
        };
        let found = validate_car(&car);
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_adding.set(true);
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&car).await },
            move |result| {
                is_adding.set(false);
                match result {
                    Ok(_) => {
                        notice.set(Some(Notice::Success("Автомобиль добавлен".to_string())));
                        on_close.run(());
                    }
                    Err(ApiError::InFlight) => {}
                    Err(e) => {
                        log::warn!("[Cars] add failed: {}", e);
                        notice.set(Some(Notice::from_error(&e)));
                    }
                }
            },
        );
    };

    view! {
        <form class="mt-4 space-y-1" on:submit=on_submit>
            <div class="grid gap-2 md:grid-cols-2">
                <TextField label="Марка *" value=brand field="brand" errors=errors placeholder="Kia" />
                <TextField label="Модель *" value=model field="model" errors=errors placeholder="Rio" />
                <TextField label="Год *" value=year field="year" errors=errors placeholder="2020" />
                <TextField label="Цвет *" value=color field="color" errors=errors placeholder="Белый" />
                <TextField label="Гос. номер *" value=license_plate field="license_plate" errors=errors placeholder="А123БВ777" />
            </div>
            <div class="flex justify-end gap-2 mt-2">
                <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| on_close.run(())>
                    "Отмена"
                </button>
                <button class="btn btn-primary btn-sm" disabled=move || is_adding.get()>
                    {move || if is_adding.get() { "Добавление..." } else { "Добавить" }}
                </button>
            </div>
        </form>
    }
}

/// 司机资料页：个人信息、驾照与车辆
#[component]
pub fn DriverPersonalPage() -> impl IntoView {
    let info = use_query(|| GetDriverInfo);
    let cars = use_query(|| GetCars);
    let notice = RwSignal::new(None::<Notice>);
    let adding_car = RwSignal::new(false);
    let close_form = Callback::new(move |_| adding_car.set(false));

    view! {
        <PageShell title="Личный кабинет водителя" role=Role::Driver back=AppRoute::Account(Role::Driver)>
            <NoticeBanner notice=notice />
            {render_query(info, move |info| view! { <DriverProfileEditor info=info notice=notice /> })}
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h2 class="card-title">"Автомобили"</h2>
                        <Show when=move || !adding_car.get()>
                            <button class="btn btn-outline btn-sm" on:click=move |_| adding_car.set(true)>
                                "Добавить автомобиль"
                            </button>
                        </Show>
                    </div>
                    {render_query(cars, |cars: List<Car>| view! { <CarList cars=cars.0 /> })}
                    <Show when=move || adding_car.get()>
                        <AddCarForm on_close=close_form notice=notice />
                    </Show>
                </div>
            </div>
        </PageShell>
    }
}
