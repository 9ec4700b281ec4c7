use crate::api::{ApiError, use_screen_scope};
use crate::components::forms::{FieldErrors, validate_has_changes};
use crate::components::ui::{
    EditableCard, FieldBinding, InfoRow, Notice, NoticeBanner, PageShell, render_query,
};
use crate::query::{use_api, use_query};
use crate::web::route::AppRoute;
use leptos::prelude::*;
use taxi_shared::protocol::GetUserInfo;
use taxi_shared::{Role, UpdateUserInfo, UserInfo};

#[component]
fn ProfileEditor(info: UserInfo, notice: RwSignal<Option<Notice>>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let editing = RwSignal::new(false);
    let is_saving = RwSignal::new(false);
    let errors = RwSignal::new(FieldErrors::default());

    let name = RwSignal::new(info.name.clone());
    let surname = RwSignal::new(info.surname.clone());
    let lastname = RwSignal::new(info.lastname.clone());
    let country = RwSignal::new(info.country.clone());
    let city = RwSignal::new(info.city.clone());
    let date_of_birth = RwSignal::new(info.date_of_birth.clone());
    let phone_number = RwSignal::new(info.phone_number.clone());
    let email = info.email.clone();
    let original = StoredValue::new(info);

    let personal: Vec<FieldBinding> = vec![
        ("name", "Имя", name),
        ("surname", "Фамилия", surname),
        ("lastname", "Отчество", lastname),
        ("country", "Страна", country),
        ("city", "Город", city),
        ("date_of_birth", "Дата рождения", date_of_birth),
    ];
    let contacts: Vec<FieldBinding> = vec![("phone_number", "Телефон", phone_number)];

    let edited = move || UserInfo {
        name: name.get_untracked(),
        surname: surname.get_untracked(),
        lastname: lastname.get_untracked(),
        country: country.get_untracked(),
        city: city.get_untracked(),
        date_of_birth: date_of_birth.get_untracked(),
        phone_number: phone_number.get_untracked(),
        ..original.get_value()
    };

    let on_cancel = Callback::new(move |_| {
        let info = original.get_value();
        name.set(info.name);
        surname.set(info.surname);
        lastname.set(info.lastname);
        country.set(info.country);
        city.set(info.city);
        date_of_birth.set(info.date_of_birth);
        phone_number.set(info.phone_number);
        errors.set(FieldErrors::default());
        editing.set(false);
    });

    let on_save = Callback::new(move |_| {
        if is_saving.get_untracked() {
            return;
        }
        let update = original.with_value(|before| UpdateUserInfo::diff(before, &edited()));
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
                        editing.set(false);
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
                editing=editing
                is_saving=is_saving
                errors=errors
                on_save=on_save
                on_cancel=on_cancel
            />
            <div class="space-y-6">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"Электронная почта"</h2>
                        <InfoRow label="Email" value=email />
                    </div>
                </div>
                <EditableCard
                    title="Контактная информация"
                    fields=contacts
                    editing=editing
                    is_saving=is_saving
                    errors=errors
                    on_save=on_save
                    on_cancel=on_cancel
                />
            </div>
        </div>
    }
}

/// 乘客资料页
#[component]
pub fn UserPersonalPage() -> impl IntoView {
    let info = use_query(|| GetUserInfo);
    let notice = RwSignal::new(None::<Notice>);

    view! {
        <PageShell title="Профиль" role=Role::User back=AppRoute::Account(Role::User)>
            <NoticeBanner notice=notice />
            {render_query(info, move |info| view! { <ProfileEditor info=info notice=notice /> })}
        </PageShell>
    }
}
