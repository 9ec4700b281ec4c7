use crate::api::{ApiError, use_screen_scope};
use crate::auth::sign_in;
use crate::components::forms::{FieldErrors, validate_registration, validate_sign_in};
use crate::components::ui::{Notice, NoticeBanner, TextField};
use crate::query::use_api;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use taxi_shared::{Credentials, RegisterRequest, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthTab {
    SignIn,
    Register,
}

/// 登录失败时展示的提示
///
/// 400/401 统一视为凭据错误，其余错误使用通用提示。
fn sign_in_failure(error: &ApiError) -> Notice {
    match error {
        ApiError::Status {
            status: 400 | 401, ..
        } => Notice::Error("Неверный email или пароль".to_string()),
        other => Notice::from_error(other),
    }
}

fn submit_label(busy: bool, idle: &'static str) -> impl IntoView {
    if busy {
        view! { <span class="loading loading-spinner"></span> "Отправка..." }.into_any()
    } else {
        idle.into_any()
    }
}

/// 角色登录页
///
/// 乘客可以在登录与注册之间切换，司机和客服只能登录。
/// 登录成功后不在此处导航，路由守卫会把已认证的登录页重定向到个人主页。
#[component]
pub fn AuthPage(role: Role) -> impl IntoView {
    let tab = RwSignal::new(AuthTab::SignIn);
    let notice = RwSignal::new(None::<Notice>);

    let on_registered = Callback::new(move |_| {
        notice.set(Some(Notice::Success(
            "Регистрация прошла успешно. Войдите в аккаунт.".to_string(),
        )));
        tab.set(AuthTab::SignIn);
    });

    let tab_class = move |target: AuthTab| {
        move || {
            if tab.get() == target {
                "tab tab-active"
            } else {
                "tab"
            }
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Служба такси"</h1>
                    <p class="text-base-content/70">{format!("Вход для роли «{}»", role.title())}</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div class="card-body">
                        {(role == Role::User)
                            .then(|| {
                                view! {
                                    <div role="tablist" class="tabs tabs-boxed mb-2">
                                        <a role="tab" class=tab_class(AuthTab::SignIn) on:click=move |_| tab.set(AuthTab::SignIn)>
                                            "Вход"
                                        </a>
                                        <a role="tab" class=tab_class(AuthTab::Register) on:click=move |_| tab.set(AuthTab::Register)>
                                            "Регистрация"
                                        </a>
                                    </div>
                                }
                            })}
                        <NoticeBanner notice=notice />
                        {move || match tab.get() {
                            AuthTab::SignIn => view! { <SignInForm role=role /> }.into_any(),
                            AuthTab::Register => {
                                view! { <RegisterForm on_registered=on_registered /> }.into_any()
                            }
                        }}
                    </div>
                </div>

                <Link to=AppRoute::Info class="btn btn-link">
                    "На главную"
                </Link>
            </div>
        </div>
    }
}

#[component]
fn SignInForm(role: Role) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let is_submitting = RwSignal::new(false);
    let notice = RwSignal::new(None::<Notice>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let credentials = Credentials {
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let found = validate_sign_in(&credentials);
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_submitting.set(true);
        notice.set(None);
        let api = api.clone();
        scope.spawn(
            async move { sign_in(&api, role, credentials).await },
            move |result| {
                is_submitting.set(false);
                match result {
                    Ok(()) | Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(sign_in_failure(&e))),
                }
            },
        );
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <NoticeBanner notice=notice />
            <TextField label="Email" value=email field="email" errors=errors input_type="email" placeholder="mail@example.com" />
            <TextField label="Пароль" value=password field="password" errors=errors input_type="password" placeholder="••••••••" />
            <div class="form-control mt-6">
                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                    {move || submit_label(is_submitting.get(), "Войти")}
                </button>
            </div>
        </form>
    }
}

#[component]
fn RegisterForm(on_registered: Callback<()>) -> impl IntoView {
    let api = use_api();
    let scope = use_screen_scope();

    let name = RwSignal::new(String::new());
    let surname = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let phone_number = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let is_submitting = RwSignal::new(false);
    let notice = RwSignal::new(None::<Notice>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let phone = phone_number.get_untracked().trim().to_string();
        let request = RegisterRequest {
            name: name.get_untracked().trim().to_string(),
            surname: surname.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
            phone_number: (!phone.is_empty()).then_some(phone),
        };
        let found = validate_registration(&request);
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        is_submitting.set(true);
        notice.set(None);
        let api = api.clone();
        scope.spawn(
            async move { api.mutate(&request).await },
            move |result| {
                is_submitting.set(false);
                match result {
                    Ok(_) => on_registered.run(()),
                    Err(ApiError::InFlight) => {}
                    Err(e) => notice.set(Some(Notice::from_error(&e))),
                }
            },
        );
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <NoticeBanner notice=notice />
            <TextField label="Имя" value=name field="name" errors=errors />
            <TextField label="Фамилия" value=surname field="surname" errors=errors />
            <TextField label="Email" value=email field="email" errors=errors input_type="email" />
            <TextField label="Телефон" value=phone_number field="phone_number" errors=errors input_type="tel" placeholder="+7" />
            <TextField label="Пароль" value=password field="password" errors=errors input_type="password" />
            <div class="form-control mt-6">
                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                    {move || submit_label(is_submitting.get(), "Зарегистрироваться")}
                </button>
            </div>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_credentials_get_a_specific_message() {
        for status in [400, 401] {
            let error = ApiError::Status {
                status,
                message: "invalid".into(),
            };
            assert_eq!(
                sign_in_failure(&error),
                Notice::Error("Неверный email или пароль".into())
            );
        }
    }

    #[test]
    fn test_other_failures_use_server_message() {
        let error = ApiError::Status {
            status: 500,
            message: "db down".into(),
        };
        assert_eq!(sign_in_failure(&error), Notice::Error("db down".into()));
    }
}
