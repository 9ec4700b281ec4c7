use crate::components::support::TicketForm;
use crate::components::ui::{PageShell, use_delayed_redirect};
use crate::query::use_query;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use taxi_shared::Role;
use taxi_shared::protocol::GetUserOrders;

/// 乘客提交工单，成功后延迟跳回个人主页
#[component]
pub fn TicketManagerPage() -> impl IntoView {
    let redirect = use_delayed_redirect();
    let orders = use_query(|| GetUserOrders);
    let created = RwSignal::new(false);

    let on_created = Callback::new(move |_| {
        created.set(true);
        redirect(AppRoute::Account(Role::User));
    });

    view! {
        <PageShell title="Создание обращения" role=Role::User back=AppRoute::Account(Role::User)>
            <Show
                when=move || created.get()
                fallback=move || {
                    view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h2 class="card-title">"Информация об обращении"</h2>
                                <TicketForm role=Role::User orders=orders on_created=on_created />
                            </div>
                        </div>
                    }
                }
            >
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body items-center text-center">
                        <h2 class="card-title text-success">"Обращение успешно создано!"</h2>
                        <p>
                            "Ваше обращение принято в обработку. Вы будете перенаправлены в личный кабинет..."
                        </p>
                        <Link to=AppRoute::Account(Role::User) class="btn btn-primary btn-sm">
                            "Перейти в личный кабинет"
                        </Link>
                    </div>
                </div>
            </Show>
        </PageShell>
    }
}
