use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use taxi_shared::{Role, ServiceCategory};

#[component]
fn InfoPanel(title: &'static str, points: [&'static str; 4]) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">{title}</h2>
                <ol class="list-decimal list-inside space-y-1 text-base-content/80">
                    {points.into_iter().map(|point| view! { <li>{point}</li> }).collect_view()}
                </ol>
                <div class="mt-4">
                    <h3 class="font-semibold mb-2">"Классы обслуживания:"</h3>
                    <div class="flex flex-wrap gap-2">
                        {ServiceCategory::ALL
                            .into_iter()
                            .map(|category| {
                                view! { <span class="badge badge-outline badge-lg">{category.label()}</span> }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 公开的信息页，根路径与未知路径都会落到这里
#[component]
pub fn InfoPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 flex flex-col">
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1">
                    <span class="btn btn-ghost text-xl">"Служба такси"</span>
                </div>
                <div class="flex-none gap-2">
                    {Role::ALL
                        .into_iter()
                        .map(|role| {
                            view! {
                                <Link to=AppRoute::Auth(role) class="btn btn-ghost btn-sm">
                                    {role.title()}
                                </Link>
                            }
                        })
                        .collect_view()}
                </div>
            </div>

            <div class="flex-1 p-4 md:p-8">
                <div class="max-w-5xl mx-auto grid gap-6 md:grid-cols-2">
                    <InfoPanel
                        title="Для пользователя"
                        points=[
                            "Зарегистрируйтесь и управляйте поездками в личном кабинете",
                            "Выбирайте класс обслуживания, который вам подходит",
                            "Добавляйте опции поездки с ребенком или питомцем",
                            "Решайте спорные моменты через службу поддержки",
                        ]
                    />
                    <InfoPanel
                        title="Для водителя"
                        points=[
                            "Зарегистрируйтесь и получайте заказы",
                            "Работайте в собственном графике и управляйте сменами",
                            "Берите заказы, которые кажутся интересными",
                            "Решайте спорные моменты через службу поддержки",
                        ]
                    />
                </div>
            </div>

            <footer class="footer footer-center p-4 bg-base-100 text-base-content/60">
                <p>"ООО \"Служба такси\""</p>
                <p>"© taxiservice 2025"</p>
            </footer>
        </div>
    }
}
