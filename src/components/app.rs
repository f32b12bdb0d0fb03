use yew::prelude::*;

use super::SyncIndicator;
use crate::config::CONFIG;
use crate::hooks::use_offline_pos;
use crate::models::{PaymentMethod, PosTransaction, SaleItem};

fn format_cents(cents: i64) -> String {
    format!("{},{:02} {}", cents / 100, (cents % 100).abs(), CONFIG.pos_config.currency)
}

/// Shell de caja: indicador de sincronización, venta rápida de servicios
/// habituales y listado de ventas pendientes de envío.
#[function_component(App)]
pub fn app() -> Html {
    let pos = use_offline_pos();

    let on_quick_sale = {
        let save_transaction = pos.save_transaction.clone();
        Callback::from(move |(product_id, description, price_cents): (String, String, i64)| {
            let tx = PosTransaction::new(
                vec![SaleItem {
                    product_id,
                    description,
                    quantity: 1,
                    unit_price_cents: price_cents,
                }],
                PaymentMethod::Cash,
                None,
            );
            save_transaction.emit(tx);
        })
    };

    let quick_sale_button = |product_id: &str, description: &str, price_cents: i64| {
        let on_quick_sale = on_quick_sale.clone();
        let product_id = product_id.to_string();
        let description = description.to_string();
        let label = format!("{} · {}", description, format_cents(price_cents));
        let onclick = Callback::from(move |_| {
            on_quick_sale.emit((product_id.clone(), description.clone(), price_cents));
        });
        html! {
            <button class="quick-sale-btn" onclick={onclick}>{label}</button>
        }
    };

    let on_sync_now = {
        let sync_now = pos.sync_now.clone();
        Callback::from(move |_| sync_now.emit(()))
    };

    html! {
        <div class="pos-app">
            <header class="pos-header">
                <h1>{"Caja · Taller"}</h1>
                <SyncIndicator status={pos.store.status.clone()} on_sync_now={on_sync_now} />
            </header>

            <section class="quick-sales">
                <h2>{"Venta rápida"}</h2>
                { quick_sale_button("svc-pantalla", "Cambio de pantalla", 8900) }
                { quick_sale_button("svc-bateria", "Cambio de batería", 4500) }
                { quick_sale_button("svc-diagnostico", "Diagnóstico", 1500) }
            </section>

            <section class="pending-list">
                <h2>{ format!("Pendientes de envío ({})", pos.store.pending_count) }</h2>
                <ul>
                    { for pos.pending.iter().map(|p| html! {
                        <li class={if p.has_error() { "pending-item with-error" } else { "pending-item" }}>
                            <span class="pending-id">{ p.id() }</span>
                            <span class="pending-total">{ format_cents(p.transaction.total_cents) }</span>
                            {
                                if let Some(error) = &p.sync_error {
                                    html! { <span class="pending-error">{ format!("⚠️ {}", error) }</span> }
                                } else {
                                    html! {}
                                }
                            }
                        </li>
                    }) }
                </ul>
            </section>
        </div>
    }
}
