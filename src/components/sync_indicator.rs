// ============================================================================
// SYNC INDICATOR COMPONENT
// ============================================================================
// Indicador no intrusivo del estado de la cola offline. Click = drenar ya.
// ============================================================================

use yew::prelude::*;

use crate::models::SyncStatus;

#[derive(Properties, PartialEq)]
pub struct SyncIndicatorProps {
    pub status: SyncStatus,
    pub on_sync_now: Callback<()>,
}

#[function_component(SyncIndicator)]
pub fn sync_indicator(props: &SyncIndicatorProps) -> Html {
    let (icon, text, class) = match &props.status {
        SyncStatus::Synced => ("✅", "Sincronizado".to_string(), "sync-indicator synced"),
        SyncStatus::Pending { count } => (
            "🔄",
            format!("{} ventas pendientes", count),
            "sync-indicator pending",
        ),
        SyncStatus::Syncing => ("⏳", "Sincronizando...".to_string(), "sync-indicator syncing"),
        SyncStatus::Offline { pending_count } => (
            "📴",
            format!("Offline - {} pendientes", pending_count),
            "sync-indicator offline",
        ),
        SyncStatus::Error { message } => (
            "⚠️",
            format!("Aviso: {}", message),
            "sync-indicator error",
        ),
    };

    let onclick = {
        let on_sync_now = props.on_sync_now.clone();
        Callback::from(move |_| {
            on_sync_now.emit(());
        })
    };

    html! {
        <div class={class} onclick={onclick} title="Click para sincronizar ahora">
            <span class="sync-icon">{icon}</span>
            <span class="sync-text">{text}</span>
        </div>
    }
}
