// ============================================================================
// USE OFFLINE POS HOOK
// ============================================================================
// Une cola local + coordinador + monitor de red y lo expone como estado
// reactivo: guardar venta, sincronizar ahora, recuento de pendientes.
// ============================================================================

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_network_status::{use_network_status, UseNetworkStatusHandle};
use crate::models::{PendingTransaction, PosTransaction, SyncStatus};
use crate::services::{ApiClient, IndexedDbBackend, PosTransactionStore, SyncCoordinator};
use crate::stores::PosSyncStore;

type PosCoordinator = SyncCoordinator<IndexedDbBackend, ApiClient>;

#[derive(Clone)]
pub struct UseOfflinePosHandle {
    pub store: UseStateHandle<PosSyncStore>,
    pub pending: UseStateHandle<Vec<PendingTransaction>>,
    pub network: UseNetworkStatusHandle,
    pub save_transaction: Callback<PosTransaction>,
    pub sync_now: Callback<()>,
    pub clear_all: Callback<()>,
}

fn status_for(count: usize, online: bool) -> SyncStatus {
    if !online {
        SyncStatus::Offline {
            pending_count: count,
        }
    } else if count == 0 {
        SyncStatus::Synced
    } else {
        SyncStatus::Pending { count }
    }
}

/// Relee la cola y reconstruye el estado visible de una vez (un único set
/// por operación: los sets intermedios no serían visibles hasta el rerender)
async fn refresh_view(
    queue: &PosTransactionStore,
    store: &UseStateHandle<PosSyncStore>,
    pending: &UseStateHandle<Vec<PendingTransaction>>,
    online: bool,
    mutate: impl FnOnce(&mut PosSyncStore),
) {
    match queue.get_pending().await {
        Ok(list) => {
            let mut next = (**store).clone();
            next.pending_count = list.len();
            next.is_online = online;
            next.status = status_for(list.len(), online);
            mutate(&mut next);
            store.set(next);
            pending.set(list);
        }
        Err(e) => {
            log::warn!("⚠️ No se pudo releer la cola offline: {}", e);
            let mut next = (**store).clone();
            next.is_online = online;
            next.status = SyncStatus::Error {
                message: e.to_string(),
            };
            mutate(&mut next);
            store.set(next);
        }
    }
}

#[hook]
pub fn use_offline_pos() -> UseOfflinePosHandle {
    let network = use_network_status();
    let store = use_state(PosSyncStore::default);
    let pending = use_state(Vec::<PendingTransaction>::new);

    let queue = (*use_state(PosTransactionStore::new)).clone();
    let coordinator = (*use_state({
        let queue = queue.clone();
        move || PosCoordinator::new(queue, ApiClient::new())
    }))
    .clone();

    // Guardar venta en la cola. Un StorageError no corta el flujo de caja:
    // la venta sigue en memoria del llamador y aquí solo queda el aviso.
    let save_transaction = {
        let queue = queue.clone();
        let store = store.clone();
        let pending = pending.clone();
        let is_online = network.is_online.clone();

        Callback::from(move |tx: PosTransaction| {
            let queue = queue.clone();
            let store = store.clone();
            let pending = pending.clone();
            let online = *is_online;

            spawn_local(async move {
                match queue.save(&tx).await {
                    Ok(_) => refresh_view(&queue, &store, &pending, online, |_| {}).await,
                    Err(e) => {
                        log::warn!("⚠️ Venta sin persistir (sigue en memoria): {}", e);
                        let mut next = (*store).clone();
                        next.status = SyncStatus::Error {
                            message: e.to_string(),
                        };
                        store.set(next);
                    }
                }
            });
        })
    };

    // Drenaje manual
    let sync_now = {
        let queue = queue.clone();
        let coordinator = coordinator.clone();
        let store = store.clone();
        let pending = pending.clone();
        let is_online = network.is_online.clone();

        Callback::from(move |_| {
            let queue = queue.clone();
            let coordinator = coordinator.clone();
            let store = store.clone();
            let pending = pending.clone();
            let online = *is_online;

            let mut syncing = (*store).clone();
            syncing.status = SyncStatus::Syncing;
            store.set(syncing);

            spawn_local(async move {
                let summary = coordinator.sync_now().await;
                refresh_view(&queue, &store, &pending, online, |next| {
                    next.last_summary = Some(summary);
                    next.last_sync_attempt = Some(chrono::Utc::now().timestamp());
                })
                .await;
            });
        })
    };

    let clear_all = {
        let queue = queue.clone();
        let store = store.clone();
        let pending = pending.clone();
        let is_online = network.is_online.clone();

        Callback::from(move |_| {
            let queue = queue.clone();
            let store = store.clone();
            let pending = pending.clone();
            let online = *is_online;

            spawn_local(async move {
                if let Err(e) = queue.clear_all().await {
                    log::warn!("⚠️ No se pudo vaciar la cola: {}", e);
                }
                refresh_view(&queue, &store, &pending, online, |_| {}).await;
            });
        })
    };

    // Transiciones de red: al pasar a online se drena la cola (y en el
    // primer render se recuperan las pendientes de sesiones anteriores)
    {
        let queue = queue.clone();
        let coordinator = coordinator.clone();
        let store = store.clone();
        let pending = pending.clone();

        use_effect_with(*network.is_online, move |online| {
            let online = *online;
            spawn_local(async move {
                let summary = if online {
                    Some(coordinator.sync_now().await)
                } else {
                    None
                };
                refresh_view(&queue, &store, &pending, online, |next| {
                    if summary.map(|s| s.total() > 0).unwrap_or(false) {
                        next.last_summary = summary;
                        next.last_sync_attempt = Some(chrono::Utc::now().timestamp());
                    }
                })
                .await;
            });
            || ()
        });
    }

    UseOfflinePosHandle {
        store,
        pending,
        network,
        save_transaction,
        sync_now,
        clear_all,
    }
}
