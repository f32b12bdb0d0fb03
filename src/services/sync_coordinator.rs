// ============================================================================
// COORDINADOR DE SINCRONIZACIÓN
// ============================================================================
// Al recuperar la conexión (o a petición manual) drena la cola offline:
// snapshot de pendientes, un intento de envío por transacción y por ciclo,
// borrado individual al aceptar, anotación de sync_error al fallar.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;

use crate::models::SyncSummary;
use crate::services::api_client::SubmitTransactions;
use crate::services::network_monitor::NetworkMonitor;
use crate::services::transaction_store::{KvBackend, TransactionStore};

#[derive(Clone)]
pub struct SyncCoordinator<B: KvBackend, S: SubmitTransactions> {
    store: TransactionStore<B>,
    submitter: S,
    in_flight: Rc<Cell<bool>>,
}

impl<B, S> SyncCoordinator<B, S>
where
    B: KvBackend + Clone + 'static,
    S: SubmitTransactions + Clone + 'static,
{
    pub fn new(store: TransactionStore<B>, submitter: S) -> Self {
        Self {
            store,
            submitter,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    /// Un ciclo de drenaje. Si ya hay un ciclo en curso devuelve un
    /// resumen vacío en lugar de drenar dos veces las mismas entradas.
    pub async fn sync_now(&self) -> SyncSummary {
        if self.in_flight.replace(true) {
            log::info!("🔄 Sincronización ya en progreso, saltando...");
            return SyncSummary::default();
        }

        let summary = self.drain().await;
        self.in_flight.set(false);
        summary
    }

    /// Dispara un ciclo cada vez que el monitor pasa a online
    pub fn start_auto_sync(&self, monitor: &NetworkMonitor) {
        let coordinator = self.clone();
        monitor.start_monitoring(move |online| {
            if online {
                let coordinator = coordinator.clone();
                spawn_local(async move {
                    log::info!("🌐 Conexión recuperada - drenando cola offline");
                    coordinator.sync_now().await;
                });
            }
        });
    }

    async fn drain(&self) -> SyncSummary {
        // Snapshot al inicio del ciclo: cada entrada se intenta como mucho
        // una vez aunque entren ventas nuevas mientras drenamos
        let pending = match self.store.get_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                log::error!("❌ No se pudo leer la cola offline: {}", e);
                return SyncSummary::default();
            }
        };

        if pending.is_empty() {
            log::info!("📭 Sin transacciones pendientes");
            return SyncSummary::default();
        }

        log::info!("🔄 Drenando cola offline: {} transacciones", pending.len());
        let mut summary = SyncSummary::default();

        for tx in &pending {
            match self.submitter.submit(tx).await {
                Ok(response) if response.success => {
                    if let Err(e) = self.store.clear_one(tx.id()).await {
                        // El backend ya aceptó la venta: la copia local
                        // obsoleta se reenviará el próximo ciclo y el
                        // backend deduplica por ID
                        log::warn!(
                            "⚠️ {} aceptada pero no se pudo borrar localmente: {}",
                            tx.id(),
                            e
                        );
                    }
                    summary.succeeded += 1;
                    log::info!(
                        "✅ Transacción {} aceptada (recibo: {})",
                        tx.id(),
                        response.receipt_number.as_deref().unwrap_or("-")
                    );
                }
                Ok(response) => {
                    let reason = response
                        .error
                        .unwrap_or_else(|| "rechazada sin detalle".to_string());
                    self.note_failure(tx.id(), &reason).await;
                    summary.failed += 1;
                }
                Err(e) => {
                    self.note_failure(tx.id(), &e.to_string()).await;
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "🏁 Ciclo completado: {} enviadas, {} siguen pendientes",
            summary.succeeded,
            summary.failed
        );
        summary
    }

    /// El fallo queda anotado en el registro; la entrada sigue en cola
    /// para el próximo ciclo
    async fn note_failure(&self, id: &str, reason: &str) {
        log::warn!("⚠️ Envío fallido de {}: {}", id, reason);
        if let Err(e) = self.store.mark_sync_error(id, reason).await {
            log::error!("❌ No se pudo anotar el error en {}: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        PaymentMethod, PendingTransaction, PosTransaction, SaleItem, SubmitTransactionResponse,
    };
    use crate::services::error::{DeliveryError, StorageError};
    use crate::services::transaction_store::MemoryBackend;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Backend remoto de mentira: acepta todo salvo los IDs marcados
    #[derive(Clone, Default)]
    struct MockRemote {
        reject: Rc<RefCell<HashSet<String>>>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl MockRemote {
        fn reject_id(&self, id: &str) {
            self.reject.borrow_mut().insert(id.to_string());
        }
    }

    impl SubmitTransactions for MockRemote {
        async fn submit(
            &self,
            pending: &PendingTransaction,
        ) -> Result<SubmitTransactionResponse, DeliveryError> {
            self.calls.borrow_mut().push(pending.id().to_string());

            if self.reject.borrow().contains(pending.id()) {
                return Err(DeliveryError::Rejected {
                    status: 422,
                    message: "total inválido".to_string(),
                });
            }

            Ok(SubmitTransactionResponse {
                success: true,
                server_id: Some(format!("srv-{}", self.calls.borrow().len())),
                receipt_number: Some("R-0001".to_string()),
                error: None,
            })
        }
    }

    fn venta(descripcion: &str) -> PosTransaction {
        PosTransaction::new(
            vec![SaleItem {
                product_id: "svc-bateria".to_string(),
                description: descripcion.to_string(),
                quantity: 1,
                unit_price_cents: 4500,
            }],
            PaymentMethod::Card,
            Some("cliente-7".to_string()),
        )
    }

    fn setup() -> (TransactionStore<MemoryBackend>, MockRemote, SyncCoordinator<MemoryBackend, MockRemote>) {
        let store = TransactionStore::with_backend(MemoryBackend::new());
        let remote = MockRemote::default();
        let coordinator = SyncCoordinator::new(store.clone(), remote.clone());
        (store, remote, coordinator)
    }

    #[test]
    fn drenaje_completo_vacia_la_cola() {
        block_on(async {
            let (store, remote, coordinator) = setup();
            for i in 0..3 {
                store.save(&venta(&format!("venta {}", i))).await.unwrap();
            }
            assert_eq!(store.pending_count().await.unwrap(), 3);

            let summary = coordinator.sync_now().await;

            assert_eq!(summary, SyncSummary { succeeded: 3, failed: 0 });
            assert_eq!(store.pending_count().await.unwrap(), 0);
            assert!(store.get_pending().await.unwrap().is_empty());
            assert_eq!(remote.calls.borrow().len(), 3);
        });
    }

    #[test]
    fn el_fallo_de_una_no_bloquea_a_las_demas() {
        block_on(async {
            let (store, remote, coordinator) = setup();
            let id_a = store.save(&venta("aceptada")).await.unwrap();
            let id_b = store.save(&venta("rechazada")).await.unwrap();
            remote.reject_id(&id_b);

            let summary = coordinator.sync_now().await;
            assert_eq!(summary, SyncSummary { succeeded: 1, failed: 1 });

            let pending = store.get_pending().await.unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id(), id_b);
            assert!(pending[0].sync_error.as_deref().unwrap().contains("422"));
            assert!(!pending.iter().any(|p| p.id() == id_a));
        });
    }

    #[test]
    fn un_intento_por_transaccion_y_ciclo() {
        block_on(async {
            let (store, remote, coordinator) = setup();
            let id_a = store.save(&venta("a")).await.unwrap();
            let id_b = store.save(&venta("b")).await.unwrap();
            remote.reject_id(&id_a);
            remote.reject_id(&id_b);

            let summary = coordinator.sync_now().await;
            assert_eq!(summary, SyncSummary { succeeded: 0, failed: 2 });
            assert_eq!(remote.calls.borrow().len(), 2);

            // Siguen en cola, elegibles para el próximo ciclo
            let summary = coordinator.sync_now().await;
            assert_eq!(summary.failed, 2);
            assert_eq!(remote.calls.borrow().len(), 4);
        });
    }

    #[test]
    fn ciclo_sin_pendientes_devuelve_resumen_vacio() {
        block_on(async {
            let (_store, remote, coordinator) = setup();
            let summary = coordinator.sync_now().await;
            assert_eq!(summary, SyncSummary::default());
            assert!(remote.calls.borrow().is_empty());
        });
    }

    /// Backend KV cuyo próximo borrado falla (una sola vez)
    #[derive(Clone, Default)]
    struct FragileDelete {
        inner: MemoryBackend,
        fail_next_delete: Rc<Cell<bool>>,
    }

    impl KvBackend for FragileDelete {
        async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.put(key, value).await
        }

        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn get_all(&self) -> Result<Vec<String>, StorageError> {
            self.inner.get_all().await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_next_delete.replace(false) {
                return Err(StorageError::Delete("cuota de disco agotada".to_string()));
            }
            self.inner.delete(key).await
        }

        async fn clear(&self) -> Result<(), StorageError> {
            self.inner.clear().await
        }

        async fn count(&self) -> Result<usize, StorageError> {
            self.inner.count().await
        }
    }

    #[test]
    fn aceptada_sin_borrar_cuenta_como_enviada_y_se_purga_despues() {
        block_on(async {
            let backend = FragileDelete::default();
            let store = TransactionStore::with_backend(backend.clone());
            let remote = MockRemote::default();
            let coordinator = SyncCoordinator::new(store.clone(), remote.clone());

            store.save(&venta("aceptada")).await.unwrap();
            backend.fail_next_delete.set(true);

            // El backend remoto acepta pero el borrado local falla: cuenta
            // como enviada y la copia obsoleta queda para el próximo ciclo
            let summary = coordinator.sync_now().await;
            assert_eq!(summary, SyncSummary { succeeded: 1, failed: 0 });
            assert_eq!(store.pending_count().await.unwrap(), 1);
            assert_eq!(remote.calls.borrow().len(), 1);
            assert_eq!(store.get_pending().await.unwrap()[0].sync_error, None);

            // Siguiente ciclo: reenvío (el backend deduplica por ID) y purga
            let summary = coordinator.sync_now().await;
            assert_eq!(summary, SyncSummary { succeeded: 1, failed: 0 });
            assert_eq!(store.pending_count().await.unwrap(), 0);
            assert_eq!(remote.calls.borrow().len(), 2);
        });
    }

    /// Cede el turno una vez antes de completar, para que otra tarea
    /// pueda ejecutarse mientras el envío está suspendido
    struct YieldOnce {
        yielded: bool,
    }

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.yielded {
                Poll::Ready(())
            } else {
                self.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Backend remoto que acepta todo pero se suspende en cada envío
    #[derive(Clone, Default)]
    struct SlowRemote {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl SubmitTransactions for SlowRemote {
        async fn submit(
            &self,
            pending: &PendingTransaction,
        ) -> Result<SubmitTransactionResponse, DeliveryError> {
            YieldOnce { yielded: false }.await;
            self.calls.borrow_mut().push(pending.id().to_string());

            Ok(SubmitTransactionResponse {
                success: true,
                server_id: Some(format!("srv-{}", pending.id())),
                receipt_number: None,
                error: None,
            })
        }
    }

    #[test]
    fn un_ciclo_en_curso_bloquea_al_segundo() {
        block_on(async {
            let store = TransactionStore::with_backend(MemoryBackend::new());
            let remote = SlowRemote::default();
            let coordinator = SyncCoordinator::new(store.clone(), remote.clone());

            store.save(&venta("a")).await.unwrap();
            store.save(&venta("b")).await.unwrap();

            // El segundo ciclo arranca mientras el primero está suspendido
            // en un envío: debe devolver el resumen vacío sin tocar la cola
            let (first, second) =
                futures::future::join(coordinator.sync_now(), coordinator.sync_now()).await;

            assert_eq!(second, SyncSummary::default());
            assert_eq!(first, SyncSummary { succeeded: 2, failed: 0 });
            assert_eq!(store.pending_count().await.unwrap(), 0);

            // Cada transacción se envió exactamente una vez
            assert_eq!(remote.calls.borrow().len(), 2);
        });
    }
}
