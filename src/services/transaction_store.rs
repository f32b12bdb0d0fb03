// ============================================================================
// COLA LOCAL DE TRANSACCIONES PENDIENTES
// ============================================================================
// Persistencia durable de ventas completadas sin conexión (o cuyo envío
// falló), clave = ID de la transacción. El coordinador de sync las lee y
// las borra; el único campo que se muta en sitio es sync_error.
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::models::{PendingTransaction, PosTransaction};
use crate::services::error::StorageError;
use crate::services::indexeddb::IndexedDb;
use crate::utils::constants::{DB_NAME, DB_VERSION, STORE_PENDING_TRANSACTIONS};

/// Almacenamiento clave-valor sobre el que opera la cola.
/// El backend real es IndexedDB; el de memoria sirve de respaldo cuando
/// IndexedDB no está disponible y como doble en tests.
#[allow(async_fn_in_trait)]
pub trait KvBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn get_all(&self) -> Result<Vec<String>, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
    async fn count(&self) -> Result<usize, StorageError>;
}

/// Backend IndexedDB con apertura perezosa: la base se abre una sola vez
/// por instancia, en el primer uso.
#[derive(Clone, Default)]
pub struct IndexedDbBackend {
    db: Rc<RefCell<Option<IndexedDb>>>,
}

impl IndexedDbBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ensure_open(&self) -> Result<IndexedDb, StorageError> {
        if let Some(db) = self.db.borrow().clone() {
            return Ok(db);
        }

        let db = IndexedDb::open(DB_NAME, DB_VERSION, STORE_PENDING_TRANSACTIONS).await?;
        *self.db.borrow_mut() = Some(db.clone());
        Ok(db)
    }
}

impl KvBackend for IndexedDbBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_open().await?.put(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_open().await?.get(key).await
    }

    async fn get_all(&self) -> Result<Vec<String>, StorageError> {
        self.ensure_open().await?.get_all().await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_open().await?.delete(key).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.ensure_open().await?.clear().await
    }

    async fn count(&self) -> Result<usize, StorageError> {
        self.ensure_open().await?.count().await
    }
}

/// Backend en memoria (respaldo y tests). No sobrevive a recargas.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    map: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.borrow().get(key).cloned())
    }

    async fn get_all(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.map.borrow().values().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.map.borrow_mut().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.map.borrow().len())
    }
}

/// Cola local de transacciones pendientes de envío
#[derive(Clone)]
pub struct TransactionStore<B: KvBackend> {
    backend: B,
}

/// Cola con el backend de producción
pub type PosTransactionStore = TransactionStore<IndexedDbBackend>;

impl TransactionStore<IndexedDbBackend> {
    pub fn new() -> Self {
        Self::with_backend(IndexedDbBackend::new())
    }
}

impl Default for TransactionStore<IndexedDbBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: KvBackend> TransactionStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Guarda (inserta o sobrescribe) la venta en la cola, estampando
    /// offline_created_at. Devuelve la clave usada.
    pub async fn save(&self, transaction: &PosTransaction) -> Result<String, StorageError> {
        let pending = PendingTransaction::new(transaction.clone());
        let id = pending.id().to_string();
        let json = serde_json::to_string(&pending)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.backend.put(&id, &json).await?;
        log::info!("💾 Transacción {} guardada en la cola offline", id);
        Ok(id)
    }

    /// Snapshot fresco de todas las pendientes, sin orden garantizado.
    /// Un registro ilegible se omite del listado (queda en la base,
    /// nunca se borra en silencio) y se deja constancia en el log.
    pub async fn get_pending(&self) -> Result<Vec<PendingTransaction>, StorageError> {
        let raw = self.backend.get_all().await?;
        let mut pending = Vec::with_capacity(raw.len());

        for json in raw {
            match serde_json::from_str::<PendingTransaction>(&json) {
                Ok(tx) => pending.push(tx),
                Err(e) => log::warn!("⚠️ Registro ilegible en la cola offline: {}", e),
            }
        }

        Ok(pending)
    }

    /// Borra una entrada. No-op si la clave no existe.
    pub async fn clear_one(&self, id: &str) -> Result<(), StorageError> {
        self.backend.delete(id).await
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.backend.clear().await?;
        log::info!("🗑️ Cola offline vaciada");
        Ok(())
    }

    /// Recuento leído del almacén en cada llamada, nunca cacheado
    pub async fn pending_count(&self) -> Result<usize, StorageError> {
        self.backend.count().await
    }

    /// Anota el último fallo de envío en el registro. Si la entrada ya no
    /// existe (sincronizada entre medias), no hay nada que anotar.
    pub async fn mark_sync_error(&self, id: &str, message: &str) -> Result<(), StorageError> {
        let Some(json) = self.backend.get(id).await? else {
            return Ok(());
        };

        let mut pending: PendingTransaction = serde_json::from_str(&json)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        pending.sync_error = Some(message.to_string());

        let json = serde_json::to_string(&pending)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.put(id, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, SaleItem};
    use futures::executor::block_on;

    fn venta(descripcion: &str) -> PosTransaction {
        PosTransaction::new(
            vec![SaleItem {
                product_id: "svc-pantalla".to_string(),
                description: descripcion.to_string(),
                quantity: 1,
                unit_price_cents: 8900,
            }],
            PaymentMethod::Cash,
            None,
        )
    }

    fn store() -> TransactionStore<MemoryBackend> {
        TransactionStore::with_backend(MemoryBackend::new())
    }

    #[test]
    fn guardar_y_listar_roundtrip() {
        block_on(async {
            let store = store();
            let tx = venta("Cambio de pantalla");

            let id = store.save(&tx).await.unwrap();
            assert_eq!(id, tx.id.as_str());

            let pending = store.get_pending().await.unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].transaction, tx);
            assert_eq!(pending[0].sync_error, None);
            assert!(pending[0].offline_created_at > 0);
        });
    }

    #[test]
    fn contador_refleja_el_almacen() {
        block_on(async {
            let store = store();
            let ids: Vec<String> = {
                let mut ids = Vec::new();
                for i in 0..3 {
                    ids.push(store.save(&venta(&format!("venta {}", i))).await.unwrap());
                }
                ids
            };
            assert_eq!(store.pending_count().await.unwrap(), 3);

            store.clear_one(&ids[0]).await.unwrap();
            assert_eq!(store.pending_count().await.unwrap(), 2);

            store.clear_all().await.unwrap();
            assert_eq!(store.pending_count().await.unwrap(), 0);
            assert!(store.get_pending().await.unwrap().is_empty());
        });
    }

    #[test]
    fn clear_one_es_idempotente() {
        block_on(async {
            let store = store();
            let id = store.save(&venta("única")).await.unwrap();

            store.clear_one(&id).await.unwrap();
            // Segunda llamada: no-op, no error
            store.clear_one(&id).await.unwrap();
            assert_eq!(store.pending_count().await.unwrap(), 0);
        });
    }

    #[test]
    fn sobrescribir_no_duplica() {
        block_on(async {
            let store = store();
            let tx = venta("repetida");

            store.save(&tx).await.unwrap();
            store.save(&tx).await.unwrap();
            assert_eq!(store.pending_count().await.unwrap(), 1);
        });
    }

    #[test]
    fn marcar_error_anota_sin_tocar_el_payload() {
        block_on(async {
            let store = store();
            let tx = venta("con fallo");
            let id = store.save(&tx).await.unwrap();

            store.mark_sync_error(&id, "HTTP 500").await.unwrap();

            let pending = store.get_pending().await.unwrap();
            assert_eq!(pending[0].sync_error.as_deref(), Some("HTTP 500"));
            assert_eq!(pending[0].transaction, tx);

            // Sobre una clave inexistente no hay nada que anotar
            store.mark_sync_error("local_fantasma", "da igual").await.unwrap();
        });
    }
}
