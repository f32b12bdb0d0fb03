use serde::{Deserialize, Serialize};

use crate::models::transaction::PosTransaction;

/// Registro tal y como vive en la cola local: la venta más los metadatos
/// de sincronización. El payload nunca se muta; solo `sync_error` se
/// actualiza tras un intento fallido.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingTransaction {
    pub transaction: PosTransaction,
    /// Momento en que se escribió por primera vez en la cola local
    pub offline_created_at: i64,
    /// Último error de envío, si hubo un intento que falló
    pub sync_error: Option<String>,
}

impl PendingTransaction {
    pub fn new(transaction: PosTransaction) -> Self {
        Self {
            transaction,
            offline_created_at: chrono::Utc::now().timestamp(),
            sync_error: None,
        }
    }

    /// Clave de la cola local
    pub fn id(&self) -> &str {
        self.transaction.id.as_str()
    }

    pub fn has_error(&self) -> bool {
        self.sync_error.is_some()
    }
}

/// Resumen de un ciclo de drenaje (informativo, no muta la cola)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Estado de sincronización para la UI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncStatus {
    Synced,
    Pending { count: usize },
    Syncing,
    Offline { pending_count: usize },
    Error { message: String },
}

// ============================================================================
// DTOs DEL ENDPOINT DE ENVÍO
// ============================================================================

/// Request de envío. El backend deduplica por el ID incluido en la
/// transacción, así que reenviar tras un fallo local es seguro.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub transaction: PosTransaction,
}

/// Respuesta del backend al registrar una transacción
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    pub success: bool,
    /// ID asignado por el servidor cuando acepta la transacción
    pub server_id: Option<String>,
    pub receipt_number: Option<String>,
    pub error: Option<String>,
}
