// ============================================================================
// POS SYNC STORE - estado plano para use_state
// ============================================================================

use crate::models::{SyncStatus, SyncSummary};

/// Estado de la cola offline tal y como lo ve la UI
#[derive(Clone, Debug, PartialEq)]
pub struct PosSyncStore {
    /// Recuento leído del almacén tras cada mutación
    pub pending_count: usize,
    pub status: SyncStatus,
    pub is_online: bool,
    /// Resumen del último ciclo de drenaje
    pub last_summary: Option<SyncSummary>,
    pub last_sync_attempt: Option<i64>,
}

impl Default for PosSyncStore {
    fn default() -> Self {
        Self {
            pending_count: 0,
            status: SyncStatus::Synced,
            is_online: true,
            last_summary: None,
            last_sync_attempt: None,
        }
    }
}
