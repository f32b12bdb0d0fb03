// ============================================================================
// CAJA OFFLINE PARA TALLER DE REPARACIONES (PWA RUST/WASM)
// ============================================================================
// Núcleo: cola local de transacciones (IndexedDB) + monitor de red +
// coordinador de sincronización. La UI Yew solo consume los hooks.
// - Models: estructuras compartidas con el backend
// - Services: cola, monitor, cliente API y coordinador (sin UI)
// - Stores/Hooks: estado reactivo para componentes
// ============================================================================

pub mod components;
pub mod config;
pub mod hooks;
pub mod models;
pub mod services;
pub mod stores;
pub mod utils;

pub use models::{
    PaymentMethod, PendingTransaction, PosTransaction, SaleItem, SubmitTransactionRequest,
    SubmitTransactionResponse, SyncStatus, SyncSummary, TransactionId,
};
pub use services::{
    ApiClient, DeliveryError, NetworkMonitor, PosTransactionStore, StorageError, SubmitTransactions,
    SyncCoordinator, TransactionStore,
};
