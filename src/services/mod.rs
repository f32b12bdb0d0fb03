pub mod api_client;
pub mod error;
pub mod indexeddb;
pub mod network_monitor;
pub mod sync_coordinator;
pub mod transaction_store;

pub use api_client::{ApiClient, SubmitTransactions};
pub use error::{DeliveryError, StorageError};
pub use network_monitor::{ConnectivityState, NetworkMonitor};
pub use sync_coordinator::SyncCoordinator;
pub use transaction_store::{
    IndexedDbBackend, KvBackend, MemoryBackend, PosTransactionStore, TransactionStore,
};
