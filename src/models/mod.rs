pub mod transaction;
pub mod sync;

pub use transaction::{PaymentMethod, PosTransaction, SaleItem, TransactionId};
pub use sync::{
    PendingTransaction, SubmitTransactionRequest, SubmitTransactionResponse, SyncStatus,
    SyncSummary,
};
