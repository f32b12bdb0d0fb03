pub mod pos_sync_store;

pub use pos_sync_store::PosSyncStore;
