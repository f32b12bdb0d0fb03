pub mod app;
pub mod sync_indicator;

pub use app::App;
pub use sync_indicator::SyncIndicator;
