pub mod use_network_status;
pub mod use_offline_pos;

pub use use_network_status::{use_network_status, UseNetworkStatusHandle};
pub use use_offline_pos::{use_offline_pos, UseOfflinePosHandle};
