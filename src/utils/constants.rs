/// Nombre de la base IndexedDB local
pub const DB_NAME: &str = "pos_offline_db";

/// Versión del esquema local. Al subirla, el hook de upgrade crea
/// los object stores que falten sin tocar los datos existentes.
pub const DB_VERSION: u32 = 1;

/// Object store de transacciones pendientes de envío
pub const STORE_PENDING_TRANSACTIONS: &str = "pending_transactions";

/// Prefijo de los IDs generados localmente, para distinguirlos
/// de los IDs asignados por el servidor
pub const LOCAL_ID_PREFIX: &str = "local_";
