use thiserror::Error;

/// Fallo de persistencia local (abrir/leer/escribir/borrar en IndexedDB).
/// Nunca bloquea el flujo de caja: la venta en curso sigue en memoria y
/// el fallo se muestra como aviso, no como crash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("IndexedDB no disponible en este entorno")]
    Unavailable,

    #[error("no se pudo abrir la base local: {0}")]
    Open(String),

    #[error("error leyendo el almacén local: {0}")]
    Read(String),

    #[error("error escribiendo en el almacén local: {0}")]
    Write(String),

    #[error("error borrando del almacén local: {0}")]
    Delete(String),

    #[error("error serializando el registro: {0}")]
    Serialization(String),
}

/// Fallo de envío al backend. Se anota en `sync_error` del registro
/// pendiente y se reintenta en el siguiente ciclo.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("error de red: {0}")]
    Network(String),

    #[error("timeout tras {0}s sin respuesta del backend")]
    Timeout(u32),

    #[error("rechazado por el backend (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("respuesta del backend ilegible: {0}")]
    Parse(String),
}
