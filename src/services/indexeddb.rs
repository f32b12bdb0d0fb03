// ============================================================================
// INDEXEDDB - ALMACENAMIENTO LOCAL DURABLE
// ============================================================================
// Envuelve la API de IndexedDB (callbacks) en futures mediante canales
// oneshot. Apertura con versión de esquema: el hook de upgrade crea los
// object stores que falten y preserva los datos existentes.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    window, Event, IdbDatabase, IdbObjectStore, IdbOpenDbRequest, IdbRequest, IdbTransactionMode,
};

use crate::services::error::StorageError;

/// Conexión a un object store concreto de IndexedDB.
/// Clonable: comparte la misma conexión subyacente.
#[derive(Clone)]
pub struct IndexedDb {
    db: IdbDatabase,
    store_name: String,
}

impl IndexedDb {
    /// Abre (o crea) la base con la versión de esquema indicada.
    /// En upgrade se crea el object store si no existe todavía.
    pub async fn open(name: &str, version: u32, store_name: &str) -> Result<Self, StorageError> {
        let window = window().ok_or(StorageError::Unavailable)?;
        let factory = window
            .indexed_db()
            .map_err(|e| StorageError::Open(js_error_message(&e)))?
            .ok_or(StorageError::Unavailable)?;

        let request: IdbOpenDbRequest = factory
            .open_with_u32(name, version)
            .map_err(|e| StorageError::Open(js_error_message(&e)))?;

        let upgrade = {
            let store_name = store_name.to_string();
            let request = request.clone();
            Closure::once(move |_event: Event| {
                let db = request
                    .result()
                    .ok()
                    .and_then(|r| r.dyn_into::<IdbDatabase>().ok());

                if let Some(db) = db {
                    if !db.object_store_names().contains(&store_name) {
                        match db.create_object_store(&store_name) {
                            Ok(_) => log::info!("📦 Object store creado: {}", store_name),
                            Err(e) => log::error!(
                                "❌ No se pudo crear el object store {}: {}",
                                store_name,
                                js_error_message(&e)
                            ),
                        }
                    }
                }
            })
        };
        request.set_onupgradeneeded(Some(upgrade.as_ref().unchecked_ref()));

        let result = await_request(request.clone().unchecked_into::<IdbRequest>())
            .await
            .map_err(StorageError::Open)?;

        let db = result
            .dyn_into::<IdbDatabase>()
            .map_err(|_| StorageError::Open("el resultado de open no es una base".to_string()))?;

        Ok(Self {
            db,
            store_name: store_name.to_string(),
        })
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readwrite)
            .map_err(StorageError::Write)?;
        let request = store
            .put_with_key(&JsValue::from_str(value), &JsValue::from_str(key))
            .map_err(|e| StorageError::Write(js_error_message(&e)))?;
        await_request(request).await.map_err(StorageError::Write)?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readonly)
            .map_err(StorageError::Read)?;
        let request = store
            .get(&JsValue::from_str(key))
            .map_err(|e| StorageError::Read(js_error_message(&e)))?;
        let value = await_request(request).await.map_err(StorageError::Read)?;

        if value.is_undefined() || value.is_null() {
            Ok(None)
        } else {
            Ok(value.as_string())
        }
    }

    pub async fn get_all(&self) -> Result<Vec<String>, StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readonly)
            .map_err(StorageError::Read)?;
        let request = store
            .get_all()
            .map_err(|e| StorageError::Read(js_error_message(&e)))?;
        let value = await_request(request).await.map_err(StorageError::Read)?;

        let array = js_sys::Array::from(&value);
        Ok(array.iter().filter_map(|v| v.as_string()).collect())
    }

    /// Borrado idempotente: si la clave no existe, IndexedDB no falla.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readwrite)
            .map_err(StorageError::Delete)?;
        let request = store
            .delete(&JsValue::from_str(key))
            .map_err(|e| StorageError::Delete(js_error_message(&e)))?;
        await_request(request).await.map_err(StorageError::Delete)?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readwrite)
            .map_err(StorageError::Delete)?;
        let request = store
            .clear()
            .map_err(|e| StorageError::Delete(js_error_message(&e)))?;
        await_request(request).await.map_err(StorageError::Delete)?;
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, StorageError> {
        let store = self
            .object_store(IdbTransactionMode::Readonly)
            .map_err(StorageError::Read)?;
        let request = store
            .count()
            .map_err(|e| StorageError::Read(js_error_message(&e)))?;
        let value = await_request(request).await.map_err(StorageError::Read)?;
        Ok(value.as_f64().unwrap_or(0.0) as usize)
    }

    fn object_store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore, String> {
        let tx = self
            .db
            .transaction_with_str_and_mode(&self.store_name, mode)
            .map_err(|e| js_error_message(&e))?;
        tx.object_store(&self.store_name)
            .map_err(|e| js_error_message(&e))
    }
}

/// Convierte un IdbRequest en future: resuelve en onsuccess/onerror.
/// Los closures viven en el stack de la función hasta que el canal resuelve,
/// así que no hace falta forget().
async fn await_request(request: IdbRequest) -> Result<JsValue, String> {
    let (sender, receiver) = oneshot::channel::<Result<JsValue, String>>();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let on_success = {
        let sender = sender.clone();
        let request = request.clone();
        Closure::once(move |_event: Event| {
            if let Some(tx) = sender.borrow_mut().take() {
                let _ = tx.send(request.result().map_err(|e| js_error_message(&e)));
            }
        })
    };

    let on_error = {
        let sender = sender.clone();
        let request = request.clone();
        Closure::once(move |_event: Event| {
            if let Some(tx) = sender.borrow_mut().take() {
                let message = request
                    .error()
                    .ok()
                    .flatten()
                    .map(|e| e.message())
                    .unwrap_or_else(|| "error desconocido de IndexedDB".to_string());
                let _ = tx.send(Err(message));
            }
        })
    };

    request.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
    request.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let result = receiver
        .await
        .map_err(|_| "operación IndexedDB cancelada".to_string())?;

    request.set_onsuccess(None);
    request.set_onerror(None);

    result
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<web_sys::DomException>()
        .map(|e| e.message())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
