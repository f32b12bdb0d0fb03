use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::utils::constants::LOCAL_ID_PREFIX;

// ============================================================================
// MODELO DE TRANSACCIÓN POS
// ============================================================================
// La cola offline trata la transacción como payload opaco: aquí vive la
// forma que comparte con el backend, la cola solo persiste y reenvía.
// ============================================================================

/// Identidad de una transacción en sus dos fases de vida:
/// - `Unsynced`: creada en caja, ID generado localmente con prefijo `local_`
/// - `Synced`: aceptada por el servidor, ID asignado por el backend
///
/// Variante etiquetada en lugar de un campo opcional para que el match
/// sea exhaustivo en ambas fases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionId {
    Unsynced { local_id: String },
    Synced { server_id: String },
}

impl TransactionId {
    /// Genera un ID local nuevo (transacción todavía sin confirmar)
    pub fn new_local() -> Self {
        TransactionId::Unsynced {
            local_id: format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4()),
        }
    }

    /// Clave bajo la que se persiste/envía, sea local o del servidor
    pub fn as_str(&self) -> &str {
        match self {
            TransactionId::Unsynced { local_id } => local_id,
            TransactionId::Synced { server_id } => server_id,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, TransactionId::Synced { .. })
    }
}

/// Línea de venta (producto o servicio de reparación)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub product_id: String,
    pub description: String,
    pub quantity: u32,
    /// Precio unitario en céntimos
    pub unit_price_cents: i64,
}

impl SaleItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// Venta completada en caja. Los importes van en céntimos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosTransaction {
    pub id: TransactionId,
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    /// Referencia al cliente del CRM, si la venta no es anónima
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    /// Momento en que se completó la venta en caja (epoch segundos)
    pub created_at: i64,
}

impl PosTransaction {
    /// Crea una venta nueva con ID local y totales calculados
    pub fn new(items: Vec<SaleItem>, payment_method: PaymentMethod, customer_id: Option<String>) -> Self {
        let subtotal_cents: i64 = items.iter().map(|i| i.line_total_cents()).sum();
        let tax_cents = subtotal_cents * CONFIG.pos_config.tax_rate_bps as i64 / 10_000;

        Self {
            id: TransactionId::new_local(),
            items,
            subtotal_cents,
            tax_cents,
            total_cents: subtotal_cents + tax_cents,
            customer_id,
            payment_method,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}
