// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio, solo hace requests HTTP
// ============================================================================

use futures::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;

use crate::config::CONFIG;
use crate::models::{PendingTransaction, SubmitTransactionRequest, SubmitTransactionResponse};
use crate::services::error::DeliveryError;

/// Colaborador externo al que el coordinador entrega transacciones.
/// ApiClient lo implementa contra el backend real; los tests usan un mock.
#[allow(async_fn_in_trait)]
pub trait SubmitTransactions {
    async fn submit(
        &self,
        pending: &PendingTransaction,
    ) -> Result<SubmitTransactionResponse, DeliveryError>;
}

/// Cliente API - SOLO comunicación HTTP (stateless)
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_seconds: u32,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_url: CONFIG.backend_url().to_string(),
            timeout_seconds: CONFIG.network_timeout_seconds,
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout_seconds: CONFIG.network_timeout_seconds,
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitTransactions for ApiClient {
    async fn submit(
        &self,
        pending: &PendingTransaction,
    ) -> Result<SubmitTransactionResponse, DeliveryError> {
        let url = format!("{}/v1/pos/transactions", self.base_url);
        let request = SubmitTransactionRequest {
            transaction: pending.transaction.clone(),
        };

        log::info!("📤 Enviando transacción {} al backend", pending.id());

        let request = Request::post(&url)
            .json(&request)
            .map_err(|e| DeliveryError::Parse(format!("serialización: {}", e)))?;

        // La petición compite contra el timeout configurado; si expira,
        // cuenta como entrega fallida y se reintenta en el siguiente ciclo
        let send = Box::pin(request.send());
        let timeout = Box::pin(TimeoutFuture::new(self.timeout_seconds * 1000));

        let response = match select(send, timeout).await {
            Either::Left((result, _)) => {
                result.map_err(|e| DeliveryError::Network(e.to_string()))?
            }
            Either::Right(_) => return Err(DeliveryError::Timeout(self.timeout_seconds)),
        };

        if !response.ok() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| response.status_text());
            return Err(DeliveryError::Rejected { status, message });
        }

        response
            .json::<SubmitTransactionResponse>()
            .await
            .map_err(|e| DeliveryError::Parse(e.to_string()))
    }
}
