use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub network_timeout_seconds: u32,
    pub retry_attempts: u32,
    pub pos_config: PosConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:3000".to_string(),
            backend_url_production: "https://api.pos.reparatech.one".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            network_timeout_seconds: 20,
            retry_attempts: 3,
            pos_config: PosConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosConfig {
    /// Moneda en la que se registran los importes
    pub currency: String,
    /// IVA aplicado sobre el subtotal, en puntos básicos (2100 = 21.00%)
    pub tax_rate_bps: u32,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            tax_rate_bps: 2100,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        Self {
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .unwrap_or("http://localhost:3000").to_string(),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .unwrap_or("https://api.pos.reparatech.one").to_string(),
            environment: option_env!("ENVIRONMENT")
                .unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true").parse().unwrap_or(true),
            network_timeout_seconds: option_env!("NETWORK_TIMEOUT_SECONDS")
                .unwrap_or("20").parse().unwrap_or(20),
            retry_attempts: option_env!("RETRY_ATTEMPTS")
                .unwrap_or("3").parse().unwrap_or(3),
            pos_config: PosConfig {
                currency: option_env!("POS_CURRENCY")
                    .unwrap_or("EUR").to_string(),
                tax_rate_bps: option_env!("POS_TAX_RATE_BPS")
                    .unwrap_or("2100").parse().unwrap_or(2100),
            },
        }
    }

    /// Obtiene la URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
