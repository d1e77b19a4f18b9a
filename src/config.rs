use std::env;

use crate::error::{AppError, AppResult};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_SOURCE: &str = "Chatbot";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub source: String,
    pub odoo_url: Option<String>,
    pub odoo_db: Option<String>,
    pub odoo_username: Option<String>,
    pub odoo_password: Option<String>,
}

/// Everything needed to talk to the helpdesk backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
}

impl AppConfig {
    /// Reads the process environment after a best-effort `.env` load.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let temperature = match get("INTAKE_TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().map_err(|err| {
                AppError::Configuration(format!("invalid INTAKE_TEMPERATURE '{raw}': {err}"))
            })?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            temperature,
            source: get("INTAKE_SOURCE").unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            odoo_url: get("ODOO_URL"),
            odoo_db: get("ODOO_DB"),
            odoo_username: get("ODOO_USERNAME"),
            odoo_password: get("ODOO_PASSWORD"),
        })
    }

    /// `None` when any of the four backend values is missing.
    pub fn backend_credentials(&self) -> Option<BackendCredentials> {
        Some(BackendCredentials {
            url: self.odoo_url.clone()?,
            db: self.odoo_db.clone()?,
            username: self.odoo_username.clone()?,
            password: self.odoo_password.clone()?,
        })
    }

    pub fn missing_backend_settings(&self) -> Vec<&'static str> {
        [
            ("ODOO_URL", &self.odoo_url),
            ("ODOO_DB", &self.odoo_db),
            ("ODOO_USERNAME", &self.odoo_username),
            ("ODOO_PASSWORD", &self.odoo_password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}
