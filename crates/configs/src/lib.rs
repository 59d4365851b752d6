use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::time::Duration;

pub const DEFAULT_CRM_BASE_URL: &str = "https://api-in21.leadsquared.com";
pub const DEFAULT_OWNER_ID: &str = "956ec177-ab3f-11f0-a635-0630e4b64663";
pub const DEFAULT_SHEET_WEBAPP_URL: &str = "https://script.google.com/macros/s/AKfycbzqSc5akQnBMb9ujjAibVWXx1_Z6SWSkM0jGlKh8VmoWbmuuZw-zD5Bpc_OPqL0F1vE3A/exec";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            public_dir: default_public_dir(),
        }
    }
}

/// LeadSquared credentials and routing.
///
/// The CRM is only called when both keys are present.
#[derive(Clone, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            access_key: None,
            secret_key: None,
            owner_id: default_owner_id(),
        }
    }
}

// keys stay out of Debug output so a logged config never leaks them
impl std::fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    #[serde(default = "default_sheet_webapp_url")]
    pub webapp_url: Option<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self { webapp_url: default_sheet_webapp_url() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_public_dir() -> String { "public".into() }
fn default_crm_base_url() -> String { DEFAULT_CRM_BASE_URL.into() }
fn default_owner_id() -> String { DEFAULT_OWNER_ID.into() }
fn default_sheet_webapp_url() -> Option<String> { Some(DEFAULT_SHEET_WEBAPP_URL.into()) }
fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 15 }

/// Load from `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment values on top of the file config.
    ///
    /// `lookup` is injected so tests do not have to mutate the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_HOST") { self.server.host = v; }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = v.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number, got {v:?}"))?;
        }
        if let Some(v) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = Some(v.parse().map_err(|_| anyhow!("TOKIO_WORKER_THREADS must be a positive integer, got {v:?}"))?);
        }
        if let Some(v) = lookup("PUBLIC_DIR") { self.server.public_dir = v; }

        if let Some(v) = lookup("LEADSQUARED_BASE_URL") { self.crm.base_url = v; }
        if let Some(v) = lookup("LEADSQUARED_ACCESS_KEY") { self.crm.access_key = Some(v); }
        if let Some(v) = lookup("LEADSQUARED_SECRET_KEY") { self.crm.secret_key = Some(v); }
        if let Some(v) = lookup("LEADSQUARED_OWNER_ID") { self.crm.owner_id = v; }

        if let Some(v) = lookup("SHEET_WEBAPP_URL") { self.sheet.webapp_url = Some(v); }

        if let Some(v) = lookup("HTTP_CONNECT_TIMEOUT_SECS") {
            self.http.connect_timeout_secs = v.parse().map_err(|_| anyhow!("HTTP_CONNECT_TIMEOUT_SECS must be an integer, got {v:?}"))?;
        }
        if let Some(v) = lookup("HTTP_REQUEST_TIMEOUT_SECS") {
            self.http.request_timeout_secs = v.parse().map_err(|_| anyhow!("HTTP_REQUEST_TIMEOUT_SECS must be an integer, got {v:?}"))?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.crm.normalize()?;
        self.sheet.normalize()?;
        self.http.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) => return Err(anyhow!("server.worker_threads must be >= 1")),
            None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.public_dir.trim().is_empty() {
            self.public_dir = default_public_dir();
        }
        Ok(())
    }
}

impl CrmConfig {
    fn normalize(&mut self) -> Result<()> {
        self.access_key = blank_to_none(self.access_key.take());
        self.secret_key = blank_to_none(self.secret_key.take());
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        validate_url("crm.base_url", &trimmed)?;
        self.base_url = trimmed;
        if self.owner_id.trim().is_empty() {
            self.owner_id = default_owner_id();
        }
        Ok(())
    }

    /// Both keys, or nothing.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(a), Some(s)) => Some((a, s)),
            _ => None,
        }
    }
}

impl SheetConfig {
    fn normalize(&mut self) -> Result<()> {
        self.webapp_url = blank_to_none(self.webapp_url.take());
        if let Some(url) = &self.webapp_url {
            validate_url("sheet.webapp_url", url)?;
        }
        Ok(())
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("http timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(anyhow!("{field} must start with http:// or https://"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_validate() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.public_dir, "public");
        assert_eq!(cfg.crm.base_url, DEFAULT_CRM_BASE_URL);
        assert!(cfg.crm.credentials().is_none());
        assert_eq!(cfg.sheet.webapp_url.as_deref(), Some(DEFAULT_SHEET_WEBAPP_URL));
    }

    #[test]
    fn toml_sections_are_optional() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [crm]
            access_key = "ak"
            secret_key = "sk"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.crm.credentials(), Some(("ak", "sk")));
        assert_eq!(cfg.crm.owner_id, DEFAULT_OWNER_ID);
        assert_eq!(cfg.http.request_timeout_secs, 15);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("SERVER_PORT", "3000"),
            ("LEADSQUARED_ACCESS_KEY", "ak"),
            ("LEADSQUARED_SECRET_KEY", "sk"),
            ("LEADSQUARED_BASE_URL", "http://localhost:9999/"),
            ("SHEET_WEBAPP_URL", ""),
        ]))
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.crm.base_url, "http://localhost:9999");
        assert_eq!(cfg.crm.credentials(), Some(("ak", "sk")));
        assert!(cfg.sheet.webapp_url.is_none());
    }

    #[test]
    fn half_configured_credentials_disable_crm() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("LEADSQUARED_ACCESS_KEY", "ak"), ("LEADSQUARED_SECRET_KEY", "  ")]))
            .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert!(cfg.crm.credentials().is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env(&[("SERVER_PORT", "http")])).is_err());

        let mut cfg = AppConfig::default();
        cfg.crm.base_url = "ftp://example.com".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.http.connect_timeout_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn zero_worker_threads_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("TOKIO_WORKER_THREADS", "0")])).unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.worker_threads = None;
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut cfg = CrmConfig::default();
        cfg.access_key = Some("super-secret-access".into());
        cfg.secret_key = Some("super-secret-key".into());
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }
}
