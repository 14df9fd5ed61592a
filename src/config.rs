use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Postgres URL for the idea store. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// Attachment backend: a plain directory, `file://`, `s3://` or `memory://`.
    pub upload_url: String,
    /// Required address suffix, e.g. `@royalcyber.com`.
    pub email_domain: Option<String>,
    /// Reject submissions from addresses without a live verification.
    pub require_verified_email: bool,
    /// How long a successful verification keeps authorising submissions.
    pub verified_ttl_secs: u64,
    /// Retract an issued code when the mail transport fails.
    pub rollback_on_delivery_failure: bool,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub dashboard_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            upload_url: "./uploads".into(),
            email_domain: None,
            require_verified_email: false,
            verified_ttl_secs: 1800,
            rollback_on_delivery_failure: false,
            mail_api_url: None,
            mail_api_key: None,
            mail_from: "no-reply@localhost".into(),
            dashboard_origin: "http://localhost:3000".into(),
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();
    let database_url = non_empty("DATABASE_URL");

    if database_url.is_none() {
        let env_mode = std::env::var("IDEABOX_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "DATABASE_URL is not set. The in-memory idea store loses every \
                 submission on restart and must not be used in production."
            );
        }
    }

    Ok(Config {
        port: std::env::var("IDEABOX_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port),
        database_url,
        upload_url: non_empty("IDEABOX_UPLOAD_URL").unwrap_or(defaults.upload_url),
        email_domain: non_empty("IDEABOX_EMAIL_DOMAIN"),
        require_verified_email: flag("IDEABOX_REQUIRE_VERIFIED_EMAIL")
            .unwrap_or(defaults.require_verified_email),
        verified_ttl_secs: std::env::var("IDEABOX_VERIFIED_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.verified_ttl_secs),
        rollback_on_delivery_failure: flag("IDEABOX_ROLLBACK_ON_DELIVERY_FAILURE")
            .unwrap_or(defaults.rollback_on_delivery_failure),
        mail_api_url: non_empty("IDEABOX_MAIL_API_URL"),
        mail_api_key: non_empty("IDEABOX_MAIL_API_KEY"),
        mail_from: non_empty("IDEABOX_MAIL_FROM").unwrap_or(defaults.mail_from),
        dashboard_origin: non_empty("DASHBOARD_ORIGIN").unwrap_or(defaults.dashboard_origin),
    })
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(key: &str) -> Option<bool> {
    non_empty(key).and_then(|v| parse_flag(&v))
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
