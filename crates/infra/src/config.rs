use certwatch_domain::ExpiryPolicy;
use certwatch_utils::create_random_secret;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SmtpTls {
    None,
    StartTls,
    Tls,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, e.g. `Certwatch <no-reply@example.com>`
    pub from: String,
    pub tls: SmtpTls,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret used to sign and verify admin session tokens
    pub admin_session_secret: String,
    /// Shared secret the cron caller sends in the `x-cron-secret` header.
    /// The cron path is disabled when this is not set.
    pub cron_secret: Option<String>,
    /// What to do with certifications stored without an expiry date
    pub expiry_policy: ExpiryPolicy,
    /// How long a certification stays claimed by one reminder run before
    /// another run may pick it up again
    pub reminder_lock_secs: i64,
    /// When set the server sweeps due reminders on this interval itself
    pub reminder_sweep_interval_secs: Option<u64>,
    /// Outbound email settings. Sending fails with a configuration error
    /// when missing.
    pub smtp: Option<SmtpConfig>,
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value.",
                    name, value
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_optional_env<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("The given {}: {} is not valid, ignoring it.", name, value);
            None
        }
    }
}

const DEFAULT_REMINDER_LOCK_SECS: i64 = 5 * 60;
const MAX_REMINDER_LOCK_SECS: i64 = 24 * 60 * 60;
const MAX_DEFAULT_VALIDITY_YEARS: u32 = 100;

fn bounded_reminder_lock_secs(secs: i64) -> i64 {
    if (1..=MAX_REMINDER_LOCK_SECS).contains(&secs) {
        return secs;
    }
    warn!(
        "The given REMINDER_LOCK_SECS: {} is not between 1 and {}, falling back to {}.",
        secs, MAX_REMINDER_LOCK_SECS, DEFAULT_REMINDER_LOCK_SECS
    );
    DEFAULT_REMINDER_LOCK_SECS
}

fn bounded_default_validity_years(years: Option<u32>) -> Option<u32> {
    match years {
        Some(years) if !(1..=MAX_DEFAULT_VALIDITY_YEARS).contains(&years) => {
            warn!(
                "The given DEFAULT_VALIDITY_YEARS: {} is not between 1 and {}, ignoring it.",
                years, MAX_DEFAULT_VALIDITY_YEARS
            );
            None
        }
        years => years,
    }
}

impl SmtpConfig {
    fn from_env() -> Option<Self> {
        let host = match std::env::var("SMTP_HOST") {
            Ok(host) => host,
            Err(_) => {
                warn!("Did not find SMTP_HOST environment variable. Reminder emails can not be sent until it is configured.");
                return None;
            }
        };
        let from = match std::env::var("SMTP_FROM") {
            Ok(from) => from,
            Err(_) => {
                warn!("Did not find SMTP_FROM environment variable. Reminder emails can not be sent until it is configured.");
                return None;
            }
        };
        let tls = match std::env::var("SMTP_TLS").as_deref() {
            Ok("none") => SmtpTls::None,
            Ok("tls") => SmtpTls::Tls,
            Ok("starttls") | Err(_) => SmtpTls::StartTls,
            Ok(other) => {
                warn!(
                    "The given SMTP_TLS: {} is not valid, expected none, starttls or tls. Falling back to starttls.",
                    other
                );
                SmtpTls::StartTls
            }
        };

        Some(Self {
            host,
            port: parse_env("SMTP_PORT", 587),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            from,
            tls,
            timeout_secs: parse_env("SMTP_TIMEOUT_SECS", 30),
        })
    }
}

impl Config {
    pub fn new() -> Self {
        let admin_session_secret = match std::env::var("ADMIN_SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find ADMIN_SESSION_SECRET environment variable. Going to create one, existing admin sessions will not survive a restart.");
                create_random_secret(32)
            }
        };
        let cron_secret = std::env::var("CRON_SECRET").ok();
        if cron_secret.is_none() {
            info!("Did not find CRON_SECRET environment variable. The cron reminder trigger is disabled.");
        }

        let expiry_policy = ExpiryPolicy {
            default_validity_years: bounded_default_validity_years(parse_optional_env(
                "DEFAULT_VALIDITY_YEARS",
            )),
        };
        match expiry_policy.default_validity_years {
            Some(years) => info!(
                "Certifications without expiry date are treated as valid for {} years",
                years
            ),
            None => info!("Certifications without expiry date never expire"),
        }

        Self {
            port: parse_env("PORT", 5000),
            admin_session_secret,
            cron_secret,
            expiry_policy,
            reminder_lock_secs: bounded_reminder_lock_secs(parse_env(
                "REMINDER_LOCK_SECS",
                DEFAULT_REMINDER_LOCK_SECS,
            )),
            reminder_sweep_interval_secs: parse_optional_env("REMINDER_SWEEP_INTERVAL_SECS"),
            smtp: SmtpConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
