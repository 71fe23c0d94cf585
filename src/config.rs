use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

/// Options for the external WhatsApp messaging API and message templates.
/// Passed by value into the services that use it. Credentials may be left
/// empty, in which case the outbound channel logs and no-ops.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub base_url: String,
    pub phone_number_id: String,
    pub api_key: String,
    pub language_code: String,
    pub day0_template_name: String,
    pub day1_template_name: String,
    pub day3_template_name: String,
    pub day0_language_code: Option<String>,
    pub day0_header_image_link: Option<String>,
    pub day0_header_image_id: Option<String>,
    pub send_hi_before_template: bool,
}

impl WhatsAppConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.phone_number_id.trim().is_empty()
    }
}

/// Timing knobs for the review message sequence. Dev deployments use short
/// values; production polls hourly with day-scale delays.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub polling_interval_seconds: u64,
    pub day1_delay_minutes: i64,
    pub day3_delay_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub whatsapp: WhatsAppConfig,
    pub schedule: ScheduleConfig,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            whatsapp: WhatsAppConfig {
                base_url: get_env_or("WHATSAPP_BASE_URL", "https://alots.io/v20.0"),
                phone_number_id: get_env_or("WHATSAPP_PHONE_NUMBER_ID", ""),
                api_key: get_env_or("WHATSAPP_API_KEY", ""),
                language_code: get_env_or("WHATSAPP_LANGUAGE_CODE", "en"),
                day0_template_name: get_env_or("WHATSAPP_DAY0_TEMPLATE", "review_request_day0"),
                day1_template_name: get_env_or("WHATSAPP_DAY1_TEMPLATE", "review_reminder_day1"),
                day3_template_name: get_env_or("WHATSAPP_DAY3_TEMPLATE", "review_reminder_day3"),
                day0_language_code: env::var("WHATSAPP_DAY0_LANGUAGE_CODE").ok(),
                day0_header_image_link: env::var("WHATSAPP_DAY0_HEADER_IMAGE_LINK").ok(),
                day0_header_image_id: env::var("WHATSAPP_DAY0_HEADER_IMAGE_ID").ok(),
                send_hi_before_template: get_env_parse_or("WHATSAPP_SEND_HI_FIRST", false)?,
            },
            schedule: ScheduleConfig {
                polling_interval_seconds: get_env_parse_or("REVIEW_POLL_INTERVAL_SECONDS", 3600)?,
                day1_delay_minutes: get_env_parse_or("REVIEW_DAY1_DELAY_MINUTES", 1440)?,
                day3_delay_minutes: get_env_parse_or("REVIEW_DAY3_DELAY_MINUTES", 4320)?,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
