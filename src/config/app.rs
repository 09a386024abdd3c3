use anyhow::anyhow;
use chrono::FixedOffset;
use reqwest::Url;
use teloxide::types::UserId;
use crate::config::env::*;

const SECONDS_PER_HOUR: i32 = 3600;

#[derive(Clone)]
pub struct AppConfig {
    /// The single privileged actor: approves submissions and manages destinations.
    pub moderator_id: UserId,
    pub time_zone: FixedOffset,
    pub time_zone_label: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let moderator_id: u64 = get_env_mandatory_value("MODERATOR_ID")?;
        let tz_offset_hours: i32 = get_env_value_or_default("TZ_OFFSET_HOURS", 7);
        let time_zone = FixedOffset::east_opt(tz_offset_hours * SECONDS_PER_HOUR)
            .ok_or(anyhow!("invalid TZ_OFFSET_HOURS value: {tz_offset_hours}"))?;
        let time_zone_label = get_env_value_or_default("TZ_LABEL", "WIB".to_owned());
        Ok(Self {
            moderator_id: UserId(moderator_id),
            time_zone,
            time_zone_label,
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("DATABASE_URL")?,
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 10)
        })
    }
}
