mod deliveries;

use std::str::FromStr;
use reqwest::Url;
use sqlx::{Pool, Sqlite};
use crate::config::DatabaseConfig;
use crate::repo;

pub const AUTHOR_ID: u64 = 12345;
pub const DEST_CHAT_ID: i64 = -100_6789_0000;

pub async fn start_database() -> Pool<Sqlite> {
    let conf = DatabaseConfig {
        url: Url::from_str("sqlite::memory:").expect("invalid database URL"),
        // a single connection keeps every test query on the same in-memory database
        max_connections: 1,
    };
    repo::establish_database_connection(&conf)
        .await.expect("couldn't establish a database connection")
}
