mod submissions;
mod destinations;
mod deliveries;

#[cfg(test)]
pub(crate) mod test;

use std::str::FromStr;
use sqlx::{Pool, Sqlite};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
pub use submissions::*;
pub use destinations::*;
pub use deliveries::*;
use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Repositories {
    pub submissions: Submissions,
    pub destinations: Destinations,
    pub deliveries: Deliveries,
}

impl Repositories {
    pub fn new(db_conn: &Pool<Sqlite>) -> Self {
        Self {
            submissions: Submissions::new(db_conn.clone()),
            destinations: Destinations::new(db_conn.clone()),
            deliveries: Deliveries::new(db_conn.clone()),
        }
    }
}

pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Sqlite>, anyhow::Error> {
    let options = SqliteConnectOptions::from_str(config.url.as_str())?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

#[macro_export]
macro_rules! repository {
    ($name:ident, $($methods:item),*) => {
        #[derive(Clone)]
        pub struct $name {
            pool: sqlx::Pool<sqlx::Sqlite>,
        }

        impl $name {
            pub fn new(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
                Self { pool }
            }

            $($methods)*
        }
    };
}
