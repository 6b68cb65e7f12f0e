use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// External food APIs used to hydrate meal entries and build meal plans.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub spoonacular_base_url: String,
    pub spoonacular_api_key: String,
    pub openfoodfacts_base_url: String,
    pub http_timeout_secs: u64,
}

/// Wall-clock trigger of the daily ledger reset, always in UTC.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    pub hour_utc: u8,
    pub minute_utc: u8,
    pub batch_size: usize,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            hour_utc: 3,
            minute_utc: 45,
            batch_size: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub catalog: CatalogConfig,
    pub reset: ResetConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "befit".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "befit-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let catalog = CatalogConfig {
            spoonacular_base_url: std::env::var("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
            spoonacular_api_key: std::env::var("SPOONACULAR_API_KEY")?,
            openfoodfacts_base_url: std::env::var("OPENFOODFACTS_BASE_URL")
                .unwrap_or_else(|_| "https://world.openfoodfacts.org".into()),
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 10),
        };
        let defaults = ResetConfig::default();
        let reset = ResetConfig {
            hour_utc: parse_or("RESET_HOUR_UTC", defaults.hour_utc),
            minute_utc: parse_or("RESET_MINUTE_UTC", defaults.minute_utc),
            batch_size: parse_or("RESET_BATCH_SIZE", defaults.batch_size),
        };
        anyhow::ensure!(reset.hour_utc < 24, "RESET_HOUR_UTC must be in 0..24");
        anyhow::ensure!(reset.minute_utc < 60, "RESET_MINUTE_UTC must be in 0..60");
        anyhow::ensure!(reset.batch_size > 0, "RESET_BATCH_SIZE must be positive");

        Ok(Self {
            database_url,
            jwt,
            catalog,
            reset,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
