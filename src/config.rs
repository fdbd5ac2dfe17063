//! Service configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). The store endpoint and anon key use the `PUBLIC_` names the
//! hosted project dashboard hands out.

use std::net::SocketAddr;

/// Table created by the bundled `migrations/`.
pub const MIGRATED_TABLE: &str = "drips";

/// Configuration failure raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Why the value was refused.
        reason: String,
    },
}

/// Connection settings for the direct PostgreSQL backend.
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Seconds to wait when acquiring a connection.
    pub connect_timeout_secs: u64,
    /// Apply the bundled migrations at startup.
    pub run_migrations: bool,
}

/// Which store backs the `drips` table.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Hosted PostgREST endpoint.
    Rest {
        /// Project URL, e.g. `https://abc.supabase.co`.
        url: String,
        /// Public (non-secret) anon key.
        anon_key: String,
    },
    /// Direct PostgreSQL connection.
    Postgres(PostgresSettings),
    /// In-process table, lost on restart.
    Memory,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`CanvasConfig::from_env`].
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Selected store backend and its settings.
    pub store: StoreBackend,

    /// Name of the drip table.
    pub table: String,

    /// Per-request timeout for the REST store client, in seconds.
    pub store_timeout_secs: u64,

    /// Timeout applied to every incoming HTTP request, in seconds.
    pub request_timeout_secs: u64,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,
}

impl CanvasConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults for optional variables. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LISTEN_ADDR` cannot be parsed, the
    /// backend name is unknown, a variable required by the selected backend
    /// is missing, `DRIPS_TABLE` is not a plain identifier, or migrations are
    /// requested for a table they do not create.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_addr = env_or("LISTEN_ADDR", "0.0.0.0:3000")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "LISTEN_ADDR",
                reason: e.to_string(),
            })?;

        let store = match env_or("STORE_BACKEND", "rest").to_ascii_lowercase().as_str() {
            "rest" | "supabase" => StoreBackend::Rest {
                url: required("PUBLIC_SUPABASE_URL")?,
                anon_key: required("PUBLIC_SUPABASE_ANON_KEY")?,
            },
            "postgres" => StoreBackend::Postgres(PostgresSettings {
                database_url: required("DATABASE_URL")?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
                connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5),
                run_migrations: parse_env_bool("DATABASE_RUN_MIGRATIONS", false),
            }),
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    reason: format!("unknown backend {other:?}"),
                });
            }
        };

        let table = env_or("DRIPS_TABLE", "drips");
        validate_table(&table)?;
        if let StoreBackend::Postgres(settings) = &store {
            validate_migrations(settings.run_migrations, &table)?;
        }

        Ok(Self {
            listen_addr,
            store,
            table,
            store_timeout_secs: parse_env("STORE_TIMEOUT_SECS", 10),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

/// Table names are spliced into SQL and URLs, so only `[A-Za-z0-9_]` is allowed.
fn validate_table(table: &str) -> Result<(), ConfigError> {
    let plain = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key: "DRIPS_TABLE",
            reason: format!("{table:?} is not a plain identifier"),
        })
    }
}

/// The bundled migrations create `drips`; running them for another table
/// would leave the configured one missing.
fn validate_migrations(run_migrations: bool, table: &str) -> Result<(), ConfigError> {
    if run_migrations && table != MIGRATED_TABLE {
        return Err(ConfigError::Invalid {
            key: "DATABASE_RUN_MIGRATIONS",
            reason: format!("migrations create {MIGRATED_TABLE:?}, but DRIPS_TABLE is {table:?}"),
        });
    }
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

/// Parses an environment variable or returns `default`.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref().map(str::to_ascii_lowercase) {
        Some(v) if v == "true" || v == "1" => true,
        Some(v) if v == "false" || v == "0" => false,
        _ => default,
    }
}
