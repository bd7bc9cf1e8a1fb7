/// URL for accessing the PostgreSQL database. When this variable is absent the
/// application falls back to the local SQLite database file instead
pub const DB_URL: &str = "DATABASE_URL";
/// Path of the SQLite database file used when [DB_URL] is not set. Defaults to `app.db`
/// in the working directory; the file is created on first start
pub const SQLITE_DB_FILE: &str = "SQLITE_DB_FILE";
/// Log level configuration for the application. For formatting info, see
/// [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Socket address the HTTP server binds to, e.g. `0.0.0.0:8080`
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
