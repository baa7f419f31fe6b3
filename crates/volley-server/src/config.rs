use std::path::PathBuf;

use volley_core::{HandlerKind, HandlerSpec, VolleyError};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the scanner
/// binaries. Override via environment variables (or a `.env` file).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight jobs on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Enabled handlers, in submission order.
    pub handlers: Vec<HandlerSpec>,
    /// Working directory for the scanner processes (default: inherited).
    pub working_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `HOST`                     | `127.0.0.1`                    |
    /// | `PORT`                     | `8080`                         |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                           |
    /// | `VOLLEY_HANDLERS`          | `txportmap,fastjsonscan,f403`  |
    /// | `VOLLEY_TXPORTMAP_BIN`     | `./TxPortMap_linux_x64`        |
    /// | `VOLLEY_FASTJSONSCAN_BIN`  | `./FastjsonScan_linux_amd64`   |
    /// | `VOLLEY_F403_BIN`          | `./f403_linux_amd64`           |
    /// | `VOLLEY_WORKDIR`           | unset                          |
    ///
    /// Panics on malformed numbers. An unknown handler name is returned as
    /// `UnsupportedHandler` so startup can refuse to run.
    pub fn from_env() -> Result<Self, VolleyError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let names = std::env::var("VOLLEY_HANDLERS")
            .unwrap_or_else(|_| "txportmap,fastjsonscan,f403".into());
        let handlers = parse_handlers(&names, |kind| std::env::var(binary_env_var(kind)).ok())?;

        let working_dir = std::env::var("VOLLEY_WORKDIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            shutdown_timeout_secs,
            handlers,
            working_dir,
        })
    }
}

/// `VOLLEY_<NAME>_BIN`
pub fn binary_env_var(kind: HandlerKind) -> String {
    format!("VOLLEY_{}_BIN", kind.name().to_ascii_uppercase())
}

/// Parse a comma-separated handler list. `binary_for` supplies an override
/// for a handler's binary, falling back to the conventional name.
pub fn parse_handlers(
    names: &str,
    binary_for: impl Fn(HandlerKind) -> Option<String>,
) -> Result<Vec<HandlerSpec>, VolleyError> {
    names
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            let kind: HandlerKind = name.parse()?;
            Ok(match binary_for(kind) {
                Some(binary) => HandlerSpec::new(kind, binary),
                None => HandlerSpec::with_default_binary(kind),
            })
        })
        .collect()
}
