use std::net::SocketAddr;

use workout_history::WorkoutError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, WorkoutError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads `ADDRESS`, `PORT` and `MAX_HTTP_BODY_SIZE` through `get`.
    /// `PORT` replaces only the port of the resolved address.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, WorkoutError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let raw_addr = get("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let mut addr: SocketAddr = raw_addr.trim().parse().map_err(|_| {
            WorkoutError::Config(format!("ADDRESS must be host:port, got '{raw_addr}'"))
        })?;
        if let Some(port) = get("PORT") {
            let port = port.trim().parse::<u16>().map_err(|_| {
                WorkoutError::Config(format!("PORT must be a port number, got '{port}'"))
            })?;
            addr.set_port(port);
        }
        let max_body_size = match get("MAX_HTTP_BODY_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                WorkoutError::Config(format!("MAX_HTTP_BODY_SIZE must be a byte count, got '{raw}'"))
            })?,
            None => DEFAULT_MAX_BODY_SIZE,
        };
        Ok(Self {
            addr,
            max_body_size,
        })
    }
}
