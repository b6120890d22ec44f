//! pframe-ui specific configuration

/// Web UI server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to (all interfaces)
    pub port: u16,
}
