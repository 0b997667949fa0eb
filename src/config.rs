/// Configuration settings for network probing operations
#[derive(Debug, Clone)]
pub struct NetworkScanConfig {
    /// Ports probed on every target address
    pub ports: Vec<u16>,

    /// Timeout in milliseconds for TCP connection attempts
    pub tcp_connect_timeout_ms: u64,

    /// Timeout in milliseconds for banner reading operations
    pub banner_read_timeout_ms: u64,

    /// Maximum number of concurrent probes in flight
    pub max_concurrent_probes: usize,
}

impl Default for NetworkScanConfig {
    fn default() -> Self {
        Self {
            ports: vec![
                22,   // SSH
                80,   // HTTP
                443,  // HTTPS
                3306, // MySQL
                5432, // PostgreSQL
                8080, // HTTP-Alt
                8443, // HTTPS-Alt
            ],
            tcp_connect_timeout_ms: 300,
            banner_read_timeout_ms: 500,
            max_concurrent_probes: 64,
        }
    }
}
