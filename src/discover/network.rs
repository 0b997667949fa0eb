use super::Discoverer;
use crate::config::NetworkScanConfig;
use crate::errors::DiscoveryError;
use crate::model::{NetworkBaseDetails, Resource};
use crate::result::DiscoveryResult;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const DEFAULT_NETWORK_DISCOVERER_ID: &str = "network_discoverer";

/// Smallest IPv4 prefix length a CIDR target may use, to keep the
/// probe list bounded.
const MIN_CIDR_PREFIX_LEN: u8 = 16;

/// Banner substrings identifying a MySQL (or MariaDB) server
const MYSQL_BANNER_CANARIES: &[&str] = &[
    "mariadb", // MariaDB is a fork of MySQL
    "caching_sha2_password",
    "mysql_native_password",
    "mysql_clear_password",
    "sha256_password",
    "5.7.", // MySQL 5.7.x
    "8.0.", // MySQL 8.0.x
    "10.",  // MariaDB 10.x.x
];

/// Banner substrings identifying an SSH server
const SSH_BANNER_CANARIES: &[&str] = &[
    "ssh",      // SSH v2, OpenSSH, LibSSH, etc...
    "dropbear", // Dropbear server
    "lsh",      // lsh server
];

/// Service classification of a single open TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceKind {
    Http,
    Https,
    Mysql,
    Postgresql,
    Ssh,
}

/// A discoverer for network-reachable services, using rudimentary TCP probes
/// and banner matching.
///
/// The checks can (and will) give false positives or negatives: identifying a
/// service reliably takes a large database of well-known probe/banner pairs,
/// which is out of scope here. Targets may be single IPv4 addresses, CIDR
/// blocks (down to /16), or DNS names.
pub struct NetworkDiscoverer {
    discoverer_id: String,
    config: NetworkScanConfig,
    targets: Vec<String>,
}

impl NetworkDiscoverer {
    pub fn new() -> Self {
        Self {
            discoverer_id: DEFAULT_NETWORK_DISCOVERER_ID.to_string(),
            config: NetworkScanConfig::default(),
            targets: vec!["192.168.1.0/24".to_string()],
        }
    }

    /// Set a non-default discoverer id.
    pub fn with_id(mut self, discoverer_id: impl Into<String>) -> Self {
        self.discoverer_id = discoverer_id.into();
        self
    }

    /// Set non-default targets (IPv4 addresses, CIDR blocks, or DNS names).
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = String>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Set non-default target ports.
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.config.ports = ports.into_iter().collect();
        self
    }

    /// Replace the whole probe configuration.
    pub fn with_config(mut self, config: NetworkScanConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for NetworkDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discoverer for NetworkDiscoverer {
    fn id(&self) -> &str {
        &self.discoverer_id
    }

    async fn discover(&self, shutdown: CancellationToken) -> DiscoveryResult {
        let result = DiscoveryResult::new(&self.discoverer_id);
        tracing::debug!(discoverer_id = %self.discoverer_id, targets = ?self.targets, "starting network discovery pass");

        for target in &self.targets {
            if shutdown.is_cancelled() {
                result.add_error(format!(
                    "discovery cancelled before scanning target {target}"
                ));
                continue;
            }

            let ips = match expand_target(target).await {
                Ok(ips) => ips,
                Err(e) => {
                    result.add_error(format!("failed to get IPs for target {target}: {e}"));
                    continue;
                }
            };

            let probes: Vec<(IpAddr, u16)> = ips
                .iter()
                .flat_map(|&ip| self.config.ports.iter().map(move |&port| (ip, port)))
                .collect();

            stream::iter(probes)
                .map(|(ip, port)| {
                    let config = &self.config;
                    let shutdown = &shutdown;
                    async move {
                        tokio::select! {
                            _ = shutdown.cancelled() => None,
                            kind = probe_service(ip, port, config) => {
                                kind.map(|kind| (ip, port, kind))
                            }
                        }
                    }
                })
                .buffer_unordered(self.config.max_concurrent_probes)
                .for_each(|probed| {
                    let result = &result;
                    async move {
                        if let Some((ip, port, kind)) = probed {
                            // best-effort reverse DNS lookup
                            let hostnames = reverse_dns(ip).await.into_iter().collect();
                            result.add_resource(service_resource(ip, port, kind, hostnames));
                        }
                    }
                })
                .await;
        }

        if shutdown.is_cancelled() {
            result.add_warning("discovery pass interrupted by shutdown; results may be partial");
        }

        result.done();
        tracing::debug!(discoverer_id = %self.discoverer_id, "network discovery pass finished");
        result
    }
}

/// Build the resource record for one identified service.
fn service_resource(ip: IpAddr, port: u16, kind: ServiceKind, hostnames: Vec<String>) -> Resource {
    let details = NetworkBaseDetails {
        ip_address: ip.to_string(),
        port,
        hostnames,
    };
    match kind {
        ServiceKind::Http => Resource::NetworkHttpServer {
            network_http_server_details: details,
        },
        ServiceKind::Https => Resource::NetworkHttpsServer {
            network_https_server_details: details,
        },
        ServiceKind::Mysql => Resource::NetworkMysqlServer {
            network_mysql_server_details: details,
        },
        ServiceKind::Postgresql => Resource::NetworkPostgresqlServer {
            network_postgresql_server_details: details,
        },
        ServiceKind::Ssh => Resource::NetworkSshServer {
            network_ssh_server_details: details,
        },
    }
}

/// Probe a single (address, port) pair and classify the listening service.
///
/// Returns `None` when nothing is listening or the service cannot be
/// identified. Probe failures are not pass failures: a closed port is the
/// normal case, not a diagnostic.
async fn probe_service(ip: IpAddr, port: u16, config: &NetworkScanConfig) -> Option<ServiceKind> {
    let connect_timeout = Duration::from_millis(config.tcp_connect_timeout_ms);
    let banner_timeout = Duration::from_millis(config.banner_read_timeout_ms);

    let mut stream = match timeout(connect_timeout, TcpStream::connect((ip, port))).await {
        Ok(Ok(stream)) => stream,
        _ => return None,
    };

    // server-speaks-first protocols (SSH, MySQL) send a banner on connect
    let mut buf = vec![0u8; 1024];
    if let Ok(Ok(count)) = timeout(banner_timeout, stream.read(&mut buf)).await {
        if count > 0 {
            if let Some(kind) = classify_banner(&String::from_utf8_lossy(&buf[..count])) {
                return Some(kind);
            }
        }
    }

    // TLS ports answer the handshake with binary, not a banner; assume HTTPS
    if matches!(port, 443 | 8443) {
        return Some(ServiceKind::Https);
    }

    // silent listeners: try speaking HTTP to them
    let http_probe = b"HEAD / HTTP/1.0\r\nHost: scanner\r\nConnection: close\r\n\r\n";
    if timeout(connect_timeout, stream.write_all(http_probe))
        .await
        .is_ok()
    {
        if let Ok(Ok(count)) = timeout(banner_timeout, stream.read(&mut buf)).await {
            if count > 0 && buf[..count].starts_with(b"HTTP/") {
                return Some(ServiceKind::Http);
            }
        }
    }

    // postgresql answers nothing until it sees a startup packet; assume that
    // whatever listens silently on 5432 is a postgresql server
    if port == 5432 {
        return Some(ServiceKind::Postgresql);
    }

    None
}

/// Classify a service banner by well-known substrings.
fn classify_banner(banner: &str) -> Option<ServiceKind> {
    let banner = banner.to_lowercase();
    if SSH_BANNER_CANARIES.iter().any(|c| banner.contains(c)) {
        return Some(ServiceKind::Ssh);
    }
    if MYSQL_BANNER_CANARIES.iter().any(|c| banner.contains(c)) {
        return Some(ServiceKind::Mysql);
    }
    None
}

/// Expand a target (IPv4 address, CIDR block, or DNS name) into the
/// addresses to probe.
async fn expand_target(target: &str) -> Result<Vec<IpAddr>, DiscoveryError> {
    if target.contains('/') {
        return expand_cidr(target);
    }
    if let Ok(ip) = IpAddr::from_str(target) {
        return Ok(vec![ip]);
    }

    let name = target.to_string();
    let lookup = {
        let name = name.clone();
        // getaddrinfo blocks; spawn_blocking works on every runtime flavor
        tokio::task::spawn_blocking(move || dns_lookup::lookup_host(&name))
    };
    let ips = lookup
        .await
        .map_err(|e| DiscoveryError::DnsResolutionError(format!("{name}: lookup task failed: {e}")))?
        .map_err(|e| DiscoveryError::DnsResolutionError(format!("{name}: {e}")))?;
    if ips.is_empty() {
        return Err(DiscoveryError::DnsResolutionError(format!(
            "{name}: no addresses found"
        )));
    }
    Ok(ips)
}

/// Expand an IPv4 CIDR block into its host addresses.
fn expand_cidr(cidr: &str) -> Result<Vec<IpAddr>, DiscoveryError> {
    let (base, prefix_len) = cidr
        .split_once('/')
        .ok_or_else(|| DiscoveryError::InvalidTarget(format!("invalid CIDR: {cidr}")))?;

    let base = Ipv4Addr::from_str(base)
        .map_err(|e| DiscoveryError::InvalidTarget(format!("invalid CIDR base address: {e}")))?;
    let prefix_len: u8 = prefix_len
        .parse()
        .map_err(|e| DiscoveryError::InvalidTarget(format!("invalid CIDR prefix length: {e}")))?;
    if prefix_len > 32 {
        return Err(DiscoveryError::InvalidTarget(
            "CIDR prefix length must be <= 32".to_string(),
        ));
    }
    if prefix_len < MIN_CIDR_PREFIX_LEN {
        return Err(DiscoveryError::InvalidTarget(format!(
            "CIDR prefix length must be >= {MIN_CIDR_PREFIX_LEN} to keep the scan bounded"
        )));
    }

    let mask = if prefix_len == 0 {
        0
    } else {
        !((1u32 << (32 - prefix_len)) - 1)
    };
    let network = u32::from(base) & mask;

    if prefix_len >= 31 {
        // point-to-point and host routes have no network/broadcast addresses;
        // range math in u64 so blocks at the top of the address space do not
        // overflow the exclusive bound
        let count = 1u64 << (32 - prefix_len);
        let network = u64::from(network);
        return Ok((network..network + count)
            .map(|bits| IpAddr::V4(Ipv4Addr::from(bits as u32)))
            .collect());
    }

    let broadcast = network | !mask;
    Ok((network + 1..broadcast)
        .map(|bits| IpAddr::V4(Ipv4Addr::from(bits)))
        .collect())
}

/// Best-effort reverse DNS for a discovered address.
async fn reverse_dns(ip: IpAddr) -> Option<String> {
    tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip).ok())
        .await
        .ok()
        .flatten()
}
