use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use secrecy::SecretString;

use crate::Config;

pub const PROJECT_VAR: &str = "VERTEX_AI_PROJECT";
pub const REGION_VAR: &str = "VERTEX_AI_REGION";
pub const HOST_VAR: &str = "PROXY_HOST";
pub const PORT_VAR: &str = "PROXY_PORT";
pub const ACCESS_TOKEN_VAR: &str = "VERTEX_ACCESS_TOKEN";
pub const MAX_TOOL_LOG_VAR: &str = "MAX_TOOL_LOG_CHARS";

/// Apply deployment environment variables on top of file configuration
///
/// Unset or empty variables leave the file value (or its default) in place.
pub fn apply_overrides(config: &mut Config) -> anyhow::Result<()> {
    if let Some(project) = var(PROJECT_VAR) {
        config.backend.project = project;
    }

    if let Some(region) = var(REGION_VAR) {
        config.backend.region = region;
    }

    if let Some(token) = var(ACCESS_TOKEN_VAR) {
        config.credentials.access_token = Some(SecretString::from(token));
    }

    if let Some(max) = var(MAX_TOOL_LOG_VAR) {
        config.sanitizer.max_tool_log_chars = max
            .parse()
            .map_err(|e| anyhow::anyhow!("{MAX_TOOL_LOG_VAR} must be a positive integer: {e}"))?;
    }

    let host = var(HOST_VAR);
    let port = var(PORT_VAR);

    if host.is_some() || port.is_some() {
        let current = config.server.listen_address();

        let ip = match host {
            Some(host) => resolve_host(&host)?,
            None => current.ip(),
        };

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("{PORT_VAR} must be a port number: {e}"))?,
            None => current.port(),
        };

        config.server.listen_address = Some(SocketAddr::new(ip, port));
    }

    Ok(())
}

/// Accept an IP literal or a hostname such as `localhost`
fn resolve_host(host: &str) -> anyhow::Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    (host, 0)
        .to_socket_addrs()
        .map_err(|e| anyhow::anyhow!("{HOST_VAR} must be an IP address or resolvable hostname: {e}"))?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| anyhow::anyhow!("{HOST_VAR} hostname {host} resolved to no addresses"))
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
