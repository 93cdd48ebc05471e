//! Assembles the peer store, the ordered hook list, and the two frontends
//! from a loaded configuration, but does not start anything — the caller
//! decides when to `start` each returned frontend.
use std::net::SocketAddr;
use std::sync::Arc;

use glowworm_configuration::{ClientApprovalConfig, Configuration, HookConfig, JwtConfig, VarintervalConfig};
use glowworm_hooks::hooks::client_approval::ClientApprovalConfigError;
use glowworm_hooks::hooks::jwt::JwtConfigError;
use glowworm_hooks::hooks::varinterval::VarintervalConfigError;
use glowworm_hooks::{AnnounceHook, ClientApproval, Jwt, Pipeline, Varinterval};
use glowworm_primitives::ClientId;
use glowworm_swarm_store::SwarmStore;
use thiserror::Error;

use crate::http::{AppState, Server as HttpServer};
use crate::udp::connection::{ConnectionIdIssuer, HmacConnectionIdIssuer, Secret};
use crate::udp::handlers::Shared as UdpShared;
use crate::udp::Server as UdpServer;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("unrecognized hook name `{0}`")]
    UnknownHook(String),
    #[error("invalid configuration for hook `{name}`: {source}")]
    InvalidHookConfig { name: String, source: toml::de::Error },
    #[error("client approval hook misconfigured: {0}")]
    ClientApproval(#[from] ClientApprovalConfigError),
    #[error("jwt hook misconfigured: {0}")]
    Jwt(#[from] JwtConfigError),
    #[error("interval variation hook misconfigured: {0}")]
    Varinterval(#[from] VarintervalConfigError),
    #[error("client approval hex client id `{0}` is malformed")]
    MalformedClientId(String),
    #[error("invalid connection-id secret: expected 64 hex characters")]
    InvalidSecret,
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),
}

/// Everything needed to start the tracker's two frontends, already wired to
/// one shared store and hook pipeline. `Option::None` for a frontend means
/// its config left it disabled.
pub struct App {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<SwarmStore>,
    pub udp: Option<(UdpServer<crate::udp::Stopped>, Arc<UdpShared>)>,
    pub http: Option<(HttpServer<crate::http::Stopped>, Arc<AppState>)>,
    pub storage: glowworm_configuration::Storage,
    /// The configured JWT hook, if any, plus the interval its key set
    /// should be refreshed on. Separate from `pipeline`'s erased hook list
    /// so the bootstrap's background job can call it directly.
    pub jwt_refresh: Option<(Arc<Jwt>, std::time::Duration)>,
}

enum BuiltHook {
    Plain(Arc<dyn AnnounceHook>),
    Jwt(Arc<Jwt>, std::time::Duration),
}

/// # Errors
///
/// Returns `Err` if a configured hook name is unrecognized, a hook's config
/// table doesn't match its expected shape, a hook's own constructor rejects
/// its configuration, or a frontend's bind address fails to parse.
pub async fn build(config: &Configuration) -> Result<App, BootstrapError> {
    let store = Arc::new(SwarmStore::with_shard_count(config.storage.shard_count));

    let mut hook_configs: Vec<&HookConfig> = config.prehooks.iter().collect();
    hook_configs.extend(config.posthooks.iter());

    let mut hooks: Vec<Arc<dyn AnnounceHook>> = Vec::with_capacity(hook_configs.len());
    let mut jwt_refresh = None;
    for hook_config in hook_configs {
        match build_hook(hook_config).await? {
            BuiltHook::Plain(hook) => hooks.push(hook),
            BuiltHook::Jwt(jwt, interval) => {
                hooks.push(Arc::clone(&jwt) as Arc<dyn AnnounceHook>);
                jwt_refresh = Some((jwt, interval));
            }
        }
    }

    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&store),
        hooks,
        config.announce_policy.interval,
        config.announce_policy.default_numwant as usize,
        config.announce_policy.max_numwant as usize,
    ));

    let udp = if config.udp.enabled {
        let secret = match &config.udp.private_key {
            Some(hex) => Secret::from_hex(hex).ok_or(BootstrapError::InvalidSecret)?,
            None => Secret::generate_random(),
        };
        let bind_to: SocketAddr = config
            .udp
            .bind_address
            .parse()
            .map_err(|_| BootstrapError::InvalidBindAddress(config.udp.bind_address.clone()))?;
        let shared = Arc::new(UdpShared {
            pipeline: Arc::clone(&pipeline),
            connection_issuer: Arc::new(HmacConnectionIdIssuer::new(secret)) as Arc<dyn ConnectionIdIssuer + Send + Sync>,
            max_clock_skew: u32::try_from(config.udp.max_clock_skew).unwrap_or(u32::MAX),
        });
        Some((UdpServer::new(bind_to), shared))
    } else {
        None
    };

    let http = if config.http.enabled {
        let bind_to: SocketAddr = config
            .http
            .bind_address
            .parse()
            .map_err(|_| BootstrapError::InvalidBindAddress(config.http.bind_address.clone()))?;
        let state = Arc::new(AppState {
            pipeline: Arc::clone(&pipeline),
            allow_ip_spoofing: config.http.allow_ip_spoofing,
            real_ip_header: config.http.real_ip_header.clone(),
            read_timeout_ms: config.http.read_timeout_ms,
        });
        Some((HttpServer::new(bind_to), state))
    } else {
        None
    };

    Ok(App { pipeline, store, udp, http, storage: config.storage, jwt_refresh })
}

async fn build_hook(hook_config: &HookConfig) -> Result<BuiltHook, BootstrapError> {
    match hook_config.name.as_str() {
        "client approval" => {
            let parsed: ClientApprovalConfig = hook_config
                .parse()
                .map_err(|source| BootstrapError::InvalidHookConfig { name: hook_config.name.clone(), source })?;
            let whitelist = parse_client_ids(&parsed.whitelist)?;
            let blacklist = parse_client_ids(&parsed.blacklist)?;
            let hook = match (whitelist.is_empty(), blacklist.is_empty()) {
                (false, false) => return Err(ClientApprovalConfigError::BothListsConfigured.into()),
                (false, true) => ClientApproval::whitelist(whitelist)?,
                (true, false) => ClientApproval::blacklist(blacklist)?,
                (true, true) => return Err(ClientApprovalConfigError::NoListConfigured.into()),
            };
            Ok(BuiltHook::Plain(Arc::new(hook)))
        }
        "jwt" => {
            let parsed: JwtConfig = hook_config
                .parse()
                .map_err(|source| BootstrapError::InvalidHookConfig { name: hook_config.name.clone(), source })?;
            let refresh_interval = std::time::Duration::from_secs(parsed.refresh_interval);
            let hook = Arc::new(Jwt::new(parsed.issuer, parsed.audience, parsed.jwk_set_url.to_string()).await?);
            Ok(BuiltHook::Jwt(hook, refresh_interval))
        }
        "interval variation" => {
            let parsed: VarintervalConfig = hook_config
                .parse()
                .map_err(|source| BootstrapError::InvalidHookConfig { name: hook_config.name.clone(), source })?;
            let hook = Varinterval::new(
                parsed.modify_response_probability,
                u64::from(parsed.max_increase_delta),
                parsed.modify_min_interval,
            )?;
            Ok(BuiltHook::Plain(Arc::new(hook)))
        }
        other => Err(BootstrapError::UnknownHook(other.to_owned())),
    }
}

fn parse_client_ids(hex_values: &[String]) -> Result<Vec<ClientId>, BootstrapError> {
    hex_values
        .iter()
        .map(|hex| {
            if hex.len() != 12 {
                return Err(BootstrapError::MalformedClientId(hex.clone()));
            }
            let mut bytes = [0u8; 6];
            binascii::hex2bin(hex.as_bytes(), &mut bytes).map_err(|_| BootstrapError::MalformedClientId(hex.clone()))?;
            Ok(ClientId(bytes))
        })
        .collect()
}
