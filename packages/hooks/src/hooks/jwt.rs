use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::Context;
use crate::error::ClientError;
use crate::pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse};

#[derive(Error, Debug)]
pub enum JwtConfigError {
    #[error("failed to fetch the jwk set from {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },
    #[error("failed to parse the jwk set from {url}: {source}")]
    Parse { url: String, source: serde_json::Error },
    #[error("the jwk set at {url} did not contain a usable RSA key")]
    NoUsableKey { url: String },
}

/// One key as published in an RFC 7517 JWK set, restricted to the fields
/// needed to build an RS256 `DecodingKey`.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
    #[serde(default)]
    alg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    iss: String,
    aud: String,
    infohash: String,
    exp: u64,
}

struct KeyCache(HashMap<String, DecodingKey>);

fn parse_jwk_set(body: &str, url: &str) -> Result<KeyCache, JwtConfigError> {
    let set: JwkSet = serde_json::from_str(body).map_err(|source| JwtConfigError::Parse { url: url.to_owned(), source })?;

    let mut keys = HashMap::new();
    for jwk in set.keys {
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if let Ok(key) = DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            keys.insert(jwk.kid, key);
        }
    }
    if keys.is_empty() {
        return Err(JwtConfigError::NoUsableKey { url: url.to_owned() });
    }
    Ok(KeyCache(keys))
}

/// Verifies an `RS256`-signed JWT carried in the `jwt` announce parameter
/// against a JWK set fetched from a configured URL, keyed by `kid`.
///
/// The key set is refreshed on a background interval via [`Jwt::refresh`];
/// a fetch or parse failure there logs and leaves the previous set in
/// place, since a transient outage shouldn't lock every existing client out.
pub struct Jwt {
    issuer: String,
    audience: String,
    jwk_url: String,
    keys: RwLock<KeyCache>,
    http: reqwest::Client,
}

impl Jwt {
    pub async fn new(issuer: String, audience: String, jwk_url: String) -> Result<Self, JwtConfigError> {
        let http = reqwest::Client::new();
        let keys = fetch(&http, &jwk_url).await?;
        Ok(Self {
            issuer,
            audience,
            jwk_url,
            keys: RwLock::new(keys),
            http,
        })
    }

    /// Re-fetches the JWK set and atomically swaps the cached mapping.
    /// Intended to be driven by a background timer task; a failure is
    /// reported to the caller to log, but the old keys remain installed.
    pub async fn refresh(&self) -> Result<(), JwtConfigError> {
        let fresh = fetch(&self.http, &self.jwk_url).await?;
        *self.keys.write().expect("jwk cache lock poisoned") = fresh;
        Ok(())
    }
}

async fn fetch(http: &reqwest::Client, url: &str) -> Result<KeyCache, JwtConfigError> {
    let body = http
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|source| JwtConfigError::Fetch { url: url.to_owned(), source })?
        .text()
        .await
        .map_err(|source| JwtConfigError::Fetch { url: url.to_owned(), source })?;
    parse_jwk_set(&body, url)
}

impl AnnounceHook for Jwt {
    fn name(&self) -> &'static str {
        "jwt"
    }

    fn call(&self, _ctx: &mut Context, req: &AnnounceRequest, _resp: &mut AnnounceResponse) -> Result<(), ClientError> {
        let token = req.jwt.as_deref().ok_or(ClientError::InvalidJwt)?;
        let header = jsonwebtoken::decode_header(token).map_err(|_| ClientError::InvalidJwt)?;
        let kid = header.kid.ok_or(ClientError::InvalidJwt)?;

        let keys = self.keys.read().expect("jwk cache lock poisoned");
        let key = keys.0.get(&kid).ok_or(ClientError::InvalidJwt)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = jsonwebtoken::decode::<Claims>(token, key, &validation).map_err(|_| ClientError::InvalidJwt)?;

        if data.claims.infohash != req.info_hash.to_hex_string() {
            return Err(ClientError::InvalidJwt);
        }
        Ok(())
    }
}
