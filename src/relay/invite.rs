//! Relay invite link parsing
//!
//! Turns `https://t.me/proxy?...` invite links into validated relay
//! candidates. Parsing is pure and deterministic; callers that scan bulk
//! input drop malformed lines and keep going.

use base64::{engine::general_purpose::URL_SAFE as BASE64_URL, Engine};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Hex secrets carry a one-byte connection-type marker; only these two
/// markers are recognized as hex, anything else is treated as base64.
const HEX_SECRET_PREFIXES: [&str; 2] = ["dd", "ee"];

/// A parsed, validated relay endpoint that might provide connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCandidate {
    pub host: String,
    pub port: u16,
    pub secret: Vec<u8>,
}

impl RelayCandidate {
    /// `host:port` form used in log output and diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for RelayCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret never appears in Display output.
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Errors produced while parsing a single invite link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InviteError {
    #[error("not an invite URL: {0}")]
    Shape(String),

    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("secret is not decodable: {0}")]
    SecretDecode(String),

    #[error("secret is empty")]
    EmptySecret,
}

/// Parse one invite link into a relay candidate.
///
/// Accepts only the fixed `https://t.me/proxy` shape with `server`, `port`
/// and `secret` query parameters. The secret is hex-decoded when it is
/// all-hex and starts with a known type marker, otherwise decoded as
/// URL-safe base64.
pub fn parse_invite(line: &str) -> Result<RelayCandidate, InviteError> {
    let url = Url::parse(line.trim()).map_err(|e| InviteError::Shape(e.to_string()))?;

    if url.scheme() != "https" || url.host_str() != Some("t.me") || url.path() != "/proxy" {
        return Err(InviteError::Shape(format!(
            "expected https://t.me/proxy, got {}://{}{}",
            url.scheme(),
            url.host_str().unwrap_or(""),
            url.path()
        )));
    }

    let mut server = None;
    let mut port = None;
    let mut secret = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "server" => server = Some(value.into_owned()),
            "port" => port = Some(value.into_owned()),
            "secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    let host = match server {
        Some(s) if !s.is_empty() => s,
        _ => return Err(InviteError::MissingParam("server")),
    };
    let port_str = port.ok_or(InviteError::MissingParam("port"))?;
    let secret_str = secret.ok_or(InviteError::MissingParam("secret"))?;

    let port: u16 = port_str
        .parse()
        .map_err(|_| InviteError::InvalidPort(port_str.clone()))?;
    if port == 0 {
        return Err(InviteError::InvalidPort(port_str));
    }

    let secret = decode_secret(&secret_str)?;

    Ok(RelayCandidate { host, port, secret })
}

/// Decode an invite secret to raw bytes.
///
/// An all-hex string starting with a known type marker decodes as hex;
/// everything else is URL-safe base64 with URL-escaped padding restored.
fn decode_secret(raw: &str) -> Result<Vec<u8>, InviteError> {
    let all_hex = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_hexdigit());
    let has_marker = HEX_SECRET_PREFIXES.iter().any(|p| raw.starts_with(p));

    let bytes = if all_hex && has_marker {
        hex::decode(raw).map_err(|e| InviteError::SecretDecode(e.to_string()))?
    } else {
        let normalized = raw.replace("%3D", "=").replace("%3d", "=");
        BASE64_URL
            .decode(normalized.as_bytes())
            .map_err(|e| InviteError::SecretDecode(e.to_string()))?
    };

    if bytes.is_empty() {
        return Err(InviteError::EmptySecret);
    }
    Ok(bytes)
}

/// Extract invite-link tokens from arbitrary text.
///
/// Used when scanning message bodies or pasted blobs that mix invite links
/// with other content. Returns the tokens in order of appearance.
pub fn extract_invites(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|token| token.starts_with("https://t.me/proxy?"))
        .collect()
}

/// Parse a newline-delimited block of candidate lines.
///
/// Lines that do not look like invite links or that fail validation are
/// skipped; parsing a bulk list never fails.
pub fn parse_invite_list(text: &str) -> Vec<RelayCandidate> {
    let mut candidates = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || !line.starts_with("https://t.me/proxy") {
            continue;
        }
        match parse_invite(line) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => debug!("Skipping malformed invite line: {}", e),
        }
    }
    candidates
}

/// Load candidates from an invite file.
///
/// A missing file is not an error; it simply yields no candidates and the
/// caller falls back to a direct connection.
pub async fn load_invite_file(path: &str) -> crate::error::Result<Vec<RelayCandidate>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(parse_invite_list(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
