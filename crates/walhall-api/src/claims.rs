//! Decode-only extraction of bearer-token claims.
//!
//! Walhall Core is the system of record for authorization; the adaptor only
//! needs the identity hints carried in the token (user UUID, username, org
//! UUIDs) to address its dependent resolution calls. The payload segment is
//! therefore decoded without verifying the signature or expiry. This is NOT
//! a security boundary and must never be treated as one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Identity attributes decoded from the caller's bearer token.
///
/// Derived once per client instance and immutable afterward. Unknown payload
/// fields are ignored; absent fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// UUID of the calling user.
    #[serde(default)]
    pub user_uuid: String,
    /// UUIDs of the organizations the user belongs to.
    #[serde(default)]
    pub organization_uuids: Vec<String>,
    /// Username; also the name of the implicit self-org.
    #[serde(default)]
    pub username: String,
    /// Space-separated scope string.
    #[serde(default)]
    pub scope: String,
}

impl Claims {
    /// Decode claims from a bearer token, with or without a leading
    /// `"JWT "` prefix.
    ///
    /// Pure function of the token string: the same token always yields the
    /// same claims. Fails with [`ApiError::Claims`] when the token is not a
    /// three-segment JWT whose payload decodes as a JSON object.
    pub fn from_token(token: &str) -> ApiResult<Self> {
        let token = token.strip_prefix("JWT ").unwrap_or(token);

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(ApiError::claims("token must have three segments"));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1])
            .map_err(|e| ApiError::claims(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&payload)
            .map_err(|e| ApiError::claims(format!("payload is not a claims document: {e}")))
    }
}
