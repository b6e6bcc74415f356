//! Unsigned bearer token decoding into identity claims.
//!
//! Only the payload segment is inspected. Header and signature must be present
//! but are never read, so a token is accepted on structure alone.

use core::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{AuthFailure, Role, TokenInvalidReason};

/// Decoded, validated identity of the caller.
///
/// `subject` and `email` are non-empty after trimming and `roles` is always
/// present (possibly empty). Values are never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    subject: String,
    email: String,
    roles: Vec<Role>,
    expires_at: Option<i64>,
    issued_at: Option<i64>,
}

impl IdentityClaims {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// `exp` claim in Unix seconds. Informational only.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// `iat` claim in Unix seconds. Carried through unvalidated.
    pub fn issued_at(&self) -> Option<i64> {
        self.issued_at
    }

    /// Whether `exp` is set and lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now.timestamp())
    }

    /// Read one named claim as JSON (`null` for absent optionals).
    pub fn claim(&self, field: ClaimField) -> Value {
        match field {
            ClaimField::Subject => Value::from(self.subject.as_str()),
            ClaimField::Email => Value::from(self.email.as_str()),
            ClaimField::Roles => {
                Value::Array(self.roles.iter().map(|r| Value::from(r.as_str())).collect())
            }
            ClaimField::ExpiresAt => self.expires_at.map(Value::from).unwrap_or(Value::Null),
            ClaimField::IssuedAt => self.issued_at.map(Value::from).unwrap_or(Value::Null),
        }
    }
}

/// Individually addressable claim of an [`IdentityClaims`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimField {
    Subject,
    Email,
    Roles,
    ExpiresAt,
    IssuedAt,
}

impl ClaimField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimField::Subject => "subject",
            ClaimField::Email => "email",
            ClaimField::Roles => "roles",
            ClaimField::ExpiresAt => "expiresAt",
            ClaimField::IssuedAt => "issuedAt",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown claim field '{0}'")]
pub struct UnknownClaimField(pub String);

impl FromStr for ClaimField {
    type Err = UnknownClaimField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subject" => Ok(ClaimField::Subject),
            "email" => Ok(ClaimField::Email),
            "roles" => Ok(ClaimField::Roles),
            "expiresAt" => Ok(ClaimField::ExpiresAt),
            "issuedAt" => Ok(ClaimField::IssuedAt),
            other => Err(UnknownClaimField(other.to_string())),
        }
    }
}

/// Turns a raw bearer token into identity claims.
///
/// `now` is only used for expiry reporting; implementations must not reject
/// on time.
pub trait ClaimsDecoder: Send + Sync {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, AuthFailure>;
}

/// Development-posture decoder: structure and required fields only, no
/// signature, issuer or audience checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsignedClaimsCodec;

impl UnsignedClaimsCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ClaimsDecoder for UnsignedClaimsCodec {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, AuthFailure> {
        decode_at(token, now)
    }
}

/// Decode `token` against the current clock.
pub fn decode(token: &str) -> Result<IdentityClaims, AuthFailure> {
    decode_at(token, Utc::now())
}

/// Decode `token`, reporting (but accepting) an `exp` earlier than `now`.
pub fn decode_at(token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, AuthFailure> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_header, payload, _signature] = segments.as_slice() else {
        return Err(AuthFailure::token_invalid(TokenInvalidReason::Structure));
    };

    let text = decode_segment(payload)?;

    let value: Value = serde_json::from_str(&text)
        .map_err(|_| AuthFailure::token_invalid(TokenInvalidReason::PayloadShape))?;
    let Value::Object(claims) = value else {
        return Err(AuthFailure::token_invalid(TokenInvalidReason::PayloadShape));
    };

    let subject = required_string(&claims, "sub")
        .ok_or_else(|| AuthFailure::token_invalid(TokenInvalidReason::MissingSub))?;
    let email = required_string(&claims, "email")
        .ok_or_else(|| AuthFailure::token_invalid(TokenInvalidReason::MissingEmail))?;

    let identity = IdentityClaims {
        subject,
        email,
        roles: roles_claim(&claims),
        expires_at: numeric_claim(&claims, "exp"),
        issued_at: numeric_claim(&claims, "iat"),
    };

    if identity.is_expired_at(now) {
        tracing::warn!(
            subject = %identity.subject,
            expires_at = identity.expires_at,
            "accepting expired token"
        );
    }

    Ok(identity)
}

// Standard alphabet after the url-safe substitution; lenient about trailing
// bits the way browser-side decoders are.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn decode_segment(segment: &str) -> Result<String, AuthFailure> {
    let mut standard: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let bytes = PAYLOAD_ENGINE
        .decode(standard.as_bytes())
        .map_err(|_| AuthFailure::token_invalid(TokenInvalidReason::Encoding))?;

    String::from_utf8(bytes).map_err(|_| AuthFailure::token_invalid(TokenInvalidReason::Encoding))
}

fn required_string(claims: &Map<String, Value>, key: &str) -> Option<String> {
    match claims.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Anything other than an array of strings silently becomes "no roles".
fn roles_claim(claims: &Map<String, Value>) -> Vec<Role> {
    let Some(Value::Array(items)) = claims.get("roles") else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| item.as_str().map(|s| Role::new(s.to_owned())))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

/// Truncates to whole seconds; values outside `i64` count as absent rather
/// than clamping.
fn whole_seconds(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
}

fn numeric_claim(claims: &Map<String, Value>, key: &str) -> Option<i64> {
    match claims.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole_seconds)),
        _ => None,
    }
}
