//! Bearer header handling: header value → identity stored in the request context.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AuthFailure, ClaimsDecoder, IdentityClaims, RequestContext, TokenInvalidReason};

/// Literal, case-sensitive scheme prefix (single space).
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authenticates requests by decoding their bearer token.
#[derive(Clone)]
pub struct RequestAuthenticator {
    decoder: Arc<dyn ClaimsDecoder>,
}

impl RequestAuthenticator {
    pub fn new(decoder: Arc<dyn ClaimsDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticate against the current clock.
    pub fn authenticate<'a>(
        &self,
        ctx: &'a mut RequestContext,
        header: Option<&str>,
    ) -> Result<&'a IdentityClaims, AuthFailure> {
        self.authenticate_at(ctx, header, Utc::now())
    }

    /// Decode the token carried by `header` and attach the identity to `ctx`.
    ///
    /// On failure `ctx` is left untouched. Only the subject, email and role
    /// count are logged, never the header itself.
    pub fn authenticate_at<'a>(
        &self,
        ctx: &'a mut RequestContext,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&'a IdentityClaims, AuthFailure> {
        let claims = match extract_token(header).and_then(|token| self.decoder.decode(token, now)) {
            Ok(claims) => claims,
            Err(err) => {
                if let AuthFailure::TokenInvalid { reason } = &err {
                    tracing::warn!(reason = %reason, "authentication failed");
                }
                return Err(err);
            }
        };

        let claims = ctx.attach(claims);
        tracing::info!(
            subject = %claims.subject(),
            email = %claims.email(),
            role_count = claims.roles().len(),
            "request authenticated"
        );

        Ok(claims)
    }
}

impl core::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestAuthenticator").finish_non_exhaustive()
    }
}

fn extract_token(header: Option<&str>) -> Result<&str, AuthFailure> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthFailure::token_invalid(TokenInvalidReason::MissingHeader)),
    };

    let rest = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthFailure::token_invalid(TokenInvalidReason::BadScheme))?;

    let token = rest.trim();
    if token.is_empty() {
        return Err(AuthFailure::token_invalid(TokenInvalidReason::EmptyToken));
    }

    Ok(token)
}
