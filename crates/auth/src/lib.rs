//! `rolegate-auth` — request-time authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP: callers hand it a raw
//! header value and a declared role requirement, and get back either a
//! validated identity / grant or a classified [`AuthFailure`].
//!
//! Tokens are decoded, **not verified**. Signatures, issuer and audience are
//! never checked; only structure and required fields are.

pub mod authenticate;
pub mod authorize;
pub mod claims;
pub mod context;
pub mod error;
pub mod policy;
pub mod roles;

pub use authenticate::{BEARER_PREFIX, RequestAuthenticator};
pub use authorize::authorize;
pub use claims::{
    ClaimField, ClaimsDecoder, IdentityClaims, UnknownClaimField, UnsignedClaimsCodec, decode,
    decode_at,
};
pub use context::RequestContext;
pub use error::{AuthFailure, ErrorBody, TokenInvalidReason};
pub use policy::{Grant, RequirementMode, RoleRequirement, evaluate};
pub use roles::Role;
