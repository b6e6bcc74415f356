use std::sync::Arc;

use crate::IdentityClaims;

/// Per-request identity slot.
///
/// Create one per inbound request and drop it when the request ends; never
/// share an instance across requests. Holds at most one identity, set by
/// [`RequestAuthenticator`](crate::RequestAuthenticator).
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Arc<IdentityClaims>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&IdentityClaims> {
        self.identity.as_deref()
    }

    /// Shared handle to the identity, for handing to request handlers.
    pub fn identity_arc(&self) -> Option<Arc<IdentityClaims>> {
        self.identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub(crate) fn attach(&mut self, identity: IdentityClaims) -> &IdentityClaims {
        self.identity.insert(Arc::new(identity))
    }
}
