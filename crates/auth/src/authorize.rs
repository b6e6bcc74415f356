//! Authorization against the identity held by a request context.

use crate::{AuthFailure, Grant, RequestContext, Role, RoleRequirement, evaluate};

/// Check `requirement` for the identity in `ctx`.
///
/// Must run after [`RequestAuthenticator`](crate::RequestAuthenticator). An
/// empty context is a wiring defect and fails with
/// [`AuthFailure::NotAuthenticated`], never as "no roles".
pub fn authorize(ctx: &RequestContext, requirement: &RoleRequirement) -> Result<Grant, AuthFailure> {
    let Some(claims) = ctx.identity() else {
        tracing::warn!(requirement = %requirement, "authorization without authenticated identity");
        return Err(AuthFailure::NotAuthenticated);
    };

    match evaluate(requirement, claims) {
        Ok(Grant::Unrestricted) => {
            tracing::info!(
                subject = %claims.subject(),
                role_count = claims.roles().len(),
                requirement = %requirement,
                unrestricted = true,
                "access granted by empty role requirement"
            );
            Ok(Grant::Unrestricted)
        }
        Ok(Grant::Satisfied) => {
            tracing::info!(
                subject = %claims.subject(),
                role_count = claims.roles().len(),
                requirement = %requirement,
                "access granted"
            );
            Ok(Grant::Satisfied)
        }
        Err(err) => {
            tracing::warn!(
                subject = %claims.subject(),
                roles = ?labels(claims.roles()),
                required = ?labels(&requirement.roles),
                mode = %requirement.mode,
                "access denied"
            );
            Err(err)
        }
    }
}

fn labels(roles: &[Role]) -> Vec<&str> {
    roles.iter().map(Role::as_str).collect()
}
