//! Role requirements and their pure evaluation against identity claims.

use serde::{Deserialize, Serialize};

use crate::{AuthFailure, IdentityClaims, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementMode {
    /// At least one required role must be held.
    AnyOf,
    /// Every required role must be held.
    AllOf,
}

impl core::fmt::Display for RequirementMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RequirementMode::AnyOf => f.write_str("ANY_OF"),
            RequirementMode::AllOf => f.write_str("ALL_OF"),
        }
    }
}

/// Roles declared for a protected operation.
///
/// An empty role list means "no restriction" under either mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub mode: RequirementMode,
    pub roles: Vec<Role>,
}

impl RoleRequirement {
    pub fn new<I, R>(mode: RequirementMode, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            mode,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::new(RequirementMode::AnyOf, roles)
    }

    pub fn all_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::new(RequirementMode::AllOf, roles)
    }

    pub fn unrestricted() -> Self {
        Self {
            mode: RequirementMode::AnyOf,
            roles: Vec::new(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty()
    }

    /// Resolve a group-level and an operation-level declaration: the operation
    /// wins when present, otherwise the group applies.
    pub fn most_specific<'a>(
        group: Option<&'a RoleRequirement>,
        operation: Option<&'a RoleRequirement>,
    ) -> Option<&'a RoleRequirement> {
        operation.or(group)
    }
}

impl core::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[", self.mode)?;
        for (i, role) in self.roles.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        f.write_str("]")
    }
}

/// Successful policy outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The claims satisfy a non-empty requirement.
    Satisfied,
    /// The requirement declared no roles, so nothing was checked. Callers
    /// should audit this.
    Unrestricted,
}

/// Evaluate `requirement` against `claims`.
///
/// - No IO
/// - No normalization: role labels match exactly and case-sensitively
pub fn evaluate(requirement: &RoleRequirement, claims: &IdentityClaims) -> Result<Grant, AuthFailure> {
    if requirement.is_unrestricted() {
        return Ok(Grant::Unrestricted);
    }

    let held = claims.roles();
    let missing: Vec<Role> = requirement
        .roles
        .iter()
        .filter(|required| !held.contains(required))
        .cloned()
        .collect();

    let allowed = match requirement.mode {
        RequirementMode::AnyOf => missing.len() < requirement.roles.len(),
        RequirementMode::AllOf => missing.is_empty(),
    };

    if allowed {
        Ok(Grant::Satisfied)
    } else {
        Err(AuthFailure::InsufficientRoles {
            mode: requirement.mode,
            required: requirement.roles.clone(),
            missing,
        })
    }
}
