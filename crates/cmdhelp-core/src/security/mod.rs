//! Security gate
//!
//! Runs before any mutating action. The gate always requires an
//! authenticated identity; on top of that an [`AuthorizationPolicy`] decides
//! whether the identity may proceed. The default policy admits every
//! authenticated identity.

mod identity;

pub use identity::{FixedIdentity, Identity, IdentitySource, ProcessIdentity};

use crate::error::{HelperError, HelperResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Predicate deciding whether an authenticated identity may run the helper
pub trait AuthorizationPolicy: Send + Sync {
    /// Policy name used in log output
    fn name(&self) -> &str;

    /// Whether `identity` is allowed to proceed
    fn authorize(&self, identity: &Identity) -> bool;
}

/// Admits every authenticated identity
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedOnly;

impl AuthorizationPolicy for AuthenticatedOnly {
    fn name(&self) -> &str {
        "authenticated-only"
    }

    fn authorize(&self, _identity: &Identity) -> bool {
        true
    }
}

/// Admits identities that belong to a named group
#[derive(Debug, Clone)]
pub struct RequireGroup {
    group: String,
}

impl RequireGroup {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

impl AuthorizationPolicy for RequireGroup {
    fn name(&self) -> &str {
        "require-group"
    }

    fn authorize(&self, identity: &Identity) -> bool {
        identity.is_member_of(&self.group)
    }
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&Identity) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn authorize(&self, identity: &Identity) -> bool {
        self(identity)
    }
}

/// Confirms the invoking identity before the helper changes anything
#[derive(Clone)]
pub struct SecurityGate {
    policy: Arc<dyn AuthorizationPolicy>,
    identities: Arc<dyn IdentitySource>,
}

impl SecurityGate {
    /// Gate with the given policy, evaluating the process identity
    pub fn new(policy: impl AuthorizationPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            identities: Arc::new(ProcessIdentity),
        }
    }

    /// Gate for an optional required group
    pub fn for_group(group: Option<&str>) -> Self {
        match group {
            Some(group) => Self::new(RequireGroup::new(group)),
            None => Self::default(),
        }
    }

    /// Replace the identity source
    pub fn with_identity_source(mut self, source: impl IdentitySource + 'static) -> Self {
        self.identities = Arc::new(source);
        self
    }

    /// Name of the active policy
    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Resolve the current identity and check it.
    pub fn check(&self) -> HelperResult<Identity> {
        let identity = self.identities.current();
        self.check_identity(identity.as_ref())?;
        // check_identity rejects None
        identity.ok_or_else(|| HelperError::security("No identity available"))
    }

    /// Check an identity against the gate.
    pub fn check_identity(&self, identity: Option<&Identity>) -> HelperResult<()> {
        let identity = match identity {
            Some(identity) if identity.authenticated => identity,
            _ => {
                warn!("rejecting unauthenticated identity");
                return Err(HelperError::security(
                    "User is not currently authenticated. Unable to check security credentials.",
                ));
            }
        };

        if !self.policy.authorize(identity) {
            warn!(user = %identity.name, policy = self.policy.name(), "identity not authorized");
            return Err(HelperError::security_for(
                format!(
                    "User {} is not authorized by policy '{}'",
                    identity.name,
                    self.policy.name()
                ),
                identity.name.clone(),
            ));
        }

        debug!(user = %identity.name, policy = self.policy.name(), "security check passed");
        Ok(())
    }
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new(AuthenticatedOnly)
    }
}

impl std::fmt::Debug for SecurityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityGate")
            .field("policy", &self.policy.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_for(identity: Option<Identity>) -> SecurityGate {
        SecurityGate::default().with_identity_source(FixedIdentity(identity))
    }

    #[test]
    fn test_authenticated_identity_passes() {
        let gate = gate_for(Some(Identity::authenticated("alice")));
        let identity = gate.check().unwrap();
        assert_eq!(identity.name, "alice");
        assert_eq!(gate.policy_name(), "authenticated-only");
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let err = gate_for(None).check().unwrap_err();
        assert!(matches!(err, HelperError::Security { .. }));
    }

    #[test]
    fn test_unauthenticated_identity_is_rejected() {
        let err = gate_for(Some(Identity::anonymous("guest"))).check().unwrap_err();
        assert!(matches!(err, HelperError::Security { .. }));
        assert!(err.to_string().contains("not currently authenticated"));
    }

    #[test]
    fn test_require_group_policy() {
        let gate = SecurityGate::for_group(Some("operators"));
        assert_eq!(gate.policy_name(), "require-group");

        let member = Identity::authenticated("alice").with_group("operators");
        assert!(gate.check_identity(Some(&member)).is_ok());

        let outsider = Identity::authenticated("bob").with_group("users");
        let err = gate.check_identity(Some(&outsider)).unwrap_err();
        match err {
            HelperError::Security { identity, message } => {
                assert_eq!(identity.as_deref(), Some("bob"));
                assert!(message.contains("require-group"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_policy_still_requires_authentication() {
        let gate = SecurityGate::for_group(Some("operators"));
        let spoofed = Identity::anonymous("mallory").with_group("operators");
        assert!(gate.check_identity(Some(&spoofed)).is_err());
    }

    #[test]
    fn test_closure_policy() {
        let gate = SecurityGate::new(|identity: &Identity| identity.name.starts_with("svc-"));
        assert_eq!(gate.policy_name(), "custom");
        assert!(gate
            .check_identity(Some(&Identity::authenticated("svc-backup")))
            .is_ok());
        assert!(gate
            .check_identity(Some(&Identity::authenticated("alice")))
            .is_err());
    }
}
