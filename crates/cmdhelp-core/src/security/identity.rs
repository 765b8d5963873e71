//! Invoking identity resolution

/// The identity a helper runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account name
    pub name: String,
    /// Numeric user id, where the platform has one
    pub uid: Option<u32>,
    /// Names of the groups the account belongs to
    pub groups: Vec<String>,
    /// Whether the platform vouches for this identity
    pub authenticated: bool,
}

impl Identity {
    /// Create an authenticated identity with no groups
    pub fn authenticated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: None,
            groups: Vec::new(),
            authenticated: true,
        }
    }

    /// Create an identity the platform does not vouch for
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            ..Self::authenticated(name)
        }
    }

    /// Add a group membership
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Check group membership by name
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Supplies the identity the security gate evaluates
pub trait IdentitySource: Send + Sync {
    /// Current identity, or `None` if it cannot be determined
    fn current(&self) -> Option<Identity>;
}

/// Identity of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIdentity;

#[cfg(unix)]
impl IdentitySource for ProcessIdentity {
    fn current(&self) -> Option<Identity> {
        use nix::unistd::{Group, Uid, User};

        let uid = Uid::effective();
        match User::from_uid(uid) {
            Ok(Some(user)) => {
                let mut groups = Vec::new();
                if let Ok(Some(group)) = Group::from_gid(user.gid) {
                    groups.push(group.name);
                }
                Some(Identity {
                    name: user.name,
                    uid: Some(uid.as_raw()),
                    groups,
                    authenticated: true,
                })
            }
            // A uid with no account entry is not vouched for by the system
            Ok(None) | Err(_) => Some(Identity {
                name: uid.to_string(),
                uid: Some(uid.as_raw()),
                groups: Vec::new(),
                authenticated: false,
            }),
        }
    }
}

#[cfg(not(unix))]
impl IdentitySource for ProcessIdentity {
    fn current(&self) -> Option<Identity> {
        std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .ok()
            .filter(|name| !name.is_empty())
            .map(Identity::authenticated)
    }
}

/// Always reports the same identity
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub Option<Identity>);

impl IdentitySource for FixedIdentity {
    fn current(&self) -> Option<Identity> {
        self.0.clone()
    }
}
