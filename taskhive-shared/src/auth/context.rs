/// Request-scoped identity
///
/// The authenticated caller travels through a request as an
/// [`IdentityContext`] value. It is attached exactly once, after the session
/// token has been validated, and never changes for the rest of the request.
/// Service methods receive it as an explicit argument; nothing reads a
/// "current user" from ambient state.
///
/// [`RequestScope`] models the per-request carrier for code that is not
/// running inside an axum handler (background jobs, tests). Attaching an
/// identity returns a new scope and leaves the original untouched.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::context::{IdentityContext, RequestScope};
/// use taskhive_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let pm = Uuid::new_v4();
/// let identity = IdentityContext::new(pm, pm, Role::Manager);
///
/// let anonymous = RequestScope::new();
/// let scope = anonymous.attach(identity);
///
/// assert!(anonymous.try_identity().is_none());
/// assert_eq!(scope.identity().user_id, pm);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User, UserInfo};

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Caller's own id
    pub user_id: Uuid,

    /// Owning manager (equal to `user_id` for a manager)
    pub creator_id: Uuid,

    pub role: Role,
}

impl IdentityContext {
    pub fn new(user_id: Uuid, creator_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            creator_id,
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

impl From<&User> for IdentityContext {
    fn from(user: &User) -> Self {
        Self::new(user.user_id, user.creator_id, user.role)
    }
}

impl From<&UserInfo> for IdentityContext {
    fn from(user: &UserInfo) -> Self {
        Self::new(user.user_id, user.creator_id, user.role)
    }
}

/// Per-request carrier of the authenticated identity
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    identity: Option<IdentityContext>,
}

impl RequestScope {
    /// Creates an unauthenticated scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a derived scope carrying `identity`
    ///
    /// The receiver is not modified.
    pub fn attach(&self, identity: IdentityContext) -> RequestScope {
        RequestScope {
            identity: Some(identity),
        }
    }

    /// Returns the attached identity
    ///
    /// # Panics
    ///
    /// Panics if no identity was attached. The transport layer attaches the
    /// identity before any service method runs, so reaching this from an
    /// unauthenticated scope is a programming error.
    pub fn identity(&self) -> IdentityContext {
        match self.identity {
            Some(identity) => identity,
            None => panic!("identity requested outside an authenticated request scope"),
        }
    }

    /// Returns the attached identity, if any
    pub fn try_identity(&self) -> Option<IdentityContext> {
        self.identity
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_does_not_mutate_original() {
        let id = Uuid::new_v4();
        let original = RequestScope::new();
        let derived = original.attach(IdentityContext::new(id, id, Role::Manager));

        assert!(!original.is_authenticated());
        assert!(derived.is_authenticated());
        assert_eq!(derived.identity().user_id, id);
    }

    #[test]
    fn test_reattach_yields_independent_scopes() {
        let pm = Uuid::new_v4();
        let dev = Uuid::new_v4();
        let base = RequestScope::new();

        let a = base.attach(IdentityContext::new(pm, pm, Role::Manager));
        let b = a.attach(IdentityContext::new(dev, pm, Role::Worker));

        assert_eq!(a.identity().role, Role::Manager);
        assert_eq!(b.identity().role, Role::Worker);
        assert_eq!(b.identity().creator_id, pm);
    }

    #[test]
    #[should_panic(expected = "outside an authenticated request scope")]
    fn test_identity_panics_when_unauthenticated() {
        RequestScope::new().identity();
    }

    #[test]
    fn test_is_manager() {
        let id = Uuid::new_v4();
        assert!(IdentityContext::new(id, id, Role::Manager).is_manager());
        assert!(!IdentityContext::new(id, Uuid::new_v4(), Role::Worker).is_manager());
    }
}
