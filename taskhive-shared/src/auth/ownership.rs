/// Ownership scoping
///
/// Every list/find query in every domain service is bounded by the
/// *effective owner id* of the caller. A manager's own id is the key for
/// everything it owns; a worker delegates to the manager that created it.
///
/// Services call [`effective_owner_id`] instead of branching on role, which
/// keeps a worker of manager A from ever seeing what manager B owns.

use uuid::Uuid;

use super::context::IdentityContext;
use crate::models::user::Role;

/// Owner key used to scope queries for this caller
pub fn effective_owner_id(identity: &IdentityContext) -> Uuid {
    match identity.role {
        Role::Manager => identity.user_id,
        Role::Worker => identity.creator_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_scopes_to_self() {
        let pm = Uuid::new_v4();
        let ctx = IdentityContext::new(pm, pm, Role::Manager);
        assert_eq!(effective_owner_id(&ctx), pm);
    }

    #[test]
    fn test_worker_scopes_to_creator() {
        let pm = Uuid::new_v4();
        let dev = Uuid::new_v4();
        let ctx = IdentityContext::new(dev, pm, Role::Worker);
        assert_eq!(effective_owner_id(&ctx), pm);
    }

    #[test]
    fn test_manager_ignores_creator_field() {
        // A manager record is self-owned; even a malformed context keys on user_id
        let pm = Uuid::new_v4();
        let ctx = IdentityContext::new(pm, Uuid::new_v4(), Role::Manager);
        assert_eq!(effective_owner_id(&ctx), pm);
    }
}
