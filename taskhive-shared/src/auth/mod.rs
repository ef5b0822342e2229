/// Authentication and authorization primitives
///
/// This module provides the identity plumbing every TaskHive service relies
/// on:
///
/// # Modules
///
/// - [`context`]: Request-scoped [`context::IdentityContext`] and its carrier
/// - [`jwt`]: Session token issuing and read-back
/// - [`middleware`]: Axum session middleware and identity extractor
/// - [`password`]: Argon2id one-way hash capability
/// - [`policy`]: Policy gate trait and the rule-table adapter
/// - [`ownership`]: Effective owner id used to scope every query
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::auth::context::IdentityContext;
/// use taskhive_shared::auth::ownership::effective_owner_id;
/// use taskhive_shared::auth::password::{hash_password, verify_password};
/// use taskhive_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let pm = Uuid::new_v4();
/// let dev = IdentityContext::new(Uuid::new_v4(), pm, Role::Worker);
/// assert_eq!(effective_owner_id(&dev), pm);
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod policy;
