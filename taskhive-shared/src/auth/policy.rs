/// Policy gate
///
/// The policy gate is the yes/no decision oracle consulted before every
/// mutating or privileged operation. Services only see the [`PolicyGate`]
/// trait; the rule logic lives in the adapter and can be swapped (for a stub in
/// tests, or an external policy engine).
///
/// # Contract
///
/// 1. Deterministic for the same identity and (object, action) pair
/// 2. Denies by default when no rule matches
/// 3. A worker is always denied `(OBJECT_ANY, ACTION_ANY)`; services use that
///    pair to mean "manager-only operation"
/// 4. Denial is the distinguishable [`PolicyError::Forbidden`]
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::context::IdentityContext;
/// use taskhive_shared::auth::policy::{PolicyGate, RulePolicy, ACTION_ANY, OBJECT_ANY};
/// use taskhive_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let policy = RulePolicy::default();
/// let pm = Uuid::new_v4();
/// let dev = IdentityContext::new(Uuid::new_v4(), pm, Role::Worker);
///
/// assert!(policy.validate(&IdentityContext::new(pm, pm, Role::Manager), OBJECT_ANY, ACTION_ANY).is_ok());
/// assert!(policy.validate(&dev, OBJECT_ANY, ACTION_ANY).is_err());
/// ```

use tracing::debug;

use super::context::IdentityContext;
use crate::models::user::Role;

/// Wildcard object tag
pub const OBJECT_ANY: &str = "*";
/// Wildcard action tag
pub const ACTION_ANY: &str = "*";

pub const OBJECT_PROJECT: &str = "project";
pub const OBJECT_HOLIDAY: &str = "holiday";

pub const ACTION_CREATE: &str = "create";
pub const ACTION_READ: &str = "read";
pub const ACTION_DELETE: &str = "delete";
pub const ACTION_ASSIGN: &str = "assign";

/// Error type for policy checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The caller may not perform `action` on `object`
    #[error("Forbidden: {action} on {object}")]
    Forbidden { object: String, action: String },
}

/// Authorization decision oracle
pub trait PolicyGate: Send + Sync {
    /// Allows or denies `action` on `object` for the caller
    fn validate(&self, identity: &IdentityContext, object: &str, action: &str) -> Result<(), PolicyError>;
}

/// A single grant: `role` may perform `action` on `object`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub role: Role,
    pub object: String,
    pub action: String,
}

impl PolicyRule {
    pub fn new(role: Role, object: &str, action: &str) -> Self {
        Self {
            role,
            object: object.to_string(),
            action: action.to_string(),
        }
    }

    /// A rule wildcard matches any requested value; a requested wildcard is
    /// only satisfied by a rule wildcard.
    fn matches(&self, role: Role, object: &str, action: &str) -> bool {
        self.role == role && tag_matches(&self.object, object) && tag_matches(&self.action, action)
    }
}

fn tag_matches(granted: &str, requested: &str) -> bool {
    granted == OBJECT_ANY || granted == requested
}

/// Rule-table policy adapter
///
/// The default table grants managers everything and workers read access to
/// projects and holidays.
#[derive(Debug, Clone)]
pub struct RulePolicy {
    rules: Vec<PolicyRule>,
}

impl RulePolicy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self::new(vec![
            PolicyRule::new(Role::Manager, OBJECT_ANY, ACTION_ANY),
            PolicyRule::new(Role::Worker, OBJECT_PROJECT, ACTION_READ),
            PolicyRule::new(Role::Worker, OBJECT_HOLIDAY, ACTION_READ),
        ])
    }
}

impl PolicyGate for RulePolicy {
    fn validate(&self, identity: &IdentityContext, object: &str, action: &str) -> Result<(), PolicyError> {
        if self.rules.iter().any(|r| r.matches(identity.role, object, action)) {
            return Ok(());
        }

        debug!(
            user_id = %identity.user_id,
            role = %identity.role,
            object,
            action,
            "Policy denied request"
        );
        Err(PolicyError::Forbidden {
            object: object.to_string(),
            action: action.to_string(),
        })
    }
}
