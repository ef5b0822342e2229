/// Domain services
///
/// Each service takes the caller's [`IdentityContext`] as an explicit
/// argument, asks the policy gate first, then scopes its repository calls by
/// the caller's effective owner id.
///
/// # Modules
///
/// - [`credentials`]: Email and secret verification, session issuing
/// - [`users`]: Identity registry (managers and their workers)
/// - [`projects`]: Owned projects and worker assignment
/// - [`holidays`]: Owned holidays
///
/// # Wiring
///
/// The registry needs the project service to detach a deleted worker, and the
/// project service needs the registry's worker lookup. [`Services::build`]
/// breaks the cycle by handing the project service a [`users::WorkerResolver`]
/// over the same user repository.
///
/// [`IdentityContext`]: crate::auth::context::IdentityContext

pub mod credentials;
pub mod holidays;
pub mod projects;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::password::{Argon2Hasher, SecretHasher};
use crate::auth::policy::{PolicyGate, RulePolicy};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::repository::memory::{MemoryHolidayRepository, MemoryProjectRepository, MemoryUserRepository};
use crate::repository::postgres::{PgHolidayRepository, PgProjectRepository, PgUserRepository};
use crate::repository::{HolidayRepository, ProjectRepository, UserRepository};

use self::credentials::{CredentialVerifier, TokenSettings};
use self::holidays::HolidayService;
use self::projects::ProjectService;
use self::users::{UserService, WorkerResolver};

/// Collaborators the services are built from
#[derive(Clone)]
pub struct ServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub holidays: Arc<dyn HolidayRepository>,
    pub hasher: Arc<dyn SecretHasher>,
    pub policy: Arc<dyn PolicyGate>,
    pub ids: Arc<dyn IdGenerator>,
    pub tokens: TokenSettings,
}

impl ServiceDeps {
    /// PostgreSQL repositories with the production hasher and policy
    pub fn postgres(pool: PgPool, tokens: TokenSettings) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            projects: Arc::new(PgProjectRepository::new(pool.clone())),
            holidays: Arc::new(PgHolidayRepository::new(pool)),
            hasher: Arc::new(Argon2Hasher::default()),
            policy: Arc::new(RulePolicy::default()),
            ids: Arc::new(UuidGenerator),
            tokens,
        }
    }

    /// In-process repositories, for tests and local demos
    pub fn in_memory(tokens: TokenSettings) -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            projects: Arc::new(MemoryProjectRepository::new()),
            holidays: Arc::new(MemoryHolidayRepository::new()),
            hasher: Arc::new(Argon2Hasher::default()),
            policy: Arc::new(RulePolicy::default()),
            ids: Arc::new(UuidGenerator),
            tokens,
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn PolicyGate>) -> Self {
        self.policy = policy;
        self
    }
}

/// All domain services, shared across request handlers
#[derive(Clone)]
pub struct Services {
    pub credentials: Arc<CredentialVerifier>,
    pub users: Arc<UserService>,
    pub projects: Arc<ProjectService>,
    pub holidays: Arc<HolidayService>,
}

impl Services {
    pub fn build(deps: ServiceDeps) -> Self {
        let projects = Arc::new(ProjectService::new(
            deps.projects,
            deps.policy.clone(),
            Arc::new(WorkerResolver::new(deps.users.clone())),
            deps.ids.clone(),
        ));

        let users = Arc::new(UserService::new(
            deps.users.clone(),
            deps.hasher.clone(),
            deps.policy.clone(),
            projects.clone(),
            deps.ids.clone(),
        ));

        let credentials = Arc::new(CredentialVerifier::new(deps.users, deps.hasher, deps.tokens));

        let holidays = Arc::new(HolidayService::new(deps.holidays, deps.policy, deps.ids));

        Self {
            credentials,
            users,
            projects,
            holidays,
        }
    }
}
