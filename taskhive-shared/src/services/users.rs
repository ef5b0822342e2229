/// Identity registry
///
/// Creates, looks up and deletes identity records while enforcing the role
/// invariants:
///
/// - a manager registers itself and owns itself (`creator_id == user_id`)
/// - only a manager may create, list or delete workers
/// - a worker is always created with the caller as its owner
/// - a manager is never deletable
///
/// # Worker deletion
///
/// Deleting a worker is a two-step sequence, not a transaction. The worker is
/// first detached from every project through the [`ProjectDetacher`], then the
/// identity record is removed. A detachment failure aborts the delete with
/// nothing removed. A crash between the two steps leaves an identity that is
/// no longer assigned to any project; deleting it again completes the
/// sequence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::context::IdentityContext;
use crate::auth::password::SecretHasher;
use crate::auth::policy::{PolicyGate, ACTION_ANY, OBJECT_ANY};
use crate::error::{validate_request, ServiceError, ServiceResult};
use crate::ids::IdGenerator;
use crate::models::user::{CreateWorkerRequest, NewUser, RegisterRequest, Role, User, UserInfo};
use crate::repository::{RepositoryError, UserRepository};
use crate::services::projects::WorkerDirectory;

/// Detaches a worker from every project it is assigned to
///
/// Implemented by the project service and invoked before a worker identity is
/// deleted.
#[async_trait]
pub trait ProjectDetacher: Send + Sync {
    async fn remove_devs(&self, dev_id: Uuid) -> ServiceResult<()>;
}

/// Outcome of a batch worker lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerResolution {
    /// Workers that matched, in request order
    pub found: Vec<UserInfo>,

    /// Requested ids with no matching worker, in request order
    pub missing: Vec<Uuid>,
}

impl WorkerResolution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Batch worker lookup over the identity store
///
/// Shared by [`UserService::resolve_workers`] and handed to the project
/// service as its [`WorkerDirectory`].
#[derive(Clone)]
pub struct WorkerResolver {
    users: Arc<dyn UserRepository>,
}

impl WorkerResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolves `ids` to workers; duplicate ids are collapsed
    pub async fn resolve(&self, ids: &[Uuid]) -> ServiceResult<WorkerResolution> {
        let mut seen = HashSet::new();
        let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        if unique.is_empty() {
            return Ok(WorkerResolution::default());
        }

        let mut by_id: HashMap<Uuid, User> = self
            .users
            .find_workers_by_ids(&unique)
            .await
            .map_err(|e| ServiceError::internal("Failed to resolve workers", e))?
            .into_iter()
            .map(|u| (u.user_id, u))
            .collect();

        let mut resolution = WorkerResolution::default();
        for id in unique {
            match by_id.remove(&id) {
                Some(user) => resolution.found.push(user.into()),
                None => resolution.missing.push(id),
            }
        }

        if !resolution.is_complete() {
            warn!(
                requested = ids.len(),
                missing = resolution.missing.len(),
                "Some worker ids did not resolve"
            );
        }

        Ok(resolution)
    }
}

#[async_trait]
impl WorkerDirectory for WorkerResolver {
    async fn resolve_workers(&self, ids: &[Uuid]) -> ServiceResult<WorkerResolution> {
        self.resolve(ids).await
    }
}

/// Identity registry service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn SecretHasher>,
    policy: Arc<dyn PolicyGate>,
    detacher: Arc<dyn ProjectDetacher>,
    ids: Arc<dyn IdGenerator>,
    resolver: WorkerResolver,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn SecretHasher>,
        policy: Arc<dyn PolicyGate>,
        detacher: Arc<dyn ProjectDetacher>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let resolver = WorkerResolver::new(users.clone());
        Self {
            users,
            hasher,
            policy,
            detacher,
            ids,
            resolver,
        }
    }

    /// Registers a new manager
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is missing or the email is malformed
    /// - `DuplicatedEmail` if any identity already uses the email
    /// - `Internal` on hashing or storage failure
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<UserInfo> {
        validate_request(&req)?;
        self.ensure_email_free(&req.email).await?;

        let user_id = self.ids.new_id();
        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .insert(NewUser {
                user_id,
                creator_id: user_id,
                role: Role::Manager,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await?;

        info!(user_id = %user.user_id, "Manager registered");
        Ok(user.into())
    }

    /// Creates a worker owned by the calling manager
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller is not a manager
    /// - `Validation` if a field is missing or the email is malformed
    /// - `InvalidAction` if the request asks for any role other than worker
    /// - `DuplicatedEmail` if any identity already uses the email
    pub async fn create_worker(
        &self,
        ctx: &IdentityContext,
        req: CreateWorkerRequest,
    ) -> ServiceResult<UserInfo> {
        self.policy.validate(ctx, OBJECT_ANY, ACTION_ANY)?;
        validate_request(&req)?;

        if let Some(role) = req.role {
            if role != Role::Worker {
                warn!(caller = %ctx.user_id, requested_role = %role, "Refused worker creation with elevated role");
                return Err(ServiceError::InvalidAction(format!(
                    "cannot create a user with role '{}'",
                    role
                )));
            }
        }

        self.ensure_email_free(&req.email).await?;

        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .insert(NewUser {
                user_id: self.ids.new_id(),
                creator_id: ctx.user_id,
                role: Role::Worker,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await?;

        info!(user_id = %user.user_id, creator_id = %user.creator_id, "Worker created");
        Ok(user.into())
    }

    /// Deletes one of the caller's workers
    ///
    /// A worker owned by another manager is reported as not found.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller is not a manager
    /// - `NotFoundUser` if no such worker is visible to the caller
    /// - `InvalidAction` if the target is a manager
    /// - whatever the project detacher returns; nothing is deleted then
    pub async fn delete(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<()> {
        self.policy.validate(ctx, OBJECT_ANY, ACTION_ANY)?;

        let target = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to look up user", e, ServiceError::NotFoundUser))?
            .ok_or(ServiceError::NotFoundUser)?;

        if target.role == Role::Manager {
            warn!(caller = %ctx.user_id, target = %id, "Refused to delete a manager");
            return Err(ServiceError::InvalidAction(
                "managers cannot be deleted".to_string(),
            ));
        }

        if target.creator_id != ctx.user_id {
            warn!(caller = %ctx.user_id, target = %id, "Refused to delete another manager's worker");
            return Err(ServiceError::NotFoundUser);
        }

        if let Err(e) = self.detacher.remove_devs(id).await {
            error!(user_id = %id, error = %e, "Project detachment failed, worker not deleted");
            return Err(e);
        }

        self.users.delete(id).await.map_err(|e| {
            match &e {
                RepositoryError::NotFound => {
                    debug!(user_id = %id, "Worker already gone by the time of delete")
                }
                _ => {
                    error!(user_id = %id, error = %e, "Worker detached from projects but identity delete failed")
                }
            }
            ServiceError::from_repository("Failed to delete user", e, ServiceError::NotFoundUser)
        })?;

        info!(user_id = %id, creator_id = %ctx.user_id, "Worker deleted");
        Ok(())
    }

    /// Lists the caller's own workers
    pub async fn list_workers(&self, ctx: &IdentityContext) -> ServiceResult<Vec<UserInfo>> {
        self.policy.validate(ctx, OBJECT_ANY, ACTION_ANY)?;

        let workers = self
            .users
            .find_workers(ctx.user_id)
            .await
            .map_err(|e| ServiceError::internal("Failed to list workers", e))?;

        Ok(workers.into_iter().map(UserInfo::from).collect())
    }

    /// Batch worker lookup reporting the ids that did not match
    pub async fn resolve_workers(&self, ids: &[Uuid]) -> ServiceResult<WorkerResolution> {
        self.resolver.resolve(ids).await
    }

    /// Fails with `NotFoundUser` unless an identity with `id` exists
    pub async fn check_user_exists(&self, id: Uuid) -> ServiceResult<()> {
        match self.users.find_by_id(id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) | Err(RepositoryError::NotFound) => Err(ServiceError::NotFoundUser),
            Err(e) => Err(ServiceError::internal("Failed to look up user", e)),
        }
    }

    async fn ensure_email_free(&self, email: &str) -> ServiceResult<()> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| ServiceError::internal("Failed to check email", e))?;

        if existing.is_some() {
            return Err(ServiceError::DuplicatedEmail);
        }
        Ok(())
    }

    /// The unique constraint decides races the pre-check lets through
    async fn insert(&self, user: NewUser) -> ServiceResult<User> {
        self.users.create(user).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => ServiceError::DuplicatedEmail,
            other => ServiceError::internal("Failed to create user", other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{Argon2Hasher, HashParams};
    use crate::auth::policy::RulePolicy;
    use crate::ids::UuidGenerator;
    use crate::repository::memory::MemoryUserRepository;

    struct NoProjects;

    #[async_trait]
    impl ProjectDetacher for NoProjects {
        async fn remove_devs(&self, _dev_id: Uuid) -> ServiceResult<()> {
            Ok(())
        }
    }

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new(HashParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })),
            Arc::new(RulePolicy::default()),
            Arc::new(NoProjects),
            Arc::new(UuidGenerator),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "pw1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    fn worker_request(email: &str) -> CreateWorkerRequest {
        CreateWorkerRequest {
            email: email.to_string(),
            password: "pw1".to_string(),
            first_name: "Dev".to_string(),
            last_name: "One".to_string(),
            role: Some(Role::Worker),
        }
    }

    #[tokio::test]
    async fn test_register_creates_self_owned_manager() {
        let users = service();
        let pm = users.register(register_request("a@x.com")).await.unwrap();

        assert_eq!(pm.role, Role::Manager);
        assert_eq!(pm.creator_id, pm.user_id);
    }

    #[tokio::test]
    async fn test_register_reports_invalid_fields() {
        let users = service();
        let mut req = register_request("not-an-email");
        req.first_name = String::new();

        match users.register(req).await {
            Err(ServiceError::Validation(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "first_name"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_role_defaults_when_omitted() {
        let users = service();
        let pm: IdentityContext = (&users.register(register_request("pm@x.com")).await.unwrap()).into();

        let mut req = worker_request("d@x.com");
        req.role = None;
        let dev = users.create_worker(&pm, req).await.unwrap();

        assert_eq!(dev.role, Role::Worker);
        assert_eq!(dev.creator_id, pm.user_id);
    }

    #[tokio::test]
    async fn test_resolver_collapses_duplicates_and_reports_missing() {
        let users = service();
        let pm: IdentityContext = (&users.register(register_request("pm@x.com")).await.unwrap()).into();
        let dev = users.create_worker(&pm, worker_request("d@x.com")).await.unwrap();
        let ghost = Uuid::new_v4();

        let resolution = users
            .resolve_workers(&[dev.user_id, ghost, dev.user_id])
            .await
            .unwrap();

        assert_eq!(resolution.found.len(), 1);
        assert_eq!(resolution.found[0].user_id, dev.user_id);
        assert_eq!(resolution.missing, vec![ghost]);
        assert!(!resolution.is_complete());
    }

    #[tokio::test]
    async fn test_resolver_ignores_managers() {
        let users = service();
        let pm = users.register(register_request("pm@x.com")).await.unwrap();

        let resolution = users.resolve_workers(&[pm.user_id]).await.unwrap();
        assert!(resolution.found.is_empty());
        assert_eq!(resolution.missing, vec![pm.user_id]);
    }

    #[tokio::test]
    async fn test_check_user_exists() {
        let users = service();
        let pm = users.register(register_request("pm@x.com")).await.unwrap();

        assert!(users.check_user_exists(pm.user_id).await.is_ok());
        assert!(matches!(
            users.check_user_exists(Uuid::new_v4()).await,
            Err(ServiceError::NotFoundUser)
        ));
    }
}
