/// Project service
///
/// Projects belong to the caller's effective owner. A worker reads its
/// manager's projects; only a manager (per the policy gate) creates, assigns
/// or deletes them. A project owned by someone else is reported as not found.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::context::IdentityContext;
use crate::auth::ownership::effective_owner_id;
use crate::auth::policy::{
    PolicyGate, ACTION_ASSIGN, ACTION_CREATE, ACTION_DELETE, ACTION_READ, OBJECT_PROJECT,
};
use crate::error::{validate_request, ServiceError, ServiceResult};
use crate::ids::IdGenerator;
use crate::models::project::{AssignDevsRequest, CreateProjectRequest, NewProject, Project};
use crate::models::user::UserInfo;
use crate::repository::{ProjectRepository, RepositoryError};
use crate::services::users::{ProjectDetacher, WorkerResolution};

/// Worker lookup used to hydrate and check project assignments
#[async_trait]
pub trait WorkerDirectory: Send + Sync {
    async fn resolve_workers(&self, ids: &[Uuid]) -> ServiceResult<WorkerResolution>;
}

/// Workers assigned to a project
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectDevs {
    pub devs: Vec<UserInfo>,

    /// Assigned ids whose identity no longer resolves
    pub missing: Vec<Uuid>,
}

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    policy: Arc<dyn PolicyGate>,
    workers: Arc<dyn WorkerDirectory>,
    ids: Arc<dyn IdGenerator>,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        policy: Arc<dyn PolicyGate>,
        workers: Arc<dyn WorkerDirectory>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            projects,
            policy,
            workers,
            ids,
        }
    }

    pub async fn create(
        &self,
        ctx: &IdentityContext,
        req: CreateProjectRequest,
    ) -> ServiceResult<Project> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_CREATE)?;
        validate_request(&req)?;

        let owner = effective_owner_id(ctx);

        let existing = self
            .projects
            .find_by_name(&req.name, owner)
            .await
            .map_err(|e| ServiceError::internal("Failed to check project name", e))?;
        if existing.is_some() {
            return Err(ServiceError::DuplicatedProject);
        }

        let project = self
            .projects
            .create(NewProject {
                project_id: self.ids.new_id(),
                name: req.name,
                description: req.description,
                creator_id: owner,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::UniqueViolation(_) => ServiceError::DuplicatedProject,
                other => ServiceError::internal("Failed to create project", other),
            })?;

        info!(project_id = %project.project_id, creator_id = %owner, "Project created");
        Ok(project)
    }

    /// Projects owned by the caller's effective owner, newest first
    pub async fn list(&self, ctx: &IdentityContext) -> ServiceResult<Vec<Project>> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_READ)?;

        self.projects
            .find_by_pm(effective_owner_id(ctx))
            .await
            .map_err(|e| ServiceError::internal("Failed to list projects", e))
    }

    /// Projects the calling worker is assigned to
    ///
    /// For a manager this is always empty.
    pub async fn assigned(&self, ctx: &IdentityContext) -> ServiceResult<Vec<Project>> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_READ)?;

        let owner = effective_owner_id(ctx);
        let projects = self
            .projects
            .find_by_dev(ctx.user_id)
            .await
            .map_err(|e| ServiceError::internal("Failed to list assigned projects", e))?;

        Ok(projects.into_iter().filter(|p| p.creator_id == owner).collect())
    }

    pub async fn get(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<Project> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_READ)?;
        self.owned(ctx, id).await
    }

    /// Assigns workers of the caller's effective owner to a project
    ///
    /// Ids that do not resolve, or that belong to another manager's workers,
    /// fail the whole request with `MissingWorkers`.
    pub async fn assign_devs(
        &self,
        ctx: &IdentityContext,
        id: Uuid,
        req: AssignDevsRequest,
    ) -> ServiceResult<Project> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_ASSIGN)?;
        validate_request(&req)?;

        let project = self.owned(ctx, id).await?;
        let owner = effective_owner_id(ctx);

        let resolution = self.workers.resolve_workers(&req.dev_ids).await?;
        let mut missing = resolution.missing;
        let mut dev_ids = Vec::with_capacity(resolution.found.len());
        for dev in resolution.found {
            if dev.creator_id == owner {
                dev_ids.push(dev.user_id);
            } else {
                missing.push(dev.user_id);
            }
        }

        if !missing.is_empty() {
            warn!(project_id = %id, missing = missing.len(), "Refused assignment of unknown workers");
            return Err(ServiceError::MissingWorkers(missing));
        }

        let updated = self
            .projects
            .add_devs(project.project_id, &dev_ids)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to assign workers", e, ServiceError::NotFound))?;

        info!(project_id = %id, assigned = dev_ids.len(), "Workers assigned to project");
        Ok(updated)
    }

    /// Hydrates a project's assigned workers
    pub async fn devs(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<ProjectDevs> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_READ)?;

        let project = self.owned(ctx, id).await?;
        let resolution = self.workers.resolve_workers(&project.dev_ids).await?;

        Ok(ProjectDevs {
            devs: resolution.found,
            missing: resolution.missing,
        })
    }

    pub async fn delete(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<()> {
        self.policy.validate(ctx, OBJECT_PROJECT, ACTION_DELETE)?;

        let project = self.owned(ctx, id).await?;
        self.projects
            .delete(project.project_id)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to delete project", e, ServiceError::NotFound))?;

        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    async fn owned(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<Project> {
        let project = self
            .projects
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to look up project", e, ServiceError::NotFound))?;

        match project {
            Some(p) if p.creator_id == effective_owner_id(ctx) => Ok(p),
            _ => Err(ServiceError::NotFound),
        }
    }
}

#[async_trait]
impl ProjectDetacher for ProjectService {
    async fn remove_devs(&self, dev_id: Uuid) -> ServiceResult<()> {
        let touched = self
            .projects
            .remove_dev(dev_id)
            .await
            .map_err(|e| ServiceError::internal("Failed to detach worker from projects", e))?;

        info!(dev_id = %dev_id, projects = touched, "Worker detached from projects");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::RulePolicy;
    use crate::ids::UuidGenerator;
    use crate::models::user::Role;
    use crate::repository::memory::MemoryProjectRepository;
    use chrono::Utc;

    /// Directory backed by a fixed list of workers
    struct FixedWorkers(Vec<UserInfo>);

    #[async_trait]
    impl WorkerDirectory for FixedWorkers {
        async fn resolve_workers(&self, ids: &[Uuid]) -> ServiceResult<WorkerResolution> {
            let mut resolution = WorkerResolution::default();
            for id in ids {
                match self.0.iter().find(|w| w.user_id == *id) {
                    Some(w) => resolution.found.push(w.clone()),
                    None => resolution.missing.push(*id),
                }
            }
            Ok(resolution)
        }
    }

    fn worker_of(pm: Uuid) -> UserInfo {
        UserInfo {
            user_id: Uuid::new_v4(),
            creator_id: pm,
            role: Role::Worker,
            email: format!("{}@x.com", Uuid::new_v4()),
            first_name: "Dev".to_string(),
            last_name: "Eloper".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager() -> IdentityContext {
        let id = Uuid::new_v4();
        IdentityContext::new(id, id, Role::Manager)
    }

    fn service(workers: Vec<UserInfo>) -> ProjectService {
        ProjectService::new(
            Arc::new(MemoryProjectRepository::new()),
            Arc::new(RulePolicy::default()),
            Arc::new(FixedWorkers(workers)),
            Arc::new(UuidGenerator),
        )
    }

    fn create_request(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_attributes_to_manager() {
        let pm = manager();
        let projects = service(vec![]);

        let project = projects.create(&pm, create_request("Apollo")).await.unwrap();
        assert_eq!(project.creator_id, pm.user_id);
        assert!(project.dev_ids.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_per_owner() {
        let projects = service(vec![]);
        let pm = manager();
        let other = manager();

        projects.create(&pm, create_request("Apollo")).await.unwrap();
        assert!(matches!(
            projects.create(&pm, create_request("Apollo")).await,
            Err(ServiceError::DuplicatedProject)
        ));
        assert!(projects.create(&other, create_request("Apollo")).await.is_ok());
    }

    #[tokio::test]
    async fn test_worker_cannot_create() {
        let pm = manager();
        let dev = IdentityContext::new(Uuid::new_v4(), pm.user_id, Role::Worker);
        let projects = service(vec![]);

        assert!(matches!(
            projects.create(&dev, create_request("Apollo")).await,
            Err(ServiceError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_other_owner_project_is_not_found() {
        let projects = service(vec![]);
        let pm = manager();
        let project = projects.create(&pm, create_request("Apollo")).await.unwrap();

        let stranger = IdentityContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Worker);
        assert!(matches!(
            projects.get(&stranger, project.project_id).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            projects.delete(&manager(), project.project_id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_assign_rejects_foreign_and_unknown_workers() {
        let pm = manager();
        let own = worker_of(pm.user_id);
        let foreign = worker_of(Uuid::new_v4());
        let ghost = Uuid::new_v4();
        let projects = service(vec![own.clone(), foreign.clone()]);
        let project = projects.create(&pm, create_request("Apollo")).await.unwrap();

        let err = projects
            .assign_devs(
                &pm,
                project.project_id,
                AssignDevsRequest {
                    dev_ids: vec![own.user_id, foreign.user_id, ghost],
                },
            )
            .await
            .unwrap_err();

        match err {
            ServiceError::MissingWorkers(ids) => {
                assert_eq!(ids.len(), 2);
                assert!(ids.contains(&foreign.user_id));
                assert!(ids.contains(&ghost));
            }
            other => panic!("expected missing workers, got {:?}", other),
        }

        // Nothing was assigned
        let devs = projects.devs(&pm, project.project_id).await.unwrap();
        assert!(devs.devs.is_empty());
    }

    #[tokio::test]
    async fn test_assign_and_detach() {
        let pm = manager();
        let dev = worker_of(pm.user_id);
        let projects = service(vec![dev.clone()]);
        let project = projects.create(&pm, create_request("Apollo")).await.unwrap();

        let updated = projects
            .assign_devs(
                &pm,
                project.project_id,
                AssignDevsRequest {
                    dev_ids: vec![dev.user_id],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.dev_ids, vec![dev.user_id]);

        let dev_ctx = IdentityContext::from(&dev);
        assert_eq!(projects.assigned(&dev_ctx).await.unwrap().len(), 1);

        projects.remove_devs(dev.user_id).await.unwrap();
        assert!(projects.get(&pm, project.project_id).await.unwrap().dev_ids.is_empty());
        assert!(projects.assigned(&dev_ctx).await.unwrap().is_empty());
    }
}
