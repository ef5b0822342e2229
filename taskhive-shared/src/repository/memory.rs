/// In-memory repositories
///
/// Process-local implementations of the repository ports, guarded by
/// `tokio::sync::RwLock`. They mirror the PostgreSQL constraints that the
/// services rely on (unique email, unique project name and holiday title per
/// owner) so the identity core behaves the same against either backend.
///
/// # Example
///
/// ```
/// use taskhive_shared::repository::memory::MemoryUserRepository;
/// use taskhive_shared::repository::UserRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let users = MemoryUserRepository::new();
/// assert!(users.find_by_email("nobody@example.com").await?.is_none());
/// # Ok(())
/// # }
/// ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{HolidayRepository, ProjectRepository, RepoResult, RepositoryError, UserRepository};
use crate::models::{
    holiday::{Holiday, NewHoliday},
    project::{NewProject, Project},
    user::{NewUser, Role, User},
};

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.user_id) {
            return Err(RepositoryError::UniqueViolation("users_pkey".to_string()));
        }
        let email = user.email.to_lowercase();
        if users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(RepositoryError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let record = User {
            user_id: user.user_id,
            creator_id: user.creator_id,
            role: user.role,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.user_id, record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_workers(&self, creator_id: Uuid) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let mut workers: Vec<User> = users
            .values()
            .filter(|u| u.role == Role::Worker && u.creator_id == creator_id)
            .cloned()
            .collect();
        workers.sort_by_key(|u| u.created_at);
        Ok(workers)
    }

    async fn find_workers_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let mut seen = HashSet::new();
        let mut workers: Vec<User> = ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| users.get(id))
            .filter(|u| u.role == Role::Worker)
            .cloned()
            .collect();
        workers.sort_by_key(|u| u.created_at);
        Ok(workers)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, Default)]
pub struct MemoryProjectRepository {
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    projects
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        let mut projects = self.projects.write().await;

        if projects
            .values()
            .any(|p| p.creator_id == project.creator_id && p.name == project.name)
        {
            return Err(RepositoryError::UniqueViolation(
                "projects_creator_name_key".to_string(),
            ));
        }

        let now = Utc::now();
        let record = Project {
            project_id: project.project_id,
            name: project.name,
            description: project.description,
            creator_id: project.creator_id,
            dev_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        projects.insert(record.project_id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str, creator_id: Uuid) -> RepoResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects
            .values()
            .find(|p| p.name == name && p.creator_id == creator_id)
            .cloned())
    }

    async fn find_by_pm(&self, creator_id: Uuid) -> RepoResult<Vec<Project>> {
        let projects = self.projects.read().await;
        Ok(newest_first(
            projects
                .values()
                .filter(|p| p.creator_id == creator_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_dev(&self, dev_id: Uuid) -> RepoResult<Vec<Project>> {
        let projects = self.projects.read().await;
        Ok(newest_first(
            projects
                .values()
                .filter(|p| p.dev_ids.contains(&dev_id))
                .cloned()
                .collect(),
        ))
    }

    async fn add_devs(&self, project_id: Uuid, dev_ids: &[Uuid]) -> RepoResult<Project> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&project_id).ok_or(RepositoryError::NotFound)?;

        for id in dev_ids {
            if !project.dev_ids.contains(id) {
                project.dev_ids.push(*id);
            }
        }
        project.updated_at = Utc::now();

        Ok(project.clone())
    }

    async fn remove_dev(&self, dev_id: Uuid) -> RepoResult<u64> {
        let mut projects = self.projects.write().await;
        let mut touched = 0;

        for project in projects.values_mut() {
            if project.dev_ids.contains(&dev_id) {
                project.dev_ids.retain(|id| *id != dev_id);
                project.updated_at = Utc::now();
                touched += 1;
            }
        }

        Ok(touched)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.projects
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, Default)]
pub struct MemoryHolidayRepository {
    holidays: RwLock<HashMap<Uuid, Holiday>>,
}

impl MemoryHolidayRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HolidayRepository for MemoryHolidayRepository {
    async fn create(&self, holiday: NewHoliday) -> RepoResult<Holiday> {
        let mut holidays = self.holidays.write().await;

        if holidays
            .values()
            .any(|h| h.creator_id == holiday.creator_id && h.title == holiday.title)
        {
            return Err(RepositoryError::UniqueViolation(
                "holidays_creator_title_key".to_string(),
            ));
        }

        let now = Utc::now();
        let record = Holiday {
            holiday_id: holiday.holiday_id,
            title: holiday.title,
            start: holiday.start,
            end: holiday.end,
            duration: holiday.duration,
            creator_id: holiday.creator_id,
            created_at: now,
            updated_at: now,
        };
        holidays.insert(record.holiday_id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Holiday>> {
        Ok(self.holidays.read().await.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str, creator_id: Uuid) -> RepoResult<Option<Holiday>> {
        let holidays = self.holidays.read().await;
        Ok(holidays
            .values()
            .find(|h| h.title == title && h.creator_id == creator_id)
            .cloned())
    }

    async fn find_all(&self, creator_id: Uuid) -> RepoResult<Vec<Holiday>> {
        let holidays = self.holidays.read().await;
        let mut owned: Vec<Holiday> = holidays
            .values()
            .filter(|h| h.creator_id == creator_id)
            .cloned()
            .collect();
        owned.sort_by_key(|h| h.start);
        Ok(owned)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.holidays
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, role: Role, creator_id: Option<Uuid>) -> NewUser {
        let id = Uuid::new_v4();
        NewUser {
            user_id: id,
            creator_id: creator_id.unwrap_or(id),
            role,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("a@x.com", Role::Manager, None)).await.unwrap();

        let err = repo
            .create(new_user("a@x.com", Role::Manager, None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_email_comparison_folds_non_ascii_case() {
        let repo = MemoryUserRepository::new();
        let created = repo
            .create(new_user("ÉLODIE@x.com", Role::Manager, None))
            .await
            .unwrap();

        let found = repo.find_by_email("élodie@x.com").await.unwrap();
        assert_eq!(found.map(|u| u.user_id), Some(created.user_id));

        let err = repo
            .create(new_user("élodie@X.COM", Role::Manager, None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_find_workers_only_returns_owned_workers() {
        let repo = MemoryUserRepository::new();
        let pm = repo.create(new_user("pm@x.com", Role::Manager, None)).await.unwrap();
        let other = repo.create(new_user("other@x.com", Role::Manager, None)).await.unwrap();
        let dev = repo
            .create(new_user("d@x.com", Role::Worker, Some(pm.user_id)))
            .await
            .unwrap();
        repo.create(new_user("e@x.com", Role::Worker, Some(other.user_id)))
            .await
            .unwrap();

        let workers = repo.find_workers(pm.user_id).await.unwrap();
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].user_id, dev.user_id);
    }

    #[tokio::test]
    async fn test_find_workers_by_ids_omits_unknown_and_managers() {
        let repo = MemoryUserRepository::new();
        let pm = repo.create(new_user("pm@x.com", Role::Manager, None)).await.unwrap();
        let dev = repo
            .create(new_user("d@x.com", Role::Worker, Some(pm.user_id)))
            .await
            .unwrap();

        let found = repo
            .find_workers_by_ids(&[dev.user_id, pm.user_id, Uuid::new_v4(), dev.user_id])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, dev.user_id);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let repo = MemoryUserRepository::new();
        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_remove_dev_touches_every_project() {
        let repo = MemoryProjectRepository::new();
        let owner = Uuid::new_v4();
        let dev = Uuid::new_v4();

        for name in ["alpha", "beta"] {
            let project = repo
                .create(NewProject {
                    project_id: Uuid::new_v4(),
                    name: name.to_string(),
                    description: None,
                    creator_id: owner,
                })
                .await
                .unwrap();
            repo.add_devs(project.project_id, &[dev]).await.unwrap();
        }

        assert_eq!(repo.find_by_dev(dev).await.unwrap().len(), 2);
        assert_eq!(repo.remove_dev(dev).await.unwrap(), 2);
        assert!(repo.find_by_dev(dev).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_devs_ignores_duplicates() {
        let repo = MemoryProjectRepository::new();
        let dev = Uuid::new_v4();
        let project = repo
            .create(NewProject {
                project_id: Uuid::new_v4(),
                name: "alpha".to_string(),
                description: None,
                creator_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        repo.add_devs(project.project_id, &[dev]).await.unwrap();
        let updated = repo.add_devs(project.project_id, &[dev]).await.unwrap();
        assert_eq!(updated.dev_ids, vec![dev]);
    }

    #[tokio::test]
    async fn test_holiday_title_unique_per_owner() {
        let repo = MemoryHolidayRepository::new();
        let holiday = |owner: Uuid| NewHoliday {
            holiday_id: Uuid::new_v4(),
            title: "Tet".to_string(),
            start: 0,
            end: 0,
            duration: 0,
            creator_id: owner,
        };

        let owner = Uuid::new_v4();
        repo.create(holiday(owner)).await.unwrap();
        assert!(repo.create(holiday(owner)).await.is_err());
        assert!(repo.create(holiday(Uuid::new_v4())).await.is_ok());
    }
}
