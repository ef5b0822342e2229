/// Holiday service
///
/// Holidays are declared by a manager and shared with its workers. Titles are
/// unique per owner; the stored duration is the number of whole days between
/// `start` and `end`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::context::IdentityContext;
use crate::auth::ownership::effective_owner_id;
use crate::auth::policy::{PolicyGate, ACTION_CREATE, ACTION_DELETE, ACTION_READ, OBJECT_HOLIDAY};
use crate::error::{validate_request, FieldError, ServiceError, ServiceResult};
use crate::ids::IdGenerator;
use crate::models::holiday::{duration_days, Holiday, HolidayRequest, NewHoliday};
use crate::repository::{HolidayRepository, RepositoryError};

pub struct HolidayService {
    holidays: Arc<dyn HolidayRepository>,
    policy: Arc<dyn PolicyGate>,
    ids: Arc<dyn IdGenerator>,
}

impl HolidayService {
    pub fn new(
        holidays: Arc<dyn HolidayRepository>,
        policy: Arc<dyn PolicyGate>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            holidays,
            policy,
            ids,
        }
    }

    pub async fn create(&self, ctx: &IdentityContext, req: HolidayRequest) -> ServiceResult<Holiday> {
        self.policy.validate(ctx, OBJECT_HOLIDAY, ACTION_CREATE)?;
        validate_request(&req)?;
        if req.end < req.start {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "end",
                "End must not be before start",
            )]));
        }

        let owner = effective_owner_id(ctx);

        let existing = self
            .holidays
            .find_by_title(&req.title, owner)
            .await
            .map_err(|e| ServiceError::internal("Failed to check holiday title", e))?;
        if existing.is_some() {
            return Err(ServiceError::DuplicatedHoliday);
        }

        let holiday = self
            .holidays
            .create(NewHoliday {
                holiday_id: self.ids.new_id(),
                duration: duration_days(req.start, req.end),
                title: req.title,
                start: req.start,
                end: req.end,
                creator_id: owner,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::UniqueViolation(_) => ServiceError::DuplicatedHoliday,
                other => ServiceError::internal("Failed to create holiday", other),
            })?;

        info!(holiday_id = %holiday.holiday_id, creator_id = %owner, days = holiday.duration, "Holiday created");
        Ok(holiday)
    }

    /// Holidays of the caller's effective owner, by start date
    pub async fn list(&self, ctx: &IdentityContext) -> ServiceResult<Vec<Holiday>> {
        self.policy.validate(ctx, OBJECT_HOLIDAY, ACTION_READ)?;

        self.holidays
            .find_all(effective_owner_id(ctx))
            .await
            .map_err(|e| ServiceError::internal("Failed to list holidays", e))
    }

    pub async fn delete(&self, ctx: &IdentityContext, id: Uuid) -> ServiceResult<()> {
        self.policy.validate(ctx, OBJECT_HOLIDAY, ACTION_DELETE)?;

        let holiday = self
            .holidays
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to look up holiday", e, ServiceError::NotFound))?
            .filter(|h| h.creator_id == effective_owner_id(ctx))
            .ok_or(ServiceError::NotFound)?;

        self.holidays
            .delete(holiday.holiday_id)
            .await
            .map_err(|e| ServiceError::from_repository("Failed to delete holiday", e, ServiceError::NotFound))?;

        info!(holiday_id = %id, "Holiday deleted");
        Ok(())
    }
}
