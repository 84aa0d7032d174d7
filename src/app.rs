mod goals;
mod insights;
mod logs;
mod tasks;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{ai_context, day_log, goal, job_metrics, progress_log, task, user};
use crate::error::AppError;
use crate::model::{UserChanges, UserInput};

pub use goals::{GoalHierarchy, GoalSummary};
pub use logs::DayLogStats;

const DEFAULT_LIST_LIMIT: u64 = 100;

/// Service object behind every command. Each call is one unit of work
/// against the store; multi-row writes run in their own transaction.
pub struct App {
    db: DatabaseConnection,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: user::Model,
    pub goals: Vec<goal::Model>,
    pub tasks: Vec<task::Model>,
    pub ai_context: Option<ai_context::Model>,
    pub job_metrics: Option<job_metrics::Model>,
}

impl App {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn add_user(&self, input: UserInput) -> Result<user::Model, AppError> {
        ensure_non_empty("telegram id", &input.telegram_id)?;
        ensure_non_empty("user name", &input.name)?;
        let existing = user::Entity::find_by_id(input.telegram_id.clone())
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::InvalidInput(format!(
                "user with telegram id {} already exists",
                input.telegram_id
            )));
        }

        let now = Utc::now();
        let telegram_id = input.telegram_id.clone();
        let active = user::ActiveModel {
            telegram_id: Set(input.telegram_id),
            name: Set(input.name),
            birthday: Set(input.birthday),
            timezone: Set(input.timezone.as_str().to_string()),
            current_phase: Set(input.current_phase.as_str().to_string()),
            quit_job_target: Set(input.quit_job_target),
            onboarding_complete: Set(input.onboarding_complete),
            morning_time: Set(input.morning_time),
            energy_profile: Set(input.energy_profile.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user::Entity::insert(active).exec(&self.db).await?;
        tracing::info!(user_id = %telegram_id, "created user");
        self.get_user(&telegram_id).await
    }

    pub async fn list_users(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<user::Model>, AppError> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::TelegramId)
            .offset(offset.unwrap_or(0))
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .all(&self.db)
            .await?)
    }

    pub async fn get_user(&self, telegram_id: &str) -> Result<user::Model, AppError> {
        require_user_with_conn(&self.db, telegram_id).await
    }

    pub async fn update_user(
        &self,
        telegram_id: &str,
        changes: UserChanges,
    ) -> Result<user::Model, AppError> {
        if let Some(name) = changes.name.as_deref() {
            ensure_non_empty("user name", name)?;
        }

        let mut active = user::ActiveModel {
            telegram_id: Set(telegram_id.to_string()),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(birthday) = changes.birthday {
            active.birthday = Set(Some(birthday));
        }
        if let Some(timezone) = changes.timezone {
            active.timezone = Set(timezone.as_str().to_string());
        }
        if let Some(phase) = changes.current_phase {
            active.current_phase = Set(phase.as_str().to_string());
        }
        if let Some(target) = changes.quit_job_target {
            active.quit_job_target = Set(Some(target));
        }
        if let Some(done) = changes.onboarding_complete {
            active.onboarding_complete = Set(done);
        }
        if let Some(time) = changes.morning_time {
            active.morning_time = Set(Some(time));
        }
        if let Some(profile) = changes.energy_profile {
            active.energy_profile = Set(profile.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("user id {telegram_id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the user together with everything keyed by their id.
    pub async fn delete_user(&self, telegram_id: &str) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            require_user_with_conn(&txn, telegram_id).await?;
            task::Entity::delete_many()
                .filter(task::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            progress_log::Entity::delete_many()
                .filter(progress_log::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            day_log::Entity::delete_many()
                .filter(day_log::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            ai_context::Entity::delete_many()
                .filter(ai_context::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            job_metrics::Entity::delete_many()
                .filter(job_metrics::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            // One statement, so parent and child rows go together.
            let goals = goal::Entity::delete_many()
                .filter(goal::Column::UserId.eq(telegram_id))
                .exec(&txn)
                .await?;
            user::Entity::delete_by_id(telegram_id.to_string())
                .exec(&txn)
                .await?;
            tracing::info!(
                user_id = %telegram_id,
                goals = goals.rows_affected,
                "deleted user and dependent records"
            );
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn user_profile(&self, telegram_id: &str) -> Result<UserProfile, AppError> {
        let user = self.get_user(telegram_id).await?;
        let goals = goal::Entity::find()
            .filter(goal::Column::UserId.eq(telegram_id))
            .order_by_asc(goal::Column::Id)
            .all(&self.db)
            .await?;
        let tasks = task::Entity::find()
            .filter(task::Column::UserId.eq(telegram_id))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?;
        let ai_context = ai_context::Entity::find()
            .filter(ai_context::Column::UserId.eq(telegram_id))
            .order_by_desc(ai_context::Column::LastUpdated)
            .one(&self.db)
            .await?;
        let job_metrics = job_metrics::Entity::find()
            .filter(job_metrics::Column::UserId.eq(telegram_id))
            .order_by_desc(job_metrics::Column::LastUpdated)
            .one(&self.db)
            .await?;
        Ok(UserProfile {
            user,
            goals,
            tasks,
            ai_context,
            job_metrics,
        })
    }
}

async fn require_user_with_conn<C: ConnectionTrait>(
    db: &C,
    telegram_id: &str,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(telegram_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user id {telegram_id}")))
}

async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}

fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}

fn ensure_score(label: &str, value: i32) -> Result<(), AppError> {
    if !(1..=10).contains(&value) {
        return Err(AppError::Validation(format!(
            "{label} must be between 1 and 10 (got {value})"
        )));
    }
    Ok(())
}

fn ensure_non_negative(label: &str, value: f64) -> Result<(), AppError> {
    if value.is_nan() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{label} cannot be negative (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod fixtures {
    use tempfile::TempDir;

    use super::App;
    use crate::config::resolve_db_path;
    use crate::db;
    use crate::entities::{goal, user};
    use crate::model::{GoalInput, GoalType, UserInput};

    pub(super) async fn setup_app() -> (TempDir, App) {
        let dir = TempDir::new().expect("temp dir");
        let db_path = resolve_db_path(dir.path());
        db::ensure_parent_dir(&db_path).expect("ensure parent");
        let db = db::connect(&db_path).await.expect("connect db");
        db::ensure_schema(&db).await.expect("ensure schema");
        (dir, App::new(db))
    }

    pub(super) async fn create_user(app: &App, telegram_id: &str) -> user::Model {
        app.add_user(UserInput::new(telegram_id, "Test User"))
            .await
            .expect("add user")
    }

    pub(super) async fn create_goal(
        app: &App,
        user_id: &str,
        parent: Option<i64>,
        goal_type: GoalType,
        completion: f64,
    ) -> goal::Model {
        let mut input = GoalInput::new(user_id, goal_type, format!("{} goal", goal_type.as_str()));
        input.parent_goal_id = parent;
        input.completion_percentage = completion;
        app.add_goal(input).await.expect("add goal")
    }
}
