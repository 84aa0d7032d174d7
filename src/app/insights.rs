use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{ensure_non_negative, ensure_score, require_user_with_conn, App, DEFAULT_LIST_LIMIT};
use crate::entities::{ai_context, job_metrics};
use crate::error::AppError;
use crate::model::{AiContextFields, JobMetricsChanges, JobMetricsInput};
use crate::progress::ensure_percentage;

impl App {
    pub async fn add_ai_context(
        &self,
        user_id: &str,
        fields: AiContextFields,
    ) -> Result<ai_context::Model, AppError> {
        ensure_behavior_patterns(fields.behavior_patterns.as_deref())?;
        require_user_with_conn(&self.db, user_id).await?;
        let existing = ai_context::Entity::find()
            .filter(ai_context::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::InvalidInput(format!(
                "ai context already exists for user {user_id}"
            )));
        }

        let active = ai_context::ActiveModel {
            user_id: Set(user_id.to_string()),
            behavior_patterns: Set(fields.behavior_patterns),
            productivity_insights: Set(fields.productivity_insights),
            motivation_triggers: Set(fields.motivation_triggers),
            stress_indicators: Set(fields.stress_indicators),
            optimal_work_times: Set(fields.optimal_work_times),
            last_updated: Set(Utc::now()),
            ..Default::default()
        };
        let insert = ai_context::Entity::insert(active).exec(&self.db).await?;
        tracing::info!(context_id = insert.last_insert_id, user_id, "created ai context");
        self.get_ai_context(insert.last_insert_id).await
    }

    pub async fn get_ai_context(&self, id: i64) -> Result<ai_context::Model, AppError> {
        ai_context::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ai context id {id}")))
    }

    pub async fn list_ai_contexts(
        &self,
        user_id: Option<&str>,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<ai_context::Model>, AppError> {
        let mut select = ai_context::Entity::find();
        if let Some(user_id) = user_id {
            select = select.filter(ai_context::Column::UserId.eq(user_id));
        }
        Ok(select
            .order_by_asc(ai_context::Column::Id)
            .offset(offset.unwrap_or(0))
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .all(&self.db)
            .await?)
    }

    /// The user's context. Rows written before the one-per-user rule are
    /// resolved to the most recently updated.
    pub async fn ai_context_for_user(&self, user_id: &str) -> Result<ai_context::Model, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        ai_context::Entity::find()
            .filter(ai_context::Column::UserId.eq(user_id))
            .order_by_desc(ai_context::Column::LastUpdated)
            .order_by_desc(ai_context::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ai context for user {user_id}")))
    }

    pub async fn update_ai_context(
        &self,
        id: i64,
        fields: AiContextFields,
    ) -> Result<ai_context::Model, AppError> {
        ensure_behavior_patterns(fields.behavior_patterns.as_deref())?;
        let mut active = ai_context::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(text) = fields.behavior_patterns {
            active.behavior_patterns = Set(Some(text));
        }
        if let Some(text) = fields.productivity_insights {
            active.productivity_insights = Set(Some(text));
        }
        if let Some(text) = fields.motivation_triggers {
            active.motivation_triggers = Set(Some(text));
        }
        if let Some(text) = fields.stress_indicators {
            active.stress_indicators = Set(Some(text));
        }
        if let Some(text) = fields.optimal_work_times {
            active.optimal_work_times = Set(Some(text));
        }
        active.last_updated = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("ai context id {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_ai_context(&self, id: i64) -> Result<(), AppError> {
        let result = ai_context::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("ai context id {id}")));
        }
        Ok(())
    }

    pub async fn add_job_metrics(
        &self,
        input: JobMetricsInput,
    ) -> Result<job_metrics::Model, AppError> {
        ensure_metrics(&JobMetricsChanges {
            current_salary: input.current_salary,
            startup_revenue: input.startup_revenue,
            monthly_expenses: input.monthly_expenses,
            runway_months: input.runway_months,
            stress_level: Some(input.stress_level),
            job_satisfaction: Some(input.job_satisfaction),
            quit_readiness_score: input.quit_readiness_score,
        })?;
        require_user_with_conn(&self.db, &input.user_id).await?;

        let active = job_metrics::ActiveModel {
            user_id: Set(input.user_id),
            current_salary: Set(input.current_salary),
            startup_revenue: Set(input.startup_revenue),
            monthly_expenses: Set(input.monthly_expenses),
            runway_months: Set(input.runway_months),
            stress_level: Set(input.stress_level),
            job_satisfaction: Set(input.job_satisfaction),
            quit_readiness_score: Set(input.quit_readiness_score),
            last_updated: Set(Utc::now()),
            ..Default::default()
        };
        let insert = job_metrics::Entity::insert(active).exec(&self.db).await?;
        tracing::info!(metrics_id = insert.last_insert_id, "created job metrics");
        self.get_job_metrics(insert.last_insert_id).await
    }

    pub async fn get_job_metrics(&self, id: i64) -> Result<job_metrics::Model, AppError> {
        job_metrics::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job metrics id {id}")))
    }

    pub async fn latest_job_metrics(&self, user_id: &str) -> Result<job_metrics::Model, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        job_metrics::Entity::find()
            .filter(job_metrics::Column::UserId.eq(user_id))
            .order_by_desc(job_metrics::Column::LastUpdated)
            .order_by_desc(job_metrics::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job metrics for user {user_id}")))
    }

    pub async fn update_job_metrics(
        &self,
        id: i64,
        changes: JobMetricsChanges,
    ) -> Result<job_metrics::Model, AppError> {
        ensure_metrics(&changes)?;
        let mut active = job_metrics::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(value) = changes.current_salary {
            active.current_salary = Set(Some(value));
        }
        if let Some(value) = changes.startup_revenue {
            active.startup_revenue = Set(Some(value));
        }
        if let Some(value) = changes.monthly_expenses {
            active.monthly_expenses = Set(Some(value));
        }
        if let Some(value) = changes.runway_months {
            active.runway_months = Set(Some(value));
        }
        if let Some(value) = changes.stress_level {
            active.stress_level = Set(value);
        }
        if let Some(value) = changes.job_satisfaction {
            active.job_satisfaction = Set(value);
        }
        if let Some(value) = changes.quit_readiness_score {
            active.quit_readiness_score = Set(Some(value));
        }
        active.last_updated = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("job metrics id {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_job_metrics(&self, id: i64) -> Result<(), AppError> {
        let result = job_metrics::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("job metrics id {id}")));
        }
        Ok(())
    }
}

fn ensure_behavior_patterns(value: Option<&str>) -> Result<(), AppError> {
    let Some(text) = value else {
        return Ok(());
    };
    serde_json::from_str::<serde_json::Value>(text)
        .map(|_| ())
        .map_err(|err| AppError::Validation(format!("behavior patterns must be valid JSON: {err}")))
}

fn ensure_metrics(metrics: &JobMetricsChanges) -> Result<(), AppError> {
    for (label, value) in [
        ("current salary", metrics.current_salary),
        ("startup revenue", metrics.startup_revenue),
        ("monthly expenses", metrics.monthly_expenses),
        ("runway months", metrics.runway_months),
    ] {
        if let Some(value) = value {
            ensure_non_negative(label, value)?;
        }
    }
    if let Some(value) = metrics.stress_level {
        ensure_score("stress level", value)?;
    }
    if let Some(value) = metrics.job_satisfaction {
        ensure_score("job satisfaction", value)?;
    }
    if let Some(value) = metrics.quit_readiness_score {
        ensure_percentage("quit readiness score", value)?;
    }
    Ok(())
}
