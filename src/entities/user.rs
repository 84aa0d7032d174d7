use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ai_context, day_log, goal, job_metrics, progress_log, task};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub telegram_id: String,
    pub name: String,
    pub birthday: Option<Date>,
    pub timezone: String,
    pub current_phase: String,
    pub quit_job_target: Option<Date>,
    pub onboarding_complete: bool,
    pub morning_time: Option<Time>,
    pub energy_profile: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Goal,
    Task,
    ProgressLog,
    DayLog,
    AiContext,
    JobMetrics,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Goal => Entity::has_many(goal::Entity).into(),
            Self::Task => Entity::has_many(task::Entity).into(),
            Self::ProgressLog => Entity::has_many(progress_log::Entity).into(),
            Self::DayLog => Entity::has_many(day_log::Entity).into(),
            Self::AiContext => Entity::has_many(ai_context::Entity).into(),
            Self::JobMetrics => Entity::has_many(job_metrics::Entity).into(),
        }
    }
}

impl Related<goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl Related<task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<progress_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgressLog.def()
    }
}

impl Related<day_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DayLog.def()
    }
}

impl Related<ai_context::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiContext.def()
    }
}

impl Related<job_metrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobMetrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
