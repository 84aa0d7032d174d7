use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{task, user};

/// A goal node. `parent_goal_id` points at another row of this table; a
/// null parent marks a root.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub parent_goal_id: Option<i64>,
    pub goal_type: String,
    pub description: String,
    pub deadline: Option<Date>,
    pub status: String,
    pub phase: String,
    pub priority: String,
    pub completion_percentage: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Parent,
    Task,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::TelegramId)
                .into(),
            Self::Parent => Entity::belongs_to(Entity)
                .from(Column::ParentGoalId)
                .to(Column::Id)
                .into(),
            Self::Task => Entity::has_many(task::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
