use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::goals::ensure_same_owner;
use super::{
    ensure_non_empty, finalize_transaction, require_user_with_conn, App, DEFAULT_LIST_LIMIT,
};
use crate::entities::{goal, task};
use crate::error::AppError;
use crate::model::{CompletionStatus, GoalLink, TaskChanges, TaskInput, TaskQuery};

impl App {
    pub async fn add_task(&self, input: TaskInput) -> Result<task::Model, AppError> {
        ensure_non_empty("task description", &input.description)?;
        ensure_minutes("estimated duration", input.estimated_duration)?;
        ensure_minutes("actual duration", input.actual_duration)?;

        let txn = self.db.begin().await?;
        let result: Result<task::Model, AppError> = async {
            require_user_with_conn(&txn, &input.user_id).await?;
            if let Some(goal_id) = input.goal_id {
                require_owned_goal_with_conn(&txn, goal_id, &input.user_id).await?;
            }

            let now = Utc::now();
            let active = task::ActiveModel {
                user_id: Set(input.user_id),
                goal_id: Set(input.goal_id),
                description: Set(input.description),
                deadline: Set(input.deadline),
                priority: Set(input.priority.as_str().to_string()),
                ai_generated: Set(input.ai_generated),
                completion_status: Set(input.completion_status.as_str().to_string()),
                estimated_duration: Set(input.estimated_duration),
                actual_duration: Set(input.actual_duration),
                energy_required: Set(input.energy_required.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let insert = task::Entity::insert(active).exec(&txn).await?;
            let created = task::Entity::find_by_id(insert.last_insert_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("task not found after insert".to_string()))?;
            tracing::info!(task_id = created.id, goal_id = ?created.goal_id, "created task");
            Ok(created)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn get_task(&self, id: i64) -> Result<task::Model, AppError> {
        task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task id {id}")))
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<task::Model>, AppError> {
        let mut select = task::Entity::find();
        if let Some(user_id) = query.user_id.as_deref() {
            select = select.filter(task::Column::UserId.eq(user_id));
        }
        if let Some(goal_id) = query.goal_id {
            select = select.filter(task::Column::GoalId.eq(goal_id));
        }
        if let Some(status) = query.completion_status {
            select = select.filter(task::Column::CompletionStatus.eq(status.as_str()));
        }
        Ok(select
            .order_by_asc(task::Column::Id)
            .offset(query.offset.unwrap_or(0))
            .limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .all(&self.db)
            .await?)
    }

    pub async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<task::Model, AppError> {
        if let Some(description) = changes.description.as_deref() {
            ensure_non_empty("task description", description)?;
        }
        ensure_minutes("estimated duration", changes.estimated_duration)?;
        ensure_minutes("actual duration", changes.actual_duration)?;

        let txn = self.db.begin().await?;
        let result: Result<task::Model, AppError> = async {
            let current = task::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("task id {id}")))?;
            if let Some(GoalLink::Set(goal_id)) = changes.goal {
                require_owned_goal_with_conn(&txn, goal_id, &current.user_id).await?;
            }

            let mut active: task::ActiveModel = current.into();
            match changes.goal {
                Some(GoalLink::Set(goal_id)) => active.goal_id = Set(Some(goal_id)),
                Some(GoalLink::Clear) => active.goal_id = Set(None),
                None => {}
            }
            if let Some(description) = changes.description {
                active.description = Set(description);
            }
            if let Some(deadline) = changes.deadline {
                active.deadline = Set(Some(deadline));
            }
            if let Some(priority) = changes.priority {
                active.priority = Set(priority.as_str().to_string());
            }
            if let Some(ai_generated) = changes.ai_generated {
                active.ai_generated = Set(ai_generated);
            }
            if let Some(status) = changes.completion_status {
                active.completion_status = Set(status.as_str().to_string());
            }
            if let Some(minutes) = changes.estimated_duration {
                active.estimated_duration = Set(Some(minutes));
            }
            if let Some(minutes) = changes.actual_duration {
                active.actual_duration = Set(Some(minutes));
            }
            if let Some(energy) = changes.energy_required {
                active.energy_required = Set(energy.as_str().to_string());
            }
            active.updated_at = Set(Utc::now());
            Ok(active.update(&txn).await?)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn complete_task(&self, id: i64) -> Result<task::Model, AppError> {
        self.update_task(
            id,
            TaskChanges {
                completion_status: Some(CompletionStatus::Completed),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        let result = task::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("task id {id}")));
        }
        tracing::info!(task_id = id, "deleted task");
        Ok(())
    }

    /// Tasks whose deadline falls on the current UTC day.
    pub async fn list_today_tasks(&self, user_id: &str) -> Result<Vec<task::Model>, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        let start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| AppError::InvalidInput("cannot resolve start of day".to_string()))?;
        let end = start + Duration::days(1);
        Ok(task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::Deadline.gte(start))
            .filter(task::Column::Deadline.lt(end))
            .order_by_asc(task::Column::Deadline)
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Pending and in-progress tasks.
    pub async fn list_pending_tasks(&self, user_id: &str) -> Result<Vec<task::Model>, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        Ok(task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::CompletionStatus.is_in([
                CompletionStatus::Pending.as_str(),
                CompletionStatus::InProgress.as_str(),
            ]))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?)
    }
}

async fn require_owned_goal_with_conn<C: ConnectionTrait>(
    db: &C,
    goal_id: i64,
    user_id: &str,
) -> Result<goal::Model, AppError> {
    let goal = goal::Entity::find_by_id(goal_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("goal id {goal_id}")))?;
    ensure_same_owner(&goal, user_id)?;
    Ok(goal)
}

fn ensure_minutes(label: &str, value: Option<i32>) -> Result<(), AppError> {
    match value {
        Some(minutes) if minutes < 0 => Err(AppError::Validation(format!(
            "{label} cannot be negative (got {minutes})"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{create_goal, create_user, setup_app};
    use super::*;
    use crate::model::GoalType;

    #[tokio::test]
    async fn add_task_checks_goal_owner() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        create_user(&app, "u2").await;
        let foreign = create_goal(&app, "u2", None, GoalType::Weekly, 0.0).await;

        let mut input = TaskInput::new("u1", "Sneaky task");
        input.goal_id = Some(foreign.id);
        let err = app.add_task(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref message) if message.contains("belongs to user u2")));

        let mut input = TaskInput::new("u1", "Dangling task");
        input.goal_id = Some(555);
        let err = app.add_task(input).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("goal id 555")));
    }

    #[tokio::test]
    async fn add_task_requires_user() {
        let (_dir, app) = setup_app().await;
        let err = app
            .add_task(TaskInput::new("ghost", "Nobody's task"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_task_rejects_foreign_goal() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        create_user(&app, "u2").await;
        let foreign = create_goal(&app, "u2", None, GoalType::Weekly, 0.0).await;
        let task = app
            .add_task(TaskInput::new("u1", "Mine"))
            .await
            .expect("add task");

        let err = app
            .update_task(
                task.id,
                TaskChanges {
                    goal: Some(GoalLink::Set(foreign.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(app.get_task(task.id).await.expect("task").goal_id, None);
    }

    #[tokio::test]
    async fn update_task_reports_missing_id() {
        let (_dir, app) = setup_app().await;
        let err = app
            .update_task(9999, TaskChanges::default())
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(message) => assert!(message.contains("task id 9999")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_task_drops_it_from_pending() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let first = app
            .add_task(TaskInput::new("u1", "First"))
            .await
            .expect("add task");
        let mut second = TaskInput::new("u1", "Second");
        second.completion_status = CompletionStatus::InProgress;
        app.add_task(second).await.expect("add task");
        let mut third = TaskInput::new("u1", "Third");
        third.completion_status = CompletionStatus::Cancelled;
        app.add_task(third).await.expect("add task");

        assert_eq!(app.list_pending_tasks("u1").await.expect("pending").len(), 2);
        let done = app.complete_task(first.id).await.expect("complete");
        assert_eq!(done.completion_status, "completed");
        assert_eq!(app.list_pending_tasks("u1").await.expect("pending").len(), 1);
    }

    #[tokio::test]
    async fn today_tasks_only_include_current_day() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let noon = Utc::now()
            .date_naive()
            .and_hms_opt(12, 0, 0)
            .expect("noon")
            .and_utc();
        let mut today = TaskInput::new("u1", "Today");
        today.deadline = Some(noon);
        app.add_task(today).await.expect("add task");
        let mut tomorrow = TaskInput::new("u1", "Tomorrow");
        tomorrow.deadline = Some(noon + Duration::days(1));
        app.add_task(tomorrow).await.expect("add task");
        app.add_task(TaskInput::new("u1", "Someday"))
            .await
            .expect("add task");

        let tasks = app.list_today_tasks("u1").await.expect("today");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Today");
    }

    #[tokio::test]
    async fn list_tasks_filters_by_goal_and_status() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let goal = create_goal(&app, "u1", None, GoalType::Weekly, 0.0).await;
        let mut linked = TaskInput::new("u1", "Linked");
        linked.goal_id = Some(goal.id);
        app.add_task(linked).await.expect("add task");
        app.add_task(TaskInput::new("u1", "Loose"))
            .await
            .expect("add task");

        let by_goal = app
            .list_tasks(&TaskQuery {
                goal_id: Some(goal.id),
                ..Default::default()
            })
            .await
            .expect("list tasks");
        assert_eq!(by_goal.len(), 1);

        let completed = app
            .list_tasks(&TaskQuery {
                user_id: Some("u1".to_string()),
                completion_status: Some(CompletionStatus::Completed),
                ..Default::default()
            })
            .await
            .expect("list tasks");
        assert!(completed.is_empty());
    }

    #[tokio::test]
    async fn update_task_can_detach_goal() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let goal = create_goal(&app, "u1", None, GoalType::Weekly, 0.0).await;
        let mut linked = TaskInput::new("u1", "Linked");
        linked.goal_id = Some(goal.id);
        let task = app.add_task(linked).await.expect("add task");

        let updated = app
            .update_task(
                task.id,
                TaskChanges {
                    description: Some("Standalone".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update task");
        assert_eq!(updated.goal_id, Some(goal.id));

        let detached = app
            .update_task(
                task.id,
                TaskChanges {
                    goal: Some(GoalLink::Clear),
                    ..Default::default()
                },
            )
            .await
            .expect("detach task");
        assert_eq!(detached.goal_id, None);
        assert_eq!(detached.description, "Standalone");
    }

    #[tokio::test]
    async fn delete_task_reports_missing_id() {
        let (_dir, app) = setup_app().await;
        assert!(matches!(
            app.delete_task(31337).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn negative_duration_is_rejected() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let mut input = TaskInput::new("u1", "Time travel");
        input.estimated_duration = Some(-10);
        assert!(matches!(
            app.add_task(input).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
