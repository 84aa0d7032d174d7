use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use super::{ensure_non_empty, finalize_transaction, require_user_with_conn, App};
use crate::entities::{goal, task};
use crate::error::AppError;
use crate::model::{GoalChanges, GoalInput, GoalLink, GoalQuery};
use crate::progress::{aggregate_completion, ensure_percentage, GoalTree};

/// Compact view of a neighbouring goal inside a [`GoalHierarchy`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalSummary {
    pub id: i64,
    pub goal_type: String,
    pub description: String,
    pub status: String,
    pub completion_percentage: f64,
}

impl From<&goal::Model> for GoalSummary {
    fn from(goal: &goal::Model) -> Self {
        Self {
            id: goal.id,
            goal_type: goal.goal_type.clone(),
            description: goal.description.clone(),
            status: goal.status.clone(),
            completion_percentage: goal.completion_percentage,
        }
    }
}

/// A goal with its immediate parent and direct children. Grandchildren are
/// not loaded; walk further with [`App::get_child_goals`].
#[derive(Debug, Serialize)]
pub struct GoalHierarchy {
    #[serde(flatten)]
    pub goal: goal::Model,
    pub parent: Option<GoalSummary>,
    pub children: Vec<GoalSummary>,
}

impl App {
    pub async fn add_goal(&self, input: GoalInput) -> Result<goal::Model, AppError> {
        ensure_non_empty("goal description", &input.description)?;
        ensure_percentage("completion percentage", input.completion_percentage)?;

        let txn = self.db.begin().await?;
        let result: Result<goal::Model, AppError> = async {
            require_user_with_conn(&txn, &input.user_id).await?;
            if let Some(parent_id) = input.parent_goal_id {
                let parent = goal::Entity::find_by_id(parent_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("parent goal id {parent_id}")))?;
                ensure_same_owner(&parent, &input.user_id)?;
            }

            let now = Utc::now();
            let active = goal::ActiveModel {
                user_id: Set(input.user_id),
                parent_goal_id: Set(input.parent_goal_id),
                goal_type: Set(input.goal_type.as_str().to_string()),
                description: Set(input.description),
                deadline: Set(input.deadline),
                status: Set(input.status.as_str().to_string()),
                phase: Set(input.phase.as_str().to_string()),
                priority: Set(input.priority.as_str().to_string()),
                completion_percentage: Set(input.completion_percentage),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let insert = goal::Entity::insert(active).exec(&txn).await?;
            let created = goal::Entity::find_by_id(insert.last_insert_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("goal not found after insert".to_string()))?;
            tracing::info!(
                goal_id = created.id,
                parent_goal_id = ?created.parent_goal_id,
                "created goal"
            );
            Ok(created)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn get_goal(&self, id: i64) -> Result<goal::Model, AppError> {
        require_goal_with_conn(&self.db, id).await
    }

    pub async fn list_goals(&self, query: &GoalQuery) -> Result<Vec<goal::Model>, AppError> {
        let mut select = goal::Entity::find();
        if let Some(user_id) = query.user_id.as_deref() {
            select = select.filter(goal::Column::UserId.eq(user_id));
        }
        if let Some(parent_id) = query.parent_goal_id {
            select = select.filter(goal::Column::ParentGoalId.eq(parent_id));
        }
        if query.roots_only {
            select = select.filter(goal::Column::ParentGoalId.is_null());
        }
        if let Some(goal_type) = query.goal_type {
            select = select.filter(goal::Column::GoalType.eq(goal_type.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(goal::Column::Status.eq(status.as_str()));
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }
        if let Some(offset) = query.offset {
            select = select.offset(offset);
        }
        Ok(select.order_by_asc(goal::Column::Id).all(&self.db).await?)
    }

    /// Direct field update. A manual `completion_percentage` on a goal with
    /// children is accepted and stays until the next explicit aggregation.
    pub async fn update_goal(&self, id: i64, changes: GoalChanges) -> Result<goal::Model, AppError> {
        if let Some(description) = changes.description.as_deref() {
            ensure_non_empty("goal description", description)?;
        }
        if let Some(value) = changes.completion_percentage {
            ensure_percentage("completion percentage", value)?;
        }

        let txn = self.db.begin().await?;
        let result: Result<goal::Model, AppError> = async {
            let current = require_goal_with_conn(&txn, id).await?;
            if let Some(GoalLink::Set(parent_id)) = changes.parent {
                let parent = goal::Entity::find_by_id(parent_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("parent goal id {parent_id}")))?;
                ensure_same_owner(&parent, &current.user_id)?;
                let tree = load_tree_with_conn(&txn, &current.user_id).await?;
                if tree.would_create_cycle(id, parent_id) {
                    return Err(AppError::Validation(format!(
                        "goal id {parent_id} cannot become the parent of goal id {id}; \
                         it would make the goal its own ancestor"
                    )));
                }
            }

            let mut active = goal::ActiveModel {
                id: Set(id),
                ..Default::default()
            };
            if let Some(description) = changes.description {
                active.description = Set(description);
            }
            if let Some(goal_type) = changes.goal_type {
                active.goal_type = Set(goal_type.as_str().to_string());
            }
            if let Some(status) = changes.status {
                active.status = Set(status.as_str().to_string());
            }
            if let Some(phase) = changes.phase {
                active.phase = Set(phase.as_str().to_string());
            }
            if let Some(priority) = changes.priority {
                active.priority = Set(priority.as_str().to_string());
            }
            if let Some(deadline) = changes.deadline {
                active.deadline = Set(Some(deadline));
            }
            if let Some(value) = changes.completion_percentage {
                active.completion_percentage = Set(value);
            }
            match changes.parent {
                Some(GoalLink::Set(parent_id)) => active.parent_goal_id = Set(Some(parent_id)),
                Some(GoalLink::Clear) => active.parent_goal_id = Set(None),
                None => {}
            }
            active.updated_at = Set(Utc::now());

            match active.update(&txn).await {
                Ok(model) => Ok(model),
                Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                    Err(AppError::NotFound(format!("goal id {id}")))
                }
                Err(err) => Err(err.into()),
            }
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Deletes a goal without children. Tasks that pointed at it are kept
    /// and detached.
    pub async fn delete_goal(&self, id: i64) -> Result<u64, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<u64, AppError> = async {
            require_goal_with_conn(&txn, id).await?;
            let children = goal::Entity::find()
                .filter(goal::Column::ParentGoalId.eq(id))
                .count(&txn)
                .await?;
            if children > 0 {
                return Err(AppError::InvalidInput(format!(
                    "goal id {id} still has {children} child goal(s); remove or re-parent them first"
                )));
            }
            let detached = task::Entity::update_many()
                .col_expr(task::Column::GoalId, Expr::value(Option::<i64>::None))
                .col_expr(task::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(task::Column::GoalId.eq(id))
                .exec(&txn)
                .await?;
            goal::Entity::delete_by_id(id).exec(&txn).await?;
            tracing::info!(goal_id = id, detached_tasks = detached.rows_affected, "deleted goal");
            Ok(detached.rows_affected)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Goals whose parent is `parent_id`. An unknown parent simply has no
    /// children.
    pub async fn get_child_goals(&self, parent_id: i64) -> Result<Vec<goal::Model>, AppError> {
        child_goals_with_conn(&self.db, parent_id).await
    }

    pub async fn get_parent_goal(&self, goal_id: i64) -> Result<Option<goal::Model>, AppError> {
        let goal = self.get_goal(goal_id).await?;
        parent_of_with_conn(&self.db, &goal).await
    }

    pub async fn get_goal_hierarchy(&self, goal_id: i64) -> Result<GoalHierarchy, AppError> {
        let goal = self.get_goal(goal_id).await?;
        let parent = parent_of_with_conn(&self.db, &goal).await?;
        let children = self.get_child_goals(goal_id).await?;
        Ok(GoalHierarchy {
            goal,
            parent: parent.as_ref().map(GoalSummary::from),
            children: children.iter().map(GoalSummary::from).collect(),
        })
    }

    /// One level only: grandchildren count through whatever their parent
    /// currently stores.
    pub async fn calculate_goal_progress(&self, goal_id: i64) -> Result<f64, AppError> {
        calculate_progress_with_conn(&self.db, goal_id).await
    }

    /// Stores the aggregated value on `goal_id` and commits. Ancestors are
    /// left alone; callers walk upward themselves, one call per level,
    /// deepest first.
    pub async fn update_goal_hierarchy_progress(
        &self,
        goal_id: i64,
    ) -> Result<goal::Model, AppError> {
        let progress = calculate_progress_with_conn(&self.db, goal_id).await?;
        let mut active = goal::ActiveModel {
            id: Set(goal_id),
            ..Default::default()
        };
        active.completion_percentage = Set(progress);
        active.updated_at = Set(Utc::now());
        let model = match active.update(&self.db).await {
            Ok(model) => model,
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                return Err(AppError::NotFound(format!("goal id {goal_id}")))
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(goal_id, completion = progress, "updated goal progress");
        Ok(model)
    }

    /// The goal and everything below it, pre-order, with depth.
    pub async fn goal_subtree(&self, goal_id: i64) -> Result<Vec<(usize, goal::Model)>, AppError> {
        let root = self.get_goal(goal_id).await?;
        let tree = load_tree_with_conn(&self.db, &root.user_id).await?;
        let walk = tree.subtree(goal_id)?;
        Ok(walk
            .into_iter()
            .map(|(depth, goal)| (depth, goal.clone()))
            .collect())
    }

    /// Parent chain, nearest first, ending at the root.
    pub async fn goal_ancestors(&self, goal_id: i64) -> Result<Vec<goal::Model>, AppError> {
        let goal = self.get_goal(goal_id).await?;
        let tree = load_tree_with_conn(&self.db, &goal.user_id).await?;
        let chain = tree.ancestors(goal_id)?;
        Ok(chain.into_iter().cloned().collect())
    }
}

async fn require_goal_with_conn<C: ConnectionTrait>(db: &C, id: i64) -> Result<goal::Model, AppError> {
    goal::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("goal id {id}")))
}

async fn child_goals_with_conn<C: ConnectionTrait>(
    db: &C,
    parent_id: i64,
) -> Result<Vec<goal::Model>, AppError> {
    Ok(goal::Entity::find()
        .filter(goal::Column::ParentGoalId.eq(parent_id))
        .order_by_asc(goal::Column::Id)
        .all(db)
        .await?)
}

async fn calculate_progress_with_conn<C: ConnectionTrait>(
    db: &C,
    goal_id: i64,
) -> Result<f64, AppError> {
    let goal = require_goal_with_conn(db, goal_id).await?;
    let children = child_goals_with_conn(db, goal_id).await?;
    let values: Vec<f64> = children
        .iter()
        .map(|child| child.completion_percentage)
        .collect();
    tracing::debug!(goal_id, children = values.len(), "aggregating goal progress");
    Ok(aggregate_completion(goal.completion_percentage, &values))
}

async fn parent_of_with_conn<C: ConnectionTrait>(
    conn: &C,
    goal: &goal::Model,
) -> Result<Option<goal::Model>, AppError> {
    let Some(parent_id) = goal.parent_goal_id else {
        return Ok(None);
    };
    let parent = goal::Entity::find_by_id(parent_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("parent goal id {parent_id}")))?;
    Ok(Some(parent))
}

pub(super) async fn load_tree_with_conn<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<GoalTree, AppError> {
    let goals = goal::Entity::find()
        .filter(goal::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(GoalTree::new(goals))
}

pub(super) fn ensure_same_owner(goal: &goal::Model, user_id: &str) -> Result<(), AppError> {
    if goal.user_id != user_id {
        return Err(AppError::Validation(format!(
            "goal id {} belongs to user {}, not {user_id}",
            goal.id, goal.user_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{create_goal, create_user, setup_app};
    use super::*;
    use crate::model::{GoalType, TaskInput};

    const EPSILON: f64 = 1e-9;

    #[tokio::test]
    async fn leaf_progress_is_stored_value() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        for value in [0.0, 33.3, 100.0] {
            let leaf = create_goal(&app, "u1", None, GoalType::Weekly, value).await;
            let progress = app.calculate_goal_progress(leaf.id).await.expect("progress");
            assert_eq!(progress, value);
        }
    }

    #[tokio::test]
    async fn parent_progress_is_mean_of_children() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let parent = create_goal(&app, "u1", None, GoalType::Quarterly, 0.0).await;
        for value in [50.0, 75.0, 20.0] {
            create_goal(&app, "u1", Some(parent.id), GoalType::Monthly, value).await;
        }
        let progress = app
            .calculate_goal_progress(parent.id)
            .await
            .expect("progress");
        assert!((progress - 145.0 / 3.0).abs() < EPSILON);

        let stored = app.get_goal(parent.id).await.expect("get goal");
        assert_eq!(stored.completion_percentage, 0.0);
    }

    #[tokio::test]
    async fn update_progress_persists_mean() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let parent = create_goal(&app, "u1", None, GoalType::Quarterly, 0.0).await;
        create_goal(&app, "u1", Some(parent.id), GoalType::Monthly, 50.0).await;
        create_goal(&app, "u1", Some(parent.id), GoalType::Monthly, 75.0).await;

        let updated = app
            .update_goal_hierarchy_progress(parent.id)
            .await
            .expect("update progress");
        assert!((updated.completion_percentage - 62.5).abs() < EPSILON);
        let reread = app.get_goal(parent.id).await.expect("get goal");
        assert!((reread.completion_percentage - 62.5).abs() < EPSILON);
    }

    #[tokio::test]
    async fn stalled_child_suppresses_parent() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let parent = create_goal(&app, "u1", None, GoalType::Monthly, 0.0).await;
        for value in [100.0, 100.0, 100.0, 100.0, 0.0] {
            create_goal(&app, "u1", Some(parent.id), GoalType::Weekly, value).await;
        }
        let progress = app
            .calculate_goal_progress(parent.id)
            .await
            .expect("progress");
        assert!((progress - 80.0).abs() < EPSILON);
    }

    #[tokio::test]
    async fn parent_lookup_for_root_and_child() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let root = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let child = create_goal(&app, "u1", Some(root.id), GoalType::Quarterly, 0.0).await;

        assert!(app.get_parent_goal(root.id).await.expect("parent").is_none());
        let parent = app
            .get_parent_goal(child.id)
            .await
            .expect("parent")
            .expect("child has parent");
        assert_eq!(parent.id, root.id);
    }

    #[tokio::test]
    async fn child_lookup_returns_exact_set() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let root = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        assert!(app.get_child_goals(root.id).await.expect("children").is_empty());

        let mut expected = Vec::new();
        for _ in 0..3 {
            let child = create_goal(&app, "u1", Some(root.id), GoalType::Quarterly, 0.0).await;
            expected.push(child.id);
        }
        // Grandchild must not show up.
        create_goal(&app, "u1", Some(expected[0]), GoalType::Monthly, 0.0).await;

        let children = app.get_child_goals(root.id).await.expect("children");
        let mut ids: Vec<i64> = children.iter().map(|goal| goal.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, expected);
        assert!(children
            .iter()
            .all(|goal| goal.parent_goal_id == Some(root.id)));
    }

    #[tokio::test]
    async fn child_lookup_on_unknown_parent_is_empty() {
        let (_dir, app) = setup_app().await;
        assert!(app.get_child_goals(4040).await.expect("children").is_empty());
    }

    #[tokio::test]
    async fn hierarchy_expands_one_level() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let root = create_goal(&app, "u1", None, GoalType::Quarterly, 0.0).await;
        let first = create_goal(&app, "u1", Some(root.id), GoalType::Monthly, 50.0).await;
        create_goal(&app, "u1", Some(root.id), GoalType::Monthly, 75.0).await;
        create_goal(&app, "u1", Some(first.id), GoalType::Weekly, 10.0).await;

        let top = app.get_goal_hierarchy(root.id).await.expect("hierarchy");
        assert_eq!(top.goal.id, root.id);
        assert!(top.parent.is_none());
        assert_eq!(top.children.len(), 2);

        let middle = app.get_goal_hierarchy(first.id).await.expect("hierarchy");
        assert_eq!(middle.parent.map(|parent| parent.id), Some(root.id));
        assert_eq!(middle.children.len(), 1);
    }

    #[tokio::test]
    async fn multi_level_updates_do_not_cascade() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let year = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let quarter = create_goal(&app, "u1", Some(year.id), GoalType::Quarterly, 0.0).await;
        let month = create_goal(&app, "u1", Some(quarter.id), GoalType::Monthly, 0.0).await;
        create_goal(&app, "u1", Some(quarter.id), GoalType::Monthly, 25.0).await;
        create_goal(&app, "u1", Some(month.id), GoalType::Weekly, 100.0).await;
        create_goal(&app, "u1", Some(month.id), GoalType::Weekly, 50.0).await;

        let month_after = app
            .update_goal_hierarchy_progress(month.id)
            .await
            .expect("update month");
        assert!((month_after.completion_percentage - 75.0).abs() < EPSILON);
        let quarter_before = app.get_goal(quarter.id).await.expect("quarter");
        assert_eq!(quarter_before.completion_percentage, 0.0);

        let quarter_after = app
            .update_goal_hierarchy_progress(quarter.id)
            .await
            .expect("update quarter");
        assert!((quarter_after.completion_percentage - 50.0).abs() < EPSILON);

        let year_now = app.get_goal(year.id).await.expect("year");
        assert_eq!(year_now.completion_percentage, 0.0);

        let year_after = app
            .update_goal_hierarchy_progress(year.id)
            .await
            .expect("update year");
        assert!((year_after.completion_percentage - 50.0).abs() < EPSILON);
    }

    #[tokio::test]
    async fn missing_goal_is_not_found() {
        let (_dir, app) = setup_app().await;
        for err in [
            app.get_parent_goal(9999).await.unwrap_err(),
            app.calculate_goal_progress(9999).await.unwrap_err(),
            app.update_goal_hierarchy_progress(9999).await.unwrap_err(),
            app.get_goal_hierarchy(9999).await.unwrap_err(),
        ] {
            match err {
                AppError::NotFound(message) => assert!(message.contains("goal id 9999")),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn add_goal_rejects_out_of_range_percentage() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let mut input = GoalInput::new("u1", GoalType::Weekly, "Too much");
        input.completion_percentage = 120.0;
        let err = app.add_goal(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(app
            .list_goals(&GoalQuery::default())
            .await
            .expect("list goals")
            .is_empty());
    }

    #[tokio::test]
    async fn add_goal_requires_existing_user_and_parent() {
        let (_dir, app) = setup_app().await;
        let err = app
            .add_goal(GoalInput::new("ghost", GoalType::Yearly, "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("user id ghost")));

        create_user(&app, "u1").await;
        let mut input = GoalInput::new("u1", GoalType::Monthly, "Lost child");
        input.parent_goal_id = Some(77);
        let err = app.add_goal(input).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("parent goal id 77")));
    }

    #[tokio::test]
    async fn cross_user_parent_is_rejected() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        create_user(&app, "u2").await;
        let foreign = create_goal(&app, "u2", None, GoalType::Yearly, 0.0).await;
        let mut input = GoalInput::new("u1", GoalType::Quarterly, "Borrowed parent");
        input.parent_goal_id = Some(foreign.id);
        let err = app.add_goal(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let own = create_goal(&app, "u1", None, GoalType::Quarterly, 0.0).await;
        let err = app
            .update_goal(
                own.id,
                GoalChanges {
                    parent: Some(GoalLink::Set(foreign.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn reparenting_under_descendant_is_rejected() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let year = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let quarter = create_goal(&app, "u1", Some(year.id), GoalType::Quarterly, 0.0).await;
        let month = create_goal(&app, "u1", Some(quarter.id), GoalType::Monthly, 0.0).await;

        for target in [year.id, month.id] {
            let err = app
                .update_goal(
                    year.id,
                    GoalChanges {
                        parent: Some(GoalLink::Set(target)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(ref message) if message.contains("own ancestor")));
        }
        let year_after = app.get_goal(year.id).await.expect("year");
        assert_eq!(year_after.parent_goal_id, None);
    }

    #[tokio::test]
    async fn reparent_and_clear_parent() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let first = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let second = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let child = create_goal(&app, "u1", Some(first.id), GoalType::Quarterly, 0.0).await;

        let moved = app
            .update_goal(
                child.id,
                GoalChanges {
                    parent: Some(GoalLink::Set(second.id)),
                    ..Default::default()
                },
            )
            .await
            .expect("reparent");
        assert_eq!(moved.parent_goal_id, Some(second.id));

        let root = app
            .update_goal(
                child.id,
                GoalChanges {
                    parent: Some(GoalLink::Clear),
                    ..Default::default()
                },
            )
            .await
            .expect("clear parent");
        assert_eq!(root.parent_goal_id, None);
    }

    #[tokio::test]
    async fn update_goal_rejects_out_of_range_percentage() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let goal = create_goal(&app, "u1", None, GoalType::Weekly, 40.0).await;
        let err = app
            .update_goal(
                goal.id,
                GoalChanges {
                    completion_percentage: Some(-5.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let after = app.get_goal(goal.id).await.expect("goal");
        assert_eq!(after.completion_percentage, 40.0);
    }

    #[tokio::test]
    async fn update_goal_reports_missing_id() {
        let (_dir, app) = setup_app().await;
        let err = app
            .update_goal(9999, GoalChanges::default())
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(message) => assert!(message.contains("goal id 9999")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_goal_with_children_is_rejected() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let root = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        create_goal(&app, "u1", Some(root.id), GoalType::Quarterly, 0.0).await;
        let err = app.delete_goal(root.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref message) if message.contains("child goal")));
        assert!(app.get_goal(root.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_leaf_goal_detaches_tasks() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let leaf = create_goal(&app, "u1", None, GoalType::Weekly, 0.0).await;
        let mut input = TaskInput::new("u1", "Draft outline");
        input.goal_id = Some(leaf.id);
        let task = app.add_task(input).await.expect("add task");

        let detached = app.delete_goal(leaf.id).await.expect("delete goal");
        assert_eq!(detached, 1);
        let task_after = app.get_task(task.id).await.expect("task survives");
        assert_eq!(task_after.goal_id, None);
        assert!(matches!(
            app.get_goal(leaf.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn subtree_and_ancestors_walk_the_tree() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let year = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        let quarter = create_goal(&app, "u1", Some(year.id), GoalType::Quarterly, 0.0).await;
        let month = create_goal(&app, "u1", Some(quarter.id), GoalType::Monthly, 0.0).await;
        let week = create_goal(&app, "u1", Some(month.id), GoalType::Weekly, 0.0).await;

        let walk: Vec<(usize, i64)> = app
            .goal_subtree(year.id)
            .await
            .expect("subtree")
            .into_iter()
            .map(|(depth, goal)| (depth, goal.id))
            .collect();
        assert_eq!(
            walk,
            vec![(0, year.id), (1, quarter.id), (2, month.id), (3, week.id)]
        );

        let chain: Vec<i64> = app
            .goal_ancestors(week.id)
            .await
            .expect("ancestors")
            .iter()
            .map(|goal| goal.id)
            .collect();
        assert_eq!(chain, vec![month.id, quarter.id, year.id]);
    }

    #[tokio::test]
    async fn list_goals_filters_roots_and_parent() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let root = create_goal(&app, "u1", None, GoalType::Yearly, 0.0).await;
        create_goal(&app, "u1", Some(root.id), GoalType::Quarterly, 0.0).await;
        create_goal(&app, "u1", Some(root.id), GoalType::Quarterly, 0.0).await;

        let roots = app
            .list_goals(&GoalQuery {
                roots_only: true,
                ..Default::default()
            })
            .await
            .expect("roots");
        assert_eq!(roots.len(), 1);

        let quarters = app
            .list_goals(&GoalQuery {
                parent_goal_id: Some(root.id),
                goal_type: Some(GoalType::Quarterly),
                ..Default::default()
            })
            .await
            .expect("children");
        assert_eq!(quarters.len(), 2);
    }
}
