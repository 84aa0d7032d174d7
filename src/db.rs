use std::fs::{self, File, OpenOptions};
use std::path::Path;

use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait, Schema, Statement,
};
use url::Url;

use crate::entities::{ai_context, day_log, goal, job_metrics, progress_log, task, user};
use crate::error::AppError;

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn open_lock(path: &Path) -> Result<fd_lock::RwLock<File>, AppError> {
    let lock_path = path.with_extension("lock");
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    Ok(fd_lock::RwLock::new(file))
}

pub async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::InvalidInput(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    tracing::debug!(url = %sqlite_url, "connecting to database");
    Ok(Database::connect(&sqlite_url).await?)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(builder.build(&stmt)).await?;
    Ok(())
}

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), AppError> {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await?;

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents before children so foreign keys resolve.
    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, goal::Entity).await?;
    create_table(db, &schema, task::Entity).await?;
    create_table(db, &schema, progress_log::Entity).await?;
    create_table(db, &schema, day_log::Entity).await?;
    create_table(db, &schema, ai_context::Entity).await?;
    create_table(db, &schema, job_metrics::Entity).await?;

    let mut goal_parent_index = Index::create()
        .name("idx_goals_parent")
        .table(goal::Entity)
        .col(goal::Column::ParentGoalId)
        .to_owned();
    goal_parent_index.if_not_exists();
    db.execute(builder.build(&goal_parent_index)).await?;

    let mut goal_user_index = Index::create()
        .name("idx_goals_user")
        .table(goal::Entity)
        .col(goal::Column::UserId)
        .to_owned();
    goal_user_index.if_not_exists();
    db.execute(builder.build(&goal_user_index)).await?;

    let mut task_user_index = Index::create()
        .name("idx_tasks_user_status")
        .table(task::Entity)
        .col(task::Column::UserId)
        .col(task::Column::CompletionStatus)
        .to_owned();
    task_user_index.if_not_exists();
    db.execute(builder.build(&task_user_index)).await?;

    let mut task_goal_index = Index::create()
        .name("idx_tasks_goal")
        .table(task::Entity)
        .col(task::Column::GoalId)
        .to_owned();
    task_goal_index.if_not_exists();
    db.execute(builder.build(&task_goal_index)).await?;

    let mut progress_index = Index::create()
        .name("idx_progress_logs_user_date")
        .table(progress_log::Entity)
        .col(progress_log::Column::UserId)
        .col(progress_log::Column::Date)
        .to_owned();
    progress_index.if_not_exists();
    db.execute(builder.build(&progress_index)).await?;

    let mut day_log_index = Index::create()
        .name("idx_day_logs_user_date")
        .table(day_log::Entity)
        .col(day_log::Column::UserId)
        .col(day_log::Column::Date)
        .to_owned();
    day_log_index.if_not_exists();
    db.execute(builder.build(&day_log_index)).await?;

    let mut context_index = Index::create()
        .name("idx_ai_contexts_user")
        .table(ai_context::Entity)
        .col(ai_context::Column::UserId)
        .to_owned();
    context_index.if_not_exists();
    db.execute(builder.build(&context_index)).await?;

    let mut metrics_index = Index::create()
        .name("idx_job_metrics_user")
        .table(job_metrics::Entity)
        .col(job_metrics::Column::UserId)
        .to_owned();
    metrics_index.if_not_exists();
    db.execute(builder.build(&metrics_index)).await?;

    Ok(())
}
