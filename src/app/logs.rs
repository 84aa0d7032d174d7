use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use super::{ensure_non_empty, ensure_score, require_user_with_conn, App};
use crate::entities::{day_log, progress_log};
use crate::error::AppError;
use crate::model::{DayLogChanges, DayLogInput, DayLogQuery, ProgressLogChanges, ProgressLogInput};

const DAY_LOG_DEFAULT_LIMIT: u64 = 10;
const DAY_LOG_MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct DayLogStats {
    pub total_logs: usize,
    /// Hours, averaged over logs that have an end time.
    pub average_duration: f64,
    pub locations_summary: BTreeMap<String, usize>,
    pub weather_summary: BTreeMap<String, usize>,
}

impl DayLogStats {
    pub fn from_logs(logs: &[day_log::Model]) -> Self {
        let mut stats = DayLogStats {
            total_logs: logs.len(),
            ..Default::default()
        };
        let mut total_hours = 0.0;
        let mut closed = 0usize;
        for log in logs {
            if let Some(end) = log.end_time {
                total_hours += (end - log.start_time).num_seconds() as f64 / 3600.0;
                closed += 1;
            }
            if let Some(location) = log.location.as_deref().filter(|value| !value.is_empty()) {
                *stats.locations_summary.entry(location.to_string()).or_default() += 1;
            }
            if let Some(weather) = log.weather.as_deref().filter(|value| !value.is_empty()) {
                *stats.weather_summary.entry(weather.to_string()).or_default() += 1;
            }
        }
        if closed > 0 {
            stats.average_duration = total_hours / closed as f64;
        }
        stats
    }
}

impl App {
    pub async fn add_progress_log(
        &self,
        input: ProgressLogInput,
    ) -> Result<progress_log::Model, AppError> {
        ensure_counts(Some(input.tasks_completed), Some(input.tasks_planned))?;
        ensure_score("mood score", input.mood_score)?;
        ensure_score("energy level", input.energy_level)?;
        ensure_score("focus score", input.focus_score)?;
        require_user_with_conn(&self.db, &input.user_id).await?;

        let active = progress_log::ActiveModel {
            user_id: Set(input.user_id),
            date: Set(input.date),
            tasks_completed: Set(input.tasks_completed),
            tasks_planned: Set(input.tasks_planned),
            mood_score: Set(input.mood_score),
            energy_level: Set(input.energy_level),
            focus_score: Set(input.focus_score),
            daily_reflection: Set(input.daily_reflection),
            ai_insights: Set(input.ai_insights),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let insert = progress_log::Entity::insert(active).exec(&self.db).await?;
        tracing::info!(log_id = insert.last_insert_id, "created progress log");
        self.get_progress_log(insert.last_insert_id).await
    }

    pub async fn get_progress_log(&self, id: i64) -> Result<progress_log::Model, AppError> {
        progress_log::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("progress log id {id}")))
    }

    pub async fn list_progress_logs(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<progress_log::Model>, AppError> {
        if let (Some(from), Some(to)) = (from, to) {
            ensure_date_order(from, to)?;
        }
        require_user_with_conn(&self.db, user_id).await?;
        let mut select = progress_log::Entity::find().filter(progress_log::Column::UserId.eq(user_id));
        if let Some(from) = from {
            select = select.filter(progress_log::Column::Date.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(progress_log::Column::Date.lte(to));
        }
        Ok(select
            .order_by_asc(progress_log::Column::Date)
            .order_by_asc(progress_log::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn update_progress_log(
        &self,
        id: i64,
        changes: ProgressLogChanges,
    ) -> Result<progress_log::Model, AppError> {
        ensure_counts(changes.tasks_completed, changes.tasks_planned)?;
        for (label, value) in [
            ("mood score", changes.mood_score),
            ("energy level", changes.energy_level),
            ("focus score", changes.focus_score),
        ] {
            if let Some(value) = value {
                ensure_score(label, value)?;
            }
        }

        let current = self.get_progress_log(id).await?;
        let mut active: progress_log::ActiveModel = current.clone().into();
        if let Some(value) = changes.tasks_completed {
            active.tasks_completed = Set(value);
        }
        if let Some(value) = changes.tasks_planned {
            active.tasks_planned = Set(value);
        }
        if let Some(value) = changes.mood_score {
            active.mood_score = Set(value);
        }
        if let Some(value) = changes.energy_level {
            active.energy_level = Set(value);
        }
        if let Some(value) = changes.focus_score {
            active.focus_score = Set(value);
        }
        if let Some(text) = changes.daily_reflection {
            active.daily_reflection = Set(Some(text));
        }
        if let Some(text) = changes.ai_insights {
            active.ai_insights = Set(Some(text));
        }
        if !active.is_changed() {
            return Ok(current);
        }
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_progress_log(&self, id: i64) -> Result<(), AppError> {
        let result = progress_log::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("progress log id {id}")));
        }
        Ok(())
    }

    pub async fn add_day_log(&self, input: DayLogInput) -> Result<day_log::Model, AppError> {
        ensure_time_order(input.start_time, input.end_time)?;
        if let Some(summary) = input.summary.as_deref() {
            ensure_non_empty("day log summary", summary)?;
        }
        require_user_with_conn(&self.db, &input.user_id).await?;

        let now = Utc::now();
        let active = day_log::ActiveModel {
            user_id: Set(input.user_id),
            date: Set(input.date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            summary: Set(input.summary),
            location: Set(input.location),
            weather: Set(input.weather),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let insert = day_log::Entity::insert(active).exec(&self.db).await?;
        tracing::info!(log_id = insert.last_insert_id, "created day log");
        self.get_day_log(insert.last_insert_id).await
    }

    pub async fn get_day_log(&self, id: i64) -> Result<day_log::Model, AppError> {
        day_log::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("day log id {id}")))
    }

    pub async fn list_day_logs(
        &self,
        user_id: &str,
        query: &DayLogQuery,
    ) -> Result<Vec<day_log::Model>, AppError> {
        let limit = query.limit.unwrap_or(DAY_LOG_DEFAULT_LIMIT);
        if !(1..=DAY_LOG_MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {DAY_LOG_MAX_LIMIT} (got {limit})"
            )));
        }
        require_user_with_conn(&self.db, user_id).await?;
        let mut select = day_log::Entity::find().filter(day_log::Column::UserId.eq(user_id));
        if let Some(location) = query.location.as_deref() {
            select = select.filter(day_log::Column::Location.eq(location));
        }
        if let Some(weather) = query.weather.as_deref() {
            select = select.filter(day_log::Column::Weather.eq(weather));
        }
        Ok(select
            .order_by_asc(day_log::Column::Date)
            .order_by_asc(day_log::Column::Id)
            .offset(query.offset.unwrap_or(0))
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    pub async fn day_log_on(&self, user_id: &str, date: NaiveDate) -> Result<day_log::Model, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        day_log::Entity::find()
            .filter(day_log::Column::UserId.eq(user_id))
            .filter(day_log::Column::Date.eq(date))
            .order_by_asc(day_log::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("day log for user {user_id} on {date}")))
    }

    pub async fn day_logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        location: Option<&str>,
    ) -> Result<Vec<day_log::Model>, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        ensure_date_order(start, end)?;
        let mut select = day_log::Entity::find()
            .filter(day_log::Column::UserId.eq(user_id))
            .filter(day_log::Column::Date.gte(start))
            .filter(day_log::Column::Date.lte(end));
        if let Some(location) = location {
            select = select.filter(day_log::Column::Location.eq(location));
        }
        Ok(select
            .order_by_asc(day_log::Column::Date)
            .order_by_asc(day_log::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn day_log_stats(&self, user_id: &str) -> Result<DayLogStats, AppError> {
        require_user_with_conn(&self.db, user_id).await?;
        let logs = day_log::Entity::find()
            .filter(day_log::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        Ok(DayLogStats::from_logs(&logs))
    }

    pub async fn update_day_log(
        &self,
        id: i64,
        changes: DayLogChanges,
    ) -> Result<day_log::Model, AppError> {
        let current = self.get_day_log(id).await?;
        let start = changes.start_time.unwrap_or(current.start_time);
        let end = changes.end_time.or(current.end_time);
        ensure_time_order(start, end)?;

        let mut active: day_log::ActiveModel = current.into();
        if let Some(date) = changes.date {
            active.date = Set(date);
        }
        if let Some(start_time) = changes.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(end_time) = changes.end_time {
            active.end_time = Set(Some(end_time));
        }
        if let Some(summary) = changes.summary {
            active.summary = Set(Some(summary));
        }
        if let Some(location) = changes.location {
            active.location = Set(Some(location));
        }
        if let Some(weather) = changes.weather {
            active.weather = Set(Some(weather));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_day_log(&self, id: i64) -> Result<(), AppError> {
        let result = day_log::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("day log id {id}")));
        }
        Ok(())
    }
}

fn ensure_time_order(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::Validation(
            "end time must be after start time".to_string(),
        )),
        _ => Ok(()),
    }
}

fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation(
            "end date must be after start date".to_string(),
        ));
    }
    Ok(())
}

fn ensure_counts(completed: Option<i32>, planned: Option<i32>) -> Result<(), AppError> {
    for (label, value) in [("tasks completed", completed), ("tasks planned", planned)] {
        if let Some(value) = value.filter(|value| *value < 0) {
            return Err(AppError::Validation(format!(
                "{label} cannot be negative (got {value})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{create_user, setup_app};
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn day_input(user_id: &str, day: u32, end: Option<u32>, location: Option<&str>) -> DayLogInput {
        DayLogInput {
            user_id: user_id.to_string(),
            date: date(day),
            start_time: at(8),
            end_time: end.map(at),
            summary: Some("Worked on the MVP".to_string()),
            location: location.map(str::to_string),
            weather: Some("sunny".to_string()),
        }
    }

    fn progress_input(user_id: &str, day: u32) -> ProgressLogInput {
        ProgressLogInput {
            user_id: user_id.to_string(),
            date: date(day),
            tasks_completed: 3,
            tasks_planned: 5,
            mood_score: 8,
            energy_level: 7,
            focus_score: 9,
            daily_reflection: Some("Good productive day".to_string()),
            ai_insights: None,
        }
    }

    #[tokio::test]
    async fn progress_log_scores_must_be_in_range() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let mut input = progress_input("u1", 1);
        input.mood_score = 11;
        assert!(matches!(
            app.add_progress_log(input).await.unwrap_err(),
            AppError::Validation(ref message) if message.contains("mood score")
        ));

        let created = app
            .add_progress_log(progress_input("u1", 1))
            .await
            .expect("add log");
        let err = app
            .update_progress_log(
                created.id,
                ProgressLogChanges {
                    focus_score: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn progress_logs_filter_by_date_range() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        for day in [1, 5, 9] {
            app.add_progress_log(progress_input("u1", day))
                .await
                .expect("add log");
        }
        let logs = app
            .list_progress_logs("u1", Some(date(2)), Some(date(9)))
            .await
            .expect("list logs");
        let days: Vec<NaiveDate> = logs.iter().map(|log| log.date).collect();
        assert_eq!(days, vec![date(5), date(9)]);

        let err = app
            .list_progress_logs("u1", Some(date(9)), Some(date(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_progress_log_reports_missing_id() {
        let (_dir, app) = setup_app().await;
        let err = app
            .update_progress_log(
                404,
                ProgressLogChanges {
                    mood_score: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("progress log id 404")));
    }

    #[tokio::test]
    async fn day_log_end_before_start_is_rejected() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        let mut input = day_input("u1", 1, Some(7), None);
        input.start_time = at(9);
        assert!(matches!(
            app.add_day_log(input).await.unwrap_err(),
            AppError::Validation(ref message) if message.contains("end time")
        ));

        let created = app
            .add_day_log(day_input("u1", 1, None, None))
            .await
            .expect("add day log");
        let err = app
            .update_day_log(
                created.id,
                DayLogChanges {
                    end_time: Some(at(6)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn day_log_requires_user() {
        let (_dir, app) = setup_app().await;
        let err = app
            .add_day_log(day_input("ghost", 1, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("user id ghost")));
    }

    #[tokio::test]
    async fn day_log_lookup_by_date_and_range() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        app.add_day_log(day_input("u1", 1, Some(17), Some("office")))
            .await
            .expect("add day log");
        app.add_day_log(day_input("u1", 3, None, Some("home")))
            .await
            .expect("add day log");

        let found = app.day_log_on("u1", date(3)).await.expect("by date");
        assert_eq!(found.location.as_deref(), Some("home"));
        assert!(matches!(
            app.day_log_on("u1", date(2)).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        let office = app
            .day_logs_in_range("u1", date(1), date(3), Some("office"))
            .await
            .expect("range");
        assert_eq!(office.len(), 1);
        assert!(matches!(
            app.day_logs_in_range("u1", date(3), date(1), None)
                .await
                .unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn day_log_listing_pages_and_bounds_limit() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        for day in 1..=4 {
            app.add_day_log(day_input("u1", day, None, None))
                .await
                .expect("add day log");
        }
        let page = app
            .list_day_logs(
                "u1",
                &DayLogQuery {
                    limit: Some(2),
                    offset: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("list");
        let days: Vec<NaiveDate> = page.iter().map(|log| log.date).collect();
        assert_eq!(days, vec![date(2), date(3)]);

        let err = app
            .list_day_logs(
                "u1",
                &DayLogQuery {
                    limit: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn stats_average_only_closed_logs() {
        let (_dir, app) = setup_app().await;
        create_user(&app, "u1").await;
        app.add_day_log(day_input("u1", 1, Some(12), Some("office")))
            .await
            .expect("add day log");
        app.add_day_log(day_input("u1", 2, Some(16), Some("office")))
            .await
            .expect("add day log");
        app.add_day_log(day_input("u1", 3, None, Some("home")))
            .await
            .expect("add day log");

        let stats = app.day_log_stats("u1").await.expect("stats");
        assert_eq!(stats.total_logs, 3);
        assert!((stats.average_duration - 6.0).abs() < 1e-9);
        assert_eq!(stats.locations_summary.get("office"), Some(&2));
        assert_eq!(stats.locations_summary.get("home"), Some(&1));
        assert_eq!(stats.weather_summary.get("sunny"), Some(&3));
    }

    #[test]
    fn stats_for_no_logs_are_zero() {
        assert_eq!(DayLogStats::from_logs(&[]), DayLogStats::default());
    }
}
