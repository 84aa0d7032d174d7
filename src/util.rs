use chrono::{DateTime, Utc};

use crate::app::{DayLogStats, GoalHierarchy, GoalSummary, UserProfile};
use crate::entities::{ai_context, day_log, goal, job_metrics, progress_log, task, user};

fn has_text(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}

fn push_optional(output: &mut String, label: &str, value: &Option<String>) {
    if has_text(value) {
        output.push_str(&format!("{label}: {}\n", value.as_deref().unwrap_or("")));
    }
}

fn push_optional_number(output: &mut String, label: &str, value: Option<f64>) {
    if let Some(value) = value {
        output.push_str(&format!("{label}: {value:.2}\n"));
    }
}

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_user_detail(user: &user::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("User ID: {}\n", user.telegram_id));
    output.push_str(&format!("Name: {}\n", user.name));
    if let Some(birthday) = user.birthday {
        output.push_str(&format!("Birthday: {birthday}\n"));
    }
    output.push_str(&format!("Timezone: {}\n", user.timezone));
    output.push_str(&format!("Phase: {}\n", user.current_phase));
    if let Some(target) = user.quit_job_target {
        output.push_str(&format!("Quit Job Target: {target}\n"));
    }
    output.push_str(&format!("Onboarded: {}\n", user.onboarding_complete));
    if let Some(time) = user.morning_time {
        output.push_str(&format!("Morning Time: {}\n", time.format("%H:%M")));
    }
    output.push_str(&format!("Energy Profile: {}\n", user.energy_profile));
    output.push_str(&format!("Created: {}\n", format_datetime(user.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(user.updated_at)));
    output.trim_end().to_string()
}

pub fn format_user_profile(profile: &UserProfile) -> String {
    let mut output = format_user_detail(&profile.user);
    output.push_str("\n\n");
    if profile.goals.is_empty() {
        output.push_str("Goals: (none)\n");
    } else {
        output.push_str("Goals:\n");
        for goal in &profile.goals {
            output.push_str(&format!(
                "- [{}] {} {} (goal id {}, {})\n",
                goal.status,
                goal.goal_type,
                goal.description,
                goal.id,
                format_percentage(goal.completion_percentage)
            ));
        }
    }
    if profile.tasks.is_empty() {
        output.push_str("Tasks: (none)\n");
    } else {
        output.push_str("Tasks:\n");
        for task in &profile.tasks {
            output.push_str(&format!(
                "- [{}] {} (task id {}, {})\n",
                task.completion_status, task.description, task.id, task.priority
            ));
        }
    }
    if let Some(context) = &profile.ai_context {
        output.push_str(&format!("AI Context ID: {}\n", context.id));
    }
    if let Some(metrics) = &profile.job_metrics {
        output.push_str(&format!(
            "Job Metrics ID: {} (stress {}, satisfaction {})\n",
            metrics.id, metrics.stress_level, metrics.job_satisfaction
        ));
    }
    output.trim_end().to_string()
}

pub fn format_goal_detail(goal: &goal::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Goal ID: {}\n", goal.id));
    output.push_str(&format!("User ID: {}\n", goal.user_id));
    match goal.parent_goal_id {
        Some(parent_id) => output.push_str(&format!("Parent ID: {parent_id}\n")),
        None => output.push_str("Parent ID: (root)\n"),
    }
    output.push_str(&format!("Type: {}\n", goal.goal_type));
    output.push_str(&format!("Status: {}\n", goal.status));
    output.push_str(&format!("Phase: {}\n", goal.phase));
    output.push_str(&format!("Priority: {}\n", goal.priority));
    output.push_str(&format!(
        "Completion: {}\n",
        format_percentage(goal.completion_percentage)
    ));
    if let Some(deadline) = goal.deadline {
        output.push_str(&format!("Deadline: {deadline}\n"));
    }
    output.push_str(&format!("Description: {}\n", goal.description));
    output.push_str(&format!("Created: {}\n", format_datetime(goal.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(goal.updated_at)));
    output.trim_end().to_string()
}

fn format_goal_summary(summary: &GoalSummary) -> String {
    format!(
        "[{}] {} {} (goal id {}, {})",
        summary.status,
        summary.goal_type,
        summary.description,
        summary.id,
        format_percentage(summary.completion_percentage)
    )
}

pub fn format_goal_hierarchy(hierarchy: &GoalHierarchy) -> String {
    let mut output = format_goal_detail(&hierarchy.goal);
    output.push_str("\n\n");
    match &hierarchy.parent {
        Some(parent) => output.push_str(&format!("Parent: {}\n", format_goal_summary(parent))),
        None => output.push_str("Parent: (none)\n"),
    }
    if hierarchy.children.is_empty() {
        output.push_str("Children: (none)");
        return output;
    }
    output.push_str("Children:\n");
    for child in &hierarchy.children {
        output.push_str(&format!("- {}\n", format_goal_summary(child)));
    }
    output.trim_end().to_string()
}

/// Indented outline of a pre-order walk; depth 0 is the requested goal.
pub fn format_goal_tree(walk: &[(usize, goal::Model)]) -> String {
    let mut output = String::new();
    for (depth, goal) in walk {
        output.push_str(&"  ".repeat(*depth));
        output.push_str(&format!(
            "- [{}] {} {} (goal id {}, {})\n",
            goal.status,
            goal.goal_type,
            goal.description,
            goal.id,
            format_percentage(goal.completion_percentage)
        ));
    }
    output.trim_end().to_string()
}

pub fn format_task_detail(task: &task::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Task ID: {}\n", task.id));
    output.push_str(&format!("User ID: {}\n", task.user_id));
    if let Some(goal_id) = task.goal_id {
        output.push_str(&format!("Goal ID: {goal_id}\n"));
    }
    output.push_str(&format!("Status: {}\n", task.completion_status));
    output.push_str(&format!("Priority: {}\n", task.priority));
    output.push_str(&format!("Energy: {}\n", task.energy_required));
    output.push_str(&format!("AI Generated: {}\n", task.ai_generated));
    if let Some(deadline) = task.deadline {
        output.push_str(&format!("Deadline: {}\n", format_datetime(deadline)));
    }
    if let Some(minutes) = task.estimated_duration {
        output.push_str(&format!("Estimated: {minutes} min\n"));
    }
    if let Some(minutes) = task.actual_duration {
        output.push_str(&format!("Actual: {minutes} min\n"));
    }
    output.push_str(&format!("Description: {}\n", task.description));
    output.push_str(&format!("Created: {}\n", format_datetime(task.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(task.updated_at)));
    output.trim_end().to_string()
}

pub fn format_progress_log_detail(log: &progress_log::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Progress Log ID: {}\n", log.id));
    output.push_str(&format!("User ID: {}\n", log.user_id));
    output.push_str(&format!("Date: {}\n", log.date));
    output.push_str(&format!(
        "Tasks: {}/{}\n",
        log.tasks_completed, log.tasks_planned
    ));
    output.push_str(&format!(
        "Mood: {}  Energy: {}  Focus: {}\n",
        log.mood_score, log.energy_level, log.focus_score
    ));
    push_optional(&mut output, "Reflection", &log.daily_reflection);
    push_optional(&mut output, "AI Insights", &log.ai_insights);
    output.push_str(&format!("Created: {}\n", format_datetime(log.created_at)));
    output.trim_end().to_string()
}

pub fn format_day_log_detail(log: &day_log::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Day Log ID: {}\n", log.id));
    output.push_str(&format!("User ID: {}\n", log.user_id));
    output.push_str(&format!("Date: {}\n", log.date));
    output.push_str(&format!("Start: {}\n", format_datetime(log.start_time)));
    match log.end_time {
        Some(end) => output.push_str(&format!("End: {}\n", format_datetime(end))),
        None => output.push_str("End: (open)\n"),
    }
    push_optional(&mut output, "Summary", &log.summary);
    push_optional(&mut output, "Location", &log.location);
    push_optional(&mut output, "Weather", &log.weather);
    output.trim_end().to_string()
}

pub fn format_day_log_stats(stats: &DayLogStats) -> String {
    let mut output = String::new();
    output.push_str(&format!("Total Logs: {}\n", stats.total_logs));
    output.push_str(&format!(
        "Average Duration: {:.2} h\n",
        stats.average_duration
    ));
    for (label, counts) in [
        ("Locations", &stats.locations_summary),
        ("Weather", &stats.weather_summary),
    ] {
        if counts.is_empty() {
            continue;
        }
        output.push_str(&format!("{label}:\n"));
        for (name, count) in counts {
            output.push_str(&format!("- {name}: {count}\n"));
        }
    }
    output.trim_end().to_string()
}

pub fn format_ai_context_detail(context: &ai_context::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("AI Context ID: {}\n", context.id));
    output.push_str(&format!("User ID: {}\n", context.user_id));
    push_optional(&mut output, "Behavior Patterns", &context.behavior_patterns);
    push_optional(&mut output, "Productivity Insights", &context.productivity_insights);
    push_optional(&mut output, "Motivation Triggers", &context.motivation_triggers);
    push_optional(&mut output, "Stress Indicators", &context.stress_indicators);
    push_optional(&mut output, "Optimal Work Times", &context.optimal_work_times);
    output.push_str(&format!(
        "Last Updated: {}\n",
        format_datetime(context.last_updated)
    ));
    output.trim_end().to_string()
}

pub fn format_job_metrics_detail(metrics: &job_metrics::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Job Metrics ID: {}\n", metrics.id));
    output.push_str(&format!("User ID: {}\n", metrics.user_id));
    push_optional_number(&mut output, "Salary", metrics.current_salary);
    push_optional_number(&mut output, "Startup Revenue", metrics.startup_revenue);
    push_optional_number(&mut output, "Monthly Expenses", metrics.monthly_expenses);
    push_optional_number(&mut output, "Runway Months", metrics.runway_months);
    output.push_str(&format!("Stress Level: {}\n", metrics.stress_level));
    output.push_str(&format!("Job Satisfaction: {}\n", metrics.job_satisfaction));
    push_optional_number(&mut output, "Quit Readiness", metrics.quit_readiness_score);
    output.push_str(&format!(
        "Last Updated: {}\n",
        format_datetime(metrics.last_updated)
    ));
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn goal(id: i64, parent: Option<i64>, pct: f64) -> goal::Model {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        goal::Model {
            id,
            user_id: "u1".to_string(),
            parent_goal_id: parent,
            goal_type: "monthly".to_string(),
            description: format!("goal {id}"),
            deadline: None,
            status: "active".to_string(),
            phase: "mvp".to_string(),
            priority: "high".to_string(),
            completion_percentage: pct,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn goal_detail_marks_roots() {
        let text = format_goal_detail(&goal(1, None, 62.5));
        assert!(text.contains("Parent ID: (root)"));
        assert!(text.contains("Completion: 62.5%"));
        assert!(text.contains("Created: 2024-01-01 09:30"));
    }

    #[test]
    fn tree_indents_by_depth() {
        let walk = vec![(0, goal(1, None, 0.0)), (1, goal(2, Some(1), 50.0))];
        let text = format_goal_tree(&walk);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- [active]"));
        assert!(lines[1].starts_with("  - [active] monthly goal 2 (goal id 2, 50.0%)"));
    }

    #[test]
    fn hierarchy_without_relatives_says_none() {
        let hierarchy = GoalHierarchy {
            goal: goal(3, None, 10.0),
            parent: None,
            children: Vec::new(),
        };
        let text = format_goal_hierarchy(&hierarchy);
        assert!(text.contains("Parent: (none)"));
        assert!(text.ends_with("Children: (none)"));
    }
}
