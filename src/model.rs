use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GoalType {
    Yearly,
    Quarterly,
    Monthly,
    Weekly,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GoalPriority {
    High,
    Medium,
    Low,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Venture phase; shared by goals and a user's current phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Research,
    Mvp,
    Growth,
    Scale,
    Transition,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Mvp => "mvp",
            Self::Growth => "growth",
            Self::Scale => "scale",
            Self::Transition => "transition",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Timezone {
    Utc,
    Est,
    Pst,
    Cst,
    Mst,
    Ist,
}

impl Timezone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utc => "utc",
            Self::Est => "est",
            Self::Pst => "pst",
            Self::Cst => "cst",
            Self::Mst => "mst",
            Self::Ist => "ist",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EnergyProfile {
    Morning,
    Afternoon,
    Evening,
}

impl EnergyProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TaskPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EnergyRequired {
    High,
    Medium,
    Low,
}

impl EnergyRequired {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInput {
    pub telegram_id: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub timezone: Timezone,
    pub current_phase: Phase,
    pub quit_job_target: Option<NaiveDate>,
    pub onboarding_complete: bool,
    pub morning_time: Option<NaiveTime>,
    pub energy_profile: EnergyProfile,
}

impl UserInput {
    pub fn new(telegram_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            telegram_id: telegram_id.into(),
            name: name.into(),
            birthday: None,
            timezone: Timezone::Utc,
            current_phase: Phase::Research,
            quit_job_target: None,
            onboarding_complete: false,
            morning_time: None,
            energy_profile: EnergyProfile::Morning,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub timezone: Option<Timezone>,
    pub current_phase: Option<Phase>,
    pub quit_job_target: Option<NaiveDate>,
    pub onboarding_complete: Option<bool>,
    pub morning_time: Option<NaiveTime>,
    pub energy_profile: Option<EnergyProfile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalInput {
    pub user_id: String,
    pub parent_goal_id: Option<i64>,
    pub goal_type: GoalType,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub status: GoalStatus,
    pub phase: Phase,
    pub priority: GoalPriority,
    pub completion_percentage: f64,
}

impl GoalInput {
    pub fn new(user_id: impl Into<String>, goal_type: GoalType, description: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            parent_goal_id: None,
            goal_type,
            description: description.into(),
            deadline: None,
            status: GoalStatus::Active,
            phase: Phase::Research,
            priority: GoalPriority::Medium,
            completion_percentage: 0.0,
        }
    }
}

/// Set or clear a goal reference (a goal's parent, a task's goal).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GoalLink {
    Set(i64),
    Clear,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GoalChanges {
    pub description: Option<String>,
    pub goal_type: Option<GoalType>,
    pub status: Option<GoalStatus>,
    pub phase: Option<Phase>,
    pub priority: Option<GoalPriority>,
    pub deadline: Option<NaiveDate>,
    pub completion_percentage: Option<f64>,
    pub parent: Option<GoalLink>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GoalQuery {
    pub user_id: Option<String>,
    pub parent_goal_id: Option<i64>,
    pub roots_only: bool,
    pub goal_type: Option<GoalType>,
    pub status: Option<GoalStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskInput {
    pub user_id: String,
    pub goal_id: Option<i64>,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub ai_generated: bool,
    pub completion_status: CompletionStatus,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub energy_required: EnergyRequired,
}

impl TaskInput {
    pub fn new(user_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id: None,
            description: description.into(),
            deadline: None,
            priority: TaskPriority::Medium,
            ai_generated: false,
            completion_status: CompletionStatus::Pending,
            estimated_duration: None,
            actual_duration: None,
            energy_required: EnergyRequired::Medium,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    pub goal: Option<GoalLink>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub ai_generated: Option<bool>,
    pub completion_status: Option<CompletionStatus>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub energy_required: Option<EnergyRequired>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub user_id: Option<String>,
    pub goal_id: Option<i64>,
    pub completion_status: Option<CompletionStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressLogInput {
    pub user_id: String,
    pub date: NaiveDate,
    pub tasks_completed: i32,
    pub tasks_planned: i32,
    pub mood_score: i32,
    pub energy_level: i32,
    pub focus_score: i32,
    pub daily_reflection: Option<String>,
    pub ai_insights: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgressLogChanges {
    pub tasks_completed: Option<i32>,
    pub tasks_planned: Option<i32>,
    pub mood_score: Option<i32>,
    pub energy_level: Option<i32>,
    pub focus_score: Option<i32>,
    pub daily_reflection: Option<String>,
    pub ai_insights: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayLogInput {
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub weather: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DayLogChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub weather: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DayLogQuery {
    pub location: Option<String>,
    pub weather: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AiContextFields {
    pub behavior_patterns: Option<String>,
    pub productivity_insights: Option<String>,
    pub motivation_triggers: Option<String>,
    pub stress_indicators: Option<String>,
    pub optimal_work_times: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobMetricsInput {
    pub user_id: String,
    pub current_salary: Option<f64>,
    pub startup_revenue: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub runway_months: Option<f64>,
    pub stress_level: i32,
    pub job_satisfaction: i32,
    pub quit_readiness_score: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobMetricsChanges {
    pub current_salary: Option<f64>,
    pub startup_revenue: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub runway_months: Option<f64>,
    pub stress_level: Option<i32>,
    pub job_satisfaction: Option<i32>,
    pub quit_readiness_score: Option<f64>,
}
