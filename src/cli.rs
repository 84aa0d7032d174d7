use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "goaltrack",
    version,
    about = "Track goals, tasks and daily progress with SQLite"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Data directory holding goaltrack.db (defaults to $GOALTRACK_HOME or ~/.goaltrack)"
    )]
    pub data_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print records as JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Goal(GoalCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Progress(ProgressCommand),
    #[command(subcommand)]
    DayLog(DayLogCommand),
    #[command(subcommand)]
    Context(ContextCommand),
    #[command(subcommand)]
    Metrics(MetricsCommand),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add(UserAdd),
    List(Page),
    Show(UserRef),
    Update(UserUpdate),
    Remove(UserRef),
    Profile(UserRef),
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    Add(GoalAdd),
    List(GoalList),
    Show(GoalRef),
    Update(GoalUpdate),
    Remove(GoalRef),
    Children(GoalRef),
    Parent(GoalRef),
    Hierarchy(GoalRef),
    Tree(GoalRef),
    Ancestors(GoalRef),
    Progress(GoalProgress),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Add(TaskAdd),
    List(TaskList),
    Show(RecordRef),
    Update(TaskUpdate),
    Done(RecordRef),
    Remove(RecordRef),
    Today(UserRef),
    Pending(UserRef),
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    Add(ProgressAdd),
    List(ProgressList),
    Show(RecordRef),
    Update(ProgressUpdate),
    Remove(RecordRef),
}

#[derive(Subcommand, Debug)]
pub enum DayLogCommand {
    Add(DayLogAdd),
    List(DayLogList),
    Show(RecordRef),
    On(DayLogOn),
    Range(DayLogRange),
    Stats(UserRef),
    Update(DayLogUpdate),
    Remove(RecordRef),
}

#[derive(Subcommand, Debug)]
pub enum ContextCommand {
    Add(ContextAdd),
    List(ContextList),
    Show(RecordRef),
    #[command(name = "for-user")]
    ForUser(UserRef),
    Update(ContextUpdate),
    Remove(RecordRef),
}

#[derive(Subcommand, Debug)]
pub enum MetricsCommand {
    Add(MetricsAdd),
    Show(RecordRef),
    Latest(UserRef),
    Update(MetricsUpdate),
    Remove(RecordRef),
}

#[derive(Args, Debug)]
pub struct Page {
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Args, Debug)]
pub struct RecordRef {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct UserAdd {
    pub telegram_id: String,
    pub name: String,
    #[arg(long)]
    pub birthday: Option<NaiveDate>,
    #[arg(long, value_enum)]
    pub timezone: Option<TimezoneArg>,
    #[arg(long, value_enum)]
    pub phase: Option<PhaseArg>,
    #[arg(long, value_name = "DATE")]
    pub quit_target: Option<NaiveDate>,
    #[arg(long)]
    pub onboarded: bool,
    #[arg(long, value_name = "HH:MM", value_parser = parse_time)]
    pub morning_time: Option<NaiveTime>,
    #[arg(long, value_enum)]
    pub energy_profile: Option<EnergyProfileArg>,
}

#[derive(Args, Debug)]
pub struct UserUpdate {
    pub user_id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub birthday: Option<NaiveDate>,
    #[arg(long, value_enum)]
    pub timezone: Option<TimezoneArg>,
    #[arg(long, value_enum)]
    pub phase: Option<PhaseArg>,
    #[arg(long, value_name = "DATE")]
    pub quit_target: Option<NaiveDate>,
    #[arg(long)]
    pub onboarded: Option<bool>,
    #[arg(long, value_name = "HH:MM", value_parser = parse_time)]
    pub morning_time: Option<NaiveTime>,
    #[arg(long, value_enum)]
    pub energy_profile: Option<EnergyProfileArg>,
}

#[derive(Args, Debug)]
pub struct GoalRef {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct GoalAdd {
    pub user_id: String,
    #[arg(value_enum)]
    pub goal_type: GoalTypeArg,
    pub description: String,
    #[arg(long, value_name = "GOAL_ID")]
    pub parent: Option<i64>,
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    #[arg(long, value_enum)]
    pub status: Option<GoalStatusArg>,
    #[arg(long, value_enum)]
    pub phase: Option<PhaseArg>,
    #[arg(long, value_enum)]
    pub priority: Option<GoalPriorityArg>,
    #[arg(long, value_name = "PERCENT")]
    pub completion: Option<f64>,
}

#[derive(Args, Debug)]
pub struct GoalList {
    #[arg(long, value_name = "USER_ID")]
    pub user: Option<String>,
    #[arg(long, value_name = "GOAL_ID", conflicts_with = "roots")]
    pub parent: Option<i64>,
    #[arg(long, help = "Only goals without a parent")]
    pub roots: bool,
    #[arg(long = "type", value_enum)]
    pub goal_type: Option<GoalTypeArg>,
    #[arg(long, value_enum)]
    pub status: Option<GoalStatusArg>,
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GoalUpdate {
    pub id: i64,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "type", value_enum)]
    pub goal_type: Option<GoalTypeArg>,
    #[arg(long, value_enum)]
    pub status: Option<GoalStatusArg>,
    #[arg(long, value_enum)]
    pub phase: Option<PhaseArg>,
    #[arg(long, value_enum)]
    pub priority: Option<GoalPriorityArg>,
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    #[arg(long, value_name = "PERCENT")]
    pub completion: Option<f64>,
    #[arg(long, value_name = "GOAL_ID", conflicts_with = "root")]
    pub parent: Option<i64>,
    #[arg(long, help = "Detach the goal from its parent")]
    pub root: bool,
}

#[derive(Args, Debug)]
pub struct GoalProgress {
    pub id: i64,
    #[arg(long, help = "Store the aggregated value on the goal")]
    pub update: bool,
}

#[derive(Args, Debug)]
pub struct TaskAdd {
    pub user_id: String,
    pub description: String,
    #[arg(long, value_name = "GOAL_ID")]
    pub goal: Option<i64>,
    #[arg(long, value_name = "RFC3339")]
    pub deadline: Option<DateTime<Utc>>,
    #[arg(long, value_enum)]
    pub priority: Option<TaskPriorityArg>,
    #[arg(long)]
    pub ai_generated: bool,
    #[arg(long, value_enum)]
    pub status: Option<CompletionStatusArg>,
    #[arg(long, value_name = "MINUTES")]
    pub estimated: Option<i32>,
    #[arg(long, value_name = "MINUTES")]
    pub actual: Option<i32>,
    #[arg(long, value_enum)]
    pub energy: Option<EnergyArg>,
}

#[derive(Args, Debug)]
pub struct TaskList {
    #[arg(long, value_name = "USER_ID")]
    pub user: Option<String>,
    #[arg(long, value_name = "GOAL_ID")]
    pub goal: Option<i64>,
    #[arg(long, value_enum)]
    pub status: Option<CompletionStatusArg>,
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TaskUpdate {
    pub id: i64,
    #[arg(long, value_name = "GOAL_ID", conflicts_with = "no_goal")]
    pub goal: Option<i64>,
    #[arg(long, help = "Detach the task from its goal")]
    pub no_goal: bool,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_name = "RFC3339")]
    pub deadline: Option<DateTime<Utc>>,
    #[arg(long, value_enum)]
    pub priority: Option<TaskPriorityArg>,
    #[arg(long)]
    pub ai_generated: Option<bool>,
    #[arg(long, value_enum)]
    pub status: Option<CompletionStatusArg>,
    #[arg(long, value_name = "MINUTES")]
    pub estimated: Option<i32>,
    #[arg(long, value_name = "MINUTES")]
    pub actual: Option<i32>,
    #[arg(long, value_enum)]
    pub energy: Option<EnergyArg>,
}

#[derive(Args, Debug)]
pub struct ProgressAdd {
    pub user_id: String,
    pub date: NaiveDate,
    #[arg(long, default_value_t = 0)]
    pub completed: i32,
    #[arg(long, default_value_t = 0)]
    pub planned: i32,
    #[arg(long)]
    pub mood: i32,
    #[arg(long)]
    pub energy: i32,
    #[arg(long)]
    pub focus: i32,
    #[arg(long)]
    pub reflection: Option<String>,
    #[arg(long)]
    pub insights: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProgressList {
    pub user_id: String,
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ProgressUpdate {
    pub id: i64,
    #[arg(long)]
    pub completed: Option<i32>,
    #[arg(long)]
    pub planned: Option<i32>,
    #[arg(long)]
    pub mood: Option<i32>,
    #[arg(long)]
    pub energy: Option<i32>,
    #[arg(long)]
    pub focus: Option<i32>,
    #[arg(long)]
    pub reflection: Option<String>,
    #[arg(long)]
    pub insights: Option<String>,
}

#[derive(Args, Debug)]
pub struct DayLogAdd {
    pub user_id: String,
    pub date: NaiveDate,
    #[arg(long, value_name = "RFC3339")]
    pub start: DateTime<Utc>,
    #[arg(long, value_name = "RFC3339")]
    pub end: Option<DateTime<Utc>>,
    #[arg(long)]
    pub summary: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub weather: Option<String>,
}

#[derive(Args, Debug)]
pub struct DayLogList {
    pub user_id: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub weather: Option<String>,
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DayLogOn {
    pub user_id: String,
    pub date: NaiveDate,
}

#[derive(Args, Debug)]
pub struct DayLogRange {
    pub user_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Args, Debug)]
pub struct DayLogUpdate {
    pub id: i64,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, value_name = "RFC3339")]
    pub start: Option<DateTime<Utc>>,
    #[arg(long, value_name = "RFC3339")]
    pub end: Option<DateTime<Utc>>,
    #[arg(long)]
    pub summary: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub weather: Option<String>,
}

#[derive(Args, Debug)]
pub struct ContextFieldArgs {
    #[arg(long, value_name = "JSON")]
    pub behavior_patterns: Option<String>,
    #[arg(long)]
    pub productivity_insights: Option<String>,
    #[arg(long)]
    pub motivation_triggers: Option<String>,
    #[arg(long)]
    pub stress_indicators: Option<String>,
    #[arg(long)]
    pub optimal_work_times: Option<String>,
}

#[derive(Args, Debug)]
pub struct ContextAdd {
    pub user_id: String,
    #[command(flatten)]
    pub fields: ContextFieldArgs,
}

#[derive(Args, Debug)]
pub struct ContextList {
    #[arg(long, value_name = "USER_ID")]
    pub user: Option<String>,
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ContextUpdate {
    pub id: i64,
    #[command(flatten)]
    pub fields: ContextFieldArgs,
}

#[derive(Args, Debug)]
pub struct MetricsAdd {
    pub user_id: String,
    #[arg(long)]
    pub stress: i32,
    #[arg(long)]
    pub satisfaction: i32,
    #[arg(long)]
    pub salary: Option<f64>,
    #[arg(long)]
    pub revenue: Option<f64>,
    #[arg(long)]
    pub expenses: Option<f64>,
    #[arg(long, value_name = "MONTHS")]
    pub runway: Option<f64>,
    #[arg(long, value_name = "SCORE")]
    pub quit_readiness: Option<f64>,
}

#[derive(Args, Debug)]
pub struct MetricsUpdate {
    pub id: i64,
    #[arg(long)]
    pub stress: Option<i32>,
    #[arg(long)]
    pub satisfaction: Option<i32>,
    #[arg(long)]
    pub salary: Option<f64>,
    #[arg(long)]
    pub revenue: Option<f64>,
    #[arg(long)]
    pub expenses: Option<f64>,
    #[arg(long, value_name = "MONTHS")]
    pub runway: Option<f64>,
    #[arg(long, value_name = "SCORE")]
    pub quit_readiness: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GoalTypeArg {
    Yearly,
    Quarterly,
    Monthly,
    Weekly,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GoalStatusArg {
    Active,
    Completed,
    Paused,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GoalPriorityArg {
    High,
    Medium,
    Low,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PhaseArg {
    Research,
    Mvp,
    Growth,
    Scale,
    Transition,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TimezoneArg {
    Utc,
    Est,
    Pst,
    Cst,
    Mst,
    Ist,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EnergyProfileArg {
    Morning,
    Afternoon,
    Evening,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TaskPriorityArg {
    Urgent,
    High,
    Medium,
    Low,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CompletionStatusArg {
    Pending,
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    Completed,
    Cancelled,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EnergyArg {
    High,
    Medium,
    Low,
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|err| format!("expected HH:MM: {err}"))
}
