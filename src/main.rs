mod app;
mod cli;
mod config;
mod db;
mod entities;
mod error;
mod model;
mod progress;
mod util;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::cli::{
    Cli, Command, CompletionStatusArg, ContextAdd, ContextCommand, ContextFieldArgs, ContextList,
    ContextUpdate, DayLogAdd, DayLogCommand, DayLogList, DayLogOn, DayLogRange, DayLogUpdate,
    EnergyArg, EnergyProfileArg, GoalAdd, GoalCommand, GoalList, GoalPriorityArg, GoalProgress,
    GoalStatusArg, GoalTypeArg, GoalUpdate, MetricsAdd, MetricsCommand, MetricsUpdate, Page,
    PhaseArg, ProgressAdd, ProgressCommand, ProgressList, ProgressUpdate, TaskAdd, TaskCommand,
    TaskList, TaskPriorityArg, TaskUpdate, TimezoneArg, UserAdd, UserCommand, UserUpdate,
};
use crate::config::Settings;
use crate::entities::{ai_context, day_log, goal, progress_log, task, user};
use crate::error::AppError;
use crate::model::{
    AiContextFields, CompletionStatus, DayLogChanges, DayLogInput, DayLogQuery, EnergyProfile,
    EnergyRequired, GoalChanges, GoalInput, GoalLink, GoalPriority, GoalQuery, GoalStatus,
    GoalType, JobMetricsChanges, JobMetricsInput, Phase, ProgressLogChanges, ProgressLogInput,
    TaskChanges, TaskInput, TaskPriority, TaskQuery, Timezone, UserChanges, UserInput,
};
use crate::util::{
    format_ai_context_detail, format_datetime, format_day_log_detail, format_day_log_stats,
    format_goal_detail, format_goal_hierarchy, format_goal_tree, format_job_metrics_detail,
    format_percentage, format_progress_log_detail, format_task_detail, format_user_detail,
    format_user_profile,
};

#[tokio::main]
async fn main() {
    config::load_dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::new(config::log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Cli {
        data_dir,
        json,
        command,
    } = Cli::parse();

    let settings = Settings::resolve(data_dir)?;
    db::ensure_parent_dir(&settings.db_path)?;
    let mut lock = db::open_lock(&settings.db_path)?;
    let _guard = lock.write()?;

    let db = db::connect(&settings.db_path).await?;
    db::ensure_schema(&db).await?;
    let app = App::new(db);
    let out = Printer { json };

    match command {
        Command::User(command) => handle_user(&app, &out, command).await,
        Command::Goal(command) => handle_goal(&app, &out, command).await,
        Command::Task(command) => handle_task(&app, &out, command).await,
        Command::Progress(command) => handle_progress(&app, &out, command).await,
        Command::DayLog(command) => handle_day_log(&app, &out, command).await,
        Command::Context(command) => handle_context(&app, &out, command).await,
        Command::Metrics(command) => handle_metrics(&app, &out, command).await,
    }
}

/// Chooses between the human text rendering and pretty JSON.
struct Printer {
    json: bool,
}

impl Printer {
    fn record<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<(), AppError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn created<T: Serialize>(&self, value: &T, message: String) -> Result<(), AppError> {
        self.record(value, || message)
    }

    fn removed(&self, kind: &str, id: &str) -> Result<(), AppError> {
        let value = serde_json::json!({ "deleted": kind, "id": id });
        self.record(&value, || format!("{} ID: {id} removed.", capitalize(kind)))
    }
}

async fn handle_user(app: &App, out: &Printer, command: UserCommand) -> Result<(), AppError> {
    match command {
        UserCommand::Add(args) => handle_user_add(app, out, args).await,
        UserCommand::List(Page { limit, offset }) => {
            let users = app.list_users(offset, limit).await?;
            if out.json {
                return out.record(&users, String::new);
            }
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            print_user_list(&users);
            Ok(())
        }
        UserCommand::Show(args) => {
            let user = app.get_user(&args.user_id).await?;
            out.record(&user, || format_user_detail(&user))
        }
        UserCommand::Update(args) => handle_user_update(app, out, args).await,
        UserCommand::Remove(args) => {
            app.delete_user(&args.user_id).await?;
            out.removed("user", &args.user_id)
        }
        UserCommand::Profile(args) => {
            let profile = app.user_profile(&args.user_id).await?;
            out.record(&profile, || format_user_profile(&profile))
        }
    }
}

async fn handle_user_add(app: &App, out: &Printer, args: UserAdd) -> Result<(), AppError> {
    let mut input = UserInput::new(args.telegram_id, args.name);
    input.birthday = args.birthday;
    if let Some(timezone) = args.timezone {
        input.timezone = timezone_from_arg(timezone);
    }
    if let Some(phase) = args.phase {
        input.current_phase = phase_from_arg(phase);
    }
    input.quit_job_target = args.quit_target;
    input.onboarding_complete = args.onboarded;
    input.morning_time = args.morning_time;
    if let Some(profile) = args.energy_profile {
        input.energy_profile = energy_profile_from_arg(profile);
    }
    let user = app.add_user(input).await?;
    out.created(
        &user,
        format!("Created user ID: {}: {}", user.telegram_id, user.name),
    )
}

async fn handle_user_update(app: &App, out: &Printer, args: UserUpdate) -> Result<(), AppError> {
    let user = app
        .update_user(
            &args.user_id,
            UserChanges {
                name: args.name,
                birthday: args.birthday,
                timezone: args.timezone.map(timezone_from_arg),
                current_phase: args.phase.map(phase_from_arg),
                quit_job_target: args.quit_target,
                onboarding_complete: args.onboarded,
                morning_time: args.morning_time,
                energy_profile: args.energy_profile.map(energy_profile_from_arg),
            },
        )
        .await?;
    out.record(&user, || format!("Updated user ID: {}.", user.telegram_id))
}

async fn handle_goal(app: &App, out: &Printer, command: GoalCommand) -> Result<(), AppError> {
    match command {
        GoalCommand::Add(args) => handle_goal_add(app, out, args).await,
        GoalCommand::List(args) => handle_goal_list(app, out, args).await,
        GoalCommand::Show(args) => {
            let goal = app.get_goal(args.id).await?;
            out.record(&goal, || format_goal_detail(&goal))
        }
        GoalCommand::Update(args) => handle_goal_update(app, out, args).await,
        GoalCommand::Remove(args) => {
            let detached = app.delete_goal(args.id).await?;
            if out.json {
                let value = serde_json::json!({
                    "deleted": "goal",
                    "id": args.id,
                    "detached_tasks": detached,
                });
                return out.record(&value, String::new);
            }
            println!("Goal ID: {} removed.", args.id);
            if detached > 0 {
                println!("Detached {detached} task(s).");
            }
            Ok(())
        }
        GoalCommand::Children(args) => {
            let children = app.get_child_goals(args.id).await?;
            if out.json {
                return out.record(&children, String::new);
            }
            if children.is_empty() {
                println!("No child goals for goal ID: {}.", args.id);
                return Ok(());
            }
            print_goal_list(&children);
            Ok(())
        }
        GoalCommand::Parent(args) => {
            let parent = app.get_parent_goal(args.id).await?;
            match parent {
                Some(parent) => out.record(&parent, || format_goal_detail(&parent)),
                None => out.record(&serde_json::Value::Null, || {
                    format!("Goal ID: {} is a root goal.", args.id)
                }),
            }
        }
        GoalCommand::Hierarchy(args) => {
            let hierarchy = app.get_goal_hierarchy(args.id).await?;
            out.record(&hierarchy, || format_goal_hierarchy(&hierarchy))
        }
        GoalCommand::Tree(args) => {
            let walk = app.goal_subtree(args.id).await?;
            if out.json {
                let nodes: Vec<serde_json::Value> = walk
                    .iter()
                    .map(|(depth, goal)| serde_json::json!({ "depth": depth, "goal": goal }))
                    .collect();
                return out.record(&nodes, String::new);
            }
            println!("{}", format_goal_tree(&walk));
            Ok(())
        }
        GoalCommand::Ancestors(args) => {
            let chain = app.goal_ancestors(args.id).await?;
            if out.json {
                return out.record(&chain, String::new);
            }
            if chain.is_empty() {
                println!("Goal ID: {} is a root goal.", args.id);
                return Ok(());
            }
            print_goal_list(&chain);
            Ok(())
        }
        GoalCommand::Progress(args) => handle_goal_progress(app, out, args).await,
    }
}

async fn handle_goal_add(app: &App, out: &Printer, args: GoalAdd) -> Result<(), AppError> {
    let mut input = GoalInput::new(args.user_id, goal_type_from_arg(args.goal_type), args.description);
    input.parent_goal_id = args.parent;
    input.deadline = args.deadline;
    if let Some(status) = args.status {
        input.status = goal_status_from_arg(status);
    }
    if let Some(phase) = args.phase {
        input.phase = phase_from_arg(phase);
    }
    if let Some(priority) = args.priority {
        input.priority = goal_priority_from_arg(priority);
    }
    if let Some(completion) = args.completion {
        input.completion_percentage = completion;
    }
    let goal = app.add_goal(input).await?;
    let message = match goal.parent_goal_id {
        Some(parent_id) => format!("Created goal ID: {} under goal ID: {}", goal.id, parent_id),
        None => format!("Created goal ID: {}", goal.id),
    };
    out.created(&goal, message)
}

async fn handle_goal_list(app: &App, out: &Printer, args: GoalList) -> Result<(), AppError> {
    let query = GoalQuery {
        user_id: args.user,
        parent_goal_id: args.parent,
        roots_only: args.roots,
        goal_type: args.goal_type.map(goal_type_from_arg),
        status: args.status.map(goal_status_from_arg),
        limit: args.limit,
        offset: args.offset,
    };
    let goals = app.list_goals(&query).await?;
    if out.json {
        return out.record(&goals, String::new);
    }
    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }
    print_goal_list(&goals);
    Ok(())
}

async fn handle_goal_update(app: &App, out: &Printer, args: GoalUpdate) -> Result<(), AppError> {
    let parent = match (args.parent, args.root) {
        (Some(parent_id), _) => Some(GoalLink::Set(parent_id)),
        (None, true) => Some(GoalLink::Clear),
        (None, false) => None,
    };
    let goal = app
        .update_goal(
            args.id,
            GoalChanges {
                description: args.description,
                goal_type: args.goal_type.map(goal_type_from_arg),
                status: args.status.map(goal_status_from_arg),
                phase: args.phase.map(phase_from_arg),
                priority: args.priority.map(goal_priority_from_arg),
                deadline: args.deadline,
                completion_percentage: args.completion,
                parent,
            },
        )
        .await?;
    out.record(&goal, || format!("Updated goal ID: {}.", goal.id))
}

async fn handle_goal_progress(app: &App, out: &Printer, args: GoalProgress) -> Result<(), AppError> {
    if args.update {
        let goal = app.update_goal_hierarchy_progress(args.id).await?;
        return out.record(&goal, || {
            format!(
                "Goal ID: {} progress updated to {}.",
                goal.id,
                format_percentage(goal.completion_percentage)
            )
        });
    }
    let progress = app.calculate_goal_progress(args.id).await?;
    let value = serde_json::json!({ "goal_id": args.id, "progress": progress });
    out.record(&value, || {
        format!("Goal ID: {} progress: {}", args.id, format_percentage(progress))
    })
}

async fn handle_task(app: &App, out: &Printer, command: TaskCommand) -> Result<(), AppError> {
    match command {
        TaskCommand::Add(args) => handle_task_add(app, out, args).await,
        TaskCommand::List(args) => handle_task_list(app, out, args).await,
        TaskCommand::Show(args) => {
            let task = app.get_task(args.id).await?;
            out.record(&task, || format_task_detail(&task))
        }
        TaskCommand::Update(args) => handle_task_update(app, out, args).await,
        TaskCommand::Done(args) => {
            let task = app.complete_task(args.id).await?;
            out.record(&task, || format!("Task ID: {} marked completed.", task.id))
        }
        TaskCommand::Remove(args) => {
            app.delete_task(args.id).await?;
            out.removed("task", &args.id.to_string())
        }
        TaskCommand::Today(args) => {
            let tasks = app.list_today_tasks(&args.user_id).await?;
            print_tasks(out, &tasks, "No tasks due today.")
        }
        TaskCommand::Pending(args) => {
            let tasks = app.list_pending_tasks(&args.user_id).await?;
            print_tasks(out, &tasks, "No pending tasks.")
        }
    }
}

async fn handle_task_add(app: &App, out: &Printer, args: TaskAdd) -> Result<(), AppError> {
    let mut input = TaskInput::new(args.user_id, args.description);
    input.goal_id = args.goal;
    input.deadline = args.deadline;
    if let Some(priority) = args.priority {
        input.priority = task_priority_from_arg(priority);
    }
    input.ai_generated = args.ai_generated;
    if let Some(status) = args.status {
        input.completion_status = completion_status_from_arg(status);
    }
    input.estimated_duration = args.estimated;
    input.actual_duration = args.actual;
    if let Some(energy) = args.energy {
        input.energy_required = energy_from_arg(energy);
    }
    let task = app.add_task(input).await?;
    out.created(&task, format!("Created task ID: {}", task.id))
}

async fn handle_task_list(app: &App, out: &Printer, args: TaskList) -> Result<(), AppError> {
    let query = TaskQuery {
        user_id: args.user,
        goal_id: args.goal,
        completion_status: args.status.map(completion_status_from_arg),
        limit: args.limit,
        offset: args.offset,
    };
    let tasks = app.list_tasks(&query).await?;
    print_tasks(out, &tasks, "No tasks found.")
}

async fn handle_task_update(app: &App, out: &Printer, args: TaskUpdate) -> Result<(), AppError> {
    let goal = match (args.goal, args.no_goal) {
        (Some(goal_id), _) => Some(GoalLink::Set(goal_id)),
        (None, true) => Some(GoalLink::Clear),
        (None, false) => None,
    };
    let task = app
        .update_task(
            args.id,
            TaskChanges {
                goal,
                description: args.description,
                deadline: args.deadline,
                priority: args.priority.map(task_priority_from_arg),
                ai_generated: args.ai_generated,
                completion_status: args.status.map(completion_status_from_arg),
                estimated_duration: args.estimated,
                actual_duration: args.actual,
                energy_required: args.energy.map(energy_from_arg),
            },
        )
        .await?;
    out.record(&task, || format!("Updated task ID: {}.", task.id))
}

async fn handle_progress(app: &App, out: &Printer, command: ProgressCommand) -> Result<(), AppError> {
    match command {
        ProgressCommand::Add(args) => handle_progress_add(app, out, args).await,
        ProgressCommand::List(ProgressList { user_id, from, to }) => {
            let logs = app.list_progress_logs(&user_id, from, to).await?;
            if out.json {
                return out.record(&logs, String::new);
            }
            if logs.is_empty() {
                println!("No progress logs found for user ID: {user_id}.");
                return Ok(());
            }
            print_progress_list(&logs);
            Ok(())
        }
        ProgressCommand::Show(args) => {
            let log = app.get_progress_log(args.id).await?;
            out.record(&log, || format_progress_log_detail(&log))
        }
        ProgressCommand::Update(args) => handle_progress_update(app, out, args).await,
        ProgressCommand::Remove(args) => {
            app.delete_progress_log(args.id).await?;
            out.removed("progress log", &args.id.to_string())
        }
    }
}

async fn handle_progress_add(app: &App, out: &Printer, args: ProgressAdd) -> Result<(), AppError> {
    let log = app
        .add_progress_log(ProgressLogInput {
            user_id: args.user_id,
            date: args.date,
            tasks_completed: args.completed,
            tasks_planned: args.planned,
            mood_score: args.mood,
            energy_level: args.energy,
            focus_score: args.focus,
            daily_reflection: args.reflection,
            ai_insights: args.insights,
        })
        .await?;
    out.created(&log, format!("Created progress log ID: {}", log.id))
}

async fn handle_progress_update(
    app: &App,
    out: &Printer,
    args: ProgressUpdate,
) -> Result<(), AppError> {
    let log = app
        .update_progress_log(
            args.id,
            ProgressLogChanges {
                tasks_completed: args.completed,
                tasks_planned: args.planned,
                mood_score: args.mood,
                energy_level: args.energy,
                focus_score: args.focus,
                daily_reflection: args.reflection,
                ai_insights: args.insights,
            },
        )
        .await?;
    out.record(&log, || format!("Updated progress log ID: {}.", log.id))
}

async fn handle_day_log(app: &App, out: &Printer, command: DayLogCommand) -> Result<(), AppError> {
    match command {
        DayLogCommand::Add(args) => handle_day_log_add(app, out, args).await,
        DayLogCommand::List(args) => handle_day_log_list(app, out, args).await,
        DayLogCommand::Show(args) => {
            let log = app.get_day_log(args.id).await?;
            out.record(&log, || format_day_log_detail(&log))
        }
        DayLogCommand::On(DayLogOn { user_id, date }) => {
            let log = app.day_log_on(&user_id, date).await?;
            out.record(&log, || format_day_log_detail(&log))
        }
        DayLogCommand::Range(DayLogRange {
            user_id,
            start,
            end,
            location,
        }) => {
            let logs = app
                .day_logs_in_range(&user_id, start, end, location.as_deref())
                .await?;
            print_day_logs(out, &logs)
        }
        DayLogCommand::Stats(args) => {
            let stats = app.day_log_stats(&args.user_id).await?;
            out.record(&stats, || format_day_log_stats(&stats))
        }
        DayLogCommand::Update(args) => handle_day_log_update(app, out, args).await,
        DayLogCommand::Remove(args) => {
            app.delete_day_log(args.id).await?;
            out.removed("day log", &args.id.to_string())
        }
    }
}

async fn handle_day_log_add(app: &App, out: &Printer, args: DayLogAdd) -> Result<(), AppError> {
    let log = app
        .add_day_log(DayLogInput {
            user_id: args.user_id,
            date: args.date,
            start_time: args.start,
            end_time: args.end,
            summary: args.summary,
            location: args.location,
            weather: args.weather,
        })
        .await?;
    out.created(&log, format!("Created day log ID: {}", log.id))
}

async fn handle_day_log_list(app: &App, out: &Printer, args: DayLogList) -> Result<(), AppError> {
    let query = DayLogQuery {
        location: args.location,
        weather: args.weather,
        limit: args.limit,
        offset: args.offset,
    };
    let logs = app.list_day_logs(&args.user_id, &query).await?;
    print_day_logs(out, &logs)
}

async fn handle_day_log_update(
    app: &App,
    out: &Printer,
    args: DayLogUpdate,
) -> Result<(), AppError> {
    let log = app
        .update_day_log(
            args.id,
            DayLogChanges {
                date: args.date,
                start_time: args.start,
                end_time: args.end,
                summary: args.summary,
                location: args.location,
                weather: args.weather,
            },
        )
        .await?;
    out.record(&log, || format!("Updated day log ID: {}.", log.id))
}

async fn handle_context(app: &App, out: &Printer, command: ContextCommand) -> Result<(), AppError> {
    match command {
        ContextCommand::Add(ContextAdd { user_id, fields }) => {
            let context = app.add_ai_context(&user_id, context_fields(fields)).await?;
            out.created(&context, format!("Created ai context ID: {}", context.id))
        }
        ContextCommand::List(ContextList {
            user,
            limit,
            offset,
        }) => {
            let contexts = app
                .list_ai_contexts(user.as_deref(), offset, limit)
                .await?;
            if out.json {
                return out.record(&contexts, String::new);
            }
            if contexts.is_empty() {
                println!("No ai contexts found.");
                return Ok(());
            }
            print_ai_context_list(&contexts);
            Ok(())
        }
        ContextCommand::Show(args) => {
            let context = app.get_ai_context(args.id).await?;
            out.record(&context, || format_ai_context_detail(&context))
        }
        ContextCommand::ForUser(args) => {
            let context = app.ai_context_for_user(&args.user_id).await?;
            out.record(&context, || format_ai_context_detail(&context))
        }
        ContextCommand::Update(ContextUpdate { id, fields }) => {
            let context = app.update_ai_context(id, context_fields(fields)).await?;
            out.record(&context, || format!("Updated ai context ID: {}.", context.id))
        }
        ContextCommand::Remove(args) => {
            app.delete_ai_context(args.id).await?;
            out.removed("ai context", &args.id.to_string())
        }
    }
}

fn context_fields(args: ContextFieldArgs) -> AiContextFields {
    AiContextFields {
        behavior_patterns: args.behavior_patterns,
        productivity_insights: args.productivity_insights,
        motivation_triggers: args.motivation_triggers,
        stress_indicators: args.stress_indicators,
        optimal_work_times: args.optimal_work_times,
    }
}

async fn handle_metrics(app: &App, out: &Printer, command: MetricsCommand) -> Result<(), AppError> {
    match command {
        MetricsCommand::Add(args) => handle_metrics_add(app, out, args).await,
        MetricsCommand::Show(args) => {
            let metrics = app.get_job_metrics(args.id).await?;
            out.record(&metrics, || format_job_metrics_detail(&metrics))
        }
        MetricsCommand::Latest(args) => {
            let metrics = app.latest_job_metrics(&args.user_id).await?;
            out.record(&metrics, || format_job_metrics_detail(&metrics))
        }
        MetricsCommand::Update(args) => handle_metrics_update(app, out, args).await,
        MetricsCommand::Remove(args) => {
            app.delete_job_metrics(args.id).await?;
            out.removed("job metrics", &args.id.to_string())
        }
    }
}

async fn handle_metrics_add(app: &App, out: &Printer, args: MetricsAdd) -> Result<(), AppError> {
    let metrics = app
        .add_job_metrics(JobMetricsInput {
            user_id: args.user_id,
            current_salary: args.salary,
            startup_revenue: args.revenue,
            monthly_expenses: args.expenses,
            runway_months: args.runway,
            stress_level: args.stress,
            job_satisfaction: args.satisfaction,
            quit_readiness_score: args.quit_readiness,
        })
        .await?;
    out.created(&metrics, format!("Created job metrics ID: {}", metrics.id))
}

async fn handle_metrics_update(
    app: &App,
    out: &Printer,
    args: MetricsUpdate,
) -> Result<(), AppError> {
    let metrics = app
        .update_job_metrics(
            args.id,
            JobMetricsChanges {
                current_salary: args.salary,
                startup_revenue: args.revenue,
                monthly_expenses: args.expenses,
                runway_months: args.runway,
                stress_level: args.stress,
                job_satisfaction: args.satisfaction,
                quit_readiness_score: args.quit_readiness,
            },
        )
        .await?;
    out.record(&metrics, || format!("Updated job metrics ID: {}.", metrics.id))
}

fn goal_type_from_arg(arg: GoalTypeArg) -> GoalType {
    match arg {
        GoalTypeArg::Yearly => GoalType::Yearly,
        GoalTypeArg::Quarterly => GoalType::Quarterly,
        GoalTypeArg::Monthly => GoalType::Monthly,
        GoalTypeArg::Weekly => GoalType::Weekly,
    }
}

fn goal_status_from_arg(arg: GoalStatusArg) -> GoalStatus {
    match arg {
        GoalStatusArg::Active => GoalStatus::Active,
        GoalStatusArg::Completed => GoalStatus::Completed,
        GoalStatusArg::Paused => GoalStatus::Paused,
    }
}

fn goal_priority_from_arg(arg: GoalPriorityArg) -> GoalPriority {
    match arg {
        GoalPriorityArg::High => GoalPriority::High,
        GoalPriorityArg::Medium => GoalPriority::Medium,
        GoalPriorityArg::Low => GoalPriority::Low,
    }
}

fn phase_from_arg(arg: PhaseArg) -> Phase {
    match arg {
        PhaseArg::Research => Phase::Research,
        PhaseArg::Mvp => Phase::Mvp,
        PhaseArg::Growth => Phase::Growth,
        PhaseArg::Scale => Phase::Scale,
        PhaseArg::Transition => Phase::Transition,
    }
}

fn timezone_from_arg(arg: TimezoneArg) -> Timezone {
    match arg {
        TimezoneArg::Utc => Timezone::Utc,
        TimezoneArg::Est => Timezone::Est,
        TimezoneArg::Pst => Timezone::Pst,
        TimezoneArg::Cst => Timezone::Cst,
        TimezoneArg::Mst => Timezone::Mst,
        TimezoneArg::Ist => Timezone::Ist,
    }
}

fn energy_profile_from_arg(arg: EnergyProfileArg) -> EnergyProfile {
    match arg {
        EnergyProfileArg::Morning => EnergyProfile::Morning,
        EnergyProfileArg::Afternoon => EnergyProfile::Afternoon,
        EnergyProfileArg::Evening => EnergyProfile::Evening,
    }
}

fn task_priority_from_arg(arg: TaskPriorityArg) -> TaskPriority {
    match arg {
        TaskPriorityArg::Urgent => TaskPriority::Urgent,
        TaskPriorityArg::High => TaskPriority::High,
        TaskPriorityArg::Medium => TaskPriority::Medium,
        TaskPriorityArg::Low => TaskPriority::Low,
    }
}

fn completion_status_from_arg(arg: CompletionStatusArg) -> CompletionStatus {
    match arg {
        CompletionStatusArg::Pending => CompletionStatus::Pending,
        CompletionStatusArg::InProgress => CompletionStatus::InProgress,
        CompletionStatusArg::Completed => CompletionStatus::Completed,
        CompletionStatusArg::Cancelled => CompletionStatus::Cancelled,
    }
}

fn energy_from_arg(arg: EnergyArg) -> EnergyRequired {
    match arg {
        EnergyArg::High => EnergyRequired::High,
        EnergyArg::Medium => EnergyRequired::Medium,
        EnergyArg::Low => EnergyRequired::Low,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_tasks(out: &Printer, tasks: &[task::Model], empty: &str) -> Result<(), AppError> {
    if out.json {
        return out.record(&tasks, String::new);
    }
    if tasks.is_empty() {
        println!("{empty}");
        return Ok(());
    }
    print_task_list(tasks);
    Ok(())
}

fn print_day_logs(out: &Printer, logs: &[day_log::Model]) -> Result<(), AppError> {
    if out.json {
        return out.record(&logs, String::new);
    }
    if logs.is_empty() {
        println!("No day logs found.");
        return Ok(());
    }
    print_day_log_list(logs);
    Ok(())
}

fn print_user_list(users: &[user::Model]) {
    println!("{:<12} {:<10} {:<8} {}", "ID", "PHASE", "TZ", "NAME");
    for user in users {
        println!(
            "{:<12} {:<10} {:<8} {}",
            user.telegram_id, user.current_phase, user.timezone, user.name
        );
    }
}

fn print_goal_list(goals: &[goal::Model]) {
    println!(
        "{:<4} {:<6} {:<10} {:<10} {:<7} {}",
        "ID", "PARENT", "TYPE", "STAT", "DONE", "DESCRIPTION"
    );
    for goal in goals {
        let parent = goal
            .parent_goal_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<6} {:<10} {:<10} {:<7} {}",
            goal.id,
            parent,
            goal.goal_type,
            goal.status,
            format_percentage(goal.completion_percentage),
            goal.description
        );
    }
}

fn print_task_list(tasks: &[task::Model]) {
    println!(
        "{:<4} {:<12} {:<7} {:<6} {}",
        "ID", "STAT", "PRIO", "GOAL", "DESCRIPTION"
    );
    for task in tasks {
        let goal = task
            .goal_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<12} {:<7} {:<6} {}",
            task.id, task.completion_status, task.priority, goal, task.description
        );
    }
}

fn print_progress_list(logs: &[progress_log::Model]) {
    println!(
        "{:<4} {:<10} {:<7} {:<4} {:<4} {}",
        "ID", "DATE", "TASKS", "MOOD", "NRG", "FOCUS"
    );
    for log in logs {
        println!(
            "{:<4} {:<10} {:<7} {:<4} {:<4} {}",
            log.id,
            log.date,
            format!("{}/{}", log.tasks_completed, log.tasks_planned),
            log.mood_score,
            log.energy_level,
            log.focus_score
        );
    }
}

fn print_ai_context_list(contexts: &[ai_context::Model]) {
    println!("{:<4} {:<12} {}", "ID", "USER", "UPDATED");
    for context in contexts {
        println!(
            "{:<4} {:<12} {}",
            context.id,
            context.user_id,
            format_datetime(context.last_updated)
        );
    }
}

fn print_day_log_list(logs: &[day_log::Model]) {
    println!("{:<4} {:<10} {:<12} {:<10} {}", "ID", "DATE", "LOCATION", "WEATHER", "SUMMARY");
    for log in logs {
        println!(
            "{:<4} {:<10} {:<12} {:<10} {}",
            log.id,
            log.date,
            log.location.as_deref().unwrap_or("-"),
            log.weather.as_deref().unwrap_or("-"),
            log.summary.as_deref().unwrap_or("")
        );
    }
}
