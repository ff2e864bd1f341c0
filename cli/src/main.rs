mod config;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DbPool, connect};
use platform_obs::init_tracing;
use products_crm::{
    ActivityResult, InteractionKind, NewInteraction, Note, Tag, Task, TaskKind, TaskPriority,
    TaskStatus,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "crm", version, about = "Sales pipeline CRM")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Load demo funnels, customers and tasks for an owner.
    Seed(OwnerArgs),
    /// List the owner's funnels.
    Funnels {
        #[command(flatten)]
        owner: OwnerArgs,
        /// Include deactivated funnels.
        #[arg(long)]
        all: bool,
    },
    /// List every customer past its stage SLA in an active funnel, most
    /// overdue first.
    Overdue(OwnerArgs),
    /// Per-stage counts, overdue rate and average time in stage for a funnel.
    #[command(name = "funnel-report")]
    FunnelReport {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        funnel: Uuid,
    },
    /// SLA standing, next action and score for a single customer.
    Insight {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        customer: Uuid,
    },
    /// Record a call, meeting or message with a customer.
    #[command(name = "log-activity")]
    LogActivity(LogActivityArgs),
    /// Customer notes.
    #[command(subcommand)]
    Note(NoteCommand),
    /// Customer tags.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Task board.
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Args, Debug)]
struct LogActivityArgs {
    #[command(flatten)]
    owner: OwnerArgs,
    #[arg(long, value_name = "UUID")]
    customer: Uuid,
    #[arg(long, default_value = "note")]
    kind: InteractionKind,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    result: Option<ActivityResult>,
    #[arg(long, value_name = "MINUTES")]
    minutes: Option<u32>,
    /// Task this interaction belongs to.
    #[arg(long, value_name = "UUID")]
    task: Option<Uuid>,
}

#[derive(Subcommand, Debug)]
enum NoteCommand {
    Add {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        customer: Uuid,
        #[arg(long)]
        title: Option<String>,
        content: String,
    },
    /// Notes on a customer, pinned first.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        customer: Uuid,
    },
    Pin {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        note: Uuid,
        /// Unpin instead.
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    Add {
        #[command(flatten)]
        owner: OwnerArgs,
        name: String,
        #[arg(long, value_name = "HEX")]
        color: Option<String>,
    },
    List(OwnerArgs),
    /// Attach a tag to a customer.
    Attach {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        customer: Uuid,
        #[arg(long, value_name = "UUID")]
        tag: Uuid,
    },
    /// Remove a tag from a customer.
    Detach {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        customer: Uuid,
        #[arg(long, value_name = "UUID")]
        tag: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add(TaskAddArgs),
    List {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Move a task to another board column.
    Move {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long, value_name = "UUID")]
        task: Uuid,
        #[arg(long)]
        to: TaskStatus,
    },
}

#[derive(Args, Debug)]
struct TaskAddArgs {
    #[command(flatten)]
    owner: OwnerArgs,
    title: String,
    /// RFC 3339 timestamp, e.g. 2025-09-01T15:00:00Z.
    #[arg(long)]
    due: DateTime<Utc>,
    #[arg(long, value_name = "UUID")]
    customer: Option<Uuid>,
    #[arg(long, default_value = "follow_up")]
    kind: TaskKind,
    #[arg(long, default_value = "medium")]
    priority: TaskPriority,
    #[arg(long, value_name = "MINUTES")]
    estimate: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long, value_name = "UUID", env = "CRM_OWNER")]
    owner: Uuid,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(config.observability())?;
    let pool = connect(&config.database()).await?;

    match cli.command {
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up(&pool).await,
            MigrateCommand::Down => migrate_down(&pool).await,
        },
        Command::Seed(args) => {
            ensure_migrated(&pool).await?;
            let summary = platform_db::seed_demo(&pool, args.owner, Utc::now()).await?;
            print_json(&summary)
        }
        Command::Funnels { owner, all } => {
            let funnels = platform_db::list_funnels(&pool, owner.owner, !all).await?;
            print_json(&funnels)
        }
        Command::Overdue(args) => {
            let overdue = platform_db::overdue_customers(&pool, args.owner, Utc::now()).await?;
            print_json(&overdue)
        }
        Command::FunnelReport { owner, funnel } => {
            let report = platform_db::funnel_report(&pool, owner.owner, funnel, Utc::now()).await?;
            print_json(&report)
        }
        Command::Insight { owner, customer } => {
            let insight =
                platform_db::customer_insight(&pool, owner.owner, customer, Utc::now()).await?;
            print_json(&insight)
        }
        Command::LogActivity(args) => {
            let owner = args.owner.owner;
            let customer = args.customer;
            let input = args.into_interaction();
            let entry =
                platform_db::log_activity(&pool, owner, customer, input, owner, Utc::now()).await?;
            print_json(&entry)
        }
        Command::Note(action) => run_note(&pool, action).await,
        Command::Tag(action) => run_tag(&pool, action).await,
        Command::Task(action) => run_task(&pool, action).await,
    }
}

impl LogActivityArgs {
    fn into_interaction(self) -> NewInteraction {
        NewInteraction {
            kind: self.kind,
            title: self.title,
            description: self.description,
            result: self.result,
            duration_minutes: self.minutes,
            task_id: self.task,
            occurred_at: None,
        }
    }
}

impl TaskAddArgs {
    fn into_task(self) -> Result<Task> {
        let mut task = Task::new(self.owner.owner, &self.title, self.due)?;
        task.customer_id = self.customer;
        task.kind = self.kind;
        task.priority = self.priority;
        task.estimated_minutes = self.estimate;
        Ok(task)
    }
}

async fn run_note(pool: &DbPool, action: NoteCommand) -> Result<()> {
    let now = Utc::now();
    match action {
        NoteCommand::Add {
            owner,
            customer,
            title,
            content,
        } => {
            let note = Note::new(owner.owner, customer, title.as_deref(), &content, now)?;
            platform_db::add_note(pool, &note).await?;
            print_json(&note)
        }
        NoteCommand::List { owner, customer } => {
            let notes = platform_db::customer_notes(pool, owner.owner, customer).await?;
            print_json(&notes)
        }
        NoteCommand::Pin { owner, note, off } => {
            let note = platform_db::pin_note(pool, owner.owner, note, !off, now).await?;
            print_json(&note)
        }
    }
}

async fn run_tag(pool: &DbPool, action: TagCommand) -> Result<()> {
    match action {
        TagCommand::Add { owner, name, color } => {
            let tag = Tag::new(owner.owner, &name, color.as_deref())?;
            platform_db::create_tag(pool, &tag, Utc::now()).await?;
            print_json(&tag)
        }
        TagCommand::List(owner) => {
            let tags = platform_db::list_tags(pool, owner.owner).await?;
            print_json(&tags)
        }
        TagCommand::Attach {
            owner,
            customer,
            tag,
        } => {
            platform_db::tag_customer(pool, owner.owner, customer, tag).await?;
            let tags = platform_db::customer_tags(pool, owner.owner, customer).await?;
            print_json(&tags)
        }
        TagCommand::Detach {
            owner,
            customer,
            tag,
        } => {
            platform_db::untag_customer(pool, owner.owner, customer, tag).await?;
            let tags = platform_db::customer_tags(pool, owner.owner, customer).await?;
            print_json(&tags)
        }
    }
}

async fn run_task(pool: &DbPool, action: TaskCommand) -> Result<()> {
    let now = Utc::now();
    match action {
        TaskCommand::Add(args) => {
            let task = args.into_task()?;
            platform_db::create_task(pool, &task, now).await?;
            print_json(&task)
        }
        TaskCommand::List { owner, status } => {
            let tasks = platform_db::list_tasks(pool, owner.owner, status).await?;
            print_json(&tasks)
        }
        TaskCommand::Move { owner, task, to } => {
            let moved =
                platform_db::set_task_status(pool, owner.owner, task, to, owner.owner, now).await?;
            print_json(&moved)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn ensure_migrated(pool: &DbPool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() {
        anyhow::bail!("pending migrations detected; run `crm migrate up` first");
    }
    Ok(())
}

async fn migrate_up(pool: &DbPool) -> Result<()> {
    Migrator::up(pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down(pool: &DbPool) -> Result<()> {
    Migrator::down(pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
