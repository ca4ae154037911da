use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskflow_client::{
    config::Config,
    model::{Project, ProjectStatus, Task, TaskPriority},
    route::{History, Navigator, Route},
    schema::{CreateProjectSchema, CreateTaskSchema},
    AppState,
};

#[derive(Parser)]
#[command(name = "taskflow", about = "Manage TaskFlow projects and tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the API is up
    Health,
    /// Sign in with an email (or username) and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    #[command(subcommand)]
    Projects(ProjectCommand),
    #[command(subcommand)]
    Tasks(TaskCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List active projects, or archived ones with --archived
    List {
        #[arg(long)]
        archived: bool,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "not-started")]
        status: ProjectStatus,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Move a project to another status; `done` archives it
    Status {
        id: i64,
        status: ProjectStatus,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        project: Option<i64>,
    },
    /// Mark a task completed, or open again with --undo
    Complete {
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    Delete {
        id: i64,
    },
}

impl Command {
    // Route the equivalent screen lives at
    fn route(&self) -> Route {
        match self {
            Command::Login { .. } | Command::Logout | Command::Whoami | Command::Health => {
                Route::Login
            }
            Command::Register { .. } => Route::Register,
            Command::Projects(ProjectCommand::List { archived: true }) => Route::ArchivedProjects,
            Command::Projects(ProjectCommand::Create { .. }) => Route::NewProject,
            Command::Projects(ProjectCommand::Status { id, .. }) => Route::EditProject(*id),
            Command::Projects(_) => Route::Projects,
            Command::Tasks(TaskCommand::Create { .. }) => Route::NewTask,
            Command::Tasks(TaskCommand::Complete { id, .. }) => Route::EditTask(*id),
            Command::Tasks(_) => Route::Tasks,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Invalid configuration")?;

    let requested = cli.command.route();
    let history = Arc::new(History::new(requested.path()));
    let app = AppState::open(config, history.clone())
        .await
        .context("Failed to open the session store")?;

    if !requested.is_public()
        && Route::resolve(&requested.path(), app.session.is_authenticated()) == Route::Login
    {
        bail!("Not signed in. Run `taskflow login` first.");
    }

    let result = run(&app, cli.command).await;

    if history.navigations() > 0 && Route::parse(&history.current()) == Some(Route::Login) {
        eprintln!("Your session has expired. Run `taskflow login` to sign in again.");
    }
    result
}

async fn run(app: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Health => {
            let health = app.health().check().await.context("API is unreachable")?;
            println!("{} ({})", health.status, app.config.api_url);
        }
        Command::Login { email, password } => {
            app.auth().sign_in(&email, &password, &app.session).await?;
            println!("Signed in.");
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            app.auth()
                .sign_up(&username, &email, &password, &app.session)
                .await?;
            println!("Account created, signed in as {username}.");
        }
        Command::Logout => {
            app.session.logout().await;
            println!("Signed out.");
        }
        Command::Whoami => match (app.session.is_authenticated(), app.session.subject()) {
            (true, Some(subject)) => println!("{subject}"),
            (true, None) => println!("Signed in."),
            (false, _) => println!("Not signed in."),
        },
        Command::Projects(command) => run_projects(app, command).await?,
        Command::Tasks(command) => run_tasks(app, command).await?,
    }
    Ok(())
}

async fn run_projects(app: &AppState, command: ProjectCommand) -> Result<()> {
    let projects = app.projects();
    match command {
        ProjectCommand::List { archived } => {
            let list = if archived {
                projects.list_archived().await
            } else {
                projects.list_active().await
            }
            .context("Failed to load projects")?;

            if list.is_empty() {
                println!("No {} projects", if archived { "archived" } else { "active" });
            }
            for project in &list {
                print_project(project);
            }
        }
        ProjectCommand::Show { id } => {
            let project = projects.get(id).await.context("Failed to load project")?;
            print_project(&project);
            if let Some(description) = &project.description {
                println!("    {description}");
            }
        }
        ProjectCommand::Create {
            name,
            description,
            status,
            start,
            end,
        } => {
            let project = projects
                .create(&CreateProjectSchema {
                    name,
                    description,
                    status,
                    start_date: start,
                    end_date: end,
                })
                .await
                .context("Failed to save project")?;
            print_project(&project);
        }
        ProjectCommand::Status { id, status } => {
            let project = projects
                .set_status(id, status)
                .await
                .context("Failed to update project status")?;
            print_project(&project);
        }
        ProjectCommand::Delete { id } => {
            projects.delete(id).await.context("Failed to delete project")?;
            println!("Deleted project #{id}");
        }
    }
    Ok(())
}

async fn run_tasks(app: &AppState, command: TaskCommand) -> Result<()> {
    let tasks = app.tasks();
    match command {
        TaskCommand::List => {
            let list = tasks.list().await.context("Failed to load tasks")?;
            if list.is_empty() {
                println!("No tasks");
            }
            for task in &list {
                print_task(task);
            }
        }
        TaskCommand::Show { id } => {
            let task = tasks.get(id).await.context("Failed to load task")?;
            print_task(&task);
            if let Some(description) = &task.description {
                println!("    {description}");
            }
        }
        TaskCommand::Create {
            title,
            description,
            priority,
            due,
            project,
        } => {
            let task = tasks
                .create(&CreateTaskSchema {
                    title,
                    description,
                    completed: false,
                    priority,
                    due_date: due,
                    project_id: project,
                })
                .await
                .context("Failed to save task")?;
            print_task(&task);
        }
        TaskCommand::Complete { id, undo } => {
            let task = tasks
                .set_completed(id, !undo)
                .await
                .context("Failed to update task status")?;
            print_task(&task);
        }
        TaskCommand::Delete { id } => {
            tasks.delete(id).await.context("Failed to delete task")?;
            println!("Deleted task #{id}");
        }
    }
    Ok(())
}

fn print_project(project: &Project) {
    let dates = match (project.start_date, project.end_date) {
        (Some(start), Some(end)) => format!("  {start} → {end}"),
        _ => String::new(),
    };
    println!(
        "#{:<4} {:<32} [{}]{dates}",
        project.id,
        project.name,
        project.status.badge().label
    );
}

fn print_task(task: &Task) {
    let due = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "No due date".to_string());
    let project = task
        .project_id
        .map(|id| format!("  project #{id}"))
        .unwrap_or_default();
    println!(
        "#{:<4} {:<32} [{}] [{}] {due}{project}",
        task.id,
        task.title,
        task.priority.badge().label,
        task.status_badge().label
    );
}
