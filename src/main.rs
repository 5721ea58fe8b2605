use std::{
    io,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use jiff::{Timestamp, Zoned, civil::Date};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    models::{
        RecordId, parse_tags,
        comment::CommentDraft,
        project::{Attachment, ProjectDraft, ProjectStatus},
        task::{Priority, TaskDraft, TaskStatus},
        user::UserDraft,
    },
    records::{
        fixtures,
        memory::{Latency, MemoryRecordStore},
    },
    services::{
        ServiceError,
        comments::{
            create_comment, delete_comment, get_all_comments, get_comments_by_task,
            update_comment,
        },
        projects::{
            create_project, delete_project, get_all_projects, get_project, sync_completion,
            update_project,
        },
        tasks::{
            create_task, delete_task, get_all_tasks, get_task, get_tasks_by_project,
            search_tasks, update_task, update_task_due_date,
        },
        users::{create_user, delete_user, get_all_users, get_user, update_user},
    },
    session::Session,
    storage::{Storage, StorageError, json::JsonFileStorage},
    views::{
        calendar::{CalendarBoard, CalendarMode},
        dashboard::Dashboard,
        filter::{ProjectFilter, SortField, SortOrder, TaskFilter, group_by_status, sort_tasks},
        kanban::{DropOutcome, KanbanBoard},
        my_tasks::MyTasksView,
        state::ViewState,
        team::load_team,
        transition::{change_task_status, cycle_task_status},
    },
};

mod config;
mod models;
mod records;
mod services;
mod session;
mod storage;
mod ui;
mod views;

#[derive(Parser)]
#[command(
    name = "taskboard",
    about = "Projects, tasks and a kanban board in your terminal"
)]
struct Cli {
    /// Snapshot file to use instead of TASKBOARD_STORE
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show project and task statistics (default)
    Dashboard,

    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectCommands),

    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommands),

    /// Kanban board of a project
    #[command(subcommand)]
    Board(BoardCommands),

    /// Task due dates and project deadlines on a calendar
    #[command(subcommand)]
    Calendar(CalendarCommands),

    /// Show team workload
    Team,

    /// Manage team members
    #[command(subcommand)]
    Users(UserCommands),

    /// Comments on a task
    #[command(subcommand)]
    Comments(CommentCommands),
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// List projects
    List {
        /// Only projects whose title or description contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Only projects with this status (e.g., "active", "on hold")
        #[arg(short, long)]
        status: Option<ProjectStatus>,
    },
    /// Create a new project
    New {
        title: String,

        #[arg(short, long)]
        description: String,

        /// Deadline (e.g., "2026-12-01")
        #[arg(long)]
        deadline: Date,

        #[arg(short, long, default_value = "planning")]
        status: ProjectStatus,

        /// Attach a file (can be used multiple times)
        #[arg(short, long, action = ArgAction::Append)]
        attach: Vec<PathBuf>,
    },
    /// Change a project. Options left out keep their current value.
    Edit {
        id: RecordId,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        deadline: Option<Date>,

        #[arg(short, long)]
        status: Option<ProjectStatus>,

        /// Attach another file (can be used multiple times)
        #[arg(short, long, action = ArgAction::Append)]
        attach: Vec<PathBuf>,

        /// Remove every attachment before adding new ones
        #[arg(long)]
        clear_attachments: bool,
    },
    /// Show a project with its tasks
    Show { id: RecordId },
    /// Delete a project. Its tasks are kept.
    Delete { id: RecordId },
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// Free-text search over title, description and tags
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long)]
        status: Option<TaskStatus>,

        #[arg(short, long)]
        priority: Option<Priority>,

        /// Only tasks past their due date
        #[arg(long)]
        overdue: bool,

        /// Only tasks assigned to you
        #[arg(long)]
        mine: bool,

        /// Only tasks of this project
        #[arg(long)]
        project: Option<RecordId>,

        #[arg(long, value_enum, default_value_t)]
        sort: SortField,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Create a new task
    New {
        title: String,

        /// Project the task belongs to
        #[arg(long)]
        project: RecordId,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(short, long, default_value = "to do")]
        status: TaskStatus,

        /// Due date (e.g., "2026-11-02")
        #[arg(long)]
        due: Option<Date>,

        /// User the task is assigned to
        #[arg(short, long)]
        assignee: Option<RecordId>,

        /// Add tags, comma separated or repeated
        #[arg(short, long, action = ArgAction::Append)]
        tag: Vec<String>,
    },
    /// Change a task. Options left out keep their current value.
    Edit {
        id: RecordId,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        /// Move the task to another project
        #[arg(long)]
        project: Option<RecordId>,

        #[arg(long)]
        due: Option<Date>,

        #[arg(short, long, conflicts_with = "unassign")]
        assignee: Option<RecordId>,

        /// Remove the assignee
        #[arg(long)]
        unassign: bool,

        /// Replace the tags, comma separated or repeated
        #[arg(short, long, action = ArgAction::Append)]
        tag: Vec<String>,
    },
    /// Set the status of a task
    Status { id: RecordId, status: TaskStatus },
    /// Advance a task to its next status
    Cycle { id: RecordId },
    /// Set the due date of a task, or clear it when no date is given
    Due { id: RecordId, date: Option<Date> },
    /// Delete a task
    Delete { id: RecordId },
}

#[derive(Debug, Subcommand)]
enum BoardCommands {
    /// Show the board of a project
    Show {
        project: RecordId,

        /// Highlight a column, as when a card hovers over it
        #[arg(long)]
        over: Option<TaskStatus>,
    },
    /// Drop a task onto a status column
    Drop {
        project: RecordId,
        task: RecordId,
        status: TaskStatus,
    },
}

#[derive(Debug, Subcommand)]
enum CalendarCommands {
    /// Show the calendar around a date
    Show {
        /// Reference date, today by default
        date: Option<Date>,

        #[arg(short, long, value_enum, default_value_t)]
        mode: CalendarMode,

        /// Move forward (or backward when negative) by this many months, weeks or days
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Reschedule a task to another day
    Move { task: RecordId, date: Date },
    /// Create a task due on a day
    New {
        date: Date,
        title: String,

        #[arg(long)]
        project: RecordId,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(short, long)]
        assignee: Option<RecordId>,
    },
}

#[derive(Debug, Subcommand)]
enum CommentCommands {
    /// List the comments of a task, or every comment
    List { task: Option<RecordId> },
    /// Comment on a task as the current user
    Add { task: RecordId, content: String },
    /// Replace the text of a comment
    Edit { id: RecordId, content: String },
    /// Delete a comment
    Delete { id: RecordId },
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// List team members
    List,
    /// Add a team member
    New {
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, default_value = "")]
        role: String,

        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Change a team member. Options left out keep their current value.
    Edit {
        id: RecordId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        role: Option<String>,

        #[arg(long)]
        avatar: Option<String>,
    },
    /// Remove a team member. Their tasks stay assigned to the old id.
    Delete { id: RecordId },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to create data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read attachment '{path}': {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load tasks: {0}")]
    Load(String),

    #[error("Task {task} is not on the board of project {project}")]
    NotOnBoard { task: RecordId, project: RecordId },
}

/// Everything a command needs
struct App {
    store: MemoryRecordStore,
    storage: JsonFileStorage,
    session: Session,
    today: Date,
}

impl App {
    fn open(config: &Config) -> Result<Self, CliError> {
        if let Some(parent) = config.store_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CliError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let storage = JsonFileStorage::new(config.store_path.clone());
        let snapshot = match storage.load()? {
            Some(snapshot) => snapshot,
            None => {
                info!(path = %config.store_path.display(), "no snapshot yet, starting from sample data");
                fixtures::seed()
            }
        };
        let latency = if config.simulate_latency {
            Latency::simulated()
        } else {
            Latency::none()
        };

        Ok(Self {
            store: MemoryRecordStore::from_snapshot(snapshot, latency),
            storage,
            session: Session::new(config.user_id),
            today: Zoned::now().date(),
        })
    }

    /// Writes the current collections back to disk
    async fn persist(&self) -> Result<(), CliError> {
        self.storage.save(&self.store.snapshot().await)?;
        debug!(path = %self.storage.path().display(), "snapshot saved");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.store {
        config.store_path = path;
    }

    let result = match App::open(&config) {
        Ok(app) => run(&app, cli.command.unwrap_or(Commands::Dashboard)).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e {
            CliError::Service(ServiceError::Validation(errors)) => {
                eprintln!("Error: Please fix the following fields:");
                for error in errors.errors() {
                    eprintln!("  - {}: {}", error.field, error.message);
                }
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

async fn run(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Dashboard => {
            let dashboard =
                Dashboard::load(&app.store, &app.session, app.today, Timestamp::now()).await?;
            let user = get_user(&app.store, app.session.user_id).await.ok();
            ui::render_dashboard(&dashboard, user.as_ref(), app.today);
        }
        Commands::Projects(command) => run_projects(app, command).await?,
        Commands::Tasks(command) => run_tasks(app, command).await?,
        Commands::Board(BoardCommands::Show { project, over }) => {
            let mut board = KanbanBoard::load(&app.store, project).await?;
            if let Some(status) = over {
                board.drag_over(status);
            }
            ui::render_board(&board, app.today);
        }
        Commands::Board(BoardCommands::Drop {
            project,
            task,
            status,
        }) => {
            let mut board = KanbanBoard::load(&app.store, project).await?;
            if !board.drag_start(task) {
                return Err(CliError::NotOnBoard { task, project });
            }
            board.drag_over(status);
            match board.drop_on(&app.store, status).await? {
                DropOutcome::Moved(task) => {
                    app.persist().await?;
                    ui::render_notice(&format!("Moved '{}' to {}", task.title, task.status));
                }
                DropOutcome::Unchanged => println!("Task is already in {}", status),
                DropOutcome::NothingDragged => {}
            }
            ui::render_board(&board, app.today);
        }
        Commands::Calendar(command) => run_calendar(app, command).await?,
        Commands::Team => {
            let team = load_team(&app.store).await?;
            if team.is_empty() {
                println!("No team members found");
            } else {
                ui::render_team(&team);
            }
        }
        Commands::Users(command) => run_users(app, command).await?,
        Commands::Comments(CommentCommands::List { task: Some(task) }) => {
            let task = get_task(&app.store, task).await?;
            let (comments, users) = tokio::try_join!(
                get_comments_by_task(&app.store, task.id),
                get_all_users(&app.store),
            )?;
            println!("\n  {}", task.title.bold());
            if comments.is_empty() {
                println!("\n  No comments yet\n");
            } else {
                ui::render_comments(&comments, &users);
            }
        }
        Commands::Comments(CommentCommands::List { task: None }) => {
            let (comments, users) =
                tokio::try_join!(get_all_comments(&app.store), get_all_users(&app.store))?;
            if comments.is_empty() {
                println!("No comments found");
            } else {
                ui::render_comments(&comments, &users);
            }
        }
        Commands::Comments(CommentCommands::Edit { id, content }) => {
            let comment = update_comment(&app.store, id, &content).await?;
            app.persist().await?;
            ui::render_notice(&format!("Updated comment {}", comment.id));
        }
        Commands::Comments(CommentCommands::Delete { id }) => {
            delete_comment(&app.store, id).await?;
            app.persist().await?;
            ui::render_notice(&format!("Deleted comment {}", id));
        }
        Commands::Comments(CommentCommands::Add { task, content }) => {
            let task = get_task(&app.store, task).await?;
            let draft = CommentDraft {
                task_id: task.id,
                content,
            };
            create_comment(&app.store, &app.session, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Commented on '{}'", task.title));
        }
    }
    Ok(())
}

async fn run_projects(app: &App, command: ProjectCommands) -> Result<(), CliError> {
    match command {
        ProjectCommands::List { query, status } => {
            let projects = get_all_projects(&app.store).await?;
            let filter = ProjectFilter { query, status };
            let mut visible = filter.apply(&projects);
            visible.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

            if visible.is_empty() {
                println!("No projects found");
            } else {
                ui::render_view_header("Projects", visible.len(), ("project", "projects"));
                for project in visible {
                    ui::render_project_line(project, app.today);
                }
                println!();
            }
        }
        ProjectCommands::New {
            title,
            description,
            deadline,
            status,
            attach,
        } => {
            let attachments = attach
                .iter()
                .map(|path| read_attachment(path))
                .collect::<Result<Vec<_>, _>>()?;
            let draft = ProjectDraft {
                title,
                description,
                status,
                deadline: Some(deadline),
                attachments,
            };
            let project = create_project(&app.store, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Created project '{}' ({})", project.title, project.id));
        }
        ProjectCommands::Edit {
            id,
            title,
            description,
            deadline,
            status,
            attach,
            clear_attachments,
        } => {
            let current = get_project(&app.store, id).await?;
            let mut draft = ProjectDraft::from(&current);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if deadline.is_some() {
                draft.deadline = deadline;
            }
            if let Some(status) = status {
                draft.status = status;
            }
            if clear_attachments {
                draft.attachments.clear();
            }
            for path in &attach {
                draft.attachments.push(read_attachment(path)?);
            }

            let project = update_project(&app.store, id, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Updated project '{}'", project.title));
        }
        ProjectCommands::Show { id } => {
            let (project, tasks) =
                tokio::try_join!(get_project(&app.store, id), get_tasks_by_project(&app.store, id))?;
            ui::render_project_details(&project, app.today);

            let refs: Vec<_> = tasks.iter().collect();
            if refs.is_empty() {
                println!("\n  No tasks yet\n");
            }
            for (status, group) in group_by_status(&refs) {
                ui::render_section_header(&format!("{} ({})", status, group.len()));
                for task in group {
                    ui::render_task_line(task, None, app.today);
                }
            }
            println!();
        }
        ProjectCommands::Delete { id } => {
            let (project, tasks) =
                tokio::try_join!(get_project(&app.store, id), get_tasks_by_project(&app.store, id))?;
            delete_project(&app.store, id).await?;
            app.persist().await?;
            ui::render_notice(&format!("Deleted project '{}'", project.title));
            if !tasks.is_empty() {
                println!(
                    "  {}",
                    format!(
                        "{} {} still reference it",
                        tasks.len(),
                        if tasks.len() == 1 { "task" } else { "tasks" }
                    )
                    .dimmed()
                );
            }
        }
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<Attachment, CliError> {
    let metadata = std::fs::metadata(path).map_err(|source| CliError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Attachment::from_file(&name, metadata.len()))
}

/// The task's board, so a status change can update the project's completion
async fn board_for_task(app: &App, id: RecordId) -> Result<KanbanBoard, CliError> {
    let task = get_task(&app.store, id).await?;
    let Some(project_id) = task.project_id else {
        return Ok(KanbanBoard::new(None, vec![task]));
    };
    match KanbanBoard::load(&app.store, project_id).await {
        Ok(board) => Ok(board),
        // The project is gone but its tasks live on
        Err(ServiceError::NotFound { .. }) => Ok(KanbanBoard::new(None, vec![task])),
        Err(e) => Err(e.into()),
    }
}

/// Recomputes a project's completion after a task moved in or out of it
async fn resync_completion(app: &App, project_id: RecordId) -> Result<(), CliError> {
    match KanbanBoard::load(&app.store, project_id).await {
        Ok(board) => {
            if let Some(project) = &board.project {
                sync_completion(&app.store, project, &board.tasks).await?;
            }
            Ok(())
        }
        // Tasks of a deleted project have no completion to keep current
        Err(ServiceError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn run_tasks(app: &App, command: TaskCommands) -> Result<(), CliError> {
    match command {
        TaskCommands::List {
            query,
            status,
            priority,
            overdue,
            mine,
            project,
            sort,
            desc,
        } => {
            let filter = TaskFilter {
                query: query.clone(),
                status,
                priority,
                overdue_only: overdue,
            };
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };

            if mine {
                let mut view = MyTasksView::new();
                view.filter = filter;
                view.sort = (sort, order);
                view.load(&app.store, &app.session).await;
                match &view.state {
                    ViewState::Failed { message } => return Err(CliError::Load(message.clone())),
                    ViewState::Empty | ViewState::Loading => println!("No tasks assigned to you"),
                    ViewState::Loaded(data) => {
                        let groups = view.groups(app.today);
                        let count: usize = groups.iter().map(|(_, g)| g.len()).sum();
                        let title = match data.user_name(Some(app.session.user_id)) {
                            Some(name) => format!("Tasks for {}", name),
                            None => "My tasks".to_string(),
                        };
                        ui::render_view_header(&title, count, ("task", "tasks"));
                        for (status, tasks) in groups {
                            ui::render_section_header(status.label());
                            for task in tasks {
                                ui::render_task_line(
                                    task,
                                    data.project_title(task.project_id),
                                    app.today,
                                );
                            }
                        }
                        println!();
                    }
                }
                return Ok(());
            }

            let source = async {
                match (project, query.as_deref()) {
                    (Some(project_id), _) => get_tasks_by_project(&app.store, project_id).await,
                    (None, Some(q)) if !q.trim().is_empty() => search_tasks(&app.store, q.trim()).await,
                    _ => get_all_tasks(&app.store).await,
                }
            };
            let (tasks, projects) = tokio::try_join!(source, get_all_projects(&app.store))?;

            let mut visible = filter.apply(&tasks, app.today);
            sort_tasks(&mut visible, sort, order);

            if visible.is_empty() {
                println!("No tasks found");
            } else {
                ui::render_view_header("Tasks", visible.len(), ("task", "tasks"));
                for task in visible {
                    let context = task
                        .project_id
                        .and_then(|id| projects.iter().find(|p| p.id == id))
                        .map(|p| p.title.as_str());
                    ui::render_task_line(task, context, app.today);
                }
                println!();
            }
        }
        TaskCommands::New {
            title,
            project,
            description,
            priority,
            status,
            due,
            assignee,
            tag,
        } => {
            let draft = TaskDraft {
                title,
                description,
                status,
                priority,
                due_date: due,
                project_id: Some(project),
                assignee_id: assignee,
                tags: tag.iter().flat_map(|t| parse_tags(t)).collect(),
            };
            let task = create_task(&app.store, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Created task '{}' ({})", task.title, task.id));
        }
        TaskCommands::Edit {
            id,
            title,
            description,
            priority,
            project,
            due,
            assignee,
            unassign,
            tag,
        } => {
            let current = get_task(&app.store, id).await?;
            let mut draft = TaskDraft::from(&current);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            if project.is_some() {
                draft.project_id = project;
            }
            if due.is_some() {
                draft.due_date = due;
            }
            if unassign {
                draft.assignee_id = None;
            } else if assignee.is_some() {
                draft.assignee_id = assignee;
            }
            if !tag.is_empty() {
                draft.tags = tag.iter().flat_map(|t| parse_tags(t)).collect();
            }

            let task = update_task(&app.store, id, draft).await?;
            if task.project_id != current.project_id {
                for project_id in [current.project_id, task.project_id].into_iter().flatten() {
                    resync_completion(app, project_id).await?;
                }
            }
            app.persist().await?;
            ui::render_notice(&format!("Updated task '{}'", task.title));
        }
        TaskCommands::Status { id, status } => {
            let mut board = board_for_task(app, id).await?;
            let task =
                change_task_status(&app.store, &mut board.tasks, board.project.as_mut(), id, status)
                    .await?;
            app.persist().await?;
            ui::render_notice(&format!("'{}' is now {}", task.title, task.status));
        }
        TaskCommands::Cycle { id } => {
            let mut board = board_for_task(app, id).await?;
            let task = cycle_task_status(&app.store, &mut board.tasks, board.project.as_mut(), id)
                .await?;
            app.persist().await?;
            ui::render_notice(&format!("'{}' is now {}", task.title, task.status));
        }
        TaskCommands::Due { id, date } => {
            let task = update_task_due_date(&app.store, id, date).await?;
            app.persist().await?;
            match task.due_date {
                Some(due) => ui::render_notice(&format!(
                    "'{}' is due {}",
                    task.title,
                    ui::format_due(due, app.today)
                )),
                None => ui::render_notice(&format!("'{}' has no due date", task.title)),
            }
        }
        TaskCommands::Delete { id } => {
            let task = get_task(&app.store, id).await?;
            delete_task(&app.store, id).await?;
            app.persist().await?;
            ui::render_notice(&format!("Deleted task '{}'", task.title));
        }
    }
    Ok(())
}

async fn run_calendar(app: &App, command: CalendarCommands) -> Result<(), CliError> {
    match command {
        CalendarCommands::Show { date, mode, offset } => {
            let mut board = CalendarBoard::new(date.unwrap_or(app.today), mode, app.today);
            board.navigate(i64::from(offset));
            board.load(&app.store).await?;
            ui::render_calendar(&board);
        }
        CalendarCommands::Move { task, date } => {
            let current = get_task(&app.store, task).await?;
            let reference = current.due_date.unwrap_or(date);
            let mut board = CalendarBoard::new(reference, CalendarMode::Day, app.today);
            board.load(&app.store).await?;

            if !board.drag_start(&format!("task-{task}")) {
                // No due date yet, so there is no event to drag
                let moved = update_task_due_date(&app.store, task, Some(date)).await?;
                app.persist().await?;
                ui::render_notice(&format!("Scheduled '{}' on {}", moved.title, date));
                return Ok(());
            }
            match board.drop_on(&app.store, date).await? {
                DropOutcome::Moved(moved) => {
                    app.persist().await?;
                    ui::render_notice(&format!("Moved '{}' to {}", moved.title, date));
                }
                DropOutcome::Unchanged => println!("Task is already due on {}", date),
                DropOutcome::NothingDragged => {}
            }
        }
        CalendarCommands::New {
            date,
            title,
            project,
            priority,
            assignee,
        } => {
            let mut board = CalendarBoard::new(date, CalendarMode::Week, app.today);
            let draft = TaskDraft {
                title,
                priority,
                project_id: Some(project),
                assignee_id: assignee,
                ..TaskDraft::default()
            };
            let task = board.create_task(&app.store, date, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Created task '{}' due {}", task.title, date));
            ui::render_calendar(&board);
        }
    }
    Ok(())
}

async fn run_users(app: &App, command: UserCommands) -> Result<(), CliError> {
    match command {
        UserCommands::List => {
            let users = get_all_users(&app.store).await?;
            if users.is_empty() {
                println!("No team members found");
            } else {
                ui::render_users(&users);
            }
        }
        UserCommands::New {
            name,
            email,
            role,
            avatar,
        } => {
            let draft = UserDraft {
                name,
                email,
                avatar,
                role,
            };
            let user = create_user(&app.store, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Added '{}' ({})", user.name, user.id));
        }
        UserCommands::Edit {
            id,
            name,
            email,
            role,
            avatar,
        } => {
            let current = get_user(&app.store, id).await?;
            let draft = UserDraft {
                name: name.unwrap_or(current.name),
                email: email.unwrap_or(current.email),
                avatar: avatar.or(current.avatar),
                role: role.unwrap_or(current.role),
            };
            let user = update_user(&app.store, id, draft).await?;
            app.persist().await?;
            ui::render_notice(&format!("Updated '{}'", user.name));
        }
        UserCommands::Delete { id } => {
            let user = get_user(&app.store, id).await?;
            delete_user(&app.store, id).await?;
            app.persist().await?;
            ui::render_notice(&format!("Removed '{}'", user.name));
        }
    }
    Ok(())
}
