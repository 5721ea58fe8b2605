use colored::*;
use jiff::civil::Date;

use crate::{
    models::{
        calendar::{CalendarEvent, EventKind},
        comment::Comment,
        project::{Project, ProjectStatus},
        task::{Priority, Task, TaskStatus},
        user::User,
    },
    views::{
        calendar::{CalendarBoard, CalendarMode},
        dashboard::Dashboard,
        filter::count_by_status,
        kanban::KanbanBoard,
        team::{TeamMember, Workload},
    },
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// Get the glyph for a task's status
pub fn get_status_glyph(task: &Task, today: Date) -> ColoredString {
    match task.status {
        TaskStatus::Done => "✓".dimmed(),
        _ if task.is_overdue(today) => "●".red(),
        TaskStatus::InProgress => "◐".yellow(),
        TaskStatus::Review => "◑".blue(),
        TaskStatus::ToDo => "○".normal(),
    }
}

pub fn priority_badge(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => "!!!".red().bold(),
        Priority::High => "!!".red(),
        Priority::Medium => "!".yellow(),
        Priority::Low => "·".dimmed(),
    }
}

pub fn project_status_badge(status: ProjectStatus) -> ColoredString {
    let label = format!("[{}]", status.label());
    match status {
        ProjectStatus::Active => label.green(),
        ProjectStatus::Planning => label.cyan(),
        ProjectStatus::OnHold => label.yellow(),
        ProjectStatus::Completed => label.dimmed(),
    }
}

/// Format a due date relative to today (e.g., "Today", "Tomorrow", "Oct 14")
pub fn format_due(date: Date, today: Date) -> String {
    if date == today {
        "Today".to_string()
    } else if today.tomorrow().is_ok_and(|tomorrow| tomorrow == date) {
        "Tomorrow".to_string()
    } else if today.yesterday().is_ok_and(|yesterday| yesterday == date) {
        "Yesterday".to_string()
    } else if date.year() == today.year() {
        date.strftime("%b %d").to_string()
    } else {
        date.strftime("%b %d %Y").to_string()
    }
}

/// Render a single task line with ID, glyph, title, and right-aligned context
pub fn render_task_line(task: &Task, context: Option<&str>, today: Date) {
    let terminal_width = get_terminal_width();

    let id_str = format!("{:>3}", task.id);
    let glyph = get_status_glyph(task, today);
    let left_section = format!("  {}  {}  {}", id_str, glyph, task.title);
    let left_visible_len = format!("  {}  {}  {} {}", id_str, " ", task.title, "!!!")
        .chars()
        .count();

    let styled_left = if task.status == TaskStatus::Done {
        left_section.dimmed()
    } else {
        left_section.bold()
    };
    let badge = priority_badge(task.priority);

    let due = task.due_date.map(|d| format_due(d, today));
    let right_section = match (due, context) {
        (Some(due), Some(ctx)) => format!("{}  ·  {}", due, ctx),
        (Some(due), None) => due,
        (None, Some(ctx)) => ctx.to_string(),
        (None, None) => String::new(),
    };

    let right_visible_len = right_section.chars().count();
    if !right_section.is_empty() && left_visible_len + right_visible_len + 4 < terminal_width {
        let padding = terminal_width - left_visible_len - right_visible_len - 2;
        let right = if task.is_overdue(today) {
            right_section.red()
        } else {
            right_section.dimmed()
        };
        println!("{} {}{}{}", styled_left, badge, " ".repeat(padding), right);
    } else {
        println!("{} {}", styled_left, badge);
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: (&str, &str)) {
    println!(
        "\n  {} ({} {})\n",
        title.cyan().bold(),
        count,
        plural(count, noun.0, noun.1)
    );
}

/// Render a section header (e.g., "In Progress")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn render_project_line(project: &Project, today: Date) {
    let deadline = project
        .deadline
        .map(|d| format!("due {}", format_due(d, today)))
        .unwrap_or_default();
    println!(
        "  {:>3}  {} {}  {}  {}",
        project.id,
        project.title.bold(),
        project_status_badge(project.status),
        render_bar(project.completion_percentage, 20),
        deadline.dimmed()
    );
}

pub fn render_project_details(project: &Project, today: Date) {
    render_project_line(project, today);
    if !project.description.is_empty() {
        println!("\n       {}", project.description);
    }
    for attachment in &project.attachments {
        println!(
            "       {} {} {}",
            "📎".dimmed(),
            attachment.name,
            format!("({} KB)", attachment.size.div_ceil(1024)).dimmed()
        );
    }
}

/// `width` cells of bar filled to `percentage`
fn render_bar(percentage: u8, width: usize) -> String {
    let filled = (usize::from(percentage.min(100)) * width).div_ceil(100);
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled).green(),
        "░".repeat(width - filled).dimmed(),
        percentage
    )
}

/// Render the kanban board column by column
pub fn render_board(board: &KanbanBoard, today: Date) {
    let title = board
        .project
        .as_ref()
        .map(|p| p.title.as_str())
        .unwrap_or("Board");
    render_view_header(title, board.tasks.len(), ("task", "tasks"));
    if let Some(project) = &board.project {
        println!("  {}", render_bar(project.completion_percentage, 30));
    }
    let counts: Vec<String> = count_by_status(&board.tasks)
        .iter()
        .map(|(status, count)| format!("{} {}", count, status.label().to_lowercase()))
        .collect();
    println!("  {}", counts.join(" · ").dimmed());

    for column in board.columns() {
        let header = format!("{} ({})", column.status, column.tasks.len());
        if column.is_drop_target {
            println!("\n  {} {} {}\n", "▶▶▶".cyan(), header.cyan().bold(), "◀◀◀".cyan());
        } else {
            render_section_header(&header);
        }
        if column.is_empty() {
            println!("       {}", "No tasks".dimmed().italic());
        }
        for task in &column.tasks {
            render_task_line(task, None, today);
        }
        if column.accepts_new_task {
            println!("       {}", "+ taskboard tasks new".dimmed());
        }
    }
    println!();
}

fn event_label(event: &CalendarEvent) -> ColoredString {
    let label = match event.kind() {
        EventKind::Task => format!("{} {}", event.key, event.title),
        EventKind::Project => format!("{} ◆ {}", event.key, event.title),
    };
    // Mirrors the palette of CalendarEvent::color_class
    match event.color_class().split(' ').next() {
        Some("bg-error") => label.red(),
        Some("bg-warning") => label.yellow(),
        Some("bg-info") => label.blue(),
        Some("bg-success") => label.green(),
        Some("bg-primary") => label.cyan(),
        Some("bg-secondary") => label.magenta(),
        _ => label.normal(),
    }
}

/// Render the calendar grid followed by the events of each visible day
pub fn render_calendar(board: &CalendarBoard) {
    let (start, end) = board.range();
    let title = match board.mode {
        CalendarMode::Month => board.reference.strftime("%B %Y").to_string(),
        CalendarMode::Week => format!("{} – {}", start.strftime("%b %d"), end.strftime("%b %d %Y")),
        CalendarMode::Day => board.reference.strftime("%A, %b %d %Y").to_string(),
    };
    render_view_header(&title, board.events.len(), ("event", "events"));

    let days = board.days();
    if board.mode != CalendarMode::Day {
        println!("  {}", " Su  Mo  Tu  We  Th  Fr  Sa".dimmed());
        for week in days.chunks(7) {
            let cells: Vec<String> = week
                .iter()
                .map(|cell| {
                    let number = format!("{:>3}", cell.date.day());
                    let marker = if board.events_on(cell.date).visible.is_empty() {
                        " "
                    } else {
                        "•"
                    };
                    let styled = if cell.is_today {
                        number.reversed()
                    } else if !cell.in_current_month {
                        number.dimmed()
                    } else {
                        number.normal()
                    };
                    format!("{}{}", styled, marker.cyan())
                })
                .collect();
            println!("  {}", cells.join(""));
        }
    }

    for cell in &days {
        let placed = board.events_on(cell.date);
        if placed.visible.is_empty() {
            continue;
        }
        render_section_header(&cell.date.strftime("%a %b %d").to_string());
        for event in &placed.visible {
            println!("       {}", event_label(event));
        }
        if placed.overflow > 0 {
            println!("       {}", format!("+{} more", placed.overflow).dimmed());
        }
    }
    println!();
}

pub fn render_dashboard(dashboard: &Dashboard, user: Option<&User>, today: Date) {
    let greeting = user
        .map(|u| format!("Dashboard for {}", u.name))
        .unwrap_or_else(|| "Dashboard".to_string());
    println!("\n  {}\n", greeting.cyan().bold());

    let rows = [
        ("Active projects", dashboard.active_projects.to_string()),
        ("Completed projects", dashboard.completed_projects.to_string()),
        ("Total tasks", dashboard.total_tasks.to_string()),
        ("Completion rate", format!("{}%", dashboard.completion_rate)),
        (
            "My tasks",
            format!("{} ({} done)", dashboard.my_tasks, dashboard.my_done),
        ),
        ("Team members", dashboard.user_count.to_string()),
    ];
    for (label, value) in rows {
        println!("  {}{}", format!("{label:<20}").dimmed(), value.bold());
    }
    let overdue = format!("{}", dashboard.overdue);
    println!(
        "  {}{}",
        format!("{:<20}", "Overdue").dimmed(),
        if dashboard.overdue > 0 {
            overdue.red().bold()
        } else {
            overdue.bold()
        }
    );

    render_section_header("Recent activity");
    if dashboard.recent.is_empty() {
        println!("       {}", "Nothing changed this week".dimmed());
    }
    for task in &dashboard.recent {
        render_task_line(task, None, today);
    }
    println!();
}

pub fn render_users(users: &[User]) {
    render_view_header("Users", users.len(), ("user", "users"));
    for user in users {
        println!(
            "  {:>3}  {} {}  {}",
            user.id,
            user.initials().cyan().bold(),
            user.name.bold(),
            format!("{} · {}", user.email, user.role).dimmed()
        );
    }
    println!();
}

pub fn render_team(team: &[TeamMember]) {
    render_view_header("Team", team.len(), ("member", "members"));
    for member in team {
        let workload = member.workload.label();
        let workload = match member.workload {
            Workload::Heavy => workload.red(),
            Workload::Moderate => workload.yellow(),
            Workload::Light => workload.green(),
            Workload::Available => workload.dimmed(),
        };
        println!(
            "  {} {} {}",
            member.user.initials().cyan().bold(),
            member.user.name.bold(),
            format!("· {}", member.user.role).dimmed()
        );
        println!(
            "      {}  {}",
            render_bar(member.bar_percentage, 20),
            workload
        );
        println!(
            "      {}",
            format!(
                "{} active · {} completed · {} total",
                member.active, member.completed, member.total
            )
            .dimmed()
        );
        println!();
    }
}

pub fn render_comments(comments: &[Comment], users: &[User]) {
    render_view_header("Comments", comments.len(), ("comment", "comments"));
    for comment in comments {
        let author = comment
            .user_id
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map(|u| u.name.as_str())
            .unwrap_or("Unknown user");
        println!(
            "  {} {}",
            author.bold(),
            comment.created_at.strftime("%b %d %H:%M").to_string().dimmed()
        );
        println!("    {}\n", comment.content);
    }
}

/// Confirmation shown after a change went through
pub fn render_notice(message: &str) {
    println!("{} {}", "✓".green(), message);
}
