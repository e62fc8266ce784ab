use std::error::Error;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, Timelike};
use tracing::debug;

use crate::app::{App, Event};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::open_store;
use crate::io::session;
use crate::io::store::Store;
use crate::model::config::JoinConfig;
use crate::model::session::SessionUser;
use crate::model::task::{Assignee, Status, Task};
use crate::ops::contact_ops::{ContactDraft, ContactPatch, group_by_letter};
use crate::ops::task_ops::{TaskDraft, TaskPatch};
use crate::ops::user_ops;
use crate::render;

type CliResult = Result<(), Box<dyn Error>>;

/// Default data directory: `$HOME/.join`
fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".join")
}

/// Resolved global options shared by all commands
struct Context {
    json: bool,
    data_dir: PathBuf,
    config: JoinConfig,
    store_url: Option<String>,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
        let config = config_io::load_config(cli.config.as_deref(), &data_dir)?;
        let store_url = cli
            .store_url
            .clone()
            .or_else(|| config.store.base_url.clone());
        debug!(data_dir = %data_dir.display(), store_url = ?store_url, "resolved options");
        Ok(Context {
            json: cli.json,
            data_dir,
            config,
            store_url,
        })
    }

    fn store(&self) -> Result<Box<dyn Store>, Box<dyn Error>> {
        let url = self.store_url.as_deref().ok_or(
            "no store configured (use --store-url, JOIN_STORE_URL or [store] base_url in join.toml)",
        )?;
        Ok(open_store(url, &self.config.store)?)
    }

    /// Signed-in app state with both collections loaded
    fn app(&self) -> Result<App, Box<dyn Error>> {
        let user = session::require_session(&self.data_dir)?;
        let mut app = App::new(self.store()?, user, &self.config.ui);
        app.load()?;
        Ok(app)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        // Session
        Commands::Login(args) => cmd_login(&ctx, args),
        Commands::Guest => cmd_guest(&ctx),
        Commands::Signup(args) => cmd_signup(&ctx, args),
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami => cmd_whoami(&ctx),

        // Tasks
        Commands::Board(args) => cmd_board(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Move(args) => cmd_move(&ctx, args),
        Commands::Delete(args) => cmd_delete(&ctx, args),
        Commands::Subtask(cmd) => cmd_subtask(&ctx, cmd.action),

        // Contacts
        Commands::Contacts => cmd_contacts(&ctx),
        Commands::Contact(cmd) => cmd_contact(&ctx, cmd.action),

        // Views
        Commands::Summary(args) => cmd_summary(&ctx, args),
        Commands::Render(cmd) => cmd_render(&ctx, cmd.view),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_task<'a>(app: &'a App, id: &str) -> Result<&'a Task, Box<dyn Error>> {
    app.task(id)
        .ok_or_else(|| format!("task not found: {}", id).into())
}

/// Resolve `--assign` names against the contact directory
fn resolve_assignees(app: &App, names: &[String]) -> Result<Vec<Assignee>, Box<dyn Error>> {
    names
        .iter()
        .map(|name| {
            app.contacts
                .find_by_name(name)
                .map(|c| c.as_assignee())
                .ok_or_else(|| format!("unknown contact: {}", name).into())
        })
        .collect()
}

/// CLI subtask indices are 1-based
fn subtask_index(index: usize) -> Result<usize, Box<dyn Error>> {
    index
        .checked_sub(1)
        .ok_or_else(|| "subtask numbers start at 1".into())
}

fn print_session(ctx: &Context, user: &SessionUser) -> CliResult {
    if ctx.json {
        print_json(user)
    } else {
        println!("{}", format_user(user));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_login(ctx: &Context, args: LoginArgs) -> CliResult {
    let mut store = ctx.store()?;
    let user = user_ops::sign_in(store.as_mut(), &args.email)?;
    session::write_session(&ctx.data_dir, &user)?;
    print_session(ctx, &user)
}

fn cmd_guest(ctx: &Context) -> CliResult {
    let user = SessionUser::guest();
    session::write_session(&ctx.data_dir, &user)?;
    print_session(ctx, &user)
}

fn cmd_signup(ctx: &Context, args: SignupArgs) -> CliResult {
    let mut store = ctx.store()?;
    let user = user_ops::sign_up(store.as_mut(), &args.name, &args.email)?;
    session::write_session(&ctx.data_dir, &user)?;
    print_session(ctx, &user)
}

fn cmd_logout(ctx: &Context) -> CliResult {
    session::clear_session(&ctx.data_dir)?;
    if !ctx.json {
        println!("signed out");
    }
    Ok(())
}

fn cmd_whoami(ctx: &Context) -> CliResult {
    let user = session::require_session(&ctx.data_dir)?;
    print_session(ctx, &user)
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_board(ctx: &Context, args: BoardArgs) -> CliResult {
    let mut app = ctx.app()?;
    if let Some(query) = args.search {
        app.handle(Event::Search(query))?;
    }
    let statuses: Vec<Status> = match args.status {
        Some(s) => vec![s],
        None => Status::ALL.to_vec(),
    };

    if ctx.json {
        let columns: Vec<ColumnJson> = statuses
            .iter()
            .map(|&status| ColumnJson {
                status,
                label: status.label(),
                tasks: app
                    .board
                    .column_matching(status, &app.search)
                    .map(task_to_json)
                    .collect(),
            })
            .collect();
        return print_json(&columns);
    }

    for (i, &status) in statuses.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let tasks: Vec<&Task> = app.board.column_matching(status, &app.search).collect();
        println!("{}", format_column_header(status, tasks.len()));
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CliResult {
    let app = ctx.app()?;
    let task = find_task(&app, &args.id)?;
    if ctx.json {
        return print_json(&task_to_json(task));
    }
    for line in format_task_detail(task) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_add(ctx: &Context, args: AddArgs) -> CliResult {
    let mut app = ctx.app()?;
    let draft = TaskDraft {
        title: args.title,
        description: args.description,
        due_date: args.due,
        priority: args.priority,
        category: args.category,
        status: args.status,
        assignees: resolve_assignees(&app, &args.assign)?,
        subtasks: args.subtasks,
    };
    app.handle(Event::SubmitTask(draft))?;
    let task = app
        .board
        .tasks
        .last()
        .ok_or("task was not added to the board")?;
    let id = task.id.as_deref().unwrap_or_default();
    if ctx.json {
        print_json(&CreatedJson { id })
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CliResult {
    let mut app = ctx.app()?;
    let assignees = if args.clear_assignees {
        Some(Vec::new())
    } else if args.assign.is_empty() {
        None
    } else {
        Some(resolve_assignees(&app, &args.assign)?)
    };
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        due_date: args.due,
        priority: args.priority,
        category: args.category,
        status: None,
        assignees,
        subtasks: None,
    };
    app.handle(Event::SaveTask {
        task_id: args.id.clone(),
        patch,
    })?;
    if ctx.json {
        print_json(&task_to_json(find_task(&app, &args.id)?))
    } else {
        println!("updated {}", args.id);
        Ok(())
    }
}

fn cmd_move(ctx: &Context, args: MoveArgs) -> CliResult {
    let mut app = ctx.app()?;
    let transition = app.handle(Event::MoveTask {
        task_id: args.id.clone(),
        status: args.status,
    })?;
    let task = find_task(&app, &args.id)?;
    if ctx.json {
        return print_json(&task_to_json(task));
    }
    if transition.redraws(crate::app::Region::Board) {
        println!("{} → {}", args.id, task.status.label());
    } else {
        println!("{} is already in {}", args.id, task.status.label());
    }
    Ok(())
}

fn cmd_delete(ctx: &Context, args: DeleteArgs) -> CliResult {
    let mut app = ctx.app()?;
    app.handle(Event::DeleteTask {
        task_id: args.id.clone(),
    })?;
    if !ctx.json {
        println!("deleted {}", args.id);
    }
    Ok(())
}

fn cmd_subtask(ctx: &Context, action: SubtaskAction) -> CliResult {
    let mut app = ctx.app()?;
    let id = match action {
        SubtaskAction::Add { id, title } => {
            app.handle(Event::AddSubtask {
                task_id: id.clone(),
                title,
            })?;
            id
        }
        SubtaskAction::Toggle { id, index } => {
            app.handle(Event::ToggleSubtask {
                task_id: id.clone(),
                index: subtask_index(index)?,
            })?;
            id
        }
        SubtaskAction::Remove { id, index } => {
            app.handle(Event::RemoveSubtask {
                task_id: id.clone(),
                index: subtask_index(index)?,
            })?;
            id
        }
    };
    let task = find_task(&app, &id)?;
    if ctx.json {
        return print_json(&task.subtasks);
    }
    if task.subtasks.is_empty() {
        println!("{}", render::NO_SUBTASKS);
    }
    for (i, sub) in task.subtasks.iter().enumerate() {
        let mark = if sub.completed { 'x' } else { ' ' };
        println!("{}. [{}] {}", i + 1, mark, sub.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Contact commands
// ---------------------------------------------------------------------------

fn cmd_contacts(ctx: &Context) -> CliResult {
    let app = ctx.app()?;
    let groups = group_by_letter(&app.contacts.contacts);

    if ctx.json {
        let groups: Vec<LetterGroupJson> = groups
            .into_iter()
            .map(|(letter, contacts)| LetterGroupJson {
                letter,
                contacts: contacts.into_iter().map(contact_to_json).collect(),
            })
            .collect();
        return print_json(&groups);
    }

    if groups.is_empty() {
        println!("{}", render::NO_CONTACTS);
    }
    for (letter, contacts) in groups {
        println!("{}", letter);
        for c in contacts {
            println!("{}", format_contact_line(c));
        }
    }
    Ok(())
}

fn cmd_contact(ctx: &Context, action: ContactAction) -> CliResult {
    let mut app = ctx.app()?;
    let id = match action {
        ContactAction::Add { name, email, phone } => {
            app.handle(Event::AddContact(ContactDraft { name, email, phone }))?;
            let contact = app
                .contacts
                .contacts
                .last()
                .ok_or("contact was not added")?;
            contact.id.clone().unwrap_or_default()
        }
        ContactAction::Show { id } => {
            app.handle(Event::SelectContact {
                contact_id: id.clone(),
            })?;
            id
        }
        ContactAction::Edit {
            id,
            name,
            email,
            phone,
        } => {
            app.handle(Event::EditContact {
                contact_id: id.clone(),
                patch: ContactPatch { name, email, phone },
            })?;
            id
        }
        ContactAction::Delete { id } => {
            app.handle(Event::DeleteContact {
                contact_id: id.clone(),
            })?;
            if !ctx.json {
                println!("deleted {}", id);
            }
            return Ok(());
        }
    };
    let contact = app
        .contacts
        .get(&id)
        .ok_or_else(|| format!("contact not found: {}", id))?;
    if ctx.json {
        return print_json(&contact_to_json(contact));
    }
    for line in format_contact_detail(contact) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn parse_date(value: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", s, e).into()),
        None => Ok(Local::now().date_naive()),
    }
}

fn cmd_summary(ctx: &Context, args: SummaryArgs) -> CliResult {
    let app = ctx.app()?;
    let today = parse_date(args.date.as_deref())?;
    let summary = app.summary(today);
    if ctx.json {
        return print_json(&summary);
    }
    for line in format_summary(&summary) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_render(ctx: &Context, view: RenderView) -> CliResult {
    let mut app = ctx.app()?;
    let markup = match view {
        RenderView::Board { search, hover } => {
            if let Some(query) = search {
                app.handle(Event::Search(query))?;
            }
            render::board::render_board(
                &app.board,
                &app.search,
                hover,
                ctx.config.ui.description_width,
            )
        }
        RenderView::Task { id } => {
            app.handle(Event::OpenTask { task_id: id })?;
            app.render_task_detail()
        }
        RenderView::Assignees { selected } => {
            for contact_id in selected {
                app.handle(Event::ToggleAssignee { contact_id })?;
            }
            app.render_assignee_picker()
        }
        RenderView::Contacts { selected } => {
            if let Some(contact_id) = selected {
                app.handle(Event::SelectContact { contact_id })?;
            }
            app.render_contact_list()
        }
        RenderView::Contact { id } => {
            app.handle(Event::SelectContact { contact_id: id })?;
            app.render_contact_detail()
        }
        RenderView::Summary => {
            let now = Local::now();
            app.render_summary(now.date_naive(), now.hour())
        }
    };
    println!("{}", markup);
    Ok(())
}
