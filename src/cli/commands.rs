use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::task::{Priority, Status};

#[derive(Parser)]
#[command(name = "join", about = concat!("join v", env!("CARGO_PKG_VERSION"), " - kanban board and contacts"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of <data-dir>/join.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the session and config files (default: ~/.join)
    #[arg(long = "data-dir", env = "JOIN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Store base URL (https://… or file://…), overrides the config file
    #[arg(long = "store-url", env = "JOIN_STORE_URL", global = true)]
    pub store_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with the email of a registered user
    Login(LoginArgs),
    /// Start a read-only guest session
    Guest,
    /// Register a new user and sign in
    Signup(SignupArgs),
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the board, one section per column
    Board(BoardArgs),
    /// Show task details
    Show(ShowArgs),
    /// Add a task
    Add(AddArgs),
    /// Change task fields
    Edit(EditArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Delete a task
    Delete(DeleteArgs),
    /// Add, toggle or remove subtasks
    Subtask(SubtaskCmd),
    /// List contacts grouped by letter
    Contacts,
    /// Manage a single contact
    Contact(ContactCmd),
    /// Show board statistics
    Summary(SummaryArgs),
    /// Print the markup of a view
    Render(RenderCmd),
}

// ---------------------------------------------------------------------------
// Session args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    pub email: String,
}

#[derive(Args)]
pub struct SignupArgs {
    /// Full name
    #[arg(long)]
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardArgs {
    /// Only show tasks whose title or description contains this text
    #[arg(long)]
    pub search: Option<String>,
    /// Only show one column (todo, inprogress, awaitfeedback, done)
    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    #[arg(allow_hyphen_values = true)]
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub title: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: String,
    /// technical, userstory or any other category name
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// urgent, medium or low
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// Column to create the task in (default: todo)
    #[arg(long)]
    pub status: Option<Status>,
    /// Assign a contact by name (repeatable)
    #[arg(long = "assign")]
    pub assign: Vec<String>,
    /// Add a subtask (repeatable)
    #[arg(long = "subtask")]
    pub subtasks: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(allow_hyphen_values = true)]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub category: Option<String>,
    /// Replace the assignees with these contacts (repeatable)
    #[arg(long = "assign", conflicts_with = "clear_assignees")]
    pub assign: Vec<String>,
    /// Remove all assignees
    #[arg(long)]
    pub clear_assignees: bool,
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(allow_hyphen_values = true)]
    pub id: String,
    /// Target column (todo, inprogress, awaitfeedback, done)
    pub status: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(allow_hyphen_values = true)]
    pub id: String,
}

#[derive(Args)]
pub struct SubtaskCmd {
    #[command(subcommand)]
    pub action: SubtaskAction,
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Append a subtask
    Add {
        #[arg(allow_hyphen_values = true)]
        id: String,
        title: String,
    },
    /// Flip a subtask between open and done (1-based index)
    Toggle {
        #[arg(allow_hyphen_values = true)]
        id: String,
        index: usize,
    },
    /// Remove a subtask (1-based index)
    Remove {
        #[arg(allow_hyphen_values = true)]
        id: String,
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// Contact args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ContactCmd {
    #[command(subcommand)]
    pub action: ContactAction,
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Add a contact
    Add {
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Show contact details
    Show {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Change contact fields; the badge color is kept
    Edit {
        #[arg(allow_hyphen_values = true)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a contact
    Delete {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Summary / render args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SummaryArgs {
    /// Count deadlines from this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct RenderCmd {
    #[command(subcommand)]
    pub view: RenderView,
}

#[derive(Subcommand)]
pub enum RenderView {
    /// All four board columns
    Board {
        #[arg(long)]
        search: Option<String>,
        /// Column highlighted as the drop target
        #[arg(long)]
        hover: Option<Status>,
    },
    /// Task detail modal
    Task {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Assign-to dropdown and badge row
    Assignees {
        /// Checked contact id (repeatable)
        #[arg(long = "selected", allow_hyphen_values = true)]
        selected: Vec<String>,
    },
    /// Grouped contact list
    Contacts {
        #[arg(long, allow_hyphen_values = true)]
        selected: Option<String>,
    },
    /// Contact detail pane
    Contact {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Summary page
    Summary,
}
