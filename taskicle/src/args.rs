use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use taskicle_client::PageRequest;

/// Taskicle command-line client
#[derive(Debug, Parser)]
#[command(name = "taskicle", about = "Command-line client for the Taskicle task server")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TASKICLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, env = "TASKICLE_API_BASE")]
    pub base_url: Option<String>,

    /// Session id from a previous login
    #[arg(long, env = "TASKICLE_SESSION", hide_env_values = true)]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the badge for a priority or task state
    Status {
        /// `priority` or `state`
        kind: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Explain a backend result code
    Code {
        #[arg(allow_negative_numbers = true)]
        code: i64,
    },
    /// Resolve a client-side route
    Route { path: String },
    /// Log in and print the session id
    Login {
        user_name: String,
        #[arg(long, env = "TASKICLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a user account
    Register {
        user_name: String,
        #[arg(long, env = "TASKICLE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Registration key issued by the server operator
        #[arg(long, env = "TASKICLE_REGISTER_KEY", hide_env_values = true)]
        key: String,
        /// Grant the administrator role
        #[arg(long)]
        admin: bool,
    },
    /// List projects
    Projects {
        #[command(flatten)]
        page: PageArgs,
    },
    /// List the tasks of a project
    Tasks {
        project_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Create a task
    AddTask {
        project_id: i64,
        name: String,
        /// Priority, 0 (lowest) to 4 (highest)
        #[arg(long)]
        priority: Option<i64>,
        /// State, 0 (not started) to 5 (pending verification)
        #[arg(long)]
        status: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the state of a task
    SetState { task_id: i64, status: i64 },
    /// Delete a task
    DeleteTask { task_id: i64 },
    /// List the comments of a task
    Comments {
        task_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Comment on a task
    Comment { task_id: i64, content: String },
    /// List article groups
    Groups {
        #[command(flatten)]
        page: PageArgs,
    },
    /// List the pages of an article group
    Pages {
        group_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Print the content of a page
    Page {
        page_id: i64,
        /// Print the unsaved draft instead
        #[arg(long, conflicts_with = "version")]
        draft: bool,
        /// Print a saved version instead of the latest
        #[arg(long)]
        version: Option<i64>,
    },
    /// Save page content read from a file, or stdin
    SavePage {
        page_id: i64,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Save as draft without creating a version
        #[arg(long)]
        draft: bool,
    },
    /// List the saved versions of a page
    Versions {
        page_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Clone, Copy, ClapArgs)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Entries per page (at most 50)
    #[arg(long, default_value_t = taskicle_client::MAX_PAGE_SIZE)]
    pub count: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        Self::new(args.page, args.count)
    }
}
