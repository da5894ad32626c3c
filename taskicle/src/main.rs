#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod console;

use std::io::Read;
use std::process::ExitCode;

use args::{Args, Command};
use clap::Parser;
use console::ConsoleSink;
use secrecy::{ExposeSecret, SecretString};
use taskicle_client::{ApiClient, ClientError, NewTask, TaskUpdate, UserRole};
use taskicle_config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize telemetry
    taskicle_telemetry::init(&config.telemetry)?;

    tracing::debug!(
        config_path = ?args.config.as_deref().map(std::path::Path::display),
        "starting taskicle"
    );

    let mut client = ApiClient::from_config(&config.client)?;
    if let Some(ref base_url) = args.base_url {
        client.set_base_url(base_url)?;
    }
    if let Some(session) = args.session {
        client.set_session(SecretString::from(session));
    }

    match run(&mut client, args.command).await {
        Ok(code) => Ok(code),
        Err(e) => {
            e.present(&ConsoleSink);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Execute one command; backend failures are returned for presentation
#[allow(clippy::too_many_lines)]
async fn run(client: &mut ApiClient, command: Command) -> Result<ExitCode, ClientError> {
    match command {
        Command::Status { kind, value } => {
            let descriptor = taskicle_core::lookup_str(&kind, value);
            let json = serde_json::to_string_pretty(&descriptor).map_err(|e| ClientError::Parse(e.to_string()))?;
            println!("{json}");
        }
        Command::Code { code } => {
            println!("{code}: {}", taskicle_core::translate(code));
        }
        Command::Route { path } => {
            let Some(route) = taskicle_core::resolve(&path) else {
                eprintln!("no route matches {path}");
                return Ok(ExitCode::FAILURE);
            };
            println!("{route} ({})", route.path());
        }
        Command::Login { user_name, password } => {
            let info = client.login(&user_name, &SecretString::from(password)).await?;
            println!("role: {}", i64::from(info.role));
            if let Some(sid) = client.session_id() {
                println!("session: {}", sid.expose_secret());
            }
        }
        Command::Register {
            user_name,
            password,
            key,
            admin,
        } => {
            let role = if admin { UserRole::Admin } else { UserRole::Normal };
            client
                .register(&user_name, &SecretString::from(password), &SecretString::from(key), role)
                .await?;
        }
        Command::Projects { page } => {
            for project in client.list_projects(page.into()).await? {
                println!("{:>6}  {}", project.project_id, project.project_name);
            }
        }
        Command::Tasks { project_id, page } => {
            for task in client.list_tasks(project_id, page.into()).await? {
                println!(
                    "{:>6}  {:<6}  {:<4}  {}",
                    task.task_id,
                    task.state_badge().text,
                    task.priority_badge().text,
                    task.task_name
                );
            }
        }
        Command::AddTask {
            project_id,
            name,
            priority,
            status,
            description,
        } => {
            let task = NewTask {
                project_id,
                task_name: Some(name),
                priority,
                status,
                description,
                ..NewTask::default()
            };
            client.create_task(&task).await?;
        }
        Command::SetState { task_id, status } => {
            let update = TaskUpdate {
                task_id,
                status: Some(status),
                ..TaskUpdate::default()
            };
            client.update_task(&update).await?;
        }
        Command::DeleteTask { task_id } => client.delete_task(task_id).await?,
        Command::Comments { task_id, page } => {
            for comment in client.list_task_comments(task_id, page.into()).await? {
                let edited = if comment.modified { " (edited)" } else { "" };
                println!("{:>6}  {}{edited}: {}", comment.comm_id, comment.user_name, comment.content);
            }
        }
        Command::Comment { task_id, content } => client.add_task_comment(task_id, &content).await?,
        Command::Groups { page } => {
            for group in client.list_page_groups(page.into()).await? {
                println!("{:>6}  {}", group.page_group_id, group.group_name);
            }
        }
        Command::Pages { group_id, page } => {
            for entry in client.list_pages(group_id, page.into()).await? {
                let draft = if entry.has_draft { "  [draft]" } else { "" };
                println!("{:>6}  {}{draft}", entry.page_id, entry.page_name);
            }
        }
        Command::Page {
            page_id,
            draft,
            version,
        } => {
            let content = match version {
                Some(ver_id) => client.load_page_version(page_id, ver_id).await?,
                None => client.load_page(page_id, draft).await?,
            };
            print!("{content}");
        }
        Command::SavePage { page_id, file, draft } => {
            let content = read_content(file.as_deref())?;
            client.save_page(page_id, &content, draft).await?;
        }
        Command::Versions { page_id, page } => {
            for version in client.list_page_versions(page_id, page.into()).await? {
                println!("{:>6}  {:>10}  {}", version.ver_id, version.create_at, version.description);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Read page content from `path`, or stdin when absent
fn read_content(path: Option<&std::path::Path>) -> Result<String, ClientError> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {e}", path.display()))),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| ClientError::Config(format!("cannot read stdin: {e}")))?;
            Ok(content)
        }
    }
}
