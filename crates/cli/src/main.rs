//! Taskhub CLI - Command-line interface for the Taskhub gateway

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use taskhub_sdk::{NewTask, ProfileUpdate, RegisterRequest, TaskUpdate, TaskhubClient};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "taskhub")]
#[command(about = "Taskhub CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "TASKHUB_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Access token from `taskhub login`
    #[arg(long, env = "TASKHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account (and its profile)
    Register {
        username: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        email: String,
        /// Password (or TASKHUB_PASSWORD)
        #[arg(long, env = "TASKHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and print an access token
    Login {
        username: String,
        #[arg(long, env = "TASKHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the authenticated account
    Whoami,

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Administrative operations
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Check that the daemon is reachable
    Health,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// 0 (lowest) to 10
        #[arg(short, long, default_value = "0")]
        priority: i32,
        /// Due date as epoch milliseconds
        #[arg(long)]
        due: Option<i64>,
    },
    /// List your tasks
    List {
        /// TODO, IN_PROGRESS, DONE or ARCHIVED
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Show one task
    Show { task_id: String },
    /// Edit title, description, priority or due date
    Edit {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<i64>,
        #[arg(long)]
        clear_due: bool,
    },
    Start { task_id: String },
    Done { task_id: String },
    Reopen { task_id: String },
    Archive { task_id: String },
    /// Delete a task
    Rm { task_id: String },
    /// Task counts per status
    Summary,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show a profile (yours by default)
    Show { user_id: Option<String> },
    /// Edit a profile (yours by default)
    Edit {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Empty string clears the bio
        #[arg(long)]
        bio: Option<String>,
    },
    /// List all profiles (admin)
    List {
        #[arg(short, long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Delete a profile (admin)
    Rm { user_id: String },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Show system statistics
    Stats,
    /// Run maintenance operations
    Maintenance {
        /// Force VACUUM even if not needed
        #[arg(long)]
        force_vacuum: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = TaskhubClient::connect(&cli.rpc_url).context("Invalid RPC URL")?;
    if let Some(token) = cli.token {
        client.set_token(token);
    }

    match cli.command {
        Commands::Health => {
            let health = client.health().await.context("Daemon unreachable")?;
            println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
            println!("  {} {}", "Status:".bold(), health.status.to_uppercase().green());
            println!("  {} {}", "Version:".bold(), health.version);
            println!("  {} {} seconds", "Uptime:".bold(), health.uptime_seconds);
        }

        Commands::Register {
            username,
            display_name,
            email,
            password,
        } => {
            let registration = client
                .register(RegisterRequest {
                    username,
                    password,
                    display_name,
                    email,
                })
                .await?;
            println!(
                "{}",
                format!("✓ Registered {}", registration.username).green().bold()
            );
            println!("  {} {}", "Account:".bold(), registration.account_id);
            println!("  {} {}", "Roles:".bold(), registration.roles.join(", "));
        }

        Commands::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            println!("{}", "✓ Logged in".green().bold());
            println!("  {} {}", "Expires:".bold(), render::timestamp(Some(token.expires_at * 1000)));
            println!();
            println!("export TASKHUB_TOKEN={}", token.token);
        }

        Commands::Whoami => {
            let me = client.whoami().await?;
            println!("  {} {}", "Account:".bold(), me.account_id);
            println!("  {} {}", "Username:".bold(), me.username);
            println!("  {} {}", "Roles:".bold(), me.roles.join(", "));
        }

        Commands::Task(cmd) => run_task(&client, cmd).await?,
        Commands::Profile(cmd) => run_profile(&client, cmd).await?,
        Commands::Admin(cmd) => run_admin(&client, cmd).await?,
    }

    Ok(())
}

async fn run_task(client: &TaskhubClient, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            description,
            priority,
            due,
        } => {
            let task = client
                .create_task(NewTask {
                    title,
                    description,
                    priority,
                    due_at: due,
                })
                .await?;
            println!("{}", "✓ Task created".green().bold());
            println!();
            println!("{}", render::task_table(&[task]));
        }

        TaskCommand::List {
            status,
            limit,
            offset,
        } => {
            let list = client.list_tasks(status.as_deref(), limit, offset).await?;
            if list.tasks.is_empty() {
                println!("{}", "No tasks".yellow());
            } else {
                println!("{}", render::task_table(&list.tasks));
            }
        }

        TaskCommand::Show { task_id } => {
            let task = client.get_task(&task_id).await?;
            render::task_detail(&task);
        }

        TaskCommand::Edit {
            task_id,
            title,
            description,
            priority,
            due,
            clear_due,
        } => {
            let due_at = if clear_due { Some(None) } else { due.map(Some) };
            let task = client
                .update_task(
                    &task_id,
                    TaskUpdate {
                        title,
                        description,
                        priority,
                        due_at,
                    },
                )
                .await?;
            println!("{}", "✓ Task updated".green().bold());
            render::task_detail(&task);
        }

        TaskCommand::Start { task_id } => transition(client, &task_id, "start").await?,
        TaskCommand::Done { task_id } => transition(client, &task_id, "complete").await?,
        TaskCommand::Reopen { task_id } => transition(client, &task_id, "reopen").await?,
        TaskCommand::Archive { task_id } => transition(client, &task_id, "archive").await?,

        TaskCommand::Rm { task_id } => {
            client.delete_task(&task_id).await?;
            println!("{}", format!("✓ Task {} deleted", task_id).green().bold());
        }

        TaskCommand::Summary => {
            let summary = client.task_summary().await?;
            for entry in &summary.by_status {
                println!("  {:<12} {}", render::status(&entry.status), entry.count);
            }
            println!("  {:<12} {}", "TOTAL".bold(), summary.total);
        }
    }
    Ok(())
}

async fn transition(client: &TaskhubClient, task_id: &str, action: &str) -> Result<()> {
    let task = client.transition_task(task_id, action).await?;
    println!(
        "{} {} is now {}",
        "✓".green(),
        task.id,
        render::status(&task.status)
    );
    Ok(())
}

async fn run_profile(client: &TaskhubClient, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show { user_id } => {
            let user_id = resolve_user(client, user_id).await?;
            let profile = client.get_profile(&user_id).await?;
            render::profile_detail(&profile);
        }

        ProfileCommand::Edit {
            user_id,
            display_name,
            email,
            bio,
        } => {
            let user_id = resolve_user(client, user_id).await?;
            let profile = client
                .update_profile(
                    &user_id,
                    ProfileUpdate {
                        display_name,
                        email,
                        bio,
                    },
                )
                .await?;
            println!("{}", "✓ Profile updated".green().bold());
            render::profile_detail(&profile);
        }

        ProfileCommand::List { limit, offset } => {
            let list = client.list_profiles(limit, offset).await?;
            for profile in &list.profiles {
                println!(
                    "  {}  {}  <{}>",
                    profile.user_id.dimmed(),
                    profile.display_name.bold(),
                    profile.email
                );
            }
            println!("  {} profiles", list.count);
        }

        ProfileCommand::Rm { user_id } => {
            client.delete_profile(&user_id).await?;
            println!("{}", format!("✓ Profile {} deleted", user_id).green().bold());
        }
    }
    Ok(())
}

/// Explicit user id, or the caller's own
async fn resolve_user(client: &TaskhubClient, user_id: Option<String>) -> Result<String> {
    match user_id {
        Some(id) => Ok(id),
        None => Ok(client.whoami().await?.account_id),
    }
}

async fn run_admin(client: &TaskhubClient, cmd: AdminCommand) -> Result<()> {
    match cmd {
        AdminCommand::Stats => {
            println!("{}", "System Status".cyan().bold());
            println!();

            let stats = client.stats().await?;
            println!("  {} {}", "Accounts:".bold(), stats.accounts);
            println!("  {} {}", "Profiles:".bold(), stats.profiles);
            println!("  {} {}", "Tasks:".bold(), stats.tasks);
            println!();
            println!("  {} {}", "Outbox pending:".bold(), stats.outbox_pending);
            println!("  {} {}", "Outbox delivered:".bold(), stats.outbox_delivered);
            let failed = stats.outbox_failed.to_string();
            println!(
                "  {} {}",
                "Outbox failed:".bold(),
                if stats.outbox_failed > 0 { failed.red() } else { failed.normal() }
            );
            println!();
            println!(
                "  {} {:.2} MB ({:.1}% free pages)",
                "DB Size:".bold(),
                render::megabytes(stats.db_size_bytes),
                stats.fragmentation_percent
            );
            println!("  {} {} seconds", "Uptime:".bold(), stats.uptime_seconds);
        }

        AdminCommand::Maintenance { force_vacuum } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            if force_vacuum {
                println!("  {} Force VACUUM enabled", "•".bold());
            }

            let result = client.run_maintenance(force_vacuum).await?;
            println!("  ✓ Maintenance completed");
            println!();
            if result.vacuum_run {
                println!("  {} VACUUM executed", "✓".green());
            } else {
                println!("  ○ VACUUM skipped (not needed)");
            }
            println!(
                "  {} {} delivered events purged",
                "✓".green(),
                result.purged_events
            );
            println!(
                "  {} {:.2} MB → {:.2} MB",
                "DB Size:".bold(),
                render::megabytes(result.db_size_before),
                render::megabytes(result.db_size_after)
            );
        }
    }
    Ok(())
}
