//! CLI administration tool for the lab platform.
//!
//! Provides commands for managing users and tokens, reading the audit trail,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin (interactive)
//! cargo run --bin admin -- user create --role admin
//!
//! # List users
//! cargo run --bin admin -- user list
//!
//! # Change a role
//! cargo run --bin admin -- user set-role alice admin
//!
//! # Deactivate a user and revoke their tokens
//! cargo run --bin admin -- user deactivate alice
//!
//! # Revoke every live token of a user
//! cargo run --bin admin -- token revoke-all alice
//!
//! # Show the latest audit entries
//! cargo run --bin admin -- audit tail --limit 50
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use lab_platform::domain::entities::{AuditOutcome, NewUser, Role, User, UserPatch};
use lab_platform::domain::repositories::{
    AuditFilter, AuditRepository, TokenRepository, UserRepository,
};
use lab_platform::infrastructure::persistence::{
    PgAuditRepository, PgTokenRepository, PgUserRepository,
};
use lab_platform::utils::password::hash_password;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the lab platform.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Read the audit trail
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user (prompts for anything not given)
    Create {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        display_name: Option<String>,

        /// `admin` or `member`
        #[arg(short, long, default_value = "member")]
        role: Role,
    },

    /// List users
    List {
        #[arg(short, long, default_value_t = 100)]
        limit: i64,
    },

    /// Change a user's role
    SetRole { username: String, role: Role },

    /// Deactivate a user and revoke their tokens
    Deactivate {
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Revoke every live token of a user
    RevokeAll { username: String },
}

#[derive(Subcommand)]
enum AuditAction {
    /// Show the newest audit entries
    Tail {
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        /// Only failed requests
        #[arg(long)]
        failures: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::User { action } => handle_user_action(action, pool).await?,
        Commands::Token { action } => handle_token_action(action, pool).await?,
        Commands::Audit { action } => handle_audit_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: Arc<PgPool>) -> Result<()> {
    let users = PgUserRepository::new(pool.clone());

    match action {
        UserAction::Create {
            username,
            display_name,
            role,
        } => create_user(&users, username, display_name, role).await?,
        UserAction::List { limit } => list_users(&users, limit).await?,
        UserAction::SetRole { username, role } => {
            let user = find_user(&users, &username).await?;
            let patch = UserPatch {
                role: Some(role),
                ..UserPatch::default()
            };
            update_user(&users, &user, patch).await?;
            println!(
                "{} {} is now {}",
                "✅".green(),
                username.cyan(),
                role.to_string().bright_white().bold()
            );
        }
        UserAction::Deactivate { username, yes } => {
            let user = find_user(&users, &username).await?;
            if !user.is_active {
                println!("{}", "⚠️  This user is already inactive".yellow());
                return Ok(());
            }

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Deactivate {} and revoke their tokens?", username))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let patch = UserPatch {
                is_active: Some(false),
                ..UserPatch::default()
            };
            update_user(&users, &user, patch).await?;

            let revoked = PgTokenRepository::new(pool)
                .revoke_all_for_user(user.id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to revoke tokens: {}", e))?;

            println!(
                "{} {} deactivated, {} token(s) revoked",
                "✅".green(),
                username.cyan(),
                revoked.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Creates a user with interactive prompts.
///
/// The password is always prompted (hidden, with confirmation) so it never
/// lands in shell history.
async fn create_user(
    users: &PgUserRepository,
    username: Option<String>,
    display_name: Option<String>,
    role: Role,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let display_name = match display_name {
        Some(d) => d,
        None => Input::new()
            .with_prompt("Display name")
            .with_initial_text(username.clone())
            .interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.len() >= 8 {
                Ok(())
            } else {
                Err("Password must be at least 8 characters")
            }
        })
        .interact()?;

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user = users
        .create(NewUser {
            username,
            display_name,
            password_hash,
            role,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!("{}", "✅ User created successfully!".green().bold());
    println!("  ID:       {}", user.id.to_string().bright_black());
    println!("  Username: {}", user.username.cyan());
    println!("  Role:     {}", user.role.to_string().bright_white());
    println!();

    Ok(())
}

async fn list_users(users: &PgUserRepository, limit: i64) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let list = users
        .list(0, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if list.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<24} {:<8} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Role".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for user in &list {
        let status = if user.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        println!(
            "  {:<5} {:<24} {:<8} {:<20} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.role.as_str(),
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", list.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn find_user(users: &PgUserRepository, username: &str) -> Result<User> {
    users
        .find_by_username(username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("User '{}' not found", username))
}

async fn update_user(users: &PgUserRepository, user: &User, patch: UserPatch) -> Result<User> {
    users
        .update(user.id, patch)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update user: {}", e))?
        .with_context(|| format!("User '{}' disappeared during update", user.username))
}

async fn handle_token_action(action: TokenAction, pool: Arc<PgPool>) -> Result<()> {
    match action {
        TokenAction::RevokeAll { username } => {
            println!("{}", "🔒 Revoke Tokens".bright_blue().bold());
            println!();

            let user = find_user(&PgUserRepository::new(pool.clone()), &username).await?;

            let confirmed = Confirm::new()
                .with_prompt(format!("Revoke every token of {}?", username))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            let revoked = PgTokenRepository::new(pool)
                .revoke_all_for_user(user.id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to revoke tokens: {}", e))?;

            println!();
            println!(
                "{} {} token(s) revoked",
                "✅".green(),
                revoked.to_string().bright_white().bold()
            );
            println!();
        }
    }

    Ok(())
}

async fn handle_audit_action(action: AuditAction, pool: Arc<PgPool>) -> Result<()> {
    match action {
        AuditAction::Tail { limit, failures } => {
            if !(1..=1000).contains(&limit) {
                bail!("--limit must be between 1 and 1000");
            }

            let status = failures.then_some(AuditOutcome::Failure);
            let filter = AuditFilter::new(0, limit).with_status(status);

            let entries = PgAuditRepository::new(pool)
                .list(filter)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read audit trail: {}", e))?;

            println!("{}", "📜 Audit Trail".bright_blue().bold());
            println!();

            if entries.is_empty() {
                println!("{}", "  No entries".yellow());
                return Ok(());
            }

            // Oldest first so the newest entry ends up at the bottom.
            for entry in entries.iter().rev() {
                let status = match entry.status {
                    AuditOutcome::Success => entry.status_code.to_string().green(),
                    AuditOutcome::Failure => entry.status_code.to_string().red(),
                };
                let who = if entry.username.is_empty() {
                    "-".to_string()
                } else {
                    entry.username.clone()
                };

                println!(
                    "  {} {} {:<6} {:<40} {:<15} {} {}ms",
                    entry
                        .created_at
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                        .bright_black(),
                    status,
                    entry.action,
                    entry.resource,
                    entry.client_ip,
                    who.cyan(),
                    entry.duration_ms
                );
            }
            println!();
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;

            let live_tokens: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL AND expires_at > NOW()",
            )
            .fetch_one(pool)
            .await?;

            let pending: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM resource_requests WHERE status = 'pending'",
            )
            .fetch_one(pool)
            .await?;

            let audit_entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL:       {}", version.bright_white());
            println!("  Users:            {}", users.to_string().bright_green().bold());
            println!(
                "  Live tokens:      {}",
                live_tokens.to_string().bright_green().bold()
            );
            println!(
                "  Pending requests: {}",
                pending.to_string().bright_green().bold()
            );
            println!(
                "  Audit entries:    {}",
                audit_entries.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
