use std::{error::Error, io::Write};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AuthUser, CategoryInput, Engine, RegisterUser, users};
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};

#[derive(Parser, Debug)]
#[command(name = "centa_admin")]
#[command(about = "Admin utilities for Centa (bootstrap users, plans and recurring runs)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./centa.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// List the built-in budget plans.
    Plans,
    /// Complete first-time setup for a user.
    Setup(SetupArgs),
    Recurring(Recurring),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct SetupArgs {
    #[arg(long)]
    email: String,
    /// Index of a built-in plan, see `plans`.
    #[arg(long, conflicts_with_all = ["name", "categories"])]
    plan: Option<usize>,
    /// Name of a custom plan.
    #[arg(long, requires = "categories")]
    name: Option<String>,
    /// JSON list of `{"name", "percentage", "isSavings"}` objects.
    #[arg(long, requires = "name")]
    categories: Option<String>,
}

#[derive(Args, Debug)]
struct Recurring {
    #[command(subcommand)]
    command: RecurringCommand,
}

#[derive(Subcommand, Debug)]
enum RecurringCommand {
    /// Generate the recurring transactions due this month.
    Run(RecurringRunArgs),
}

#[derive(Args, Debug)]
struct RecurringRunArgs {
    #[arg(long)]
    email: String,
    /// Run as of this day (`YYYY-MM-DD`), defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn find_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<AuthUser, Box<dyn Error + Send + Sync>> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;
    match user {
        Some(user) => Ok(user.into()),
        None => {
            eprintln!("user not found: {email}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password("Password: ")?;
            let confirm_password = prompt_password("Confirm password: ")?;

            match engine
                .register_user(RegisterUser {
                    name: args.name,
                    email: args.email,
                    password,
                    confirm_password,
                })
                .await
            {
                Ok(user) => println!("created user: {} ({})", user.email, user.id),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Plans => {
            for (index, name) in engine.built_in_plans().into_iter().enumerate() {
                println!("{index}: {name}");
            }
        }
        Command::Setup(args) => {
            let user = find_user(&db, &args.email).await?;

            let result = match (args.plan, args.name, args.categories) {
                (Some(index), _, _) => engine.initialize_app(user.id, index).await,
                (None, Some(name), Some(categories)) => match CategoryInput::parse_list(&categories) {
                    Ok(categories) => {
                        engine
                            .initialize_with_custom_plan(user.id, &name, categories)
                            .await
                    }
                    Err(err) => Err(err),
                },
                _ => {
                    eprintln!("either --plan or --name with --categories is required");
                    std::process::exit(2);
                }
            };

            match result {
                Ok(plan_id) => println!("setup complete for {} (active plan {plan_id})", user.email),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Recurring(Recurring {
            command: RecurringCommand::Run(args),
        }) => {
            let user = find_user(&db, &args.email).await?;
            let today = args.date.unwrap_or_else(|| Local::now().date_naive());

            let created = engine.process_recurring(user.id, today).await?;
            println!("created {created} recurring transaction(s) for {}", user.email);
        }
    }

    Ok(())
}
