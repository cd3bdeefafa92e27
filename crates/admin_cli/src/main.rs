use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "splitways_admin")]
#[command(about = "Admin utilities for Splitways (bootstrap users/groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitways.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user, prompting for the password.
    Create(UserCreateArgs),
    /// Replace a user's password.
    Passwd(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
    AddMember(GroupAddMemberArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct GroupAddMemberArgs {
    #[arg(long)]
    group: Uuid,
    /// Owner of the group; only owners may add members.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    username: String,
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

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db: DatabaseConnection = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

fn fail(err: EngineError) -> ! {
    eprintln!("{err}");
    let code = match err {
        EngineError::KeyNotFound(_) | EngineError::ExistingKey(_) => 1,
        _ => 2,
    };
    std::process::exit(code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let engine = connect_engine(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let user = engine
                .create_user(&args.username, &password)
                .await
                .unwrap_or_else(|err| fail(err));
            println!("created user: {} ({})", user.username, user.id);
        }
        Command::User(User {
            command: UserCommand::Passwd(args),
        }) => {
            let user = engine
                .user_by_username(&args.username)
                .await
                .unwrap_or_else(|err| fail(err));
            let password = prompt_password_twice()?;
            engine
                .change_password(user.id, &password)
                .await
                .unwrap_or_else(|err| fail(err));
            println!("password updated: {}", user.username);
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let owner = engine
                .user_by_username(&args.owner)
                .await
                .unwrap_or_else(|err| fail(err));
            let group = engine
                .create_group(&args.name, owner.id)
                .await
                .unwrap_or_else(|err| fail(err));
            println!("created group: {} ({})", group.name, group.id);
        }
        Command::Group(Group {
            command: GroupCommand::AddMember(args),
        }) => {
            let owner = engine
                .user_by_username(&args.owner)
                .await
                .unwrap_or_else(|err| fail(err));
            let group = engine
                .group(args.group, owner.id)
                .await
                .unwrap_or_else(|err| fail(err));
            let member = engine
                .add_member(group.id, &args.username, owner.id)
                .await
                .unwrap_or_else(|err| fail(err));
            println!("added {} to {}", member.username, group.name);
        }
    }

    Ok(())
}
