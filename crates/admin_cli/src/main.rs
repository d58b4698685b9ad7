use std::{error::Error, io::Write, process::ExitCode};

use api_types::{Money, user::Role};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, ErrorKind, NewItemCmd, SupplierCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "procurement_admin")]
#[command(about = "Admin utilities for the procurement service (bootstrap users and catalog)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./procurement.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Supplier(Supplier),
    Item(Item),
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

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    Staff,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Staff => Role::Staff,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Staff)]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct Supplier {
    #[command(subcommand)]
    command: SupplierCommand,
}

#[derive(Subcommand, Debug)]
enum SupplierCommand {
    Create(SupplierCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct SupplierCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args, Debug)]
struct Item {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Create(ItemCreateArgs),
    List(ItemListArgs),
}

#[derive(Args, Debug)]
struct ItemCreateArgs {
    #[arg(long)]
    supplier_id: i32,
    #[arg(long)]
    name: String,
    /// Unit price, e.g. `12.50`.
    #[arg(long)]
    price: Money,
    #[arg(long, default_value_t = 0)]
    stock: i64,
}

#[derive(Args, Debug)]
struct ItemListArgs {
    #[arg(long)]
    supplier_id: Option<i32>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> CliResult<String> {
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

fn prompt_new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
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

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn execute(engine: &Engine, command: Command) -> Result<(), EngineError> {
    match command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()
                .map_err(|err| EngineError::InvalidInput(err.to_string()))?;
            let user = engine
                .register_user(&args.username, &password, args.role.into())
                .await?;
            println!(
                "created user: {} (id {}, {})",
                user.username,
                user.id,
                user.role.as_str()
            );
        }
        Command::Supplier(Supplier {
            command: SupplierCommand::Create(args),
        }) => {
            let mut cmd = SupplierCmd::new(args.name, args.email);
            if let Some(address) = args.address {
                cmd = cmd.address(address);
            }
            let supplier = engine.new_supplier(cmd).await?;
            println!("created supplier: {} (id {})", supplier.name, supplier.id);
        }
        Command::Supplier(Supplier {
            command: SupplierCommand::List,
        }) => {
            for supplier in engine.suppliers().await? {
                println!("{}\t{}\t{}", supplier.id, supplier.name, supplier.email);
            }
        }
        Command::Item(Item {
            command: ItemCommand::Create(args),
        }) => {
            let item = engine
                .new_item(NewItemCmd::new(args.name, args.price, args.supplier_id).stock(args.stock))
                .await?;
            println!(
                "created item: {} (id {}, price {}, stock {})",
                item.name, item.id, item.price, item.stock
            );
        }
        Command::Item(Item {
            command: ItemCommand::List(args),
        }) => {
            for item in engine.items(args.supplier_id).await? {
                println!(
                    "{}\t{}\t{}\t{}\tsupplier {}",
                    item.id, item.name, item.price, item.stock, item.supplier_id
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match execute(&engine, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{err}");
            let code = match err.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::Unauthorized => 1,
                ErrorKind::Internal => 3,
            };
            Ok(ExitCode::from(code))
        }
    }
}
