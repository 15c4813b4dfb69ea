use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use resortdesk_lib::desk::{Confirm, Desk, Notice, Outcome, TabKind};
use resortdesk_lib::{logging, shell, AppResult, DeskConfig, LogConfig, Store};

/// Exit code for a failed operation.
const EXIT_FAILED: i32 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "resortdesk",
    about = "Guest, service and appointment records for a small resort",
    version
)]
struct Cli {
    /// SQLite database file; created if missing.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,
    /// Write logs to a daily rolling file in this directory instead of stderr.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive shell (the default).
    Shell,
    /// Guest records.
    #[command(subcommand)]
    Guests(GuestCommand),
    /// Paid services.
    #[command(subcommand)]
    Services(ServiceCommand),
    /// Appointments linking a guest to a service.
    #[command(subcommand)]
    Appointments(AppointmentCommand),
}

#[derive(Debug, Subcommand)]
enum GuestCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: i64,
    },
    Add(GuestArgs),
    /// Overwrites the given fields; the rest keep their stored values.
    Update {
        id: i64,
        #[command(flatten)]
        fields: GuestArgs,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ServiceCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: i64,
    },
    Add(ServiceArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ServiceArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum AppointmentCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: i64,
    },
    Add(AppointmentArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: AppointmentArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct GuestArgs {
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    middle_name: Option<String>,
    /// DD.MM.YYYY, not checked.
    #[arg(long)]
    birth_date: Option<String>,
    #[arg(long)]
    passport: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    check_in_date: Option<String>,
    #[arg(long)]
    check_out_date: Option<String>,
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl GuestArgs {
    fn fields(&self) -> [(&'static str, &Option<String>); 10] {
        [
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("middle_name", &self.middle_name),
            ("birth_date", &self.birth_date),
            ("passport", &self.passport),
            ("phone", &self.phone),
            ("check_in_date", &self.check_in_date),
            ("check_out_date", &self.check_out_date),
            ("room", &self.room),
            ("notes", &self.notes),
        ]
    }
}

#[derive(Debug, Args)]
struct ServiceArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Decimal price.
    #[arg(long)]
    price: Option<String>,
    /// Whole minutes.
    #[arg(long)]
    duration: Option<String>,
}

impl ServiceArgs {
    fn fields(&self) -> [(&'static str, &Option<String>); 4] {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("price", &self.price),
            ("duration", &self.duration),
        ]
    }
}

#[derive(Debug, Args)]
struct AppointmentArgs {
    /// Guest id or `"id: name"` selector entry.
    #[arg(long)]
    guest: Option<String>,
    /// Service id or `"id: name"` selector entry.
    #[arg(long)]
    service: Option<String>,
    /// DD.MM.YYYY
    #[arg(long)]
    date: Option<String>,
    /// HH:MM, 24-hour.
    #[arg(long)]
    time: Option<String>,
    /// Scheduled, Completed or Cancelled.
    #[arg(long)]
    status: Option<String>,
}

impl AppointmentArgs {
    fn fields(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("guest", &self.guest),
            ("service", &self.service),
            ("date", &self.date),
            ("time", &self.time),
            ("status", &self.status),
        ]
    }
}

/// One-shot row action, already reduced to what the desk needs.
enum RowAction<'a> {
    List { json: bool },
    Show { id: i64 },
    Add { fields: Vec<(&'static str, &'a Option<String>)> },
    Update {
        id: i64,
        fields: Vec<(&'static str, &'a Option<String>)>,
    },
    Delete { id: i64, yes: bool },
}

impl<'a> From<&'a GuestCommand> for RowAction<'a> {
    fn from(command: &'a GuestCommand) -> Self {
        match command {
            GuestCommand::List { json } => RowAction::List { json: *json },
            GuestCommand::Show { id } => RowAction::Show { id: *id },
            GuestCommand::Add(args) => RowAction::Add {
                fields: args.fields().to_vec(),
            },
            GuestCommand::Update { id, fields } => RowAction::Update {
                id: *id,
                fields: fields.fields().to_vec(),
            },
            GuestCommand::Delete { id, yes } => RowAction::Delete { id: *id, yes: *yes },
        }
    }
}

impl<'a> From<&'a ServiceCommand> for RowAction<'a> {
    fn from(command: &'a ServiceCommand) -> Self {
        match command {
            ServiceCommand::List { json } => RowAction::List { json: *json },
            ServiceCommand::Show { id } => RowAction::Show { id: *id },
            ServiceCommand::Add(args) => RowAction::Add {
                fields: args.fields().to_vec(),
            },
            ServiceCommand::Update { id, fields } => RowAction::Update {
                id: *id,
                fields: fields.fields().to_vec(),
            },
            ServiceCommand::Delete { id, yes } => RowAction::Delete { id: *id, yes: *yes },
        }
    }
}

impl<'a> From<&'a AppointmentCommand> for RowAction<'a> {
    fn from(command: &'a AppointmentCommand) -> Self {
        match command {
            AppointmentCommand::List { json } => RowAction::List { json: *json },
            AppointmentCommand::Show { id } => RowAction::Show { id: *id },
            AppointmentCommand::Add(args) => RowAction::Add {
                fields: args.fields().to_vec(),
            },
            AppointmentCommand::Update { id, fields } => RowAction::Update {
                id: *id,
                fields: fields.fields().to_vec(),
            },
            AppointmentCommand::Delete { id, yes } => {
                RowAction::Delete { id: *id, yes: *yes }
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let config = DeskConfig::new(
        cli.db.clone(),
        LogConfig::from_env(cli.log_json, cli.log_dir.clone()),
    );

    let guard = match logging::init(&config.log) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(EXIT_FAILED);
        }
    };

    let code = match run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(target: "resortdesk", event = "command_failed", error = %format!("{err:#}"));
            eprintln!("Error: {err:#}");
            EXIT_FAILED
        }
    };

    // process::exit skips destructors; flush the log file first.
    drop(guard);
    process::exit(code);
}

async fn run(command: Option<Commands>, config: &DeskConfig) -> Result<i32> {
    let store = Store::open(&config.db_path)
        .await
        .with_context(|| format!("open {}", config.db_path.display()))?;
    let result = handle_cli(command.unwrap_or(Commands::Shell), &store).await;
    store.close().await;
    result
}

async fn handle_cli(command: Commands, store: &Store) -> Result<i32> {
    match command {
        Commands::Shell => {
            let mut desk = Desk::open(store).await?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            shell::run_shell(&mut desk, stdin.lock(), &mut stdout).await?;
            Ok(0)
        }
        Commands::Guests(command) => {
            handle_rows(store, TabKind::Guests, RowAction::from(&command)).await
        }
        Commands::Services(command) => {
            handle_rows(store, TabKind::Services, RowAction::from(&command)).await
        }
        Commands::Appointments(command) => {
            handle_rows(store, TabKind::Appointments, RowAction::from(&command)).await
        }
    }
}

async fn handle_rows(store: &Store, tab: TabKind, action: RowAction<'_>) -> Result<i32> {
    let mut desk = Desk::open(store).await?;
    let mut stdout = io::stdout();

    let result: AppResult<Option<Outcome>> = match action {
        RowAction::List { json } => {
            if json {
                print_rows_json(&desk, tab)?;
            } else {
                shell::write_rows(&desk, tab, &mut stdout)?;
            }
            Ok(None)
        }
        RowAction::Show { id } => match desk.select(tab, id) {
            Ok(()) => {
                shell::write_form(&desk, tab, &mut stdout)?;
                Ok(None)
            }
            Err(err) => Err(err),
        },
        RowAction::Add { fields } => {
            match apply_fields(&mut desk, tab, &fields) {
                Ok(()) => desk.add(tab).await.map(Some),
                Err(err) => Err(err),
            }
        }
        RowAction::Update { id, fields } => {
            let prepared = desk
                .select(tab, id)
                .and_then(|()| apply_fields(&mut desk, tab, &fields));
            match prepared {
                Ok(()) => desk.update(tab).await.map(Some),
                Err(err) => Err(err),
            }
        }
        RowAction::Delete { id, yes } => match desk.select(tab, id) {
            Ok(()) => {
                let mut confirm = |question: &str| yes || ask_stdin(question);
                desk.delete(tab, &mut confirm as &mut dyn Confirm)
                    .await
                    .map(Some)
            }
            Err(err) => Err(err),
        },
    };

    match result {
        Ok(None) => Ok(0),
        Ok(Some(outcome)) => {
            match Notice::from_outcome(&outcome) {
                Some(notice) => println!("{}", notice.text),
                None => println!("Cancelled."),
            }
            if let Some(err) = desk.take_reload_error() {
                eprintln!("{}", Notice::reload_failed(&err));
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("{}", Notice::from_error(&err));
            Ok(EXIT_FAILED)
        }
    }
}

/// Copies the given options into the tab's form; absent ones are left alone.
fn apply_fields(
    desk: &mut Desk,
    tab: TabKind,
    fields: &[(&'static str, &Option<String>)],
) -> AppResult<()> {
    for (field, value) in fields {
        if let Some(value) = value {
            desk.set_field(tab, field, value)?;
        }
    }
    Ok(())
}

fn ask_stdin(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => shell::is_yes(&answer),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize rows")?;
    println!("{json}");
    Ok(())
}

fn print_rows_json(desk: &Desk, tab: TabKind) -> Result<()> {
    match tab {
        TabKind::Guests => print_json(desk.guests.rows()),
        TabKind::Services => print_json(desk.services.rows()),
        TabKind::Appointments => print_json(desk.appointments.rows()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_keeps_only_given_fields() {
        let cli = Cli::try_parse_from([
            "resortdesk",
            "--db",
            "desk.sqlite3",
            "services",
            "update",
            "3",
            "--price",
            "1750",
        ])
        .expect("parse");
        assert_eq!(cli.db, Some(PathBuf::from("desk.sqlite3")));
        let Some(Commands::Services(ServiceCommand::Update { id, fields })) = cli.command else {
            panic!("expected services update");
        };
        assert_eq!(id, 3);
        let given: Vec<_> = fields
            .fields()
            .into_iter()
            .filter(|(_, value)| value.is_some())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(given, ["price"]);
    }
}
