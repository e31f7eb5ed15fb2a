use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use riziq_cli::{init_tracing, Config, Input, Rows, TableSink, HELP};
use riziq_console::{guard, Backends, Command, Exit, Gate, Route, ViewController, ViewKind};
use riziq_store::db::init_pool;
use riziq_store::{DirectoryIdentity, SqliteCollection, SqliteDirectory, SqliteSlots};
use riziq_types::Kind;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let config = Config::load()?;
    let pool = init_pool(&config.database_url).await?;
    let directory = SqliteDirectory::new(pool.clone());

    match args.get(1).map(String::as_str) {
        Some("register") => {
            let email = args.get(2).ok_or("usage: riziq-admin register <email>")?;
            let user = directory.create_user(email).await?;
            println!("Registered {} ({})", user.email, user.uid);
            Ok(())
        }
        Some(email) => {
            let view = match args.get(2) {
                Some(name) => ViewKind::parse(name).ok_or_else(|| format!("unknown view `{name}`"))?,
                None => ViewKind::LANDING,
            };
            run(&config, pool, directory, email, view).await
        }
        None => {
            eprintln!("Usage: {} <email> [view]", args[0]);
            eprintln!("       {} register <email>", args[0]);
            eprintln!("Views: applications, jobs, blogs, testimonials, notifications, messages");
            std::process::exit(1);
        }
    }
}

async fn run(
    config: &Config,
    pool: riziq_store::db::DbPool,
    directory: SqliteDirectory,
    email: &str,
    view: ViewKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = Arc::new(DirectoryIdentity::new(directory));
    identity.sign_in(email).await?;

    let (session, view) = match guard(identity, Route::View(view)).await {
        Gate::Enter { session, view } => (session, view),
        Gate::Login => return Err("not signed in".into()),
        Gate::Denied => return Err("Access denied: not an admin".into()),
    };

    let backends = Backends::new(Arc::new(SqliteSlots::new(pool.clone(), config.poll_interval)))
        .with_collection(
            Kind::Application,
            Arc::new(SqliteCollection::new(pool.clone(), "applications", config.poll_interval)),
        )
        .with_collection(
            Kind::JobPosting,
            Arc::new(SqliteCollection::new(pool, "jobs", config.poll_interval)),
        );

    let rows = Rows::default();
    println!("Riziq admin: {view} ({})", session.user().email);
    let controller = ViewController::open(
        session,
        view,
        &backends,
        &config.console(),
        TableSink::stdout(rows.clone()),
    )
    .await?;

    let (commands, receiver) = mpsc::channel(16);
    let reader = tokio::spawn(read_commands(rows, stdin_lines(), commands));

    let exit = controller.run(receiver).await;
    reader.abort();

    match exit {
        Exit::SignedOut => println!("Signed out."),
        Exit::Closed => info!("input closed"),
    }
    Ok(())
}

/// Forwards stdin lines as commands until `quit`, end of input or the view
/// stops listening.
async fn read_commands(
    rows: Rows,
    mut lines: mpsc::UnboundedReceiver<String>,
    commands: mpsc::Sender<Command>,
) {
    while let Some(line) = lines.recv().await {
        let input = match Input::parse(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                println!("{HELP}");
                continue;
            }
            Ok(input) => input,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let command = match input.into_command(&rows) {
            Ok(Some(Command::Delete { key, .. })) => {
                if !confirm(&mut lines).await {
                    println!("Delete cancelled.");
                    continue;
                }
                Command::Delete { key, confirmed: true }
            }
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        debug!(?command, "sending command");
        if commands.send(command).await.is_err() {
            break;
        }
    }
}

async fn confirm(lines: &mut mpsc::UnboundedReceiver<String>) -> bool {
    println!("Are you sure you want to delete this item? This cannot be undone. [y/N]");
    matches!(
        lines.recv().await,
        Some(answer) if answer.trim().eq_ignore_ascii_case("y") || answer.trim().eq_ignore_ascii_case("yes")
    )
}

/// Stdin lines, read on a plain thread so a pending read never holds up exit.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
