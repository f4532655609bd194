use exam_portal::{
    Session,
    auth::{AuthState, SupabaseAuth},
    catalog::{CatalogState, SupabaseCatalog},
    config::{AppConfig, Env},
    console::{self, Command, ViewerExit},
    errors::AuthError,
    models::{DocumentType, Faculty, Paper, Subject, User},
    navigation::{Action, View},
    session::ActionOutcome,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type InputLines = Lines<BufReader<Stdin>>;

/// main
///
/// The asynchronous entry point for the portal client, responsible for initializing
/// all core components: Configuration, Logging, Collaborators, and the Session loop.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() implements the fail-fast principle for missing backend settings.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Sets the default log level. It prioritizes the RUST_LOG environment variable,
    // falling back to a sensible default for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exam_portal=debug".into());

    // 3. Initialize Logging based on Environment
    // The structured logging format is dynamically selected based on the APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal client starting in {:?} mode", config.env);

    // 4. Collaborator Initialization (Supabase)
    // The catalog serves the read-only hierarchy and the access log; the auth
    // provider consults it to resolve the subscription flag at sign-in.
    let catalog = Arc::new(SupabaseCatalog::new(&config)) as CatalogState;
    let auth = Arc::new(SupabaseAuth::new(&config, Arc::clone(&catalog))) as AuthState;

    // 5. Session-Change Observer
    // Every session transition is published on the auth watch channel; log
    // them so traces show who was signed in around each recorded access.
    let mut session_changes = auth.subscribe();
    tokio::spawn(async move {
        while session_changes.changed().await.is_ok() {
            let signed_in = session_changes.borrow_and_update().clone();
            match signed_in {
                Some(user) => tracing::info!("Session established for {}", user.email),
                None => tracing::info!("Session ended"),
            }
        }
    });

    // 6. Session Assembly
    // Bundles the collaborators with a fresh navigation state.
    let mut session = Session::new(config, catalog, auth);

    // 7. The interactive loop.
    if let Err(e) = run(&mut session).await {
        tracing::error!("Portal session ended with an I/O error: {}", e);
    }
}

/// The listing currently on screen; selection commands index into it.
#[derive(Default)]
struct Listing {
    faculties: Vec<Faculty>,
    subjects: Vec<Subject>,
    papers: Vec<Paper>,
}

/// run
///
/// Renders the current screen, reads one command, applies it, repeats. While
/// a document is open the raw-mode viewer owns the terminal instead.
async fn run(session: &mut Session) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if session.state().view == View::Viewer {
            match view_document(session).await? {
                ViewerExit::Quit => break,
                ViewerExit::Back => {
                    session.dispatch(Action::Back);
                }
                ViewerExit::Download => match download_current(session).await {
                    Ok(path) => println!("Saved to {}", path.display()),
                    Err(e) => println!("{}", e),
                },
            }
            continue;
        }

        let listing = load_screen(session).await;

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            // stdin closed
            break;
        };

        if !apply_command(session, &mut lines, &line, &listing).await? {
            break;
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// Fetches and prints the listing for the current screen. Failed loads are
/// reported inline; with the fallback substitution enabled they surface as
/// sample data instead (see the session's screen-data methods).
async fn load_screen(session: &Session) -> Listing {
    let mut listing = Listing::default();
    let user = session.current_user();

    println!();
    println!("{}", console::render_header(&session.breadcrumb(), user.as_ref()));

    match session.state().view {
        View::Faculties => match session.faculties().await {
            Ok(list) => {
                println!("{}", console::render_faculties(&list));
                listing.faculties = list;
            }
            Err(e) => println!("Could not load faculties: {}", e),
        },
        View::Subjects => {
            if let Some(faculty) = session.state().selected_faculty.clone() {
                match session.subjects().await {
                    Ok(list) => {
                        println!("{}", console::render_subjects(&faculty, &list));
                        listing.subjects = list;
                    }
                    Err(e) => println!("Could not load subjects: {}", e),
                }
            }
        }
        View::Exams => {
            if let Some(subject) = session.state().selected_subject.clone() {
                match session.papers().await {
                    Ok(list) => {
                        println!("{}", console::render_papers(&subject, &list));
                        listing.papers = list;
                    }
                    Err(e) => println!("Could not load papers: {}", e),
                }
            }
        }
        View::Viewer => {}
    }

    println!("{}", console::help_for(session.state().view));
    listing
}

/// Applies one parsed command. Returns `false` when the loop should end.
async fn apply_command(
    session: &mut Session,
    lines: &mut InputLines,
    line: &str,
    listing: &Listing,
) -> io::Result<bool> {
    match console::parse_command(line) {
        Command::Quit => return Ok(false),
        Command::Back => {
            if session.dispatch(Action::Back) == ActionOutcome::Ignored {
                println!("Already at the faculty list.");
            }
        }
        Command::Select(index) => select_entry(session, listing, index),
        Command::SelectDocument(index, document) => {
            request_document(session, lines, listing, index, document).await?;
        }
        Command::SignIn => {
            if let Some((email, password)) = prompt_credentials(lines).await? {
                report_sign_in(session.sign_in(&email, &password).await);
            }
        }
        Command::SignUp => {
            if let Some((email, password)) = prompt_credentials(lines).await? {
                report_sign_in(session.sign_up(&email, &password).await);
            }
        }
        Command::SignOut => {
            session.sign_out().await;
            println!("Signed out.");
        }
        // The next iteration reprints the screen together with its commands.
        Command::Help => {}
        Command::Unknown(input) => println!("Unrecognized command: {}", input),
    }
    Ok(true)
}

/// Resolves a bare index against the current screen's listing.
fn select_entry(session: &mut Session, listing: &Listing, index: usize) {
    let slot = index.checked_sub(1);
    match session.state().view {
        View::Faculties => match slot.and_then(|i| listing.faculties.get(i)) {
            Some(faculty) => {
                session.dispatch(Action::SelectFaculty(faculty.clone()));
            }
            None => println!("No such entry: {}", index),
        },
        View::Subjects => match slot.and_then(|i| listing.subjects.get(i)) {
            Some(subject) => {
                session.dispatch(Action::SelectSubject(subject.clone()));
            }
            None => println!("No such entry: {}", index),
        },
        View::Exams => println!(
            "Pick a document: {}p for the question paper, {}a for the answer key",
            index, index
        ),
        View::Viewer => {}
    }
}

/// Dispatches a document request and walks the user through whatever the gate
/// asks for. After a successful sign-in the user re-issues the request; the
/// gate decides afresh against the new session.
async fn request_document(
    session: &mut Session,
    lines: &mut InputLines,
    listing: &Listing,
    index: usize,
    document: DocumentType,
) -> io::Result<()> {
    let Some(paper) = index.checked_sub(1).and_then(|i| listing.papers.get(i)) else {
        println!("No such entry: {}", index);
        return Ok(());
    };

    let outcome = session.dispatch(Action::RequestAccess {
        paper: paper.clone(),
        document,
    });

    match outcome {
        ActionOutcome::SignInRequired => {
            println!("Sign in to access this document.");
            if let Some((email, password)) = prompt_credentials(lines).await? {
                report_sign_in(session.sign_in(&email, &password).await);
            }
        }
        ActionOutcome::SubscriptionRequired => {
            println!("Upgrade to Premium");
            println!("Get unlimited access to all exam papers, answer keys, and premium features");
        }
        _ => {}
    }
    Ok(())
}

/// Reads the sign-in form. Returns `None` when stdin closes mid-prompt.
async fn prompt_credentials(lines: &mut InputLines) -> io::Result<Option<(String, String)>> {
    print!("Email: ");
    io::stdout().flush()?;
    let Some(email) = lines.next_line().await? else {
        return Ok(None);
    };

    print!("Password: ");
    io::stdout().flush()?;
    let Some(password) = lines.next_line().await? else {
        return Ok(None);
    };

    Ok(Some((email.trim().to_string(), password.trim().to_string())))
}

/// Prints the outcome of a sign-in or sign-up attempt. Errors are surfaced
/// verbatim and the prompt stays available for another try.
fn report_sign_in(result: Result<User, AuthError>) {
    match result {
        Ok(user) => println!("Signed in as {}", console::account_line(Some(&user))),
        Err(e) => println!("{}", e),
    }
}

/// Runs the raw-mode viewer on a blocking task and reports how it was left.
async fn view_document(session: &Session) -> io::Result<ViewerExit> {
    let Some(request) = session.current_document() else {
        return Ok(ViewerExit::Back);
    };

    let protection = session.protection();
    let title = request.paper.title.clone();
    let year = request.paper.year.clone();
    let label = request.document.label().to_string();
    let filename = request.download_filename();
    let user = session.current_user();

    tokio::task::spawn_blocking(move || {
        console::run_viewer(&protection, &title, &year, &label, &filename, user.as_ref())
    })
    .await
    .map_err(io::Error::other)?
}

/// download_current
///
/// Fetches the open document into the system temp directory under its portal
/// filename. Absolute locators download as-is; the bundled sample locators
/// are site-relative and fail here with a clear message.
async fn download_current(session: &Session) -> Result<PathBuf, String> {
    let Some(request) = session.current_document() else {
        return Err("No document is open.".to_string());
    };

    let client = reqwest::Client::new();
    let response = client
        .get(request.url())
        .send()
        .await
        .map_err(|e| format!("Download failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "Download failed: backend returned {}",
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Download failed: {}", e))?;

    let path = std::env::temp_dir().join(request.download_filename());
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| format!("Could not save {}: {}", path.display(), e))?;

    Ok(path)
}
