//! Terminal front end.
//!
//! Renders the browsing screens, parses line commands, and runs the raw-mode
//! viewer for protected documents. All input reaching the viewer is routed
//! through the protection layer first; what the layer suppresses never acts.

use std::io::{self, Write};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use crate::models::{DocumentType, Faculty, Paper, Subject, User};
use crate::navigation::View;
use crate::protection::{ContentProtection, InputEvent, Key, KeyChord, SCREENSHOT_WARNING, Verdict};

/// Command
///
/// One parsed line of input on the browsing screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A 1-based index into the current listing.
    Select(usize),
    /// A paper index plus which of its documents to open ("3p" / "3a").
    SelectDocument(usize, DocumentType),
    Back,
    SignIn,
    SignUp,
    SignOut,
    Help,
    Quit,
    Unknown(String),
}

/// parse_command
///
/// Case-insensitive; surrounding whitespace is ignored. Anything that is not
/// a known word, an index, or an index with a `p`/`a` suffix comes back as
/// `Unknown` so the prompt can say what it saw.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let lowered = trimmed.to_lowercase();

    match lowered.as_str() {
        "b" | "back" => return Command::Back,
        "q" | "quit" | "exit" => return Command::Quit,
        "login" | "signin" => return Command::SignIn,
        "signup" | "register" => return Command::SignUp,
        "logout" | "signout" => return Command::SignOut,
        "h" | "help" | "?" => return Command::Help,
        _ => {}
    }

    if let Ok(index) = lowered.parse::<usize>() {
        return Command::Select(index);
    }
    if let Some(rest) = lowered.strip_suffix('p') {
        if let Ok(index) = rest.parse::<usize>() {
            return Command::SelectDocument(index, DocumentType::Paper);
        }
    }
    if let Some(rest) = lowered.strip_suffix('a') {
        if let Ok(index) = rest.parse::<usize>() {
            return Command::SelectDocument(index, DocumentType::Answer);
        }
    }

    Command::Unknown(trimmed.to_string())
}

// --- Screen Rendering ---

/// The account badge shown in the header.
pub fn account_line(user: Option<&User>) -> String {
    match user {
        Some(user) if user.subscription_active => format!("{} (Premium Member)", user.email),
        Some(user) => format!("{} (Free Account)", user.email),
        None => "Not signed in".to_string(),
    }
}

/// The portal header: title, breadcrumb, account badge.
pub fn render_header(breadcrumb: &str, user: Option<&User>) -> String {
    format!(
        "TechLions Exam Portal\n{}  |  {}\n",
        breadcrumb,
        account_line(user)
    )
}

pub fn render_faculties(faculties: &[Faculty]) -> String {
    let mut out = String::new();
    out.push_str("Choose Your Faculty\n");
    out.push_str("Select a faculty to access exam papers and study materials\n\n");
    for (index, faculty) in faculties.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", index + 1, faculty.name));
        out.push_str(&format!("     {}\n", faculty.description));
    }
    out
}

pub fn render_subjects(faculty: &Faculty, subjects: &[Subject]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} Subjects\n", faculty.name));
    out.push_str("Select a subject to view available exam papers\n\n");
    for (index, subject) in subjects.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} ({})\n     Semester {}, {} Credits\n",
            index + 1,
            subject.name,
            subject.code,
            subject.semester,
            subject.credits
        ));
    }
    out
}

/// Papers arrive newest academic year first; consecutive papers of the same
/// year are grouped under one year heading, mirroring how the portal has
/// always presented them.
pub fn render_papers(subject: &Subject, papers: &[Paper]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} Exam Papers\n", subject.name));
    out.push_str("Access previous year question papers and answer keys\n");

    let mut current_year: Option<&str> = None;
    for (index, paper) in papers.iter().enumerate() {
        if current_year != Some(paper.year.as_str()) {
            out.push_str(&format!("\nAcademic Year {}\n", paper.year));
            current_year = Some(paper.year.as_str());
        }
        out.push_str(&format!(
            "  {}. {} [{}]\n",
            index + 1,
            paper.title,
            paper.kind.label()
        ));
    }
    out
}

/// The command summary for the current screen.
pub fn help_for(view: View) -> &'static str {
    match view {
        View::Faculties => "Commands: <n> select faculty, login, signup, logout, q quit",
        View::Subjects => "Commands: <n> select subject, b back, login, signup, logout, q quit",
        View::Exams => {
            "Commands: <n>p question paper, <n>a answer key, b back, login, signup, logout, q quit"
        }
        View::Viewer => "Keys: d download, b back, q quit",
    }
}

// --- Protected Viewer ---

/// How the user left the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerExit {
    /// Return to the exams screen.
    Back,
    /// Leave the portal entirely.
    Quit,
    /// Fetch the document to a local file, then re-enter the viewer.
    Download,
}

/// The viewer screen, line by line. Kept separate from the drawing so the
/// content is testable without a terminal.
pub fn render_viewer_lines(
    title: &str,
    year: &str,
    document_label: &str,
    filename: &str,
    user: Option<&User>,
) -> Vec<String> {
    vec![
        "=== Content Protection Active ===".to_string(),
        "This content is protected. Screenshots, screen recording, and copying are disabled."
            .to_string(),
        String::new(),
        format!("{} - {}", title, document_label),
        format!("Academic Year: {}", year),
        format!("File: {}", filename),
        format!("Watermark: {}", account_line(user)),
        String::new(),
        help_for(View::Viewer).to_string(),
    ]
}

/// run_viewer
///
/// Shows one protected document until the user backs out, downloads, or
/// quits. The terminal is switched to raw mode on the alternate screen so the
/// document never lands in the scrollback, with mouse capture on so
/// right-click and drag reach the protection layer.
///
/// Blocks on terminal events between redraws, so it must run on a blocking
/// task rather than an async one.
pub fn run_viewer(
    protection: &ContentProtection,
    title: &str,
    year: &str,
    document_label: &str,
    filename: &str,
    user: Option<&User>,
) -> io::Result<ViewerExit> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Key-release reporting is a terminal extension; without it PrintScreen
    // arrives as a press and is translated by the event mapper.
    let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let res = viewer_loop(
        protection,
        title,
        year,
        document_label,
        filename,
        user,
        release_events,
    );

    // Restore terminal
    if release_events {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    res
}

fn viewer_loop(
    protection: &ContentProtection,
    title: &str,
    year: &str,
    document_label: &str,
    filename: &str,
    user: Option<&User>,
    release_events: bool,
) -> io::Result<ViewerExit> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), crossterm::cursor::MoveTo(0, 0))?;
    for line in render_viewer_lines(title, year, document_label, filename, user) {
        write!(stdout, "{}\r\n", line)?;
    }
    stdout.flush()?;

    loop {
        let event = event::read()?;
        let Some(input) = map_event(&event, release_events) else {
            continue;
        };

        match protection.inspect(&input) {
            // Swallowed without feedback, the way a cancelled default action is.
            Verdict::Suppress => {
                tracing::debug!("Protection suppressed {:?}", input);
                continue;
            }
            Verdict::Warn => {
                write!(stdout, "\r\n{}\r\n", SCREENSHOT_WARNING)?;
                stdout.flush()?;
                continue;
            }
            Verdict::Allow => {}
        }

        if let InputEvent::KeyDown(chord) = input {
            match chord.key {
                Key::Char('q') => return Ok(ViewerExit::Quit),
                Key::Char('c') if chord.ctrl => return Ok(ViewerExit::Quit),
                Key::Char('b') => return Ok(ViewerExit::Back),
                Key::Esc => return Ok(ViewerExit::Back),
                Key::Char('d') => return Ok(ViewerExit::Download),
                _ => {}
            }
        }
    }
}

// --- Terminal Event Mapping ---

/// map_event
///
/// Translates one terminal event into the protection layer's vocabulary.
/// `release_events` says whether this terminal reports key releases; when it
/// does not, the sole observable PrintScreen press is surfaced as the release
/// the layer watches for.
///
/// Returns `None` for events the layer has no opinion on (resize, scroll,
/// mouse movement).
pub fn map_event(event: &Event, release_events: bool) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key_event(key, release_events),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Right) => Some(InputEvent::ContextMenu),
            MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::SelectStart),
            _ => None,
        },
        _ => None,
    }
}

fn map_key_event(key: &KeyEvent, release_events: bool) -> Option<InputEvent> {
    // The dedicated menu key is the keyboard's context-menu trigger.
    if key.code == KeyCode::Menu {
        return match key.kind {
            KeyEventKind::Press => Some(InputEvent::ContextMenu),
            _ => None,
        };
    }

    let chord = KeyChord {
        key: map_key_code(key.code),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };

    match key.kind {
        KeyEventKind::Release => Some(InputEvent::KeyUp(chord)),
        _ if chord.key == Key::PrintScreen && !release_events => {
            Some(InputEvent::KeyUp(chord))
        }
        KeyEventKind::Press | KeyEventKind::Repeat => Some(InputEvent::KeyDown(chord)),
    }
}

fn map_key_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::F(n) => Key::Function(n),
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}
