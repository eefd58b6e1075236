use crate::{
    config::Config,
    form::{Draft, Field},
    journal::Journal,
    render,
    session::{Session, SessionError, Submitted},
    store::UserStore,
    user::{split_name, UserKey},
};
use anyhow::{anyhow, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::path::PathBuf;

pub struct Context<S: UserStore> {
    pub config: Config,
    pub session_id: String,
    pub session: RefCell<Session<S>>,
    pub journal: RefCell<Option<Journal>>,
    pub tracing: RefCell<bool>,
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Add,
    Edit(UserKey),
    Delete(UserKey),
    Set(Field, String),
    Form,
    Submit,
    Help,
    Exit,
    Trace,
    Session,
    Config,
}

impl Command {
    /// Store operation this command performs, for error reporting.
    /// `editing` is the key of the form that was open when it ran.
    fn op(&self, editing: Option<UserKey>) -> &'static str {
        match self {
            Self::Refresh => "fetch_all",
            Self::Delete(_) => "delete",
            Self::Submit if editing.is_some() => "update",
            Self::Submit => "create",
            _ => "local",
        }
    }

    fn key(&self) -> Option<UserKey> {
        match self {
            Self::Edit(key) | Self::Delete(key) => Some(*key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words = shell_words::split(line).map_err(|e| format!("cannot parse input: {}", e))?;
    let Some((head, rest)) = words.split_first() else {
        return Err("empty command".to_string());
    };

    let key_arg = |name: &str| -> Result<UserKey, String> {
        let raw = rest
            .first()
            .ok_or_else(|| format!("usage: {} <key>", name))?;
        UserKey::parse(raw).ok_or_else(|| format!("invalid key: {}", raw))
    };

    match head.as_str() {
        "/exit" | "/quit" => Ok(Command::Exit),
        "/help" => Ok(Command::Help),
        "/trace" => Ok(Command::Trace),
        "/session" => Ok(Command::Session),
        "/config" => Ok(Command::Config),
        "list" | "ls" => Ok(Command::List),
        "refresh" => Ok(Command::Refresh),
        "add" => Ok(Command::Add),
        "edit" => key_arg("edit").map(Command::Edit),
        "delete" | "rm" => key_arg("delete").map(Command::Delete),
        "form" => Ok(Command::Form),
        "submit" => Ok(Command::Submit),
        other => match Field::from_str(other) {
            Some(field) if !rest.is_empty() => Ok(Command::Set(field, rest.join(" "))),
            Some(field) => Err(format!("usage: {} <value>", field.as_str())),
            None => Err(format!("Unknown command: {}", other)),
        },
    }
}

fn trace<S: UserStore>(ctx: &Context<S>, label: &str, content: &str) {
    if *ctx.tracing.borrow() {
        eprintln!("[TRACE:{}] {}", label, content);
    }
}

/// Write to the journal if one is open. Journal failures never abort a command.
fn log_journal<S: UserStore>(ctx: &Context<S>, write: impl FnOnce(&mut Journal) -> Result<()>) {
    if let Some(journal) = ctx.journal.borrow_mut().as_mut() {
        if let Err(e) = write(journal) {
            eprintln!("Warning: failed to write journal: {}", e);
        }
    }
}

/// Report a failed command on the diagnostic channel
pub fn report_error<S: UserStore>(ctx: &Context<S>, cmd: &Command, err: &SessionError) {
    let editing = ctx.session.borrow().form().editing_key();
    if let SessionError::Store(e) = err {
        let key = cmd.key().or(editing);
        log_journal(ctx, |j| j.request_failed(cmd.op(editing), key, e));
    }
    if let Some(line) = error_line(ctx, cmd, err) {
        eprintln!("{}", line);
    }
}

/// Stderr line for a failed command. None when a failed submit already
/// printed the same message under the form.
fn error_line<S: UserStore>(
    ctx: &Context<S>,
    cmd: &Command,
    err: &SessionError,
) -> Option<String> {
    let message = err.to_string();
    let shown_inline =
        *cmd == Command::Submit && ctx.session.borrow().last_error() == Some(message.as_str());
    (!shown_inline).then(|| format!("error: {}", message))
}

/// Warning for names that will not read back as typed: the full name is
/// stored as one string and split at its first space.
fn name_split_warning(draft: &Draft) -> Option<String> {
    if draft.name_round_trips() {
        return None;
    }
    let name = draft.display_name();
    let (first, last) = split_name(&name);
    Some(format!(
        "Warning: \"{}\" will read back as first {:?}, last {:?}",
        name.trim_end(),
        first,
        last.trim_end()
    ))
}

/// Fetch the collection and log the outcome
pub fn refresh<S: UserStore>(ctx: &Context<S>) -> Result<usize, SessionError> {
    let count = ctx.session.borrow_mut().load()?;
    log_journal(ctx, |j| j.fetch_ok(count));
    trace(ctx, "fetch", &format!("{} users", count));
    Ok(count)
}

pub fn execute<S: UserStore>(ctx: &Context<S>, cmd: &Command) -> Result<Flow, SessionError> {
    match cmd {
        Command::Exit => return Ok(Flow::Exit),
        Command::Help => print_help(),
        Command::Trace => {
            let mut t = ctx.tracing.borrow_mut();
            *t = !*t;
            println!("Tracing: {}", if *t { "on" } else { "off" });
        }
        Command::Session => {
            println!("Session: {}", ctx.session_id);
            match ctx.journal.borrow().as_ref() {
                Some(j) => println!("Journal: {:?}", j.path),
                None => println!("Journal: disabled"),
            }
        }
        Command::Config => match toml::to_string_pretty(&ctx.config) {
            Ok(text) => print!("{}", text),
            Err(e) => eprintln!("Warning: cannot render config: {}", e),
        },
        Command::List => print!("{}", render::table(ctx.session.borrow().users())),
        Command::Refresh => {
            let count = refresh(ctx)?;
            println!("Loaded {} users", count);
        }
        Command::Add => {
            ctx.session.borrow_mut().open_create()?;
            print_form(ctx);
        }
        Command::Edit(key) => {
            ctx.session.borrow_mut().open_edit(*key)?;
            print_form(ctx);
        }
        Command::Set(field, value) => {
            ctx.session.borrow_mut().set_field(*field, value)?;
            trace(ctx, "draft", &format!("{} = {:?}", field.as_str(), value));
            if *field == Field::First {
                if let Some(warning) = name_split_warning(ctx.session.borrow().draft()) {
                    eprintln!("{}", warning);
                }
            }
        }
        Command::Form => print_form(ctx),
        Command::Submit => {
            let result = ctx.session.borrow_mut().submit();
            match result {
                Ok(submitted) => on_submitted(ctx, &submitted),
                Err(e) => {
                    print_form(ctx);
                    return Err(e);
                }
            }
        }
        Command::Delete(key) => {
            ctx.session.borrow_mut().delete(*key)?;
            log_journal(ctx, |j| j.user_deleted(*key));
            println!("User with id {} deleted", key);
        }
    }
    Ok(Flow::Continue)
}

fn on_submitted<S: UserStore>(ctx: &Context<S>, submitted: &Submitted) {
    let shown = submitted
        .resolved_key()
        .map_or_else(|| "-".to_string(), |k| k.to_string());
    match submitted {
        Submitted::Created { requested, record } => {
            log_journal(ctx, |j| j.user_created(*requested, record));
            if submitted.resolved_key() != Some(*requested) {
                trace(
                    ctx,
                    "identity",
                    &format!("requested key {}, server listed it as {}", requested, shown),
                );
            }
            println!("User added: {} ({})", record.name, shown);
        }
        Submitted::Updated {
            key,
            record,
            replaced,
        } => {
            log_journal(ctx, |j| j.user_updated(*key, record, *replaced));
            if *replaced == 0 {
                eprintln!(
                    "Warning: user {} is no longer listed; update not shown",
                    key
                );
            } else if submitted.resolved_key() != Some(*key) {
                trace(
                    ctx,
                    "identity",
                    &format!("user {} is now listed as {}", key, shown),
                );
            }
            println!("User updated: {} ({})", record.name, shown);
        }
    }
}

fn print_form<S: UserStore>(ctx: &Context<S>) {
    let session = ctx.session.borrow();
    print!(
        "{}",
        render::form(session.form(), session.draft(), session.last_error())
    );
}

fn print_help() {
    println!("Users:");
    println!("  list              - show the user table");
    println!("  refresh           - fetch the collection again");
    println!("  add               - open the form for a new user");
    println!("  edit <key>        - open the form on an existing user");
    println!("  delete <key>      - delete a user");
    println!("Form:");
    println!("  first <value>     - set first name (one word; the name splits at its first space)");
    println!("  last <value>      - set last name");
    println!("  username <value>  - set username");
    println!("  form              - show the form");
    println!("  submit            - add or update the user");
    println!("Session:");
    println!("  /help             - show commands");
    println!("  /trace            - toggle tracing");
    println!("  /session          - show session info");
    println!("  /config           - show effective configuration");
    println!("  /exit             - quit");
}

/// Run each line in order; stops at the first failing command
pub fn run_once<S: UserStore>(ctx: &Context<S>, lines: &[String]) -> Result<()> {
    for line in lines {
        let cmd = parse_command(line).map_err(|e| anyhow!(e))?;
        match execute(ctx, &cmd) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => {
                report_error(ctx, &cmd, &e);
                return Err(anyhow!("command failed: {}", line));
            }
        }
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".roster").join("history"))
}

pub fn run_repl<S: UserStore>(ctx: Context<S>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = rl.load_history(path);
    }

    println!("roster - type /help for commands, /exit to quit");
    print!("{}", render::table(ctx.session.borrow().users()));

    loop {
        match rl.readline("users> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                let cmd = match parse_command(line) {
                    Ok(cmd) => cmd,
                    Err(msg) => {
                        println!("{}", msg);
                        continue;
                    }
                };
                match execute(&ctx, &cmd) {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => report_error(&ctx, &cmd, &e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = rl.save_history(path) {
            eprintln!("Warning: failed to save history: {}", e);
        }
    }

    Ok(())
}
