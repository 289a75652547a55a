//! Interactive prompt.
//!
//! Lines starting with `/` are commands; anything else is a question for the
//! connected database. Ctrl-C cancels a running question, and exits when
//! pressed at an idle prompt.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use querydesk_core::models::Stats;
use querydesk_core::{ConnectionRequest, DbType, QueryDeskClient};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::render;

const HELP: &str = "\
Commands:
  /connect <postgresql|mysql> <host> <port> <user> <database> [password]
  /open <path>          Connect to a database file
  /schema               Show tables of the connected database
  /refresh              Re-read the schema
  /context              Show whether model context is loaded
  /load-context         Load model context
  /stats                Show backend queue statistics
  /history              Show recent questions
  /rerun <n>            Ask question n from /history again
  /clear                Clear the conversation
  /disconnect           Close the session
  /help                 Show this help
  /quit                 Exit
Anything else is asked as a question.";

/// A parsed input line.
#[derive(Debug, PartialEq)]
enum Command {
    Connect(ConnectionRequest),
    Open(PathBuf),
    Schema,
    Refresh,
    Context,
    LoadContext,
    Stats,
    History,
    Rerun(usize),
    Clear,
    Disconnect,
    Help,
    Quit,
    Ask(String),
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Ask(line.to_string())));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("connect", [db_type, host, port, user, database, password @ ..]) => {
                let port = port.parse().map_err(|_| format!("Invalid port '{port}'"))?;
                let mut request = ConnectionRequest::new(DbType::parse(db_type), *host, *user, *database)
                    .with_port(port);
                if let [password] = password {
                    request = request.with_password(*password);
                }
                Self::Connect(request)
            }
            ("connect", _) => return Err("Usage: /connect <postgresql|mysql> <host> <port> <user> <database> [password]".into()),
            ("open", [path]) => Self::Open(PathBuf::from(path)),
            ("open", _) => return Err("Usage: /open <path>".into()),
            ("schema", []) => Self::Schema,
            ("refresh", []) => Self::Refresh,
            ("context", []) => Self::Context,
            ("load-context", []) => Self::LoadContext,
            ("stats", []) => Self::Stats,
            ("history", []) => Self::History,
            ("rerun", [n]) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Rerun(n),
                _ => return Err(format!("Invalid history index '{n}'")),
            },
            ("clear", []) => Self::Clear,
            ("disconnect", []) => Self::Disconnect,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(format!("Unknown command '/{name}'. Type /help for commands.")),
        };
        Ok(Some(command))
    }
}

/// Run the prompt until `/quit`, end of input, or Ctrl-C at an idle prompt.
pub async fn run(client: QueryDeskClient, open: Option<PathBuf>) -> ExitCode {
    client.on_progress(Arc::new(|stats: &Stats| {
        eprintln!("  {}", render::progress_line(stats));
    }));

    if let Some(path) = open {
        open_file(&client, &path).await;
    }

    println!("QueryDesk {}. Type /help for commands.", env!("CARGO_PKG_VERSION"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if let Err(e) = write_prompt(&mut stdout, &prompt(&client)).await {
            tracing::warn!(error = %e, "Failed to write prompt");
        }

        let line = match next_input(&mut lines, tokio::signal::ctrl_c()).await {
            Input::Line(line) => line,
            Input::Eof => break,
            Input::Interrupted => {
                println!();
                break;
            }
            Input::Failed(e) => {
                tracing::error!(error = %e, "Failed to read input");
                return ExitCode::FAILURE;
            }
        };

        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(&client, command).await,
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
    }

    if client.store().is_connected() {
        if let Err(e) = client.disconnect().await {
            tracing::warn!(error = %e, "Disconnect on exit failed");
        }
    }

    tracing::info!("QueryDesk exiting");
    ExitCode::SUCCESS
}

/// What the prompt loop read.
#[derive(Debug)]
enum Input {
    Line(String),
    Eof,
    Interrupted,
    Failed(std::io::Error),
}

/// Read the next line unless `interrupt` fires first.
async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> Input
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    tokio::select! {
        line = lines.next_line() => match line {
            Ok(Some(line)) => Input::Line(line),
            Ok(None) => Input::Eof,
            Err(e) => Input::Failed(e),
        },
        _ = interrupt => Input::Interrupted,
    }
}

async fn write_prompt<W: AsyncWrite + Unpin>(out: &mut W, prompt: &str) -> std::io::Result<()> {
    out.write_all(prompt.as_bytes()).await?;
    out.flush().await
}

fn prompt(client: &QueryDeskClient) -> String {
    match client.store().session_id() {
        Some(_) => "querydesk> ".to_string(),
        None => "querydesk (not connected)> ".to_string(),
    }
}

async fn execute(client: &QueryDeskClient, command: Command) {
    match command {
        Command::Connect(request) => match client.connect(&request).await {
            Ok(info) => println!("{}", render::connected(&info, &client.store().get_state())),
            Err(e) => println!("Connection failed: {e}"),
        },
        Command::Open(path) => open_file(client, &path).await,
        Command::Schema => println!("{}", render::schema(&client.store().get_state().schema)),
        Command::Refresh => match client.refresh_schema().await {
            Ok(_) => println!("{}", render::schema(&client.store().get_state().schema)),
            Err(e) => println!("{e}"),
        },
        Command::Context => println!("{}", render::context_status(&client.context_status().await)),
        Command::LoadContext => println!("{}", render::context_load(&client.load_context().await)),
        Command::Stats => println!("{}", render::stats(&client.system_stats().await)),
        Command::History => println!("{}", render::history(&client.store().get_state().history)),
        Command::Rerun(n) => {
            let entry = client.store().get_state().history.get(n - 1).cloned();
            match entry {
                Some(entry) => ask(client, &entry.query).await,
                None => println!("No history entry {n}"),
            }
        }
        Command::Clear => {
            client.chat().clear();
            println!("Conversation cleared");
        }
        Command::Disconnect => match client.disconnect().await {
            Ok(()) => println!("Disconnected"),
            Err(e) => println!("Disconnect failed: {e}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Ask(text) => ask(client, &text).await,
        Command::Quit => {}
    }
}

async fn open_file(client: &QueryDeskClient, path: &Path) {
    match client.connect_file(path).await {
        Ok(info) => println!("{}", render::connected(&info, &client.store().get_state())),
        Err(e) => println!("Connection failed: {e}"),
    }
}

async fn ask(client: &QueryDeskClient, text: &str) {
    tokio::select! {
        outcome = client.ask(text) => match outcome {
            Ok(result) => println!("{}", render::result(&result)),
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                let info = e.to_error_info();
                println!("Error: {}", info.message);
                if let Some(hint) = info.hint {
                    println!("Hint: {hint}");
                }
            }
        },
        _ = tokio::signal::ctrl_c() => {
            client.chat().cancel();
            println!("Cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            Command::parse("  how many users signed up today? ").unwrap(),
            Some(Command::Ask("how many users signed up today?".into()))
        );
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn parses_connect_with_optional_password() {
        let Some(Command::Connect(request)) =
            Command::parse("/connect mysql db.local 3307 app shop s3cret").unwrap()
        else {
            panic!("expected connect");
        };
        assert_eq!(request.db_type, DbType::Mysql);
        assert_eq!(request.port, 3307);
        assert_eq!(request.password, "s3cret");

        let Some(Command::Connect(request)) =
            Command::parse("/connect postgresql localhost 5432 app shop").unwrap()
        else {
            panic!("expected connect");
        };
        assert!(request.password.is_empty());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Command::parse("/connect postgresql localhost").is_err());
        assert!(Command::parse("/connect postgresql localhost port app shop").is_err());
        assert!(Command::parse("/rerun 0").is_err());
        assert!(Command::parse("/frobnicate").is_err());
    }

    #[tokio::test]
    async fn interrupt_at_idle_prompt_ends_input() {
        // Writer stays open so the read never completes
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();
        assert!(matches!(next_input(&mut lines, std::future::ready(())).await, Input::Interrupted));
    }

    #[tokio::test]
    async fn lines_are_read_until_eof() {
        let mut lines = BufReader::new(&b"/stats\nhow many users?\n"[..]).lines();
        let never = || std::future::pending::<()>();
        assert!(matches!(next_input(&mut lines, never()).await, Input::Line(l) if l == "/stats"));
        assert!(matches!(next_input(&mut lines, never()).await, Input::Line(l) if l == "how many users?"));
        assert!(matches!(next_input(&mut lines, never()).await, Input::Eof));
    }

    #[tokio::test]
    async fn prompt_write_errors_are_reported() {
        let mut out = Vec::new();
        write_prompt(&mut out, "querydesk> ").await.unwrap();
        assert_eq!(out, b"querydesk> ");

        let (mut writer, reader) = tokio::io::duplex(64);
        drop(reader);
        assert!(write_prompt(&mut writer, "querydesk> ").await.is_err());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/rerun 3").unwrap(), Some(Command::Rerun(3)));
        assert_eq!(Command::parse("/load-context").unwrap(), Some(Command::LoadContext));
        assert_eq!(Command::parse("/exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("/open ./shop.db").unwrap(), Some(Command::Open("./shop.db".into())));
    }
}
