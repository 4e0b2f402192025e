pub mod auth;
pub mod detail;
pub mod editor;
pub mod list;
pub mod share;

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::{AppError, Result};
use crate::session::Session;
use crate::view::{RequestSeq, Selection};
use std::fmt::Display;
use std::io::{BufRead, Write};

/// Application context threaded through every screen: the one place that owns
/// the session and the live option selection, instead of globals.
pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: Option<Session>,
    pub selection: Selection,
    pub list_seq: RequestSeq,
}

impl App {
    pub fn new(config: Config, session: Option<Session>) -> Self {
        let mut api = ApiClient::new(config.api_base.clone());
        if let Some(session) = &session {
            api.set_token(Some(session.token.clone()));
        }
        App {
            config,
            api,
            session,
            selection: Selection::default(),
            list_seq: RequestSeq::default(),
        }
    }

    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(AppError::NoSession)
    }
}

/// Print a prompt and read one trimmed line. `None` means EOF, which every
/// screen treats as "leave".
pub(crate) fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// The blocking-alert analog: one line, then control returns to the caller.
pub(crate) fn alert<W: Write>(out: &mut W, message: impl Display) -> Result<()> {
    writeln!(out, "!! {message}")?;
    Ok(())
}

/// Surface an action failure without ending the screen. Local IO failures are
/// the only ones that propagate; everything else becomes an alert and the
/// triggering action is over.
pub(crate) fn report<W: Write>(out: &mut W, err: AppError) -> Result<()> {
    match err {
        AppError::Io(_) => Err(err),
        other => alert(out, other),
    }
}

/// y/N confirmation for destructive actions.
pub(crate) fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> Result<bool> {
    match prompt(input, out, &format!("{question} [y/N] "))? {
        Some(answer) => Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")),
        None => Ok(false),
    }
}
