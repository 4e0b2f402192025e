use super::{alert, prompt, report, App};
use crate::errors::Result;
use crate::models::AuthResponse;
use crate::session::{self, Session};
use std::io::{BufRead, Write};
use tracing::info;

/// Login/register screen. Returns `true` once a session exists, `false` when
/// the user gives up. A persisted session skips the screen entirely without
/// contacting the server.
pub async fn run<R: BufRead, W: Write>(app: &mut App, input: &mut R, out: &mut W) -> Result<bool> {
    if app.session.is_some() {
        return Ok(true);
    }

    loop {
        let Some(choice) = prompt(input, out, "login, register, or quit? ")? else {
            return Ok(false);
        };
        match choice.as_str() {
            "" => continue,
            "login" => {
                if login(app, input, out).await? {
                    return Ok(true);
                }
            }
            "register" => {
                if register(app, input, out).await? {
                    return Ok(true);
                }
            }
            "quit" | "q" => return Ok(false),
            other => alert(out, format!("unknown choice: {other}"))?,
        }
    }
}

async fn login<R: BufRead, W: Write>(app: &mut App, input: &mut R, out: &mut W) -> Result<bool> {
    let Some(username) = prompt(input, out, "username: ")? else {
        return Ok(false);
    };
    let Some(password) = prompt(input, out, "password: ")? else {
        return Ok(false);
    };

    match app.api.login(&username, &password).await {
        Ok(auth) => {
            establish(app, out, auth).await?;
            Ok(true)
        }
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}

async fn register<R: BufRead, W: Write>(app: &mut App, input: &mut R, out: &mut W) -> Result<bool> {
    let Some(username) = prompt(input, out, "username: ")? else {
        return Ok(false);
    };
    let Some(email) = prompt(input, out, "email: ")? else {
        return Ok(false);
    };
    let Some(password) = prompt(input, out, "password: ")? else {
        return Ok(false);
    };

    match app.api.register(&username, &email, &password).await {
        Ok(auth) => {
            establish(app, out, auth).await?;
            Ok(true)
        }
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}

async fn establish<W: Write>(app: &mut App, out: &mut W, auth: AuthResponse) -> Result<()> {
    let session = Session {
        token: auth.token,
        user_id: auth.user_id,
        username: auth.username,
    };
    session::save(&app.config.session_path, &session).await?;
    app.api.set_token(Some(session.token.clone()));
    info!("signed in as {}", session.username);
    writeln!(out, "Welcome, {}", session.username)?;
    app.session = Some(session);
    Ok(())
}

/// Logout: drop the persisted session and the in-memory credential.
pub async fn logout(app: &mut App) -> Result<()> {
    session::clear(&app.config.session_path).await?;
    app.api.set_token(None);
    app.session = None;
    Ok(())
}
