use super::{alert, auth, confirm, detail, editor, prompt, report, App};
use crate::errors::Result;
use crate::models::{Vote, VoteStatus};
use crate::ui;
use crate::view::{self, CardAction};
use std::io::{BufRead, Write};
use tracing::debug;

/// Main screen: the status-filtered vote list with per-card actions. Every
/// successful mutation re-fetches the whole list from the server; nothing is
/// ever patched in place.
pub async fn run<R: BufRead, W: Write>(app: &mut App, input: &mut R, out: &mut W) -> Result<()> {
    let mut filter: Option<VoteStatus> = None;
    let mut votes: Vec<Vote> = Vec::new();
    reload(app, out, filter, &mut votes).await?;

    loop {
        let Some(line) = prompt(input, out, "votes> ")? else {
            return Ok(());
        };
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let arg = parts.next();

        match command {
            "filter" => {
                filter = match arg {
                    None | Some("all") => None,
                    Some(value) => match value.parse::<VoteStatus>() {
                        Ok(status) => Some(status),
                        Err(message) => {
                            alert(out, message)?;
                            continue;
                        }
                    },
                };
                reload(app, out, filter, &mut votes).await?;
            }
            "refresh" => reload(app, out, filter, &mut votes).await?,
            "new" => {
                editor::create(app, input, out).await?;
                reload(app, out, filter, &mut votes).await?;
            }
            "open" | "view" => {
                let Some(id) = parse_id(out, arg)? else { continue };
                detail::run(app, input, out, id).await?;
                reload(app, out, filter, &mut votes).await?;
            }
            "edit" => {
                let Some(id) = parse_id(out, arg)? else { continue };
                if !allowed(app, out, &votes, id, CardAction::Edit)? {
                    continue;
                }
                editor::edit(app, input, out, id).await?;
                reload(app, out, filter, &mut votes).await?;
            }
            "publish" => {
                let Some(id) = parse_id(out, arg)? else { continue };
                if !allowed(app, out, &votes, id, CardAction::Publish)? {
                    continue;
                }
                match app.api.publish_vote(id).await {
                    Ok(()) => reload(app, out, filter, &mut votes).await?,
                    Err(err) => report(out, err)?,
                }
            }
            "close" => {
                let Some(id) = parse_id(out, arg)? else { continue };
                if !allowed(app, out, &votes, id, CardAction::Close)? {
                    continue;
                }
                if !confirm(input, out, "Close this vote?")? {
                    continue;
                }
                match app.api.close_vote(id).await {
                    Ok(()) => reload(app, out, filter, &mut votes).await?,
                    Err(err) => report(out, err)?,
                }
            }
            "delete" => {
                let Some(id) = parse_id(out, arg)? else { continue };
                if !allowed(app, out, &votes, id, CardAction::Delete)? {
                    continue;
                }
                if !confirm(input, out, "Delete this vote?")? {
                    continue;
                }
                match app.api.delete_vote(id).await {
                    Ok(()) => reload(app, out, filter, &mut votes).await?,
                    Err(err) => report(out, err)?,
                }
            }
            "logout" => {
                auth::logout(app).await?;
                writeln!(out, "Signed out")?;
                return Ok(());
            }
            "help" => {
                writeln!(
                    out,
                    "Commands: filter <status|all> | refresh | new | open <id> | edit <id> | publish <id> | close <id> | delete <id> | logout | quit"
                )?;
            }
            "quit" | "q" => return Ok(()),
            other => alert(out, format!("unknown command: {other}"))?,
        }
    }
}

/// Full-replace reload guarded by the request sequence: a response that lost
/// the race to a newer reload is dropped instead of overwriting it.
async fn reload<W: Write>(
    app: &mut App,
    out: &mut W,
    filter: Option<VoteStatus>,
    votes: &mut Vec<Vote>,
) -> Result<()> {
    let viewer_id = app.session()?.user_id;
    let ticket = app.list_seq.begin();

    match app.api.list_votes(filter).await {
        Ok(fresh) => {
            if !app.list_seq.is_current(ticket) {
                debug!("discarding stale vote list response");
                return Ok(());
            }
            *votes = fresh;
            write!(out, "{}", ui::render_vote_list(votes, viewer_id))?;
            Ok(())
        }
        Err(err) => report(out, err),
    }
}

fn parse_id<W: Write>(out: &mut W, arg: Option<&str>) -> Result<Option<i64>> {
    match arg.map(str::parse::<i64>) {
        Some(Ok(id)) => Ok(Some(id)),
        _ => {
            alert(out, "expected a vote id")?;
            Ok(None)
        }
    }
}

/// The card only renders the actions the rule table permits; the command loop
/// enforces the same table before any network call.
fn allowed<W: Write>(
    app: &App,
    out: &mut W,
    votes: &[Vote],
    id: i64,
    action: CardAction,
) -> Result<bool> {
    let viewer_id = app.session()?.user_id;
    let Some(vote) = votes.iter().find(|vote| vote.id == id) else {
        alert(out, format!("no vote #{id} in the list"))?;
        return Ok(false);
    };
    let is_owner = vote.creator_id == Some(viewer_id);
    if view::card_actions(vote.status, is_owner).contains(&action) {
        return Ok(true);
    }
    alert(
        out,
        format!("{} is not available for vote #{id}", action.label()),
    )?;
    Ok(false)
}
