use super::{alert, prompt, report, App};
use crate::errors::Result;
use crate::models::{Vote, VotePermission};
use crate::ui;
use crate::view::{self, DetailFlags};
use std::io::{BufRead, Write};

/// Participation view for one vote. Fetches, computes the view flags, renders,
/// then loops over select/submit/permission commands. Every successful
/// mutation re-fetches the detail so the screen only ever shows
/// server-confirmed state.
pub async fn run<R: BufRead, W: Write>(
    app: &mut App,
    input: &mut R,
    out: &mut W,
    vote_id: i64,
) -> Result<()> {
    let Some(mut vote) = fetch(app, out, vote_id).await? else {
        return Ok(());
    };
    let mut flags = render(app, out, &vote)?;

    loop {
        let Some(line) = prompt(input, out, "vote> ")? else {
            return Ok(());
        };
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let arg = parts.next();

        match command {
            "select" => select(app, out, &vote, flags, arg)?,
            "submit" => {
                if submit(app, out, &vote).await? {
                    match fetch(app, out, vote_id).await? {
                        Some(fresh) => {
                            vote = fresh;
                            flags = render(app, out, &vote)?;
                        }
                        None => return Ok(()),
                    }
                }
            }
            "perm" => {
                if update_permission(app, out, &vote, flags, arg).await? {
                    match fetch(app, out, vote_id).await? {
                        Some(fresh) => {
                            vote = fresh;
                            flags = render(app, out, &vote)?;
                        }
                        None => return Ok(()),
                    }
                }
            }
            "refresh" => match fetch(app, out, vote_id).await? {
                Some(fresh) => {
                    vote = fresh;
                    flags = render(app, out, &vote)?;
                }
                None => return Ok(()),
            },
            "back" | "q" => return Ok(()),
            other => alert(out, format!("unknown command: {other}"))?,
        }
    }
}

async fn fetch<W: Write>(app: &mut App, out: &mut W, vote_id: i64) -> Result<Option<Vote>> {
    match app.api.get_vote(vote_id).await {
        Ok(vote) => Ok(Some(vote)),
        Err(err) => {
            report(out, err)?;
            Ok(None)
        }
    }
}

/// Rendering clears any prior selection: the highlight never survives a
/// re-render.
fn render<W: Write>(app: &mut App, out: &mut W, vote: &Vote) -> Result<DetailFlags> {
    let viewer_id = app.session()?.user_id;
    let flags = view::detail_flags(vote, viewer_id);
    app.selection.clear();
    write!(out, "{}", ui::render_detail(vote, flags, None))?;
    Ok(flags)
}

fn select<W: Write>(
    app: &mut App,
    out: &mut W,
    vote: &Vote,
    flags: DetailFlags,
    arg: Option<&str>,
) -> Result<()> {
    if !flags.can_vote {
        return alert(out, "voting is not open on this vote");
    }
    let Some(Ok(index)) = arg.map(str::parse::<usize>) else {
        return alert(out, "expected an option number");
    };
    let Some(option) = (index >= 1)
        .then(|| vote.options.get(index - 1))
        .flatten()
    else {
        return alert(out, "no such option");
    };
    app.selection.select(option.id);
    write!(
        out,
        "{}",
        ui::render_detail(vote, flags, app.selection.selected())
    )?;
    Ok(())
}

/// Returns `true` when a ballot was cast and the view should re-fetch.
async fn submit<W: Write>(app: &mut App, out: &mut W, vote: &Vote) -> Result<bool> {
    let Some(option_id) = app.selection.selected() else {
        alert(out, "Please select an option")?;
        return Ok(false);
    };
    match app.api.participate(vote.id, option_id).await {
        Ok(()) => {
            writeln!(out, "Vote submitted")?;
            Ok(true)
        }
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}

async fn update_permission<W: Write>(
    app: &mut App,
    out: &mut W,
    vote: &Vote,
    flags: DetailFlags,
    arg: Option<&str>,
) -> Result<bool> {
    if !flags.is_owner {
        alert(out, "only the creator can change the permission")?;
        return Ok(false);
    }
    let permission = match arg.map(str::parse::<VotePermission>) {
        Some(Ok(permission)) => permission,
        _ => {
            alert(out, "expected PUBLIC, PRIVATE, or LINK_ONLY")?;
            return Ok(false);
        }
    };
    match app.api.set_permission(vote.id, permission).await {
        Ok(()) => Ok(true),
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}
