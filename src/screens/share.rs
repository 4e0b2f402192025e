use super::{alert, prompt, report, App};
use crate::errors::Result;
use crate::models::Vote;
use crate::ui;
use crate::view::{self, DetailFlags};
use std::io::{BufRead, Write};

/// Share-link view, reached without the session guard. The credential is
/// attached only when one happens to be persisted; otherwise the visitor is
/// anonymous and the server alone prevents duplicate ballots.
pub async fn run<R: BufRead, W: Write>(
    app: &mut App,
    input: &mut R,
    out: &mut W,
    token: &str,
) -> Result<()> {
    let vote = match app.api.share_vote(token).await {
        Ok(vote) => vote,
        Err(err) => {
            alert(out, format!("Invalid share link: {err}"))?;
            return Ok(());
        }
    };
    let flags = render(app, out, &vote)?;

    loop {
        let Some(line) = prompt(input, out, "share> ")? else {
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
                if submit(app, out, &vote, token).await? {
                    // No per-visitor has_voted exists here, so confirm and
                    // leave rather than re-fetching a state that cannot
                    // reflect this ballot.
                    return Ok(());
                }
            }
            "back" | "q" => return Ok(()),
            other => alert(out, format!("unknown command: {other}"))?,
        }
    }
}

fn render<W: Write>(app: &mut App, out: &mut W, vote: &Vote) -> Result<DetailFlags> {
    let flags = view::share_flags(vote);
    app.selection.clear();
    write!(out, "{}", ui::render_share_detail(vote, flags, None))?;
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
        ui::render_share_detail(vote, flags, app.selection.selected())
    )?;
    Ok(())
}

async fn submit<W: Write>(app: &mut App, out: &mut W, vote: &Vote, token: &str) -> Result<bool> {
    let Some(option_id) = app.selection.selected() else {
        alert(out, "Please select an option")?;
        return Ok(false);
    };
    match app.api.participate_share(vote.id, option_id, token).await {
        Ok(()) => {
            writeln!(out, "Vote submitted successfully!")?;
            Ok(true)
        }
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}
