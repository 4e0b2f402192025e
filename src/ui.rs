use crate::models::{Vote, VotePermission};
use crate::view::{self, DetailFlags};
use std::fmt::Write as _;

const BAR_WIDTH: usize = 20;

pub fn render_vote_list(votes: &[Vote], viewer_id: i64) -> String {
    if votes.is_empty() {
        return "No votes found\n".to_string();
    }

    let mut out = String::new();
    for vote in votes {
        out.push_str(&render_vote_card(vote, viewer_id));
    }
    out
}

pub fn render_vote_card(vote: &Vote, viewer_id: i64) -> String {
    let is_owner = vote.creator_id == Some(viewer_id);
    let actions = view::card_actions(vote.status, is_owner)
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ");
    let description = vote
        .description
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or("No description");

    let mut out = String::new();
    let _ = writeln!(out, "#{} [{}] {}", vote.id, vote.status, vote.title);
    let _ = writeln!(out, "    {description}");
    let _ = writeln!(
        out,
        "    by {} | {} votes | actions: {actions}",
        vote.creator_username, vote.total_votes
    );
    out
}

/// Full participation view. Tally bars appear only when `show_results`; the
/// submit hint only when `can_vote`; the sharing panel only for the owner.
pub fn render_detail(vote: &Vote, flags: DetailFlags, selected: Option<i64>) -> String {
    let mut out = String::new();
    render_header(&mut out, vote, true);
    render_options(&mut out, vote, flags, selected);

    if flags.can_vote {
        out.push_str("\nPick with `select <n>`, then `submit` to cast your vote.\n");
    }
    if flags.is_owner {
        render_owner_panel(&mut out, vote);
    }
    out
}

/// Share-link variant: no status line, no owner panel.
pub fn render_share_detail(vote: &Vote, flags: DetailFlags, selected: Option<i64>) -> String {
    let mut out = String::new();
    render_header(&mut out, vote, false);
    render_options(&mut out, vote, flags, selected);

    if flags.can_vote {
        out.push_str("\nPick with `select <n>`, then `submit` to cast your vote.\n");
    }
    out
}

fn render_header(out: &mut String, vote: &Vote, with_status: bool) {
    let _ = writeln!(out, "=== {} ===", vote.title);
    let description = vote
        .description
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or("No description");
    let _ = writeln!(out, "{description}");
    if with_status {
        let _ = writeln!(
            out,
            "Created by: {} | Status: {} | Total votes: {}",
            vote.creator_username, vote.status, vote.total_votes
        );
    } else {
        let _ = writeln!(
            out,
            "Created by: {} | Total votes: {}",
            vote.creator_username, vote.total_votes
        );
    }
    out.push('\n');
}

fn render_options(out: &mut String, vote: &Vote, flags: DetailFlags, selected: Option<i64>) {
    for (index, option) in vote.options.iter().enumerate() {
        let marker = if flags.can_vote {
            if selected == Some(option.id) { "[x]" } else { "[ ]" }
        } else {
            " - "
        };
        let _ = writeln!(out, "{marker} {}. {}", index + 1, option.text);
        if flags.show_results {
            let _ = writeln!(
                out,
                "      {} {} votes ({:.1}%)",
                tally_bar(option.percentage),
                option.vote_count,
                option.percentage
            );
        }
    }
}

fn render_owner_panel(out: &mut String, vote: &Vote) {
    out.push_str("\n--- Sharing (owner) ---\n");
    match vote.share_token.as_deref() {
        Some(token) => {
            let _ = writeln!(out, "Share token: {token} (open with: vote_client share {token})");
        }
        None => out.push_str("Share token: none\n"),
    }
    let mut choices = String::new();
    for permission in [
        VotePermission::Public,
        VotePermission::Private,
        VotePermission::LinkOnly,
    ] {
        if !choices.is_empty() {
            choices.push_str(" | ");
        }
        if permission == vote.permission {
            let _ = write!(choices, "*{permission}*");
        } else {
            let _ = write!(choices, "{permission}");
        }
    }
    let _ = writeln!(out, "Permission: {choices} (change with `perm <value>`)");
}

pub fn render_form(form: &crate::screens::editor::DraftForm) -> String {
    let mut out = String::new();
    let heading = if form.id.is_some() { "Edit vote" } else { "Create vote" };
    let _ = writeln!(out, "--- {heading} ---");
    let _ = writeln!(
        out,
        "Title: {}",
        if form.title.trim().is_empty() { "(empty)" } else { &form.title }
    );
    let _ = writeln!(
        out,
        "Description: {}",
        if form.description.trim().is_empty() { "(empty)" } else { &form.description }
    );
    if form.options.is_empty() {
        out.push_str("Options: (none yet, need at least 2)\n");
    } else {
        out.push_str("Options:\n");
        for (index, option) in form.options.iter().enumerate() {
            let _ = writeln!(out, "  {}. {option}", index + 1);
        }
    }
    let _ = writeln!(out, "Permission: {}", form.permission);
    out.push_str(
        "Commands: title <text> | desc <text> | add <option> | remove <n> | perm <value> | show | save | publish | cancel\n",
    );
    out
}

fn tally_bar(percentage: f64) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    bar.push('[');
    for slot in 0..BAR_WIDTH {
        bar.push(if slot < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}
