use crate::models::{Vote, VoteStatus};
use std::sync::atomic::{AtomicU64, Ordering};

/// Actions a vote card can expose, as a function of status and ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Publish,
    Close,
    Delete,
    View,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Edit => "edit",
            CardAction::Publish => "publish",
            CardAction::Close => "close",
            CardAction::Delete => "delete",
            CardAction::View => "view",
        }
    }
}

/// The card rule table. Non-owners only ever get View; owners lose mutating
/// actions as the vote moves through its lifecycle.
pub fn card_actions(status: VoteStatus, is_owner: bool) -> Vec<CardAction> {
    use CardAction::*;

    if !is_owner {
        return vec![View];
    }
    match status {
        VoteStatus::Draft => vec![Edit, Publish, Delete, View],
        VoteStatus::Published => vec![Edit, Close, Delete, View],
        VoteStatus::Closed => vec![Delete, View],
        VoteStatus::Deleted => vec![View],
    }
}

/// The three booleans that drive the participation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailFlags {
    pub is_owner: bool,
    pub can_vote: bool,
    pub show_results: bool,
}

pub fn detail_flags(vote: &Vote, viewer_id: i64) -> DetailFlags {
    let is_owner = vote.creator_id == Some(viewer_id);
    DetailFlags {
        is_owner,
        can_vote: vote.status == VoteStatus::Published
            && !vote.has_voted
            && vote.closed_at.is_none(),
        show_results: vote.has_voted || vote.closed_at.is_some() || is_owner,
    }
}

/// Share-link variant: no `has_voted` exists for an anonymous visitor, so
/// duplicate prevention is left to the server, and results only show once the
/// vote is closed.
pub fn share_flags(vote: &Vote) -> DetailFlags {
    DetailFlags {
        is_owner: false,
        can_vote: vote.status == VoteStatus::Published && vote.closed_at.is_none(),
        show_results: vote.closed_at.is_some(),
    }
}

/// At most one option selected at a time; selecting replaces any prior
/// selection, and every (re)render of a detail view clears it.
#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<i64>,
}

impl Selection {
    pub fn select(&mut self, option_id: i64) {
        self.selected = Some(option_id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }
}

/// Monotonic request-sequence guard. A reload takes a ticket before its fetch
/// and drops the response if a newer reload started meanwhile, so a slow
/// response for an old filter can never overwrite a fresher list.
#[derive(Debug, Default)]
pub struct RequestSeq(AtomicU64);

impl RequestSeq {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

/// Accepts either a pasted share URL (`...?share=<token>`) or a bare token.
pub fn share_token_from_input(input: &str) -> Option<String> {
    let input = input.trim();
    if let Some((_, query)) = input.split_once('?') {
        let query = query.split('#').next().unwrap_or(query);
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "share" && !value.is_empty() {
                return Some(value.to_string());
            }
        }
        return None;
    }
    if input.is_empty() || input.contains('/') {
        return None;
    }
    Some(input.to_string())
}
