use super::{alert, confirm, prompt, report, App};
use crate::api::ApiClient;
use crate::errors::{AppError, Result};
use crate::models::{SaveVoteRequest, Vote, VotePermission};
use crate::ui;
use std::io::{BufRead, Write};

/// In-progress form state. Held only while the editor screen is open and
/// discarded on cancel; there is no autosave.
#[derive(Debug, Clone)]
pub struct DraftForm {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub permission: VotePermission,
}

impl DraftForm {
    pub fn new() -> Self {
        DraftForm {
            id: None,
            title: String::new(),
            description: String::new(),
            options: Vec::new(),
            permission: VotePermission::Public,
        }
    }

    pub fn from_vote(vote: &Vote) -> Self {
        DraftForm {
            id: Some(vote.id),
            title: vote.title.clone(),
            description: vote.description.clone().unwrap_or_default(),
            options: vote.options.iter().map(|option| option.text.clone()).collect(),
            permission: vote.permission,
        }
    }

    /// Submit-time validation: non-empty title and at least 2 non-blank
    /// options. Blank entries are dropped, so padding the form with empty
    /// inputs never helps.
    pub fn validate(&self) -> std::result::Result<SaveVoteRequest, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Please enter a vote title".to_string());
        }
        let options: Vec<String> = self
            .options
            .iter()
            .map(|option| option.trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();
        if options.len() < 2 {
            return Err("At least 2 options are required".to_string());
        }
        Ok(SaveVoteRequest {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            options,
            permission: self.permission,
        })
    }
}

impl Default for DraftForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of the save saga. A publish failure after a successful save is its
/// own case: the save stands and the editor still navigates away.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved { vote: Vote, published: bool },
    SavedButPublishFailed { vote: Vote, message: String },
}

/// Two-step saga: create-or-update, then optionally publish. The publish call
/// only goes out after the save succeeded; its failure is reported distinctly
/// and never rolls the save back.
pub async fn save(api: &ApiClient, form: &DraftForm, publish: bool) -> Result<SaveOutcome> {
    let request = form.validate().map_err(AppError::Invalid)?;

    let vote = match form.id {
        Some(id) => api.update_vote(id, &request).await?,
        None => api.create_vote(&request).await?,
    };

    if !publish {
        return Ok(SaveOutcome::Saved {
            vote,
            published: false,
        });
    }

    match api.publish_vote(vote.id).await {
        Ok(()) => Ok(SaveOutcome::Saved {
            vote,
            published: true,
        }),
        Err(err) => Ok(SaveOutcome::SavedButPublishFailed {
            vote,
            message: err.to_string(),
        }),
    }
}

pub async fn create<R: BufRead, W: Write>(app: &mut App, input: &mut R, out: &mut W) -> Result<()> {
    run_form(app, input, out, DraftForm::new()).await
}

pub async fn edit<R: BufRead, W: Write>(
    app: &mut App,
    input: &mut R,
    out: &mut W,
    id: i64,
) -> Result<()> {
    match app.api.get_vote(id).await {
        Ok(vote) => run_form(app, input, out, DraftForm::from_vote(&vote)).await,
        Err(err) => report(out, err),
    }
}

async fn run_form<R: BufRead, W: Write>(
    app: &mut App,
    input: &mut R,
    out: &mut W,
    mut form: DraftForm,
) -> Result<()> {
    write!(out, "{}", ui::render_form(&form))?;

    loop {
        let Some(line) = prompt(input, out, "editor> ")? else {
            return Ok(());
        };
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "" => continue,
            "title" => form.title = rest.to_string(),
            "desc" => form.description = rest.to_string(),
            "add" => form.options.push(rest.to_string()),
            "remove" => match rest.parse::<usize>() {
                Ok(index) if index >= 1 && index <= form.options.len() => {
                    form.options.remove(index - 1);
                }
                _ => alert(out, "expected an option number")?,
            },
            "perm" => match rest.parse::<VotePermission>() {
                Ok(permission) => form.permission = permission,
                Err(message) => alert(out, message)?,
            },
            "show" => write!(out, "{}", ui::render_form(&form))?,
            "save" => {
                if attempt(app, out, &form, false).await? {
                    return Ok(());
                }
            }
            "publish" => {
                if attempt(app, out, &form, true).await? {
                    return Ok(());
                }
            }
            "cancel" | "q" => {
                if confirm(input, out, "Discard unsaved changes?")? {
                    return Ok(());
                }
            }
            other => alert(out, format!("unknown command: {other}"))?,
        }
    }
}

/// Returns `true` when the editor should navigate away. Validation failures
/// and save failures keep the form open; the partial publish failure does not.
async fn attempt<W: Write>(app: &App, out: &mut W, form: &DraftForm, publish: bool) -> Result<bool> {
    match save(&app.api, form, publish).await {
        Ok(SaveOutcome::Saved { vote, published }) => {
            if published {
                writeln!(out, "Vote created and published successfully!")?;
            } else if form.id.is_some() {
                writeln!(out, "Vote #{} updated", vote.id)?;
            } else {
                writeln!(out, "Vote saved as draft (#{})", vote.id)?;
            }
            Ok(true)
        }
        Ok(SaveOutcome::SavedButPublishFailed { vote, message }) => {
            alert(
                out,
                format!("Vote #{} created but failed to publish: {message}", vote.id),
            )?;
            Ok(true)
        }
        Err(AppError::Invalid(message)) => {
            alert(out, message)?;
            Ok(false)
        }
        Err(err) => {
            report(out, err)?;
            Ok(false)
        }
    }
}
