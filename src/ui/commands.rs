/// Popup commands as ordered steps
///
/// A command is planned as a list of [`Step`]s and then run against
/// [`Effects`]. Storage is written before the page is told, and a failed
/// write stops the command.

use crate::error::ExtensionError;
use crate::history::BvHistory;
use crate::protocol::{Request, Response};
use crate::ui::components::Notice;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    SaveMode(bool),
    SaveHistory(BvHistory),
    TellPage(Request),
}

/// What telling the page came to, if the command did
pub type Delivery = Option<Result<Response, ExtensionError>>;

/// Browser side of a command
pub trait Effects {
    async fn save_mode(&self, enabled: bool) -> Result<(), ExtensionError>;
    async fn save_history(&self, history: &BvHistory) -> Result<(), ExtensionError>;
    async fn tell_page(&self, request: &Request) -> Result<Response, ExtensionError>;
    /// Reflect a saved value in the popup
    fn show(&self, step: &Step);
}

/// Invert the stored flag and tell the page. The stored flag stands even
/// when the page cannot be reached; it reads the flag on its next load.
pub fn toggle(stored_mode: bool) -> Vec<Step> {
    let next = !stored_mode;
    vec![
        Step::SaveMode(next),
        Step::TellPage(Request::ToggleBvMode { enabled: next }),
    ]
}

/// Empty the stored history, then ask the page to drop its marks
pub fn clear_all() -> Vec<Step> {
    vec![
        Step::SaveHistory(BvHistory::new()),
        Step::TellPage(Request::ClearCopiedMarks),
    ]
}

pub async fn run(effects: &impl Effects, steps: Vec<Step>) -> Result<Delivery, ExtensionError> {
    let mut delivery = None;
    for step in steps {
        match &step {
            Step::SaveMode(enabled) => effects.save_mode(*enabled).await?,
            Step::SaveHistory(history) => effects.save_history(history).await?,
            Step::TellPage(request) => {
                delivery = Some(effects.tell_page(request).await);
                continue;
            }
        }
        effects.show(&step);
    }
    Ok(delivery)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub notice: Notice,
    pub offer_reload: bool,
}

pub fn toggle_feedback(enabled: bool, delivery: &Delivery) -> Feedback {
    match delivery {
        Some(Err(e)) => Feedback {
            notice: Notice::error(toggle_failure_message(e)),
            offer_reload: true,
        },
        _ => Feedback {
            notice: Notice::success(mode_status(enabled)),
            offer_reload: false,
        },
    }
}

pub fn clear_all_notice(delivery: &Delivery) -> Notice {
    match delivery {
        Some(Err(_)) => {
            Notice::success("History cleared; marks may persist until the page is reloaded")
        }
        _ => Notice::success("History cleared"),
    }
}

pub fn mode_status(enabled: bool) -> &'static str {
    if enabled {
        "Mode: clicking a video copies its BV number"
    } else {
        "Mode: normal browsing"
    }
}

fn toggle_failure_message(err: &ExtensionError) -> String {
    format!("Could not switch mode: {}", err.user_message())
}
