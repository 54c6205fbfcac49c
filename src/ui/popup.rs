/// Popup UI for the BV Picker extension

use std::rc::Rc;

use log::{info, warn};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::chrome;
use crate::clipboard::{self, CopyOrder};
use crate::config::{MESSAGE_TIMEOUT_MS, NOTIFICATION_MS};
use crate::error::ExtensionError;
use crate::history::{BvHistory, HistoryUpdate, ModeUpdate};
use crate::protocol::{Request, Response};
use crate::timer::{self, Coalescer};
use crate::ui::commands::{self, Effects, Step};
use crate::ui::components::{ConnectionIndicator, HistoryTable, Notice, ReloadButton, Toast};

#[derive(Clone, PartialEq)]
enum Connection {
    Checking,
    Alive,
    Unreachable(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let connection = use_state(|| Connection::Checking);
    let mode_enabled = use_state(|| false);
    let history = use_state(BvHistory::new);
    let offer_reload = use_state(|| false);
    let notice = use_state(|| None::<Notice>);
    let notice_timer = use_memo((), |_| Coalescer::new());

    // Show a notice and hide it again unless a newer one replaced it
    let notify = {
        let notice = notice.clone();
        let notice_timer = Rc::clone(&notice_timer);
        Callback::from(move |next: Notice| {
            notice.set(Some(next));
            let ticket = notice_timer.arm();
            let notice = notice.clone();
            let notice_timer = Rc::clone(&notice_timer);
            timer::run_after(NOTIFICATION_MS, move || {
                if notice_timer.is_current(ticket) {
                    notice.set(None);
                }
            });
        })
    };

    // Probe the page, then load state, on mount
    {
        let connection = connection.clone();
        let mode_enabled = mode_enabled.clone();
        let history = history.clone();
        let offer_reload = offer_reload.clone();
        let notify = notify.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match probe_active_tab().await {
                    Ok(()) => connection.set(Connection::Alive),
                    Err(e) => {
                        warn!("Content agent unreachable: {}", e);
                        connection.set(Connection::Unreachable(e.user_message()));
                        offer_reload.set(true);
                    }
                }

                match chrome::read_state().await {
                    Ok(state) => {
                        mode_enabled.set(state.mode_enabled);
                        history.set(state.history);
                    }
                    Err(e) => notify.emit(Notice::error(e.user_message())),
                }
            });
            || ()
        });
    }

    // Refresh the list while open when the page records a new identifier
    {
        let history = history.clone();
        use_effect_with((), move |_| {
            chrome::listen_runtime_messages(move |request, _tab_id| match request {
                Request::BvCopied { .. } => {
                    let history = history.clone();
                    spawn_local(async move {
                        if let Ok(state) = chrome::read_state().await {
                            history.set(state.history);
                        }
                    });
                    Some(Response::success())
                }
                _ => None,
            });
            || ()
        });
    }

    let on_toggle = {
        let effects = PopupEffects::new(&mode_enabled, &history);
        let offer_reload = offer_reload.clone();
        let notify = notify.clone();

        Callback::from(move |_: MouseEvent| {
            let effects = effects.clone();
            let offer_reload = offer_reload.clone();
            let notify = notify.clone();

            spawn_local(async move {
                let stored = match chrome::read_state().await {
                    Ok(state) => state.mode_enabled,
                    Err(_) => *effects.mode_enabled,
                };
                let next = !stored;

                match commands::run(&effects, commands::toggle(stored)).await {
                    Ok(delivery) => {
                        match &delivery {
                            Some(Err(e)) => warn!("Toggle not delivered: {}", e),
                            _ => info!("Mode switched {}", if next { "on" } else { "off" }),
                        }
                        let feedback = commands::toggle_feedback(next, &delivery);
                        if feedback.offer_reload {
                            offer_reload.set(true);
                        }
                        notify.emit(feedback.notice);
                    }
                    Err(e) => notify.emit(Notice::error(e.user_message())),
                }
            });
        })
    };

    let on_copy_one = {
        let notify = notify.clone();
        Callback::from(move |bv: String| {
            let notify = notify.clone();
            spawn_local(async move {
                match clipboard::copy_text(&bv, CopyOrder::TextareaFirst).await {
                    Ok(()) => notify.emit(Notice::success(format!("Copied: {}", bv))),
                    Err(e) => notify.emit(Notice::error(e.user_message())),
                }
            });
        })
    };

    let on_copy_all = {
        let history = history.clone();
        let notify = notify.clone();
        Callback::from(move |_: MouseEvent| {
            let notify = notify.clone();
            let fallback = (*history).clone();
            spawn_local(async move {
                let history = chrome::read_state()
                    .await
                    .map(|state| state.history)
                    .unwrap_or(fallback);
                if history.is_empty() {
                    notify.emit(Notice::error("Nothing to copy"));
                    return;
                }
                match clipboard::copy_text(&history.joined(), CopyOrder::TextareaFirst).await {
                    Ok(()) => notify.emit(Notice::success(copy_all_message(history.len()))),
                    Err(e) => notify.emit(Notice::error(e.user_message())),
                }
            });
        })
    };

    let on_clear_all = {
        let effects = PopupEffects::new(&mode_enabled, &history);
        let notify = notify.clone();
        Callback::from(move |_: MouseEvent| {
            let effects = effects.clone();
            let notify = notify.clone();
            spawn_local(async move {
                match commands::run(&effects, commands::clear_all()).await {
                    Ok(delivery) => {
                        if let Some(Err(e)) = &delivery {
                            warn!("Clear-marks not delivered: {}", e);
                        }
                        notify.emit(commands::clear_all_notice(&delivery));
                    }
                    Err(e) => notify.emit(Notice::error(e.user_message())),
                }
            });
        })
    };

    let on_reload = Callback::from(|_: MouseEvent| {
        spawn_local(reload_active_tab_and_close());
    });

    let alive = match &*connection {
        Connection::Checking => None,
        Connection::Alive => Some(true),
        Connection::Unreachable(_) => Some(false),
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"BV Picker"}</h1>

            if let Connection::Unreachable(reason) = &*connection {
                <Alert r#type={AlertType::Warning} title={"Page not connected"} inline={true}>
                    {reason.clone()}
                </Alert>
            }

            <div class="flex-column-gap">
                <p class={if *mode_enabled { "status-active" } else { "status-inactive" }}>
                    {commands::mode_status(*mode_enabled)}
                </p>
                <Button
                    onclick={on_toggle}
                    variant={if *mode_enabled { ButtonVariant::Secondary } else { ButtonVariant::Primary }}
                    block={true}
                >
                    {mode_label(*mode_enabled)}
                </Button>
            </div>

            <div class="history-container">
                <div class="history-header">
                    <h2 class="history-title">{format!("Copied BV numbers ({})", history.len())}</h2>
                    <Button onclick={on_copy_all} variant={ButtonVariant::Secondary}>
                        {"Copy all"}
                    </Button>
                    if !history.is_empty() {
                        <Button onclick={on_clear_all} variant={ButtonVariant::Danger}>
                            {"Clear all"}
                        </Button>
                    }
                </div>
                <HistoryTable history={(*history).clone()} on_copy={on_copy_one} />
            </div>

            if let Some(current) = (*notice).clone() {
                <Toast notice={current} />
            }

            <ConnectionIndicator {alive} />
            if *offer_reload {
                <ReloadButton onclick={on_reload} />
            }
        </div>
    }
}

/// Storage, the active tab and the popup's own state
#[derive(Clone)]
struct PopupEffects {
    mode_enabled: UseStateHandle<bool>,
    history: UseStateHandle<BvHistory>,
}

impl PopupEffects {
    fn new(mode_enabled: &UseStateHandle<bool>, history: &UseStateHandle<BvHistory>) -> Self {
        PopupEffects {
            mode_enabled: mode_enabled.clone(),
            history: history.clone(),
        }
    }
}

impl Effects for PopupEffects {
    async fn save_mode(&self, enabled: bool) -> Result<(), ExtensionError> {
        chrome::write(&ModeUpdate {
            mode_enabled: enabled,
        })
        .await
    }

    async fn save_history(&self, history: &BvHistory) -> Result<(), ExtensionError> {
        chrome::write(&HistoryUpdate { history }).await
    }

    async fn tell_page(&self, request: &Request) -> Result<Response, ExtensionError> {
        send_to_active_tab(request).await
    }

    fn show(&self, step: &Step) {
        match step {
            Step::SaveMode(enabled) => self.mode_enabled.set(*enabled),
            Step::SaveHistory(history) => self.history.set(history.clone()),
            Step::TellPage(_) => {}
        }
    }
}

// Helper functions

async fn send_to_active_tab(request: &Request) -> Result<Response, ExtensionError> {
    let tab_id = chrome::active_tab().await?;
    chrome::send_to_tab_with_timeout(tab_id, request, MESSAGE_TIMEOUT_MS).await
}

async fn probe_active_tab() -> Result<(), ExtensionError> {
    let reply = send_to_active_tab(&Request::CheckContentScript).await?;
    if reply.is_alive() {
        Ok(())
    } else {
        Err(ExtensionError::MessageDelivery(format!(
            "unexpected reply {:?}",
            reply.status
        )))
    }
}

async fn reload_active_tab_and_close() {
    match chrome::active_tab().await {
        Ok(tab_id) => {
            if let Err(e) = chrome::reload_tab(tab_id).await {
                warn!("Reload failed: {}", e);
            }
        }
        Err(e) => warn!("Nothing to reload: {}", e),
    }
    if let Some(window) = web_sys::window() {
        let _ = window.close();
    }
}

fn mode_label(enabled: bool) -> &'static str {
    if enabled {
        "Turn off BV mode"
    } else {
        "Turn on BV mode"
    }
}

fn copy_all_message(count: usize) -> String {
    format!("Copied all {} BV numbers", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_label() {
        assert_eq!(mode_label(true), "Turn off BV mode");
        assert_eq!(mode_label(false), "Turn on BV mode");
    }

    #[test]
    fn test_copy_all_message() {
        assert_eq!(copy_all_message(2), "Copied all 2 BV numbers");
    }
}
