/// Reusable popup components

use yew::prelude::*;

use crate::config::{INDICATOR_ALIVE_COLOR, INDICATOR_DEAD_COLOR};
use crate::history::BvHistory;

#[derive(Properties, PartialEq)]
pub struct ConnectionIndicatorProps {
    /// `None` while the probe is in flight
    pub alive: Option<bool>,
}

#[function_component(ConnectionIndicator)]
pub fn connection_indicator(props: &ConnectionIndicatorProps) -> Html {
    let (color, title) = match props.alive {
        Some(true) => (INDICATOR_ALIVE_COLOR, "Connected to page"),
        Some(false) => (INDICATOR_DEAD_COLOR, "Page not connected"),
        None => ("#BDBDBD", "Checking page..."),
    };

    html! {
        <div
            id="connectionStatus"
            title={title}
            style={format!("position: fixed; bottom: 10px; right: 10px; width: 10px; height: 10px; border-radius: 50%; background-color: {};", color)}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct ReloadButtonProps {
    pub onclick: Callback<MouseEvent>,
}

#[function_component(ReloadButton)]
pub fn reload_button(props: &ReloadButtonProps) -> Html {
    html! {
        <button
            id="refreshButton"
            onclick={props.onclick.clone()}
            style="position: fixed; bottom: 10px; left: 10px; padding: 4px 8px; background: #F44336; color: white; border: none; border-radius: 4px; font-size: 10px; cursor: pointer;"
        >
            {"Reload page to reconnect"}
        </button>
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notice: Notice,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let background = match props.notice.kind {
        NoticeKind::Success => "rgba(0, 0, 0, 0.8)",
        NoticeKind::Error => "rgba(198, 40, 40, 0.9)",
    };

    html! {
        <div style={format!("position: fixed; top: 20px; left: 50%; transform: translateX(-50%); background: {}; color: white; padding: 8px 16px; border-radius: 4px; z-index: 10000; font-size: 14px; pointer-events: none;", background)}>
            {&props.notice.message}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HistoryTableProps {
    pub history: BvHistory,
    pub on_copy: Callback<String>,
}

#[function_component(HistoryTable)]
pub fn history_table(props: &HistoryTableProps) -> Html {
    if props.history.is_empty() {
        return html! {
            <div id="emptyState" class="empty-state">
                <p>{"No BV numbers copied yet."}</p>
                <p class="empty-state-hint">{"Turn on BV mode and click a video."}</p>
            </div>
        };
    }

    html! {
        <table class="bv-table">
            <thead>
                <tr>
                    <th>{"#"}</th>
                    <th>{"BV"}</th>
                    <th></th>
                </tr>
            </thead>
            <tbody id="bvList">
                {for props.history.iter().enumerate().map(|(index, bv)| {
                    let on_copy = props.on_copy.reform({
                        let bv = bv.to_string();
                        move |_: MouseEvent| bv.clone()
                    });
                    html! {
                        <tr key={bv.to_string()}>
                            <td>{index + 1}</td>
                            <td class="bv-cell">{bv}</td>
                            <td>
                                <button class="copy-btn" onclick={on_copy}>{"Copy"}</button>
                            </td>
                        </tr>
                    }
                })}
            </tbody>
        </table>
    }
}
