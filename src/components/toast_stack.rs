use yew::prelude::*;

use crate::engine::{Notice, NoticeLevel};

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub notice: Notice,
    /// `Date.now()` timestamp after which the toast is dropped.
    pub expires_at: f64,
}

#[derive(Properties, PartialEq, Clone)]
pub struct ToastStackProps {
    pub toasts: Vec<Toast>,
}

#[function_component]
pub fn ToastStack(props: &ToastStackProps) -> Html {
    if props.toasts.is_empty() {
        return html! {};
    }
    html! {
        <div style="position:fixed; left:50%; bottom:24px; transform:translateX(-50%); display:flex; flex-direction:column; gap:6px; min-width:260px;">
            { for props.toasts.iter().map(|t| {
                let color = match t.notice.level {
                    NoticeLevel::Info => "#58a6ff",
                    NoticeLevel::Success => "#2ea043",
                    NoticeLevel::Warning => "#f85149",
                };
                html! {
                    <div style={format!("font-size:12px; line-height:1.25; background:#1c2128; border:1px solid {color}; color:{color}; padding:6px 10px; border-radius:6px; text-align:center;")}>
                        { t.notice.text.clone() }
                    </div>
                }
            }) }
        </div>
    }
}
