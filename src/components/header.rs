use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::app::View;

#[derive(Properties, PartialEq, Clone)]
pub struct HeaderProps {
    pub city_name: String,
    pub score: u64,
    pub is_day: bool,
    pub view: View,
    pub on_navigate: Callback<View>,
    pub on_rename: Callback<String>,
    pub on_open_settings: Callback<()>,
}

#[function_component]
pub fn Header(props: &HeaderProps) -> Html {
    let editing = use_state(|| false);
    let input_ref = use_node_ref();

    let start_edit = {
        let editing = editing.clone();
        Callback::from(move |_| editing.set(true))
    };
    // Names are trimmed here; blank input keeps the current name.
    let commit = {
        let editing = editing.clone();
        let input_ref = input_ref.clone();
        let on_rename = props.on_rename.clone();
        let current = props.city_name.clone();
        move || {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                let name = input.value().trim().to_string();
                if !name.is_empty() && name != current {
                    on_rename.emit(name);
                }
            }
            editing.set(false);
        }
    };
    let on_keydown = {
        let commit = commit.clone();
        let editing = editing.clone();
        Callback::from(move |e: KeyboardEvent| match e.key().as_str() {
            "Enter" => commit(),
            "Escape" => editing.set(false),
            _ => {}
        })
    };
    let on_blur = Callback::from(move |_: FocusEvent| commit());

    let nav_button = |target: View, label: &'static str| {
        let cb = props.on_navigate.clone();
        let active = props.view == target;
        let style = if active {
            "background:#1f6feb; color:#fff; border:1px solid #388bfd;"
        } else {
            "background:#21262d; color:#c9d1d9; border:1px solid #30363d;"
        };
        html! {
            <button style={format!("{style} border-radius:6px; padding:4px 10px; cursor:pointer;")}
                onclick={Callback::from(move |_| cb.emit(target))}>{ label }</button>
        }
    };
    let settings_cb = {
        let cb = props.on_open_settings.clone();
        Callback::from(move |_| cb.emit(()))
    };

    html! {
        <header style="display:flex; align-items:center; justify-content:space-between; gap:12px; padding:10px 14px; background:rgba(22,27,34,0.95); border-bottom:1px solid #30363d;">
            <div style="display:flex; align-items:center; gap:10px;">
                <span style="font-size:22px;">{"🏙️"}</span>
                { if *editing {
                    html! { <input ref={input_ref.clone()} value={props.city_name.clone()} onkeydown={on_keydown} onblur={on_blur}
                        style="font-size:18px; background:#0d1117; color:#c9d1d9; border:1px solid #30363d; border-radius:6px; padding:2px 6px;" /> }
                } else {
                    html! { <span title="Click to rename" onclick={start_edit} style="font-size:18px; font-weight:600; cursor:pointer;">{ props.city_name.clone() }</span> }
                } }
                <span style="font-size:12px; padding:2px 8px; border-radius:10px; background:#21262d;">
                    { if props.is_day { "☀️ Day" } else { "🌙 Night" } }
                </span>
            </div>
            <nav style="display:flex; gap:6px;">
                { nav_button(View::City, "City") }
                { nav_button(View::Upgrades, "Upgrades") }
                { nav_button(View::Achievements, "Achievements") }
                <button onclick={settings_cb}>{"Settings"}</button>
            </nav>
            <div style="font-variant-numeric:tabular-nums; font-weight:600; color:#d4af37;">{ format!("Score {}", props.score) }</div>
        </header>
    }
}
