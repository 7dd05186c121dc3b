use yew::prelude::*;

use crate::model::Resources;
use crate::util::format_amount;

#[derive(Properties, PartialEq, Clone)]
pub struct ResourcePanelProps {
    pub resources: Resources,
    pub buildings: usize,
}

#[function_component]
pub fn ResourcePanel(props: &ResourcePanelProps) -> Html {
    let cell_style = "display:flex; align-items:center; gap:8px; padding:6px 12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; min-width:150px;";
    let value_style = "margin-left:auto; font-variant-numeric:tabular-nums; font-weight:600;";
    let cell = |icon: &'static str, label: &'static str, color: &'static str, value: String| {
        html! {
            <div style={cell_style}>
                <span style={format!("color:{color};")}>{ icon }</span>
                <span style={format!("color:{color}; font-weight:500;")}>{ label }</span>
                <span style={format!("{value_style} color:{color};")}>{ value }</span>
            </div>
        }
    };
    let r = props.resources;
    html! {
        <div style="display:flex; flex-wrap:wrap; gap:10px; font-size:14px;">
            { cell("💰", "Money", "#d4af37", format_amount(r.money)) }
            { cell("🧱", "Materials", "#f0883e", format_amount(r.materials)) }
            { cell("👥", "Population", "#58a6ff", format_amount(r.population)) }
            { cell("🏗️", "Buildings", "#8b949e", props.buildings.to_string()) }
        </div>
    }
}
