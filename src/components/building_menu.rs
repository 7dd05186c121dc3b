use yew::prelude::*;

use crate::catalog;
use crate::model::Resources;

#[derive(Properties, PartialEq, Clone)]
pub struct BuildingMenuProps {
    pub selected: Option<u32>,
    pub resources: Resources,
    pub on_select: Callback<Option<u32>>,
}

#[function_component]
pub fn BuildingMenu(props: &BuildingMenuProps) -> Html {
    let r = props.resources;
    let rows = catalog::global().buildings().iter().map(|ty| {
        let id = ty.id;
        let selected = props.selected == Some(id);
        let affordable = r.money >= ty.cost.money && r.materials >= ty.cost.materials;
        // Clicking the selected entry clears the selection.
        let onclick = {
            let cb = props.on_select.clone();
            Callback::from(move |_| cb.emit(if selected { None } else { Some(id) }))
        };
        let p = ty.production;
        let yields: Vec<String> = [("💰", p.money), ("🧱", p.materials), ("👥", p.population)]
            .into_iter()
            .filter(|(_, v)| *v > 0)
            .map(|(icon, v)| format!("+{v}{icon}"))
            .collect();
        let border = if selected { "#388bfd" } else { "#30363d" };
        let opacity = if affordable { "1" } else { "0.5" };
        html! {
            <div {onclick} title={ty.description.clone()}
                style={format!("display:flex; gap:8px; align-items:center; padding:6px 8px; border:1px solid {border}; border-radius:6px; cursor:pointer; opacity:{opacity};")}>
                <span style="font-size:20px;">{ ty.icon.clone() }</span>
                <div style="display:flex; flex-direction:column; flex:1;">
                    <span style="font-weight:600; font-size:13px;">{ ty.name.clone() }</span>
                    <span style="font-size:11px; color:#8b949e;">{ format!("{} · {}x{}", ty.category.label(), ty.footprint.width, ty.footprint.height) }</span>
                </div>
                <div style="display:flex; flex-direction:column; align-items:flex-end; font-size:11px;">
                    <span>{ format!("{}💰 {}🧱", ty.cost.money, ty.cost.materials) }</span>
                    <span style="color:#2ea043;">{ if yields.is_empty() { "utility".to_string() } else { yields.join(" ") } }</span>
                </div>
            </div>
        }
    });
    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:260px; display:flex; flex-direction:column; gap:6px;">
            <div style="font-weight:600; margin-bottom:2px;">{"Buildings"}</div>
            { for rows }
            <div style="font-size:11px; opacity:0.7;">{"Select a building, then click a tile to place it."}</div>
        </div>
    }
}
