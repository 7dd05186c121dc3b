use std::rc::Rc;

use yew::prelude::*;

use crate::catalog;
use crate::model::{GameAction, GameState, MAX_LEVEL};
use crate::production::building_output;

#[derive(Properties, PartialEq, Clone)]
pub struct UpgradesViewProps {
    pub state: Rc<GameState>,
    pub on_action: Callback<GameAction>,
}

#[function_component(UpgradesView)]
pub fn upgrades_view(props: &UpgradesViewProps) -> Html {
    let catalog = catalog::global();
    let state = &props.state;

    if state.buildings.is_empty() {
        return html! {
            <div style="padding:24px; text-align:center; color:#8b949e; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px;">
                {"No buildings to upgrade yet. Place some buildings first!"}
            </div>
        };
    }

    let rows = state.buildings.iter().filter_map(|b| {
        let ty = catalog.building(b.type_id)?;
        let next = ty.next_tier(b.level);
        let can_upgrade = next.is_some_and(|t| state.resources.money >= t.cost);
        let out = building_output(b, catalog);
        let label = match next {
            Some(tier) => format!("Upgrade to level {} · {}💰", tier.level, tier.cost),
            None => format!("Max level ({MAX_LEVEL})"),
        };
        let onclick = {
            let cb = props.on_action.clone();
            let building_id = b.id;
            Callback::from(move |_| cb.emit(GameAction::UpgradeBuilding { building_id }))
        };
        Some(html! {
            <div style="display:flex; align-items:center; justify-content:space-between; gap:12px; padding:8px 10px; border:1px solid #30363d; border-radius:8px;">
                <div style="display:flex; align-items:center; gap:10px;">
                    <span style="font-size:20px;">{ ty.icon.clone() }</span>
                    <div style="display:flex; flex-direction:column;">
                        <span style="font-weight:600;">{ ty.name.clone() }</span>
                        <span style="font-size:12px; color:#8b949e;">
                            { format!("Level {} at ({}, {}) · x{}", b.level, b.position.x, b.position.y, ty.multiplier(b.level)) }
                        </span>
                        <span style="font-size:11px; color:#2ea043;">
                            { format!("{:.1}💰 {:.1}🧱 {:.1}👥 per tick", out.money, out.materials, out.population) }
                        </span>
                    </div>
                </div>
                <button {onclick} disabled={!can_upgrade}>{ label }</button>
            </div>
        })
    });

    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px; display:flex; flex-direction:column; gap:8px; max-width:640px;">
            <div style="font-weight:600;">{"Upgrades"}</div>
            { for rows }
        </div>
    }
}
