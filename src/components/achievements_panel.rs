use std::rc::Rc;

use yew::prelude::*;

use crate::achievements::{metric_value, progress};
use crate::catalog;
use crate::model::GameState;

#[derive(Properties, PartialEq, Clone)]
pub struct AchievementsPanelProps {
    pub state: Rc<GameState>,
}

#[function_component]
pub fn AchievementsPanel(props: &AchievementsPanelProps) -> Html {
    let state = &props.state;
    let defs = catalog::global().achievements();
    let unlocked = defs.iter().filter(|d| state.is_unlocked(d.id)).count();

    let rows = defs.iter().map(|def| {
        let done = state.is_unlocked(def.id);
        let pct = progress(state, def.condition) * 100.0;
        let current = metric_value(state, def.condition.metric).min(def.condition.at_least);
        let r = def.reward;
        let reward: Vec<String> = [("💰", r.money), ("🧱", r.materials), ("👥", r.population)]
            .into_iter()
            .filter(|(_, v)| *v > 0)
            .map(|(icon, v)| format!("+{v}{icon}"))
            .collect();
        let border = if done { "#2ea043" } else { "#30363d" };
        html! {
            <div style={format!("display:flex; gap:10px; align-items:center; padding:8px 10px; border:1px solid {border}; border-radius:8px; opacity:{};", if done { "1" } else { "0.8" })}>
                <span style="font-size:22px;">{ if done { def.icon.clone() } else { "🔒".to_string() } }</span>
                <div style="display:flex; flex-direction:column; flex:1; gap:3px;">
                    <span style="font-weight:600;">{ def.name.clone() }</span>
                    <span style="font-size:12px; color:#8b949e;">{ def.description.clone() }</span>
                    { if done { html!{} } else { html! {
                        <div style="height:4px; background:#21262d; border-radius:2px;">
                            <div style={format!("height:4px; width:{pct:.0}%; background:#1f6feb; border-radius:2px;")}></div>
                        </div>
                    } } }
                </div>
                <div style="display:flex; flex-direction:column; align-items:flex-end; font-size:11px;">
                    <span style="color:#d4af37;">{ reward.join(" ") }</span>
                    { if done { html!{ <span style="color:#2ea043;">{"Unlocked"}</span> } }
                      else { html!{ <span>{ format!("{current} / {}", def.condition.at_least) }</span> } } }
                </div>
            </div>
        }
    });

    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px; display:flex; flex-direction:column; gap:8px; max-width:640px;">
            <div style="font-weight:600;">{ format!("Achievements {unlocked} / {}", defs.len()) }</div>
            { for rows }
        </div>
    }
}
