use std::collections::HashMap;
use std::rc::Rc;

use yew::prelude::*;

use crate::catalog;
use crate::model::{GameState, Position};

const TILE_PX: u32 = 28;

#[derive(Properties, PartialEq, Clone)]
pub struct GameBoardProps {
    pub state: Rc<GameState>,
    pub on_place: Callback<(i32, i32)>,
}

#[function_component]
pub fn GameBoard(props: &GameBoardProps) -> Html {
    let catalog = catalog::global();
    let state = &props.state;
    let icons: HashMap<Position, (String, u8)> = state
        .buildings
        .iter()
        .filter_map(|b| {
            catalog
                .building(b.type_id)
                .map(|ty| (b.position, (ty.icon.clone(), b.level)))
        })
        .collect();
    let gs = state.grid_size;
    let tile_bg = if state.is_day { "#1b2a1f" } else { "#0f1420" };
    let tiles = (0..gs.height as i32).flat_map(|y| (0..gs.width as i32).map(move |x| (x, y)));

    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px;">
            <div style={format!("display:grid; grid-template-columns:repeat({}, {TILE_PX}px); gap:1px;", gs.width)}>
                { for tiles.map(|(x, y)| {
                    let onclick = {
                        let cb = props.on_place.clone();
                        Callback::from(move |_| cb.emit((x, y)))
                    };
                    match icons.get(&Position { x, y }) {
                        Some((icon, level)) => html! {
                            <div {onclick} title={format!("({x}, {y}) level {level}")}
                                style={format!("width:{TILE_PX}px; height:{TILE_PX}px; display:flex; align-items:center; justify-content:center; background:#2a3b2e; font-size:16px; position:relative;")}>
                                { icon.clone() }
                                { if *level > 1 { html!{ <span style="position:absolute; right:1px; bottom:0; font-size:9px; color:#d4af37;">{"★"}</span> } } else { html!{} } }
                            </div>
                        },
                        None => html! {
                            <div {onclick} title={format!("({x}, {y})")}
                                style={format!("width:{TILE_PX}px; height:{TILE_PX}px; background:{tile_bg}; cursor:pointer;")}></div>
                        },
                    }
                }) }
            </div>
            <div style="margin-top:6px; font-size:11px; color:#8b949e;">{ format!("Grid {}x{}", gs.width, gs.height) }</div>
        </div>
    }
}
