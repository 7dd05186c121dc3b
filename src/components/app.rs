use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::prelude::*;

use super::{
    achievements_panel::AchievementsPanel, building_menu::BuildingMenu, game_board::GameBoard,
    header::Header, resource_panel::ResourcePanel, settings_modal::SettingsModal,
    toast_stack::{Toast, ToastStack}, upgrades_view::UpgradesView,
};
use crate::catalog;
use crate::config::{CONFIG_STORAGE_KEY, GameConfig};
use crate::engine::Session;
use crate::model::GameAction;
use crate::persistence::{LocalStorageStore, MemoryStore, SnapshotStore};

const TOAST_MS: f64 = 4_000.0;
const MAX_TOASTS: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum View {
    City,
    Upgrades,
    Achievements,
}

fn load_config(store: Option<&LocalStorageStore>) -> GameConfig {
    let Some(store) = store else {
        return GameConfig::default();
    };
    match store.load(CONFIG_STORAGE_KEY) {
        Ok(Some(raw)) => GameConfig::from_json(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring config override: {e}");
            GameConfig::default()
        }),
        Ok(None) => GameConfig::default(),
        Err(e) => {
            log::warn!("could not read config override: {e}");
            GameConfig::default()
        }
    }
}

fn open_session() -> Session {
    let local = LocalStorageStore::open()
        .map_err(|e| log::warn!("saving disabled: {e}"))
        .ok();
    let config = load_config(local.as_ref());
    let store: Box<dyn SnapshotStore> = match local {
        Some(store) => Box::new(store),
        None => Box::new(MemoryStore::new()),
    };
    Session::restore(config, catalog::global(), store)
}

/// Moves fresh notices into the toast queue and drops expired ones.
/// Returns whether the queue changed.
fn sync_toasts(session: &RefCell<Session>, toasts: &RefCell<VecDeque<Toast>>, now: f64) -> bool {
    let fresh = session.borrow_mut().take_notices();
    let mut queue = toasts.borrow_mut();
    let before = queue.len();
    queue.retain(|t| t.expires_at > now);
    let expired = queue.len() != before;
    let added = !fresh.is_empty();
    for notice in fresh {
        queue.push_back(Toast {
            notice,
            expires_at: now + TOAST_MS,
        });
    }
    while queue.len() > MAX_TOASTS {
        queue.pop_front();
    }
    expired || added
}

#[function_component(App)]
pub fn app() -> Html {
    let session = use_mut_ref(open_session);
    let toasts = use_mut_ref(VecDeque::<Toast>::new);
    let redraw = use_force_update();
    let view = use_state(|| View::City);
    let show_settings = use_state(|| false);

    // Game clock: a single heartbeat measures real elapsed time and lets the
    // session fire whichever logical timers came due.
    {
        let session = session.clone();
        let toasts = toasts.clone();
        let redraw = redraw.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let heartbeat_ms = session.borrow().config().heartbeat_ms;
            let last = Rc::new(Cell::new(js_sys::Date::now()));
            let tick = {
                let session = session.clone();
                let toasts = toasts.clone();
                Closure::wrap(Box::new(move || {
                    let now = js_sys::Date::now();
                    let elapsed = (now - last.get()).max(0.0) as u64;
                    last.set(now);
                    let fired = session.borrow_mut().advance(elapsed);
                    let toasts_changed = sync_toasts(&session, &toasts, now);
                    if fired > 0 || toasts_changed {
                        redraw.force_update();
                    }
                }) as Box<dyn FnMut()>)
            };
            let interval_id = window.as_ref().and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    tick.as_ref().unchecked_ref(),
                    i32::try_from(heartbeat_ms).unwrap_or(i32::MAX),
                )
                .ok()
            });
            if interval_id.is_none() {
                log::error!("could not start the game clock");
            }
            // The effect cleanup does not run when the tab closes.
            let on_pagehide = {
                let session = session.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    session.borrow_mut().shutdown();
                }) as Box<dyn FnMut(web_sys::Event)>)
            };
            if let Some(w) = &window {
                let _ = w.add_event_listener_with_callback(
                    "pagehide",
                    on_pagehide.as_ref().unchecked_ref(),
                );
            }
            move || {
                if let Some(w) = &window {
                    if let Some(id) = interval_id {
                        w.clear_interval_with_handle(id);
                    }
                    let _ = w.remove_event_listener_with_callback(
                        "pagehide",
                        on_pagehide.as_ref().unchecked_ref(),
                    );
                }
                session.borrow_mut().shutdown();
                drop(on_pagehide);
                drop(tick);
            }
        });
    }

    let dispatch = {
        let session = session.clone();
        let toasts = toasts.clone();
        let redraw = redraw.clone();
        Callback::from(move |action: GameAction| {
            let _ = session.borrow_mut().dispatch(action);
            sync_toasts(&session, &toasts, js_sys::Date::now());
            redraw.force_update();
        })
    };
    let on_place = {
        let session = session.clone();
        let dispatch = dispatch.clone();
        Callback::from(move |(x, y): (i32, i32)| {
            let selected = session.borrow().state().selected_building_type;
            if let Some(type_id) = selected {
                dispatch.emit(GameAction::PlaceBuilding { type_id, x, y });
            }
        })
    };
    let on_navigate = {
        let view = view.clone();
        Callback::from(move |v: View| view.set(v))
    };
    let open_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |()| show_settings.set(true))
    };
    let close_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |()| show_settings.set(false))
    };
    let on_new_city = {
        let session = session.clone();
        let toasts = toasts.clone();
        let redraw = redraw.clone();
        let show_settings = show_settings.clone();
        Callback::from(move |()| {
            session.borrow_mut().reset();
            sync_toasts(&session, &toasts, js_sys::Date::now());
            show_settings.set(false);
            redraw.force_update();
        })
    };

    let state = session.borrow().state();
    let toast_list: Vec<Toast> = toasts.borrow().iter().cloned().collect();
    let background = if state.is_day { "#0d1117" } else { "#05070b" };

    let content = match *view {
        View::City => html! {
            <div style="display:flex; gap:12px; align-items:flex-start;">
                <BuildingMenu
                    selected={state.selected_building_type}
                    resources={state.resources}
                    on_select={dispatch.reform(GameAction::SelectBuildingType)}
                />
                <GameBoard state={state.clone()} on_place={on_place} />
            </div>
        },
        View::Upgrades => html! { <UpgradesView state={state.clone()} on_action={dispatch.clone()} /> },
        View::Achievements => html! { <AchievementsPanel state={state.clone()} /> },
    };

    html! {
        <div style={format!("min-height:100vh; background:{background}; color:#c9d1d9; font-family:sans-serif; transition:background 1s;")}>
            <Header
                city_name={state.city_name.clone()}
                score={state.score}
                is_day={state.is_day}
                view={*view}
                on_navigate={on_navigate}
                on_rename={dispatch.reform(GameAction::SetCityName)}
                on_open_settings={open_settings}
            />
            <div style="padding:12px; display:flex; flex-direction:column; gap:12px;">
                <ResourcePanel resources={state.resources} buildings={state.buildings.len()} />
                { content }
            </div>
            <ToastStack toasts={toast_list} />
            <SettingsModal show={*show_settings} on_close={close_settings} on_new_city={on_new_city} />
        </div>
    }
}
