//! The session: sole owner of the live game state.
//!
//! Every action, whether it comes from the player, the production timer or
//! the day/night timer, goes through [`Session::dispatch`]. Timers are
//! logical: the host reports elapsed wall-clock time through
//! [`Session::advance`] and each timer fires against whatever state is
//! current at that moment.

use std::rc::Rc;

use crate::achievements;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::model::{GameAction, GameState, Rejection};
use crate::persistence::{self, Snapshot, SnapshotStore};
use crate::production;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Production,
    DayNight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// Advisory message for the player. Not part of game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    kind: TimerKind,
    interval_ms: u64,
    elapsed_ms: u64,
}

impl Timer {
    fn new(kind: TimerKind, interval_ms: u64) -> Self {
        Self {
            kind,
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
        }
    }

    /// Adds `ms` and returns how many whole intervals are now due, at most
    /// `cap`. Time beyond the cap is dropped.
    fn accumulate(&mut self, ms: u64, cap: u32) -> u32 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        let due = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;
        let cap = u64::from(cap);
        if due > cap {
            log::debug!("{:?} timer skipped {} firings", self.kind, due - cap);
        }
        due.min(cap) as u32
    }
}

pub struct Session {
    state: Rc<GameState>,
    catalog: &'static Catalog,
    config: GameConfig,
    store: Box<dyn SnapshotStore>,
    timers: [Timer; 2],
    notices: Vec<Notice>,
}

impl Session {
    /// A brand-new game; nothing is read from `store`.
    pub fn new(config: GameConfig, catalog: &'static Catalog, store: Box<dyn SnapshotStore>) -> Self {
        let state = GameState::new(&config, catalog);
        Self::with_state(state, config, catalog, store)
    }

    /// Resumes the game saved in `store`, falling back to a fresh one.
    pub fn restore(config: GameConfig, catalog: &'static Catalog, store: Box<dyn SnapshotStore>) -> Self {
        let state = persistence::load_or_default(store.as_ref(), &config, catalog);
        let mut session = Self::with_state(state, config, catalog, store);
        // A snapshot may predate thresholds that now hold.
        session.evaluate_achievements();
        session
    }

    fn with_state(
        state: GameState,
        config: GameConfig,
        catalog: &'static Catalog,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        let timers = [
            Timer::new(TimerKind::Production, config.production_interval_ms),
            Timer::new(TimerKind::DayNight, config.day_night_interval_ms),
        ];
        Self {
            state: Rc::new(state),
            catalog,
            config,
            store,
            timers,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> Rc<GameState> {
        self.state.clone()
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Applies a player action, then settles achievements and saves.
    pub fn dispatch(&mut self, action: GameAction) -> Result<(), Rejection> {
        match self.commit(&action) {
            Ok(()) => {
                self.announce(&action);
                self.evaluate_achievements();
                self.persist();
                Ok(())
            }
            Err(rejection) => {
                log::debug!("rejected {action:?}: {rejection}");
                if is_player_facing(&action) {
                    self.notify(NoticeLevel::Warning, capitalize(&rejection.to_string()));
                }
                Err(rejection)
            }
        }
    }

    /// Runs one firing of `timer` against the current state.
    pub fn fire(&mut self, timer: TimerKind) {
        let action = match timer {
            TimerKind::Production => {
                match production::tick_delta(&self.state, self.catalog) {
                    Some(delta) => GameAction::ApplyResourceDelta(delta),
                    None => return,
                }
            }
            TimerKind::DayNight => GameAction::ToggleDayNight,
        };
        // Timer actions are always accepted by the reducer.
        let _ = self.dispatch(action);
    }

    /// Feeds `elapsed_ms` of wall-clock time to both timers and fires
    /// whatever came due. Returns the number of firings.
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        let cap = self.config.max_catch_up;
        let mut fired = 0;
        for i in 0..self.timers.len() {
            let due = self.timers[i].accumulate(elapsed_ms, cap);
            let kind = self.timers[i].kind;
            for _ in 0..due {
                self.fire(kind);
            }
            fired += due;
        }
        fired
    }

    /// Final save at teardown.
    pub fn shutdown(&mut self) {
        log::info!("session ending; saving `{}`", self.state.city_name);
        self.persist();
    }

    /// Throws away the saved game and starts over.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear(&self.config.storage_key) {
            log::warn!("could not clear saved game: {e}");
        }
        self.state = Rc::new(GameState::new(&self.config, self.catalog));
        for timer in &mut self.timers {
            timer.elapsed_ms = 0;
        }
        self.notify(NoticeLevel::Info, "Started a new city".to_string());
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn commit(&mut self, action: &GameAction) -> Result<(), Rejection> {
        let next = self.state.try_apply(action, self.catalog)?;
        self.state = Rc::new(next);
        Ok(())
    }

    /// Unlocks every achievement whose condition holds, repeating until a
    /// pass unlocks nothing since rewards can satisfy further conditions.
    fn evaluate_achievements(&mut self) {
        loop {
            let pending = achievements::pending_unlocks(&self.state, self.catalog);
            if pending.is_empty() {
                break;
            }
            for achievement_id in pending {
                let action = GameAction::UnlockAchievement { achievement_id };
                if self.commit(&action).is_ok() {
                    if let Some(def) = self.catalog.achievement(achievement_id) {
                        log::info!("achievement unlocked: {}", def.name);
                        self.notify(
                            NoticeLevel::Success,
                            format!("Achievement unlocked: {}", def.name),
                        );
                    }
                }
            }
        }
    }

    fn announce(&mut self, action: &GameAction) {
        let catalog = self.catalog;
        let text = match action {
            GameAction::PlaceBuilding { type_id, x, y } => catalog.building(*type_id).map(|ty| {
                log::debug!("placed {} at ({x}, {y})", ty.name);
                format!("Built {}", ty.name)
            }),
            GameAction::UpgradeBuilding { building_id } => {
                self.state.building(*building_id).map(|b| {
                    let name = catalog
                        .building(b.type_id)
                        .map_or("Building", |t| t.name.as_str());
                    format!("{name} upgraded to level {}", b.level)
                })
            }
            _ => None,
        };
        if let Some(text) = text {
            self.notify(NoticeLevel::Info, text);
        }
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        self.notices.push(Notice { level, text });
    }

    fn persist(&self) {
        let raw = match Snapshot::capture(&self.state).encode() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("snapshot not saved: {e}");
                return;
            }
        };
        if let Err(e) = self.store.save(&self.config.storage_key, &raw) {
            log::warn!("snapshot not saved: {e}");
        }
    }
}

fn is_player_facing(action: &GameAction) -> bool {
    matches!(
        action,
        GameAction::PlaceBuilding { .. } | GameAction::UpgradeBuilding { .. }
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
