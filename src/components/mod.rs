pub mod achievements_panel;
pub mod app;
pub mod building_menu;
pub mod game_board;
pub mod header;
pub mod resource_panel;
pub mod settings_modal;
pub mod toast_stack;
pub mod upgrades_view;

pub use app::App;
