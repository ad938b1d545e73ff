pub mod confirm;
pub mod progress_bar;
pub mod question_card;
pub mod question_map;
pub mod results_panel;
pub mod settings_panel;
pub mod stats_panel;
