// Entry point for the Minesweeper TUI application
// Initializes configuration, language settings, and launches the main UI

use std::error::Error;

// Module declarations
mod psw_color; // Terminal color capability matching
mod psw_game;  // Field generation, reveal logic, and configuration
mod psw_lang;  // Multi-language string resources
mod psw_ui;    // Terminal UI rendering and event handling

use psw_game::load_or_create_config;
use psw_lang::Lang;
use psw_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (board size, preferences)
    let mut cfg = load_or_create_config();

    // Initialize language resources based on saved or system language
    let mut lang = Lang::new(&cfg.language);

    // Launch the main UI loop
    run_ui(&mut cfg, &mut lang)
}
