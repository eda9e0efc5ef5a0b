// Core game logic and configuration management
// Handles field generation, reveal/flag state, and configuration persistence

use directories::ProjectDirs;
use rand::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default per-cell mine probability; overridable from the config file only
pub const DEFAULT_MINE_PROBABILITY: f64 = 0.1;

/// Board size presets selectable from the size dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Small,  // 10x10
    Medium, // 20x20
    Wide,   // 40x20
}

impl Serialize for SizePreset {
    /// Serialize the preset as its display label (e.g. "20x20")
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SizePreset {
    /// Deserialize the preset from its label in the config file
    fn deserialize<D>(deserializer: D) -> Result<SizePreset, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            x if x == SizePreset::Small.name() => Ok(SizePreset::Small),
            x if x == SizePreset::Medium.name() => Ok(SizePreset::Medium),
            x if x == SizePreset::Wide.name() => Ok(SizePreset::Wide),
            _ => Err(serde::de::Error::custom("unknown size preset")),
        }
    }
}

impl SizePreset {
    /// Get board dimensions (width, height) for this preset
    pub fn params(&self) -> (usize, usize) {
        match self {
            SizePreset::Small => (10, 10),
            SizePreset::Medium => (20, 20),
            SizePreset::Wide => (40, 20),
        }
    }

    /// Display label, also the config file identifier for this preset
    /// Should remain stable across versions
    pub fn name(&self) -> &'static str {
        match self {
            SizePreset::Small => "10x10",
            SizePreset::Medium => "20x20",
            SizePreset::Wide => "40x20",
        }
    }

    /// Convert preset to list index (0-2)
    pub fn to_index(&self) -> usize {
        match self {
            SizePreset::Small => 0,
            SizePreset::Medium => 1,
            SizePreset::Wide => 2,
        }
    }

    /// Create preset from list index; out-of-range indices map to Small
    pub fn from_index(i: usize) -> SizePreset {
        match i {
            1 => SizePreset::Medium,
            2 => SizePreset::Wide,
            _ => SizePreset::Small,
        }
    }

    /// All presets in dialog order
    pub fn all() -> [SizePreset; 3] {
        [SizePreset::Small, SizePreset::Medium, SizePreset::Wide]
    }
}

/// Configuration errors; reported at startup instead of silently defaulting
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    InvalidDimensions { width: usize, height: usize },
    InvalidProbability(f64),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {}x{}", width, height)
            }
            GameError::InvalidProbability(p) => {
                write!(f, "mine probability {} not in [0, 1)", p)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// User configuration
/// Persisted to disk as TOML; the board itself is never persisted
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Current board size preset
    pub size: SizePreset,

    // Per-cell mine probability, must stay in [0, 1)
    // Not exposed in the UI, editable in the config file
    pub mine_probability: f64,

    // Display preferences
    pub ascii_icons: bool,    // Use ASCII fallback icons
    pub show_indicator: bool, // Show cursor position indicator
    pub language: String,     // Language code ("en" or "zh")
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language on first run
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let lang = if system_lang.to_lowercase().starts_with("zh") {
            "zh".to_string()
        } else {
            "en".to_string()
        };

        Config {
            size: SizePreset::Small,
            mine_probability: DEFAULT_MINE_PROBABILITY,
            ascii_icons: false,
            show_indicator: false,
            language: lang,
        }
    }
}

/// Game state as observed by the UI; there is no "won" state, the game
/// only ends when a mine is revealed or a new board is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    InProgress,
    Lost,
}

/// A single cell on the minefield
#[derive(Clone, Copy)]
pub struct Cell {
    pub mine: bool, // Contains a mine
    pub adj: u8,    // Adjacent mine count (0-8); never read for mine cells
}

/// One game session: the field plus all reveal/flag state.
/// Discarded and rebuilt whenever the board is resized or a new game starts.
#[derive(Clone)]
pub struct Game {
    pub w: usize,               // Board width
    pub h: usize,               // Board height
    pub mine_probability: f64,  // Bernoulli parameter used for this field
    pub mines: usize,           // Mines actually placed (no fixed count)
    pub board: Vec<Cell>,       // Field cells (mines + adjacency counts)
    pub revealed: Vec<bool>,    // Cell reveal status
    pub flagged: Vec<bool>,     // Cell flag status
    pub cursor: (usize, usize), // Current cursor position
    pub state: GameState,       // InProgress until a mine is revealed
}

impl Game {
    /// Create a new game with a freshly generated field
    pub fn new(w: usize, h: usize, mine_probability: f64) -> Result<Self, GameError> {
        Self::with_rng(w, h, mine_probability, &mut thread_rng())
    }

    /// Like [`Game::new`] but drawing samples from the given generator,
    /// so tests can seed the field
    pub fn with_rng<R: Rng + ?Sized>(
        w: usize,
        h: usize,
        mine_probability: f64,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if w == 0 || h == 0 {
            return Err(GameError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        if !(0.0..1.0).contains(&mine_probability) {
            return Err(GameError::InvalidProbability(mine_probability));
        }
        let mut g = Game {
            w,
            h,
            mine_probability,
            mines: 0,
            board: vec![Cell { mine: false, adj: 0 }; w * h],
            revealed: vec![false; w * h],
            flagged: vec![false; w * h],
            cursor: (0, 0),
            state: GameState::InProgress,
        };
        g.generate_field(rng);
        Ok(g)
    }

    /// Convert (x, y) coordinates to flat array index
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    /// Populate the field: one independent uniform draw per cell decides
    /// whether it holds a mine, then adjacency counts are computed once all
    /// mines are known. The total mine count is whatever the draws produce.
    fn generate_field<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in self.board.iter_mut() {
            cell.mine = rng.gen_bool(self.mine_probability);
            cell.adj = 0;
        }
        self.mines = self.board.iter().filter(|c| c.mine).count();
        // adjacency in a second pass, after every mine is placed
        for y in 0..self.h {
            for x in 0..self.w {
                let mut adj = 0u8;
                for oy in y.saturating_sub(1)..=(y + 1).min(self.h - 1) {
                    for ox in x.saturating_sub(1)..=(x + 1).min(self.w - 1) {
                        if ox == x && oy == y {
                            continue;
                        }
                        if self.board[self.index(ox, oy)].mine {
                            adj += 1
                        }
                    }
                }
                let idx = self.index(x, y);
                self.board[idx].adj = adj;
            }
        }
    }

    /// Reveal a cell at (x, y)
    /// - No-op on revealed or flagged cells, or once the game is lost
    /// - Auto-reveals neighbors if the cell has no adjacent mines (flood fill)
    /// - Revealing a mine loses the game and uncovers every remaining mine
    pub fn reveal(&mut self, x: usize, y: usize) -> GameState {
        let idx = self.index(x, y);
        if self.state == GameState::Lost || self.revealed[idx] || self.flagged[idx] {
            return self.state;
        }
        self.revealed[idx] = true;
        if self.board[idx].mine {
            self.state = GameState::Lost;
            self.reveal_all_mines();
            return self.state;
        }
        // Flood fill: the re-entrancy check above keeps the recursion from
        // cycling; depth is bounded by the number of cells
        if self.board[idx].adj == 0 {
            for oy in y.saturating_sub(1)..=(y + 1).min(self.h - 1) {
                for ox in x.saturating_sub(1)..=(x + 1).min(self.w - 1) {
                    if !(ox == x && oy == y) && !self.revealed[self.index(ox, oy)] {
                        self.reveal(ox, oy);
                    }
                }
            }
        }
        self.state
    }

    /// Toggle the flag marker on a cell; no-op on revealed cells or once
    /// the game is lost
    pub fn toggle_flag(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        if self.state == GameState::Lost || self.revealed[idx] {
            return;
        }
        self.flagged[idx] = !self.flagged[idx];
    }

    /// Uncover every still-hidden mine; non-mine cells are left untouched
    pub fn reveal_all_mines(&mut self) {
        for i in 0..self.w * self.h {
            if self.board[i].mine {
                self.revealed[i] = true;
            }
        }
    }

    /// Get the mine counter display value (placed mines - flagged cells)
    /// Can be negative if the player places too many flags
    pub fn remaining_mines(&self) -> isize {
        let flagged = self.flagged.iter().filter(|b| **b).count();
        self.mines as isize - flagged as isize
    }

    pub fn step_cursor(&mut self, dx: isize, dy: isize) {
        let nx = (self.cursor.0 as isize + dx).clamp(0, (self.w - 1) as isize) as usize;
        let ny = (self.cursor.1 as isize + dy).clamp(0, (self.h - 1) as isize) as usize;
        self.cursor = (nx, ny);
    }
}

/// Get the configuration file path
/// Uses the platform config directory (e.g. ~/.config/pswpr/pswpr.toml on Linux)
/// Falls back to the current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    if let Ok(exe) = env::current_exe() {
        if let Some(name) = exe.file_stem().and_then(|s| s.to_str()) {
            if let Some(proj) = ProjectDirs::from("com", "pswpr", name) {
                let mut path = proj.config_dir().to_path_buf();
                path.push(format!("{}.toml", name));
                return Some(path);
            } else {
                // fallback to current directory
                if let Ok(mut path) = env::current_dir() {
                    path.push(format!("{}.toml", name));
                    return Some(path);
                }
            }
        }
    }
    None
}

/// Load configuration from disk, or create the default one if not found.
/// An unreadable or unparseable file falls back to defaults; a probability
/// outside [0, 1) is left in place and rejected at game construction.
pub fn load_or_create_config() -> Config {
    if let Some(path) = config_path() {
        if path.exists() {
            if let Ok(s) = fs::read_to_string(&path) {
                if let Ok(cfg) = toml::from_str::<Config>(&s) {
                    return cfg;
                }
            }
        }
        let cfg = Config::default();
        if let Ok(s) = toml::to_string(&cfg) {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&path, s);
        }
        return cfg;
    }
    Config::default()
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    if let Some(path) = config_path() {
        if let Ok(s) = toml::to_string(cfg) {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&path, s);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// A 3x3 field with a single mine in the middle; every other cell
    /// has exactly one adjacent mine
    fn single_mine_3x3() -> Game {
        let mut g = Game::with_rng(3, 3, 0.0, &mut seeded(0)).unwrap();
        let center = g.index(1, 1);
        g.board[center].mine = true;
        g.mines = 1;
        for i in 0..9 {
            if i != center {
                g.board[i].adj = 1;
            }
        }
        g
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert_eq!(
            Game::new(0, 10, 0.1).err(),
            Some(GameError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
        assert!(Game::new(10, 0, 0.1).is_err());
    }

    #[test]
    fn rejects_invalid_probability() {
        assert_eq!(
            Game::new(10, 10, 1.0).err(),
            Some(GameError::InvalidProbability(1.0))
        );
        assert!(Game::new(10, 10, -0.1).is_err());
        assert!(Game::new(10, 10, 0.0).is_ok());
    }

    #[test]
    fn adjacency_counts_match_neighboring_mines() {
        for seed in 0..8 {
            let g = Game::with_rng(20, 20, 0.3, &mut seeded(seed)).unwrap();
            for y in 0..g.h {
                for x in 0..g.w {
                    let idx = g.index(x, y);
                    if g.board[idx].mine {
                        continue;
                    }
                    let mut expected = 0u8;
                    for oy in y.saturating_sub(1)..=(y + 1).min(g.h - 1) {
                        for ox in x.saturating_sub(1)..=(x + 1).min(g.w - 1) {
                            if !(ox == x && oy == y) && g.board[g.index(ox, oy)].mine {
                                expected += 1;
                            }
                        }
                    }
                    assert_eq!(g.board[idx].adj, expected, "cell ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn probability_extremes_bound_mine_count() {
        let empty = Game::with_rng(10, 10, 0.0, &mut seeded(6)).unwrap();
        assert_eq!(empty.mines, 0);
        let dense = Game::with_rng(10, 10, 0.99, &mut seeded(6)).unwrap();
        assert!(dense.mines > 50, "0.99 field only got {} mines", dense.mines);
    }

    #[test]
    fn mine_count_matches_placed_mines() {
        let g = Game::with_rng(40, 20, 0.1, &mut seeded(7)).unwrap();
        assert_eq!(g.mines, g.board.iter().filter(|c| c.mine).count());
        assert_eq!(g.remaining_mines(), g.mines as isize);
    }

    #[test]
    fn zero_probability_board_floods_completely() {
        let mut g = Game::with_rng(5, 4, 0.0, &mut seeded(1)).unwrap();
        assert_eq!(g.reveal(2, 1), GameState::InProgress);
        assert!(g.revealed.iter().all(|r| *r));
    }

    #[test]
    fn nonzero_cell_does_not_propagate() {
        let mut g = single_mine_3x3();
        g.reveal(0, 0);
        let corner = g.index(0, 0);
        for i in 0..9 {
            assert_eq!(g.revealed[i], i == corner);
        }
        assert_eq!(g.state, GameState::InProgress);
    }

    #[test]
    fn revealing_mine_loses_and_uncovers_all_mines() {
        let mut g = Game::with_rng(10, 10, 0.4, &mut seeded(3)).unwrap();
        let (mx, my) = (0..g.w * g.h)
            .find(|i| g.board[*i].mine)
            .map(|i| (i % g.w, i / g.w))
            .expect("seed places at least one mine");
        assert_eq!(g.reveal(mx, my), GameState::Lost);
        for i in 0..g.w * g.h {
            if g.board[i].mine {
                assert!(g.revealed[i], "mine {} left hidden", i);
            } else {
                assert!(!g.revealed[i], "non-mine {} auto-revealed", i);
            }
        }
        // further interaction is a no-op once lost
        let hidden = g.revealed.clone();
        g.reveal(mx, my);
        assert_eq!(g.revealed, hidden);
        g.toggle_flag(0, 0);
        assert!(g.flagged.iter().all(|f| ! *f));
    }

    #[test]
    fn flag_blocks_reveal_and_toggles_back() {
        let mut g = single_mine_3x3();
        g.toggle_flag(0, 0);
        assert!(g.flagged[g.index(0, 0)]);
        g.reveal(0, 0);
        assert!(!g.revealed[g.index(0, 0)]);
        g.toggle_flag(0, 0);
        assert!(!g.flagged[g.index(0, 0)]);
    }

    #[test]
    fn flag_is_noop_on_revealed_cell() {
        let mut g = single_mine_3x3();
        g.reveal(0, 0);
        g.toggle_flag(0, 0);
        assert!(!g.flagged[g.index(0, 0)]);
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        // 5x5 with a single corner mine: everything but the mine is revealed
        // from the far zero-region, the numbered ring included
        let mut g = Game::with_rng(5, 5, 0.0, &mut seeded(2)).unwrap();
        let m = g.index(0, 0);
        g.board[m].mine = true;
        g.mines = 1;
        for (x, y) in [(1usize, 0usize), (0, 1), (1, 1)] {
            let i = g.index(x, y);
            g.board[i].adj = 1;
        }
        g.reveal(4, 4);
        for i in 0..25 {
            assert_eq!(g.revealed[i], i != m);
        }
        assert_eq!(g.state, GameState::InProgress);
    }

    #[test]
    fn new_game_resets_all_state() {
        let mut g = Game::with_rng(10, 10, 0.5, &mut seeded(4)).unwrap();
        let (mx, my) = (0..g.w * g.h)
            .find(|i| g.board[*i].mine)
            .map(|i| (i % g.w, i / g.w))
            .unwrap();
        g.toggle_flag(9, 9);
        g.reveal(mx, my);
        assert_eq!(g.state, GameState::Lost);

        let (w, h) = SizePreset::Medium.params();
        let g = Game::with_rng(w, h, 0.1, &mut seeded(5)).unwrap();
        assert_eq!((g.w, g.h), (20, 20));
        assert_eq!(g.state, GameState::InProgress);
        assert!(g.revealed.iter().all(|r| !*r));
        assert!(g.flagged.iter().all(|f| !*f));
    }

    #[test]
    fn preset_round_trips() {
        for p in SizePreset::all() {
            assert_eq!(SizePreset::from_index(p.to_index()), p);
        }
        assert_eq!(SizePreset::Wide.params(), (40, 20));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            size: SizePreset::Wide,
            mine_probability: 0.25,
            ascii_icons: true,
            show_indicator: false,
            language: "zh".to_string(),
        };
        let s = toml::to_string(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.size, SizePreset::Wide);
        assert_eq!(back.mine_probability, 0.25);
        assert!(back.ascii_icons);
        assert_eq!(back.language, "zh");
    }
}
