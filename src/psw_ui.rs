use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};

use crate::psw_color::{TermAdapt, number_color};
use crate::psw_game::{Config, Game, GameError, GameState, SizePreset, save_config};
use crate::psw_lang::Lang;
use unicode_width::UnicodeWidthStr;

fn reset_ui_after_new_game(game: &mut Game, ui: &mut UiState) {
    ui.reset_after_new_game();
    ui.cursor_indicator = Some(game.cursor);
}

/// Build a fresh game session from the configured preset and probability
fn start_new_game(cfg: &Config) -> Result<Game, GameError> {
    let (w, h) = cfg.size.params();
    Game::new(w, h, cfg.mine_probability)
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    col >= r.x
        && col <= r.x + r.width.saturating_sub(1)
        && row >= r.y
        && row <= r.y + r.height.saturating_sub(1)
}

// Group runtime UI variables into a single structure to simplify passing them around
#[derive(Debug)]
struct UiState {
    left_press: Option<(usize, usize)>,
    // cursor indicator position (cell coords) for the board
    cursor_indicator: Option<(usize, usize)>,
    clicked_index: Option<usize>,
    click_instant: Option<Instant>,
    hover_index: Option<usize>,
    modal_rect: Option<Rect>,
    modal_close_rect: Option<Rect>,
    modal_close_hovered: bool,
    modal_close_pressed: bool,
    showing_help: bool,
    showing_about: bool,
    showing_options: bool,
    showing_size: bool,
    showing_loss: bool,
    size_hover: Option<usize>,
    options_focus: Option<u8>,
    options_indicator: bool,
    options_ascii: bool,
    options_zh: bool,
    options_indicator_rect: Option<Rect>,
    options_ascii_rect: Option<Rect>,
    options_language_rect: Option<Rect>,
    exit_menu_item_down: bool, // Track when exit label is pressed, wait for release
    exit_status_hovered: bool,
}

impl UiState {
    fn new() -> Self {
        UiState {
            left_press: None,
            cursor_indicator: None,
            clicked_index: None,
            click_instant: None,
            hover_index: None,
            modal_rect: None,
            modal_close_rect: None,
            modal_close_hovered: false,
            modal_close_pressed: false,
            showing_help: false,
            showing_about: false,
            showing_options: false,
            showing_size: false,
            showing_loss: false,
            size_hover: None,
            options_focus: None,
            options_indicator: false,
            options_ascii: false,
            options_zh: false,
            options_indicator_rect: None,
            options_ascii_rect: None,
            options_language_rect: None,
            exit_menu_item_down: false,
            exit_status_hovered: false,
        }
    }

    fn reset_after_new_game(&mut self) {
        *self = UiState::new();
    }

    fn close_modals(&mut self) {
        self.showing_help = false;
        self.showing_about = false;
        self.showing_options = false;
        self.showing_size = false;
        self.showing_loss = false;
        self.modal_rect = None;
        self.modal_close_rect = None;
        self.modal_close_pressed = false;
        self.hover_index = None;
        self.size_hover = None;
        self.options_focus = None;
    }
}

pub fn run(cfg: &mut Config, lang: &mut Lang) -> Result<(), Box<dyn Error>> {
    // Fails fast when the config file carries invalid dimensions/probability
    let mut game = start_new_game(cfg)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // grouped runtime UI state
    let mut ui = UiState::new();
    ui.cursor_indicator = Some(game.cursor);
    let mut menu_rect: Option<Rect> = None;
    let mut board_rect: Option<Rect> = None;
    let mut status_rect: Option<Rect> = None;
    let mut size_selected: usize = cfg.size.to_index();
    let mut exit_requested = false;

    // Glyph computation helper: compute glyphs based on ascii_icons setting.
    let make_glyphs = |ascii: bool| {
        (
            (if ascii { "▪" } else { "■" }, Color::Gray.adapt()),
            (if ascii { "*" } else { "☼" }, Color::Black.adapt()),
            (if ascii { "F" } else { "⚑" }, Color::Red.adapt()),
        )
    };
    let g_init = make_glyphs(cfg.ascii_icons);
    let mut glyph_unopened = g_init.0;
    let mut glyph_mine = g_init.1;
    let mut glyph_flag = g_init.2;

    // Background color for the minefield
    let board_bg = Color::DarkGray.adapt();
    // Cursor background color
    let cursor_bg = Color::LightBlue.adapt();
    // Background for a pressed, not yet released cell
    let press_bg = Color::DarkGray.adapt();
    // Menu / key label colors
    let menu_key_fg = Color::Yellow.adapt();
    let menu_key_bg_hover = Color::LightBlue.adapt();
    let menu_key_bg_pressed = Color::Green.adapt();
    let menu_key_fg_pressed = Color::Black.adapt();
    // cursor indicator appearance
    let indicator_char = "▸";
    let indicator_fg = Color::Yellow.adapt();

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        // Menu items (key, label); Esc lives here too so the status row can reuse it
        let menu_items: [(&str, &str); 6] = [
            ("F1", lang.assets.menu_help),
            ("F2", lang.assets.menu_new),
            ("F5", lang.assets.menu_size),
            ("F7", lang.assets.menu_options),
            ("F9", lang.assets.menu_about),
            ("Esc", lang.assets.menu_exit),
        ];

        terminal.draw(|f| {
            let size = f.size();
            let min_twidth = 80u16.max((game.w as u16) * 2 + 5);
            let min_theight = 24u16 + (game.h as u16).saturating_sub(16);
            // If terminal too small, render a centered warning and skip normal UI
            if size.width < min_twidth || size.height < min_theight {
                let dims = lang
                    .assets
                    .tsmsg_line2_fmt
                    .replacen("{}", &min_twidth.to_string(), 1)
                    .replacen("{}", &min_theight.to_string(), 1);
                let warn_lines = vec![
                    Spans::from(Span::raw(lang.assets.tsmsg_line1)),
                    Spans::from(Span::raw(dims)),
                ];
                let warn = Paragraph::new(Text::from(warn_lines))
                    .block(Block::default().borders(Borders::ALL).title(lang.assets.tsmsg_title))
                    .alignment(Alignment::Center);
                f.render_widget(Clear, size);
                let w = 40u16.min(size.width.saturating_sub(2));
                let h = 5u16.min(size.height.saturating_sub(2));
                f.render_widget(warn, center_rect(w, h, size));
                return;
            }

            // layout: top menu row, center board, bottom status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(0)
                .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
                .split(size);

            // menu row (per-item styled so hover/click mapping aligns with mouse offsets)
            let mut spans_vec: Vec<Span> = Vec::new();
            for (i, (label_key, label_rest)) in menu_items.iter().take(5).enumerate() {
                if i > 0 {
                    spans_vec.push(Span::raw("   "));
                }
                let (key_style, rest_style) = if Some(i) == ui.clicked_index {
                    (
                        Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD),
                        Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed),
                    )
                } else if Some(i) == ui.hover_index {
                    (
                        Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD),
                        Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed),
                    )
                } else {
                    (Style::default().fg(menu_key_fg).add_modifier(Modifier::BOLD), Style::default())
                };
                spans_vec.push(Span::styled(label_key.to_string(), key_style));
                spans_vec.push(Span::styled(format!(": {}", label_rest), rest_style));
            }
            spans_vec.insert(0, Span::raw(" "));
            spans_vec.push(Span::raw(" "));
            let menu = Paragraph::new(Spans::from(spans_vec))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(menu, chunks[0]);
            menu_rect = Some(chunks[0]);

            // status row (left info + right-aligned Esc: Exit)
            let left_text = format!(" {}: {} ", lang.assets.status_mines, game.remaining_mines());
            let (right_key, right_rest) = menu_items[5];
            let inner_w = chunks[2].width.saturating_sub(2) as usize;
            let left_w = left_text.as_str().width();
            // account for the ": " we add when rendering the right-hand key/rest
            let right_w = right_key.width() + 2 + right_rest.width();
            let mid_spaces = if inner_w > left_w + right_w + 1 { inner_w - left_w - right_w - 1 } else { 1 };
            let mut status_spans: Vec<Span> = Vec::new();
            status_spans.push(Span::raw(left_text));
            status_spans.push(Span::raw(" ".repeat(mid_spaces)));
            let mut key_style = Style::default().fg(menu_key_fg).add_modifier(Modifier::BOLD);
            let mut rest_style = Style::default();
            if ui.exit_menu_item_down {
                key_style = Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                rest_style = Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed);
            } else if ui.exit_status_hovered {
                key_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                rest_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed);
            }
            status_spans.push(Span::styled(right_key.to_string(), key_style));
            status_spans.push(Span::styled(format!(": {}", right_rest), rest_style));
            status_spans.push(Span::raw(" "));
            let status = Paragraph::new(Text::from(Spans::from(status_spans)))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(status, chunks[2]);
            status_rect = Some(chunks[2]);

            // board area
            let board_area = center_rect(((game.w * 2) as u16) + 3, (game.h as u16) + 2, chunks[1]);
            board_rect = Some(board_area);
            let mut lines = vec![];
            for y in 0..game.h {
                let mut spans = vec![];
                for x in 0..game.w {
                    let idx = game.index(x, y);
                    let mut s = glyph_unopened.0.to_string();
                    let mut style = Style::default().fg(glyph_unopened.1).bg(board_bg);
                    if game.cursor == (x, y) {
                        style = style.bg(cursor_bg);
                    }
                    if game.revealed[idx] {
                        if game.board[idx].mine {
                            s = glyph_mine.0.to_string();
                            style = style.fg(glyph_mine.1);
                        } else if game.board[idx].adj > 0 {
                            s = format!("{}", game.board[idx].adj);
                            style = style.fg(number_color(game.board[idx].adj));
                        } else {
                            s = " ".to_string();
                        }
                    } else if game.flagged[idx] {
                        s = glyph_flag.0.to_string();
                        style = style.fg(glyph_flag.1);
                    }
                    // highlight single-cell press (mouse down, not yet released)
                    if let Some((lx, ly)) = ui.left_press {
                        if x == lx && y == ly && !game.revealed[idx] && !game.flagged[idx] {
                            style = style.bg(press_bg).fg(press_bg);
                        }
                    }
                    // render cursor indicator if enabled and the cursor is on this cell
                    if cfg.show_indicator && ui.cursor_indicator == Some((x, y)) {
                        let indicator_style = style.fg(indicator_fg).add_modifier(Modifier::BOLD);
                        spans.push(Span::styled(indicator_char.to_string(), indicator_style));
                        spans.push(Span::styled(s, style));
                    } else {
                        spans.push(Span::styled(format!(" {}", s), style));
                    }
                }
                // one-character padding column so the right-side visual padding
                // uses the same background as the board
                spans.push(Span::styled(" ", Style::default().bg(board_bg)));
                lines.push(Spans::from(spans));
            }
            let paragraph = Paragraph::new(Text::from(lines))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(cfg.size.name())
                        .title_alignment(Alignment::Center),
                )
                .alignment(Alignment::Left);
            f.render_widget(paragraph, board_area);

            // modals
            ui.modal_close_rect = None;
            if ui.showing_size {
                let mrect = center_rect(26, 9, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[2].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let mut lines = vec![Spans::from(Span::raw(""))];
                let hover_index = ui.size_hover.unwrap_or(size_selected);
                for (i, p) in SizePreset::all().iter().enumerate() {
                    let mark = if i == hover_index { "*" } else { " " };
                    let idx = format!(" {} ", i + 1);
                    let suffix = format!(") {}", p.name());
                    let focus_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                    if i == hover_index {
                        lines.push(Spans::from(vec![
                            Span::raw(idx),
                            Span::styled(mark, focus_style),
                            Span::styled(suffix, focus_style),
                        ]));
                    } else {
                        let mark_style = if i == size_selected {
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        lines.push(Spans::from(vec![
                            Span::raw(idx),
                            Span::styled(mark, mark_style),
                            Span::raw(suffix),
                        ]));
                    }
                }
                lines.push(Spans::from(Span::raw("")));
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
                render_modal_button(f, &mut ui, mrect, lang.assets.btn_close);
            }

            if ui.showing_options {
                let mrect = center_rect(30, 8, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[3].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let cb0 = if ui.options_indicator { "[x]" } else { "[ ]" };
                let cb1 = if ui.options_ascii { "[x]" } else { "[ ]" };
                let label0 = format!("{} {}", cb0, lang.assets.opt_show_indicator);
                let label1 = format!("{} {}", cb1, lang.assets.opt_ascii_icons);
                let label2 = format!(
                    "{}: {}",
                    lang.assets.opt_language,
                    if ui.options_zh { lang.assets.lang_chinese } else { lang.assets.lang_english }
                );
                let focus_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                let mut lines = vec![Spans::from(Span::raw(""))];
                for (i, label) in [&label0, &label1, &label2].iter().enumerate() {
                    let span = if ui.options_focus == Some(i as u8) {
                        Span::styled(label.to_string(), focus_style)
                    } else {
                        Span::raw(label.to_string())
                    };
                    lines.push(Spans::from(vec![Span::raw(" "), span]));
                }
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
                // clickable areas cover the visible label text, not the whole line
                ui.options_indicator_rect = Some(Rect::new(inner.x + 1, inner.y + 1, label0.as_str().width() as u16, 1));
                ui.options_ascii_rect = Some(Rect::new(inner.x + 1, inner.y + 2, label1.as_str().width() as u16, 1));
                ui.options_language_rect = Some(Rect::new(inner.x + 1, inner.y + 3, label2.as_str().width() as u16, 1));
                render_modal_button(f, &mut ui, mrect, lang.assets.btn_ok);
            }

            if ui.showing_help {
                let mrect = center_rect(44, 10, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[0].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let help_lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(lang.assets.help_controls)),
                    Spans::from(Span::raw(lang.assets.help_move)),
                    Spans::from(Span::raw(lang.assets.help_reveal)),
                    Spans::from(Span::raw(lang.assets.help_flag)),
                ];
                let p = Paragraph::new(Text::from(help_lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
                render_modal_button(f, &mut ui, mrect, lang.assets.btn_close);
            }

            if ui.showing_about {
                let mrect = center_rect(48, 9, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[4].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(env!("CARGO_PKG_DESCRIPTION"))),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(format!("v{} by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS")))),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
                render_modal_button(f, &mut ui, mrect, lang.assets.btn_close);
            }

            if ui.showing_loss {
                let mrect = bottom_center_rect(44, 8, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(lang.assets.loss_title), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(lang.assets.loss_message)),
                    Spans::from(Span::raw(lang.assets.loss_better_luck)),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
                render_modal_button(f, &mut ui, mrect, lang.assets.btn_close);
            }
        })?;

        // bind cursor indicator to current logical cursor each frame so it's always synced
        ui.cursor_indicator = Some(game.cursor);

        // If no modal was rendered this frame, ensure close button state is cleared
        if ui.modal_rect.is_none() {
            ui.modal_close_hovered = false;
            ui.modal_close_pressed = false;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(KeyEvent { code, kind, .. }) => {
                    if kind == KeyEventKind::Press {
                        if ui.showing_size {
                            match code {
                                KeyCode::Char(c @ '1'..='3') => {
                                    let i = c as usize - '1' as usize;
                                    size_selected = i;
                                    cfg.size = SizePreset::from_index(i);
                                    save_config(cfg);
                                    game = start_new_game(cfg)?;
                                    reset_ui_after_new_game(&mut game, &mut ui);
                                }
                                KeyCode::Up => {
                                    let base = ui.size_hover.unwrap_or(size_selected);
                                    let new_idx = if base == 0 { 2 } else { base - 1 };
                                    size_selected = new_idx;
                                    ui.size_hover = Some(new_idx);
                                }
                                KeyCode::Down => {
                                    let base = ui.size_hover.unwrap_or(size_selected);
                                    let new_idx = (base + 1) % 3;
                                    size_selected = new_idx;
                                    ui.size_hover = Some(new_idx);
                                }
                                KeyCode::Enter | KeyCode::Char(' ') => {
                                    cfg.size = SizePreset::from_index(size_selected);
                                    save_config(cfg);
                                    game = start_new_game(cfg)?;
                                    reset_ui_after_new_game(&mut game, &mut ui);
                                }
                                KeyCode::Esc => ui.close_modals(),
                                _ => {}
                            }
                        } else if ui.showing_options {
                            match code {
                                KeyCode::Esc => ui.close_modals(),
                                KeyCode::Enter => {
                                    cfg.show_indicator = ui.options_indicator;
                                    cfg.ascii_icons = ui.options_ascii;
                                    let code = if ui.options_zh { "zh" } else { "en" };
                                    if cfg.language != code {
                                        cfg.language = code.to_string();
                                        lang.switch_to(code);
                                    }
                                    let g = make_glyphs(cfg.ascii_icons);
                                    glyph_unopened = g.0;
                                    glyph_mine = g.1;
                                    glyph_flag = g.2;
                                    save_config(cfg);
                                    ui.close_modals();
                                }
                                KeyCode::Up => {
                                    let f = ui.options_focus.unwrap_or(0);
                                    ui.options_focus = Some(if f == 0 { 2 } else { f - 1 });
                                }
                                KeyCode::Down => {
                                    let f = ui.options_focus.unwrap_or(0);
                                    ui.options_focus = Some((f + 1) % 3);
                                }
                                KeyCode::Char(' ') => match ui.options_focus.unwrap_or(0) {
                                    0 => ui.options_indicator = !ui.options_indicator,
                                    1 => ui.options_ascii = !ui.options_ascii,
                                    2 => ui.options_zh = !ui.options_zh,
                                    _ => {}
                                },
                                _ => {}
                            }
                        } else if ui.showing_help || ui.showing_about {
                            // any key closes
                            ui.close_modals();
                        } else if ui.showing_loss {
                            // any key acknowledges the loss and starts a new game
                            ui.close_modals();
                            game = start_new_game(cfg)?;
                            reset_ui_after_new_game(&mut game, &mut ui);
                        } else {
                            // normal gameplay key-press handling
                            match code {
                                KeyCode::Esc => break,
                                KeyCode::F(1) => ui.showing_help = true,
                                KeyCode::F(2) => {
                                    game = start_new_game(cfg)?;
                                    reset_ui_after_new_game(&mut game, &mut ui);
                                }
                                KeyCode::F(5) => {
                                    size_selected = cfg.size.to_index();
                                    ui.size_hover = None;
                                    ui.showing_size = true;
                                }
                                KeyCode::F(7) => {
                                    ui.options_indicator = cfg.show_indicator;
                                    ui.options_ascii = cfg.ascii_icons;
                                    ui.options_zh = cfg.language == "zh";
                                    ui.options_focus = Some(0);
                                    ui.showing_options = true;
                                }
                                KeyCode::F(9) => ui.showing_about = true,
                                KeyCode::Left => {
                                    game.step_cursor(-1, 0);
                                    ui.cursor_indicator = Some(game.cursor);
                                }
                                KeyCode::Right => {
                                    game.step_cursor(1, 0);
                                    ui.cursor_indicator = Some(game.cursor);
                                }
                                KeyCode::Up => {
                                    game.step_cursor(0, -1);
                                    ui.cursor_indicator = Some(game.cursor);
                                }
                                KeyCode::Down => {
                                    game.step_cursor(0, 1);
                                    ui.cursor_indicator = Some(game.cursor);
                                }
                                KeyCode::Char(' ') => {
                                    if game.state == GameState::InProgress {
                                        let (cx, cy) = game.cursor;
                                        if game.reveal(cx, cy) == GameState::Lost {
                                            ui.showing_loss = true;
                                        }
                                    }
                                }
                                KeyCode::Char('f') | KeyCode::Char('F') => {
                                    if game.state == GameState::InProgress {
                                        let (cx, cy) = game.cursor;
                                        game.toggle_flag(cx, cy);
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                Event::Mouse(me) => {
                    // if a modal is open, only respond to mouse events inside it
                    if let Some(mrect) = ui.modal_rect {
                        match me.kind {
                            MouseEventKind::Moved => {
                                if !hit(mrect, me.column, me.row) {
                                    ui.modal_close_hovered = false;
                                } else {
                                    ui.modal_close_hovered = ui
                                        .modal_close_rect
                                        .map_or(false, |btn| hit(btn, me.column, me.row));
                                    if ui.showing_size {
                                        // content layout: 0:blank, 1..3:size presets
                                        let local_row = me.row as i32 - mrect.y as i32 - 1;
                                        if (1..=3).contains(&local_row) {
                                            ui.size_hover = Some((local_row - 1) as usize);
                                        } else {
                                            ui.size_hover = None;
                                        }
                                    }
                                    if ui.showing_options {
                                        for (i, rect) in [
                                            ui.options_indicator_rect,
                                            ui.options_ascii_rect,
                                            ui.options_language_rect,
                                        ]
                                        .iter()
                                        .enumerate()
                                        {
                                            if rect.map_or(false, |r| hit(r, me.column, me.row)) {
                                                ui.options_focus = Some(i as u8);
                                            }
                                        }
                                    }
                                }
                            }
                            MouseEventKind::Down(MouseButton::Left) => {
                                if hit(mrect, me.column, me.row) {
                                    if ui.modal_close_rect.map_or(false, |btn| hit(btn, me.column, me.row)) {
                                        ui.modal_close_pressed = true;
                                    } else if ui.showing_size {
                                        let local_row = me.row as i32 - mrect.y as i32 - 1;
                                        if (1..=3).contains(&local_row) {
                                            let i = (local_row - 1) as usize;
                                            size_selected = i;
                                            cfg.size = SizePreset::from_index(i);
                                            save_config(cfg);
                                            game = start_new_game(cfg)?;
                                            reset_ui_after_new_game(&mut game, &mut ui);
                                        }
                                    } else if ui.showing_options {
                                        if ui.options_indicator_rect.map_or(false, |r| hit(r, me.column, me.row)) {
                                            ui.options_indicator = !ui.options_indicator;
                                            ui.options_focus = Some(0);
                                        } else if ui.options_ascii_rect.map_or(false, |r| hit(r, me.column, me.row)) {
                                            ui.options_ascii = !ui.options_ascii;
                                            ui.options_focus = Some(1);
                                        } else if ui.options_language_rect.map_or(false, |r| hit(r, me.column, me.row)) {
                                            ui.options_zh = !ui.options_zh;
                                            ui.options_focus = Some(2);
                                        }
                                    }
                                }
                            }
                            MouseEventKind::Up(_) => {
                                if ui.modal_close_pressed {
                                    let released_in_btn = ui
                                        .modal_close_rect
                                        .map_or(false, |btn| hit(btn, me.column, me.row));
                                    ui.modal_close_pressed = false;
                                    if released_in_btn {
                                        if ui.showing_options {
                                            cfg.show_indicator = ui.options_indicator;
                                            cfg.ascii_icons = ui.options_ascii;
                                            let code = if ui.options_zh { "zh" } else { "en" };
                                            if cfg.language != code {
                                                cfg.language = code.to_string();
                                                lang.switch_to(code);
                                            }
                                            let g = make_glyphs(cfg.ascii_icons);
                                            glyph_unopened = g.0;
                                            glyph_mine = g.1;
                                            glyph_flag = g.2;
                                            save_config(cfg);
                                            ui.close_modals();
                                        } else {
                                            let was_loss = ui.showing_loss;
                                            ui.close_modals();
                                            if was_loss {
                                                game = start_new_game(cfg)?;
                                                reset_ui_after_new_game(&mut game, &mut ui);
                                            }
                                        }
                                    }
                                }
                            }
                            MouseEventKind::Down(MouseButton::Right) => {
                                // Right-click anywhere in a modal closes it (like Esc)
                                let was_loss = ui.showing_loss;
                                ui.close_modals();
                                if was_loss {
                                    game = start_new_game(cfg)?;
                                    reset_ui_after_new_game(&mut game, &mut ui);
                                }
                            }
                            _ => {}
                        }
                    } else {
                        // no modal: decide whether the mouse targets the menu or the board
                        let menu_handled = if let Some(rect) = menu_rect {
                            let start_x = rect.x + 2; // one-space left padding inside menu
                            let y = rect.y + 1;
                            if me.row == y {
                                match me.kind {
                                    MouseEventKind::Moved => {
                                        let mut offset = start_x;
                                        let mut found: Option<usize> = None;
                                        for (i, (k, r)) in menu_items.iter().take(5).enumerate() {
                                            if i > 0 {
                                                offset += 3;
                                            }
                                            // account for the ": " we add when rendering
                                            let full_len = (k.width() + 2 + r.width()) as u16;
                                            let end = offset + full_len - 1;
                                            if me.column >= offset && me.column <= end {
                                                found = Some(i);
                                                break;
                                            }
                                            offset = end + 1;
                                        }
                                        ui.hover_index = found;
                                        // when over the menu, clear the board indicator
                                        ui.cursor_indicator = None;
                                        true
                                    }
                                    MouseEventKind::Down(MouseButton::Left) => {
                                        let mut consumed = false;
                                        let mut offset = start_x;
                                        for (i, (k, r)) in menu_items.iter().take(5).enumerate() {
                                            if i > 0 {
                                                offset += 3;
                                            }
                                            let full_len = (k.width() + 2 + r.width()) as u16;
                                            let end = offset + full_len - 1;
                                            if me.column >= offset && me.column <= end {
                                                ui.clicked_index = Some(i);
                                                ui.click_instant = Some(Instant::now());
                                                match i {
                                                    0 => ui.showing_help = true,
                                                    1 => {
                                                        game = start_new_game(cfg)?;
                                                        reset_ui_after_new_game(&mut game, &mut ui);
                                                    }
                                                    2 => {
                                                        size_selected = cfg.size.to_index();
                                                        ui.size_hover = None;
                                                        ui.showing_size = true;
                                                    }
                                                    3 => {
                                                        ui.options_indicator = cfg.show_indicator;
                                                        ui.options_ascii = cfg.ascii_icons;
                                                        ui.options_zh = cfg.language == "zh";
                                                        ui.options_focus = Some(0);
                                                        ui.showing_options = true;
                                                    }
                                                    4 => ui.showing_about = true,
                                                    _ => {}
                                                }
                                                consumed = true;
                                                break;
                                            }
                                            offset = end + 1;
                                        }
                                        consumed
                                    }
                                    MouseEventKind::Up(_) => true,
                                    _ => false,
                                }
                            } else {
                                if let MouseEventKind::Moved = me.kind {
                                    ui.hover_index = None;
                                }
                                false
                            }
                        } else {
                            false
                        };

                        if !menu_handled {
                            // status bar Esc: Exit mouse interactions (right-aligned label)
                            if let Some(srect) = status_rect {
                                let status_row = srect.y + 1;
                                if me.row == status_row {
                                    // compute positions matching the rendering logic
                                    let left_text = format!(" {}: {} ", lang.assets.status_mines, game.remaining_mines());
                                    let (right_key, right_rest) = menu_items[5];
                                    let inner_w = srect.width.saturating_sub(2) as usize;
                                    let left_w = left_text.as_str().width();
                                    let right_w = right_key.width() + 2 + right_rest.width();
                                    let mid_spaces = if inner_w > left_w + right_w + 1 { inner_w - left_w - right_w - 1 } else { 1 };
                                    let start_x = srect.x + 1 + left_w as u16 + mid_spaces as u16;
                                    let end_x = start_x + (right_w as u16).saturating_sub(1);
                                    match me.kind {
                                        MouseEventKind::Moved => {
                                            ui.exit_status_hovered = me.column >= start_x && me.column <= end_x;
                                        }
                                        MouseEventKind::Down(MouseButton::Left) => {
                                            if me.column >= start_x && me.column <= end_x {
                                                ui.exit_menu_item_down = true;
                                            }
                                        }
                                        MouseEventKind::Up(MouseButton::Left) => {
                                            if ui.exit_menu_item_down {
                                                ui.exit_menu_item_down = false;
                                                if me.column >= start_x && me.column <= end_x {
                                                    exit_requested = true;
                                                }
                                            }
                                        }
                                        _ => {}
                                    }
                                } else {
                                    ui.exit_status_hovered = false;
                                }
                            }
                            if let Some(brect) = board_rect {
                                let inner = Rect::new(
                                    brect.x + 1,
                                    brect.y + 1,
                                    brect.width.saturating_sub(2),
                                    brect.height.saturating_sub(2),
                                );
                                let (gw, gh) = (game.w, game.h);
                                let cell_at = move |col: u16, row: u16| -> Option<(usize, usize)> {
                                    if !hit(inner, col, row) {
                                        return None;
                                    }
                                    let cx = ((col - inner.x) / 2) as usize;
                                    let cy = (row - inner.y) as usize;
                                    if cx < gw && cy < gh { Some((cx, cy)) } else { None }
                                };
                                match me.kind {
                                    MouseEventKind::Moved => {
                                        if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                            game.cursor = (cx, cy);
                                            ui.cursor_indicator = Some((cx, cy));
                                        }
                                    }
                                    MouseEventKind::Down(MouseButton::Left) => {
                                        if let Some(cell) = cell_at(me.column, me.row) {
                                            ui.left_press = Some(cell);
                                        }
                                    }
                                    MouseEventKind::Up(MouseButton::Left) => {
                                        if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                            if ui.left_press == Some((cx, cy))
                                                && game.state == GameState::InProgress
                                                && game.reveal(cx, cy) == GameState::Lost
                                            {
                                                ui.showing_loss = true;
                                            }
                                        }
                                        ui.left_press = None;
                                    }
                                    MouseEventKind::Down(MouseButton::Right) => {
                                        if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                            if game.state == GameState::InProgress {
                                                game.toggle_flag(cx, cy);
                                            }
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
            if exit_requested {
                break;
            }
        }

        // clear click feedback after short duration
        if let Some(t0) = ui.click_instant {
            if t0.elapsed() > Duration::from_millis(200) {
                ui.clicked_index = None;
                ui.click_instant = None;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    // Save current preferences before exiting
    save_config(cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Render the single CLOSE/OK button at the bottom of a modal and record
/// its rect for mouse hit-testing
fn render_modal_button(f: &mut ratatui::Frame<CrosstermBackend<io::Stdout>>, ui: &mut UiState, mrect: Rect, label: &str) {
    let btn_w = label.width() as u16 + 2;
    let bx = mrect.x + (mrect.width.saturating_sub(btn_w)) / 2;
    let by = mrect.y + mrect.height.saturating_sub(2);
    let btn_rect = Rect::new(bx, by, btn_w, 1);
    ui.modal_close_rect = Some(btn_rect);
    let mut btn_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
    if ui.modal_close_pressed {
        btn_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD);
    } else if ui.modal_close_hovered {
        btn_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD);
    }
    let btn = Paragraph::new(Spans::from(Span::styled(label.to_string(), btn_style)))
        .alignment(Alignment::Center)
        .block(Block::default());
    f.render_widget(btn, btn_rect);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn bottom_center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + r.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}
