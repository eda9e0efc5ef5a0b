use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Resolve a color for the current terminal: exact RGB under TrueColor,
/// a stable 16-255 index under 256-color support, a basic ANSI variant
/// otherwise.
fn resolve(rgb: (u8, u8, u8), index256: u8, basic: Color) -> Color {
    let support = ColorSupport::stdout();
    if support.has_16m {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else if support.has_256 {
        Color::Indexed(index256)
    } else {
        basic
    }
}

/// Foreground color for a revealed adjacency count (1-8), following the
/// classic desktop palette (blue 1, green 2, red 3, navy 4, maroon 5,
/// teal 6, black 7, gray 8).
pub fn number_color(adj: u8) -> Color {
    match adj {
        1 => resolve((1, 0, 254), 21, Color::Blue),
        2 => resolve((1, 127, 1), 28, Color::Green),
        3 => resolve((254, 0, 0), 196, Color::Red),
        4 => resolve((1, 0, 128), 18, Color::Blue),
        5 => resolve((129, 1, 2), 88, Color::Red),
        6 => resolve((0, 128, 129), 30, Color::Cyan),
        7 => resolve((0, 0, 0), 232, Color::Black),
        _ => resolve((128, 128, 128), 244, Color::DarkGray),
    }
}

/// A trait to extend Ratatui's Color with cross-platform consistency methods.
pub trait TermAdapt {
    /// Adjusts a named ANSI color to match the Windows Terminal (Campbell)
    /// visual style based on the terminal's color capabilities.
    fn adapt(self) -> Color;
}

impl TermAdapt for Color {
    fn adapt(self) -> Color {
        // Campbell RGB samples with matching 256-color indices, for the
        // named colors the UI chrome actually uses
        match self {
            Color::Black => resolve((12, 12, 12), 232, self),
            Color::Red => resolve((197, 15, 31), 160, self),
            Color::Green => resolve((19, 161, 14), 28, self),
            Color::Yellow => resolve((193, 156, 0), 178, self),
            Color::Gray => resolve((204, 204, 204), 250, self),
            Color::DarkGray => resolve((118, 118, 118), 243, self),
            Color::LightRed => resolve((231, 72, 86), 203, self),
            Color::LightBlue => resolve((59, 120, 255), 63, self),
            Color::White => resolve((242, 242, 242), 255, self),
            // Custom RGB or Indexed colors are returned as-is
            _ => self,
        }
    }
}
