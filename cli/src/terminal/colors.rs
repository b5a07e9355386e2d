use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const SAVED: Color = Color::Green;
pub const NO_RESULT: Color = Color::Yellow;
pub const FAILED: Color = Color::Red;
