use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 220, b: 140 };
pub const ACCENT: Color = Color::TrueColor { r: 200, g: 160, b: 255 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 180, b: 255 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 80, g: 200, b: 200 };

pub const UNDEAD: Color = Color::BrightGreen;
pub const DEAD: Color = Color::BrightRed;
pub const UNKNOWN: Color = Color::Yellow;
