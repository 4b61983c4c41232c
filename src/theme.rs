use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub skeleton: Color,
  pub badge_fg: Color,
  pub badge_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: &[Theme] = &[
  Theme {
    name: "Ember",
    bg: Color::Rgb(24, 24, 24),
    fg: Color::Rgb(241, 241, 241),
    accent: Color::Rgb(255, 64, 64),
    muted: Color::Rgb(150, 150, 150),
    border: Color::Rgb(70, 70, 70),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(63, 63, 63),
    stripe_bg: Color::Rgb(30, 30, 30),
    skeleton: Color::Rgb(52, 52, 52),
    badge_fg: Color::Rgb(255, 255, 255),
    badge_bg: Color::Rgb(204, 0, 0),
    status: Color::Rgb(255, 196, 87),
    error: Color::Rgb(255, 99, 99),
    key_fg: Color::Rgb(24, 24, 24),
    key_bg: Color::Rgb(170, 170, 170),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(249, 249, 249),
    fg: Color::Rgb(15, 15, 15),
    accent: Color::Rgb(204, 0, 0),
    muted: Color::Rgb(96, 96, 96),
    border: Color::Rgb(204, 204, 204),
    highlight_fg: Color::Rgb(15, 15, 15),
    highlight_bg: Color::Rgb(229, 229, 229),
    stripe_bg: Color::Rgb(242, 242, 242),
    skeleton: Color::Rgb(224, 224, 224),
    badge_fg: Color::Rgb(255, 255, 255),
    badge_bg: Color::Rgb(204, 0, 0),
    status: Color::Rgb(6, 95, 212),
    error: Color::Rgb(196, 43, 28),
    key_fg: Color::Rgb(249, 249, 249),
    key_bg: Color::Rgb(96, 96, 96),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Red,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::White,
    stripe_bg: Color::Reset,
    skeleton: Color::DarkGray,
    badge_fg: Color::White,
    badge_bg: Color::Red,
    status: Color::Yellow,
    error: Color::LightRed,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme with the given name, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}
