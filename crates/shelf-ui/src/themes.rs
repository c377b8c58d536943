use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  Anything else is
/// `Unknown`.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .map_or(BackgroundType::Unknown, parse_colorfgbg)
}

fn parse_colorfgbg(value: &str) -> BackgroundType {
    match value.split(';').next_back().map(str::parse::<u8>) {
        Some(Ok(bg)) if bg <= 6 => BackgroundType::Dark,
        Some(Ok(bg)) if bg <= 15 => BackgroundType::Light,
        _ => BackgroundType::Unknown,
    }
}

/// Complete theme definition carrying every style the dashboard uses.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Panels ───────────────────────────────────────────────────────────────
    pub border: Style,
    /// Border of the panel holding keyboard focus.
    pub border_focused: Style,
    pub panel_title: Style,

    // ── Filter bar ───────────────────────────────────────────────────────────
    pub selector_focused: Style,
    pub selector: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    /// Fill of single-series bars.
    pub bar: Style,
    /// Unfilled remainder of a bar track.
    pub bar_empty: Style,
    pub line: Style,
    pub marker: Style,
    pub axis: Style,
    /// Categorical colours, indexed by genre position.
    pub palette: Vec<Color>,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            panel_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            selector_focused: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            selector: Style::default().fg(Color::White),

            bar: Style::default().fg(Color::Cyan),
            bar_empty: Style::default().fg(Color::DarkGray),
            line: Style::default().fg(Color::Cyan),
            marker: Style::default().fg(Color::Yellow),
            axis: Style::default().fg(Color::Gray),
            palette: vec![
                Color::Cyan,
                Color::Magenta,
                Color::Yellow,
                Color::Green,
                Color::LightBlue,
                Color::LightRed,
                Color::LightCyan,
                Color::LightMagenta,
                Color::LightYellow,
                Color::LightGreen,
            ],
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text and saturated accents so that content
    /// remains legible against a white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::Gray),
            border_focused: Style::default().fg(Color::Blue),
            panel_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            selector_focused: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            selector: Style::default().fg(Color::Black),

            bar: Style::default().fg(Color::Blue),
            bar_empty: Style::default().fg(Color::Gray),
            line: Style::default().fg(Color::Blue),
            marker: Style::default().fg(Color::Magenta),
            axis: Style::default().fg(Color::DarkGray),
            palette: vec![
                Color::Blue,
                Color::Magenta,
                Color::Red,
                Color::Green,
                Color::Cyan,
                Color::Yellow,
                Color::DarkGray,
                Color::LightBlue,
                Color::LightMagenta,
                Color::LightRed,
            ],
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// Avoids bold modifiers to maximise compatibility with minimal terminal
    /// emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::White),
            panel_title: Style::default().fg(Color::Cyan),

            selector_focused: Style::default().fg(Color::Black).bg(Color::White),
            selector: Style::default().fg(Color::White),

            bar: Style::default().fg(Color::Green),
            bar_empty: Style::default().fg(Color::DarkGray),
            line: Style::default().fg(Color::Green),
            marker: Style::default().fg(Color::White),
            axis: Style::default().fg(Color::Gray),
            palette: vec![
                Color::Red,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::Magenta,
                Color::Cyan,
            ],
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour for the series at `index`, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return Color::Reset;
        }
        self.palette[index % self.palette.len()]
    }

    pub fn series_style(&self, index: usize) -> Style {
        Style::default().fg(self.series_color(index))
    }

    /// Border style for a panel, highlighted when it has focus.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
