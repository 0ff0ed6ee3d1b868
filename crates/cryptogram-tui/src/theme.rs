use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Panel and box border color
    pub border: Color,
    /// Cipher token color
    pub token: Color,
    /// Guess color while unverified
    pub guess: Color,
    /// Guess that matches its cell
    pub correct: Color,
    /// Empty input box color
    pub empty: Color,
    /// Selected cell background
    pub selected_bg: Color,
    /// Cells sharing the selected token
    pub highlight_bg: Color,
    /// Tilde marker over accented cells
    pub accent: Color,
    /// Success/complete color
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            token: Color::Rgb { r: 170, g: 160, b: 255 },
            guess: Color::Rgb { r: 230, g: 230, b: 240 },
            correct: Color::Rgb { r: 90, g: 220, b: 140 },
            empty: Color::Rgb { r: 110, g: 115, b: 135 },
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            highlight_bg: Color::Rgb { r: 35, g: 40, b: 55 },
            accent: Color::Rgb { r: 120, g: 140, b: 255 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            token: Color::Rgb { r: 49, g: 46, b: 129 },
            guess: Color::Rgb { r: 30, g: 41, b: 59 },
            correct: Color::Rgb { r: 5, g: 150, b: 105 },
            empty: Color::Rgb { r: 148, g: 163, b: 184 },
            selected_bg: Color::Rgb { r: 199, g: 210, b: 254 },
            highlight_bg: Color::Rgb { r: 230, g: 232, b: 242 },
            accent: Color::Rgb { r: 99, g: 102, b: 241 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            border: Color::Grey,
            token: Color::Yellow,
            guess: Color::White,
            correct: Color::Green,
            empty: Color::Grey,
            selected_bg: Color::Blue,
            highlight_bg: Color::Rgb { r: 30, g: 30, b: 30 },
            accent: Color::Cyan,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }

    /// Theme by name, as given on the command line
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "contrast" | "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }
}
