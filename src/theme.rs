use ratatui::style::Color;

// Color palette structure
#[derive(Clone, Copy, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
}

// Oceanic Next theme
pub const OCEANIC_NEXT: Base16Palette = Base16Palette {
    base_00: Color::Rgb(0x1B, 0x2B, 0x34),
    base_01: Color::Rgb(0x34, 0x3D, 0x46),
    base_02: Color::Rgb(0x4F, 0x5B, 0x66),
    base_03: Color::Rgb(0x65, 0x73, 0x7E),
    base_04: Color::Rgb(0xA7, 0xAD, 0xBA),
    base_05: Color::Rgb(0xC0, 0xC5, 0xCE),
    base_07: Color::Rgb(0xF0, 0xF4, 0xF8),
    base_08: Color::Rgb(0xEC, 0x5F, 0x67),
    base_0a: Color::Rgb(0xFA, 0xC8, 0x63),
    base_0b: Color::Rgb(0x99, 0xC7, 0x94),
    base_0c: Color::Rgb(0x5F, 0xB3, 0xB3),
    base_0d: Color::Rgb(0x66, 0x99, 0xCC),
};

impl Base16Palette {
    /// (text, border) for a panel, dimmed when it does not have focus
    pub fn panel_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_07, self.base_04)
        } else {
            (self.base_03, self.base_03)
        }
    }

    /// (background, foreground) of the highlighted item
    pub fn selection_colors(&self) -> (Color, Color) {
        (self.base_02, self.base_07)
    }
}
