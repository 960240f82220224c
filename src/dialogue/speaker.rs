//! Speaker labels and their display attributes

use std::fmt;

/// Who a rendered message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    User,
    Assistant,
    /// Failure reports from the turn controller
    System,
}

/// How a speaker label is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyle {
    pub label: &'static str,
    pub color: Rgb,
    pub bold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Speaker {
    pub const ALL: [Speaker; 3] = [Speaker::User, Speaker::Assistant, Speaker::System];

    pub const fn style(self) -> DisplayStyle {
        match self {
            Speaker::User => DisplayStyle {
                label: "You",
                color: Rgb(0x2c, 0x3e, 0x50),
                bold: true,
            },
            Speaker::Assistant => DisplayStyle {
                label: "AI",
                color: Rgb(0x29, 0x80, 0xb9),
                bold: true,
            },
            Speaker::System => DisplayStyle {
                label: "System",
                color: Rgb(0xe7, 0x4c, 0x3c),
                bold: true,
            },
        }
    }

    pub const fn label(self) -> &'static str {
        self.style().label
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
