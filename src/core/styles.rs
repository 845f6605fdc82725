//! Terminal style roles
//!
//! Each logical role maps to an optional `colored::Color`. Coloring only happens
//! when the caller passes `enabled = true`, so there is no global color state.
//!
//! ```
//! use peerplug::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Plugins", false), "Plugins");
//! assert!(StyleRole::Header.paint("Plugins", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn paint(self, text: &str, enabled: bool) -> String {
                if !enabled {
                    return text.to_string();
                }
                match self.color().map(ansi_code) {
                    Some(code) => format!("\x1b[{}m{}\x1b[0m", code, text),
                    None => text.to_string(),
                }
            }

            /// Foreground spec for a prettytable cell, e.g. `Fy`
            pub fn table_spec(self) -> Option<&'static str> {
                Some(match self.color()? {
                    Color::Red => "Fr",
                    Color::Green => "Fg",
                    Color::Yellow => "Fy",
                    Color::Blue => "Fb",
                    Color::Cyan => "Fc",
                    Color::BrightBlack => "FK",
                    Color::BrightRed => "FR",
                    Color::BrightGreen => "FG",
                    _ => return None,
                })
            }
        }
    }
}

style! {
    Header  => Some(Color::Yellow),
    Key     => Some(Color::BrightGreen),
    Value   => None,
    Active  => Some(Color::Green),
    Pending => Some(Color::Cyan),
    Failed  => Some(Color::Red),
    Error   => Some(Color::BrightRed),
    Dim     => Some(Color::BrightBlack),
}

fn ansi_code(color: Color) -> String {
    use Color::*;
    match color {
        Black => "30".to_string(),
        Red => "31".to_string(),
        Green => "32".to_string(),
        Yellow => "33".to_string(),
        Blue => "34".to_string(),
        Magenta => "35".to_string(),
        Cyan => "36".to_string(),
        White => "37".to_string(),
        BrightBlack => "90".to_string(),
        BrightRed => "91".to_string(),
        BrightGreen => "92".to_string(),
        BrightYellow => "93".to_string(),
        BrightBlue => "94".to_string(),
        BrightMagenta => "95".to_string(),
        BrightCyan => "96".to_string(),
        BrightWhite => "97".to_string(),
        TrueColor { r, g, b } => format!("38;2;{};{};{}", r, g, b),
    }
}

fn clap_color(color: Color) -> Option<AnsiColor> {
    use AnsiColor as A;
    use Color::*;
    Some(match color {
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Cyan => A::Cyan,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn clap_styles(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(color) = role.color().and_then(clap_color) {
            s = s.fg_color(Some(ClapColor::Ansi(color)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Key, false))
        .placeholder(style(StyleRole::Pending, false))
        .error(style(StyleRole::Error, true))
        .invalid(style(StyleRole::Failed, false))
        .valid(style(StyleRole::Active, false))
}
