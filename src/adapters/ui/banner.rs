//! Welcome banner: "MEETINGS" in figlet letters with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Indigo (#667eea), the default meeting colour.
const INDIGO: (u8, u8, u8) = (0x66, 0x7e, 0xea);
/// Violet (#764ba2).
const VIOLET: (u8, u8, u8) = (0x76, 0x4b, 0xa2);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Figlet rendering of `text` in the standard font, or the plain text if
/// the font cannot render it.
fn render(text: &str) -> String {
    match FIGfont::standard() {
        Ok(font) => font
            .convert(text)
            .map(|figure| figure.to_string())
            .unwrap_or_else(|| format!("{}\n", text)),
        Err(_) => format!("{}\n", text),
    }
}

/// Prints the banner with a gradient from indigo to violet, then the version.
pub fn print_welcome() {
    let mut out = stdout();
    let art = render("MEETINGS");
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(INDIGO, VIOLET, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: INDIGO.0,
        g: INDIGO.1,
        b: INDIGO.2,
    }));
    let _ = out.execute(Print(format!(
        "meeting-notes v{}\r\n",
        env!("CARGO_PKG_VERSION")
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(lerp_rgb(INDIGO, VIOLET, 0.0), INDIGO);
        assert_eq!(lerp_rgb(INDIGO, VIOLET, 1.0), VIOLET);
    }

    #[test]
    fn test_render_is_multiline() {
        assert!(render("MEETINGS").lines().count() > 1);
    }
}
