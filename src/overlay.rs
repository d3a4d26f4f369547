//! Screen overlay: the instructions HUD, the artwork title panel, a free-form info box
//! and a sidebar for the tweak panel.
//!
//! Demos talk to the overlay through the [`Overlay`] trait only, so their logic can be
//! driven in tests by any recorder. [`OverlayState`] is the implementation the app
//! draws each frame.

use crate::assets::{Assets, FontId};
use crate::color::Color;
use crate::draw2d::Draw2d;

/// UI calls available to demo logic.
pub trait Overlay {
    /// Show or hide the instructions HUD.
    fn set_hud_visible(&mut self, visible: bool);
    /// Set the title panel text and show it.
    fn show_panel(&mut self, title: &str);
    fn hide_panel(&mut self);
    /// Replace the info box contents. `None` hides the box.
    fn set_info(&mut self, text: Option<String>);
    /// Replace the lines in the top-right corner.
    fn set_sidebar(&mut self, lines: Vec<String>);
}

/// Retained overlay contents, drawn with [`Draw2d`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayState {
    pub hud_visible: bool,
    /// Lines shown in the HUD box.
    pub hud_lines: Vec<String>,
    /// Title panel text while shown.
    pub panel: Option<String>,
    pub info: Option<String>,
    /// Extra lines drawn in the top-right corner, e.g. the tweak panel.
    pub sidebar: Vec<String>,
}

impl Overlay for OverlayState {
    fn set_hud_visible(&mut self, visible: bool) {
        self.hud_visible = visible;
    }

    fn show_panel(&mut self, title: &str) {
        self.panel = Some(title.to_string());
    }

    fn hide_panel(&mut self) {
        self.panel = None;
    }

    fn set_info(&mut self, text: Option<String>) {
        self.info = text;
    }

    fn set_sidebar(&mut self, lines: Vec<String>) {
        self.sidebar = lines;
    }
}

const MARGIN: f32 = 16.0;
const PADDING: f32 = 12.0;

impl OverlayState {
    /// A visible HUD with the given lines.
    pub fn with_hud<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hud_visible: true,
            hud_lines: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Queue the overlay into `draw`. Without a font only the panel backgrounds are drawn.
    pub fn draw(&self, draw: &mut Draw2d, assets: &Assets, font: Option<FontId>, width: f32, height: f32) {
        let atlas = font.and_then(|id| assets.font(id));
        let line_height = atlas.map_or(20.0, |f| f.line_height());
        let measure = |text: &str| atlas.map_or(text.len() as f32 * 8.0, |f| f.measure(text));

        let box_at = |x: f32, y: f32, lines: &[&str], draw: &mut Draw2d| {
            let w = lines.iter().map(|l| measure(l)).fold(0.0, f32::max) + 2.0 * PADDING;
            let h = lines.len() as f32 * line_height + 2.0 * PADDING;
            draw.rect(x, y, w, h, Color::PANEL_BG);
            draw.rect_outline(x, y, w, h, 1.0, Color::PANEL_BORDER);
            if let Some(id) = font {
                for (i, line) in lines.iter().enumerate() {
                    draw.text(assets, id, x + PADDING, y + PADDING + i as f32 * line_height, line, Color::WHITE);
                }
            }
        };

        if self.hud_visible && !self.hud_lines.is_empty() {
            let lines: Vec<&str> = self.hud_lines.iter().map(String::as_str).collect();
            box_at(MARGIN, MARGIN, &lines, draw);
        }

        if let Some(title) = &self.panel {
            let lines = [title.as_str(), "Backspace to step back"];
            let w = lines.iter().map(|l| measure(l)).fold(0.0, f32::max) + 2.0 * PADDING;
            let x = (width - w) * 0.5;
            let y = height - MARGIN - 2.0 * line_height - 2.0 * PADDING;
            box_at(x, y, &lines, draw);
        }

        if let Some(info) = &self.info {
            let lines: Vec<&str> = info.lines().collect();
            let y = height - MARGIN - lines.len() as f32 * line_height - 2.0 * PADDING;
            box_at(MARGIN, y, &lines, draw);
        }

        if !self.sidebar.is_empty() {
            let lines: Vec<&str> = self.sidebar.iter().map(String::as_str).collect();
            let w = lines.iter().map(|l| measure(l)).fold(0.0, f32::max) + 2.0 * PADDING;
            box_at(width - MARGIN - w, MARGIN, &lines, draw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_and_hud_calls_update_state() {
        let mut overlay = OverlayState::with_hud(["Click to enter"]);
        assert!(overlay.hud_visible);

        overlay.set_hud_visible(false);
        overlay.show_panel("Artwork 3");
        assert!(!overlay.hud_visible);
        assert_eq!(overlay.panel.as_deref(), Some("Artwork 3"));

        overlay.hide_panel();
        assert_eq!(overlay.panel, None);
    }

    #[test]
    fn info_box_can_be_cleared() {
        let mut overlay = OverlayState::default();
        overlay.set_info(Some("No object selected".into()));
        assert_eq!(overlay.info.as_deref(), Some("No object selected"));
        overlay.set_info(None);
        assert!(overlay.info.is_none());
    }
}
