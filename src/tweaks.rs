//! Keyboard-driven slider panel for live parameter tweaking.
//!
//! Up/Down pick a slider, Left/Right nudge it by one step (ten with Shift held) and
//! `H` hides or shows the panel. Values are clamped to each slider's range and
//! snapped to its step.

use winit::keyboard::KeyCode;

use crate::input::Input;

#[derive(Clone, Debug, PartialEq)]
pub struct Tweak {
    pub name: String,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Tweak {
    fn set(&mut self, value: f32) {
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        self.value = snapped.clamp(self.min, self.max);
    }
}

/// Handle returned by [`TweakPanel::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TweakId(usize);

#[derive(Clone, Debug, Default)]
pub struct TweakPanel {
    tweaks: Vec<Tweak>,
    selected: usize,
    hidden: bool,
}

impl TweakPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: f32, min: f32, max: f32, step: f32) -> TweakId {
        let mut tweak = Tweak {
            name: name.into(),
            value,
            min,
            max,
            step,
        };
        tweak.set(value);
        self.tweaks.push(tweak);
        TweakId(self.tweaks.len() - 1)
    }

    pub fn value(&self, id: TweakId) -> f32 {
        self.tweaks.get(id.0).map_or(0.0, |t| t.value)
    }

    pub fn set(&mut self, id: TweakId, value: f32) {
        if let Some(tweak) = self.tweaks.get_mut(id.0) {
            tweak.set(value);
        }
    }

    pub fn selected(&self) -> Option<TweakId> {
        (!self.tweaks.is_empty()).then_some(TweakId(self.selected))
    }

    pub fn select_next(&mut self) {
        if !self.tweaks.is_empty() {
            self.selected = (self.selected + 1) % self.tweaks.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.tweaks.is_empty() {
            self.selected = (self.selected + self.tweaks.len() - 1) % self.tweaks.len();
        }
    }

    /// Moves the selected slider by `steps` steps. Returns the slider if its value changed.
    pub fn nudge(&mut self, steps: f32) -> Option<TweakId> {
        let tweak = self.tweaks.get_mut(self.selected)?;
        let before = tweak.value;
        tweak.set(before + steps * tweak.step);
        (tweak.value != before).then_some(TweakId(self.selected))
    }

    /// Applies this frame's key presses. Returns the slider whose value changed, if any.
    pub fn handle_input(&mut self, input: &Input) -> Option<TweakId> {
        if input.key_pressed(KeyCode::KeyH) {
            self.hidden = !self.hidden;
        }
        if self.hidden {
            return None;
        }
        if input.key_pressed(KeyCode::ArrowDown) {
            self.select_next();
        }
        if input.key_pressed(KeyCode::ArrowUp) {
            self.select_previous();
        }
        let scale = if input.key_down(KeyCode::ShiftLeft) || input.key_down(KeyCode::ShiftRight) {
            10.0
        } else {
            1.0
        };
        let mut changed = None;
        if input.key_pressed(KeyCode::ArrowRight) {
            changed = self.nudge(scale).or(changed);
        }
        if input.key_pressed(KeyCode::ArrowLeft) {
            changed = self.nudge(-scale).or(changed);
        }
        changed
    }

    /// Panel text, one line per slider, with the selection marked.
    pub fn lines(&self) -> Vec<String> {
        if self.hidden || self.tweaks.is_empty() {
            return Vec::new();
        }
        let decimals = |step: f32| if step >= 1.0 { 0 } else if step >= 0.1 { 1 } else { 2 };
        let mut lines: Vec<String> = self
            .tweaks
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                format!("{marker} {}  {:.*}", t.name, decimals(t.step), t.value)
            })
            .collect();
        lines.push("Up/Down select, Left/Right adjust, H hide".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_snap_and_clamp() {
        let mut panel = TweakPanel::new();
        let ambient = panel.add("Ambient Light", 0.6, 0.0, 2.0, 0.01);
        panel.set(ambient, 5.0);
        assert_eq!(panel.value(ambient), 2.0);
        panel.set(ambient, -1.0);
        assert_eq!(panel.value(ambient), 0.0);
    }

    #[test]
    fn nudge_moves_selected_only() {
        let mut panel = TweakPanel::new();
        let a = panel.add("a", 1.0, 0.0, 2.0, 0.5);
        let b = panel.add("b", 1.0, 0.0, 2.0, 0.5);
        assert_eq!(panel.nudge(1.0), Some(a));
        panel.select_next();
        assert_eq!(panel.nudge(-1.0), Some(b));
        assert_eq!(panel.value(a), 1.5);
        assert_eq!(panel.value(b), 0.5);
        panel.select_next();
        assert_eq!(panel.selected(), Some(a));
    }

    #[test]
    fn nudge_at_limit_reports_no_change() {
        let mut panel = TweakPanel::new();
        panel.add("roughness", 1.0, 0.0, 1.0, 0.01);
        assert_eq!(panel.nudge(1.0), None);
    }

    #[test]
    fn keys_drive_the_panel() {
        let mut panel = TweakPanel::new();
        let sun = panel.add("Sun Intensity", 1.4, 0.0, 3.0, 0.1);
        let mut input = Input::new();
        input.set_key(KeyCode::ShiftLeft, true);
        input.set_key(KeyCode::ArrowRight, true);
        assert_eq!(panel.handle_input(&input), Some(sun));
        assert!((panel.value(sun) - 2.4).abs() < 1e-5);

        input.begin_frame();
        input.set_key(KeyCode::KeyH, true);
        panel.handle_input(&input);
        assert!(panel.lines().is_empty());
    }
}
