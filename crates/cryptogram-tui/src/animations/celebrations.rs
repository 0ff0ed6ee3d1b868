use crossterm::style::Color;
use std::collections::HashSet;

/// Frames a group keeps flashing (~3 seconds at 30 FPS)
const DURATION_FRAMES: u32 = 90;

/// Frames the banner message stays up
const MESSAGE_FRAMES: u32 = 60;

/// A token group that was just solved
#[derive(Debug, Clone)]
pub struct Celebration {
    pub token: String,
    pub start_frame: u32,
}

impl Celebration {
    pub fn is_active(&self, frame: u32) -> bool {
        frame < self.start_frame + DURATION_FRAMES
    }

    /// Flash strength between 0.0 and 1.0
    pub fn intensity(&self, frame: u32) -> f32 {
        let elapsed = frame.saturating_sub(self.start_frame);
        if elapsed < 8 {
            return 1.0;
        }
        let progress = elapsed as f32 / DURATION_FRAMES as f32;
        let amplitude = if progress > 0.6 {
            1.0 - (progress - 0.6) / 0.4
        } else {
            1.0
        };
        let pulse = (elapsed as f32 * 0.5).sin() * 0.5 + 0.5;
        ((0.4 + pulse * 0.6) * amplitude).clamp(0.0, 1.0)
    }
}

/// Flashes token groups as they become solved
#[derive(Debug, Default)]
pub struct GroupCelebrations {
    celebrations: Vec<Celebration>,
    frame_count: u32,
    solved: HashSet<String>,
}

impl GroupCelebrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the currently solved tokens. Groups that were not solved on
    /// the previous frame start flashing.
    pub fn update(&mut self, solved_now: &[&str]) {
        self.frame_count += 1;

        for token in solved_now {
            if !self.solved.contains(*token) {
                self.celebrations.push(Celebration {
                    token: token.to_string(),
                    start_frame: self.frame_count,
                });
            }
        }
        self.solved = solved_now.iter().map(|t| t.to_string()).collect();

        let frame = self.frame_count;
        self.celebrations.retain(|c| c.is_active(frame));
    }

    /// Forget everything, marking `solved` as already seen
    pub fn reset(&mut self, solved: &[&str]) {
        self.celebrations.clear();
        self.frame_count = 0;
        self.solved = solved.iter().map(|t| t.to_string()).collect();
    }

    /// Flash strength for `token`, 0.0 when it is not celebrating
    pub fn token_intensity(&self, token: &str) -> f32 {
        self.celebrations
            .iter()
            .rev()
            .find(|c| c.token == token)
            .map_or(0.0, |c| c.intensity(self.frame_count))
    }

    pub fn has_active(&self) -> bool {
        !self.celebrations.is_empty()
    }

    /// Short message for the latest solved group
    pub fn message(&self) -> Option<&'static str> {
        let recent = self.celebrations.last()?;
        if self.frame_count - recent.start_frame > MESSAGE_FRAMES {
            return None;
        }
        const MESSAGES: [&str; 3] = ["¡Letra descubierta!", "¡Bien hecho!", "¡Sigue así!"];
        Some(MESSAGES[recent.start_frame as usize % MESSAGES.len()])
    }

    /// Blend `base` toward gold by `intensity`
    pub fn throb_color(base: Color, intensity: f32) -> Color {
        if intensity <= 0.0 {
            return base;
        }
        let (tr, tg, tb) = (255.0, 215.0, 0.0);
        match base {
            Color::Rgb { r, g, b } => {
                let blend = (intensity * 0.85).min(0.95);
                Color::Rgb {
                    r: (r as f32 + (tr - r as f32) * blend) as u8,
                    g: (g as f32 + (tg - g as f32) * blend) as u8,
                    b: (b as f32 + (tb - b as f32) * blend) as u8,
                }
            }
            _ if intensity > 0.3 => Color::Rgb {
                r: tr as u8,
                g: tg as u8,
                b: tb as u8,
            },
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_starts_flashing() {
        let mut c = GroupCelebrations::new();
        c.update(&[]);
        assert!(!c.has_active());
        c.update(&["★"]);
        assert!(c.has_active());
        assert_eq!(c.token_intensity("★"), 1.0);
        assert_eq!(c.token_intensity("◆"), 0.0);
        assert!(c.message().is_some());
    }

    #[test]
    fn test_already_solved_group_does_not_flash_again() {
        let mut c = GroupCelebrations::new();
        c.update(&["★"]);
        for _ in 0..DURATION_FRAMES {
            c.update(&["★"]);
        }
        assert!(!c.has_active());
        assert!(c.message().is_none());
    }

    #[test]
    fn test_reset_seeds_known_groups() {
        let mut c = GroupCelebrations::new();
        c.reset(&["A1"]);
        c.update(&["A1"]);
        assert!(!c.has_active());
        c.update(&["A1", "B2"]);
        assert!(c.token_intensity("B2") > 0.0);
    }

    #[test]
    fn test_throb_color_blends() {
        let base = Color::Rgb { r: 0, g: 0, b: 0 };
        assert_eq!(GroupCelebrations::throb_color(base, 0.0), base);
        assert_ne!(GroupCelebrations::throb_color(base, 1.0), base);
        assert_eq!(GroupCelebrations::throb_color(Color::White, 0.1), Color::White);
    }
}
