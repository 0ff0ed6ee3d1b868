use crossterm::style::Color;
use rand::Rng;

/// Downward acceleration per frame
pub const GRAVITY: f32 = 0.12;

/// Lifetime lost per frame
const DECAY: f32 = 0.016;

/// A falling glyph on the win screen
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub glyph: char,
    pub color: Color,
    pub lifetime: f32,
}

impl Particle {
    /// Advance one frame. Returns false once the particle is spent.
    pub fn step(&mut self, gravity: f32, floor: f32) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.lifetime -= DECAY;
        self.lifetime > 0.0 && self.y < floor
    }

    pub fn is_visible(&self, width: u16, height: u16) -> bool {
        self.x >= 0.0
            && self.x < width as f32
            && self.y >= 0.0
            && self.y < height as f32
            && self.lifetime > 0.0
    }
}

/// How the win screen spawns particles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectType {
    /// Glyphs drifting down from the top edge
    Confetti,
    /// Cipher tokens of the solved puzzle raining down
    TokenRain,
    /// Radial bursts
    Fireworks,
}

impl EffectType {
    pub fn random() -> Self {
        match rand::thread_rng().gen_range(0..3) {
            0 => EffectType::Confetti,
            1 => EffectType::TokenRain,
            _ => EffectType::Fireworks,
        }
    }
}

/// Random saturated terminal color
pub fn random_bright_color() -> Color {
    match rand::thread_rng().gen_range(0..6) {
        0 => Color::Red,
        1 => Color::Green,
        2 => Color::Yellow,
        3 => Color::Blue,
        4 => Color::Magenta,
        _ => Color::Cyan,
    }
}

/// Convert hue (0.0-1.0) to RGB color
pub fn hue_to_rgb(hue: f32) -> Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = ((1.0 - (h % 2.0 - 1.0).abs()) * 255.0) as u8;

    let (r, g, b) = match h as i32 % 6 {
        0 => (255, x, 0),
        1 => (x, 255, 0),
        2 => (0, 255, x),
        3 => (0, x, 255),
        4 => (x, 0, 255),
        _ => (255, 0, x),
    };

    Color::Rgb { r, g, b }
}

/// Confetti glyphs
pub const CONFETTI_CHARS: &[char] = &['*', '✦', '✧', '◆', '◇', '○', '●', '■', '□', '▲', '▽'];

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(y: f32, lifetime: f32) -> Particle {
        Particle {
            x: 1.0,
            y,
            vx: 0.0,
            vy: 0.0,
            glyph: '*',
            color: Color::White,
            lifetime,
        }
    }

    #[test]
    fn test_step_applies_gravity() {
        let mut p = particle(0.0, 1.0);
        assert!(p.step(GRAVITY, 100.0));
        assert!(p.step(GRAVITY, 100.0));
        assert!(p.y > 0.0);
        assert!(p.vy > GRAVITY);
    }

    #[test]
    fn test_step_expires() {
        let mut p = particle(0.0, 0.01);
        assert!(!p.step(0.0, 100.0));
        let mut low = particle(99.5, 5.0);
        low.vy = 1.0;
        assert!(!low.step(0.0, 100.0));
    }

    #[test]
    fn test_visibility_bounds() {
        assert!(particle(2.0, 1.0).is_visible(10, 5));
        assert!(!particle(5.0, 1.0).is_visible(10, 5));
        assert!(!particle(-1.0, 1.0).is_visible(10, 5));
    }

    #[test]
    fn test_hue_to_rgb_primaries() {
        assert_eq!(hue_to_rgb(0.0), Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(hue_to_rgb(0.5), Color::Rgb { r: 0, g: 255, b: 255 });
        assert_eq!(hue_to_rgb(1.0), hue_to_rgb(0.0));
    }
}
