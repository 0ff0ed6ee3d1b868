use rand::prelude::SliceRandom;
use rand::Rng;

use super::particles::{
    hue_to_rgb, random_bright_color, EffectType, Particle, CONFETTI_CHARS, GRAVITY,
};

const WIN_MESSAGES: [&str; 10] = [
    "¡MENSAJE DESCIFRADO!",
    "¡EXCELENTE!",
    "¡BRILLANTE!",
    "¡PERFECTO!",
    "¡INCREÍBLE!",
    "¡ENHORABUENA!",
    "¡MUY BIEN!",
    "¡CÓDIGO ROTO!",
    "¡ERES UN ESPÍA!",
    "¡FANTÁSTICO!",
];

const BANNER: &str = r#"
 ____  _____ ____  _   _ _____ _   _____ ___
|  _ \| ____/ ___|| | | | ____| | |_   _/ _ \
| |_) |  _| \___ \| | | |  _| | |   | || | | |
|  _ <| |___ ___) | |_| | |___| |___| || |_| |
|_| \_\_____|____/ \___/|_____|_____|_| \___/
"#;

/// Frames between effect changes
const EFFECT_PERIOD: u32 = 300;

/// Confetti shown after a puzzle is solved
pub struct WinScreen {
    particles: Vec<Particle>,
    effect_type: EffectType,
    tokens: Vec<String>,
    frame_count: u32,
    message_index: usize,
    burst_cooldown: u32,
    pub width: u16,
    pub height: u16,
}

impl WinScreen {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            effect_type: EffectType::Confetti,
            tokens: Vec::new(),
            frame_count: 0,
            message_index: 0,
            burst_cooldown: 0,
            width: 80,
            height: 24,
        }
    }

    /// Start a fresh celebration. `tokens` feed the token rain effect.
    pub fn reset(&mut self, tokens: Vec<String>) {
        let mut rng = rand::thread_rng();
        self.particles.clear();
        self.tokens = tokens;
        self.frame_count = 0;
        self.burst_cooldown = 0;
        self.effect_type = EffectType::random();
        self.message_index = rng.gen_range(0..WIN_MESSAGES.len());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn update(&mut self) {
        self.frame_count += 1;

        if self.frame_count % EFFECT_PERIOD == 0 {
            self.effect_type = EffectType::random();
            self.message_index = rand::thread_rng().gen_range(0..WIN_MESSAGES.len());
        }

        let floor = self.height as f32 + 5.0;
        self.particles.retain_mut(|p| p.step(GRAVITY, floor));

        match self.effect_type {
            EffectType::Confetti => self.spawn_confetti(),
            EffectType::TokenRain => self.spawn_token_rain(),
            EffectType::Fireworks => self.spawn_fireworks(),
        }
    }

    fn spawn_confetti(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: -2.0,
                vx: rng.gen_range(-0.5..0.5),
                vy: rng.gen_range(0.3..1.0),
                glyph: CONFETTI_CHARS.choose(&mut rng).copied().unwrap_or('*'),
                color: random_bright_color(),
                lifetime: rng.gen_range(3.0..6.0),
            });
        }
    }

    /// Single-character tokens fall as they are; longer ones fall as confetti
    fn spawn_token_rain(&mut self) {
        let mut rng = rand::thread_rng();
        let hue = self.frame_count as f32 * 0.01;
        for _ in 0..2 {
            let glyph = self
                .tokens
                .choose(&mut rng)
                .and_then(|t| {
                    let mut chars = t.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => None,
                    }
                })
                .unwrap_or('✦');
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: -1.0,
                vx: 0.0,
                vy: rng.gen_range(0.2..0.6),
                glyph,
                color: hue_to_rgb(hue + rng.gen_range(0.0..0.3)),
                lifetime: rng.gen_range(4.0..7.0),
            });
        }
    }

    fn spawn_fireworks(&mut self) {
        if self.burst_cooldown > 0 {
            self.burst_cooldown -= 1;
            return;
        }

        let mut rng = rand::thread_rng();
        if self.width < 20 || self.height < 6 || !rng.gen_bool(0.08) {
            return;
        }
        let x = rng.gen_range(10.0..(self.width as f32 - 10.0));
        let y = rng.gen_range(3.0..(self.height as f32 / 2.0));
        let color = random_bright_color();
        for _ in 0..25 {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(0.5..2.0);
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                glyph: '●',
                color,
                lifetime: rng.gen_range(1.0..2.5),
            });
        }
        self.burst_cooldown = 15;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn current_message(&self) -> &str {
        WIN_MESSAGES[self.message_index]
    }

    pub fn banner(&self) -> &str {
        BANNER
    }

    /// Cycling hue for the banner
    pub fn banner_hue(&self) -> f32 {
        (self.frame_count as f32 * 0.02) % 1.0
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}

impl Default for WinScreen {
    fn default() -> Self {
        Self::new()
    }
}
