use crate::constants::*;
use crate::types::{Rect, Size};
use crate::rendering::GameGrid;
use rand::Rng;

/// Per-frame context handed to every entity update.
#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    pub now_ms: u64,
    pub bounds: Size,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityStatus {
    Alive,
    /// Left the playfield; the owner removes it after the update pass.
    Exited,
}

/// Shared capability of everything the world updates and draws.
pub trait Entity {
    fn update(&mut self, _ctx: &TickContext) -> EntityStatus {
        EntityStatus::Alive
    }

    fn draw(&self, grid: &mut GameGrid);
}

// --- Spaceship ---
#[derive(Debug, Clone)]
pub struct Spaceship {
    pub rect: Rect,
    pub speed: i32,
    pub speed_h: i32,
    pub speed_v: i32,
    pub jump_cooldown_ms: u64,
    pub next_jump_ms: u64,
    /// Display only: picks the glyph, never gates gameplay.
    pub jump_ready: bool,
}

impl Spaceship {
    pub fn new(bounds: Size, now_ms: u64) -> Self {
        let mut ship = Spaceship {
            rect: Rect::new(0, 0, SHIP_WIDTH, SHIP_HEIGHT),
            speed: SHIP_SPEED,
            speed_h: 0,
            speed_v: 0,
            jump_cooldown_ms: JUMP_COOLDOWN_MS,
            next_jump_ms: now_ms,
            jump_ready: true,
        };
        ship.reset_position(bounds);
        ship
    }

    /// Bottom-centre of the playfield.
    pub fn start_rect(bounds: Size) -> Rect {
        let mut rect = Rect::new(0, 0, SHIP_WIDTH, SHIP_HEIGHT);
        rect.set_bottom(bounds.height - SHIP_START_BOTTOM_MARGIN);
        rect.set_center_x(bounds.width / 2);
        rect
    }

    pub fn reset_position(&mut self, bounds: Size) {
        self.rect = Spaceship::start_rect(bounds);
    }

    pub fn move_left(&mut self) {
        self.speed_h = -self.speed;
    }

    pub fn move_right(&mut self) {
        self.speed_h = self.speed;
    }

    pub fn move_up(&mut self) {
        self.speed_v = -self.speed;
    }

    pub fn move_down(&mut self) {
        self.speed_v = self.speed;
    }

    pub fn stop(&mut self) {
        self.speed_h = 0;
        self.speed_v = 0;
    }

    pub fn can_jump(&self, now_ms: u64) -> bool {
        now_ms >= self.next_jump_ms
    }

    /// Teleports to a random in-bounds spot if the cooldown has elapsed.
    pub fn jump(&mut self, now_ms: u64, bounds: Size, rng: &mut impl Rng) -> bool {
        if !self.can_jump(now_ms) {
            return false;
        }
        self.relocate(bounds, rng);
        self.next_jump_ms = now_ms + self.jump_cooldown_ms;
        self.jump_ready = false;
        true
    }

    /// Random in-bounds position; leaves the cooldown untouched.
    pub fn relocate(&mut self, bounds: Size, rng: &mut impl Rng) {
        self.rect.x = rng.gen_range(0..=(bounds.width - self.rect.w).max(0));
        self.rect.y = rng.gen_range(0..=(bounds.height - self.rect.h).max(0));
    }
}

impl Entity for Spaceship {
    fn update(&mut self, ctx: &TickContext) -> EntityStatus {
        // All-or-nothing: a move that would cross any edge is dropped entirely.
        let moved = self.rect.translated(self.speed_h, self.speed_v);
        if ctx.bounds.rect().contains(&moved) {
            self.rect = moved;
        }
        self.jump_ready = self.can_jump(ctx.now_ms);
        EntityStatus::Alive
    }

    fn draw(&self, grid: &mut GameGrid) {
        let glyph = if self.jump_ready { 'A' } else { 'a' };
        grid.fill_rect(&self.rect, glyph);
    }
}

// --- Rocks ---
pub struct RockSprite {
    pub width: i32,
    pub height: i32,
    pub glyph: char,
}

pub const ROCK_SPRITES: [RockSprite; ROCK_VARIANTS] = [
    RockSprite { width: 30, height: 28, glyph: '@' },
    RockSprite { width: 36, height: 32, glyph: '#' },
    RockSprite { width: 42, height: 40, glyph: '%' },
    RockSprite { width: 48, height: 44, glyph: '&' },
    RockSprite { width: 54, height: 48, glyph: '@' },
    RockSprite { width: 24, height: 24, glyph: 'o' },
    RockSprite { width: 32, height: 36, glyph: 'O' },
    RockSprite { width: 40, height: 30, glyph: '#' },
    RockSprite { width: 60, height: 50, glyph: '%' },
    RockSprite { width: 28, height: 40, glyph: '&' },
];

#[derive(Debug, Clone)]
pub struct Rock {
    pub rect: Rect,
    pub speed: i32,
    pub variant: usize,
}

impl Rock {
    pub fn new(rng: &mut impl Rng, bounds: Size) -> Self {
        let variant = rng.gen_range(0..ROCK_VARIANTS);
        let sprite = &ROCK_SPRITES[variant];
        let mut rock = Rock {
            rect: Rect::new(0, 0, sprite.width, sprite.height),
            speed: rng.gen_range(ROCK_MIN_SPEED..=ROCK_MAX_SPEED),
            variant,
        };
        rock.random_pos(rng, bounds);
        rock
    }

    pub fn random_pos(&mut self, rng: &mut impl Rng, bounds: Size) {
        self.rect.x = rng.gen_range(0..=(bounds.width - self.rect.w).max(0));
    }

    pub fn glyph(&self) -> char {
        ROCK_SPRITES[self.variant].glyph
    }
}

impl Entity for Rock {
    fn update(&mut self, ctx: &TickContext) -> EntityStatus {
        self.rect.y += self.speed;
        if self.rect.top() > ctx.bounds.height {
            EntityStatus::Exited
        } else {
            EntityStatus::Alive
        }
    }

    fn draw(&self, grid: &mut GameGrid) {
        grid.fill_rect(&self.rect, self.glyph());
    }
}

// --- Lives ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives {
    remaining: u32,
}

impl Lives {
    pub fn new(count: u32) -> Self {
        Lives { remaining: count }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Takes one life and returns what is left.
    pub fn lose(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Entity for Lives {
    // One ship glyph per life, right-aligned on the HUD row.
    fn draw(&self, grid: &mut GameGrid) {
        for i in 0..self.remaining {
            let x = grid.width.saturating_sub(1 + (i as u16) * 2);
            grid.set_char(x, 0, 'A');
        }
    }
}

// --- Background ---
pub struct Background {
    pub star: char,
}

impl Default for Background {
    fn default() -> Self {
        Background { star: '.' }
    }
}

impl Entity for Background {
    fn draw(&self, grid: &mut GameGrid) {
        for y in 0..grid.height {
            for x in 0..grid.width {
                if (x as u32 * 7 + y as u32 * 13) % 37 == 0 {
                    grid.set_char(x, y, self.star);
                }
            }
        }
    }
}
