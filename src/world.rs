use crate::collision::{self, CollisionOutcome, JumpOutcome};
use crate::constants::INITIAL_LIVES;
use crate::entities::{Background, Entity, EntityStatus, Lives, Rock, Spaceship, TickContext};
use crate::spawner::Spawner;
use crate::types::{GameAction, Size};
use log::info;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// Player asked to leave.
    Quit,
    GameOver,
}

/// What a single tick did, for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: bool,
    pub exited: u32,
    pub collision: CollisionOutcome,
}

/// All mutable game state for one run. Owned by the game loop.
pub struct World {
    pub bounds: Size,
    pub background: Background,
    pub spaceship: Spaceship,
    pub rocks: Vec<Rock>,
    pub lives: Lives,
    pub score: u32,
    pub spawner: Spawner,
    pub status: RunStatus,
}

impl World {
    pub fn new(bounds: Size, now_ms: u64) -> Self {
        World {
            bounds,
            background: Background::default(),
            spaceship: Spaceship::new(bounds, now_ms),
            rocks: Vec::new(),
            lives: Lives::new(INITIAL_LIVES),
            score: 0,
            spawner: Spawner::new(now_ms),
            status: RunStatus::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn apply(&mut self, action: GameAction, now_ms: u64, rng: &mut impl Rng) {
        if !self.is_running() {
            return;
        }
        match action {
            GameAction::MoveLeft => self.spaceship.move_left(),
            GameAction::MoveRight => self.spaceship.move_right(),
            GameAction::MoveUp => self.spaceship.move_up(),
            GameAction::MoveDown => self.spaceship.move_down(),
            GameAction::Stop => self.spaceship.stop(),
            GameAction::Jump => {
                let outcome = collision::jump_to_free_spot(
                    &mut self.spaceship,
                    &self.rocks,
                    now_ms,
                    self.bounds,
                    rng,
                );
                if outcome == JumpOutcome::Overlapping {
                    info!("Jumped into a rock field, no clear spot found");
                }
            }
            GameAction::Quit => {
                info!("Quit requested");
                self.status = RunStatus::Quit;
            }
        }
    }

    /// One simulation step: ramp, spawn, move, prune, collide.
    pub fn tick(&mut self, now_ms: u64, rng: &mut impl Rng) -> TickReport {
        if !self.is_running() {
            return TickReport {
                spawned: false,
                exited: 0,
                collision: CollisionOutcome::Clear,
            };
        }

        let ctx = TickContext { now_ms, bounds: self.bounds };

        self.spawner.ramp(now_ms);
        let spawned = self.spawner.try_spawn(now_ms, &mut self.rocks, rng, self.bounds);
        self.spaceship.update(&ctx);
        let exited = self.update_rocks(&ctx);

        let collision = collision::resolve(
            &mut self.spaceship,
            &mut self.rocks,
            &mut self.lives,
            self.bounds,
        );
        if collision == CollisionOutcome::GameOver {
            info!("Game over with {} points", self.score);
            self.status = RunStatus::GameOver;
        }

        TickReport { spawned, exited, collision }
    }

    // Update everything first, then drop the rocks that left the field.
    fn update_rocks(&mut self, ctx: &TickContext) -> u32 {
        let exited: Vec<usize> = self
            .rocks
            .iter_mut()
            .enumerate()
            .filter_map(|(i, rock)| (rock.update(ctx) == EntityStatus::Exited).then_some(i))
            .collect();

        for &i in exited.iter().rev() {
            self.rocks.swap_remove(i);
        }
        let count = exited.len() as u32;
        self.score += count;
        count
    }

    /// Everything on screen, back to front.
    pub fn drawables(&self) -> Vec<&dyn Entity> {
        let mut items: Vec<&dyn Entity> = Vec::with_capacity(self.rocks.len() + 3);
        items.push(&self.background);
        items.push(&self.spaceship);
        items.extend(self.rocks.iter().map(|rock| rock as &dyn Entity));
        items.push(&self.lives);
        items
    }
}
