use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use log::{debug, info};
use rand::Rng;

use crate::collision::CollisionOutcome;
use crate::constants::*;
use crate::rendering::{GameGrid, OutputTarget};
use crate::terminal_io::{InputHandler, SimulatedInput};
use crate::types::Size;
use crate::world::World;

pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    input_handler: InputHandler,
    max_frames: Option<u64>,
    game_over_hold: Duration,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        release_events: bool,
        max_frames: Option<u64>,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            simulated_input,
            input_handler: InputHandler::new(release_events),
            max_frames,
            game_over_hold: Duration::from_millis(GAME_OVER_HOLD_MS),
        }
    }

    #[cfg(test)]
    pub fn with_game_over_hold(mut self, hold: Duration) -> Self {
        self.game_over_hold = hold;
        self
    }

    /// Plays one run to completion and returns the final score.
    pub fn run(&mut self) -> Result<u32> {
        let mut rng = rand::thread_rng();
        self.run_with_rng(&mut rng)
    }

    pub fn run_with_rng(&mut self, rng: &mut impl Rng) -> Result<u32> {
        let bounds = Size::new(WORLD_WIDTH, WORLD_HEIGHT);
        let mut world = World::new(bounds, 0);
        let mut game_grid = GameGrid::new(self.terminal_width, self.terminal_height, bounds);

        let frame_duration = Duration::from_micros(1_000_000 / FPS);
        let started = Instant::now();
        let mut frame_count: u64 = 0;

        info!("Entering game loop ({}x{} cells)", self.terminal_width, self.terminal_height);

        while world.is_running() && self.max_frames.is_none_or(|max| frame_count < max) {
            let frame_start = Instant::now();
            let now_ms = self.clock_ms(started, frame_count);

            self.handle_input(&mut world, &mut game_grid, now_ms, frame_count, rng)?;
            if let Some(action) = self.input_handler.update(now_ms) {
                world.apply(action, now_ms, rng);
            }

            let report = world.tick(now_ms, rng);
            if report.spawned {
                debug!("Frame {}: rock spawned, {} live", frame_count, world.rocks.len());
            }
            if report.exited > 0 {
                debug!("Frame {}: {} rocks passed, {} points", frame_count, report.exited, world.score);
            }
            if report.collision == CollisionOutcome::LifeLost {
                debug!("Frame {}: screen wiped", frame_count);
            }

            self.render(&world, &mut game_grid)?;
            frame_count += 1;

            if !self.stdout_target.is_headless() {
                if let Some(rest) = frame_duration.checked_sub(frame_start.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }

        info!(
            "Loop finished after {} frames ({:?}, {} lives left)",
            frame_count,
            world.status,
            world.lives.remaining()
        );
        self.show_game_over_screen(&mut game_grid, world.score)?;
        Ok(world.score)
    }

    // Headless runs advance a synthetic clock so they replay identically.
    fn clock_ms(&self, started: Instant, frame_count: u64) -> u64 {
        if self.simulated_input.is_some() {
            frame_count * 1000 / FPS
        } else {
            started.elapsed().as_millis() as u64
        }
    }

    fn handle_input(
        &mut self,
        world: &mut World,
        game_grid: &mut GameGrid,
        now_ms: u64,
        frame_count: u64,
        rng: &mut impl Rng,
    ) -> Result<()> {
        let events = match &mut self.simulated_input {
            Some(sim_input) => sim_input.drain(frame_count),
            None => {
                let mut pending = Vec::new();
                while event::poll(Duration::ZERO).context("Failed to poll terminal events")? {
                    pending.push(event::read().context("Failed to read terminal event")?);
                }
                pending
            }
        };

        for event in events {
            if let Event::Resize(new_width, new_height) = event {
                self.resize(game_grid, new_width, new_height)?;
                continue;
            }
            if let Some(action) = self.input_handler.handle_event(&event, now_ms) {
                world.apply(action, now_ms, rng);
            }
        }
        Ok(())
    }

    fn resize(&mut self, game_grid: &mut GameGrid, width: u16, height: u16) -> Result<()> {
        info!("Terminal resized to {}x{}", width, height);
        self.terminal_width = width;
        self.terminal_height = height;
        *game_grid = GameGrid::new(width, height, Size::new(WORLD_WIDTH, WORLD_HEIGHT));
        self.stdout_target
            .clear_all()
            .context("Failed to clear terminal after resize")?;
        Ok(())
    }

    fn render(&mut self, world: &World, game_grid: &mut GameGrid) -> Result<()> {
        game_grid.clear();
        for entity in world.drawables() {
            entity.draw(game_grid);
        }
        game_grid.put_str(0, 0, &format!("Points: {}", world.score));

        game_grid.render(&mut self.stdout_target).context("Failed to draw frame")?;
        self.stdout_target.flush().context("Failed to flush frame")?;

        if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
            sb.print_to_log();
        }
        Ok(())
    }

    fn show_game_over_screen(&mut self, game_grid: &mut GameGrid, score: u32) -> Result<()> {
        game_grid.clear();
        let mid = game_grid.height / 2;
        game_grid.put_str_centered(mid.saturating_sub(2), "GAME OVER");
        game_grid.put_str_centered(mid + 2, &format!("Score: {}", score));

        game_grid
            .render(&mut self.stdout_target)
            .context("Failed to draw game over screen")?;
        self.stdout_target.flush().context("Failed to flush game over screen")?;
        if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
            sb.print_to_log();
        }

        info!("Game over screen shown, final score {}", score);
        thread::sleep(self.game_over_hold);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::ScreenBuffer;
    use crossterm::event::KeyCode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn headless(input: SimulatedInput, max_frames: u64) -> Game {
        Game::new(
            80,
            24,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24)),
            Some(input),
            true,
            Some(max_frames),
        )
        .with_game_over_hold(Duration::ZERO)
    }

    fn screen(game: &Game) -> &ScreenBuffer {
        match &game.stdout_target {
            OutputTarget::ScreenBuffer(sb) => sb,
            OutputTarget::Stdout(_) => panic!("expected a screen buffer"),
        }
    }

    #[test]
    fn test_headless_run_ends_on_game_over_screen() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut game = headless(SimulatedInput::demo(), 120);
        let score = game.run_with_rng(&mut rng).unwrap();

        let sb = screen(&game);
        assert!(sb.contains_text("GAME OVER"));
        assert!(sb.contains_text(&format!("Score: {}", score)));
        assert_eq!(sb.row(10).trim(), "GAME OVER");
        assert_eq!(sb.row(14).trim(), format!("Score: {}", score));
    }

    #[test]
    fn test_hud_shows_points_and_lives() {
        let mut game = headless(SimulatedInput::new(HashMap::new()), 1);
        let bounds = Size::new(WORLD_WIDTH, WORLD_HEIGHT);
        let mut world = World::new(bounds, 0);
        world.score = 7;
        let mut grid = GameGrid::new(80, 24, bounds);
        game.render(&world, &mut grid).unwrap();

        let top = screen(&game).row(0);
        assert!(top.starts_with("Points: 7"));
        assert!(top.ends_with("A A A"));
    }

    #[test]
    fn test_escape_quits_early() {
        let mut input = SimulatedInput::new(HashMap::new());
        input.tap(5, KeyCode::Esc);
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = headless(input, 1000);

        // Rocks need well over five frames to reach the bottom.
        assert_eq!(game.run_with_rng(&mut rng).unwrap(), 0);
        assert!(screen(&game).contains_text("GAME OVER"));
    }

    #[test]
    fn test_resize_rebuilds_grid() {
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(2, Event::Resize(40, 12));
        input.tap(4, KeyCode::Esc);
        let mut rng = StdRng::seed_from_u64(4);
        let mut game = headless(input, 100);
        game.run_with_rng(&mut rng).unwrap();

        assert_eq!((game.terminal_width, game.terminal_height), (40, 12));
        // Game over text is centred on the new, smaller grid.
        assert_eq!(screen(&game).row(4).trim(), "GAME OVER");
    }
}
