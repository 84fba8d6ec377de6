mod collision;
mod constants;
mod entities;
mod game;
mod rendering;
mod spawner;
mod terminal_io;
mod types;
mod world;

use std::env;
use std::io;

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
        size, supports_keyboard_enhancement,
    },
};
use log::{error, info, warn};

use crate::constants::DEBUG_DEFAULT_MAX_FRAMES;
use crate::game::Game;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::terminal_io::SimulatedInput;

#[derive(Debug, PartialEq, Eq)]
enum LaunchMode {
    Interactive { max_frames: Option<u64> },
    Headless { width: u16, height: u16, max_frames: u64 },
}

/// `rocks [MAX_FRAMES]` or `rocks --debug [WIDTH HEIGHT [MAX_FRAMES]]`.
fn parse_args(args: &[String]) -> LaunchMode {
    if args.get(1).map(String::as_str) == Some("--debug") {
        let mut width = 80;
        let mut height = 24;
        if args.len() >= 4 {
            width = args[2].parse::<u16>().unwrap_or(80);
            height = args[3].parse::<u16>().unwrap_or(24);
        }
        let max_frames = args
            .get(4)
            .and_then(|arg| arg.parse::<u64>().ok())
            .unwrap_or(DEBUG_DEFAULT_MAX_FRAMES);
        LaunchMode::Headless { width, height, max_frames }
    } else {
        LaunchMode::Interactive {
            max_frames: args.get(1).and_then(|arg| arg.parse::<u64>().ok()),
        }
    }
}

fn main() -> Result<()> {
    simple_logging::log_to_file("rocks.log", log::LevelFilter::Info)
        .context("Failed to open rocks.log")?;
    info!("Starting Rocks.");

    let args: Vec<String> = env::args().collect();
    let result = match parse_args(&args) {
        LaunchMode::Headless { width, height, max_frames } => run_headless(width, height, max_frames),
        LaunchMode::Interactive { max_frames } => run_interactive(max_frames),
    };

    match &result {
        Ok(score) => {
            info!("Exiting with final score {}", score);
            println!("Final score: {}", score);
        }
        Err(e) => error!("Fatal: {:#}", e),
    }
    result.map(|_| ())
}

fn run_headless(width: u16, height: u16, max_frames: u64) -> Result<u32> {
    info!("Debug mode enabled, {}x{} for {} frames", width, height, max_frames);
    let stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(width, height));
    let mut game = Game::new(
        width,
        height,
        stdout_target,
        Some(SimulatedInput::demo()),
        true,
        Some(max_frames),
    );
    game.run()
}

fn run_interactive(max_frames: Option<u64>) -> Result<u32> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    info!("Raw mode enabled.");

    let release_events = matches!(supports_keyboard_enhancement(), Ok(true));
    if release_events {
        info!("Key release events available.");
    } else {
        warn!("Terminal does not report key releases, using timed stop fallback.");
    }

    let mut terminal = OutputTarget::Stdout(io::stdout());
    let result = enter_screen(&mut terminal, release_events).and_then(|_| {
        let (width, height) = size().context("Failed to get terminal size")?;
        info!("Terminal size: {}x{}", width, height);
        let stdout_target = OutputTarget::Stdout(io::stdout());
        Game::new(width, height, stdout_target, None, release_events, max_frames).run()
    });

    // Always try to restore the terminal, even after a failed run.
    let restored = leave_screen(&mut terminal, release_events);
    let raw_off = disable_raw_mode().context("Failed to disable raw mode");
    let score = result?;
    restored?;
    raw_off?;
    Ok(score)
}

fn enter_screen(stdout_target: &mut OutputTarget, release_events: bool) -> Result<()> {
    stdout_target
        .execute_other_command(EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    stdout_target.execute_other_command(Hide).context("Failed to hide cursor")?;
    stdout_target
        .execute_other_command(SetTitle("Rocks"))
        .context("Failed to set terminal title")?;
    if release_events {
        stdout_target
            .execute_other_command(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .context("Failed to enable key release reporting")?;
    }
    stdout_target.clear_all().context("Failed to clear screen")?;
    Ok(())
}

fn leave_screen(stdout_target: &mut OutputTarget, release_events: bool) -> Result<()> {
    if release_events {
        stdout_target
            .execute_other_command(PopKeyboardEnhancementFlags)
            .context("Failed to restore keyboard flags")?;
    }
    stdout_target.execute_other_command(Show).context("Failed to show cursor")?;
    stdout_target
        .execute_other_command(LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_args_is_interactive() {
        assert_eq!(parse_args(&args(&["rocks"])), LaunchMode::Interactive { max_frames: None });
    }

    #[test]
    fn test_parse_frame_limit() {
        assert_eq!(
            parse_args(&args(&["rocks", "300"])),
            LaunchMode::Interactive { max_frames: Some(300) }
        );
        assert_eq!(
            parse_args(&args(&["rocks", "soon"])),
            LaunchMode::Interactive { max_frames: None }
        );
    }

    #[test]
    fn test_parse_debug_defaults() {
        assert_eq!(
            parse_args(&args(&["rocks", "--debug"])),
            LaunchMode::Headless { width: 80, height: 24, max_frames: DEBUG_DEFAULT_MAX_FRAMES }
        );
    }

    #[test]
    fn test_parse_debug_full() {
        assert_eq!(
            parse_args(&args(&["rocks", "--debug", "120", "40", "90"])),
            LaunchMode::Headless { width: 120, height: 40, max_frames: 90 }
        );
        assert_eq!(
            parse_args(&args(&["rocks", "--debug", "wide", "40"])),
            LaunchMode::Headless { width: 80, height: 40, max_frames: DEBUG_DEFAULT_MAX_FRAMES }
        );
    }
}
