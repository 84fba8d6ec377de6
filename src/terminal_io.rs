use std::collections::HashMap;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::constants::RELEASE_FALLBACK_MS;
use crate::types::GameAction;

/// Map a pressed key to a game action. Unmapped keys yield `None`.
pub fn map_key(key: KeyEvent) -> Option<GameAction> {
    if should_quit(key) {
        return Some(GameAction::Quit);
    }
    match key.code {
        KeyCode::Left => Some(GameAction::MoveLeft),
        KeyCode::Right => Some(GameAction::MoveRight),
        KeyCode::Up => Some(GameAction::MoveUp),
        KeyCode::Down => Some(GameAction::MoveDown),
        KeyCode::Char(' ') => Some(GameAction::Jump),
        _ => None,
    }
}

pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

pub fn is_movement_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down)
}

/// Turns terminal events into actions.
///
/// Terminals without keyboard enhancement never send key releases, so in that
/// mode a stop is synthesized once no movement key has been seen for a while.
pub struct InputHandler {
    release_events: bool,
    last_move_ms: Option<u64>,
}

impl InputHandler {
    pub fn new(release_events: bool) -> Self {
        InputHandler { release_events, last_move_ms: None }
    }

    pub fn handle_event(&mut self, event: &Event, now_ms: u64) -> Option<GameAction> {
        let Event::Key(key) = event else {
            return None;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if is_movement_key(key.code) {
                    self.last_move_ms = Some(now_ms);
                }
                map_key(*key)
            }
            KeyEventKind::Release => {
                if is_movement_key(key.code) {
                    self.last_move_ms = None;
                    Some(GameAction::Stop)
                } else {
                    None
                }
            }
        }
    }

    /// Called once per tick; only ever yields a synthetic `Stop`.
    pub fn update(&mut self, now_ms: u64) -> Option<GameAction> {
        if self.release_events {
            return None;
        }
        match self.last_move_ms {
            Some(pressed) if now_ms.saturating_sub(pressed) >= RELEASE_FALLBACK_MS => {
                self.last_move_ms = None;
                Some(GameAction::Stop)
            }
            _ => None,
        }
    }
}

// --- SimulatedInput for headless runs ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// A short scripted session: wander around, jump twice, keep dodging.
    pub fn demo() -> Self {
        let mut script = SimulatedInput::new(HashMap::new());
        script.press_for(1, 40, KeyCode::Left);
        script.press_for(50, 90, KeyCode::Up);
        script.tap(100, KeyCode::Char(' '));
        script.press_for(150, 200, KeyCode::Right);
        script.press_for(220, 240, KeyCode::Down);
        script.tap(260, KeyCode::Char(' '));
        script.press_for(300, 380, KeyCode::Left);
        script
    }

    pub fn tap(&mut self, frame: u64, code: KeyCode) {
        self.push(frame, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    pub fn press_for(&mut self, from: u64, until: u64, code: KeyCode) {
        self.push(from, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        self.push(
            until,
            Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)),
        );
    }

    pub fn push(&mut self, frame: u64, event: Event) {
        self.events.entry(frame).or_default().push(event);
    }

    /// Events scheduled for `frame`, in insertion order.
    pub fn drain(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release))
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Left)), Some(GameAction::MoveLeft));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Right)), Some(GameAction::MoveRight));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Up)), Some(GameAction::MoveUp));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Down)), Some(GameAction::MoveDown));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char(' '))), Some(GameAction::Jump));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Esc)), Some(GameAction::Quit));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('q'))), Some(GameAction::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(GameAction::Quit)
        );
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('c'))), None);
        assert_eq!(map_key(KeyEvent::from(KeyCode::Tab)), None);
    }

    #[test]
    fn test_release_stops_movement() {
        let mut handler = InputHandler::new(true);
        assert_eq!(handler.handle_event(&press(KeyCode::Up), 0), Some(GameAction::MoveUp));
        assert_eq!(handler.handle_event(&release(KeyCode::Up), 10), Some(GameAction::Stop));
        assert_eq!(handler.handle_event(&release(KeyCode::Char(' ')), 20), None);
        assert_eq!(handler.update(10_000), None);
    }

    #[test]
    fn test_fallback_synthesizes_stop() {
        let mut handler = InputHandler::new(false);
        handler.handle_event(&press(KeyCode::Left), 0);
        assert_eq!(handler.update(RELEASE_FALLBACK_MS - 1), None);

        // Auto-repeat keeps the ship moving.
        handler.handle_event(&press(KeyCode::Left), 500);
        assert_eq!(handler.update(RELEASE_FALLBACK_MS + 1), None);

        assert_eq!(handler.update(500 + RELEASE_FALLBACK_MS), Some(GameAction::Stop));
        assert_eq!(handler.update(5000), None);
    }

    #[test]
    fn test_non_key_events_are_ignored() {
        let mut handler = InputHandler::new(true);
        assert_eq!(handler.handle_event(&Event::Resize(80, 24), 0), None);
        assert_eq!(handler.handle_event(&Event::FocusLost, 0), None);
    }

    #[test]
    fn test_simulated_input_drains_per_frame() {
        let mut input = SimulatedInput::new(HashMap::new());
        input.press_for(3, 5, KeyCode::Down);
        input.tap(3, KeyCode::Char(' '));

        assert!(input.drain(2).is_empty());
        let frame3 = input.drain(3);
        assert_eq!(frame3.len(), 2);
        assert_eq!(frame3[0], press(KeyCode::Down));
        assert!(input.drain(3).is_empty());
        assert_eq!(input.drain(5), vec![release(KeyCode::Down)]);
    }
}
