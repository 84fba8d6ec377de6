use crate::constants::JUMP_TRIES;
use crate::entities::{Lives, Rock, Spaceship};
use crate::types::{Rect, Size};
use log::{debug, info};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionOutcome {
    Clear,
    /// Screen wiped and ship back at the start position.
    LifeLost,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Still cooling down; nothing moved.
    NotReady,
    Landed,
    /// Every attempt overlapped a rock; the ship stays at the last one.
    Overlapping,
}

/// Index of the first rock overlapping `rect`.
pub fn first_hit(rect: &Rect, rocks: &[Rock]) -> Option<usize> {
    rocks.iter().position(|rock| rect.intersects(&rock.rect))
}

pub fn resolve(
    ship: &mut Spaceship,
    rocks: &mut Vec<Rock>,
    lives: &mut Lives,
    bounds: Size,
) -> CollisionOutcome {
    if first_hit(&ship.rect, rocks).is_none() {
        return CollisionOutcome::Clear;
    }

    lives.lose();
    if lives.is_exhausted() {
        info!("Ship destroyed, no lives left");
        return CollisionOutcome::GameOver;
    }

    info!("Ship hit, {} lives left", lives.remaining());
    rocks.clear();
    ship.reset_position(bounds);
    CollisionOutcome::LifeLost
}

/// Player-triggered escape: one cooldown-gated jump, then relocations until
/// the ship lands clear of every rock or the attempt budget runs out.
pub fn jump_to_free_spot(
    ship: &mut Spaceship,
    rocks: &[Rock],
    now_ms: u64,
    bounds: Size,
    rng: &mut impl Rng,
) -> JumpOutcome {
    if !ship.jump(now_ms, bounds, rng) {
        return JumpOutcome::NotReady;
    }

    let mut attempts = 1;
    while first_hit(&ship.rect, rocks).is_some() {
        if attempts >= JUMP_TRIES {
            debug!("Jump found no free spot after {} attempts", JUMP_TRIES);
            return JumpOutcome::Overlapping;
        }
        ship.relocate(bounds, rng);
        attempts += 1;
    }
    JumpOutcome::Landed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bounds() -> Size {
        Size::new(WORLD_WIDTH, WORLD_HEIGHT)
    }

    fn rock_at(rect: Rect) -> Rock {
        Rock { rect, speed: 1, variant: 0 }
    }

    #[test]
    fn test_first_hit_returns_first_match() {
        let rocks = vec![
            rock_at(Rect::new(0, 0, 10, 10)),
            rock_at(Rect::new(50, 50, 10, 10)),
            rock_at(Rect::new(55, 55, 10, 10)),
        ];
        assert_eq!(first_hit(&Rect::new(52, 52, 20, 20), &rocks), Some(1));
        assert_eq!(first_hit(&Rect::new(200, 200, 5, 5), &rocks), None);
    }

    #[test]
    fn test_resolve_without_hit_is_clear() {
        let mut ship = Spaceship::new(bounds(), 0);
        let mut rocks = vec![rock_at(Rect::new(0, 0, 30, 30))];
        let mut lives = Lives::new(INITIAL_LIVES);
        assert_eq!(resolve(&mut ship, &mut rocks, &mut lives, bounds()), CollisionOutcome::Clear);
        assert_eq!(rocks.len(), 1);
        assert_eq!(lives.remaining(), INITIAL_LIVES);
    }

    #[test]
    fn test_resolve_hit_wipes_screen_and_resets_ship() {
        let mut ship = Spaceship::new(bounds(), 0);
        ship.rect.x = 100;
        ship.rect.y = 100;
        let mut rocks = vec![
            rock_at(Rect::new(110, 110, 30, 30)),
            rock_at(Rect::new(400, 10, 30, 30)),
        ];
        let mut lives = Lives::new(INITIAL_LIVES);

        let outcome = resolve(&mut ship, &mut rocks, &mut lives, bounds());
        assert_eq!(outcome, CollisionOutcome::LifeLost);
        assert!(rocks.is_empty());
        assert_eq!(ship.rect, Spaceship::start_rect(bounds()));
        assert_eq!(lives.remaining(), INITIAL_LIVES - 1);
    }

    #[test]
    fn test_resolve_last_life_is_game_over() {
        let mut ship = Spaceship::new(bounds(), 0);
        let mut rocks = vec![rock_at(ship.rect)];
        let mut lives = Lives::new(1);
        assert_eq!(resolve(&mut ship, &mut rocks, &mut lives, bounds()), CollisionOutcome::GameOver);
        assert!(lives.is_exhausted());
    }

    #[test]
    fn test_jump_on_cooldown_does_nothing() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut ship = Spaceship::new(bounds(), 0);
        ship.next_jump_ms = 5000;
        let before = ship.rect;
        assert_eq!(jump_to_free_spot(&mut ship, &[], 100, bounds(), &mut rng), JumpOutcome::NotReady);
        assert_eq!(ship.rect, before);
    }

    #[test]
    fn test_jump_lands_clear_of_rocks() {
        let mut rng = StdRng::seed_from_u64(21);
        // Top half of the field is solid rock.
        let rocks = vec![rock_at(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT / 2))];
        for _ in 0..20 {
            let mut ship = Spaceship::new(bounds(), 0);
            let outcome = jump_to_free_spot(&mut ship, &rocks, 0, bounds(), &mut rng);
            assert_eq!(outcome, JumpOutcome::Landed);
            assert_eq!(first_hit(&ship.rect, &rocks), None);
            assert_eq!(ship.next_jump_ms, JUMP_COOLDOWN_MS);
        }
    }

    #[test]
    fn test_jump_gives_up_when_field_is_full() {
        let mut rng = StdRng::seed_from_u64(2);
        let rocks = vec![rock_at(bounds().rect())];
        let mut ship = Spaceship::new(bounds(), 0);
        let outcome = jump_to_free_spot(&mut ship, &rocks, 0, bounds(), &mut rng);
        assert_eq!(outcome, JumpOutcome::Overlapping);
        assert!(bounds().rect().contains(&ship.rect));
        assert!(!ship.can_jump(0));
    }
}
