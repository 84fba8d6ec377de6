use crate::constants::*;
use crate::entities::Rock;
use crate::types::Size;
use log::debug;
use rand::Rng;

/// Time-gated rock creation plus the difficulty ramp that shortens the gap
/// between spawns over the course of a run.
#[derive(Debug, Clone)]
pub struct Spawner {
    pub next_spawn_ms: u64,
    pub interval_ms: u64,
    pub next_ramp_ms: u64,
}

impl Spawner {
    pub fn new(now_ms: u64) -> Self {
        Spawner {
            next_spawn_ms: now_ms,
            interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            next_ramp_ms: now_ms + SPAWN_RAMP_PERIOD_MS,
        }
    }

    /// Shortens the spawn interval once per ramp period, floored at the minimum.
    pub fn ramp(&mut self, now_ms: u64) {
        if now_ms < self.next_ramp_ms {
            return;
        }
        let next = self
            .interval_ms
            .saturating_sub(SPAWN_INTERVAL_STEP_MS)
            .max(MIN_SPAWN_INTERVAL_MS);
        if next != self.interval_ms {
            debug!("Spawn interval {}ms -> {}ms", self.interval_ms, next);
            self.interval_ms = next;
        }
        self.next_ramp_ms = now_ms + SPAWN_RAMP_PERIOD_MS;
    }

    /// Adds one rock if the spawn gate is open. Placement avoids overlapping
    /// live rocks for a bounded number of retries, then gives up and places it anyway.
    pub fn try_spawn(
        &mut self,
        now_ms: u64,
        rocks: &mut Vec<Rock>,
        rng: &mut impl Rng,
        bounds: Size,
    ) -> bool {
        if now_ms < self.next_spawn_ms {
            return false;
        }

        let mut rock = Rock::new(rng, bounds);
        let mut tries = SPAWN_TRIES;
        while overlaps_any(&rock, rocks) {
            if tries == 0 {
                debug!("No free spot for rock after {} tries, placing anyway", SPAWN_TRIES);
                break;
            }
            rock.random_pos(rng, bounds);
            tries -= 1;
        }
        rocks.push(rock);

        self.next_spawn_ms = now_ms + self.interval_ms;
        true
    }
}

fn overlaps_any(rock: &Rock, rocks: &[Rock]) -> bool {
    rocks.iter().any(|other| rock.rect.intersects(&other.rect))
}
