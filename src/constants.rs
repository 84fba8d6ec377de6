// --- Playfield ---
pub const WORLD_WIDTH: i32 = 600;
pub const WORLD_HEIGHT: i32 = 688;

// --- Loop ---
pub const FPS: u64 = 60;
pub const GAME_OVER_HOLD_MS: u64 = 3000;
pub const DEBUG_DEFAULT_MAX_FRAMES: u64 = 600;

// --- Spaceship ---
pub const SHIP_WIDTH: i32 = 40;
pub const SHIP_HEIGHT: i32 = 48;
pub const SHIP_SPEED: i32 = 4;
pub const SHIP_START_BOTTOM_MARGIN: i32 = 10;
pub const JUMP_COOLDOWN_MS: u64 = 2000;
pub const JUMP_TRIES: u32 = 100;

// --- Rocks ---
pub const ROCK_VARIANTS: usize = 10;
pub const ROCK_MIN_SPEED: i32 = 1;
pub const ROCK_MAX_SPEED: i32 = 4;

// --- Spawner ---
pub const INITIAL_SPAWN_INTERVAL_MS: u64 = 500;
pub const SPAWN_INTERVAL_STEP_MS: u64 = 10;
pub const MIN_SPAWN_INTERVAL_MS: u64 = 50;
pub const SPAWN_RAMP_PERIOD_MS: u64 = 2000;
pub const SPAWN_TRIES: u32 = 10;

// --- Player ---
pub const INITIAL_LIVES: u32 = 3;

// --- Input ---
pub const RELEASE_FALLBACK_MS: u64 = 600; // Synthetic stop when key releases are not reported
