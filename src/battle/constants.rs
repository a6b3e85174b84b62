//! Battle system constants - all tunable values in one place

// Time
/// Simulated seconds advanced by one tick
pub const TICK_DT: f64 = 0.1;
/// Hard cap on ticks before the timeout fallback decides the battle
pub const MAX_TICKS: u64 = 500;
/// Tolerance for timer-vs-threshold comparisons, absorbs f64 drift from
/// repeatedly adding `TICK_DT`
pub const TIMER_EPSILON: f64 = 1e-9;

// Arena shape (rows counted from the top, enemy side first)
pub const ARENA_DEPTH: u32 = 8;
pub const ENEMY_DEPLOY_ROWS: u32 = 2;
pub const PLAYER_DEPLOY_ROWS: u32 = 2;
pub const DEFAULT_ARENA_WIDTH: u32 = 7;
pub const MAX_ARENA_WIDTH: u32 = 32;

// Wave generation
pub const WAVE_BASE_BUDGET: u32 = 6;
pub const WAVE_BUDGET_PER_WAVE: u32 = 3;
/// Highest wave a config may request
pub const MAX_WAVE_NUMBER: u32 = 1000;
/// First wave that receives a uniform stat modifier
pub const WAVE_MODIFIER_START: u32 = 5;
/// Additive hp/attack multiplier gained per wave from `WAVE_MODIFIER_START`
pub const WAVE_MODIFIER_STEP: f64 = 0.1;
