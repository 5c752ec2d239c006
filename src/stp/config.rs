/// Timing and cost constants the STP algorithm runs against.
///
/// These were global constants in early drafts; per the design notes, global
/// mutable state is made explicit configuration passed at construction
/// instead, so a test can shrink `max_age`/`forward_delay` to reach
/// convergence in a handful of ticks rather than waiting out realistic
/// timer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StpConfig {
    pub hello: u32,
    pub forward_delay: u32,
    pub max_age: u32,
    pub path_cost: u32,
    pub default_priority: u16,
}

impl StpConfig {
    pub const fn new(hello: u32, forward_delay: u32, max_age: u32, path_cost: u32, default_priority: u16) -> Self {
        StpConfig {
            hello,
            forward_delay,
            max_age,
            path_cost,
            default_priority,
        }
    }
}

impl Default for StpConfig {
    /// Reproduces the timing constants from the spec: `HELLO = 2`,
    /// `FORWARD_DELAY = 15`, `MAX_AGE = 20`, `PATH_COST = 19`, default
    /// priority `0x8000`.
    fn default() -> Self {
        StpConfig {
            hello: 2,
            forward_delay: 15,
            max_age: 20,
            path_cost: 19,
            default_priority: 0x8000,
        }
    }
}
