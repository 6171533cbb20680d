use crate::blackboard::Blackboard;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Per-tick execution state handed to every task hook: the elapsed-time
/// delta, the active blackboard and the tree instance's random source.
///
/// Timed tasks measure elapsed time only through [`Context::delta`]; the
/// engine never samples a clock, which keeps runs deterministic.
pub struct Context {
    delta: f64,
    pub(crate) blackboard: Blackboard,
    rng: SmallRng,
}

impl Context {
    pub fn new(blackboard: Blackboard) -> Self {
        Self {
            delta: 0.0,
            blackboard,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Time elapsed since the previous tick, in seconds.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub(crate) fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn take_blackboard(self) -> Blackboard {
        self.blackboard
    }

    /// The random source used by probability gates and shuffled composites.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Replace the random source with a seeded one for reproducible runs.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Blackboard::new())
    }
}
