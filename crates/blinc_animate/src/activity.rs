//! Aggregate "is animating" tracking

/// Counts properties currently in motion
///
/// Reports the 0→1 and 1→0 transitions so the owner can fire its start and
/// end callbacks exactly once per transition. Rest notifications at zero are
/// absorbed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityCounter {
    active: usize,
}

impl ActivityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a property leaving rest; true if animation just started
    pub fn activate(&mut self) -> bool {
        self.active += 1;
        self.active == 1
    }

    /// Record a property coming to rest; true if animation just ended
    pub fn rest(&mut self) -> bool {
        match self.active {
            0 => false,
            n => {
                self.active = n - 1;
                self.active == 0
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.active > 0
    }

    pub fn count(&self) -> usize {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = 0;
    }
}
