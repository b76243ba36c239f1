use anyhow::Result;

use crate::{
    economy::PlayerAction,
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// A player action scheduled for one day, optionally repeating.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAction {
    pub day: u64,
    /// Repeat every `n` days after `day`.
    pub every: Option<u64>,
    /// Last day (inclusive) a repeating action fires.
    pub until: Option<u64>,
    pub action: PlayerAction,
    pub tiles: Vec<(usize, usize)>,
}

impl PlannedAction {
    pub fn is_due(&self, day: u64) -> bool {
        if day < self.day || self.until.is_some_and(|until| day > until) {
            return false;
        }
        match self.every {
            Some(every) if every > 0 => (day - self.day) % every == 0,
            _ => day == self.day,
        }
    }
}

/// Replays a fixed schedule of player actions through [`World::perform`].
pub struct PlanSystem {
    steps: Vec<PlannedAction>,
}

impl PlanSystem {
    pub fn new(steps: Vec<PlannedAction>) -> Self {
        Self { steps }
    }
}

impl System for PlanSystem {
    fn name(&self) -> &str {
        "plan"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for step in self.steps.iter().filter(|step| step.is_due(ctx.day)) {
            for &(x, y) in &step.tiles {
                world.perform(step.action, x, y);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(day: u64, every: Option<u64>, until: Option<u64>) -> PlannedAction {
        PlannedAction {
            day,
            every,
            until,
            action: PlayerAction::Water,
            tiles: vec![(0, 0)],
        }
    }

    #[test]
    fn one_off_step() {
        let once = step(4, None, None);
        assert!(!once.is_due(3));
        assert!(once.is_due(4));
        assert!(!once.is_due(5));
    }

    #[test]
    fn repeating_step_with_end() {
        let repeat = step(2, Some(3), Some(8));
        let due: Vec<u64> = (0..12).filter(|day| repeat.is_due(*day)).collect();
        assert_eq!(due, vec![2, 5, 8]);
    }

    #[test]
    fn zero_interval_acts_once() {
        let zero = step(1, Some(0), None);
        let due: Vec<u64> = (0..5).filter(|day| zero.is_due(*day)).collect();
        assert_eq!(due, vec![1]);
    }
}
