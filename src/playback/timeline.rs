use crate::core::Step;

/// Ordered list of keyframes. Index 0 is the rest pose.
///
/// Steps are never mutated in place; the only way to change one is to
/// overwrite it with a new snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    steps: Vec<Step>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from a persisted list of steps
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Push a step and return its index
    pub fn append(&mut self, step: Step) -> usize {
        self.steps.push(step);
        self.steps.len() - 1
    }

    /// Replace the step at `index`; out of range does nothing
    pub fn overwrite(&mut self, index: usize, step: Step) -> bool {
        match self.steps.get_mut(index) {
            Some(slot) => {
                *slot = step;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Replace the contents with `steps`
    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    /// Copy of every step, for persistence
    pub fn to_array(&self) -> Vec<Step> {
        self.steps.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Number of interpolation segments (at least one when non-empty)
    pub fn segment_count(&self) -> usize {
        self.steps.len().saturating_sub(1).max(usize::from(!self.steps.is_empty()))
    }
}
