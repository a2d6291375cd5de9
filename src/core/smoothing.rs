//! Exponential smoothing of classifier probability vectors.

/// Exponentially weighted running combination of probability vectors.
///
/// Each update computes `s' = α·s + (1 − α)·p`. The first vector after a
/// reset seeds the state directly.
#[derive(Debug, Clone)]
pub struct ProbabilitySmoother {
    alpha: f32,
    state: Option<Vec<f32>>,
}

impl ProbabilitySmoother {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, state: None }
    }

    /// Blend a new probability vector into the state and return the result.
    pub fn update(&mut self, probabilities: &[f32]) -> &[f32] {
        let alpha = self.alpha;
        let state = match self.state.take() {
            Some(previous) if previous.len() == probabilities.len() => previous
                .iter()
                .zip(probabilities)
                .map(|(s, p)| alpha * s + (1.0 - alpha) * p)
                .collect(),
            _ => probabilities.to_vec(),
        };
        self.state.insert(state)
    }

    /// Current smoothed vector, if any observation has been seen since reset.
    pub fn current(&self) -> Option<&[f32]> {
        self.state.as_deref()
    }

    /// Drop all accumulated history.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Index and value of the largest entry. The lowest index wins ties.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    best
}
