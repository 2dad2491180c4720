//! Class-probability prediction output.

/// Predicted class together with the probability of every known class.
///
/// `probabilities` is ordered by class value, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityPrediction {
    pub prediction: f64,
    pub probabilities: Vec<(f64, f64)>,
}

impl ProbabilityPrediction {
    pub fn new(prediction: f64, probabilities: Vec<(f64, f64)>) -> Self {
        Self {
            prediction,
            probabilities,
        }
    }

    /// Build from parallel class/probability slices, predicting the first
    /// class with the highest probability.
    pub fn from_classes(classes: &[f64], probabilities: &[f64]) -> Self {
        debug_assert_eq!(classes.len(), probabilities.len());
        let mut prediction = classes.first().copied().unwrap_or(f64::NAN);
        let mut best = f64::NEG_INFINITY;
        for (&class, &p) in classes.iter().zip(probabilities) {
            if p > best {
                best = p;
                prediction = class;
            }
        }
        Self {
            prediction,
            probabilities: classes.iter().copied().zip(probabilities.iter().copied()).collect(),
        }
    }

    /// Probability of `class`, if it is known.
    pub fn probability(&self, class: f64) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(c, _)| *c == class)
            .map(|&(_, p)| p)
    }
}
