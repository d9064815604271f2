//! Hyper-parameter tuning utility.
//!
//! A tuner holds named axes (linear range, base-10 exponent range or a
//! finite enumeration), hands out JSON-encoded configurations to evaluate
//! and collects their scores (lower is better). The first pass walks a
//! grid over the axes (randomly subsampled past a cap); afterwards it
//! refines greedily around the best trials by halving the axis spans, up
//! to a bounded depth.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Number, Value};

use crate::math;

/// Cap on the first-pass grid size.
const MAX_GRID: usize = 256;

/// Points per linear axis in the first pass.
const LINEAR_STEPS: usize = 4;

/// Maximum refinement depth of a trial.
const MAX_DEPTH: usize = 4;

/// Minimum number of trials generated per refinement pass.
const MIN_REFINED: usize = 8;

#[derive(Debug, Clone)]
enum ParamKind {
    Linear { min: f64, max: f64 },
    Base10 { min: f64, max: f64 },
    Finite(Vec<f64>),
}

#[derive(Debug, Clone)]
struct Param {
    name: String,
    kind: ParamKind,
}

impl Param {
    /// First-pass candidate values.
    fn candidates(&self) -> Vec<f64> {
        match self.kind {
            ParamKind::Linear { min, max } => (0..LINEAR_STEPS)
                .map(|i| min + (max - min) * i as f64 / (LINEAR_STEPS - 1) as f64)
                .collect(),
            ParamKind::Base10 { min, max } => {
                let mut values = Vec::new();
                let mut exponent = min;
                while exponent <= max + 0.5 {
                    values.push(10f64.powf(exponent));
                    exponent += 1.0;
                }
                values
            }
            ParamKind::Finite(ref values) => values.clone(),
        }
    }

    /// Initial refinement span (zero marks a non-refinable axis).
    fn span(&self) -> f64 {
        match self.kind {
            ParamKind::Linear { min, max } => (max - min) / (LINEAR_STEPS - 1) as f64,
            ParamKind::Base10 { .. } => 1.0,
            ParamKind::Finite(_) => 0.0,
        }
    }

    /// Move `value` by `delta` along the axis scale, clamped to the range.
    fn neighbour(&self, value: f64, delta: f64) -> Option<f64> {
        match self.kind {
            ParamKind::Linear { min, max } => Some((value + delta).clamp(min, max)),
            ParamKind::Base10 { min, max } => {
                let exponent = (value.log10() + delta).clamp(min, max);
                Some(10f64.powf(exponent))
            }
            ParamKind::Finite(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Trial {
    values: Vec<f64>,
    spans: Vec<f64>,
    depth: usize,
    score: f64,
}

/// Hyper-parameter search over named axes.
#[derive(Debug)]
pub struct Tuner {
    rng: StdRng,
    params: Vec<Param>,
    trials: Vec<Trial>,
    pending: VecDeque<Trial>,
    last: Option<usize>,
    gridded: bool,
}

impl Tuner {
    /// Create an empty tuner.
    pub fn new() -> Tuner {
        Tuner {
            rng: StdRng::seed_from_u64(0x5eed),
            params: Vec::new(),
            trials: Vec::new(),
            pending: VecDeque::new(),
            last: None,
            gridded: false,
        }
    }

    /// Add a linearly scaled axis over `[min, max]`.
    pub fn add_linear(&mut self, name: &str, min: f64, max: f64) {
        self.params.push(Param {
            name: name.to_owned(),
            kind: ParamKind::Linear { min, max },
        });
    }

    /// Add a power-of-ten axis over exponents `[min, max]`.
    pub fn add_base10(&mut self, name: &str, min: f64, max: f64) {
        self.params.push(Param {
            name: name.to_owned(),
            kind: ParamKind::Base10 { min, max },
        });
    }

    /// Add an axis enumerating the given values.
    pub fn add_finite(&mut self, name: &str, values: Vec<f64>) {
        self.params.push(Param {
            name: name.to_owned(),
            kind: ParamKind::Finite(values),
        });
    }

    /// Number of axes.
    pub fn axes(&self) -> usize {
        self.params.len()
    }

    /// Number of configurations handed out so far.
    pub fn trials(&self) -> usize {
        self.trials.len()
    }

    /// The next configuration to evaluate, JSON-encoded.
    ///
    /// Once the grid and every refinement are exhausted this keeps
    /// returning the best known configuration.
    pub fn get(&mut self) -> String {
        if self.pending.is_empty() {
            if !self.gridded {
                self.grid();
            } else {
                self.refine();
            }
        }

        match self.pending.pop_front() {
            Some(trial) => {
                let json = self.json(&trial);
                self.trials.push(trial);
                self.last = Some(self.trials.len() - 1);
                json
            }
            None => {
                self.last = None;
                self.optimum()
            }
        }
    }

    /// Attach a score (lower is better) to the configuration returned by
    /// the last call to [`get`](#method.get).
    pub fn score(&mut self, score: f64) {
        if let Some(index) = self.last.take() {
            self.trials[index].score = score;
        }
    }

    /// The best-scored configuration so far, JSON-encoded.
    pub fn optimum(&self) -> String {
        let best = self
            .trials
            .iter()
            .filter(|trial| trial.score.is_finite())
            .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        match best {
            Some(trial) => self.json(trial),
            None => "{}".to_owned(),
        }
    }

    /// First pass: the cartesian grid over all axes, randomly subsampled
    /// when it exceeds the cap.
    fn grid(&mut self) {
        self.gridded = true;

        let candidates: Vec<Vec<f64>> = self.params.iter().map(Param::candidates).collect();
        let spans: Vec<f64> = self.params.iter().map(Param::span).collect();
        let total: usize = candidates.iter().map(Vec::len).product();
        if total == 0 {
            return;
        }

        if total <= MAX_GRID {
            for index in 0..total {
                let mut rest = index;
                let values = candidates
                    .iter()
                    .map(|axis| {
                        let value = axis[rest % axis.len()];
                        rest /= axis.len();
                        value
                    })
                    .collect();
                self.push_trial(values, spans.clone(), 1);
            }
        } else {
            for _ in 0..MAX_GRID {
                let values = candidates
                    .iter()
                    .map(|axis| axis[self.rng.gen_range(0..axis.len())])
                    .collect();
                self.push_trial(values, spans.clone(), 1);
            }
        }
    }

    /// Halve the axis spans around the best trials.
    fn refine(&mut self) {
        let mut order: Vec<usize> = (0..self.trials.len())
            .filter(|&i| self.trials[i].score.is_finite())
            .collect();
        order.sort_by(|&a, &b| {
            self.trials[a]
                .score
                .partial_cmp(&self.trials[b].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut generated = 0;
        for &seed in order.iter() {
            if generated >= MIN_REFINED {
                break;
            }
            let parent = self.trials[seed].clone();
            if parent.depth >= MAX_DEPTH {
                continue;
            }

            for axis in 0..self.params.len() {
                let span = parent.spans[axis] / 2.0;
                if span <= 0.0 {
                    continue;
                }
                for direction in [-1.0, 1.0] {
                    let value =
                        match self.params[axis].neighbour(parent.values[axis], direction * span) {
                            Some(value) => value,
                            None => continue,
                        };
                    if math::close(value, parent.values[axis], math::epsilon1()) {
                        continue;
                    }

                    let mut values = parent.values.clone();
                    values[axis] = value;
                    let mut spans = parent.spans.clone();
                    for s in spans.iter_mut() {
                        *s /= 2.0;
                    }
                    if self.push_trial(values, spans, parent.depth + 1) {
                        generated += 1;
                    }
                }
            }
        }
    }

    /// Queue a trial unless an equal one exists already.
    fn push_trial(&mut self, values: Vec<f64>, spans: Vec<f64>, depth: usize) -> bool {
        let duplicate = self
            .trials
            .iter()
            .chain(self.pending.iter())
            .any(|trial| {
                trial
                    .values
                    .iter()
                    .zip(values.iter())
                    .all(|(a, b)| math::close(*a, *b, math::epsilon1()))
            });
        if duplicate {
            return false;
        }
        self.pending.push_back(Trial {
            values,
            spans,
            depth,
            score: f64::NAN,
        });
        true
    }

    fn json(&self, trial: &Trial) -> String {
        let mut object = Map::new();
        for (param, &value) in self.params.iter().zip(trial.values.iter()) {
            let number = if value.fract() == 0.0 && value.abs() < 1e15 {
                Number::from(value as i64)
            } else {
                Number::from_f64(value).expect("finite trial value")
            };
            object.insert(param.name.clone(), Value::Number(number));
        }
        Value::Object(object).to_string()
    }
}

impl Default for Tuner {
    fn default() -> Tuner {
        Tuner::new()
    }
}
