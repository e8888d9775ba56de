//! Fit configuration
//!
//! [`GpConfig`] holds the hyperparameters of a single genetic programming
//! run, [`BoostingConfig`] those of the boosting loop wrapped around it.
//! [`FitConfig`] is the flat record an external caller supplies: both of the
//! above plus the ensemble flavor, loadable from TOML or JSON. Option names
//! of the original Python and Go front-ends are accepted as aliases.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{GpError, GpResult};
use crate::metrics::{metric_from_name, Metric};
use crate::operators::reproduction::ReproductionProbabilities;
use crate::program::{FunctionSet, TreeGenerator};

/// Hyperparameters of a genetic programming run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpConfig {
    /// Metric minimised during evolution
    #[serde(alias = "lossMetric")]
    pub loss_metric: String,
    /// Metric reported on validation data; defaults to the loss metric
    #[serde(alias = "evalMetric")]
    pub eval_metric: Option<String>,
    /// Fitness penalty per node
    #[serde(alias = "parsimony_coefficient", alias = "parsimonyCoeff")]
    pub parsimony_coeff: f64,
    /// Refine the constants of the best program after evolution
    #[serde(alias = "polishBest")]
    pub polish_best: bool,
    /// Generations of constant refinement
    #[serde(alias = "nPolishGenerations")]
    pub n_polish_generations: usize,

    /// Comma-separated function names
    pub funcs: String,
    #[serde(alias = "constMin")]
    pub const_min: f64,
    #[serde(alias = "constMax")]
    pub const_max: f64,
    /// Probability that a leaf is a constant
    #[serde(alias = "p_constant", alias = "pConstant")]
    pub p_const: f64,
    /// Probability of full (rather than grow) initialization
    #[serde(alias = "pFull")]
    pub p_full: f64,
    /// Probability of stopping at a leaf in grow initialization
    #[serde(alias = "p_terminal", alias = "pTerminal")]
    pub p_leaf: f64,
    #[serde(alias = "minHeight")]
    pub min_height: usize,
    #[serde(alias = "maxHeight")]
    pub max_height: usize,

    /// Number of islands
    #[serde(alias = "nPopulations")]
    pub n_populations: usize,
    /// Individuals per island
    #[serde(alias = "nIndividuals")]
    pub n_individuals: usize,
    #[serde(alias = "nGenerations")]
    pub n_generations: usize,
    /// Stop after this many generations without improvement; 0 disables
    #[serde(alias = "nStagnationGenerations")]
    pub n_stagnation_generations: usize,

    #[serde(alias = "pHoistMutation")]
    pub p_hoist_mutation: f64,
    #[serde(alias = "p_sub_tree_mutation", alias = "pSubtreeMutation")]
    pub p_subtree_mutation: f64,
    #[serde(alias = "pPointMutation")]
    pub p_point_mutation: f64,
    /// Per-node probability within a point mutation
    #[serde(alias = "pointMutationRate")]
    pub point_mutation_rate: f64,
    #[serde(alias = "p_sub_tree_crossover", alias = "pSubtreeCrossover")]
    pub p_subtree_crossover: f64,

    /// Master seed; 0 draws one from the clock
    #[serde(alias = "random_state", alias = "rng_seed")]
    pub seed: u64,
    /// Log per-generation progress at info level
    pub verbose: bool,
}

impl Default for GpConfig {
    fn default() -> Self {
        Self {
            loss_metric: "mae".to_string(),
            eval_metric: None,
            parsimony_coeff: 1e-5,
            polish_best: false,
            n_polish_generations: 0,
            funcs: "add,sub,mul,div".to_string(),
            const_min: -5.0,
            const_max: 5.0,
            p_const: 0.5,
            p_full: 0.5,
            p_leaf: 0.3,
            min_height: 3,
            max_height: 5,
            n_populations: 1,
            n_individuals: 100,
            n_generations: 30,
            n_stagnation_generations: 0,
            p_hoist_mutation: 0.1,
            p_subtree_mutation: 0.1,
            p_point_mutation: 0.1,
            point_mutation_rate: 0.5,
            p_subtree_crossover: 0.3,
            seed: 0,
            verbose: false,
        }
    }
}

impl GpConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loss metric
    pub fn loss_metric(mut self, name: &str) -> Self {
        self.loss_metric = name.to_string();
        self
    }

    /// Set the eval metric
    pub fn eval_metric(mut self, name: &str) -> Self {
        self.eval_metric = Some(name.to_string());
        self
    }

    /// Set the function set
    pub fn funcs(mut self, funcs: &str) -> Self {
        self.funcs = funcs.to_string();
        self
    }

    /// Set the constant range
    pub fn constants(mut self, min: f64, max: f64) -> Self {
        self.const_min = min;
        self.const_max = max;
        self
    }

    /// Set the height range
    pub fn heights(mut self, min: usize, max: usize) -> Self {
        self.min_height = min;
        self.max_height = max;
        self
    }

    /// Set the number of islands and individuals per island
    pub fn populations(mut self, n_populations: usize, n_individuals: usize) -> Self {
        self.n_populations = n_populations;
        self.n_individuals = n_individuals;
        self
    }

    /// Set the number of generations
    pub fn generations(mut self, n: usize) -> Self {
        self.n_generations = n;
        self
    }

    /// Set the parsimony coefficient
    pub fn parsimony(mut self, coeff: f64) -> Self {
        self.parsimony_coeff = coeff;
        self
    }

    /// Enable constant polishing for `n` generations
    pub fn polish(mut self, n: usize) -> Self {
        self.polish_best = n > 0;
        self.n_polish_generations = n;
        self
    }

    /// Set the reproduction probabilities
    pub fn operators(mut self, point: f64, subtree: f64, hoist: f64, crossover: f64) -> Self {
        self.p_point_mutation = point;
        self.p_subtree_mutation = subtree;
        self.p_hoist_mutation = hoist;
        self.p_subtree_crossover = crossover;
        self
    }

    /// Set the master seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable progress logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Name of the eval metric, falling back to the loss metric
    pub fn eval_metric_name(&self) -> &str {
        self.eval_metric.as_deref().unwrap_or(&self.loss_metric)
    }

    /// Look up the loss metric
    pub fn build_loss_metric(&self) -> GpResult<Box<dyn Metric>> {
        metric_from_name(&self.loss_metric)
    }

    /// Look up the eval metric
    pub fn build_eval_metric(&self) -> GpResult<Box<dyn Metric>> {
        metric_from_name(self.eval_metric_name())
    }

    /// Parse the function set
    pub fn function_set(&self) -> GpResult<FunctionSet> {
        FunctionSet::parse(&self.funcs)
    }

    /// Tree generator for a dataset with `n_features` columns
    pub fn tree_generator(&self, n_features: usize) -> GpResult<TreeGenerator> {
        let mut generator = TreeGenerator::new(self.function_set()?, n_features)
            .heights(self.min_height, self.max_height)
            .constants(self.const_min, self.const_max);
        generator.p_const = self.p_const;
        generator.p_full = self.p_full;
        generator.p_leaf = self.p_leaf;
        Ok(generator)
    }

    /// Per-offspring operator probabilities
    pub fn reproduction_probabilities(&self) -> ReproductionProbabilities {
        ReproductionProbabilities {
            point_mutation: self.p_point_mutation,
            subtree_mutation: self.p_subtree_mutation,
            hoist_mutation: self.p_hoist_mutation,
            subtree_crossover: self.p_subtree_crossover,
        }
    }

    /// Check every hyperparameter
    pub fn validate(&self) -> GpResult<()> {
        self.build_loss_metric()?;
        self.build_eval_metric()?;
        self.function_set()?;

        if self.min_height > self.max_height {
            return Err(invalid(format!(
                "min_height ({}) > max_height ({})",
                self.min_height, self.max_height
            )));
        }
        if self.n_populations == 0 {
            return Err(invalid("n_populations must be at least 1"));
        }
        if self.n_individuals == 0 {
            return Err(invalid("n_individuals must be at least 1"));
        }
        if !self.const_min.is_finite()
            || !self.const_max.is_finite()
            || self.const_min > self.const_max
        {
            return Err(invalid(format!(
                "invalid constant range [{}, {}]",
                self.const_min, self.const_max
            )));
        }
        if !self.parsimony_coeff.is_finite() || self.parsimony_coeff < 0.0 {
            return Err(invalid("parsimony_coeff must be finite and non-negative"));
        }
        for (name, p) in [
            ("p_const", self.p_const),
            ("p_full", self.p_full),
            ("p_leaf", self.p_leaf),
            ("p_hoist_mutation", self.p_hoist_mutation),
            ("p_subtree_mutation", self.p_subtree_mutation),
            ("p_point_mutation", self.p_point_mutation),
            ("point_mutation_rate", self.point_mutation_rate),
            ("p_subtree_crossover", self.p_subtree_crossover),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{} must lie in [0, 1], got {}", name, p)));
            }
        }
        Ok(())
    }
}

/// Hyperparameters of the boosting loop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    #[serde(alias = "nRounds")]
    pub n_rounds: usize,
    /// Stop after this many monitoring checkpoints without improvement; 0 disables
    #[serde(alias = "nEarlyStoppingRounds")]
    pub n_early_stopping_rounds: usize,
    #[serde(alias = "learningRate")]
    pub learning_rate: f64,
    /// Optimise each round's step multiplier
    #[serde(alias = "lineSearch")]
    pub line_search: bool,
    /// Fraction of rows sampled each round
    #[serde(alias = "rowSampling")]
    pub row_sampling: f64,
    /// Fraction of features sampled each round
    #[serde(alias = "colSampling")]
    pub col_sampling: f64,
    /// Truncate the ensemble to its best validation checkpoint
    #[serde(alias = "useBestRounds")]
    pub use_best_rounds: bool,
    /// Rounds between validation checkpoints
    #[serde(alias = "monitorEvery")]
    pub monitor_every: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            n_early_stopping_rounds: 0,
            learning_rate: 0.08,
            line_search: false,
            row_sampling: 1.0,
            col_sampling: 1.0,
            use_best_rounds: false,
            monitor_every: 1,
        }
    }
}

impl BoostingConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rounds
    pub fn rounds(mut self, n: usize) -> Self {
        self.n_rounds = n;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Enable or disable line search
    pub fn line_search(mut self, enabled: bool) -> Self {
        self.line_search = enabled;
        self
    }

    /// Set the row and column sampling fractions
    pub fn sampling(mut self, rows: f64, cols: f64) -> Self {
        self.row_sampling = rows;
        self.col_sampling = cols;
        self
    }

    /// Configure early stopping
    pub fn early_stopping(mut self, rounds: usize, use_best_rounds: bool) -> Self {
        self.n_early_stopping_rounds = rounds;
        self.use_best_rounds = use_best_rounds;
        self
    }

    /// Set the monitoring interval
    pub fn monitor_every(mut self, n: usize) -> Self {
        self.monitor_every = n;
        self
    }

    /// Check every hyperparameter
    pub fn validate(&self) -> GpResult<()> {
        if self.n_rounds == 0 {
            return Err(invalid("n_rounds must be at least 1"));
        }
        if self.monitor_every == 0 {
            return Err(invalid("monitor_every must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (name, fraction) in [
            ("row_sampling", self.row_sampling),
            ("col_sampling", self.col_sampling),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(invalid(format!(
                    "{} must lie in (0, 1], got {}",
                    name, fraction
                )));
            }
        }
        Ok(())
    }
}

/// Flat configuration record for [`crate::model::fit`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// `vanilla` or `boosting`
    #[serde(default = "default_flavor")]
    pub flavor: String,
    #[serde(flatten)]
    pub gp: GpConfig,
    #[serde(flatten)]
    pub boosting: BoostingConfig,
    /// Keys neither of the above recognised; rejected by [`FitConfig::validate`]
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

fn default_flavor() -> String {
    "vanilla".to_string()
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            flavor: default_flavor(),
            gp: GpConfig::default(),
            boosting: BoostingConfig::default(),
            unknown: BTreeMap::new(),
        }
    }
}

impl FitConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> GpResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.check_unknown()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(s: &str) -> GpResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.check_unknown()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> GpResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(invalid(format!(
                "unsupported configuration format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Check every hyperparameter
    pub fn validate(&self) -> GpResult<()> {
        self.check_unknown()?;
        self.flavor.parse::<crate::model::Flavor>()?;
        self.gp.validate()?;
        self.boosting.validate()
    }

    /// Fail on options that no setting consumed
    pub fn check_unknown(&self) -> GpResult<()> {
        if self.unknown.is_empty() {
            return Ok(());
        }
        let keys: Vec<&str> = self.unknown.keys().map(String::as_str).collect();
        Err(invalid(format!("unknown option(s): {}", keys.join(", "))))
    }
}

/// Master random stream; seed 0 draws a seed from the clock
pub fn make_rng(seed: u64) -> StdRng {
    if seed != 0 {
        return StdRng::seed_from_u64(seed);
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    StdRng::seed_from_u64(nanos)
}

fn invalid(msg: impl Into<String>) -> GpError {
    GpError::InvalidConfiguration(msg.into())
}
