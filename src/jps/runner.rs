//! JPS execution loop.

use super::bounds::Member;
use super::config::JpsConfig;
use super::mutation::mutate;
use super::population::{evaluate, Population};
use super::schedule::AcceptanceSchedule;
use super::types::Objective;
use crate::error::{JpsError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, instrument, trace, warn};

/// Result of a JPS run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JpsResult {
    /// The best member found.
    pub best: Member,

    /// Cost of the best member.
    pub best_cost: f64,

    /// Evaluations performed by the generation loop (bootstrap excluded).
    pub evaluations: usize,

    /// Number of completed generations.
    pub generations: usize,

    /// `davg` used by the acceptance schedule.
    pub davg: f64,

    /// Whether the measured `davg` was degenerate and got replaced.
    pub degenerate_calibration: bool,

    /// Number of improving moves (greedy replacements).
    pub improving_moves: usize,

    /// Number of worse candidates accepted by the schedule.
    pub accepted_worse: usize,

    /// Whether the run stopped because `best_cost <= cost_target`.
    pub target_reached: bool,

    /// Best cost after bootstrap, then after every generation.
    pub cost_history: Vec<f64>,
}

/// A mutated slot waiting for its acceptance decision.
struct Proposal {
    candidate: Member,
    cost: f64,
    rng: ChaCha8Rng,
}

/// Executes the JPS algorithm.
///
/// # Usage
///
/// ```
/// use jps_fit::jps::{Bounds, JpsConfig, JpsRunner};
///
/// let bounds = Bounds::new(vec![(0.0, 10.0)]).unwrap();
/// let config = JpsConfig::new(bounds)
///     .with_pool_size(20)
///     .with_max_evals(2_000)
///     .with_alpha(0.99)
///     .with_mutation_scale(0.2);
/// let objective = |m: &[f64], _: &JpsConfig| (m[0] - 7.0).powi(2);
///
/// let result = JpsRunner::run(&objective, &config, 42).unwrap();
/// assert!((result.best[0] - 7.0).abs() < 0.5);
/// ```
pub struct JpsRunner;

impl JpsRunner {
    /// Runs a JPS search. `seed` fixes every random draw of the run.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before any evaluation. A non-finite
    /// cost aborts the run with [`JpsError::NonFiniteCost`].
    #[instrument(
        name = "jps",
        skip_all,
        fields(pool_size = config.pool_size, dim = config.dim(), max_evals = config.max_evals, seed = seed)
    )]
    pub fn run<O>(objective: &O, config: &JpsConfig, seed: u64) -> Result<JpsResult>
    where
        O: Objective + ?Sized,
    {
        config.validate()?;
        if let Some(expected) = objective.dimension() {
            if expected != config.dim() {
                return Err(JpsError::DimensionMismatch {
                    expected,
                    got: config.dim(),
                });
            }
        }

        // Bootstrap
        let mut rng = make_slot_rng(seed, 0, 0);
        let (mut population, calibration) = Population::bootstrap(objective, config, &mut rng)?;
        let schedule = AcceptanceSchedule::new(config, calibration.davg);
        if calibration.degenerate {
            warn!(
                measured = calibration.davg,
                substitute = schedule.davg(),
                pairs = calibration.pairs,
                "Degenerate davg calibration"
            );
        } else {
            debug!(davg = calibration.davg, pairs = calibration.pairs, "Calibrated davg");
        }

        let best_idx = population.best_index();
        let mut best = population.member(best_idx).to_vec();
        let mut best_cost = population.cost(best_idx);

        let mut cost_history = vec![best_cost];
        let mut evals = 0usize;
        let mut generation = 0usize;
        let mut improving_moves = 0usize;
        let mut accepted_worse = 0usize;

        loop {
            generation += 1;
            let proposals = propose(objective, config, &population, seed, generation)?;

            for (slot, proposal) in proposals.into_iter().enumerate() {
                let Proposal {
                    candidate,
                    cost,
                    mut rng,
                } = proposal;

                if cost < best_cost {
                    best.clone_from(&candidate);
                    best_cost = cost;
                }

                let current_cost = population.cost(slot);
                if cost < current_cost {
                    population.replace(slot, candidate, cost);
                    improving_moves += 1;
                } else {
                    let p = schedule.probability(cost - current_cost, evals);
                    if rng.random::<f64>() < p {
                        population.replace(slot, candidate, cost);
                        accepted_worse += 1;
                    }
                }

                evals += 1;
            }

            cost_history.push(best_cost);
            objective.on_generation(generation, &population, best_cost);
            trace!(generation, evals, best_cost, warmup = schedule.is_warmup(evals), "Generation done");

            if evals >= config.max_evals || best_cost <= config.cost_target {
                break;
            }
        }

        let target_reached = best_cost <= config.cost_target;
        info!(
            best_cost,
            evals,
            generations = generation,
            target_reached,
            "JPS finished"
        );

        Ok(JpsResult {
            best,
            best_cost,
            evaluations: evals,
            generations: generation,
            davg: schedule.davg(),
            degenerate_calibration: calibration.degenerate,
            improving_moves,
            accepted_worse,
            target_reached,
            cost_history,
        })
    }
}

/// Derives the random stream of one slot in one generation.
///
/// Generation 0 is the bootstrap stream.
#[inline]
fn make_slot_rng(seed: u64, generation: usize, slot: usize) -> ChaCha8Rng {
    let s = seed
        ^ (generation as u64).wrapping_mul(0x9E37_79B1_85EB_CA87)
        ^ (slot as u64).wrapping_mul(0xD134_2543_DE82_E285).rotate_left(17);
    ChaCha8Rng::seed_from_u64(s)
}

/// Mutates and evaluates a single slot.
fn propose_slot<O>(
    objective: &O,
    config: &JpsConfig,
    member: &[f64],
    seed: u64,
    generation: usize,
    slot: usize,
) -> Result<Proposal>
where
    O: Objective + ?Sized,
{
    let mut rng = make_slot_rng(seed, generation, slot);
    let candidate = mutate(member, &config.bounds, config.mutation_scale, &mut rng);
    let cost = evaluate(objective, &candidate, config)?;
    Ok(Proposal {
        candidate,
        cost,
        rng,
    })
}

/// Mutates and evaluates every slot of the population, in slot order.
fn propose<O>(
    objective: &O,
    config: &JpsConfig,
    population: &Population,
    seed: u64,
    generation: usize,
) -> Result<Vec<Proposal>>
where
    O: Objective + ?Sized,
{
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return (0..population.len())
                .into_par_iter()
                .map(|slot| propose_slot(objective, config, population.member(slot), seed, generation, slot))
                .collect();
        }
    }

    (0..population.len())
        .map(|slot| propose_slot(objective, config, population.member(slot), seed, generation, slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jps::Bounds;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn sphere(m: &[f64], _: &JpsConfig) -> f64 {
        m.iter().map(|x| x * x).sum()
    }

    fn scenario_config() -> JpsConfig {
        JpsConfig::new(Bounds::new(vec![(-10.0, 10.0), (-10.0, 10.0)]).unwrap())
            .with_pool_size(20)
            .with_max_evals(500)
            .with_alpha(0.99)
            .with_mutation_scale(0.2)
            .with_eval_frac(0.1)
            .with_cost_target(1e-3)
    }

    /// Records every population the runner reports.
    struct Recorder<F> {
        inner: F,
        dim: Option<usize>,
        generations: Mutex<Vec<(usize, Vec<Member>, f64)>>,
    }

    impl<F> Recorder<F> {
        fn new(inner: F) -> Self {
            Self {
                inner,
                dim: None,
                generations: Mutex::new(Vec::new()),
            }
        }
    }

    impl<F> Objective for Recorder<F>
    where
        F: Fn(&[f64], &JpsConfig) -> f64 + Send + Sync,
    {
        fn cost(&self, member: &[f64], config: &JpsConfig) -> f64 {
            (self.inner)(member, config)
        }

        fn dimension(&self) -> Option<usize> {
            self.dim
        }

        fn on_generation(&self, generation: usize, population: &Population, best_cost: f64) {
            self.generations
                .lock()
                .unwrap()
                .push((generation, population.members().to_vec(), best_cost));
        }
    }

    // ---- Convergence ----

    #[test]
    fn test_sphere_scenario() {
        let config = scenario_config();
        let result = JpsRunner::run(&sphere, &config, 42).unwrap();

        assert!(
            result.best_cost <= 1e-3 || result.evaluations == 500,
            "stopped early without reaching target: {result:?}"
        );
        assert!(
            result.best_cost < 0.5,
            "expected near-zero cost, got {}",
            result.best_cost
        );
        assert_eq!(result.target_reached, result.best_cost <= 1e-3);
        assert!(config.bounds.contains(&result.best));
        assert!((sphere(&result.best, &config) - result.best_cost).abs() < 1e-12);
    }

    #[test]
    fn test_single_dimension_converges_to_seven() {
        let config = JpsConfig::new(Bounds::new(vec![(0.0, 10.0)]).unwrap())
            .with_pool_size(20)
            .with_max_evals(4_000)
            .with_alpha(0.99)
            .with_mutation_scale(0.2)
            .with_eval_frac(0.1)
            .with_cost_target(1e-6);
        let objective = |m: &[f64], _: &JpsConfig| (m[0] - 7.0).powi(2);

        let result = JpsRunner::run(&objective, &config, 7).unwrap();

        assert!(
            (result.best[0] - 7.0).abs() < 0.05,
            "expected best near 7.0, got {}",
            result.best[0]
        );
    }

    #[test]
    fn test_budget_stops_at_generation_boundary() {
        let config = scenario_config()
            .with_cost_target(f64::NEG_INFINITY)
            .with_max_evals(55);
        let result = JpsRunner::run(&sphere, &config, 1).unwrap();

        // 55 evaluations need three generations of 20.
        assert_eq!(result.generations, 3);
        assert_eq!(result.evaluations, 60);
        assert!(!result.target_reached);
        assert_eq!(result.cost_history.len(), 4);
    }

    #[test]
    fn test_target_reached_stops_after_one_generation() {
        // Any member satisfies the target, but one generation always runs.
        let config = scenario_config().with_cost_target(1e9);
        let result = JpsRunner::run(&sphere, &config, 3).unwrap();
        assert_eq!(result.generations, 1);
        assert_eq!(result.evaluations, 20);
        assert!(result.target_reached);
    }

    // ---- Invariants ----

    #[test]
    fn test_determinism() {
        let config = scenario_config().with_cost_target(f64::NEG_INFINITY);
        let a = Recorder::new(sphere);
        let b = Recorder::new(sphere);

        let ra = JpsRunner::run(&a, &config, 99).unwrap();
        let rb = JpsRunner::run(&b, &config, 99).unwrap();

        assert_eq!(ra, rb);
        assert_eq!(*a.generations.lock().unwrap(), *b.generations.lock().unwrap());

        let rc = JpsRunner::run(&sphere, &config, 100).unwrap();
        assert_ne!(ra.cost_history, rc.cost_history);
    }

    #[test]
    fn test_best_cost_non_increasing() {
        let config = scenario_config().with_cost_target(f64::NEG_INFINITY);
        let recorder = Recorder::new(sphere);
        let result = JpsRunner::run(&recorder, &config, 11).unwrap();

        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        let reported: Vec<f64> = recorder
            .generations
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, best)| *best)
            .collect();
        assert_eq!(reported, result.cost_history[1..]);
        assert_eq!(*result.cost_history.last().unwrap(), result.best_cost);
    }

    #[test]
    fn test_every_member_in_bounds_every_generation() {
        let config = JpsConfig::new(Bounds::new(vec![(-1.0, 1.0), (0.0, 1e-6), (5.0, 50.0)]).unwrap())
            .with_pool_size(16)
            .with_max_evals(800)
            .with_mutation_scale(0.9)
            .with_cost_target(f64::NEG_INFINITY);
        let recorder = Recorder::new(|m: &[f64], _: &JpsConfig| -m.iter().sum::<f64>());
        JpsRunner::run(&recorder, &config, 5).unwrap();

        let generations = recorder.generations.lock().unwrap();
        assert_eq!(generations.len(), 50);
        for (gen, members, _) in generations.iter() {
            assert_eq!(members.len(), 16);
            for m in members {
                assert!(config.bounds.contains(m), "generation {gen}: {m:?} out of bounds");
            }
        }
    }

    #[test]
    fn test_degenerate_dimension_never_changes() {
        let config = JpsConfig::new(Bounds::new(vec![(-5.0, 5.0), (2.5, 2.5)]).unwrap())
            .with_pool_size(10)
            .with_max_evals(300)
            .with_mutation_scale(0.5)
            .with_cost_target(f64::NEG_INFINITY);
        let recorder = Recorder::new(|m: &[f64], _: &JpsConfig| m[0] * m[0] + m[1]);
        let result = JpsRunner::run(&recorder, &config, 8).unwrap();

        assert_eq!(result.best[1], 2.5);
        for (_, members, _) in recorder.generations.lock().unwrap().iter() {
            assert!(members.iter().all(|m| m[1] == 2.5));
        }
    }

    #[test]
    fn test_constant_objective_completes() {
        let config = scenario_config().with_cost_target(f64::NEG_INFINITY);
        let flat = |_: &[f64], _: &JpsConfig| 1.0;
        let result = JpsRunner::run(&flat, &config, 2).unwrap();

        assert!(result.degenerate_calibration);
        assert_eq!(result.davg, crate::jps::DAVG_EPSILON);
        assert_eq!(result.evaluations, 500);
        assert_eq!(result.best_cost, 1.0);
        assert_eq!(result.improving_moves, 0);
    }

    #[test]
    fn test_odd_and_single_pool() {
        let config = scenario_config()
            .with_pool_size(7)
            .with_max_evals(70)
            .with_cost_target(f64::NEG_INFINITY);
        let recorder = Recorder::new(sphere);
        let result = JpsRunner::run(&recorder, &config, 4).unwrap();
        assert_eq!(result.evaluations, 70);
        assert!(recorder
            .generations
            .lock()
            .unwrap()
            .iter()
            .all(|(_, members, _)| members.len() == 7));

        let config = config.with_pool_size(1).with_max_evals(10);
        let result = JpsRunner::run(&sphere, &config, 4).unwrap();
        assert!(result.degenerate_calibration);
        assert_eq!(result.generations, 10);
    }

    #[test]
    fn test_warmup_accepts_worse_moves() {
        // With alpha close to 1 and a full warm-up, worse moves are accepted
        // almost every time.
        let config = scenario_config()
            .with_alpha(0.999_999)
            .with_eval_frac(1.0)
            .with_max_evals(2_000)
            .with_cost_target(f64::NEG_INFINITY);
        let result = JpsRunner::run(&sphere, &config, 21).unwrap();
        let worse_seen = result.evaluations - result.improving_moves;
        assert!(
            result.accepted_worse as f64 > 0.9 * worse_seen as f64,
            "accepted {} of {} worse moves",
            result.accepted_worse,
            worse_seen
        );
    }

    // ---- Errors ----

    #[test]
    fn test_config_error_before_any_evaluation() {
        let calls = AtomicUsize::new(0);
        let counting = |m: &[f64], c: &JpsConfig| {
            calls.fetch_add(1, Ordering::Relaxed);
            sphere(m, c)
        };
        let config = scenario_config().with_alpha(1.0);
        let err = JpsRunner::run(&counting, &config, 0).unwrap_err();
        assert_eq!(err, JpsError::InvalidAlpha(1.0));
        assert!(err.is_config_error());
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut recorder = Recorder::new(sphere);
        recorder.dim = Some(7);
        let err = JpsRunner::run(&recorder, &scenario_config(), 0).unwrap_err();
        assert_eq!(err, JpsError::DimensionMismatch { expected: 7, got: 2 });
        assert!(recorder.generations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_cost_aborts() {
        // Finite during bootstrap, NaN once a member strays near the origin.
        let objective = |m: &[f64], _: &JpsConfig| {
            let c = m[0] * m[0] + m[1] * m[1];
            if c < 4.0 {
                f64::NAN
            } else {
                c
            }
        };
        let config = scenario_config()
            .with_max_evals(100_000)
            .with_cost_target(f64::NEG_INFINITY);
        match JpsRunner::run(&objective, &config, 13) {
            Err(JpsError::NonFiniteCost { cost, member }) => {
                assert!(cost.is_nan());
                assert_eq!(member.len(), 2);
            }
            other => panic!("expected NonFiniteCost, got {other:?}"),
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let config = scenario_config().with_cost_target(f64::NEG_INFINITY);
        let sequential = JpsRunner::run(&sphere, &config, 77).unwrap();
        let parallel = JpsRunner::run(&sphere, &config.clone().with_parallel(true), 77).unwrap();
        assert_eq!(sequential, parallel);
    }
}
