//! Population arena and bootstrap calibration.
//!
//! The population is a fixed-size array of slots. Each slot holds a member
//! and its cached cost; both are replaced together.

use super::bounds::Member;
use super::config::JpsConfig;
use super::mutation::mutate;
use super::schedule;
use super::types::Objective;
use crate::error::{JpsError, Result};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fixed-size set of members with their costs.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<Member>,
    costs: Vec<f64>,
}

/// Outcome of the bootstrap calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Mean of `cost(mutant) - cost(seed)` over the bootstrap pairs.
    ///
    /// `0.0` when there are no pairs.
    pub davg: f64,

    /// Number of (seed, mutant) pairs used.
    pub pairs: usize,

    /// Whether `davg` is unusable as a divisor and must be replaced.
    pub degenerate: bool,
}

impl Population {
    /// Builds the initial population and measures `davg`.
    ///
    /// `ceil(pool_size / 2)` seeds are drawn uniformly within the bounds and
    /// the first `floor(pool_size / 2)` of them are mutated once. The
    /// population is the seeds followed by the mutants.
    pub fn bootstrap<O, R>(objective: &O, config: &JpsConfig, rng: &mut R) -> Result<(Self, Calibration)>
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        let pairs = config.pool_size / 2;
        let seed_count = config.pool_size - pairs;

        let mut members: Vec<Member> = (0..seed_count)
            .map(|_| config.bounds.sample(rng))
            .collect();
        let mutants: Vec<Member> = members[..pairs]
            .iter()
            .map(|seed| mutate(seed, &config.bounds, config.mutation_scale, rng))
            .collect();
        members.extend(mutants);

        let costs = evaluate_all(objective, &members, config)?;

        let davg = if pairs == 0 {
            0.0
        } else {
            let total: f64 = (0..pairs)
                .map(|i| costs[seed_count + i] - costs[i])
                .sum();
            total / pairs as f64
        };

        let calibration = Calibration {
            davg,
            pairs,
            degenerate: schedule::is_degenerate(davg),
        };

        Ok((Self { members, costs }, calibration))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member held by slot `i`.
    pub fn member(&self, i: usize) -> &[f64] {
        &self.members[i]
    }

    /// Cached cost of slot `i`.
    pub fn cost(&self, i: usize) -> f64 {
        self.costs[i]
    }

    /// All members in slot order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// All cached costs in slot order.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// Replaces slot `i` with `member` and its already-evaluated `cost`.
    pub fn replace(&mut self, i: usize, member: Member, cost: f64) {
        self.members[i] = member;
        self.costs[i] = cost;
    }

    /// Index of the lowest-cost slot. Ties go to the lowest index.
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, &c) in self.costs.iter().enumerate().skip(1) {
            if c < self.costs[best] {
                best = i;
            }
        }
        best
    }
}

/// Evaluates one member, rejecting non-finite costs.
pub(crate) fn evaluate<O>(objective: &O, member: &[f64], config: &JpsConfig) -> Result<f64>
where
    O: Objective + ?Sized,
{
    let cost = objective.cost(member, config);
    if cost.is_finite() {
        Ok(cost)
    } else {
        Err(JpsError::NonFiniteCost {
            cost,
            member: member.to_vec(),
        })
    }
}

/// Evaluates every member, in parallel when enabled.
fn evaluate_all<O>(objective: &O, members: &[Member], config: &JpsConfig) -> Result<Vec<f64>>
where
    O: Objective + ?Sized,
{
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return members
                .par_iter()
                .map(|m| evaluate(objective, m, config))
                .collect();
        }
    }

    members
        .iter()
        .map(|m| evaluate(objective, m, config))
        .collect()
}
