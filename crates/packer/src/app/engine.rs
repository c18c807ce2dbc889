//! Item selection strategies.
//!
//! Every strategy returns a feasible [`Selection`]: its total weight never exceeds the
//! package capacity. [`DynamicProgramming`] is exact, [`Greedy`] is a fast approximation.

use std::cmp::Ordering;
use std::iter;

use crate::domain::model::{Amount, Item, Package, Selection};

/// Chooses which items of a package to pack.
pub trait PackStrategy: Send + Sync {
    /// Stable identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Select a subset of `package`'s items. Never fails for a validated package.
    fn select(&self, package: &Package) -> Selection;
}

/// Exact 0/1 knapsack over weights discretized to hundredths.
///
/// Ranking: highest total value, then lowest total weight, then the ascending index
/// sequence that is lexicographically smallest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgramming;

/// Best subset found so far for one weight budget.
#[derive(Debug, Clone, Default)]
struct Cell {
    value: u64,
    weight: u64,
    /// Ascending item indices.
    members: Vec<u32>,
}

impl Cell {
    /// Whether `self` plus `item` ranks above `incumbent`.
    ///
    /// `item.index` must be lower than every index in `self.members`.
    fn extension_outranks(&self, item: &Item, incumbent: &Cell) -> bool {
        let value = self.value.saturating_add(item.value.hundredths());
        let weight = self.weight.saturating_add(item.weight.hundredths());
        value
            .cmp(&incumbent.value)
            .then_with(|| incumbent.weight.cmp(&weight))
            .then_with(|| {
                incumbent
                    .members
                    .iter()
                    .cmp(iter::once(&item.index).chain(self.members.iter()))
            })
            .is_gt()
    }

    fn extended(&self, item: &Item) -> Cell {
        let mut members = Vec::with_capacity(self.members.len() + 1);
        members.push(item.index);
        members.extend_from_slice(&self.members);
        Cell {
            value: self.value.saturating_add(item.value.hundredths()),
            weight: self.weight.saturating_add(item.weight.hundredths()),
            members,
        }
    }
}

impl PackStrategy for DynamicProgramming {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn select(&self, package: &Package) -> Selection {
        // Validated capacity is at most MAX_CAPACITY units, so this stays small.
        let capacity = package.capacity().hundredths() as usize;

        // Highest index first: each inclusion then prepends the smallest index, which keeps
        // the lexicographic tie-break consistent as subsets grow.
        let mut candidates: Vec<&Item> = package
            .items()
            .iter()
            .filter(|item| package.fits(item))
            .collect();
        candidates.sort_by(|a, b| b.index.cmp(&a.index));

        // best[w] holds the top-ranked subset weighing at most w hundredths.
        let mut best = vec![Cell::default(); capacity + 1];
        for item in candidates {
            let weight = item.weight.hundredths() as usize;
            for budget in (weight..=capacity).rev() {
                let base = &best[budget - weight];
                if base.extension_outranks(item, &best[budget]) {
                    best[budget] = base.extended(item);
                }
            }
        }

        let chosen = &best[capacity].members;
        Selection::from_items(
            package
                .items()
                .iter()
                .filter(|item| chosen.contains(&item.index)),
        )
    }
}

/// Value-density heuristic: feasible, usually good, not always optimal.
///
/// Zero-weight items come first, then items by descending value per unit of weight,
/// lighter and lower-indexed items first on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl PackStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select(&self, package: &Package) -> Selection {
        let mut ordered = package.items_by_weight();
        ordered.sort_by(|a, b| density_order(a, b));

        let capacity = package.capacity();
        let mut load = Amount::ZERO;
        let mut chosen = Vec::new();
        for item in ordered {
            let next = load.saturating_add(item.weight);
            if next <= capacity {
                load = next;
                chosen.push(item);
            }
        }

        Selection::from_items(chosen)
    }
}

/// Descending value density; zero-weight items rank above everything else.
fn density_order(a: &Item, b: &Item) -> Ordering {
    let (a_weight, b_weight) = (a.weight.hundredths(), b.weight.hundredths());
    match (a_weight == 0, b_weight == 0) {
        (true, true) => b.value.cmp(&a.value),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let a_density = u128::from(a.value.hundredths()) * u128::from(b_weight);
            let b_density = u128::from(b.value.hundredths()) * u128::from(a_weight);
            b_density.cmp(&a_density)
        }
    }
}
