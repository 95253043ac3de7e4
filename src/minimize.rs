//! Boolean minimization of truth tables
//!
//! The truth table stage hands over a [`MinimizationProblem`]: the positive
//! corners (on-set) and, depending on the remainder policy, the remainders as
//! don't-cares. A [`Minimizer`] returns every minimal cover of the on-set.
//!
//! [`QuineMcCluskey`] merges adjacent cubes level by level to find the prime
//! implicants, takes the essential primes, and then searches the reduced
//! prime implicant chart for every smallest cover. Primes are rendered
//! through the `quine-mc_cluskey` crate's [`Term`], where condition `i` is
//! the crate's variable `i`.

use crate::error::{Error, Result};
use quine_mc_cluskey::{Bool, Term};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// State of one condition within an implicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    /// Condition must be present
    Present,
    /// Condition must be absent
    Absent,
    /// Condition does not appear in the term
    Dropped,
}

/// A conjunction over the conditions (product term)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Implicant {
    /// One literal per condition, in truth table column order
    pub literals: Vec<Literal>,
}

impl Implicant {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// Number of conditions that appear in the term
    pub fn literal_count(&self) -> usize {
        self.literals
            .iter()
            .filter(|l| **l != Literal::Dropped)
            .count()
    }

    /// Whether a corner satisfies this term
    pub fn covers(&self, corner: &[bool]) -> bool {
        self.literals
            .iter()
            .zip(corner)
            .all(|(literal, &present)| match literal {
                Literal::Present => present,
                Literal::Absent => !present,
                Literal::Dropped => true,
            })
    }

    /// Fuzzy membership of a case, given its condition memberships
    pub fn membership(&self, memberships: &[f64]) -> f64 {
        self.literals
            .iter()
            .zip(memberships)
            .filter_map(|(literal, &m)| match literal {
                Literal::Present => Some(m),
                Literal::Absent => Some(1.0 - m),
                Literal::Dropped => None,
            })
            .fold(1.0, f64::min)
    }

    /// Term in QCA notation, e.g. `press*~trust`; `1` when every condition is dropped
    pub fn expression(&self, conditions: &[String]) -> String {
        let parts: Vec<String> = self
            .literals
            .iter()
            .zip(conditions)
            .filter_map(|(literal, name)| match literal {
                Literal::Present => Some(name.clone()),
                Literal::Absent => Some(format!("~{}", name)),
                Literal::Dropped => None,
            })
            .collect();
        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join("*")
        }
    }
}

/// Input to a minimizer
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationProblem {
    /// Number of conditions
    pub variables: usize,

    /// Corners that must be covered
    pub on_set: Vec<Vec<bool>>,

    /// Corners that may be covered
    pub dont_care: Vec<Vec<bool>>,
}

impl MinimizationProblem {
    fn check(&self) -> Result<()> {
        for corner in self.on_set.iter().chain(&self.dont_care) {
            if corner.len() != self.variables {
                return Err(Error::Minimization(format!(
                    "corner of width {} in a problem over {} variables",
                    corner.len(),
                    self.variables
                )));
            }
        }
        Ok(())
    }
}

/// A minimal-cover capability
pub trait Minimizer {
    /// Short name for reports and logs
    fn name(&self) -> &'static str;

    /// Every cover of the on-set with the fewest implicants
    ///
    /// An empty on-set yields no covers.
    fn minimize(&self, problem: &MinimizationProblem) -> Result<Vec<Vec<Implicant>>>;
}

/// Exact minimization backed by the `quine-mc_cluskey` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QuineMcCluskey;

/// Terms are `u32` bit masks and expression conversion shifts by the width
const MAX_VARIABLES: usize = 31;

/// Search steps allowed while sizing and listing the smallest covers
const MAX_SEARCH_NODES: usize = 1_000_000;

/// Alternative models reported before giving up
const MAX_MODELS: usize = 4096;

impl Minimizer for QuineMcCluskey {
    fn name(&self) -> &'static str {
        "quine-mccluskey"
    }

    fn minimize(&self, problem: &MinimizationProblem) -> Result<Vec<Vec<Implicant>>> {
        problem.check()?;
        if problem.variables == 0 || problem.variables > MAX_VARIABLES {
            return Err(Error::Minimization(format!(
                "{} variables is outside the supported range 1..={}",
                problem.variables, MAX_VARIABLES
            )));
        }
        if problem.on_set.is_empty() {
            return Ok(Vec::new());
        }

        let on_set: BTreeSet<u32> = problem.on_set.iter().map(|c| mask(c)).collect();
        let mut minterms = on_set.clone();
        minterms.extend(problem.dont_care.iter().map(|c| mask(c)));

        let primes = prime_implicants(&minterms, problem.variables);
        let covers = smallest_covers(&primes, &on_set)?;
        let terms = covers.first().map_or(0, Vec::len);

        let width = problem.variables as u32;
        let mut result = Vec::with_capacity(covers.len());
        for cover in covers {
            let mut implicants = cover
                .into_iter()
                .map(|i| primes[i].to_implicant(width, problem.variables))
                .collect::<Result<Vec<_>>>()?;
            implicants.sort();
            result.push(implicants);
        }
        result.sort();
        result.dedup();

        tracing::debug!(
            primes = primes.len(),
            covers = result.len(),
            terms,
            "minimized"
        );
        Ok(result)
    }
}

/// A product term as bit masks: `value` holds the cared-for bits, `free` the
/// dropped conditions. `value` is always zero on `free` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Cube {
    value: u32,
    free: u32,
}

impl Cube {
    fn covers(self, minterm: u32) -> bool {
        minterm & !self.free == self.value
    }

    fn to_implicant(self, width: u32, variables: usize) -> Result<Implicant> {
        to_implicant(&Term::with_dontcare(self.value, self.free).to_bool_expr(width), variables)
    }
}

/// Every prime implicant of `minterms`, sorted
fn prime_implicants(minterms: &BTreeSet<u32>, variables: usize) -> Vec<Cube> {
    let mut level: HashSet<Cube> = minterms
        .iter()
        .map(|&value| Cube { value, free: 0 })
        .collect();
    let mut primes = Vec::new();

    while !level.is_empty() {
        let mut next = HashSet::new();
        let mut merged = HashSet::new();
        for &cube in &level {
            for bit in (0..variables).map(|i| 1u32 << i) {
                if cube.free & bit != 0 {
                    continue;
                }
                let neighbour = Cube {
                    value: cube.value ^ bit,
                    free: cube.free,
                };
                if level.contains(&neighbour) {
                    next.insert(Cube {
                        value: cube.value & !bit,
                        free: cube.free | bit,
                    });
                    merged.insert(cube);
                }
            }
        }
        primes.extend(level.iter().filter(|c| !merged.contains(*c)).copied());
        level = next;
    }

    primes.sort();
    primes
}

/// Prime implicant chart rows: for each minterm still open, the sorted
/// indices of the primes that cover it
type Rows = Vec<Vec<usize>>;

/// Every set of primes of minimum size that covers `on_set`, as sorted indices
fn smallest_covers(primes: &[Cube], on_set: &BTreeSet<u32>) -> Result<Vec<Vec<usize>>> {
    let mut rows = Vec::with_capacity(on_set.len());
    for &minterm in on_set {
        let row: Vec<usize> = (0..primes.len())
            .filter(|&p| primes[p].covers(minterm))
            .collect();
        if row.is_empty() {
            return Err(Error::Minimization(format!(
                "minterm {} is not covered by any prime implicant",
                minterm
            )));
        }
        rows.push(row);
    }

    let essential: BTreeSet<usize> = rows.iter().filter(|r| r.len() == 1).map(|r| r[0]).collect();
    rows.retain(|row| !row.iter().any(|p| essential.contains(p)));
    let chart = drop_dominating_rows(rows);

    let mut search = CoverSearch::default();
    let size = search.minimum(chart.clone(), chart.len() + 1)?;
    tracing::trace!(
        essential = essential.len(),
        rows = chart.len(),
        size,
        "reduced prime implicant chart"
    );
    search.enumerate(chart, size, &mut Vec::new())?;

    Ok(search
        .found
        .into_iter()
        .map(|mut cover| {
            cover.extend(&essential);
            cover.sort_unstable();
            cover
        })
        .collect())
}

/// Branch and bound over a prime implicant chart
///
/// [`CoverSearch::minimum`] sizes the smallest cover on a chart reduced by
/// dominance. [`CoverSearch::enumerate`] then lists every cover of that size
/// on the unreduced chart, entering a branch only when it still admits one.
/// A prime already tried at a branch point is excluded from its later
/// siblings, so every cover is visited once.
#[derive(Debug, Default)]
struct CoverSearch {
    nodes: usize,
    found: BTreeSet<Vec<usize>>,
}

impl CoverSearch {
    fn tick(&mut self) -> Result<()> {
        self.nodes += 1;
        if self.nodes > MAX_SEARCH_NODES {
            return Err(Error::Minimization(format!(
                "cover search gave up after {} steps",
                MAX_SEARCH_NODES
            )));
        }
        Ok(())
    }

    /// Size of the smallest cover of `rows`, or `bound` when none is smaller
    fn minimum(&mut self, rows: Rows, bound: usize) -> Result<usize> {
        self.tick()?;
        let (rows, taken) = reduce(rows);
        if rows.is_empty() {
            return Ok(taken.min(bound));
        }
        if taken + lower_bound(&rows) >= bound {
            return Ok(bound);
        }

        let mut best = bound;
        let mut tried: Vec<usize> = Vec::new();
        if let Some(row) = rows.iter().min_by_key(|r| r.len()) {
            for &prime in row {
                if let Some(rest) = take(&rows, prime, &tried) {
                    let limit = best.saturating_sub(taken + 1);
                    best = best.min(taken + 1 + self.minimum(rest, limit)?);
                }
                tried.push(prime);
            }
        }
        Ok(best)
    }

    /// Record every cover of `rows` that brings `chosen` to exactly `size` primes
    fn enumerate(&mut self, rows: Rows, size: usize, chosen: &mut Vec<usize>) -> Result<()> {
        self.tick()?;
        if rows.is_empty() {
            let mut cover = chosen.clone();
            cover.sort_unstable();
            self.found.insert(cover);
            if self.found.len() > MAX_MODELS {
                return Err(Error::Minimization(format!(
                    "more than {} covers share the smallest size",
                    MAX_MODELS
                )));
            }
            return Ok(());
        }

        let left = size - chosen.len();
        if left == 0 || self.minimum(rows.clone(), left + 1)? > left {
            return Ok(());
        }

        let mut tried: Vec<usize> = Vec::new();
        if let Some(row) = rows.iter().min_by_key(|r| r.len()) {
            for &prime in row {
                if let Some(rest) = take(&rows, prime, &tried) {
                    chosen.push(prime);
                    let outcome = self.enumerate(rest, size, chosen);
                    chosen.pop();
                    outcome?;
                }
                tried.push(prime);
            }
        }
        Ok(())
    }
}

/// Rows still open once `prime` is chosen, without the `excluded` primes;
/// `None` when some row has no prime left
fn take(rows: &[Vec<usize>], prime: usize, excluded: &[usize]) -> Option<Rows> {
    let mut rest = Vec::with_capacity(rows.len());
    for row in rows.iter().filter(|r| r.binary_search(&prime).is_err()) {
        let left: Vec<usize> = row
            .iter()
            .copied()
            .filter(|p| !excluded.contains(p))
            .collect();
        if left.is_empty() {
            return None;
        }
        rest.push(left);
    }
    Some(rest)
}

/// Essential primes, then row and column dominance, until nothing changes
///
/// Returns the remaining rows and how many primes were taken. This keeps the
/// smallest cover size but not every smallest cover.
fn reduce(mut rows: Rows) -> (Rows, usize) {
    let mut taken = 0;
    loop {
        let essential: BTreeSet<usize> = rows.iter().filter(|r| r.len() == 1).map(|r| r[0]).collect();
        taken += essential.len();
        rows.retain(|row| !row.iter().any(|p| essential.contains(p)));

        let before = rows.len();
        rows = drop_dominating_rows(rows);
        let columns = drop_dominated_columns(&mut rows);
        if essential.is_empty() && rows.len() == before && !columns {
            return (rows, taken);
        }
    }
}

/// Covering a row covers every row whose primes are a superset of it
fn drop_dominating_rows(mut rows: Rows) -> Rows {
    rows.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    let mut kept: Rows = Vec::with_capacity(rows.len());
    for row in rows {
        if !kept.iter().any(|k| is_subset(k, &row)) {
            kept.push(row);
        }
    }
    kept
}

/// Drop primes that reach no row another prime misses; of equals the lowest index stays
fn drop_dominated_columns(rows: &mut Rows) -> bool {
    let mut reach: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (r, row) in rows.iter().enumerate() {
        for &p in row {
            reach.entry(p).or_default().push(r);
        }
    }

    let mut dropped = BTreeSet::new();
    for (&a, rows_a) in &reach {
        let dominated = reach.iter().any(|(&b, rows_b)| {
            b != a
                && !dropped.contains(&b)
                && is_subset(rows_a, rows_b)
                && (rows_a.len() < rows_b.len() || b < a)
        });
        if dominated {
            dropped.insert(a);
        }
    }
    if dropped.is_empty() {
        return false;
    }
    for row in rows.iter_mut() {
        row.retain(|p| !dropped.contains(p));
    }
    true
}

/// Open rows that share no prime each need a prime of their own
fn lower_bound(rows: &[Vec<usize>]) -> usize {
    let mut order: Vec<&Vec<usize>> = rows.iter().collect();
    order.sort_by_key(|r| r.len());
    let mut used = HashSet::new();
    let mut needed = 0;
    for row in order {
        if row.iter().all(|p| !used.contains(p)) {
            needed += 1;
            used.extend(row.iter().copied());
        }
    }
    needed
}

/// Both slices sorted
fn is_subset(small: &[usize], large: &[usize]) -> bool {
    small.iter().all(|p| large.binary_search(p).is_ok())
}

/// Bit `i` set when condition `i` is present
fn mask(corner: &[bool]) -> u32 {
    corner
        .iter()
        .enumerate()
        .filter(|(_, &present)| present)
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

fn to_implicant(expr: &Bool, variables: usize) -> Result<Implicant> {
    let mut literals = vec![Literal::Dropped; variables];
    collect_literals(expr, &mut literals)?;
    Ok(Implicant::new(literals))
}

fn collect_literals(expr: &Bool, literals: &mut [Literal]) -> Result<()> {
    match expr {
        Bool::True => Ok(()),
        Bool::Term(i) => set_literal(literals, *i, Literal::Present),
        Bool::Not(inner) => match inner.as_ref() {
            Bool::Term(i) => set_literal(literals, *i, Literal::Absent),
            other => Err(Error::Minimization(format!(
                "unexpected negated expression {:?} in prime implicant",
                other
            ))),
        },
        Bool::And(terms) => terms.iter().try_for_each(|t| collect_literals(t, literals)),
        other => Err(Error::Minimization(format!(
            "unexpected expression {:?} in prime implicant",
            other
        ))),
    }
}

fn set_literal(literals: &mut [Literal], index: u8, literal: Literal) -> Result<()> {
    let slot = literals.get_mut(index as usize).ok_or_else(|| {
        Error::Minimization(format!("prime implicant refers to unknown variable {}", index))
    })?;
    *slot = literal;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Literal::{Absent as A, Dropped as D, Present as P};

    fn corners(bits: &[&str]) -> Vec<Vec<bool>> {
        bits.iter()
            .map(|s| s.chars().map(|c| c == '1').collect())
            .collect()
    }

    fn problem(variables: usize, on: &[&str], dc: &[&str]) -> MinimizationProblem {
        MinimizationProblem {
            variables,
            on_set: corners(on),
            dont_care: corners(dc),
        }
    }

    #[test]
    fn test_merges_adjacent_corners() {
        // A~B + AB = A
        let covers = QuineMcCluskey.minimize(&problem(2, &["10", "11"], &[])).unwrap();
        assert_eq!(covers, vec![vec![Implicant::new(vec![P, D])]]);
    }

    #[test]
    fn test_or_of_two_conditions() {
        // A~B + ~AB + AB = A + B
        let covers = QuineMcCluskey
            .minimize(&problem(2, &["10", "01", "11"], &[]))
            .unwrap();
        assert_eq!(covers.len(), 1);
        assert_eq!(
            covers[0],
            vec![Implicant::new(vec![P, D]), Implicant::new(vec![D, P])]
        );
    }

    #[test]
    fn test_dont_cares_widen_terms() {
        let without = QuineMcCluskey.minimize(&problem(3, &["110"], &[])).unwrap();
        assert_eq!(without, vec![vec![Implicant::new(vec![P, P, A])]]);

        let with = QuineMcCluskey
            .minimize(&problem(3, &["110"], &["111", "100", "101"]))
            .unwrap();
        assert_eq!(with, vec![vec![Implicant::new(vec![P, D, D])]]);
    }

    #[test]
    fn test_empty_on_set() {
        let covers = QuineMcCluskey.minimize(&problem(2, &[], &["11"])).unwrap();
        assert!(covers.is_empty());
    }

    #[test]
    fn test_full_space_is_tautology() {
        let covers = QuineMcCluskey
            .minimize(&problem(2, &["00", "01", "10", "11"], &[]))
            .unwrap();
        assert_eq!(covers, vec![vec![Implicant::new(vec![D, D])]]);
        assert_eq!(covers[0][0].expression(&["a".into(), "b".into()]), "1");
    }

    #[test]
    fn test_alternative_minimal_covers() {
        // Six corners around a cycle: two covers of three terms each
        let covers = QuineMcCluskey
            .minimize(&problem(3, &["000", "001", "011", "111", "110", "100"], &[]))
            .unwrap();
        assert_eq!(covers.len(), 2);
        assert!(covers.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn test_essential_primes_in_every_cover() {
        // ~a~b only covers 000 and bc only covers 111; both reach 001 and 011
        let covers = QuineMcCluskey
            .minimize(&problem(3, &["000", "001", "011", "111"], &[]))
            .unwrap();
        assert_eq!(
            covers,
            vec![vec![Implicant::new(vec![A, A, D]), Implicant::new(vec![D, P, P])]]
        );
    }

    #[test]
    fn test_prime_implicants_are_canonical() {
        let all: BTreeSet<u32> = (0..8).collect();
        assert_eq!(prime_implicants(&all, 3), vec![Cube { value: 0, free: 0b111 }]);

        let cycle: BTreeSet<u32> = [0b000, 0b001, 0b011, 0b111, 0b110, 0b100].into();
        let primes = prime_implicants(&cycle, 3);
        assert_eq!(primes.len(), 6);
        assert!(primes.iter().all(|c| c.value & c.free == 0));
        assert!(primes.iter().all(|c| c.free.count_ones() == 1));
    }

    #[test]
    fn test_cover_search_finds_every_smallest_cover() {
        // Rows 0..4 in a ring, prime i covers rows i and i+1
        let chart = vec![vec![0, 3], vec![0, 1], vec![1, 2], vec![2, 3]];
        let mut search = CoverSearch::default();
        assert_eq!(search.minimum(chart.clone(), 5).unwrap(), 2);
        search.enumerate(chart, 2, &mut Vec::new()).unwrap();
        assert_eq!(
            search.found.into_iter().collect::<Vec<_>>(),
            vec![vec![0, 2], vec![1, 3]]
        );
    }

    #[test]
    fn test_reduction_keeps_smallest_size() {
        // Prime 2 reaches rows {0, 1, 2}, so primes 0 and 1 are dominated
        let rows = vec![vec![0, 2], vec![1, 2], vec![2, 3], vec![3]];
        let (rest, taken) = reduce(rows);
        assert!(rest.is_empty());
        assert_eq!(taken, 2);
    }

    #[test]
    fn test_dominated_columns_ties_keep_lowest_index() {
        let mut rows = vec![vec![4, 7], vec![4, 7, 9]];
        assert!(drop_dominated_columns(&mut rows));
        assert_eq!(rows, vec![vec![4], vec![4]]);
    }

    #[test]
    fn test_width_mismatch() {
        let err = QuineMcCluskey.minimize(&problem(3, &["10"], &[])).unwrap_err();
        assert!(matches!(err, Error::Minimization(_)));
    }

    #[test]
    fn test_implicant_helpers() {
        let names = vec!["press".to_string(), "trust".to_string(), "growth".to_string()];
        let term = Implicant::new(vec![P, A, D]);
        assert_eq!(term.expression(&names), "press*~trust");
        assert_eq!(term.literal_count(), 2);
        assert!(term.covers(&[true, false, true]));
        assert!(!term.covers(&[true, true, true]));
        assert!((term.membership(&[0.8, 0.3, 0.0]) - 0.7).abs() < 1e-12);
    }
}
