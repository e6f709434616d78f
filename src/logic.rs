//! Propositional building blocks: variables, literals, canonical clauses, and the
//! deduplicating formula, plus the cardinality clause generators.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;

/// A propositional variable, identified by its positive DIMACS magnitude.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Var(u64);

impl Var {
    pub(crate) fn new(magnitude: u64) -> Self {
        Self(magnitude)
    }

    /// The positive integer identifying this variable in the boundary format.
    pub fn magnitude(self) -> u64 {
        self.0
    }

    /// This variable, asserted true.
    pub fn positive(self) -> Lit {
        self.lit(true)
    }

    /// This variable, asserted false.
    pub fn negative(self) -> Lit {
        self.lit(false)
    }

    /// This variable with the given polarity. Polarity flips the rendered sign only, never the
    /// magnitude.
    pub fn lit(self, positive: bool) -> Lit {
        Lit { var: self, positive }
    }
}

/// A variable reference paired with a polarity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Lit {
    pub(crate) var: Var,
    pub(crate) positive: bool,
}

impl Lit {
    /// The variable this literal refers to.
    pub fn var(self) -> Var {
        self.var
    }

    /// Whether this literal asserts its variable true.
    pub fn is_positive(self) -> bool {
        self.positive
    }

    /// The signed integer form used by the boundary format.
    pub fn to_dimacs(self) -> i64 {
        let magnitude = self.var.0 as i64;
        if self.positive { magnitude } else { -magnitude }
    }
}

/// A disjunction of literals, held in canonical (sorted, deduplicated) order so that equal
/// clauses arising from different generation steps compare and hash equal.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    /// Canonicalize `lits` into a clause.
    pub fn new(lits: impl IntoIterator<Item = Lit>) -> Self {
        let mut lits = lits.into_iter().collect_vec();
        lits.sort_unstable();
        lits.dedup();
        Self { lits }
    }

    /// A unit fact.
    pub fn unit(lit: Lit) -> Self {
        Self { lits: vec![lit] }
    }

    /// The literals of this clause, in canonical order.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether this clause has no literals. The empty clause is unsatisfiable.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Whether the assignment which holds exactly the variables in `true_vars` true satisfies
    /// this clause.
    pub fn satisfied_by(&self, true_vars: &HashSet<Var>) -> bool {
        self.lits.iter().any(|lit| lit.positive == true_vars.contains(&lit.var))
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// A conjunction of distinct clauses.
///
/// Backed by an ordered set: insertion deduplicates, and iteration (hence serialization) order
/// is deterministic regardless of generation order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Formula {
    clauses: BTreeSet<Clause>,
}

impl Formula {
    /// An empty formula.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one clause; returns whether it was not already present.
    pub fn insert(&mut self, clause: Clause) -> bool {
        self.clauses.insert(clause)
    }

    /// Number of distinct clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether this formula has no clauses. The empty formula is trivially satisfiable.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterate the clauses in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// The highest variable magnitude appearing in any clause, required by the boundary header.
    pub fn max_var(&self) -> Option<Var> {
        self.clauses.iter().flat_map(|clause| clause.lits().iter().map(|lit| lit.var)).max()
    }

    /// The clauses falsified by the assignment which holds exactly the variables in
    /// `true_vars` true.
    ///
    /// Auditing a known-good solution against a compiled formula this way pinpoints exactly
    /// which emitted constraints are wrong.
    pub fn violations(&self, true_vars: &HashSet<Var>) -> Vec<&Clause> {
        self.clauses.iter().filter(|clause| !clause.satisfied_by(true_vars)).collect_vec()
    }
}

impl Extend<Clause> for Formula {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        self.clauses.extend(iter)
    }
}

impl FromIterator<Clause> for Formula {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self { clauses: iter.into_iter().collect() }
    }
}

pub(crate) fn at_most_one(vars: &[Var]) -> Vec<Vec<Lit>> {
    // no two are true; (!A + !B) * (!A + !C) * ...
    vars.iter()
        .tuple_combinations()
        .map(|(a, b)| vec![a.negative(), b.negative()])
        .collect_vec()
}

pub(crate) fn at_least_one(vars: &[Var]) -> Vec<Lit> {
    // A + B + C + ...
    vars.iter().map(|v| v.positive()).collect_vec()
}

/// Direct encoding of "exactly `k` of `vars` are true": one blocking clause per truth pattern
/// whose true-count differs from `k`.
///
/// The clause for a pattern holds the complement polarity of every variable, so it is falsified
/// by exactly that pattern and no other. Exponential in `vars.len()`, which is bounded by the
/// grid degree (at most 4), not by board size.
pub(crate) fn exactly_k(vars: &[Var], k: usize) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::new();

    for m in 0..=vars.len() {
        if m == k {
            continue;
        }

        for chosen in (0..vars.len()).combinations(m) {
            clauses.push(
                vars.iter()
                    .enumerate()
                    .map(|(i, v)| v.lit(!chosen.contains(&i)))
                    .collect_vec(),
            );
        }
    }

    clauses
}
