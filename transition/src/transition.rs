// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Transition relations as a guard plus simultaneous assignments, and the
//! algebra over them.
//!
//! A transition `{x ↦ t_x} when g` relates a pre-state to a post-state where
//! each written variable `x` takes the value of `t_x` and every other variable
//! is unchanged, provided that `g` holds. Update terms and the guard range
//! over the pre-state symbols of variables plus auxiliary symbols, which are
//! implicitly existentially quantified (havoc values, phi symbols, post
//! symbols introduced by normalization).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use formula::{
    syntax::Term,
    term::subst::{rename, substitute, Substitution},
};
use itertools::Itertools;
use solver::SolverConf;

use crate::{
    binding::{Var, Vocabulary},
    error::QueryError,
    mbp,
};

/// A transition relation. See the module documentation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    transform: BTreeMap<Var, Term>,
    guard: Term,
}

/// The result of comparing two normalized transitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Equivalence {
    /// The transitions denote the same relation
    Equivalent,
    /// The transitions denote different relations
    NotEquivalent,
    /// The transitions are not both in normalized form over the same
    /// variables, so they cannot be compared by renaming
    NotComparable,
}

/// The result of projecting a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    /// The projected transition
    Sat(Transition),
    /// The transition has no executions
    Unsat,
}

/// A transition as a single formula over pre-state symbols, the post symbols
/// of the tracked variables and auxiliary symbols. Variables that are not
/// tracked are unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionFormula {
    /// The formula
    pub formula: Term,
    /// Each tracked variable with its post symbol
    pub symbols: Vec<(Var, String)>,
}

impl TransitionFormula {
    /// The post symbol of a tracked variable.
    pub fn post_of(&self, var: &Var) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(v, _)| v == var)
            .map(|(_, post)| post.as_str())
    }

    /// Whether `var` is tracked.
    pub fn tracks(&self, var: &Var) -> bool {
        self.post_of(var).is_some()
    }
}

impl Transition {
    /// The assignment `var := t`.
    pub fn assign<T: Into<Term>>(var: &Var, t: T) -> Self {
        Self::parallel_assign([(var.clone(), t.into())])
    }

    /// A simultaneous assignment. Each variable may be assigned once.
    pub fn parallel_assign<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (Var, Term)>,
    {
        let mut transform = BTreeMap::new();
        for (var, t) in assignments {
            if let Some(old) = transform.insert(var.clone(), t) {
                panic!("{var} assigned twice in a parallel assignment (first {old})");
            }
        }
        Self {
            transform,
            guard: Term::true_(),
        }
    }

    /// The transition that only proceeds when `guard` holds and changes
    /// nothing.
    pub fn assume<T: Into<Term>>(guard: T) -> Self {
        Self {
            transform: BTreeMap::new(),
            guard: guard.into(),
        }
    }

    /// Assign arbitrary values to `vars`.
    pub fn havoc<'v, I>(voc: &Vocabulary, vars: I) -> Self
    where
        I: IntoIterator<Item = &'v Var>,
    {
        let transform = vars
            .into_iter()
            .map(|v| (v.clone(), voc.fresh(&format!("havoc_{}", v.name()), v.sort())))
            .collect();
        Self {
            transform,
            guard: Term::true_(),
        }
    }

    /// The empty relation.
    pub fn zero() -> Self {
        Self::assume(Term::false_())
    }

    /// The identity relation.
    pub fn one() -> Self {
        Self::assume(Term::true_())
    }

    /// Whether this is syntactically the empty relation.
    pub fn is_zero(&self) -> bool {
        self.guard == Term::false_()
    }

    /// Whether this is syntactically the identity relation.
    pub fn is_one(&self) -> bool {
        self.guard == Term::true_() && self.transform.is_empty()
    }

    /// The guard.
    pub fn guard(&self) -> &Term {
        &self.guard
    }

    /// The written variables with their update terms.
    pub fn transform(&self) -> &BTreeMap<Var, Term> {
        &self.transform
    }

    /// The update term of `var`, if it is written.
    pub fn get_transform(&self, var: &Var) -> Option<&Term> {
        self.transform.get(var)
    }

    /// Whether `var` is written.
    pub fn mem_transform(&self, var: &Var) -> bool {
        self.transform.contains_key(var)
    }

    /// The value of `var` after the transition: its update term, or the
    /// variable itself if it is not written.
    pub(crate) fn value_of(&self, var: &Var) -> Term {
        self.transform.get(var).cloned().unwrap_or_else(|| var.term())
    }

    /// The same writes under another guard.
    pub(crate) fn with_guard(&self, guard: Term) -> Self {
        Self {
            transform: self.transform.clone(),
            guard,
        }
    }

    /// The written variables.
    pub fn defines(&self) -> Vec<Var> {
        self.transform.keys().cloned().collect()
    }

    /// The variables whose pre-state value the transition reads.
    pub fn uses(&self, voc: &Vocabulary) -> Vec<Var> {
        self.symbols()
            .iter()
            .filter_map(|s| voc.var_of_symbol(s))
            .collect()
    }

    /// The free symbols of the guard and the update terms.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut symbols = self.guard.symbols();
        for t in self.transform.values() {
            symbols.extend(t.symbols());
        }
        symbols
    }

    /// The auxiliary (non-variable) symbols.
    pub(crate) fn aux_symbols(&self, voc: &Vocabulary) -> BTreeSet<String> {
        self.symbols()
            .into_iter()
            .filter(|s| !voc.is_var(s))
            .collect()
    }

    /// Rename symbols in the guard and the update terms.
    pub(crate) fn rename_symbols(&self, renaming: &HashMap<String, String>) -> Self {
        Self {
            transform: self
                .transform
                .iter()
                .map(|(v, t)| (v.clone(), rename(t, renaming)))
                .collect(),
            guard: rename(&self.guard, renaming),
        }
    }

    /// Rename the given symbols to fresh ones.
    pub(crate) fn refresh<'s, I>(&self, voc: &Vocabulary, symbols: I) -> Self
    where
        I: IntoIterator<Item = &'s String>,
    {
        let renaming: HashMap<String, String> = symbols
            .into_iter()
            .map(|s| (s.clone(), voc.ctx().fresh_name(s, voc.sort_of(s))))
            .collect();
        self.rename_symbols(&renaming)
    }

    /// Rename every auxiliary symbol to a fresh one.
    pub fn skolemize(&self, voc: &Vocabulary) -> Self {
        self.refresh(voc, &self.aux_symbols(voc))
    }

    /// Sequential composition: `other` after `self`.
    pub fn mul(&self, other: &Transition, voc: &Vocabulary) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mine = self.aux_symbols(voc);
        let shared: Vec<String> = other
            .aux_symbols(voc)
            .into_iter()
            .filter(|s| mine.contains(s))
            .collect();
        let other = other.refresh(voc, &shared);
        let sigma: Substitution = self
            .transform
            .iter()
            .map(|(v, t)| (v.name().to_string(), t.clone()))
            .collect();
        let mut transform = self.transform.clone();
        for (v, t) in &other.transform {
            transform.insert(v.clone(), substitute(t, &sigma));
        }
        Self {
            transform,
            guard: Term::and([self.guard.clone(), substitute(&other.guard, &sigma)]),
        }
    }

    /// Merge the transforms of two transitions. Variables on which they
    /// disagree get a fresh phi symbol, with its defining equation added to
    /// each side's guard.
    fn phi_merge(&self, other: &Transition, voc: &Vocabulary) -> (Term, Term, BTreeMap<Var, Term>) {
        let mut left = vec![self.guard.clone()];
        let mut right = vec![other.guard.clone()];
        let mut transform = BTreeMap::new();
        let vars: BTreeSet<&Var> = self.transform.keys().chain(other.transform.keys()).collect();
        for v in vars {
            let (l, r) = (self.value_of(v), other.value_of(v));
            if l == r {
                transform.insert(v.clone(), l);
                continue;
            }
            let phi = voc.fresh(&format!("phi_{}", v.name()), v.sort());
            left.push(Term::equals(&phi, l));
            right.push(Term::equals(&phi, r));
            transform.insert(v.clone(), phi);
        }
        (Term::and(left), Term::and(right), transform)
    }

    /// Union of two relations.
    pub fn add(&self, other: &Transition, voc: &Vocabulary) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (left, right, transform) = self.phi_merge(other, voc);
        Self {
            transform,
            guard: Term::or([left, right]),
        }
    }

    /// Intersection of two relations. Auxiliary symbols shared by the two
    /// sides are renamed apart first.
    pub fn conjunct(&self, other: &Transition, voc: &Vocabulary) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mine = self.aux_symbols(voc);
        let shared: Vec<String> = other
            .aux_symbols(voc)
            .into_iter()
            .filter(|s| mine.contains(s))
            .collect();
        let other = other.refresh(voc, &shared);
        let (left, right, transform) = self.phi_merge(&other, voc);
        Self {
            transform,
            guard: Term::and([left, right]),
        }
    }

    /// Keep only the variables satisfying `pred`: other writes are dropped
    /// and reads of other variables become reads of fresh opaque symbols.
    pub fn exists<F>(&self, voc: &Vocabulary, pred: F) -> Self
    where
        F: Fn(&Var) -> bool,
    {
        let kept = Self {
            transform: self
                .transform
                .iter()
                .filter(|(v, _)| pred(v))
                .map(|(v, t)| (v.clone(), t.clone()))
                .collect(),
            guard: self.guard.clone(),
        };
        let hidden: Vec<String> = kept
            .uses(voc)
            .into_iter()
            .filter(|v| !pred(v))
            .map(|v| v.name().to_string())
            .collect();
        kept.refresh(voc, &hidden)
    }

    /// The transition in normalized form over `vars`: each of them is written
    /// with a bare post symbol constrained by the guard. Writes that already
    /// are bare post symbols are kept.
    fn normalize<'v, I>(&self, voc: &Vocabulary, vars: I) -> Self
    where
        I: IntoIterator<Item = &'v Var>,
    {
        let bare = self.post_symbols(voc).unwrap_or_default();
        let mut guard = vec![self.guard.clone()];
        let mut transform = BTreeMap::new();
        for v in vars {
            if let Some(post) = bare.get(v) {
                transform.insert(v.clone(), Term::id(post));
                continue;
            }
            let post = voc.fresh(&format!("{}'", v.name()), v.sort());
            guard.push(Term::equals(&post, self.value_of(v)));
            transform.insert(v.clone(), post);
        }
        Self {
            transform,
            guard: Term::and(guard),
        }
    }

    /// The post symbols of a transition in normalized form: every write is a
    /// distinct non-variable symbol that occurs in no other update term.
    /// `None` if the transition is not normalized.
    fn post_symbols(&self, voc: &Vocabulary) -> Option<BTreeMap<&Var, &str>> {
        let mut posts = BTreeMap::new();
        for (v, t) in &self.transform {
            let post = t.as_id().filter(|s| !voc.is_var(s))?;
            posts.insert(v, post);
        }
        let distinct = posts.values().all_unique();
        distinct.then_some(posts)
    }

    /// Compare two transitions in normalized form by renaming the post
    /// symbols of `self` to those of `other`.
    pub fn equiv(
        &self,
        other: &Transition,
        voc: &Vocabulary,
        conf: &SolverConf,
    ) -> Result<Equivalence, QueryError> {
        let (Some(mine), Some(theirs)) = (self.post_symbols(voc), other.post_symbols(voc)) else {
            return Ok(Equivalence::NotComparable);
        };
        if !mine.keys().eq(theirs.keys()) {
            return Ok(Equivalence::NotComparable);
        }
        let renaming: HashMap<String, String> = mine
            .iter()
            .map(|(v, post)| (post.to_string(), theirs[v].to_string()))
            .collect();
        let guard = rename(&self.guard, &renaming);
        let differ = Term::not(Term::iff(guard, &other.guard));
        let equivalence = if QueryError::sat(conf.check(voc.ctx(), &differ)?)? {
            Equivalence::NotEquivalent
        } else {
            Equivalence::Equivalent
        };
        Ok(equivalence)
    }

    /// Whether two transitions denote the same relation.
    ///
    /// Besides syntactic equality and a semantic check after normalization,
    /// the zero rule applies: the empty relation equals any transition whose
    /// guard is unsatisfiable.
    pub fn equal(
        &self,
        other: &Transition,
        voc: &Vocabulary,
        conf: &SolverConf,
    ) -> Result<bool, QueryError> {
        if self == other {
            return Ok(true);
        }
        for (zero, t) in [(self, other), (other, self)] {
            if zero.is_zero() {
                return Ok(!QueryError::sat(conf.check(voc.ctx(), &t.guard)?)?);
            }
        }
        let vars: BTreeSet<&Var> = self.transform.keys().chain(other.transform.keys()).collect();
        let left = self.normalize(voc, vars.iter().copied());
        let right = other.normalize(voc, vars.iter().copied());
        Ok(left.equiv(&right, voc, conf)? == Equivalence::Equivalent)
    }

    /// The transition as a formula over pre-state symbols and the canonical
    /// post symbols of the written variables.
    pub fn to_transition_formula(&self, voc: &Vocabulary) -> TransitionFormula {
        // auxiliary symbols that happen to be canonical post symbols would be
        // captured by the equations below
        let taken: Vec<String> = self
            .aux_symbols(voc)
            .into_iter()
            .filter(|s| voc.var_of_post(s).is_some())
            .collect();
        let tr = self.refresh(voc, &taken);
        let mut conjuncts = vec![tr.guard.clone()];
        let mut symbols = vec![];
        for (v, t) in &tr.transform {
            let post = voc.post_symbol(v);
            conjuncts.push(Term::equals(Term::id(&post), t));
            symbols.push((v.clone(), post));
        }
        TransitionFormula {
            formula: Term::and(conjuncts),
            symbols,
        }
    }

    /// The transition in normalized form whose guard is `tf.formula`.
    pub fn of_transition_formula(tf: &TransitionFormula) -> Self {
        Self {
            transform: tf
                .symbols
                .iter()
                .map(|(v, post)| (v.clone(), Term::id(post)))
                .collect(),
            guard: tf.formula.clone(),
        }
    }

    /// The strongest postcondition of `pre`, a formula over variable symbols.
    pub fn post_image(&self, pre: &Term, voc: &Vocabulary, conf: &SolverConf) -> Result<Term, QueryError> {
        let tf = self.to_transition_formula(voc);
        let posts: HashMap<String, String> = tf
            .symbols
            .iter()
            .map(|(v, post)| (post.clone(), v.name().to_string()))
            .collect();
        let formula = Term::and([pre.clone(), tf.formula.clone()]);
        let keep = |s: &str| {
            posts.contains_key(s) || voc.var_of_symbol(s).is_some_and(|v| !self.mem_transform(&v))
        };
        let image = mbp::project(voc.ctx(), conf, &formula, keep)?;
        Ok(rename(&image, &posts))
    }

    /// The pre-states from which some execution reaches `post`, a formula over
    /// variable symbols.
    pub fn pre_image(&self, post: &Term, voc: &Vocabulary, conf: &SolverConf) -> Result<Term, QueryError> {
        let tf = self.to_transition_formula(voc);
        let primed: HashMap<String, String> = tf
            .symbols
            .iter()
            .map(|(v, post)| (v.name().to_string(), post.clone()))
            .collect();
        let formula = Term::and([tf.formula.clone(), rename(post, &primed)]);
        mbp::project(voc.ctx(), conf, &formula, |s| voc.is_var(s))
    }

    /// Project onto the variables satisfying `pred`, in normalized form: the
    /// guard relates their pre- and post-state values and nothing else.
    pub fn project_mbp<F>(&self, pred: F, voc: &Vocabulary, conf: &SolverConf) -> Result<Projection, QueryError>
    where
        F: Fn(&Var) -> bool,
    {
        let tf = self.to_transition_formula(voc);
        let tracked: Vec<(Var, String)> = tf
            .symbols
            .iter()
            .filter(|(v, _)| pred(v))
            .cloned()
            .collect();
        let posts: BTreeSet<&str> = tracked.iter().map(|(_, post)| post.as_str()).collect();
        let keep = |s: &str| posts.contains(s) || voc.var_of_symbol(s).is_some_and(|v| pred(&v));
        let guard = mbp::project(voc.ctx(), conf, &tf.formula, keep)?;
        if guard == Term::false_() {
            return Ok(Projection::Unsat);
        }
        Ok(Projection::Sat(Self::of_transition_formula(&TransitionFormula {
            formula: guard,
            symbols: tracked,
        })))
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let writes = self
            .transform
            .iter()
            .map(|(v, t)| format!("{v} := {t}"))
            .join(", ");
        if writes.is_empty() {
            write!(f, "skip")?;
        } else {
            write!(f, "{writes}")?;
        }
        write!(f, " when {}", self.guard)
    }
}

/// Whether `t` is unsatisfiable.
pub(crate) fn is_unsat(voc: &Vocabulary, conf: &SolverConf, t: &Term) -> Result<bool, QueryError> {
    Ok(!QueryError::sat(conf.check(voc.ctx(), t)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::{rat, Sort};

    fn setup() -> (Vocabulary, SolverConf, Var, Var) {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        let y = voc.var("y", Sort::Int);
        (voc, SolverConf::native(), x, y)
    }

    /// Whether the relations of two transitions are the same, as a test
    /// helper that expects a definite answer.
    fn same(a: &Transition, b: &Transition, voc: &Vocabulary, conf: &SolverConf) -> bool {
        a.equal(b, voc, conf).unwrap()
    }

    #[test]
    fn test_display() {
        let (voc, _, x, y) = setup();
        let tr = Transition::assign(&x, Term::add(&x, 1)).mul(
            &Transition::assume(Term::lt(&y, 10)),
            &voc,
        );
        insta::assert_snapshot!(tr.to_string(), @"x := x + 1 when y < 10");
        insta::assert_snapshot!(Transition::one().to_string(), @"skip when true");
    }

    #[test]
    fn test_identity_laws() {
        let (voc, conf, x, y) = setup();
        let tr = Transition::parallel_assign([(x.clone(), Term::add(&x, &y)), (y.clone(), Term::int(0))])
            .mul(&Transition::assume(Term::gt(&x, 0)), &voc);
        let one = Transition::one();
        let zero = Transition::zero();
        assert!(same(&one.mul(&tr, &voc), &tr, &voc, &conf));
        assert!(same(&tr.mul(&one, &voc), &tr, &voc, &conf));
        assert!(zero.mul(&tr, &voc).is_zero());
        assert!(tr.mul(&zero, &voc).is_zero());
        assert_eq!(zero.add(&tr, &voc), tr);
        assert_eq!(tr.add(&zero, &voc), tr);
        assert!(tr.conjunct(&zero, &voc).is_zero());
    }

    #[test]
    fn test_mul_substitutes_and_overrides() {
        let (voc, _, x, y) = setup();
        let a = Transition::assign(&x, Term::add(&x, 1));
        let b = Transition::parallel_assign([(x.clone(), Term::mul(2, &x)), (y.clone(), x.term())])
            .mul(&Transition::assume(Term::gt(&x, 5)), &voc);
        let ab = a.mul(&b, &voc);
        assert_eq!(ab.get_transform(&x), Some(&Term::mul(2, Term::add(&x, 1))));
        assert_eq!(ab.get_transform(&y), Some(&Term::add(&x, 1)));
        assert_eq!(ab.defines(), vec![x.clone(), y.clone()]);
        assert_eq!(ab.uses(&voc), vec![x]);
    }

    #[test]
    fn test_mul_renames_shared_aux() {
        let (voc, _, x, _) = setup();
        let h = Transition::havoc(&voc, [&x]);
        let hh = h.mul(&h, &voc);
        // the second havoc must not reuse the first one's value
        let aux: BTreeSet<String> = hh.symbols();
        assert_eq!(aux.len(), 1);
        assert_ne!(hh.get_transform(&x), h.get_transform(&x));
    }

    #[test]
    fn test_round_trip() {
        let (voc, conf, x, _) = setup();
        let tr = Transition::assign(&x, 0)
            .mul(&Transition::assign(&x, Term::add(&x, 1)), &voc)
            .mul(&Transition::assume(Term::equals(&x, 1)), &voc);
        assert!(same(&tr, &Transition::assign(&x, 1), &voc, &conf));
        assert!(!same(&tr, &Transition::assign(&x, 2), &voc, &conf));
    }

    #[test]
    fn test_phi_merge() {
        let (voc, conf, x, _) = setup();
        let tr = Transition::assign(&x, 1).add(&Transition::assign(&x, 2), &voc);
        let tf = tr.to_transition_formula(&voc);
        let post = Term::id(tf.post_of(&x).unwrap());
        // x' = 1 and x' = 2 are possible, nothing else
        for (value, possible) in [(1, true), (2, true), (3, false)] {
            let t = Term::and([tf.formula.clone(), Term::equals(&post, value)]);
            assert_eq!(!is_unsat(&voc, &conf, &t).unwrap(), possible, "x' = {value}");
        }
        // agreeing writes need no phi
        let same_write = Transition::assign(&x, 1).add(&Transition::assign(&x, 1), &voc);
        assert_eq!(same_write.get_transform(&x), Some(&Term::int(1)));
    }

    #[test]
    fn test_conjunct() {
        let (voc, conf, x, y) = setup();
        let a = Transition::assume(Term::gt(&x, 0)).mul(&Transition::assign(&x, Term::add(&x, 1)), &voc);
        let b = Transition::assume(Term::lt(&x, 5)).mul(&Transition::assign(&x, Term::add(&x, 1)), &voc);
        let expected = Transition::assume(Term::and([Term::gt(&x, 0), Term::lt(&x, 5)]))
            .mul(&Transition::assign(&x, Term::add(&x, 1)), &voc);
        assert!(same(&a.conjunct(&b, &voc), &expected, &voc, &conf));
        // disagreeing writes cannot both happen
        let c = a.mul(&Transition::assign(&y, 1), &voc);
        let d = b.mul(&Transition::assign(&y, 2), &voc);
        assert!(same(&c.conjunct(&d, &voc), &Transition::zero(), &voc, &conf));
    }

    #[test]
    fn test_zero_rule() {
        let (voc, conf, x, _) = setup();
        let empty = Transition::assign(&x, 3).mul(
            &Transition::assume(Term::and([Term::gt(&x, 5), Term::lt(&x, 5)])),
            &voc,
        );
        assert!(!empty.is_zero());
        assert!(Transition::zero().equal(&empty, &voc, &conf).unwrap());
        assert!(empty.equal(&Transition::zero(), &voc, &conf).unwrap());
        assert!(!Transition::zero()
            .equal(&Transition::assign(&x, 3), &voc, &conf)
            .unwrap());
    }

    #[test]
    fn test_equiv_requires_normalized() {
        let (voc, conf, x, _) = setup();
        let a = Transition::assign(&x, 1);
        assert_eq!(
            a.equiv(&a, &voc, &conf).unwrap(),
            Equivalence::NotComparable
        );
        let p = voc.fresh("p", Sort::Int);
        let q = voc.fresh("q", Sort::Int);
        let na = Transition {
            transform: [(x.clone(), p.clone())].into_iter().collect(),
            guard: Term::equals(&p, Term::add(&x, 1)),
        };
        let nb = Transition {
            transform: [(x.clone(), q.clone())].into_iter().collect(),
            guard: Term::equals(Term::sub(&q, 1), &x),
        };
        assert_eq!(na.equiv(&nb, &voc, &conf).unwrap(), Equivalence::Equivalent);
        let nc = Transition {
            transform: [(x.clone(), q.clone())].into_iter().collect(),
            guard: Term::equals(&q, &x),
        };
        assert_eq!(
            na.equiv(&nc, &voc, &conf).unwrap(),
            Equivalence::NotEquivalent
        );
    }

    #[test]
    fn test_exists() {
        let (voc, _, x, y) = setup();
        let tr = Transition::assume(Term::gt(&y, 0)).mul(
            &Transition::parallel_assign([(x.clone(), Term::add(&x, &y)), (y.clone(), Term::int(0))]),
            &voc,
        );
        let only_x = tr.exists(&voc, |v| v == &x);
        assert_eq!(only_x.defines(), vec![x.clone()]);
        assert_eq!(only_x.uses(&voc), vec![x.clone()]);
        // the hidden read of y is one opaque symbol
        assert_eq!(only_x.symbols().len(), 2);
    }

    #[test]
    fn test_transition_formula_round_trip() {
        let (voc, conf, x, y) = setup();
        let tr = Transition::assign(&x, Term::add(&x, &y))
            .mul(&Transition::assume(Term::lt(&x, 10)), &voc);
        let tf = tr.to_transition_formula(&voc);
        assert_eq!(tf.symbols, vec![(x.clone(), "x'".to_string())]);
        assert!(tf.tracks(&x) && !tf.tracks(&y));
        let back = Transition::of_transition_formula(&tf);
        assert!(same(&back, &tr, &voc, &conf));
        // a second conversion must not capture the x' already in the guard
        let tf2 = back.to_transition_formula(&voc);
        let wrong = Term::and([tf2.formula, Term::not_equals(Term::id("x'"), Term::add(&x, &y))]);
        assert!(is_unsat(&voc, &conf, &wrong).unwrap());
    }

    #[test]
    fn test_images() {
        let (voc, conf, x, y) = setup();
        let tr = Transition::assign(&x, Term::add(&x, 1)).mul(&Transition::assume(Term::lt(&x, 10)), &voc);
        let pre = Term::and([Term::leq(0, &x), Term::leq(&x, 3), Term::equals(&y, 7)]);
        let post = tr.post_image(&pre, &voc, &conf).unwrap();
        let expected = Term::and([Term::leq(1, &x), Term::leq(&x, 4), Term::equals(&y, 7)]);
        assert!(is_unsat(&voc, &conf, &Term::not(Term::iff(post, expected))).unwrap());

        let bad = Term::geq(&x, 9);
        let pre = tr.pre_image(&bad, &voc, &conf).unwrap();
        assert!(is_unsat(&voc, &conf, &Term::not(Term::iff(pre, Term::equals(&x, 8)))).unwrap());
        assert_eq!(
            tr.pre_image(&Term::geq(&x, 11), &voc, &conf).unwrap(),
            Term::false_()
        );
    }

    #[test]
    fn test_project_mbp() {
        let (voc, conf, x, y) = setup();
        let tr = Transition::assume(Term::and([Term::gt(&y, 0), Term::lt(&y, 3)])).mul(
            &Transition::parallel_assign([(x.clone(), Term::add(&x, &y)), (y.clone(), Term::add(&y, 1))]),
            &voc,
        );
        let Projection::Sat(p) = tr.project_mbp(|v| v == &x, &voc, &conf).unwrap() else {
            panic!("projection should be satisfiable");
        };
        assert_eq!(p.defines(), vec![x.clone()]);
        assert!(p.symbols().iter().all(|s| s == "x" || s == "x'"));
        // every execution of tr is an execution of the projection
        let tf = tr.to_transition_formula(&voc);
        let t = Term::and([tf.formula, Term::not(p.guard())]);
        assert!(is_unsat(&voc, &conf, &t).unwrap());
        // and x' - x is between 1 and 2
        let step = Term::sub(Term::id("x'"), &x);
        for (d, possible) in [(rat(1), true), (rat(2), true), (rat(3), false)] {
            let t = Term::and([p.guard().clone(), Term::equals(step.clone(), Term::Num(d.clone()))]);
            assert_eq!(!is_unsat(&voc, &conf, &t).unwrap(), possible, "step {d}");
        }
        let empty = Transition::assume(Term::and([Term::gt(&y, 0), Term::lt(&y, 0)]));
        assert_eq!(
            empty.project_mbp(|v| v == &x, &voc, &conf).unwrap(),
            Projection::Unsat
        );
    }
}
