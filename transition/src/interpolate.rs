// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Path queries: sequence interpolants, counterexample states, Hoare triples
//! and contextualization of a transition between a prefix and a suffix.
//!
//! A path is encoded in SSA form with a [`Subscript`] table. Update terms
//! become hard equations between indexed symbols; each top-level conjunct of
//! a guard is guarded by an indicator literal so that the unsat core tells
//! which conjuncts a refutation needs. Interpolants are then computed
//! backward as negated pre-images through the segments restricted to those
//! conjuncts.

use std::collections::{BTreeSet, HashMap};

use formula::{
    semantics::Model,
    syntax::{Sort, Term},
    term::{nnf::nnf, subst::rename},
};
use solver::{SatResp, SolverConf, SolverError};

use crate::{
    binding::Vocabulary,
    error::QueryError,
    mbp,
    subscript::Subscript,
    transition::{Projection, Transition, TransitionFormula},
};

/// The result of [`interpolate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpolationResult {
    /// One interpolant per segment; the last is the postcondition
    Valid(Vec<Term>),
    /// Some execution of the path violates the postcondition
    Invalid,
    /// The solver could not decide
    Unknown(String),
}

/// The result of [`extrapolate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtrapolationResult {
    /// One interpolant per segment; the last is the postcondition
    Valid(Vec<Term>),
    /// The states of an execution violating the postcondition, starting with
    /// the initial state
    Invalid(Vec<Model>),
    /// The solver could not decide
    Unknown(String),
}

/// The result of [`valid_triple`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validity {
    /// The triple holds
    Valid,
    /// Some execution violates the triple
    Invalid,
    /// The solver could not decide
    Unknown(String),
}

enum Outcome {
    Refuted(Vec<Term>),
    Counterexample(Vec<Model>),
    Unknown(String),
}

/// Turn an unknown answer of a projection into an outcome.
fn lift<T>(r: Result<T, QueryError>) -> Result<Result<T, String>, SolverError> {
    match r {
        Ok(t) => Ok(Ok(t)),
        Err(QueryError::Unknown(reason)) => Ok(Err(reason)),
        Err(QueryError::Solver(e)) => Err(e),
    }
}

/// Check `pre ∧ path ∧ ¬post`. When it is unsatisfiable and `interpolants` is
/// set, also compute the sequence interpolants.
fn check_path(
    voc: &Vocabulary,
    conf: &SolverConf,
    pre: &Term,
    path: &[Transition],
    post: &Term,
    interpolants: bool,
) -> Result<Outcome, SolverError> {
    let ctx = voc.ctx();
    let segments: Vec<Transition> = path.iter().map(|t| t.skolemize(voc)).collect();
    let mut table = Subscript::new(voc);
    let mut solver = conf.solver(ctx)?;
    let initial = table.read(pre);
    solver.assert(&initial)?;
    let mut indicators = vec![];
    let mut origin: HashMap<String, (usize, usize)> = HashMap::new();
    // the full encoding of each segment, for checking interpolants afterwards
    let mut encoded = vec![];
    for (i, segment) in segments.iter().enumerate() {
        let conjuncts: Vec<Term> = segment
            .guard()
            .conjuncts()
            .iter()
            .map(|c| table.read(c))
            .collect();
        let (_, equations) = table.step(segment);
        for eq in &equations {
            solver.assert(eq)?;
        }
        encoded.push(Term::and(equations.into_iter().chain(conjuncts.iter().cloned())));
        for (j, c) in conjuncts.into_iter().enumerate() {
            let ind = ctx.fresh_name(&format!("ind@{}.{j}", i + 1), Sort::Bool);
            solver.assert(&Term::implies(Term::id(&ind), c))?;
            indicators.push(Term::id(&ind));
            origin.insert(ind, (i, j));
        }
    }
    solver.assert(&Term::not(table.read(post)))?;
    match solver.check_sat(&indicators)? {
        SatResp::Sat => {
            let model = solver.get_model()?;
            let states = (0..=segments.len()).map(|i| table.state(&model, i)).collect();
            return Ok(Outcome::Counterexample(states));
        }
        SatResp::Unknown(reason) => return Ok(Outcome::Unknown(reason)),
        SatResp::Unsat => (),
    }
    if !interpolants || segments.is_empty() {
        return Ok(Outcome::Refuted(vec![]));
    }
    let core = solver.get_unsat_core()?;
    let mut needed = vec![BTreeSet::new(); segments.len()];
    for t in &core {
        let Some((i, j)) = t.as_id().and_then(|s| origin.get(s)) else {
            panic!("unsat core element {t} is not an indicator");
        };
        needed[*i].insert(*j);
    }
    log::debug!("path refuted with {} of {} guard conjuncts", core.len(), indicators.len());

    let mut itps = vec![post.clone()];
    let mut bad = Term::not(post);
    for i in (1..segments.len()).rev() {
        let segment = &segments[i];
        let kept = segment
            .guard()
            .conjuncts()
            .into_iter()
            .enumerate()
            .filter(|(j, _)| needed[i].contains(j))
            .map(|(_, c)| c);
        let restricted = segment.with_guard(Term::and(kept));
        bad = match lift(restricted.pre_image(&bad, voc, conf))? {
            Ok(bad) => bad,
            Err(reason) => return Ok(Outcome::Unknown(reason)),
        };
        itps.push(nnf(ctx, &Term::not(&bad)));
    }
    itps.reverse();

    // Projection through nonlinear or mixed integer/real constraints may
    // over-approximate, so each interpolant is checked against its prefix.
    let mut prefix = vec![initial];
    for (i, itp) in itps.iter().enumerate().take(segments.len() - 1) {
        prefix.push(encoded[i].clone());
        let query = Term::and(prefix.iter().cloned().chain([Term::not(table.read_at(itp, i + 1))]));
        match conf.check(ctx, &query)? {
            SatResp::Unsat => (),
            SatResp::Sat => {
                return Ok(Outcome::Unknown(format!(
                    "interpolant {} is not implied by the path prefix: {itp}",
                    i + 1
                )))
            }
            SatResp::Unknown(reason) => return Ok(Outcome::Unknown(reason)),
        }
    }
    Ok(Outcome::Refuted(itps))
}

/// Sequence interpolants for a path and a postcondition: if every execution
/// of `path` ends in a state satisfying `post`, formulas `itp_1 .. itp_n`
/// over variable symbols such that each prefix `path[..i]` leads only to
/// states satisfying `itp_i`, each `itp_i` followed by `path[i]` leads only to
/// states satisfying `itp_{i+1}`, and `itp_n = post`.
pub fn interpolate(
    voc: &Vocabulary,
    conf: &SolverConf,
    path: &[Transition],
    post: &Term,
) -> Result<InterpolationResult, SolverError> {
    Ok(match check_path(voc, conf, &Term::true_(), path, post, true)? {
        Outcome::Refuted(itps) => InterpolationResult::Valid(itps),
        Outcome::Counterexample(_) => InterpolationResult::Invalid,
        Outcome::Unknown(reason) => InterpolationResult::Unknown(reason),
    })
}

/// Like [`interpolate`], but an invalid path comes with the states of a
/// violating execution.
pub fn extrapolate(
    voc: &Vocabulary,
    conf: &SolverConf,
    path: &[Transition],
    post: &Term,
) -> Result<ExtrapolationResult, SolverError> {
    Ok(match check_path(voc, conf, &Term::true_(), path, post, true)? {
        Outcome::Refuted(itps) => ExtrapolationResult::Valid(itps),
        Outcome::Counterexample(states) => ExtrapolationResult::Invalid(states),
        Outcome::Unknown(reason) => ExtrapolationResult::Unknown(reason),
    })
}

/// Whether every execution of `path` from a state satisfying `pre` ends in a
/// state satisfying `post`.
pub fn valid_triple(
    voc: &Vocabulary,
    conf: &SolverConf,
    pre: &Term,
    path: &[Transition],
    post: &Term,
) -> Result<Validity, SolverError> {
    Ok(match check_path(voc, conf, pre, path, post, false)? {
        Outcome::Refuted(_) => Validity::Valid,
        Outcome::Counterexample(_) => Validity::Invalid,
        Outcome::Unknown(reason) => Validity::Unknown(reason),
    })
}

/// Restrict `t` to the executions that are reachable through `before` and
/// can continue with `after`. The result is in normalized form over the
/// variables `t` writes.
pub fn contextualize(
    voc: &Vocabulary,
    conf: &SolverConf,
    before: &Transition,
    t: &Transition,
    after: &Transition,
) -> Result<Projection, QueryError> {
    let mut table = Subscript::new(voc);
    let mut conjuncts = vec![];
    for segment in [before, t, after] {
        let (guard, equations) = table.step(&segment.skolemize(voc));
        conjuncts.push(guard);
        conjuncts.extend(equations);
    }
    let mut renaming: HashMap<String, String> = HashMap::new();
    for v in voc.vars() {
        if let Some(pre) = table.symbol_at(&v, 1) {
            renaming.insert(pre.to_string(), v.name().to_string());
        }
    }
    let mut symbols = vec![];
    for v in t.defines() {
        if let Some(post) = table.symbol_at(&v, 2) {
            let name = voc.post_symbol(&v);
            renaming.insert(post.to_string(), name.clone());
            symbols.push((v, name));
        }
    }
    let formula = Term::and(conjuncts);
    let projected = mbp::project(voc.ctx(), conf, &formula, |s| renaming.contains_key(s))?;
    if projected == Term::false_() {
        return Ok(Projection::Unsat);
    }
    let formula = rename(&projected, &renaming);
    Ok(Projection::Sat(Transition::of_transition_formula(&TransitionFormula {
        formula,
        symbols,
    })))
}
