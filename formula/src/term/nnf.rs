// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Negation normal form.
//!
//! The result only uses `And`, `Or`, literals, boolean symbols (possibly
//! negated), numeric equalities and arithmetic comparisons. Numeric
//! disequalities become a disjunction of two strict comparisons.

use crate::context::Context;
use crate::syntax::{BinOp, NOp, Term, UOp};

/// Convert a formula to negation normal form. Boolean `Ite`, `Implies`, `Iff`
/// and boolean equalities are expanded; numeric `Ite` inside atoms is left
/// alone (see [`crate::term::purify`]).
pub fn nnf(ctx: &Context, t: &Term) -> Term {
    go(ctx, t, true)
}

fn go(ctx: &Context, t: &Term, positive: bool) -> Term {
    match t {
        Term::Literal(b) => Term::Literal(*b == positive),
        Term::Id(_) => {
            if positive {
                t.clone()
            } else {
                Term::UnaryOp(UOp::Not, Box::new(t.clone()))
            }
        }
        Term::UnaryOp(UOp::Not, arg) => go(ctx, arg, !positive),
        Term::NAryOp(op, args) => {
            let args = args.iter().map(|a| go(ctx, a, positive));
            match (op, positive) {
                (NOp::And, true) | (NOp::Or, false) => Term::and(args),
                (NOp::Or, true) | (NOp::And, false) => Term::or(args),
            }
        }
        Term::BinOp(BinOp::Implies, lhs, rhs) => go(
            ctx,
            &Term::or([Term::not(lhs.as_ref()), rhs.as_ref().clone()]),
            positive,
        ),
        Term::BinOp(BinOp::Iff, lhs, rhs) => iff(ctx, lhs, rhs, positive),
        Term::BinOp(BinOp::Equals, lhs, rhs) if lhs.is_bool(ctx) => iff(ctx, lhs, rhs, positive),
        Term::BinOp(BinOp::Equals, lhs, rhs) => {
            if positive {
                t.clone()
            } else {
                Term::or([Term::lt(lhs.as_ref(), rhs.as_ref()), Term::gt(lhs.as_ref(), rhs.as_ref())])
            }
        }
        Term::BinOp(BinOp::NotEquals, lhs, rhs) => go(
            ctx,
            &Term::BinOp(BinOp::Equals, lhs.clone(), rhs.clone()),
            !positive,
        ),
        Term::NumRel(rel, lhs, rhs) => {
            let rel = if positive { *rel } else { rel.negate() };
            Term::NumRel(rel, lhs.clone(), rhs.clone())
        }
        Term::Ite { cond, then, else_ } => go(
            ctx,
            &Term::or([
                Term::and([cond.as_ref(), then.as_ref()]),
                Term::and([Term::not(cond.as_ref()), else_.as_ref().clone()]),
            ]),
            positive,
        ),
        Term::Num(_) | Term::NumOp(..) | Term::UnaryOp(UOp::Floor, _) => {
            panic!("numeric term {t} in a formula position")
        }
    }
}

fn iff(ctx: &Context, lhs: &Term, rhs: &Term, positive: bool) -> Term {
    let (l, r) = (go(ctx, lhs, true), go(ctx, rhs, true));
    let (nl, nr) = (go(ctx, lhs, false), go(ctx, rhs, false));
    if positive {
        Term::or([Term::and([l, r]), Term::and([nl, nr])])
    } else {
        Term::or([Term::and([l, nr]), Term::and([nl, r])])
    }
}

/// Whether `t` is an atom of negation normal form.
pub fn is_atom(t: &Term) -> bool {
    match t {
        Term::Literal(_) | Term::Id(_) | Term::NumRel(..) => true,
        Term::BinOp(BinOp::Equals, _, _) => true,
        Term::UnaryOp(UOp::Not, arg) => matches!(arg.as_ref(), Term::Id(_)),
        _ => false,
    }
}
