// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Elimination of if-then-else, floor, integer division and modulus.
//!
//! Numeric `Ite` is lifted to the boolean level by case splitting the atom it
//! occurs in. `floor(t)`, `t div c` and `t mod c` (for a nonzero numeral `c`)
//! are replaced by fresh integer symbols constrained by their defining bounds.
//! Division by a non-constant `d` introduces a fresh quotient (and, for `div`
//! and `mod`, a fresh remainder) defined by `d = 0 ∨ t = d·q + r` with the
//! remainder bounds; when `d` is zero they are unconstrained.

use std::collections::HashMap;

use num_traits::{Signed, Zero};

use crate::context::Context;
use crate::syntax::{BinOp, NumOp, Rat, Sort, Term, UOp};

/// The result of purification.
#[derive(Debug, Clone)]
pub struct Purified {
    /// The purified formula, including the defining constraints of the fresh
    /// symbols.
    pub formula: Term,
    /// Symbols introduced by purification. Except under division by zero
    /// they are functionally determined by the other symbols, so
    /// existentially quantifying them preserves the meaning of the input
    /// formula.
    pub fresh: Vec<String>,
}

/// Purify a formula. See the module documentation.
pub fn purify(ctx: &Context, t: &Term) -> Purified {
    let lifted = lift_ite(ctx, t);
    let mut purifier = Purifier {
        ctx,
        defs: vec![],
        fresh: vec![],
        quotients: HashMap::new(),
        divisions: HashMap::new(),
        floors: HashMap::new(),
    };
    let body = purifier.formula(&lifted);
    let mut conjuncts = vec![body];
    conjuncts.append(&mut purifier.defs);
    Purified {
        formula: Term::and(conjuncts),
        fresh: purifier.fresh,
    }
}

/// Split the first numeric `Ite` (in pre-order) out of a numeric term,
/// returning its condition and the term with the `Ite` replaced by each
/// branch.
fn split_ite(t: &Term) -> Option<(Term, Term, Term)> {
    match t {
        Term::Ite { cond, then, else_ } => {
            Some((cond.as_ref().clone(), then.as_ref().clone(), else_.as_ref().clone()))
        }
        Term::UnaryOp(op, arg) => split_ite(arg).map(|(c, x, y)| {
            (
                c,
                Term::UnaryOp(*op, Box::new(x)),
                Term::UnaryOp(*op, Box::new(y)),
            )
        }),
        Term::NumOp(op, lhs, rhs) => split_pair(lhs, rhs).map(|(c, (l1, r1), (l2, r2))| {
            (
                c,
                Term::NumOp(*op, Box::new(l1), Box::new(r1)),
                Term::NumOp(*op, Box::new(l2), Box::new(r2)),
            )
        }),
        _ => None,
    }
}

type Split = (Term, (Term, Term), (Term, Term));

fn split_pair(lhs: &Term, rhs: &Term) -> Option<Split> {
    if let Some((c, x, y)) = split_ite(lhs) {
        return Some((c, (x, rhs.clone()), (y, rhs.clone())));
    }
    split_ite(rhs).map(|(c, x, y)| (c, (lhs.clone(), x), (lhs.clone(), y)))
}

/// Lift numeric `Ite` out of atoms and expand boolean `Ite`.
fn lift_ite(ctx: &Context, t: &Term) -> Term {
    let rebuild_atom = |c: Term, a: Term, b: Term| {
        let c = lift_ite(ctx, &c);
        Term::or([
            Term::and([c.clone(), lift_ite(ctx, &a)]),
            Term::and([Term::not(c), lift_ite(ctx, &b)]),
        ])
    };
    match t {
        Term::Literal(_) | Term::Id(_) | Term::Num(_) => t.clone(),
        Term::UnaryOp(UOp::Not, arg) => Term::not(lift_ite(ctx, arg)),
        Term::NAryOp(op, args) => {
            Term::NAryOp(*op, args.iter().map(|a| lift_ite(ctx, a)).collect())
        }
        Term::BinOp(op, lhs, rhs) if lhs.is_bool(ctx) || !matches!(op, BinOp::Equals | BinOp::NotEquals) => {
            Term::BinOp(*op, Box::new(lift_ite(ctx, lhs)), Box::new(lift_ite(ctx, rhs)))
        }
        Term::BinOp(op, lhs, rhs) => match split_pair(lhs, rhs) {
            Some((c, (l1, r1), (l2, r2))) => rebuild_atom(
                c,
                Term::BinOp(*op, Box::new(l1), Box::new(r1)),
                Term::BinOp(*op, Box::new(l2), Box::new(r2)),
            ),
            None => t.clone(),
        },
        Term::NumRel(rel, lhs, rhs) => match split_pair(lhs, rhs) {
            Some((c, (l1, r1), (l2, r2))) => rebuild_atom(
                c,
                Term::NumRel(*rel, Box::new(l1), Box::new(r1)),
                Term::NumRel(*rel, Box::new(l2), Box::new(r2)),
            ),
            None => t.clone(),
        },
        Term::Ite { cond, then, else_ } if t.is_bool(ctx) => {
            let c = lift_ite(ctx, cond);
            Term::or([
                Term::and([c.clone(), lift_ite(ctx, then)]),
                Term::and([Term::not(c), lift_ite(ctx, else_)]),
            ])
        }
        Term::Ite { .. } | Term::NumOp(..) | Term::UnaryOp(UOp::Floor, _) => {
            panic!("numeric term {t} in a formula position")
        }
    }
}

struct Purifier<'a> {
    ctx: &'a Context,
    defs: Vec<Term>,
    fresh: Vec<String>,
    /// `(t, c) ↦ q` where `q = t div c`
    quotients: HashMap<(Term, Term), Term>,
    /// `(t, d) ↦ (q, r)` for a non-constant `d`, where `q = t div d` and
    /// `r = t mod d`
    divisions: HashMap<(Term, Term), (Term, Term)>,
    floors: HashMap<Term, Term>,
}

impl Purifier<'_> {
    fn formula(&mut self, t: &Term) -> Term {
        match t {
            Term::Literal(_) | Term::Id(_) => t.clone(),
            Term::UnaryOp(op, arg) => Term::UnaryOp(*op, Box::new(self.formula(arg))),
            Term::NAryOp(op, args) => Term::NAryOp(*op, args.iter().map(|a| self.formula(a)).collect()),
            Term::BinOp(op, lhs, rhs) if lhs.is_bool(self.ctx) => {
                Term::BinOp(*op, Box::new(self.formula(lhs)), Box::new(self.formula(rhs)))
            }
            Term::BinOp(op, lhs, rhs) => {
                Term::BinOp(*op, Box::new(self.num(lhs)), Box::new(self.num(rhs)))
            }
            Term::NumRel(rel, lhs, rhs) => {
                Term::NumRel(*rel, Box::new(self.num(lhs)), Box::new(self.num(rhs)))
            }
            Term::Num(_) | Term::NumOp(..) | Term::Ite { .. } => {
                panic!("unexpected term {t} after if-then-else lifting")
            }
        }
    }

    fn quotient(&mut self, dividend: Term, c: Rat) -> Term {
        let key = (dividend.clone(), Term::Num(c.clone()));
        if let Some(q) = self.quotients.get(&key) {
            return q.clone();
        }
        let q = self.fresh_int("q");
        // dividend = c*q + r with 0 <= r < |c|
        let r = Term::sub(dividend, Term::mul(Term::Num(c.clone()), q.clone()));
        self.defs.push(Term::leq(0, r.clone()));
        self.defs.push(Term::lt(r, Term::Num(c.abs())));
        self.quotients.insert(key, q.clone());
        q
    }

    /// Integer quotient and remainder of `dividend` by a non-constant.
    fn division(&mut self, dividend: Term, divisor: Term) -> (Term, Term) {
        let key = (dividend.clone(), divisor.clone());
        if let Some(qr) = self.divisions.get(&key) {
            return qr.clone();
        }
        let q = self.fresh_int("q");
        let r = self.fresh_int("r");
        let d = divisor;
        self.defs.push(Term::or([
            Term::equals(d.clone(), 0),
            Term::and([
                Term::equals(dividend, Term::add(Term::mul(d.clone(), q.clone()), r.clone())),
                Term::leq(0, r.clone()),
                Term::or([
                    Term::and([Term::gt(d.clone(), 0), Term::lt(r.clone(), d.clone())]),
                    Term::and([Term::lt(d.clone(), 0), Term::lt(r.clone(), Term::sub(0, d))]),
                ]),
            ]),
        ]));
        self.divisions.insert(key, (q.clone(), r.clone()));
        (q, r)
    }

    /// Rational quotient of `dividend` by a non-constant or zero.
    fn ratio(&mut self, dividend: Term, divisor: Term) -> Term {
        let key = (dividend.clone(), divisor.clone());
        if let Some(q) = self.quotients.get(&key) {
            return q.clone();
        }
        let name = self.ctx.fresh_name("ratio", Sort::Real);
        self.fresh.push(name.clone());
        let q = Term::Id(name);
        self.defs.push(Term::or([
            Term::equals(divisor.clone(), 0),
            Term::equals(dividend, Term::mul(q.clone(), divisor)),
        ]));
        self.quotients.insert(key, q.clone());
        q
    }

    fn fresh_int(&mut self, base: &str) -> Term {
        let name = self.ctx.fresh_name(base, Sort::Int);
        self.fresh.push(name.clone());
        Term::Id(name)
    }

    fn num(&mut self, t: &Term) -> Term {
        match t {
            Term::Num(_) | Term::Id(_) => t.clone(),
            Term::UnaryOp(UOp::Floor, arg) => {
                let arg = self.num(arg);
                if let Some(q) = self.floors.get(&arg) {
                    return q.clone();
                }
                let q = self.fresh_int("floor");
                self.defs.push(Term::leq(q.clone(), arg.clone()));
                self.defs.push(Term::lt(arg.clone(), Term::add(q.clone(), 1)));
                self.floors.insert(arg, q.clone());
                q
            }
            Term::NumOp(op @ (NumOp::IDiv | NumOp::Mod), lhs, rhs) => {
                let lhs = self.num(lhs);
                let rhs = self.num(rhs);
                match rhs.as_num() {
                    Some(c) if !c.is_zero() => {
                        let q = self.quotient(lhs.clone(), c.clone());
                        match op {
                            NumOp::IDiv => q,
                            _ => Term::sub(lhs, Term::mul(rhs, q)),
                        }
                    }
                    _ => {
                        let (q, r) = self.division(lhs, rhs);
                        match op {
                            NumOp::IDiv => q,
                            _ => r,
                        }
                    }
                }
            }
            Term::NumOp(NumOp::Div, lhs, rhs) => {
                let lhs = self.num(lhs);
                let rhs = self.num(rhs);
                match rhs.as_num() {
                    Some(c) if !c.is_zero() => Term::div(lhs, rhs),
                    _ => self.ratio(lhs, rhs),
                }
            }
            Term::NumOp(op, lhs, rhs) => {
                Term::NumOp(*op, Box::new(self.num(lhs)), Box::new(self.num(rhs)))
            }
            _ => panic!("unexpected term {t} in a numeric position"),
        }
    }
}
