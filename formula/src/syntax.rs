// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The AST for quantifier-free arithmetic terms and formulas.

use itertools::Itertools;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::context::Context;

/// Exact rational numbers used for numerals and coefficients.
pub type Rat = BigRational;

/// Convert an integer into a [`Rat`].
pub fn rat(n: i64) -> Rat {
    Rat::from_integer(BigInt::from(n))
}

/// The sort of a symbol or term.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Mathematical integers
    Int,
    /// Real numbers
    Real,
}

impl Sort {
    /// Whether this is one of the numeric sorts.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sort::Bool => "Bool",
            Sort::Int => "Int",
            Sort::Real => "Real",
        };
        write!(f, "{s}")
    }
}

/// Unary operators
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum UOp {
    /// Boolean negation
    Not,
    /// Largest integer not greater than the argument
    Floor,
}

/// Binary logical operators
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum BinOp {
    Equals,
    NotEquals,
    Implies,
    Iff,
}

/// N-ary logical operators
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum NOp {
    And,
    Or,
}

/// Binary arithmetic operators
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum NumOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Real division (`/`)
    Div,
    /// Integer division (`div`), rounding so that the remainder is non-negative
    IDiv,
    /// Integer remainder (`mod`), always non-negative
    Mod,
}

/// Arithmetic comparisons
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum NumRel {
    Lt,
    Leq,
    Geq,
    Gt,
}

impl NumRel {
    /// The relation that holds exactly when this one does not.
    pub fn negate(self) -> Self {
        match self {
            NumRel::Lt => NumRel::Geq,
            NumRel::Leq => NumRel::Gt,
            NumRel::Geq => NumRel::Lt,
            NumRel::Gt => NumRel::Leq,
        }
    }

    /// The relation with its arguments swapped.
    pub fn flip(self) -> Self {
        match self {
            NumRel::Lt => NumRel::Gt,
            NumRel::Leq => NumRel::Geq,
            NumRel::Geq => NumRel::Leq,
            NumRel::Gt => NumRel::Lt,
        }
    }
}

/// A quantifier-free term or formula over booleans, integers and reals.
///
/// Symbols are referenced by name with [`Term::Id`]; their sorts are kept in a
/// [`Context`] rather than in the term itself.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum Term {
    /// A constant true or false
    Literal(bool),
    /// A rational numeral
    Num(Rat),
    /// A reference to a symbol
    Id(String),
    /// An applied unary operation
    UnaryOp(UOp, Box<Term>),
    /// An applied binary logical operation
    BinOp(BinOp, Box<Term>, Box<Term>),
    /// An applied n-ary logical operation
    NAryOp(NOp, Vec<Term>),
    /// An applied arithmetic operation
    NumOp(NumOp, Box<Term>, Box<Term>),
    /// An arithmetic comparison
    NumRel(NumRel, Box<Term>, Box<Term>),
    /// If-then-else
    Ite {
        /// A boolean conditional
        cond: Box<Term>,
        /// Value of the Ite when `cond` is true
        then: Box<Term>,
        /// Value of the Ite when `cond` is false
        else_: Box<Term>,
    },
}

impl From<&Term> for Term {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Num(rat(value))
    }
}

// unsuffixed integer literals default to i32
impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Num(rat(value.into()))
    }
}

impl From<Rat> for Term {
    fn from(value: Rat) -> Self {
        Term::Num(value)
    }
}

/// Smart constructors for Term. These take anything convertible into a term,
/// so references are cloned and owned values are moved.
impl Term {
    /// Smart constructor for Literal(true)
    pub fn true_() -> Self {
        Self::Literal(true)
    }

    /// Smart constructor for Literal(false)
    pub fn false_() -> Self {
        Self::Literal(false)
    }

    /// Smart constructor for Id
    pub fn id(name: &str) -> Self {
        Self::Id(name.to_string())
    }

    /// Smart constructor for an integer numeral
    pub fn int(n: i64) -> Self {
        Self::Num(rat(n))
    }

    //////////////////
    // Logical operations
    //////////////////

    /// Smart constructor for not. Note this does not push negation inwards, but
    /// it does evaluate literals, cancel double negation, and flip Equals,
    /// NotEquals and arithmetic comparisons.
    pub fn not<T>(t: T) -> Self
    where
        T: Into<Term>,
    {
        let t = t.into();
        match t {
            Self::Literal(b) => Self::Literal(!b),
            Self::UnaryOp(UOp::Not, body) => *body,
            Self::BinOp(BinOp::Equals, lhs, rhs) => Self::BinOp(BinOp::NotEquals, lhs, rhs),
            Self::BinOp(BinOp::NotEquals, lhs, rhs) => Self::BinOp(BinOp::Equals, lhs, rhs),
            Self::NumRel(rel, lhs, rhs) => Self::NumRel(rel.negate(), lhs, rhs),
            _ => Self::UnaryOp(UOp::Not, Box::new(t)),
        }
    }

    /// Smart constructor for `lhs = rhs`
    pub fn equals<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::BinOp(BinOp::Equals, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Smart constructor for `lhs != rhs`
    pub fn not_equals<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::BinOp(BinOp::NotEquals, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Smart constructor for `lhs -> rhs`
    pub fn implies<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::BinOp(BinOp::Implies, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Smart constructor for `lhs <-> rhs`
    pub fn iff<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::BinOp(BinOp::Iff, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Helper function for [`Self::and`] and [`Self::or`]. Flattens nested
    /// applications of `op` (one level), drops its unit and detects its
    /// absorbing element.
    fn flatten_terms_of_op(ts: Vec<Term>, op: NOp) -> Option<Vec<Term>> {
        let (unit, absorbing) = match op {
            NOp::And => (true, false),
            NOp::Or => (false, true),
        };
        let mut flat = vec![];
        for t in ts {
            match t {
                Self::NAryOp(op2, ts2) if op == op2 => flat.extend(ts2),
                Self::Literal(b) if b == unit => (),
                Self::Literal(b) if b == absorbing => return None,
                _ => flat.push(t),
            }
        }
        Some(flat.into_iter().unique().collect())
    }

    /// Smart constructor for And. Zero and one conjuncts are handled specially,
    /// conjuncts that are And are flattened (but not recursively), `true` is
    /// dropped and `false` absorbs.
    pub fn and<I>(ts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let ts = ts.into_iter().map(|x| x.into()).collect_vec();
        match Self::flatten_terms_of_op(ts, NOp::And) {
            None => Self::false_(),
            Some(mut ts) if ts.len() <= 1 => ts.pop().unwrap_or_else(Self::true_),
            Some(ts) => Self::NAryOp(NOp::And, ts),
        }
    }

    /// Smart constructor for Or. Zero and one disjuncts are handled specially,
    /// disjuncts that are Or are flattened (but not recursively), `false` is
    /// dropped and `true` absorbs.
    pub fn or<I>(ts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let ts = ts.into_iter().map(|x| x.into()).collect_vec();
        match Self::flatten_terms_of_op(ts, NOp::Or) {
            None => Self::true_(),
            Some(mut ts) if ts.len() <= 1 => ts.pop().unwrap_or_else(Self::false_),
            Some(ts) => Self::NAryOp(NOp::Or, ts),
        }
    }

    /// Smart constructor for Ite
    pub fn ite<T1, T2, T3>(cond: T1, then: T2, else_: T3) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
        T3: Into<Term>,
    {
        Self::Ite {
            cond: Box::new(cond.into()),
            then: Box::new(then.into()),
            else_: Box::new(else_.into()),
        }
    }

    //////////////////
    // Arithmetic
    //////////////////

    fn num_op<T1, T2>(op: NumOp, lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::NumOp(op, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Smart constructor for `lhs + rhs`. Adding a literal zero is dropped.
    pub fn add<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        match (lhs.into(), rhs.into()) {
            (Self::Num(n), t) | (t, Self::Num(n)) if n.is_zero() => t,
            (lhs, rhs) => Self::num_op(NumOp::Add, lhs, rhs),
        }
    }

    /// Sum of a sequence of terms; the empty sum is zero.
    pub fn sum<I>(ts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        ts.into_iter()
            .map(|t| t.into())
            .reduce(Self::add)
            .unwrap_or_else(|| Self::int(0))
    }

    /// Smart constructor for `lhs - rhs`
    pub fn sub<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_op(NumOp::Sub, lhs, rhs)
    }

    /// Smart constructor for `lhs * rhs`. Multiplication by a literal one is
    /// dropped.
    pub fn mul<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        match (lhs.into(), rhs.into()) {
            (Self::Num(n), t) | (t, Self::Num(n)) if n.is_one() => t,
            (lhs, rhs) => Self::num_op(NumOp::Mul, lhs, rhs),
        }
    }

    /// Smart constructor for real division `lhs / rhs`
    pub fn div<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_op(NumOp::Div, lhs, rhs)
    }

    /// Smart constructor for integer division `lhs div rhs`
    pub fn idiv<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_op(NumOp::IDiv, lhs, rhs)
    }

    /// Smart constructor for `lhs mod rhs`
    pub fn modulo<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_op(NumOp::Mod, lhs, rhs)
    }

    /// Smart constructor for `floor(t)`
    pub fn floor<T>(t: T) -> Self
    where
        T: Into<Term>,
    {
        Self::UnaryOp(UOp::Floor, Box::new(t.into()))
    }

    fn num_rel<T1, T2>(rel: NumRel, lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::NumRel(rel, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Smart constructor for `lhs < rhs`
    pub fn lt<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_rel(NumRel::Lt, lhs, rhs)
    }

    /// Smart constructor for `lhs <= rhs`
    pub fn leq<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_rel(NumRel::Leq, lhs, rhs)
    }

    /// Smart constructor for `lhs >= rhs`
    pub fn geq<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_rel(NumRel::Geq, lhs, rhs)
    }

    /// Smart constructor for `lhs > rhs`
    pub fn gt<T1, T2>(lhs: T1, rhs: T2) -> Self
    where
        T1: Into<Term>,
        T2: Into<Term>,
    {
        Self::num_rel(NumRel::Gt, lhs, rhs)
    }
}

/// Utilities for getting information about a given [`Term`]
impl Term {
    /// Return whether the term is a formula. Symbols are looked up in `ctx`;
    /// undeclared symbols are considered non-bool.
    pub fn is_bool(&self, ctx: &Context) -> bool {
        match self {
            Term::Literal(_)
            | Term::UnaryOp(UOp::Not, _)
            | Term::BinOp(_, _, _)
            | Term::NAryOp(_, _)
            | Term::NumRel(_, _, _) => true,
            Term::Num(_) | Term::NumOp(_, _, _) | Term::UnaryOp(UOp::Floor, _) => false,
            Term::Id(name) => ctx.sort_of(name) == Some(Sort::Bool),
            Term::Ite { then, else_, .. } => {
                let then_is_bool = then.is_bool(ctx);
                debug_assert_eq!(then_is_bool, else_.is_bool(ctx));
                then_is_bool
            }
        }
    }

    /// The sort of a term. Numeric terms are `Int` unless some leaf is real
    /// (or the operation is real division).
    pub fn sort(&self, ctx: &Context) -> Sort {
        if self.is_bool(ctx) {
            return Sort::Bool;
        }
        match self {
            Term::Num(n) => {
                if n.is_integer() {
                    Sort::Int
                } else {
                    Sort::Real
                }
            }
            Term::Id(name) => ctx.sort_of(name).unwrap_or(Sort::Real),
            Term::UnaryOp(UOp::Floor, _) | Term::NumOp(NumOp::IDiv | NumOp::Mod, _, _) => {
                Sort::Int
            }
            Term::NumOp(NumOp::Div, _, _) => Sort::Real,
            Term::NumOp(_, lhs, rhs) => match (lhs.sort(ctx), rhs.sort(ctx)) {
                (Sort::Int, Sort::Int) => Sort::Int,
                _ => Sort::Real,
            },
            Term::Ite { then, else_, .. } => match (then.sort(ctx), else_.sort(ctx)) {
                (Sort::Int, Sort::Int) => Sort::Int,
                _ => Sort::Real,
            },
            _ => unreachable!("boolean terms are handled above"),
        }
    }

    /// Return the number of atomic formulas and leaves in the term.
    pub fn size(&self) -> usize {
        match self {
            Term::Literal(_) | Term::Num(_) | Term::Id(_) => 1,
            Term::UnaryOp(_, t) => t.size(),
            Term::BinOp(_, t1, t2) | Term::NumOp(_, t1, t2) | Term::NumRel(_, t1, t2) => {
                t1.size() + t2.size()
            }
            Term::NAryOp(_, ts) => ts.iter().map(Term::size).sum(),
            Term::Ite { cond, then, else_ } => cond.size() + then.size() + else_.size(),
        }
    }

    /// The set of symbols occurring in the term.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        self.collect_symbols(&mut acc);
        acc
    }

    fn collect_symbols(&self, acc: &mut BTreeSet<String>) {
        match self {
            Term::Literal(_) | Term::Num(_) => (),
            Term::Id(name) => {
                acc.insert(name.clone());
            }
            Term::UnaryOp(_, t) => t.collect_symbols(acc),
            Term::BinOp(_, t1, t2) | Term::NumOp(_, t1, t2) | Term::NumRel(_, t1, t2) => {
                t1.collect_symbols(acc);
                t2.collect_symbols(acc);
            }
            Term::NAryOp(_, ts) => ts.iter().for_each(|t| t.collect_symbols(acc)),
            Term::Ite { cond, then, else_ } => {
                cond.collect_symbols(acc);
                then.collect_symbols(acc);
                else_.collect_symbols(acc);
            }
        }
    }

    /// Whether the symbol `name` occurs in the term.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Term::Literal(_) | Term::Num(_) => false,
            Term::Id(s) => s == name,
            Term::UnaryOp(_, t) => t.mentions(name),
            Term::BinOp(_, t1, t2) | Term::NumOp(_, t1, t2) | Term::NumRel(_, t1, t2) => {
                t1.mentions(name) || t2.mentions(name)
            }
            Term::NAryOp(_, ts) => ts.iter().any(|t| t.mentions(name)),
            Term::Ite { cond, then, else_ } => {
                cond.mentions(name) || then.mentions(name) || else_.mentions(name)
            }
        }
    }

    /// Decompose a formula into its top-level conjuncts. `true` has no
    /// conjuncts.
    pub fn conjuncts(&self) -> Vec<Term> {
        match self {
            Term::Literal(true) => vec![],
            Term::NAryOp(NOp::And, ts) => ts.iter().flat_map(Term::conjuncts).collect(),
            _ => vec![self.clone()],
        }
    }

    /// Decompose a formula into its top-level disjuncts. `false` has no
    /// disjuncts.
    pub fn disjuncts(&self) -> Vec<Term> {
        match self {
            Term::Literal(false) => vec![],
            Term::NAryOp(NOp::Or, ts) => ts.iter().flat_map(Term::disjuncts).collect(),
            _ => vec![self.clone()],
        }
    }

    /// If this term is a bare symbol, return its name.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Term::Id(name) => Some(name),
            _ => None,
        }
    }

    /// If this term is a numeral, return its value.
    pub fn as_num(&self) -> Option<&Rat> {
        match self {
            Term::Num(n) => Some(n),
            _ => None,
        }
    }
}
