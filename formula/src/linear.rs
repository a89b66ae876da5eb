// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Polynomials with rational coefficients and the linear constraints built
//! from them.
//!
//! A polynomial is a sum of monomials (products of symbols) plus a constant.
//! Linear reasoning treats every non-constant monomial as its own dimension,
//! so a product like `x*y` is an opaque variable as far as projection and
//! feasibility are concerned.

use itertools::Itertools;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::syntax::{BinOp, NumOp, NumRel, Rat, Term};

/// A product of symbols, kept sorted (with repetition for powers).
pub type Monomial = Vec<String>;

/// A polynomial: `Σ coeff·monomial + constant`. Zero coefficients are never
/// stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, Rat>,
    constant: Rat,
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self::constant(Rat::zero())
    }

    /// A constant polynomial.
    pub fn constant(c: Rat) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: c,
        }
    }

    /// The polynomial consisting of one symbol.
    pub fn var(name: &str) -> Self {
        Self::monomial(vec![name.to_string()], Rat::one())
    }

    /// `coeff * m`
    pub fn monomial(mut m: Monomial, coeff: Rat) -> Self {
        let mut p = Self::zero();
        if m.is_empty() {
            p.constant = coeff;
        } else if !coeff.is_zero() {
            m.sort();
            p.terms.insert(m, coeff);
        }
        p
    }

    /// The constant part.
    pub fn constant_part(&self) -> &Rat {
        &self.constant
    }

    /// The non-constant monomials with their coefficients.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rat)> {
        self.terms.iter()
    }

    /// The coefficient of a monomial (zero if absent).
    pub fn coeff(&self, m: &Monomial) -> Rat {
        self.terms.get(m).cloned().unwrap_or_else(Rat::zero)
    }

    /// Whether the polynomial has no non-constant monomials.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether every monomial has degree one.
    pub fn is_linear(&self) -> bool {
        self.terms.keys().all(|m| m.len() == 1)
    }

    /// The symbols occurring in the polynomial.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.terms.keys().flatten().cloned().collect()
    }

    /// The non-constant monomials (dimensions) of the polynomial.
    pub fn dims(&self) -> impl Iterator<Item = &Monomial> {
        self.terms.keys()
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, c: &Rat) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(m, a)| (m.clone(), a * c))
                .collect(),
            constant: &self.constant * c,
        }
    }

    /// Replace the dimension `m` by the polynomial `p`.
    pub fn substitute_dim(&self, m: &Monomial, p: &Polynomial) -> Self {
        match self.terms.get(m) {
            None => self.clone(),
            Some(a) => {
                let mut rest = self.clone();
                rest.terms.remove(m);
                &rest + &p.scale(a)
            }
        }
    }

    /// Evaluate with the value of each dimension given by `value`.
    pub fn eval_dims<F>(&self, mut value: F) -> Option<Rat>
    where
        F: FnMut(&Monomial) -> Option<Rat>,
    {
        let mut acc = self.constant.clone();
        for (m, a) in &self.terms {
            acc += a * value(m)?;
        }
        Some(acc)
    }

    /// Evaluate with the value of each symbol given by `value`; monomials are
    /// evaluated as products.
    pub fn eval<F>(&self, mut value: F) -> Option<Rat>
    where
        F: FnMut(&str) -> Option<Rat>,
    {
        self.eval_dims(|m| {
            m.iter()
                .try_fold(Rat::one(), |acc, s| Some(acc * value(s)?))
        })
    }

    /// Translate a numeric term into a polynomial. Returns `None` for terms
    /// that are not polynomial (floor, integer division or modulus, division by
    /// a non-constant, if-then-else).
    pub fn from_term(t: &Term) -> Option<Self> {
        match t {
            Term::Num(n) => Some(Self::constant(n.clone())),
            Term::Id(name) => Some(Self::var(name)),
            Term::NumOp(op, lhs, rhs) => {
                let lhs = Self::from_term(lhs)?;
                let rhs = Self::from_term(rhs)?;
                match op {
                    NumOp::Add => Some(&lhs + &rhs),
                    NumOp::Sub => Some(&lhs - &rhs),
                    NumOp::Mul => Some(&lhs * &rhs),
                    NumOp::Div if rhs.is_constant() && !rhs.constant.is_zero() => {
                        Some(lhs.scale(&rhs.constant.recip()))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Convert back into a term, in a canonical order.
    pub fn to_term(&self) -> Term {
        let mut summands = vec![];
        for (m, a) in &self.terms {
            let product = m.iter().map(|s| Term::id(s)).reduce(Term::mul);
            if let Some(product) = product {
                summands.push(Term::mul(Term::Num(a.clone()), product));
            }
        }
        if !self.constant.is_zero() || summands.is_empty() {
            summands.push(Term::Num(self.constant.clone()));
        }
        Term::sum(summands)
    }

    /// Multiply by the least positive integer that makes all coefficients
    /// and the constant integers.
    pub fn integral(&self) -> Self {
        let lcm = self
            .terms
            .values()
            .chain([&self.constant])
            .fold(BigInt::one(), |acc, a| acc.lcm(a.denom()));
        self.scale(&Rat::from_integer(lcm))
    }

    /// The gcd of the (integer) coefficients of the non-constant monomials.
    fn coeff_gcd(&self) -> BigInt {
        self.terms
            .values()
            .fold(BigInt::zero(), |acc, a| acc.gcd(a.numer()))
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut terms = self.terms.clone();
        for (m, a) in &rhs.terms {
            let sum = terms.get(m).cloned().unwrap_or_else(Rat::zero) + a;
            if sum.is_zero() {
                terms.remove(m);
            } else {
                terms.insert(m.clone(), sum);
            }
        }
        Polynomial {
            terms,
            constant: &self.constant + &rhs.constant,
        }
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(&-Rat::one())
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &-rhs
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let lhs_terms = self
            .terms
            .iter()
            .map(|(m, a)| (m.clone(), a.clone()))
            .chain([(vec![], self.constant.clone())]);
        let mut acc = Polynomial::zero();
        for (m1, a1) in lhs_terms {
            let rhs_terms = rhs
                .terms
                .iter()
                .map(|(m, a)| (m.clone(), a.clone()))
                .chain([(vec![], rhs.constant.clone())]);
            for (m2, a2) in rhs_terms {
                let m = m1.iter().chain(m2.iter()).cloned().collect_vec();
                acc = &acc + &Polynomial::monomial(m, &a1 * &a2);
            }
        }
        acc
    }
}

/// The relation of a [`Constraint`] to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rel {
    /// `p = 0`
    Eq,
    /// `p <= 0`
    Leq,
    /// `p < 0`
    Lt,
}

/// A constraint `poly rel 0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    /// The constrained polynomial
    pub poly: Polynomial,
    /// Its relation to zero
    pub rel: Rel,
}

impl Constraint {
    /// Create a constraint, normalizing it so that syntactically different
    /// multiples of the same constraint compare equal.
    pub fn new(poly: Polynomial, rel: Rel) -> Self {
        let poly = match poly.terms.values().next() {
            None => poly,
            Some(lead) => {
                let factor = match rel {
                    // equalities can be scaled by any nonzero factor
                    Rel::Eq => lead.recip(),
                    Rel::Leq | Rel::Lt => lead.abs().recip(),
                };
                poly.scale(&factor)
            }
        };
        Self { poly, rel }
    }

    /// The constraint expressed by an arithmetic atom, if both sides are
    /// polynomial.
    pub fn from_atom(t: &Term) -> Option<Self> {
        let (lhs, rhs, rel, swap) = match t {
            Term::BinOp(BinOp::Equals, lhs, rhs) => (lhs, rhs, Rel::Eq, false),
            Term::NumRel(NumRel::Lt, lhs, rhs) => (lhs, rhs, Rel::Lt, false),
            Term::NumRel(NumRel::Leq, lhs, rhs) => (lhs, rhs, Rel::Leq, false),
            Term::NumRel(NumRel::Gt, lhs, rhs) => (lhs, rhs, Rel::Lt, true),
            Term::NumRel(NumRel::Geq, lhs, rhs) => (lhs, rhs, Rel::Leq, true),
            _ => return None,
        };
        let lhs = Polynomial::from_term(lhs)?;
        let rhs = Polynomial::from_term(rhs)?;
        let poly = if swap { &rhs - &lhs } else { &lhs - &rhs };
        Some(Self::new(poly, rel))
    }

    /// A constraint that is always false.
    pub fn falsity() -> Self {
        Self {
            poly: Polynomial::constant(Rat::one()),
            rel: Rel::Leq,
        }
    }

    /// For a constraint without dimensions, whether it holds.
    pub fn trivial_value(&self) -> Option<bool> {
        if !self.poly.is_constant() {
            return None;
        }
        let c = &self.poly.constant;
        Some(match self.rel {
            Rel::Eq => c.is_zero(),
            Rel::Leq => !c.is_positive(),
            Rel::Lt => c.is_negative(),
        })
    }

    /// The negation of this constraint, as a disjunction of constraints.
    pub fn negate(&self) -> Vec<Constraint> {
        match self.rel {
            Rel::Leq => vec![Self::new(-&self.poly, Rel::Lt)],
            Rel::Lt => vec![Self::new(-&self.poly, Rel::Leq)],
            Rel::Eq => vec![
                Self::new(self.poly.clone(), Rel::Lt),
                Self::new(-&self.poly, Rel::Lt),
            ],
        }
    }

    /// An equality `p = 0` as the two inequalities `p <= 0` and `-p <= 0`;
    /// inequalities are returned as is.
    pub fn halves(&self) -> Vec<Constraint> {
        match self.rel {
            Rel::Eq => vec![
                Self::new(self.poly.clone(), Rel::Leq),
                Self::new(-&self.poly, Rel::Leq),
            ],
            _ => vec![self.clone()],
        }
    }

    /// Whether the constraint holds when dimensions take the given values.
    pub fn holds<F>(&self, value: F) -> Option<bool>
    where
        F: FnMut(&Monomial) -> Option<Rat>,
    {
        let v = self.poly.eval_dims(value)?;
        Some(match self.rel {
            Rel::Eq => v.is_zero(),
            Rel::Leq => !v.is_positive(),
            Rel::Lt => v.is_negative(),
        })
    }

    /// Strengthen a constraint all of whose dimensions are integer valued:
    /// `p < 0` becomes `p + 1 <= 0` and the constant is rounded in the
    /// direction that keeps exactly the same integer solutions.
    pub fn tighten_int(&self) -> Constraint {
        if self.poly.is_constant() {
            return self.clone();
        }
        let p = self.poly.integral();
        let (p, rel) = match self.rel {
            Rel::Lt => (&p + &Polynomial::constant(Rat::one()), Rel::Leq),
            rel => (p, rel),
        };
        let g = Rat::from_integer(p.coeff_gcd());
        let c = p.constant.clone();
        let mut linear = p.scale(&g.recip());
        linear.constant = Rat::zero();
        match rel {
            // Σ a·x + c <= 0  iff  Σ (a/g)·x <= floor(-c/g)
            Rel::Leq => {
                let bound = (-c / &g).floor();
                Self::new(&linear - &Polynomial::constant(bound), Rel::Leq)
            }
            Rel::Eq => {
                let c = c / &g;
                if c.is_integer() {
                    Self::new(&linear + &Polynomial::constant(c), Rel::Eq)
                } else {
                    Self::falsity()
                }
            }
            Rel::Lt => unreachable!("strict constraints were made non-strict"),
        }
    }

    /// Convert to a term `lhs rel rhs` with all coefficients positive.
    pub fn to_term(&self) -> Term {
        let mut lhs = Polynomial::zero();
        let mut rhs = Polynomial::zero();
        for (m, a) in &self.poly.terms {
            if a.is_negative() {
                rhs = &rhs + &Polynomial::monomial(m.clone(), -a);
            } else {
                lhs = &lhs + &Polynomial::monomial(m.clone(), a.clone());
            }
        }
        let c = &self.poly.constant;
        if c.is_negative() {
            rhs = &rhs + &Polynomial::constant(-c);
        } else {
            lhs = &lhs + &Polynomial::constant(c.clone());
        }
        let (lhs, rhs) = (lhs.to_term(), rhs.to_term());
        match self.rel {
            Rel::Eq => Term::equals(lhs, rhs),
            Rel::Leq => Term::leq(lhs, rhs),
            Rel::Lt => Term::lt(lhs, rhs),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

/// A divisibility constraint `modulus | poly` over integer-valued dimensions.
///
/// The polynomial is kept with integer coefficients reduced modulo the
/// modulus, so a constraint that no longer mentions any dimension is either
/// trivially true or trivially false.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Divides {
    /// A positive integer
    pub modulus: BigInt,
    /// The constrained polynomial, with coefficients in `0..modulus`
    pub poly: Polynomial,
}

impl Divides {
    /// `modulus | poly`, where `poly` takes integer values. Rational
    /// coefficients are cleared by scaling both sides.
    pub fn new(modulus: &BigInt, poly: &Polynomial) -> Self {
        let lcm = poly
            .terms
            .values()
            .chain([&poly.constant])
            .fold(BigInt::one(), |acc, a| acc.lcm(a.denom()));
        let modulus = (modulus * &lcm).abs();
        let reduce = |a: &Rat| (a * Rat::from_integer(lcm.clone())).to_integer().mod_floor(&modulus);
        let terms = poly
            .terms
            .iter()
            .map(|(m, a)| (m.clone(), Rat::from_integer(reduce(a))))
            .filter(|(_, a)| !a.is_zero())
            .collect();
        Self {
            poly: Polynomial {
                terms,
                constant: Rat::from_integer(reduce(&poly.constant)),
            },
            modulus,
        }
    }

    /// For a constraint without dimensions, whether it holds.
    pub fn trivial_value(&self) -> Option<bool> {
        if self.modulus.is_one() {
            return Some(true);
        }
        self.poly
            .is_constant()
            .then(|| self.poly.constant.is_zero())
    }

    /// Whether the constraint holds when dimensions take the given values.
    pub fn holds<F>(&self, value: F) -> Option<bool>
    where
        F: FnMut(&Monomial) -> Option<Rat>,
    {
        let v = self.poly.eval_dims(value)?;
        if !v.is_integer() {
            return Some(false);
        }
        Some(v.to_integer().mod_floor(&self.modulus).is_zero())
    }

    /// Convert to the term `poly mod modulus = 0`.
    pub fn to_term(&self) -> Term {
        Term::equals(
            Term::modulo(self.poly.to_term(), Term::Num(Rat::from_integer(self.modulus.clone()))),
            0,
        )
    }
}

impl fmt::Display for Divides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Term {
        Term::id("x")
    }

    fn y() -> Term {
        Term::id("y")
    }

    #[test]
    fn test_from_term() {
        let t = Term::sub(Term::mul(2, Term::add(x(), y())), Term::mul(x(), 2));
        let p = Polynomial::from_term(&t).unwrap();
        assert_eq!(p, Polynomial::var("y").scale(&crate::syntax::rat(2)));
        assert_eq!(Polynomial::from_term(&Term::floor(x())), None);
        let q = Polynomial::from_term(&Term::mul(x(), Term::add(y(), 1))).unwrap();
        assert!(!q.is_linear());
        assert_eq!(q.symbols().len(), 2);
    }

    #[test]
    fn test_constraint_normalization() {
        let a = Constraint::from_atom(&Term::leq(Term::mul(2, x()), 4)).unwrap();
        let b = Constraint::from_atom(&Term::geq(2, x())).unwrap();
        assert_eq!(a, b);
        insta::assert_snapshot!(a.to_string(), @"x <= 2");
    }

    #[test]
    fn test_divides() {
        // 2 | y/2 + 3/2  iff  4 | y + 3
        let half = Rat::new(1.into(), 2.into());
        let p = &Polynomial::var("y").scale(&half) + &Polynomial::constant(Rat::new(3.into(), 2.into()));
        let c = Divides::new(&BigInt::from(2), &p);
        assert_eq!(c.modulus, BigInt::from(4));
        let at = |v: i64| move |_: &Monomial| Some(crate::syntax::rat(v));
        assert_eq!(c.holds(at(1)), Some(true));
        assert_eq!(c.holds(at(3)), Some(false));
        assert_eq!(c.trivial_value(), None);
        let ground = Divides::new(&BigInt::from(3), &Polynomial::constant(crate::syntax::rat(-6)));
        assert_eq!(ground.trivial_value(), Some(true));
        assert_eq!(Divides::new(&BigInt::from(1), &p).trivial_value(), Some(true));
    }

    #[test]
    fn test_tighten_int() {
        // 2x < 3 over the integers is x <= 1
        let c = Constraint::from_atom(&Term::lt(Term::mul(2, x()), 3)).unwrap();
        insta::assert_snapshot!(c.tighten_int().to_string(), @"x <= 1");
        // 2x = 3 has no integer solution
        let c = Constraint::from_atom(&Term::equals(Term::mul(2, x()), 3)).unwrap();
        assert_eq!(c.tighten_int().trivial_value(), Some(false));
        // x > 1/2 over the integers is x >= 1
        let c = Constraint::from_atom(&Term::gt(x(), Term::div(1, 2))).unwrap();
        insta::assert_snapshot!(c.tighten_int().to_string(), @"1 <= x");
    }
}
