// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Models of quantifier-free arithmetic formulas and evaluation under them.

use num_integer::Integer;
use num_traits::{Signed, Zero};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::syntax::{BinOp, NOp, NumOp, NumRel, Rat, Term, UOp};

use BinOp::*;
use NOp::*;

/// The value of a symbol in a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
pub enum Value {
    /// A boolean value
    Bool(bool),
    /// A numeric value (integer symbols always have integral values)
    Num(Rat),
}

impl Value {
    /// The value as a term.
    pub fn to_term(&self) -> Term {
        match self {
            Value::Bool(b) => Term::Literal(*b),
            Value::Num(n) => Term::Num(n.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

/// An assignment of values to symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Model {
    values: BTreeMap<String, Value>,
}

impl FromIterator<(String, Value)> for Model {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Model {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a symbol.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// The value of a symbol, if bound.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The numeric value of a symbol, if bound to a number.
    pub fn get_num(&self, name: &str) -> Option<Rat> {
        match self.values.get(name) {
            Some(Value::Num(n)) => Some(n.clone()),
            _ => None,
        }
    }

    /// The symbols bound by the model, in order.
    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// The bindings of the model, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Whether the model binds no symbols.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restrict the model to the symbols satisfying `keep`.
    pub fn restrict<F>(&self, keep: F) -> Model
    where
        F: Fn(&str) -> bool,
    {
        self.values
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, v)| (name.clone(), v.clone()))
            .collect()
    }

    /// Evaluate a term. Returns `None` if the term mentions an unbound symbol,
    /// divides by zero or is ill-sorted.
    pub fn eval(&self, t: &Term) -> Option<Value> {
        let num = |t: &Term| match self.eval(t)? {
            Value::Num(n) => Some(n),
            Value::Bool(_) => None,
        };
        let boolean = |t: &Term| self.eval_bool(t);
        Some(match t {
            Term::Literal(b) => Value::Bool(*b),
            Term::Num(n) => Value::Num(n.clone()),
            Term::Id(name) => self.values.get(name)?.clone(),
            Term::UnaryOp(UOp::Not, arg) => Value::Bool(!boolean(arg)?),
            Term::UnaryOp(UOp::Floor, arg) => Value::Num(num(arg)?.floor()),
            Term::BinOp(Equals | Iff, lhs, rhs) => Value::Bool(self.eval(lhs)? == self.eval(rhs)?),
            Term::BinOp(NotEquals, lhs, rhs) => Value::Bool(self.eval(lhs)? != self.eval(rhs)?),
            Term::BinOp(Implies, lhs, rhs) => Value::Bool(!boolean(lhs)? || boolean(rhs)?),
            Term::NAryOp(And, ts) => {
                let mut res = true;
                for t in ts {
                    res &= boolean(t)?;
                }
                Value::Bool(res)
            }
            Term::NAryOp(Or, ts) => {
                let mut res = false;
                for t in ts {
                    res |= boolean(t)?;
                }
                Value::Bool(res)
            }
            Term::NumOp(op, lhs, rhs) => {
                let (a, b) = (num(lhs)?, num(rhs)?);
                Value::Num(match op {
                    NumOp::Add => a + b,
                    NumOp::Sub => a - b,
                    NumOp::Mul => a * b,
                    NumOp::Div if b.is_zero() => return None,
                    NumOp::Div => a / b,
                    NumOp::IDiv | NumOp::Mod => {
                        if b.is_zero() || !a.is_integer() || !b.is_integer() {
                            return None;
                        }
                        let (a, b) = (a.to_integer(), b.to_integer());
                        // euclidean division: the remainder is never negative
                        let r = a.mod_floor(&b.abs());
                        let q = (&a - &r) / &b;
                        Rat::from_integer(if *op == NumOp::IDiv { q } else { r })
                    }
                })
            }
            Term::NumRel(rel, lhs, rhs) => {
                let (a, b) = (num(lhs)?, num(rhs)?);
                Value::Bool(match rel {
                    NumRel::Lt => a < b,
                    NumRel::Leq => a <= b,
                    NumRel::Geq => a >= b,
                    NumRel::Gt => a > b,
                })
            }
            Term::Ite { cond, then, else_ } => {
                if boolean(cond)? {
                    self.eval(then)?
                } else {
                    self.eval(else_)?
                }
            }
        })
    }

    /// Evaluate a formula.
    pub fn eval_bool(&self, t: &Term) -> Option<bool> {
        match self.eval(t)? {
            Value::Bool(b) => Some(b),
            Value::Num(_) => None,
        }
    }

    /// Represent the model as a conjunction of equalities.
    pub fn to_term(&self) -> Term {
        Term::and(self.values.iter().map(|(name, v)| match v {
            Value::Bool(true) => Term::id(name),
            Value::Bool(false) => Term::not(Term::id(name)),
            Value::Num(_) => Term::equals(Term::id(name), v.to_term()),
        }))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, v) in &self.values {
            writeln!(f, "{name} = {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rat;

    fn model() -> Model {
        [
            ("x".to_string(), Value::Num(rat(-7))),
            ("p".to_string(), Value::Bool(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_eval_arith() {
        let m = model();
        let x = Term::id("x");
        assert_eq!(m.eval(&Term::idiv(&x, 2)), Some(Value::Num(rat(-4))));
        assert_eq!(m.eval(&Term::modulo(&x, 2)), Some(Value::Num(rat(1))));
        assert_eq!(m.eval(&Term::idiv(&x, -2)), Some(Value::Num(rat(4))));
        assert_eq!(m.eval(&Term::div(&x, 0)), None);
        assert_eq!(
            m.eval(&Term::floor(Term::div(&x, 2))),
            Some(Value::Num(rat(-4)))
        );
    }

    #[test]
    fn test_eval_formula() {
        let m = model();
        let t = Term::and([Term::id("p"), Term::lt(Term::id("x"), 0)]);
        assert_eq!(m.eval_bool(&t), Some(true));
        assert_eq!(m.eval_bool(&Term::lt(Term::id("y"), 0)), None);
    }

    #[test]
    fn test_restrict() {
        let m = model().restrict(|s| s == "x");
        assert_eq!(m.symbols().collect::<Vec<_>>(), vec!["x"]);
    }
}
