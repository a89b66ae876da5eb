// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Abstract domains used to summarize formulas, for widening and for the
//! convex parts of iteration domains.
//!
//! Domains are chosen at construction time through generics: an analysis is
//! parameterized by a type implementing [`AbstractDomain`], and
//! [`Product`] combines two of them.

use std::fmt;

use formula::{context::Context, syntax::Term};
use solver::SolverConf;

use crate::error::QueryError;

pub mod interval;
pub mod polyhedral;
pub mod product;

pub use interval::Interval;
pub use polyhedral::Polyhedral;
pub use product::Product;

/// An abstract domain over quantifier-free arithmetic formulas.
pub trait AbstractDomain {
    /// Abstract values.
    type Value: Clone + fmt::Debug + PartialEq;

    /// The best (or a good) abstraction of `formula` over the symbols
    /// satisfying `keep`. The name `abstract` is a reserved word.
    fn abstract_of<F>(
        &self,
        ctx: &Context,
        conf: &SolverConf,
        formula: &Term,
        keep: F,
    ) -> Result<Self::Value, QueryError>
    where
        F: Fn(&str) -> bool;

    /// The empty set of states.
    fn bottom(&self) -> Self::Value;

    /// The set of all states.
    fn top(&self) -> Self::Value;

    /// An upper bound of two values.
    fn join(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// An upper bound of two values that guarantees stabilization when
    /// applied along an increasing chain.
    fn widen(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// The formula denoted by a value.
    fn formula_of(&self, a: &Self::Value) -> Term;

    /// Project a value onto the symbols satisfying `keep`.
    fn exists<F>(&self, a: &Self::Value, keep: F) -> Self::Value
    where
        F: Fn(&str) -> bool;

    /// Whether two values denote the same set of states.
    fn equal(&self, a: &Self::Value, b: &Self::Value) -> bool;

    /// Whether a value denotes the empty set of states.
    fn is_bottom(&self, a: &Self::Value) -> bool {
        self.equal(a, &self.bottom())
    }
}
