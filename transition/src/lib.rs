// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! An algebra of transition relations over arithmetic program variables,
//! together with the analyses built on top of it: an approximation of the
//! reflexive-transitive closure, widening, path interpolation and
//! model-based projection.
//!
//! A [`Transition`] is a guard together with a partial map from program
//! variables to update terms. Program variables and the symbols derived from
//! them live in a [`Vocabulary`], which every operation that needs fresh
//! symbols borrows. Queries go through a [`solver::SolverConf`].

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod binding;
pub mod domain;
pub mod error;
pub mod interpolate;
pub mod iteration;
pub mod mbp;
pub mod star;
pub mod subscript;
pub mod transition;
pub mod widen;

pub use binding::{Var, Vocabulary};
pub use error::QueryError;
pub use transition::{Equivalence, Projection, Transition, TransitionFormula};
