// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! High-level interface to a solver for quantifier-free arithmetic using
//! [`Term`](formula::syntax::Term)s.
//!
//! Two backends implement the [`Solver`] trait: [`imp::SmtSolver`] drives an
//! external SMT-LIB process (Z3 or CVC5) and [`native::NativeSolver`] decides
//! linear arithmetic in-process.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backends;
pub mod basics;
pub mod conf;
pub mod imp;
pub mod native;
pub mod sexp;

pub use basics::{CoreResp, ModelResp, Solver};
pub use conf::SolverConf;
pub use smtlib::path::solver_path;
pub use smtlib::proc::{SatResp, SolverError};
