// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Quantifier-free formulas over linear and nonlinear arithmetic: syntax,
//! symbol contexts, rewriting, linear constraints and polyhedra, and models.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod context;
pub mod linear;
pub mod polyhedron;
pub mod printer;
pub mod semantics;
pub mod syntax;
pub mod term;
