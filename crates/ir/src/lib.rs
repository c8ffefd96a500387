//! Workflow intermediate representation for Cadence
//!
//! A Cadence program is a tree of named steps assembled in memory and
//! handed, fully built, to the validator and the renderer. This crate
//! defines that tree and nothing else: it performs no validation beyond
//! what the types make unrepresentable, no I/O, and no execution.
//!
//! # Key Concepts
//!
//! - **Step**: one instruction or control structure. A closed sum — leaf
//!   instructions (`Assign`, `Call`, `Raise`, `Return`) and control
//!   structures that nest further steps (`Switch`, `TryExcept`,
//!   `StepsBlock`, `For`, `Parallel`).
//! - **NamedStep**: a step together with its declared name. Names are the
//!   only way control transfers refer to other steps; nesting is the only
//!   structural relation.
//! - **Workflow**: an ordered list of named steps plus declared
//!   parameters — either the entry workflow `"main"` or a named
//!   subworkflow.
//! - **WorkflowApp**: one main workflow plus any number of subworkflows.
//!
//! # Design Principles
//!
//! 1. Nesting is a tree. Every step is owned by exactly one parent list;
//!    jump and call targets are plain strings resolved by name, never
//!    back-references.
//! 2. Exclusive payloads are sum types. A switch condition jumps *or*
//!    nests steps, a loop iterates a value *or* a range, a parallel runs
//!    branches *or* a loop — each is an enum, so the ill-formed
//!    combinations cannot be constructed.
//! 3. The IR stays inert. Name uniqueness, target resolution, and call
//!    arity are cross-cutting properties checked by `cadence-validate`,
//!    not by constructors.

#![deny(unsafe_code)]

mod retry;
mod step;
mod value;
mod workflow;

pub use retry::*;
pub use step::*;
pub use value::*;
pub use workflow::*;
