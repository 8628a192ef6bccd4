//! Permgraph - the permission dependency graph engine.
//!
//! This crate maintains the directed "depends-on" relationships between
//! permission definitions in an access-control catalog. It guarantees the
//! edge set stays acyclic, answers transitive-closure and shortest-path
//! queries, resolves many nodes in one pass, and memoizes expensive results
//! without ever serving stale data after a mutation.
//!
//! The engine never decides whether a *user* is authorized at request time;
//! it only maintains and queries prerequisite relationships between
//! permission definitions. Permission CRUD, role management and presentation
//! belong to the calling application, which reaches the engine through the
//! [`store::DependencyStore`] trait.

#![forbid(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod sync;
