//! Dialect definitions.
//!
//! Dialects are collections of operations, attributes and types. The two HLO
//! dialects are built from the shared definitions in [hlo].

pub mod hlo;
pub mod mhlo;
pub mod stablehlo;
