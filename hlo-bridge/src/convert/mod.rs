//! Conversion logic for the bridge.
//!
//! This module contains the rewrite driver and the conversion passes that can
//! be applied to an IR. A conversion is a set of rewrites, one per operation
//! name, that is applied until no rewrite changes the IR anymore.

use crate::ir::spaces;
use crate::ir::Op;
use crate::ir::OperationName;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

mod stablehlo_to_mhlo;

pub use stablehlo_to_mhlo::convert_attr;
pub use stablehlo_to_mhlo::convert_attrs;
pub use stablehlo_to_mhlo::mhlo_kind;
pub use stablehlo_to_mhlo::populate_stablehlo_to_mhlo_patterns;
pub use stablehlo_to_mhlo::ConvertStablehloToMhlo;
pub use stablehlo_to_mhlo::StablehloToMhloOpConverter;
pub use stablehlo_to_mhlo::StablehloToMhloTypeConverter;

pub struct ChangedOp {
    pub op: Shared<dyn Op>,
}

impl ChangedOp {
    pub fn new(op: Shared<dyn Op>) -> Self {
        ChangedOp { op }
    }
}

impl PartialEq for ChangedOp {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.op, &other.op)
    }
}

/// Whether a rewrite changed the IR.
///
/// If a rewrite changes the IR, it returns the changed operation. Returning
/// the changed operation is required for rewrites that replace the top-level
/// operation.
#[derive(PartialEq)]
pub enum RewriteResult {
    Changed(ChangedOp),
    Unchanged,
}

impl RewriteResult {
    pub fn is_changed(&self) -> Option<&ChangedOp> {
        match self {
            RewriteResult::Changed(op) => Some(op),
            RewriteResult::Unchanged => None,
        }
    }
}

pub trait Rewrite: Send + Sync {
    /// The name of the rewrite; is used for logging.
    fn name(&self) -> &'static str;
    /// Returns true if the rewrite can be applied to the given operation.
    ///
    /// This method is not allowed to mutate the IR.
    fn is_match(&self, op: &dyn Op) -> Result<bool>;
    /// Applies the rewrite to the given operation.
    ///
    /// This method is allowed to mutate the IR. A rewrite that cannot be
    /// applied after all (a failed match) returns [RewriteResult::Unchanged]
    /// and leaves the IR as it was.
    fn rewrite(&self, op: Shared<dyn Op>) -> Result<RewriteResult>;
}

/// Rewrites keyed by the name of the operation that they apply to.
///
/// Each operation name has at most one rewrite.
#[derive(Default)]
pub struct RewritePatternSet {
    patterns: BTreeMap<OperationName, Box<dyn Rewrite>>,
}

impl RewritePatternSet {
    pub fn new() -> Self {
        Self::default()
    }
    /// Register `rewrite` for operations named `name`.
    pub fn add(&mut self, name: OperationName, rewrite: Box<dyn Rewrite>) -> Result<()> {
        if self.patterns.contains_key(&name) {
            return Err(anyhow::anyhow!("a pattern for {name} is already registered"));
        }
        self.patterns.insert(name, rewrite);
        Ok(())
    }
    pub fn get(&self, name: &OperationName) -> Option<&dyn Rewrite> {
        self.patterns.get(name).map(|rewrite| rewrite.as_ref())
    }
    /// The registered operation names in sorted order.
    pub fn names(&self) -> Vec<OperationName> {
        self.patterns.keys().cloned().collect()
    }
    pub fn len(&self) -> usize {
        self.patterns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Try the pattern for `op` and then walk the ops nested inside the result.
///
/// Returns the op that is now at the position of `op` and the number of
/// rewrites that changed the IR.
fn apply_patterns_helper(
    op: Shared<dyn Op>,
    patterns: &RewritePatternSet,
    indent: i32,
) -> Result<(Shared<dyn Op>, usize)> {
    let mut changes = 0;
    let name = op.rd().name();
    let op = match patterns.get(&name) {
        Some(rewrite) => {
            debug!("{}Matching {} with {}", spaces(indent), name, rewrite.name());
            let is_match = rewrite.is_match(&*op.rd())?;
            if is_match {
                debug!("{}--> Success", spaces(indent));
                match rewrite.rewrite(op.clone())? {
                    RewriteResult::Changed(changed) => {
                        debug!("{}----> Changed", spaces(indent));
                        changes += 1;
                        changed.op
                    }
                    RewriteResult::Unchanged => op,
                }
            } else {
                op
            }
        }
        None => op,
    };
    let nested = op.rd().ops();
    for nested_op in nested {
        let (_, nested_changes) = apply_patterns_helper(nested_op, patterns, indent + 1)?;
        changes += nested_changes;
    }
    Ok((op, changes))
}

/// Apply `patterns` to `root` and everything nested inside it until a fixed
/// point is reached.
///
/// Every walk visits each operation once, parents before the operations in
/// their regions. Walks are repeated until a walk changes nothing.
pub fn apply_patterns(root: Shared<dyn Op>, patterns: &RewritePatternSet) -> Result<RewriteResult> {
    let max_iterations = 10240;
    let mut root = root;
    let mut has_changed = false;
    for _ in 0..max_iterations {
        let (new_root, changes) = apply_patterns_helper(root, patterns, 0)?;
        root = new_root;
        if changes == 0 {
            if has_changed {
                return Ok(RewriteResult::Changed(ChangedOp::new(root)));
            } else {
                return Ok(RewriteResult::Unchanged);
            }
        }
        has_changed = true;
    }
    tracing::warn!("Too many rewrite iterations");
    Ok(RewriteResult::Changed(ChangedOp::new(root)))
}

/// A pass is a transformation that can be applied to the IR.
pub trait Pass {
    const NAME: &'static str;
    fn convert(op: Shared<dyn Op>) -> Result<RewriteResult>;
}
