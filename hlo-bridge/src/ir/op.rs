use crate::ir::Attribute;
use crate::ir::Block;
use crate::ir::Operation;
use crate::ir::OperationName;
use crate::ir::Region;
use crate::ir::Value;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::shared::WeakShared;
use anyhow::Result;
use parking_lot::RwLock;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// This is the trait that is implemented by all operations.
///
/// An [Op] wraps an [Operation] and gives it a dialect-specific meaning.
/// Generic code such as the rewrite driver only sees `dyn Op` and uses
/// [Op::as_any] to find out which concrete op it is looking at.
pub trait Op {
    fn as_any(&self) -> &dyn std::any::Any;
    fn operation(&self) -> &Shared<Operation>;
    /// Returns the name of the operation.
    /// This is a convenience method for `self.operation().name()`.
    fn name(&self) -> OperationName {
        let operation = self.operation().rd();
        operation.name()
    }
    fn regions(&self) -> Vec<Shared<Region>> {
        let operation = self.operation().rd();
        operation.regions()
    }
    fn attribute(&self, name: &str) -> Option<Attribute> {
        let operation = self.operation().rd();
        operation.attribute(name)
    }
    /// Return the result at the given index.
    fn result(&self, index: usize) -> Option<Shared<Value>> {
        let operation = self.operation().rd();
        operation.result(index)
    }
    /// Return ops that are children of this op (inside blocks that are inside
    /// the regions).
    fn ops(&self) -> Vec<Shared<dyn Op>> {
        let mut result = Vec::new();
        for region in self.regions() {
            result.extend(region.rd().ops());
        }
        result
    }
    fn parent(&self) -> Option<Shared<Block>> {
        let operation = self.operation().rd();
        operation.parent()
    }
    fn set_parent(&self, parent: Option<WeakShared<Block>>) {
        let mut operation = self.operation().wr();
        operation.set_parent(parent);
    }
    fn parent_op(&self) -> Option<Shared<dyn Op>> {
        let operation = self.operation().rd();
        operation.parent_op()
    }
    /// Replace self with `new` inside the parent block.
    ///
    /// The result values of the old operation are moved to `new`: they get
    /// the result types of `new` and point to `new` as their defining op. The
    /// value objects stay the same, so every operand that used a result of
    /// the old operation now uses the corresponding result of `new`.
    ///
    /// Regions are not touched. Fails without changing the IR if the number
    /// of results differs or if `self` cannot be found in its parent block.
    fn replace(&self, new: Shared<dyn Op>) -> Result<()> {
        let (results, parent) = {
            let operation = self.operation().rd();
            (operation.results(), operation.parent())
        };
        let types = {
            let new = new.rd();
            let new = new.operation().rd();
            new.result_types()
        };
        if types.len() != results.len() {
            return Err(anyhow::anyhow!(
                "cannot replace {} ({} results) by {} ({} results)",
                self.name(),
                results.len(),
                new.rd().name(),
                types.len()
            ));
        }
        // Root ops do not have a parent, so there is no block to update.
        if let Some(parent) = &parent {
            parent.wr().replace(self.operation(), new.clone())?;
        }
        for (value, typ) in results.iter().zip(types.iter()) {
            value.wr().set_type(typ.clone());
        }
        results.set_defining_op(&new);
        let new = new.rd();
        new.operation().wr().set_results(results);
        new.set_parent(parent.as_ref().map(Arc::downgrade));
        Ok(())
    }
    /// Display the operation with the given indentation.
    ///
    /// The caller is responsible for the leading spaces. `indent` is the
    /// level of the line on which the operation starts and is used for the
    /// nested regions.
    fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        let operation = self.operation().rd();
        operation.display(f, indent)
    }
}

impl Display for dyn Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

/// Put `op` behind a [Shared] handle and point its results and regions to it.
///
/// Every op that becomes part of the IR should go through this function since
/// the back-references can only be set once the handle exists.
pub fn shared_op<O: Op + 'static>(op: O) -> Shared<dyn Op> {
    let op: Shared<O> = Shared::new(RwLock::new(op));
    let op: Shared<dyn Op> = op;
    let operation = op.rd().operation().clone();
    let operation = operation.rd();
    operation.results().set_defining_op(&op);
    for region in operation.regions() {
        region.wr().set_parent(Some(Arc::downgrade(&op)));
    }
    op
}
