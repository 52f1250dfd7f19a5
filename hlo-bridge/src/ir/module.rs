use crate::ir::Block;
use crate::ir::GuardedRegion;
use crate::ir::Op;
use crate::ir::Operation;
use crate::ir::OperationName;
use crate::ir::Region;
use crate::ir::shared_op;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use std::fmt::Display;
use std::fmt::Formatter;

// See `include/mlir/IR/BuiltinOps.h` and goto definition of
// `mlir/IR/BuiltinOps.h.inc`.
pub struct ModuleOp {
    operation: Shared<Operation>,
}

impl Op for ModuleOp {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn operation(&self) -> &Shared<Operation> {
        &self.operation
    }
    fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        write!(f, "module ")?;
        match self.body_region() {
            Ok(region) => region.rd().display(f, indent),
            Err(_) => write!(f, "{{\n}}"),
        }
    }
}

impl Display for ModuleOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Op::display(self, f, 0)
    }
}

impl ModuleOp {
    pub fn operation_name() -> OperationName {
        OperationName::new("module".to_string())
    }
    /// Create a module with one region that holds one empty block.
    pub fn new() -> Shared<dyn Op> {
        let region: Shared<Region> = Shared::new(Region::default().into());
        region.add_block(Block::default());
        let mut operation = Operation::new(Self::operation_name());
        operation.set_regions(vec![region]);
        let operation = Shared::new(operation.into());
        shared_op(ModuleOp { operation })
    }
    pub fn body_region(&self) -> Result<Shared<Region>> {
        match self.operation.rd().region(0) {
            Some(region) => Ok(region),
            None => Err(anyhow::anyhow!("Expected 1 region in module, got 0")),
        }
    }
    /// The block that holds the top-level ops of the module.
    pub fn body(&self) -> Result<Shared<Block>> {
        match self.body_region()?.rd().block(0) {
            Some(block) => Ok(block),
            None => Err(anyhow::anyhow!("Expected 1 block in module, got 0")),
        }
    }
    pub fn first_op(&self) -> Result<Shared<dyn Op>> {
        let ops = self.body()?.rd().ops();
        match ops.first() {
            Some(op) => Ok(op.clone()),
            None => Err(anyhow::anyhow!("Expected 1 op, got 0")),
        }
    }
}

/// Return the body block of `op` if it is a [ModuleOp].
pub fn module_body(op: &Shared<dyn Op>) -> Result<Shared<Block>> {
    let op = op.rd();
    match op.as_any().downcast_ref::<ModuleOp>() {
        Some(module) => module.body(),
        None => Err(anyhow::anyhow!("Expected module, got {}", op.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GuardedBlock;

    #[test]
    fn test_empty_module() {
        let module = ModuleOp::new();
        assert_eq!(module.rd().to_string(), "module {\n}");
        let body = module_body(&module).unwrap();
        assert!(body.ops().is_empty());
        let region = body.rd().parent().unwrap();
        let parent = region.rd().parent().unwrap();
        assert_eq!(parent.rd().name().to_string(), "module");
    }
}
