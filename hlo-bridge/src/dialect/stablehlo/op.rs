use crate::dialect::hlo::hlo_op_kinds;
use crate::dialect::hlo::hlo_ops;
use crate::ir::Op;
use crate::ir::OpBuilder;
use crate::ir::Operation;
use crate::shared::Shared;
use anyhow::Result;

hlo_ops!(hlo_op_kinds, StablehloOpKind, "stablehlo");

/// An operation of the `stablehlo` dialect.
///
/// All kinds share this one type. Ops differ only in their name, operands,
/// attributes and regions, which are all generic parts of the [Operation].
pub struct StablehloOp {
    operation: Shared<Operation>,
    kind: StablehloOpKind,
}

impl StablehloOp {
    /// Wrap `operation`; its name decides the kind.
    pub fn from_operation(operation: Operation) -> Result<Self> {
        let kind = StablehloOpKind::of_operation(&operation)?;
        Ok(StablehloOp {
            operation: Shared::new(operation.into()),
            kind,
        })
    }
    /// Start building an operation of the given kind.
    pub fn builder(kind: StablehloOpKind) -> OpBuilder {
        OpBuilder::new(kind.operation_name())
    }
    pub fn kind(&self) -> StablehloOpKind {
        self.kind
    }
}

impl Op for StablehloOp {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn operation(&self) -> &Shared<Operation> {
        &self.operation
    }
}
