use crate::ir::Op;
use crate::ir::Type;
use crate::ir::Value;
use crate::shared::Shared;
use crate::shared::SharedExt;
use std::fmt::Display;
use std::sync::Arc;

/// A use of a [Value] by an operation.
///
/// The operand does not own the value; the value is owned by the operation or
/// block that defines it.
#[derive(Clone)]
pub struct OpOperand {
    value: Shared<Value>,
}

impl OpOperand {
    pub fn new(value: Shared<Value>) -> Self {
        OpOperand { value }
    }
    pub fn value(&self) -> Shared<Value> {
        self.value.clone()
    }
    pub fn set_value(&mut self, value: Shared<Value>) {
        self.value = value;
    }
    /// If this `OpOperand` is the result of an operation, return the operation
    /// that defines it.
    pub fn defining_op(&self) -> Option<Shared<dyn Op>> {
        self.value.rd().defining_op()
    }
    pub fn typ(&self) -> Arc<dyn Type> {
        self.value.rd().typ()
    }
}

impl Display for OpOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value.rd())
    }
}

/// The ordered operands of an operation.
#[derive(Clone, Default)]
pub struct OpOperands {
    operands: Vec<OpOperand>,
}

impl OpOperands {
    pub fn from_vec(operands: Vec<OpOperand>) -> Self {
        OpOperands { operands }
    }
    /// Operands that use the given values, in order.
    pub fn from_values(values: &[Shared<Value>]) -> Self {
        let operands = values.iter().map(|v| OpOperand::new(v.clone())).collect();
        OpOperands { operands }
    }
    pub fn vec(&self) -> Vec<OpOperand> {
        self.operands.clone()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, OpOperand> {
        self.operands.iter()
    }
    pub fn get(&self, index: usize) -> Option<&OpOperand> {
        self.operands.get(index)
    }
    pub fn len(&self) -> usize {
        self.operands.len()
    }
    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }
    /// The values that the operands point to.
    pub fn values(&self) -> Vec<Shared<Value>> {
        self.operands.iter().map(|o| o.value()).collect()
    }
}

impl Display for OpOperands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .operands
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{joined}")
    }
}
