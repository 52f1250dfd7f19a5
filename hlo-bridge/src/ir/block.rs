use crate::ir::BlockArgument;
use crate::ir::Op;
use crate::ir::Operation;
use crate::ir::Region;
use crate::ir::Type;
use crate::ir::Value;
use crate::ir::Values;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::shared::WeakShared;
use anyhow::Result;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

pub struct Block {
    label: Option<String>,
    arguments: Values,
    ops: Vec<Shared<dyn Op>>,
    parent: Option<WeakShared<Region>>,
}

/// Two blocks are equal if they point to the same object.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Block {
    pub fn new(label: Option<String>, arguments: Values) -> Self {
        Self {
            label,
            arguments,
            ops: vec![],
            parent: None,
        }
    }
    pub fn label(&self) -> Option<String> {
        self.label.clone()
    }
    pub fn arguments(&self) -> Values {
        self.arguments.clone()
    }
    pub fn ops(&self) -> Vec<Shared<dyn Op>> {
        self.ops.clone()
    }
    pub fn parent(&self) -> Option<Shared<Region>> {
        self.parent.as_ref().and_then(|parent| parent.upgrade())
    }
    pub fn set_parent(&mut self, parent: Option<WeakShared<Region>>) {
        self.parent = parent;
    }
    /// Return the index of the op that wraps `operation`.
    pub fn index_of(&self, operation: &Shared<Operation>) -> Option<usize> {
        self.ops
            .iter()
            .position(|op| Arc::ptr_eq(op.rd().operation(), operation))
    }
    /// Put `new` at the position of the op that wraps `old`.
    ///
    /// The caller is responsible for setting the parent of `new`.
    pub fn replace(&mut self, old: &Shared<Operation>, new: Shared<dyn Op>) -> Result<()> {
        let index = match self.index_of(old) {
            Some(index) => index,
            None => {
                let name = old.rd().name();
                return Err(anyhow::anyhow!("could not find {name} in its parent block"));
            }
        };
        self.ops[index] = new;
        Ok(())
    }
    pub fn remove(&mut self, operation: &Shared<Operation>) -> Option<Shared<dyn Op>> {
        let index = self.index_of(operation)?;
        Some(self.ops.remove(index))
    }
    pub fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        if self.label.is_some() || !self.arguments.is_empty() {
            let spaces = crate::ir::spaces(indent - 1);
            let label = self.label.clone().unwrap_or_else(|| "^bb0".to_string());
            write!(f, "{spaces}{label}")?;
            if !self.arguments.is_empty() {
                let arguments = self
                    .arguments
                    .iter()
                    .map(|arg| match &*arg.rd() {
                        Value::BlockArgument(arg) => arg.to_string(),
                        Value::OpResult(res) => format!("{}", res.typ()),
                    })
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "({arguments})")?;
            }
            writeln!(f, ":")?;
        }
        for op in self.ops.iter() {
            let spaces = crate::ir::spaces(indent);
            write!(f, "{spaces}")?;
            op.rd().display(f, indent)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new(None, Values::default())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

/// Methods on a [Shared] block that need the handle itself, for example to
/// set the block as parent of a newly added op.
pub trait GuardedBlock {
    fn add_argument(&self, name: &str, typ: Arc<dyn Type>) -> Shared<Value>;
    fn push_op(&self, op: Shared<dyn Op>);
    fn ops(&self) -> Vec<Shared<dyn Op>>;
    fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result;
}

impl GuardedBlock for Shared<Block> {
    fn add_argument(&self, name: &str, typ: Arc<dyn Type>) -> Shared<Value> {
        let mut arg = BlockArgument::new(Some(name.to_string()), typ);
        arg.set_parent(Some(Arc::downgrade(self)));
        let value = Shared::new(Value::BlockArgument(arg).into());
        let mut block = self.wr();
        let mut arguments = block.arguments.vec();
        arguments.push(value.clone());
        block.arguments = Values::from_vec(arguments);
        value
    }
    /// Append `op` to the end of the block.
    fn push_op(&self, op: Shared<dyn Op>) {
        op.rd().set_parent(Some(Arc::downgrade(self)));
        self.wr().ops.push(op);
    }
    fn ops(&self) -> Vec<Shared<dyn Op>> {
        self.rd().ops()
    }
    fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        self.rd().display(f, indent)
    }
}
