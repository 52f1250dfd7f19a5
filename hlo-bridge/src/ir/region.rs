use crate::ir::Block;
use crate::ir::Op;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::shared::WeakShared;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// A list of blocks.
///
/// A region is owned by exactly one operation. Moving a region to another
/// operation moves the [Shared] handle and updates `parent`; the blocks and
/// the ops inside them are not copied.
#[derive(Default)]
pub struct Region {
    blocks: Vec<Shared<Block>>,
    parent: Option<WeakShared<dyn Op>>,
}

impl Region {
    pub fn new(blocks: Vec<Shared<Block>>) -> Self {
        Self {
            blocks,
            parent: None,
        }
    }
    pub fn blocks(&self) -> Vec<Shared<Block>> {
        self.blocks.clone()
    }
    pub fn block(&self, index: usize) -> Option<Shared<Block>> {
        self.blocks.get(index).cloned()
    }
    pub fn parent(&self) -> Option<Shared<dyn Op>> {
        self.parent.as_ref().and_then(|parent| parent.upgrade())
    }
    pub fn set_parent(&mut self, parent: Option<WeakShared<dyn Op>>) {
        self.parent = parent;
    }
    /// Ops in all blocks of this region (not recursive).
    pub fn ops(&self) -> Vec<Shared<dyn Op>> {
        let mut result = Vec::new();
        for block in self.blocks.iter() {
            result.extend(block.rd().ops());
        }
        result
    }
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
    pub fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        writeln!(f, "{{")?;
        for block in self.blocks.iter() {
            block.rd().display(f, indent + 1)?;
        }
        let spaces = crate::ir::spaces(indent);
        write!(f, "{spaces}}}")
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

pub trait GuardedRegion {
    /// Append `block` to the region and set the region as its parent.
    fn add_block(&self, block: Block) -> Shared<Block>;
    fn add_empty_block(&self) -> Shared<Block>;
    fn blocks(&self) -> Vec<Shared<Block>>;
    fn ops(&self) -> Vec<Shared<dyn Op>>;
}

impl GuardedRegion for Shared<Region> {
    fn add_block(&self, block: Block) -> Shared<Block> {
        let block = Shared::new(block.into());
        block.wr().set_parent(Some(Arc::downgrade(self)));
        self.wr().blocks.push(block.clone());
        block
    }
    fn add_empty_block(&self) -> Shared<Block> {
        self.add_block(Block::default())
    }
    fn blocks(&self) -> Vec<Shared<Block>> {
        self.rd().blocks()
    }
    fn ops(&self) -> Vec<Shared<dyn Op>> {
        self.rd().ops()
    }
}
