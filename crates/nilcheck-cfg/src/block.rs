//! The per-function CFG shape consumed from the frontend (§6: "a CFG
//! builder producing per-function blocks with `nodes: [AST node]`,
//! `succs: [block]`, `live: bool`, `index: int`, and a distinguished return
//! terminator").
//!
//! Everything in this crate treats a [`Cfg`] as read-only input; the
//! preprocessor (§4.3) never mutates one in place, it builds a fresh one.

use nilcheck_track::{ExprNode, Stmt};

/// An index into a [`Cfg`]'s block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// How a block hands off to its successors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// This block ends in `return`; it has no successors of its own (the
    /// synthetic return block, §4.5, is reached by convention rather than
    /// by an edge here).
    Return,
    /// Unconditional handoff to a single successor.
    Fallthrough(BlockId),
    /// `cond` picks between `then_block` and `else_block`. By the time
    /// preprocessing (§4.3 step 1) has run, `cond` always reads as `x`,
    /// `!x`, or `x == nil`.
    Conditional {
        cond: ExprNode,
        then_block: BlockId,
        else_block: BlockId,
    },
}

/// One basic block: a straight-line list of statements plus a terminator.
#[derive(Debug, Clone)]
pub struct Block {
    pub index: u32,
    pub nodes: Vec<Stmt>,
    pub succs: Vec<BlockId>,
    pub live: bool,
    pub terminator: Terminator,
}

impl Block {
    pub fn id(&self) -> BlockId {
        BlockId(self.index)
    }
}

/// A whole function's control-flow graph.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    /// The synthetic return block every `return`-terminated block feeds
    /// into (§4.5: "seeds the iteration with a fresh root assertion node").
    pub return_block: BlockId,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    pub fn live_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.live)
    }

    /// Appends a new block and returns its id. Used by the preprocessor
    /// (§4.3) when building the copy it's allowed to mutate.
    pub fn push_block(&mut self, nodes: Vec<Stmt>, terminator: Terminator) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        let succs = match &terminator {
            Terminator::Return => vec![],
            Terminator::Fallthrough(b) => vec![*b],
            Terminator::Conditional {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
        };
        self.blocks.push(Block {
            index: id.0,
            nodes,
            succs,
            live: true,
            terminator,
        });
        id
    }

    pub fn predecessors(&self) -> Vec<Vec<BlockId>> {
        let mut preds = vec![Vec::new(); self.blocks.len()];
        for block in &self.blocks {
            for succ in &block.succs {
                preds[succ.0 as usize].push(block.id());
            }
        }
        preds
    }
}
