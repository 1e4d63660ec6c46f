//! Almost-win MCTS: prove that one of a handful of forcing moves wins, then
//! keep replaying the proof.

use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use tracing::{debug, warn};

use crate::search::control::{CancelToken, SearchControl};
use crate::search::mcts::{NodeId, Playout, Tree};
use crate::search::vcx::Vcx;

/// Default budget per root child.
pub const DEFAULT_PER_CHILD: Duration = Duration::from_millis(2500);

/// Default playout VCX depth.
pub const DEFAULT_SIM_DEPTH: i32 = 9;

/// More forcing candidates than this and the search gives up.
const MAX_ROOT_CHILDREN: usize = 6;

/// Depth lost by each replayed VCX once the proof tree runs out.
const REPLAY_DEPTH_STEP: i32 = 2;

/// A proof found by an earlier call, followed as the game goes on.
#[derive(Debug, Clone)]
struct Proof {
    tree: Tree,
    /// The node of the last move played along the proof, if still on it.
    current: Option<NodeId>,
}

/// Proves a win for `color` by exhausting each forcing root move with a
/// VCX-only MCTS.
///
/// Once a proof is found the instance is sticky: later calls follow the
/// stored tree instead of searching again.
#[derive(Debug, Clone)]
pub struct AlmostMctsWin {
    color: Color,
    per_child: Duration,
    sim_depth: i32,
    proof: Option<Proof>,
}

impl AlmostMctsWin {
    /// A search for `color` with the given per-child budget and VCX depth.
    pub fn new(color: Color, per_child: Duration, sim_depth: i32) -> AlmostMctsWin {
        AlmostMctsWin {
            color,
            per_child,
            sim_depth,
            proof: None,
        }
    }

    /// Whether a proof has been found.
    pub fn is_proven(&self) -> bool {
        self.proof.is_some()
    }

    /// The current playout VCX depth.
    pub fn sim_depth(&self) -> i32 {
        self.sim_depth
    }

    /// Find a winning move on `board`, where `self.color` is to move.
    pub fn find(&mut self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        if self.proof.is_some() {
            return self.replay(board, cancel);
        }
        self.prove(board, cancel)
    }

    /// Follow a move played on the board.
    ///
    /// The defender's replies walk the proof tree; a reply the tree did not
    /// consider drops the position from the proof.
    pub fn on_move_played(&mut self, pos: Pos, color: Color) {
        if color == self.color {
            return;
        }
        if let Some(proof) = &mut self.proof {
            proof.current = proof
                .current
                .and_then(|node| proof.tree.find_child(node, pos));
        }
    }

    fn prove(&mut self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let mut tree = Tree::new(board.clone(), !self.color);
        tree.expand(Tree::ROOT, true);
        let children = tree.children(Tree::ROOT).to_vec();
        if children.len() > MAX_ROOT_CHILDREN {
            debug!(children = children.len(), "almost-mcts: too many forcing moves");
            return None;
        }

        let mut playout = VcxPlayout {
            sim_depth: self.sim_depth,
        };
        for child in children {
            let child_board = tree.board_at(child);
            let child_step = tree.step(child);
            tree.settle(child, &child_board, child_step, self.sim_depth, cancel);
            let control = SearchControl::new_timed(cancel.clone(), self.per_child);
            tree.run(child, &mut playout, &control);
            if tree.winner(Tree::ROOT) == Some(self.color) {
                let pos = tree.pos(child)?;
                debug!(%pos, nodes = tree.len(), "almost-mcts proved a win");
                self.proof = Some(Proof {
                    tree,
                    current: Some(child),
                });
                return Some(Move::winning(pos));
            }
            if cancel.is_cancelled() {
                break;
            }
        }
        None
    }

    fn replay(&mut self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let proof = self.proof.as_mut()?;
        let Some(node) = proof.current else {
            warn!("almost-mcts: defender left the proof tree");
            return None;
        };
        if proof.tree.children(node).is_empty() {
            let found = Vcx::new(self.color, self.sim_depth).search(board, cancel);
            self.sim_depth -= REPLAY_DEPTH_STEP;
            return found;
        }
        let Some(next) = proof.tree.win_child(node) else {
            warn!("almost-mcts: proof tree has no winning reply");
            proof.current = None;
            return None;
        };
        proof.current = Some(next);
        proof.tree.pos(next).map(Move::winning)
    }
}

/// Playouts that only ask VCX, with the least visited surviving child
/// explored next.
struct VcxPlayout {
    sim_depth: i32,
}

impl Playout for VcxPlayout {
    fn finished(&self, _iteration: u64, tree: &Tree, root: NodeId, control: &SearchControl) -> bool {
        control.should_stop() || tree.winner(root).is_some()
    }

    fn simulate(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        root_step: usize,
        cancel: &CancelToken,
    ) -> Option<Color> {
        let board = tree.board_at(node);
        tree.settle(node, &board, root_step, self.sim_depth, cancel)
    }

    fn best_child(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        let player = tree.player(node);
        tree.children(node)
            .iter()
            .copied()
            .filter(|&child| tree.winner(child) != Some(player))
            .min_by_key(|&child| tree.visits(child))
    }
}
