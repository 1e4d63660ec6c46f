//! Monte-Carlo tree search with VCX-assisted playouts.
//!
//! Nodes live in an arena ([`Tree`]) and refer to each other by index. A
//! node only stores the move that led to it; its board is replayed from the
//! root when needed.

use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::eval::ScoreManager;
use crate::search::control::{CancelToken, SearchControl};
use crate::search::vcx::Vcx;

/// Index of a node in a [`Tree`].
pub type NodeId = usize;

/// UCT exploration constant.
const EXPLORATION: f64 = 1.4;

/// Stones on the board before playouts start asking VCX.
const VCX_MIN_STEPS: usize = 10;

#[derive(Debug, Clone)]
struct Node {
    pos: Option<Pos>,
    player: Color,
    step: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    wins: u32,
    visits: u32,
    winner: Option<Color>,
    enemy_wins: usize,
}

/// An arena of search nodes rooted at one position.
///
/// Each node records the color that played its move (the root records the
/// color of the last stone on the board).
#[derive(Debug, Clone)]
pub struct Tree {
    board: Board,
    nodes: Vec<Node>,
}

impl Tree {
    /// The root node.
    pub const ROOT: NodeId = 0;

    /// A tree over `board` where the stones so far end with `player`'s.
    pub fn new(board: Board, player: Color) -> Tree {
        let step = board.steps();
        Tree {
            board,
            nodes: vec![Node {
                pos: None,
                player,
                step,
                parent: None,
                children: Vec::new(),
                wins: 0,
                visits: 0,
                winner: None,
                enemy_wins: 0,
            }],
        }
    }

    /// Number of nodes allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The move leading to `id`; `None` for the root.
    pub fn pos(&self, id: NodeId) -> Option<Pos> {
        self.nodes[id].pos
    }

    /// The color that played the move leading to `id`.
    pub fn player(&self, id: NodeId) -> Color {
        self.nodes[id].player
    }

    /// Stones on the board at `id`.
    pub fn step(&self, id: NodeId) -> usize {
        self.nodes[id].step
    }

    /// The proven winner below `id`, if decided.
    pub fn winner(&self, id: NodeId) -> Option<Color> {
        self.nodes[id].winner
    }

    /// Number of times `id` was visited.
    pub fn visits(&self, id: NodeId) -> u32 {
        self.nodes[id].visits
    }

    /// Children of `id`, in expansion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// The child of `id` reached by playing `pos`.
    pub fn find_child(&self, id: NodeId, pos: Pos) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.nodes[child].pos == Some(pos))
    }

    /// A child proven won for the side to move at `id`.
    pub fn win_child(&self, id: NodeId) -> Option<NodeId> {
        let winner = self.winner(id)?;
        if winner == self.player(id) {
            return None;
        }
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.winner(child) == Some(winner))
    }

    /// The most visited child of `id`.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .max_by_key(|&child| self.visits(child))
    }

    /// Replay the board at `id`.
    pub fn board_at(&self, id: NodeId) -> Board {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if let Some(pos) = self.nodes[node].pos {
                path.push((pos, self.nodes[node].player));
            }
            cursor = self.nodes[node].parent;
        }
        let mut board = self.board.clone();
        for &(pos, player) in path.iter().rev() {
            board.put(pos, player);
        }
        board
    }

    /// Add a child for every candidate of the side to move at `id`.
    pub fn expand(&mut self, id: NodeId, important_only: bool) {
        let board = self.board_at(id);
        let next = !self.player(id);
        let manager = ScoreManager::new(board);
        let candidates = if important_only {
            manager.important_candidates(next)
        } else {
            manager.candidates(next)
        };
        let step = self.step(id) + 1;
        for pos in candidates {
            let child = self.nodes.len();
            self.nodes.push(Node {
                pos: Some(pos),
                player: next,
                step,
                parent: Some(id),
                children: Vec::new(),
                wins: 0,
                visits: 0,
                winner: None,
                enemy_wins: 0,
            });
            self.nodes[id].children.push(child);
        }
    }

    /// Mark `id` as decided for `winner` and propagate upwards.
    ///
    /// A parent is won for `winner` as soon as one child is won by the
    /// parent's mover, and lost once every child is lost. Marking a node
    /// twice has no further effect.
    pub fn set_winner(&mut self, id: NodeId, winner: Color) {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if self.nodes[node].winner.is_some() {
                return;
            }
            self.nodes[node].winner = Some(winner);
            let Some(parent) = self.nodes[node].parent else {
                return;
            };
            if winner == self.nodes[node].player {
                cursor = Some(parent);
            } else {
                let par = &mut self.nodes[parent];
                par.enemy_wins += 1;
                cursor = (par.enemy_wins == par.children.len()).then_some(parent);
            }
        }
    }

    fn backpropagate(&mut self, id: NodeId, winner: Option<Color>) {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let node = &mut self.nodes[node];
            node.visits += 1;
            if Some(node.player) == winner {
                node.wins += 1;
            }
            cursor = node.parent;
        }
    }

    /// The child of `id` maximising the UCT score.
    pub fn uct_child(&self, id: NodeId) -> Option<NodeId> {
        let parent_visits = f64::from(self.visits(id).max(1));
        self.children(id).iter().copied().max_by(|&a, &b| {
            self.uct(a, parent_visits)
                .total_cmp(&self.uct(b, parent_visits))
        })
    }

    fn uct(&self, id: NodeId, parent_visits: f64) -> f64 {
        let node = &self.nodes[id];
        let visits = f64::from(node.visits.max(1));
        f64::from(node.wins) / visits + EXPLORATION * (parent_visits.ln() / visits).sqrt()
    }

    fn unvisited_or_best<P: Playout + ?Sized>(&self, id: NodeId, playout: &P) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.visits(child) == 0)
            .or_else(|| playout.best_child(self, id))
    }

    fn select<P: Playout + ?Sized>(&mut self, root: NodeId, playout: &P) -> NodeId {
        if self.winner(root).is_some() {
            return root;
        }
        let mut node = root;
        while !self.children(node).is_empty() {
            let Some(next) = self.unvisited_or_best(node, playout) else {
                return node;
            };
            node = next;
            if self.visits(node) == 0 || self.winner(node).is_some() {
                return node;
            }
        }
        self.expand(node, false);
        self.unvisited_or_best(node, playout).unwrap_or(node)
    }

    /// Run select / simulate / backpropagate from `root` until `playout`
    /// says to stop. Returns the number of iterations.
    pub(crate) fn run<P: Playout + ?Sized>(
        &mut self,
        root: NodeId,
        playout: &mut P,
        control: &SearchControl,
    ) -> u64 {
        let root_step = self.step(root);
        let mut iteration = 0;
        while !playout.finished(iteration, self, root, control) {
            let node = self.select(root, playout);
            let winner = match self.winner(node) {
                Some(winner) => Some(winner),
                None => playout.simulate(self, node, root_step, control.token()),
            };
            self.backpropagate(node, winner);
            iteration += 1;
        }
        debug!(
            iterations = iteration,
            nodes = self.len(),
            elapsed_ms = control.elapsed().as_millis() as u64,
            "mcts finished"
        );
        iteration
    }

    /// Decide `node` from its board: a completed five, or a VCX for the
    /// side to move once enough stones are down. Returns the winner.
    pub(crate) fn settle(
        &mut self,
        node: NodeId,
        board: &Board,
        root_step: usize,
        vcx_depth: i32,
        cancel: &CancelToken,
    ) -> Option<Color> {
        let player = self.player(node);
        if let Some(pos) = self.pos(node)
            && board.is_terminal(pos)
        {
            self.set_winner(node, player);
            return Some(player);
        }
        let step = self.step(node);
        if step > VCX_MIN_STEPS && step > root_step + 1 {
            let probe = Vcx::new(!player, vcx_depth);
            if probe.search(board, cancel).is_some() {
                self.set_winner(node, !player);
                return Some(!player);
            }
        }
        None
    }
}

/// The parts of the search loop that differ between MCTS variants.
pub(crate) trait Playout {
    /// Whether to stop before iteration `iteration`.
    fn finished(&self, iteration: u64, tree: &Tree, root: NodeId, control: &SearchControl) -> bool;

    /// Play out from `node` and return the winner, if any.
    fn simulate(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        root_step: usize,
        cancel: &CancelToken,
    ) -> Option<Color>;

    /// Child to descend into once every child has been visited.
    fn best_child(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        tree.uct_child(node)
    }
}

/// Default wall-clock budget of [`VcxMcts`].
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(10);

/// Default playout VCX depth of [`VcxMcts`].
pub const DEFAULT_SIM_DEPTH: i32 = 7;

/// Seed of the rollout generator.
const ROLLOUT_SEED: u64 = 16;

/// Rollouts pick uniformly among this many top candidates.
const ROLLOUT_WIDTH: usize = 5;

/// Iterations between budget checks.
const CHECK_INTERVAL: u64 = 1000;

/// Iterations before the visit-ratio cutoff applies.
const RATIO_MIN_ITERATIONS: u64 = 10_000;

/// Most/second-most visit ratio that ends the search.
const DECISIVE_RATIO: f64 = 4.0;

/// UCT search with random rollouts over the top candidates, cut short by a
/// VCX once the position is deep enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcxMcts {
    budget: Duration,
    sim_depth: i32,
    seed: u64,
}

impl Default for VcxMcts {
    fn default() -> Self {
        VcxMcts {
            budget: DEFAULT_BUDGET,
            sim_depth: DEFAULT_SIM_DEPTH,
            seed: ROLLOUT_SEED,
        }
    }
}

impl VcxMcts {
    /// A search with the given budget and playout VCX depth.
    pub fn new(budget: Duration, sim_depth: i32) -> VcxMcts {
        VcxMcts {
            budget,
            sim_depth,
            ..VcxMcts::default()
        }
    }

    /// Use a different rollout seed.
    pub fn with_seed(mut self, seed: u64) -> VcxMcts {
        self.seed = seed;
        self
    }

    /// Search `board` for the side to move.
    ///
    /// Returns the proven winning child if the root is decided in the
    /// mover's favour, otherwise the most visited child.
    pub fn search(&self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let mover = board.side_to_move();
        let mut tree = Tree::new(board.clone(), !mover);
        let control = SearchControl::new_timed(cancel.clone(), self.budget);
        let mut playout = RolloutPlayout {
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            sim_depth: self.sim_depth,
            budget: self.budget,
        };
        tree.run(Tree::ROOT, &mut playout, &control);

        let chosen = tree
            .win_child(Tree::ROOT)
            .or_else(|| tree.most_visited_child(Tree::ROOT))?;
        let pos = tree.pos(chosen)?;
        debug!(
            %pos,
            visits = tree.visits(chosen),
            decided = ?tree.winner(Tree::ROOT),
            "vcx-mcts chose"
        );
        Some(Move::new(pos))
    }
}

struct RolloutPlayout {
    rng: ChaCha8Rng,
    sim_depth: i32,
    budget: Duration,
}

impl Playout for RolloutPlayout {
    fn finished(&self, iteration: u64, tree: &Tree, root: NodeId, control: &SearchControl) -> bool {
        if tree.children(root).len() == 1 || tree.winner(root).is_some() {
            return true;
        }
        if control.token().is_cancelled() {
            return true;
        }
        if iteration % CHECK_INTERVAL == 0 {
            if iteration > RATIO_MIN_ITERATIONS && visit_ratio(tree, root) >= DECISIVE_RATIO {
                return true;
            }
            if control.elapsed() >= self.budget {
                return true;
            }
        }
        false
    }

    fn simulate(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        root_step: usize,
        cancel: &CancelToken,
    ) -> Option<Color> {
        let board = tree.board_at(node);
        let depth = if tree.step(node) > root_step + 3 {
            self.sim_depth
        } else {
            self.sim_depth + 2
        };
        if let Some(winner) = tree.settle(node, &board, root_step, depth, cancel) {
            return Some(winner);
        }

        let mut manager = ScoreManager::new(board);
        let mut next = !tree.player(node);
        loop {
            let moves = manager.candidates(next);
            if moves.is_empty() {
                return None;
            }
            let pick = moves[self.rng.gen_range(0..moves.len().min(ROLLOUT_WIDTH))];
            manager.place(pick, next);
            if manager.board().is_terminal(pick) {
                return Some(next);
            }
            next = !next;
        }
    }
}

/// Visits of the most visited child over the second most visited.
fn visit_ratio(tree: &Tree, root: NodeId) -> f64 {
    let children = tree.children(root);
    if children.len() <= 1 {
        return 1.0;
    }
    let mut first = 0;
    let mut second = 0;
    for &child in children {
        let visits = tree.visits(child);
        if visits > first {
            second = first;
            first = visits;
        } else if visits > second {
            second = visits;
        }
    }
    if second == 0 {
        return f64::INFINITY;
    }
    f64::from(first) / f64::from(second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;

    fn board(transcript: &str) -> Board {
        Board::from_moves(&decode(transcript).unwrap()).unwrap()
    }

    fn expanded(transcript: &str) -> Tree {
        let b = board(transcript);
        let last = !b.side_to_move();
        let mut tree = Tree::new(b, last);
        tree.expand(Tree::ROOT, false);
        tree
    }

    #[test]
    fn root_is_lost_only_when_every_child_is() {
        let mut tree = expanded("H8 I9 I8");
        let root_player = tree.player(Tree::ROOT);
        let children = tree.children(Tree::ROOT).to_vec();
        assert!(children.len() > 1);

        let (last, rest) = children.split_last().unwrap();
        for &child in rest {
            tree.set_winner(child, root_player);
            tree.set_winner(child, root_player);
        }
        assert_eq!(tree.winner(Tree::ROOT), None, "duplicate marks must not count twice");
        tree.set_winner(*last, root_player);
        assert_eq!(tree.winner(Tree::ROOT), Some(root_player));
        assert_eq!(tree.win_child(Tree::ROOT), None);
    }

    #[test]
    fn one_winning_child_decides_the_root() {
        let mut tree = expanded("H8 I9 I8");
        let mover = !tree.player(Tree::ROOT);
        let child = tree.children(Tree::ROOT)[2];
        tree.set_winner(child, mover);
        assert_eq!(tree.winner(Tree::ROOT), Some(mover));
        assert_eq!(tree.win_child(Tree::ROOT), Some(child));
    }

    #[test]
    fn board_at_replays_the_path() {
        let mut tree = expanded("H8 I9");
        let child = tree.children(Tree::ROOT)[0];
        tree.expand(child, false);
        let grandchild = tree.children(child)[0];
        let b = tree.board_at(grandchild);
        assert_eq!(b.steps(), 4);
        assert_eq!(b.at(tree.pos(child).unwrap()), Some(Color::Black));
        assert_eq!(b.at(tree.pos(grandchild).unwrap()), Some(Color::White));
    }

    #[test]
    fn finds_the_completing_five() {
        let b = board("H8 H9 I8 I9 J8 J9 K8 A1");
        let mv = VcxMcts::new(Duration::from_secs(5), 3)
            .search(&b, &CancelToken::new())
            .unwrap();
        assert!([Pos::at(6, 7), Pos::at(11, 7)].contains(&mv.pos));
    }

    #[test]
    fn cancelled_search_has_no_move() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(VcxMcts::default().search(&board("H8 I9"), &token), None);
    }

    #[test]
    fn short_budget_still_answers() {
        let b = board("H8 I9 I8");
        let mv = VcxMcts::new(Duration::from_millis(200), 3).search(&b, &CancelToken::new());
        let mv = mv.expect("a short search still picks a child");
        assert!(b.is_empty_at(mv.pos));
    }

    #[test]
    fn visit_ratio_handles_unvisited_runner_up() {
        let mut tree = expanded("H8 I9 I8");
        let first = tree.children(Tree::ROOT)[0];
        tree.backpropagate(first, None);
        assert_eq!(visit_ratio(&tree, Tree::ROOT), f64::INFINITY);
    }
}
