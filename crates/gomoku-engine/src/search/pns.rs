//! Proof-number search over AND/OR trees, and the almost-win driver that
//! evaluates its leaves with VCX.

use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use tracing::debug;

use crate::eval::ScoreManager;
use crate::search::control::{CancelToken, SearchControl};
use crate::search::mcts::NodeId;
use crate::search::vcx::Vcx;

/// Proof or disproof number of a decided node.
pub const INFINITY: u32 = u32::MAX >> 1;

/// Whether a node is decided for the prover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The prover wins.
    Proven,
    /// The prover cannot win.
    Disproven,
    /// Not decided yet.
    Unknown,
}

/// OR nodes are the prover's choice, AND nodes the opponent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The opponent moves; every child must be proven.
    And,
    /// The prover moves; one proven child suffices.
    Or,
}

#[derive(Debug, Clone)]
struct PnNode {
    pos: Option<Pos>,
    color: Color,
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    proof: u32,
    disproof: u32,
    status: Status,
    win_move: Option<Pos>,
}

/// Leaf evaluation and move generation for a [`ProofTree`].
pub trait Prover {
    /// A forced win for `mover` on `board`, if one is known.
    fn evaluate(&mut self, board: &Board, mover: Color) -> Option<Pos>;

    /// Moves for `mover` to expand a node with.
    fn generate(&mut self, board: &Board, mover: Color) -> Vec<Pos>;

    /// Whether another expansion may run after `iterations` of them.
    fn resources_available(&self, iterations: u64) -> bool;
}

/// An AND/OR tree rooted at one position with the prover to move.
#[derive(Debug, Clone)]
pub struct ProofTree {
    board: Board,
    nodes: Vec<PnNode>,
}

impl ProofTree {
    /// The root node.
    pub const ROOT: NodeId = 0;

    /// A tree over `board`, whose last stone was `last`'s.
    pub fn new(board: Board, last: Color) -> ProofTree {
        ProofTree {
            board,
            nodes: vec![PnNode {
                pos: None,
                color: last,
                kind: Kind::Or,
                parent: None,
                children: Vec::new(),
                expanded: false,
                proof: 1,
                disproof: 1,
                status: Status::Unknown,
                win_move: None,
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

    /// Status of `id`.
    pub fn status(&self, id: NodeId) -> Status {
        self.nodes[id].status
    }

    /// Kind of `id`.
    pub fn kind(&self, id: NodeId) -> Kind {
        self.nodes[id].kind
    }

    /// Proof and disproof numbers of `id`.
    pub fn numbers(&self, id: NodeId) -> (u32, u32) {
        (self.nodes[id].proof, self.nodes[id].disproof)
    }

    /// The move leading to `id`.
    pub fn pos(&self, id: NodeId) -> Option<Pos> {
        self.nodes[id].pos
    }

    /// Children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// The child of `id` reached by `pos`.
    pub fn find_child(&self, id: NodeId, pos: Pos) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.nodes[child].pos == Some(pos))
    }

    /// The first proven child of `id`.
    pub fn win_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.status(child) == Status::Proven)
    }

    /// The VCX move that proved leaf `id`.
    pub fn win_move(&self, id: NodeId) -> Option<Pos> {
        self.nodes[id].win_move
    }

    fn board_at(&self, id: NodeId) -> Board {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if let Some(pos) = self.nodes[node].pos {
                path.push((pos, self.nodes[node].color));
            }
            cursor = self.nodes[node].parent;
        }
        let mut board = self.board.clone();
        for &(pos, color) in path.iter().rev() {
            board.put(pos, color);
        }
        board
    }

    fn set_status(&mut self, id: NodeId, status: Status) {
        let node = &mut self.nodes[id];
        node.status = status;
        match status {
            Status::Proven => {
                node.proof = 0;
                node.disproof = INFINITY;
            }
            Status::Disproven => {
                node.proof = INFINITY;
                node.disproof = 0;
            }
            Status::Unknown => {}
        }
    }

    fn evaluate<P: Prover + ?Sized>(&mut self, id: NodeId, board: &Board, prover: &mut P) {
        let mover = !self.nodes[id].color;
        if let Some(pos) = prover.evaluate(board, mover) {
            self.nodes[id].win_move = Some(pos);
            let status = match self.kind(id) {
                Kind::Or => Status::Proven,
                Kind::And => Status::Disproven,
            };
            self.set_status(id, status);
        }
    }

    fn select_most_proving(&self, root: NodeId) -> Option<NodeId> {
        let mut node = root;
        while self.nodes[node].expanded {
            let kind = self.kind(node);
            node = self
                .children(node)
                .iter()
                .copied()
                .filter(|&child| self.status(child) == Status::Unknown)
                .min_by_key(|&child| match kind {
                    Kind::And => self.nodes[child].disproof,
                    Kind::Or => self.nodes[child].proof,
                })?;
        }
        Some(node)
    }

    fn expand<P: Prover + ?Sized>(&mut self, id: NodeId, prover: &mut P) {
        let board = self.board_at(id);
        self.evaluate(id, &board, prover);
        if self.status(id) == Status::Unknown {
            let color = !self.nodes[id].color;
            let kind = match self.kind(id) {
                Kind::Or => Kind::And,
                Kind::And => Kind::Or,
            };
            for pos in prover.generate(&board, color) {
                let child = self.nodes.len();
                self.nodes.push(PnNode {
                    pos: Some(pos),
                    color,
                    kind,
                    parent: Some(id),
                    children: Vec::new(),
                    expanded: false,
                    proof: 1,
                    disproof: 1,
                    status: Status::Unknown,
                    win_move: None,
                });
                self.nodes[id].children.push(child);
            }
            if self.children(id).is_empty() {
                self.set_status(id, Status::Disproven);
            }
        }
        self.nodes[id].expanded = true;
    }

    fn set_numbers(&mut self, id: NodeId) {
        if !self.nodes[id].expanded {
            let node = &mut self.nodes[id];
            (node.proof, node.disproof) = match node.status {
                Status::Proven => (0, INFINITY),
                Status::Disproven => (INFINITY, 0),
                Status::Unknown => (1, 1),
            };
            return;
        }
        if self.children(id).is_empty() {
            return;
        }
        let (mut proof, mut disproof) = match self.kind(id) {
            Kind::And => (0, INFINITY),
            Kind::Or => (INFINITY, 0),
        };
        for &child in self.children(id) {
            let (p, d) = self.numbers(child);
            match self.kind(id) {
                Kind::And => {
                    proof = proof.saturating_add(p).min(INFINITY);
                    disproof = disproof.min(d);
                }
                Kind::Or => {
                    proof = proof.min(p);
                    disproof = disproof.saturating_add(d).min(INFINITY);
                }
            }
        }
        self.nodes[id].proof = proof;
        self.nodes[id].disproof = disproof;
        if proof == 0 {
            self.set_status(id, Status::Proven);
        } else if disproof == 0 {
            self.set_status(id, Status::Disproven);
        }
    }

    fn update_ancestors(&mut self, id: NodeId, root: NodeId) {
        let mut node = id;
        while node != root {
            if !self.children(node).is_empty() {
                let before = self.numbers(node);
                self.set_numbers(node);
                if self.numbers(node) == before {
                    return;
                }
            }
            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => return,
            }
        }
        self.set_numbers(root);
    }

    /// Expand most-proving nodes below `root` until it is decided or the
    /// prover runs out of resources. Returns the number of expansions.
    pub fn search<P: Prover + ?Sized>(&mut self, root: NodeId, prover: &mut P) -> u64 {
        let board = self.board_at(root);
        self.evaluate(root, &board, prover);
        self.set_numbers(root);

        let mut iterations = 0;
        while self.nodes[root].proof != 0
            && self.nodes[root].disproof != 0
            && prover.resources_available(iterations)
        {
            let Some(node) = self.select_most_proving(root) else {
                break;
            };
            self.expand(node, prover);
            self.update_ancestors(node, root);
            iterations += 1;
        }
        debug!(
            iterations,
            nodes = self.len(),
            status = ?self.status(root),
            "pns finished"
        );
        iterations
    }
}

/// Default wall-clock budget of [`AlmostPnsWin`].
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(600);

/// Default number of expansions of [`AlmostPnsWin`].
pub const DEFAULT_NODE_LIMIT: u64 = 180_000;

/// Default leaf VCX depth of [`AlmostPnsWin`].
pub const DEFAULT_VCX_DEPTH: i32 = 9;

struct VcxProver<'a> {
    control: &'a SearchControl,
    node_limit: u64,
    vcx_depth: i32,
}

impl Prover for VcxProver<'_> {
    fn evaluate(&mut self, board: &Board, mover: Color) -> Option<Pos> {
        Vcx::new(mover, self.vcx_depth)
            .search(board, self.control.token())
            .map(|mv| mv.pos)
    }

    fn generate(&mut self, board: &Board, mover: Color) -> Vec<Pos> {
        ScoreManager::new(board.clone()).candidates(mover)
    }

    fn resources_available(&self, iterations: u64) -> bool {
        !self.control.should_stop() && iterations < self.node_limit
    }
}

/// Proves a win for `color` by PNS with VCX at the leaves.
///
/// The proof tree is kept between calls and followed as long as the game
/// stays inside it.
#[derive(Debug, Clone)]
pub struct AlmostPnsWin {
    color: Color,
    budget: Duration,
    node_limit: u64,
    vcx_depth: i32,
    tree: Option<ProofTree>,
    current: NodeId,
}

impl AlmostPnsWin {
    /// A search for `color`.
    pub fn new(color: Color, budget: Duration, node_limit: u64, vcx_depth: i32) -> AlmostPnsWin {
        AlmostPnsWin {
            color,
            budget,
            node_limit,
            vcx_depth,
            tree: None,
            current: ProofTree::ROOT,
        }
    }

    /// Find a winning move on `board`, where `self.color` is to move.
    pub fn find(&mut self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let tree = self.tree.get_or_insert_with(|| {
            self.current = ProofTree::ROOT;
            ProofTree::new(board.clone(), !self.color)
        });
        let node = self.current;
        if tree.status(node) == Status::Unknown {
            let control = SearchControl::new_timed(cancel.clone(), self.budget);
            let mut prover = VcxProver {
                control: &control,
                node_limit: self.node_limit,
                vcx_depth: self.vcx_depth,
            };
            tree.search(node, &mut prover);
        }
        if tree.status(node) != Status::Proven {
            return None;
        }
        if let Some(child) = tree.win_child(node) {
            self.current = child;
            return tree.pos(child).map(Move::winning);
        }
        let pos = tree.win_move(node);
        self.tree = None;
        pos.map(Move::winning)
    }

    /// Follow a move played on the board; leaving the tree drops it.
    pub fn on_move_played(&mut self, pos: Pos) {
        let Some(tree) = &self.tree else {
            return;
        };
        if tree.pos(self.current) == Some(pos) {
            return;
        }
        match tree.find_child(self.current, pos) {
            Some(child) => self.current = child,
            None => self.tree = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;

    fn board(transcript: &str) -> Board {
        Board::from_moves(&decode(transcript).unwrap()).unwrap()
    }

    /// Two moves per node; the prover wins any position with two stones.
    struct TwoPly;

    impl Prover for TwoPly {
        fn evaluate(&mut self, board: &Board, _mover: Color) -> Option<Pos> {
            (board.steps() == 2).then_some(Pos::CENTER)
        }

        fn generate(&mut self, board: &Board, _mover: Color) -> Vec<Pos> {
            if board.steps() >= 2 {
                return Vec::new();
            }
            Pos::all().filter(|&p| board.is_empty_at(p)).take(2).collect()
        }

        fn resources_available(&self, iterations: u64) -> bool {
            iterations < 100
        }
    }

    #[test]
    fn and_node_needs_every_child() {
        let mut tree = ProofTree::new(Board::new(), Color::White);
        tree.search(ProofTree::ROOT, &mut TwoPly);
        assert_eq!(tree.status(ProofTree::ROOT), Status::Proven);
        let child = tree.win_child(ProofTree::ROOT).unwrap();
        assert_eq!(tree.kind(child), Kind::And);
        assert!(
            tree.children(child)
                .iter()
                .all(|&c| tree.status(c) == Status::Proven)
        );
        assert_eq!(tree.numbers(ProofTree::ROOT), (0, INFINITY));
    }

    /// Never wins and never runs out of moves until the board has one stone.
    struct Hopeless;

    impl Prover for Hopeless {
        fn evaluate(&mut self, _board: &Board, _mover: Color) -> Option<Pos> {
            None
        }

        fn generate(&mut self, board: &Board, _mover: Color) -> Vec<Pos> {
            if board.steps() >= 1 {
                return Vec::new();
            }
            vec![Pos::CENTER]
        }

        fn resources_available(&self, _iterations: u64) -> bool {
            true
        }
    }

    #[test]
    fn childless_nodes_are_disproven() {
        let mut tree = ProofTree::new(Board::new(), Color::White);
        tree.search(ProofTree::ROOT, &mut Hopeless);
        assert_eq!(tree.status(ProofTree::ROOT), Status::Disproven);
    }

    #[test]
    fn leaf_proven_root_returns_its_vcx_move() {
        let b = board("H8 H9 I8 I9 J8 A1");
        let mut search = AlmostPnsWin::new(Color::Black, Duration::from_secs(30), 100, 9);
        let mv = search.find(&b, &CancelToken::new()).unwrap();
        assert!(mv.winning);
        assert!([Pos::at(6, 7), Pos::at(10, 7)].contains(&mv.pos));
    }

    #[test]
    fn node_limit_gives_up() {
        let b = board("H8 I9");
        let mut search = AlmostPnsWin::new(Color::Black, Duration::from_secs(30), 3, 5);
        assert_eq!(search.find(&b, &CancelToken::new()), None);
    }

    #[test]
    fn leaving_the_tree_drops_it() {
        let b = board("H8 I9");
        let mut search = AlmostPnsWin::new(Color::Black, Duration::from_secs(30), 3, 5);
        let _ = search.find(&b, &CancelToken::new());
        assert!(search.tree.is_some());
        search.on_move_played(Pos::at(0, 0));
        assert!(search.tree.is_none());
    }
}
