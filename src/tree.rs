//! Arena-allocated search tree.
//!
//! Nodes live in a single `Vec` and refer to each other by index. A child
//! records its parent's index as a plain back-reference; the arena owns
//! every node, so backpropagation just walks parent indices to the root.

use crate::GameState;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the search tree.
///
/// Holds its own copy of the game state reached at this node, the move and
/// player that led here, and the visit/win statistics used by UCT.
#[derive(Debug, Clone)]
pub struct Node<S: GameState> {
    /// Game state after `mv` was played
    state: S,
    /// Move that led to this node (None for root)
    mv: Option<S::Move>,
    /// Player who made `mv`; wins are credited to this player (None for root)
    mover: Option<S::Player>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Legal moves from `state` that have no child yet
    untried_moves: Vec<S::Move>,
    visits: u32,
    wins: u32,
}

impl<S: GameState> Node<S> {
    fn new(state: S, mv: Option<S::Move>, mover: Option<S::Player>, parent: Option<NodeId>) -> Self {
        let untried_moves = if state.is_terminal() {
            Vec::new()
        } else {
            state.get_possible_moves()
        };
        Self {
            state,
            mv,
            mover,
            parent,
            children: Vec::new(),
            untried_moves,
            visits: 0,
            wins: 0,
        }
    }

    /// Calculates the UCT score for this node.
    ///
    /// An unvisited node scores `INFINITY` so it is always tried before
    /// any visited sibling.
    ///
    /// # Arguments
    /// * `parent_visits` - The number of visits to the parent node.
    /// * `exploration_parameter` - The exploration constant `C`.
    pub fn uct(&self, parent_visits: u32, exploration_parameter: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.wins as f64 / visits
            + exploration_parameter * ((parent_visits as f64).ln() / visits).sqrt()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn mv(&self) -> Option<&S::Move> {
        self.mv.as_ref()
    }

    pub fn mover(&self) -> Option<S::Player> {
        self.mover
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn untried_moves(&self) -> &[S::Move] {
        &self.untried_moves
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }
}

/// Arena-allocated search tree, rebuilt for every search.
#[derive(Debug)]
pub struct Tree<S: GameState> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> Tree<S> {
    /// Create a tree whose root wraps `root_state`.
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![Node::new(root_state, None, None, None)],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> &Node<S> {
        self.get(NodeId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a child reached by playing `mv` from `parent`.
    ///
    /// `state` must be the parent's state with `mv` applied, and `mv` must
    /// be one of the parent's untried moves. The move is removed from the
    /// parent's untried moves and the parent's current player becomes the
    /// child's mover.
    pub fn add_child(&mut self, parent: NodeId, mv: S::Move, state: S) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = &mut self.nodes[parent.0];
        let mover = parent_node.state.get_current_player();
        let pos = parent_node.untried_moves.iter().position(|m| *m == mv);
        debug_assert!(pos.is_some(), "{:?} is not an untried move of {:?}", mv, parent);
        if let Some(pos) = pos {
            parent_node.untried_moves.remove(pos);
        }
        parent_node.children.push(id);
        self.nodes.push(Node::new(state, Some(mv), Some(mover), Some(parent)));
        id
    }

    /// Picks the child with the highest UCT score.
    ///
    /// Ties go to the first maximal child in insertion order. Returns None
    /// when the node has no children.
    pub fn select_child(&self, id: NodeId, exploration_parameter: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &node.children {
            let score = self.get(child).uct(node.visits, exploration_parameter);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Returns the most visited child, first one on ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.get(id).children {
            match best {
                Some(b) if self.get(child).visits <= self.get(b).visits => {}
                _ => best = Some(child),
            }
        }
        best
    }

    /// Records one playout result on `leaf` and every ancestor.
    ///
    /// Each node gains a visit; a node gains a win only when `winner` is
    /// the player who moved into it. A draw (`None`) credits nobody.
    pub fn backpropagate(&mut self, leaf: NodeId, winner: Option<S::Player>) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            if winner.is_some() && node.mover == winner {
                node.wins += 1;
            }
            current = node.parent;
        }
    }
}
