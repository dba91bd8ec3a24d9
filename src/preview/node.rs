//! Typed nodes of the action tree preview.
//!
//! The preview mirrors, node by node, the shape of the action tree the
//! backend will build. Each node is one variant of [`ActionNode`]; invalid
//! field combinations are unrepresentable by construction.

use serde::{Deserialize, Serialize};

use crate::grid::Card;

/// Betting round tied to a board stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Street {
    Flop,
    Turn,
    River,
}

impl Street {
    /// Street implied by the number of board cards (3-5).
    pub fn from_board_len(len: usize) -> Option<Street> {
        match len {
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    /// The next street, if any.
    pub fn next(&self) -> Option<Street> {
        match self {
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Short name for display.
    pub fn short_name(&self) -> &'static str {
        match self {
            Street::Flop => "Flop",
            Street::Turn => "Turn",
            Street::River => "River",
        }
    }
}

/// The two sides of a heads-up pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Out of position - first to act postflop.
    Oop,
    /// In position.
    Ip,
}

impl Side {
    /// The other side.
    pub fn opponent(&self) -> Side {
        match self {
            Side::Oop => Side::Ip,
            Side::Ip => Side::Oop,
        }
    }

    /// Index into `[oop, ip]` pairs such as the total-bet counters.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Side::Oop => 0,
            Side::Ip => 1,
        }
    }

    /// Short name for display.
    pub fn short_name(&self) -> &'static str {
        match self {
            Side::Oop => "OOP",
            Side::Ip => "IP",
        }
    }
}

/// Kind of a legal action at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionLabel {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// One legal action offered at a [`ActionNode::Player`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalAction {
    pub label: ActionLabel,
    /// Chip amount; 0 for fold/check/call labels that carry no size.
    pub amount: i32,
}

impl LegalAction {
    pub fn new(label: ActionLabel, amount: i32) -> Self {
        Self { label, amount }
    }

    /// Whether this action puts chips in voluntarily.
    pub fn is_aggressive(&self) -> bool {
        matches!(
            self.label,
            ActionLabel::Bet | ActionLabel::Raise | ActionLabel::AllIn
        )
    }

    /// Canonical line encoding: single letter plus optional amount.
    ///
    /// `F` fold, `C` call, `X` check, `B<amt>` bet, `R<amt>` raise,
    /// `A<amt>` all-in.
    pub fn encode(&self) -> String {
        match self.label {
            ActionLabel::Fold => "F".to_string(),
            ActionLabel::Call => "C".to_string(),
            ActionLabel::Check => "X".to_string(),
            ActionLabel::Bet => format!("B{}", self.amount),
            ActionLabel::Raise => format!("R{}", self.amount),
            ActionLabel::AllIn => format!("A{}", self.amount),
        }
    }
}

/// A candidate community card at a chance node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCard {
    pub card: Card,
    /// Whether this card has been revealed on this line.
    pub dealt: bool,
    /// Whether this card is unavailable (on the board or otherwise dead).
    pub dead: bool,
}

/// A node of the preview tree.
///
/// Nodes form a strictly increasing index sequence starting at the root
/// (index 0); a node's predecessor is the node before it in the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionNode {
    /// The tree root. Always index 0, exactly one per tree, immutable.
    Root {
        street: Street,
        board: Vec<Card>,
        pot: i32,
        stack: i32,
    },

    /// A card-reveal point between streets.
    Chance {
        street: Street,
        last_actor: Side,
        cards: Vec<CandidateCard>,
        pot: i32,
        stack: i32,
    },

    /// A decision point. `chosen` mutates as the user picks an action.
    Player {
        actor: Side,
        actions: Vec<LegalAction>,
        chosen: Option<usize>,
    },

    /// Line end: fold, or showdown pending (winner unknown).
    Terminal {
        last_actor: Side,
        winner: Option<Side>,
        pot: i32,
    },
}

impl ActionNode {
    /// Check if this is a terminal node.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionNode::Terminal { .. })
    }

    /// Check if this is a chance node.
    pub fn is_chance(&self) -> bool {
        matches!(self, ActionNode::Chance { .. })
    }

    /// Check if this is a player decision node.
    pub fn is_player(&self) -> bool {
        matches!(self, ActionNode::Player { .. })
    }

    /// OOP's showdown equity at a terminal: 1 if OOP won, 0 if IP won,
    /// `None` when the line ends in a pending showdown.
    pub fn winner_equity_oop(&self) -> Option<u8> {
        match self {
            ActionNode::Terminal {
                winner: Some(side), ..
            } => Some(match side {
                Side::Oop => 1,
                Side::Ip => 0,
            }),
            _ => None,
        }
    }
}
