//! The action tree preview state machine.
//!
//! A [`PreviewSession`] owns a flat node sequence (root at index 0) and the
//! pot/stack arithmetic for the line currently being explored. The sole
//! mutating entry point is choosing an action at a player node; everything
//! else is navigation or pure bound computation.
//!
//! Mutation is copy-then-replace around the external call: a choice is
//! first *staged* (pure), the action provider is then awaited, and the
//! reply is *committed* only if the session has not moved on in the
//! meantime. A session epoch, bumped on every state change, guards against
//! a late reply clobbering newer state; [`PreviewSession::choose`] composes
//! the three steps. Holding `&mut self` across the await also means at most
//! one request per session is ever in flight.

use log::{debug, trace};

use crate::grid::{self, Card, DECK_SIZE};
use crate::preview::node::{ActionLabel, ActionNode, CandidateCard, LegalAction, Side, Street};
use crate::provider::{ActionProvider, ProviderError};
use thiserror::Error;

/// Errors from preview session operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    /// The board is not a valid 3-5 card postflop board.
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// Node index out of bounds.
    #[error("no node at index {0}")]
    NoSuchNode(usize),

    /// The target node is not a decision point.
    #[error("node {0} is not a player node")]
    NotAPlayerNode(usize),

    /// The target node is not a card-reveal point.
    #[error("node {0} is not a chance node")]
    NotAChanceNode(usize),

    /// The card is dead or was not offered by the provider.
    #[error("card {0} is not available to deal")]
    DeadCard(String),

    /// Action index out of bounds at the target node.
    #[error("no action {action} at node {node}")]
    NoSuchAction { node: usize, action: usize },

    /// The session changed between staging and committing; the reply must
    /// be discarded.
    #[error("stale preview request discarded")]
    StaleRequest,

    /// The provider reply does not match the staged request kind.
    #[error("provider reply does not match the staged request")]
    MismatchedReply,

    /// The external engine failed; local state is unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// What a staged choice leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Fold: append a terminal, no external call needed.
    Fold,
    /// River betting closed: append a showdown terminal, no external call.
    Showdown,
    /// Street complete: append a chance node plus a fresh OOP player node.
    Deal,
    /// Betting continues: append a player node for the other side.
    Continue,
}

/// A staged (not yet committed) choice at a player node.
///
/// Produced by [`PreviewSession::stage`]; pass the provider's reply to
/// [`PreviewSession::commit`]. `line` is the textual history to send to the
/// action provider, including the staged action itself.
#[derive(Debug, Clone)]
pub struct StagedChoice {
    epoch: u64,
    node_idx: usize,
    action_idx: usize,
    outcome: Outcome,
    /// Line to query the provider with, staged action included.
    pub line: Vec<String>,
}

impl StagedChoice {
    /// Whether committing this choice needs legal actions from the provider.
    pub fn needs_actions(&self) -> bool {
        matches!(self.outcome, Outcome::Deal | Outcome::Continue)
    }

    /// Whether committing this choice needs chance cards from the provider.
    pub fn needs_cards(&self) -> bool {
        self.outcome == Outcome::Deal
    }
}

/// Provider data required to commit a staged choice.
#[derive(Debug, Clone)]
pub enum ChoiceReply {
    /// For fold and showdown outcomes.
    None,
    /// For a continuing betting round: the next actor's legal actions.
    Actions(Vec<LegalAction>),
    /// For a street transition: possible next cards plus the fresh OOP
    /// player node's legal actions.
    Deal {
        cards: Vec<Card>,
        actions: Vec<LegalAction>,
    },
}

/// Per-street pot and investment arithmetic, replayed from the node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counters {
    /// Cumulative invested amount this street, `[oop, ip]`.
    total_bet: [i32; 2],
    /// Chips committed before the current street.
    pot_base: i32,
    /// Effective stack remaining entering the current street.
    stack_left: i32,
    street: Street,
    /// Player actions taken this street.
    actions_this_street: u8,
}

impl Counters {
    fn new(starting_pot: i32, effective_stack: i32, street: Street) -> Self {
        Self {
            total_bet: [0, 0],
            pot_base: starting_pot,
            stack_left: effective_stack,
            street,
            actions_this_street: 0,
        }
    }

    /// Apply a chosen action. Bet/raise/all-in amounts are street totals
    /// ("raise to"), matching the line encoding.
    fn apply_action(&mut self, actor: Side, action: &LegalAction) {
        match action.label {
            ActionLabel::Fold => {}
            ActionLabel::Check => {
                self.actions_this_street += 1;
            }
            ActionLabel::Call => {
                self.total_bet[actor.index()] = self.total_bet[actor.opponent().index()];
                self.actions_this_street += 1;
            }
            ActionLabel::Bet | ActionLabel::Raise | ActionLabel::AllIn => {
                self.total_bet[actor.index()] = action.amount;
                self.actions_this_street += 1;
            }
        }
    }

    /// Cross a street boundary: fold the matched investment into the pot
    /// and reset the per-street state.
    fn apply_chance(&mut self, street: Street) {
        let matched = self.total_bet[0];
        self.pot_base += 2 * matched;
        self.stack_left -= matched;
        self.total_bet = [0, 0];
        self.actions_this_street = 0;
        self.street = street;
    }

    /// Both sides matched and at least one voluntary action occurred.
    fn street_complete(&self) -> bool {
        self.total_bet[0] == self.total_bet[1] && self.actions_this_street >= 2
    }

    fn max_total(&self) -> i32 {
        self.total_bet[0].max(self.total_bet[1])
    }

    fn min_total(&self) -> i32 {
        self.total_bet[0].min(self.total_bet[1])
    }
}

/// In-memory preview of a line through the action tree.
///
/// Created fresh per board/stack configuration and discarded on
/// reconfiguration; never persisted.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    starting_pot: i32,
    effective_stack: i32,
    board: Vec<Card>,
    nodes: Vec<ActionNode>,
    selected: usize,
    counters: Counters,
    /// Amount the selected actor had already invested this street before
    /// the in-progress bet.
    prev_bet: i32,
    /// Bet amount currently being sized by the user.
    bet_amount: i32,
    locked: bool,
    epoch: u64,
}

impl PreviewSession {
    /// Create a session for a board (3-5 cards, no duplicates), starting
    /// pot, and effective stack. The node sequence starts with the single
    /// root node.
    pub fn new(board: Vec<Card>, starting_pot: i32, effective_stack: i32) -> Result<Self, PreviewError> {
        let street = Street::from_board_len(board.len())
            .ok_or_else(|| PreviewError::InvalidBoard(format!("{} cards", board.len())))?;
        for i in 0..board.len() {
            for j in (i + 1)..board.len() {
                if board[i] == board[j] {
                    return Err(PreviewError::InvalidBoard(format!(
                        "duplicate card {}",
                        grid::card_to_string(board[i])
                    )));
                }
            }
        }

        let root = ActionNode::Root {
            street,
            board: board.clone(),
            pot: starting_pot,
            stack: effective_stack,
        };

        Ok(Self {
            starting_pot,
            effective_stack,
            board,
            nodes: vec![root],
            selected: 0,
            counters: Counters::new(starting_pot, effective_stack, street),
            prev_bet: 0,
            bet_amount: 0,
            locked: false,
            epoch: 0,
        })
    }

    /// The node sequence, root first.
    pub fn nodes(&self) -> &[ActionNode] {
        &self.nodes
    }

    /// Index of the currently selected node.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The currently selected node.
    pub fn selected_node(&self) -> &ActionNode {
        &self.nodes[self.selected]
    }

    /// Whether further edits are disabled (a terminal is selected).
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Per-side cumulative investment for the active street, `[oop, ip]`.
    pub fn total_bet(&self) -> [i32; 2] {
        self.counters.total_bet
    }

    /// The street the line is currently on.
    pub fn street(&self) -> Street {
        self.counters.street
    }

    /// Whether the line has reached an all-in investment level.
    pub fn is_after_all_in(&self) -> bool {
        self.counters.max_total() >= self.counters.stack_left
    }

    /// Set the in-progress bet amount (display sizing only).
    pub fn set_bet_amount(&mut self, amount: i32) {
        self.bet_amount = amount;
    }

    /// The most the selected actor can add without exceeding the stack,
    /// after accounting for amounts already committed this street. 0 once
    /// locked.
    pub fn max_amount(&self) -> i32 {
        if self.locked {
            return 0;
        }
        self.counters.stack_left - (self.counters.max_total() - self.prev_bet)
    }

    /// Minimum legal bet/raise: the size of the previous raise, clamped to
    /// at least one chip and never above [`Self::max_amount`].
    pub fn min_amount(&self) -> i32 {
        let max_amount = self.max_amount();
        let bet_minus = self.counters.stack_left - max_amount;
        let raise_to = 2 * self.counters.max_total() - self.counters.min_total() - bet_minus;
        raise_to.max(1).min(max_amount)
    }

    /// The in-progress bet as a fraction of the resulting pot (display).
    pub fn amount_rate(&self) -> f64 {
        let pot = self.counters.pot_base + 2 * self.counters.max_total();
        (self.bet_amount + self.prev_bet) as f64 / pot as f64
    }

    /// Canonical textual history of the explored line, root excluded:
    /// one encoded action per player node with a chosen action.
    pub fn line(&self) -> Vec<String> {
        self.encode_line(self.nodes.len())
    }

    /// Fetch the first OOP decision node from the provider. No-op if the
    /// line has already been started.
    pub async fn start<P>(&mut self, provider: &P) -> Result<(), PreviewError>
    where
        P: ActionProvider + ?Sized + Sync,
    {
        if self.nodes.len() > 1 {
            return Ok(());
        }
        let actions = provider.legal_actions(&[]).await?;
        debug!("preview line started with {} root actions", actions.len());
        self.nodes.push(ActionNode::Player {
            actor: Side::Oop,
            actions,
            chosen: None,
        });
        self.select_node(1)
    }

    /// Move the cursor without mutating the tree. Selecting a terminal
    /// locks the session; selecting anything else unlocks it so the user
    /// can branch and reconsider.
    pub fn select_node(&mut self, node_idx: usize) -> Result<(), PreviewError> {
        if node_idx >= self.nodes.len() {
            return Err(PreviewError::NoSuchNode(node_idx));
        }
        self.selected = node_idx;
        self.locked = self.nodes[node_idx].is_terminal();
        self.counters = self.replay_to(node_idx);
        self.prev_bet = match &self.nodes[node_idx] {
            ActionNode::Player { actor, .. } => self.counters.total_bet[actor.index()],
            _ => 0,
        };
        self.bet_amount = 0;
        self.epoch += 1;
        Ok(())
    }

    /// Mark which community card was revealed at a chance node. At most
    /// one candidate is dealt at a time; dead cards are rejected.
    pub fn deal_card(&mut self, node_idx: usize, card: Card) -> Result<(), PreviewError> {
        if node_idx >= self.nodes.len() {
            return Err(PreviewError::NoSuchNode(node_idx));
        }
        match &mut self.nodes[node_idx] {
            ActionNode::Chance { cards, .. } => {
                let pos = cards
                    .iter()
                    .position(|c| c.card == card && !c.dead)
                    .ok_or_else(|| PreviewError::DeadCard(grid::card_to_string(card)))?;
                for candidate in cards.iter_mut() {
                    candidate.dealt = false;
                }
                cards[pos].dealt = true;
                self.epoch += 1;
                Ok(())
            }
            _ => Err(PreviewError::NotAChanceNode(node_idx)),
        }
    }

    /// Choose an action at a player node: stage, query the provider, and
    /// commit. The sole mutating entry point that advances the line.
    ///
    /// A no-op while the session is locked. On provider failure the local
    /// state is left entirely intact.
    pub async fn choose<P>(
        &mut self,
        node_idx: usize,
        action_idx: usize,
        provider: &P,
    ) -> Result<(), PreviewError>
    where
        P: ActionProvider + ?Sized + Sync,
    {
        if self.locked {
            return Ok(());
        }
        let staged = self.stage(node_idx, action_idx)?;

        let reply = match staged.outcome {
            Outcome::Fold | Outcome::Showdown => ChoiceReply::None,
            Outcome::Continue => ChoiceReply::Actions(provider.legal_actions(&staged.line).await?),
            Outcome::Deal => {
                let cards = provider.chance_cards(&staged.line).await?;
                let actions = provider.legal_actions(&staged.line).await?;
                ChoiceReply::Deal { cards, actions }
            }
        };

        self.commit(staged, reply)
    }

    /// Stage a choice without mutating the session.
    ///
    /// The caller queries the provider according to
    /// [`StagedChoice::needs_actions`] / [`StagedChoice::needs_cards`] and
    /// then calls [`Self::commit`]. A choice staged against a locked
    /// session is rejected with [`PreviewError::StaleRequest`] at commit
    /// time.
    pub fn stage(&self, node_idx: usize, action_idx: usize) -> Result<StagedChoice, PreviewError> {
        let action = *self.player_action(node_idx, action_idx)?;

        let actor = match &self.nodes[node_idx] {
            ActionNode::Player { actor, .. } => *actor,
            _ => return Err(PreviewError::NotAPlayerNode(node_idx)),
        };

        let mut counters = self.replay_to(node_idx);
        counters.apply_action(actor, &action);

        let outcome = if action.label == ActionLabel::Fold {
            Outcome::Fold
        } else if counters.street_complete() {
            match counters.street.next() {
                Some(_) => Outcome::Deal,
                None => Outcome::Showdown,
            }
        } else {
            Outcome::Continue
        };

        let mut line = self.encode_line(node_idx);
        line.push(action.encode());
        trace!("staged {:?} at node {} -> {:?}", action.label, node_idx, outcome);

        Ok(StagedChoice {
            epoch: self.epoch,
            node_idx,
            action_idx,
            outcome,
            line,
        })
    }

    /// Commit a staged choice with the provider's reply, appending one or
    /// two nodes. Rejects the commit when the session has changed since
    /// staging, so a late reply can never clobber newer state.
    pub fn commit(&mut self, staged: StagedChoice, reply: ChoiceReply) -> Result<(), PreviewError> {
        // A locked session and a moved epoch both mean the staged choice
        // no longer applies; reject before touching anything.
        if self.locked || staged.epoch != self.epoch {
            return Err(PreviewError::StaleRequest);
        }

        let action = *self.player_action(staged.node_idx, staged.action_idx)?;
        let actor = match &self.nodes[staged.node_idx] {
            ActionNode::Player { actor, .. } => *actor,
            _ => return Err(PreviewError::NotAPlayerNode(staged.node_idx)),
        };

        let mut counters = self.replay_to(staged.node_idx);
        counters.apply_action(actor, &action);

        // Everything fallible happens here, before the node list is
        // touched, so an error leaves the displayed state fully intact.
        let appended = match (staged.outcome, reply) {
            (Outcome::Fold, ChoiceReply::None) => {
                let winner = actor.opponent();
                debug!("{} folds; {} wins", actor.short_name(), winner.short_name());
                vec![ActionNode::Terminal {
                    last_actor: actor,
                    winner: Some(winner),
                    pot: counters.pot_base + counters.total_bet[0] + counters.total_bet[1],
                }]
            }
            (Outcome::Showdown, ChoiceReply::None) => {
                debug!("river betting closed; showdown pending");
                vec![ActionNode::Terminal {
                    last_actor: actor,
                    winner: None,
                    pot: counters.pot_base + counters.total_bet[0] + counters.total_bet[1],
                }]
            }
            (Outcome::Deal, ChoiceReply::Deal { cards, actions }) => {
                let matched = counters.total_bet[0];
                let street = counters.street.next().ok_or(PreviewError::MismatchedReply)?;
                debug!("street complete; dealing {}", street.short_name());
                vec![
                    ActionNode::Chance {
                        street,
                        last_actor: actor,
                        cards: self.candidate_cards(&cards),
                        pot: counters.pot_base + 2 * matched,
                        stack: counters.stack_left - matched,
                    },
                    ActionNode::Player {
                        actor: Side::Oop,
                        actions,
                        chosen: None,
                    },
                ]
            }
            (Outcome::Continue, ChoiceReply::Actions(actions)) => {
                vec![ActionNode::Player {
                    actor: actor.opponent(),
                    actions,
                    chosen: None,
                }]
            }
            _ => return Err(PreviewError::MismatchedReply),
        };

        // Branching at an earlier node discards the stale suffix.
        self.nodes.truncate(staged.node_idx + 1);
        if let ActionNode::Player { chosen, .. } = &mut self.nodes[staged.node_idx] {
            *chosen = Some(staged.action_idx);
        }
        self.nodes.extend(appended);

        self.epoch += 1;
        self.select_node(self.nodes.len() - 1)
    }

    /// Encode the chosen actions of player nodes before `node_idx`.
    fn encode_line(&self, node_idx: usize) -> Vec<String> {
        let mut out = Vec::new();
        for node in self.nodes.iter().take(node_idx).skip(1) {
            if let ActionNode::Player {
                actions,
                chosen: Some(k),
                ..
            } = node
            {
                out.push(actions[*k].encode());
            }
        }
        out
    }

    /// Replay the chosen actions and street transitions strictly before
    /// `node_idx` into fresh counters.
    fn replay_to(&self, node_idx: usize) -> Counters {
        let root_street = match &self.nodes[0] {
            ActionNode::Root { street, .. } => *street,
            _ => Street::Flop,
        };
        let mut counters = Counters::new(self.starting_pot, self.effective_stack, root_street);
        for node in self.nodes.iter().take(node_idx).skip(1) {
            match node {
                ActionNode::Player {
                    actor,
                    actions,
                    chosen: Some(k),
                } => counters.apply_action(*actor, &actions[*k]),
                ActionNode::Chance { street, .. } => counters.apply_chance(*street),
                _ => {}
            }
        }
        counters
    }

    fn player_action(&self, node_idx: usize, action_idx: usize) -> Result<&LegalAction, PreviewError> {
        match self.nodes.get(node_idx) {
            None => Err(PreviewError::NoSuchNode(node_idx)),
            Some(ActionNode::Player { actions, .. }) => {
                actions.get(action_idx).ok_or(PreviewError::NoSuchAction {
                    node: node_idx,
                    action: action_idx,
                })
            }
            Some(_) => Err(PreviewError::NotAPlayerNode(node_idx)),
        }
    }

    /// Build the candidate card list for a chance node: every deck card,
    /// dead unless the provider offered it as a possible next card.
    fn candidate_cards(&self, live: &[Card]) -> Vec<CandidateCard> {
        (0..DECK_SIZE as Card)
            .map(|card| CandidateCard {
                card,
                dealt: false,
                dead: self.board.contains(&card) || !live.contains(&card),
            })
            .collect()
    }
}
