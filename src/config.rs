//! The assembled solver configuration.
//!
//! [`GameConfig`] collects everything the user edits before a solve: the
//! board, both ranges, pot/stack/rake parameters, and the per-street bet
//! size strings. It stays permissive while editing (bet strings may be
//! empty or invalid, ranges may be empty) and only [`GameConfig::validate`]
//! enforces completeness, gating [`GameConfig::build_request`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bets::{parse_bet_spec, validate_bets, BetSpec, Validity};
use crate::grid::{Card, DECK_SIZE};
use crate::preview::{PreviewError, PreviewSession, Side, Street};
use crate::range::RangeWeights;

/// Finalization failures, surfaced verbatim in the UI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{} range is empty", .0.short_name())]
    EmptyRange(Side),

    #[error("board has {0} cards, need at least 3")]
    IncompleteBoard(usize),

    /// A bet size string is empty or fails the grammar.
    #[error("{message}")]
    BadBetText {
        side: Side,
        street: Street,
        is_raise: bool,
        message: String,
    },
}

/// Raw bet and raise size strings for one (side, street) slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetSizeInputs {
    pub bet: String,
    pub raise: String,
}

/// Parsed bet and raise specs for one (side, street) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetBets {
    pub bet: BetSpec,
    pub raise: BetSpec,
}

/// Finalized payload handed to a [`crate::provider::TreeBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeBuildRequest {
    pub board: Vec<Card>,
    pub oop_range: RangeWeights,
    pub ip_range: RangeWeights,
    pub starting_pot: i32,
    pub effective_stack: i32,
    pub rake: f64,
    pub rake_cap: f64,
    /// Spare-to-pot percentage under which an all-in is added.
    pub add_all_in_threshold: f64,
    /// Pot percentage above which a bet is forced all-in.
    pub force_all_in_threshold: f64,
    /// Parsed sizes indexed `[side][street]` (OOP/IP, flop/turn/river).
    pub bet_sizes: [[StreetBets; 3]; 2],
}

/// Editable solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub board: Vec<Card>,
    pub oop_range: RangeWeights,
    pub ip_range: RangeWeights,
    pub starting_pot: i32,
    pub effective_stack: i32,
    pub rake: f64,
    pub rake_cap: f64,
    pub add_all_in_threshold: f64,
    pub force_all_in_threshold: f64,
    /// Raw size strings indexed `[side][street]` (OOP/IP, flop/turn/river).
    pub bet_sizes: [[BetSizeInputs; 3]; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: Vec::new(),
            oop_range: RangeWeights::default(),
            ip_range: RangeWeights::default(),
            starting_pot: 40,
            effective_stack: 100,
            rake: 0.0,
            rake_cap: 3.0,
            add_all_in_threshold: 0.0,
            force_all_in_threshold: 0.0,
            bet_sizes: Default::default(),
        }
    }
}

/// Slot index for a street in the `[flop, turn, river]` tables.
fn street_slot(street: Street) -> usize {
    match street {
        Street::Flop => 0,
        Street::Turn => 1,
        Street::River => 2,
    }
}

impl GameConfig {
    /// One side's range.
    pub fn range(&self, side: Side) -> &RangeWeights {
        match side {
            Side::Oop => &self.oop_range,
            Side::Ip => &self.ip_range,
        }
    }

    /// One side's range, mutable.
    pub fn range_mut(&mut self, side: Side) -> &mut RangeWeights {
        match side {
            Side::Oop => &mut self.oop_range,
            Side::Ip => &mut self.ip_range,
        }
    }

    /// Set one grid cell's weight for a side (clamped to `[0, 100]`).
    pub fn set_weight(&mut self, side: Side, idx: usize, weight: f32) {
        self.range_mut(side).set(idx, weight);
    }

    /// Reset a side's range to empty.
    pub fn clear_range(&mut self, side: Side) {
        self.range_mut(side).clear();
    }

    /// Whether a side's range carries no weight at all.
    pub fn range_is_empty(&self, side: Side) -> bool {
        self.range(side).is_empty()
    }

    /// Remove every board card.
    pub fn clear_board(&mut self) {
        self.board.clear();
    }

    /// Toggle a card onto or off the board. Adding is ignored once the
    /// board holds 5 cards. Returns whether the board changed.
    pub fn add_to_board(&mut self, card: Card) -> bool {
        if let Some(pos) = self.board.iter().position(|&c| c == card) {
            self.board.remove(pos);
            true
        } else if self.board.len() < 5 {
            self.board.push(card);
            true
        } else {
            false
        }
    }

    /// Replace the board with `n` distinct random cards (`n` clamped to
    /// 3-5).
    pub fn set_random_board<R: Rng + ?Sized>(&mut self, rng: &mut R, n: usize) {
        let n = n.clamp(3, 5);
        self.board = rand::seq::index::sample(rng, DECK_SIZE, n)
            .into_iter()
            .map(|i| i as Card)
            .collect();
    }

    /// The raw size strings for one (side, street) slot.
    pub fn bet_inputs(&self, side: Side, street: Street) -> &BetSizeInputs {
        &self.bet_sizes[side.index()][street_slot(street)]
    }

    /// The raw size strings for one (side, street) slot, mutable.
    pub fn bet_inputs_mut(&mut self, side: Side, street: Street) -> &mut BetSizeInputs {
        &mut self.bet_sizes[side.index()][street_slot(street)]
    }

    /// Copy OOP's size strings onto IP, street by street.
    pub fn copy_bets(&mut self) {
        self.bet_sizes[Side::Ip.index()] = self.bet_sizes[Side::Oop.index()].clone();
    }

    /// Validity of one slot's `(bet, raise)` strings, for live feedback
    /// while editing.
    pub fn street_bet_validity(&self, side: Side, street: Street) -> (Validity, Validity) {
        let inputs = self.bet_inputs(side, street);
        (
            validate_bets(&inputs.bet, false).validity,
            validate_bets(&inputs.raise, true).validity,
        )
    }

    /// Check that the configuration is complete enough to build a tree:
    /// both ranges non-empty, at least a flop on board, and all 12 size
    /// strings valid. An empty string counts as not yet configured and
    /// fails here, even though the editor tolerates it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in [Side::Oop, Side::Ip] {
            if self.range_is_empty(side) {
                return Err(ConfigError::EmptyRange(side));
            }
        }
        if self.board.len() < 3 {
            return Err(ConfigError::IncompleteBoard(self.board.len()));
        }
        for side in [Side::Oop, Side::Ip] {
            for street in [Street::Flop, Street::Turn, Street::River] {
                self.parsed_slot(side, street)?;
            }
        }
        Ok(())
    }

    /// Assemble the tree builder payload. Fails with the first
    /// [`ConfigError`] if the configuration is incomplete.
    pub fn build_request(&self) -> Result<TreeBuildRequest, ConfigError> {
        self.validate()?;
        let slots = |side| -> Result<[StreetBets; 3], ConfigError> {
            Ok([
                self.parsed_slot(side, Street::Flop)?,
                self.parsed_slot(side, Street::Turn)?,
                self.parsed_slot(side, Street::River)?,
            ])
        };
        Ok(TreeBuildRequest {
            board: self.board.clone(),
            oop_range: self.oop_range.clone(),
            ip_range: self.ip_range.clone(),
            starting_pot: self.starting_pot,
            effective_stack: self.effective_stack,
            rake: self.rake,
            rake_cap: self.rake_cap,
            add_all_in_threshold: self.add_all_in_threshold,
            force_all_in_threshold: self.force_all_in_threshold,
            bet_sizes: [slots(Side::Oop)?, slots(Side::Ip)?],
        })
    }

    /// Fresh preview session over this configuration's board and stacks.
    pub fn preview_session(&self) -> Result<PreviewSession, PreviewError> {
        PreviewSession::new(self.board.clone(), self.starting_pot, self.effective_stack)
    }

    /// Serialize for persistence.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a persisted configuration.
    pub fn from_json(json: &str) -> serde_json::Result<GameConfig> {
        serde_json::from_str(json)
    }

    fn parsed_slot(&self, side: Side, street: Street) -> Result<StreetBets, ConfigError> {
        let inputs = self.bet_inputs(side, street);
        let parse = |text: &str, is_raise: bool| {
            parse_bet_spec(text, is_raise).map_err(|err| ConfigError::BadBetText {
                side,
                street,
                is_raise,
                message: format!(
                    "{} {} {} sizes: {}",
                    side.short_name(),
                    street.short_name().to_lowercase(),
                    if is_raise { "raise" } else { "bet" },
                    err
                ),
            })
        };
        Ok(StreetBets {
            bet: parse(&inputs.bet, false)?,
            raise: parse(&inputs.raise, true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bets::BetToken;
    use crate::grid::parse_board;
    use crate::range::parse_range;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn complete_config() -> GameConfig {
        let mut config = GameConfig {
            board: parse_board("KhQsJs").unwrap(),
            oop_range: parse_range("22+,AJs+,KQo"),
            ip_range: parse_range("55+,ATs+"),
            ..GameConfig::default()
        };
        for side in [Side::Oop, Side::Ip] {
            for street in [Street::Flop, Street::Turn, Street::River] {
                *config.bet_inputs_mut(side, street) = BetSizeInputs {
                    bet: "50%".to_string(),
                    raise: "2x, a".to_string(),
                };
            }
        }
        config
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_pot, 40);
        assert_eq!(config.effective_stack, 100);
        assert_eq!(config.rake, 0.0);
        assert_eq!(config.rake_cap, 3.0);
        assert!(config.board.is_empty());
        assert!(config.range_is_empty(Side::Oop));
        let (bet, raise) = config.street_bet_validity(Side::Oop, Street::Flop);
        assert_eq!(bet, Validity::Empty);
        assert_eq!(raise, Validity::Empty);
    }

    #[test]
    fn test_board_toggle() {
        let mut config = GameConfig::default();
        assert!(config.add_to_board(10));
        assert!(config.add_to_board(11));
        assert_eq!(config.board, vec![10, 11]);

        // Toggling an existing card removes it.
        assert!(config.add_to_board(10));
        assert_eq!(config.board, vec![11]);

        for card in [0, 1, 2, 3] {
            config.add_to_board(card);
        }
        // Sixth card is refused.
        assert!(!config.add_to_board(40));
        assert_eq!(config.board.len(), 5);
    }

    #[test]
    fn test_random_board_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut config = GameConfig::default();
        for n in [3, 4, 5] {
            config.set_random_board(&mut rng, n);
            assert_eq!(config.board.len(), n);
            let mut sorted = config.board.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), n);
        }
        // Out-of-range requests are clamped.
        config.set_random_board(&mut rng, 9);
        assert_eq!(config.board.len(), 5);
    }

    #[test]
    fn test_copy_bets() {
        let mut config = GameConfig::default();
        config.bet_inputs_mut(Side::Oop, Street::Turn).bet = "75%".to_string();
        config.copy_bets();
        assert_eq!(config.bet_inputs(Side::Ip, Street::Turn).bet, "75%");
    }

    #[test]
    fn test_validate_empty_range() {
        let mut config = complete_config();
        config.clear_range(Side::Ip);
        assert_eq!(config.validate(), Err(ConfigError::EmptyRange(Side::Ip)));
    }

    #[test]
    fn test_validate_board() {
        let mut config = complete_config();
        config.clear_board();
        assert_eq!(config.validate(), Err(ConfigError::IncompleteBoard(0)));
    }

    #[test]
    fn test_validate_bet_strings() {
        let mut config = complete_config();
        config.bet_inputs_mut(Side::Ip, Street::River).raise = "9q".to_string();
        match config.validate() {
            Err(ConfigError::BadBetText {
                side: Side::Ip,
                street: Street::River,
                is_raise: true,
                ..
            }) => {}
            other => panic!("unexpected: {:?}", other),
        }

        // Empty is tolerated while editing but fails finalization.
        config.bet_inputs_mut(Side::Ip, Street::River).raise = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_request() {
        let config = complete_config();
        let request = config.build_request().unwrap();
        assert_eq!(request.board, config.board);
        assert_eq!(request.starting_pot, 40);
        assert_eq!(
            request.bet_sizes[0][0].bet,
            vec![BetToken::Percentage(50.0)]
        );
        assert_eq!(
            request.bet_sizes[1][2].raise,
            vec![BetToken::Scaled(2.0), BetToken::AllIn]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = complete_config();
        let json = config.to_json().unwrap();
        let restored = GameConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_preview_session_from_config() {
        let config = complete_config();
        let session = config.preview_session().unwrap();
        assert_eq!(session.nodes().len(), 1);

        let mut incomplete = config;
        incomplete.clear_board();
        assert!(incomplete.preview_session().is_err());
    }
}
