//! Configuration front-end for a postflop solver.
//!
//! This library provides the client-side core of a solver configuration UI:
//! - [`grid`] - canonical 13x13 hand grid and 0..52 card indexing
//! - [`range`] - compact range notation parsing ("22+,AJs+,KQo")
//! - [`bets`] - bet sizing grammar parsing and validation ("50%, 2x, a")
//! - [`config`] - the assembled solver configuration and its validation
//! - [`preview`] - an in-memory action tree preview state machine
//! - [`provider`] - async interfaces to the external tree builder / solver
//!
//! The crate parses text into structured weights and bet specs and advances
//! a local, illustrative copy of the action tree the backend will build. It
//! does not compute equities or run any solving algorithm; the finalized
//! configuration is handed to an external engine through the [`provider`]
//! traits.

pub mod bets;
pub mod config;
pub mod grid;
pub mod preview;
pub mod provider;
pub mod range;

pub use bets::{parse_bet_spec, validate_bets, BetError, BetSpec, BetToken, BetValidation, Validity};
pub use config::{BetSizeInputs, ConfigError, GameConfig, StreetBets, TreeBuildRequest};
pub use grid::Card;
pub use preview::{
    ActionLabel, ActionNode, CandidateCard, ChoiceReply, LegalAction, PreviewError,
    PreviewSession, Side, StagedChoice, Street,
};
pub use provider::{ActionProvider, ProviderError, TreeBuilder};
pub use range::{parse_range, render_range, RangeWeights};
