//! Async interfaces to the external solving engine.
//!
//! The tree builder and action provider are remote collaborators: the core
//! fires a request, awaits the response, and only then mutates local state.
//! Failures are opaque to this crate and must leave local state unchanged;
//! retries, if desired, are caller policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TreeBuildRequest;
use crate::grid::Card;
use crate::preview::LegalAction;

/// Opaque failure reason from the external engine, surfaced for display.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Accepts a finalized configuration and builds the real action tree.
#[async_trait]
pub trait TreeBuilder {
    /// Build the backend action tree from a finalized configuration.
    async fn build_tree(&self, request: &TreeBuildRequest) -> Result<(), ProviderError>;
}

/// Answers queries about the real tree while the user walks a preview line.
///
/// `line` is the canonical textual history of the current line (see
/// [`crate::preview::PreviewSession::line`]), root excluded.
#[async_trait]
pub trait ActionProvider {
    /// Legal actions for the node about to be entered after `line`.
    async fn legal_actions(&self, line: &[String]) -> Result<Vec<LegalAction>, ProviderError>;

    /// Possible next community cards after `line` ends a street.
    async fn chance_cards(&self, line: &[String]) -> Result<Vec<Card>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::grid::parse_board;
    use crate::preview::Side;
    use crate::range::parse_range;
    use std::sync::Mutex;

    /// Builder that records the request it was handed.
    struct RecordingBuilder {
        received: Mutex<Option<TreeBuildRequest>>,
    }

    #[async_trait]
    impl TreeBuilder for RecordingBuilder {
        async fn build_tree(&self, request: &TreeBuildRequest) -> Result<(), ProviderError> {
            *self.received.lock().map_err(|e| ProviderError::new(e.to_string()))? =
                Some(request.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_build_request_reaches_builder() {
        let mut config = GameConfig {
            board: parse_board("KhQsJs").unwrap(),
            oop_range: parse_range("22+"),
            ip_range: parse_range("55+"),
            ..GameConfig::default()
        };
        for side in [Side::Oop, Side::Ip] {
            for street in [
                crate::preview::Street::Flop,
                crate::preview::Street::Turn,
                crate::preview::Street::River,
            ] {
                let inputs = config.bet_inputs_mut(side, street);
                inputs.bet = "50%".to_string();
                inputs.raise = "a".to_string();
            }
        }

        let request = config.build_request().unwrap();
        let builder = RecordingBuilder {
            received: Mutex::new(None),
        };
        builder.build_tree(&request).await.unwrap();
        let received = builder.received.lock().unwrap().clone().unwrap();
        assert_eq!(received, request);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("engine offline");
        assert_eq!(err.to_string(), "engine offline");
    }
}
