//! Range notation parsing (grid format).
//!
//! Expands compact range strings into a 169-cell weight vector over the
//! canonical 13x13 hand grid:
//! - "77" - single pair cell
//! - "AKs" / "AKo" - single suited / offsuit cell
//! - "99+" - pairs from 99 up to AA
//! - "AJs+" / "AJo+" - widened suited / offsuit tokens
//! - "KK-99" / "76s-54s" / "KQo-T9o" - closed ranges (2-D block fill)
//!
//! Tokens are comma-separated; every mentioned hand is set to weight 100.
//! Malformed tokens are silently dropped rather than rejected, so a typo
//! contributes no weight instead of failing the whole string.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::grid::{cell_name, range_index, rank_position, GRID_CELLS};

/// A 169-cell weight vector over the hand grid.
///
/// Weights are percentages in `[0, 100]`; 0 means "not in range".
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWeights {
    /// Weight per grid cell, indexed by [`range_index`].
    pub weights: [f32; GRID_CELLS],
}

impl Default for RangeWeights {
    fn default() -> Self {
        Self {
            weights: [0.0; GRID_CELLS],
        }
    }
}

impl RangeWeights {
    /// Get the weight of a grid cell.
    #[inline]
    pub fn get(&self, idx: usize) -> f32 {
        self.weights[idx]
    }

    /// Set the weight of a grid cell, clamped to `[0, 100]`.
    ///
    /// This is the entry point for manual per-cell adjustment; the text
    /// parser itself only ever writes 0 or 100.
    pub fn set(&mut self, idx: usize, weight: f32) {
        self.weights[idx] = weight.clamp(0.0, 100.0);
    }

    /// Reset every cell to 0.
    pub fn clear(&mut self) {
        self.weights = [0.0; GRID_CELLS];
    }

    /// Whether no hand carries any weight.
    pub fn is_empty(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }
}

impl Serialize for RangeWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.weights[..].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RangeWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Vec::<f32>::deserialize(deserializer)?;
        let weights: [f32; GRID_CELLS] = v
            .try_into()
            .map_err(|v: Vec<f32>| D::Error::invalid_length(v.len(), &"169 weights"))?;
        Ok(Self { weights })
    }
}

/// Parse a range string into a freshly built weight vector.
///
/// Every unmentioned hand defaults to 0; the output is never merged with
/// prior state. Whitespace around commas and dashes is ignored.
pub fn parse_range(text: &str) -> RangeWeights {
    let mut range = RangeWeights::default();

    for token in text.split(',') {
        let token = token.trim();
        if token.contains('+') {
            apply_plus_token(&mut range, token);
        } else if token.contains('-') {
            apply_range_token(&mut range, token);
        } else {
            apply_single_token(&mut range, token);
        }
    }

    range
}

/// Render a binary weight vector back to canonical single-cell tokens.
///
/// Each cell with nonzero weight becomes one token ("AA", "AKs", "KQo").
/// Re-parsing the result reproduces the same cell set at weight 100, so
/// this is only canonical for ranges produced by [`parse_range`].
pub fn render_range(range: &RangeWeights) -> String {
    let mut tokens = Vec::new();
    for i in 0..13 {
        for j in 0..13 {
            if range.get(range_index(i, j)) > 0.0 {
                tokens.push(cell_name(i, j));
            }
        }
    }
    tokens.join(",")
}

/// "KK+", "AJs+", "AJo+" tokens.
fn apply_plus_token(range: &mut RangeWeights, token: &str) {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 3 {
        return;
    }
    let idx1 = rank_position(chars[0]);
    let idx2 = rank_position(chars[1]);

    if chars.len() == 3 {
        // Pair+: fill the diagonal from the top rank down.
        if let Some(idx1) = idx1 {
            for i in 0..=idx1 {
                range.weights[range_index(i, i)] = 100.0;
            }
        }
    } else if chars[2] == 's' {
        // Suited+: row idx1, second rank from idx1 to idx2. Includes the
        // diagonal pair cell at i == idx1 (original notation behavior).
        if let (Some(idx1), Some(idx2)) = (idx1, idx2) {
            for i in idx1..=idx2 {
                range.weights[range_index(idx1, i)] = 100.0;
            }
        }
    } else if chars[2] == 'o' {
        // Offsuit+ widens only toward higher second ranks, asymmetric with
        // the suited case. Preserved as documented.
        if let (Some(idx1), Some(idx2)) = (idx1, idx2) {
            for i in (idx1 + 1)..=idx2 {
                range.weights[range_index(i, idx1)] = 100.0;
            }
        }
    }
}

/// "KK-99", "76s-54s", "KQo-T9o" tokens.
fn apply_range_token(range: &mut RangeWeights, token: &str) {
    let mut parts = token.split('-').map(str::trim);
    let (Some(first), Some(second)) = (parts.next(), parts.next()) else {
        return;
    };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();
    if first.len() < 2 || second.len() < 2 {
        return;
    }

    let (Some(idx11), Some(idx12), Some(idx21), Some(idx22)) = (
        rank_position(first[0]),
        rank_position(first[1]),
        rank_position(second[0]),
        rank_position(second[1]),
    ) else {
        return;
    };

    if first.len() == 2 {
        // Pair-pair: diagonal segment.
        for i in idx11..=idx21 {
            range.weights[range_index(i, i)] = 100.0;
        }
    } else if first[2] == 's' || first[2] == 'o' {
        // Suited-suited and offsuit-offsuit both fill the rectangular block
        // bounded by the two tokens' rank indices. This is a 2-D fill, not a
        // 1-D sequence.
        for i in idx11..=idx21 {
            for j in idx12..=idx22 {
                range.weights[range_index(i, j)] = 100.0;
            }
        }
    }
}

/// Bare "77", "AKs", "AKo" tokens.
fn apply_single_token(range: &mut RangeWeights, token: &str) {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 2 {
        return;
    }
    let idx1 = rank_position(chars[0]);
    let idx2 = rank_position(chars[1]);

    if chars.len() == 2 {
        if let Some(idx1) = idx1 {
            range.weights[range_index(idx1, idx1)] = 100.0;
        }
    } else if chars.len() == 3 && chars[2] == 's' {
        if let (Some(idx1), Some(idx2)) = (idx1, idx2) {
            range.weights[range_index(idx1, idx2)] = 100.0;
        }
    } else if chars.len() == 3 && chars[2] == 'o' {
        if let (Some(idx1), Some(idx2)) = (idx1, idx2) {
            range.weights[range_index(idx2, idx1)] = 100.0;
        }
    }
}
