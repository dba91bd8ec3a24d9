//! Canonical hand grid and card indexing.
//!
//! Cards are encoded as `card = 4 * rank + suit` where:
//! - rank: 0 (deuce) to 12 (ace)
//! - suit: 0-3 (clubs, diamonds, hearts, spades)
//!
//! The 13x13 hand grid is indexed A-high: grid rank 0 is the ace, grid rank
//! 12 the deuce. A grid cell `(i, j)` flattens to `i * 13 + j`; `i == j` is a
//! pocket pair, `i < j` a suited combo, `i > j` an offsuit combo.

/// A card encoded as `4 * rank + suit` (0-51).
pub type Card = u8;

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Number of cells in the 13x13 hand grid.
pub const GRID_CELLS: usize = 169;

/// Rank characters in grid order (index 0 = ace).
pub const RANKS: [char; 13] = [
    'A', 'K', 'Q', 'J', 'T', '9', '8', '7', '6', '5', '4', '3', '2',
];

/// Suit characters in encoding order.
pub const SUITS: [char; 4] = ['c', 'd', 'h', 's'];

/// Extract the card rank (0 = deuce, 12 = ace) from a card.
#[inline]
pub fn rank(card: Card) -> u8 {
    card / 4
}

/// Extract the suit (0-3) from a card.
#[inline]
pub fn suit(card: Card) -> u8 {
    card % 4
}

/// Create a card from card rank (0 = deuce) and suit.
#[inline]
pub fn make_card(rank: u8, suit: u8) -> Card {
    rank * 4 + suit
}

/// Convert a grid rank (0 = ace) and suit to a card index.
///
/// Exact inverse of [`index_to_card`] over the closed rank/suit alphabets.
#[inline]
pub fn card_to_index(grid_rank: u8, suit: u8) -> Card {
    (12 - grid_rank) * 4 + suit
}

/// Convert a card index back to (grid rank, suit), grid rank 0 = ace.
#[inline]
pub fn index_to_card(card: Card) -> (u8, u8) {
    (12 - card / 4, card % 4)
}

/// Flatten a grid cell `(i, j)` to its index in a 169-cell weight vector.
#[inline]
pub fn range_index(i: usize, j: usize) -> usize {
    i * 13 + j
}

/// Look up a rank character's grid index (0 = ace). Case sensitive, per the
/// range notation grammar.
pub fn rank_position(c: char) -> Option<usize> {
    RANKS.iter().position(|&r| r == c)
}

/// Human-readable name of a grid cell: "AA", "AKs", "KQo".
pub fn cell_name(i: usize, j: usize) -> String {
    if i == j {
        format!("{}{}", RANKS[i], RANKS[j])
    } else if i < j {
        format!("{}{}s", RANKS[i], RANKS[j])
    } else {
        format!("{}{}o", RANKS[j], RANKS[i])
    }
}

/// Format a card as a 2-character string like "Kh".
pub fn card_to_string(card: Card) -> String {
    let (grid_rank, suit) = index_to_card(card);
    format!("{}{}", RANKS[grid_rank as usize], SUITS[suit as usize])
}

/// Parse a single card from rank and suit characters.
pub fn parse_card(rank_char: char, suit_char: char) -> Result<Card, String> {
    let rank = match rank_char {
        '2' => 0,
        '3' => 1,
        '4' => 2,
        '5' => 3,
        '6' => 4,
        '7' => 5,
        '8' => 6,
        '9' => 7,
        'T' | 't' => 8,
        'J' | 'j' => 9,
        'Q' | 'q' => 10,
        'K' | 'k' => 11,
        'A' | 'a' => 12,
        _ => return Err(format!("Invalid rank: {}", rank_char)),
    };

    let suit = match suit_char {
        'c' | 'C' => 0,
        'd' | 'D' => 1,
        'h' | 'H' => 2,
        's' | 'S' => 3,
        _ => return Err(format!("Invalid suit: {}", suit_char)),
    };

    Ok(make_card(rank, suit))
}

/// Parse a string of cards like "KhQsJs" or "Kh Qs Js".
///
/// Whitespace is ignored. Duplicate cards are rejected.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, String> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.len() % 2 != 0 {
        return Err(format!("Invalid card string length: {}", s.len()));
    }

    let chars: Vec<char> = s.chars().collect();
    let mut cards = Vec::with_capacity(chars.len() / 2);
    for chunk in chars.chunks(2) {
        cards.push(parse_card(chunk[0], chunk[1])?);
    }

    for i in 0..cards.len() {
        for j in (i + 1)..cards.len() {
            if cards[i] == cards[j] {
                return Err(format!("Duplicate card: {}", card_to_string(cards[i])));
            }
        }
    }

    Ok(cards)
}

/// Parse a board string like "KhQsJs" (3-5 cards, no duplicates).
pub fn parse_board(s: &str) -> Result<Vec<Card>, String> {
    let cards = parse_cards(s)?;
    if cards.len() < 3 || cards.len() > 5 {
        return Err(format!("Board must have 3-5 cards, got {}", cards.len()));
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_index_roundtrip() {
        for grid_rank in 0..13u8 {
            for suit in 0..4u8 {
                let card = card_to_index(grid_rank, suit);
                assert_eq!(index_to_card(card), (grid_rank, suit));
            }
        }
    }

    #[test]
    fn test_card_encoding() {
        // Ace of clubs is the top of the deck encoding, deuce of clubs the bottom.
        assert_eq!(card_to_index(0, 0), 48);
        assert_eq!(card_to_index(12, 0), 0);
        assert_eq!(rank(48), 12);
        assert_eq!(suit(51), 3);
    }

    #[test]
    fn test_range_index() {
        assert_eq!(range_index(0, 0), 0); // AA
        assert_eq!(range_index(0, 1), 1); // AKs
        assert_eq!(range_index(1, 0), 13); // AKo
        assert_eq!(range_index(12, 12), 168); // 22
    }

    #[test]
    fn test_cell_name() {
        assert_eq!(cell_name(0, 0), "AA");
        assert_eq!(cell_name(0, 1), "AKs");
        assert_eq!(cell_name(1, 0), "AKo");
        assert_eq!(cell_name(12, 12), "22");
    }

    #[test]
    fn test_parse_card() {
        assert_eq!(parse_card('A', 'c').unwrap(), 48);
        assert_eq!(parse_card('2', 'c').unwrap(), 0);
        assert!(parse_card('X', 'c').is_err());
        assert!(parse_card('A', 'z').is_err());
    }

    #[test]
    fn test_card_to_string() {
        assert_eq!(card_to_string(48), "Ac");
        assert_eq!(card_to_string(51), "As");
        assert_eq!(card_to_string(0), "2c");
        // Every deck card formats and parses back to itself.
        for card in 0..DECK_SIZE as Card {
            let text = card_to_string(card);
            let mut chars = text.chars();
            let (r, s) = (chars.next().unwrap(), chars.next().unwrap());
            assert_eq!(parse_card(r, s).unwrap(), card);
        }
    }

    #[test]
    fn test_parse_board() {
        let board = parse_board("KhQsJs").unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(card_to_string(board[0]), "Kh");

        assert!(parse_board("KhQs").is_err());
        assert!(parse_board("KhKh Qs").is_err());
        assert!(parse_board("Kh Qs Js 2c 3d").is_ok());
    }
}
