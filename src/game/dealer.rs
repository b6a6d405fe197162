//! The dealer: shuffling, hole cards, board reveals, and showdown
//! ranking.

use std::collections::BTreeMap;

use super::cards::{Card, Deck};
use super::constants::HOLE_CARDS;
use super::ranking::{self, HandStrength};
use super::seats::{Chips, Seat, SeatNumber};

#[derive(Debug)]
pub struct Dealer {
    deck: Deck,
}

impl Dealer {
    #[must_use]
    pub fn new() -> Self {
        Self { deck: Deck::new() }
    }

    /// A dealer whose shuffles are reproducible, for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            deck: Deck::seeded(seed),
        }
    }

    /// Shuffle a fresh deck and deal two hidden cards to each seat in
    /// the hand, one card at a time around the table.
    pub fn start_hand<'a>(&mut self, seats: impl IntoIterator<Item = &'a mut Seat>) {
        self.deck.shuffle();
        let mut seats: Vec<&mut Seat> = seats.into_iter().collect();
        for _ in 0..HOLE_CARDS {
            for seat in &mut seats {
                let card = self.deck.draw();
                seat.hand.push(card);
            }
        }
    }

    /// Reveal `count` community cards: 3 at the flop, then 1 each at
    /// the turn and river.
    pub fn reveal(&mut self, board: &mut Vec<Card>, count: usize) {
        for _ in 0..count {
            let card = self.deck.draw();
            board.push(card);
        }
    }

    /// Rank each contender's best five from their two hole cards plus
    /// the board.
    #[must_use]
    pub fn rank_hands(
        &self,
        board: &[Card],
        contenders: impl IntoIterator<Item = (SeatNumber, Vec<Card>)>,
    ) -> BTreeMap<SeatNumber, HandStrength> {
        contenders
            .into_iter()
            .map(|(seat, hole)| {
                let mut cards = hole;
                cards.extend_from_slice(board);
                (seat, ranking::evaluate(&cards))
            })
            .collect()
    }

    /// Human-readable win message appended to the table's log.
    #[must_use]
    pub fn win_message(name: &str, amount: Chips, strength: Option<&HandStrength>) -> String {
        match strength {
            Some(strength) => {
                format!("{name} wins ${amount} with {}", strength.rank.describe())
            }
            None => format!("{name} wins ${amount}"),
        }
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::Suit;
    use crate::game::ranking::HandRank;
    use crate::game::seats::{PlayerId, PlayerName};

    fn seat(number: SeatNumber) -> Seat {
        Seat::new(number, PlayerId::new_v4(), PlayerName::new("p"), 100)
    }

    #[test]
    fn deals_two_cards_per_seat() {
        let mut dealer = Dealer::seeded(3);
        let mut seats = [seat(1), seat(2), seat(3)];
        dealer.start_hand(seats.iter_mut());
        for seat in &seats {
            assert_eq!(seat.hand.len(), 2);
        }
        let mut all: Vec<Card> = seats.iter().flat_map(|s| s.hand.clone()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 6, "no card dealt twice");
    }

    #[test]
    fn board_grows_by_street_sizes() {
        let mut dealer = Dealer::seeded(4);
        let mut seats = [seat(1), seat(2)];
        dealer.start_hand(seats.iter_mut());
        let mut board = Vec::new();
        dealer.reveal(&mut board, 3);
        assert_eq!(board.len(), 3);
        dealer.reveal(&mut board, 1);
        dealer.reveal(&mut board, 1);
        assert_eq!(board.len(), 5);
    }

    #[test]
    fn ranks_every_contender() {
        let dealer = Dealer::seeded(5);
        let board = vec![
            Card::new(2, Suit::Clubs),
            Card::new(7, Suit::Diamonds),
            Card::new(9, Suit::Hearts),
            Card::new(11, Suit::Spades),
            Card::new(13, Suit::Clubs),
        ];
        let contenders = vec![
            (1, vec![Card::new(14, Suit::Hearts), Card::new(14, Suit::Diamonds)]),
            (4, vec![Card::new(9, Suit::Clubs), Card::new(9, Suit::Diamonds)]),
        ];
        let rankings = dealer.rank_hands(&board, contenders);
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[&1].rank, HandRank::OnePair);
        assert_eq!(rankings[&4].rank, HandRank::ThreeOfAKind);
        assert!(rankings[&4] > rankings[&1]);
    }

    #[test]
    fn win_messages_name_the_hand() {
        let strength = HandStrength {
            rank: HandRank::FullHouse,
            values: vec![10, 6],
        };
        assert_eq!(
            Dealer::win_message("alice", 150, Some(&strength)),
            "alice wins $150 with a full house"
        );
        assert_eq!(Dealer::win_message("bob", 40, None), "bob wins $40");
    }
}
