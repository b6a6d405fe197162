//! Pot accounting: per-seat contributions, main/side pot tiers, and
//! showdown payouts.

use std::collections::BTreeMap;

use super::ranking::HandStrength;
use super::seats::{Chips, SeatNumber};

/// One tier of the pot. The main pot is capped at the smallest all-in
/// level among contenders; each higher all-in level adds a side pot
/// open only to the seats that covered it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PotTier {
    pub amount: Chips,
    pub eligible: Vec<SeatNumber>,
}

/// Chips owed to a seat after settlement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub seat: SeatNumber,
    pub amount: Chips,
    pub strength: HandStrength,
}

/// Accumulates swept street bets and remembers how much each seat put
/// in across the whole hand, which is all the information side pots
/// need.
#[derive(Debug, Default)]
pub struct PotManager {
    contributions: BTreeMap<SeatNumber, Chips>,
    collected: Chips,
}

impl PotManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.contributions.clear();
        self.collected = 0;
    }

    /// Sweep a seat's street bet into the pot.
    pub fn collect(&mut self, seat: SeatNumber, amount: Chips) {
        if amount == 0 {
            return;
        }
        *self.contributions.entry(seat).or_default() += amount;
        self.collected += amount;
    }

    /// Chips collected so far, not yet assigned to any seat.
    #[must_use]
    pub fn total(&self) -> Chips {
        self.collected
    }

    #[must_use]
    pub fn contribution(&self, seat: SeatNumber) -> Chips {
        self.contributions.get(&seat).copied().unwrap_or(0)
    }

    /// Build the pot tiers for the given contenders. Folded seats'
    /// chips stay in the tiers they reach; anything contributed above
    /// the largest contender level is dead money and falls into the
    /// top tier.
    #[must_use]
    pub fn tiers(&self, contenders: &[SeatNumber]) -> Vec<PotTier> {
        let mut levels: Vec<Chips> = contenders
            .iter()
            .map(|&seat| self.contribution(seat))
            .filter(|&c| c > 0)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut tiers = Vec::with_capacity(levels.len());
        let mut prev = 0;
        for &level in &levels {
            let amount: Chips = self
                .contributions
                .values()
                .map(|&c| c.min(level).saturating_sub(prev.min(c)))
                .sum();
            let eligible: Vec<SeatNumber> = contenders
                .iter()
                .copied()
                .filter(|&seat| self.contribution(seat) >= level)
                .collect();
            tiers.push(PotTier { amount, eligible });
            prev = level;
        }
        if let (Some(top), Some(last)) = (levels.last(), tiers.last_mut()) {
            let excess: Chips = self
                .contributions
                .values()
                .map(|&c| c.saturating_sub(*top))
                .sum();
            last.amount += excess;
        }
        tiers
    }

    /// Distribute every tier among its best-ranked eligible seats. Ties
    /// split a tier as evenly as it divides; remainder chips go to
    /// winners in `payout_order`, which the table supplies as the
    /// clockwise seat order starting left of the button.
    #[must_use]
    pub fn settle(
        &self,
        rankings: &BTreeMap<SeatNumber, HandStrength>,
        payout_order: &[SeatNumber],
    ) -> Vec<Payout> {
        let contenders: Vec<SeatNumber> = rankings.keys().copied().collect();
        let mut winnings: BTreeMap<SeatNumber, Chips> = BTreeMap::new();

        for tier in self.tiers(&contenders) {
            let best = tier
                .eligible
                .iter()
                .filter_map(|seat| rankings.get(seat))
                .max();
            let Some(best) = best else { continue };
            let winners: Vec<SeatNumber> = tier
                .eligible
                .iter()
                .copied()
                .filter(|seat| rankings.get(seat) == Some(best))
                .collect();
            let share = tier.amount / winners.len() as Chips;
            let mut remainder = tier.amount % winners.len() as Chips;
            for &seat in payout_order.iter().filter(|s| winners.contains(s)) {
                let mut amount = share;
                if remainder > 0 {
                    amount += 1;
                    remainder -= 1;
                }
                *winnings.entry(seat).or_default() += amount;
            }
        }

        winnings
            .into_iter()
            .map(|(seat, amount)| Payout {
                seat,
                amount,
                strength: rankings[&seat].clone(),
            })
            .collect()
    }
}
