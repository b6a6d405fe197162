//! Property tests for the engine's money invariants.
//!
//! For any sequence of commands, legal or not, chips on the table
//! must equal buy-ins minus chips paid back out, and at most one seat
//! may hold the turn.

use proptest::prelude::*;

use cardroom::game::seats::{PlayerId, SeatNumber};
use cardroom::table::{
    CommandOutcome, PlayerIdentity, Table, TableCommand, TableConfig,
};

fn config() -> TableConfig {
    TableConfig {
        name: "conservation".to_string(),
        max_players: 6,
        min_bet: 1,
        limit: 200,
        quick_buy_in: None,
        action_secs: 15,
    }
}

/// An encoded command: (opcode, player index, amount).
type Op = (u8, u8, u32);

fn decode(op: Op) -> (usize, TableCommand) {
    let (code, who, amount) = op;
    let who = usize::from(who % 4);
    let seat: SeatNumber = who + 1;
    let command = match code % 9 {
        0 => TableCommand::SitDown {
            seat,
            amount: Some(amount),
        },
        1 => TableCommand::StartHand,
        2 => TableCommand::Fold,
        3 => TableCommand::Check,
        4 => TableCommand::Call,
        5 => TableCommand::Raise { to: amount },
        6 => TableCommand::StandUp,
        7 => TableCommand::Rebuy { seat, amount },
        _ => TableCommand::Join,
    };
    (who, command)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn chips_never_appear_or_vanish(
        ops in prop::collection::vec((0u8..9, 0u8..4, 0u32..260), 1..120),
        seed in 0u64..1_000,
    ) {
        let mut table = Table::seeded(1, config(), seed);
        let players: Vec<PlayerIdentity> = (0..4)
            .map(|i| PlayerIdentity::new(PlayerId::new_v4(), &format!("p{i}")))
            .collect();
        // Chips that entered via buy-ins minus chips paid back out.
        let mut bank: i64 = 0;

        for op in ops {
            let (who, command) = decode(op);
            let player = &players[who];
            let before = i64::from(table.total_chips());

            match table.apply(player, command.clone()) {
                Ok(outcome) => {
                    match (&command, &outcome) {
                        (TableCommand::SitDown { amount: Some(amount), .. }, _) => {
                            bank += i64::from(*amount);
                        }
                        (TableCommand::Rebuy { amount, .. }, _) => {
                            bank += i64::from(*amount);
                        }
                        (_, CommandOutcome::StoodUp { returned }) => {
                            bank -= i64::from(*returned);
                        }
                        (_, CommandOutcome::Left { returned: Some(returned) }) => {
                            bank -= i64::from(*returned);
                        }
                        _ => {}
                    }
                }
                Err(_) => {
                    // A rejected command leaves the table untouched.
                    prop_assert_eq!(i64::from(table.total_chips()), before);
                }
            }
            prop_assert_eq!(
                i64::from(table.total_chips()),
                bank,
                "stacks + bets + pot must track buy-ins minus payouts"
            );

            let turns = table
                .snapshot_for(None)
                .seats
                .iter()
                .filter(|s| s.turn)
                .count();
            prop_assert!(turns <= 1, "at most one seat on turn");

            if table.ready_for_next_hand() {
                table.begin_hand();
                prop_assert_eq!(i64::from(table.total_chips()), bank);
            }
        }
    }

    /// The board only ever grows within a hand, up to five cards, and
    /// resets at the next deal.
    #[test]
    fn the_board_never_shrinks_mid_hand(
        ops in prop::collection::vec((0u8..9, 0u8..4, 0u32..260), 1..120),
        seed in 0u64..1_000,
    ) {
        let mut table = Table::seeded(1, config(), seed);
        let players: Vec<PlayerIdentity> = (0..4)
            .map(|i| PlayerIdentity::new(PlayerId::new_v4(), &format!("p{i}")))
            .collect();
        let mut last_board_len = 0usize;

        for op in ops {
            let (who, command) = decode(op);
            let _ = table.apply(&players[who], command);
            let board_len = table.snapshot_for(None).board.len();
            if board_len != 0 {
                prop_assert!(
                    board_len >= last_board_len,
                    "the board never shrinks within a hand"
                );
                prop_assert!(board_len <= 5);
            }
            last_board_len = board_len;
            if table.ready_for_next_hand() {
                table.begin_hand();
                last_board_len = 0;
            }
        }
    }
}
