//! Regression positions for the forced-win and almost-win searches.
//!
//! The deep cases take tens of seconds each and are ignored by default;
//! run them with `--ignored`.

use std::time::Duration;

use gomoku_core::notation::decode;
use gomoku_core::{Board, Color, Pos};
use gomoku_engine::search::{AlmostMctsWin, AlmostPnsWin, AlmostVcx, CancelToken, Vcx, VcxMcts};
use gomoku_engine::VcxOptimization;

fn board(transcript: &str) -> Board {
    Board::from_moves(&decode(transcript).expect("valid transcript")).expect("legal transcript")
}

fn vcx_wins(transcript: &str, depth: i32, optimization: VcxOptimization) -> Option<Pos> {
    let board = board(transcript);
    let attacker = board.side_to_move();
    Vcx::new(attacker, depth)
        .with_optimization(optimization)
        .search(&board, &CancelToken::new())
        .map(|mv| {
            assert!(mv.winning, "vcx answers are proven wins");
            mv.pos
        })
}

// ── Forced wins ───────────────────────────────────────────────────────────────

#[test]
fn shallow_vcx_finds_the_winning_attack() {
    let found = vcx_wins("H8 I8 I9 G7 J9 K9 Ha H9", 9, VcxOptimization::Fast);
    assert!(
        matches!(found, Some(pos) if [Pos::at(5, 6), Pos::at(6, 5)].contains(&pos)),
        "expected F9 or Ga, got {found:?}"
    );
}

#[test]
fn vcx_sees_a_long_line_of_fours() {
    let transcript = "H8 I8 I9 G7 J9 K9 Ha J8 Hb H9 Ia K8 Ga Ja Ea Fa Ib L8 M8 M7 N6 F9";
    assert!(vcx_wins(transcript, 7, VcxOptimization::Fast).is_some());
}

#[test]
fn vcx_mixes_threes_and_fours() {
    let transcript = "H8 I8 I9 G7 J9 K9 Ha H9 Ga J8 Ia Ja Hb K8 Fa Ea Gc Fd L8";
    assert!(vcx_wins(transcript, 13, VcxOptimization::Fast).is_some());
}

#[test]
fn vcx_without_threats_finds_nothing() {
    assert_eq!(vcx_wins("H8 I9", 13, VcxOptimization::Fast), None);
    assert_eq!(vcx_wins("H8 I9 G7", 13, VcxOptimization::Slow), None);
}

#[test]
#[ignore = "deep search"]
fn deep_vcx_regressions() {
    for transcript in [
        "H8 I8 I9 Ja G7 H9 H7 Ga J7 I7 I6 Ec Fb Ia Ha G8 Jb H6 J8 K7 F7 E7",
        "H8 J7 G7 I8 I9 Ja G9 G6 H7 J8 J9 H9 Ga I6",
        "H8 K8 F8 I8 E9 I6 G7 H6 I9 F6 G6 G8 H9 G9 H7 Hb",
        "H8 K8 F8 I8 E9 I6 G7 H6 I9 F6 G6 G8 H9 G9 H7 Hb F7 E7",
    ] {
        assert!(vcx_wins(transcript, 27, VcxOptimization::Fast).is_some(), "{transcript}");
    }
}

#[test]
#[ignore = "deep search"]
fn zigzag_win_needs_the_slow_tier() {
    let transcript = "H8 I8 I9 Ja G7 H9 H7 F6 H6 F8 G8 F7";
    assert_eq!(vcx_wins(transcript, 25, VcxOptimization::Fast), None);
    assert!(vcx_wins(transcript, 25, VcxOptimization::Slow).is_some());
}

// ── Almost wins ───────────────────────────────────────────────────────────────

#[test]
#[ignore = "deep search"]
fn almost_vcx_finds_the_quiet_winning_move() {
    let transcript = "H8 I8 I9 Ja G7 H9 H7 J7 Ga J8 J9 K6 L5 I7";
    assert_eq!(vcx_wins(transcript, 27, VcxOptimization::Fast), None);

    let board = board(transcript);
    let found = AlmostVcx::new(Color::Black, 23).search(&board, &CancelToken::new());
    assert_eq!(found.map(|mv| mv.pos), Some(Pos::at(7, 9)));
}

#[test]
#[ignore = "deep search"]
fn almost_mcts_proves_the_winning_move() {
    let board = board("H8 I8 I9 G7 J9 K9 Ha H9 Ga J8 Ia Ja");
    let mut search = AlmostMctsWin::new(Color::Black, Duration::from_millis(2500), 9);
    let found = search.find(&board, &CancelToken::new());
    assert_eq!(found.map(|mv| mv.pos), Some(Pos::at(6, 3)));
}

#[test]
#[ignore = "deep search"]
fn almost_pns_proves_the_winning_move() {
    let board = board("H8 I8 I9 G7 J9 K9 Ha H9 Ga J8 Ia Ja");
    let mut search = AlmostPnsWin::new(Color::Black, Duration::from_secs(600), 180_000, 9);
    let found = search.find(&board, &CancelToken::new());
    assert_eq!(found.map(|mv| mv.pos), Some(Pos::at(7, 4)));
}

// ── Opening MCTS ──────────────────────────────────────────────────────────────

#[test]
#[ignore = "runs for the full budget"]
fn opening_mcts_regressions() {
    let cases: [(&str, &[Pos], u64, i32); 5] = [
        ("H8 I8 I9 Ja G7 H9 H7 I7", &[Pos::at(6, 7)], 15, 7),
        ("H8 I8 I9 Ja G7 H9 H7 F6", &[Pos::at(6, 7)], 15, 7),
        ("H8 I8 I9 Ja G7 H9 H7 H6", &[Pos::at(6, 7)], 15, 7),
        ("H8 I7 I9 G7 J9 G8 J7 H9 J8 J6", &[Pos::at(7, 5)], 25, 13),
        ("H8 I8 I9 H9 Ga Ha Gb G7", &[Pos::at(7, 4)], 15, 7),
    ];
    for (transcript, answers, seconds, depth) in cases {
        let board = board(transcript);
        let found = VcxMcts::new(Duration::from_secs(seconds), depth).search(&board, &CancelToken::new());
        assert!(
            found.is_some_and(|mv| answers.contains(&mv.pos)),
            "{transcript}: got {found:?}"
        );
    }
}
