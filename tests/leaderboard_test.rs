//! Leaderboard properties: local insert ordering and capacity, wire
//! round trip of the server table, and local file persistence.

use std::net::{IpAddr, Ipv4Addr};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use duotris::leaderboard::protocol::parse_leaderboard;
use duotris::leaderboard::{LocalLeaderboard, RemoteEntry, Response, ScoreTable};
use duotris::types::LEADERBOARD_CAPACITY;

const ORIGIN: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[test]
fn test_local_insert_keeps_sorted_bounded_list() {
    let mut rng = StdRng::seed_from_u64(5);

    for round in 0..50 {
        let mut board = LocalLeaderboard::new();
        for i in 0..40 {
            let score = rng.random_range(1..=60) * 10;
            let before: Vec<_> = board.entries().to_vec();
            let pos = board.insert(&format!("p{round}-{i}"), score, i);

            let expected = before
                .iter()
                .position(|e| score > e.score)
                .unwrap_or(before.len());
            if expected < LEADERBOARD_CAPACITY {
                assert_eq!(pos, Some(expected));
                assert_eq!(board.entries()[expected].score, score);
            } else {
                assert_eq!(pos, None);
                assert_eq!(board.entries(), before.as_slice());
            }

            assert!(board.len() <= LEADERBOARD_CAPACITY);
            assert!(board
                .entries()
                .windows(2)
                .all(|w| w[0].score >= w[1].score));
        }
    }
}

#[test]
fn test_local_file_round_trip() {
    let path = std::env::temp_dir().join(format!("duotris-local-{}.txt", std::process::id()));

    let mut board = LocalLeaderboard::new();
    board.insert("Player 1", 700, 1_700_000_000);
    board.insert("Bob", 900, 1_700_000_100);
    board.insert("Eve Two", 700, 1_700_000_200);
    board.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "Bob 900 1700000100\nPlayer 1 700 1700000000\nEve Two 700 1700000200\n"
    );

    let loaded = LocalLeaderboard::load(&path).unwrap();
    assert_eq!(loaded, board);

    // Saving rewrites the file rather than appending.
    let mut smaller = LocalLeaderboard::new();
    smaller.insert("Solo", 10, 1);
    smaller.save(&path).unwrap();
    assert_eq!(LocalLeaderboard::load(&path).unwrap().len(), 1);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_table_to_wire_and_back() {
    let mut rng = StdRng::seed_from_u64(9);

    for size in 0..=LEADERBOARD_CAPACITY {
        let mut table = ScoreTable::new();
        for i in 0..size {
            table.submit(&format!("name{i}"), rng.random_range(-50..5_000), ORIGIN, 0);
        }
        let top = table.top();
        assert_eq!(top.len(), size);

        let wire = Response::Leaderboard(top.clone()).to_string();
        let parsed = parse_leaderboard(&wire).expect("marker present");
        assert_eq!(parsed.as_slice(), top.as_slice(), "{wire}");
    }
}

#[test]
fn test_top_is_capped_and_sorted() {
    let mut table = ScoreTable::new();
    for i in 0..30 {
        table.submit(&format!("n{i}"), (i * 37 % 101) as i64, ORIGIN, 0);
    }
    let top = table.top();
    assert_eq!(top.len(), LEADERBOARD_CAPACITY);
    assert!(top.windows(2).all(|w| w[0].score >= w[1].score));

    let wire = Response::Leaderboard(top.clone()).to_string();
    assert_eq!(wire.matches('|').count(), LEADERBOARD_CAPACITY);
    assert_eq!(
        parse_leaderboard(&wire).unwrap().first(),
        Some(&RemoteEntry::new(top[0].name.clone(), top[0].score))
    );
}

#[test]
fn test_table_dump_is_json_array() {
    let mut table = ScoreTable::new();
    table.submit("Alice", 500, ORIGIN, 1_700_000_000);
    table.submit("Bob", 300, ORIGIN, 1_700_000_001);

    let dump: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    let rows = dump.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[0]["score"], 500);
    assert_eq!(rows[1]["timestamp"], 1_700_000_001u64);
}

#[test]
fn test_every_valid_player_name_is_accepted_by_server() {
    use duotris::leaderboard::{respond, Request};
    use duotris::types::PlayerName;

    let candidates = [
        "Alice",
        "Player 1",
        "fifteen_chars_x",
        "日本語日本語日本語日",
        "日本語日本語日本語日本",
        "日本語日本語日本語日本語日本語",
        "Zoë Ångström",
    ];

    let mut table = ScoreTable::new();
    for raw in candidates {
        let Some(name) = PlayerName::new(raw) else {
            continue;
        };
        let request = Request::Submit {
            name: name.as_str().to_string(),
            score: 100,
        }
        .encode();
        let reply = respond(&mut table, &request, ORIGIN);
        assert!(reply.starts_with("OK|"), "{raw:?}: {reply}");
    }
    assert_eq!(table.len(), 5);
}
