//! Maze construction, parsing errors and the activation lifecycle

use mazerl::{Error, Maze, SampleSource, Tile};

/// A maze with every special tile in the alphabet.
const FULL_ALPHABET: &str = "5 3\n*.0.1\n.:|%.\n..#. ";

#[test]
fn loads_and_partitions_a_full_maze() {
    let maze: Maze = FULL_ALPHABET.parse().unwrap();
    assert_eq!(maze.width(), 5);
    assert_eq!(maze.height(), 3);
    assert_eq!(maze.state_count(), 15);
    assert_eq!(maze.starting_states().len(), 1);
    assert_eq!(maze.gate_states().len(), 1);
    assert_eq!(maze.goal_states().len(), 1);
}

#[test]
fn row_width_mismatch_aborts_construction() {
    let result = "3 2\n*.1\n....".parse::<Maze>();
    assert!(matches!(
        result,
        Err(Error::RowWidth {
            row: 1,
            expected: 3,
            got: 4
        })
    ));
}

#[test]
fn unknown_tile_character_aborts_construction() {
    let result = "3 1\n*x1".parse::<Maze>();
    assert!(matches!(
        result,
        Err(Error::InvalidTileCharacter { character: 'x', .. })
    ));
}

#[test]
fn out_of_bounds_query_is_a_range_error() {
    let maze: Maze = "3 1\n*.1".parse().unwrap();
    assert!(matches!(
        maze.state_id_at(3, 0),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        maze.state_id_at(-1, 0),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn file_round_trip_matches_inline_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maze.in");
    std::fs::write(&path, format!("{FULL_ALPHABET}\n")).unwrap();

    let from_file = Maze::from_file(&path).unwrap();
    let inline: Maze = FULL_ALPHABET.parse().unwrap();
    assert_eq!(from_file.width(), inline.width());
    assert_eq!(from_file.state_count(), inline.state_count());
    assert_eq!(from_file.identifier(), path.display().to_string());
}

#[test]
fn starting_state_is_never_terminal_or_blocked() {
    let maze: Maze = FULL_ALPHABET.parse().unwrap();
    let mut rng = SampleSource::seeded(404);
    for _ in 0..1000 {
        let id = maze.starting_state(&mut rng).unwrap();
        assert!(!maze.is_terminal(id));
        assert!(!maze.is_intraversible(id));
    }
}

#[test]
fn starting_state_falls_back_to_all_states_without_explicit_starts() {
    // No '*' tile here, so draws come from the whole arena.
    let maze: Maze = "3 1\n..1".parse().unwrap();
    let mut rng = SampleSource::seeded(11);
    for _ in 0..200 {
        let id = maze.starting_state(&mut rng).unwrap();
        assert!(!maze.is_terminal(id));
    }
}

/// The gate round-trip of the spec: intraversible, open after the lever
/// fires, intraversible again after reset.
#[test]
fn gate_activation_round_trip() {
    let mut maze: Maze = "4 1\n*:|1"
        .parse::<Maze>()
        .unwrap()
        .with_slip_distribution([1.0, 0.0, 0.0, 0.0])
        .unwrap();
    let mut rng = SampleSource::seeded(77);

    let gate = maze.gate_states()[0];
    assert!(maze.is_intraversible(gate));

    // Walk onto the lever; its transition opens every gate.
    let start = maze.state_id_at(0, 0).unwrap();
    let (on_lever, _) = maze.transition(start, mazerl::Action::Right, &mut rng);
    assert_eq!(maze.state(on_lever).position().x, 1);
    assert!(!maze.is_intraversible(gate));
    assert_eq!(maze.state(gate).effective_tile(), Tile::Path);

    maze.reset();
    assert!(maze.is_intraversible(gate));
    assert_eq!(maze.state(gate).effective_tile(), Tile::Gate);
}
