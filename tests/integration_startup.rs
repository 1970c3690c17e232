//! Integration tests covering a full session from generation to autopilot play.

use delver::{
    Actor, Autoexplore, DelverError, DelverResult, Direction, DungeonMap, GameCompletionState,
    GameState, GenerationConfig, PlayerAction, Position, Room, SequenceRandom, TurnOutcome,
};

#[test]
fn test_basic_startup() -> DelverResult<()> {
    let game = GameState::new(GenerationConfig::default())?;

    assert!(game.is_player_turn());
    assert_eq!(game.completion_state, GameCompletionState::Playing);

    let player = game.player().expect("player placed");
    let first_room = game.map().rooms()[0];
    assert_eq!(player.position(), first_room.center());
    assert!(game.map().is_in_fov(player.position()));
    game.validate()?;

    Ok(())
}

#[test]
fn test_one_room_map_rejects_wall_move() -> DelverResult<()> {
    let mut map = DungeonMap::new(10, 10);
    let room = Room::new(1, 1, 8, 8);
    for pos in room.interior_positions() {
        map.set_cell_properties(pos, true, true, true);
    }
    map.add_room(room);
    let player = map.place_player(Actor::new_player("Rogue").with_position(Position::new(5, 5)))?;

    assert!(!map.set_actor_position(player, Position::new(0, 5)));
    assert_eq!(map.actor(player).map(Actor::position), Some(Position::new(5, 5)));
    assert!(!map.is_walkable(Position::new(5, 5)));

    let mut game = GameState::from_map(
        map,
        GenerationConfig::for_testing(1),
        Box::new(SequenceRandom::new(vec![1])),
    )?;
    for _ in 0..3 {
        game.apply_player_action(PlayerAction::Move(Direction::West))?;
    }
    assert_eq!(
        game.apply_player_action(PlayerAction::Move(Direction::West))?,
        TurnOutcome::Blocked
    );
    assert_eq!(game.player().map(Actor::position), Some(Position::new(2, 5)));

    Ok(())
}

#[test]
fn test_autopilot_session_keeps_invariants() -> DelverResult<()> {
    for seed in [1, 7, 42, 1234] {
        let mut game = GameState::new(GenerationConfig::new(seed))?;
        let pilot = Autoexplore::new();
        let explored_at_start = game.map().cells().filter(|(_, c)| c.explored).count();

        for _ in 0..300 {
            if game.is_game_over() {
                break;
            }
            let action = pilot.next_action(&game);
            game.apply_player_action(action)?;
            game.validate()?;
            assert!(game.message_log().len() <= game.message_log().capacity());
        }

        let explored_at_end = game.map().cells().filter(|(_, c)| c.explored).count();
        assert!(explored_at_end >= explored_at_start);
    }

    Ok(())
}

#[test]
fn test_config_from_json() -> DelverResult<()> {
    let config: GenerationConfig =
        serde_json::from_str(r#"{"seed": 5, "width": 50, "height": 30, "max_rooms": 8}"#)?;
    assert_eq!(config.room_min_size, GenerationConfig::default().room_min_size);

    let game = GameState::new(config)?;
    assert_eq!(game.map().width(), 50);
    assert_eq!(game.map().height(), 30);
    assert!(game.map().rooms().len() <= 8);

    Ok(())
}

#[test]
fn test_bad_config_fails_fast() {
    let config = GenerationConfig {
        room_max_size: 60,
        ..GenerationConfig::new(1)
    };
    assert!(matches!(
        GameState::new(config),
        Err(DelverError::InvalidConfig(_))
    ));
}
