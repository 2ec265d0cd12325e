use game_core::{
    ClientId, EnemySpawn, EntityId, Event, GameConfig, LevelCatalog, LevelConfig, Position,
};
use runtime::{ClientMirror, GameServer, GameStateEvent};

fn server_for(level: LevelConfig) -> GameServer {
    GameServer::from_catalog(LevelCatalog::new(vec![level]), GameConfig::default(), 17).unwrap()
}

fn open_room(width: u32, height: u32, start_tiles: Vec<Position>) -> LevelConfig {
    LevelConfig {
        index: 0,
        width,
        height,
        walls: Vec::new(),
        start_tiles,
        enemies: Vec::new(),
    }
}

fn player(server: &GameServer, client: ClientId) -> Option<EntityId> {
    server.state().entities.player_of(client).map(|entity| entity.id)
}

#[test]
fn failed_join_is_retried_until_a_start_tile_frees_up() {
    let mut server = server_for(open_room(4, 4, vec![Position::new(0, 0)]));
    let first = server.connect();
    let second = server.connect();
    server.submit(first, Event::join(first, "ada")).unwrap();
    server.submit(second, Event::join(second, "bo")).unwrap();

    server.tick().unwrap();
    let ada = player(&server, first).unwrap();
    assert_eq!(player(&server, second), None);
    assert_eq!(server.inbox(second).unwrap().len(), 1);

    server.tick().unwrap();
    assert_eq!(server.inbox(second).unwrap().len(), 1, "still queued");

    // ada steps off the only start tile; the join is evaluated before her
    // move within the tick, so it only succeeds on the tick after
    server
        .submit(first, Event::move_to(ada, Position::new(1, 0)))
        .unwrap();
    server.tick().unwrap();
    assert_eq!(player(&server, second), None);

    server.tick().unwrap();
    let bo = player(&server, second).unwrap();
    assert_eq!(
        server.state().entities.get(bo).unwrap().position,
        Position::new(0, 0)
    );
    assert!(server.inbox(second).unwrap().is_empty());
    assert_eq!(server.state().turn.active(), Some(ada));
}

#[test]
fn failed_move_is_discarded_after_one_attempt() {
    let mut server = server_for(open_room(5, 5, vec![Position::new(0, 0)]));
    let client = server.connect();
    server.submit(client, Event::join(client, "ada")).unwrap();
    server.tick().unwrap();
    let ada = player(&server, client).unwrap();

    server
        .submit(client, Event::move_to(ada, Position::new(3, 3)))
        .unwrap();
    let report = server.tick().unwrap();

    assert!(matches!(
        report.events.as_slice(),
        [GameStateEvent::Dropped { .. }]
    ));
    assert!(server.inbox(client).unwrap().is_empty());
    assert_eq!(
        server.state().entities.get(ada).unwrap().position,
        Position::new(0, 0)
    );

    let report = server.tick().unwrap();
    assert!(report.events.is_empty(), "a discarded move never comes back");
}

#[test]
fn diagonal_attack_past_two_walls_is_rejected() {
    let mut level = open_room(3, 3, vec![Position::new(0, 0)]);
    level.walls = vec![Position::new(1, 0), Position::new(0, 1)];
    level.enemies = vec![EnemySpawn {
        position: Position::new(1, 1),
        kind: "warrior".into(),
        floor: 1,
    }];
    let mut server = server_for(level);
    let client = server.connect();
    server.submit(client, Event::join(client, "ada")).unwrap();

    // the warrior cannot see past the corners and gives its turn away
    let report = server.tick().unwrap();
    let ada = player(&server, client).unwrap();
    assert_eq!(report.turn_passed_to, Some(ada));

    let warrior = server
        .state()
        .entities
        .iter()
        .find(|entity| !entity.is_player())
        .map(|entity| entity.id)
        .unwrap();
    let health = server.state().entities.get(warrior).unwrap().health;

    server.submit(client, Event::attack(ada, warrior)).unwrap();
    let report = server.tick().unwrap();

    assert!(matches!(
        report.events.as_slice(),
        [GameStateEvent::Dropped { .. }]
    ));
    assert_eq!(server.state().entities.get(warrior).unwrap().health, health);
}

#[test]
fn mirror_tracks_the_server_through_a_chase() {
    let mut level = open_room(7, 2, vec![Position::new(0, 0)]);
    level.enemies = vec![EnemySpawn {
        position: Position::new(6, 1),
        kind: "warrior".into(),
        floor: 1,
    }];
    let mut server = server_for(level);
    let client = server.connect();
    server.submit(client, Event::join(client, "ada")).unwrap();

    let mut mirror = ClientMirror::new();
    let mut messages = 0;
    for _ in 0..16 {
        let report = server.tick().unwrap();
        if let Some(message) = &report.sync {
            mirror.apply(message).unwrap();
            messages += 1;
        }
        // ada keeps handing the turn back
        if let Some(ada) = player(&server, client) {
            if server.state().turn.is_active(ada) && server.inbox(client).unwrap().is_empty() {
                server.submit(client, Event::end_turn(ada)).unwrap();
            }
        }
    }

    assert!(messages > 1);
    let mirrored = mirror.state().unwrap();
    assert_eq!(mirrored.entities, server.state().entities);
    assert_eq!(mirrored.turn, server.state().turn);
}
