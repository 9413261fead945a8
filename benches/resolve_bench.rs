use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use drydock::board::{Constants, Direction, GameState, Position, ShipIdx};
use drydock::engine::Engine;
use drydock::resolve::{MovementMap, ResolverConfig};
use drydock::tunables::{Bucket, Tunables};

/// A crowded 64x64 late-game board: `own` ships of ours and as many
/// enemies, all on random distinct cells.
fn crowded_board(own: usize, seed: u64) -> (GameState, Vec<(ShipIdx, Vec<Direction>)>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = GameState::empty(
        Constants::default(),
        0,
        64,
        64,
        &[
            (0, Position::new(16, 16)),
            (1, Position::new(48, 16)),
            (2, Position::new(16, 48)),
            (3, Position::new(48, 48)),
        ],
    );
    for cell in 0..state.map.cell_count() {
        let pos = state.map.position_of(cell);
        state.map.at_mut(pos).halite = rng.gen_range(0..400);
    }

    // Cluster our fleet around the shipyard so buckets actually collide.
    let mut cells = state.map.within_radius(Position::new(16, 16), 12);
    cells.shuffle(&mut rng);
    let mut ships = Vec::with_capacity(own);
    for (i, pos) in cells.into_iter().take(own).enumerate() {
        let idx = state
            .place_ship(0, i as u32, pos, rng.gen_range(0..1000))
            .unwrap();
        let mut dirs = Direction::CARDINALS.to_vec();
        dirs.shuffle(&mut rng);
        dirs.push(Direction::Still);
        ships.push((idx, dirs));
    }
    let mut placed = 0;
    while placed < own {
        let pos = Position::new(rng.gen_range(0..64), rng.gen_range(0..64));
        let owner = rng.gen_range(1..4);
        if state.place_ship(owner, 10_000 + placed as u32, pos, 0).is_some() {
            placed += 1;
        }
    }
    (state, ships)
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for own in [50usize, 200] {
        let (state, ships) = crowded_board(own, 9);
        let config = ResolverConfig {
            enemy_conflict_probability: 0.98,
            home_exempt: false,
        };
        group.bench_function(format!("{own}_ships"), |b| {
            let mut rng = SmallRng::seed_from_u64(1);
            b.iter(|| {
                let mut mm = MovementMap::new(&state, config);
                for (ship, dirs) in &ships {
                    mm.register_intent(*ship, dirs);
                }
                mm.resolve(&mut rng);
                black_box(mm.commands())
            })
        });
    }
    group.finish();
}

fn bench_play_turn(c: &mut Criterion) {
    let (state, _) = crowded_board(200, 4);
    let tunables = Tunables::defaults(Bucket::for_state(&state));
    c.bench_function("play_turn_200_ships", |b| {
        let mut engine = Engine::new(tunables.clone(), Some(1));
        b.iter(|| black_box(engine.play_turn(black_box(&state))))
    });
}

criterion_group!(benches, bench_resolve, bench_play_turn);
criterion_main!(benches);
