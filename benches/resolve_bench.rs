//! Benchmarks a full movement resolution from the opening position.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use entente::{Coast, Location, Map, MovementTurn, OrderSpec, Power, Province};

use Power::*;
use Province::*;

/// The opening position with a typical first-move order set: two contested
/// provinces (Galicia and the Black Sea) and a German relay through Kiel.
fn opening_with_orders() -> MovementTurn {
    let mut turn = MovementTurn::opening(Map::standard());
    turn.submit_orders(
        Austria,
        &[
            OrderSpec::move_to(Vie, Gal),
            OrderSpec::move_to(Bud, Ser),
            OrderSpec::move_to(Tri, Alb),
        ],
    )
    .unwrap();
    turn.submit_orders(
        England,
        &[
            OrderSpec::move_to(Lon, Nth),
            OrderSpec::move_to(Edi, Nrg),
            OrderSpec::move_to(Lvp, Yor),
        ],
    )
    .unwrap();
    turn.submit_orders(
        France,
        &[
            OrderSpec::move_to(Bre, Mao),
            OrderSpec::move_to(Par, Bur),
            OrderSpec::move_to(Mar, Spa),
        ],
    )
    .unwrap();
    turn.submit_orders(
        Germany,
        &[
            OrderSpec::move_to(Kie, Den),
            OrderSpec::move_to(Ber, Kie),
            OrderSpec::move_to(Mun, Ruh),
        ],
    )
    .unwrap();
    turn.submit_orders(
        Italy,
        &[
            OrderSpec::move_to(Nap, Ion),
            OrderSpec::move_to(Rom, Apu),
            OrderSpec::hold(Ven),
        ],
    )
    .unwrap();
    turn.submit_orders(
        Russia,
        &[
            OrderSpec::move_to(Location::with_coast(Stp, Coast::South), Bot),
            OrderSpec::move_to(Mos, Ukr),
            OrderSpec::move_to(War, Gal),
            OrderSpec::move_to(Sev, Bla),
        ],
    )
    .unwrap();
    turn.submit_orders(
        Turkey,
        &[
            OrderSpec::move_to(Ank, Bla),
            OrderSpec::move_to(Con, Bul),
            OrderSpec::move_to(Smy, Con),
        ],
    )
    .unwrap();
    turn
}

fn bench_resolution(c: &mut Criterion) {
    c.bench_function("resolve_opening_movement", |b| {
        b.iter_batched(
            opening_with_orders,
            |turn| turn.next_turn().unwrap(),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("default_hold_resolution", |b| {
        b.iter_batched(
            || MovementTurn::opening(Map::standard()),
            |turn| turn.next_turn().unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
