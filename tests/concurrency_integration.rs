//! Concurrent service calls
//!
//! Races several threads through the same land or battle and checks that
//! the per-key locks let exactly one of them write.

mod common;

use std::sync::Barrier;
use std::thread;

use alliance_war::core::calendar::WarWindow;
use alliance_war::core::error::{Outcome, Rejection, Result};
use alliance_war::core::types::AllianceId;
use alliance_war::war::store::WarStore;
use alliance_war::war::{InMemoryWarStore, LandWarService};
use common::{war_time, Beast, Fixture, LAND};

const RACERS: usize = 8;

/// Run `call` on `RACERS` threads released together
fn race<T, F>(service: &LandWarService<InMemoryWarStore>, call: F) -> Vec<T>
where
    T: Send,
    F: Fn(&LandWarService<InMemoryWarStore>, u64) -> T + Sync,
{
    let barrier = Barrier::new(RACERS);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS as u64)
            .map(|seed| {
                let (barrier, call) = (&barrier, &call);
                scope.spawn(move || {
                    barrier.wait();
                    call(service, seed)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

fn titan_against_runt() -> LandWarService<InMemoryWarStore> {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()]]);
    fixture.register(2, LAND, &[&[Beast::runt()]]);
    fixture.service()
}

fn split<T>(results: Vec<Result<Outcome<T>>>) -> (Vec<T>, Vec<Rejection>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for result in results {
        match result.unwrap() {
            Ok(value) => accepted.push(value),
            Err(rejection) => rejected.push(rejection),
        }
    }
    (accepted, rejected)
}

#[test]
fn test_racing_pairings_create_one_battle() {
    let service = titan_against_runt();

    let (accepted, rejected) = split(race(&service, |s, seed| s.pair_land(LAND, seed)));
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].battles.len(), 1);
    assert_eq!(rejected.len(), RACERS - 1);
    assert!(rejected
        .iter()
        .all(|r| matches!(r, Rejection::InsufficientRegistrations { .. })));

    let store = service.store();
    let battles = store.battles_by_land(LAND).unwrap();
    assert_eq!(battles.len(), 1);
    assert_eq!(store.signups_by_battle(battles[0].id).unwrap().len(), 2);
}

#[test]
fn test_racing_advances_fight_the_round_once() {
    let service = titan_against_runt();
    let battle_id = service.pair_land(LAND, 42).unwrap().unwrap().battles[0].battle_id;

    let (accepted, rejected) = split(race(&service, |s, seed| s.advance_round(battle_id, seed)));
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].battle_finished);
    assert_eq!(rejected.len(), RACERS - 1);
    assert!(rejected
        .iter()
        .all(|r| *r == Rejection::BattleFinished { battle: battle_id }));

    let store = service.store();
    let rounds = store.rounds_by_battle(battle_id).unwrap();
    assert_eq!(rounds.len(), 1);
    assert_eq!(
        store.duels_by_round(rounds[0].id).unwrap().len(),
        accepted[0].round_summary.duel_count
    );
    assert_eq!(store.war_records(AllianceId(1)).unwrap().len(), 1);
    assert_eq!(store.alliance_honor(AllianceId(1)).unwrap().lifetime, 1);
    let season = WarWindow::at(war_time()).season_key;
    assert_eq!(store.season_score(AllianceId(1), &season).unwrap(), 1);
}

#[test]
fn test_racing_land_wars_settle_the_land_once() {
    let service = titan_against_runt();

    let results = race(&service, |s, seed| s.run_land_war(LAND, seed));
    for result in results {
        // Late runners find the land paired or already held
        match result.unwrap() {
            Ok(report) => assert!(report.occupier.is_none() || report.occupier == Some(AllianceId(1))),
            Err(rejection) => assert!(matches!(
                rejection,
                Rejection::InsufficientRegistrations { .. }
            )),
        }
    }

    let store = service.store();
    assert_eq!(store.battles_by_land(LAND).unwrap().len(), 1);
    assert_eq!(
        store.land_occupation(LAND).unwrap().map(|o| o.alliance_id),
        Some(AllianceId(1))
    );
    let season = WarWindow::at(war_time()).season_key;
    assert_eq!(store.season_score(AllianceId(1), &season).unwrap(), 1);
    assert_eq!(store.alliance_honor(AllianceId(1)).unwrap().lifetime, 1);
}
