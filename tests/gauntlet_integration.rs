//! Gauntlet integration tests
//!
//! Pairs a land, then advances its battle round by round and checks what
//! lands in the store: duels, HP carry-over, statuses and settlement.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use alliance_war::core::calendar::WarWindow;
use alliance_war::core::error::{Rejection, WarError};
use alliance_war::core::types::{AllianceId, BattleId, LandId, RegistrationId, RoundId, UserId};
use alliance_war::war::battle::{Battle, Round};
use alliance_war::war::duel::Duel;
use alliance_war::war::registration::Registration;
use alliance_war::war::signup::Signup;
use alliance_war::war::store::{
    ArmyAssignment, Change, ChangeSet, CheckinKey, CommitReceipt, Honor, LandOccupation, StoreError,
    StoreResult, WarRecord, WarResult,
};
use alliance_war::war::{
    BattlePhase, BattleVerdict, DuelReason, DuelResult, InMemoryWarStore, LandWarService,
    RegistrationStatus, RoundSelector, RoundStatus, SignupStatus, WarStore,
};
use common::{war_time, Beast, Fixture, LAND};

/// Pair the land and return the single battle with its left and right alliances
fn pair_one<S: WarStore>(service: &LandWarService<S>) -> (BattleId, AllianceId, AllianceId) {
    let report = service.pair_land(LAND, 42).unwrap().unwrap();
    assert_eq!(report.battles.len(), 1);
    let battle = &report.battles[0];
    (battle.battle_id, battle.left_alliance_id, battle.right_alliance_id)
}

#[test]
fn test_two_on_one_battle_is_won_and_land_occupied() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()], &[Beast::titan()]]);
    fixture.register(2, LAND, &[&[Beast::runt()]]);
    let service = fixture.service();
    let (battle_id, left, _right) = pair_one(&service);

    let report = service.advance_round(battle_id, 7).unwrap().unwrap();
    assert!(report.battle_finished);
    assert_eq!(report.round_summary.round_no, 1);
    assert_eq!(report.round_summary.duel_count, 1);

    let (winner_alive, loser_alive) = if left == AllianceId(1) {
        assert_eq!(report.verdict, Some(BattleVerdict::LeftWins));
        (report.round_summary.left_alive, report.round_summary.right_alive)
    } else {
        assert_eq!(report.verdict, Some(BattleVerdict::RightWins));
        (report.round_summary.right_alive, report.round_summary.left_alive)
    };
    assert_eq!((winner_alive, loser_alive), (2, 0));

    let store = service.store();
    let battle = store.battle(battle_id).unwrap().unwrap();
    assert_eq!(battle.phase, BattlePhase::Finished);
    assert!(battle.started_at.is_some());
    assert_eq!(battle.finished_at, Some(war_time()));

    let statuses: Vec<(AllianceId, RegistrationStatus)> = store
        .registrations_by_land(LAND, None)
        .unwrap()
        .iter()
        .map(|r| (r.alliance_id, r.status))
        .collect();
    assert!(statuses.contains(&(AllianceId(1), RegistrationStatus::Victor)));
    assert!(statuses.contains(&(AllianceId(2), RegistrationStatus::Eliminated)));

    let window = WarWindow::at(war_time());
    let occupation = store.land_occupation(LAND).unwrap().unwrap();
    assert_eq!(occupation.alliance_id, AllianceId(1));
    assert_eq!(occupation.war_date, window.date);
    assert_eq!(
        store.registration(occupation.registration_id).unwrap().unwrap().alliance_id,
        AllianceId(1)
    );
    assert_eq!(store.season_score(AllianceId(1), &window.season_key).unwrap(), 1);
    assert_eq!(
        store.alliance_honor(AllianceId(1)).unwrap(),
        Honor {
            current: 1,
            lifetime: 1
        }
    );
    assert_eq!(store.alliance_honor(AllianceId(2)).unwrap(), Honor::default());

    let won = service.get_war_records(AllianceId(1)).unwrap();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].result, WarResult::Win);
    assert_eq!(won[0].honor_gained, 1);
    assert_eq!(won[0].opponent_alliance_id, AllianceId(2));
    let lost = service.get_war_records(AllianceId(2)).unwrap();
    assert_eq!(lost[0].result, WarResult::Lose);
    assert_eq!(lost[0].honor_gained, 0);
    assert_eq!(lost[0].battle_id, battle_id);

    // Only the first titan had to fight
    let signups = store.signups_by_battle(battle_id).unwrap();
    let untouched = signups.iter().find(|s| s.user_id == UserId(102)).unwrap();
    assert_eq!(untouched.status, SignupStatus::Ready);
    assert!(untouched.hp_state.is_none());
    let runt = signups.iter().find(|s| s.user_id == UserId(201)).unwrap();
    assert_eq!(runt.status, SignupStatus::Eliminated);
}

#[test]
fn test_winner_carries_hp_into_next_duel() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::new(1_000, 60, 0, 10)]]);
    fixture.register(
        2,
        LAND,
        &[&[Beast::new(100, 20, 0, 5)], &[Beast::new(100, 20, 0, 5)]],
    );
    let service = fixture.service();
    let (battle_id, _, _) = pair_one(&service);

    let report = service.advance_round(battle_id, 11).unwrap().unwrap();
    assert_eq!(report.round_summary.duel_count, 2);
    assert!(report.battle_finished);

    let round = &service.store().rounds_by_battle(battle_id).unwrap()[0];
    let duels = service.store().duels_by_round(round.id).unwrap();
    assert_eq!(duels.len(), 2);

    let hp_seen_by = |duel: &Duel| -> Vec<u32> {
        duel.log
            .logs
            .iter()
            .filter(|entry| entry.defender_player_id == UserId(101))
            .map(|entry| entry.defender_hp_after)
            .collect()
    };
    let first = hp_seen_by(&duels[0]);
    let second = hp_seen_by(&duels[1]);
    assert!(!first.is_empty() && !second.is_empty());
    let after_first = *first.last().unwrap();
    assert!(after_first < 1_000);
    assert!(second[0] < after_first);

    let champion = service
        .store()
        .signups_by_battle(battle_id)
        .unwrap()
        .into_iter()
        .find(|s| s.user_id == UserId(101))
        .unwrap();
    assert_eq!(champion.status, SignupStatus::Advanced);
    let hp = champion.hp_state.unwrap();
    assert_eq!(hp.combatants.len(), 1);
    assert_eq!(hp.combatants[0].hp, *second.last().unwrap());
}

#[test]
fn test_finished_and_unknown_battles_are_rejected() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()]]);
    fixture.register(2, LAND, &[&[Beast::runt()]]);
    let service = fixture.service();
    let (battle_id, _, _) = pair_one(&service);
    service.advance_round(battle_id, 1).unwrap().unwrap();

    assert_eq!(
        service.advance_round(battle_id, 2).unwrap().unwrap_err(),
        Rejection::BattleFinished { battle: battle_id }
    );
    assert_eq!(
        service.advance_round(BattleId(999), 2).unwrap().unwrap_err(),
        Rejection::BattleNotFound {
            battle: BattleId(999)
        }
    );
}

#[test]
fn test_both_sides_empty_is_a_coin_flip() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[]]);
    fixture.register(2, LAND, &[&[]]);
    let service = fixture.service();
    let (battle_id, _, _) = pair_one(&service);

    let report = service.advance_round(battle_id, 3).unwrap().unwrap();
    assert!(report.battle_finished);
    assert_eq!(report.round_summary.duel_count, 1);
    assert_eq!(report.round_summary.duels[0].reason, Some(DuelReason::BothSidesEmpty));
    assert!(matches!(
        report.verdict,
        Some(BattleVerdict::LeftWins) | Some(BattleVerdict::RightWins)
    ));

    let round = &service.store().rounds_by_battle(battle_id).unwrap()[0];
    let duel = &service.store().duels_by_round(round.id).unwrap()[0];
    assert!(duel.log.logs.is_empty());
    assert_eq!(duel.log.reason, Some(DuelReason::BothSidesEmpty));
}

#[test]
fn test_empty_side_forfeits_without_combat() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::runt()]]);
    fixture.register(2, LAND, &[&[]]);
    let service = fixture.service();
    let (battle_id, left, _) = pair_one(&service);

    let report = service.advance_round(battle_id, 3).unwrap().unwrap();
    let duel = &report.round_summary.duels[0];
    assert_eq!(duel.reason, Some(DuelReason::OpponentEmpty));
    let expected = if left == AllianceId(1) {
        DuelResult::AttackerWon
    } else {
        DuelResult::DefenderWon
    };
    assert_eq!(duel.result, expected);
    assert_eq!(
        service.store().land_occupation(LAND).unwrap().map(|o| o.alliance_id),
        Some(AllianceId(1))
    );
}

#[test]
fn test_stuck_signup_opens_next_round() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()]]);
    fixture.register(2, LAND, &[&[Beast::titan()]]);
    let service = fixture.service();
    let (battle_id, _, _) = pair_one(&service);

    let store = service.store();
    let mut signups = store.signups_by_battle(battle_id).unwrap();
    signups[0].status = SignupStatus::Engaged;
    store
        .commit(vec![Change::SaveSignups(signups)].into_iter().collect())
        .unwrap();

    let report = service.advance_round(battle_id, 5).unwrap().unwrap();
    assert!(!report.battle_finished);
    assert_eq!(report.verdict, None);
    assert_eq!(report.round_summary.duel_count, 0);
    assert_eq!(
        (report.round_summary.left_alive, report.round_summary.right_alive),
        (1, 1)
    );

    let battle = store.battle(battle_id).unwrap().unwrap();
    assert_eq!(battle.current_round, 2);
    assert_eq!(battle.phase, BattlePhase::Active);
    let rounds = store.rounds_by_battle(battle_id).unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].status, RoundStatus::Finished);
    assert_eq!(rounds[1].status, RoundStatus::Active);
    assert_eq!(rounds[1].round_no, 2);

    let overview = service.get_battle_overview(LAND).unwrap().unwrap();
    assert_eq!(overview.battle.id, battle_id);
    assert_eq!(overview.rounds.len(), 2);
    assert_eq!((overview.left_alive, overview.right_alive), (1, 1));
}

#[test]
fn test_projections_are_read_only() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()], &[Beast::runt()]]);
    fixture.register(2, LAND, &[&[Beast::runt()], &[Beast::runt()]]);
    fixture.register(3, LAND, &[&[Beast::runt()]]);
    let service = fixture.service();
    let report = service.pair_land(LAND, 8).unwrap().unwrap();
    let battle_id = report.battles[0].battle_id;

    let overview = service.get_battle_overview(LAND).unwrap().unwrap();
    assert_eq!(overview.battle.id, battle_id);
    assert_eq!(overview.rounds.len(), 1);
    assert_eq!(overview.bye_registrations.len(), 1);
    assert_eq!(service.get_battle_overview(LAND).unwrap().unwrap(), overview);

    service.advance_round(battle_id, 9).unwrap().unwrap();
    let round_id = service.store().rounds_by_battle(battle_id).unwrap()[0].id;
    let by_id = service.get_round_duels(RoundSelector::Id(round_id)).unwrap().unwrap();
    let by_number = service
        .get_round_duels(RoundSelector::Number {
            battle: battle_id,
            round_no: 1,
        })
        .unwrap()
        .unwrap();
    assert_eq!(by_id, by_number);
    assert!(!by_id.duels.is_empty());
    assert_eq!(
        service.get_round_duels(RoundSelector::Id(round_id)).unwrap().unwrap(),
        by_id
    );

    assert_eq!(
        service.get_round_duels(RoundSelector::Id(RoundId(404))).unwrap().unwrap_err(),
        Rejection::RoundNotFound { round: RoundId(404) }
    );
    assert_eq!(
        service
            .get_round_duels(RoundSelector::Number {
                battle: battle_id,
                round_no: 9,
            })
            .unwrap()
            .unwrap_err(),
        Rejection::RoundNumberNotFound {
            battle: battle_id,
            round_no: 9
        }
    );
    assert_eq!(
        service.get_battle_overview(LandId(12)).unwrap().unwrap_err(),
        Rejection::NoActiveBattle { land: LandId(12) }
    );
}

/// Delegates to the in-memory store but can refuse every commit
struct FlakyStore {
    inner: InMemoryWarStore,
    fail_commits: AtomicBool,
}

impl WarStore for FlakyStore {
    fn registration(&self, id: RegistrationId) -> StoreResult<Option<Registration>> {
        self.inner.registration(id)
    }

    fn registrations_by_land(
        &self,
        land_id: LandId,
        statuses: Option<&[RegistrationStatus]>,
    ) -> StoreResult<Vec<Registration>> {
        self.inner.registrations_by_land(land_id, statuses)
    }

    fn battle(&self, id: BattleId) -> StoreResult<Option<Battle>> {
        self.inner.battle(id)
    }

    fn active_battle_by_land(&self, land_id: LandId) -> StoreResult<Option<Battle>> {
        self.inner.active_battle_by_land(land_id)
    }

    fn battles_by_land(&self, land_id: LandId) -> StoreResult<Vec<Battle>> {
        self.inner.battles_by_land(land_id)
    }

    fn rounds_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Round>> {
        self.inner.rounds_by_battle(battle_id)
    }

    fn round(&self, id: RoundId) -> StoreResult<Option<Round>> {
        self.inner.round(id)
    }

    fn signups_by_registration(&self, registration_id: RegistrationId) -> StoreResult<Vec<Signup>> {
        self.inner.signups_by_registration(registration_id)
    }

    fn signups_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Signup>> {
        self.inner.signups_by_battle(battle_id)
    }

    fn duels_by_round(&self, round_id: RoundId) -> StoreResult<Vec<Duel>> {
        self.inner.duels_by_round(round_id)
    }

    fn army_assignments(&self, alliance_id: AllianceId) -> StoreResult<Vec<ArmyAssignment>> {
        self.inner.army_assignments(alliance_id)
    }

    fn has_war_checkin(&self, key: &CheckinKey) -> StoreResult<bool> {
        self.inner.has_war_checkin(key)
    }

    fn land_occupation(&self, land_id: LandId) -> StoreResult<Option<LandOccupation>> {
        self.inner.land_occupation(land_id)
    }

    fn alliance_honor(&self, alliance_id: AllianceId) -> StoreResult<Honor> {
        self.inner.alliance_honor(alliance_id)
    }

    fn season_score(&self, alliance_id: AllianceId, season_key: &str) -> StoreResult<i64> {
        self.inner.season_score(alliance_id, season_key)
    }

    fn war_records(&self, alliance_id: AllianceId) -> StoreResult<Vec<WarRecord>> {
        self.inner.war_records(alliance_id)
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.commit(changes)
    }
}

#[test]
fn test_failed_commit_leaves_battle_untouched() {
    let mut fixture = Fixture::new();
    fixture.register(1, LAND, &[&[Beast::titan()]]);
    fixture.register(2, LAND, &[&[Beast::runt()]]);
    let service = fixture.service_over(|inner| FlakyStore {
        inner,
        fail_commits: AtomicBool::new(false),
    });
    let (battle_id, _, _) = pair_one(&service);

    service.store().fail_commits.store(true, Ordering::SeqCst);
    let err = service.advance_round(battle_id, 4).unwrap_err();
    assert!(matches!(err, WarError::Store(StoreError::Unavailable(_))));

    let store = service.store();
    assert_eq!(store.battle(battle_id).unwrap().unwrap().phase, BattlePhase::Active);
    let rounds = store.rounds_by_battle(battle_id).unwrap();
    assert_eq!(rounds.len(), 1);
    assert!(rounds[0].is_active());
    assert!(store.duels_by_round(rounds[0].id).unwrap().is_empty());
    assert!(store
        .signups_by_battle(battle_id)
        .unwrap()
        .iter()
        .all(|s| s.status == SignupStatus::Ready));
    assert!(store.land_occupation(LAND).unwrap().is_none());
    assert!(store.war_records(AllianceId(1)).unwrap().is_empty());

    store.fail_commits.store(false, Ordering::SeqCst);
    let report = service.advance_round(battle_id, 4).unwrap().unwrap();
    assert!(report.battle_finished);
    assert!(report.verdict.and_then(BattleVerdict::winner).is_some());
}
