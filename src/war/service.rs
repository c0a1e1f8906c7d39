//! Land-war entry points
//!
//! [`LandWarService`] is what request handlers call. Each mutating
//! operation plans against store snapshots, then commits once while holding
//! the per-key lock for the land or battle it touches.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::combat::adapter::{CombatConverter, LevelScaledConverter};
use crate::combat::gateway::PlayerGateway;
use crate::combat::oracle::{CombatOracle, StrikeOracle};
use crate::core::calendar::{Clock, SystemClock, WarWindow};
use crate::core::config::WarConfig;
use crate::core::error::{Outcome, Rejection, Result};
use crate::core::types::{AllianceId, BattleId, LandId};
use crate::war::finalizer::{Finalizer, Settlement};
use crate::war::gauntlet::{AdvancePlan, GauntletEngine};
use crate::war::locks::KeyedLocks;
use crate::war::pairing::PairingScheduler;
use crate::war::resolver::DuelResolver;
use crate::war::store::{WarRecord, WarStore};
use crate::war::view::{
    AdvanceReport, BattleOverview, BattleRun, ByeEntry, LandWarReport, PairingReport, PairingSummary,
    RoundDuels, RoundSelector,
};

pub struct LandWarService<S> {
    store: S,
    players: Box<dyn PlayerGateway>,
    converter: Box<dyn CombatConverter>,
    oracle: Box<dyn CombatOracle>,
    clock: Arc<dyn Clock>,
    config: WarConfig,
    pairing: PairingScheduler,
    gauntlet: GauntletEngine,
    finalizer: Finalizer,
    land_locks: KeyedLocks<LandId>,
    battle_locks: KeyedLocks<BattleId>,
}

impl<S: WarStore> LandWarService<S> {
    /// Service with the built-in converter and oracle, the wall clock and
    /// default config
    pub fn new(store: S, players: impl PlayerGateway + 'static) -> Self {
        Self {
            store,
            players: Box::new(players),
            converter: Box::new(LevelScaledConverter),
            oracle: Box::new(StrikeOracle),
            clock: Arc::new(SystemClock),
            config: WarConfig::default(),
            pairing: PairingScheduler::default(),
            gauntlet: GauntletEngine,
            finalizer: Finalizer::default(),
            land_locks: KeyedLocks::new(),
            battle_locks: KeyedLocks::new(),
        }
    }

    pub fn with_config(mut self, config: WarConfig) -> Self {
        self.finalizer = Finalizer::new(config.clone());
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_oracle(mut self, oracle: impl CombatOracle + 'static) -> Self {
        self.oracle = Box::new(oracle);
        self
    }

    pub fn with_converter(mut self, converter: impl CombatConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WarConfig {
        &self.config
    }

    /// Pair every eligible registration on the land into battles
    pub fn pair_land(&self, land_id: LandId, seed: u64) -> Result<Outcome<PairingReport>> {
        self.pair(land_id, seed, false)
    }

    fn pair(&self, land_id: LandId, seed: u64, with_victors: bool) -> Result<Outcome<PairingReport>> {
        self.land_locks.with_lock(land_id, || {
            let now = self.clock.now();
            let planned = if with_victors {
                self.pairing.plan_with_victors(&self.store, land_id, seed, now)?
            } else {
                self.pairing.plan(&self.store, land_id, seed, now)?
            };
            let plan = match planned {
                Ok(plan) => plan,
                Err(rejection) => {
                    warn!(land = %land_id, %rejection, "pairing rejected");
                    return Ok(Err(rejection));
                }
            };

            let receipt = self.store.commit(plan.changes)?;
            let battles: Vec<PairingSummary> = plan
                .matchups
                .into_iter()
                .zip(receipt.battles.iter().zip(&receipt.rounds))
                .map(|(matchup, (&battle_id, &round_id))| PairingSummary {
                    battle_id,
                    round_id,
                    left_registration_id: matchup.left.id,
                    right_registration_id: matchup.right.id,
                    left_alliance_id: matchup.left.alliance_id,
                    right_alliance_id: matchup.right.alliance_id,
                    left_signups: matchup.left_signups,
                    right_signups: matchup.right_signups,
                })
                .collect();

            info!(
                land = %land_id,
                seed,
                battles = battles.len(),
                bye = ?plan.bye.as_ref().map(|b| b.alliance_id),
                "land paired"
            );
            Ok(Ok(PairingReport {
                land_id,
                seed,
                battles,
                bye: plan.bye,
            }))
        })
    }

    /// Fight the battle's current round
    pub fn advance_round(&self, battle_id: BattleId, seed: u64) -> Result<Outcome<AdvanceReport>> {
        self.battle_locks.with_lock(battle_id, || {
            let now = self.clock.now();
            let resolver = DuelResolver::new(
                self.players.as_ref(),
                self.converter.as_ref(),
                self.oracle.as_ref(),
                self.config.max_log_turns,
            );
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let plan = match self
                .gauntlet
                .plan_advance(&self.store, battle_id, &resolver, &mut rng, now)?
            {
                Ok(plan) => plan,
                Err(rejection) => {
                    warn!(battle = %battle_id, %rejection, "advance rejected");
                    return Ok(Err(rejection));
                }
            };
            let AdvancePlan {
                mut changes,
                battle,
                left,
                right,
                summary,
                verdict,
            } = plan;

            match verdict {
                None => {
                    self.store.commit(changes)?;
                    debug!(battle = %battle_id, next_round = battle.current_round, "battle continues");
                }
                Some(verdict) => {
                    let occupier = self.land_locks.with_lock(battle.land_id, || -> Result<_> {
                        let (concluded, registrations) =
                            self.finalizer.conclude(battle_id, &left, &right, verdict, now);
                        changes.append(concluded);
                        let mut occupier = None;
                        if verdict.winner().is_some() {
                            if let Settlement::Occupy { alliance_id, changes: occupy } =
                                self.finalizer.settle(&self.store, battle.land_id, &registrations, now)?
                            {
                                changes.append(occupy);
                                occupier = Some(alliance_id);
                            }
                        }
                        self.store.commit(changes)?;
                        Ok(occupier)
                    })?;

                    info!(
                        battle = %battle_id,
                        land = %battle.land_id,
                        ?verdict,
                        rounds = battle.current_round,
                        "battle finished"
                    );
                    if let Some(alliance) = occupier {
                        info!(land = %battle.land_id, alliance = %alliance, "land occupied");
                    }
                }
            }

            Ok(Ok(AdvanceReport {
                battle_id,
                battle_finished: verdict.is_some(),
                verdict,
                round_summary: summary,
            }))
        })
    }

    /// The land's battle in progress with its rounds and the bye queue
    pub fn get_battle_overview(&self, land_id: LandId) -> Result<Outcome<BattleOverview>> {
        let Some(battle) = self.store.active_battle_by_land(land_id)? else {
            return Ok(Err(Rejection::NoActiveBattle { land: land_id }));
        };
        let rounds = self.store.rounds_by_battle(battle.id)?;
        let (left_alive, right_alive) = rounds
            .last()
            .map_or((0, 0), |r| (r.left_alive, r.right_alive));
        let registrations = self.store.registrations_by_land(land_id, None)?;

        Ok(Ok(BattleOverview {
            battle,
            rounds,
            left_alive,
            right_alive,
            bye_registrations: ByeEntry::any_bye(&registrations),
        }))
    }

    pub fn get_round_duels(&self, selector: RoundSelector) -> Result<Outcome<RoundDuels>> {
        let round = match selector {
            RoundSelector::Id(round_id) => match self.store.round(round_id)? {
                Some(round) => round,
                None => return Ok(Err(Rejection::RoundNotFound { round: round_id })),
            },
            RoundSelector::Number { battle, round_no } => {
                if self.store.battle(battle)?.is_none() {
                    return Ok(Err(Rejection::BattleNotFound { battle }));
                }
                match self
                    .store
                    .rounds_by_battle(battle)?
                    .into_iter()
                    .find(|r| r.round_no == round_no)
                {
                    Some(round) => round,
                    None => return Ok(Err(Rejection::RoundNumberNotFound { battle, round_no })),
                }
            }
        };
        let duels = self.store.duels_by_round(round.id)?;
        Ok(Ok(RoundDuels { round, duels }))
    }

    pub fn get_war_records(&self, alliance_id: AllianceId) -> Result<Vec<WarRecord>> {
        Ok(self.store.war_records(alliance_id)?)
    }

    /// Occupy the land for its sole remaining contender, if there is one
    ///
    /// Returns the holder. Running it again while the same registration
    /// holds the land changes nothing, whatever the date.
    pub fn settle_land_if_sole_survivor(&self, land_id: LandId) -> Result<Option<AllianceId>> {
        self.land_locks.with_lock(land_id, || {
            let settlement = self.finalizer.settle(&self.store, land_id, &[], self.clock.now())?;
            let holder = settlement.holder();
            if let Settlement::Occupy { alliance_id, changes } = settlement {
                self.store.commit(changes)?;
                info!(land = %land_id, alliance = %alliance_id, "land occupied");
            }
            Ok(holder)
        })
    }

    /// Pair and fight the land's bracket until one contender is left
    ///
    /// Victors from earlier cycles re-enter pairing while anyone else is
    /// still in the running. Per-call seeds are drawn from `seed`.
    ///
    /// Only runs on Wednesday and Saturday 20:00-22:00 UTC unless
    /// [`WarConfig::allow_time_bypass`] is set.
    pub fn run_land_war(&self, land_id: LandId, seed: u64) -> Result<Outcome<LandWarReport>> {
        let now = self.clock.now();
        if !self.config.allow_time_bypass && !WarWindow::is_battle_time(now) {
            let rejection = Rejection::OutsideBattleHours { at: now };
            warn!(land = %land_id, %rejection, "land war rejected");
            return Ok(Err(rejection));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut report = LandWarReport {
            land_id,
            seed,
            cycles: 0,
            pairings: Vec::new(),
            battles: Vec::new(),
            occupier: None,
            stopped: None,
        };

        while report.cycles < self.config.max_bracket_cycles {
            let registrations = self.store.registrations_by_land(land_id, None)?;
            let contenders: Vec<_> = registrations
                .iter()
                .filter(|r| r.status.is_contender())
                .collect();
            if contenders.len() <= 1 {
                break;
            }

            report.cycles += 1;
            let pairing = match self.pair(land_id, rng.gen(), true)? {
                Ok(pairing) => pairing,
                Err(rejection) => {
                    report.stopped = Some(rejection);
                    break;
                }
            };
            for summary in &pairing.battles {
                report.battles.push(self.fight_to_finish(summary, &mut rng)?);
            }
            report.pairings.push(pairing);
        }

        report.occupier = self.settle_land_if_sole_survivor(land_id)?;
        if report.occupier.is_none() {
            if let Some(rejection) = report.stopped.clone() {
                if report.pairings.is_empty() {
                    return Ok(Err(rejection));
                }
            } else if report.cycles >= self.config.max_bracket_cycles {
                warn!(land = %land_id, cycles = report.cycles, "bracket cycle cap reached without a survivor");
            }
        }
        Ok(Ok(report))
    }

    fn fight_to_finish(&self, summary: &PairingSummary, rng: &mut ChaCha8Rng) -> Result<BattleRun> {
        let mut run = BattleRun {
            battle_id: summary.battle_id,
            left_alliance_id: summary.left_alliance_id,
            right_alliance_id: summary.right_alliance_id,
            rounds: 0,
            verdict: None,
        };
        loop {
            let advance = match self.advance_round(summary.battle_id, rng.gen())? {
                Ok(advance) => advance,
                Err(rejection) => {
                    warn!(battle = %summary.battle_id, %rejection, "battle stopped");
                    return Ok(run);
                }
            };
            run.rounds += 1;
            if advance.battle_finished {
                run.verdict = advance.verdict;
                return Ok(run);
            }
            if advance.round_summary.duel_count == 0 {
                warn!(battle = %summary.battle_id, "round produced no duels, leaving battle open");
                return Ok(run);
            }
        }
    }
}
