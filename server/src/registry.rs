//! Authoritative battles and the observers watching them
//!
//! Every battle lives in its own slot behind a mutex. A command holds the
//! slot lock for the whole move cascade and queues the resulting snapshot
//! on each observer's channel before releasing it, so observers see
//! snapshots in mutation order and no socket write ever happens under
//! the lock.
//!
//! Lock order is always map first, then slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use pokeduel_battle::{
    Autopilot, Battle, BattleMode, BattleSnapshot, Combatant, DamageFormula, MoveSelector,
    RandomPolicy, Side, engine, roster,
};
use pokeduel_protocol::{BattleId, ErrorCode, ServerEvent};

use crate::error::CommandError;
use crate::observer::{ObserverHandle, ObserverId};

/// Side driven by the computer in `vs_computer` battles
const COMPUTER_SIDE: Side = Side::Opponent;

struct Observer {
    handle: ObserverHandle,
    /// Side claimed on join; only consulted in `vs_remote` battles
    seat: Option<Side>,
}

struct SlotState {
    battle: Battle,
    autopilot: Option<Box<dyn MoveSelector>>,
    observers: HashMap<ObserverId, Observer>,
    last_command: Instant,
    /// Set once the slot has been dropped from the map
    evicted: bool,
}

impl SlotState {
    /// Side a command from `observer` acts for
    fn seat_of(&self, observer: ObserverId) -> Side {
        match self.battle.mode() {
            BattleMode::VsComputer => Side::Player,
            BattleMode::VsRemote => self
                .observers
                .get(&observer)
                .and_then(|o| o.seat)
                .unwrap_or(Side::Player),
        }
    }

    /// Queue `event` for every observer, dropping the ones whose
    /// connection is gone
    fn broadcast(&mut self, event: &ServerEvent) {
        let battle_id = self.battle.id();
        self.observers.retain(|id, observer| match observer.handle.send(event.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(%battle_id, observer = %id, error = %e, "dropping observer");
                false
            }
        });
    }

    /// Whether the sweeper should drop this battle
    fn is_expired(&self, timeout: Duration) -> bool {
        if self.battle.is_active() {
            self.last_command.elapsed() >= timeout
        } else {
            self.observers.is_empty()
        }
    }

    fn broadcast_snapshot(&mut self) {
        let event = ServerEvent::Snapshot(self.battle.snapshot());
        self.broadcast(&event);
    }
}

struct BattleSlot {
    state: Mutex<SlotState>,
}

impl BattleSlot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panic mid-command leaves the battle as the last completed
        // mutation left it, so the state is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// All battles known to one server instance
#[derive(Default)]
pub struct BattleRegistry {
    battles: RwLock<HashMap<BattleId, Arc<BattleSlot>>>,
    /// Formula given to battles this registry creates
    formula: DamageFormula,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formula(mut self, formula: DamageFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Register an already built battle, keeping its own formula.
    ///
    /// `autopilot` drives the opponent of a `vs_computer` battle (a random
    /// policy is used when none is given); it is ignored for `vs_remote`.
    pub fn insert(&self, battle: Battle, autopilot: Option<Box<dyn MoveSelector>>) -> BattleId {
        let id = battle.id();
        let mode = battle.mode();
        let autopilot = match mode {
            BattleMode::VsComputer => {
                Some(autopilot.unwrap_or_else(|| Box::new(RandomPolicy::new())))
            }
            BattleMode::VsRemote => None,
        };

        let slot = Arc::new(BattleSlot {
            state: Mutex::new(SlotState {
                battle,
                autopilot,
                observers: HashMap::new(),
                last_command: Instant::now(),
                evicted: false,
            }),
        });
        self.write_map().insert(id, slot);

        tracing::info!(battle_id = %id, mode = ?mode, "battle created");
        id
    }

    /// Start a fresh battle between two combatants
    pub fn create(
        &self,
        player: Combatant,
        opponent: Combatant,
        mode: BattleMode,
    ) -> Result<BattleId, CommandError> {
        let battle = Battle::new(player, opponent)?
            .with_mode(mode)
            .with_formula(self.formula);
        Ok(self.insert(battle, None))
    }

    /// Start a battle from prefab roster entries. A random opponent is
    /// picked when none is named.
    pub fn create_from_roster(
        &self,
        pokemon: &str,
        opponent: Option<&str>,
        mode: BattleMode,
    ) -> Result<BattleId, CommandError> {
        let player = lookup(pokemon)?.build()?;
        let opponent = match opponent {
            Some(name) => lookup(name)?,
            None => roster::random_opponent(pokemon),
        }
        .build()?;

        self.create(player, opponent, mode)
    }

    /// Current snapshot of a battle
    pub fn snapshot(&self, id: BattleId) -> Option<BattleSnapshot> {
        let slot = self.slot(id).ok()?;
        let state = slot.lock();
        Some(state.battle.snapshot())
    }

    /// Register `handle` as an observer and push it the current snapshot.
    ///
    /// Joining again replaces the previous registration (and seat).
    pub fn join(
        &self,
        id: BattleId,
        handle: &ObserverHandle,
        seat: Option<Side>,
    ) -> Result<(), CommandError> {
        let slot = self.slot(id)?;
        let mut state = slot.lock();
        if state.evicted {
            return Err(CommandError::UnknownBattle(id));
        }

        state.observers.insert(
            handle.id(),
            Observer {
                handle: handle.clone(),
                seat,
            },
        );
        if handle
            .send(ServerEvent::Snapshot(state.battle.snapshot()))
            .is_err()
        {
            state.observers.remove(&handle.id());
        }

        tracing::info!(
            battle_id = %id,
            observer = %handle.id(),
            seat = ?seat,
            observers = state.observers.len(),
            "observer joined"
        );
        Ok(())
    }

    /// Deregister an observer. The battle itself is kept unless it is
    /// finished and nobody is left watching.
    ///
    /// Returns whether the observer was registered.
    pub fn leave(&self, id: BattleId, observer: ObserverId) -> bool {
        let Ok(slot) = self.slot(id) else {
            return false;
        };

        let (removed, drop_battle) = {
            let mut state = slot.lock();
            let removed = state.observers.remove(&observer).is_some();
            (
                removed,
                !state.battle.is_active() && state.observers.is_empty(),
            )
        };

        if removed {
            tracing::info!(battle_id = %id, %observer, "observer left");
        }
        if drop_battle {
            let mut battles = self.write_map();
            // re-check: someone may have joined between the two locks
            if let Some(slot) = battles.get(&id) {
                let mut state = slot.lock();
                if state.observers.is_empty() {
                    state.evicted = true;
                    drop(state);
                    battles.remove(&id);
                    tracing::info!(battle_id = %id, "finished battle dropped");
                }
            }
        }
        removed
    }

    /// Apply a move for the side `observer` acts for, plus any computer
    /// replies, then broadcast the new snapshot.
    ///
    /// A rejected move changes nothing and is only returned to the caller.
    pub fn attack(
        &self,
        id: BattleId,
        observer: ObserverId,
        move_name: &str,
    ) -> Result<(), CommandError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        if guard.evicted {
            return Err(CommandError::UnknownBattle(id));
        }
        guard.last_command = Instant::now();

        let side = guard.seat_of(observer);
        let logged_before = guard.battle.log().len();

        let state = &mut *guard;
        let autopilot = state
            .autopilot
            .as_mut()
            .map(|selector| Autopilot::new(COMPUTER_SIDE, selector.as_mut()));
        let result = engine::submit_move(&mut state.battle, side, move_name, autopilot);

        // an autopilot failure can follow moves that already stood
        if result.is_ok() || state.battle.log().len() != logged_before {
            state.broadcast_snapshot();
        }

        result.map(|_| ()).map_err(|e| {
            tracing::warn!(
                battle_id = %id,
                %observer,
                side = %side,
                move_name,
                error = %e,
                "move rejected"
            );
            CommandError::from(e)
        })
    }

    /// The side `observer` acts for gives up; the snapshot is broadcast
    pub fn surrender(&self, id: BattleId, observer: ObserverId) -> Result<(), CommandError> {
        let slot = self.slot(id)?;
        let mut state = slot.lock();
        if state.evicted {
            return Err(CommandError::UnknownBattle(id));
        }
        state.last_command = Instant::now();

        let side = state.seat_of(observer);
        state.battle.apply_surrender(side).map_err(|e| {
            tracing::warn!(
                battle_id = %id,
                %observer,
                side = %side,
                error = %e,
                "surrender rejected"
            );
            CommandError::from(e)
        })?;

        state.broadcast_snapshot();
        Ok(())
    }

    /// Drop finished battles nobody watches, and active battles idle for
    /// at least `timeout`. Observers of an expired battle are told so.
    ///
    /// Returns the number of battles removed.
    pub fn evict_idle(&self, timeout: Duration) -> usize {
        let candidates: Vec<BattleId> = self
            .read_map()
            .iter()
            .filter(|(_, slot)| slot.lock().is_expired(timeout))
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = 0;
        for id in candidates {
            let slot = {
                let mut battles = self.write_map();
                let Some(slot) = battles.get(&id) else {
                    continue;
                };
                let mut state = slot.lock();
                // a command may have arrived since the scan
                if !state.is_expired(timeout) {
                    continue;
                }
                state.evicted = true;
                drop(state);
                battles.remove(&id)
            };
            let Some(slot) = slot else {
                continue;
            };

            let mut state = slot.lock();
            if state.battle.is_active() {
                state.broadcast(&ServerEvent::error(
                    ErrorCode::InvalidState,
                    "battle expired",
                ));
                tracing::info!(battle_id = %id, "idle battle expired");
            } else {
                tracing::info!(battle_id = %id, "finished battle dropped");
            }
            state.observers.clear();
            evicted += 1;
        }

        evicted
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    pub fn contains(&self, id: BattleId) -> bool {
        self.read_map().contains_key(&id)
    }

    /// Number of observers registered on a battle
    pub fn observer_count(&self, id: BattleId) -> Option<usize> {
        let slot = self.slot(id).ok()?;
        let state = slot.lock();
        Some(state.observers.len())
    }

    fn slot(&self, id: BattleId) -> Result<Arc<BattleSlot>, CommandError> {
        self.read_map()
            .get(&id)
            .cloned()
            .ok_or(CommandError::UnknownBattle(id))
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, HashMap<BattleId, Arc<BattleSlot>>> {
        self.battles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<BattleId, Arc<BattleSlot>>> {
        self.battles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lookup(name: &str) -> Result<&'static roster::PrefabCombatant, CommandError> {
    roster::find(name).ok_or_else(|| CommandError::UnknownCombatant {
        name: name.to_string(),
        available: roster::names().collect::<Vec<_>>().join(", "),
    })
}
