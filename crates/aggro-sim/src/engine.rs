//! Simulation engine: the awareness loop for one region.
//!
//! `SimulationEngine` owns the hecs ECS world, processes queued commands,
//! runs all systems, and produces `AwarenessSnapshot`s. Everything that
//! mutates a monster's awareness runs on the engine's thread, so no locking
//! is involved. Same seed and same inputs give the same snapshots.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use aggro_core::commands::SimCommand;
use aggro_core::components::{Creature, Stealth, ThreatSource};
use aggro_core::config::AwarenessConfig;
use aggro_core::constants::NON_AGGRO_NAME_PREFIX;
use aggro_core::enums::{CreatureKind, EngagementState};
use aggro_core::events::AwarenessEvent;
use aggro_core::state::AwarenessSnapshot;
use aggro_core::types::{EntityId, SimTime};
use aggro_threat::selection::Appraisal;

use crate::awareness::{entity_of, id_of, Awareness, DamageHistory, Ledger};
use crate::error::{Result, SimError};
use crate::oracle::{CombatOracle, DefaultOracle};
use crate::systems::{self, SystemCtx};
use crate::world_setup::{self, MonsterSpec, PlayerSpec};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub awareness: AwarenessConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            awareness: AwarenessConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    config: AwarenessConfig,
    oracle: Box<dyn CombatOracle>,
    command_queue: VecDeque<SimCommand>,
    events: Vec<AwarenessEvent>,
    next_decay_at: f64,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self::with_oracle(config, DefaultOracle)
    }

    /// Create an engine that resolves skill checks and damage history
    /// through `oracle`.
    pub fn with_oracle(config: SimConfig, oracle: impl CombatOracle + 'static) -> Self {
        let awareness = config.awareness.sanitized();
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_decay_at: awareness.threat_decay_interval_secs,
            config: awareness,
            oracle: Box::new(oracle),
            command_queue: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn spawn_monster(&mut self, spec: &MonsterSpec) -> Entity {
        world_setup::spawn_monster(&mut self.world, &self.config, spec)
    }

    pub fn spawn_player(&mut self, spec: &PlayerSpec) -> Entity {
        world_setup::spawn_player(&mut self.world, spec)
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for the surrounding game (moving players,
    /// flagging deaths).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &AwarenessConfig {
        &self.config
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> AwarenessSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, events)
    }

    // --- Threat ledger ---

    /// Add `base` threat from `attacker` to `monster`'s ledger, applying the
    /// attacker's stance and gear. Returns the amount applied. Placeholder
    /// monsters keep no ledger entries.
    pub fn increase_threat(&mut self, monster: Entity, attacker: Entity, base: u32) -> Result<u32> {
        self.require_monster(monster)?;
        self.require_entity(attacker)?;
        if self.is_placeholder(monster) {
            return Ok(0);
        }

        let source = self.world.get::<&ThreatSource>(attacker).ok().map(|s| (*s).clone());
        let mut ledger = self
            .world
            .get::<&mut Ledger>(monster)
            .map_err(|_| SimError::NotAMonster(id_of(monster)))?;
        let applied = ledger.increase_threat(attacker, base, source.as_ref());
        debug!(monster = ?monster, attacker = ?attacker, base, applied, "threat increased");
        Ok(applied)
    }

    /// Damage resolution hook: record the hit, add threat, and wake the
    /// monster against the attacker if it was dormant. A monster attacker
    /// earns a grudge so faction rules no longer shield it.
    pub fn on_attacked(
        &mut self,
        monster: Entity,
        attacker: Entity,
        damage: u32,
        threat: u32,
    ) -> Result<u32> {
        self.require_monster(monster)?;
        let attacker_kind = self
            .world
            .get::<&Creature>(attacker)
            .map(|c| c.kind)
            .map_err(|_| SimError::UnknownEntity(id_of(attacker)))?;

        if let Ok(mut history) = self.world.get::<&mut DamageHistory>(monster) {
            history.record(attacker, damage);
        }
        let applied = self.increase_threat(monster, attacker, threat)?;

        let dormant = {
            let mut awareness = self
                .world
                .get::<&mut Awareness>(monster)
                .map_err(|_| SimError::NotAMonster(id_of(monster)))?;
            if attacker_kind == CreatureKind::Monster {
                awareness.add_retaliate_target(attacker);
            }
            awareness.state == EngagementState::Idle
        };

        if dormant {
            let (world, mut ctx) = self.split();
            systems::engagement::wake_up(world, monster, attacker, false, &mut ctx);
        }
        Ok(applied)
    }

    pub fn mark_skip_next(&mut self, monster: Entity, attacker: Entity) -> Result<()> {
        self.ledger_mut(monster)?.mark_skip_next(attacker);
        Ok(())
    }

    pub fn mark_double_next(&mut self, monster: Entity, attacker: Entity) -> Result<()> {
        self.ledger_mut(monster)?.mark_double_next(attacker);
        Ok(())
    }

    /// Steal-aggro chances and safety margins of `monster`'s ledger.
    pub fn appraise(&self, monster: Entity) -> Result<Vec<Appraisal<Entity>>> {
        let ledger = self
            .world
            .get::<&Ledger>(monster)
            .map_err(|_| SimError::NotAMonster(id_of(monster)))?;
        Ok(ledger.appraise())
    }

    pub fn threat_of(&self, monster: Entity, attacker: Entity) -> Option<u32> {
        self.world.get::<&Ledger>(monster).ok()?.get(&attacker)
    }

    // --- Targeting and engagement ---

    /// Run one selection cycle for `monster` without changing its state.
    pub fn select_target(&mut self, monster: Entity) -> Result<Option<Entity>> {
        self.require_monster(monster)?;
        let (world, mut ctx) = self.split();
        let legacy = systems::targeting::legacy_mode_for(world, monster, &ctx);
        Ok(systems::targeting::select_target(world, monster, legacy, &mut ctx))
    }

    /// Wake dormant allies of `monster` against its current target.
    pub fn alert_friendly(&mut self, monster: Entity) -> Result<u32> {
        self.require_monster(monster)?;
        let (world, mut ctx) = self.split();
        Ok(systems::alert::alert_friendly(world, monster, &mut ctx))
    }

    pub fn state_of(&self, monster: Entity) -> Option<EngagementState> {
        self.world.get::<&Awareness>(monster).ok().map(|a| a.state)
    }

    pub fn target_of(&self, monster: Entity) -> Option<Entity> {
        self.world.get::<&Awareness>(monster).ok()?.current_target
    }

    // --- Evasion ---

    /// `player` vanished against `monster`: hidden from it while the vanish
    /// effect lasts, and dropped as its target right away.
    pub fn record_vanish(&mut self, monster: Entity, player: Entity) -> Result<()> {
        self.require_entity(player)?;
        let now = self.time.elapsed_secs;
        {
            let mut awareness = self
                .world
                .get::<&mut Awareness>(monster)
                .map_err(|_| SimError::NotAMonster(id_of(monster)))?;
            awareness.fooled_by.insert(player);
            if awareness.current_target != Some(player) {
                return Ok(());
            }
            awareness.current_target = None;
            awareness.next_target_check = now;
        }
        if let Ok(mut ledger) = self.world.get::<&mut Ledger>(monster) {
            ledger.remove(&player);
        }
        debug!(monster = ?monster, player = ?player, "vanish recorded");
        Ok(())
    }

    pub fn set_vanish_active(&mut self, player: Entity, active: bool) -> Result<()> {
        self.stealth_mut(player)?.vanish_active = active;
        Ok(())
    }

    pub fn set_deceiving(&mut self, player: Entity, attempting: bool) -> Result<()> {
        self.stealth_mut(player)?.attempting_deception = attempting;
        Ok(())
    }

    // --- Internals ---

    /// Borrow the world alongside a system context over the other fields.
    fn split(&mut self) -> (&World, SystemCtx<'_>) {
        let ctx = SystemCtx {
            config: &self.config,
            rng: &mut self.rng,
            oracle: self.oracle.as_ref(),
            events: &mut self.events,
            now: self.time.elapsed_secs,
        };
        (&self.world, ctx)
    }

    fn require_entity(&self, entity: Entity) -> Result<()> {
        if self.world.contains(entity) {
            Ok(())
        } else {
            Err(SimError::UnknownEntity(id_of(entity)))
        }
    }

    fn require_monster(&self, monster: Entity) -> Result<()> {
        self.require_entity(monster)?;
        if self.world.get::<&Awareness>(monster).is_ok() {
            Ok(())
        } else {
            Err(SimError::NotAMonster(id_of(monster)))
        }
    }

    fn is_placeholder(&self, monster: Entity) -> bool {
        self.world
            .get::<&Creature>(monster)
            .map(|c| c.name.starts_with(NON_AGGRO_NAME_PREFIX))
            .unwrap_or(false)
    }

    fn ledger_mut(&self, monster: Entity) -> Result<hecs::RefMut<'_, Ledger>> {
        self.require_entity(monster)?;
        self.world
            .get::<&mut Ledger>(monster)
            .map_err(|_| SimError::NotAMonster(id_of(monster)))
    }

    fn stealth_mut(&self, player: Entity) -> Result<hecs::RefMut<'_, Stealth>> {
        self.require_entity(player)?;
        self.world
            .get::<&mut Stealth>(player)
            .map_err(|_| SimError::NotAPlayer(id_of(player)))
    }

    fn resolve(&self, id: EntityId) -> Result<Entity> {
        entity_of(id)
            .filter(|e| self.world.contains(*e))
            .ok_or(SimError::UnknownEntity(id))
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                warn!(%err, "command rejected");
            }
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) -> Result<()> {
        match command {
            SimCommand::Attack {
                monster,
                attacker,
                damage,
                threat,
            } => {
                let (monster, attacker) = (self.resolve(monster)?, self.resolve(attacker)?);
                self.on_attacked(monster, attacker, damage, threat)?;
            }
            SimCommand::SkipNextThreat { monster, attacker } => {
                let (monster, attacker) = (self.resolve(monster)?, self.resolve(attacker)?);
                self.mark_skip_next(monster, attacker)?;
            }
            SimCommand::DoubleNextThreat { monster, attacker } => {
                let (monster, attacker) = (self.resolve(monster)?, self.resolve(attacker)?);
                self.mark_double_next(monster, attacker)?;
            }
            SimCommand::Vanish { monster, player } => {
                let (monster, player) = (self.resolve(monster)?, self.resolve(player)?);
                self.record_vanish(monster, player)?;
            }
            SimCommand::SetVanishActive { player, active } => {
                let player = self.resolve(player)?;
                self.set_vanish_active(player, active)?;
            }
            SimCommand::SetDeceiving { player, attempting } => {
                let player = self.resolve(player)?;
                self.set_deceiving(player, attempting)?;
            }
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;

        // 1. Drop references to dead or despawned creatures
        systems::cleanup::run(&self.world, now, self.config.alert_cooldown_secs);
        // 2. Selection cadence and state transitions
        {
            let (world, mut ctx) = self.split();
            systems::engagement::run(world, &mut ctx);
        }
        // 3. Threat decay
        if now >= self.next_decay_at {
            systems::threat_decay::run(&self.world);
            self.next_decay_at = now + self.config.threat_decay_interval_secs;
        }
        // 4. Steering + movement integration
        systems::movement::steer(&mut self.world, self.config.return_speed);
        systems::movement::run(&mut self.world);
        // 5. Returning monsters that made it home
        let (world, mut ctx) = self.split();
        systems::engagement::check_arrivals(world, &mut ctx);
    }
}
