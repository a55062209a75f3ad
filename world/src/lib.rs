#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic reference engine for Polarity Arena.
//!
//! The world owns the arena, the player, enemies and shot traces. It is
//! mutated only through [`apply`] and observed through the [`query`] module.
//! [`World`] also implements [`Engine`] so the serialized bridge protocol can
//! be exercised end to end without an external simulation.

mod geometry;

use glam::DVec2;
use polarity_arena_core::{
    wire::{
        ControlFrame, EntityRecord, PointRecord, ShotRecord, SnapshotDocument, SNAPSHOT_VERSION,
    },
    Engine, Polarity,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use geometry::{circles_overlap, ray_circle};

/// Arena width in world units.
pub const ARENA_WIDTH: f64 = 50.0;
/// Arena height in world units.
pub const ARENA_HEIGHT: f64 = 40.0;
/// Simulated seconds covered by one step.
pub const STEP_SECONDS: f64 = 1.0 / 50.0;

const PLAYER_RADIUS: f64 = 0.25;
const PLAYER_SPEED: f64 = 6.0;
const ENEMY_RADIUS: f64 = 0.5;
const ENEMY_SPEED: f64 = 4.0;
const INITIAL_ENEMIES: usize = 10;
const SCORE_PER_EXTRA_ENEMY: u32 = 5;
const RELOAD_STEPS: u32 = 5;
const TRACE_STEPS: u32 = 5;
const SPAWN_ATTEMPTS: usize = 8;

/// Unique identifier assigned to every spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Commands accepted by [`apply`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current control vector.
    Control(ControlFrame),
    /// Advances the simulation by one fixed step.
    Step,
}

/// Events emitted while applying commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// A new enemy entered the arena.
    EnemySpawned {
        /// Identifier of the new enemy.
        enemy: EnemyId,
        /// Position on the arena edge.
        position: DVec2,
        /// Polarity of the new enemy.
        polarity: Polarity,
    },
    /// The gun fired one shot.
    ShotFired {
        /// Trace start.
        from: DVec2,
        /// Trace end; the impact point on a hit.
        to: DVec2,
        /// Enemy struck by the shot, if any.
        hit: Option<EnemyId>,
    },
    /// A struck enemy matched the weapon polarity and was destroyed.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
    },
    /// An enemy reached the player and the round ended.
    PlayerKilled {
        /// Player position at the moment of death.
        position: DVec2,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Controls {
    movement: DVec2,
    aim: Option<DVec2>,
    firing: bool,
    polarity: Polarity,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: DVec2,
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    position: DVec2,
    polarity: Polarity,
}

#[derive(Clone, Copy, Debug)]
struct Trace {
    from: DVec2,
    to: DVec2,
    remaining: u32,
}

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    rng: ChaCha8Rng,
    controls: Controls,
    player: Option<Player>,
    enemies: Vec<Enemy>,
    traces: Vec<Trace>,
    heat: Option<DVec2>,
    reload: u32,
    score: u32,
    next_enemy: u32,
    step_index: u64,
}

impl World {
    /// Creates a world with the player centred and the initial enemy wave
    /// placed on the arena edges using `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            controls: Controls::default(),
            player: Some(Player {
                position: DVec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            }),
            enemies: Vec::with_capacity(INITIAL_ENEMIES),
            traces: Vec::new(),
            heat: None,
            reload: 0,
            score: 0,
            next_enemy: 0,
            step_index: 0,
        };

        let mut events = Vec::new();
        for _ in 0..INITIAL_ENEMIES {
            world.spawn_enemy(&mut events);
        }
        world
    }

    fn target_population(&self) -> usize {
        (self.score / SCORE_PER_EXTRA_ENEMY) as usize + INITIAL_ENEMIES
    }

    fn spawn_enemy(&mut self, out_events: &mut Vec<Event>) {
        for _ in 0..SPAWN_ATTEMPTS {
            let position = self.edge_position();
            let blocked = self
                .enemies
                .iter()
                .any(|enemy| circles_overlap(enemy.position, ENEMY_RADIUS, position, ENEMY_RADIUS));
            if blocked {
                continue;
            }

            let polarity = if self.rng.gen_bool(0.5) {
                Polarity::Positive
            } else {
                Polarity::Negative
            };
            let id = EnemyId::new(self.next_enemy);
            self.next_enemy = self.next_enemy.wrapping_add(1);
            self.enemies.push(Enemy {
                id,
                position,
                polarity,
            });
            out_events.push(Event::EnemySpawned {
                enemy: id,
                position,
                polarity,
            });
            return;
        }
    }

    fn edge_position(&mut self) -> DVec2 {
        let x = self.rng.gen_range(ENEMY_RADIUS..=ARENA_WIDTH - ENEMY_RADIUS);
        let y = self.rng.gen_range(ENEMY_RADIUS..=ARENA_HEIGHT - ENEMY_RADIUS);
        match self.rng.gen_range(0..4) {
            0 => DVec2::new(x, ENEMY_RADIUS),
            1 => DVec2::new(x, ARENA_HEIGHT - ENEMY_RADIUS),
            2 => DVec2::new(ENEMY_RADIUS, y),
            _ => DVec2::new(ARENA_WIDTH - ENEMY_RADIUS, y),
        }
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        let Some(player) = self.player else {
            return;
        };
        self.step_index = self.step_index.saturating_add(1);

        let position = self.move_player(player.position);
        self.player = Some(Player { position });

        self.traces.retain_mut(|trace| {
            trace.remaining = trace.remaining.saturating_sub(1);
            trace.remaining > 0
        });

        self.operate_gun(position, out_events);

        if self.enemies.len() < self.target_population() {
            self.spawn_enemy(out_events);
        }

        self.move_enemies(position);

        let caught = self
            .enemies
            .iter()
            .any(|enemy| circles_overlap(enemy.position, ENEMY_RADIUS, position, PLAYER_RADIUS));
        if caught {
            self.player = None;
            out_events.push(Event::PlayerKilled { position });
        }
    }

    fn move_player(&self, position: DVec2) -> DVec2 {
        let mut movement = self.controls.movement;
        if movement.length_squared() > 1.0 {
            movement = movement.normalize_or_zero();
        }

        (position + movement * PLAYER_SPEED * STEP_SECONDS).clamp(
            DVec2::splat(PLAYER_RADIUS),
            DVec2::new(ARENA_WIDTH - PLAYER_RADIUS, ARENA_HEIGHT - PLAYER_RADIUS),
        )
    }

    fn operate_gun(&mut self, origin: DVec2, out_events: &mut Vec<Event>) {
        let aim = match self.controls.aim {
            Some(aim) if self.controls.firing && self.reload == 0 => aim,
            _ => {
                self.reload = self.reload.saturating_sub(1);
                return;
            }
        };

        let direction = (aim - origin).normalize_or_zero();
        if direction == DVec2::ZERO {
            return;
        }
        self.reload = RELOAD_STEPS;

        let hit = self
            .enemies
            .iter()
            .enumerate()
            .filter_map(|(index, enemy)| {
                ray_circle(origin, direction, enemy.position, ENEMY_RADIUS)
                    .map(|distance| (index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let (to, struck) = match hit {
            Some((index, distance)) => (origin + direction * distance, Some(index)),
            None => (aim, None),
        };

        self.traces.push(Trace {
            from: origin,
            to,
            remaining: TRACE_STEPS,
        });
        out_events.push(Event::ShotFired {
            from: origin,
            to,
            hit: struck.map(|index| self.enemies[index].id),
        });

        let Some(index) = struck else {
            return;
        };
        self.heat = Some(to);
        if self.enemies[index].polarity == self.controls.polarity {
            let enemy = self.enemies.remove(index);
            self.score = self.score.saturating_add(1);
            out_events.push(Event::EnemyDestroyed { enemy: enemy.id });
        }
    }

    fn move_enemies(&mut self, target: DVec2) {
        for index in 0..self.enemies.len() {
            let current = self.enemies[index].position;
            let heading = (target - current).normalize_or_zero();
            let next = current + heading * ENEMY_SPEED * STEP_SECONDS;

            let blocked = self.enemies.iter().enumerate().any(|(other, enemy)| {
                other != index && circles_overlap(enemy.position, ENEMY_RADIUS, next, ENEMY_RADIUS)
            });
            if !blocked {
                self.enemies[index].position = next;
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Control(frame) => {
            let polarity = Polarity::from_sign(i64::from(frame.polarity)).unwrap_or_else(|| {
                warn!(sign = frame.polarity, "ignoring invalid weapon polarity");
                world.controls.polarity
            });
            world.controls = Controls {
                movement: DVec2::from_array(frame.movement),
                aim: frame.aim.map(DVec2::from_array),
                firing: frame.firing,
                polarity,
            };
        }
        Command::Step => world.step(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::DVec2;

    use super::{
        EntityRecord, PointRecord, ShotRecord, SnapshotDocument, World, ENEMY_RADIUS,
        PLAYER_RADIUS, SNAPSHOT_VERSION,
    };

    /// Current player position, or `None` once the round is over.
    #[must_use]
    pub fn player_position(world: &World) -> Option<DVec2> {
        world.player.map(|player| player.position)
    }

    /// Number of enemies destroyed so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of enemies currently in the arena.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of steps simulated while the player was alive.
    #[must_use]
    pub fn step_index(world: &World) -> u64 {
        world.step_index
    }

    /// Builds the serialized snapshot document for the current state.
    #[must_use]
    pub fn snapshot_document(world: &World) -> SnapshotDocument {
        let polarity = i64::from(world.controls.polarity.sign());
        SnapshotDocument {
            version: Some(SNAPSHOT_VERSION),
            player: world.player.map(|player| EntityRecord {
                x: player.position.x,
                y: player.position.y,
                radius: Some(PLAYER_RADIUS),
                polarity: Some(polarity),
                is_white: None,
            }),
            enemies: world
                .enemies
                .iter()
                .map(|enemy| EntityRecord {
                    x: enemy.position.x,
                    y: enemy.position.y,
                    radius: Some(ENEMY_RADIUS),
                    polarity: Some(i64::from(enemy.polarity.sign())),
                    is_white: None,
                })
                .collect(),
            shots: world
                .traces
                .iter()
                .map(|trace| ShotRecord {
                    from_x: trace.from.x,
                    from_y: trace.from.y,
                    to_x: trace.to.x,
                    to_y: trace.to.y,
                })
                .collect(),
            score: Some(world.score),
            heat: world.heat.map(|heat| PointRecord {
                x: heat.x,
                y: heat.y,
            }),
        }
    }
}

impl Engine for World {
    fn receive_control(&mut self, payload: &str) {
        match serde_json::from_str::<ControlFrame>(payload) {
            Ok(frame) => {
                let mut events = Vec::new();
                apply(self, Command::Control(frame), &mut events);
            }
            Err(error) => warn!(%error, "discarding undecodable control frame"),
        }
    }

    fn state(&self) -> String {
        serde_json::to_string(&query::snapshot_document(self)).unwrap_or_else(|error| {
            warn!(%error, "failed to serialize snapshot");
            String::new()
        })
    }

    fn step(&mut self) {
        let mut events = Vec::new();
        apply(self, Command::Step, &mut events);
        for event in events {
            match event {
                Event::PlayerKilled { position } => {
                    info!(score = self.score, x = position.x, y = position.y, "round over");
                }
                Event::EnemyDestroyed { enemy } => {
                    debug!(enemy = enemy.get(), score = self.score, "enemy destroyed");
                }
                Event::EnemySpawned { .. } | Event::ShotFired { .. } => {}
            }
        }
    }
}
