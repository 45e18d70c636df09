//! Frame update and stage machine
//!
//! `Game` owns the authoritative `GameState` plus the round bookkeeping that
//! does not need to survive a snapshot (stage, scores, bots). One call to
//! `Game::update` advances exactly one frame.

use glam::Vec2;

use super::body::{Body, Color, WHITE};
use super::bot::{Bot, BotView};
use super::collision::{Arena, collide, intersects, pair_mut};
use super::player::PlayerBody;
use super::rng::SimRng;
use super::state::{ControlId, GameStage, GameState, GameStateFront, Map};
use crate::consts::*;
use crate::error::SimError;
use crate::leaderboard::{self, PlayerScore, Verdict};
use crate::settings::{GameSettings, PlayerSlot};
use crate::{polar_to_cartesian, rotate, with_length};

/// Remove every item matching `pred`, preserving the order of both halves
fn take_where<T>(items: &mut Vec<T>, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
    let (taken, kept): (Vec<T>, Vec<T>) =
        std::mem::take(items).into_iter().partition(|x| pred(x));
    *items = kept;
    taken
}

/// A running game: state, stage machine, scores and controllers
pub struct Game {
    state: GameState,
    arena: Arena,
    map: Map,
    roster: Vec<PlayerSlot>,
    /// Control bound to each slot
    controls: Vec<ControlId>,
    /// Bot driving each slot, if any
    bots: Vec<Option<Box<dyn Bot>>>,
    /// Slots whose action was pressed this frame
    pending_actions: Vec<usize>,

    stage: GameStage,
    /// Stage entered once the results screen times out
    next_stage: GameStage,
    /// Degrees added to every player's opening angle
    starting_angle: f32,
    /// Stage time at which the next burst appears
    time_to_spawn_burst: f32,

    scores: Vec<u32>,
    player_scores: Option<Vec<PlayerScore>>,
    how_to_win_text: String,
    someone_won: Option<Color>,
}

impl Game {
    /// Seat the roster and start the first round
    pub fn new(settings: &GameSettings) -> Result<Self, SimError> {
        settings.validate()?;

        let roster = settings.players.clone();
        let controls = roster
            .iter()
            .enumerate()
            .map(|(slot, p)| p.control(slot))
            .collect();
        let bots = roster
            .iter()
            .enumerate()
            .map(|(slot, p)| p.bot.as_ref().map(|spec| spec.build(slot)))
            .collect();

        let arena = Arena::default();
        let mut game = Self {
            state: GameState::empty(SimRng::new(settings.seed.unwrap_or(0))),
            arena,
            map: settings.map.clone(),
            scores: vec![0; roster.len()],
            roster,
            controls,
            bots,
            pending_actions: Vec::new(),
            stage: GameStage::RotatingAroundCenter,
            next_stage: GameStage::RestartRound,
            starting_angle: 0.0,
            time_to_spawn_burst: 0.0,
            player_scores: None,
            how_to_win_text: String::new(),
            someone_won: None,
        };
        game.restart_game(settings.seed);
        Ok(game)
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Snapshot plus leaderboard and stage data
    pub fn front_state(&self) -> GameStateFront {
        GameStateFront {
            state: self.state.clone(),
            player_scores: self.player_scores.clone(),
            how_to_win_text: self.how_to_win_text.clone(),
            stage: self.stage,
            someone_won: self.someone_won,
        }
    }

    #[inline]
    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    #[inline]
    pub fn num_players(&self) -> usize {
        self.roster.len()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn someone_won(&self) -> Option<Color> {
        self.someone_won
    }

    /// Resize the walls. Rotators and live bodies keep their positions.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        log::debug!("arena resized to {width}x{height}");
        self.arena = Arena::new(width, height);
    }

    /// Replace the entity collections with a snapshot and move the random
    /// stream to the snapshot's `(seed, draws)` key.
    pub fn set_state(&mut self, state: GameState) -> Result<(), SimError> {
        if state.players.len() != self.roster.len() {
            return Err(SimError::Roster(format!(
                "snapshot has {} players, game seats {}",
                state.players.len(),
                self.roster.len()
            )));
        }
        let (seed, draws) = (state.seed(), state.draw_count());
        let mut rng = std::mem::replace(&mut self.state.rng, SimRng::new(0));
        rng.reseed(Some(seed), draws);

        self.state = GameState { rng, ..state };
        log::info!("state imported (seed {seed}, draw {draws})");
        Ok(())
    }

    // === Input ===

    /// Queue the action of every slot bound to one of `controls`. Unknown
    /// controls are ignored; a slot acts at most once per frame.
    pub fn process_actions(&mut self, controls: &[ControlId]) {
        for control in controls {
            let Some(slot) = self.controls.iter().position(|c| c == control) else {
                log::trace!("ignoring unbound control {control:?}");
                continue;
            };
            if !self.pending_actions.contains(&slot) {
                self.pending_actions.push(slot);
            }
        }
    }

    /// Ask every bot for its move, reading the state as it was before this
    /// frame.
    fn poll_bots(&mut self, time_delta: f32) {
        let mut pressed = Vec::new();
        for (slot, bot) in self.bots.iter_mut().enumerate() {
            let Some(bot) = bot else { continue };
            let view = BotView {
                state: &self.state,
                slot,
            };
            if bot.decide(view, time_delta) {
                pressed.push(ControlId::Bot(slot));
            }
        }
        self.process_actions(&pressed);
    }

    fn perform_actions(&mut self) {
        for slot in std::mem::take(&mut self.pending_actions) {
            if self.stage == GameStage::EndScreen {
                self.state.timer += END_SCREEN_SKIP;
            }

            let rotators = &self.state.rotators;
            let Some(player) = self.state.players.get_mut(slot) else {
                continue;
            };
            if !player.alive {
                continue;
            }

            match player.rotator_inside(rotators) {
                Some(rotator) if !player.is_dodging() => {
                    player.rotating_around = match player.rotating_around {
                        Some(_) => None,
                        None => Some(rotator),
                    };
                    log::trace!("player {slot} orbit toggled: {:?}", player.rotating_around);
                }
                _ => {
                    if player.request_dodge() {
                        log::trace!("player {slot} dodges");
                    }
                }
            }
        }
    }

    // === Frame update ===

    /// Advance one frame
    pub fn update(&mut self, time_delta: f32) -> Result<(), SimError> {
        self.poll_bots(time_delta);

        match self.stage {
            GameStage::RotatingAroundCenter => {
                if self.state.timer < ROTATION_DURATION {
                    self.rotate_around_center();
                    self.state.timer += time_delta;
                } else {
                    log::info!("opening finished, round on");
                    self.stage = GameStage::Gaming;
                    self.state.timer = 0.0;
                }
            }

            GameStage::Gaming => {
                self.perform_actions();
                self.step_physics()?;
                if self.state.timer > self.time_to_spawn_burst {
                    self.state.spawn_burst(&self.arena);
                    self.time_to_spawn_burst +=
                        self.state
                            .rng
                            .draw_uniform(BURST_INTERVAL_MIN, BURST_INTERVAL_MAX) as f32;
                }
                self.renormalize_speeds();
                self.state.timer += time_delta;

                let survivors: Vec<usize> = self.state.alive_players().map(|(i, _)| i).collect();
                if survivors.len() < 2 && self.state.players.len() > 1 {
                    self.finish_round(&survivors)?;
                }
            }

            GameStage::ShowingResults => {
                self.perform_actions();
                self.step_physics()?;
                self.renormalize_speeds();
                self.state.timer += time_delta;
                if self.state.timer > RESULTS_DURATION {
                    log::info!("results done, moving to {:?}", self.next_stage);
                    self.stage = self.next_stage;
                    self.state.timer = 0.0;
                }
            }

            GameStage::RestartRound => self.restart_round(),

            GameStage::EndScreen => {
                self.perform_actions();
                self.step_physics()?;
                self.renormalize_speeds();
                self.state.timer += time_delta;
                if self.state.timer > END_SCREEN_DURATION {
                    self.restart_game(None);
                }
            }
        }

        self.pending_actions.clear();
        Ok(())
    }

    /// Opening spiral: players fan out from the arena center, and pick up
    /// a tangential heading during the second half.
    fn rotate_around_center(&mut self) {
        let t = self.state.timer / ROTATION_DURATION;
        let center = self.arena.center();
        let count = self.state.players.len() as f32;

        for (i, player) in self.state.players.iter_mut().enumerate() {
            let degrees = i as f32 / count * 360.0 + t * OPENING_ROTATION_SPEED + self.starting_angle;
            let offset = polar_to_cartesian(OPENING_RADIUS, degrees.to_radians());
            let position = center.lerp(center + offset, t);

            player.body.center = position;
            player.path.reset(position);
            if t > 0.5 {
                player.body.velocity = with_length(
                    rotate(center - position, -std::f32::consts::FRAC_PI_2),
                    DEFAULT_SPEED,
                );
            }
        }
    }

    fn renormalize_speeds(&mut self) {
        for player in &mut self.state.players {
            player.body.velocity = with_length(player.body.velocity, DEFAULT_SPEED);
        }
    }

    /// One frame of physics and interaction rules, in fixed order
    fn step_physics(&mut self) -> Result<(), SimError> {
        self.move_bodies();
        self.resolve_player_contacts();
        self.resolve_deaths()?;
        self.resolve_pickups();
        self.resolve_burst_activation();
        self.resolve_burst_absorption();
        self.state.bursts.retain(|b| b.alive);
        Ok(())
    }

    /// Wall bounces and integration for everything that moves
    fn move_bodies(&mut self) {
        let arena = self.arena;
        let GameState {
            players,
            active_spheres,
            inactive_spheres,
            bursts,
            rotators,
            ..
        } = &mut self.state;

        for player in players.iter_mut().filter(|p| p.alive) {
            if arena.bounce(&mut player.body) {
                player.rotating_around = None;
            }
            player.advance(rotators);
        }

        // Projectiles that hit a wall while their owner is not dodging are spent
        let mut spent = Vec::new();
        for player in players.iter_mut() {
            let dodging = player.is_dodging();
            let mut flying = Vec::with_capacity(player.attacking_spheres.len());
            for mut sphere in std::mem::take(&mut player.attacking_spheres) {
                let bounced = arena.bounce(&mut sphere);
                sphere.integrate();
                if bounced && !dodging {
                    spent.push(sphere);
                } else {
                    flying.push(sphere);
                }
            }
            player.attacking_spheres = flying;
        }

        for sphere in active_spheres.iter_mut().chain(inactive_spheres.iter_mut()) {
            arena.bounce(sphere);
            sphere.integrate();
        }
        for mut sphere in spent {
            sphere.color = WHITE;
            sphere.damping = SPENT_DAMPING;
            inactive_spheres.push(sphere);
        }

        for burst in bursts.iter_mut() {
            arena.bounce(&mut burst.body);
            burst.advance();
        }
    }

    /// Touching players drop out of orbit and, unless one is dodging, bounce
    fn resolve_player_contacts(&mut self) {
        let players = &mut self.state.players;
        for i in 0..players.len() {
            for j in (i + 1)..players.len() {
                let (a, b) = pair_mut(players, i, j);
                if !a.alive || !b.alive || !intersects(&a.body, &b.body) {
                    continue;
                }
                a.rotating_around = None;
                b.rotating_around = None;
                if !a.is_dodging() && !b.is_dodging() {
                    collide(&mut a.body, &mut b.body);
                }
            }
        }
    }

    /// A non-dodging player touching another player's trail or projectile dies
    fn resolve_deaths(&mut self) -> Result<(), SimError> {
        for victim in 0..self.state.players.len() {
            let players = &self.state.players;
            let target = &players[victim];
            if !target.alive || target.is_dodging() {
                continue;
            }
            let killer = players.iter().enumerate().position(|(other, p)| {
                other != victim
                    && p.trail
                        .iter()
                        .chain(p.attacking_spheres.iter())
                        .any(|s| intersects(&target.body, s))
            });
            if let Some(killer) = killer {
                self.process_player_death(victim, killer)?;
            }
        }
        Ok(())
    }

    /// Eliminate `killed`: record it in the death order and hand its trail
    /// to `killer`'s queue. Killing a dead player does nothing.
    pub fn process_player_death(&mut self, killed: usize, killer: usize) -> Result<(), SimError> {
        let count = self.state.players.len();
        for slot in [killed, killer] {
            if slot >= count {
                return Err(SimError::UnknownPlayer(slot));
            }
        }
        if !self.state.players[killed].alive {
            return Ok(());
        }

        let trail = self.state.players[killed].forfeit_trail();
        log::info!(
            "player {killed} eliminated by player {killer}, {} spheres change hands",
            trail.len()
        );
        let players = &mut self.state.players;
        for member in trail {
            players[killer].add_to_queue(member);
        }
        players[killed].alive = false;
        players[killed].rotating_around = None;
        self.state.death_order.push(killed);
        Ok(())
    }

    /// Non-dodging players collect the free spheres they touch. Every
    /// active sphere taken is replaced at a random spot.
    fn resolve_pickups(&mut self) {
        for slot in 0..self.state.players.len() {
            let player = &self.state.players[slot];
            if !player.alive || player.is_dodging() {
                continue;
            }
            let reach = player.body.clone();

            let taken = take_where(&mut self.state.active_spheres, |s| intersects(&reach, s));
            let respawns = taken.len();
            let mut captured = taken;
            captured.extend(take_where(&mut self.state.inactive_spheres, |s| {
                intersects(&reach, s)
            }));

            let player = &mut self.state.players[slot];
            for sphere in captured {
                player.add_to_queue(sphere);
            }
            for _ in 0..respawns {
                self.state.spawn_random_sphere(&self.arena);
            }
        }
    }

    fn resolve_burst_activation(&mut self) {
        let GameState {
            players, bursts, ..
        } = &mut self.state;
        for (slot, player) in players.iter().enumerate() {
            if !player.alive || player.is_dodging() {
                continue;
            }
            for burst in bursts.iter_mut().filter(|b| b.alive) {
                if intersects(&player.body, &burst.body) && burst.activate(slot) {
                    log::debug!("burst activated by player {slot}");
                }
            }
        }
    }

    /// Active bursts vacuum up free spheres, other players' trail members
    /// and every projectile, feeding them to the owner's queue. Idle bursts
    /// they touch join the same owner.
    fn resolve_burst_absorption(&mut self) {
        for k in 0..self.state.bursts.len() {
            let burst = &self.state.bursts[k];
            if !burst.is_absorbing() {
                continue;
            }
            let Some(owner) = burst
                .active_player
                .filter(|&o| o < self.state.players.len())
            else {
                continue;
            };
            let reach: Body = burst.body.clone();

            let taken = take_where(&mut self.state.active_spheres, |s| intersects(&reach, s));
            let respawns = taken.len();
            let mut captured = taken;
            captured.extend(take_where(&mut self.state.inactive_spheres, |s| {
                intersects(&reach, s)
            }));
            for (slot, player) in self.state.players.iter_mut().enumerate() {
                if slot != owner {
                    captured.extend(player.release_trail_where(|m| intersects(&reach, m)));
                }
                captured.extend(take_where(&mut player.attacking_spheres, |s| {
                    intersects(&reach, s)
                }));
            }

            if !captured.is_empty() {
                log::debug!("burst {k} absorbed {} bodies for player {owner}", captured.len());
            }
            let owner_player = &mut self.state.players[owner];
            for body in captured {
                owner_player.add_to_queue(body);
            }
            for _ in 0..respawns {
                self.state.spawn_random_sphere(&self.arena);
            }

            for (m, other) in self.state.bursts.iter_mut().enumerate() {
                if m != k && other.alive && intersects(&reach, &other.body) {
                    other.activate(owner);
                }
            }
        }
    }

    // === Round flow ===

    /// Score the round: eliminated players in order, then the survivors
    /// sharing the top place.
    fn finish_round(&mut self, survivors: &[usize]) -> Result<(), SimError> {
        let finishing_order: Vec<usize> = self
            .state
            .death_order
            .iter()
            .chain(survivors)
            .copied()
            .collect();

        let old_scores = self.scores.clone();
        leaderboard::score_round(&mut self.scores, &finishing_order, survivors.len())?;

        let colors: Vec<Color> = self.roster.iter().map(|p| p.team.color()).collect();
        self.player_scores = Some(leaderboard::player_scores(&old_scores, &self.scores, &colors));

        let verdict = leaderboard::judge(&self.scores);
        self.how_to_win_text = verdict.how_to_win_text();
        match verdict {
            Verdict::Winner(slot) => {
                log::info!("{} wins with {} points", self.roster[slot].name, self.scores[slot]);
                self.next_stage = GameStage::EndScreen;
                self.someone_won = Some(colors[slot]);
            }
            _ => self.next_stage = GameStage::RestartRound,
        }

        log::info!("round over, scores {:?}", self.scores);
        self.stage = GameStage::ShowingResults;
        self.state.timer = 0.0;
        Ok(())
    }

    /// Reset round-scoped state and start the opening spiral
    pub fn restart_round(&mut self) {
        self.starting_angle = self.state.rng.draw_uniform(0.0, 360.0) as f32;

        self.state.players = self
            .roster
            .iter()
            .zip(&self.bots)
            .map(|(slot, bot)| {
                let player = PlayerBody::new(
                    Vec2::ZERO,
                    Vec2::new(DEFAULT_SPEED, 0.0),
                    slot.team.color(),
                );
                match bot {
                    Some(bot) => player.with_bot(bot.name()),
                    None => player,
                }
            })
            .collect();

        self.state.rotators = self.map.build(&self.arena);
        self.state.active_spheres.clear();
        self.state.inactive_spheres.clear();
        for _ in 0..STARTING_SPHERES {
            self.state.spawn_random_sphere(&self.arena);
        }

        self.time_to_spawn_burst =
            self.state
                .rng
                .draw_uniform(BURST_INTERVAL_MIN, BURST_INTERVAL_MAX) as f32;
        self.state.bursts.clear();
        self.state.death_order.clear();
        self.state.timer = 0.0;
        self.stage = GameStage::RotatingAroundCenter;

        log::info!(
            "round started: {} players, seed {}, draw {}",
            self.num_players(),
            self.state.seed(),
            self.state.draw_count()
        );
    }

    /// Reset scores and start over. `None` picks a fresh seed.
    pub fn restart_game(&mut self, seed: Option<u64>) {
        self.state.rng.reseed(seed, 0);
        self.scores = vec![0; self.roster.len()];
        self.player_scores = None;
        self.how_to_win_text = Verdict::ReachTarget(
            POINTS_PER_OPPONENT * self.roster.len().saturating_sub(1) as u32,
        )
        .how_to_win_text();
        self.someone_won = None;
        self.next_stage = GameStage::RestartRound;
        log::info!("new game with seed {}", self.state.seed());
        self.restart_round();
    }
}
