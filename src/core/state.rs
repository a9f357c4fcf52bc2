//! Game state: boards, tile containers and turn order.
//!
//! ## Containers
//!
//! Every tile lives in exactly one of: the bag, the used pile, a factory,
//! the center pool, or a board (wall, pattern line, floor). `tile_census`
//! counts them; the total never changes over a lineage.
//!
//! ## Value semantics
//!
//! `clone()` is a full independent copy. The bag and used pile are `im`
//! vectors, so clones share structure without sharing mutation.
//!
//! ## Identity
//!
//! The Zobrist hash is cached and kept current by the mutation primitives
//! below. Anything that changes a hashed feature goes through them.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::board::{wall_tile, AgentBoard, FloorSlot, PatternLine};
use super::config::{GameConfig, TILES_PER_COLOR, TOTAL_TILES, WALL_SIZE};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use super::tile::{Tile, TileDisplay, ALL_TILES, TILE_COLORS};
use super::action::Source;
use crate::error::{AzulError, Result};
use crate::hash;

/// Where a game is within its round cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Agents take turns drafting tiles.
    Drafting,
    /// Every display is empty; boards are scored next.
    RoundEnd,
    /// Boards are scored; displays are refilled next.
    RoundStart,
    /// A wall row was completed and end-game bonuses are applied.
    GameOver,
}

impl Phase {
    /// Dense index used by hash tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Phase::Drafting => 0,
            Phase::RoundEnd => 1,
            Phase::RoundStart => 2,
            Phase::GameOver => 3,
        }
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Boards ===
    pub(crate) boards: PlayerMap<AgentBoard>,

    // === Tile containers ===
    /// Draw pile; tiles are drawn from the front.
    pub(crate) bag: Vector<Tile>,
    /// Discards waiting to be reshuffled into the bag.
    pub(crate) used: Vector<Tile>,
    pub(crate) factories: Vec<TileDisplay>,
    pub(crate) center: TileDisplay,

    // === Turn order ===
    /// Agent who opens the current round.
    pub(crate) first_agent: PlayerId,
    /// Agent who claimed the first-player token this round.
    pub(crate) next_first_agent: Option<PlayerId>,
    pub(crate) phase: Phase,
    pub(crate) current: PlayerId,

    // === Randomness and identity ===
    pub(crate) rng: GameRng,
    #[serde(skip)]
    pub(crate) zobrist: u64,
}

impl GameState {
    /// Create a fresh game: empty boards, a shuffled bag and filled factories.
    ///
    /// The opening agent is drawn from `seed`, as is every later refill.
    ///
    /// ```
    /// use rust_azul::core::{GameState, Phase, TOTAL_TILES};
    ///
    /// let state = GameState::new(2, 7).unwrap();
    /// assert_eq!(state.phase(), Phase::Drafting);
    /// assert_eq!(state.total_tiles(), TOTAL_TILES);
    /// assert!(GameState::new(4, 7).is_err());
    /// ```
    pub fn new(agent_count: usize, seed: u64) -> Result<Self> {
        let config = GameConfig::for_players(agent_count)?;
        let mut rng = GameRng::new(seed);

        let mut tiles: Vec<Tile> = ALL_TILES
            .iter()
            .flat_map(|&t| std::iter::repeat(t).take(TILES_PER_COLOR))
            .collect();
        rng.shuffle(&mut tiles);

        let first_agent = PlayerId::new(rng.gen_range_usize(0..agent_count) as u8);

        let mut state = Self {
            boards: PlayerMap::with_default(agent_count),
            bag: tiles.into_iter().collect(),
            used: Vector::new(),
            factories: vec![TileDisplay::new(); config.factory_count],
            center: TileDisplay::new(),
            first_agent,
            next_first_agent: None,
            phase: Phase::Drafting,
            current: first_agent,
            rng,
            zobrist: 0,
        };
        state.zobrist = hash::recompute(&state);
        state.refill_displays()?;
        Ok(state)
    }

    // === Accessors ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.boards.player_count()
    }

    #[must_use]
    pub fn boards(&self) -> &PlayerMap<AgentBoard> {
        &self.boards
    }

    #[must_use]
    pub fn board(&self, agent: PlayerId) -> &AgentBoard {
        &self.boards[agent]
    }

    #[must_use]
    pub fn bag(&self) -> &Vector<Tile> {
        &self.bag
    }

    #[must_use]
    pub fn used(&self) -> &Vector<Tile> {
        &self.used
    }

    #[must_use]
    pub fn factories(&self) -> &[TileDisplay] {
        &self.factories
    }

    #[must_use]
    pub fn center(&self) -> &TileDisplay {
        &self.center
    }

    /// The display a drafting action takes from, if it exists.
    #[must_use]
    pub fn display(&self, source: Source) -> Option<&TileDisplay> {
        match source {
            Source::Factory(i) => self.factories.get(i as usize),
            Source::Center => Some(&self.center),
        }
    }

    #[must_use]
    pub fn first_agent(&self) -> PlayerId {
        self.first_agent
    }

    /// Agent holding the first-player token for next round, if claimed.
    #[must_use]
    pub fn next_first_agent(&self) -> Option<PlayerId> {
        self.next_first_agent
    }

    /// True once someone has drafted from the center this round.
    #[must_use]
    pub fn first_agent_taken(&self) -> bool {
        self.next_first_agent.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Agent to move while drafting; otherwise the last agent who drafted.
    #[must_use]
    pub fn current(&self) -> PlayerId {
        self.current
    }

    /// Agent whose decision it is, or `None` at round boundaries and game end.
    #[must_use]
    pub fn to_move(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Drafting => Some(self.current),
            _ => None,
        }
    }

    /// Cached Zobrist hash.
    #[inline]
    #[must_use]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }

    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    /// True if any display still holds tiles.
    #[must_use]
    pub fn tiles_remaining(&self) -> bool {
        !self.center.is_empty() || self.factories.iter().any(|f| !f.is_empty())
    }

    /// True iff any board has a fully occupied wall row.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.boards.values().any(AgentBoard::has_complete_row)
    }

    // === Tile census ===

    /// Tiles of each color across every container.
    #[must_use]
    pub fn tile_census(&self) -> [usize; TILE_COLORS] {
        let mut census = [0usize; TILE_COLORS];

        for &t in self.bag.iter().chain(self.used.iter()) {
            census[t.index()] += 1;
        }
        for display in self.factories.iter().chain(std::iter::once(&self.center)) {
            for (t, n) in display.iter() {
                census[t.index()] += n as usize;
            }
        }
        for board in self.boards.values() {
            for row in 0..WALL_SIZE {
                for col in 0..WALL_SIZE {
                    if board.is_occupied(row, col) {
                        census[wall_tile(row, col).index()] += 1;
                    }
                }
                let line = board.line(row);
                if let Some(t) = line.tile {
                    census[t.index()] += line.count as usize;
                }
            }
            for slot in board.floor() {
                if let FloorSlot::Tile(t) = slot {
                    census[t.index()] += 1;
                }
            }
        }
        census
    }

    /// Total tiles across every container.
    #[must_use]
    pub fn total_tiles(&self) -> usize {
        self.tile_census().iter().sum()
    }

    /// Check that no tile was created or destroyed.
    pub fn check_conservation(&self) -> Result<()> {
        let census = self.tile_census();
        if census.iter().all(|&n| n == TILES_PER_COLOR) {
            Ok(())
        } else {
            Err(AzulError::InvariantViolation(format!(
                "tile census {census:?}, expected {TILES_PER_COLOR} per color ({TOTAL_TILES} total)"
            )))
        }
    }

    // === Round setup ===

    /// Refill every factory from the bag.
    ///
    /// Leftover display tiles go to the used pile first. When the bag runs
    /// dry the used pile is shuffled in behind it; if both are empty the
    /// remaining factories stay partially filled.
    pub fn refill_displays(&mut self) -> Result<()> {
        for i in 0..self.factories.len() {
            let source = Source::Factory(i as u8);
            self.zobrist ^= hash::display_terms(source, &self.factories[i]);
            let leftovers = self.factories[i].drain();
            self.discard_counts(leftovers);
        }
        self.zobrist ^= hash::display_terms(Source::Center, &self.center);
        let leftovers = self.center.drain();
        self.discard_counts(leftovers);

        let per_factory = GameConfig::for_players(self.player_count())?.tiles_per_factory;
        for i in 0..self.factories.len() {
            for _ in 0..per_factory {
                let Some(tile) = self.draw() else {
                    break;
                };
                self.factories[i].add(tile, 1)?;
            }
            self.zobrist ^= hash::display_terms(Source::Factory(i as u8), &self.factories[i]);
        }
        Ok(())
    }

    /// Draw one tile, reshuffling the used pile into the bag when empty.
    fn draw(&mut self) -> Option<Tile> {
        if self.bag.is_empty() {
            if self.used.is_empty() {
                return None;
            }
            let mut tiles: Vec<Tile> = std::mem::take(&mut self.used).into_iter().collect();
            self.rng.shuffle(&mut tiles);
            self.bag.extend(tiles);
        }
        self.bag.pop_front()
    }

    /// Replace the RNG and shuffle the undrawn bag.
    ///
    /// Used by rollouts so that sibling simulations sample different deals.
    /// Hidden information only, so the hash does not change.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = GameRng::new(seed);
        let mut tiles: Vec<Tile> = std::mem::take(&mut self.bag).into_iter().collect();
        self.rng.shuffle(&mut tiles);
        self.bag = tiles.into_iter().collect();
    }

    // === Mutation primitives (hash-maintaining) ===

    /// Remove `n` tiles of `tile` from a display.
    pub(crate) fn take(&mut self, source: Source, tile: Tile, n: u8) -> Result<()> {
        let display = match source {
            Source::Factory(i) => self
                .factories
                .get_mut(i as usize)
                .ok_or(AzulError::InvalidOperation("factory index out of range"))?,
            Source::Center => &mut self.center,
        };
        let before = display.count(tile);
        display.remove(tile, n)?;
        self.zobrist ^= hash::z_display(source, tile, before) ^ hash::z_display(source, tile, before - n);
        Ok(())
    }

    /// Add `n` tiles of `tile` to the center pool.
    pub(crate) fn put_center(&mut self, tile: Tile, n: u8) -> Result<()> {
        let before = self.center.count(tile);
        self.center.add(tile, n)?;
        self.zobrist ^= hash::z_display(Source::Center, tile, before) ^ hash::z_display(Source::Center, tile, before + n);
        Ok(())
    }

    pub(crate) fn set_line(&mut self, agent: PlayerId, row: usize, line: PatternLine) {
        let old = self.boards[agent].lines[row];
        self.zobrist ^= hash::z_line(agent, row, old) ^ hash::z_line(agent, row, line);
        self.boards[agent].lines[row] = line;
    }

    /// Place a slot on an agent's floor; `None` if the floor is full.
    pub(crate) fn push_floor(&mut self, agent: PlayerId, slot: FloorSlot) -> Option<usize> {
        let idx = self.boards[agent].push_floor(slot)?;
        self.zobrist ^= hash::z_floor(agent, idx, slot);
        Some(idx)
    }

    pub(crate) fn discard(&mut self, tile: Tile, n: u8) {
        for _ in 0..n {
            self.used.push_back(tile);
        }
    }

    fn discard_counts(&mut self, counts: [u8; TILE_COLORS]) {
        for (tile, n) in ALL_TILES.iter().zip(counts) {
            self.discard(*tile, n);
        }
    }

    pub(crate) fn set_turn(&mut self, phase: Phase, current: PlayerId) {
        self.zobrist ^= hash::z_turn(self.phase, self.current) ^ hash::z_turn(phase, current);
        self.phase = phase;
        self.current = current;
    }

    pub(crate) fn claim_token(&mut self, agent: PlayerId) {
        self.zobrist ^= hash::z_token(self.next_first_agent) ^ hash::z_token(Some(agent));
        self.next_first_agent = Some(agent);
    }

    /// Hand the opening turn to the token holder and reset the token.
    pub(crate) fn pass_token(&mut self) {
        let first = self.next_first_agent.unwrap_or(self.first_agent);
        self.zobrist ^= hash::z_token(self.next_first_agent) ^ hash::z_first_agent(self.first_agent) ^ hash::z_first_agent(first);
        self.first_agent = first;
        self.next_first_agent = None;
    }

    /// Edit one board in place, re-hashing it afterwards.
    ///
    /// ```
    /// use rust_azul::core::{GameState, PlayerId, Tile};
    /// use rust_azul::hash;
    ///
    /// let mut state = GameState::new(2, 1).unwrap();
    /// state.edit_board(PlayerId::new(0), |board| {
    ///     board.set_wall_tile(0, Tile::Blue);
    /// });
    /// assert_eq!(state.zobrist(), hash::recompute(&state));
    /// ```
    pub fn edit_board<R>(&mut self, agent: PlayerId, f: impl FnOnce(&mut AgentBoard) -> R) -> R {
        self.zobrist ^= hash::board_terms(agent, &self.boards[agent]);
        let out = f(&mut self.boards[agent]);
        self.zobrist ^= hash::board_terms(agent, &self.boards[agent]);
        out
    }

    /// Replace a display's contents, for setting up positions.
    ///
    /// The previous contents go to the used pile.
    pub fn set_display(&mut self, source: Source, display: TileDisplay) -> Result<()> {
        let slot = match source {
            Source::Factory(i) => self
                .factories
                .get_mut(i as usize)
                .ok_or(AzulError::InvalidOperation("factory index out of range"))?,
            Source::Center => &mut self.center,
        };
        let old = std::mem::replace(slot, display);
        self.zobrist ^= hash::display_terms(source, &old) ^ hash::display_terms(source, &display);
        self.discard_counts(*old.counts());
        Ok(())
    }

    /// Recompute the cached hash, after deserialization.
    pub fn rehash(&mut self) {
        self.zobrist = hash::recompute(self);
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}, {} to move, first {}", self.phase, self.current, self.first_agent)?;
        for (i, factory) in self.factories.iter().enumerate() {
            writeln!(f, "f{i}: {factory}")?;
        }
        let marker = if self.first_agent_taken() { "" } else { " +1" };
        writeln!(f, "center: {}{marker}", self.center)?;
        writeln!(f, "bag {} used {}", self.bag.len(), self.used.len())?;
        for (agent, board) in self.boards.iter() {
            writeln!(f, "-- {agent} --")?;
            writeln!(f, "{board}")?;
        }
        Ok(())
    }
}
