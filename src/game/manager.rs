//! Turn and match state machine
//!
//! `GameManager` owns both players and the board for one match. It enforces
//! turn order and card-play legality, and decides when the match is over.
//! Invalid input never mutates state: it is logged under the `input`
//! category and returned as an error.

/// Log at verbose level, compiled out without the `verbose-logging` feature
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::board::{Board, BoardLayout, LayoutRegistry};
use crate::config::{FatiguePolicy, GameConfig};
use crate::core::{Card, CardType, Deck, MinionId, Player, PlayerId, Position, Source};
use crate::events::{EventBus, EventKind, GameEvent, SubscriptionId};
use crate::game::GameLogger;
use crate::{GameError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// Why a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// A hero reached 0 health
    HeroDefeated,
    /// Every tower of one side fell
    TowersDestroyed,
    /// Both sides lost at the same moment
    MutualDestruction,
    /// The runner stopped the match
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` is a draw
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Player1Turn,
    Player2Turn,
    GameOver,
}

/// Result of a successful card play
#[derive(Debug, Clone)]
pub struct PlayedCard {
    pub card: Arc<Card>,
    /// The unplaced minion created by a minion card
    pub minion: Option<MinionId>,
}

#[derive(Debug)]
pub struct GameManager {
    pub(crate) players: [Player; 2],
    pub(crate) board: Board,
    bus: EventBus,
    pub(crate) config: GameConfig,
    active: usize,
    state: MatchState,
    turn_number: u32,
    outcome: Option<MatchOutcome>,
    /// Raised by the `tower:damaged` subscription, consumed by the win check
    tower_alert: Rc<Cell<bool>>,
    tower_subscription: SubscriptionId,
    pub(crate) logger: GameLogger,
}

impl GameManager {
    /// Set up a match on the configured built-in layout
    pub fn new(config: GameConfig, decks: [&[Arc<Card>]; 2], bus: EventBus) -> Result<Self> {
        let layout = LayoutRegistry::builtin().get(&config.layout)?.clone();
        Self::with_layout(config, &layout, decks, bus)
    }

    /// Set up a match: shuffled decks, opening hands, board and towers
    ///
    /// No turn is started; call `start_turn` for player 1 first.
    pub fn with_layout(
        config: GameConfig,
        layout: &BoardLayout,
        decks: [&[Arc<Card>]; 2],
        bus: EventBus,
    ) -> Result<Self> {
        config.validate()?;
        layout.validate()?;

        let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
        let ids = [PlayerId::new(0), PlayerId::new(1)];
        let players = [
            Player::new(ids[0], "Player 1", config.starting_health, Deck::shuffled(decks[0], &mut rng)),
            Player::new(ids[1], "Player 2", config.starting_health, Deck::shuffled(decks[1], &mut rng)),
        ];
        let board = Board::from_layout(layout, ids, config.tower_health, bus.clone());

        let tower_alert = Rc::new(Cell::new(false));
        let alert = Rc::clone(&tower_alert);
        let tower_subscription = bus.subscribe(EventKind::TowerDamaged, "game_manager", 0, move |event| {
            if let GameEvent::TowerDamaged { new_hp, .. } = event {
                if *new_hp <= 0 {
                    alert.set(true);
                }
            }
            Ok(())
        });

        let starting_hand = config.starting_hand;
        let mut manager = GameManager {
            players,
            board,
            bus,
            config,
            active: 0,
            state: MatchState::Player1Turn,
            turn_number: 0,
            outcome: None,
            tower_alert,
            tower_subscription,
            logger: GameLogger::new(),
        };

        for index in 0..2 {
            for _ in 0..starting_hand {
                manager.draw_card(index);
            }
        }

        manager.bus.publish(GameEvent::GameInitialized {
            players: ids,
            rows: layout.rows,
            cols: layout.cols,
        });
        manager.logger.category(
            "game",
            &format!("Match initialized on '{}' ({}x{})", layout.name, layout.rows, layout.cols),
        );
        Ok(manager)
    }

    pub fn set_logger(&mut self, logger: GameLogger) {
        self.logger = logger;
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for effects and tools outside the turn flow
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        Ok(&self.players[self.index_of(id)?])
    }

    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.players[0].id, self.players[1].id]
    }

    pub fn active_player(&self) -> PlayerId {
        self.players[self.active].id
    }

    pub(crate) fn active_index(&self) -> usize {
        self.active
    }

    pub fn opponent_of(&self, id: PlayerId) -> Result<PlayerId> {
        Ok(self.players[1 - self.index_of(id)?].id)
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state == MatchState::GameOver
    }

    pub(crate) fn index_of(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    /// Log a rejected input and hand the error back
    pub(crate) fn reject(&self, err: GameError) -> GameError {
        self.logger.category("input", &err.to_string());
        err
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.is_over() {
            return Err(self.reject(GameError::GameOver));
        }
        Ok(())
    }

    /// Index of `player` if the match is live and it is their turn
    pub(crate) fn ensure_active(&self, player: PlayerId) -> Result<usize> {
        self.ensure_running()?;
        if self.turn_number == 0 {
            return Err(self.reject(GameError::TurnNotStarted));
        }
        let index = self.index_of(player)?;
        if index != self.active {
            let name = self.players[index].name.to_string();
            return Err(self.reject(GameError::NotYourTurn(name)));
        }
        Ok(index)
    }

    // Turn flow

    /// Begin the active player's turn
    ///
    /// Grows and refills mana, draws one card, clears the hero's attack
    /// flag and re-arms the player's minions.
    pub fn start_turn(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.turn_number += 1;
        let index = self.active;
        let cap = self.config.mana_cap;

        let player = &mut self.players[index];
        player.grow_mana(cap);
        player.hero_attacked = false;
        let id = player.id;
        self.publish_mana(index);

        self.draw_card(index);
        self.board.refresh_minions(id);

        self.logger.category(
            "game",
            &format!(
                "Turn {}: {} ({} mana)",
                self.turn_number, self.players[index].name, self.players[index].mana_crystals
            ),
        );
        self.bus.publish(GameEvent::TurnStarted {
            player: id,
            turn: self.turn_number,
        });
        self.check_win_conditions();
        Ok(())
    }

    /// Finish the active player's turn and start the opponent's
    ///
    /// Timed effects on the ending player's minions tick down here.
    pub fn end_turn(&mut self) -> Result<()> {
        self.ensure_running()?;
        let id = self.active_player();
        self.bus.publish(GameEvent::TurnEnded {
            player: id,
            turn: self.turn_number,
        });
        let expired = self.board.update_minion_effects(Some(id));
        if expired > 0 {
            log_if_verbose!(self, "{expired} effect(s) expired");
        }

        self.active = 1 - self.active;
        self.state = if self.active == 0 {
            MatchState::Player1Turn
        } else {
            MatchState::Player2Turn
        };
        self.start_turn()
    }

    /// Draw the top card for a player
    ///
    /// A full hand burns the card. An empty deck publishes `deck:empty` and,
    /// under the damage policy, hurts the hero for the growing fatigue count.
    pub(crate) fn draw_card(&mut self, index: usize) -> Option<Arc<Card>> {
        let max_hand = self.config.max_hand_size;
        let player = &mut self.players[index];
        let id = player.id;

        let Some(card) = player.deck.draw() else {
            let fatigue = match self.config.fatigue {
                FatiguePolicy::None => 0,
                FatiguePolicy::Damage => {
                    player.fatigue += 1;
                    player.fatigue
                }
            };
            self.bus.publish(GameEvent::DeckEmpty { player: id, fatigue });
            if fatigue > 0 {
                self.damage_hero(index, fatigue, Source::None);
            }
            return None;
        };

        if player.hand.len() >= max_hand {
            let name = card.name.clone();
            self.logger
                .category("game", &format!("{} burns {} (hand full)", player.name, name));
            self.bus.publish(GameEvent::CardBurned { player: id, card: name });
            return None;
        }
        player.hand.push(Arc::clone(&card));
        log_if_verbose!(self, "{} draws {}", self.players[index].name, card.name);
        self.bus.publish(GameEvent::CardDrawn {
            player: id,
            card: card.name.clone(),
        });
        Some(card)
    }

    pub(crate) fn publish_mana(&self, index: usize) {
        let player = &self.players[index];
        self.bus.publish(GameEvent::ManaChanged {
            player: player.id,
            mana: player.mana_crystals,
            max_mana: player.max_mana_crystals,
        });
    }

    pub(crate) fn damage_hero(&mut self, index: usize, amount: i32, source: Source) {
        if amount <= 0 {
            return;
        }
        let player = &mut self.players[index];
        let old_health = player.health;
        player.take_damage(amount);
        self.bus.publish(GameEvent::HeroDamaged {
            player: player.id,
            source,
            amount,
            old_health,
            new_health: player.health,
        });
    }

    pub(crate) fn heal_hero(&mut self, index: usize, amount: i32, source: Source) {
        let max_health = self.config.starting_health;
        let player = &mut self.players[index];
        let old_health = player.health;
        let restored = player.heal(amount, max_health);
        if restored > 0 {
            self.bus.publish(GameEvent::HeroHealed {
                player: player.id,
                source,
                amount: restored,
                old_health,
                new_health: player.health,
            });
        }
    }

    // Card play

    /// Pay for and resolve a card from hand
    ///
    /// Minion cards create an unplaced minion for the player; place it with
    /// `place_pending_minion`, or use `summon_from_hand` to do both at once.
    /// Spells and weapons resolve their effect immediately.
    pub fn play_card_from_hand(&mut self, player: PlayerId, hand_index: usize) -> Result<PlayedCard> {
        let index = self.ensure_active(player)?;
        let card = self.affordable_card(index, hand_index)?;

        let p = &mut self.players[index];
        p.spend_mana(card.cost);
        p.hand.remove(hand_index);
        self.publish_mana(index);

        self.logger.category(
            "game",
            &format!("{} plays {} ({} mana)", self.players[index].name, card.name, card.cost),
        );
        self.bus.publish(GameEvent::CardPlayed {
            player,
            card: card.name.clone(),
            card_type: card.card_type,
        });

        let minion = match card.card_type {
            CardType::Minion => {
                let id = self.board.create_minion(&card, player);
                self.players[index].minions.push(id);
                Some(id)
            }
            CardType::Spell | CardType::Weapon => {
                self.resolve_effect(index, &card);
                None
            }
        };

        self.check_win_conditions();
        Ok(PlayedCard { card, minion })
    }

    fn affordable_card(&self, index: usize, hand_index: usize) -> Result<Arc<Card>> {
        let player = &self.players[index];
        let Some(card) = player.hand.get(hand_index) else {
            return Err(self.reject(GameError::InvalidHandIndex {
                index: hand_index,
                hand_size: player.hand.len(),
            }));
        };
        if !player.can_afford(card.cost) {
            return Err(self.reject(GameError::InsufficientMana {
                cost: card.cost,
                available: player.mana_crystals,
            }));
        }
        Ok(Arc::clone(card))
    }

    /// Play a minion card and place it on one of the player's spawn tiles
    pub fn summon_from_hand(&mut self, player: PlayerId, hand_index: usize, position: Position) -> Result<MinionId> {
        let index = self.ensure_active(player)?;
        let card = self.affordable_card(index, hand_index)?;
        if !card.is_minion() {
            return Err(self.reject(GameError::InvalidTarget(format!("{} is not a minion", card.name))));
        }
        if !self.board.is_spawn_tile(player, position) {
            return Err(self.reject(GameError::PlacementFailed(position.to_string())));
        }

        let played = self.play_card_from_hand(player, hand_index)?;
        let Some(minion) = played.minion else {
            return Err(GameError::InvalidCardData(card.name.to_string()));
        };
        self.place_pending_minion(player, minion, position)?;
        Ok(minion)
    }

    /// Place a minion created by `play_card_from_hand` on a spawn tile
    pub fn place_pending_minion(&mut self, player: PlayerId, minion: MinionId, position: Position) -> Result<()> {
        self.ensure_active(player)?;
        match self.board.minion(minion) {
            Some(m) if m.owner == player && m.position.is_none() => {}
            _ => return Err(self.reject(GameError::InvalidTarget(format!("no pending minion {minion}")))),
        }
        if !self.board.is_spawn_tile(player, position) || !self.board.place_minion(minion, position) {
            return Err(self.reject(GameError::PlacementFailed(position.to_string())));
        }
        Ok(())
    }

    /// Minions the player created but has not placed yet
    pub fn pending_minions(&self, player: PlayerId) -> Vec<MinionId> {
        let Ok(index) = self.index_of(player) else {
            return Vec::new();
        };
        self.players[index]
            .minions
            .iter()
            .copied()
            .filter(|&id| self.board.minion(id).is_some_and(|m| m.position.is_none()))
            .collect()
    }

    // Movement

    /// Walk one of the active player's minions to an empty tile in range
    pub fn move_minion(&mut self, player: PlayerId, from: Position, to: Position) -> Result<()> {
        self.ensure_active(player)?;
        let Some(minion) = self.board.get_minion_at(from) else {
            return Err(self.reject(GameError::IllegalMove(format!("no minion at {from}"))));
        };
        if minion.owner != player {
            return Err(self.reject(GameError::IllegalMove(format!("{} is not yours", minion.name))));
        }
        if minion.has_moved {
            return Err(self.reject(GameError::IllegalMove(format!("{} already moved", minion.name))));
        }
        if minion.is_stunned() {
            return Err(self.reject(GameError::IllegalMove(format!("{} is stunned", minion.name))));
        }
        if from.chebyshev(to) > minion.movement {
            return Err(self.reject(GameError::IllegalMove(format!(
                "{} cannot reach {to} from {from}",
                minion.name
            ))));
        }
        let id = minion.id;
        if !self.board.move_minion(from, to) {
            return Err(self.reject(GameError::IllegalMove(format!("{to} is not free"))));
        }
        if let Some(m) = self.board.minion_mut(id) {
            m.has_moved = true;
        }
        Ok(())
    }

    // Match end

    /// Remove minions that dropped to 0 health and forget them
    pub(crate) fn remove_dead_minions(&mut self) {
        for (id, position) in self.board.dead_minions() {
            if let Some(minion) = self.board.remove_minion(position) {
                if let Ok(index) = self.index_of(minion.owner) {
                    self.players[index].forget_minion(id);
                }
                log_if_verbose!(self, "{} dies at {position}", minion.name);
            }
        }
    }

    /// End the match if a hero fell or a side lost every tower
    ///
    /// Tower losses are only looked at after the `tower:damaged` subscription
    /// has seen a tower drop to 0.
    pub fn check_win_conditions(&mut self) -> Option<MatchOutcome> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }
        let tower_fell = self.tower_alert.replace(false);
        let hero_dead = [self.players[0].is_dead(), self.players[1].is_dead()];
        let towers_gone = [
            tower_fell && self.board.all_towers_destroyed(self.players[0].id),
            tower_fell && self.board.all_towers_destroyed(self.players[1].id),
        ];
        let lost = [hero_dead[0] || towers_gone[0], hero_dead[1] || towers_gone[1]];

        let outcome = match lost {
            [false, false] => return None,
            [true, true] => MatchOutcome {
                winner: None,
                reason: EndReason::MutualDestruction,
            },
            [loser0, _] => {
                let loser = if loser0 { 0 } else { 1 };
                MatchOutcome {
                    winner: Some(self.players[1 - loser].id),
                    reason: if hero_dead[loser] {
                        EndReason::HeroDefeated
                    } else {
                        EndReason::TowersDestroyed
                    },
                }
            }
        };
        self.end_match(outcome.clone());
        Some(outcome)
    }

    /// Enter the terminal state and publish `game:ended` once
    pub fn end_match(&mut self, outcome: MatchOutcome) {
        if self.is_over() {
            return;
        }
        self.state = MatchState::GameOver;
        self.outcome = Some(outcome.clone());
        let message = match outcome.winner.and_then(|w| self.player(w).ok()) {
            Some(winner) => format!("{} wins ({:?})", winner.name, outcome.reason),
            None => format!("Match drawn ({:?})", outcome.reason),
        };
        self.logger.minimal(&message);
        self.bus.publish(GameEvent::GameEnded { outcome });
    }
}

impl Drop for GameManager {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.tower_subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Archetype, CardEffect};

    fn deck() -> Vec<Arc<Card>> {
        (0..12)
            .map(|i| Arc::new(Card::minion(format!("Recruit {i}"), 1, 1, 2, 1, Archetype::Melee)))
            .collect()
    }

    fn manager_with(config: GameConfig) -> GameManager {
        let cards = deck();
        let mut manager =
            GameManager::new(config, [&cards, &cards], EventBus::with_logger(GameLogger::capturing())).unwrap();
        manager.set_logger(GameLogger::capturing());
        manager
    }

    fn manager() -> GameManager {
        manager_with(GameConfig::default())
    }

    #[test]
    fn test_setup() {
        let game = manager();
        for player in game.players() {
            assert_eq!(player.health, 30);
            assert_eq!(player.mana_crystals, 0);
            assert_eq!(player.hand.len(), 3);
            assert_eq!(player.deck.len(), 9);
        }
        assert_eq!(game.state(), MatchState::Player1Turn);
        assert_eq!(game.board().towers().len(), 2);
    }

    #[test]
    fn test_mana_growth_caps() {
        let mut game = manager();
        for n in 1..=12u8 {
            game.start_turn().unwrap();
            let p = &game.players()[0];
            assert_eq!(p.max_mana_crystals, n.min(10));
            assert_eq!(p.mana_crystals, p.max_mana_crystals);
        }
    }

    #[test]
    fn test_full_hand_burns() {
        let mut game = manager();
        let p1 = game.active_player();
        for _ in 0..9 {
            game.start_turn().unwrap();
        }
        // 3 opening cards + 7 draws fill the hand, the last two burn
        assert_eq!(game.player(p1).unwrap().hand.len(), 10);
        assert_eq!(game.player(p1).unwrap().deck.len(), 0);
    }

    #[test]
    fn test_insufficient_mana_is_rejected() {
        let mut game = manager();
        game.start_turn().unwrap();
        let p1 = game.active_player();
        game.play_card_from_hand(p1, 0).unwrap();

        let err = game.play_card_from_hand(p1, 0).unwrap_err();
        assert!(matches!(err, GameError::InsufficientMana { cost: 1, available: 0 }));
        assert_eq!(game.player(p1).unwrap().hand.len(), 3);
        assert!(game
            .logger()
            .logs()
            .iter()
            .any(|entry| entry.message.starts_with("Not enough mana")));
    }

    #[test]
    fn test_nothing_is_playable_before_first_turn() {
        let surge = Arc::new(Card::spell("Surge", 0, CardEffect::GainMana { amount: 1 }));
        let cards = vec![surge; 10];
        let mut game =
            GameManager::new(GameConfig::default(), [&cards, &cards], EventBus::with_logger(GameLogger::capturing()))
                .unwrap();
        game.set_logger(GameLogger::capturing());
        let p1 = game.active_player();
        assert_eq!(game.turn_number(), 0);

        assert!(matches!(game.play_card_from_hand(p1, 0), Err(GameError::TurnNotStarted)));
        assert!(matches!(
            game.summon_from_hand(p1, 0, Position::new(5, 9)),
            Err(GameError::TurnNotStarted)
        ));
        assert!(matches!(
            game.move_minion(p1, Position::new(5, 9), Position::new(5, 7)),
            Err(GameError::TurnNotStarted)
        ));
        assert!(matches!(
            game.attack(p1, Position::new(5, 7), Position::new(5, 6)),
            Err(GameError::TurnNotStarted)
        ));
        assert!(game.legal_actions(p1).is_empty());
        let player = game.player(p1).unwrap();
        assert_eq!((player.mana_crystals, player.hand.len()), (0, 3));

        game.start_turn().unwrap();
        game.play_card_from_hand(p1, 0).unwrap();
        assert_eq!(game.player(p1).unwrap().mana_crystals, 2);
    }

    #[test]
    fn test_bad_hand_index_and_wrong_turn() {
        let mut game = manager();
        game.start_turn().unwrap();
        let [p1, p2] = game.player_ids();
        assert!(matches!(
            game.play_card_from_hand(p1, 7),
            Err(GameError::InvalidHandIndex { index: 7, hand_size: 4 })
        ));
        assert!(matches!(game.play_card_from_hand(p2, 0), Err(GameError::NotYourTurn(_))));
    }

    #[test]
    fn test_play_then_place_pending() {
        let mut game = manager();
        game.start_turn().unwrap();
        let p1 = game.active_player();
        let played = game.play_card_from_hand(p1, 0).unwrap();
        let minion = played.minion.unwrap();
        assert_eq!(game.pending_minions(p1), vec![minion]);

        assert!(game.place_pending_minion(p1, minion, Position::new(1, 1)).is_err());
        game.place_pending_minion(p1, minion, Position::new(5, 9)).unwrap();
        assert!(game.pending_minions(p1).is_empty());
        assert!(!game.board().minion(minion).unwrap().can_attack);
    }

    #[test]
    fn test_fatigue_damage_grows() {
        let mut game = manager_with(GameConfig::default().with_fatigue(FatiguePolicy::Damage));
        for _ in 0..9 {
            game.start_turn().unwrap();
        }
        assert_eq!(game.players()[0].health, 30);
        game.start_turn().unwrap();
        game.start_turn().unwrap();
        assert_eq!(game.players()[0].health, 27);
        assert_eq!(game.players()[0].fatigue, 2);
    }

    #[test]
    fn test_game_over_blocks_everything() {
        let mut game = manager();
        game.start_turn().unwrap();
        game.damage_hero(1, 30, Source::None);
        let outcome = game.check_win_conditions().unwrap();
        assert_eq!(outcome.winner, Some(game.player_ids()[0]));
        assert_eq!(outcome.reason, EndReason::HeroDefeated);
        assert!(matches!(game.end_turn(), Err(GameError::GameOver)));
        assert!(matches!(game.start_turn(), Err(GameError::GameOver)));
    }

    #[test]
    fn test_dropping_manager_releases_subscription() {
        let bus = EventBus::with_logger(GameLogger::capturing());
        let cards = deck();
        let game = GameManager::new(GameConfig::default(), [&cards, &cards], bus.clone()).unwrap();
        assert_eq!(bus.subscriber_count(EventKind::TowerDamaged), 1);
        drop(game);
        assert_eq!(bus.subscriber_count(EventKind::TowerDamaged), 0);
    }
}
