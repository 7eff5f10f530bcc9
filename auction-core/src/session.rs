// Round/game state machine for one classroom session

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::error::{Result, SessionError};
use crate::participants::{Participant, ParticipantRegistry};
use crate::state::GameState;
use crate::trade::{self, Trade, TradeContext};
use crate::types::{Phase, Price, Round, Seconds};

// === TICK OUTCOME ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No round running, or the tick came from a stale timer
    Idle,
    /// Countdown moved; the round is still running
    Counting { remaining: Seconds },
    /// Countdown hit zero and more rounds remain
    RoundEnded { next_round: Round },
    /// Countdown hit zero on the last round
    GameFinished,
}

impl TickOutcome {
    pub fn ended_round(&self) -> bool {
        matches!(self, TickOutcome::RoundEnded { .. } | TickOutcome::GameFinished)
    }
}

// === SESSION ===

/// The whole mutable world of one game: settings, lifecycle state,
/// participants and the trade log.
///
/// Every operation runs to completion on `&mut self`; there is never more
/// than one mutator. The countdown only moves when the host calls
/// [`Session::tick`], once per elapsed second.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    config: GameConfig,
    state: GameState,
    registry: ParticipantRegistry,
    trades: Vec<Trade>,
    rng: StdRng,
    clock: C,
}

impl Session<SystemClock> {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_clock(config, seed, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(config: GameConfig, seed: u64, clock: C) -> Self {
        Self {
            config,
            state: GameState::new(&config),
            registry: ParticipantRegistry::new(),
            trades: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            clock,
        }
    }

    // === Queries ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn trade_log(&self) -> &[Trade] {
        &self.trades
    }

    /// Trades tagged with `round`, in log order.
    pub fn trades_in_round(&self, round: Round) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(move |t| t.round == round)
    }

    /// Resolve a participant's history against the log.
    pub fn history_of<'a>(&'a self, participant: &'a Participant) -> impl Iterator<Item = &'a Trade> {
        participant
            .trade_history
            .iter()
            .filter_map(|id| self.trades.get((id.0 as usize).wrapping_sub(1)))
    }

    // === Setup ===

    /// Replace the settings. Only allowed before a game starts.
    ///
    /// Only [`GameConfig::check_playable`] is enforced here; classroom ranges
    /// are checked by the boundary before settings reach the session.
    pub fn configure(&mut self, config: GameConfig) -> Result<()> {
        self.require(Phase::Setup, "configure")?;
        config.check_playable()?;
        self.config = config;
        self.state.time_remaining_seconds = config.round_duration_seconds;
        Ok(())
    }

    /// Start a new game with `config`: fresh participants, empty trade log,
    /// round 1 waiting for the operator to start its countdown.
    pub fn initialize_game(&mut self, config: GameConfig) -> Result<GameState> {
        self.require(Phase::Setup, "initialize a game")?;
        config.check_playable()?;

        self.config = config;
        self.registry.initialize(&self.config, &mut self.rng);
        self.trades.clear();
        self.state = GameState {
            phase: Phase::Playing,
            current_round: 1,
            time_remaining_seconds: config.round_duration_seconds,
            is_round_active: false,
            timer_epoch: self.state.timer_epoch,
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "game",
            event = "initialize",
            buyers = config.num_buyers as u64,
            sellers = config.num_sellers as u64,
            rounds = config.num_rounds as u64,
            round_seconds = config.round_duration_seconds as u64,
        );

        Ok(self.state)
    }

    /// Start a game with the settings already held by the session.
    pub fn start_game(&mut self) -> Result<GameState> {
        self.initialize_game(self.config)
    }

    /// Leave a finished game: participants and trades are discarded and the
    /// settings become editable again.
    pub fn reset_to_setup(&mut self) -> Result<GameState> {
        self.require(Phase::Finished, "reset to setup")?;

        #[cfg(feature = "instrument")]
        tracing::info!(target: "game", event = "reset", trades = self.trades.len() as u64);

        self.registry.clear();
        self.trades.clear();
        // Keep the epoch so timers armed before the reset stay stale.
        self.state = GameState {
            timer_epoch: self.state.timer_epoch,
            ..GameState::new(&self.config)
        };

        Ok(self.state)
    }

    // === Rounds ===

    /// Arm the countdown for the current round.
    pub fn start_round(&mut self) -> Result<GameState> {
        if !self.state.can_start_round() {
            return Err(self.invalid("start a round"));
        }
        self.state.phase = Phase::Playing;
        self.state.is_round_active = true;
        self.state.timer_epoch = self.state.timer_epoch.wrapping_add(1);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "round",
            event = "start",
            round = self.state.current_round as u64,
            seconds = self.state.time_remaining_seconds as u64,
            epoch = self.state.timer_epoch as u64,
        );

        Ok(self.state)
    }

    /// One elapsed second. Ends the round when the countdown reaches zero.
    /// Ticks while no round is running change nothing.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_round_active {
            return TickOutcome::Idle;
        }
        self.state.time_remaining_seconds = self.state.time_remaining_seconds.saturating_sub(1);
        if self.state.time_remaining_seconds > 0 {
            return TickOutcome::Counting {
                remaining: self.state.time_remaining_seconds,
            };
        }
        self.finish_round()
    }

    /// Tick on behalf of the timer armed at `epoch`. A timer left over from an
    /// earlier round has no effect.
    pub fn tick_for(&mut self, epoch: u32) -> TickOutcome {
        if epoch != self.state.timer_epoch {
            return TickOutcome::Idle;
        }
        self.tick()
    }

    /// End the running round before its countdown expires.
    pub fn end_round(&mut self) -> Result<GameState> {
        if !self.state.is_round_active {
            return Err(self.invalid("end the round"));
        }
        self.finish_round();
        Ok(self.state)
    }

    fn finish_round(&mut self) -> TickOutcome {
        self.state.is_round_active = false;
        let round = self.state.current_round;

        let outcome = if round >= self.config.num_rounds {
            self.state.phase = Phase::Finished;
            TickOutcome::GameFinished
        } else {
            self.state.current_round += 1;
            self.state.time_remaining_seconds = self.config.round_duration_seconds;
            self.state.phase = Phase::RoundEnd;
            TickOutcome::RoundEnded {
                next_round: self.state.current_round,
            }
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "round",
            event = "end",
            round = round as u64,
            trades = self.trades_in_round(round).count() as u64,
            finished = self.state.is_finished(),
        );

        outcome
    }

    // === Trading ===

    /// Submit a trade proposal. On admission the trade is appended to the log
    /// and to both participants' histories; on rejection nothing changes.
    pub fn register_trade(&mut self, buyer_id: &str, seller_id: &str, price: Option<Price>) -> Result<Trade> {
        if !self.state.accepts_trades() {
            return Err(self.invalid("register a trade"));
        }

        let ctx = TradeContext::new(
            &self.config,
            self.state.current_round,
            self.trades.len(),
            self.clock.now(),
        );
        let trade = match trade::admit(&self.registry, buyer_id, seller_id, price, &ctx) {
            Ok(trade) => trade,
            Err(err) => {
                #[cfg(feature = "instrument")]
                tracing::info!(
                    target: "trade_rejected",
                    round = self.state.current_round as u64,
                    buyer = buyer_id,
                    seller = seller_id,
                    kind = err.kind(),
                    reason = %err,
                );
                return Err(err);
            }
        };

        if !self.registry.record_trade(trade.buyer_id, trade.seller_id, trade.id) {
            // admit() resolved both ids against this registry a moment ago
            return Err(SessionError::NotFound(trade.buyer_id.to_string()));
        }
        self.trades.push(trade.clone());

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "trade",
            trade_id = trade.id.0,
            round = trade.round as u64,
            buyer = %trade.buyer_id,
            seller = %trade.seller_id,
            price = trade.price,
        );

        Ok(trade)
    }

    // === Helpers ===

    fn require(&self, phase: Phase, operation: &'static str) -> Result<()> {
        if self.state.phase == phase {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            phase: self.state.phase,
        }
    }
}
