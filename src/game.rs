use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::input::{self, Command};
use crate::snake::{Direction, GameState, Step};
use crate::term::TermManager;
use crate::timer::{Gate, Ticker};

const START_PROMPT: &str = "Press Space to Start";
const RESTART_PROMPT: &str = "Game Over! Press Space to Restart";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Turned(Direction),
    Started,
    Stopped,
    Quit,
    Ignored,
}

/// Owns the game state and the single tick stream driving it.
pub struct Controller {
    state: GameState,
    ticker: Option<Ticker>,
    gate: Gate,
    rng: StdRng,
    game_over: bool,
}

impl Controller {
    pub fn new(mut rng: StdRng) -> Self {
        let state = GameState::new(&mut rng);
        Controller { state, ticker: None, gate: Gate::default(), rng, game_over: false }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Text to show while no game is running.
    pub fn prompt(&self) -> Option<&'static str> {
        match (self.state.running, self.game_over) {
            (true, _) => None,
            (false, false) => Some(START_PROMPT),
            (false, true) => Some(RESTART_PROMPT),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.as_ref().map(Ticker::deadline)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Transition {
        match input::interpret(key, self.state.running) {
            Some(Command::Turn(dir)) => self.turn(dir, now),
            Some(Command::Start) => {
                self.start(now);
                Transition::Started
            }
            Some(Command::Stop) => {
                self.stop();
                Transition::Stopped
            }
            Some(Command::Quit) => Transition::Quit,
            None => Transition::Ignored,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.state.reset(&mut self.rng);
        self.state.running = true;
        self.game_over = false;
        self.arm(now);
        info!(delay_ms = self.state.delay_ms, "game started");
    }

    pub fn stop(&mut self) {
        info!(score = self.state.score(), "game stopped");
        self.finish();
    }

    /// Runs one step if the tick stream is due. Returns what happened, or
    /// None when nothing was due.
    pub fn tick(&mut self, now: Instant) -> Option<Step> {
        let ticker = self.ticker.as_mut()?;
        if !ticker.is_due(now) {
            return None;
        }
        ticker.fire(now);

        let step = self.state.advance(&mut self.rng);
        match step {
            Step::Moved => trace!(head = ?self.state.head(), "moved"),
            Step::Captured { delay_ms } => {
                debug!(score = self.state.score(), delay_ms, "food captured");
                self.arm(now);
            }
            Step::Crashed(collision) => {
                info!(?collision, score = self.state.score(), "game over");
                self.finish();
            }
        }

        Some(step)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn turn(&mut self, dir: Direction, now: Instant) -> Transition {
        if !self.gate.is_open(now) || dir.is_opposite(self.state.direction) {
            return Transition::Ignored;
        }

        self.state.direction = dir;
        self.gate.close_for(now, Duration::from_millis(self.state.delay_ms));
        debug!(?dir, "direction changed");
        Transition::Turned(dir)
    }

    // Replaces any running tick stream with one at the current delay
    fn arm(&mut self, now: Instant) {
        if let Some(old) = self.ticker.take() {
            trace!(period = ?old.period(), "cancelled tick stream");
        }
        self.ticker = Some(Ticker::start(now, Duration::from_millis(self.state.delay_ms)));
    }

    fn finish(&mut self) {
        self.ticker = None;
        if self.state.record_high_score() {
            info!(high_score = self.state.high_score, "new high score");
        }
        self.state.reset(&mut self.rng);
        self.game_over = true;
    }
}

/// Host loop: waits for keys or the next tick, whichever comes first, and
/// repaints after every change. Returns when the player quits.
pub fn run(term: &mut TermManager, game: &mut Controller) -> Result<()> {
    term.draw(game)?;

    loop {
        let timeout = game.next_deadline().map(|t| t.saturating_duration_since(Instant::now()));

        if let Some(key) = term.next_key(timeout)? {
            match game.handle_key(&key, Instant::now()) {
                Transition::Quit => return Ok(()),
                Transition::Started | Transition::Stopped => term.draw(game)?,
                Transition::Turned(_) | Transition::Ignored => {}
            }
        }

        if game.tick(Instant::now()).is_some() {
            term.draw(game)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::{Collision, Position};
    use crossterm::event::{KeyCode, KeyModifiers};
    use rand::SeedableRng;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> Controller {
        Controller::new(StdRng::seed_from_u64(42))
    }

    fn started(t0: Instant) -> Controller {
        let mut game = controller();
        assert_eq!(game.handle_key(&key(KeyCode::Char(' ')), t0), Transition::Started);
        // Keep the food out of the way unless a test puts it somewhere
        game.state.food = Position::new(1, 1);
        game
    }

    #[test]
    fn test_initial_state() {
        let game = controller();
        assert!(!game.state().running);
        assert_eq!(game.prompt(), Some(START_PROMPT));
        assert_eq!(game.next_deadline(), None);
    }

    #[test]
    fn test_start() {
        let t0 = Instant::now();
        let game = started(t0);
        assert!(game.state().running);
        assert_eq!(game.prompt(), None);
        assert_eq!(game.next_deadline(), Some(t0 + ms(200)));
    }

    #[test]
    fn test_keys_ignored_while_stopped() {
        let t0 = Instant::now();
        let mut game = controller();
        assert_eq!(game.handle_key(&key(KeyCode::Up), t0), Transition::Ignored);
        assert_eq!(game.state().direction, Direction::Right);
        assert_eq!(game.tick(t0 + ms(1000)), None);
    }

    #[test]
    fn test_tick_only_when_due() {
        let t0 = Instant::now();
        let mut game = started(t0);

        assert_eq!(game.tick(t0 + ms(100)), None);
        assert_eq!(game.tick(t0 + ms(200)), Some(Step::Moved));
        assert_eq!(game.state().head(), Position::new(11, 10));
        assert_eq!(game.tick(t0 + ms(300)), None);
        assert_eq!(game.tick(t0 + ms(400)), Some(Step::Moved));
    }

    #[test]
    fn test_reversal_rejected() {
        let t0 = Instant::now();
        let mut game = started(t0);
        assert_eq!(game.handle_key(&key(KeyCode::Left), t0), Transition::Ignored);
        assert_eq!(game.state().direction, Direction::Right);
    }

    #[test]
    fn test_debounce_window() {
        let t0 = Instant::now();
        let mut game = started(t0);

        assert_eq!(game.handle_key(&key(KeyCode::Up), t0), Transition::Turned(Direction::Up));
        assert_eq!(game.handle_key(&key(KeyCode::Left), t0 + ms(150)), Transition::Ignored);
        assert_eq!(game.state().direction, Direction::Up);

        assert_eq!(
            game.handle_key(&key(KeyCode::Left), t0 + ms(200)),
            Transition::Turned(Direction::Left)
        );
    }

    #[test]
    fn test_capture_rearms_ticker() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.state.food = Position::new(11, 10);

        let t1 = t0 + ms(205);
        assert_eq!(game.tick(t1), Some(Step::Captured { delay_ms: 195 }));
        assert_eq!(game.state().snake.len(), 2);
        assert_eq!(game.next_deadline(), Some(t1 + ms(195)));
    }

    #[test]
    fn test_boundary_collision_resets_and_halts() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.state.snake = vec![Position::new(1, 10), Position::new(2, 10), Position::new(3, 10)].into();
        game.state.direction = Direction::Left;
        game.state.delay_ms = 150;

        assert_eq!(game.tick(t0 + ms(200)), Some(Step::Crashed(Collision::Boundary)));

        let state = game.state();
        assert!(!state.running);
        assert_eq!(state.snake, vec![Position::new(10, 10)]);
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.delay_ms, 200);
        assert_eq!(state.high_score, 2);
        assert_eq!(game.next_deadline(), None);
        assert_eq!(game.prompt(), Some(RESTART_PROMPT));
        assert_eq!(game.tick(t0 + ms(1000)), None);
    }

    #[test]
    fn test_high_score_survives_worse_game() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.state.snake = vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)].into();
        game.stop();
        assert_eq!(game.state().high_score, 2);

        game.start(t0);
        game.stop();
        assert_eq!(game.state().high_score, 2);
    }

    #[test]
    fn test_stop_request() {
        let t0 = Instant::now();
        let mut game = started(t0);
        assert_eq!(game.tick(t0 + ms(200)), Some(Step::Moved));

        assert_eq!(game.handle_key(&key(KeyCode::Esc), t0 + ms(250)), Transition::Stopped);
        assert!(!game.state().running);
        assert_eq!(game.next_deadline(), None);
        assert_eq!(game.state().head(), Position::new(10, 10));
        assert_eq!(game.prompt(), Some(RESTART_PROMPT));
    }

    #[test]
    fn test_restart_replaces_tick_stream() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.stop();

        let t1 = t0 + ms(50);
        assert_eq!(game.handle_key(&key(KeyCode::Char(' ')), t1), Transition::Started);
        assert_eq!(game.next_deadline(), Some(t1 + ms(200)));
        game.state.food = Position::new(1, 1);

        // Only one tick stream exists, so only one step happens per period
        assert_eq!(game.tick(t0 + ms(200)), None);
        assert_eq!(game.tick(t1 + ms(200)), Some(Step::Moved));
        assert_eq!(game.tick(t1 + ms(200)), None);
    }

    #[test]
    fn test_quit() {
        let mut game = controller();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(game.handle_key(&ctrl_c, Instant::now()), Transition::Quit);
    }

    #[test]
    fn test_segments_stay_distinct_over_play() {
        let t0 = Instant::now();
        let mut game = started(t0);
        let turns = [KeyCode::Down, KeyCode::Left, KeyCode::Up, KeyCode::Right];
        let mut now = t0;

        for i in 0..200 {
            now += ms(250);
            game.handle_key(&key(turns[i % 4]), now);
            now += ms(250);
            if let Some(Step::Crashed(_)) = game.tick(now) {
                break;
            }
            let snake = &game.state().snake;
            for (j, a) in snake.iter().enumerate() {
                assert!(!snake.iter().skip(j + 1).any(|b| b == a));
            }
            assert!(!snake.contains(&game.state().food));
        }
    }
}
