use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};

use crate::game::{self, Command, Game, TickResult, View};
use crate::highscore::HighScoreFile;

/// Everything the loop needs from the outside world: input, drawing and the
/// pause between ticks.
pub trait Frontend {
    /// Commands that arrived since the last call. Must not block.
    fn poll_commands(&mut self) -> Result<Vec<Command>>;
    /// Called before the first frame of every round.
    fn start_round(&mut self) -> Result<()>;
    fn draw(&mut self, view: &View) -> Result<()>;
    fn game_over(&mut self, view: &View, report: &RoundReport) -> Result<()>;
    /// Blocks until the player answers the play-again prompt.
    fn ask_play_again(&mut self) -> Result<bool>;
    fn wait(&mut self, delay: Duration);
}

/// How a round ended, as shown on the game over screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub score: u32,
    pub previous_high: u32,
    pub high_score: u32,
    pub new_record: bool,
    pub won: bool,
    pub save_error: Option<String>,
    /// The tick that ended the round: `Crashed`, `Quit` or `BoardFull`.
    pub ended_by: TickResult,
}

pub struct App<F: Frontend> {
    frontend: F,
    game: Game,
    scores: HighScoreFile,
    high_score: u32,
}

impl<F: Frontend> App<F> {
    pub fn new(frontend: F, game: Game, scores: HighScoreFile) -> Self {
        let high_score = scores.load();
        App { frontend, game, scores, high_score }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[cfg(test)]
    fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn into_frontend(self) -> F {
        self.frontend
    }

    /// Plays rounds until the player declines another one.
    pub fn run(&mut self) -> Result<()> {
        let mut round = 1;

        loop {
            info!("Starting round {}", round);
            let ended_by = self.play_round()?;

            let report = self.finish_round(ended_by);
            self.frontend.game_over(&self.game.view(self.high_score), &report)?;

            if !self.frontend.ask_play_again()? {
                info!("Player left after {} round(s), high score {}", round, self.high_score);
                return Ok(());
            }

            self.game.reset();
            round += 1;
        }
    }

    /// Runs ticks until the round is over and returns the tick that ended it.
    fn play_round(&mut self) -> Result<TickResult> {
        self.frontend.start_round()?;
        self.frontend.draw(&self.game.view(self.high_score))?;

        let mut last = TickResult::Idle;
        while !self.game.is_over() {
            self.frontend.wait(game::tick_delay(self.game.score()));

            let commands = self.frontend.poll_commands()?;
            last = self.game.tick(commands);
            if last == TickResult::Ate {
                debug!("Speed now {:?} per tick", game::tick_delay(self.game.score()));
            }
            self.frontend.draw(&self.game.view(self.high_score))?;
        }

        Ok(last)
    }

    fn finish_round(&mut self, ended_by: TickResult) -> RoundReport {
        let score = self.game.score();
        let previous_high = self.high_score;
        let new_record = score > previous_high;
        let mut save_error = None;

        info!("Round over ({:?}) with score {}", ended_by, score);

        if new_record {
            self.high_score = score;
            match self.scores.save(score) {
                Ok(()) => info!("New high score {} saved to {}", score, self.scores.path().display()),
                Err(e) => {
                    error!("{}", e);
                    save_error = Some(e.to_string());
                }
            }
        }

        RoundReport {
            score,
            previous_high,
            high_score: self.high_score,
            new_record,
            won: self.game.won(),
            save_error,
            ended_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    /// Replays a fixed script of inputs and remembers what it was asked to
    /// show.
    #[derive(Default)]
    struct ScriptedFrontend {
        commands: VecDeque<Vec<Command>>,
        answers: VecDeque<bool>,
        rounds: usize,
        frames: usize,
        paused_frames: usize,
        reports: Vec<RoundReport>,
        waits: Vec<Duration>,
    }

    impl Frontend for ScriptedFrontend {
        fn poll_commands(&mut self) -> Result<Vec<Command>> {
            Ok(self.commands.pop_front().unwrap_or_default())
        }

        fn start_round(&mut self) -> Result<()> {
            self.rounds += 1;
            self.frames = 0;
            Ok(())
        }

        fn draw(&mut self, view: &View) -> Result<()> {
            self.frames += 1;
            if view.state == GameState::Paused {
                self.paused_frames += 1;
            }
            Ok(())
        }

        fn game_over(&mut self, _view: &View, report: &RoundReport) -> Result<()> {
            self.reports.push(report.clone());
            Ok(())
        }

        fn ask_play_again(&mut self) -> Result<bool> {
            Ok(self.answers.pop_front().unwrap_or(false))
        }

        fn wait(&mut self, delay: Duration) {
            self.waits.push(delay);
        }
    }

    fn app_in(dir: &TempDir, frontend: ScriptedFrontend) -> App<ScriptedFrontend> {
        let scores = HighScoreFile::new(dir.path().join("highscore.txt"));
        App::new(frontend, Game::new(StdRng::seed_from_u64(3)), scores)
    }

    #[test]
    fn test_quit_then_decline() {
        let dir = TempDir::new().unwrap();
        let frontend = ScriptedFrontend {
            commands: vec![vec![Command::Quit]].into(),
            ..Default::default()
        };
        let mut app = app_in(&dir, frontend);

        app.run().unwrap();

        let reports = &app.frontend().reports;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].score, 0);
        assert_eq!(reports[0].ended_by, TickResult::Quit);
        assert!(!reports[0].new_record);
        assert_eq!(app.high_score(), 0);
        assert_eq!(app.frontend().waits, vec![Duration::from_millis(150)]);
    }

    #[test]
    fn test_round_runs_until_crash() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, ScriptedFrontend::default());

        app.run().unwrap();

        let report = &app.frontend().reports[0];
        assert!(app.game.is_over());
        assert!(!report.won);
        assert_eq!(report.ended_by, TickResult::Crashed);
        assert_eq!(report.high_score, report.score);
        assert_eq!(report.new_record, report.score > 0);
        let saved = fs::read_to_string(dir.path().join("highscore.txt")).unwrap();
        assert_eq!(saved, report.score.to_string());
    }

    #[test]
    fn test_high_score_survives_rounds() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("highscore.txt"), "500").unwrap();
        let frontend = ScriptedFrontend {
            commands: vec![vec![Command::Quit], vec![Command::Quit]].into(),
            answers: vec![true, false].into(),
            ..Default::default()
        };
        let mut app = app_in(&dir, frontend);

        app.run().unwrap();

        let reports = &app.frontend().reports;
        assert_eq!(reports.len(), 2);
        // Each round starts from a freshly cleared screen.
        assert_eq!(app.frontend().rounds, 2);
        assert!(reports.iter().all(|r| r.previous_high == 500 && r.high_score == 500));
        assert_eq!(app.high_score(), 500);
    }

    #[test]
    fn test_pause_keeps_drawing() {
        let dir = TempDir::new().unwrap();
        let frontend = ScriptedFrontend {
            commands: vec![vec![Command::TogglePause], vec![], vec![], vec![Command::Quit]].into(),
            ..Default::default()
        };
        let mut app = app_in(&dir, frontend);

        app.run().unwrap();

        assert_eq!(app.frontend().frames, 5);
        assert_eq!(app.frontend().paused_frames, 3);
        assert_eq!(app.game.view(0).snake.head(), crate::grid::center());
    }

    #[test]
    fn test_failed_save_is_reported() {
        let dir = TempDir::new().unwrap();
        let scores = HighScoreFile::new(dir.path().join("gone").join("highscore.txt"));
        let mut app = App::new(ScriptedFrontend::default(), Game::new(StdRng::seed_from_u64(3)), scores);
        let (mid_x, mid_y) = crate::grid::center();
        app.game.set_food((mid_x + 1, mid_y));

        app.run().unwrap();

        let report = &app.frontend().reports[0];
        assert!(report.new_record);
        assert!(report.score >= 10);
        assert!(report.save_error.is_some());
        assert_eq!(app.high_score(), report.score);
    }
}
