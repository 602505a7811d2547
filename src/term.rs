use std::{io::{Stdout, Write, stdout}, thread::sleep, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use log::{debug, error, warn};

use crate::app::{Frontend, RoundReport};
use crate::game::{Command, GameState, View};
use crate::grid::{Coords, HEIGHT, WIDTH};
use crate::input;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const EMPTY_CHAR: char = ' ';

// The board plus its border, then the status and controls lines.
const SCREEN_WIDTH: u16 = WIDTH as u16 + 2;
const SCREEN_HEIGHT: u16 = HEIGHT as u16 + 4;
const STATUS_ROW: u16 = HEIGHT as u16 + 2;
const CONTROLS_ROW: u16 = HEIGHT as u16 + 3;

const CONTROLS: &str = "W/A/S/D or arrows | P = pause | Q = quit";

// Message boxes pad each line with one column on either side.
const MAX_MESSAGE_LINE: usize = SCREEN_WIDTH as usize - 2;

const PAUSED_LINES: [&str; 2] = ["== PAUSED ==", "P to resume, Q to quit"];

/// Crossterm-backed frontend. Owns the terminal between `setup` and
/// `restore`.
pub struct TermManager {
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout() }
    }

    /// `setup`, undoing whatever part of it already happened if it fails.
    pub fn enter(&mut self) -> Result<()> {
        setup_or_restore(self, Self::setup, Self::restore)
    }

    fn setup(&mut self) -> Result<()> {
        match terminal::size() {
            Ok((w, h)) if w < SCREEN_WIDTH || h < SCREEN_HEIGHT => {
                warn!("Terminal is {}x{}, the board needs {}x{}", w, h, SCREEN_WIDTH, SCREEN_HEIGHT);
            }
            Ok(_) => {}
            Err(e) => warn!("Could not read terminal size: {}", e),
        }

        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
            .context("Error preparing screen")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(ev);
            }
        }
    }

    fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::ZERO).context("Error polling input")? {
            if let Event::Key(ev) = read().context("Error reading key")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    fn draw_borders(&mut self) -> Result<()> {
        let end_x = SCREEN_WIDTH - 1;
        let end_y = HEIGHT as u16 + 1;

        for x in 0..SCREEN_WIDTH {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        Ok(())
    }

    /// Redraws every cell of the board, row by row.
    fn draw_board(&mut self, view: &View, body_char: char) -> Result<()> {
        let snake = view.snake;
        let mut cells = vec![vec![EMPTY_CHAR; WIDTH as usize]; HEIGHT as usize];

        if let Some(cell) = cell_mut(&mut cells, view.food) {
            *cell = FOOD_CHAR;
        }
        for pos in snake.body().iter().skip(1) {
            if let Some(cell) = cell_mut(&mut cells, *pos) {
                *cell = body_char;
            }
        }
        // The head may be sitting off the board after a crash.
        let head_char = if body_char == DEAD_SNAKE_CHAR {DEAD_SNAKE_CHAR} else {snake.head_char()};
        if let Some(cell) = cell_mut(&mut cells, snake.head()) {
            *cell = head_char;
        }

        for (y, row) in cells.iter().enumerate() {
            let line: String = row.iter().collect();
            queue!(self.stdout, cursor::MoveTo(1, y as u16 + 1), style::Print(line))?;
        }

        Ok(())
    }

    fn draw_status(&mut self, view: &View) -> Result<()> {
        let status = format!("Score: {}    Highscore: {}", view.score, view.high_score);
        self.print_line(STATUS_ROW, &status)?;
        self.print_line(CONTROLS_ROW, CONTROLS)
    }

    /// Centered box over the board, as in the pause and game over screens.
    fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as u16;
        let center = (SCREEN_WIDTH / 2, HEIGHT as u16 / 2 + 1);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        let blank = " ".repeat(msg_width as usize);
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            queue!(self.stdout, cursor::MoveTo(top_left.0, *y), style::Print(&blank))?;
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(padded_line))?;
        }

        Ok(())
    }

    fn print_at(&mut self, pos: (u16, u16), ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }

    fn print_line(&mut self, row: u16, text: &str) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            style::Print(text)
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }
}

impl Frontend for TermManager {
    fn poll_commands(&mut self) -> Result<Vec<Command>> {
        let commands: Vec<Command> = self.read_key_events_queue()?
            .iter()
            .filter_map(input::command_for)
            .collect();

        if !commands.is_empty() {
            debug!("Input: {:?}", commands);
        }
        Ok(commands)
    }

    fn draw(&mut self, view: &View) -> Result<()> {
        self.draw_borders()?;
        self.draw_board(view, SNAKE_BODY_CHAR)?;
        self.draw_status(view)?;

        if view.state == GameState::Paused {
            self.show_message(&PAUSED_LINES)?;
        }

        self.flush()
    }

    fn start_round(&mut self) -> Result<()> {
        // Wipe whatever the last game over box left outside the board.
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing screen")?;
        Ok(())
    }

    fn game_over(&mut self, view: &View, report: &RoundReport) -> Result<()> {
        // Keys mashed right before the end shouldn't answer the prompt.
        self.read_key_events_queue()?;

        let body_char = if report.won {SNAKE_BODY_CHAR} else {DEAD_SNAKE_CHAR};
        self.draw_borders()?;
        self.draw_board(view, body_char)?;
        self.draw_status(view)?;

        if let Some(err) = &report.save_error {
            warn!("Shown to player: {}", err);
        }

        let lines = game_over_lines(report);
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.show_message(&lines)?;
        self.flush()
    }

    fn ask_play_again(&mut self) -> Result<bool> {
        loop {
            if let Some(answer) = input::play_again_answer(&self.read_key_blocking()?) {
                return Ok(answer);
            }
        }
    }

    fn wait(&mut self, delay: Duration) {
        sleep(delay);
    }
}

fn setup_or_restore<T>(
    term: &mut T,
    setup: fn(&mut T) -> Result<()>,
    restore: fn(&mut T) -> Result<()>,
) -> Result<()> {
    if let Err(e) = setup(term) {
        // Setup can fail halfway, after the alternate screen is already up
        if let Err(restore_err) = restore(term) {
            error!("Failed to restore terminal: {:#}", restore_err);
        }
        return Err(e);
    }
    Ok(())
}

/// Contents of the game over box. Every line fits inside the board width,
/// even with ten-digit scores.
fn game_over_lines(report: &RoundReport) -> Vec<String> {
    let title = if report.won {"=== YOU WON ==="} else {"=== GAME OVER ==="};
    let mut lines = vec![title.to_string(), String::new(), format!("Score: {}", report.score)];

    if report.new_record {
        lines.push("New Highscore!".to_string());
        lines.push(format!("Old: {}", report.previous_high));
        lines.push(format!("New: {}", report.high_score));
    } else {
        lines.push(format!("Highscore: {}", report.high_score));
    }

    if report.save_error.is_some() {
        lines.push(String::new());
        lines.push("Highscore not saved!".to_string());
    }

    lines.push(String::new());
    lines.push("Play again? (Y/N)".to_string());
    lines
}

fn cell_mut(cells: &mut [Vec<char>], pos: Coords) -> Option<&mut char> {
    let x = usize::try_from(pos.0).ok()?;
    let y = usize::try_from(pos.1).ok()?;
    cells.get_mut(y)?.get_mut(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TickResult;

    fn report(new_record: bool, won: bool, save_error: Option<String>) -> RoundReport {
        RoundReport {
            score: u32::MAX,
            previous_high: u32::MAX - 10,
            high_score: u32::MAX,
            new_record,
            won,
            save_error,
            ended_by: TickResult::Crashed,
        }
    }

    fn widest(lines: &[String]) -> usize {
        lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    #[test]
    fn test_game_over_box_fits_the_board() {
        let cases = [
            report(false, false, None),
            report(true, false, None),
            report(true, true, None),
            report(true, false, Some("disk full".to_string())),
        ];

        for case in &cases {
            let lines = game_over_lines(case);
            assert!(widest(&lines) <= MAX_MESSAGE_LINE, "{:?}", lines);
        }
    }

    #[test]
    fn test_new_record_lines() {
        let mut case = report(true, false, Some("disk full".to_string()));
        case.score = 120;
        case.previous_high = 100;
        case.high_score = 120;

        let lines = game_over_lines(&case);

        assert_eq!(lines[0], "=== GAME OVER ===");
        assert!(lines.contains(&"New Highscore!".to_string()));
        assert!(lines.contains(&"Old: 100".to_string()));
        assert!(lines.contains(&"New: 120".to_string()));
        assert!(lines.contains(&"Highscore not saved!".to_string()));
        assert_eq!(lines.last().unwrap(), "Play again? (Y/N)");
    }

    #[test]
    fn test_pause_box_fits_the_board() {
        assert!(PAUSED_LINES.iter().all(|l| l.chars().count() <= MAX_MESSAGE_LINE));
    }

    #[derive(Default)]
    struct FakeTerm {
        alt_screen: bool,
        restores: usize,
    }

    fn half_setup(term: &mut FakeTerm) -> Result<()> {
        term.alt_screen = true;
        anyhow::bail!("raw mode unavailable")
    }

    fn full_setup(term: &mut FakeTerm) -> Result<()> {
        term.alt_screen = true;
        Ok(())
    }

    fn fake_restore(term: &mut FakeTerm) -> Result<()> {
        term.alt_screen = false;
        term.restores += 1;
        Ok(())
    }

    #[test]
    fn test_failed_setup_gives_the_terminal_back() {
        let mut term = FakeTerm::default();

        let err = setup_or_restore(&mut term, half_setup, fake_restore).unwrap_err();

        assert!(err.to_string().contains("raw mode"));
        assert!(!term.alt_screen);
        assert_eq!(term.restores, 1);
    }

    #[test]
    fn test_successful_setup_keeps_the_terminal() {
        let mut term = FakeTerm::default();

        setup_or_restore(&mut term, full_setup, fake_restore).unwrap();

        assert!(term.alt_screen);
        assert_eq!(term.restores, 0);
    }

    #[test]
    fn test_cell_lookup_ignores_off_board() {
        let mut cells = vec![vec![EMPTY_CHAR; WIDTH as usize]; HEIGHT as usize];

        assert!(cell_mut(&mut cells, (-1, 0)).is_none());
        assert!(cell_mut(&mut cells, (0, HEIGHT)).is_none());
        assert!(cell_mut(&mut cells, (WIDTH, 0)).is_none());

        *cell_mut(&mut cells, (WIDTH - 1, HEIGHT - 1)).unwrap() = FOOD_CHAR;
        assert_eq!(cells[HEIGHT as usize - 1][WIDTH as usize - 1], FOOD_CHAR);
    }
}
