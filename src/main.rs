use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{info, warn};
use std::fs::File;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use maze_runner::input::{command_for, level_for_digit, Command};
use maze_runner::render::{PlayerTween, Renderer};
use maze_runner::{
    Difficulty, Game, GameConfig, JsonFileStore, LevelOutcome, LevelState, MoveResult, Settings,
};

enum Screen {
    Menu,
    Difficulty { cursor: usize },
    Levels { cursor: u32 },
    Playing,
    Complete(LevelOutcome),
}

fn main() -> io::Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

// The alternate screen owns stderr, so logs only go to a file when asked.
fn init_logging(settings: &Settings) {
    let mut builder = env_logger::Builder::from_default_env();
    match &settings.log_file {
        Some(path) => match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("cannot open log file {}: {e}", path.display()),
        },
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn run(stdout: &mut Stdout, settings: &Settings) -> io::Result<()> {
    let store = JsonFileStore::new(&settings.progress_file);
    let mut game = Game::new(GameConfig::default(), store, settings.seed);
    let mut renderer = Renderer::new();
    let mut tween = PlayerTween::at(Default::default());
    let mut screen = Screen::Menu;
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    info!("progress file: {}", settings.progress_file.display());

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let Some(command) = command_for(key) else {
                        continue;
                    };
                    if command == Command::Quit {
                        return Ok(());
                    }
                    match handle(command, screen, &mut game, &mut renderer, &mut tween) {
                        Some(next) => screen = next,
                        None => return Ok(()),
                    }
                }
                Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        draw(stdout, &screen, &game, &mut renderer, &mut tween)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn handle(
    command: Command,
    screen: Screen,
    game: &mut Game<JsonFileStore>,
    renderer: &mut Renderer,
    tween: &mut PlayerTween,
) -> Option<Screen> {
    let next = match (screen, command) {
        (Screen::Menu, Command::Confirm) => Screen::Difficulty { cursor: 0 },
        (Screen::Menu, Command::Back) => return None,

        (Screen::Difficulty { cursor }, Command::Move(dir)) => {
            let (_, dy) = dir.delta();
            let len = Difficulty::ALL.len() as isize;
            let cursor = (cursor as isize + dy).rem_euclid(len) as usize;
            Screen::Difficulty { cursor }
        }
        (Screen::Difficulty { .. }, Command::Pick(n)) if (1..=3).contains(&n) => {
            game.select_difficulty(Difficulty::ALL[n as usize - 1]);
            Screen::Levels { cursor: 1 }
        }
        (Screen::Difficulty { cursor }, Command::Confirm) => {
            game.select_difficulty(Difficulty::ALL[cursor]);
            Screen::Levels { cursor: 1 }
        }
        (Screen::Difficulty { .. }, Command::Back) => Screen::Menu,

        (Screen::Levels { cursor }, Command::Move(dir)) => {
            let (dx, dy) = dir.delta();
            let total = game.config().total_levels as isize;
            let moved = (cursor as isize + dx + dy * 5).clamp(1, total);
            Screen::Levels {
                cursor: moved as u32,
            }
        }
        (Screen::Levels { .. }, Command::Pick(n)) => {
            let level = level_for_digit(n, game.config().total_levels);
            begin(game, level, renderer, tween).unwrap_or(Screen::Levels { cursor: level })
        }
        (Screen::Levels { cursor }, Command::Confirm) => {
            begin(game, cursor, renderer, tween).unwrap_or(Screen::Levels { cursor })
        }
        (Screen::Levels { .. }, Command::Back) => Screen::Difficulty {
            cursor: difficulty_index(game.difficulty()),
        },

        (Screen::Playing, Command::Move(dir)) => match game.move_player(dir) {
            Ok(MoveResult::Moved {
                completed: Some(outcome),
                ..
            }) => Screen::Complete(outcome),
            Ok(_) => Screen::Playing,
            Err(e) => {
                warn!("move rejected: {e}");
                Screen::Playing
            }
        },
        (Screen::Playing, Command::Restart) => restart(game, renderer, tween),
        (Screen::Playing, Command::Back) => Screen::Levels {
            cursor: game.session().map(|s| s.level()).unwrap_or(1),
        },

        (Screen::Complete(outcome), Command::Next) | (Screen::Complete(outcome), Command::Confirm) => {
            if game.has_next_level() {
                begin(game, outcome.level + 1, renderer, tween).unwrap_or(Screen::Complete(outcome))
            } else {
                Screen::Complete(outcome)
            }
        }
        (Screen::Complete(_), Command::Restart) => restart(game, renderer, tween),
        (Screen::Complete(outcome), Command::Map) | (Screen::Complete(outcome), Command::Back) => {
            Screen::Levels {
                cursor: outcome.level,
            }
        }

        (screen, _) => screen,
    };
    Some(next)
}

fn begin(
    game: &mut Game<JsonFileStore>,
    level: u32,
    renderer: &mut Renderer,
    tween: &mut PlayerTween,
) -> Option<Screen> {
    match game.start_level(level) {
        Ok(session) => {
            renderer.load_maze(session.grid());
            tween.snap(session.player());
            Some(Screen::Playing)
        }
        Err(e) => {
            warn!("cannot start level {level}: {e}");
            None
        }
    }
}

fn restart(game: &mut Game<JsonFileStore>, renderer: &mut Renderer, tween: &mut PlayerTween) -> Screen {
    match game.restart() {
        Ok(session) => {
            renderer.load_maze(session.grid());
            tween.snap(session.player());
            Screen::Playing
        }
        Err(e) => {
            warn!("restart failed: {e}");
            Screen::Menu
        }
    }
}

fn difficulty_index(difficulty: Difficulty) -> usize {
    Difficulty::ALL
        .iter()
        .position(|d| *d == difficulty)
        .unwrap_or(0)
}

fn draw(
    stdout: &mut Stdout,
    screen: &Screen,
    game: &Game<JsonFileStore>,
    renderer: &mut Renderer,
    tween: &mut PlayerTween,
) -> io::Result<()> {
    match screen {
        Screen::Playing => match game.session() {
            Some(session) => {
                tween.advance(session.player());
                renderer.draw_session(stdout, session, tween)
            }
            None => Ok(()),
        },
        other => renderer.draw_text(stdout, &panel(other, game)),
    }
}

fn panel(screen: &Screen, game: &Game<JsonFileStore>) -> Vec<String> {
    match screen {
        Screen::Menu => vec![
            "N E O N   M A Z E".to_string(),
            String::new(),
            "Enter to start, q to quit".to_string(),
        ],
        Screen::Difficulty { cursor } => {
            let mut lines = vec!["SELECT DIFFICULTY".to_string(), String::new()];
            for (i, d) in Difficulty::ALL.iter().enumerate() {
                let marker = if i == *cursor { ">" } else { " " };
                lines.push(format!("{marker} {}. {:<6}", i + 1, d.name().to_uppercase()));
            }
            lines.push(String::new());
            lines.push("arrows + Enter or 1-3, q back".to_string());
            lines
        }
        Screen::Levels { cursor } => {
            let mut lines = vec![
                format!("{} LEVELS", game.difficulty().name().to_uppercase()),
                String::new(),
            ];
            let rows = game.level_rows();
            for chunk in rows.chunks(5) {
                let line: Vec<String> = chunk
                    .iter()
                    .map(|(level, state)| {
                        let label = match state {
                            LevelState::Locked => "##".to_string(),
                            LevelState::Open => format!("{level:>2}"),
                            LevelState::Completed => format!("{level:>2}*"),
                        };
                        if level == cursor {
                            format!("[{label:>3}]")
                        } else {
                            format!(" {label:>3} ")
                        }
                    })
                    .collect();
                lines.push(line.join(" "));
            }
            lines.push(String::new());
            lines.push(format!("Score: {}", game.score()));
            lines.push("arrows + Enter, * completed, ## locked, q back".to_string());
            lines
        }
        Screen::Complete(outcome) => {
            let mut lines = vec![
                "LEVEL COMPLETE".to_string(),
                String::new(),
                format!("Level score: {}", outcome.level_score),
                format!("Time: {}s", outcome.elapsed_secs),
                format!("Total: {}", outcome.total_score),
                String::new(),
            ];
            if game.has_next_level() {
                lines.push("n next level, r replay, m level map".to_string());
            } else {
                lines.push("All levels cleared! r replay, m level map".to_string());
            }
            lines
        }
        Screen::Playing => Vec::new(),
    }
}
