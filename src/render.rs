use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::maze::{Dir, Grid, Position};
use crate::session::GameSession;

const CELL_W: usize = 2;
const TWEEN_FACTOR: f32 = 0.2;
const WALL_COLOR: Color = Color::Cyan;
const PLAYER_COLOR: Color = Color::Magenta;
const GOAL_COLOR: Color = Color::Green;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
}

/// Expands the cell grid into a `(2*cols+1) x (2*rows+1)` tile raster.
/// Cells sit on odd coordinates, walls between them.
pub fn rasterize(grid: &Grid) -> Vec<Vec<Tile>> {
    let width = grid.cols() * 2 + 1;
    let height = grid.rows() * 2 + 1;
    let mut tiles = vec![vec![Tile::Wall; width]; height];
    for cell in grid.cells() {
        let gx = cell.pos.col * 2 + 1;
        let gy = cell.pos.row * 2 + 1;
        tiles[gy][gx] = Tile::Floor;
        if !cell.has_wall(Dir::Right) && grid.neighbor(cell.pos, Dir::Right).is_some() {
            tiles[gy][gx + 1] = Tile::Floor;
        }
        if !cell.has_wall(Dir::Down) && grid.neighbor(cell.pos, Dir::Down).is_some() {
            tiles[gy + 1][gx] = Tile::Floor;
        }
    }
    tiles
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTween {
    pub x: f32,
    pub y: f32,
}

impl PlayerTween {
    pub fn at(pos: Position) -> Self {
        Self {
            x: pos.col as f32,
            y: pos.row as f32,
        }
    }

    pub fn snap(&mut self, pos: Position) {
        *self = Self::at(pos);
    }

    pub fn advance(&mut self, target: Position) {
        self.x += (target.col as f32 - self.x) * TWEEN_FACTOR;
        self.y += (target.row as f32 - self.y) * TWEEN_FACTOR;
    }

    /// Nearest raster tile, so the token slides through the gap between cells.
    pub fn tile(&self) -> (usize, usize) {
        let tx = (self.x * 2.0 + 1.0).round().max(0.0) as usize;
        let ty = (self.y * 2.0 + 1.0).round().max(0.0) as usize;
        (tx, ty)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Goal,
    Wall,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

pub struct Renderer {
    tiles: Vec<Vec<Tile>>,
    last: Vec<Cell>,
    last_hud: String,
    last_text: Vec<String>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            last: Vec::new(),
            last_hud: String::new(),
            last_text: Vec::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn load_maze(&mut self, grid: &Grid) {
        self.tiles = rasterize(grid);
        let len = self.tiles.len() * self.tiles.first().map(|r| r.len()).unwrap_or(0);
        self.last = vec![BLANK; len];
        self.needs_full = true;
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
        self.last_text.clear();
    }

    pub fn draw_session<W: Write>(
        &mut self,
        out: &mut W,
        session: &GameSession,
        tween: &PlayerTween,
    ) -> io::Result<()> {
        let height = self.tiles.len();
        let width = self.tiles.first().map(|r| r.len()).unwrap_or(0);
        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
            self.last_text.clear();
        }

        let hud = hud_line(session);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let player = tween.tile();
        let goal = (session.goal().col * 2 + 1, session.goal().row * 2 + 1);
        for y in 0..height {
            for x in 0..width {
                let cell = if (x, y) == player {
                    Cell {
                        glyph: Glyph::Player,
                        color: PLAYER_COLOR,
                    }
                } else if (x, y) == goal {
                    Cell {
                        glyph: Glyph::Goal,
                        color: GOAL_COLOR,
                    }
                } else if self.tiles[y][x] == Tile::Wall {
                    Cell {
                        glyph: Glyph::Wall,
                        color: WALL_COLOR,
                    }
                } else {
                    BLANK
                };
                let idx = y * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }
        self.needs_full = false;
        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "◉",
            Glyph::Goal => "◎",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
        };
        out.queue(MoveTo(
            self.origin_x + (x * CELL_W) as u16,
            self.origin_y + y as u16,
        ))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }

    pub fn draw_text<W: Write>(&mut self, out: &mut W, lines: &[String]) -> io::Result<()> {
        if self.last_text.as_slice() == lines {
            return Ok(());
        }
        let size = terminal::size()?;
        self.paint_text(out, lines, size)
    }

    // `invalidate` forces a repaint of identical lines.
    fn paint_text<W: Write>(&mut self, out: &mut W, lines: &[String], size: (u16, u16)) -> io::Result<()> {
        if self.last_text.as_slice() == lines {
            return Ok(());
        }
        let (term_w, term_h) = size;
        out.queue(Clear(ClearType::All))?;
        let top = term_h.saturating_sub(lines.len() as u16) / 2;
        for (i, line) in lines.iter().enumerate() {
            let w = UnicodeWidthStr::width(line.as_str()) as u16;
            out.queue(MoveTo(term_w.saturating_sub(w) / 2, top + i as u16))?;
            out.queue(Print(line))?;
        }
        out.flush()?;
        self.last_text = lines.to_vec();
        // the maze repaints in full after a panel
        self.needs_full = true;
        Ok(())
    }
}

pub fn format_clock(elapsed_secs: u64) -> String {
    format!("{:02}:{:02}", elapsed_secs / 60, elapsed_secs % 60)
}

fn hud_line(session: &GameSession) -> String {
    format!(
        "{}  Level: {}  Score: {}  Time: {}  (r restart, q levels)",
        session.difficulty().name().to_uppercase(),
        session.level(),
        session.score(),
        format_clock(session.elapsed_secs())
    )
}
