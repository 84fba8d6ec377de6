use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::types::{Rect, Size};

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(' ');
        }
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

#[cfg(test)]
impl ScreenBuffer {
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row(y).contains(needle))
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    /// Terminal-only commands (cursor visibility, alternate screen); ignored headless.
    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    pub fn clear_all(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, Clear(ClearType::All)),
            OutputTarget::ScreenBuffer(sb) => {
                sb.clear();
                Ok(())
            },
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, OutputTarget::ScreenBuffer(_))
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

// --- GameGrid: character grid the world is projected onto ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    world: Size,
}

impl GameGrid {
    pub fn new(width: u16, height: u16, world: Size) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            world,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    /// Maps a world-space rect to the half-open cell range `(x0, y0, x1, y1)`.
    ///
    /// Every non-empty rect covers at least one cell so small sprites stay visible.
    pub fn project(&self, rect: &Rect) -> (u16, u16, u16, u16) {
        let (x0, x1) = project_span(rect.left(), rect.right(), self.world.width, self.width);
        let (y0, y1) = project_span(rect.top(), rect.bottom(), self.world.height, self.height);
        (x0, y0, x1, y1)
    }

    pub fn fill_rect(&mut self, rect: &Rect, c: char) {
        let (x0, y0, x1, y1) = self.project(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_char(x, y, c);
            }
        }
    }

    pub fn put_str(&mut self, x: u16, y: u16, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_char(x.saturating_add(i as u16), y, c);
        }
    }

    pub fn put_str_centered(&mut self, y: u16, text: &str) {
        let len = text.chars().count() as u16;
        let x = (self.width / 2).saturating_sub(len / 2);
        self.put_str(x, y, text);
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }
}

fn project_span(start: i32, end: i32, world_len: i32, cells: u16) -> (u16, u16) {
    if cells == 0 || world_len <= 0 || end <= 0 || start >= world_len {
        return (0, 0);
    }
    let n = cells as i64;
    let len = world_len as i64;
    let first = start.max(0) as i64 * n / len;
    // Round the far edge up so partial cells are covered.
    let last = (end.min(world_len) as i64 * n + len - 1) / len;
    let last = last.max(first + 1).min(n);
    (first as u16, last as u16)
}
