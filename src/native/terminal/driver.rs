//! Crossterm terminal output.
//!
//! The `Driver` wraps a buffered stdout writer. It owns the terminal modes it
//! switches on (raw mode, alternate screen, mouse capture) and switches them
//! off again in `leave`.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event, execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::canvas::{CellStyle, CellUpdate};
use super::input::{from_crossterm, InputEvent};

pub struct Driver {
    writer: BufWriter<Stdout>,
    entered: bool,
}

impl Driver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(io::stdout()),
            entered: false,
        })
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Raw mode, alternate screen, mouse capture, hidden cursor.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            EnterAlternateScreen,
            event::EnableMouseCapture,
            event::EnableBracketedPaste,
            cursor::Hide
        )?;
        self.entered = true;
        Ok(())
    }

    pub fn leave(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        execute!(
            self.writer,
            cursor::Show,
            event::DisableBracketedPaste,
            event::DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        self.entered = false;
        Ok(())
    }

    /// Wait up to `timeout` for input, then drain whatever else is ready.
    pub fn read_input(&mut self, timeout: Duration) -> io::Result<Vec<InputEvent>> {
        let mut out = Vec::new();
        if !event::poll(timeout)? {
            return Ok(out);
        }
        loop {
            if let Some(input) = from_crossterm(event::read()?) {
                out.push(input);
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(out)
    }

    /// Queue a batch of cell updates; call `flush` to send them.
    pub fn apply_updates(&mut self, updates: &[CellUpdate]) -> io::Result<()> {
        for update in updates {
            queue!(self.writer, cursor::MoveTo(update.x, update.y))?;
            self.apply_cell_style(update.cell.style)?;
            queue!(
                self.writer,
                Print(update.cell.ch),
                SetAttribute(Attribute::Reset)
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Terminal size as (columns, rows).
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn apply_cell_style(&mut self, style: CellStyle) -> io::Result<()> {
        if style.bold {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.writer, SetAttribute(Attribute::Dim))?;
        }
        if style.underline {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }
        if style.reverse {
            queue!(self.writer, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
