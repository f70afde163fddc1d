//! A four-function calculator in the terminal.
//!
//! Run with:
//! `cargo run --example calculator`
//!
//! Tab moves between buttons, Enter presses one, Esc quits. Set
//! `RUST_LOG=gridwin=debug` to watch the window being built on stderr.

use std::time::Duration;

use gridwin::prelude::*;
use tracing_subscriber::EnvFilter;

/// Left operand, pending operator and the digits being typed.
#[derive(Default)]
struct Calculator {
    acc: Option<f64>,
    op: Option<char>,
    entry: String,
}

impl Calculator {
    fn press(&mut self, key: &str) {
        match key {
            "C" => *self = Self::default(),
            "=" => {
                self.apply();
                self.op = None;
            }
            "+" | "-" | "*" | "/" => {
                self.apply();
                self.op = key.chars().next();
            }
            "." if self.entry.contains('.') => {}
            digit => self.entry.push_str(digit),
        }
    }

    /// Fold the current entry into the accumulator.
    fn apply(&mut self) {
        let Ok(rhs) = self.entry.parse::<f64>() else {
            return;
        };
        self.acc = Some(match (self.acc, self.op) {
            (Some(lhs), Some('+')) => lhs + rhs,
            (Some(lhs), Some('-')) => lhs - rhs,
            (Some(lhs), Some('*')) => lhs * rhs,
            (Some(lhs), Some('/')) => lhs / rhs,
            _ => rhs,
        });
        self.entry.clear();
    }

    fn display(&self) -> String {
        if !self.entry.is_empty() {
            return self.entry.clone();
        }
        match self.acc {
            Some(v) if v.is_finite() => v.to_string(),
            Some(_) => "error".into(),
            None => "0".into(),
        }
    }
}

fn pad(text: &str) -> Button {
    Button::new(text)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let layout = layout![
        [TextField::new("0").width(18).key("display")],
        [pad("7"), pad("8"), pad("9"), pad("/")],
        [pad("4"), pad("5"), pad("6"), pad("*")],
        [pad("1"), pad("2"), pad("3"), pad("-")],
        [pad("0"), pad("."), pad("="), pad("+")],
        [pad("C")],
    ];
    let config = WindowConfig::new("Calculator").with_hidden(false);
    let mut window = Window::new(config, layout, TerminalBackend::new()?)?;
    let mut calc = Calculator::default();

    loop {
        let (event, _values) = window.poll(Duration::from_millis(100));
        match event {
            Some(e) if e.is_close() => break,
            Some(Event::Widget(key)) if key != "display" => {
                calc.press(&key);
                window.set("display", calc.display());
            }
            _ => {}
        }
    }
    Ok(())
}
