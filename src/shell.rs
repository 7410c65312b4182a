//! Line-based menu that drives a single [`BitSet`].
//!
//! The shell owns its set and talks to any `BufRead`/`Write` pair, so the
//! binary wires it to stdin/stdout and tests feed it a transcript.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};
use thiserror::Error;

use crate::bitset::BitSet;

/// Shell parameters.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Universe size of the managed set; elements live in `[0, capacity)`.
    pub capacity: usize,
    /// Print the numbered menu before every prompt.
    pub show_menu: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            show_menu: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Add,
    Remove,
    Contains,
    Print,
    Exit,
}

impl FromStr for Choice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim() {
            "1" => Ok(Choice::Add),
            "2" => Ok(Choice::Remove),
            "3" => Ok(Choice::Contains),
            "4" => Ok(Choice::Print),
            "5" => Ok(Choice::Exit),
            _ => Err(()),
        }
    }
}

const MENU: &str = "\
1. Add an element
2. Remove an element
3. Check if an element exists
4. Print the set
5. Exit
";

pub struct Shell {
    cfg: ShellConfig,
    set: BitSet,
}

impl Shell {
    pub fn new(cfg: ShellConfig) -> Self {
        debug!("starting shell with capacity {}", cfg.capacity);
        let set = BitSet::with_size(cfg.capacity);
        Self { cfg, set }
    }

    pub fn bitset(&self) -> &BitSet {
        &self.set
    }

    /// Run the menu loop until the user exits or input ends.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), ShellError> {
        loop {
            if self.cfg.show_menu {
                output.write_all(MENU.as_bytes())?;
            }
            let Some(line) = prompt(&mut input, &mut output, "Enter your choice (1-5): ")? else {
                debug!("input closed, leaving shell");
                break;
            };

            let choice = match line.parse::<Choice>() {
                Ok(choice) => choice,
                Err(()) => {
                    writeln!(output, "Invalid choice. Please enter a valid option (1-5).")?;
                    continue;
                }
            };

            let label = match choice {
                Choice::Exit => break,
                Choice::Print => {
                    writeln!(output, "{}", self.set)?;
                    continue;
                }
                Choice::Add => "add",
                Choice::Remove => "remove",
                Choice::Contains => "check",
            };

            let Some(raw) = prompt(&mut input, &mut output, &format!("Enter the element to {label}: "))? else {
                break;
            };
            let element = match raw.trim().parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    writeln!(output, "Invalid element: {}", raw.trim())?;
                    continue;
                }
            };

            // Print and Exit were handled above.
            let outcome = match choice {
                Choice::Add => self.set.add(element).map(|()| None),
                Choice::Remove => self.set.remove(element).map(|()| None),
                _ => self.set.contains(element).map(Some),
            };
            match outcome {
                Ok(Some(exists)) => writeln!(output, "Element {element} exists: {exists}")?,
                Ok(None) => {}
                Err(e) => {
                    warn!("{label} {element} rejected: {e}");
                    writeln!(output, "Error: {e}")?;
                }
            }
        }
        output.flush()?;
        Ok(())
    }
}

/// Write `text`, flush, and read one line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<Option<String>> {
    output.write_all(text.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
