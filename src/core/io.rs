/// Player interaction boundary — typed output lines, line-based input,
/// and selection parsing.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// One piece of output shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Story text, rendered as a boxed panel.
    Narration(String),
    /// A numbered menu entry.
    Option { number: usize, text: String },
    /// Echo of the action the player took.
    Choice(String),
    /// A single status change, e.g. `health : -1`.
    StatusDelta { name: String, delta: i32 },
    /// Full status summary.
    Status(String),
    /// Turn banner from the session driver.
    Day(u32),
    /// Anything else: debug output, outcomes, hints.
    Notice(String),
}

/// Where narrators send output and read player input from.
pub trait PlayerIo {
    fn show(&mut self, line: Line);

    /// Read one line of input, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// What the player typed, after matching against the presented menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 1-based index into the presented options.
    Indexed(usize),
    /// Anything that is not a valid menu index.
    Freeform(String),
}

impl Selection {
    /// Numbers in `1..=count` select an option; everything else,
    /// including out-of-range numbers, is freeform text.
    pub fn parse_numbered(input: &str, count: usize) -> Selection {
        let trimmed = input.trim();
        match trimmed.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Selection::Indexed(n),
            _ => Selection::Freeform(trimmed.to_string()),
        }
    }

    /// Like `parse_numbered`, but `a`, `b`, `c`... also select options.
    pub fn parse_lettered(input: &str, count: usize) -> Selection {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                let n = (c.to_ascii_lowercase() as u8 - b'a') as usize + 1;
                if n <= count {
                    return Selection::Indexed(n);
                }
            }
        }
        Self::parse_numbered(trimmed, count)
    }
}

/// Keep asking until the player types something non-blank.
pub fn read_non_empty(io: &mut dyn PlayerIo, prompt: &str) -> io::Result<String> {
    loop {
        let line = io.read_line(prompt)?;
        if !line.trim().is_empty() {
            return Ok(line.trim().to_string());
        }
    }
}

/// Wrap text in a border, one line per input line.
pub fn bordered(content: &str, border: char) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let edge: String = std::iter::repeat(border).take(width + 4).collect();

    let mut out = String::new();
    out.push_str(&edge);
    out.push('\n');
    for line in lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("{border} {line}{} {border}\n", " ".repeat(pad)));
    }
    out.push_str(&edge);
    out
}

/// Renders to stdout and reads from stdin.
pub struct TerminalIo<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalIo<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalIo<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(line: &Line) -> String {
        match line {
            Line::Narration(text) => format!("{}\n", bordered(text, '#')),
            Line::Option { number, text } => format!("{number} : {text}"),
            Line::Choice(text) => format!("> {text}\n"),
            Line::StatusDelta { name, delta } => format!("{name} : {delta:+}"),
            Line::Status(summary) => format!("{summary}\n"),
            Line::Day(day) => format!("\n===== Day {day} =====\n"),
            Line::Notice(text) => text.clone(),
        }
    }
}

impl<R: BufRead, W: Write> PlayerIo for TerminalIo<R, W> {
    fn show(&mut self, line: Line) {
        let _ = writeln!(self.output, "{}", Self::render(&line));
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "player input closed",
            ));
        }
        writeln!(self.output)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Replays canned input and records every line shown.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    inputs: VecDeque<String>,
    pub transcript: Vec<Line>,
}

impl ScriptedIo {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Narration panels in the order they were shown.
    pub fn narrations(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|line| match line {
                Line::Narration(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Menu entries in the order they were shown.
    pub fn options(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|line| match line {
                Line::Option { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl PlayerIo for ScriptedIo {
    fn show(&mut self, line: Line) {
        self.transcript.push(line);
    }

    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.inputs.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted")
        })
    }
}
