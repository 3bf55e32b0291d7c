//! G-code stream parser with modal state tracking

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::command::{Command, CommandKind};
use crate::error::{ParseError, Result};
use crate::state::EPSILON;

/// Stream parser
///
/// Converts raw G-code text into an ordered sequence of [`Command`]s.
/// Tracks the motion-mode (G90/G91) and extrusion-mode (M82/M83) directives
/// as they appear and attaches the *effective* mode to each subsequent
/// command, so callers never replay modal directives themselves. A running
/// absolute-E accumulator lets the parser classify retractions and primes
/// even in relative-E streams.
pub struct StreamParser {
    absolute_xyz: bool,
    absolute_e: bool,
    current_e: f64,
}

impl StreamParser {
    /// Create a new parser in the default modal state (absolute XYZ and E)
    pub fn new() -> Self {
        Self {
            absolute_xyz: true,
            absolute_e: true,
            current_e: 0.0,
        }
    }

    /// Parse a complete raw G-code text into an ordered command sequence
    ///
    /// Fails with [`ParseError`] only on structurally malformed numeric
    /// fields of recognized motion commands. Comments, blank lines, and
    /// unrecognized directives are preserved verbatim as passthrough
    /// commands.
    pub fn parse(&mut self, raw: &str) -> Result<Vec<Command>> {
        self.absolute_xyz = true;
        self.absolute_e = true;
        self.current_e = 0.0;

        let body = raw.strip_suffix('\n').unwrap_or(raw);
        let mut commands = Vec::new();

        for (idx, line) in body.split('\n').enumerate() {
            let line_number = (idx + 1) as u32;
            commands.push(self.parse_line(line, line_number)?);
        }

        debug!("Parsed {} commands from {} bytes", commands.len(), raw.len());
        Ok(commands)
    }

    fn parse_line(&mut self, line: &str, line_number: u32) -> Result<Command> {
        let trimmed = line.trim();

        if trimmed.starts_with(';') {
            let mut cmd = self.passthrough(line, line_number);
            if let Some(caps) = layer_marker_regex().captures(trimmed) {
                // The capture is \d+ so parsing cannot fail
                if let Ok(layer) = caps[1].parse::<i32>() {
                    cmd.kind = CommandKind::LayerChange;
                    cmd.layer = Some(layer);
                }
            }
            return Ok(cmd);
        }

        let code_text = strip_comments(line);
        let stripped = code_text.trim();
        if stripped.is_empty() {
            return Ok(self.passthrough(line, line_number));
        }

        let mut tokens = stripped.split_whitespace();
        let head = tokens.next().unwrap_or("");
        let Some(first) = head.chars().next() else {
            return Ok(self.passthrough(line, line_number));
        };
        let letter = first.to_ascii_uppercase();
        let code = match head[first.len_utf8()..].parse::<f64>() {
            Ok(value) => value as i64,
            Err(_) => return Ok(self.passthrough(line, line_number)),
        };

        match (letter, code) {
            ('G', 0..=3) => {
                let mut cmd = self.passthrough(line, line_number);
                self.parse_axis_words(tokens, line_number, &mut cmd)?;
                cmd.kind = self.classify_move(&cmd);
                Ok(cmd)
            }
            ('G', 92) => {
                let mut cmd = self.passthrough(line, line_number);
                self.parse_axis_words(tokens, line_number, &mut cmd)?;
                cmd.kind = CommandKind::PositionReset;
                if let Some(e) = cmd.e {
                    // G92 E values are absolute regardless of M82/M83
                    self.current_e = e;
                }
                Ok(cmd)
            }
            ('G', 90) => {
                self.absolute_xyz = true;
                Ok(self.passthrough(line, line_number))
            }
            ('G', 91) => {
                self.absolute_xyz = false;
                Ok(self.passthrough(line, line_number))
            }
            ('M', 82) => {
                self.absolute_e = true;
                Ok(self.passthrough(line, line_number))
            }
            ('M', 83) => {
                self.absolute_e = false;
                Ok(self.passthrough(line, line_number))
            }
            _ => Ok(self.passthrough(line, line_number)),
        }
    }

    /// Build a passthrough command carrying the current effective modes
    fn passthrough(&self, line: &str, line_number: u32) -> Command {
        let mut cmd = Command::passthrough(line, line_number);
        cmd.absolute_xyz = self.absolute_xyz;
        cmd.absolute_e = self.absolute_e;
        cmd
    }

    fn parse_axis_words<'a>(
        &self,
        tokens: impl Iterator<Item = &'a str>,
        line_number: u32,
        cmd: &mut Command,
    ) -> Result<()> {
        for token in tokens {
            let Some(first) = token.chars().next() else {
                continue;
            };
            let word = first.to_ascii_uppercase();
            if !matches!(word, 'X' | 'Y' | 'Z' | 'E' | 'F') {
                continue;
            }
            let value: f64 = token[first.len_utf8()..].parse().map_err(|_| {
                ParseError::InvalidNumber {
                    line_number,
                    word,
                    value: token.to_string(),
                }
            })?;
            match word {
                'X' => cmd.x = Some(value),
                'Y' => cmd.y = Some(value),
                'Z' => cmd.z = Some(value),
                'E' => cmd.e = Some(value),
                'F' => cmd.f = Some(value),
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    /// Classify a G0-G3 move by its effect on the filament accumulator
    fn classify_move(&mut self, cmd: &Command) -> CommandKind {
        let Some(e_word) = cmd.e else {
            return CommandKind::TravelMove;
        };
        let new_e = if self.absolute_e {
            e_word
        } else {
            self.current_e + e_word
        };
        let delta = new_e - self.current_e;
        self.current_e = new_e;
        if delta < -EPSILON {
            CommandKind::Retraction
        } else if delta > EPSILON {
            CommandKind::ExtrusionMove
        } else {
            CommandKind::TravelMove
        }
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a raw G-code text with a fresh [`StreamParser`]
pub fn parse(raw: &str) -> Result<Vec<Command>> {
    StreamParser::new().parse(raw)
}

/// Remove `;` and `(` comments from a line, leaving the code part
fn strip_comments(line: &str) -> String {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    regex.replace(line, "").to_string()
}

fn layer_marker_regex() -> &'static Regex {
    static LAYER_REGEX: OnceLock<Regex> = OnceLock::new();
    LAYER_REGEX.get_or_init(|| Regex::new(r"^;LAYER:(-?\d+)").expect("invalid regex pattern"))
}
