//! Event DSL parser for headless mode.
//!
//! Parses event strings like "key:enter", "select:12. Brightest asteroid
//! (lowest magnitude)" or "wait:100ms" into executable events.

use crate::error::{Result, TrackerError};
use crate::tui::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::time::Duration;

/// An assertion to check against the screen or state.
#[derive(Debug, Clone)]
pub enum Assertion {
    /// Screen contains text (case-insensitive).
    Contains(String),
    /// Screen contains text (case-sensitive).
    ContainsExact(String),
    /// Screen does not contain text.
    NotContains(String),
    /// Screen matches regex pattern.
    Matches(String),
    /// State field equals value.
    StateEquals { field: String, value: String },
    /// State field comparison (>=, <=, >, <).
    StateCompare {
        field: String,
        op: String,
        value: String,
    },
}

impl Assertion {
    /// Checks the assertion against the screen and app state.
    pub fn check(&self, screen: &str, app: &App) -> bool {
        match self {
            Self::Contains(text) => screen.to_lowercase().contains(&text.to_lowercase()),
            Self::ContainsExact(text) => screen.contains(text),
            Self::NotContains(text) => !screen.to_lowercase().contains(&text.to_lowercase()),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(screen))
                .unwrap_or(false),
            Self::StateEquals { field, value } => {
                super::state_field(app, field).as_deref() == Some(value.as_str())
            }
            Self::StateCompare { field, op, value } => {
                compare_values(super::state_field(app, field).as_deref(), op, value)
            }
        }
    }
}

/// Compares values using the given operator.
fn compare_values(actual: Option<&str>, op: &str, expected: &str) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    if let (Ok(a), Ok(e)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
        return match op {
            ">=" => a >= e,
            "<=" => a <= e,
            ">" => a > e,
            "<" => a < e,
            "=" | "==" => a == e,
            _ => false,
        };
    }

    match op {
        "=" | "==" => actual == expected,
        _ => false,
    }
}

/// A parsed event that can be executed.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// Select a catalog query by name.
    Select(String),
    /// Wait for a duration.
    Wait(Duration),
    /// Resize the terminal.
    Resize(u16, u16),
    /// Assert something about the screen or state.
    Assert(Assertion),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                let mut parts = Vec::new();
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    parts.push("ctrl");
                }
                if key.modifiers.contains(KeyModifiers::ALT) {
                    parts.push("alt");
                }
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    parts.push("shift");
                }
                let key_name = key_code_to_string(&key.code);
                parts.push(&key_name);
                write!(f, "key:{}", parts.join("+"))
            }
            Self::Select(name) => write!(f, "select:{name}"),
            Self::Wait(d) => write!(f, "wait:{}ms", d.as_millis()),
            Self::Resize(w, h) => write!(f, "resize:{w}x{h}"),
            Self::Assert(a) => match a {
                Assertion::Contains(t) => write!(f, "assert:contains:{t}"),
                Assertion::ContainsExact(t) => write!(f, "assert:contains-exact:{t}"),
                Assertion::NotContains(t) => write!(f, "assert:not-contains:{t}"),
                Assertion::Matches(p) => write!(f, "assert:matches:{p}"),
                Assertion::StateEquals { field, value } => {
                    write!(f, "assert:state:{field}={value}")
                }
                Assertion::StateCompare { field, op, value } => {
                    write!(f, "assert:state:{field}{op}{value}")
                }
            },
        }
    }
}

fn key_code_to_string(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "backtab".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        _ => "unknown".to_string(),
    }
}

/// Parser for the event DSL.
#[derive(Debug, Default)]
pub struct EventParser;

impl EventParser {
    /// Creates a new event parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses all events from an input string.
    ///
    /// Events are separated by commas or newlines. A `select:` event takes
    /// its whole line, since query names may contain commas.
    pub fn parse_all(&self, input: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        for line in input.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.to_lowercase().starts_with("select:") {
                events.push(self.parse_one(line)?);
                continue;
            }

            for part in line.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }

                events.push(self.parse_one(part)?);
            }
        }

        Ok(events)
    }

    /// Parses a single event string.
    pub fn parse_one(&self, input: &str) -> Result<Event> {
        let input = input.trim();

        let Some((event_type, value)) = input.split_once(':') else {
            return Err(TrackerError::config(format!(
                "Invalid event syntax: '{input}'. Expected format: type:value"
            )));
        };
        let event_type = event_type.trim().to_lowercase();
        let value = value.trim();

        match event_type.as_str() {
            "key" => self.parse_key(value),
            "select" => Ok(Event::Select(value.to_string())),
            "wait" => self.parse_wait(value),
            "resize" => self.parse_resize(value),
            "assert" => self.parse_assert(value),
            _ => Err(TrackerError::config(format!(
                "Unknown event type: '{event_type}'. Valid types: key, select, wait, resize, assert"
            ))),
        }
    }

    /// Parses a key event like "enter", "ctrl+c", "shift+tab".
    fn parse_key(&self, value: &str) -> Result<Event> {
        let parts: Vec<&str> = value.split('+').collect();
        let mut modifiers = KeyModifiers::empty();
        let mut key_str = "";

        for (i, part) in parts.iter().enumerate() {
            if i == parts.len() - 1 {
                key_str = part;
            } else {
                match part.to_lowercase().as_str() {
                    "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                    "alt" => modifiers |= KeyModifiers::ALT,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    _ => {
                        return Err(TrackerError::config(format!(
                            "Unknown modifier: '{part}'. Valid modifiers: ctrl, alt, shift"
                        )));
                    }
                }
            }
        }

        let mut code = self.parse_key_code(key_str)?;
        if code == KeyCode::Tab && modifiers.contains(KeyModifiers::SHIFT) {
            code = KeyCode::BackTab;
        }

        Ok(Event::Key(KeyEvent::new(code, modifiers)))
    }

    /// Parses a key code string into a KeyCode.
    fn parse_key_code(&self, s: &str) -> Result<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        return Err(TrackerError::config(format!(
                            "Unknown key: '{s}'. Use single characters or named keys like enter, esc, tab, etc."
                        )));
                    }
                }
            }
        };

        Ok(code)
    }

    /// Parses a wait duration like "100ms", "2s", or just "100" (defaults to ms).
    fn parse_wait(&self, value: &str) -> Result<Event> {
        let value = value.trim().to_lowercase();
        let invalid = || TrackerError::config(format!("Invalid duration: '{value}'"));

        let duration = if let Some(ms) = value.strip_suffix("ms") {
            Duration::from_millis(ms.parse().map_err(|_| invalid())?)
        } else if let Some(secs) = value.strip_suffix('s') {
            Duration::from_secs(secs.parse().map_err(|_| invalid())?)
        } else {
            Duration::from_millis(value.parse().map_err(|_| invalid())?)
        };

        Ok(Event::Wait(duration))
    }

    /// Parses a resize event like "120x40".
    fn parse_resize(&self, value: &str) -> Result<Event> {
        let Some((width, height)) = value.split_once('x') else {
            return Err(TrackerError::config(format!(
                "Invalid resize format: '{value}'. Expected WIDTHxHEIGHT"
            )));
        };

        let width: u16 = width
            .parse()
            .map_err(|_| TrackerError::config(format!("Invalid width: '{width}'")))?;
        let height: u16 = height
            .parse()
            .map_err(|_| TrackerError::config(format!("Invalid height: '{height}'")))?;

        Ok(Event::Resize(width, height))
    }

    /// Parses an assertion like "contains:hello" or "state:focus=Sidebar".
    fn parse_assert(&self, value: &str) -> Result<Event> {
        let Some((assert_type, rest)) = value.split_once(':') else {
            return Err(TrackerError::config(format!(
                "Invalid assertion syntax: '{value}'. Expected assert:type:value"
            )));
        };
        let rest = rest.trim();

        let assertion = match assert_type.trim().to_lowercase().as_str() {
            "contains" => Assertion::Contains(rest.to_string()),
            "contains-exact" => Assertion::ContainsExact(rest.to_string()),
            "not-contains" => Assertion::NotContains(rest.to_string()),
            "matches" => Assertion::Matches(rest.to_string()),
            "state" => self.parse_state_assertion(rest)?,
            other => {
                return Err(TrackerError::config(format!(
                    "Unknown assertion type: '{other}'. Valid types: contains, contains-exact, not-contains, matches, state"
                )));
            }
        };

        Ok(Event::Assert(assertion))
    }

    /// Parses a state assertion like "focus=Filters" or "row_count>=2".
    fn parse_state_assertion(&self, value: &str) -> Result<Assertion> {
        // The first operator ends the field name; values may contain '<' or '>'
        let Some(pos) = value.find(['<', '>', '=']) else {
            return Err(TrackerError::config(format!(
                "Invalid state assertion: '{value}'. Expected field=value or field>=value"
            )));
        };

        let op = if value[pos..].starts_with(">=") || value[pos..].starts_with("<=") {
            &value[pos..pos + 2]
        } else {
            &value[pos..pos + 1]
        };
        let field = value[..pos].trim().to_string();
        let val = value[pos + op.len()..].trim().to_string();

        Ok(if op == "=" {
            Assertion::StateEquals { field, value: val }
        } else {
            Assertion::StateCompare {
                field,
                op: op.to_string(),
                value: val,
            }
        })
    }
}
