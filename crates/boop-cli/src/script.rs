//! Replay scripts: one tracker call per line.
//!
//! ```text
//! # comments and blank lines are ignored
//! launch "cold start"
//! event "Button Tapped" home {"x": 3}
//! sleep 1.5
//! stop
//! ```

use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::time::Duration;

/// A single scripted tracker call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `launch [label] [value]`
    Launch {
        label: Option<Value>,
        value: Option<Value>,
    },
    /// `start`
    Start,
    /// `stop`
    Stop,
    /// `event <name> [label] [value]`
    Event {
        name: String,
        label: Option<Value>,
        value: Option<Value>,
    },
    /// `sleep <seconds>`
    Sleep(Duration),
}

/// Parses a whole script, reporting the 1-based line of the first error.
pub fn parse_script(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).map_err(|e| anyhow!("line {}: {e}", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let tokens = tokenize(line)?;
    let (command, args) = tokens
        .split_first()
        .ok_or_else(|| anyhow!("empty command"))?;

    match command.as_str() {
        "launch" => {
            expect_at_most(command, args, 2)?;
            Ok(Step::Launch {
                label: args.first().map(|s| parse_payload(s)),
                value: args.get(1).map(|s| parse_payload(s)),
            })
        }
        "start" => {
            expect_at_most(command, args, 0)?;
            Ok(Step::Start)
        }
        "stop" => {
            expect_at_most(command, args, 0)?;
            Ok(Step::Stop)
        }
        "event" => {
            expect_at_most(command, args, 3)?;
            let name = args
                .first()
                .ok_or_else(|| anyhow!("event needs a name"))?
                .clone();
            Ok(Step::Event {
                name,
                label: args.get(1).map(|s| parse_payload(s)),
                value: args.get(2).map(|s| parse_payload(s)),
            })
        }
        "sleep" => {
            expect_at_most(command, args, 1)?;
            let raw = args.first().ok_or_else(|| anyhow!("sleep needs a duration in seconds"))?;
            let secs: f64 = raw
                .parse()
                .map_err(|_| anyhow!("invalid sleep duration '{raw}'"))?;
            let duration = Duration::try_from_secs_f64(secs)
                .map_err(|_| anyhow!("invalid sleep duration '{raw}'"))?;
            Ok(Step::Sleep(duration))
        }
        other => bail!("unknown command '{other}'"),
    }
}

fn expect_at_most(command: &str, args: &[String], max: usize) -> Result<()> {
    if args.len() > max {
        bail!("'{command}' takes at most {max} argument(s), got {}", args.len());
    }
    Ok(())
}

/// Payloads are JSON when they parse as JSON, plain strings otherwise.
pub fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Splits on whitespace. Double quotes group words; `{...}` and `[...]`
/// runs are kept whole so JSON payloads need no quoting.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => bail!("dangling escape"),
                    },
                    _ => token.push(c),
                }
            }
            if !closed {
                bail!("unterminated quote");
            }
        } else if c == '{' || c == '[' {
            let mut depth = 0usize;
            let mut in_string = false;
            let mut escaped = false;
            for c in chars.by_ref() {
                token.push(c);
                if escaped {
                    escaped = false;
                    continue;
                }
                match c {
                    '\\' if in_string => escaped = true,
                    '"' => in_string = !in_string,
                    '{' | '[' if !in_string => depth += 1,
                    '}' | ']' if !in_string => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            if depth != 0 {
                bail!("unbalanced JSON payload");
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }
    Ok(tokens)
}
