//! Test scripts for `trie-cli test <file>`.
//!
//! A script is a sequence of blocks separated by blank lines. The first line
//! of a block is a command with an optional argument, the optional second
//! line is a condition on the command's result:
//!
//! ```text
//! insert foo
//! EQ true
//!
//! complete fo
//! EQ ["foo"]
//!
//! exists bar
//! NEQ true
//!
//! reset
//! ```
//!
//! Expected values are JSON. Arrays compare without regard to order, since
//! the server returns keys unordered.

use std::fmt;

use serde_json::Value;

/// Comparison a block makes against its command's result
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Result must equal the value
    Eq(Value),
    /// Result must differ from the value
    Neq(Value),
}

/// One block of a script
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub command: String,
    pub arg: Option<String>,
    pub condition: Option<Condition>,
}

/// Why a block could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The block has no command line
    EmptyInput,
    /// The condition is not `EQ <json>` or `NEQ <json>`
    InvalidComparison(String),
    /// The expected value is not valid JSON
    InvalidExpected(String),
    /// The block has lines after the condition
    TrailingLine(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::EmptyInput => write!(f, "invalid test case: input command was empty"),
            ScriptError::InvalidComparison(cmp) => {
                write!(f, "invalid test case: invalid comparison {}", cmp)
            }
            ScriptError::InvalidExpected(msg) => {
                write!(f, "invalid test case: expected value is not JSON: {}", msg)
            }
            ScriptError::TrailingLine(line) => {
                write!(f, "invalid test case: unexpected line {:?}", line)
            }
        }
    }
}

impl std::error::Error for ScriptError {}

impl Condition {
    /// Returns whether `actual` satisfies the condition
    pub fn holds(&self, actual: &Value) -> bool {
        match self {
            Condition::Eq(expected) => same(expected, actual),
            Condition::Neq(expected) => !same(expected, actual),
        }
    }

    /// The value the condition compares against
    pub fn expected(&self) -> &Value {
        match self {
            Condition::Eq(expected) | Condition::Neq(expected) => expected,
        }
    }
}

/// Equality where arrays are compared as multisets
fn same(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Array(a), Value::Array(b)) => {
            let mut a: Vec<String> = a.iter().map(Value::to_string).collect();
            let mut b: Vec<String> = b.iter().map(Value::to_string).collect();
            a.sort();
            b.sort();
            a == b
        }
        _ => expected == actual,
    }
}

/// Splits a script into its non-empty blocks
pub fn blocks(script: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in script.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parses the lines of one block
pub fn parse_block(lines: &[&str]) -> Result<Step, ScriptError> {
    let (input, rest) = lines.split_first().ok_or(ScriptError::EmptyInput)?;

    let mut words = input.trim().splitn(2, ' ');
    let command = match words.next() {
        Some(command) if !command.is_empty() => command.to_string(),
        _ => return Err(ScriptError::EmptyInput),
    };
    let arg = words.next().map(|arg| arg.to_string());

    let condition = match rest {
        [] => None,
        [line] => Some(parse_condition(line)?),
        [_, extra, ..] => return Err(ScriptError::TrailingLine(extra.to_string())),
    };

    Ok(Step {
        command,
        arg,
        condition,
    })
}

fn parse_condition(line: &str) -> Result<Condition, ScriptError> {
    let mut parts = line.trim().splitn(2, ' ');
    let comparison = parts.next().unwrap_or_default();
    let expected = parts.next().unwrap_or_default();

    let parse = |text: &str| {
        serde_json::from_str::<Value>(text).map_err(|e| ScriptError::InvalidExpected(e.to_string()))
    };

    match comparison {
        "EQ" => Ok(Condition::Eq(parse(expected)?)),
        "NEQ" => Ok(Condition::Neq(parse(expected)?)),
        other => Err(ScriptError::InvalidComparison(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCRIPT: &str = "insert foo\nEQ true\n\n\ncomplete fo\r\nEQ [\"foo\", \"fo\"]\n\nreset\n";

    #[test]
    fn test_blocks_split_on_blank_lines() {
        let blocks = blocks(SCRIPT);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], vec!["insert foo", "EQ true"]);
        assert_eq!(blocks[1], vec!["complete fo", "EQ [\"foo\", \"fo\"]"]);
        assert_eq!(blocks[2], vec!["reset"]);
    }

    #[test]
    fn test_parse_block() {
        let step = parse_block(&["insert hello world", "NEQ false"]).unwrap();

        assert_eq!(step.command, "insert");
        assert_eq!(step.arg.as_deref(), Some("hello world"));
        assert_eq!(step.condition, Some(Condition::Neq(json!(false))));

        let step = parse_block(&["keys"]).unwrap();
        assert_eq!(step.arg, None);
        assert_eq!(step.condition, None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_block(&[]), Err(ScriptError::EmptyInput));
        assert_eq!(
            parse_block(&["insert a", "GT 3"]),
            Err(ScriptError::InvalidComparison("GT".to_string()))
        );
        assert!(matches!(
            parse_block(&["insert a", "EQ tru"]),
            Err(ScriptError::InvalidExpected(_))
        ));
        assert_eq!(
            parse_block(&["insert a", "EQ true", "EQ false"]),
            Err(ScriptError::TrailingLine("EQ false".to_string()))
        );
    }

    #[test]
    fn test_condition_arrays_ignore_order() {
        let cond = Condition::Eq(json!(["fo", "foo"]));

        assert!(cond.holds(&json!(["foo", "fo"])));
        assert!(!cond.holds(&json!(["foo"])));
        assert!(Condition::Neq(json!(true)).holds(&json!(false)));
        assert!(!Condition::Neq(json!(true)).holds(&json!(true)));
    }
}
