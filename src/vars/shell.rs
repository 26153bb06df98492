// ABOUTME: Reader for shell variable definition files such as var_defns.sh
// ABOUTME: Handles export prefixes, quoting, comments, and single- or multi-line arrays

use regex::Regex;
use std::sync::OnceLock;

use super::error::{Result, VarsError};
use super::value::{ConfigValue, FlatConfig};

fn assignment_regex() -> &'static Regex {
    static ASSIGNMENT: OnceLock<Regex> = OnceLock::new();
    ASSIGNMENT.get_or_init(|| {
        Regex::new(r"^(?:export\s+|declare\s+(?:-[A-Za-z]+\s+)*)?([A-Za-z_][A-Za-z0-9_]*)=(.*)$")
            .expect("assignment pattern is valid")
    })
}

/// Parse shell assignments into a flat configuration.
///
/// Only assignments, comments and blank lines are accepted; any other
/// statement is reported with its line number.
pub fn parse_shell(content: &str) -> Result<FlatConfig> {
    let lines: Vec<&str> = content.lines().collect();
    let mut config = FlatConfig::new();
    let mut index = 0;

    while index < lines.len() {
        let line_no = index + 1;
        let line = lines[index].trim();
        index += 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let captures =
            assignment_regex()
                .captures(line)
                .ok_or_else(|| VarsError::MalformedLine {
                    line: line_no,
                    content: line.to_string(),
                })?;
        let key = captures[1].to_string();
        let raw = captures[2].trim_start();

        if let Some(rest) = raw.strip_prefix('(') {
            let mut body = rest.to_string();
            let close = loop {
                if let Some(pos) = find_unquoted(&body, ')') {
                    break pos;
                }
                if index >= lines.len() {
                    return Err(VarsError::UnterminatedArray { key, line: line_no });
                }
                body.push('\n');
                body.push_str(lines[index]);
                index += 1;
            };
            config.insert(key, ConfigValue::List(scan_words(&body[..close]).words));
        } else {
            let mut body = raw.to_string();
            while scan_words(&body).unclosed {
                if index >= lines.len() {
                    return Err(VarsError::MalformedLine {
                        line: line_no,
                        content: line.to_string(),
                    });
                }
                body.push('\n');
                body.push_str(lines[index]);
                index += 1;
            }
            let value = scan_words(&body).words.into_iter().next().unwrap_or_default();
            config.insert(key, ConfigValue::Scalar(value));
        }
    }

    Ok(config)
}

struct Scan {
    words: Vec<String>,
    unclosed: bool,
}

/// Split on unquoted whitespace the way the shell would, dropping quotes and
/// `#` comments.
fn scan_words(input: &str) -> Scan {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some(_) => match c {
                '"' => quote = None,
                '\\' if matches!(chars.peek(), Some('"') | Some('\\') | Some('$')) => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                _ => current.push(c),
            },
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                '#' if !in_word => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                '\\' => match chars.next() {
                    Some('\n') | None => {}
                    Some(escaped) => {
                        current.push(escaped);
                        in_word = true;
                    }
                },
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if in_word {
        words.push(current);
    }

    Scan {
        words,
        unclosed: quote.is_some(),
    }
}

fn find_unquoted(input: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (pos, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => escaped = true,
            Some(_) => {}
            None if c == '\\' => escaped = true,
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == target => return Some(pos),
            None => {}
        }
    }

    None
}
