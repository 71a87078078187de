//! Argument pattern compilation and matching.
//!
//! Two dialects:
//! - **Wildcard**: space-delimited tokens where `*` stands for an input
//!   token; a trailing `*` consumes everything remaining. Matched against
//!   the tokens left after the verb word.
//! - **Named-capture**: literal text with `{identifier}` placeholders,
//!   compiled to an anchored regex and matched against the whole joined
//!   input line. On success the identifiers map to the captured text in
//!   declaration order.
//!
//! A bare `*` is its own case: it matches unconditionally and captures
//! nothing.

use regex::Regex;

use thistle_foundation::{Error, ErrorKind, Result};

/// A compiled argument pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Bare `*`: matches anything, captures nothing.
    Anything,
    /// Wildcard dialect, split into pattern tokens.
    Wildcard(Vec<String>),
    /// Named-capture dialect compiled to an anchored regex.
    Capture {
        /// The compiled regex.
        regex: Regex,
        /// Capture variable names in declaration order.
        vars: Vec<String>,
    },
}

impl Pattern {
    /// Compiles a pattern source string.
    pub fn compile(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(compile_error("pattern is empty"));
        }
        if trimmed == "*" {
            return Ok(Self::Anything);
        }
        if trimmed.contains('{') {
            return Self::compile_capture(trimmed);
        }
        Ok(Self::Wildcard(
            trimmed.split_whitespace().map(str::to_string).collect(),
        ))
    }

    /// Returns true for the named-capture dialect.
    ///
    /// The dispatcher's last-resort sweep considers only these.
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        matches!(self, Self::Capture { .. })
    }

    /// Tests this pattern against a command.
    ///
    /// `input` is the whole joined input line; `remaining` is the token
    /// list after the verb word. Wildcard patterns consume `remaining`;
    /// capture patterns match `input`. Returns the captured variables on
    /// success, empty for the non-capturing dialects.
    #[must_use]
    pub fn matches(&self, input: &str, remaining: &[String]) -> Option<Vec<(String, String)>> {
        match self {
            Self::Anything => Some(Vec::new()),
            Self::Wildcard(tokens) => {
                if tokens.len() > remaining.len() {
                    return None;
                }
                if match_wildcard(tokens, remaining) {
                    Some(Vec::new())
                } else {
                    None
                }
            }
            Self::Capture { regex, vars } => {
                let caps = regex.captures(input)?;
                Some(
                    vars.iter()
                        .enumerate()
                        .map(|(i, name)| {
                            let text = caps
                                .get(i + 1)
                                .map(|m| m.as_str().to_string())
                                .unwrap_or_default();
                            (name.clone(), text)
                        })
                        .collect(),
                )
            }
        }
    }

    fn compile_capture(source: &str) -> Result<Self> {
        let mut pattern = String::from("(?i)^");
        let mut vars = Vec::new();
        let mut chars = source.chars().peekable();
        let mut pending_space = false;

        while let Some(c) = chars.next() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space {
                pattern.push_str(r"\s+");
                pending_space = false;
            }
            if c == '{' {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
                        Some(c) => {
                            return Err(compile_error(format!(
                                "invalid character {c:?} in capture name"
                            )));
                        }
                        None => return Err(compile_error("unclosed capture placeholder")),
                    }
                }
                if name.is_empty() {
                    return Err(compile_error("empty capture name"));
                }
                vars.push(name);
                pattern.push_str(r"(\S+)");
            } else if c == '}' {
                return Err(compile_error("unmatched '}' in pattern"));
            } else {
                pattern.push_str(&regex::escape(&c.to_string()));
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern)
            .map_err(|e| compile_error(format!("pattern did not compile: {e}")))?;
        Ok(Self::Capture { regex, vars })
    }
}

/// Matches wildcard pattern tokens against input tokens.
///
/// A non-final `*` prefers to consume one token but may consume none
/// (so `* at *` accepts both "stare at door" and a bare "at the door");
/// a final `*` consumes everything left. Literal tokens compare
/// case-insensitively.
fn match_wildcard(pattern: &[String], tokens: &[String]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return tokens.is_empty();
    };
    if head == "*" {
        if rest.is_empty() {
            return true;
        }
        if !tokens.is_empty() && match_wildcard(rest, &tokens[1..]) {
            return true;
        }
        return match_wildcard(rest, tokens);
    }
    match tokens.split_first() {
        Some((word, tail)) if head.eq_ignore_ascii_case(word) => match_wildcard(rest, tail),
        _ => false,
    }
}

fn compile_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ParseError {
        message: message.into(),
        line: 1,
        column: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn bare_star_matches_anything() {
        let p = Pattern::compile("*").unwrap();
        assert_eq!(p.matches("anything at all", &toks("at all")), Some(vec![]));
        assert_eq!(p.matches("", &[]), Some(vec![]));
    }

    #[test]
    fn capture_extracts_variables() {
        let p = Pattern::compile("give {item} to {person}").unwrap();
        let vars = p.matches("give sword to wizard", &toks("sword to wizard")).unwrap();
        assert_eq!(
            vars,
            vec![
                ("item".to_string(), "sword".to_string()),
                ("person".to_string(), "wizard".to_string()),
            ]
        );
    }

    #[test]
    fn capture_is_anchored() {
        let p = Pattern::compile("give {item} to {person}").unwrap();
        assert!(p.matches("please give sword to wizard now", &[]).is_none());
    }

    #[test]
    fn capture_is_case_insensitive() {
        let p = Pattern::compile("give {item} to {person}").unwrap();
        assert!(p.matches("GIVE sword TO wizard", &[]).is_some());
    }

    #[test]
    fn capture_flexible_whitespace() {
        let p = Pattern::compile("give {item} to {person}").unwrap();
        assert!(p.matches("give  sword   to wizard", &[]).is_some());
    }

    #[test]
    fn wildcard_star_at_star() {
        let p = Pattern::compile("* at *").unwrap();
        assert!(p.matches("look at the door", &toks("at the door")).is_some());
        assert!(p.matches("stare at door", &toks("daggers at door")).is_some());
        assert!(p.matches("look", &toks("around")).is_none());
    }

    #[test]
    fn wildcard_longer_than_tokens_fails() {
        let p = Pattern::compile("* at *").unwrap();
        assert!(p.matches("look at", &toks("at")).is_none());
    }

    #[test]
    fn wildcard_trailing_star_consumes_rest() {
        let p = Pattern::compile("put * in *").unwrap();
        assert!(
            p.matches("x", &toks("put gem in the velvet bag")).is_some()
        );
    }

    #[test]
    fn wildcard_literals_case_insensitive() {
        let p = Pattern::compile("* AT *").unwrap();
        assert!(p.matches("x", &toks("stare at door")).is_some());
    }

    #[test]
    fn wildcard_requires_full_consumption() {
        let p = Pattern::compile("* at").unwrap();
        assert!(p.matches("x", &toks("stare at door")).is_none());
        assert!(p.matches("x", &toks("stare at")).is_some());
    }

    #[test]
    fn compile_rejects_bad_captures() {
        assert!(Pattern::compile("give {item").is_err());
        assert!(Pattern::compile("give {}").is_err());
        assert!(Pattern::compile("give item}").is_err());
        assert!(Pattern::compile("give {it em}").is_err());
        assert!(Pattern::compile("   ").is_err());
    }

    #[test]
    fn capture_escapes_literal_metacharacters() {
        let p = Pattern::compile("page {person} (private)").unwrap();
        assert!(p.matches("page sam (private)", &[]).is_some());
        assert!(p.matches("page sam xprivatex", &[]).is_none());
    }

    #[test]
    fn is_capture_only_for_named_dialect() {
        assert!(Pattern::compile("give {x} to {y}").unwrap().is_capture());
        assert!(!Pattern::compile("* at *").unwrap().is_capture());
        assert!(!Pattern::compile("*").unwrap().is_capture());
    }
}
