//! Shared text grammar for interfaces and values
//!
//! Both descriptors use the same surface syntax:
//!
//! ```text
//! node   := [name ":"] body
//! body   := "[" node ("," node)* "]" | "[" "]"
//!         | "<" node ["," (count | "*")] ">"
//!         | atom
//! ```
//!
//! Parsing produces an uninterpreted [`Node`] tree; [`crate::Interface`]
//! and [`crate::Value`] decide which atoms and repetitions are legal.

use std::fmt;

use crate::error::{ParseError, ParseErrorKind};

/// Largest count accepted in `<item, n>`
pub const MAX_REPEAT_COUNT: usize = 1024;

/// Largest number of nodes one `<item, n>` may expand to, nested repeats included
pub const MAX_EXPANDED_NODES: usize = 1 << 16;

/// A parsed node with its optional label.
#[derive(Debug)]
pub(crate) struct Node<'a> {
    pub name: Option<&'a str>,
    pub body: Body<'a>,
    /// Source text of the body, used in error messages
    pub text: &'a str,
}

#[derive(Debug)]
pub(crate) enum Body<'a> {
    Atom(&'a str),
    List(Vec<Node<'a>>),
    /// `<item, count>`; `count` is `None` for `<item>` and `<item, *>`
    Repeat { item: Box<Node<'a>>, count: Option<usize> },
}

impl Node<'_> {
    pub fn name(&self) -> Option<String> {
        self.name.map(str::to_string)
    }
}

pub(crate) fn parse(text: &str) -> Result<Node<'_>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Empty,
            text,
            "expected a type or value",
        ));
    }

    let (name, body_text) = split_name(trimmed);
    if body_text.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Empty,
            trimmed,
            "label is not followed by a type or value",
        ));
    }

    let body = if let Some(rest) = body_text.strip_prefix('[') {
        let inner = rest.strip_suffix(']').ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Unclosed,
                body_text,
                "a collection opened with `[` must end with `]`",
            )
        })?;
        let items = split_top_level(inner)?
            .into_iter()
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        Body::List(items)
    } else if let Some(rest) = body_text.strip_prefix('<') {
        let inner = rest.strip_suffix('>').ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Unclosed,
                body_text,
                "a repetition opened with `<` must end with `>`",
            )
        })?;
        let args = split_top_level(inner)?;
        match args.as_slice() {
            [item] => Body::Repeat {
                item: Box::new(parse(item)?),
                count: None,
            },
            [item, count] => Body::Repeat {
                item: Box::new(parse(item)?),
                count: parse_count(count)?,
            },
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ArgumentCount,
                    body_text,
                    format!(
                        "expected `<item>` or `<item, count>` but got {} arguments",
                        args.len()
                    ),
                ));
            }
        }
    } else {
        Body::Atom(body_text)
    };

    Ok(Node {
        name,
        body,
        text: body_text,
    })
}

fn parse_count(text: &str) -> Result<Option<usize>, ParseError> {
    let count = text.trim();
    if count == "*" {
        return Ok(None);
    }
    let parsed = count.parse::<usize>().map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidCount,
            count,
            "expected a repetition count or `*`",
        )
    })?;
    if parsed > MAX_REPEAT_COUNT {
        return Err(ParseError::new(
            ParseErrorKind::InvalidCount,
            count,
            format!("repetition count exceeds {MAX_REPEAT_COUNT}"),
        ));
    }
    Ok(Some(parsed))
}

/// Reject a repetition whose expansion would exceed [`MAX_EXPANDED_NODES`].
pub(crate) fn check_expansion(item_nodes: usize, count: usize, segment: &str) -> Result<(), ParseError> {
    if item_nodes.saturating_mul(count) > MAX_EXPANDED_NODES {
        return Err(ParseError::new(
            ParseErrorKind::InvalidCount,
            segment,
            format!("repetition expands past {MAX_EXPANDED_NODES} nodes"),
        ));
    }
    Ok(())
}

/// Split off a leading `label:`. Labels never contain brackets.
fn split_name(text: &str) -> (Option<&str>, &str) {
    if let Some((prefix, body)) = text.split_once(':') {
        let name = prefix.trim();
        if !name.is_empty() && !prefix.contains(['[', ']', '<', '>']) {
            return (Some(name), body.trim());
        }
    }
    (None, text)
}

/// Split on commas that are not nested inside `[]` or `<>`.
fn split_top_level(text: &str) -> Result<Vec<&str>, ParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut segments = Vec::new();
    let mut start = 0;

    for (pos, ch) in text.char_indices() {
        match ch {
            '[' | '<' => stack.push((ch, pos)),
            ',' if stack.is_empty() => {
                segments.push(&text[start..pos]);
                start = pos + 1;
            }
            ']' | '>' => {
                let Some(&(open, _)) = stack.last() else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedClose,
                        text,
                        format!("unexpected `{ch}` at position {pos}"),
                    ));
                };
                if (open, ch) != ('[', ']') && (open, ch) != ('<', '>') {
                    return Err(ParseError::new(
                        ParseErrorKind::Mismatched,
                        text,
                        format!("`{open}` closed by `{ch}` at position {pos}"),
                    ));
                }
                stack.pop();
            }
            _ => {}
        }
    }

    if let Some(&(open, pos)) = stack.last() {
        return Err(ParseError::new(
            ParseErrorKind::Unclosed,
            text,
            format!("`{open}` opened at position {pos} is never closed"),
        ));
    }

    segments.push(&text[start..]);
    Ok(segments)
}

/// Print collection items, collapsing identical items into `<item, n>`.
pub(crate) fn write_items(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    match items.split_first() {
        None => f.write_str("[]"),
        Some((first, rest)) if rest.iter().all(|item| item == first) => {
            write!(f, "<{}, {}>", first, items.len())
        }
        Some(_) => write!(f, "[{}]", items.join(", ")),
    }
}
