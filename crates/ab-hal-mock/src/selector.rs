//! Minimal CSS selector support for the mock document.
//!
//! Supports selector lists of compound selectors built from a type selector
//! (or `*`), `#id`, `.class`, `[attr]`, `[attr="v"]`, `[attr*="v"]` and
//! `:nth-of-type(n)`. Backslash and hex escapes are honoured in
//! identifiers; an identifier may not start with an unescaped digit (or
//! `-` and a digit), as in a browser.
//! Combinators are rejected.

use ab_hal::PageHalError;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
    pub nth_of_type: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AttrMatch {
    pub name: String,
    pub op: AttrOp,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

impl AttrOp {
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Contains(v), Some(actual)) => !v.is_empty() && actual.contains(v.as_str()),
        }
    }
}

/// Parse a comma-separated selector list
pub(crate) fn parse(selector: &str) -> Result<Vec<Compound>, PageHalError> {
    let mut list = Vec::new();
    for part in split_list(selector) {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid(selector));
        }
        list.push(parse_compound(part).ok_or_else(|| invalid(selector))?);
    }
    Ok(list)
}

fn invalid(selector: &str) -> PageHalError {
    PageHalError::InvalidSelector(selector.to_string())
}

/// Split on commas that are neither escaped, quoted nor inside brackets
fn split_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = selector.chars();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(c),
            '[' | '(' if quote.is_none() => depth += 1,
            ']' | ')' if quote.is_none() => depth = depth.saturating_sub(1),
            ',' if quote.is_none() && depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

fn parse_compound(input: &str) -> Option<Compound> {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos += 1;
    } else if chars.first().is_some_and(|c| is_ident_start(*c)) {
        let tag = read_ident(&chars, &mut pos)?;
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(read_ident(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(read_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(read_attr(&chars, &mut pos)?);
            }
            ':' => {
                pos += 1;
                let pseudo = read_ident(&chars, &mut pos)?;
                if pseudo != "nth-of-type" || chars.get(pos) != Some(&'(') {
                    return None;
                }
                pos += 1;
                let start = pos;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                let digits: String = chars[start..pos].iter().collect();
                if chars.get(pos) != Some(&')') {
                    return None;
                }
                pos += 1;
                let n = digits.parse::<usize>().ok().filter(|n| *n > 0)?;
                compound.nth_of_type = Some(n);
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}

fn read_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let mut ident = String::new();
    // First two code points and whether each was written raw
    let mut head: Vec<(char, bool)> = Vec::with_capacity(2);
    while *pos < chars.len() {
        let c = chars[*pos];
        let (value, raw) = if c == '\\' {
            (read_escape(chars, pos)?, false)
        } else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            *pos += 1;
            (c, true)
        } else {
            break;
        };
        if head.len() < 2 {
            head.push((value, raw));
        }
        ident.push(value);
    }

    let digit_start = match head.as_slice() {
        [(c, true), ..] if c.is_ascii_digit() => true,
        [('-', true), (c, true)] if c.is_ascii_digit() => true,
        [('-', true)] => true,
        _ => false,
    };
    if ident.is_empty() || digit_start {
        None
    } else {
        Some(ident)
    }
}

/// Decode the escape starting at the backslash under `pos`
fn read_escape(chars: &[char], pos: &mut usize) -> Option<char> {
    *pos += 1;
    let start = *pos;
    while *pos < chars.len() && *pos - start < 6 && chars[*pos].is_ascii_hexdigit() {
        *pos += 1;
    }
    if *pos == start {
        let c = *chars.get(*pos)?;
        *pos += 1;
        return Some(c);
    }
    let hex: String = chars[start..*pos].iter().collect();
    if chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
        *pos += 1;
    }
    let code = u32::from_str_radix(&hex, 16).ok()?;
    Some(char::from_u32(code).filter(|c| *c != '\0').unwrap_or('\u{FFFD}'))
}

fn read_attr(chars: &[char], pos: &mut usize) -> Option<AttrMatch> {
    let name = read_ident(chars, pos)?.to_ascii_lowercase();
    let op = match chars.get(*pos)? {
        ']' => {
            *pos += 1;
            return Some(AttrMatch {
                name,
                op: AttrOp::Exists,
            });
        }
        '=' => {
            *pos += 1;
            AttrOp::Equals(read_attr_value(chars, pos)?)
        }
        '*' if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            AttrOp::Contains(read_attr_value(chars, pos)?)
        }
        _ => return None,
    };
    if chars.get(*pos) != Some(&']') {
        return None;
    }
    *pos += 1;
    Some(AttrMatch { name, op })
}

fn read_attr_value(chars: &[char], pos: &mut usize) -> Option<String> {
    match chars.get(*pos)? {
        quote @ ('"' | '\'') => {
            let quote = *quote;
            *pos += 1;
            let mut value = String::new();
            while *pos < chars.len() && chars[*pos] != quote {
                value.push(chars[*pos]);
                *pos += 1;
            }
            if *pos >= chars.len() {
                return None;
            }
            *pos += 1;
            Some(value)
        }
        _ => read_ident(chars, pos),
    }
}
