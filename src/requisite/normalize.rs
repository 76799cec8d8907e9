//! Normalises different spellings of the same requirement.
//!
//! Each stage is a total function over strings, applied in a fixed order by
//! [`normalize_text`]. The stages are heuristics tuned to how module
//! descriptions are actually written; they are not a general English parser.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::domain::{module_code::module_regex, ModuleCode};

/// Canonical conjunction, including its surrounding spaces.
pub const AND: &str = " and ";
/// Canonical disjunction, including its surrounding spaces.
pub const OR: &str = " or ";

/// Normalises `text`, first removing `module`'s own code from it.
///
/// Both the code itself and any suffixed variant of its base are removed
/// (`CS1010S` removes `CS1010`, `CS1010S`, `CS1010X`, ...), so a module never
/// lists itself as a requisite.
#[must_use]
pub fn normalize(module: &ModuleCode, text: &str) -> String {
    normalize_text(&remove_own_code(module, text))
}

/// Runs the normalisation stages over `text`.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let text = remove_space_from_modules(text);
    let text = fix_operator_typos(&text);
    let text = expand_postfixes(&text);
    let text = convert_commas(&text);
    let text = unify_brackets(&text);
    let text = convert_list_markers(&text);
    let text = fix_list_brackets(&text);
    let text = replace_synonyms(&text);
    remove_module_titles(&text)
}

fn remove_own_code(module: &ModuleCode, text: &str) -> String {
    let pattern = format!(r"\b{}[A-Z]{{0,2}}\b", regex::escape(module.base()));
    match Regex::new(&pattern) {
        Ok(own_code) => own_code.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_operator_word(s: &str) -> bool {
    s == "and" || s == "or"
}

/// `CS 1000` → `CS1000`
fn remove_space_from_modules(text: &str) -> String {
    regex!(r"[A-Z]{2,3}[^A-Za-z0-9_][0-9]{4}[A-Z]{0,2}")
        .replace_all(text, |caps: &Captures| {
            caps[0].replacen(|c: char| !is_word_char(c), "", 1)
        })
        .into_owned()
}

/// `CS1000and CS1001` → `CS1000 and CS1001`
///
/// Only splits when the glued neighbour is itself a module code.
fn fix_operator_typos(text: &str) -> String {
    let left = regex!(r"(?i)\b([^\s()]{6,9})(and|or)\b").replace_all(text, |caps: &Captures| {
        if module_regex().is_match(&caps[1]) {
            format!("{} {}", &caps[1], &caps[2])
        } else {
            caps[0].to_string()
        }
    });
    regex!(r"(?i)\b(and|or)([^\s()]{6,9})\b")
        .replace_all(&left, |caps: &Captures| {
            if module_regex().is_match(&caps[2]) {
                format!("{} {}", &caps[1], &caps[2])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// `CS2103/T` → `CS2103 or CS2103T`
///
/// Codes without a slash are left alone, so `CS1010FR` stays one code.
fn expand_postfixes(text: &str) -> String {
    regex!(r"([A-Z]{2,3}[0-9]{4})((?:/[A-Z]|[A-Z]R)+)\b")
        .replace_all(text, |caps: &Captures| {
            let (base, postfixes) = (&caps[1], &caps[2]);
            if !postfixes.contains('/') {
                return caps[0].to_string();
            }

            let mut modules = vec![base.to_string()];
            let mut rest = postfixes;
            while !rest.is_empty() {
                let (postfix, tail) = match rest.strip_prefix('/') {
                    Some(slashed) => slashed.split_at(1),
                    None => rest.split_at(2),
                };
                modules.push(format!("{base}{postfix}"));
                rest = tail;
            }
            modules.join(OR)
        })
        .into_owned()
}

/// `x, y and z` reads as a conjunction but `x, y, z` as alternatives.
fn convert_commas(text: &str) -> String {
    let text = regex!(r"(?i),\s*and\b").replace_all(text, AND);
    if !text.contains(',') {
        return text.into_owned();
    }

    let operator = if text.contains(AND) && !text.contains(OR) {
        AND
    } else {
        OR
    };
    text.replace(',', operator)
}

fn unify_brackets(text: &str) -> String {
    text.replace(['{', '[', '<'], "(").replace(['}', ']', '>'], ")")
}

/// `(a) x (b) y` and `i) x ii) y` → `(1) x (2) y`
///
/// Markers are matched in lowercase only, so title fragments such as
/// `Networks I)` are not mistaken for markers.
fn convert_list_markers(text: &str) -> String {
    let mut text = text.to_string();
    for number in 1u32.. {
        let Some(letter) = char::from_u32(u32::from('a') + (number - 1) % 26) else {
            break;
        };
        let roman = roman_numeral(number);
        let Ok(marker) = Regex::new(&format!(r"\(?(?:{roman}|{letter})\)")) else {
            break;
        };
        let Some(found) = marker.find(&text) else {
            break;
        };
        text.replace_range(found.range(), &format!("({number})"));
    }
    text
}

fn roman_numeral(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];

    let mut numeral = String::new();
    for (value, symbol) in NUMERALS {
        while number >= value {
            numeral.push_str(symbol);
            number -= value;
        }
    }
    numeral
}

/// `1) x 2) y` → `(1) x (2) y`, only when the brackets are unbalanced.
fn fix_list_brackets(text: &str) -> String {
    if text.matches('(').count() == text.matches(')').count() {
        return text.to_string();
    }
    regex!(r"\(?\b(\d+)\)")
        .replace_all(text, "($1)")
        .into_owned()
}

fn replace_synonyms(text: &str) -> String {
    let text = text
        .replace(['|', '/'], OR)
        .replace([';', '&'], AND)
        .replace(" plus ", AND);
    regex!(r"(?i)\b(?:and|or)\b")
        .replace_all(&text, |caps: &Captures| caps[0].to_lowercase())
        .into_owned()
}

/// Strips `title and title` phrases where neither side is a module code or an
/// operator, repeating until nothing changes.
fn remove_module_titles(text: &str) -> String {
    let mut text = text.to_string();
    loop {
        let stripped = strip_title_conjunctions(&text);
        match stripped {
            Cow::Borrowed(_) => return text,
            Cow::Owned(next) if next == text => return text,
            Cow::Owned(next) => text = next,
        }
    }
}

fn strip_title_conjunctions(text: &str) -> Cow<'_, str> {
    regex!(r"([^\s()]+)\b\s+(?:and|or)\s+([^\s()]+)\b").replace_all(text, |caps: &Captures| {
        let (left, right) = (&caps[1], &caps[2]);
        let meaningful = [left, right]
            .iter()
            .any(|side| is_operator_word(side) || module_regex().is_match(side));
        if meaningful {
            caps[0].to_string()
        } else {
            String::new()
        }
    })
}
