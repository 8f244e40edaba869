//! Text normalization applied to review text before vectorization.
//!
//! `clean_text` is a pure, deterministic pipeline of sub-transforms applied
//! in fixed order: contraction expansion, case folding, HTML tag removal,
//! non-letter removal, whitespace collapse. Its output alphabet is restricted
//! to lowercase ASCII letters and single spaces; downstream tokenization
//! relies on that contract.

use crate::constants::normalize::{CONTRACTION_SUFFIXES, CONTRACTIONS};

/// Normalize one review. Idempotent: `clean_text(clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    let expanded = expand_contractions(text);
    let lowered = expanded.to_lowercase();
    let untagged = strip_html_tags(&lowered);
    let letters = keep_letters(&untagged);
    normalize_inline_whitespace(letters)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Expand English contractions wherever they occur in the text.
///
/// Candidate stems are maximal runs of alphanumeric-or-apostrophe
/// characters, matched case-insensitively, so punctuation or markup glued
/// to a contraction (`"Don't,"`, `"<b>don't</b>"`) never blocks the
/// lookup. Expansions are emitted lowercase; case folding follows
/// immediately in `clean_text`, so nothing is lost.
fn expand_contractions(text: &str) -> String {
    fn flush(out: &mut String, stem: &mut String) {
        if stem.is_empty() {
            return;
        }
        match expand_stem(&stem.to_lowercase()) {
            Some(expanded) => out.push_str(&expanded),
            None => out.push_str(stem),
        }
        stem.clear();
    }

    let mut out = String::with_capacity(text.len());
    let mut stem = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            stem.push(ch);
        } else {
            flush(&mut out, &mut stem);
            out.push(ch);
        }
    }
    flush(&mut out, &mut stem);
    out
}

fn expand_stem(stem: &str) -> Option<String> {
    if let Some((_, expansion)) = CONTRACTIONS.iter().find(|(from, _)| *from == stem) {
        return Some((*expansion).to_string());
    }
    for (suffix, expansion) in CONTRACTION_SUFFIXES {
        if let Some(base) = stem.strip_suffix(suffix)
            && !base.is_empty()
        {
            return Some(format!("{base}{expansion}"));
        }
    }
    None
}

/// Remove HTML tags, replacing each `<...>` span with a space.
/// An unclosed `<` is kept as text rather than swallowing the tail.
fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut tag_buffer = String::new();
    let mut in_tag = false;
    for ch in text.chars() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
                tag_buffer.clear();
                out.push(' ');
            } else {
                tag_buffer.push(ch);
            }
        } else if ch == '<' {
            in_tag = true;
        } else {
            out.push(ch);
        }
    }
    if in_tag {
        out.push('<');
        out.push_str(&tag_buffer);
    }
    out
}

/// Replace every character outside `a-z` with a space.
fn keep_letters(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_ascii_lowercase() { ch } else { ' ' })
        .collect()
}
