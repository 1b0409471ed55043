//! Inline tokenizer for mrkdwn text.
//!
//! At each position a fixed, ordered list of anchored matchers is tried and
//! the first one to match wins. Every matcher closes on the *nearest* closing
//! sigil, so an opening sigil without a partner never swallows the rest of
//! the line; it simply falls through as literal text. Literal characters are
//! coalesced into one unmarked text run.
//!
//! Formatted spans carry exactly one mark: the inside of `*bold*` is not
//! rescanned for other sigils.
//!
//! Closing sigils are looked up through a [`Lookahead`] built in one pass
//! over the input, so a line full of unmatched openers still tokenizes in
//! linear time.

use std::iter::FusedIterator;

use crate::block::{Inline, Mark, SpecialKind};
use crate::emoji;

type Matcher = fn(&str, usize, &mut Lookahead) -> Option<(Inline, usize)>;

/// Matchers in precedence order.
const MATCHERS: &[Matcher] = &[
    line_break,
    user_mention,
    special_mention,
    channel_mention,
    labeled_link,
    bare_link,
    inline_code,
    bold,
    italic,
    underline,
    strike,
    emoji_shortcode,
];

const LINK_SCHEMES: &[&str] = &["https://", "http://", "mailto:"];

/// Sigils a matcher may need to find ahead of the scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sigil {
    Newline,
    OpenAngle,
    Angle,
    Backtick,
    Star,
    Underscore,
    DoublePlus,
    Tilde,
    Colon,
}

impl Sigil {
    const COUNT: usize = 9;

    fn len(self) -> usize {
        match self {
            Sigil::DoublePlus => 2,
            _ => 1,
        }
    }
}

/// Byte offsets of one sigil in the source, with a cursor that follows the
/// scan position.
#[derive(Debug, Default)]
struct Occurrences {
    at: Vec<usize>,
    cursor: usize,
}

impl Occurrences {
    /// First occurrence at or after `from`.
    ///
    /// Queries track the scan position, which only moves forward, so the
    /// cursor steps back at most a sigil or two and the total work over a
    /// whole scan stays linear.
    fn first_from(&mut self, from: usize) -> Option<usize> {
        while self.cursor > 0 && self.at[self.cursor - 1] >= from {
            self.cursor -= 1;
        }
        while self.at.get(self.cursor).is_some_and(|&at| at < from) {
            self.cursor += 1;
        }
        self.at.get(self.cursor).copied()
    }
}

/// Positions of every closing sigil and line break in a source string.
#[derive(Debug)]
pub(crate) struct Lookahead {
    sigils: [Occurrences; Sigil::COUNT],
}

impl Lookahead {
    pub(crate) fn new(src: &str) -> Self {
        let mut sigils: [Occurrences; Sigil::COUNT] = Default::default();
        // All sigils are ASCII, so every hit is on a char boundary
        let bytes = src.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            let sigil = match byte {
                b'\n' => Sigil::Newline,
                b'<' => Sigil::OpenAngle,
                b'>' => Sigil::Angle,
                b'`' => Sigil::Backtick,
                b'*' => Sigil::Star,
                b'_' => Sigil::Underscore,
                b'+' if bytes.get(i + 1) == Some(&b'+') => Sigil::DoublePlus,
                b'~' => Sigil::Tilde,
                b':' => Sigil::Colon,
                _ => continue,
            };
            sigils[sigil as usize].at.push(i);
        }
        Self { sigils }
    }

    /// Offset of the nearest `sigil` at or after `from`, provided no line
    /// break comes first.
    pub(crate) fn close(&mut self, sigil: Sigil, from: usize) -> Option<usize> {
        let at = self.sigils[sigil as usize].first_from(from)?;
        match self.sigils[Sigil::Newline as usize].first_from(from) {
            Some(newline) if newline < at => None,
            _ => Some(at),
        }
    }
}

/// Lazy inline scanner over one line (or a few lines joined by `\n`).
///
/// Yields nodes covering the whole input with no gaps or overlaps.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    pending: Option<Inline>,
    ahead: Lookahead,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            pending: None,
            ahead: Lookahead::new(src),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Inline;

    fn next(&mut self) -> Option<Inline> {
        if let Some(node) = self.pending.take() {
            return Some(node);
        }

        let mut plain = String::new();
        while let Some(ch) = self.src[self.pos..].chars().next() {
            if let Some((node, len)) = match_at(&self.src[self.pos..], self.pos, &mut self.ahead) {
                self.pos += len;
                if plain.is_empty() {
                    return Some(node);
                }
                self.pending = Some(node);
                break;
            }
            self.pos += ch.len_utf8();
            plain.push(ch);
        }

        if plain.is_empty() {
            None
        } else {
            Some(Inline::text(plain))
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Tokenize `text` into inline nodes.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    Tokenizer::new(text).collect()
}

fn match_at(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    for matcher in MATCHERS {
        if let Some(hit) = matcher(rest, pos, ahead) {
            return Some(hit);
        }
    }
    None
}

/// Body of an angle-bracket token opened by `open`, closed by the nearest `>`
/// on the same line. `pos` is the offset of `rest` in the scanned source.
/// Returns the body and the total token length.
///
/// A body never holds another `<`: in `<<@U1>` only the second bracket
/// opens a token.
pub(crate) fn angle_token<'s>(
    rest: &'s str,
    pos: usize,
    open: &str,
    ahead: &mut Lookahead,
) -> Option<(&'s str, usize)> {
    let (body, len) = delimited(rest, pos, open, Sigil::Angle, ahead)?;
    if ahead
        .close(Sigil::OpenAngle, pos + 1)
        .is_some_and(|next| next < pos + len)
    {
        return None;
    }
    Some((body, len))
}

/// Identifier part of a mention body, dropping any `|label` suffix.
pub(crate) fn mention_id(body: &str) -> Option<&str> {
    let id = body.split('|').next()?;
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        None
    } else {
        Some(id)
    }
}

fn is_url(href: &str) -> bool {
    LINK_SCHEMES.iter().any(|scheme| href.len() > scheme.len() && href.starts_with(scheme))
        && !href.chars().any(char::is_whitespace)
}

/// Non-empty span between `open` and the nearest following `close` on the
/// same line. Returns the span and the total length including sigils.
pub(crate) fn delimited<'s>(
    rest: &'s str,
    pos: usize,
    open: &str,
    close: Sigil,
    ahead: &mut Lookahead,
) -> Option<(&'s str, usize)> {
    let after = rest.strip_prefix(open)?;
    let start = pos + open.len();
    let end = ahead.close(close, start)?;
    if end == start {
        return None;
    }
    Some((&after[..end - start], end - pos + close.len()))
}

fn line_break(rest: &str, _: usize, _: &mut Lookahead) -> Option<(Inline, usize)> {
    if rest.starts_with("\r\n") {
        Some((Inline::HardBreak, 2))
    } else if rest.starts_with('\n') {
        Some((Inline::HardBreak, 1))
    } else {
        None
    }
}

fn user_mention(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (body, len) = angle_token(rest, pos, "<@", ahead)?;
    let id = mention_id(body)?;
    Some((Inline::UserMention { id: id.to_string() }, len))
}

fn special_mention(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (body, len) = angle_token(rest, pos, "<!", ahead)?;
    let kind = SpecialKind::from_name(mention_id(body)?)?;
    Some((Inline::SpecialMention { kind }, len))
}

fn channel_mention(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (body, len) = angle_token(rest, pos, "<#", ahead)?;
    let id = mention_id(body)?;
    let label = body
        .split_once('|')
        .map(|(_, label)| label)
        .filter(|label| !label.is_empty())
        .map(str::to_string);
    Some((
        Inline::ChannelMention {
            id: id.to_string(),
            label,
        },
        len,
    ))
}

fn labeled_link(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (body, len) = angle_token(rest, pos, "<", ahead)?;
    let (href, text) = body.split_once('|')?;
    if !is_url(href) || text.is_empty() {
        return None;
    }
    Some((
        Inline::marked(
            text,
            Mark::Link {
                href: href.to_string(),
            },
        ),
        len,
    ))
}

fn bare_link(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (href, len) = angle_token(rest, pos, "<", ahead)?;
    if !is_url(href) {
        return None;
    }
    Some((
        Inline::marked(
            href,
            Mark::Link {
                href: href.to_string(),
            },
        ),
        len,
    ))
}

fn inline_code(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (inner, len) = delimited(rest, pos, "`", Sigil::Backtick, ahead)?;
    Some((Inline::marked(inner, Mark::Code), len))
}

fn bold(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (inner, len) = delimited(rest, pos, "*", Sigil::Star, ahead)?;
    Some((Inline::marked(inner, Mark::Bold), len))
}

fn italic(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (inner, len) = delimited(rest, pos, "_", Sigil::Underscore, ahead)?;
    Some((Inline::marked(inner, Mark::Italic), len))
}

fn underline(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (inner, len) = delimited(rest, pos, "++", Sigil::DoublePlus, ahead)?;
    Some((Inline::marked(inner, Mark::Underline), len))
}

fn strike(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (inner, len) = delimited(rest, pos, "~", Sigil::Tilde, ahead)?;
    Some((Inline::marked(inner, Mark::Strike), len))
}

// Only built-in shortcodes become nodes; anything else stays literal text.
fn emoji_shortcode(rest: &str, pos: usize, ahead: &mut Lookahead) -> Option<(Inline, usize)> {
    let (name, len) = delimited(rest, pos, ":", Sigil::Colon, ahead)?;
    if !emoji::is_shortcode_name(name) {
        return None;
    }
    let unicode = emoji::resolve(name)?;
    Some((
        Inline::Emoji {
            shortcode: name.to_string(),
            unicode: Some(unicode.to_string()),
            image_url: None,
        },
        len,
    ))
}
