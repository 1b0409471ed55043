//! Flat render-time segments of stored mrkdwn.
//!
//! Segments are produced for display only and never turned back into a
//! document tree. Two scanners share one loop: [`to_segments`] recognizes
//! every token a message renderer cares about, [`from_storage_text`] only
//! the mention tokens written by the storage converter.

use serde::{Deserialize, Serialize};

use crate::block::SpecialKind;
use crate::emoji::is_shortcode_name;
use crate::inline::{Lookahead, Sigil, angle_token, delimited, mention_id};

/// A render-time token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MrkdwnSegment {
    Text { text: String },
    LineBreak,
    UserMention { id: String },
    SpecialMention { kind: SpecialKind },
    ChannelMention { id: String },
    EmojiShortcode { name: String },
}

impl MrkdwnSegment {
    pub fn text(text: impl Into<String>) -> Self {
        MrkdwnSegment::Text { text: text.into() }
    }
}

#[derive(Clone, Copy)]
enum Scan {
    /// Mentions only
    Storage,
    /// Mentions, channels, line breaks and emoji shortcodes
    Render,
}

/// Split stored text into display segments.
pub fn to_segments(text: &str) -> Vec<MrkdwnSegment> {
    scan(text, Scan::Render)
}

/// Split stored text into text runs and user/special mention segments.
///
/// Adjacent tokens never get an empty text segment between them.
pub fn from_storage_text(text: &str) -> Vec<MrkdwnSegment> {
    scan(text, Scan::Storage)
}

fn scan(text: &str, mode: Scan) -> Vec<MrkdwnSegment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut ahead = Lookahead::new(text);
    let mut pos = 0;

    while let Some(ch) = text[pos..].chars().next() {
        match token_at(&text[pos..], pos, mode, &mut ahead) {
            Some((segment, len)) => {
                if !plain.is_empty() {
                    segments.push(MrkdwnSegment::Text {
                        text: std::mem::take(&mut plain),
                    });
                }
                segments.push(segment);
                pos += len;
            }
            None => {
                plain.push(ch);
                pos += ch.len_utf8();
            }
        }
    }

    if !plain.is_empty() {
        segments.push(MrkdwnSegment::Text { text: plain });
    }
    segments
}

fn token_at(
    rest: &str,
    pos: usize,
    mode: Scan,
    ahead: &mut Lookahead,
) -> Option<(MrkdwnSegment, usize)> {
    if let Some((body, len)) = angle_token(rest, pos, "<@", ahead) {
        let id = mention_id(body)?;
        return Some((MrkdwnSegment::UserMention { id: id.to_string() }, len));
    }
    if let Some((body, len)) = angle_token(rest, pos, "<!", ahead) {
        let kind = SpecialKind::from_name(mention_id(body)?)?;
        return Some((MrkdwnSegment::SpecialMention { kind }, len));
    }
    if let Scan::Storage = mode {
        return None;
    }

    if let Some((body, len)) = angle_token(rest, pos, "<#", ahead) {
        let id = mention_id(body)?;
        return Some((MrkdwnSegment::ChannelMention { id: id.to_string() }, len));
    }
    if rest.starts_with("\r\n") {
        return Some((MrkdwnSegment::LineBreak, 2));
    }
    if rest.starts_with('\n') {
        return Some((MrkdwnSegment::LineBreak, 1));
    }
    // Any well-formed shortcode; custom emoji are resolved by the renderer
    let (name, len) = delimited(rest, pos, ":", Sigil::Colon, ahead)?;
    is_shortcode_name(name).then(|| {
        (
            MrkdwnSegment::EmojiShortcode {
                name: name.to_string(),
            },
            len,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_mentions() {
        assert_eq!(
            from_storage_text("Hey <@u1> and <!here>!"),
            vec![
                MrkdwnSegment::text("Hey "),
                MrkdwnSegment::UserMention { id: "u1".into() },
                MrkdwnSegment::text(" and "),
                MrkdwnSegment::SpecialMention {
                    kind: SpecialKind::Here
                },
                MrkdwnSegment::text("!"),
            ]
        );
    }

    #[test]
    fn adjacent_tokens_have_no_empty_text() {
        assert_eq!(
            from_storage_text("<@a><@b><!everyone>"),
            vec![
                MrkdwnSegment::UserMention { id: "a".into() },
                MrkdwnSegment::UserMention { id: "b".into() },
                MrkdwnSegment::SpecialMention {
                    kind: SpecialKind::Everyone
                },
            ]
        );
        assert!(from_storage_text("").is_empty());
    }

    #[test]
    fn storage_scan_leaves_other_tokens_as_text() {
        assert_eq!(
            from_storage_text("<#C1> :fire:\n<!nope> <@ >"),
            vec![MrkdwnSegment::text("<#C1> :fire:\n<!nope> <@ >")]
        );
    }

    #[test]
    fn render_segments() {
        assert_eq!(
            to_segments("hi <@U1|ann> in <#C1|general>\n:partyparrot: <!channel>"),
            vec![
                MrkdwnSegment::text("hi "),
                MrkdwnSegment::UserMention { id: "U1".into() },
                MrkdwnSegment::text(" in "),
                MrkdwnSegment::ChannelMention { id: "C1".into() },
                MrkdwnSegment::LineBreak,
                MrkdwnSegment::EmojiShortcode {
                    name: "partyparrot".into()
                },
                MrkdwnSegment::text(" "),
                MrkdwnSegment::SpecialMention {
                    kind: SpecialKind::Channel
                },
            ]
        );
    }

    #[test]
    fn render_colons_without_shortcode() {
        assert_eq!(
            to_segments("a: b :c d:"),
            vec![MrkdwnSegment::text("a: b :c d:")]
        );
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_string(&to_segments("<!here>\n")).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"special_mention","kind":"here"},{"type":"line_break"}]"#
        );
    }

    #[test]
    fn long_line_of_unmatched_openers() {
        for opener in ["<", "<@", "<!", "<#", ":"] {
            let line = opener.repeat(100_000);
            assert_eq!(to_segments(&line), vec![MrkdwnSegment::text(line.clone())]);
            assert_eq!(from_storage_text(&line), vec![MrkdwnSegment::text(line.clone())]);
        }
    }
}
