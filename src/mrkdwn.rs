use crate::block::{Block, Inline, Mark, MarkSet};
use crate::config::SerializerConfig;

/// Marks that wrap text in a symmetric sigil, innermost first.
const WRAPPING_MARKS: &[(Mark, &str)] = &[
    (Mark::Bold, "*"),
    (Mark::Italic, "_"),
    (Mark::Strike, "~"),
    (Mark::Underline, "++"),
];

/// Convert blocks to mrkdwn.
///
/// Every block ends in exactly one newline; the finished text is trimmed
/// once at the end, so an empty document serializes to `""`.
pub fn blocks_to_mrkdwn(blocks: &[Block], config: &SerializerConfig) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, config, &mut out);
    }
    out.trim().to_string()
}

fn emit_block(block: &Block, config: &SerializerConfig, out: &mut String) {
    match block {
        Block::Paragraph { content } => {
            inlines_to_mrkdwn(content, out);
            out.push('\n');
        }
        Block::Heading { level, content } => {
            if !content.is_empty() {
                let level = (*level).clamp(1, config.max_heading_level.max(1));
                let stars = "*".repeat(level as usize);
                out.push_str(&stars);
                heading_inlines_to_mrkdwn(content, out);
                out.push_str(&stars);
            }
            out.push('\n');
        }
        Block::BulletList { items } => {
            for item in items {
                out.push_str(config.bullet.as_str());
                out.push(' ');
                inlines_to_mrkdwn(item, out);
                out.push('\n');
            }
        }
        Block::OrderedList { items } => {
            for (n, item) in items.iter().enumerate() {
                out.push_str(&format!("{}. ", n + 1));
                inlines_to_mrkdwn(item, out);
                out.push('\n');
            }
        }
        Block::Blockquote { blocks } => {
            let mut inner = String::new();
            for block in blocks {
                emit_block(block, config, &mut inner);
            }
            let inner = inner.strip_suffix('\n').unwrap_or(&inner);
            for line in inner.split('\n') {
                if line.is_empty() {
                    out.push('>');
                } else {
                    out.push_str("> ");
                    out.push_str(line);
                }
                out.push('\n');
            }
        }
        Block::CodeBlock { language, content } => {
            out.push_str("```");
            if let Some(lang) = language {
                out.push_str(lang);
            }
            out.push('\n');
            out.push_str(content);
            // Keep the closing fence off the last line of code
            if !content.is_empty() && !content.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        Block::Rule => {
            out.push_str("---\n");
        }
    }
}

fn inlines_to_mrkdwn(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        inline_to_mrkdwn(inline, out);
    }
}

/// Heading stars already read as bold, so a bold mark inside the heading
/// is dropped rather than doubling the stars.
fn heading_inlines_to_mrkdwn(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text, marks } if marks.contains(&Mark::Bold) => {
                let marks: MarkSet = marks
                    .iter()
                    .filter(|mark| **mark != Mark::Bold)
                    .cloned()
                    .collect();
                text_to_mrkdwn(text, &marks, out);
            }
            other => inline_to_mrkdwn(other, out),
        }
    }
}

fn inline_to_mrkdwn(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text { text, marks } => text_to_mrkdwn(text, marks, out),
        Inline::HardBreak => out.push('\n'),
        Inline::UserMention { id } => {
            out.push_str("<@");
            out.push_str(id);
            out.push('>');
        }
        Inline::SpecialMention { kind } => {
            out.push_str("<!");
            out.push_str(kind.as_str());
            out.push('>');
        }
        // The label is display metadata only
        Inline::ChannelMention { id, .. } => {
            out.push_str("<#");
            out.push_str(id);
            out.push('>');
        }
        Inline::Emoji { shortcode, .. } => {
            out.push(':');
            out.push_str(shortcode);
            out.push(':');
        }
    }
}

fn text_to_mrkdwn(text: &str, marks: &MarkSet, out: &mut String) {
    if text.is_empty() {
        return;
    }
    // Code spans drop every other mark
    if marks.contains(&Mark::Code) {
        out.push('`');
        out.push_str(text);
        out.push('`');
        return;
    }

    let mut wrapped = text.to_string();
    for (mark, sigil) in WRAPPING_MARKS {
        if marks.contains(mark) {
            wrapped = format!("{sigil}{wrapped}{sigil}");
        }
    }

    match marks.link() {
        Some(href) if wrapped == href => {
            out.push('<');
            out.push_str(href);
            out.push('>');
        }
        Some(href) => {
            out.push('<');
            out.push_str(href);
            out.push('|');
            out.push_str(&wrapped);
            out.push('>');
        }
        None => out.push_str(&wrapped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Document, SpecialKind};
    use crate::config::BulletMarker;
    use crate::parser::parse;

    fn serialize(blocks: Vec<Block>) -> String {
        blocks_to_mrkdwn(&blocks, &SerializerConfig::default())
    }

    fn paragraph(content: Vec<Inline>) -> Block {
        Block::Paragraph { content }
    }

    #[test]
    fn empty_document() {
        assert_eq!(serialize(vec![]), "");
        assert_eq!(serialize(vec![Block::empty_paragraph()]), "");
    }

    #[test]
    fn marks() {
        assert_eq!(
            serialize(vec![paragraph(vec![
                Inline::marked("b", Mark::Bold),
                Inline::text(" "),
                Inline::marked("i", Mark::Italic),
                Inline::text(" "),
                Inline::marked("u", Mark::Underline),
                Inline::text(" "),
                Inline::marked("s", Mark::Strike),
                Inline::text(" "),
                Inline::marked("c", Mark::Code),
            ])]),
            "*b* _i_ ++u++ ~s~ `c`"
        );
    }

    #[test]
    fn combined_marks_wrap_in_fixed_order() {
        let marks = MarkSet::from_iter([Mark::Underline, Mark::Italic, Mark::Bold]);
        assert_eq!(
            serialize(vec![paragraph(vec![Inline::Text {
                text: "x".into(),
                marks
            }])]),
            "++_*x*_++"
        );
    }

    #[test]
    fn code_ignores_other_marks() {
        let marks = MarkSet::from_iter([
            Mark::Bold,
            Mark::Code,
            Mark::Link {
                href: "https://a.io".into(),
            },
        ]);
        assert_eq!(
            serialize(vec![paragraph(vec![Inline::Text {
                text: "x".into(),
                marks
            }])]),
            "`x`"
        );
    }

    #[test]
    fn links() {
        let href = "https://example.com";
        let link = Mark::Link { href: href.into() };
        assert_eq!(
            serialize(vec![paragraph(vec![
                Inline::marked("site", link.clone()),
                Inline::text(" "),
                Inline::marked(href, link.clone()),
                Inline::text(" "),
                Inline::Text {
                    text: "bold".into(),
                    marks: MarkSet::from_iter([Mark::Bold, link]),
                },
            ])]),
            "<https://example.com|site> <https://example.com> <https://example.com|*bold*>"
        );
    }

    #[test]
    fn mentions_and_emoji() {
        assert_eq!(
            serialize(vec![paragraph(vec![
                Inline::UserMention { id: "U1".into() },
                Inline::SpecialMention {
                    kind: SpecialKind::Channel
                },
                Inline::ChannelMention {
                    id: "C1".into(),
                    label: Some("general".into())
                },
                Inline::Emoji {
                    shortcode: "fire".into(),
                    unicode: Some("🔥".into()),
                    image_url: None
                },
            ])]),
            "<@U1><!channel><#C1>:fire:"
        );
    }

    #[test]
    fn headings_clamp_to_level_three() {
        let heading = |level| Block::Heading {
            level,
            content: vec![Inline::text("T")],
        };
        assert_eq!(serialize(vec![heading(1)]), "*T*");
        assert_eq!(serialize(vec![heading(2)]), "**T**");
        assert_eq!(serialize(vec![heading(3)]), "***T***");
        assert_eq!(serialize(vec![heading(5)]), serialize(vec![heading(3)]));
    }

    #[test]
    fn heading_drops_bold_inside() {
        let doc = Document::new(vec![Block::Heading {
            level: 3,
            content: vec![
                Inline::marked("x", Mark::Bold),
                Inline::text(" "),
                Inline::Text {
                    text: "y".into(),
                    marks: MarkSet::from_iter([Mark::Bold, Mark::Italic]),
                },
            ],
        }]);
        let text = blocks_to_mrkdwn(&doc.blocks, &SerializerConfig::default());
        assert_eq!(text, "***x _y_***");
        assert_eq!(
            parse(&text).blocks,
            vec![Block::Heading {
                level: 3,
                content: vec![Inline::text("x "), Inline::marked("y", Mark::Italic)],
            }]
        );
    }

    #[test]
    fn ordered_list_renumbers_from_one() {
        let doc = parse("5. five\n9. nine\n1. one");
        assert_eq!(
            blocks_to_mrkdwn(&doc.blocks, &SerializerConfig::default()),
            "1. five\n2. nine\n3. one"
        );
    }

    #[test]
    fn bullet_marker_is_configurable() {
        let blocks = vec![Block::BulletList {
            items: vec![vec![Inline::text("a")], vec![Inline::text("b")]],
        }];
        assert_eq!(serialize(blocks.clone()), "• a\n• b");
        let config = SerializerConfig {
            bullet: BulletMarker::Dash,
            ..SerializerConfig::default()
        };
        assert_eq!(blocks_to_mrkdwn(&blocks, &config), "- a\n- b");
    }

    #[test]
    fn blockquote_prefixes_every_line() {
        let doc = parse("> line one\n> line two");
        assert_eq!(
            blocks_to_mrkdwn(&doc.blocks, &SerializerConfig::default()),
            "> line one\n> line two"
        );
    }

    #[test]
    fn blockquote_bare_marker_for_empty_lines() {
        let blocks = vec![Block::Blockquote {
            blocks: vec![
                paragraph(vec![Inline::text("a"), Inline::HardBreak, Inline::HardBreak, Inline::text("b")]),
                Block::CodeBlock {
                    language: None,
                    content: "x\ny".into(),
                },
            ],
        }];
        assert_eq!(serialize(blocks), "> a\n>\n> b\n> ```\n> x\n> y\n> ```");
        assert_eq!(
            serialize(vec![Block::Blockquote { blocks: vec![] }, paragraph(vec![Inline::text("z")])]),
            ">\nz"
        );
    }

    #[test]
    fn code_block_forces_newline_before_fence() {
        let block = |content: &str| Block::CodeBlock {
            language: Some("rust".into()),
            content: content.into(),
        };
        assert_eq!(serialize(vec![block("let x = 1;")]), "```rust\nlet x = 1;\n```");
        assert_eq!(serialize(vec![block("let x = 1;\n")]), "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn blocks_end_in_one_newline() {
        assert_eq!(
            serialize(vec![
                paragraph(vec![Inline::text("a")]),
                Block::Rule,
                paragraph(vec![Inline::text("b")]),
            ]),
            "a\n---\nb"
        );
    }

    #[test]
    fn trims_only_at_top_level() {
        let blocks = vec![
            paragraph(vec![Inline::text("  lead")]),
            Block::Blockquote {
                blocks: vec![paragraph(vec![Inline::text("  indented")])],
            },
        ];
        assert_eq!(serialize(blocks), "lead\n>   indented");
    }

    #[test]
    fn round_trip_simple_paragraphs() {
        let doc = Document::new(vec![
            paragraph(vec![
                Inline::text("plain "),
                Inline::marked("bold", Mark::Bold),
                Inline::text(" and "),
                Inline::marked("it", Mark::Italic),
            ]),
            paragraph(vec![Inline::marked("x + 1", Mark::Code)]),
        ]);
        let text = blocks_to_mrkdwn(&doc.blocks, &SerializerConfig::default());
        assert_eq!(parse(&text), doc);
    }
}
