use tracing::trace;

use crate::block::{Block, Document};
use crate::inline::parse_inlines;

const FENCE: &str = "```";
const RULE: &str = "---";
const BULLETS: &[&str] = &["• ", "- "];

/// Parse a mrkdwn buffer into a document.
///
/// Lines are classified top to bottom; runs of quote, bullet and ordered
/// lines group into one block each. The result always holds at least one
/// block: empty input yields a single empty paragraph.
pub fn parse(text: &str) -> Document {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(opening) = line.strip_prefix(FENCE) {
            i = code_block(opening, &lines, i + 1, &mut blocks);
        } else if quote_line(line).is_some() {
            let quoted = take_run(&lines, &mut i, quote_line);
            let content = parse_inlines(&quoted.join("\n"));
            blocks.push(Block::Blockquote {
                blocks: vec![Block::Paragraph { content }],
            });
        } else if bullet_item(line).is_some() {
            let items = take_run(&lines, &mut i, bullet_item);
            blocks.push(Block::BulletList {
                items: items.into_iter().map(parse_inlines).collect(),
            });
        } else if ordered_item(line).is_some() {
            let items = take_run(&lines, &mut i, ordered_item);
            blocks.push(Block::OrderedList {
                items: items.into_iter().map(parse_inlines).collect(),
            });
        } else if line.trim_end() == RULE {
            blocks.push(Block::Rule);
            i += 1;
        } else if line.trim().is_empty() {
            i += 1;
        } else if let Some((level, inner)) = heading_line(line) {
            blocks.push(Block::Heading {
                level,
                content: parse_inlines(inner),
            });
            i += 1;
        } else {
            blocks.push(Block::Paragraph {
                content: parse_inlines(line),
            });
            i += 1;
        }
    }

    if blocks.is_empty() {
        blocks.push(Block::empty_paragraph());
    }
    trace!(blocks = blocks.len(), lines = lines.len(), "segmented mrkdwn");
    Document::new(blocks)
}

/// Consume the contiguous run of lines accepted by `classify`, returning
/// each line's stripped content.
fn take_run<'a>(
    lines: &[&'a str],
    i: &mut usize,
    classify: fn(&'a str) -> Option<&'a str>,
) -> Vec<&'a str> {
    let mut run = Vec::new();
    while let Some(content) = lines.get(*i).copied().and_then(classify) {
        run.push(content);
        *i += 1;
    }
    run
}

/// Parse a fenced code block whose opening line had `opening` after the
/// fence. Returns the index of the first line after the block.
fn code_block(opening: &str, lines: &[&str], mut i: usize, blocks: &mut Vec<Block>) -> usize {
    // ```code``` on a single line
    if let Some(inner) = opening.strip_suffix(FENCE) {
        blocks.push(Block::CodeBlock {
            language: None,
            content: if inner.is_empty() {
                String::new()
            } else {
                format!("{inner}\n")
            },
        });
        return i;
    }

    let language = Some(opening.trim())
        .filter(|lang| !lang.is_empty())
        .map(str::to_string);
    let mut content = String::new();
    while let Some(line) = lines.get(i) {
        i += 1;
        if line.trim_end() == FENCE {
            break;
        }
        content.push_str(line);
        content.push('\n');
    }
    blocks.push(Block::CodeBlock { language, content });
    i
}

fn quote_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn bullet_item(line: &str) -> Option<&str> {
    BULLETS.iter().find_map(|bullet| line.strip_prefix(bullet))
}

fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

/// A line that is entirely `**text**` or `***text***`, with no star inside
/// the text, is a heading.
fn heading_line(line: &str) -> Option<(u8, &str)> {
    let line = line.trim();
    for level in [3u8, 2] {
        let stars = &"***"[..level as usize];
        let inner = line
            .strip_prefix(stars)
            .and_then(|rest| rest.strip_suffix(stars));
        if let Some(inner) = inner
            && !inner.is_empty()
            && !inner.contains('*')
        {
            return Some((level, inner));
        }
    }
    None
}
