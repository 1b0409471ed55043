use std::mem::discriminant;

use serde::{Deserialize, Serialize};

/// One of the three broadcast mention targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    Here,
    Channel,
    Everyone,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 3] = [SpecialKind::Here, SpecialKind::Channel, SpecialKind::Everyone];

    pub fn as_str(self) -> &'static str {
        match self {
            SpecialKind::Here => "here",
            SpecialKind::Channel => "channel",
            SpecialKind::Everyone => "everyone",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Inline formatting mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link { href: String },
}

impl Mark {
    fn same_kind(&self, other: &Mark) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Ordered set of marks, at most one per mark kind.
///
/// Inserting a mark whose kind is already present replaces it in place, so a
/// second `Link` overwrites the href rather than stacking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(mark: Mark) -> Self {
        Self(vec![mark])
    }

    pub fn insert(&mut self, mark: Mark) {
        match self.0.iter_mut().find(|m| m.same_kind(&mark)) {
            Some(existing) => *existing = mark,
            None => self.0.push(mark),
        }
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.0.iter().any(|m| m.same_kind(mark))
    }

    /// Href of the `Link` mark, if any.
    pub fn link(&self) -> Option<&str> {
        self.0.iter().find_map(|m| match m {
            Mark::Link { href } => Some(href.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

/// Inline content of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "MarkSet::is_empty")]
        marks: MarkSet,
    },
    HardBreak,
    UserMention {
        id: String,
    },
    SpecialMention {
        kind: SpecialKind,
    },
    ChannelMention {
        id: String,
        /// Display label; parse-side metadata only, never serialized
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Emoji {
        shortcode: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unicode: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
}

impl Inline {
    /// Unformatted text run.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: MarkSet::new(),
        }
    }

    /// Text run carrying a single mark.
    pub fn marked(text: impl Into<String>, mark: Mark) -> Self {
        Inline::Text {
            text: text.into(),
            marks: MarkSet::single(mark),
        }
    }
}

/// Block-level elements of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    BulletList {
        items: Vec<Vec<Inline>>,
    },
    OrderedList {
        items: Vec<Vec<Inline>>,
    },
    Blockquote {
        blocks: Vec<Block>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Rule,
}

impl Block {
    pub fn empty_paragraph() -> Self {
        Block::Paragraph {
            content: Vec::new(),
        }
    }
}

/// Root of the editor tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Flatten the document to unformatted text, one line per block line.
    ///
    /// Used for search indexing: sigils are dropped, mentions become `@id`,
    /// `@here` or `#label`, and emoji fall back to `:shortcode:` when no
    /// unicode form is known.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            block_text(block, &mut lines);
        }
        lines.join("\n")
    }
}

fn block_text(block: &Block, lines: &mut Vec<String>) {
    match block {
        Block::Paragraph { content } | Block::Heading { content, .. } => {
            lines.push(inlines_text(content));
        }
        Block::BulletList { items } | Block::OrderedList { items } => {
            lines.extend(items.iter().map(|item| inlines_text(item)));
        }
        Block::Blockquote { blocks } => {
            for inner in blocks {
                block_text(inner, lines);
            }
        }
        Block::CodeBlock { content, .. } => {
            lines.push(content.trim_end_matches('\n').to_string());
        }
        Block::Rule => {}
    }
}

fn inlines_text(inlines: &[Inline]) -> String {
    inlines.iter().map(inline_text).collect()
}

fn inline_text(inline: &Inline) -> String {
    match inline {
        Inline::Text { text, .. } => text.clone(),
        Inline::HardBreak => "\n".to_string(),
        Inline::UserMention { id } => format!("@{id}"),
        Inline::SpecialMention { kind } => format!("@{}", kind.as_str()),
        Inline::ChannelMention { id, label } => format!("#{}", label.as_deref().unwrap_or(id)),
        Inline::Emoji {
            shortcode, unicode, ..
        } => match unicode {
            Some(unicode) => unicode.clone(),
            None => format!(":{shortcode}:"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_set_replaces_same_kind() {
        let mut marks = MarkSet::single(Mark::Link {
            href: "https://a.example".into(),
        });
        marks.insert(Mark::Bold);
        marks.insert(Mark::Link {
            href: "https://b.example".into(),
        });
        assert_eq!(marks.len(), 2);
        assert_eq!(marks.link(), Some("https://b.example"));
        assert!(marks.contains(&Mark::Bold));
        assert!(!marks.contains(&Mark::Code));
    }

    #[test]
    fn special_kind_names() {
        assert_eq!(SpecialKind::from_name("here"), Some(SpecialKind::Here));
        assert_eq!(SpecialKind::from_name("everyone"), Some(SpecialKind::Everyone));
        assert_eq!(SpecialKind::from_name("room"), None);
    }

    #[test]
    fn plain_text_drops_sigils() {
        let doc = Document::new(vec![
            Block::Paragraph {
                content: vec![
                    Inline::text("hi "),
                    Inline::marked("there", Mark::Bold),
                    Inline::text(" "),
                    Inline::SpecialMention {
                        kind: SpecialKind::Here,
                    },
                ],
            },
            Block::BulletList {
                items: vec![
                    vec![Inline::ChannelMention {
                        id: "C1".into(),
                        label: Some("general".into()),
                    }],
                    vec![Inline::Emoji {
                        shortcode: "partyparrot".into(),
                        unicode: None,
                        image_url: Some("https://img.example/p.gif".into()),
                    }],
                ],
            },
            Block::Rule,
            Block::CodeBlock {
                language: None,
                content: "let x = 1;\n".into(),
            },
        ]);
        assert_eq!(
            doc.plain_text(),
            "hi there @here\n#general\n:partyparrot:\nlet x = 1;"
        );
    }

    #[test]
    fn json_shape() {
        let block = Block::Paragraph {
            content: vec![Inline::marked("x", Mark::Italic), Inline::HardBreak],
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(
            json,
            r#"{"type":"paragraph","content":[{"type":"text","text":"x","marks":[{"type":"italic"}]},{"type":"hard_break"}]}"#
        );
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }
}
