//! `@mention` entry and storage.
//!
//! Offsets here count `char`s, not bytes: a cursor position of 9 in
//! `"hello @al"` sits after the final `l`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::block::{Block, Document, Inline, SpecialKind};
use crate::config::{Config, MentionConfig};
use crate::rank::rank_by;
use crate::segment::{MrkdwnSegment, from_storage_text};

/// An in-progress `@query` under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionTrigger {
    pub is_active: bool,
    pub query: String,
    /// Char offset of the `@`
    pub start_index: usize,
}

/// Entry of the member directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Member {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Public,
    Private,
    Direct,
}

/// Entry of the channel directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
}

/// A candidate offered while typing a mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MentionOption {
    User {
        id: String,
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
    },
    Special {
        id: SpecialKind,
    },
}

impl MentionOption {
    pub fn display_name(&self) -> &str {
        match self {
            MentionOption::User { display_name, .. } => display_name,
            MentionOption::Special { id } => id.as_str(),
        }
    }
}

impl From<&Member> for MentionOption {
    fn from(member: &Member) -> Self {
        MentionOption::User {
            id: member.user_id.clone(),
            display_name: member.display_name.clone(),
            avatar_url: member.avatar_url.clone(),
        }
    }
}

/// Text after a mention was inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub content: String,
    pub cursor_pos: usize,
}

/// Find the mention being typed at `cursor_pos`.
///
/// The `@` must start the text or follow whitespace, and the cursor must be
/// inside the whitespace-free run that follows it. Once a space is typed
/// after the query the trigger is gone until the user deletes back into it.
pub fn detect_trigger(text: &str, cursor_pos: usize) -> Option<MentionTrigger> {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor_pos.min(chars.len());

    let start = chars[..cursor]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |ws| ws + 1);
    if chars.get(start) != Some(&'@') || start >= cursor {
        return None;
    }

    Some(MentionTrigger {
        is_active: true,
        query: chars[start + 1..cursor].iter().collect(),
        start_index: start,
    })
}

/// Rank the broadcast mentions and `members` against `query`, without a limit.
pub fn resolve_mention_options(query: &str, members: &[Member]) -> Vec<MentionOption> {
    let config = MentionConfig {
        max_options: 0,
        ..Config::compiled_default().mentions.clone()
    };
    resolve_mention_options_with_config(query, members, &config)
}

/// Rank the broadcast mentions and `members` against `query`.
///
/// Exact display-name matches come first, then prefix, then substring
/// matches, all case-insensitive. Ties keep candidate order: broadcast
/// mentions, then the directory in its given order.
pub fn resolve_mention_options_with_config(
    query: &str,
    members: &[Member],
    config: &MentionConfig,
) -> Vec<MentionOption> {
    let broadcast = SpecialKind::ALL
        .into_iter()
        .filter(|_| config.broadcast)
        .map(|id| MentionOption::Special { id });
    let candidates = broadcast.chain(members.iter().map(MentionOption::from));

    let mut options = rank_by(candidates, query, |option| option.display_name());
    if config.max_options > 0 {
        options.truncate(config.max_options);
    }
    options
}

/// Replace the triggered `@query` with `@<display name> `.
pub fn insert_mention(text: &str, trigger: &MentionTrigger, option: &MentionOption) -> Insertion {
    let chars: Vec<char> = text.chars().collect();
    let start = trigger.start_index.min(chars.len());
    let end = (start + 1 + trigger.query.chars().count()).min(chars.len());

    let mention = format!("@{} ", option.display_name());
    let mut content: String = chars[..start].iter().collect();
    content.push_str(&mention);
    content.extend(&chars[end..]);

    Insertion {
        content,
        cursor_pos: start + mention.chars().count(),
    }
}

/// Rewrite typed `@Display Name` mentions as storage tokens.
///
/// A mention must start the text or follow whitespace and be followed by
/// whitespace or the end of the text. Broadcast names always become
/// `<!kind>`; other names become `<@id>` when found in `names`, longest name
/// first, and are otherwise left alone.
pub fn to_storage_text(text: &str, names: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut after_space = true;

    while let Some(ch) = text[pos..].chars().next() {
        if ch == '@' && after_space {
            let rest = &text[pos + 1..];
            if let Some((token, len)) = storage_token(rest, names) {
                out.push_str(&token);
                pos += 1 + len;
                after_space = false;
                continue;
            }
            trace!(at = pos, "unresolved mention left as text");
        }
        out.push(ch);
        pos += ch.len_utf8();
        after_space = ch.is_whitespace();
    }
    out
}

fn storage_token(rest: &str, names: &HashMap<String, String>) -> Option<(String, usize)> {
    let ends_at_boundary =
        |name: &str| rest[name.len()..].chars().next().is_none_or(char::is_whitespace);

    if let Some(kind) = SpecialKind::ALL.into_iter().find(|kind| {
        rest.starts_with(kind.as_str()) && ends_at_boundary(kind.as_str())
    }) {
        return Some((format!("<!{}>", kind.as_str()), kind.as_str().len()));
    }

    names
        .iter()
        .filter(|(name, _)| !name.is_empty() && rest.starts_with(name.as_str()))
        .filter(|(name, _)| ends_at_boundary(name))
        .max_by_key(|(name, _)| name.len())
        .map(|(name, id)| (format!("<@{id}>"), name.len()))
}

/// Render stored text back into editable text, turning `<@id>` into
/// `@Display Name` and `<!kind>` into `@kind`.
///
/// Ids missing from `members` keep their storage form.
pub fn from_storage_display(text: &str, members: &[Member]) -> String {
    from_storage_text(text)
        .into_iter()
        .map(|segment| match segment {
            MrkdwnSegment::UserMention { id } => {
                match members.iter().find(|member| member.user_id == id) {
                    Some(member) => format!("@{}", member.display_name),
                    None => format!("<@{id}>"),
                }
            }
            MrkdwnSegment::SpecialMention { kind } => format!("@{}", kind.as_str()),
            MrkdwnSegment::Text { text } => text,
            MrkdwnSegment::LineBreak => "\n".to_string(),
            MrkdwnSegment::ChannelMention { id } => format!("<#{id}>"),
            MrkdwnSegment::EmojiShortcode { name } => format!(":{name}:"),
        })
        .collect()
}

/// Fill in missing channel mention labels from the channel directory.
pub fn with_channel_labels(mut document: Document, channels: &[Channel]) -> Document {
    for block in &mut document.blocks {
        label_block(block, channels);
    }
    document
}

fn label_block(block: &mut Block, channels: &[Channel]) {
    match block {
        Block::Paragraph { content } | Block::Heading { content, .. } => {
            label_inlines(content, channels);
        }
        Block::BulletList { items } | Block::OrderedList { items } => {
            for item in items {
                label_inlines(item, channels);
            }
        }
        Block::Blockquote { blocks } => {
            for inner in blocks {
                label_block(inner, channels);
            }
        }
        Block::CodeBlock { .. } | Block::Rule => {}
    }
}

fn label_inlines(inlines: &mut [Inline], channels: &[Channel]) {
    for inline in inlines {
        if let Inline::ChannelMention { id, label: label @ None } = inline
            && let Some(channel) = channels.iter().find(|channel| channel.id == *id)
        {
            *label = Some(channel.name.clone());
        }
    }
}
