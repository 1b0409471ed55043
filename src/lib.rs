mod block;
mod config;
mod emoji;
mod inline;
mod markdown;
mod mention;
mod mrkdwn;
mod parser;
mod rank;
mod segment;

use std::collections::HashMap;

pub use block::{Block, Document, Inline, Mark, MarkSet, SpecialKind};
pub use config::{BulletMarker, Config, ConfigError, EmojiConfig, MentionConfig, SerializerConfig};
pub use emoji::EmojiGlyph;
pub use inline::{Tokenizer, parse_inlines};
pub use mention::{
    Channel, ChannelKind, Insertion, Member, MentionOption, MentionTrigger, from_storage_display,
    with_channel_labels,
};
pub use segment::MrkdwnSegment;

/// Parse mrkdwn text into a document.
pub fn parse(text: &str) -> Document {
    parser::parse(text)
}

/// Convert a document to mrkdwn using default config.
pub fn serialize(document: &Document) -> String {
    serialize_with_config(document, Config::compiled_default())
}

/// Convert a document to mrkdwn with custom config.
pub fn serialize_with_config(document: &Document, config: &Config) -> String {
    mrkdwn::blocks_to_mrkdwn(&document.blocks, &config.serializer)
}

/// Split stored mrkdwn into flat display segments.
pub fn to_segments(text: &str) -> Vec<MrkdwnSegment> {
    segment::to_segments(text)
}

/// Flatten a document to unformatted text for search indexing.
pub fn plain_text(document: &Document) -> String {
    document.plain_text()
}

/// Parse CommonMark text into a document.
pub fn from_markdown(markdown: &str) -> Document {
    markdown::parse(markdown)
}

/// Convert CommonMark to mrkdwn using default config.
pub fn markdown_to_mrkdwn(markdown: &str) -> String {
    markdown_to_mrkdwn_with_config(markdown, Config::compiled_default())
}

/// Convert CommonMark to mrkdwn with custom config.
pub fn markdown_to_mrkdwn_with_config(markdown: &str, config: &Config) -> String {
    serialize_with_config(&from_markdown(markdown), config)
}

/// Find the `@query` being typed at `cursor_pos` (a char offset).
pub fn detect_trigger(text: &str, cursor_pos: usize) -> Option<MentionTrigger> {
    mention::detect_trigger(text, cursor_pos)
}

/// Rank mention candidates for `query`.
pub fn resolve_mention_options(query: &str, members: &[Member]) -> Vec<MentionOption> {
    mention::resolve_mention_options(query, members)
}

/// Rank mention candidates for `query`, honoring the mention config.
pub fn resolve_mention_options_with_config(
    query: &str,
    members: &[Member],
    config: &Config,
) -> Vec<MentionOption> {
    mention::resolve_mention_options_with_config(query, members, &config.mentions)
}

/// Replace the triggered `@query` in `text` with the chosen option.
pub fn insert_mention(text: &str, trigger: &MentionTrigger, option: &MentionOption) -> Insertion {
    mention::insert_mention(text, trigger, option)
}

/// Rewrite typed `@Name` mentions as `<@id>` / `<!kind>` storage tokens.
pub fn to_storage_text(text: &str, names: &HashMap<String, String>) -> String {
    mention::to_storage_text(text, names)
}

/// Split stored text into text and mention segments.
pub fn from_storage_text(text: &str) -> Vec<MrkdwnSegment> {
    segment::from_storage_text(text)
}

/// Ranked emoji shortcode search.
pub fn search_emoji(query: &str, limit: usize) -> Vec<&'static str> {
    emoji::search(query, limit)
}

/// Ranked emoji shortcode search with a custom common shortlist.
pub fn search_emoji_with_config(query: &str, limit: usize, config: &Config) -> Vec<&'static str> {
    emoji::search_with_config(query, limit, &config.emoji)
}

/// Unicode form of a built-in shortcode.
pub fn resolve_emoji(shortcode: &str) -> Option<&'static str> {
    emoji::resolve(shortcode)
}

/// How to draw a shortcode, checking workspace custom emoji first.
pub fn render_emoji<'a>(shortcode: &str, custom: &'a HashMap<String, String>) -> EmojiGlyph<'a> {
    emoji::render(shortcode, custom)
}
