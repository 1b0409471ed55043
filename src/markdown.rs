use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tracing::trace;

use crate::block::{Block, Document, Inline, Mark, MarkSet};

/// Convert CommonMark text into a document.
///
/// Markdown has no underline, so only bold, italic, strike, code and link
/// marks appear. Nested lists are flattened into their parent's items, and
/// combined emphasis yields runs carrying several marks.
pub fn parse(markdown: &str) -> Document {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut state = ParseState::default();

    for event in parser {
        process_event(event, &mut state);
    }

    let mut blocks = state.containers.pop().unwrap_or_default();
    if blocks.is_empty() {
        blocks.push(Block::empty_paragraph());
    }
    trace!(blocks = blocks.len(), "imported markdown");
    Document::new(blocks)
}

struct ParseState {
    // Current inline content being built
    spans: Vec<Inline>,
    // Marks applied to text at this point
    marks: Vec<Mark>,

    // Current heading level (if in a heading)
    heading_level: Option<u8>,

    // Code block state
    in_code_block: bool,
    code_language: Option<String>,
    code_content: String,

    // Open lists, innermost last
    list_stack: Vec<ListBuilder>,

    // Block sinks: the document root plus one per open blockquote
    containers: Vec<Vec<Block>>,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            spans: Vec::new(),
            marks: Vec::new(),
            heading_level: None,
            in_code_block: false,
            code_language: None,
            code_content: String::new(),
            list_stack: Vec::new(),
            containers: vec![Vec::new()],
        }
    }
}

struct ListBuilder {
    ordered: bool,
    items: Vec<Vec<Inline>>,
    current_item: Option<Vec<Inline>>,
    // Blocks met inside items, emitted right after the list
    trailing: Vec<Block>,
}

impl ListBuilder {
    /// Move the item in progress (plus any loose spans) into `items`.
    fn flush_item(&mut self, spans: Vec<Inline>) {
        match self.current_item.take() {
            Some(mut item) => {
                item.extend(spans);
                self.items.push(item);
            }
            None if !spans.is_empty() => self.items.push(spans),
            None => {}
        }
    }
}

impl ParseState {
    fn push_block(&mut self, block: Block) {
        if let Some(list) = self.list_stack.last_mut() {
            list.trailing.push(block);
        } else if let Some(container) = self.containers.last_mut() {
            container.push(block);
        }
    }

    fn push_text(&mut self, text: &str) {
        let marks: MarkSet = self.marks.iter().cloned().collect();
        if let Some(Inline::Text {
            text: last,
            marks: last_marks,
        }) = self.spans.last_mut()
            && *last_marks == marks
        {
            last.push_str(text);
            return;
        }
        self.spans.push(Inline::Text {
            text: text.to_string(),
            marks,
        });
    }

    fn pop_mark(&mut self) {
        self.marks.pop();
    }
}

fn process_event(event: Event, state: &mut ParseState) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.heading_level = Some(heading_level_to_u8(level));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(level) = state.heading_level.take() {
                let content = std::mem::take(&mut state.spans);
                state.push_block(Block::Heading { level, content });
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => {}
        Event::End(TagEnd::Paragraph) => {
            let content = std::mem::take(&mut state.spans);
            // If we're in a list item, add to that instead
            if let Some(list) = state.list_stack.last_mut() {
                let item = list.current_item.get_or_insert_with(Vec::new);
                if !item.is_empty() && !content.is_empty() {
                    item.push(Inline::HardBreak);
                }
                item.extend(content);
            } else if !content.is_empty() {
                state.push_block(Block::Paragraph { content });
            }
        }

        // Text content
        Event::Text(text) => {
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                state.push_text(&text);
            }
        }
        Event::Html(html) | Event::InlineHtml(html) => {
            state.push_text(&html);
        }

        // Inline code
        Event::Code(code) => {
            let mut marks: MarkSet = state.marks.iter().cloned().collect();
            marks.insert(Mark::Code);
            state.spans.push(Inline::Text {
                text: code.into_string(),
                marks,
            });
        }

        // Formatting
        Event::Start(Tag::Strong) => state.marks.push(Mark::Bold),
        Event::Start(Tag::Emphasis) => state.marks.push(Mark::Italic),
        Event::Start(Tag::Strikethrough) => state.marks.push(Mark::Strike),
        Event::Start(Tag::Link { dest_url, .. }) => state.marks.push(Mark::Link {
            href: dest_url.into_string(),
        }),
        Event::End(TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::Link) => {
            state.pop_mark();
        }

        // Code blocks
        Event::Start(Tag::CodeBlock(kind)) => {
            state.in_code_block = true;
            state.code_language = match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.into_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            };
            state.code_content.clear();
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let content = std::mem::take(&mut state.code_content);
            let language = state.code_language.take();
            state.push_block(Block::CodeBlock { language, content });
        }

        // Lists
        Event::Start(Tag::List(first_item)) => {
            // Tight parent items arrive as bare text; park it before nesting
            let loose = std::mem::take(&mut state.spans);
            if let Some(parent) = state.list_stack.last_mut() {
                parent.current_item.get_or_insert_with(Vec::new).extend(loose);
            }
            state.list_stack.push(ListBuilder {
                ordered: first_item.is_some(),
                items: Vec::new(),
                current_item: None,
                trailing: Vec::new(),
            });
        }
        Event::End(TagEnd::List(_)) => {
            if let Some(list) = state.list_stack.pop() {
                if let Some(parent) = state.list_stack.last_mut() {
                    // Nested items follow the parent item they belong to
                    parent.flush_item(Vec::new());
                    parent.items.extend(list.items);
                    parent.trailing.extend(list.trailing);
                } else {
                    state.push_block(if list.ordered {
                        Block::OrderedList { items: list.items }
                    } else {
                        Block::BulletList { items: list.items }
                    });
                    for block in list.trailing {
                        state.push_block(block);
                    }
                }
            }
        }
        Event::Start(Tag::Item) => {
            if let Some(list) = state.list_stack.last_mut() {
                list.current_item = Some(Vec::new());
            }
        }
        Event::End(TagEnd::Item) => {
            // Collect any remaining spans
            let remaining = std::mem::take(&mut state.spans);
            if let Some(list) = state.list_stack.last_mut() {
                list.flush_item(remaining);
            }
        }

        // Blockquotes
        Event::Start(Tag::BlockQuote(_)) => {
            state.containers.push(Vec::new());
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            // A quote inside a list item hands its text to the item
            if state.containers.len() > 1
                && let Some(blocks) = state.containers.pop()
                && !blocks.is_empty()
            {
                state.push_block(Block::Blockquote { blocks });
            }
        }

        // Horizontal rule
        Event::Rule => {
            state.push_block(Block::Rule);
        }

        // Soft/hard breaks
        Event::SoftBreak => {
            state.push_text(" ");
        }
        Event::HardBreak => {
            state.spans.push(Inline::HardBreak);
        }

        // Ignore other events
        _ => {}
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
