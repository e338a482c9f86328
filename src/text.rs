use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const ELLIPSIS: char = '…';

/// Convert Markdown (news bodies, perk descriptions) into text an embed can show.
///
/// Headings become bold lines, images are dropped, links become masked links.
pub fn markdown_to_discord(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = EmbedRenderer::new();
    for event in Parser::new_ext(input, options) {
        renderer.handle_event(event);
    }
    renderer.finish()
}

/// Clip `input` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut clipped: String = input.chars().take(max_chars - 1).collect();
    let trimmed_len = clipped.trim_end().len();
    clipped.truncate(trimmed_len);
    clipped.push(ELLIPSIS);
    clipped
}

/// Like [`truncate`] but prefers to cut at the last line break that fits.
pub fn truncate_lines(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let budget: String = input.chars().take(max_chars.saturating_sub(1)).collect();
    match budget.rfind('\n') {
        Some(cut) if cut > 0 => {
            let mut clipped = budget[..cut].trim_end().to_string();
            clipped.push('\n');
            clipped.push(ELLIPSIS);
            clipped
        }
        _ => truncate(input, max_chars),
    }
}

#[derive(Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct EmbedRenderer {
    output: Vec<String>,
    links: Vec<String>,
    lists: Vec<ListKind>,
    image_depth: usize,
    in_code_block: bool,
    quote_level: usize,
    at_line_start: bool,
    /// Just wrote a list marker; the item's first paragraph continues on this line.
    item_start: bool,
}

impl EmbedRenderer {
    fn new() -> Self {
        Self {
            output: vec![String::new()],
            links: Vec::new(),
            lists: Vec::new(),
            image_depth: 0,
            in_code_block: false,
            quote_level: 0,
            at_line_start: true,
            item_start: false,
        }
    }

    fn handle_event(&mut self, event: Event) {
        if self.image_depth > 0 {
            match event {
                Event::Start(Tag::Image { .. }) => self.image_depth += 1,
                Event::End(TagEnd::Image) => self.image_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.write(&text),
            Event::Code(code) => {
                self.write("`");
                self.write(&code.replace('`', "'"));
                self.write("`");
            }
            Event::SoftBreak => self.write(" "),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.new_line();
                self.write("───");
                self.new_line();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { .. } => {
                self.block_break();
                self.write("**");
            }
            Tag::BlockQuote => {
                self.block_break();
                self.quote_level += 1;
            }
            Tag::List(start) => {
                self.block_break();
                self.lists.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.line_break();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(next)) => {
                        let current = *next;
                        *next += 1;
                        format!("{}. ", current)
                    }
                    _ => "• ".to_string(),
                };
                self.write(&format!("{}{}", "  ".repeat(depth), marker));
                self.item_start = true;
            }
            Tag::Emphasis => self.write("*"),
            Tag::Strong => self.write("**"),
            Tag::Strikethrough => self.write("~~"),
            Tag::CodeBlock(_) => {
                self.block_break();
                self.write("```");
                self.new_line();
                self.in_code_block = true;
            }
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.output.push(String::new());
            }
            Tag::Image { .. } => self.image_depth = 1,
            Tag::Paragraph => self.block_break(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => self.write("**"),
            TagEnd::BlockQuote => self.quote_level = self.quote_level.saturating_sub(1),
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Emphasis => self.write("*"),
            TagEnd::Strong => self.write("**"),
            TagEnd::Strikethrough => self.write("~~"),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.line_break();
                self.write("```");
            }
            TagEnd::Link => self.end_link(),
            _ => {}
        }
    }

    fn end_link(&mut self) {
        let text = self.output.pop().unwrap_or_default();
        let Some(url) = self.links.pop() else {
            self.write(&text);
            return;
        };

        let text = text.trim();
        if text.is_empty() || text == url {
            self.write(&url);
        } else {
            self.write(&format!("[{}]({})", text, url));
        }
    }

    /// Start a new block, separated from the previous one by a blank line.
    fn block_break(&mut self) {
        if self.current().is_empty() || self.item_start {
            return;
        }
        self.line_break();
        if !self.current().ends_with("\n\n") && self.lists.is_empty() {
            self.new_line();
        }
    }

    fn line_break(&mut self) {
        if !self.current().is_empty() && !self.current().ends_with('\n') {
            self.new_line();
        }
    }

    fn new_line(&mut self) {
        self.raw("\n");
        self.at_line_start = true;
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start && self.quote_level > 0 && !self.in_code_block {
            self.raw(&"> ".repeat(self.quote_level));
        }
        self.at_line_start = false;
        self.item_start = false;
        self.raw(text);
    }

    fn raw(&mut self, text: &str) {
        if let Some(target) = self.output.last_mut() {
            target.push_str(text);
        }
    }

    fn current(&self) -> &str {
        self.output.last().map(String::as_str).unwrap_or("")
    }

    fn finish(mut self) -> String {
        while self.output.len() > 1 {
            let inner = self.output.pop().unwrap_or_default();
            self.raw(&inner);
        }
        self.output
            .pop()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}
