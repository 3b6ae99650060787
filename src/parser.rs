use std::ops::Range;

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd,
};

use crate::token::Token;

/// Drop a leading YAML front-matter block delimited by `---` lines.
fn strip_frontmatter(markdown: &str) -> &str {
    let Some(rest) = markdown.strip_prefix("---\n") else {
        return markdown;
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" || line.trim_end() == "..." {
            return rest[offset..].trim_start_matches('\n');
        }
    }
    markdown
}

/// Container directives whose body is kept verbatim instead of being parsed.
const RAW_CONTAINERS: &[&str] = &["mermaid"];

/// Tokenize markdown into a flat stream of paired block tokens.
///
/// The stream is always balanced: containers left open at the end of input are
/// closed, and a `</details>` without its opener is kept as plain HTML.
pub fn parse(markdown: &str) -> Vec<Token> {
    let markdown = markdown.replace("\r\n", "\n");
    let markdown = strip_frontmatter(&markdown);
    let mut tokens = Vec::new();

    for segment in split_containers(markdown) {
        match segment {
            Segment::Markdown(text) => tokenize_markdown(text, &mut tokens),
            Segment::Open { name, args } => {
                tokens.push(
                    Token::open(format!("container_{name}_open"), "div")
                        .with_markup(":::")
                        .with_info(args),
                );
            }
            Segment::Raw { name, args, body } => {
                tokens.push(
                    Token::open(format!("container_{name}_open"), "div")
                        .with_markup(":::")
                        .with_info(args)
                        .with_content(body),
                );
                tokens.push(
                    Token::close(format!("container_{name}_close"), "div").with_markup(":::"),
                );
            }
            Segment::Close { name } => {
                tokens.push(
                    Token::close(format!("container_{name}_close"), "div").with_markup(":::"),
                );
            }
        }
    }

    tokens
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Markdown(&'a str),
    Open { name: String, args: String },
    Raw { name: String, args: String, body: String },
    Close { name: String },
}

#[derive(Debug, PartialEq)]
enum Directive {
    Open { name: String, args: String },
    Close,
}

/// Recognise `::: name args` and bare `:::` lines.
fn directive(line: &str) -> Option<Directive> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = line.trim().strip_prefix(":::")?;
    let rest = rest.trim_start_matches(':').trim();
    if rest.is_empty() {
        return Some(Directive::Close);
    }

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let valid = name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return None;
    }

    Some(Directive::Open {
        name: name.to_ascii_lowercase().replace('-', "_"),
        args: args.to_string(),
    })
}

/// Opening or closing code fence marker: fence character and run length.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Cut the document at container directive lines.
fn split_containers(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut raw: Option<(String, String, String)> = None;
    let mut start = 0;
    let mut offset = 0;

    for line in markdown.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = line.trim_end_matches('\n');

        if let Some((name, args, mut body)) = raw.take() {
            if directive(content) == Some(Directive::Close) {
                segments.push(Segment::Raw { name, args, body });
                start = offset;
            } else {
                body.push_str(line);
                raw = Some((name, args, body));
            }
            continue;
        }

        if let Some((ch, len)) = fence {
            if let Some((close_ch, close_len)) = fence_marker(content) {
                let rest = content.trim_start().trim_start_matches(close_ch);
                if close_ch == ch && close_len >= len && rest.trim().is_empty() {
                    fence = None;
                }
            }
            continue;
        }
        if let Some(marker) = fence_marker(content) {
            fence = Some(marker);
            continue;
        }

        match directive(content) {
            Some(Directive::Open { name, args }) => {
                push_markdown(&mut segments, &markdown[start..line_start]);
                start = offset;
                if RAW_CONTAINERS.contains(&name.as_str()) {
                    raw = Some((name, args, String::new()));
                } else {
                    segments.push(Segment::Open {
                        name: name.clone(),
                        args,
                    });
                    stack.push(name);
                }
            }
            Some(Directive::Close) => {
                if let Some(name) = stack.pop() {
                    push_markdown(&mut segments, &markdown[start..line_start]);
                    start = offset;
                    segments.push(Segment::Close { name });
                }
            }
            None => {}
        }
    }

    if let Some((name, args, body)) = raw.take() {
        segments.push(Segment::Raw { name, args, body });
    } else {
        push_markdown(&mut segments, &markdown[start..]);
    }
    while let Some(name) = stack.pop() {
        segments.push(Segment::Close { name });
    }

    segments
}

fn push_markdown<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.trim().is_empty() {
        segments.push(Segment::Markdown(text));
    }
}

fn tokenize_markdown(text: &str, tokens: &mut Vec<Token>) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_MATH);
    options.insert(Options::ENABLE_GFM);
    let parser = Parser::new_ext(text, options).into_offset_iter();
    let mut state = TokenState::new(text);

    for (event, range) in parser {
        state.process_event(event, range, tokens);
    }

    state.finish(tokens);
}

/// Record the definition label a reference-style link or image was resolved through.
fn with_reference(token: Token, link_type: LinkType, id: CowStr<'_>) -> Token {
    match link_type {
        LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut if !id.is_empty() => {
            token.with_attr("reference", id.into_string())
        }
        _ => token,
    }
}

/// Inline content being collected for the enclosing paragraph, heading or cell.
#[derive(Default)]
struct InlineBuffer {
    span: Option<Range<usize>>,
    children: Vec<Token>,
    image: Option<Token>,
}

struct CodeBuffer {
    kind: &'static str,
    info: String,
    markup: String,
    content: String,
}

struct TokenState<'a> {
    source: &'a str,
    inline: Option<InlineBuffer>,
    // Paragraph synthesised around the bare text of a tight list item
    hidden_paragraph: bool,
    // Index of each open list_item_open token
    item_stack: Vec<usize>,
    // Open blockquotes, lists, items and tables
    block_depth: usize,
    quote_depth: usize,
    details_depth: usize,
    table_aligns: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    tbody_open: bool,
    code: Option<CodeBuffer>,
    html: Option<String>,
}

impl<'a> TokenState<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            inline: None,
            hidden_paragraph: false,
            item_stack: Vec::new(),
            block_depth: 0,
            quote_depth: 0,
            details_depth: 0,
            table_aligns: Vec::new(),
            cell_index: 0,
            in_table_head: false,
            tbody_open: false,
            code: None,
            html: None,
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>, tokens: &mut Vec<Token>) {
        // Code and HTML blocks swallow their text verbatim
        if let Some(code) = self.code.as_mut() {
            match event {
                Event::Text(text) => code.content.push_str(&text),
                Event::End(TagEnd::CodeBlock) => self.finish_code(tokens),
                _ => {}
            }
            return;
        }
        if let Some(html) = self.html.as_mut() {
            match event {
                Event::Html(text) | Event::Text(text) => html.push_str(&text),
                Event::End(TagEnd::HtmlBlock) => self.finish_html(tokens),
                _ => {}
            }
            return;
        }

        match event {
            // Paragraphs
            Event::Start(Tag::Paragraph) => {
                self.close_hidden(tokens);
                tokens.push(Token::open("paragraph_open", "p"));
                self.inline = Some(InlineBuffer::default());
            }
            Event::End(TagEnd::Paragraph) => {
                self.finish_inline(tokens);
                tokens.push(Token::close("paragraph_close", "p"));
            }

            // Headings
            Event::Start(Tag::Heading { level, .. }) => {
                self.close_hidden(tokens);
                let level = level as usize;
                tokens.push(
                    Token::open("heading_open", format!("h{level}")).with_markup("#".repeat(level)),
                );
                self.inline = Some(InlineBuffer::default());
            }
            Event::End(TagEnd::Heading(level)) => {
                self.finish_inline(tokens);
                let level = level as usize;
                tokens.push(
                    Token::close("heading_close", format!("h{level}"))
                        .with_markup("#".repeat(level)),
                );
            }

            // Block quotes and GFM alerts
            Event::Start(Tag::BlockQuote(kind)) => {
                self.close_hidden(tokens);
                tokens.push(
                    Token::open("blockquote_open", "blockquote")
                        .with_markup(">")
                        .with_info(kind.map(alert_name).unwrap_or_default()),
                );
                self.block_depth += 1;
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.close_hidden(tokens);
                tokens.push(Token::close("blockquote_close", "blockquote").with_markup(">"));
                self.block_depth -= 1;
                self.quote_depth -= 1;
            }

            // Code blocks
            Event::Start(Tag::CodeBlock(kind)) => {
                self.close_hidden(tokens);
                self.code = Some(match kind {
                    CodeBlockKind::Fenced(info) => CodeBuffer {
                        kind: "fence",
                        info: info.into_string(),
                        markup: fence_marker(&self.source[range.start..])
                            .map(|(ch, len)| ch.to_string().repeat(len))
                            .unwrap_or_else(|| "```".to_string()),
                        content: String::new(),
                    },
                    CodeBlockKind::Indented => CodeBuffer {
                        kind: "code_block",
                        info: String::new(),
                        markup: String::new(),
                        content: String::new(),
                    },
                });
            }

            // Lists
            Event::Start(Tag::List(first_item)) => {
                self.close_hidden(tokens);
                let token = match first_item {
                    Some(start) => {
                        Token::open("ordered_list_open", "ol").with_attr("start", start.to_string())
                    }
                    None => Token::open("bullet_list_open", "ul"),
                };
                tokens.push(token);
                self.block_depth += 1;
            }
            Event::End(TagEnd::List(ordered)) => {
                self.close_hidden(tokens);
                let token = if ordered {
                    Token::close("ordered_list_close", "ol")
                } else {
                    Token::close("bullet_list_close", "ul")
                };
                tokens.push(token);
                self.block_depth -= 1;
            }
            Event::Start(Tag::Item) => {
                self.close_hidden(tokens);
                let markup = list_marker(&self.source[range.start..]);
                let number: String = markup.chars().take_while(char::is_ascii_digit).collect();
                self.item_stack.push(tokens.len());
                tokens.push(
                    Token::open("list_item_open", "li")
                        .with_markup(markup)
                        .with_info(number),
                );
                self.block_depth += 1;
            }
            Event::End(TagEnd::Item) => {
                self.close_hidden(tokens);
                self.item_stack.pop();
                tokens.push(Token::close("list_item_close", "li"));
                self.block_depth -= 1;
            }
            Event::TaskListMarker(checked) => {
                if let Some(&idx) = self.item_stack.last() {
                    tokens[idx].set_attr("checked", checked.to_string());
                }
            }

            // Tables
            Event::Start(Tag::Table(aligns)) => {
                self.close_hidden(tokens);
                tokens.push(Token::open("table_open", "table"));
                self.table_aligns = aligns;
                self.tbody_open = false;
                self.block_depth += 1;
            }
            Event::End(TagEnd::Table) => {
                if self.tbody_open {
                    tokens.push(Token::close("tbody_close", "tbody"));
                    self.tbody_open = false;
                }
                tokens.push(Token::close("table_close", "table"));
                self.table_aligns.clear();
                self.block_depth -= 1;
            }
            Event::Start(Tag::TableHead) => {
                tokens.push(Token::open("thead_open", "thead"));
                tokens.push(Token::open("tr_open", "tr"));
                self.in_table_head = true;
                self.cell_index = 0;
            }
            Event::End(TagEnd::TableHead) => {
                tokens.push(Token::close("tr_close", "tr"));
                tokens.push(Token::close("thead_close", "thead"));
                self.in_table_head = false;
            }
            Event::Start(Tag::TableRow) => {
                if !self.tbody_open {
                    tokens.push(Token::open("tbody_open", "tbody"));
                    self.tbody_open = true;
                }
                tokens.push(Token::open("tr_open", "tr"));
                self.cell_index = 0;
            }
            Event::End(TagEnd::TableRow) => {
                tokens.push(Token::close("tr_close", "tr"));
            }
            Event::Start(Tag::TableCell) => {
                let (kind, tag) = if self.in_table_head {
                    ("th_open", "th")
                } else {
                    ("td_open", "td")
                };
                let mut token = Token::open(kind, tag);
                let align = self
                    .table_aligns
                    .get(self.cell_index)
                    .and_then(|a| align_name(*a));
                if let Some(align) = align {
                    token = token.with_attr("style", format!("text-align:{align}"));
                }
                tokens.push(token);
                self.inline = Some(InlineBuffer::default());
            }
            Event::End(TagEnd::TableCell) => {
                self.finish_inline(tokens);
                let (kind, tag) = if self.in_table_head {
                    ("th_close", "th")
                } else {
                    ("td_close", "td")
                };
                tokens.push(Token::close(kind, tag));
                self.cell_index += 1;
            }

            // Horizontal rule
            Event::Rule => {
                self.close_hidden(tokens);
                tokens.push(Token::leaf("hr", "hr").with_markup("---"));
            }

            // Raw HTML blocks
            Event::Start(Tag::HtmlBlock) => {
                self.close_hidden(tokens);
                self.html = Some(String::new());
            }
            Event::Html(text) => {
                // HTML outside an HtmlBlock wrapper
                self.close_hidden(tokens);
                self.html = Some(text.into_string());
                self.finish_html(tokens);
            }

            // Everything else is inline content
            event => self.process_inline(event, range, tokens),
        }
    }

    fn process_inline(&mut self, event: Event<'_>, range: Range<usize>, tokens: &mut Vec<Token>) {
        // Alt text of an open image: keep its visible text, drop its markup
        if let Some(image) = self.inline.as_mut().and_then(|buf| buf.image.as_mut()) {
            match &event {
                Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => {
                    image.content.push_str(text);
                    image.children.push(Token::leaf("text", "").with_content(text.to_string()));
                }
                Event::End(TagEnd::Image) => {}
                _ => {
                    self.extend_span(range, tokens);
                    return;
                }
            }
            if !matches!(event, Event::End(TagEnd::Image)) {
                self.extend_span(range, tokens);
                return;
            }
        }

        let child = match event {
            Event::Text(text) => Token::leaf("text", "").with_content(text.into_string()),
            Event::Code(code) => Token::leaf("code_inline", "code")
                .with_markup("`")
                .with_content(code.into_string()),
            Event::InlineMath(math) => Token::leaf("math_inline", "math")
                .with_markup("$")
                .with_content(math.into_string()),
            Event::DisplayMath(math) => Token::leaf("math_block", "math")
                .with_markup("$$")
                .with_content(math.into_string()),
            Event::InlineHtml(html) => {
                Token::leaf("html_inline", "").with_content(html.into_string())
            }
            Event::SoftBreak => Token::leaf("softbreak", "br"),
            Event::HardBreak => Token::leaf("hardbreak", "br"),
            Event::Start(Tag::Emphasis) => Token::open("em_open", "em").with_markup("*"),
            Event::End(TagEnd::Emphasis) => Token::close("em_close", "em").with_markup("*"),
            Event::Start(Tag::Strong) => Token::open("strong_open", "strong").with_markup("**"),
            Event::End(TagEnd::Strong) => Token::close("strong_close", "strong").with_markup("**"),
            Event::Start(Tag::Strikethrough) => Token::open("s_open", "s").with_markup("~~"),
            Event::End(TagEnd::Strikethrough) => Token::close("s_close", "s").with_markup("~~"),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let mut token =
                    Token::open("link_open", "a").with_attr("href", dest_url.into_string());
                if !title.is_empty() {
                    token = token.with_attr("title", title.into_string());
                }
                with_reference(token, link_type, id)
            }
            Event::End(TagEnd::Link) => Token::close("link_close", "a"),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let mut image =
                    Token::leaf("image", "img").with_attr("src", dest_url.into_string());
                if !title.is_empty() {
                    image = image.with_attr("title", title.into_string());
                }
                let image = with_reference(image, link_type, id);
                self.extend_span(range, tokens);
                if let Some(buf) = self.inline.as_mut() {
                    buf.image = Some(image);
                }
                return;
            }
            Event::End(TagEnd::Image) => {
                self.extend_span(range, tokens);
                if let Some(buf) = self.inline.as_mut() {
                    if let Some(image) = buf.image.take() {
                        buf.children.push(image);
                    }
                }
                return;
            }
            // Footnotes, definition lists and metadata are not enabled
            _ => return,
        };

        self.extend_span(range, tokens);
        if let Some(buf) = self.inline.as_mut() {
            buf.children.push(child);
        }
    }

    /// Grow the source span of the current inline content, opening a hidden
    /// paragraph first when the text sits directly in a tight list item.
    fn extend_span(&mut self, range: Range<usize>, tokens: &mut Vec<Token>) {
        if self.inline.is_none() {
            let mut open = Token::open("paragraph_open", "p");
            open.hidden = true;
            tokens.push(open);
            self.inline = Some(InlineBuffer::default());
            self.hidden_paragraph = true;
        }
        if let Some(buf) = self.inline.as_mut() {
            buf.span = Some(match buf.span.take() {
                Some(span) => span.start.min(range.start)..span.end.max(range.end),
                None => range,
            });
        }
    }

    fn finish_inline(&mut self, tokens: &mut Vec<Token>) {
        let Some(mut buf) = self.inline.take() else {
            return;
        };
        if let Some(image) = buf.image.take() {
            buf.children.push(image);
        }
        let content = buf
            .span
            .map(|span| strip_continuations(&self.source[span], self.quote_depth))
            .unwrap_or_default();
        let mut inline = Token::leaf("inline", "").with_content(content);
        inline.children = buf.children;
        tokens.push(inline);
    }

    fn close_hidden(&mut self, tokens: &mut Vec<Token>) {
        if !self.hidden_paragraph {
            return;
        }
        self.finish_inline(tokens);
        let mut close = Token::close("paragraph_close", "p");
        close.hidden = true;
        tokens.push(close);
        self.hidden_paragraph = false;
    }

    fn finish_code(&mut self, tokens: &mut Vec<Token>) {
        let Some(code) = self.code.take() else {
            return;
        };
        tokens.push(
            Token::leaf(code.kind, "code")
                .with_info(code.info)
                .with_markup(code.markup)
                .with_content(code.content),
        );
    }

    /// Turn `<details>`/`</details>` at document level into toggle tokens.
    fn finish_html(&mut self, tokens: &mut Vec<Token>) {
        let Some(html) = self.html.take() else {
            return;
        };
        let lower = html.to_ascii_lowercase();
        let trimmed = lower.trim_start();

        if self.block_depth == 0 && trimmed.starts_with("<details") {
            let summary = between(&html, &lower, "<summary", "</summary>")
                .map(|s| strip_tags(s).trim().to_string())
                .unwrap_or_default();
            tokens.push(Token::open("details_open", "details").with_info(summary));

            let body_start = lower
                .find("</summary>")
                .map(|at| at + "</summary>".len())
                .or_else(|| lower.find('>').map(|at| at + 1))
                .unwrap_or(html.len());
            let body = &html[body_start..];
            match body.to_ascii_lowercase().find("</details>") {
                Some(end) => {
                    push_html_paragraph(tokens, &body[..end]);
                    tokens.push(Token::close("details_close", "details"));
                }
                None => {
                    push_html_paragraph(tokens, body);
                    self.details_depth += 1;
                }
            }
        } else if self.block_depth == 0
            && self.details_depth > 0
            && trimmed.starts_with("</details")
        {
            tokens.push(Token::close("details_close", "details"));
            self.details_depth -= 1;
        } else {
            tokens.push(Token::leaf("html_block", "").with_content(html));
        }
    }

    fn finish(&mut self, tokens: &mut Vec<Token>) {
        self.close_hidden(tokens);
        self.finish_code(tokens);
        self.finish_html(tokens);
        while self.details_depth > 0 {
            tokens.push(Token::close("details_close", "details"));
            self.details_depth -= 1;
        }
    }
}

fn push_html_paragraph(tokens: &mut Vec<Token>, html: &str) {
    let text = strip_tags(html);
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    tokens.push(Token::open("paragraph_open", "p"));
    tokens.push(Token::leaf("inline", "").with_content(text));
    tokens.push(Token::close("paragraph_close", "p"));
}

/// Text between the end of the `open` tag and `close`, located case-insensitively.
fn between<'h>(html: &'h str, lower: &str, open: &str, close: &str) -> Option<&'h str> {
    let tag_start = lower.find(open)?;
    let content_start = tag_start + lower[tag_start..].find('>')? + 1;
    let content_end = content_start + lower[content_start..].find(close)?;
    Some(&html[content_start..content_end])
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Drop the indentation and `>` markers that prefix continuation lines.
fn strip_continuations(raw: &str, quote_depth: usize) -> String {
    if !raw.contains('\n') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for (i, line) in raw.split('\n').enumerate() {
        if i == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        let mut rest = line.trim_start();
        for _ in 0..quote_depth {
            match rest.strip_prefix('>') {
                Some(r) => rest = r.trim_start(),
                None => break,
            }
        }
        out.push_str(rest);
    }
    out
}

/// Literal list marker at the start of an item: `-`, `*`, `+`, `1.` or `1)`.
fn list_marker(source: &str) -> String {
    let rest = source.trim_start_matches([' ', '\t', '>']);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        let delim = rest[digits.len()..]
            .chars()
            .next()
            .filter(|c| *c == '.' || *c == ')');
        if let Some(delim) = delim {
            return format!("{digits}{delim}");
        }
    }
    match rest.chars().next() {
        Some(c @ ('-' | '*' | '+')) => c.to_string(),
        _ => "-".to_string(),
    }
}

fn alert_name(kind: BlockQuoteKind) -> String {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
    .to_string()
}

fn align_name(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Nesting, validate};

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }

    #[test]
    fn reference_links_carry_their_label() {
        let tokens = parse(
            "[docs][d], [site] and [inline](https://i.example)\n\n\
             [d]: https://d.example\n[site]: https://s.example",
        );
        assert_eq!(kinds(&tokens), ["paragraph_open", "inline", "paragraph_close"]);
        let links: Vec<(Option<&str>, Option<&str>)> = tokens[1]
            .children
            .iter()
            .filter(|t| t.kind == "link_open")
            .map(|t| (t.attr("reference"), t.attr("href")))
            .collect();
        assert_eq!(
            links,
            [
                (Some("d"), Some("https://d.example")),
                (Some("site"), Some("https://s.example")),
                (None, Some("https://i.example")),
            ]
        );
    }

    #[test]
    fn paragraph_triple() {
        let tokens = parse("Hello **world**!");
        assert_eq!(kinds(&tokens), ["paragraph_open", "inline", "paragraph_close"]);
        assert_eq!(tokens[1].content, "Hello **world**!");
        assert_eq!(
            kinds(&tokens[1].children),
            ["text", "strong_open", "text", "strong_close", "text"]
        );
    }

    #[test]
    fn heading_tag_and_content() {
        let tokens = parse("## Policy ($\\pi$)");
        assert_eq!(tokens[0].kind, "heading_open");
        assert_eq!(tokens[0].tag, "h2");
        assert_eq!(tokens[0].markup, "##");
        assert_eq!(tokens[1].content, "Policy ($\\pi$)");
    }

    #[test]
    fn escapes_survive_in_raw_inline() {
        let tokens = parse("a \\* b \\$5");
        assert_eq!(tokens[1].content, "a \\* b \\$5");
    }

    #[test]
    fn multiline_paragraph_in_quote_is_dedented() {
        let tokens = parse("> first\n> second");
        assert_eq!(
            kinds(&tokens),
            ["blockquote_open", "paragraph_open", "inline", "paragraph_close", "blockquote_close"]
        );
        assert_eq!(tokens[2].content, "first\nsecond");
    }

    #[test]
    fn tight_list_gets_hidden_paragraphs() {
        let tokens = parse("- one\n- two");
        assert_eq!(
            kinds(&tokens),
            [
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
        assert!(tokens[2].hidden);
        assert_eq!(tokens[1].markup, "-");
        assert_eq!(tokens[8].content, "two");
    }

    #[test]
    fn ordered_markers_are_literal() {
        let tokens = parse("1. a\n2. b\n5. c");
        let markers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == "list_item_open")
            .map(|t| t.markup.as_str())
            .collect();
        assert_eq!(markers, ["1.", "2.", "5."]);
        assert_eq!(tokens[0].kind, "ordered_list_open");
        assert_eq!(tokens[0].attr("start"), Some("1"));
    }

    #[test]
    fn task_items_carry_checked_attr() {
        let tokens = parse("- [x] done\n- [ ] todo");
        let items: Vec<&Token> = tokens.iter().filter(|t| t.kind == "list_item_open").collect();
        assert_eq!(items[0].attr("checked"), Some("true"));
        assert_eq!(items[1].attr("checked"), Some("false"));
        let inlines: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == "inline")
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(inlines, ["done", "todo"]);
    }

    #[test]
    fn nested_list_closes_hidden_paragraph_first() {
        let tokens = parse("- outer\n  - inner");
        assert!(validate(&tokens).is_ok());
        let open_inner = tokens
            .iter()
            .rposition(|t| t.kind == "bullet_list_open")
            .unwrap();
        assert_eq!(tokens[open_inner - 1].kind, "paragraph_close");
    }

    #[test]
    fn fence_keeps_info_and_content() {
        let tokens = parse("```rust title=\"x\"\nlet x = 1;\n```");
        assert_eq!(kinds(&tokens), ["fence"]);
        assert_eq!(tokens[0].info, "rust title=\"x\"");
        assert_eq!(tokens[0].content, "let x = 1;\n");
        assert_eq!(tokens[0].markup, "```");
        assert_eq!(tokens[0].nesting, Nesting::Leaf);
    }

    #[test]
    fn table_structure() {
        let tokens = parse("| a | b |\n|---|:-:|\n| 1 | 2 |");
        assert_eq!(
            kinds(&tokens),
            [
                "table_open",
                "thead_open",
                "tr_open",
                "th_open",
                "inline",
                "th_close",
                "th_open",
                "inline",
                "th_close",
                "tr_close",
                "thead_close",
                "tbody_open",
                "tr_open",
                "td_open",
                "inline",
                "td_close",
                "td_open",
                "inline",
                "td_close",
                "tr_close",
                "tbody_close",
                "table_close",
            ]
        );
        assert_eq!(tokens[6].attr("style"), Some("text-align:center"));
        assert_eq!(tokens[17].content, "2");
    }

    #[test]
    fn image_child_collects_alt_text() {
        let tokens = parse("![a cat](cat.png \"Cat\")");
        let image = &tokens[1].children[0];
        assert_eq!(image.kind, "image");
        assert_eq!(image.content, "a cat");
        assert_eq!(image.attr("src"), Some("cat.png"));
        assert_eq!(image.attr("title"), Some("Cat"));
    }

    #[test]
    fn image_alt_markup_is_flattened() {
        let tokens = parse("![A *cat*](cat.png)");
        let children = &tokens[1].children;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].content, "A cat");
    }

    #[test]
    fn alerts_tag_blockquotes() {
        let tokens = parse("> [!WARNING]\n> Careful");
        assert_eq!(tokens[0].kind, "blockquote_open");
        assert_eq!(tokens[0].info, "warning");
    }

    #[test]
    fn containers_wrap_parsed_content() {
        let tokens = parse("::: toggle More\nhidden *text*\n:::\nafter");
        assert_eq!(
            kinds(&tokens),
            [
                "container_toggle_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "container_toggle_close",
                "paragraph_open",
                "inline",
                "paragraph_close",
            ]
        );
        assert_eq!(tokens[0].info, "More");
    }

    #[test]
    fn nested_containers_close_innermost_first() {
        let md = "::: columns\n::: column\nleft\n:::\n::: column\nright\n:::\n:::";
        let tokens = parse(md);
        assert!(validate(&tokens).is_ok());
        assert_eq!(tokens.first().unwrap().kind, "container_columns_open");
        assert_eq!(tokens.last().unwrap().kind, "container_columns_close");
    }

    #[test]
    fn unclosed_container_is_closed_at_end() {
        let tokens = parse("::: callout 💡\nnote");
        assert!(validate(&tokens).is_ok());
        assert_eq!(tokens.last().unwrap().kind, "container_callout_close");
    }

    #[test]
    fn directive_inside_code_fence_is_code() {
        let tokens = parse("```\n::: toggle\n```");
        assert_eq!(kinds(&tokens), ["fence"]);
        assert_eq!(tokens[0].content, "::: toggle\n");
    }

    #[test]
    fn mermaid_body_is_raw() {
        let tokens = parse("::: mermaid\ngraph TD\n  A --> B\n:::");
        assert_eq!(kinds(&tokens), ["container_mermaid_open", "container_mermaid_close"]);
        assert_eq!(tokens[0].content, "graph TD\n  A --> B\n");
    }

    #[test]
    fn details_become_toggle_tokens() {
        let md = "<details>\n<summary>More info</summary>\n\nInside.\n\n</details>";
        let tokens = parse(md);
        assert!(validate(&tokens).is_ok());
        assert_eq!(tokens[0].kind, "details_open");
        assert_eq!(tokens[0].info, "More info");
        assert_eq!(tokens.last().unwrap().kind, "details_close");
        assert!(tokens.iter().any(|t| t.kind == "inline" && t.content == "Inside."));
    }

    #[test]
    fn stray_details_close_stays_html() {
        let tokens = parse("</details>");
        assert_eq!(kinds(&tokens), ["html_block"]);
    }

    #[test]
    fn frontmatter_is_stripped() {
        let tokens = parse("---\ntitle: x\n---\n\nBody");
        assert_eq!(tokens[1].content, "Body");
    }

    #[test]
    fn directive_lines() {
        assert_eq!(directive(":::"), Some(Directive::Close));
        assert_eq!(
            directive("::: callout 💡 Heads up"),
            Some(Directive::Open {
                name: "callout".into(),
                args: "💡 Heads up".into()
            })
        );
        assert_eq!(
            directive(":::Table-Of-Contents"),
            Some(Directive::Open {
                name: "table_of_contents".into(),
                args: String::new()
            })
        );
        assert_eq!(directive("    ::: toggle"), None);
        assert_eq!(directive("::: 1abc"), None);
    }
}
