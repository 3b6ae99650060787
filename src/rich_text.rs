//! Splitting raw inline markdown into rich-text runs.
//!
//! The scanner resolves atoms (code spans, inline equations, links, autolinks)
//! left to right, then pairs emphasis delimiters with a delimiter stack so the
//! innermost span closes first. Anything unterminated stays literal text.

use std::collections::HashMap;

use pulldown_cmark::{Event, Parser};

use crate::block::{Annotations, Color, RichTextRun};

/// Link reference definitions (`[label]: url`) that inline text may point at.
///
/// Labels match case-insensitively with inner whitespace collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References(HashMap<String, String>);

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, href: impl Into<String>) {
        self.0.entry(normalize_label(label)).or_insert_with(|| href.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(&normalize_label(label)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Pure splitter from inline source text to formatted runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    color: Color,
}

#[derive(Debug)]
enum Node {
    Text(String),
    Delim(Delim),
    Runs(Vec<RichTextRun>),
}

#[derive(Debug)]
struct Delim {
    ch: char,
    count: usize,
    original: usize,
    can_open: bool,
    can_close: bool,
    active: bool,
}

struct Link {
    label: String,
    href: String,
    end: usize,
}

impl Segmenter {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Split `text` into maximal runs of uniform formatting, in document order.
    pub fn segment(&self, text: &str) -> Vec<RichTextRun> {
        self.segment_with(text, &References::default())
    }

    /// Like [`Segmenter::segment`], resolving `[label][ref]`, `[label][]` and
    /// `[label]` links against `refs`.
    pub fn segment_with(&self, text: &str, refs: &References) -> Vec<RichTextRun> {
        if text.is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        let mut nodes = self.scan(&chars, refs);
        let mut styles = vec![Annotations::plain(self.color); nodes.len()];
        resolve_emphasis(&mut nodes, &mut styles);
        self.flatten(nodes, styles)
    }

    fn plain(&self) -> Annotations {
        Annotations::plain(self.color)
    }

    fn scan(&self, chars: &[char], refs: &References) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '\\' => match chars.get(i + 1) {
                    Some('\n') => {
                        trim_line_end(&mut text);
                        text.push('\n');
                        i += 2;
                    }
                    Some(next) if next.is_ascii_punctuation() => {
                        text.push(*next);
                        i += 2;
                    }
                    _ => {
                        text.push('\\');
                        i += 1;
                    }
                },
                '\n' => {
                    trim_line_end(&mut text);
                    text.push('\n');
                    i += 1;
                }
                '`' => {
                    let n = run_length(chars, i, '`');
                    match find_code_close(chars, i + n, n) {
                        Some(close) => {
                            flush(&mut nodes, &mut text);
                            let code = code_content(&chars[i + n..close]);
                            let annotations = Annotations {
                                code: true,
                                ..self.plain()
                            };
                            nodes.push(Node::Runs(vec![RichTextRun::text(code, annotations)]));
                            i = close + n;
                        }
                        None => {
                            text.extend(std::iter::repeat_n('`', n));
                            i += n;
                        }
                    }
                }
                '$' => {
                    let n = run_length(chars, i, '$');
                    let opens = n <= 2
                        && chars
                            .get(i + n)
                            .is_some_and(|c| n == 2 || !c.is_whitespace());
                    match opens.then(|| find_math_close(chars, i + n, n)).flatten() {
                        Some(close) => {
                            flush(&mut nodes, &mut text);
                            let expression: String = chars[i + n..close].iter().collect();
                            let expression = expression.trim().to_string();
                            let run = RichTextRun::equation(expression, self.plain());
                            nodes.push(Node::Runs(vec![run]));
                            i = close + n;
                        }
                        None => {
                            text.extend(std::iter::repeat_n('$', n));
                            i += n;
                        }
                    }
                }
                '!' if chars.get(i + 1) == Some(&'[') => match parse_link(chars, i + 1, refs) {
                    Some(link) => {
                        flush(&mut nodes, &mut text);
                        let label = if link.label.is_empty() {
                            link.href.clone()
                        } else {
                            link.label
                        };
                        nodes.push(Node::Runs(vec![self.link_run(label, link.href)]));
                        i = link.end;
                    }
                    None => {
                        text.push('!');
                        i += 1;
                    }
                },
                '[' => match parse_link(chars, i, refs) {
                    Some(link) => {
                        flush(&mut nodes, &mut text);
                        let href = (!link.href.is_empty()).then_some(link.href);
                        let runs = self
                            .segment_with(&link.label, refs)
                            .into_iter()
                            .map(|mut run| {
                                if !run.is_equation() {
                                    run.href = href.clone();
                                }
                                run
                            })
                            .collect();
                        nodes.push(Node::Runs(runs));
                        i = link.end;
                    }
                    None => {
                        text.push('[');
                        i += 1;
                    }
                },
                '<' => match parse_autolink(chars, i) {
                    Some((label, href, end)) => {
                        flush(&mut nodes, &mut text);
                        nodes.push(Node::Runs(vec![self.link_run(label, href)]));
                        i = end;
                    }
                    None => {
                        text.push('<');
                        i += 1;
                    }
                },
                '&' => match decode_entity(chars, i) {
                    Some((decoded, end)) => {
                        text.push_str(&decoded);
                        i = end;
                    }
                    None => {
                        text.push('&');
                        i += 1;
                    }
                },
                '*' | '_' | '~' => {
                    let n = run_length(chars, i, ch);
                    match delimiter(chars, i, n) {
                        Some(delim) => {
                            flush(&mut nodes, &mut text);
                            nodes.push(Node::Delim(delim));
                        }
                        None => text.extend(std::iter::repeat_n(ch, n)),
                    }
                    i += n;
                }
                _ => {
                    text.push(ch);
                    i += 1;
                }
            }
        }

        flush(&mut nodes, &mut text);
        nodes
    }

    fn link_run(&self, label: String, href: String) -> RichTextRun {
        if href.is_empty() {
            RichTextRun::text(label, self.plain())
        } else {
            RichTextRun::link(label, href, self.plain())
        }
    }

    fn flatten(&self, nodes: Vec<Node>, styles: Vec<Annotations>) -> Vec<RichTextRun> {
        let mut runs: Vec<RichTextRun> = Vec::new();
        for (node, style) in nodes.into_iter().zip(styles) {
            match node {
                Node::Text(text) => push_run(&mut runs, RichTextRun::text(text, style)),
                Node::Delim(delim) if delim.count > 0 => {
                    let literal: String = std::iter::repeat_n(delim.ch, delim.count).collect();
                    push_run(&mut runs, RichTextRun::text(literal, style));
                }
                Node::Delim(_) => {}
                Node::Runs(inner) => {
                    for mut run in inner {
                        run.annotations = run.annotations.merge(style);
                        push_run(&mut runs, run);
                    }
                }
            }
        }
        runs
    }
}

/// Append a run, merging it into the previous one when their formatting matches.
fn push_run(runs: &mut Vec<RichTextRun>, run: RichTextRun) {
    if run.plain_text.is_empty() && !run.is_equation() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if !last.is_equation()
            && !run.is_equation()
            && last.annotations == run.annotations
            && last.href == run.href
        {
            last.plain_text.push_str(&run.plain_text);
            return;
        }
    }
    runs.push(run);
}

fn flush(nodes: &mut Vec<Node>, text: &mut String) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

/// Trailing spaces before a line break are not visible text.
fn trim_line_end(text: &mut String) {
    let trimmed = text.trim_end_matches([' ', '\t']).len();
    text.truncate(trimmed);
}

fn run_length(chars: &[char], start: usize, ch: char) -> usize {
    chars[start..].iter().take_while(|c| **c == ch).count()
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace())
}

/// Classify a delimiter run by CommonMark flanking rules.
fn delimiter(chars: &[char], start: usize, count: usize) -> Option<Delim> {
    let ch = chars[start];
    if ch == '~' && count != 2 {
        return None;
    }
    let prev = if start == 0 { ' ' } else { chars[start - 1] };
    let next = chars.get(start + count).copied().unwrap_or(' ');

    let left = !next.is_whitespace()
        && (!is_punctuation(next) || prev.is_whitespace() || is_punctuation(prev));
    let right = !prev.is_whitespace()
        && (!is_punctuation(prev) || next.is_whitespace() || is_punctuation(next));

    let (can_open, can_close) = match ch {
        '_' => (
            left && (!right || is_punctuation(prev)),
            right && (!left || is_punctuation(next)),
        ),
        _ => (left, right),
    };
    if !can_open && !can_close {
        return None;
    }

    Some(Delim {
        ch,
        count,
        original: count,
        can_open,
        can_close,
        active: true,
    })
}

/// Pair delimiters, innermost first, and mark the enclosed nodes.
fn resolve_emphasis(nodes: &mut [Node], styles: &mut [Annotations]) {
    let mut closer = 0;
    while closer < nodes.len() {
        let Node::Delim(close) = &nodes[closer] else {
            closer += 1;
            continue;
        };
        if !close.active || !close.can_close || close.count == 0 {
            closer += 1;
            continue;
        }

        let opener = (0..closer).rev().find(|&idx| match &nodes[idx] {
            Node::Delim(open) => {
                open.active
                    && open.can_open
                    && open.count > 0
                    && open.ch == close.ch
                    && !rule_of_three(open, close)
            }
            _ => false,
        });
        let Some(opener) = opener else {
            closer += 1;
            continue;
        };

        let (ch, used) = match (&nodes[opener], &nodes[closer]) {
            (Node::Delim(open), Node::Delim(close)) => {
                let used = if open.ch == '~' || (open.count >= 2 && close.count >= 2) {
                    2
                } else {
                    1
                };
                (open.ch, used)
            }
            _ => break,
        };

        for idx in opener + 1..closer {
            let style = &mut styles[idx];
            match (ch, used) {
                ('~', _) => style.strikethrough = true,
                (_, 2) => style.bold = true,
                _ => style.italic = true,
            }
            if let Node::Delim(inner) = &mut nodes[idx] {
                inner.active = false;
            }
        }
        if let Node::Delim(open) = &mut nodes[opener] {
            open.count -= used;
        }
        if let Node::Delim(close) = &mut nodes[closer] {
            close.count -= used;
            if close.count == 0 {
                closer += 1;
            }
        }
    }
}

/// CommonMark's "multiple of 3" rule for runs that can both open and close.
fn rule_of_three(open: &Delim, close: &Delim) -> bool {
    open.ch != '~'
        && (open.can_close || close.can_open)
        && (open.original + close.original) % 3 == 0
        && !(open.original % 3 == 0 && close.original % 3 == 0)
}

fn find_code_close(chars: &[char], from: usize, n: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] == '`' {
            let run = run_length(chars, j, '`');
            if run == n {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

fn code_content(chars: &[char]) -> String {
    let content: String = chars.iter().map(|c| if *c == '\n' { ' ' } else { *c }).collect();
    let stripped = content
        .strip_prefix(' ')
        .and_then(|s| s.strip_suffix(' '))
        .filter(|_| !content.trim().is_empty());
    stripped.map(str::to_string).unwrap_or(content)
}

fn find_math_close(chars: &[char], from: usize, n: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '$' => {
                let run = run_length(chars, j, '$');
                let after_digit = chars.get(j + run).is_some_and(char::is_ascii_digit);
                let tight = !chars[j - 1].is_whitespace() && !after_digit;
                if run == n && j > from && (n == 2 || tight) {
                    return Some(j);
                }
                j += run;
            }
            _ => j += 1,
        }
    }
    None
}

/// `[label](destination "title")` or a reference link, starting at the opening bracket.
fn parse_link(chars: &[char], start: usize, refs: &References) -> Option<Link> {
    let mut depth = 0usize;
    let mut j = start;
    let close = loop {
        match chars.get(j)? {
            '\\' => j += 2,
            '[' => {
                depth += 1;
                j += 1;
            }
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break j;
                }
                j += 1;
            }
            _ => j += 1,
        }
    };
    let label: String = chars[start + 1..close].iter().collect();
    if chars.get(close + 1) == Some(&'(') {
        if let Some((href, end)) = inline_destination(chars, close + 2) {
            return Some(Link { label, href, end });
        }
    }
    reference_link(chars, close, label, refs)
}

/// `[label][ref]`, `[label][]` or `[label]` with `close` at the label's `]`.
fn reference_link(chars: &[char], close: usize, label: String, refs: &References) -> Option<Link> {
    if refs.is_empty() {
        return None;
    }
    if chars.get(close + 1) == Some(&'[') {
        let mut j = close + 2;
        loop {
            match chars.get(j)? {
                '\\' => j += 2,
                '[' => return None,
                ']' => break,
                _ => j += 1,
            }
        }
        let reference: String = chars[close + 2..j].iter().collect();
        let key = if reference.trim().is_empty() {
            &label
        } else {
            &reference
        };
        let href = refs.get(key)?.to_string();
        return Some(Link {
            label,
            href,
            end: j + 1,
        });
    }
    let href = refs.get(&label)?.to_string();
    Some(Link {
        label,
        href,
        end: close + 1,
    })
}

/// `(destination "title")` with `from` just past the opening parenthesis.
fn inline_destination(chars: &[char], from: usize) -> Option<(String, usize)> {
    let mut k = skip_spaces(chars, from);
    let mut href = String::new();
    if chars.get(k) == Some(&'<') {
        k += 1;
        loop {
            match chars.get(k)? {
                '>' => {
                    k += 1;
                    break;
                }
                '\n' | '<' => return None,
                '\\' if chars.get(k + 1).is_some_and(char::is_ascii_punctuation) => {
                    href.push(chars[k + 1]);
                    k += 2;
                }
                c => {
                    href.push(*c);
                    k += 1;
                }
            }
        }
    } else {
        let mut parens = 0usize;
        while let Some(&c) = chars.get(k) {
            match c {
                '\\' if chars.get(k + 1).is_some_and(char::is_ascii_punctuation) => {
                    href.push(chars[k + 1]);
                    k += 2;
                    continue;
                }
                '(' => parens += 1,
                ')' if parens == 0 => break,
                ')' => parens -= 1,
                c if c.is_whitespace() => break,
                _ => {}
            }
            href.push(c);
            k += 1;
        }
    }

    k = skip_spaces(chars, k);
    if let Some(&quote) = chars.get(k).filter(|c| matches!(**c, '"' | '\'' | '(')) {
        let end_quote = if quote == '(' { ')' } else { quote };
        k += 1;
        loop {
            match chars.get(k)? {
                '\\' => k += 2,
                c if *c == end_quote => {
                    k += 1;
                    break;
                }
                _ => k += 1,
            }
        }
        k = skip_spaces(chars, k);
    }
    if chars.get(k) != Some(&')') {
        return None;
    }
    Some((href, k + 1))
}

/// Decode `&name;`, `&#N;` or `&#xH;` at `start`; returns the text and end index.
fn decode_entity(chars: &[char], start: usize) -> Option<(String, usize)> {
    let len = chars[start + 1..].iter().take(33).position(|c| *c == ';')?;
    let end = start + 1 + len;
    let body = &chars[start + 1..end];
    let well_formed = match body {
        ['#', 'x' | 'X', digits @ ..] => {
            (1..=6).contains(&digits.len()) && digits.iter().all(char::is_ascii_hexdigit)
        }
        ['#', digits @ ..] => {
            (1..=7).contains(&digits.len()) && digits.iter().all(char::is_ascii_digit)
        }
        [first, rest @ ..] => {
            first.is_ascii_alphabetic() && rest.iter().all(char::is_ascii_alphanumeric)
        }
        [] => false,
    };
    if !well_formed {
        return None;
    }

    let reference: String = chars[start..=end].iter().collect();
    let decoded: String = Parser::new(&reference)
        .filter_map(|event| match event {
            Event::Text(text) => Some(text.into_string()),
            _ => None,
        })
        .collect();
    (decoded != reference).then_some((decoded, end + 1))
}

fn skip_spaces(chars: &[char], mut k: usize) -> usize {
    while chars.get(k).is_some_and(|c| c.is_whitespace()) {
        k += 1;
    }
    k
}

/// `<scheme:...>` or `<user@host>`; returns label, href and end index.
fn parse_autolink(chars: &[char], start: usize) -> Option<(String, String, usize)> {
    let len = chars[start + 1..]
        .iter()
        .position(|c| *c == '>' || *c == '<' || c.is_whitespace())?;
    let end = start + 1 + len;
    if chars[end] != '>' || len == 0 {
        return None;
    }
    let body: String = chars[start + 1..end].iter().collect();

    let scheme_ok = body.split_once(':').is_some_and(|(scheme, _)| {
        (2..=32).contains(&scheme.len())
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
    });
    if scheme_ok {
        return Some((body.clone(), body, end + 1));
    }
    let email_ok = body
        .split_once('@')
        .is_some_and(|(user, host)| {
            !user.is_empty() && host.contains('.') && !host.starts_with('.')
        });
    if email_ok {
        let href = format!("mailto:{body}");
        return Some((body, href, end + 1));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<RichTextRun> {
        Segmenter::default().segment(text)
    }

    fn plain(text: &str) -> RichTextRun {
        RichTextRun::text(text, Annotations::default())
    }

    fn bold(text: &str) -> RichTextRun {
        RichTextRun::text(
            text,
            Annotations {
                bold: true,
                ..Annotations::default()
            },
        )
    }

    fn italic(text: &str) -> RichTextRun {
        RichTextRun::text(
            text,
            Annotations {
                italic: true,
                ..Annotations::default()
            },
        )
    }

    #[test]
    fn empty_input_yields_no_runs() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn literal_text_is_one_run() {
        assert_eq!(segment("just some words, ok."), vec![plain("just some words, ok.")]);
    }

    #[test]
    fn bold_in_the_middle() {
        assert_eq!(
            segment("Hello **world**!"),
            vec![plain("Hello "), bold("world"), plain("!")]
        );
    }

    #[test]
    fn italic_with_star_and_underscore() {
        assert_eq!(segment("*a* _b_"), vec![italic("a"), plain(" "), italic("b")]);
    }

    #[test]
    fn intraword_underscores_stay_literal() {
        assert_eq!(segment("snake_case_name"), vec![plain("snake_case_name")]);
    }

    #[test]
    fn triple_star_is_bold_and_italic() {
        let runs = segment("***both***");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].annotations.bold && runs[0].annotations.italic);
        assert_eq!(runs[0].plain_text, "both");
    }

    #[test]
    fn nested_emphasis_closes_innermost_first() {
        let runs = segment("**bold *both* bold**");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], bold("bold "));
        assert!(runs[1].annotations.bold && runs[1].annotations.italic);
        assert_eq!(runs[1].plain_text, "both");
        assert_eq!(runs[2], bold(" bold"));
    }

    #[test]
    fn unterminated_markers_are_literal() {
        assert_eq!(segment("**open and *also"), vec![plain("**open and *also")]);
        assert_eq!(segment("`tick"), vec![plain("`tick")]);
        assert_eq!(segment("[label](no-close"), vec![plain("[label](no-close")]);
    }

    #[test]
    fn escaped_delimiters_do_not_open() {
        assert_eq!(segment("\\*not\\* \\$x\\$"), vec![plain("*not* $x$")]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            segment("AT&amp;T &copy; 2024 &#35;1 &#x41;"),
            vec![plain("AT&T © 2024 #1 A")]
        );
        assert_eq!(segment("&nosuch; & &amp"), vec![plain("&nosuch; & &amp")]);
        assert_eq!(segment("\\&amp;"), vec![plain("&amp;")]);
    }

    #[test]
    fn entities_inside_code_stay_verbatim() {
        let runs = segment("`&amp;`");
        assert_eq!(runs[0].plain_text, "&amp;");
        assert!(runs[0].annotations.code);
    }

    #[test]
    fn reference_links_resolve_against_definitions() {
        let mut refs = References::new();
        refs.insert("d", "https://docs.example");
        refs.insert("Site", "https://site.example");
        let link = |label: &str, href: &str| RichTextRun::link(label, href, Annotations::default());

        assert_eq!(
            Segmenter::default().segment_with("See [the docs][d] and [site].", &refs),
            vec![
                plain("See "),
                link("the docs", "https://docs.example"),
                plain(" and "),
                link("site", "https://site.example"),
                plain("."),
            ]
        );
        assert_eq!(
            Segmenter::default().segment_with("[SITE][]", &refs),
            vec![link("SITE", "https://site.example")]
        );
    }

    #[test]
    fn undefined_references_stay_literal() {
        let mut refs = References::new();
        refs.insert("known", "https://x.example");
        assert_eq!(
            Segmenter::default().segment_with("[a][missing] and [other]", &refs),
            vec![plain("[a][missing] and [other]")]
        );
        assert_eq!(segment("[known]"), vec![plain("[known]")]);
    }

    #[test]
    fn code_span_ignores_inner_markup() {
        let runs = segment("run `a **b**` now");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].plain_text, "a **b**");
        assert!(runs[1].annotations.code);
        assert!(!runs[1].annotations.bold);
    }

    #[test]
    fn double_backtick_code_strips_padding() {
        let runs = segment("`` a`b ``");
        assert_eq!(runs[0].plain_text, "a`b");
    }

    #[test]
    fn bold_code_combines_annotations() {
        let runs = segment("**`x`**");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].annotations.bold && runs[0].annotations.code);
    }

    #[test]
    fn inline_equation() {
        let runs = segment("Energy $E=mc^2$ here");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].equation.as_deref(), Some("E=mc^2"));
        assert!(runs[1].href.is_none());
    }

    #[test]
    fn dollar_amounts_are_not_equations() {
        assert_eq!(segment("costs $5 and $6"), vec![plain("costs $5 and $6")]);
    }

    #[test]
    fn link_runs_carry_href() {
        let runs = segment("see [the **docs**](https://example.com \"Docs\")");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].plain_text, "the ");
        assert_eq!(runs[1].href.as_deref(), Some("https://example.com"));
        assert!(runs[2].annotations.bold);
        assert_eq!(runs[2].href.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn link_with_parentheses_in_url() {
        let runs = segment("[wiki](https://en.wikipedia.org/wiki/Rust_(language))");
        assert_eq!(
            runs[0].href.as_deref(),
            Some("https://en.wikipedia.org/wiki/Rust_(language)")
        );
    }

    #[test]
    fn autolinks() {
        let runs = segment("<https://rust-lang.org> or <me@example.com>");
        assert_eq!(runs[0].href.as_deref(), Some("https://rust-lang.org"));
        assert_eq!(runs[0].plain_text, "https://rust-lang.org");
        assert_eq!(runs[2].href.as_deref(), Some("mailto:me@example.com"));
    }

    #[test]
    fn inline_image_degrades_to_link() {
        let runs = segment("logo ![Rust](rust.png) text");
        assert_eq!(runs[1].plain_text, "Rust");
        assert_eq!(runs[1].href.as_deref(), Some("rust.png"));
    }

    #[test]
    fn strikethrough() {
        let runs = segment("~~gone~~ ~kept~");
        assert!(runs[0].annotations.strikethrough);
        assert_eq!(runs[0].plain_text, "gone");
        assert_eq!(runs[1], plain(" ~kept~"));
    }

    #[test]
    fn hard_breaks_become_newlines() {
        assert_eq!(segment("one  \ntwo\\\nthree"), vec![plain("one\ntwo\nthree")]);
    }

    #[test]
    fn colour_is_applied_to_every_run() {
        let runs = Segmenter::new(Color::Blue).segment("a **b**");
        assert!(runs.iter().all(|r| r.annotations.color == Color::Blue));
    }
}
