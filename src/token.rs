use crate::error::ConvertError;

/// Structural role of a token inside the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Leaf,
    Close,
}

/// A node of the flat, order-preserving token stream.
///
/// Block structure is expressed through `_open`/`_close` pairs; the text of a
/// paragraph, heading or table cell lives in a single `inline` token whose
/// `content` is the raw inline source and whose `children` are the inline tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub tag: String,
    pub nesting: Nesting,
    pub content: String,
    pub children: Vec<Token>,
    pub markup: String,
    pub info: String,
    pub attrs: Vec<(String, String)>,
    /// Set on paragraphs synthesised inside tight list items.
    pub hidden: bool,
}

impl Token {
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            content: String::new(),
            children: Vec::new(),
            markup: String::new(),
            info: String::new(),
            attrs: Vec::new(),
            hidden: false,
        }
    }

    pub fn open(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, tag, Nesting::Open)
    }

    pub fn close(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, tag, Nesting::Close)
    }

    pub fn leaf(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, tag, Nesting::Leaf)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// `paragraph_open` and `paragraph_close` share the base `paragraph`.
    pub fn base_kind(&self) -> &str {
        match self.nesting {
            Nesting::Open => self.kind.strip_suffix("_open").unwrap_or(&self.kind),
            Nesting::Close => self.kind.strip_suffix("_close").unwrap_or(&self.kind),
            Nesting::Leaf => &self.kind,
        }
    }
}

/// Index of the `_close` token matching the `_open` token at `open`.
///
/// A leaf token is its own span, so the function returns `open` for it.
pub fn matching_close(tokens: &[Token], open: usize) -> Result<usize, ConvertError> {
    let Some(start) = tokens.get(open) else {
        return Err(ConvertError::Unbalanced {
            kind: "<end of input>".to_string(),
            position: open,
        });
    };
    if start.nesting != Nesting::Open {
        return Ok(open);
    }

    let base = start.base_kind();
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        if token.base_kind() != base {
            continue;
        }
        match token.nesting {
            Nesting::Open => depth += 1,
            Nesting::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            Nesting::Leaf => {}
        }
    }

    Err(ConvertError::Unbalanced {
        kind: start.kind.clone(),
        position: open,
    })
}

/// Check that every `_open` has exactly one `_close` of the same kind at the same depth.
pub fn validate(tokens: &[Token]) -> Result<(), ConvertError> {
    let mut stack: Vec<(usize, &str)> = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        match token.nesting {
            Nesting::Open => stack.push((idx, token.base_kind())),
            Nesting::Close => match stack.pop() {
                Some((_, open)) if open == token.base_kind() => {}
                Some((position, _)) => {
                    return Err(ConvertError::Unbalanced {
                        kind: tokens[position].kind.clone(),
                        position,
                    });
                }
                None => {
                    return Err(ConvertError::Unbalanced {
                        kind: token.kind.clone(),
                        position: idx,
                    });
                }
            },
            Nesting::Leaf => {}
        }
    }

    match stack.pop() {
        Some((position, _)) => Err(ConvertError::Unbalanced {
            kind: tokens[position].kind.clone(),
            position,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Vec<Token> {
        vec![
            Token::open("paragraph_open", "p"),
            Token::leaf("inline", "").with_content(text),
            Token::close("paragraph_close", "p"),
        ]
    }

    #[test]
    fn close_of_nested_same_kind() {
        let mut tokens = vec![Token::open("bullet_list_open", "ul")];
        tokens.push(Token::open("list_item_open", "li"));
        tokens.push(Token::open("bullet_list_open", "ul"));
        tokens.push(Token::open("list_item_open", "li"));
        tokens.extend(paragraph("inner"));
        tokens.push(Token::close("list_item_close", "li"));
        tokens.push(Token::close("bullet_list_close", "ul"));
        tokens.push(Token::close("list_item_close", "li"));
        tokens.push(Token::close("bullet_list_close", "ul"));

        assert_eq!(matching_close(&tokens, 0).unwrap(), tokens.len() - 1);
        assert_eq!(matching_close(&tokens, 2).unwrap(), 8);
        assert!(validate(&tokens).is_ok());
    }

    #[test]
    fn leaf_is_its_own_span() {
        let tokens = vec![Token::leaf("fence", "code")];
        assert_eq!(matching_close(&tokens, 0).unwrap(), 0);
    }

    #[test]
    fn missing_close_is_structural() {
        let mut tokens = paragraph("x");
        tokens.pop();
        let err = validate(&tokens).unwrap_err();
        assert!(matches!(err, ConvertError::Unbalanced { position: 0, .. }));
        assert!(!err.is_recoverable());
        assert!(matching_close(&tokens, 0).is_err());
    }

    #[test]
    fn crossed_pairs_are_structural() {
        let tokens = vec![
            Token::open("blockquote_open", "blockquote"),
            Token::open("paragraph_open", "p"),
            Token::close("blockquote_close", "blockquote"),
            Token::close("paragraph_close", "p"),
        ];
        assert!(validate(&tokens).is_err());
    }

    #[test]
    fn stray_close_is_structural() {
        let tokens = vec![Token::close("paragraph_close", "p")];
        assert!(matches!(
            validate(&tokens),
            Err(ConvertError::Unbalanced { position: 0, .. })
        ));
    }
}
