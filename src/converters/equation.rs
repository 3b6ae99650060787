use crate::block::{Annotations, Block, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::Token;

/// `math_block` inline tokens (`$$…$$` standing alone in a paragraph).
pub struct EquationConverter;

impl BlockConverter for EquationConverter {
    fn name(&self) -> &'static str {
        "equation"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["math_block"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let expression = tokens[idx].content.trim();
        if expression.is_empty() {
            return Err(ConvertError::failed(&tokens[idx].kind, idx, "empty equation"));
        }
        Ok(Converted::one(display(page, expression), idx + 1))
    }
}

/// A display equation: an equation block, or a paragraph holding a single
/// equation run when equation blocks are disabled.
pub fn display(page: &PageBuilder, expression: &str) -> Block {
    let settings = page.settings();
    if settings.enable_equation_blocks {
        Block::Equation {
            expression: expression.to_string(),
        }
    } else {
        Block::paragraph(vec![RichTextRun::equation(
            expression,
            Annotations::plain(settings.default_color),
        )])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Settings;
    use crate::converters::test_support::blocks;
    use crate::registry::Registry;

    #[test]
    fn display_math_block() {
        assert_eq!(
            blocks("$$\n\\int_0^1 x dx\n$$"),
            vec![Block::Equation {
                expression: "\\int_0^1 x dx".into()
            }]
        );
    }

    #[test]
    fn disabled_equation_blocks_fall_back_to_inline_run() {
        let settings = Settings {
            enable_equation_blocks: false,
            ..Settings::default()
        };
        let page = PageBuilder::new(Arc::new(Registry::builtin().unwrap()), settings);
        let converted = page.convert("$$x^2$$").unwrap().blocks;
        assert_eq!(
            converted,
            vec![Block::paragraph(vec![RichTextRun::equation(
                "x^2",
                Annotations::default()
            )])]
        );
    }
}
