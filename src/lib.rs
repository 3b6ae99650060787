mod block;
mod builder;
mod config;
mod context;
pub mod converters;
mod error;
pub mod notion;
mod parser;
mod registry;
mod rich_text;
mod token;

pub use block::{Annotations, Block, Color, MediaKind, RichTextRun, plain_text};
pub use builder::{Conversion, PageBuilder};
pub use config::{Settings, TOKEN_ENV, default_path};
pub use context::{ConversionContext, Diagnostic};
pub use error::{ConfigError, ConvertError, NotionError, RegistryError};
pub use registry::{BlockConverter, Converted, Registry};
pub use rich_text::{References, Segmenter};
pub use token::{Nesting, Token, matching_close, validate};

use serde_json::Value;

/// Tokenize markdown into the flat open/close token stream the converters walk.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    parser::parse(markdown)
}

/// Split inline markdown into rich-text runs with default colouring.
pub fn segment(inline: &str) -> Vec<RichTextRun> {
    Segmenter::default().segment(inline)
}

/// Convert markdown with the built-in converters and compiled-in settings.
pub fn markdown_to_blocks(markdown: &str) -> anyhow::Result<Conversion> {
    let builder = PageBuilder::with_defaults()?;
    Ok(builder.convert(markdown)?)
}

/// Convert markdown to the JSON array of block objects sent to the API.
pub fn markdown_to_json(markdown: &str) -> anyhow::Result<Value> {
    let conversion = markdown_to_blocks(markdown)?;
    Ok(serde_json::to_value(&conversion.blocks)?)
}
