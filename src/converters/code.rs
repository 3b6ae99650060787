use crate::block::{Annotations, Block, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::equation;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::Token;

pub const PLAIN_TEXT: &str = "plain text";

/// Language names accepted by the target's code block.
const LANGUAGES: &[&str] = &[
    "abap", "agda", "arduino", "assembly", "bash", "basic", "bnf", "c", "c#", "c++", "clojure",
    "coffeescript", "coq", "css", "dart", "dhall", "diff", "docker", "ebnf", "elixir", "elm",
    "erlang", "f#", "flow", "fortran", "gherkin", "glsl", "go", "graphql", "groovy", "haskell",
    "html", "idris", "java", "javascript", "json", "julia", "kotlin", "latex", "less", "lisp",
    "livescript", "llvm ir", "lua", "makefile", "markdown", "markup", "matlab", "mathematica",
    "mermaid", "nix", "notion formula", "objective-c", "ocaml", "pascal", "perl", "php",
    "plain text", "powershell", "prolog", "protobuf", "purescript", "python", "r", "racket",
    "reason", "ruby", "rust", "sass", "scala", "scheme", "scss", "shell", "solidity", "sql",
    "swift", "toml", "typescript", "vb.net", "verilog", "vhdl", "visual basic", "webassembly",
    "xml", "yaml", "java/c/c++/c#",
];

const ALIASES: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("python3", "python"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("sh", "shell"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("ps1", "powershell"),
    ("yml", "yaml"),
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("fsharp", "f#"),
    ("md", "markdown"),
    ("golang", "go"),
    ("kt", "kotlin"),
    ("rb", "ruby"),
    ("tex", "latex"),
    ("dockerfile", "docker"),
    ("make", "makefile"),
    ("objc", "objective-c"),
    ("proto", "protobuf"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("wasm", "webassembly"),
    ("vb", "visual basic"),
    ("htm", "html"),
    ("svg", "xml"),
    ("text", PLAIN_TEXT),
    ("txt", PLAIN_TEXT),
    ("plaintext", PLAIN_TEXT),
];

/// Fenced (`fence`) and indented (`code_block`) code.
///
/// The content is kept verbatim as one unformatted run. A `math` fence is a
/// display equation instead.
pub struct CodeConverter;

impl BlockConverter for CodeConverter {
    fn name(&self) -> &'static str {
        "code"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["fence", "code_block"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let token = &tokens[idx];
        let content = token.content.strip_suffix('\n').unwrap_or(&token.content);

        if info_word(&token.info) == "math" {
            return Ok(Converted::one(equation::display(page, content.trim()), idx + 1));
        }

        let rich_text = if content.is_empty() {
            Vec::new()
        } else {
            vec![RichTextRun::text(content, Annotations::plain(page.settings().default_color))]
        };
        Ok(Converted::one(
            Block::Code {
                language: language(&token.info),
                rich_text,
            },
            idx + 1,
        ))
    }
}

/// First word of a fence info string, lower-cased: `Rust,ignore` → `rust`.
fn info_word(info: &str) -> String {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .find(|word| !word.is_empty())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Target language for a fence info string, `plain text` when unknown.
pub fn language(info: &str) -> String {
    let word = info_word(info);
    let word = ALIASES
        .iter()
        .find(|(alias, _)| *alias == word)
        .map_or(word.as_str(), |(_, name)| *name);

    if LANGUAGES.contains(&word) {
        word.to_string()
    } else {
        PLAIN_TEXT.to_string()
    }
}
