use std::fs;

const SETTINGS_PATH: &str = "src/default_config.toml";

/// Keys the bundled settings must define, with the TOML type each one needs.
const REQUIRED: &[(&str, &str)] = &[
    ("notion_api_token", "string"),
    ("default_color", "string"),
    ("enable_equation_blocks", "boolean"),
    ("strict", "boolean"),
    ("api_base_url", "string"),
    ("notion_version", "string"),
];

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS_PATH}");

    let content = fs::read_to_string(SETTINGS_PATH)
        .unwrap_or_else(|e| panic!("cannot read {SETTINGS_PATH}: {e}"));
    let table = content
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("invalid {SETTINGS_PATH}: {e}"));

    for (key, expected) in REQUIRED {
        match table.get(*key) {
            Some(value) if value.type_str() == *expected => {}
            Some(value) => panic!(
                "{SETTINGS_PATH}: `{key}` must be a {expected}, found {}",
                value.type_str()
            ),
            None => panic!("{SETTINGS_PATH}: missing `{key}`"),
        }
    }
    for key in table.keys() {
        if !REQUIRED.iter().any(|(known, _)| known == key) {
            panic!("{SETTINGS_PATH}: unknown key `{key}`");
        }
    }
}
