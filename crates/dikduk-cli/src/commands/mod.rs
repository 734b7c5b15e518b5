pub mod approve;
pub mod check;
pub mod grade;
pub mod grammar;
pub mod init;
pub mod validate;

use anyhow::Result;
use dikduk_core::grammar::GrammarField;
use dikduk_core::model::Field;

/// Parse a field name given on the command line (English or Hebrew).
pub fn parse_field(name: &str) -> Result<Field> {
    name.parse::<Field>().map_err(|e| anyhow::anyhow!(e))
}

/// Parse a field that has a grammar table.
pub fn parse_grammar_field(name: &str) -> Result<GrammarField> {
    let field = parse_field(name)?;
    GrammarField::for_field(field)
        .ok_or_else(|| anyhow::anyhow!("{field} has no grammar table"))
}
