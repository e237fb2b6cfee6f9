use crate::errors::ParserError;
use crate::formats::CsvTableParser;
use crate::model::Table;

pub trait TableParser {
    fn name(&self) -> &'static str;
    /// File-name suffix, including the dot, of the files this parser reads.
    fn extension(&self) -> &'static str;
    fn parse(&self, content: &[u8]) -> Result<Table, ParserError>;

    fn accepts(&self, key: &str) -> bool {
        key.ends_with(self.extension())
    }
}

pub fn parse_csv_table(content: &[u8]) -> Result<Table, ParserError> {
    CsvTableParser.parse(content)
}
