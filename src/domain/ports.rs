use crate::domain::model::{Evaluation, Locale, OutputFormat, RunOptions, TextTable};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn run_options(&self) -> RunOptions;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn locale(&self) -> Locale;
}

pub trait Pipeline {
    fn extract(&self) -> Result<TextTable>;
    fn transform(&self, table: TextTable) -> Result<Evaluation>;
    fn load(&self, evaluation: &Evaluation) -> Result<Vec<String>>;
}
