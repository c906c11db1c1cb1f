//! Format converter backed by an external program.

use crate::error::{Error, Result};
use crate::process::run_tool;
use std::fs;
use std::path::Path;

use super::FormatConverter;

/// Converts documents by running an external program.
///
/// Arguments may contain the placeholders `{input}`, `{output}`, `{outdir}`
/// and `{format}`, which are replaced with the input file, the expected
/// output file, their working directory, and the target extension. The
/// input file is `document.<source>` and the output file is
/// `document.<target>` in a fresh temporary directory.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    name: String,
    program: String,
    args: Vec<String>,
    source_extension: String,
    target_extension: String,
}

impl CommandConverter {
    /// Create a converter running `program` to produce `target` files.
    pub fn new(program: impl Into<String>, target: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: vec!["{input}".to_string(), "{output}".to_string()],
            source_extension: "docx".to_string(),
            target_extension: target.into().trim_start_matches('.').to_lowercase(),
        }
    }

    /// LibreOffice headless conversion to `target` (e.g. `"pdf"`).
    pub fn soffice(target: impl Into<String>) -> Self {
        Self::new("soffice", target).with_args([
            "--headless",
            "--convert-to",
            "{format}",
            "--outdir",
            "{outdir}",
            "{input}",
        ])
    }

    /// Replace the argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the extension of the input file (default `docx`).
    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    /// Set the converter name used for registry lookup.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn expand_args(&self, input: &Path, output: &Path, outdir: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
                    .replace("{outdir}", &outdir.to_string_lossy())
                    .replace("{format}", &self.target_extension)
            })
            .collect()
    }
}

impl FormatConverter for CommandConverter {
    fn target_extension(&self) -> &str {
        &self.target_extension
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, document: &[u8]) -> Result<Vec<u8>> {
        let workdir = tempfile::Builder::new()
            .prefix("docfill-convert-")
            .tempdir()?;
        let input = workdir
            .path()
            .join(format!("document.{}", self.source_extension));
        let output = workdir
            .path()
            .join(format!("document.{}", self.target_extension));

        fs::write(&input, document)?;

        let args = self.expand_args(&input, &output, workdir.path());
        run_tool(&self.program, &args).map_err(Error::Conversion)?;

        let converted = match fs::read(&output) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if converted.is_empty() {
            return Err(Error::Conversion(format!(
                "'{}' produced no {} output",
                self.program, self.target_extension
            )));
        }

        Ok(converted)
    }
}
