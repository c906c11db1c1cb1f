//! Template engine backed by an external program.

use crate::error::{Error, Result};
use crate::model::RenderRecord;
use crate::process::run_tool;
use std::ffi::OsString;
use std::fs;

use super::TemplateEngine;

/// Renders templates by running an external program.
///
/// The program is invoked as
/// `<program> [args...] <template-file> <fields-file> <output-file>`.
/// The fields file holds the normalized record as JSON; image fields are
/// objects with `path`, `width` and `height`. The program must write the
/// filled document to the output file.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    template_extension: String,
}

impl CommandEngine {
    /// Create an engine running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            template_extension: "docx".to_string(),
        }
    }

    /// Add an argument passed before the file arguments.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments passed before the file arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the extension of the template and output files (default `docx`).
    pub fn with_template_extension(mut self, extension: impl Into<String>) -> Self {
        self.template_extension = extension.into();
        self
    }

    /// The program this engine runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl TemplateEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn render(&self, template: &[u8], fields: &RenderRecord<'_>) -> Result<Vec<u8>> {
        let workdir = tempfile::Builder::new()
            .prefix("docfill-render-")
            .tempdir()?;

        let template_path = workdir
            .path()
            .join(format!("template.{}", self.template_extension));
        let fields_path = workdir.path().join("fields.json");
        let output_path = workdir
            .path()
            .join(format!("output.{}", self.template_extension));

        fs::write(&template_path, template)?;
        fs::write(&fields_path, serde_json::to_vec_pretty(fields)?)?;

        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(template_path.into_os_string());
        args.push(fields_path.into_os_string());
        args.push(output_path.clone().into_os_string());

        run_tool(&self.program, &args).map_err(Error::Template)?;

        let rendered = match fs::read(&output_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if rendered.is_empty() {
            return Err(Error::Template(format!(
                "'{}' produced no output",
                self.program
            )));
        }

        log::debug!("{} rendered {} bytes", self.program, rendered.len());
        Ok(rendered)
    }
}
