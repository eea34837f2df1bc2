//! Argument vector construction for the conversion tool.

use std::path::Path;

use crate::models::ConversionRequest;

/// Builds the tool's argument vector from a [`ConversionRequest`].
///
/// The result is handed to the executor as discrete arguments and is
/// never joined into a shell string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder;

impl CommandBuilder {
    /// Build the full argv, program first.
    ///
    /// `input` and `output` come from a [`TempResourceManager`], whose
    /// paths are always valid UTF-8.
    ///
    /// [`TempResourceManager`]: crate::filesystem::TempResourceManager
    pub fn build(
        tool: &str,
        input: &Path,
        output: &Path,
        request: &ConversionRequest,
    ) -> Vec<String> {
        let mut argv = Vec::with_capacity(
            8 + request.variables.len() * 2
                + request.filters.len() * 2
                + request.metadata.len() * 2
                + request.extra_args.len(),
        );

        argv.push(tool.to_string());
        argv.push("-f".to_string());
        argv.push(request.from_format.clone());
        argv.push("-t".to_string());
        argv.push(request.to_format.clone());

        if request.standalone {
            argv.push("--standalone".to_string());
        }

        if let Some(template) = &request.template {
            argv.push("--template".to_string());
            argv.push(template.clone());
        }

        for (key, value) in &request.variables {
            argv.push("--variable".to_string());
            argv.push(format!("{key}={value}"));
        }

        for filter in &request.filters {
            argv.push("--filter".to_string());
            argv.push(filter.clone());
        }

        for (key, value) in &request.metadata {
            argv.push("--metadata".to_string());
            argv.push(format!("{key}={}", value.render()));
        }

        argv.extend(request.extra_args.iter().cloned());

        argv.push(input.to_string_lossy().into_owned());
        argv.push("-o".to_string());
        argv.push(output.to_string_lossy().into_owned());

        argv
    }
}
