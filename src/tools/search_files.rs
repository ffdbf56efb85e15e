//! `search_files` tool — file name search via globset patterns.
//!
//! The pattern is matched against each file's base name only, so `**` has
//! no recursive meaning here.

use std::path::Path;

use serde::Deserialize;

use crate::error::{FileServerError, FileServerResult};
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::resources::walk_files;
use crate::sandbox::Sandbox;

pub const NAME: &str = "search_files";

#[derive(Debug, Deserialize)]
pub struct SearchFilesParams {
    /// Glob pattern for file names (e.g. "*.rs", "data-?.csv").
    pub pattern: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Search for files by name pattern. Supports * and ? wildcards \
            and [...] character classes."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The filename pattern to search for (supports wildcards)"
                }
            },
            "required": ["pattern"]
        }),
    }
}

pub fn execute(sandbox: &Sandbox, params: &SearchFilesParams) -> FileServerResult<ToolCallResult> {
    let glob = match compile(&params.pattern) {
        Ok(g) => g,
        Err(e) => return Ok(ToolCallResult::error(format!("Error: {e}"))),
    };

    let mut matches = Vec::new();
    let walked = walk_files(sandbox.root(), &mut |relative: &Path| {
        if relative.file_name().is_some_and(|name| glob.is_match(name)) {
            matches.push(relative.display().to_string());
        }
    });
    if let Err(e) = walked {
        return Ok(ToolCallResult::error(format!("Search failed: {e}")));
    }

    let mut output = format!("Files matching pattern '{}':\n", params.pattern);
    if matches.is_empty() {
        output.push_str("No files found matching the pattern.");
    } else {
        for m in &matches {
            output.push_str("📄 ");
            output.push_str(m);
            output.push('\n');
        }
    }

    Ok(ToolCallResult::text(output))
}

fn compile(pattern: &str) -> FileServerResult<globset::GlobMatcher> {
    globset::GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| FileServerError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_matches_base_names() {
        let glob = compile("*.txt").expect("glob");
        assert!(glob.is_match("a.txt"));
        assert!(!glob.is_match("a.md"));

        let glob = compile("file-?.[ch]").expect("glob");
        assert!(glob.is_match("file-1.c"));
        assert!(glob.is_match("file-2.h"));
        assert!(!glob.is_match("file-10.c"));
    }

    #[test]
    fn test_compile_rejects_unclosed_class() {
        assert!(matches!(
            compile("[abc"),
            Err(FileServerError::InvalidPattern { .. })
        ));
    }
}
