//! One-call build of a PICO-8 Lua source file
//!
//! [`build`] runs lex and parse, optional `require` expansion, then either
//! renaming or formatting, and reports the runtime token count of the
//! result.
//!
//! # Example
//!
//! ```
//! use codegen::RenameOptions;
//! use pipeline::{build, BuildOptions};
//! use std::path::Path;
//!
//! let options = BuildOptions {
//!     rename: Some(RenameOptions::default()),
//!     ..BuildOptions::default()
//! };
//! let output = build(b"local speed = 2\nprint(speed)", Path::new("main.lua"), &options).unwrap();
//! assert_eq!(output.source, b"local a=2\nprint(a)".to_vec());
//! assert_eq!(output.token_count, 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

use codegen::{format, minify, FormatOptions, RenameMap, RenameOptions};
use core_types::LuaError;
use module_resolver::{ModuleResolver, RequireDiagnostic, ResolverOptions, PRESERVED_NAMES};
use parser::{count_tokens, tokenize};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Which passes [`build`] runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Expand `require` calls
    pub resolve: Option<ResolverOptions>,
    /// Minify; takes precedence over `format`
    pub rename: Option<RenameOptions>,
    /// Re-format
    pub format: Option<FormatOptions>,
}

/// What [`build`] produced
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// Serialized result
    pub source: Vec<u8>,
    /// Failed `require` calls
    pub diagnostics: Vec<RequireDiagnostic>,
    /// Runtime token count of `source`
    pub token_count: usize,
    /// Names changed by renaming
    pub rename_map: RenameMap,
}

/// Build `source`, read from `path`.
///
/// Without renaming or formatting the input bytes are returned unchanged,
/// unless modules were spliced in, in which case the result is formatted
/// with default options.
pub fn build(source: &[u8], path: &Path, options: &BuildOptions) -> Result<BuildOutput, LuaError> {
    trace!(path = %path.display(), bytes = source.len(), "build");
    let mut chunk = parser::parse(source).map_err(|e| e.in_file(path))?;

    let mut diagnostics = Vec::new();
    let mut expanded = false;
    if let Some(resolve) = &options.resolve {
        let expansion = ModuleResolver::new(resolve.clone()).expand(chunk, path)?;
        expanded = !expansion.modules.is_empty();
        diagnostics = expansion.diagnostics;
        chunk = expansion.chunk;
    }

    let mut rename_map = RenameMap::new();
    let output = match (&options.rename, &options.format) {
        (Some(rename), _) => {
            let mut rename = rename.clone();
            if expanded {
                rename
                    .preserve_names
                    .extend(PRESERVED_NAMES.iter().map(|n| n.to_string()));
            }
            let renamed = minify(&chunk, &rename)?;
            rename_map = renamed.rename_map;
            renamed.renamed_source
        }
        (None, Some(layout)) => format(&chunk, layout),
        (None, None) if expanded => format(&chunk, &FormatOptions::default()),
        (None, None) => source.to_vec(),
    };

    let token_count = count_tokens(&tokenize(&output).map_err(|e| e.in_file(path))?);
    debug!(
        path = %path.display(),
        bytes = output.len(),
        token_count,
        diagnostics = diagnostics.len(),
        "built source"
    );
    Ok(BuildOutput {
        source: output,
        diagnostics,
        token_count,
        rename_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ErrorKind;

    const SCENARIO: &str = "t = 0\nmusic(0)\nfunction _update()\n t += 1\nend";

    #[test]
    fn test_plain_build_echoes_source() {
        let output = build(SCENARIO.as_bytes(), Path::new("main.lua"), &BuildOptions::default())
            .unwrap();
        assert_eq!(output.source, SCENARIO.as_bytes());
        assert_eq!(output.token_count, 12);
        assert!(output.rename_map.is_empty());
    }

    #[test]
    fn test_rename_wins_over_format() {
        let options = BuildOptions {
            rename: Some(RenameOptions::default()),
            format: Some(FormatOptions::default()),
            ..BuildOptions::default()
        };
        let output = build(SCENARIO.as_bytes(), Path::new("main.lua"), &options).unwrap();
        assert_eq!(
            output.source,
            b"t=0\nmusic(0)\nfunction _update()\nt+=1\nend".to_vec()
        );
        assert_eq!(output.token_count, 12);
    }

    #[test]
    fn test_format_only() {
        let options = BuildOptions {
            format: Some(FormatOptions { indent_width: 1 }),
            ..BuildOptions::default()
        };
        let output = build(SCENARIO.as_bytes(), Path::new("main.lua"), &options).unwrap();
        assert_eq!(
            output.source,
            b"t = 0\nmusic(0)\nfunction _update()\n t += 1\nend\n".to_vec()
        );
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = build(b"if", Path::new("cart.lua"), &BuildOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.file.as_deref(), Some(Path::new("cart.lua")));
    }

    #[test]
    fn test_options_from_json() {
        let options: BuildOptions = serde_json::from_str(
            r#"{"resolve": {"search_path": ["?.lua"]}, "format": {"indent_width": 4}}"#,
        )
        .unwrap();
        assert_eq!(options.resolve.unwrap().search_path, vec!["?.lua"]);
        assert_eq!(options.format, Some(FormatOptions { indent_width: 4 }));
        assert!(options.rename.is_none());
    }
}
