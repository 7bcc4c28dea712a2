//! Records emitted by `cargo --message-format=json`.
//!
//! Only the fields the quickfix list needs are modelled; everything else in a
//! record is ignored by serde. Required fields are required here too, so a
//! record whose shape changed fails with the name of the missing field.

use log::trace;
use serde::Deserialize;

/// One line of cargo's JSON stream, tagged by its `reason`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum CargoRecord {
    CompilerArtifact(Artifact),
    CompilerMessage(CompilerMessage),
    /// `build-script-executed`, `build-finished` and anything newer.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub package_id: Option<String>,
    /// False when cargo actually rebuilt the artifact.
    pub fresh: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompilerMessage {
    #[serde(default)]
    pub package_id: Option<String>,
    pub message: RustcDiagnostic,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RustcDiagnostic {
    pub message: String,
    pub level: String,
    pub spans: Vec<DiagnosticSpan>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiagnosticSpan {
    pub file_name: String,
    pub line_start: usize,
    pub column_start: usize,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub expansion: Option<Box<MacroExpansion>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MacroExpansion {
    pub span: DiagnosticSpan,
    #[serde(default)]
    pub macro_decl_name: Option<String>,
}

impl DiagnosticSpan {
    /// Virtual locations such as `<::core::macros::panic macros>` are not files
    /// anyone can open.
    pub fn is_virtual(&self) -> bool {
        self.file_name.starts_with('<')
    }

    /// Follows the expansion chain out of virtual code.
    ///
    /// Returns the first span with a real file, or the last virtual span when
    /// the chain never leaves generated code.
    pub fn real_location(&self) -> &DiagnosticSpan {
        let mut span = self;
        while span.is_virtual() {
            match span.expansion.as_deref() {
                Some(expansion) => {
                    trace!(
                        "{} expanded from {}",
                        span.file_name,
                        expansion.macro_decl_name.as_deref().unwrap_or("<unnamed macro>")
                    );
                    span = &expansion.span;
                }
                None => break,
            }
        }
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reason_is_other() {
        let rec: CargoRecord =
            serde_json::from_str(r#"{"reason":"build-finished","success":true}"#).unwrap();
        assert_eq!(rec, CargoRecord::Other);
    }

    #[test]
    fn test_artifact_requires_fresh() {
        let err = serde_json::from_str::<CargoRecord>(r#"{"reason":"compiler-artifact"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("fresh"));
    }

    #[test]
    fn test_span_null_label_and_expansion() {
        let span: DiagnosticSpan = serde_json::from_str(
            r#"{"file_name":"src/lib.rs","line_start":9,"column_start":11,"label":null,"expansion":null}"#,
        )
        .unwrap();
        assert_eq!(span.label, None);
        assert!(span.expansion.is_none());
        assert!(!span.is_virtual());
    }

    #[test]
    fn test_real_location_walks_nested_expansions() {
        let span: DiagnosticSpan = serde_json::from_str(
            r#"{"file_name":"<a macros>","line_start":1,"column_start":1,
                "expansion":{"macro_decl_name":"a!","span":
                  {"file_name":"<b macros>","line_start":2,"column_start":2,
                   "expansion":{"span":{"file_name":"src/main.rs","line_start":30,"column_start":5}}}}}"#,
        )
        .unwrap();
        let outer = span.expansion.as_deref().unwrap();
        assert_eq!(outer.macro_decl_name.as_deref(), Some("a!"));
        assert_eq!(outer.span.expansion.as_deref().unwrap().macro_decl_name, None);
        let real = span.real_location();
        assert_eq!(real.file_name, "src/main.rs");
        assert_eq!(real.line_start, 30);
    }

    #[test]
    fn test_real_location_stays_virtual_without_expansion() {
        let span: DiagnosticSpan = serde_json::from_str(
            r#"{"file_name":"<built-in>","line_start":1,"column_start":1}"#,
        )
        .unwrap();
        assert_eq!(span.real_location().file_name, "<built-in>");
    }
}
