use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FindexError;
use crate::jsonapi::Envelope;

/// Where a response document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// `-` means stdin, anything else is a file path
    pub fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            Source::Stdin
        } else {
            Source::File(path.to_path_buf())
        }
    }

    /// Directory to start config discovery from
    pub fn config_root(&self) -> Option<PathBuf> {
        match self {
            Source::Stdin => std::env::current_dir().ok(),
            Source::File(path) => std::fs::canonicalize(path)
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf)),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin => write!(f, "<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read and parse a response document
pub fn load_envelope(source: &Source) -> Result<Envelope, FindexError> {
    let origin = source.to_string();
    let content = match source {
        Source::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
        }
        Source::File(path) => std::fs::read_to_string(path),
    }
    .map_err(|source| FindexError::Io {
        origin: origin.clone(),
        source,
    })?;

    debug!("Read {} bytes from {}", content.len(), origin);
    parse_envelope(&content, &origin)
}

/// Parse a response document from text
pub fn parse_envelope(content: &str, origin: &str) -> Result<Envelope, FindexError> {
    serde_json::from_str(content).map_err(|source| FindexError::Parse {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdin() {
        assert_eq!(Source::from_arg(Path::new("-")), Source::Stdin);
        assert_eq!(
            Source::from_arg(Path::new("findings.json")),
            Source::File(PathBuf::from("findings.json"))
        );
        assert_eq!(Source::Stdin.to_string(), "<stdin>");
    }

    #[test]
    fn loads_envelope_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("findings.json");
        std::fs::write(
            &path,
            r#"{ "data": [{ "type": "findings", "id": "f1" }], "included": [] }"#,
        )
        .unwrap();

        let source = Source::File(path);
        let env = load_envelope(&source).unwrap();
        assert_eq!(env.data.len(), 1);
        assert_eq!(source.config_root().unwrap(), std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_envelope(&Source::File(dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, FindexError::Io { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_envelope("{ \"data\": [", "inline").unwrap_err();
        assert!(matches!(err, FindexError::Parse { .. }));
        let err = parse_envelope("{ \"data\": 42 }", "inline").unwrap_err();
        assert!(err.to_string().starts_with("inline"));
    }

    #[test]
    fn one_malformed_entity_does_not_fail_the_response() {
        let content = r#"{
            "data": [
                { "type": "findings", "id": 7, "relationships": { "scan": null } },
                { "type": "findings", "id": "f2" }
            ],
            "included": [{ "type": "scans", "id": "s1", "relationships": { "provider": null } }]
        }"#;
        let env = parse_envelope(content, "inline").unwrap();
        assert_eq!(env.data.len(), 2);
        assert_eq!(env.data[0].id.as_deref(), Some("7"));
        assert_eq!(env.included.len(), 1);
    }
}
