//! Persisted configuration files.
//!
//! Configurations are stored one per line as comma-separated floats; handle
//! identifiers one per line in a companion file. Files are read wholesale.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::configuration::{CalibrationTarget, Configuration, HandleId, TargetSet};

/// Persisted-file error
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source_name}:{line}: invalid coordinate '{field}'")]
    Parse {
        source_name: String,
        line: usize,
        field: String,
    },

    #[error("{pregrasps} pre-grasps, {contacts} contacts and {handles} handles in companion files")]
    LengthMismatch {
        pregrasps: usize,
        contacts: usize,
        handles: usize,
    },
}

/// Parses configurations from text, one per non-empty line.
///
/// `source_name` only appears in error messages.
pub fn parse_configurations(
    text: &str,
    source_name: &str,
) -> Result<Vec<Configuration>, DataError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut coordinates = Vec::new();
        for field in line.split(',') {
            let field = field.trim();
            let x = field.parse::<f64>().map_err(|_| DataError::Parse {
                source_name: source_name.to_string(),
                line: idx + 1,
                field: field.to_string(),
            })?;
            coordinates.push(x);
        }
        out.push(Configuration::new(coordinates));
    }
    Ok(out)
}

/// Formats configurations, one comma-separated line each.
pub fn format_configurations<'a, I>(configurations: I) -> String
where
    I: IntoIterator<Item = &'a Configuration>,
{
    let mut out = String::new();
    for q in configurations {
        let line: Vec<String> = q.as_slice().iter().map(|x| x.to_string()).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn read_configurations(path: impl AsRef<Path>) -> Result<Vec<Configuration>, DataError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    parse_configurations(&text, &path.display().to_string())
}

pub fn write_configurations<'a, I>(
    path: impl AsRef<Path>,
    configurations: I,
) -> Result<(), DataError>
where
    I: IntoIterator<Item = &'a Configuration>,
{
    write(path.as_ref(), &format_configurations(configurations))
}

/// Reads handle identifiers, one per line.
pub fn read_handles(path: impl AsRef<Path>) -> Result<Vec<HandleId>, DataError> {
    let text = read_to_string(path.as_ref())?;
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(HandleId::from)
        .collect())
}

pub fn write_handles<'a, I>(path: impl AsRef<Path>, handles: I) -> Result<(), DataError>
where
    I: IntoIterator<Item = &'a HandleId>,
{
    let mut out = String::new();
    for h in handles {
        out.push_str(h.as_str());
        out.push('\n');
    }
    write(path.as_ref(), &out)
}

impl TargetSet {
    /// Loads targets from the three companion files.
    pub fn load(
        pregrasps: impl AsRef<Path>,
        contacts: impl AsRef<Path>,
        handles: impl AsRef<Path>,
    ) -> Result<Self, DataError> {
        let pregrasps = read_configurations(pregrasps)?;
        let contacts = read_configurations(contacts)?;
        let handles = read_handles(handles)?;
        if pregrasps.len() != contacts.len() || pregrasps.len() != handles.len() {
            return Err(DataError::LengthMismatch {
                pregrasps: pregrasps.len(),
                contacts: contacts.len(),
                handles: handles.len(),
            });
        }
        let targets = pregrasps
            .into_iter()
            .zip(contacts)
            .zip(handles)
            .map(|((pregrasp, contact), handle)| CalibrationTarget {
                pregrasp,
                contact,
                handle,
            })
            .collect();
        Ok(Self::new(targets))
    }

    /// Writes targets back to the three companion files.
    pub fn save(
        &self,
        pregrasps: impl AsRef<Path>,
        contacts: impl AsRef<Path>,
        handles: impl AsRef<Path>,
    ) -> Result<(), DataError> {
        write_configurations(pregrasps, self.pregrasps())?;
        write_configurations(contacts, self.contacts())?;
        write_handles(handles, self.handles())
    }
}

fn read_to_string(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), DataError> {
    fs::write(path, contents).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let configs = parse_configurations("0,1.5,-2\n\n3, 4 ,5\n", "mem").unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].as_slice(), &[0.0, 1.5, -2.0]);
        assert_eq!(configs[1].as_slice(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_parse_reports_line_and_field() {
        let err = parse_configurations("0,1\n2,x\n", "contacts.csv").unwrap_err();
        match err {
            DataError::Parse {
                source_name,
                line,
                field,
            } => {
                assert_eq!(source_name, "contacts.csv");
                assert_eq!(line, 2);
                assert_eq!(field, "x");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_target_set_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let pg = dir.path().join("pregrasps");
        let ct = dir.path().join("contacts");
        let hd = dir.path().join("handles");

        let targets = TargetSet::from_parts(
            vec![Configuration::new(vec![0.25, 1.0]), Configuration::new(vec![2.0, -3.5])],
            vec![Configuration::new(vec![0.5, 1.0]), Configuration::new(vec![2.5, -3.5])],
            vec!["table/contact_01".into(), "table/contact_02".into()],
        )
        .unwrap();
        targets.save(&pg, &ct, &hd).unwrap();

        let loaded = TargetSet::load(&pg, &ct, &hd).unwrap();
        assert_eq!(loaded, targets);
    }

    #[test]
    fn test_load_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let pg = dir.path().join("pregrasps");
        let ct = dir.path().join("contacts");
        let hd = dir.path().join("handles");
        fs::write(&pg, "0,0\n1,1\n").unwrap();
        fs::write(&ct, "0,1\n1,2\n").unwrap();
        fs::write(&hd, "table/contact_01\n").unwrap();

        let err = TargetSet::load(&pg, &ct, &hd).unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch {
                pregrasps: 2,
                contacts: 2,
                handles: 1
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_configurations(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
