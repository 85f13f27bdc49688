//! Snapshot serialization

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

use super::{OrganizationSnapshot, RepositoryRecord};

/// Document format written to stdout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    /// Omit `status` and `error`, matching the legacy document layout
    pub compat: bool,
}

#[derive(Serialize)]
struct LegacySnapshot<'a> {
    repos: Vec<LegacyRecord<'a>>,
}

#[derive(Serialize)]
struct LegacyRecord<'a> {
    name: &'a str,
    giturl: &'a str,
    cloneurl: &'a str,
    branches: &'a [String],
}

impl<'a> From<&'a RepositoryRecord> for LegacyRecord<'a> {
    fn from(record: &'a RepositoryRecord) -> Self {
        Self {
            name: &record.name,
            giturl: &record.git_url,
            cloneurl: &record.clone_url,
            branches: &record.branches,
        }
    }
}

/// Serializes the snapshot into a complete document
pub fn encode_snapshot(snapshot: &OrganizationSnapshot, options: &EncodeOptions) -> Result<String> {
    if options.compat {
        let legacy = LegacySnapshot {
            repos: snapshot.repos.iter().map(LegacyRecord::from).collect(),
        };
        serialize(&legacy, options.format)
    } else {
        serialize(snapshot, options.format)
    }
}

fn serialize<T: Serialize>(document: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(document).context("failed to encode YAML"),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(document).context("failed to encode JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Encodes the snapshot and writes it in one piece
///
/// Encoding finishes before anything is written, so a failure leaves `out`
/// untouched.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    snapshot: &OrganizationSnapshot,
    options: &EncodeOptions,
) -> Result<()> {
    let document = encode_snapshot(snapshot, options)?;
    out.write_all(document.as_bytes())
        .context("failed to write inventory document")?;
    out.flush().context("failed to flush inventory document")?;
    Ok(())
}
