// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;

use super::*;

#[derive(Deserialize)]
struct EmailRow {
    #[serde(default)]
    email: Option<String>,
}

/// The parsed input roster: the emails to process, plus how many rows were
/// dropped for carrying no usable email.
#[derive(Debug)]
pub struct Roster {
    pub emails: Vec<String>,
    pub skipped: usize,
}

/// Read a headered CSV with an `email` column. Blank rows and `#` comment
/// rows are ignored; a row whose email field is missing or empty is counted
/// as skipped. Fields are trimmed.
pub fn read_emails(path: &Path) -> anyhow::Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("reading roster {}", path.display()))?;

    let mut emails = Vec::new();
    let mut skipped = 0;

    for row in reader.deserialize::<EmailRow>() {
        let row =
            row.with_context(|| format!("parsing roster {}", path.display()))?;

        match row.email {
            Some(email) if !email.is_empty() && !email.starts_with('#') => {
                emails.push(email)
            }
            _ => skipped += 1,
        }
    }

    Ok(Roster { emails, skipped })
}

/// Write the collected identity-provider profiles to a timestamped audit
/// CSV in `dir`, returning the path written.
pub fn write_audit_csv(
    records: &[UserRecord],
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("onelogin_user_details_{timestamp}.csv"));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating audit file {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }

    writer
        .flush()
        .with_context(|| format!("flushing audit file {}", path.display()))?;

    Ok(path)
}
