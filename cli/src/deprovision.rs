// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use idsync::GitHubClient;
use idsync::GitHubConfig;
use idsync::read_emails;
use slog::Logger;
use slog::warn;

/// Removes provisioned SCIM users listed in a roster CSV.
pub struct Deprovisioner {
    github: GitHubClient,
    roster: PathBuf,
    log: Logger,
}

#[derive(Debug, Default, PartialEq)]
pub struct DeprovisionSummary {
    pub processed: usize,
    pub deleted: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Deprovisioner {
    pub fn new(
        github: &GitHubConfig,
        roster: PathBuf,
        log: &Logger,
    ) -> Deprovisioner {
        Deprovisioner {
            github: GitHubClient::new(github, log),
            roster,
            log: log.clone(),
        }
    }

    /// Process the roster row by row. A failed row is reported and skipped;
    /// the loop always reaches the end of the roster.
    pub fn run(&self) -> anyhow::Result<DeprovisionSummary> {
        let roster = read_emails(&self.roster)?;

        let mut summary = DeprovisionSummary {
            skipped: roster.skipped,
            ..Default::default()
        };

        for email in &roster.emails {
            summary.processed += 1;
            println!("Processing {email}");

            match self.github.find_scim_user_id(email) {
                Ok(Some(scim_user_id)) => {
                    match self.github.delete_user(&scim_user_id) {
                        Ok(()) => {
                            summary.deleted += 1;
                            println!("  deleted SCIM user {scim_user_id}");
                        }
                        Err(e) => {
                            summary.failed += 1;
                            warn!(self.log, "delete failed";
                                "email" => email.as_str());
                            println!("  failed: {e:#}");
                        }
                    }
                }
                Ok(None) => {
                    summary.not_found += 1;
                    println!("  no SCIM user found for {email}");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(self.log, "SCIM lookup failed";
                        "email" => email.as_str());
                    println!("  failed: {e:#}");
                }
            }
        }

        println!(
            "deleted: {} / not found: {} / skipped: {} / failed: {}",
            summary.deleted, summary.not_found, summary.skipped, summary.failed
        );

        Ok(summary)
    }
}
