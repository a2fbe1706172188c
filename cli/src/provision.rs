// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use idsync::GitHubClient;
use idsync::GitHubConfig;
use idsync::OneLoginClient;
use idsync::OneLoginConfig;
use idsync::ProvisionUserRequest;
use idsync::UserRecord;
use idsync::read_emails;
use idsync::write_audit_csv;
use slog::Logger;
use slog::warn;

/// Creates SCIM user records on GitHub from OneLogin profiles.
pub struct Provisioner {
    onelogin: OneLoginConfig,
    github: GitHubClient,
    role: String,
    roster: PathBuf,
    output_dir: PathBuf,
    log: Logger,
}

#[derive(Debug, Default, PartialEq)]
pub struct ProvisionSummary {
    pub processed: usize,
    pub provisioned: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
    pub audit_path: Option<PathBuf>,
}

impl Provisioner {
    pub fn new(
        onelogin: OneLoginConfig,
        github: &GitHubConfig,
        role: String,
        roster: PathBuf,
        output_dir: PathBuf,
        log: &Logger,
    ) -> Provisioner {
        Provisioner {
            onelogin,
            github: GitHubClient::new(github, log),
            role,
            roster,
            output_dir,
            log: log.clone(),
        }
    }

    pub fn run(&self) -> anyhow::Result<ProvisionSummary> {
        let roster = read_emails(&self.roster)?;

        // A failed token exchange fails the run before any row is touched.
        let onelogin = OneLoginClient::connect(&self.onelogin, &self.log)?;

        let mut summary = ProvisionSummary {
            skipped: roster.skipped,
            ..Default::default()
        };
        let mut records: Vec<UserRecord> = Vec::new();

        for email in &roster.emails {
            summary.processed += 1;
            println!("Processing {email}");

            let record = match onelogin.find_user(email) {
                Ok(Some(user)) => user.into_record(&self.role),
                Ok(None) => {
                    summary.not_found += 1;
                    println!("  user not found in OneLogin: {email}");
                    continue;
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(self.log, "OneLogin lookup failed";
                        "email" => email.as_str());
                    println!("  failed: {e:#}");
                    continue;
                }
            };

            if !record.provisionable() {
                summary.skipped += 1;
                println!(
                    "  profile for {email} is missing userName or email, \
                     skipping"
                );
                records.push(record);
                continue;
            }

            let request = ProvisionUserRequest::from(&record);
            match self.github.provision_user(&request) {
                Ok(()) => {
                    summary.provisioned += 1;
                    println!(
                        "  provisioned {} ({}) with role {}",
                        record.user_name, record.email, record.role
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(self.log, "provisioning failed";
                        "email" => email.as_str());
                    println!("  failed: {e:#}");
                }
            }
            records.push(record);
        }

        if !records.is_empty() {
            let path = write_audit_csv(&records, &self.output_dir)?;
            println!("OneLogin user details saved to {}", path.display());
            summary.audit_path = Some(path);
        }

        println!(
            "provisioned: {} / not found: {} / skipped: {} / failed: {}",
            summary.provisioned,
            summary.not_found,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }
}
