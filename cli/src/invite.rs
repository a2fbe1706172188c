// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use idsync::GitHubClient;
use idsync::GitHubConfig;
use idsync::InviteOutcome;
use idsync::InviteTarget;
use idsync::OneLoginClient;
use idsync::OneLoginConfig;
use idsync::UserRecord;
use idsync::read_emails;
use idsync::write_audit_csv;
use slog::Logger;
use slog::warn;

/// Invites roster emails to GitHub, enriching each from its OneLogin
/// profile where one exists.
pub struct Inviter {
    onelogin: OneLoginConfig,
    github: GitHubClient,
    target: InviteTarget,
    role: String,
    roster: PathBuf,
    output_dir: PathBuf,
    log: Logger,
}

#[derive(Debug, Default, PartialEq)]
pub struct InviteSummary {
    pub processed: usize,
    pub invitations_sent: usize,
    pub unsupported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub audit_path: Option<PathBuf>,
}

impl Inviter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        onelogin: OneLoginConfig,
        github: &GitHubConfig,
        target: InviteTarget,
        role: String,
        roster: PathBuf,
        output_dir: PathBuf,
        log: &Logger,
    ) -> Inviter {
        Inviter {
            onelogin,
            github: GitHubClient::new(github, log),
            target,
            role,
            roster,
            output_dir,
            log: log.clone(),
        }
    }

    pub fn run(&self) -> anyhow::Result<InviteSummary> {
        let roster = read_emails(&self.roster)?;

        // A failed token exchange fails the run before any row is touched.
        let onelogin = OneLoginClient::connect(&self.onelogin, &self.log)?;

        let mut summary = InviteSummary {
            skipped: roster.skipped,
            ..Default::default()
        };
        let mut records: Vec<UserRecord> = Vec::new();

        for email in &roster.emails {
            summary.processed += 1;
            println!("Processing {email}");

            let invite_email = match onelogin.find_user(email) {
                Ok(Some(user)) => {
                    let record = user.into_record(&self.role);
                    let address = if record.email.is_empty() {
                        email.clone()
                    } else {
                        record.email.clone()
                    };
                    records.push(record);
                    address
                }
                Ok(None) => {
                    // Not in the identity provider; the invitation can
                    // still go out to the raw address.
                    println!("  not found in OneLogin, inviting by email");
                    email.clone()
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(self.log, "OneLogin lookup failed";
                        "email" => email.as_str());
                    println!("  failed: {e:#}");
                    continue;
                }
            };

            match self.github.invite(&self.target, &invite_email, &self.role) {
                Ok(InviteOutcome::Sent { invitation_id }) => {
                    summary.invitations_sent += 1;
                    match invitation_id {
                        Some(id) => println!("  invitation sent (id {id})"),
                        None => println!("  invitation sent"),
                    }
                }
                Ok(InviteOutcome::Unsupported { reason }) => {
                    summary.unsupported += 1;
                    println!("  unsupported: {reason}");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(self.log, "invitation failed";
                        "email" => invite_email.as_str());
                    println!("  failed: {e:#}");
                }
            }
        }

        if !records.is_empty() {
            let path = write_audit_csv(&records, &self.output_dir)?;
            println!("OneLogin user details saved to {}", path.display());
            summary.audit_path = Some(path);
        }

        println!("invitations sent: {}", summary.invitations_sent);

        Ok(summary)
    }
}
