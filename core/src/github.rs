// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Context;
use anyhow::bail;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use slog::debug;
use slog::o;
use slog::warn;

use super::*;

pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Where a membership invitation is directed.
#[derive(Clone, Debug)]
pub enum InviteTarget {
    Organization(String),
    Enterprise(String),
}

/// The outcome of an invitation attempt that did not fail outright.
#[derive(Clone, Debug, PartialEq)]
pub enum InviteOutcome {
    Sent {
        invitation_id: Option<u64>,
    },

    /// The enterprise-level path: GitHub exposes no invitation API at that
    /// scope, so the attempt reports itself unsupported instead of failing
    /// silently.
    Unsupported {
        reason: String,
    },
}

#[derive(Deserialize)]
struct OrgInvitation {
    #[serde(default)]
    id: Option<u64>,
}

/// Client for the GitHub SCIM and REST endpoints an enterprise uses to
/// manage memberships.
pub struct GitHubClient {
    api_url: String,
    token: String,
    enterprise: String,
    client: Client,
    log: Logger,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, log: &Logger) -> GitHubClient {
        GitHubClient {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            enterprise: config.enterprise.clone(),
            client: Client::new(),
            log: log.new(o!("client" => "github")),
        }
    }

    fn scim_users_url(&self) -> String {
        format!(
            "{}/scim/v2/enterprises/{}/Users",
            self.api_url, self.enterprise
        )
    }

    fn scim(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/scim+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    fn rest(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// Resolve the SCIM identifier for an email by listing the enterprise's
    /// SCIM users and scanning for a match. The endpoint has no usable
    /// server-side filter, and the list is fetched fresh on every call.
    pub fn find_scim_user_id(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<String>> {
        let url = self.scim_users_url();
        debug!(self.log, "listing SCIM users"; "url" => %url);

        let response = self
            .scim(self.client.get(&url))
            .send()
            .context("listing SCIM users failed")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            bail!("listing SCIM users returned {status}: {body}");
        }

        let list: ListResponse =
            response.json().context("parsing SCIM user list")?;

        Ok(list
            .resources
            .into_iter()
            .find(|user| user.matches_email(email))
            .map(|user| user.id))
    }

    /// Delete a provisioned user.
    ///
    /// RFC 7644 § 3.6:
    /// In response to a successful delete, the server SHALL return a
    /// successful HTTP status code 204 (No Content).
    pub fn delete_user(&self, scim_user_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/{}", self.scim_users_url(), scim_user_id);
        debug!(self.log, "deleting SCIM user"; "id" => scim_user_id);

        let response = self
            .scim(self.client.delete(&url))
            .send()
            .with_context(|| format!("deleting SCIM user {scim_user_id} failed"))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = response.text().unwrap_or_default();
            warn!(self.log, "delete rejected"; "id" => scim_user_id, "status" => %status);
            bail!("deleting SCIM user {scim_user_id} returned {status}: {body}");
        }

        Ok(())
    }

    /// Create a SCIM user record from a provisioning payload.
    ///
    /// RFC 7644 § 3.3:
    /// When the service provider successfully creates the new resource, an
    /// HTTP response SHALL be returned with HTTP status code 201 (Created).
    /// Some providers answer 200, which is accepted too.
    pub fn provision_user(
        &self,
        request: &ProvisionUserRequest,
    ) -> anyhow::Result<()> {
        let url = self.scim_users_url();
        debug!(self.log, "provisioning SCIM user"; "userName" => %request.user_name);

        let response = self
            .scim(self.client.post(&url))
            .json(request)
            .send()
            .with_context(|| {
                format!("provisioning user {} failed", request.user_name)
            })?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().unwrap_or_default();
            warn!(self.log, "provisioning rejected";
                "userName" => %request.user_name, "status" => %status);

            // A SCIM error body carries a better message than raw text; a
            // uniqueness conflict means the user already exists over there.
            return match ScimError::from_body(&body) {
                Some(error) if error.is_uniqueness_conflict() => bail!(
                    "user {} is already provisioned: {}",
                    request.user_name,
                    error.detail
                ),
                Some(error) => bail!(
                    "provisioning user {} returned {status}: {}",
                    request.user_name,
                    error.detail
                ),
                None => bail!(
                    "provisioning user {} returned {status}: {body}",
                    request.user_name
                ),
            };
        }

        Ok(())
    }

    /// Send a membership invitation. Organization invitations go through
    /// the REST invitations endpoint; the enterprise-level path has no API
    /// equivalent and resolves to [`InviteOutcome::Unsupported`].
    pub fn invite(
        &self,
        target: &InviteTarget,
        email: &str,
        role: &str,
    ) -> anyhow::Result<InviteOutcome> {
        match target {
            InviteTarget::Organization(org) => {
                self.invite_to_org(org, email, role)
            }
            InviteTarget::Enterprise(slug) => {
                Ok(self.enterprise_invite_unsupported(slug, email))
            }
        }
    }

    fn invite_to_org(
        &self,
        org: &str,
        email: &str,
        role: &str,
    ) -> anyhow::Result<InviteOutcome> {
        let url = format!("{}/orgs/{org}/invitations", self.api_url);
        debug!(self.log, "sending organization invitation";
            "org" => org, "email" => email, "role" => role);

        let response = self
            .rest(self.client.post(&url))
            .json(&serde_json::json!({
                "email": email,
                "role": role,
            }))
            .send()
            .with_context(|| format!("inviting {email} to {org} failed"))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().unwrap_or_default();
            warn!(self.log, "invitation rejected";
                "org" => org, "email" => email, "status" => %status);
            bail!("inviting {email} to {org} returned {status}: {body}");
        }

        let invitation: OrgInvitation =
            response.json().context("parsing invitation response")?;

        Ok(InviteOutcome::Sent { invitation_id: invitation.id })
    }

    /// Probe enterprise API access so the diagnostic can say whether the
    /// credentials even reach the enterprise, then report unsupported.
    fn enterprise_invite_unsupported(
        &self,
        slug: &str,
        email: &str,
    ) -> InviteOutcome {
        let url =
            format!("{}/enterprises/{slug}/actions/runner-groups", self.api_url);

        let reason = match self.rest(self.client.get(&url)).send() {
            Ok(response) if response.status().is_success() => format!(
                "enterprise {slug} is reachable, but GitHub has no \
                 enterprise-level invitation API; invite {email} through an \
                 organization or provision over SCIM"
            ),
            Ok(response) => format!(
                "no API access to enterprise {slug} (probe returned {}); \
                 cannot invite {email}",
                response.status()
            ),
            Err(e) => format!("enterprise {slug} probe failed: {e}"),
        };

        warn!(self.log, "enterprise invitations are unsupported";
            "enterprise" => slug, "email" => email);

        InviteOutcome::Unsupported { reason }
    }
}
