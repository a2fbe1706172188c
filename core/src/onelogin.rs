// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Context;
use anyhow::bail;
use reqwest::blocking::Client;
use slog::debug;
use slog::o;

use super::*;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A user as returned by the OneLogin user search endpoint. Every profile
/// field is nullable on the wire.
#[derive(Deserialize, Clone, Debug)]
pub struct OneLoginUser {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub firstname: Option<String>,

    #[serde(default)]
    pub lastname: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl OneLoginUser {
    /// Normalize a raw profile into a [`UserRecord`], attaching the role the
    /// user will be granted on the GitHub side.
    pub fn into_record(self, role: &str) -> UserRecord {
        let given_name = self.firstname.unwrap_or_default();
        let family_name = self.lastname.unwrap_or_default();
        let full_name =
            format!("{given_name} {family_name}").trim().to_string();

        UserRecord {
            external_id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            user_name: self.username.unwrap_or_default(),
            formatted: full_name.clone(),
            family_name,
            given_name,
            display_name: full_name,
            email: self.email.unwrap_or_default(),
            role: role.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct UserSearchResponse {
    #[serde(default)]
    data: Vec<OneLoginUser>,
}

/// Client for the OneLogin API, authenticated once at construction.
#[derive(Debug)]
pub struct OneLoginClient {
    base_url: String,
    token: String,
    client: Client,
    log: Logger,
}

impl OneLoginClient {
    /// Exchange client credentials for a bearer token via the OAuth2
    /// client-credentials grant. One call, no refresh or expiry handling:
    /// runs are short enough to finish within a token's lifetime.
    pub fn connect(
        config: &OneLoginConfig,
        log: &Logger,
    ) -> anyhow::Result<OneLoginClient> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::new();
        let log = log.new(o!("client" => "onelogin"));

        let url = format!("{base_url}/auth/oauth2/v2/token");
        debug!(log, "exchanging client credentials"; "url" => %url);

        let response = client
            .post(&url)
            .json(&serde_json::json!({
                "grant_type": "client_credentials",
                "client_id": config.client_id,
                "client_secret": config.client_secret,
            }))
            .send()
            .context("OneLogin token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("OneLogin token endpoint returned {status}: {body}");
        }

        let token: TokenResponse =
            response.json().context("parsing OneLogin token response")?;

        Ok(OneLoginClient {
            base_url,
            token: token.access_token,
            client,
            log,
        })
    }

    /// Look up a user by email, returning zero or one profile. The search
    /// endpoint can return several matches; the first one wins.
    pub fn find_user(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<OneLoginUser>> {
        let url = format!("{}/api/1/users", self.base_url);
        debug!(self.log, "searching for user"; "email" => email);

        let response = self
            .client
            .get(&url)
            // The v1 API expects the legacy `bearer:` scheme, not `Bearer `.
            .header("Authorization", format!("bearer:{}", self.token))
            .header("Accept", "application/json")
            .query(&[("email", email)])
            .send()
            .with_context(|| format!("OneLogin user search for {email} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("OneLogin user search returned {status}: {body}");
        }

        let found: UserSearchResponse = response
            .json()
            .context("parsing OneLogin user search response")?;

        Ok(found.data.into_iter().next())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_profile() {
        let user: OneLoginUser = serde_json::from_value(json!({
            "id": 29918,
            "username": "dschrute",
            "firstname": "Dwight",
            "lastname": "Schrute",
            "email": "dschrute@dundermifflin.com"
        }))
        .unwrap();

        let record = user.into_record("member");
        assert_eq!(record.external_id, "29918");
        assert_eq!(record.user_name, "dschrute");
        assert_eq!(record.formatted, "Dwight Schrute");
        assert_eq!(record.display_name, "Dwight Schrute");
        assert_eq!(record.role, "member");
        assert!(record.provisionable());
    }

    #[test]
    fn test_normalize_profile_with_null_fields() {
        let user: OneLoginUser = serde_json::from_value(json!({
            "id": 29919,
            "username": null,
            "firstname": "Creed",
            "lastname": null,
            "email": null
        }))
        .unwrap();

        let record = user.into_record("member");
        assert_eq!(record.user_name, "");
        // No trailing space when only one name component is present
        assert_eq!(record.formatted, "Creed");
        assert!(!record.provisionable());
    }
}
