// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Connection settings for the OneLogin API.
///
/// The `Debug` impl redacts the client secret so configs can be logged.
#[derive(Clone)]
pub struct OneLoginConfig {
    pub client_id: String,

    pub client_secret: String,

    /// The regional API host, e.g. "https://api.us.onelogin.com". Both the
    /// token endpoint and the user search endpoint live under it.
    pub base_url: String,
}

impl std::fmt::Debug for OneLoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneLoginConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Connection settings for the GitHub SCIM and REST APIs.
#[derive(Clone)]
pub struct GitHubConfig {
    /// A personal access token with enterprise admin scope
    pub token: String,

    /// The enterprise slug the SCIM endpoints are scoped to
    pub enterprise: String,

    /// Overridable so tests can point the client at a local server
    pub api_url: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("enterprise", &self.enterprise)
            .field("api_url", &self.api_url)
            .finish()
    }
}
