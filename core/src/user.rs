// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use unicase::UniCase;

use super::*;

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";

/// A user profile as known by the identity provider, normalized for
/// provisioning. Field names serialize to the audit CSV column set
/// (externalId, userName, formatted, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub external_id: String,

    pub user_name: String,

    pub formatted: String,

    pub family_name: String,

    pub given_name: String,

    pub display_name: String,

    pub email: String,

    /// The role the user will be granted on the GitHub side
    pub role: String,
}

impl UserRecord {
    /// A SCIM creation payload requires both a user name and an email.
    pub fn provisionable(&self) -> bool {
        !self.user_name.is_empty() && !self.email.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    pub formatted: String,

    pub family_name: String,

    pub given_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScimEmail {
    pub value: String,

    #[serde(rename = "type")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScimRole {
    pub value: String,

    pub primary: bool,
}

/// The payload POSTed to the SCIM Users endpoint to provision a user.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUserRequest {
    pub schemas: Vec<String>,

    /// An identifier for the resource as defined by the provisioning client
    pub external_id: String,

    pub active: bool,

    pub user_name: String,

    pub name: ScimName,

    pub display_name: String,

    pub emails: Vec<ScimEmail>,

    pub roles: Vec<ScimRole>,
}

impl From<&UserRecord> for ProvisionUserRequest {
    fn from(record: &UserRecord) -> ProvisionUserRequest {
        ProvisionUserRequest {
            schemas: vec![String::from(USER_SCHEMA)],
            external_id: record.external_id.clone(),
            active: true,
            user_name: record.user_name.clone(),
            name: ScimName {
                formatted: record.formatted.clone(),
                family_name: record.family_name.clone(),
                given_name: record.given_name.clone(),
            },
            display_name: record.display_name.clone(),
            emails: vec![ScimEmail {
                value: record.email.clone(),
                email_type: Some(String::from("work")),
                primary: Some(true),
            }],
            roles: vec![ScimRole { value: record.role.clone(), primary: false }],
        }
    }
}

/// A user as it appears in a SCIM list response.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    pub id: String,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub external_id: Option<String>,

    #[serde(default)]
    pub emails: Vec<ScimEmail>,
}

impl ScimUser {
    /// Email values are compared case insensitively: provisioned addresses
    /// may differ in case from what the roster carries.
    pub fn matches_email(&self, email: &str) -> bool {
        self.emails
            .iter()
            .any(|e| UniCase::new(e.value.as_str()) == UniCase::new(email))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            external_id: "29918".to_string(),
            user_name: "dschrute".to_string(),
            formatted: "Dwight Schrute".to_string(),
            family_name: "Schrute".to_string(),
            given_name: "Dwight".to_string(),
            display_name: "Dwight Schrute".to_string(),
            email: "dschrute@dundermifflin.com".to_string(),
            role: "member".to_string(),
        }
    }

    #[test]
    fn test_provision_payload_shape() {
        let request = ProvisionUserRequest::from(&record());

        let expected = json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "externalId": "29918",
            "active": true,
            "userName": "dschrute",
            "name": {
                "formatted": "Dwight Schrute",
                "familyName": "Schrute",
                "givenName": "Dwight"
            },
            "displayName": "Dwight Schrute",
            "emails": [{
                "value": "dschrute@dundermifflin.com",
                "type": "work",
                "primary": true
            }],
            "roles": [{
                "value": "member",
                "primary": false
            }]
        });

        assert_eq!(serde_json::to_value(&request).unwrap(), expected);
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let user: ScimUser = serde_json::from_value(json!({
            "id": "5fc0c2a8-87f6-4556-bdb1-71e06c6a7c1c",
            "userName": "dschrute",
            "emails": [
                { "value": "DSchrute@DunderMifflin.com", "primary": true }
            ]
        }))
        .unwrap();

        assert!(user.matches_email("dschrute@dundermifflin.com"));
        assert!(!user.matches_email("jhalpert@dundermifflin.com"));
    }

    #[test]
    fn test_record_without_user_name_is_not_provisionable() {
        let mut record = record();
        record.user_name = String::new();
        assert!(!record.provisionable());

        let mut record = self::record();
        record.email = String::new();
        assert!(!record.provisionable());

        assert!(self::record().provisionable());
    }
}
