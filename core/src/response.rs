// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// The generic response used to return a list of resources
#[derive(Deserialize, Serialize, Debug)]
pub struct ListResponse {
    pub schemas: Vec<String>,

    #[serde(rename = "totalResults")]
    pub total_results: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "startIndex")]
    pub start_index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: Option<usize>,

    #[serde(rename = "Resources")]
    #[serde(default)]
    pub resources: Vec<ScimUser>,
}

/// The SCIM error types specified in RFC 7644, section 3.12
// RFC 7644, section 3.12:  HTTP Status and Error Response Handling
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub enum ErrorType {
    #[serde(rename = "invalidFilter")]
    InvalidFilter,

    #[serde(rename = "uniqueness")]
    Uniqueness,
}

/// The SCIM error format is specified in RFC 7644, section 3.12
#[derive(Deserialize, Serialize, Debug)]
pub struct ScimError {
    pub schemas: Vec<String>,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "scimType")]
    pub error_type: Option<ErrorType>,

    pub detail: String,
}

impl ScimError {
    /// Parse a SCIM error out of a response body. Mutation endpoints are
    /// not required to return this shape, so a mismatch is not an error.
    pub fn from_body(body: &str) -> Option<ScimError> {
        serde_json::from_str(body).ok()
    }

    pub fn is_uniqueness_conflict(&self) -> bool {
        self.error_type == Some(ErrorType::Uniqueness)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_list_response() {
        let json = json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
            "totalResults": 2,
            "Resources": [
                {
                    "id": "4af4dd94-a4c0-4f67-89c9-76b03340cb9b",
                    "userName": "dschrute",
                    "active": true,
                    "emails": [
                        { "value": "dschrute@dundermifflin.com", "primary": true }
                    ]
                },
                {
                    "id": "89bb1940-b905-4575-9e7f-6f887cfb368e",
                    "userName": "jhalpert",
                    "emails": [
                        { "value": "jhalpert@dundermifflin.com" }
                    ]
                }
            ]
        });

        let response: ListResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.resources.len(), 2);
        assert_eq!(response.resources[0].user_name.as_deref(), Some("dschrute"));
        assert_eq!(response.resources[1].active, None);
    }

    #[test]
    fn test_parse_empty_list_response() {
        let json = json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
            "totalResults": 0,
            "Resources": []
        });

        let response: ListResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.resources.is_empty());
    }

    #[test]
    fn test_parse_uniqueness_error() {
        let body = json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:Error"],
            "status": "409",
            "scimType": "uniqueness",
            "detail": "Resource matching dschrute exists already"
        })
        .to_string();

        let error = ScimError::from_body(&body).unwrap();
        assert!(error.is_uniqueness_conflict());
        assert_eq!(error.status, "409");
    }

    #[test]
    fn test_non_scim_body_is_not_an_error_struct() {
        assert!(ScimError::from_body("Not Found").is_none());
        assert!(ScimError::from_body("{\"message\":\"Bad credentials\"}").is_none());
    }
}
