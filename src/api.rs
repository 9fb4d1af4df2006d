// API client module: one blocking POST of the contact form's GraphQL
// mutation, plus the wire types on either side of it.

use crate::message::MessageContent;
use crate::profile::SenderProfile;
use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Gravity Forms id of the representative's contact form.
pub const FORM_ID: i64 = 21;

pub const TOPIC: &str = "International Affairs";

/// The mutation document the contact form page itself sends.
pub const SUBMIT_MUTATION: &str = "mutation SubmitGravityFormsForm($formId: Int!, $clientMutationId: String, $fieldValues: [FieldValuesInput]) {\n  submitGravityFormsForm(\n    input: {formId: $formId, clientMutationId: $clientMutationId, fieldValues: $fieldValues}\n  ) {\n    entryId\n    errors {\n      id\n      message\n    }\n  }\n}\n";

// Form field ids.
pub const SUBJECT_FIELD: u32 = 1;
pub const MESSAGE_FIELD: u32 = 2;
pub const ADDRESS_FIELD: u32 = 5;
pub const NAME_FIELD: u32 = 7;
pub const EMAIL_FIELD: u32 = 8;
pub const CHECKBOX_FIELD: u32 = 10;
pub const TOPIC_FIELD: u32 = 16;

/// Request body: `{"query": ..., "variables": {...}}`.
#[derive(Serialize, Debug)]
pub struct SubmissionRequest {
    pub query: &'static str,
    pub variables: Variables,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Variables {
    pub form_id: i64,
    pub client_mutation_id: String,
    pub field_values: Vec<FieldValue>,
}

#[derive(Serialize, Debug)]
pub struct FieldValue {
    pub id: u32,
    #[serde(flatten)]
    pub input: FieldInput,
}

/// The one value key a field entry carries next to its `id`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum FieldInput {
    Value(String),
    AddressValues(AddressValues),
    NameValues(NameValues),
    EmailValues(EmailValues),
    CheckboxValues(Vec<serde_json::Value>),
}

#[derive(Serialize, Debug)]
pub struct AddressValues {
    pub country: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Serialize, Debug)]
pub struct NameValues {
    pub prefix: String,
    pub first: String,
    pub last: String,
}

#[derive(Serialize, Debug)]
pub struct EmailValues {
    pub value: String,
}

impl SubmissionRequest {
    pub fn new(content: &MessageContent, profile: &SenderProfile, client_mutation_id: String) -> Self {
        let field = |key: &str| profile.field(key).to_string();
        let field_values = vec![
            FieldValue {
                id: SUBJECT_FIELD,
                input: FieldInput::Value(content.subject.clone()),
            },
            FieldValue {
                id: MESSAGE_FIELD,
                input: FieldInput::Value(content.body.clone()),
            },
            FieldValue {
                id: ADDRESS_FIELD,
                input: FieldInput::AddressValues(AddressValues {
                    country: field("country"),
                    street: field("street"),
                    city: field("city"),
                    state: field("state"),
                    zip: field("zip"),
                }),
            },
            FieldValue {
                id: NAME_FIELD,
                input: FieldInput::NameValues(NameValues {
                    prefix: field("prefix"),
                    first: field("first"),
                    last: field("last"),
                }),
            },
            FieldValue {
                id: EMAIL_FIELD,
                input: FieldInput::EmailValues(EmailValues {
                    value: field("email"),
                }),
            },
            FieldValue {
                id: CHECKBOX_FIELD,
                input: FieldInput::CheckboxValues(Vec::new()),
            },
            FieldValue {
                id: TOPIC_FIELD,
                input: FieldInput::Value(TOPIC.to_string()),
            },
        ];
        SubmissionRequest {
            query: SUBMIT_MUTATION,
            variables: Variables {
                form_id: FORM_ID,
                client_mutation_id,
                field_values,
            },
        }
    }
}

/// Client mutation id as the form page makes it: the current time in
/// milliseconds. Two senders in the same millisecond get the same id.
pub fn client_mutation_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// What the form backend reports about a submission. Both parts may be
/// missing from a response.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    #[serde(default)]
    pub entry_id: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<FormError>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FormError {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
}

#[derive(Deserialize)]
struct ResponseData {
    #[serde(default, rename = "submitGravityFormsForm")]
    submit: Option<SubmissionResult>,
}

/// A response body, parsed when it is a JSON object and raw otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Parsed(SubmissionResult),
    Raw(Vec<u8>),
}

impl ResponseBody {
    pub fn parse(bytes: Vec<u8>) -> Self {
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(value @ serde_json::Value::Object(_)) => match serde_json::from_value::<GraphqlResponse>(value) {
                Ok(response) => {
                    ResponseBody::Parsed(response.data.and_then(|d| d.submit).unwrap_or_default())
                }
                Err(_) => ResponseBody::Raw(bytes),
            },
            _ => ResponseBody::Raw(bytes),
        }
    }

    fn report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            ResponseBody::Parsed(result) => {
                let entry_id = match &result.entry_id {
                    Some(serde_json::Value::String(id)) => id.clone(),
                    Some(serde_json::Value::Null) | None => "None".to_string(),
                    Some(other) => other.to_string(),
                };
                let errors = match &result.errors {
                    Some(errors) => serde_json::to_string(errors).map_err(io::Error::from)?,
                    None => "None".to_string(),
                };
                writeln!(out, "Entry ID: {}", entry_id)?;
                writeln!(out, "Errors: {}", errors)
            }
            ResponseBody::Raw(bytes) => {
                writeln!(out, "Uninterpretable response data: {}", String::from_utf8_lossy(bytes))
            }
        }
    }
}

/// Result of the single POST. Any status other than 200 is a rejection;
/// errors listed inside a 200 response are only reported. An accepted
/// response is always `ResponseBody::Parsed`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted(ResponseBody),
    Rejected { status: StatusCode, response: ResponseBody },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    pub fn response(&self) -> &ResponseBody {
        match self {
            SubmissionOutcome::Accepted(response) => response,
            SubmissionOutcome::Rejected { response, .. } => response,
        }
    }

    /// Print the outcome for the operator.
    pub fn report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            SubmissionOutcome::Accepted(response) => {
                writeln!(out, "Message accepted!")?;
                response.report(out)
            }
            SubmissionOutcome::Rejected { status, response } => {
                writeln!(out, "Error code {}", status.as_u16())?;
                response.report(out)
            }
        }
    }
}

/// Blocking client bound to the contact form endpoint.
pub struct FormClient {
    client: Client,
    endpoint: String,
}

impl FormClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FormClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// POST the rendered message and sender details to the form. Transport
    /// failures are errors, as is a 200 whose body is not the form's JSON
    /// reply. Every other response is an outcome.
    pub fn submit(&self, content: &MessageContent, profile: &SenderProfile) -> Result<SubmissionOutcome> {
        let request = SubmissionRequest::new(content, profile, client_mutation_id());
        tracing::debug!(
            endpoint = %self.endpoint,
            client_mutation_id = %request.variables.client_mutation_id,
            "submitting contact form"
        );
        let res = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .context("Failed to send submission request")?;
        let status = res.status();
        let bytes = res.bytes().context("Failed to read submission response")?.to_vec();
        tracing::debug!(%status, len = bytes.len(), "received form response");

        let response = ResponseBody::parse(bytes);
        if status == StatusCode::OK {
            if let ResponseBody::Raw(bytes) = &response {
                bail!(
                    "Form endpoint answered 200 with an uninterpretable body: {}",
                    String::from_utf8_lossy(bytes)
                );
            }
            Ok(SubmissionOutcome::Accepted(response))
        } else {
            tracing::warn!(%status, "form endpoint rejected the submission");
            Ok(SubmissionOutcome::Rejected { status, response })
        }
    }
}
