//! The genderize.io lookup used by the demo.

use serde::Deserialize;
use serde_json::{Map, Value};
use webservice_core::{ErrorInfo, NetworkingError, Parameters, Url, WebResource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub firstname: String,
    pub gender: Option<Gender>,
}

impl Person {
    /// Ask the service behind `endpoint` for the likely gender of `firstname`.
    pub fn gender_for(endpoint: &Url, firstname: &str) -> WebResource<Person> {
        lookup(endpoint, "name", firstname)
    }

    /// Same lookup with a misspelled parameter key, which the service rejects
    /// with 422. The error body's message is kept as the failure reason.
    pub fn misspelled_lookup(endpoint: &Url, firstname: &str) -> WebResource<Person> {
        lookup(endpoint, "names", firstname).with_error_decoder(|json| Ok(error_info(json)?))
    }

    /// `{"name": ..., "gender": ...}` → `Person`. A missing or non-string
    /// `name` is `DataCantBeParsed`; an unrecognised gender is `None`.
    pub fn from_json(json: &Value) -> Result<Person, NetworkingError> {
        let object = json.as_object().ok_or(NetworkingError::DataCantBeParsed)?;
        let firstname = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or(NetworkingError::DataCantBeParsed)?;
        let gender = object
            .get("gender")
            .and_then(|gender| Gender::deserialize(gender).ok());
        Ok(Person {
            firstname: firstname.to_string(),
            gender,
        })
    }

    pub fn describe(&self) -> String {
        match self.gender {
            Some(gender) => format!("{} is probably a {}", self.firstname, gender.as_str()),
            None => format!("Can't guess gender of {}", self.firstname),
        }
    }
}

fn lookup(endpoint: &Url, key: &str, firstname: &str) -> WebResource<Person> {
    let mut parameters = Parameters::new();
    parameters.insert(key.to_string(), Value::String(firstname.to_string()));
    WebResource::new(endpoint.clone(), |json| Ok(Person::from_json(json)?)).with_parameters(parameters)
}

/// `{"error": "..."}` → failure reason.
pub fn error_info(json: &Value) -> Result<ErrorInfo, NetworkingError> {
    let object: &Map<String, Value> = json.as_object().ok_or(NetworkingError::DataCantBeParsed)?;
    let reason = object.get("error").and_then(Value::as_str).map(str::to_string);
    Ok(ErrorInfo::new(None, reason))
}
