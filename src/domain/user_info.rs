use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Claims returned by the userinfo endpoint, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    claims: Vec<Claim>,
}

impl UserInfo {
    /// Arrays become one claim per element. A null becomes an empty-valued claim.
    pub fn from_document(document: Map<String, Value>) -> Self {
        let mut claims = vec![];
        for (kind, value) in document {
            match value {
                Value::Array(items) => {
                    for item in items {
                        claims.push(Claim { kind: kind.clone(), value: claim_value(item) });
                    }
                },
                value => claims.push(Claim { kind, value: claim_value(value) }),
            }
        }
        UserInfo { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.claims.iter().map(|c| (c.kind.as_str(), c.value.as_str()))
    }

    pub fn get(&self, kind: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    pub fn get_all(&self, kind: &str) -> Vec<&str> {
        self.iter().filter(|(k, _)| *k == kind).map(|(_, v)| v).collect()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl TryFrom<Value> for UserInfo {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(document) => Ok(UserInfo::from_document(document)),
            other => Err(Error::UserInfo { reason: format!("userinfo response is not a JSON object: {}", other) }),
        }
    }
}

fn claim_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}
