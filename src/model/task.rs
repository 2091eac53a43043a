use serde::{Deserialize, Deserializer, Serialize};

/// Request body for a new Todoist task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub content: String,
    #[serde(serialize_with = "as_string")]
    pub project_id: u64,
    pub labels: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedTask {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
}

// The REST API exchanges ids as strings.
fn as_string<S: serde::Serializer>(id: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&id.to_string())
}

fn numeric_id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(d)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("non-numeric task id: {s}"))),
    }
}
