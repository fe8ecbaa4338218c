use serde::Serialize;

/// One field of a chat attachment
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub short: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub value: String,
}

impl Field {
    // rendered side by side with other short fields
    pub fn short(title: &str, value: String) -> Self {
        Self {
            short: true,
            title: Some(title.to_string()),
            value,
        }
    }

    // untitled, spans the full width
    pub fn wide(value: String) -> Self {
        Self {
            short: false,
            title: None,
            value,
        }
    }
}

/// A Mattermost/Slack message attachment built from one incident event
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub fallback: String,
    pub color: String,
    pub fields: Vec<Field>,
}

impl ChatMessage {
    pub fn field(&self, title: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.title.as_deref() == Some(title))
    }

    pub fn details(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.title.is_none())
            .map(|field| field.value.as_str())
    }
}
