use serde::{Deserialize, Serialize};

/// Tutorial as returned by the content provider. Extra provider fields are
/// ignored; `content` may contain markup that gets cleaned before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutorial {
    pub id: String,
    pub title: String,
    pub content: String,
}
