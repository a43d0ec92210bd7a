use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label:       String,
    pub source:      String,
    pub tagpack_uri: String,
    pub currency:    String,
    pub lastmod:     i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abuse:       Option<String>,
    #[serde(default = "default_active")]
    pub active:      bool,
}

fn default_active() -> bool {
    true
}

impl Label {
    pub fn has_category(
        &self,
        category: &str,
    ) -> bool {
        self.category.as_deref() == Some(category)
    }
}
