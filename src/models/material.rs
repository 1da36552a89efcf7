use serde::{Deserialize, Serialize};

/// A single priced item recognized in a decoration image.
///
/// Prices are whole Ethiopian Birr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialItem {
    pub name: String,
    pub price: u64,
}

impl MaterialItem {
    /// Build an item from untrusted text; `None` when the trimmed name is empty.
    pub fn new(name: &str, price: u64) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            price,
        })
    }
}

/// Items produced by one analysis run, in encounter order
pub type AnalysisResult = Vec<MaterialItem>;
