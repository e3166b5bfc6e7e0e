//! Keyword trigger deciding whether a message gets web-search augmentation.

/// Case-insensitive substring match against a fixed keyword list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTrigger {
    keywords: Vec<String>,
}

impl KeywordTrigger {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self {
            keywords: normalized,
        }
    }

    pub fn needs_augmentation(&self, message: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let message = message.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| message.contains(keyword.as_str()))
    }
}
