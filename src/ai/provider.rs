/// Host of Google's Generative Language API, whose URLs need not contain
/// "gemini" (e.g. `.../models/foo:generateContent`).
const GEMINI_HOST: &str = "generativelanguage.googleapis.com";

/// Response-shape family of the configured endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Generic,
}

impl ProviderKind {
    /// Infer the provider from the endpoint URL (case-insensitive substring).
    /// "openai" is checked first; "gemini" or the Generative Language API
    /// host select Gemini.
    pub fn detect(endpoint: &str) -> Self {
        let endpoint = endpoint.to_lowercase();
        if endpoint.contains("openai") {
            ProviderKind::OpenAi
        } else if endpoint.contains("gemini") || endpoint.contains(GEMINI_HOST) {
            ProviderKind::Gemini
        } else {
            ProviderKind::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
