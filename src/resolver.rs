use crate::provider::{GenerateError, TextGenerator};

/// Fixed line substituted when the generator blocks the request.
pub const FILTERED_APOLOGY: &str = "I'm sorry, that's a difficult thing for me to talk about.";

/// Where the final interaction text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Generated,
    Fallback,
    Filtered,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub text: String,
    pub source: ResponseSource,
}

/// Clean up generator output: trim, collapse embedded newlines to
/// spaces, strip surrounding markdown emphasis and quote characters.
pub fn sanitize(raw: &str) -> String {
    raw.trim()
        .replace('\n', " ")
        .trim_matches('*')
        .trim_matches('"')
        .trim()
        .to_string()
}

/// Pick the final interaction text: the generator's output when it
/// produced something usable, otherwise the deterministic fallback.
/// Generator failures never propagate to the caller.
pub async fn resolve<G: TextGenerator>(generator: &G, prompt: &str, fallback: &str) -> Resolved {
    match generator.generate(prompt).await {
        Ok(raw) => {
            let text = sanitize(&raw);
            if text.is_empty() {
                Resolved {
                    text: fallback.to_string(),
                    source: ResponseSource::Fallback,
                }
            } else {
                Resolved {
                    text,
                    source: ResponseSource::Generated,
                }
            }
        }
        Err(GenerateError::ContentFiltered) => Resolved {
            text: FILTERED_APOLOGY.to_string(),
            source: ResponseSource::Filtered,
        },
        Err(_) => Resolved {
            text: fallback.to_string(),
            source: ResponseSource::Fallback,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<String, GenerateError>);

    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  hello  "), "hello");
        assert_eq!(sanitize("line one\nline two"), "line one line two");
        assert_eq!(sanitize("**bold claim**"), "bold claim");
        assert_eq!(sanitize("\"quoted\""), "quoted");
        assert_eq!(sanitize("  ***\"messy\"***  \n"), "messy");
        assert_eq!(sanitize("   "), "");
    }

    #[tokio::test]
    async fn test_generated_text_wins() {
        let generator = Scripted(Ok("  *Hi there!*  ".to_string()));
        let resolved = resolve(&generator, "prompt", "fallback").await;
        assert_eq!(resolved.text, "Hi there!");
        assert_eq!(resolved.source, ResponseSource::Generated);
    }

    #[tokio::test]
    async fn test_transport_error_degrades_to_fallback() {
        let generator = Scripted(Err(GenerateError::Transport("connection refused".into())));
        let resolved = resolve(&generator, "prompt", "fallback").await;
        assert_eq!(resolved.text, "fallback");
        assert_eq!(resolved.source, ResponseSource::Fallback);
    }

    #[tokio::test]
    async fn test_empty_output_degrades_to_fallback() {
        let generator = Scripted(Ok("  ***  ".to_string()));
        let resolved = resolve(&generator, "prompt", "fallback").await;
        assert_eq!(resolved.text, "fallback");
        assert_eq!(resolved.source, ResponseSource::Fallback);
    }

    #[tokio::test]
    async fn test_content_filter_maps_to_apology() {
        let generator = Scripted(Err(GenerateError::ContentFiltered));
        let resolved = resolve(&generator, "prompt", "fallback").await;
        assert_eq!(resolved.text, FILTERED_APOLOGY);
        assert_eq!(resolved.source, ResponseSource::Filtered);
    }

    #[tokio::test]
    async fn test_auth_and_rate_limit_also_fall_back() {
        for err in [GenerateError::Auth, GenerateError::RateLimited] {
            let generator = Scripted(Err(err));
            let resolved = resolve(&generator, "prompt", "fallback").await;
            assert_eq!(resolved.source, ResponseSource::Fallback);
        }
    }
}
