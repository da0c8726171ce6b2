use crate::error::{Error, Result};
use crate::llm::GeminiClient;
use crate::reddit::{ItemKind, SourceItem};

// Per-item cap keeps the assembled prompt from growing without bound.
const SNIPPET_LIMIT: usize = 300;

/// Build the prompt and run one Gemini request over the collected items.
///
/// Zero items short-circuit before any API call.
pub async fn synthesize(
    gemini: &GeminiClient,
    username: &str,
    items: &[SourceItem],
) -> Result<String> {
    if items.is_empty() {
        return Err(Error::EmptyInput(username.to_string()));
    }
    let prompt = build_prompt(username, items);
    gemini.generate(prompt).await
}

pub fn output_filename(username: &str) -> String {
    format!("{}_persona.txt", username)
}

fn build_prompt(username: &str, items: &[SourceItem]) -> String {
    let mut posts = Vec::new();
    let mut comments = Vec::new();
    for item in items {
        let line = format!("- {} [{}]", snippet(&item.text), item.permalink);
        match item.kind {
            ItemKind::Post => posts.push(line),
            ItemKind::Comment => comments.push(line),
        }
    }

    format!(
        "Analyze the following Reddit user's posts and comments to generate a detailed \
user persona. Infer demographics, interests, personality, tone, and values. For each \
trait or insight, cite the permalink of the post or comment used as evidence, in the \
format: [source: <permalink>].

User: {username}

Posts:
{posts}

Comments:
{comments}

Output format example:
User Persona: {username}

**Personality:** ... [source: ...]
**Interests:** ... [source: ...]
**Tone:** ... [source: ...]
**Values & Communication:** ... [source: ...]

Be concise but insightful.",
        username = username,
        posts = posts.join("\n"),
        comments = comments.join("\n"),
    )
}

/// Collapse whitespace and truncate at a word boundary.
fn snippet(text: &str) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.chars().count() <= SNIPPET_LIMIT {
        return clean;
    }
    let cut: String = clean.chars().take(SNIPPET_LIMIT).collect();
    let cut = match cut.rsplit_once(' ') {
        Some((head, _)) => head.to_string(),
        None => cut,
    };
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, permalink: &str) -> SourceItem {
        SourceItem {
            text: text.to_string(),
            permalink: permalink.to_string(),
            kind: ItemKind::Post,
            created_utc: 0.0,
        }
    }

    fn comment(text: &str, permalink: &str) -> SourceItem {
        SourceItem {
            text: text.to_string(),
            permalink: permalink.to_string(),
            kind: ItemKind::Comment,
            created_utc: 0.0,
        }
    }

    #[test]
    fn prompt_contains_username_and_permalinks() {
        let items = vec![
            post("I love borrow checking", "https://www.reddit.com/r/rust/comments/a/"),
            comment("lifetimes are fine", "https://www.reddit.com/r/rust/comments/b/"),
        ];
        let prompt = build_prompt("alice", &items);

        assert!(prompt.contains("User: alice"));
        assert!(prompt.contains("https://www.reddit.com/r/rust/comments/a/"));
        assert!(prompt.contains("https://www.reddit.com/r/rust/comments/b/"));
    }

    #[test]
    fn posts_and_comments_land_in_their_sections() {
        let items = vec![
            post("a post", "https://www.reddit.com/p"),
            comment("a comment", "https://www.reddit.com/c"),
        ];
        let prompt = build_prompt("alice", &items);

        let posts_at = prompt.find("Posts:").unwrap();
        let comments_at = prompt.find("Comments:").unwrap();
        let post_at = prompt.find("- a post").unwrap();
        let comment_at = prompt.find("- a comment").unwrap();
        assert!(posts_at < post_at && post_at < comments_at);
        assert!(comments_at < comment_at);
    }

    #[test]
    fn snippet_collapses_newlines() {
        assert_eq!(snippet("line one\nline  two\n"), "line one line two");
    }

    #[test]
    fn snippet_truncates_long_text_at_word_boundary() {
        let long = "word ".repeat(100);
        let cut = snippet(&long);
        assert!(cut.chars().count() <= SNIPPET_LIMIT + 1);
        assert!(cut.ends_with("word…"));
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(snippet("short"), "short");
    }

    #[tokio::test]
    async fn zero_items_short_circuit_without_an_api_call() {
        let gemini = GeminiClient::new("unused-key".to_string());
        let err = synthesize(&gemini, "alice", &[]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn output_file_is_named_after_the_user() {
        assert_eq!(output_filename("alice"), "alice_persona.txt");
    }
}
