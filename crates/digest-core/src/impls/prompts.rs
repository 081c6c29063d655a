use crate::domain::Article;

pub const SUMMARY_SYSTEM: &str = "You are an expert health-news editor. Be concise.";

pub const REWRITE_SYSTEM: &str =
    "You are a friendly journalist who explains complex health topics simply.";

pub fn summary_prompt(article: &Article) -> String {
    format!(
        r#"Summarize the medical news article below as a short structured digest.

OUTPUT:
- Overview: exactly 2 very short lines.
- Key Takeaways: 3 bullet points in plain language.
- Report only what the article states. No opinions or guesses.
- Tone: professional and easy to read.

ARTICLE:
- Title: {title}
- Source: {source}
- Date: {date}

CONTENT:
{content}"#,
        title = article.title,
        source = article.source,
        date = article.published_at,
        content = article.content,
    )
}

pub fn rewrite_prompt(article: &Article) -> String {
    format!(
        r#"Rewrite the news article below for a general reader:
- Conversational language at a 10th-12th grade reading level.
- Short sentences, 3-4 short paragraphs.
- Briefly explain medical or scientific terms in brackets.
- Keep every fact and the original meaning. Add no opinions or new claims.
- Friendly tone, like a health educator.

Title: {title}

Content:
{content}"#,
        title = article.title,
        content = article.content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::sample_article;

    #[test]
    fn summary_prompt_carries_article_metadata() {
        let article = sample_article("b1");
        let prompt = summary_prompt(&article);
        assert!(prompt.contains("- Title: Article b1"));
        assert!(prompt.contains("- Source: Test Wire"));
        assert!(prompt.contains("- Date: 2025-12-01"));
        assert!(prompt.ends_with("Body of article b1."));
    }

    #[test]
    fn rewrite_prompt_skips_source_line() {
        let prompt = rewrite_prompt(&sample_article("b2"));
        assert!(prompt.contains("Title: Article b2"));
        assert!(!prompt.contains("Test Wire"));
    }
}
