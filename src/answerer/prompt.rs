//! Prompt construction for support questions.

use crate::articles::Article;

/// Renders articles as the context block of the prompt.
///
/// Each article becomes `Article ID`, `Title` and `Content` lines; articles are
/// separated by a blank line.
fn format_articles_context(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                "Article ID: {}\nTitle: {}\nContent: {}\n\n",
                article.id, article.title, article.content
            )
        })
        .collect()
}

/// Builds the full model prompt for `query` over `articles`.
///
/// Every article is included regardless of count, and the query is embedded
/// verbatim. The output is deterministic for a given input.
pub fn build_prompt(query: &str, articles: &[Article]) -> String {
    let articles_context = format_articles_context(articles);

    format!(
        r#"
You are an expert IT support assistant for a corporate knowledge base.
Your task is to answer a user's question based ONLY on the provided knowledge base articles.

Here are the available articles:
--- START OF ARTICLES ---
{articles_context}
--- END OF ARTICLES ---

Here is the user's question: "{query}"

Based on the articles, please perform the following two tasks:
1.  Provide a concise, one or two-sentence summary answer to the user's question. If the articles do not contain an answer, state that you could not find an answer.
2.  Identify the articles that are most relevant to the user's question.

Your entire response MUST be a single, valid JSON object with NO other text or explanation before or after it.
The JSON object must have the following structure:
{{
  "ai_summary_answer": "Your concise summary answer here.",
  "ai_relevant_articles": [
    {{ "id": "The ID of the most relevant article", "title": "The title of the most relevant article" }}
  ]
}}
"#
    )
}
