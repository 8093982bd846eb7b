//! Retrieval orchestration: question answering, insight extraction, and
//! test generation over the knowledge store.
//!
//! All three operations share the retrieve-then-generate pattern: search
//! the store, build a numbered context block, invoke the completion
//! capability once, and shape the output. Retrieval failures surface as
//! [`KbError::RetrievalFailed`], completion failures as
//! [`KbError::GenerationFailed`]; neither is retried here.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::completion::CompletionProvider;
use crate::document::{MetadataFilter, MetadataValue, SearchResult};
use crate::error::{KbError, Result};
use crate::parsing::{TestCase, parse_insights, parse_test_cases};
use crate::store::KnowledgeStore;

/// Fixed answer returned when retrieval finds nothing; the completion
/// capability is not invoked in that case.
pub const NO_INFORMATION_ANSWER: &str =
    "I don't have any relevant information in the knowledge base to answer this question.";

/// Relevance query used when extracting insights.
const INSIGHT_QUERY: &str = "key points important information insights";

/// Maximum characters of each retrieved excerpt echoed back to the caller.
const EXCERPT_LIMIT: usize = 200;

/// Number of context chunks retrieved for test generation.
const TEST_CONTEXT_RESULTS: usize = 5;

/// The kind of test cases to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Behavior-level tests derived from functional requirements.
    Functional,
    /// Cross-component integration tests.
    Integration,
    /// Unit-level tests.
    Unit,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TestType::Functional => "functional",
            TestType::Integration => "integration",
            TestType::Unit => "unit",
        };
        f.write_str(name)
    }
}

impl FromStr for TestType {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "functional" => Ok(TestType::Functional),
            "integration" => Ok(TestType::Integration),
            "unit" => Ok(TestType::Unit),
            other => Err(KbError::InvalidConfiguration(format!(
                "unknown test type '{other}' (expected functional, integration, or unit)"
            ))),
        }
    }
}

/// A citation for one retrieved chunk, in retrieval order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// The source document's filename.
    pub filename: String,
    /// 1-based page number, when the source format has pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Split-order chunk index within the (document, page) scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
}

/// A structured answer with citations and the context that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The generated (or fixed no-information) answer text.
    pub answer: String,
    /// Sources in retrieval order, most similar first. This ordering is
    /// the attribution contract for citations.
    pub sources: Vec<SourceRef>,
    /// Truncated excerpts of the retrieved context.
    pub context_used: Vec<String>,
}

/// Question answering engine over a [`KnowledgeStore`].
pub struct QaEngine {
    store: Arc<KnowledgeStore>,
    completions: Arc<dyn CompletionProvider>,
}

impl QaEngine {
    /// Create an engine over the given store and completion capability.
    pub fn new(store: Arc<KnowledgeStore>, completions: Arc<dyn CompletionProvider>) -> Self {
        Self { store, completions }
    }

    /// Answer a question from the knowledge base.
    ///
    /// Retrieves the `n_results` most relevant chunks; when nothing is
    /// retrieved, returns the fixed no-information answer with empty
    /// sources and makes no completion call.
    pub async fn answer_question(&self, question: &str, n_results: usize) -> Result<Answer> {
        let results = self.store.search(question, n_results, None).await?;

        if results.is_empty() {
            return Ok(Answer {
                answer: NO_INFORMATION_ANSWER.to_string(),
                sources: Vec::new(),
                context_used: Vec::new(),
            });
        }

        let context = numbered_context(&results, "Document", true);
        let sources = results.iter().map(source_ref).collect();
        let prompt = answer_prompt(&context, question);

        let answer = self
            .completions
            .complete(&prompt)
            .await
            .map_err(|e| KbError::GenerationFailed(e.to_string()))?;

        info!(n_results = results.len(), "answered question");

        Ok(Answer {
            answer,
            sources,
            context_used: results.iter().map(|r| truncate_excerpt(&r.content)).collect(),
        })
    }

    /// Extract up to `max_insights` key insights, optionally restricted to
    /// one document.
    ///
    /// Returns an empty list when retrieval finds nothing. The model's
    /// free-text list is parsed lossily by [`parse_insights`].
    pub async fn extract_insights(
        &self,
        document_name: Option<&str>,
        max_insights: usize,
    ) -> Result<Vec<String>> {
        let filter = filename_filter(document_name);
        let results = self.store.search(INSIGHT_QUERY, max_insights, filter.as_ref()).await?;

        if results.is_empty() {
            return Ok(Vec::new());
        }

        let context = numbered_context(&results, "Excerpt", false);
        let prompt = insights_prompt(&context);

        let insights_text = self
            .completions
            .complete(&prompt)
            .await
            .map_err(|e| KbError::GenerationFailed(e.to_string()))?;

        let insights = parse_insights(&insights_text, max_insights);
        info!(insight_count = insights.len(), "extracted insights");
        Ok(insights)
    }

    /// Generate test cases of the given type from the documentation,
    /// optionally restricted to one document.
    ///
    /// Returns an empty list when retrieval finds nothing. Records are
    /// delimited in the model output by [`parse_test_cases`].
    pub async fn generate_tests(
        &self,
        document_name: Option<&str>,
        test_type: TestType,
    ) -> Result<Vec<TestCase>> {
        let query = format!("{test_type} requirements specifications test cases");
        let filter = filename_filter(document_name);
        let results = self.store.search(&query, TEST_CONTEXT_RESULTS, filter.as_ref()).await?;

        if results.is_empty() {
            return Ok(Vec::new());
        }

        let context = numbered_context(&results, "Section", false);
        let prompt = tests_prompt(&context, test_type);

        let test_cases_text = self
            .completions
            .complete(&prompt)
            .await
            .map_err(|e| KbError::GenerationFailed(e.to_string()))?;

        let test_cases = parse_test_cases(&test_cases_text);
        info!(test_count = test_cases.len(), %test_type, "generated test cases");
        Ok(test_cases)
    }
}

fn filename_filter(document_name: Option<&str>) -> Option<MetadataFilter> {
    document_name
        .map(|name| [("filename".to_string(), MetadataValue::from(name))].into())
}

/// Build a numbered context block, one entry per result joined with blank
/// lines. Only the answer path brackets its labels (`[Document N]:`);
/// insight and test contexts use bare `Excerpt N:` / `Section N:` lines.
fn numbered_context(results: &[SearchResult], label: &str, bracketed: bool) -> String {
    results
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            if bracketed {
                format!("[{label} {}]: {}", idx + 1, r.content)
            } else {
                format!("{label} {}: {}", idx + 1, r.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn source_ref(result: &SearchResult) -> SourceRef {
    SourceRef {
        filename: result
            .metadata
            .get("filename")
            .and_then(MetadataValue::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        page_number: result
            .metadata
            .get("page_number")
            .and_then(MetadataValue::as_int)
            .and_then(|i| u32::try_from(i).ok()),
        chunk_index: result
            .metadata
            .get("chunk_index")
            .and_then(MetadataValue::as_int)
            .and_then(|i| u32::try_from(i).ok()),
    }
}

/// Truncate an excerpt to [`EXCERPT_LIMIT`] characters, appending `...`
/// only when content was cut. Character-based so bilingual text is never
/// split mid-codepoint.
fn truncate_excerpt(content: &str) -> String {
    if content.chars().count() <= EXCERPT_LIMIT {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(EXCERPT_LIMIT).collect();
        format!("{truncated}...")
    }
}

fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based on the provided context from process documents.\n\
         \n\
         The documents may contain:\n\
         - Functional specifications\n\
         - Technical specifications\n\
         - Working instructions\n\
         - Hebrew text and English text\n\
         - References to images and diagrams\n\
         \n\
         Guidelines:\n\
         1. Answer based ONLY on the provided context\n\
         2. If the context doesn't contain the answer, say so clearly\n\
         3. Support both Hebrew and English questions\n\
         4. Provide detailed, accurate answers\n\
         5. Reference specific documents or sections when relevant\n\
         6. If asked about images or diagrams, mention that they exist in the documents\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}

fn insights_prompt(context: &str) -> String {
    format!(
        "Based on the following excerpts from process documents, extract the key insights, \
         important points, and critical information.\n\
         \n\
         Provide a numbered list of distinct insights.\n\
         \n\
         Excerpts:\n\
         {context}\n\
         \n\
         Key Insights:"
    )
}

fn tests_prompt(context: &str, test_type: TestType) -> String {
    format!(
        "Based on the following documentation, generate {test_type} test cases.\n\
         \n\
         For each test case, provide:\n\
         1. Test ID\n\
         2. Test Description\n\
         3. Prerequisites\n\
         4. Test Steps\n\
         5. Expected Results\n\
         \n\
         Format each test case clearly and number them.\n\
         \n\
         Documentation:\n\
         {context}\n\
         \n\
         Test Cases:"
    )
}
