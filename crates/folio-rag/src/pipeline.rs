//! The answering pipeline.
//!
//! Sequences one request through budget preflight, input validation,
//! embedding, retrieval (with its single fallback), temporal ranking,
//! context assembly, message composition, and the chat call, then settles
//! the token budget. Degrade paths answer with a fixed sentence and skip
//! every collaborator from that point on.

use std::sync::Arc;

use folio_core::config::FolioConfig;
use folio_core::error::Result;
use folio_core::traits::{ChatModel, Embedder, VectorIndex};
use folio_core::types::{ChatRequest, ChatResponse, Message, Role};

use crate::budget::TokenBudget;
use crate::context;
use crate::intent;
use crate::query;
use crate::rank::RelevanceRanker;
use crate::retrieve;

/// Returned when the request carries no history at all.
pub const NO_QUESTION: &str = "I'm sorry, I didn't receive a question.";
/// Returned when the trailing message is not a user turn.
pub const NOT_FROM_USER: &str = "I'm sorry, the last message was not from a user.";
/// Returned when retrieval (including the fallback) finds nothing.
pub const NO_INFORMATION: &str =
    "I don't have enough information to answer that question based on my portfolio data.";
/// Returned by the budget preflight once the conversation ceiling is hit.
pub const LIMIT_REACHED: &str =
    "I'm sorry, this conversation has reached its token limit. Please start a new conversation to continue.";

/// Retrieval-augmented chat orchestrator.
///
/// Holds no per-request state; concurrent calls are independent.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
    budget: TokenBudget,
    ranker: RelevanceRanker,
    context_char_limit: usize,
    owner: String,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
        config: &FolioConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
            budget: TokenBudget::new(config.chat.token_limit),
            ranker: RelevanceRanker::new(),
            context_char_limit: config.chat.context_char_limit,
            owner: config.persona.owner.clone(),
        }
    }

    /// Replace the ranker, e.g. to pin the clock in tests.
    pub fn with_ranker(mut self, ranker: RelevanceRanker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Answer one turn. The caller must resend the returned
    /// `total_tokens_used` as the next request's `total_tokens_used_so_far`.
    pub async fn answer(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let used = request.total_tokens_used_so_far;

        // Preflight: a blocked conversation spends nothing, calls nothing.
        if self.budget.is_exhausted(used) {
            tracing::info!(used, "Conversation token limit reached, blocking turn");
            return Ok(ChatResponse {
                answer: LIMIT_REACHED.to_string(),
                total_tokens_used: used,
                limit_reached: true,
            });
        }

        let Some(last) = request.history.last() else {
            return Ok(degraded(NO_QUESTION, used));
        };
        if last.role != Role::User {
            return Ok(degraded(NOT_FROM_USER, used));
        }
        let question = last.content.clone();
        tracing::info!(question = %question, "Processing RAG query");

        let signal = intent::classify(&question);
        tracing::debug!(
            category = ?signal.category,
            temporal = signal.temporal,
            comprehensive = signal.comprehensive,
            "Intent classified"
        );

        let query_text = query::embedding_query(&request.history);
        let embedding = self.embedder.embed(&query_text).await?;

        let mut candidates =
            retrieve::retrieve_with_fallback(self.index.as_ref(), &embedding, &signal).await?;
        tracing::info!(count = candidates.len(), "Candidates retrieved");

        if candidates.is_empty() {
            return Ok(degraded(NO_INFORMATION, used));
        }

        if signal.temporal {
            self.ranker.sort(&mut candidates);
            tracing::debug!("Candidates reordered by recency/rank");
        }

        let context = context::assemble(&candidates, signal.comprehensive, self.context_char_limit);
        tracing::debug!(
            included = context.included,
            chars = context.text.len(),
            "Context assembled"
        );

        let messages = self.compose_messages(&request.history, &question, &context.text);
        let completion = self.chat.complete(&messages).await?;

        let (total_tokens_used, limit_reached) =
            self.budget.settle(used, completion.total_tokens);
        tracing::info!(total_tokens_used, limit_reached, "Turn settled");

        Ok(ChatResponse {
            answer: completion.content,
            total_tokens_used,
            limit_reached,
        })
    }

    /// Legacy single-string variant: no history beyond the question, no
    /// token accounting. Kept for callers that predate `ChatRequest`.
    pub async fn answer_text(&self, question: &str) -> Result<String> {
        let request = ChatRequest {
            history: vec![Message::user(question)],
            total_tokens_used_so_far: 0,
        };
        Ok(self.answer(&request).await?.answer)
    }

    /// Final message list: system rules, all prior turns verbatim, then one
    /// context-injected user message replacing the raw question.
    fn compose_messages(
        &self,
        history: &[Message],
        question: &str,
        context: &str,
    ) -> Vec<Message> {
        let system_prompt = format!(
            "You are {owner}'s portfolio assistant.\n\
             \n\
             You MUST follow these rules:\n\
             1. Answer the user's question based *only* on the provided CONTEXT.\n\
             2. If the CONTEXT is not sufficient, say \"{no_info}\"\n\
             3. Use the chat history for conversational flow (e.g., if they say \"tell me more\"), but use the new CONTEXT for the facts.\n\
             4. If the question asks about \"last\" or \"recent\" experience, use the entry with the most recent year from the CONTEXT.\n\
             5. If the question asks about \"all\" experiences, list ALL the experiences provided in the CONTEXT in chronological order (most recent first).\n\
             6. Keep your answer natural and well-structured.\n",
            owner = self.owner,
            no_info = NO_INFORMATION,
        );

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt));
        if history.len() > 1 {
            messages.extend_from_slice(&history[..history.len() - 1]);
        }
        messages.push(Message::user(format!(
            "CONTEXT:\n{context}\n\nQUESTION: {question}\n"
        )));
        messages
    }
}

fn degraded(answer: &str, used: u32) -> ChatResponse {
    ChatResponse {
        answer: answer.to_string(),
        total_tokens_used: used,
        limit_reached: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::types::{ChatCompletion, RetrievedCandidate};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockEmbedder {
        calls: AtomicUsize,
    }

    impl MockEmbedder {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.0; 8])
        }
    }

    struct MockIndex {
        responses: Mutex<Vec<Vec<RetrievedCandidate>>>,
        calls: Mutex<Vec<(usize, Option<HashMap<String, String>>)>>,
    }

    impl MockIndex {
        fn new(mut responses: Vec<Vec<RetrievedCandidate>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn query(
            &self,
            _embedding: &[f32],
            top_k: usize,
            filter: Option<HashMap<String, String>>,
        ) -> Result<Vec<RetrievedCandidate>> {
            self.calls.lock().unwrap().push((top_k, filter));
            Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
        }

        async fn upsert(
            &self,
            _id: &str,
            _embedding: &[f32],
            _document: &str,
            _metadata: Option<serde_json::Map<String, serde_json::Value>>,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct MockChat {
        reply: String,
        tokens: u32,
        calls: AtomicUsize,
        last_messages: Mutex<Option<Vec<Message>>>,
    }

    impl MockChat {
        fn new(reply: &str, tokens: u32) -> Self {
            Self {
                reply: reply.to_string(),
                tokens,
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatModel for MockChat {
        async fn complete(&self, messages: &[Message]) -> Result<ChatCompletion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock().unwrap() = Some(messages.to_vec());
            Ok(ChatCompletion {
                content: self.reply.clone(),
                total_tokens: self.tokens,
            })
        }
    }

    fn doc(text: &str, meta: serde_json::Value) -> RetrievedCandidate {
        RetrievedCandidate {
            document: text.into(),
            metadata: meta.as_object().cloned(),
            distance: None,
        }
    }

    struct Harness {
        embedder: Arc<MockEmbedder>,
        index: Arc<MockIndex>,
        chat: Arc<MockChat>,
        pipeline: RagPipeline,
    }

    fn harness(responses: Vec<Vec<RetrievedCandidate>>, reply: &str, tokens: u32) -> Harness {
        let embedder = Arc::new(MockEmbedder::new());
        let index = Arc::new(MockIndex::new(responses));
        let chat = Arc::new(MockChat::new(reply, tokens));
        let mut config = FolioConfig::default();
        config.persona.owner = "Mohamed".into();
        let pipeline = RagPipeline::new(
            embedder.clone(),
            index.clone(),
            chat.clone(),
            &config,
        )
        .with_ranker(RelevanceRanker::with_year(2026));
        Harness { embedder, index, chat, pipeline }
    }

    fn request(history: Vec<Message>, used: u32) -> ChatRequest {
        ChatRequest { history, total_tokens_used_so_far: used }
    }

    #[tokio::test]
    async fn test_empty_history_degrades() {
        let h = harness(vec![], "unused", 0);
        let resp = h.pipeline.answer(&request(vec![], 42)).await.unwrap();
        assert_eq!(resp.answer, NO_QUESTION);
        assert_eq!(resp.total_tokens_used, 42);
        assert!(!resp.limit_reached);
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_message_not_user_degrades() {
        let h = harness(vec![], "unused", 0);
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let resp = h.pipeline.answer(&request(history, 10)).await.unwrap();
        assert_eq!(resp.answer, NOT_FROM_USER);
        assert_eq!(resp.total_tokens_used, 10);
        assert!(!resp.limit_reached);
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preflight_blocks_without_collaborator_calls() {
        let h = harness(vec![vec![doc("ignored", json!(null))]], "unused", 0);
        let history = vec![Message::user("question")];
        let resp = h.pipeline.answer(&request(history, 3000)).await.unwrap();
        assert_eq!(resp.answer, LIMIT_REACHED);
        assert_eq!(resp.total_tokens_used, 3000);
        assert!(resp.limit_reached);
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert!(h.index.calls.lock().unwrap().is_empty());
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_candidates_after_fallback_degrades() {
        let h = harness(vec![vec![], vec![]], "unused", 0);
        let history = vec![Message::user("your projects?")];
        let resp = h.pipeline.answer(&request(history, 7)).await.unwrap();
        assert_eq!(resp.answer, NO_INFORMATION);
        assert_eq!(resp.total_tokens_used, 7);
        assert!(!resp.limit_reached);

        let calls = h.index.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], (5, None));
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_happy_path_composes_messages() {
        let h = harness(
            vec![vec![doc("Built a compiler", json!({ "year": "2023" }))]],
            "I built a compiler in 2023.",
            120,
        );
        let history = vec![
            Message::user("hi"),
            Message::assistant("hello, ask me about the portfolio"),
            Message::user("tell me about your best project"),
        ];
        let resp = h.pipeline.answer(&request(history, 100)).await.unwrap();
        assert_eq!(resp.answer, "I built a compiler in 2023.");
        assert_eq!(resp.total_tokens_used, 220);
        assert!(!resp.limit_reached);

        let messages = h.chat.last_messages.lock().unwrap().clone().unwrap();
        // system + 2 prior turns + context-injected question
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Mohamed's portfolio assistant"));
        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[2].role, Role::Assistant);
        let last = &messages[3];
        assert_eq!(last.role, Role::User);
        assert!(last.content.starts_with("CONTEXT:\n=== SOURCE 1 ===\nBuilt a compiler"));
        assert!(last.content.contains("QUESTION: tell me about your best project"));
    }

    #[tokio::test]
    async fn test_category_filter_and_top_k_reach_index() {
        let h = harness(vec![vec![doc("exp", json!(null))]], "answer", 10);
        let history = vec![Message::user("list all your work experience")];
        h.pipeline.answer(&request(history, 0)).await.unwrap();

        let calls = h.index.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 10);
        assert_eq!(
            calls[0].1.as_ref().unwrap().get("category"),
            Some(&"Experience".to_string())
        );
    }

    #[tokio::test]
    async fn test_temporal_query_reorders_candidates() {
        let h = harness(
            vec![vec![
                doc("Old role", json!({ "year": "2019" })),
                doc("Ongoing role", json!({ "year": "2022 - Present" })),
            ]],
            "answer",
            10,
        );
        let history = vec![Message::user("what is your most recent experience?")];
        h.pipeline.answer(&request(history, 0)).await.unwrap();

        let messages = h.chat.last_messages.lock().unwrap().clone().unwrap();
        let prompt = &messages.last().unwrap().content;
        let ongoing = prompt.find("Ongoing role").unwrap();
        let old = prompt.find("Old role").unwrap();
        assert!(ongoing < old, "present-year entry must come first");
    }

    #[tokio::test]
    async fn test_crossing_limit_still_delivers_answer() {
        let h = harness(vec![vec![doc("d", json!(null))]], "final answer", 200);
        let history = vec![Message::user("question")];
        let resp = h.pipeline.answer(&request(history, 2900)).await.unwrap();
        assert_eq!(resp.answer, "final answer");
        assert_eq!(resp.total_tokens_used, 3100);
        assert!(resp.limit_reached);
    }

    #[tokio::test]
    async fn test_round_trip_accumulates_monotonically() {
        let h = harness(
            vec![vec![doc("d", json!(null))], vec![doc("d", json!(null))]],
            "answer",
            150,
        );
        let first = h
            .pipeline
            .answer(&request(vec![Message::user("q1")], 0))
            .await
            .unwrap();
        assert_eq!(first.total_tokens_used, 150);

        let second = h
            .pipeline
            .answer(&request(
                vec![
                    Message::user("q1"),
                    Message::assistant("answer"),
                    Message::user("q2"),
                ],
                first.total_tokens_used,
            ))
            .await
            .unwrap();
        assert_eq!(second.total_tokens_used, 300);
        assert!(second.total_tokens_used >= first.total_tokens_used);
    }

    #[tokio::test]
    async fn test_answer_text_legacy_variant() {
        let h = harness(vec![vec![doc("d", json!(null))]], "plain answer", 50);
        let answer = h.pipeline.answer_text("who are you?").await.unwrap();
        assert_eq!(answer, "plain answer");
    }
}
