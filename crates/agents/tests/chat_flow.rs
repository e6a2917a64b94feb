//! Integration tests for the retrieve-then-dispatch chat flow.

use concierge_agents::{build_router, AgentRouter, ChatService, ChatSession, ReplyTemplate, Role};
use concierge_core::{AppConfig, AppError, AppResult, UnknownAgentPolicy};
use concierge_knowledge::embeddings::providers::TrigramProvider;
use concierge_knowledge::{DocumentStore, EmbeddingProvider, Retriever};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Trigram embedder that starts failing once `fail` is called.
#[derive(Debug)]
struct FlakyProvider {
    inner: TrigramProvider,
    failing: AtomicBool,
}

impl FlakyProvider {
    fn new() -> Self {
        Self {
            inner: TrigramProvider::new(128),
            failing: AtomicBool::new(false),
        }
    }

    fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyProvider {
    fn provider_name(&self) -> &str {
        "flaky"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Embedding("embedding backend offline".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

fn write_docs(dir: &TempDir) {
    fs::write(dir.path().join("refund.txt"), "refund policy is 30 days").unwrap();
    fs::write(dir.path().join("shipping.txt"), "shipping takes 5 days").unwrap();
}

fn support_and_sales(template: &str) -> Arc<AgentRouter> {
    Arc::new(
        AgentRouter::from_names(
            &["support", "sales"],
            Arc::new(ReplyTemplate::new(template).unwrap()),
            UnknownAgentPolicy::Reject,
        )
        .unwrap(),
    )
}

async fn service_with(
    provider: Arc<dyn EmbeddingProvider>,
    template: &str,
) -> (TempDir, ChatService) {
    let dir = TempDir::new().unwrap();
    write_docs(&dir);
    let store = DocumentStore::load(dir.path(), &["txt".to_string()]).unwrap();
    let retriever = Retriever::build(store, provider).await.unwrap();
    let service = ChatService::new(Arc::new(retriever), support_and_sales(template), 2);
    (dir, service)
}

#[tokio::test]
async fn test_chat_grounds_reply_in_retrieved_documents() {
    let (_dir, service) = service_with(
        Arc::new(TrigramProvider::new(384)),
        "[{{agent}}] {{message}}\n[context]\n{{context}}",
    )
    .await;

    let reply = service.chat("how long for shipping", None).await.unwrap();

    assert_eq!(reply.agent, "support");
    assert_eq!(reply.knowledge.len(), 2);
    assert_eq!(reply.knowledge[0].id, "shipping.txt");
    assert!(reply.knowledge[0].score <= reply.knowledge[1].score);
    assert_eq!(
        reply.reply,
        "[support] how long for shipping\n[context]\nshipping takes 5 days\nrefund policy is 30 days"
    );

    // Agent memory holds the raw message, not the context
    let turns = service.router().get("support").unwrap().recent_turns(10);
    assert_eq!(turns[0].message, "how long for shipping");
}

#[tokio::test]
async fn test_chat_without_agent_uses_first_registered() {
    let (_dir, service) =
        service_with(Arc::new(TrigramProvider::new(64)), "[{{agent}}] received: {{message}}").await;

    let reply = service.chat("hi", None).await.unwrap();

    assert_eq!(reply.agent, "support");
    assert_eq!(reply.reply, "[support] received: hi");
    assert_eq!(service.router().get("sales").unwrap().turn_count(), 0);
}

#[tokio::test]
async fn test_chat_named_agent() {
    let (_dir, service) =
        service_with(Arc::new(TrigramProvider::new(64)), "[{{agent}}] received: {{message}}").await;

    let reply = service.chat("do you ship abroad?", Some("sales")).await.unwrap();
    assert_eq!(reply.agent, "sales");
    assert_eq!(service.router().get("sales").unwrap().turn_count(), 2);
}

#[tokio::test]
async fn test_unknown_agent_fails_before_retrieval() {
    let provider = Arc::new(FlakyProvider::new());
    let (_dir, service) = service_with(provider.clone(), "{{message}}").await;
    provider.fail();

    // Routing error wins over the embedder error
    let result = service.chat("hi", Some("billing")).await;
    assert!(matches!(result, Err(AppError::UnknownAgent(name)) if name == "billing"));
}

#[tokio::test]
async fn test_embedder_failure_surfaces_and_leaves_memory_untouched() {
    let provider = Arc::new(FlakyProvider::new());
    let (_dir, service) = service_with(provider.clone(), "{{message}}").await;

    service.chat("first question", None).await.unwrap();
    provider.fail();

    let result = service.chat("second question", None).await;
    assert!(matches!(result, Err(AppError::Embedding(_))));
    assert_eq!(service.router().get("support").unwrap().turn_count(), 2);
}

#[tokio::test]
async fn test_empty_corpus_chat_has_no_knowledge() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::load(dir.path(), &["txt".to_string()]).unwrap();
    let retriever = Retriever::build(store, Arc::new(TrigramProvider::new(32)))
        .await
        .unwrap();
    let service = ChatService::new(
        Arc::new(retriever),
        support_and_sales("{{message}}{{#if context}} + context{{/if}}"),
        2,
    );

    let reply = service.chat("anything", None).await.unwrap();
    assert!(reply.knowledge.is_empty());
    assert_eq!(reply.reply, "anything");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_chats_on_default_agent_keep_turns_paired() {
    let (_dir, service) =
        service_with(Arc::new(TrigramProvider::new(64)), "[{{agent}}] received: {{message}}").await;
    let service = Arc::new(service);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.chat(&format!("question {}", i), None).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let turns = service
        .router()
        .get("support")
        .unwrap()
        .recent_turns(usize::MAX);
    assert_eq!(turns.len(), 32);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(
            pair[1].message,
            format!("[support] received: {}", pair[0].message)
        );
    }
}

#[tokio::test]
async fn test_session_history_is_bounded() {
    let (_dir, service) =
        service_with(Arc::new(TrigramProvider::new(64)), "ok: {{message}}").await;
    let mut session = ChatSession::new(Arc::new(service), Some("sales".to_string()), 4);

    for i in 0..5 {
        session.send(&format!("m{}", i)).await.unwrap();
    }

    let history = session.history();
    let messages: Vec<&str> = history.iter().map(|t| t.message.as_str()).collect();
    assert_eq!(messages, vec!["m3", "ok: m3", "m4", "ok: m4"]);
    assert_eq!(session.agent(), Some("sales"));
}

#[tokio::test]
async fn test_session_does_not_record_failed_turns() {
    let provider = Arc::new(FlakyProvider::new());
    let (_dir, service) = service_with(provider.clone(), "{{message}}").await;
    let mut session = ChatSession::new(Arc::new(service), None, 10);

    session.send("works").await.unwrap();
    provider.fail();
    assert!(session.send("breaks").await.is_err());

    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_build_router_from_config() {
    let config = AppConfig {
        agents: vec!["support".to_string(), "sales".to_string()],
        ..Default::default()
    };

    let router = build_router(&config).unwrap();

    assert_eq!(router.names(), vec!["support", "sales"]);
    assert_eq!(router.dispatch("hi", None).unwrap(), "[support] received: hi");
}

#[test]
fn test_build_router_rejects_bad_template() {
    let config = AppConfig {
        reply_template: "{{#each}}".to_string(),
        ..Default::default()
    };
    assert!(matches!(build_router(&config), Err(AppError::Template(_))));
}
