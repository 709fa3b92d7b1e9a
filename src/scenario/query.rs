//! Query answering: user question through retrieval, reranking and generation

use super::{DisplayHint, InspectorPayload, Scenario, ScenarioBuilder, ScenarioName};
use crate::topology::NodeId;
use serde_json::json;

pub(super) fn steps(tenant_id: &str) -> Scenario {
    ScenarioBuilder::new(ScenarioName::Query, tenant_id)
        .step(
            NodeId::User,
            format!("User ({}): Submitting vague query", tenant_id),
            InspectorPayload::record(
                "User Input",
                "Raw input. Often ambiguous or lacking context.",
                json!({
                    "query": "vacation policy?",
                    "user_id": "u_99",
                    "tenant_id": tenant_id,
                }),
            ),
        )
        .step(
            NodeId::Redis,
            "Redis: Checking Cache & History",
            InspectorPayload::record(
                "Conversation Memory",
                "Why: Multi-turn reasoning needs the previous turns of this conversation.",
                json!({
                    "cache_hit": false,
                    "history_fetched_turns": 3,
                    "key": format!("chat:{}:u_99", tenant_id),
                }),
            ),
        )
        .step(
            NodeId::Retriever,
            "Retriever: Generating HyDE Document",
            InspectorPayload::record(
                "HyDE (Hypothetical Document Embeddings)",
                "Why: Improves retrieval when user queries are vague. An ideal answer is hallucinated and embedded instead.",
                json!({
                    "method": "HyDE",
                    "hypothetical_doc": format!(
                        "The vacation policy for Tenant {} typically allows 20 days...",
                        tenant_id
                    ),
                    "technique": "Query Expansion",
                }),
            ),
        )
        .step(
            NodeId::Embedding,
            "Embedding: Vectorizing HyDE doc",
            InspectorPayload::record(
                "Query Embedding",
                "Embedding the hypothetical answer to find semantically similar real documents.",
                json!({
                    "target": "Hypothetical Document",
                    "vector_preview": [0.12, -0.55, 0.91],
                }),
            ),
        )
        .step(
            NodeId::Redis,
            "Redis: Semantic Cache Lookup",
            InspectorPayload::record(
                "Semantic Cache",
                "Why: A near-identical earlier question can be answered without touching the LLM. Below threshold means miss.",
                json!({
                    "key_prefix": format!("semcache:{}", tenant_id),
                    "similarity_threshold": 0.92,
                    "best_similarity": 0.71,
                    "cache_hit": false,
                }),
            ),
        )
        .step(
            NodeId::VectorDb,
            format!("Vector DB: Hybrid Search ({})", tenant_id),
            InspectorPayload::record(
                "Hybrid Search (HNSW + BM25)",
                "Why: Hybrid retrieval combines semantic similarity with keyword fidelity. Retrieving top 50 candidates.",
                json!({
                    "dense_results": 40,
                    "sparse_results": 10,
                    "total_candidates": 50,
                    "latency_ms": 15,
                    "filter": { "tenant_id": tenant_id },
                }),
            ),
        )
        .step(
            NodeId::Reranker,
            "Reranker: Cross-Encoder Refinement",
            InspectorPayload::record(
                "Cross-Encoder Re-ranking",
                "Why: Cross-encoders score query and document jointly. Note how the correct document moves to the top.",
                json!({
                    "model": "mixedbread-ai/mxbai-rerank-large-v1",
                    "candidates": [
                        { "id": "doc_88", "text": format!("Vacation Policy (Tenant {})", tenant_id), "old_rank": 14, "new_rank": 1, "score": 0.98 },
                        { "id": "doc_12", "text": "Paid Time Off Guidelines (General)", "old_rank": 3, "new_rank": 2, "score": 0.89 },
                        { "id": "doc_05", "text": "Sick Leave Policy", "old_rank": 1, "new_rank": 3, "score": 0.76 },
                        { "id": "doc_99", "text": "Remote Work (Reference)", "old_rank": 2, "new_rank": 4, "score": 0.45 },
                        { "id": "doc_34", "text": "Office Holiday Party", "old_rank": 4, "new_rank": 5, "score": 0.12 },
                    ],
                }),
            )
            .with_display(DisplayHint::Ranking),
        )
        .step(
            NodeId::Llm,
            "LLM: Inference with FlashAttention",
            InspectorPayload::record(
                "LLM Generation (CoT)",
                "Why: Chain-of-Thought forces intermediate reasoning steps. FlashAttention speeds up the IO.",
                json!({
                    "technique": "CoT + RAG",
                    "system_prompt": "You are a helpful HR assistant...",
                    "context_chunks": 5,
                }),
            ),
        )
        .step(
            NodeId::Redis,
            "Redis: Write-back History",
            InspectorPayload::record(
                "State Update",
                "Why: KV-cache style session state keeps the next turn cheap.",
                json!({
                    "action": "Append Turn",
                    "key": format!("chat:history:{}:u_99", tenant_id),
                    "ttl": 3600,
                }),
            ),
        )
        .step(
            NodeId::User,
            "User: Streaming Response",
            InspectorPayload::text(
                "Final Output",
                "Delivered via SSE (Server-Sent Events).",
                "Based on the policy, you have **20 days** of vacation.",
            ),
        )
        .build()
}
