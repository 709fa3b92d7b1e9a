//! Document ingestion: source change feed through to the vector index

use super::{InspectorPayload, Scenario, ScenarioBuilder, ScenarioName};
use crate::topology::NodeId;
use serde_json::json;

pub(super) fn steps(tenant_id: &str) -> Scenario {
    ScenarioBuilder::new(ScenarioName::Ingestion, tenant_id)
        .step(
            NodeId::Source,
            format!("Source: Detecting changes for Tenant {}", tenant_id),
            InspectorPayload::record(
                "Modular RAG Ingestion",
                format!(
                    "Why: Modular design allows independent scaling. Metadata tagging ensures multi-tenancy for {}.",
                    tenant_id
                ),
                json!({
                    "event": "s3:ObjectCreated",
                    "file": "policy_v2.pdf",
                    "tenant_id": tenant_id,
                    "technique": "Modular RAG",
                }),
            ),
        )
        .step(
            NodeId::Kafka,
            "Kafka: Buffering event stream",
            InspectorPayload::record(
                "Backpressure Handling",
                "Why: Decouples the fast ingestion source from the slower embedding model.",
                json!({
                    "topic": "raw-docs",
                    "partition_key": format!("doc_id_{}_551", tenant_id),
                    "offset": 1042,
                }),
            ),
        )
        .step(
            NodeId::Flink,
            "Flink: Cleaning & Chunking",
            InspectorPayload::record(
                "Text Chunking",
                "Why: LLMs have fixed context windows. We need 512-token overlapping chunks for optimal retrieval.",
                json!({
                    "method": "RecursiveCharacterSplitter",
                    "chunk_size": 512,
                    "overlap": 50,
                    "chunks_generated": 15,
                }),
            ),
        )
        .step(
            NodeId::Embedding,
            "Embedding: Generating Dense Vectors",
            InspectorPayload::record(
                "Dense Embeddings (E5/Gecko)",
                "Why: Embeddings encode meaning into geometry. Dense vectors capture semantic similarity.",
                json!({
                    "model": "text-embedding-004",
                    "dimensions": 768,
                    "type": "Dense (Transformer-based)",
                }),
            ),
        )
        .step(
            NodeId::VectorDb,
            format!("Vector DB: Indexing (HNSW) for {}", tenant_id),
            InspectorPayload::record(
                "HNSW Indexing",
                "Why: HNSW is the default winner for latency/recall in RAM. Tenant filters are applied here.",
                json!({
                    "index_type": "HNSW",
                    "metric": "cosine",
                    "filter": { "tenant_id": tenant_id },
                    "shards": 3,
                }),
            ),
        )
        .build()
}
