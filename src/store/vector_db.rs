// Qdrant-backed chunk store with page-scoped similarity search
use anyhow::{Context, Result};
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        condition::ConditionOneOf, points_selector::PointsSelectorOneOf,
        r#match::MatchValue, vectors_config::Config, with_payload_selector::SelectorOptions,
        Condition, CreateCollection, Distance, FieldCondition, Filter, Match, PointStruct,
        PointsSelector, Range, SearchPoints, Value as QdrantValue, VectorParams, VectorsConfig,
        WithPayloadSelector,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One chunk to be indexed, with its provenance payload
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub document: String,
    /// 1-based page number
    pub page: u32,
    pub chunk_index: usize,
    pub section: Option<String>,
}

/// Scope for a fine-stage search: one document, an inclusive page range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkScope {
    pub document: String,
    pub page_start: u32,
    pub page_end: u32,
}

impl ChunkScope {
    pub fn contains(&self, document: &str, page: u32) -> bool {
        self.document == document && (self.page_start..=self.page_end).contains(&page)
    }
}

/// Result of a vector search over the chunk collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHit {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub document: String,
    pub page: u32,
    pub chunk_index: usize,
    pub section: Option<String>,
}

/// Vector store for text chunks, backed by a Qdrant collection
pub struct VectorStore {
    client: QdrantClient,
    collection: String,
    dimension: u64,
}

impl VectorStore {
    /// Connect to Qdrant and make sure the chunk collection exists
    pub async fn connect(url: &str, collection: &str, dimension: usize) -> Result<Self> {
        let client = QdrantClient::from_url(url)
            .build()
            .context("Failed to create Qdrant client")?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension: dimension as u64,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    /// Create the collection with cosine distance if it is missing
    async fn ensure_collection(&self) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .context("Failed to list collections")?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(&CreateCollection {
                    collection_name: self.collection.clone(),
                    vectors_config: Some(VectorsConfig {
                        config: Some(Config::Params(VectorParams {
                            size: self.dimension,
                            distance: Distance::Cosine.into(),
                            ..Default::default()
                        })),
                    }),
                    ..Default::default()
                })
                .await
                .context(format!("Failed to create collection: {}", self.collection))?;
        }

        Ok(())
    }

    /// Upsert a batch of chunk records
    pub async fn add_batch(&self, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let mut payload: HashMap<String, QdrantValue> = HashMap::new();
                payload.insert("text".to_string(), QdrantValue::from(record.text));
                payload.insert("document".to_string(), QdrantValue::from(record.document));
                payload.insert("page".to_string(), QdrantValue::from(record.page as i64));
                payload.insert(
                    "chunk_index".to_string(),
                    QdrantValue::from(record.chunk_index as i64),
                );
                if let Some(section) = record.section {
                    payload.insert("section".to_string(), QdrantValue::from(section));
                }
                PointStruct::new(record.id, record.embedding, payload)
            })
            .collect();

        self.client
            .upsert_points_blocking(&self.collection, None, points, None)
            .await
            .context("Failed to batch upsert points")?;

        Ok(())
    }

    /// Remove every chunk belonging to a document (before re-ingesting it)
    pub async fn delete_document(&self, document: &str) -> Result<()> {
        let filter = Filter {
            must: vec![keyword_condition("document", document)],
            ..Default::default()
        };

        self.client
            .delete_points(
                &self.collection,
                None,
                &PointsSelector {
                    points_selector_one_of: Some(PointsSelectorOneOf::Filter(filter)),
                },
                None,
            )
            .await
            .context("Failed to delete document points")?;

        Ok(())
    }

    /// Unscoped top-k query over the whole collection
    pub async fn query(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
    ) -> Result<Vec<ChunkHit>> {
        self.search(query_embedding, n_results, threshold, None).await
    }

    /// Top-k query restricted to one document and an inclusive page range
    pub async fn query_scoped(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
        scope: &ChunkScope,
    ) -> Result<Vec<ChunkHit>> {
        let filter = Filter {
            must: vec![
                keyword_condition("document", &scope.document),
                page_range_condition(scope.page_start, scope.page_end),
            ],
            ..Default::default()
        };

        self.search(query_embedding, n_results, threshold, Some(filter))
            .await
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
        filter: Option<Filter>,
    ) -> Result<Vec<ChunkHit>> {
        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection.clone(),
                vector: query_embedding.to_vec(),
                limit: n_results as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                score_threshold: Some(threshold),
                filter,
                ..Default::default()
            })
            .await
            .context("Failed to search points")?;

        let hits = search_result
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;
                ChunkHit {
                    id: point_id_to_string(&point.id),
                    score: point.score,
                    text: string_field(&payload, "text").unwrap_or_default(),
                    document: string_field(&payload, "document").unwrap_or_default(),
                    page: integer_field(&payload, "page").unwrap_or(0) as u32,
                    chunk_index: integer_field(&payload, "chunk_index").unwrap_or(0) as usize,
                    section: string_field(&payload, "section"),
                }
            })
            .collect();

        Ok(hits)
    }

    /// Number of points currently stored in the chunk collection
    pub async fn count(&self) -> Result<u64> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .context("Failed to get collection info")?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    /// Drop and recreate the chunk collection
    pub async fn reset(&self) -> Result<()> {
        self.client
            .delete_collection(&self.collection)
            .await
            .context("Failed to delete collection")?;
        self.ensure_collection().await
    }

    /// Drop a collection without connecting a full store (used by `clean`)
    pub async fn drop_collection(url: &str, collection: &str) -> Result<()> {
        let client = QdrantClient::from_url(url)
            .build()
            .context("Failed to create Qdrant client")?;

        client
            .delete_collection(collection)
            .await
            .context("Failed to delete collection")?;

        Ok(())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

fn keyword_condition(key: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

fn page_range_condition(start: u32, end: u32) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: "page".to_string(),
            range: Some(Range {
                gte: Some(start as f64),
                lte: Some(end as f64),
                ..Default::default()
            }),
            ..Default::default()
        })),
    }
}

fn string_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
    payload.get(key).and_then(|value| {
        use qdrant_client::qdrant::value::Kind;
        match value.kind.as_ref() {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    })
}

fn integer_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<i64> {
    payload.get(key).and_then(|value| {
        use qdrant_client::qdrant::value::Kind;
        match value.kind.as_ref() {
            Some(Kind::IntegerValue(i)) => Some(*i),
            _ => None,
        }
    })
}

fn point_id_to_string(point_id: &Option<qdrant_client::qdrant::PointId>) -> String {
    point_id
        .as_ref()
        .map(|id| {
            use qdrant_client::qdrant::point_id::PointIdOptions;
            match &id.point_id_options {
                Some(PointIdOptions::Num(n)) => n.to_string(),
                Some(PointIdOptions::Uuid(u)) => u.clone(),
                None => "unknown".to_string(),
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}
