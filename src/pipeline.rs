//! Source lookup, state walk, normalization, identity and emission as one
//! configurable run.

mod criteria;
mod emit;
mod identity;
mod input;
mod locate;
mod normalize;

pub use criteria::{MatchCriteria, MatchCriteriaBuilder};
pub use emit::{assemble, describe, emit};
pub use identity::{ARN_PROVIDERS, arn_region, arn_to_id, resolve};
pub use input::{ExtractInput, NULL_SENTINEL, present};
pub use locate::{TieBreak, locate};
pub use normalize::{NormalizeInput, TransformSpec, normalize};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;

use crate::error::ExtractError;
use crate::hash::{ContentHasher, Sha256Hasher};
use crate::resource::ContextFields;
use crate::store::InventoryStore;
use crate::terraform::FilterSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelinePolicy {
    pub tie_break: TieBreak,
}

/// Everything one run needs. Built once per run from caller input.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Type of the emitted records; may differ from the Terraform type.
    pub resource_type: String,
    pub criteria: MatchCriteria,
    pub filter: FilterSpec,
    pub vpc: Option<String>,
    pub context: ContextFields,
    pub transform: TransformSpec,
    pub labels: Option<Value>,
    pub tags: Option<Value>,
    pub policy: PipelinePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractReport {
    pub resource_type: String,
    pub source_id: Option<String>,
    pub matched: usize,
    pub emitted: Vec<String>,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn InventoryStore>,
    hasher: Arc<dyn ContentHasher>,
}

impl Pipeline {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            hasher: Arc::new(Sha256Hasher),
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Runs one extraction. Fails only when the source lookup fails; a record
    /// the store rejects is logged and counted, and the walk continues.
    pub async fn run(&self, config: &ExtractConfig) -> Result<ExtractReport, ExtractError> {
        let mut report = ExtractReport {
            resource_type: config.resource_type.clone(),
            ..Default::default()
        };

        let Some(source) =
            locate(self.store.as_ref(), &config.criteria, config.policy.tie_break).await?
        else {
            return Ok(report);
        };
        report.source_id = source.id.clone();

        let input = NormalizeInput {
            target_type: &config.resource_type,
            vpc: config.vpc.as_deref(),
            context: &config.context,
            transform: &config.transform,
        };

        for (block, instance) in source.state.walk(&config.filter) {
            report.matched += 1;

            let values = normalize(&instance.attributes, &input, Some(block.name.as_str()));
            let values = resolve(values, self.hasher.as_ref(), source.id.as_deref());
            let record = assemble(
                values,
                &config.context,
                config.labels.as_ref(),
                config.tags.as_ref(),
            );

            match emit(self.store.as_ref(), &record).await {
                Ok(id) => report.emitted.push(id),
                Err(e) => {
                    tracing::warn!(
                        id = %record.id,
                        block = %block.name,
                        error = %e,
                        "failed to emit record, continuing"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            resource_type = %report.resource_type,
            matched = report.matched,
            emitted = report.emitted.len(),
            failed = report.failed,
            "extraction complete"
        );
        Ok(report)
    }

    /// Runs every config concurrently. Results come back in input order.
    pub async fn run_batch(
        &self,
        configs: Vec<ExtractConfig>,
    ) -> Vec<Result<ExtractReport, ExtractError>> {
        let total = configs.len();
        let mut tasks = JoinSet::new();
        for (index, config) in configs.into_iter().enumerate() {
            let pipeline = self.clone();
            tasks.spawn(async move { (index, pipeline.run(&config).await) });
        }

        let mut slots: Vec<Option<Result<ExtractReport, ExtractError>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "extraction task aborted"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(ExtractError::Task("extraction task aborted".to_string())))
            })
            .collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store.name())
            .finish()
    }
}
