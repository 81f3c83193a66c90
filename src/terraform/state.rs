use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Terraform state document (tfstate v4 shape).
///
/// Only `resources` is read; `version`, `serial`, `lineage` and friends are
/// accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlock {
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Selects which resource blocks contribute instances to a walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub terraform_type: String,
    pub terraform_mode: Option<String>,
    pub name_allowlist: Option<Vec<String>>,
}

impl FilterSpec {
    pub fn new(terraform_type: impl Into<String>) -> Self {
        Self {
            terraform_type: terraform_type.into(),
            terraform_mode: None,
            name_allowlist: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.terraform_mode = Some(mode.into());
        self
    }

    /// Duplicates are dropped, first occurrence wins.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowlist: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !allowlist.contains(&name) {
                allowlist.push(name);
            }
        }
        self.name_allowlist = Some(allowlist);
        self
    }

    pub fn matches(&self, block: &ResourceBlock) -> bool {
        if block.type_ != self.terraform_type {
            return false;
        }
        if let Some(mode) = &self.terraform_mode {
            if block.mode.as_deref() != Some(mode.as_str()) {
                return false;
            }
        }
        match &self.name_allowlist {
            Some(names) => names.iter().any(|n| n == &block.name),
            None => true,
        }
    }
}

impl StateDocument {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Lazily yields every instance of every block accepted by `filter`, in
    /// document order. Duplicates in the document are yielded as-is.
    pub fn walk<'a>(
        &'a self,
        filter: &'a FilterSpec,
    ) -> impl Iterator<Item = (&'a ResourceBlock, &'a InstanceRecord)> + 'a {
        self.resources
            .iter()
            .filter(move |block| filter.matches(block))
            .flat_map(|block| block.instances.iter().map(move |instance| (block, instance)))
    }
}
