use serde_json::{Map, Value};

const MUST_EXIST_KEYS: [&str; 2] = ["must_exist", "must_exists"];

/// Lookup filter for the source resource.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCriteria {
    query: Map<String, Value>,
    must_exist: bool,
}

impl MatchCriteria {
    pub fn builder(resource_type: impl Into<String>) -> MatchCriteriaBuilder {
        MatchCriteriaBuilder {
            resource_type: resource_type.into(),
            name: None,
            id: None,
            provider: None,
            vpc: None,
            must_exist: true,
        }
    }

    /// Uses `raw` as the query minus its `must_exist`/`must_exists` keys.
    /// `must_exist` is read from those keys when one carries a boolean,
    /// otherwise it stays required.
    pub fn from_override(mut raw: Map<String, Value>) -> Self {
        let must_exist = MUST_EXIST_KEYS
            .iter()
            .find_map(|key| raw.get(*key).and_then(|v| v.as_bool()))
            .unwrap_or(true);
        raw.retain(|key, _| !MUST_EXIST_KEYS.contains(&key.as_str()));
        Self {
            query: raw,
            must_exist,
        }
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn must_exist(&self) -> bool {
        self.must_exist
    }
}

impl std::fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.query.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct MatchCriteriaBuilder {
    resource_type: String,
    name: Option<String>,
    id: Option<String>,
    provider: Option<String>,
    vpc: Option<String>,
    must_exist: bool,
}

impl MatchCriteriaBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn vpc(mut self, vpc: impl Into<String>) -> Self {
        self.vpc = Some(vpc.into());
        self
    }

    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = must_exist;
        self
    }

    pub fn build(self) -> MatchCriteria {
        let mut query = Map::new();
        query.insert("resource_type".to_string(), Value::String(self.resource_type));

        let optional = [
            ("name", self.name),
            ("id", self.id),
            ("provider", self.provider),
            ("vpc", self.vpc),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                query.insert(key.to_string(), Value::String(value));
            }
        }

        MatchCriteria {
            query,
            must_exist: self.must_exist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_minimal() {
        let criteria = MatchCriteria::builder("terraform_state").build();
        assert_eq!(Value::Object(criteria.query().clone()), json!({"resource_type": "terraform_state"}));
        assert!(criteria.must_exist());
    }

    #[test]
    fn test_builder_all_fields() {
        let criteria = MatchCriteria::builder("terraform_state")
            .name("network")
            .id("abc")
            .provider("aws")
            .vpc("vpc-1")
            .must_exist(false)
            .build();
        assert_eq!(
            Value::Object(criteria.query().clone()),
            json!({
                "resource_type": "terraform_state",
                "name": "network",
                "id": "abc",
                "provider": "aws",
                "vpc": "vpc-1"
            })
        );
        assert!(!criteria.must_exist());
    }

    #[test]
    fn test_builder_skips_empty_values() {
        let criteria = MatchCriteria::builder("terraform_state").vpc("").build();
        assert!(criteria.query().get("vpc").is_none());
    }

    #[test]
    fn test_override_used_as_query() {
        let raw = json!({"resource_type": "tf_bundle", "label": "prod"});
        let criteria = MatchCriteria::from_override(raw.as_object().unwrap().clone());
        assert_eq!(Value::Object(criteria.query().clone()), raw);
        assert!(criteria.must_exist());
    }

    #[test]
    fn test_override_must_exist_flag() {
        let raw = json!({"resource_type": "tf_bundle", "must_exists": false});
        let criteria = MatchCriteria::from_override(raw.as_object().unwrap().clone());
        assert!(!criteria.must_exist());
        assert_eq!(
            Value::Object(criteria.query().clone()),
            json!({"resource_type": "tf_bundle"})
        );
    }

    #[test]
    fn test_override_drops_non_boolean_must_exist() {
        let raw = json!({"resource_type": "tf_bundle", "must_exist": "no"});
        let criteria = MatchCriteria::from_override(raw.as_object().unwrap().clone());
        assert!(criteria.must_exist());
        assert!(criteria.query().get("must_exist").is_none());
    }

    #[test]
    fn test_display_is_json_query() {
        let criteria = MatchCriteria::builder("terraform_state").name("net").build();
        assert_eq!(
            criteria.to_string(),
            r#"{"resource_type":"terraform_state","name":"net"}"#
        );
    }
}
