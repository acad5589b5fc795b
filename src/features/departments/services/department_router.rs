use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;

/// Department responsible for a category, by department name.
/// Categories without a mapping (including "other") are not routed.
pub fn department_name_for(category: &str) -> Option<&'static str> {
    match category {
        "pothole" => Some("Roads"),
        "street_light" => Some("Electrical"),
        "garbage" | "graffiti" => Some("Sanitation"),
        "flooding" => Some("Drainage"),
        _ => None,
    }
}

/// Lookup of department ids by name
#[async_trait]
pub trait DepartmentDirectory: Send + Sync {
    async fn find_id_by_name(&self, name: &str) -> Result<Option<Uuid>>;
}

/// Assigns new reports to a department based on their category
pub struct DepartmentRouter {
    directory: Arc<dyn DepartmentDirectory>,
}

impl DepartmentRouter {
    pub fn new(directory: Arc<dyn DepartmentDirectory>) -> Self {
        Self { directory }
    }

    /// Department id for `category`, if one is mapped and exists.
    ///
    /// A failed lookup is logged and treated like a missing department so that
    /// routing never prevents a report from being stored.
    pub async fn route(&self, category: &str) -> Option<Uuid> {
        let name = department_name_for(category)?;

        match self.directory.find_id_by_name(name).await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                tracing::warn!(
                    "Department '{}' for category '{}' does not exist",
                    name,
                    category
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Department lookup for category '{}' failed, leaving unassigned: {}",
                    category,
                    e
                );
                None
            }
        }
    }
}
