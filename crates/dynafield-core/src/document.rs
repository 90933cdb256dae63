//! Tenant-scoped model documents as they are persisted

use crate::error::Result;
use crate::fields::FieldDefinition;
use crate::model::{build_dynamic_model, DynamicModel};
use crate::utils::uuid_7;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored model definition owned by a tenant and user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicModelDocument {
    #[serde(default = "uuid_7")]
    pub id: Uuid,
    #[serde(alias = "tenantId")]
    pub tenant_id: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    pub name: String,
    pub description: String,
    #[serde(alias = "fieldSchema")]
    pub field_schema: Vec<FieldDefinition>,
}

impl DynamicModelDocument {
    pub fn to_model(&self) -> Result<DynamicModel> {
        build_dynamic_model(&self.name, &self.field_schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_to_model() {
        let document: DynamicModelDocument = serde_json::from_value(json!({
            "tenantId": "t-1",
            "user_id": "u-1",
            "name": "Contact",
            "description": "CRM contact",
            "field_schema": [
                {"__typename": "StrField", "label": "name", "required": true},
                {"__typename": "EmailField", "label": "Email"}
            ]
        }))
        .unwrap();
        let model = document.to_model().unwrap();
        assert_eq!(model.name(), "Contact");
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["name", "email"]);

        let record = model.validate(&json!({"name": "Ada", "email": "ada@example.com"})).unwrap();
        assert_eq!(record.get_str("email"), Some("ada@example.com"));
    }

    #[test]
    fn test_document_missing_tenant_rejected() {
        let result: std::result::Result<DynamicModelDocument, _> =
            serde_json::from_value(json!({"user_id": "u", "name": "n", "description": "d", "field_schema": []}));
        assert!(result.is_err());
    }
}
