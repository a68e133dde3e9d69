use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::technology;

/// Une technologie n'a qu'un nom : même projection en liste et en détail
#[derive(Debug, Serialize)]
pub struct TechnologyResponse {
    pub id: i32,
    pub name: String,
}

impl From<technology::Model> for TechnologyResponse {
    fn from(model: technology::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TechnologyInput {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
}
