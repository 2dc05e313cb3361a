use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::HrmError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
}

impl Employee {
    /// Full name, used as the lookup key when booking leave.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Payload for creating or replacing an employee.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
}

impl NewEmployee {
    /// Trims every field and checks the required ones.
    pub fn normalized(self) -> Result<Self, HrmError> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = self.email.trim().to_string();
        let phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(HrmError::InvalidEmployee {
                reason: "first_name, last_name and email are required",
            });
        }
        if !email.contains('@') {
            return Err(HrmError::InvalidEmployee {
                reason: "email must be a valid address",
            });
        }

        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
        })
    }
}
