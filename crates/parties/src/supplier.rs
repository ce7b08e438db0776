use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, DomainResult, Entity, SupplierId};

pub const MAX_NAME_LEN: usize = 20;
pub const MAX_COMPANY_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 15;

/// The four mutable supplier fields. Creation and update both take a full set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDetails {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl SupplierDetails {
    /// Trim every field and check lengths and email syntax.
    pub fn validated(self) -> DomainResult<Self> {
        let details = Self {
            name: self.name.trim().to_string(),
            company: self.company.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };

        check_text("name", &details.name, MAX_NAME_LEN)?;
        check_text("company", &details.company, MAX_COMPANY_LEN)?;
        check_text("email", &details.email, MAX_EMAIL_LEN)?;
        check_text("phone", &details.phone, MAX_PHONE_LEN)?;

        if !is_valid_email(&details.email) {
            return Err(DomainError::validation(format!(
                "email '{}' is not a valid address",
                details.email
            )));
        }

        Ok(details)
    }
}

fn check_text(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Syntactic address check (`local@domain.tld`). Deliverability is not checked.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Supplier entity. Products reference suppliers but are not owned by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl Supplier {
    pub fn new(id: SupplierId, details: SupplierDetails) -> Self {
        Self {
            id,
            name: details.name,
            company: details.company,
            email: details.email,
            phone: details.phone,
        }
    }

    /// Replace all four mutable fields at once.
    pub fn replace_details(&self, details: SupplierDetails) -> Self {
        Self::new(self.id, details)
    }

    pub fn details(&self) -> SupplierDetails {
        SupplierDetails {
            name: self.name.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl Entity for Supplier {
    type Id = SupplierId;
    const KIND: &'static str = "supplier";

    fn id(&self) -> Self::Id {
        self.id
    }
}
