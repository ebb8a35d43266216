use crate::validation::{check_email, check_phone, supplied};
use crate::{DomainError, Record, RecordId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const MISSING_CUSTOMER_FIELDS: &str = "Nome, telefone e email são obrigatórios";

/// A registered customer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Customer {
    id: RecordId,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "telefone")]
    phone: String,
    email: String,
    /// Set once at creation with millisecond precision, never updated.
    #[serde(rename = "dataCadastro")]
    registered_at: DateTime<Utc>,
}

/// Body of `POST /clientes`.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CustomerDraft {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Body of `PUT /clientes/:id`.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CustomerPatch {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    fn fixture(id: u64, name: &str, phone: &str, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            registered_at: now,
        }
    }
}

/// Millisecond precision, the resolution of the timestamps clients already parse.
fn registration_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Record for Customer {
    type Draft = CustomerDraft;
    type Patch = CustomerPatch;

    const LABEL: &'static str = "Cliente";
    const SERVICE_NAME: &'static str = "Clientes";
    const COLLECTION: &'static str = "clientes";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: CustomerDraft) -> Result<Self, DomainError> {
        let (Some(name), Some(phone), Some(email)) = (
            supplied(draft.name),
            supplied(draft.phone),
            supplied(draft.email),
        ) else {
            return Err(DomainError::MissingFields(
                MISSING_CUSTOMER_FIELDS.to_string(),
            ));
        };
        check_phone(&phone)?;
        check_email(&email)?;

        Ok(Self {
            id,
            name,
            phone,
            email,
            registered_at: registration_time(),
        })
    }

    fn apply_patch(&mut self, patch: CustomerPatch) -> Result<(), DomainError> {
        let name = supplied(patch.name);
        let phone = supplied(patch.phone);
        let email = supplied(patch.email);

        if let Some(phone) = &phone {
            check_phone(phone)?;
        }
        if let Some(email) = &email {
            check_email(email)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(email) = email {
            self.email = email;
        }
        Ok(())
    }

    fn seed_records() -> Vec<Self> {
        let now = registration_time();
        vec![
            Self::fixture(1, "João", "(11) 91234-5678", "joao@example.com", now),
            Self::fixture(2, "Maria", "(21) 99876-5432", "maria@example.com", now),
        ]
    }
}
