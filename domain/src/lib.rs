use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error; // For domain-specific errors

pub mod customer;
pub mod product;
pub mod validation;

pub use customer::{Customer, CustomerDraft, CustomerPatch};
pub use product::{PriceInput, Product, ProductDraft, ProductPatch};

// --- Domain Errors ---
/// Validation failures. The display text is the message returned to API clients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    MissingFields(String),
    #[error("{message}")]
    InvalidField { field: String, message: String },
}

impl DomainError {
    pub fn invalid_field(field: &str, message: &str) -> Self {
        DomainError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

// --- Record ID ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Reads the leading integer of a path segment, ignoring anything after the digits
    /// (`"12abc"` is 12, `"0x1f"` is hexadecimal 31). Returns `None` when no id can ever
    /// match: no digits, a negative number or an overflowing one.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (radix, rest) = match rest.get(..2) {
            Some("0x" | "0X") => (16, &rest[2..]),
            _ => (10, rest),
        };
        let digits = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || (radix == 16 && b.is_ascii_hexdigit()))
            .count();
        if digits == 0 || negative {
            return None;
        }
        u64::from_str_radix(&rest[..digits], radix).ok().map(Self)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Record abstraction ---

/// A resource kept in a record collection. Each implementation carries its own
/// create payload (`Draft`), partial update payload (`Patch`) and validation rules.
pub trait Record: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    /// `Default` is the payload of a request that supplied no body.
    type Draft: DeserializeOwned + Default + fmt::Debug + Send + 'static;
    type Patch: DeserializeOwned + Default + fmt::Debug + Send + 'static;

    /// Singular label used in client messages ("Cliente").
    const LABEL: &'static str;
    /// Name of the owning service, reported by `/health` ("Clientes").
    const SERVICE_NAME: &'static str;
    /// Route segment of the collection ("clientes").
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;

    /// Validates a create payload and builds the record under the given id.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Result<Self, DomainError>;

    /// Applies the non-empty fields of `patch`. Every supplied field is validated
    /// before any is written, so an error leaves the record untouched.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<(), DomainError>;

    /// Fixture records a fresh service starts with.
    fn seed_records() -> Vec<Self>;

    fn not_found_message() -> String {
        format!("{} não encontrado", Self::LABEL)
    }

    fn created_message() -> String {
        format!("{} cadastrado com sucesso", Self::LABEL)
    }

    fn updated_message() -> String {
        format!("{} atualizado com sucesso", Self::LABEL)
    }

    fn deleted_message() -> String {
        format!("{} deletado com sucesso", Self::LABEL)
    }
}
