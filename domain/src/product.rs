use crate::validation::supplied;
use crate::{DomainError, Record, RecordId};
use serde::{Deserialize, Serialize};

pub const MISSING_PRODUCT_FIELDS: &str = "Nome, descrição e valor são obrigatórios";
pub const NON_POSITIVE_PRICE: &str = "Valor deve ser maior que zero";
pub const PRICE_NOT_A_NUMBER: &str = "Valor deve ser um número";

/// A catalog entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    id: RecordId,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "valor")]
    price: f64,
}

/// Price as sent by clients: a JSON number or a numeric string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Zero and empty text are treated as an absent price.
    fn is_supplied(&self) -> bool {
        match self {
            PriceInput::Number(n) => *n != 0.0,
            PriceInput::Text(text) => !text.is_empty(),
        }
    }

    fn resolve(self) -> Result<f64, DomainError> {
        let value = match self {
            PriceInput::Number(n) => n,
            PriceInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| DomainError::invalid_field("valor", PRICE_NOT_A_NUMBER))?,
        };
        if !value.is_finite() {
            return Err(DomainError::invalid_field("valor", PRICE_NOT_A_NUMBER));
        }
        if value <= 0.0 {
            return Err(DomainError::invalid_field("valor", NON_POSITIVE_PRICE));
        }
        Ok(value)
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

/// Body of `POST /produtos`.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProductDraft {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "valor")]
    pub price: Option<PriceInput>,
}

/// Body of `PUT /produtos/:id`.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProductPatch {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "valor")]
    pub price: Option<PriceInput>,
}

impl Product {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    fn fixture(id: u64, name: &str, description: &str, price: f64) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

impl Record for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const LABEL: &'static str = "Produto";
    const SERVICE_NAME: &'static str = "Produtos";
    const COLLECTION: &'static str = "produtos";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: ProductDraft) -> Result<Self, DomainError> {
        let (Some(name), Some(description), Some(price)) = (
            supplied(draft.name),
            supplied(draft.description),
            draft.price.filter(PriceInput::is_supplied),
        ) else {
            return Err(DomainError::MissingFields(
                MISSING_PRODUCT_FIELDS.to_string(),
            ));
        };
        let price = price.resolve()?;

        Ok(Self {
            id,
            name,
            description,
            price,
        })
    }

    fn apply_patch(&mut self, patch: ProductPatch) -> Result<(), DomainError> {
        let price = patch
            .price
            .filter(PriceInput::is_supplied)
            .map(PriceInput::resolve)
            .transpose()?;

        if let Some(name) = supplied(patch.name) {
            self.name = name;
        }
        if let Some(description) = supplied(patch.description) {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        Ok(())
    }

    fn seed_records() -> Vec<Self> {
        vec![
            Self::fixture(1, "Notebook Dell", "Notebook Dell Inspiron 15", 2500.00),
            Self::fixture(2, "Mouse Logitech", "Mouse sem fio Logitech MX", 150.00),
            Self::fixture(3, "Teclado Mecânico", "Teclado mecânico RGB", 300.00),
            Self::fixture(4, "Camiseta", "Camiseta básica de algodão", 50.00),
            Self::fixture(5, "Boné", "Boné estiloso com aba curva", 30.00),
        ]
    }
}
