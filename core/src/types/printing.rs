use std::fmt;

use serde_json::Value;

use crate::container::{FromValue, GenericContainer, RawMap};
use crate::entity::{put, put_list, put_opt, RequestEntity};
use crate::error::MappingError;
use crate::instantiator::ResponseEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelFormat {
    #[default]
    Pdf,
    /// Raw printer language for thermal label printers.
    Zpl,
}

impl LabelFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelFormat::Pdf => "pdf",
            LabelFormat::Zpl => "zpl",
        }
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromValue for LabelFormat {
    const NAME: &'static str = "label format";

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()?.to_ascii_lowercase().as_str() {
            "pdf" => Some(LabelFormat::Pdf),
            "zpl" => Some(LabelFormat::Zpl),
            _ => None,
        }
    }
}

/// Shipping labels for one or more orders.
#[derive(Debug, Clone, Default)]
pub struct PrintRequest {
    extra: RawMap,
    order_ids: Vec<String>,
    format: LabelFormat,
    copies: Option<u32>,
}

impl PrintRequest {
    pub fn new<I, S>(order_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_ids: order_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn set_format(&mut self, format: LabelFormat) -> &mut Self {
        self.format = format;
        self
    }

    pub fn set_copies(&mut self, copies: u32) -> &mut Self {
        self.copies = Some(copies.max(1));
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl RequestEntity for PrintRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put_list(&mut map, "orderIds", &self.order_ids);
        put(&mut map, "format", self.format.as_str());
        put_opt(&mut map, "copies", self.copies);
        map
    }
}

#[derive(Debug, Clone)]
pub struct PrintResponse {
    format: LabelFormat,
    content: String,
    pages: Option<u32>,
    raw: GenericContainer,
}

impl PrintResponse {
    pub fn format(&self) -> LabelFormat {
        self.format
    }

    /// Base64-encoded document as returned by the provider.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn pages(&self) -> Option<u32> {
        self.pages
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for PrintResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            format: raw.get_as("format")?.unwrap_or_default(),
            content: raw.require("content")?,
            pages: raw.get_as("pages")?,
            raw,
        })
    }
}
