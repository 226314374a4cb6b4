//! Popup field configuration and per-record resolution.
//!
//! Fields are either a fixed ordered list of label/selector pairs (config)
//! or a callback computing rows from the record (programmatic hosts). Rows
//! are resolved once per result and never cached across results.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::parcel::{ParcelRecord, NOT_AVAILABLE};

/// One resolved label/value row of a parcel popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupRow {
    pub label: String,
    pub value: String,
    /// Unit suffix rendered after the value, e.g. `ha`
    pub suffix: Option<String>,
}

impl PopupRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

/// Record field addressable from static popup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParcelField {
    Provincia,
    Municipio,
    Zona,
    Poligono,
    Parcela,
    Recinto,
    Uso,
    Superficie,
    Pendiente,
    Regadio,
    Incidencias,
    Admisibilidad,
}

impl ParcelField {
    /// Value of this field on a record, sentinel for absent identifiers.
    pub fn value_of(&self, record: &ParcelRecord) -> String {
        match self {
            ParcelField::Provincia => record.provincia.clone(),
            ParcelField::Municipio => record.municipio.clone(),
            ParcelField::Zona => record.zona.to_string(),
            ParcelField::Poligono => pass_through(&record.poligono),
            ParcelField::Parcela => pass_through(&record.parcela),
            ParcelField::Recinto => pass_through(&record.recinto),
            ParcelField::Uso => record.uso.clone(),
            ParcelField::Superficie => record.superficie.clone(),
            ParcelField::Pendiente => record.pendiente.clone(),
            ParcelField::Regadio => record.regadio.clone(),
            ParcelField::Incidencias => record.incidencias.clone(),
            ParcelField::Admisibilidad => record.admisibilidad.clone(),
        }
    }
}

fn pass_through(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Static popup field spec: display label plus field selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupFieldSpec {
    pub label: String,
    pub field: ParcelField,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Popup field configuration.
#[derive(Clone)]
pub enum PopupFields {
    /// Fixed ordered list from configuration
    Static(Vec<PopupFieldSpec>),
    /// Callback computing rows per record
    Dynamic(Arc<dyn Fn(&ParcelRecord) -> Vec<PopupRow> + Send + Sync>),
}

impl fmt::Debug for PopupFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupFields::Static(specs) => f.debug_tuple("Static").field(specs).finish(),
            PopupFields::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl Default for PopupFields {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PopupFields {
    /// Built-in field list used when no configuration is supplied.
    pub fn builtin() -> Self {
        let spec = |label: &str, field: ParcelField| PopupFieldSpec {
            label: label.to_string(),
            field,
            suffix: None,
        };
        PopupFields::Static(vec![
            spec("Province:", ParcelField::Provincia),
            spec("Municipality:", ParcelField::Municipio),
            spec("Polygon:", ParcelField::Poligono),
            spec("Parcel:", ParcelField::Parcela),
            spec("Enclosure:", ParcelField::Recinto),
            spec("Use:", ParcelField::Uso),
            PopupFieldSpec {
                label: "Surface:".to_string(),
                field: ParcelField::Superficie,
                suffix: Some("ha".to_string()),
            },
        ])
    }

    /// Resolve rows for one record.
    pub fn resolve(&self, record: &ParcelRecord) -> Vec<PopupRow> {
        match self {
            PopupFields::Static(specs) => specs
                .iter()
                .map(|spec| PopupRow {
                    label: spec.label.clone(),
                    value: spec.field.value_of(record),
                    suffix: spec.suffix.clone(),
                })
                .collect(),
            PopupFields::Dynamic(resolver) => resolver(record),
        }
    }
}
