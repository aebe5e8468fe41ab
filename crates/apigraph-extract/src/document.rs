//! The extraction output handed to renderers.

use crate::ids::SymbolId;
use crate::serialized::SerializedSymbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A symbol's home: the module export that renders it in full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalExportLocation {
    pub export_name: String,
    pub parent: SymbolId,
}

/// Where an external symbol is documented.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSymbolLink {
    pub pkg: String,
    pub version: String,
    pub id: SymbolId,
}

/// Everything extracted from one package. Maps are sorted by key, so the
/// JSON form is byte-identical for unchanged input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsDocument {
    pub package_name: String,
    pub current_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
    pub root_symbols: Vec<SymbolId>,
    pub accessible_symbols: BTreeMap<SymbolId, SerializedSymbol>,
    /// Symbol → symbols whose serialization mentions it.
    pub symbol_references: BTreeMap<SymbolId, Vec<SymbolId>>,
    pub canonical_export_locations: BTreeMap<SymbolId, CanonicalExportLocation>,
    pub good_identifiers: BTreeMap<SymbolId, String>,
    /// Owner → symbols rendered inline beneath it.
    pub symbols_for_inner_bit: BTreeMap<SymbolId, Vec<SymbolId>>,
    pub external_symbols: BTreeMap<SymbolId, ExternalSymbolLink>,
}

impl DocsDocument {
    pub fn symbol(&self, id: &SymbolId) -> Option<&SerializedSymbol> {
        self.accessible_symbols.get(id)
    }

    /// Accessible symbols with the given declared name, in id order.
    pub fn symbols_named<'d>(
        &'d self,
        name: &str,
    ) -> impl Iterator<Item = (&'d SymbolId, &'d SerializedSymbol)> + use<'d> {
        let name = name.to_string();
        self.accessible_symbols
            .iter()
            .filter(move |(_, symbol)| symbol.name() == name)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> SerializedSymbol {
        SerializedSymbol::Variable {
            name: name.to_string(),
            docs: None,
            variable_kind: crate::serialized::VariableKindName::Const,
            ty: crate::serialized::SerializedType::intrinsic("number"),
        }
    }

    fn first_named<'d>(doc: &'d DocsDocument, name: &str) -> Option<&'d SymbolId> {
        doc.symbols_named(name).map(|(id, _)| id).next()
    }

    #[test]
    fn name_lookups_outlive_the_query_string() {
        let mut accessible_symbols = BTreeMap::new();
        accessible_symbols.insert(SymbolId::new("a.ts:13"), variable("a"));
        accessible_symbols.insert(SymbolId::new("b.ts:13"), variable("b"));
        let doc = DocsDocument {
            package_name: "pkg".to_string(),
            current_version: "1.0.0".to_string(),
            versions: None,
            root_symbols: Vec::new(),
            accessible_symbols,
            symbol_references: BTreeMap::new(),
            canonical_export_locations: BTreeMap::new(),
            good_identifiers: BTreeMap::new(),
            symbols_for_inner_bit: BTreeMap::new(),
            external_symbols: BTreeMap::new(),
        };

        let found = first_named(&doc, &String::from("b"));
        assert_eq!(found, Some(&SymbolId::new("b.ts:13")));
        assert_eq!(first_named(&doc, "c"), None);
    }
}
