// Mon Oct 19 2026 - Alex

use crate::memory::Address;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub address: Address,
    pub name: String,
}

/// Symbols in insertion order. A repeated name never replaces the first entry.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, address: Address, name: String) {
        let index = self.symbols.len();
        self.by_name.entry(name.clone()).or_insert(index);
        self.symbols.push(Symbol { address, name });
    }

    pub fn find(&self, name: &str) -> Option<Address> {
        self.by_name.get(name).map(|&i| self.symbols[i].address)
    }

    pub fn find_by_address(&self, address: Address) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.address == address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_wins() {
        let mut table = SymbolTable::new();
        table.add(Address::new(0x10), "dup".to_string());
        table.add(Address::new(0x20), "other".to_string());
        table.add(Address::new(0x30), "dup".to_string());

        assert_eq!(table.len(), 3);
        assert_eq!(table.find("dup"), Some(Address::new(0x10)));
        assert_eq!(table.find("Dup"), None);
        assert_eq!(table.find_by_address(Address::new(0x20)).map(|s| s.name.as_str()), Some("other"));
        let names: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["dup", "other", "dup"]);
    }
}
