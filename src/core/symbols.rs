use std::{
    collections::{btree_map::Entry, BTreeMap},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use super::{error::ResolveError, tools::Toolchain};

lazy_static! {
    /// Global, local and weak text symbols from `nm -p`
    static ref SYMBOL_LINE: Regex =
        Regex::new(r"^(?P<address>[0-9A-Fa-f]+) [TtWw] (?P<name>.+)$").unwrap();
}

/// Function name to base address for one binary.
/// Addresses are kept as the hex text the lister printed.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    map: BTreeMap<String, String>,
}

impl SymbolTable {
    /// Build a table from a symbol listing, ignoring every line that is not a text symbol.
    /// When a name shows up twice the later entry wins.
    pub fn parse(listing: &str) -> Self {
        let map = listing
            .lines()
            .filter_map(|line| SYMBOL_LINE.captures(line))
            .map(|caps| (caps["name"].to_string(), caps["address"].to_string()))
            .collect();
        Self { map }
    }

    pub fn get(&self, function: &str) -> Option<&str> {
        self.map.get(function).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Either the binary's table or the message its listing failed with
pub type CacheEntry = Result<SymbolTable, String>;

/// Symbol tables for every binary seen during a run.
/// Each binary is listed at most once, failures included.
#[derive(Default, Debug)]
pub struct SymbolCache {
    entries: BTreeMap<PathBuf, CacheEntry>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the base address of `function` in `binary`.
    /// The returned address is hex without a `0x` prefix.
    pub fn resolve_function_address<T: Toolchain>(
        &mut self,
        tools: &mut T,
        binary: &Path,
        function: &str,
    ) -> Result<&str, ResolveError> {
        let entry = match self.entries.entry(binary.to_path_buf()) {
            Entry::Occupied(entry) => {
                trace!("symbol cache hit for {}", binary.display());
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Self::load(tools, binary)),
        };

        let table = entry
            .as_ref()
            .map_err(|msg| ResolveError::SymbolListing(msg.clone()))?;
        table
            .get(function)
            .ok_or_else(|| ResolveError::FunctionNotFound(binary.to_path_buf()))
    }

    fn load<T: Toolchain>(tools: &mut T, binary: &Path) -> CacheEntry {
        debug!("listing symbols of {}", binary.display());
        let output = tools.list_symbols(binary).map_err(|err| err.to_string())?;
        if !output.success {
            return Err(output.message());
        }

        let table = SymbolTable::parse(&output.stdout);
        if table.is_empty() {
            let msg = output.message();
            return Err(if msg.is_empty() {
                format!("No symbols found in {}", binary.display())
            } else {
                msg
            });
        }
        debug!("{} text symbols in {}", table.len(), binary.display());
        Ok(table)
    }

    pub fn get(&self, binary: &Path) -> Option<&CacheEntry> {
        self.entries.get(binary)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Path, &CacheEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_path(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
