use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One entry of the species list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: u32,
    pub name: String,
}

/// Raw species.json file format
#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[allow(dead_code)]
    version: String,
    species: Vec<SpeciesData>,
}

/// Canonical creature names that OCR output is matched against.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    names: Vec<String>,
    /// letters-only lowercase key -> index into `names`
    by_key: HashMap<String, usize>,
}

impl SpeciesCatalog {
    /// Load the species list from `data_dir/species.json`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let species_path = data_dir.join("species.json");
        if !species_path.exists() {
            tracing::warn!(
                "No species.json found at {}. Name matching disabled",
                species_path.display()
            );
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&species_path).context("Failed to read species.json")?;
        let file: SpeciesFile =
            serde_json::from_str(&content).context("Failed to parse species.json")?;

        let catalog = Self::from_names(file.species.into_iter().map(|s| s.name));
        tracing::info!("Loaded {} species", catalog.len());
        Ok(catalog)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.into();
            let key = match_key(&name);
            if key.is_empty() || catalog.by_key.contains_key(&key) {
                continue;
            }
            catalog.by_key.insert(key, catalog.names.len());
            catalog.names.push(name);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_key.contains_key(&match_key(name))
    }

    /// Find the canonical name for a (possibly noisy) OCR string.
    ///
    /// Exact case-insensitive match on letters first, then the closest name
    /// within `max_distance` edits. Ties keep the earlier catalog entry.
    pub fn best_match(&self, raw: &str, max_distance: usize) -> Option<&str> {
        let key = match_key(raw);
        if key.is_empty() {
            return None;
        }
        if let Some(&idx) = self.by_key.get(&key) {
            return Some(&self.names[idx]);
        }

        let mut best: Option<(usize, usize)> = None;
        for (idx, name) in self.names.iter().enumerate() {
            let d = levenshtein(&key, &match_key(name));
            if d <= max_distance && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| self.names[idx].as_str())
    }
}

/// Lowercase alphabetic characters only ("Mr. Mime" -> "mrmime").
fn match_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
