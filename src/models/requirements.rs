// Material requirements loaded from the delimited requirements file
use std::fs;
use std::path::Path;

use crate::error::{TrackerError, TrackerResult};

/// Normalized form used for every material comparison
pub fn normalize_material(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Ordered material id -> required quantity mapping, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRequirements {
    entries: Vec<(String, u64)>,
}

impl MaterialRequirements {
    /// Insert a requirement; a repeated material keeps its first position and
    /// takes the latest quantity.
    pub fn insert(&mut self, material: &str, quantity: u64) {
        let material = normalize_material(material);
        match self.entries.iter_mut().find(|(name, _)| *name == material) {
            Some(entry) => entry.1 = quantity,
            None => self.entries.push((material, quantity)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, qty)| (name.as_str(), *qty))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load(
        path: impl AsRef<Path>,
        delimiter: char,
        material_column: &str,
        quantity_column: &str,
    ) -> TrackerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TrackerError::MalformedInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, delimiter, material_column, quantity_column)
    }

    /// Parse delimited text with a header row naming the two columns.
    pub fn parse(
        content: &str,
        delimiter: char,
        material_column: &str,
        quantity_column: &str,
    ) -> TrackerResult<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| TrackerError::MalformedInput("file is empty".to_string()))?;
        // Spreadsheet exports often start with a UTF-8 BOM
        let header: Vec<String> = header
            .trim_start_matches('\u{feff}')
            .split(delimiter)
            .map(|col| col.trim().to_lowercase())
            .collect();

        let find_column = |wanted: &str| {
            let wanted = wanted.trim().to_lowercase();
            header.iter().position(|col| *col == wanted).ok_or_else(|| {
                TrackerError::MalformedInput(format!(
                    "missing column '{}' (found: {})",
                    wanted,
                    header.join(", ")
                ))
            })
        };
        let material_idx = find_column(material_column)?;
        let quantity_idx = find_column(quantity_column)?;

        let mut requirements = Self::default();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(delimiter).collect();
            let material = fields.get(material_idx).map(|f| f.trim()).unwrap_or("");
            let quantity = fields.get(quantity_idx).map(|f| f.trim()).unwrap_or("");

            if material.is_empty() {
                return Err(TrackerError::MalformedInput(format!(
                    "line {}: empty material name",
                    line_no + 1
                )));
            }
            let quantity: u64 = quantity.parse().map_err(|_| {
                TrackerError::MalformedInput(format!(
                    "line {}: quantity '{}' for {} is not a non-negative integer",
                    line_no + 1,
                    quantity,
                    material
                ))
            })?;

            requirements.insert(material, quantity);
        }

        Ok(requirements)
    }
}

impl FromIterator<(String, u64)> for MaterialRequirements {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut requirements = Self::default();
        for (material, quantity) in iter {
            requirements.insert(&material, quantity);
        }
        requirements
    }
}
