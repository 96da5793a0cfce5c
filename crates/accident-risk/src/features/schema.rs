use std::collections::HashMap;

/// Ordered feature names the classifier was trained against.
///
/// Positions are fixed by the training pipeline; the encoder only ever writes
/// into slots it can find here by name.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    positions: HashMap<String, Vec<usize>>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        let mut positions: HashMap<String, Vec<usize>> = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_default().push(index);
        }
        Self { names, positions }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Every slot carrying `name`; empty when the schema does not know it.
    pub fn positions(&self, name: &str) -> &[usize] {
        self.positions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl From<Vec<String>> for FeatureSchema {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl<'a> FromIterator<&'a str> for FeatureSchema {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(str::to_string).collect())
    }
}
