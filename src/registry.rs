//! Ordered name-to-function storage shared by the filter and sort registries.
//!
//! Iteration order is insertion order. Re-registering an existing name replaces
//! the function but keeps the entry where it was first inserted, which is what
//! decides when the `order_by` filter runs relative to the others.

use indexmap::IndexMap;

use crate::errors::FilterError;

/// Name-keyed functions in insertion order
#[derive(Debug, Clone)]
pub struct NamedRegistry<F> {
    entries: IndexMap<String, F>,
}

impl<F> Default for NamedRegistry<F> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

/// Names must contain something other than whitespace
pub(crate) fn validate_name(name: &str) -> Result<(), FilterError> {
    if name.trim().is_empty() {
        return Err(FilterError::InvalidName);
    }
    Ok(())
}

impl<F> NamedRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `name`.
    ///
    /// A new name is appended; an existing name keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidName`] if `name` is empty or whitespace.
    pub fn register(&mut self, name: impl Into<String>, function: F) -> Result<(), FilterError> {
        let name = name.into();
        validate_name(&name)?;
        self.entries.insert(name, function);
        Ok(())
    }

    /// Insert or overwrite the entry for `name`, moving it to the end.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidName`] if `name` is empty or whitespace.
    pub fn register_last(
        &mut self,
        name: impl Into<String>,
        function: F,
    ) -> Result<(), FilterError> {
        let name = name.into();
        validate_name(&name)?;
        self.entries.shift_remove(&name);
        self.entries.insert(name, function);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&F> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in iteration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Position of `name` in iteration order
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &F)> {
        self.entries.iter().map(|(name, function)| (name.as_str(), function))
    }
}

impl<F: Clone> NamedRegistry<F> {
    /// Owned copy of every entry in iteration order
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, F)> {
        self.entries
            .iter()
            .map(|(name, function)| (name.clone(), function.clone()))
            .collect()
    }

    /// Like [`snapshot`](Self::snapshot), with the entry for `name` swapped for `function`.
    ///
    /// The registry itself is left unchanged. If `name` is absent, `function` is dropped.
    #[must_use]
    pub fn snapshot_with(&self, name: &str, function: F) -> Vec<(String, F)> {
        let mut replacement = Some(function);
        self.entries
            .iter()
            .map(|(key, existing)| {
                let swapped = if key == name { replacement.take() } else { None };
                (key.clone(), swapped.unwrap_or_else(|| existing.clone()))
            })
            .collect()
    }
}
