use crate::error::{
    MIN_ENTRIES,
    Result,
    WheelError,
};

pub const DEFAULT_ENTRIES: [&str; 4] = ["Prize 1", "Prize 2", "Prize 3", "Prize 4"];

/// Ordered wheel entries. Order defines sector order; duplicates are allowed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryList {
    entries: Vec<String>,
}

impl Default for EntryList {
    fn default() -> Self {
        EntryList {
            entries: DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EntryList {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| validate(e.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if entries.len() < MIN_ENTRIES {
            return Err(WheelError::MinimumEntries { min: MIN_ENTRIES });
        }
        Ok(EntryList { entries })
    }

    /// Appends the trimmed text. Blank input is rejected.
    pub fn add(&mut self, text: &str) -> Result<()> {
        let entry = validate(text)?;
        tracing::debug!(entry = %entry, position = self.entries.len(), "entry added");
        self.entries.push(entry);
        Ok(())
    }

    /// Removes and returns the entry at `index`, keeping the rest in order.
    pub fn remove(&mut self, index: usize) -> Result<String> {
        if self.entries.len() <= MIN_ENTRIES {
            return Err(WheelError::MinimumEntries { min: MIN_ENTRIES });
        }
        if index >= self.entries.len() {
            return Err(WheelError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        tracing::debug!(entry = %removed, index, "entry removed");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.clone()
    }
}

fn validate(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WheelError::EmptyEntry);
    }
    Ok(trimmed.to_string())
}
