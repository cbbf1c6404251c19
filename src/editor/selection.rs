use std::collections::BTreeSet;

/// Indices into the editor's placed object list.
///
/// Constructed through [`Selection::from_indices`], which keeps a one-element set in
/// `Single` form and an empty set as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(usize),
    Multi(BTreeSet<usize>),
}

impl Selection {
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: BTreeSet<usize> = indices.into_iter().collect();
        match indices.len() {
            0 => Selection::None,
            1 => indices.pop_first().map_or(Selection::None, Selection::Single),
            _ => Selection::Multi(indices),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn single(&self) -> Option<usize> {
        match self {
            Selection::Single(index) => Some(*index),
            _ => None,
        }
    }

    /// Selected indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(index) => vec![*index],
            Selection::Multi(indices) => indices.iter().copied().collect(),
        }
    }
}
