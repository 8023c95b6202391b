use crate::model::CompanyRecord;
use serde::Serialize;
use std::collections::HashMap;

/// The 20-color qualitative "tab20" palette.
pub const TAB20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Group name to display color, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorAssignment {
    entries: Vec<(String, String)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ColorAssignment {
    pub fn get(&self, group: &str) -> Option<&str> {
        self.index
            .get(group)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(group, color)| (group.as_str(), color.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, group: &str) {
        if self.index.contains_key(group) {
            return;
        }
        let color = TAB20[self.entries.len() % TAB20.len()];
        self.index.insert(group.to_string(), self.entries.len());
        self.entries.push((group.to_string(), color.to_string()));
    }
}

/// Assigns palette colors to unique company groups. Groups beyond the
/// palette size wrap around and share colors.
pub fn assign_colors(companies: &[CompanyRecord]) -> ColorAssignment {
    let mut colors = ColorAssignment::default();
    for company in companies {
        colors.push(&company.group);
    }
    colors
}
