//! Folding repeated report blocks into one logical section.
//!
//! Some reports repeat the same table for successive date ranges as separate
//! blocks on one sheet. Sections sharing a [`MergeKey`] are folded into the
//! first occurrence: row counts add up and column samples are merged, while
//! the row range of the first block is kept as is.

use crate::column::{merge_sample_strings, ColumnInfo, DataType, DEFAULT_MAX_SAMPLES};
use crate::section::Section;
use indexmap::IndexMap;
use tracing::debug;

/// Equivalence key deciding which sections are the same logical table.
pub trait MergeKey {
    /// `None` means the section is never merged.
    fn key(&self, section: &Section) -> Option<String>;
}

impl<F> MergeKey for F
where
    F: Fn(&Section) -> Option<String>,
{
    fn key(&self, section: &Section) -> Option<String> {
        self(section)
    }
}

/// Handover report blocks: the title mentions HANDOVER and (NON) CROSS
/// SELLING; the key is the upper-cased title plus the joined headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandoverKey;

impl MergeKey for HandoverKey {
    fn key(&self, section: &Section) -> Option<String> {
        let title = section.title.trim().to_uppercase();
        if !title.contains("HANDOVER") {
            return None;
        }
        if !(title.contains("CROSS SELLING") || title.contains("NON CROSS SELLING")) {
            return None;
        }
        Some(format!("{}|{}", title, section.headers.join("|")))
    }
}

/// Merge handover report blocks with the default sample cap.
pub fn merge_report_sections(sections: Vec<Section>) -> Vec<Section> {
    merge_sections_with(sections, &HandoverKey, DEFAULT_MAX_SAMPLES)
}

/// Merge sections sharing a key; unkeyed sections pass through in order.
pub fn merge_sections_with(
    sections: Vec<Section>,
    key: &dyn MergeKey,
    max_samples: usize,
) -> Vec<Section> {
    let mut merged: Vec<Section> = Vec::with_capacity(sections.len());
    let mut index_by_key: IndexMap<String, usize> = IndexMap::new();
    for section in sections {
        let Some(k) = key.key(&section) else {
            merged.push(section);
            continue;
        };
        match index_by_key.get(&k) {
            Some(&pos) => {
                let base = &mut merged[pos];
                debug!(
                    title = %base.title,
                    header_row = section.header_row,
                    "folding repeated section"
                );
                base.row_count += section.row_count;
                merge_column_samples(&mut base.columns, &section.columns, max_samples);
            }
            None => {
                index_by_key.insert(k, merged.len());
                merged.push(section);
            }
        }
    }
    merged
}

/// Merge samples pairwise by column position.
pub fn merge_column_samples(base: &mut [ColumnInfo], incoming: &[ColumnInfo], max_samples: usize) {
    for (base_col, incoming_col) in base.iter_mut().zip(incoming) {
        if base_col.data_type == DataType::Empty && incoming_col.data_type != DataType::Empty {
            base_col.data_type = incoming_col.data_type;
        }
        merge_sample_strings(
            &mut base_col.sample_values,
            &incoming_col.sample_values,
            max_samples,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::SheetRows;
    use crate::section::{extract_sections, extract_sections_by_header_indexes};

    fn handover_sheet() -> SheetRows {
        SheetRows::from_data(vec![
            vec!["1-7 Jan", "HANDOVER CROSS SELLING"],
            vec!["MERK", "TYPE", "YEAR"],
            vec!["Toyota", "Avanza", "2020"],
            vec!["Honda", "Jazz", "2019"],
            vec![],
            vec!["8-14 Jan", "HANDOVER CROSS SELLING"],
            vec!["MERK", "TYPE", "YEAR"],
            vec!["Toyota", "Rush", "2021"],
            vec!["Suzuki", "Ertiga", ""],
            vec!["Daihatsu", "Xenia", "2018"],
            vec![],
            vec!["Stock"],
            vec!["MERK", "TYPE", "YEAR"],
            vec!["Mazda", "CX-5", "2022"],
        ])
    }

    #[test]
    fn test_handover_blocks_fold_into_first() {
        let rows = handover_sheet();
        let raw = extract_sections_by_header_indexes(&rows, &[1, 6, 12]);
        assert_eq!(raw.len(), 3);
        // titles differ by date range, so nothing folds yet
        assert_eq!(merge_report_sections(raw.clone()).len(), 3);

        let same_title: Vec<Section> = raw
            .into_iter()
            .map(|mut s| {
                if s.title.contains("HANDOVER") {
                    s.title = "HANDOVER CROSS SELLING".to_string();
                }
                s
            })
            .collect();
        let first = same_title[0].clone();
        let second_count = same_title[1].row_count;
        let merged = merge_report_sections(same_title);

        assert_eq!(merged.len(), 2);
        let handover = &merged[0];
        assert_eq!(handover.row_count, first.row_count + second_count);
        assert_eq!((handover.start_row, handover.end_row), (first.start_row, first.end_row));
        assert_eq!((first.row_count, second_count), (4, 5));
        // the title row of a following block still belongs to the block above
        assert_eq!(
            handover.columns[0].sample_values,
            vec!["Toyota", "Honda", "8-14 Jan", "Suzuki", "Daihatsu"]
        );
        assert_eq!(
            handover.columns[1].sample_values,
            vec!["Avanza", "Jazz", "HANDOVER CROSS SELLING", "Rush", "Ertiga"]
        );
        assert_eq!(merged[1].title, "Stock");
    }

    #[test]
    fn test_merged_samples_have_no_duplicates() {
        let rows = handover_sheet();
        let sections: Vec<Section> = extract_sections(&rows)
            .into_iter()
            .chain(extract_sections(&rows))
            .collect();
        for section in merge_report_sections(sections) {
            for column in &section.columns {
                assert!(column.sample_values.len() <= DEFAULT_MAX_SAMPLES);
                let mut seen = column.sample_values.clone();
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), column.sample_values.len());
            }
        }
    }

    #[test]
    fn test_merge_fills_missing_type() {
        let mut base = vec![ColumnInfo::default()];
        let incoming = vec![ColumnInfo {
            sample_values: vec!["12".to_string()],
            data_type: DataType::Number,
            ..ColumnInfo::default()
        }];
        merge_column_samples(&mut base, &incoming, 5);
        assert_eq!(base[0].data_type, DataType::Number);
        assert_eq!(base[0].sample_values, vec!["12"]);
    }

    #[test]
    fn test_custom_merge_key() {
        let sections = vec![
            Section {
                title: "A".to_string(),
                row_count: 2,
                ..Section::default()
            },
            Section {
                title: "a".to_string(),
                row_count: 3,
                ..Section::default()
            },
            Section {
                title: "B".to_string(),
                row_count: 1,
                ..Section::default()
            },
        ];
        let by_title = |s: &Section| Some(s.title.to_uppercase());
        let merged = merge_sections_with(sections, &by_title, 5);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].row_count, 5);
        assert_eq!(merged[1].title, "B");
    }

    #[test]
    fn test_non_handover_titles_pass_through() {
        let section = Section {
            title: "CROSS SELLING".to_string(),
            ..Section::default()
        };
        assert_eq!(HandoverKey.key(&section), None);
        let merged = merge_report_sections(vec![section.clone(), section]);
        assert_eq!(merged.len(), 2);
    }
}
