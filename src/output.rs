use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::pipeline::ExtractReport;
use crate::resource::NormalizedResource;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "TYPE")]
    resource_type: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "PARENT")]
    parent: String,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "RESOURCE TYPE")]
    resource_type: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "MATCHED")]
    matched: usize,
    #[tabled(rename = "EMITTED")]
    emitted: usize,
    #[tabled(rename = "FAILED")]
    failed: usize,
}

pub fn records_table(records: &[NormalizedResource]) -> String {
    let rows = records.iter().map(|r| RecordRow {
        resource_type: r.resource_type.clone(),
        name: r.name.clone(),
        id: r.id.clone(),
        parent: r.parent.clone().unwrap_or_else(|| "-".to_string()),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn reports_table(reports: &[ExtractReport]) -> String {
    let rows = reports.iter().map(|r| ReportRow {
        resource_type: r.resource_type.clone(),
        source: r.source_id.clone().unwrap_or_else(|| "-".to_string()),
        matched: r.matched,
        emitted: r.emitted.len(),
        failed: r.failed,
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Groups records under their parent source resource. Records without a
/// parent hang off an `(unlinked)` root.
pub fn lineage_tree(records: &[NormalizedResource]) -> String {
    let mut roots: Vec<Tree<String>> = Vec::new();

    for record in records {
        let root_label = record
            .parent
            .clone()
            .unwrap_or_else(|| "(unlinked)".to_string());
        let leaf = Tree::new(record.human_description.clone());

        match roots.iter_mut().find(|t| t.root == root_label) {
            Some(root) => {
                root.push(leaf);
            }
            None => roots.push(Tree::new(root_label).with_leaves([leaf])),
        }
    }

    roots
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("")
}
