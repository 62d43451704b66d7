use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, Options};
use sheetsense_core::{
    DataType, FileInfo, InspectOptions, Inspector, MemorySource, Progress, ProgressInfo,
};
use sheetsense_report::{render_json, render_markdown, summary_to_toon, CompactPayload};
use std::sync::mpsc::sync_channel;

#[derive(Debug)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn collect_tables<'a>(node: &'a AstNode<'a>, tables: &mut Vec<Table>) {
    for child in node.children() {
        if let NodeValue::Table(_) = child.data.borrow().value {
            let mut table = Table {
                headers: Vec::new(),
                rows: Vec::new(),
            };
            for row in child.children() {
                let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                let cells: Vec<String> = row.children().map(cell_text).collect();
                if is_header {
                    table.headers = cells;
                } else {
                    table.rows.push(cells);
                }
            }
            tables.push(table);
        } else {
            collect_tables(child, tables);
        }
    }
}

fn cell_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            _ => {}
        }
    }
    text
}

fn parse_tables(markdown: &str) -> Vec<Table> {
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.table = true;
    let root = parse_document(&arena, markdown, &options);
    let mut tables = Vec::new();
    collect_tables(root, &mut tables);
    tables
}

fn workbook() -> MemorySource {
    MemorySource::new()
        .with_sheet(
            "Stock",
            vec![
                vec!["Weekly", "HANDOVER CROSS SELLING"],
                vec!["MERK", "TYPE", "YEAR"],
                vec!["Toyota", "Avanza", "2020"],
                vec!["Honda", "Jazz|Fit", "2019"],
                vec![],
                vec!["Weekly", "HANDOVER CROSS SELLING"],
                vec!["MERK", "TYPE", "YEAR"],
                vec!["Suzuki", "Ertiga", "2021"],
            ],
        )
        .with_sheet("Solo", vec![vec!["NO", "STATUS", "AGING"]])
        .with_sheet("Notes", vec![vec!["Name", "Remark"], vec!["Ana", "x"]])
}

fn inspected(options: InspectOptions) -> (Inspector<MemorySource>, FileInfo) {
    let mut inspector = Inspector::with_options(workbook(), options);
    let info = inspector.inspect_with_details().unwrap();
    (inspector, info)
}

#[test]
fn test_summary_markdown() {
    let mut inspector = Inspector::new(workbook());
    let info = inspector.inspect().unwrap();
    let markdown = render_markdown(&mut inspector, &info, false).unwrap();

    assert!(markdown.starts_with("# Excel Inspect Report\n\n## Sheets\n\n"));
    assert!(!markdown.contains("## Sheet Details"));

    let tables = parse_tables(&markdown);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].headers, vec!["Name", "Rows", "Columns"]);
    assert_eq!(tables[0].rows[0], vec!["Stock", "8", "2"]);
    assert_eq!(tables[0].rows[2], vec!["Notes", "2", "2"]);
}

#[test]
fn test_detailed_markdown_tables() {
    let (mut inspector, info) = inspected(InspectOptions::default());
    let markdown = render_markdown(&mut inspector, &info, true).unwrap();

    assert!(markdown.contains("\n### Stock\n\n- Rows: 8\n- Columns: 3\n- Headers: 3\n"));
    assert!(markdown.contains("##### Section 1: Weekly HANDOVER CROSS SELLING\n"));
    assert!(markdown.contains("- Header row: 2\n- Start row: 3\n- End row: 6\n- Rows: 5\n"));
    assert!(markdown.contains("_No section rows found._"));

    let tables = parse_tables(&markdown);
    // sheets, Stock columns, Stock section, Solo columns, Notes columns
    assert_eq!(tables.len(), 5);

    let stock_columns = &tables[1];
    assert_eq!(stock_columns.headers, vec!["#", "Name", "Start", "Type", "Samples"]);
    assert_eq!(stock_columns.rows[0][..4], ["1", "MERK", "A2", "string"]);
    assert_eq!(stock_columns.rows[2][3], "number");

    let section = &tables[2];
    assert_eq!(section.headers, vec!["MERK", "TYPE", "YEAR"]);
    assert_eq!(section.rows.len(), 3);
    assert_eq!(section.rows[1], vec!["Honda", "Jazz|Fit", "2019"]);
    assert_eq!(section.rows[2], vec!["Weekly", "HANDOVER CROSS SELLING", ""]);

    assert_eq!(tables[4].rows[0][..3], ["1", "Name", "A1"]);
}

#[test]
fn test_markdown_progress() {
    let (tx, rx) = sync_channel::<ProgressInfo>(256);
    let options = InspectOptions::default().with_progress(Progress::new().with_channel(tx));
    let (mut inspector, info) = inspected(options);
    render_markdown(&mut inspector, &info, true).unwrap();

    let updates: Vec<ProgressInfo> = rx.try_iter().collect();
    let scans: Vec<(&str, usize, usize)> = updates
        .iter()
        .filter(|p| p.phase == "markdown_scan_rows")
        .map(|p| (p.sheet.as_str(), p.current, p.total))
        .collect();
    // rows up to the last section end row of each sheet with sections
    assert_eq!(scans, vec![("Stock", 6, 6), ("Solo", 1, 1)]);

    let sections: Vec<(String, usize, usize)> = updates
        .into_iter()
        .filter(|p| p.phase == "markdown_sections")
        .map(|p| (p.sheet, p.current, p.total))
        .collect();
    assert_eq!(
        sections,
        vec![
            (String::new(), 0, 2),
            ("Stock".to_string(), 1, 2),
            ("Solo".to_string(), 2, 2),
        ]
    );
}

#[test]
fn test_compact_payload_sample() {
    let (_, info) = inspected(InspectOptions::default());
    let payload = CompactPayload::sample(&info);

    assert_eq!(payload.sheet_details.len(), 3);
    assert_eq!(payload.sections.len(), 2);
    assert_eq!(payload.columns.len(), 8);

    let merk = &payload.columns[0];
    assert_eq!((merk.sheet.as_str(), merk.column_idx, merk.name.as_str()), ("Stock", 1, "MERK"));
    assert_eq!(merk.samples, vec!["Toyota", "Honda", "Weekly", "Suzuki"]);

    let solo_status = &payload.columns[4];
    assert_eq!(solo_status.name, "STATUS");
    assert_eq!(solo_status.data_type, DataType::Empty);
    assert!(solo_status.samples.is_empty());

    let toon = payload.to_toon_string().unwrap();
    assert!(toon.starts_with(
        "sheet_details[3]{name,row_count,column_count,header_count,section_count}:\n  Stock,8,3,3,1\n"
    ));
    assert!(toon.contains(
        "sections[2]{sheet,section_idx,title,header_row,start_row,end_row,row_count,column_count}:\n  Stock,1,Weekly HANDOVER CROSS SELLING,2,3,6,5,3\n  Solo,1,,1,2,1,0,3\n"
    ));
    assert!(toon.contains("  Stock,1,MERK,A2,string,Toyota|Honda|Weekly|Suzuki\n"));
    assert!(toon.contains("  Solo,2,STATUS,B1,empty,\n"));
}

#[test]
fn test_compact_payload_full_values() {
    let (tx, rx) = sync_channel::<ProgressInfo>(256);
    let options = InspectOptions::default().with_progress(Progress::new().with_channel(tx));
    let (mut inspector, info) = inspected(options);
    let payload = CompactPayload::full(&info, &mut inspector).unwrap();

    // header-like and marker rows are left out
    assert_eq!(payload.columns[0].samples, vec!["Toyota", "Honda", "Suzuki"]);
    assert_eq!(payload.columns[1].samples, vec!["Avanza", "Jazz|Fit", "Ertiga"]);
    assert!(payload.columns[3].samples.is_empty());
    assert_eq!(payload.columns[6].samples, vec!["Name", "Ana"]);

    let toon = payload.to_toon_string().unwrap();
    assert!(toon.contains("  Stock,3,YEAR,C2,number,2020|2019|2021\n"));

    let phases: Vec<(String, usize)> = rx
        .try_iter()
        .filter(|p| p.phase == "toon_full_values")
        .map(|p| (p.sheet, p.current))
        .collect();
    assert_eq!(
        phases,
        vec![
            (String::new(), 0),
            ("Stock".to_string(), 1),
            ("Solo".to_string(), 2),
            ("Notes".to_string(), 3),
        ]
    );
}

#[test]
fn test_summary_toon_quotes_commas() {
    let source = MemorySource::new().with_sheet("Q1, Q2", vec![vec!["a", "b"]]);
    let info = Inspector::new(source).inspect().unwrap();
    assert_eq!(
        summary_to_toon(&info).unwrap(),
        "sheets[1]{name,row_count,column_count}:\n  \"Q1, Q2\",1,2\n"
    );
}

#[test]
fn test_json_omits_empty_sections() {
    let (_, info) = inspected(InspectOptions::default());
    let json: serde_json::Value = serde_json::from_str(&render_json(&info).unwrap()).unwrap();
    let details = json["sheet_details"].as_array().unwrap();
    assert_eq!(details[0]["sections"][0]["row_count"], 5);
    assert!(details[2].get("sections").is_none());
    assert_eq!(details[0]["columns"][2]["data_type"], "number");
}
