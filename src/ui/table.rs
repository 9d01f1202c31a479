use tabled::{settings::Style, Table, Tabled};

use crate::record::ContextRecord;

/// Payload characters shown before truncating
const MAX_DATA_WIDTH: usize = 60;

#[derive(Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Context")]
    pub context_id: i32,
    #[tabled(rename = "Type")]
    pub data_type: String,
    #[tabled(rename = "Data")]
    pub data: String,
}

impl From<&ContextRecord> for RecordRow {
    fn from(record: &ContextRecord) -> Self {
        Self {
            id: record.id,
            context_id: record.context_id,
            data_type: record.type_label(),
            data: truncate(&record.data, MAX_DATA_WIDTH),
        }
    }
}

pub struct RecordTable {
    rows: Vec<RecordRow>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_record(&mut self, record: &ContextRecord) {
        self.rows.push(RecordRow::from(record));
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn record_table(records: &[ContextRecord]) -> String {
    let mut table = RecordTable::new();
    for record in records {
        table.add_record(record);
    }
    table.build()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}
