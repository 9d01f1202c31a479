use std::path::Path;

use context_store::config::{self, StoreConfig};
use context_store::output::{emit_success, OutputMode};
use context_store::ui::{self, Icons};
use context_store::{ContextRecord, ContextRecordStore};
use owo_colors::OwoColorize;

fn print_records(records: &[ContextRecord]) {
    if records.is_empty() {
        println!("{} No records found.", Icons::EMPTY);
    } else {
        println!("{}", ui::record_table(records));
        ui::summary_row("Records:", &records.len().to_string());
    }
}

fn scope_label(context_id: i32, data_type: Option<i32>) -> String {
    match data_type {
        Some(t) => format!("context {} / type {}", context_id, t),
        None => format!("context {}", context_id),
    }
}

pub fn run_list(
    store: &ContextRecordStore,
    output_mode: OutputMode,
    context: Option<i32>,
    data_type: Option<i32>,
) -> anyhow::Result<()> {
    let records = match (context, data_type) {
        (Some(c), Some(t)) => store.get_data_for_context_and_type(c, t)?,
        (Some(c), None) => store.get_data_for_context(c)?,
        (None, _) => store.get_all_data()?,
    };

    if output_mode.is_human() {
        match context {
            Some(c) => ui::header(&format!("Records for {}", scope_label(c, data_type))),
            None => ui::header("All records"),
        }
        print_records(&records);
    } else {
        emit_success("list", &records)?;
    }
    Ok(())
}

pub fn run_get(store: &ContextRecordStore, output_mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let record = store.read(id)?;

    if output_mode.is_human() {
        match &record {
            Some(record) => {
                ui::info("ID", &record.id.to_string());
                ui::info("Context", &record.context_id.to_string());
                ui::info("Type", &record.type_label());
                ui::section("Data");
                println!("{}", record.data);
            }
            None => ui::warn(&format!("No record with id {}", id)),
        }
    } else {
        emit_success("get", &record)?;
    }
    Ok(())
}

pub fn run_add(
    store: &ContextRecordStore,
    output_mode: OutputMode,
    context: i32,
    data_type: i32,
    data: &str,
) -> anyhow::Result<()> {
    let record = store.insert(context, data_type, data)?;

    if output_mode.is_human() {
        let (context_id, data_type) = record.scope();
        ui::success(&format!(
            "{} Added record {} to {}",
            Icons::NEW,
            record.id.bold(),
            scope_label(context_id, Some(data_type))
        ));
    } else {
        emit_success("add", &record)?;
    }
    Ok(())
}

pub fn run_remove(
    store: &ContextRecordStore,
    output_mode: OutputMode,
    context: i32,
    data_type: i32,
    data: &str,
) -> anyhow::Result<()> {
    store.delete(context, data_type, data)?;

    if output_mode.is_human() {
        ui::success(&format!(
            "{} Removed matching records from {}",
            Icons::DEL,
            scope_label(context, Some(data_type))
        ));
    } else {
        emit_success(
            "remove",
            serde_json::json!({ "context_id": context, "type": data_type, "data": data }),
        )?;
    }
    Ok(())
}

pub fn run_clear(
    store: &ContextRecordStore,
    output_mode: OutputMode,
    context: i32,
    data_type: Option<i32>,
) -> anyhow::Result<()> {
    match data_type {
        Some(t) => store.delete_all_data_for_context_and_type(context, t)?,
        None => store.delete_all_data_for_context(context)?,
    }

    if output_mode.is_human() {
        ui::success(&format!("{} Cleared {}", Icons::DEL, scope_label(context, data_type)));
    } else {
        emit_success("clear", serde_json::json!({ "context_id": context, "type": data_type }))?;
    }
    Ok(())
}

pub fn run_set(
    store: &ContextRecordStore,
    output_mode: OutputMode,
    context: i32,
    data_type: i32,
    data: &[String],
) -> anyhow::Result<()> {
    let records = store.set_data(context, data_type, data)?;

    if output_mode.is_human() {
        ui::header(&format!("Replaced {}", scope_label(context, Some(data_type))));
        print_records(&records);
    } else {
        emit_success("set", &records)?;
    }
    Ok(())
}

pub fn run_init(
    output_mode: OutputMode,
    config_path: &Path,
    database: &Path,
    force: bool,
) -> anyhow::Result<()> {
    let store_config = StoreConfig {
        database: Some(database.display().to_string()),
        ..StoreConfig::default()
    };
    config::write_config(config_path, &store_config, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", config_path.display()));
        ui::info("Database", &database.display().to_string());
    } else {
        emit_success(
            "init",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "database": database.display().to_string(),
            }),
        )?;
    }
    Ok(())
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        ui::header(&format!("ctxstore {}", env!("CARGO_PKG_VERSION").bold()));
        println!("{}", ui::muted(env!("CARGO_PKG_DESCRIPTION")));
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success("version", data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_label() {
        assert_eq!(scope_label(3, None), "context 3");
        assert_eq!(scope_label(3, Some(4)), "context 3 / type 4");
    }

    #[test]
    fn test_json_commands_run_against_store() {
        let store = ContextRecordStore::open_in_memory().unwrap();
        run_add(&store, OutputMode::Json, 1, 3, "a").unwrap();
        run_set(&store, OutputMode::Json, 1, 4, &["x".to_string(), "y".to_string()]).unwrap();
        run_remove(&store, OutputMode::Json, 1, 4, "x").unwrap();
        run_list(&store, OutputMode::Json, Some(1), None).unwrap();

        let payloads: Vec<String> = store
            .get_data_for_context(1)
            .unwrap()
            .into_iter()
            .map(|r| r.data)
            .collect();
        assert_eq!(payloads, vec!["a", "y"]);

        run_clear(&store, OutputMode::Json, 1, None).unwrap();
        assert!(store.get_all_data().unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_record_is_not_an_error() {
        let store = ContextRecordStore::open_in_memory().unwrap();
        assert!(run_get(&store, OutputMode::Human, 99).is_ok());
        assert!(run_get(&store, OutputMode::Json, 99).is_ok());
    }

    #[test]
    fn test_init_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctxstore.toml");
        run_init(OutputMode::Json, &path, Path::new("data/contexts.db"), false).unwrap();

        let loaded = config::load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("data/contexts.db"));
        assert!(run_init(OutputMode::Json, &path, Path::new("other.db"), false).is_err());
    }
}
