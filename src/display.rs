use std::time::Duration;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

use crate::controller::AppState;
use crate::history::TranslationRecord;
use crate::translate::TranslationResult;

const PREVIEW_CHARS: usize = 47;

/// Shorten `text` to one line of at most `PREVIEW_CHARS` characters
pub fn preview(text: &str) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() > PREVIEW_CHARS {
        format!("{}...", line.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        line
    }
}

pub fn history_table(records: &[&TranslationRecord]) -> String {
    if records.is_empty() {
        return "No history records found.".to_string();
    }

    let mut out = format!(
        "{:<15} {:<20} {:<24} {:<50}\n{}\n",
        "Id",
        "Created",
        "File",
        "Source Text",
        "-".repeat(110)
    );
    for record in records {
        out.push_str(&format!(
            "{:<15} {:<20} {:<24} {:<50}\n",
            record.id,
            record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            preview(&record.file_name),
            preview(&record.source_text)
        ));
    }
    out
}

pub fn translations(result: &TranslationResult) -> String {
    let mut out = String::new();
    for (language, text) in result.iter() {
        let text = if text.is_empty() { "(empty)" } else { text };
        out.push_str(&format!("  {} ({}): {}\n", language.code(), language.name(), text));
    }
    out
}

pub fn record(record: &TranslationRecord) -> String {
    let mut out = format!(
        "Record {}\nFile:    {}\nCreated: {}\n",
        record.id,
        record.file_name,
        record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(source) = record.source {
        out.push_str(&format!("Source:  {:?}\n", source));
    }
    out.push_str(&format!("\nText:\n  {}\n\nTranslations:\n", record.source_text));
    out.push_str(&translations(&record.translations));
    out
}

pub fn state(state: &AppState) -> String {
    let mut out = format!("Page: {:?}\n", state.page);
    match &state.selected_file {
        Some(file) => out.push_str(&format!(
            "Selected file: {} ({}, {} KB)\n",
            file.name,
            file.mime_type.as_deref().unwrap_or("unknown"),
            file.size_kb()
        )),
        None => out.push_str("Selected file: none\n"),
    }
    out.push_str(&format!("Text: {}\n", preview(&state.editable_text)));
    if !state.query.is_empty() || state.facet.is_some() {
        out.push_str(&format!(
            "Filter: query='{}' kind={}\n",
            state.query,
            state.facet.map(|f| f.to_string()).unwrap_or_else(|| "any".to_string())
        ));
    }
    if let Some(record) = &state.preview {
        out.push_str(&format!("Preview open: record {}\n", record.id));
    }
    if let Some(alert) = &state.alert {
        out.push_str(&format!("Alert: {}\n", alert));
    }
    out
}

/// Spinner shown while a request is in flight
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
