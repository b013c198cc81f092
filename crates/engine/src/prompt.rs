//! System prompt construction from the unified table.
//!
//! The prompt gives the model the column set, the total row count, and a
//! bounded preview of rows as JSON lines. Sections use tag delimiters so the
//! model can tell data apart from instructions.

use logseek_core::LogTable;

/// Render the analyst system prompt for a table.
pub fn system_prompt(table: &LogTable, preview_rows: usize) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a data analyst answering questions about a tabular log dataset. \
         Answer concisely from the data below. If the data cannot answer the \
         question, say so instead of guessing.\n",
    );

    prompt.push_str("<schema>\n");
    if table.columns().is_empty() {
        prompt.push_str("(no columns — the dataset is empty)\n");
    } else {
        prompt.push_str(&table.columns().join(", "));
        prompt.push('\n');
    }
    prompt.push_str("</schema>\n");

    prompt.push_str(&format!("<row_count>\n{}\n</row_count>\n", table.row_count()));

    prompt.push_str("<rows>\n");
    for row in table.preview(preview_rows) {
        // A row that fails to serialize would have failed deserialization
        // earlier; fall back to skipping it rather than poisoning the prompt.
        if let Ok(line) = serde_json::to_string(row) {
            prompt.push_str(&line);
            prompt.push('\n');
        }
    }
    prompt.push_str("</rows>\n");

    if table.row_count() > preview_rows {
        prompt.push_str(&format!(
            "({} more rows not shown)\n",
            table.row_count() - preview_rows
        ));
    }

    prompt
}
