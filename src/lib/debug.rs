use crate::layout::Block;

/// Converts a document flow into pretty-printed JSON for inspection.
///
/// # Example
/// ```rust
/// use invoice2pdf::blocks::footer_block;
/// use invoice2pdf::debug::flow_to_json;
///
/// let json = flow_to_json(&footer_block()).unwrap();
/// assert!(json.contains("\"kind\": \"note\""));
/// ```
pub fn flow_to_json(flow: &[Block]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(flow)
}

/// Saves a document flow to a JSON file.
///
/// # Example
/// ```no_run
/// use invoice2pdf::blocks::title_block;
/// use invoice2pdf::debug::save_flow_to_json_file;
///
/// save_flow_to_json_file(&title_block(), "layout.json").unwrap();
/// ```
pub fn save_flow_to_json_file(flow: &[Block], file_path: &str) -> std::io::Result<()> {
    let json_content = flow_to_json(flow)?;
    std::fs::write(file_path, json_content)?;
    Ok(())
}
