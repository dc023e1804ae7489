use ics_core::Tag;

use crate::OutputFormat;

pub(crate) fn cmd_vocab(output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let tags: Vec<serde_json::Value> = Tag::ALL
                .iter()
                .map(|tag| {
                    serde_json::json!({
                        "name": tag.name(),
                        "parent": tag.legal_parent().map(Tag::name),
                        "container": tag.is_container(),
                        "repeatable": tag.is_repeatable(),
                        "keys": tag.keys(),
                        "description": tag.description(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&tags).unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
            );
        }
        OutputFormat::Text => {
            for tag in Tag::ALL {
                let parent = tag.legal_parent().map(Tag::name).unwrap_or("(top level)");
                println!("<<{:<24} in {:<12} {}", tag.name(), parent, tag.description());
                if !tag.keys().is_empty() {
                    println!("    keys: {}", tag.keys().join(", "));
                }
            }
        }
    }
}
