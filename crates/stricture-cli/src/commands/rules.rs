use crate::support::print_json;
use serde_json::json;
use stricture_engine::aggregate::severity_for;
use stricture_engine::rules::{default_rules, ids};

pub fn run(json_output: bool) {
    let mut listing: Vec<(String, String)> = default_rules()
        .iter()
        .map(|rule| (rule.id().to_string(), rule.description().to_string()))
        .collect();
    listing.push((
        ids::LIFECYCLE_INCOMPLETE.to_string(),
        "Require multi-step protocol traversals to reach a terminal or abort step".to_string(),
    ));
    listing.sort();

    if json_output {
        let rules: Vec<_> = listing
            .iter()
            .map(|(id, description)| {
                json!({
                    "id": id,
                    "defaultSeverity": severity_for(id).to_string(),
                    "description": description,
                })
            })
            .collect();
        print_json(&json!({ "rules": rules }));
    } else {
        println!("stricture rules");
        for (id, description) in &listing {
            println!("  {id} [{}]", severity_for(id));
            println!("    {description}");
        }
    }
}
