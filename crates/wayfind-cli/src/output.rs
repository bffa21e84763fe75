use wayfind_core::{LocationSearchResult, ServiceDescriptor};

const NAME_WIDTH: usize = 32;
const ADDRESS_WIDTH: usize = 48;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

fn fmt_distance(distance_km: Option<f64>) -> String {
    distance_km.map_or_else(|| "-".to_string(), |d| format!("{d:.2} km"))
}

pub(crate) fn print_result(result: &LocationSearchResult) {
    if result.locations.is_empty() {
        println!("no locations for \"{}\"", result.query);
        return;
    }

    let header = format!(
        "{:<5}{:<12}{:<7}{:<15}{:<34}ADDRESS",
        "RANK", "DISTANCE", "SCORE", "SOURCE", "NAME"
    );
    println!("{header}");
    for (rank, location) in result.locations.iter().enumerate() {
        println!(
            "{:<5}{:<12}{:<7.1}{:<15}{:<34}{}",
            rank + 1,
            fmt_distance(location.distance_km),
            location.composite_score,
            location.source,
            truncate(&location.place_name, NAME_WIDTH),
            truncate(&location.address, ADDRESS_WIDTH),
        );
    }

    if result.from_cache {
        println!("(served from cache)");
    }
    if result.used_fallback {
        println!("(no provider matched; showing a low-confidence placeholder)");
    }
    for error in &result.errors {
        eprintln!("warning: {error}");
    }
}

pub(crate) fn print_providers(descriptors: &[ServiceDescriptor]) {
    let header = format!(
        "{:<15}{:<26}{:<10}{:<9}CREDENTIAL",
        "KEY", "NAME", "PRIORITY", "ENABLED"
    );
    println!("{header}");
    for d in descriptors {
        println!(
            "{:<15}{:<26}{:<10}{:<9}{}",
            d.key,
            d.display_name,
            d.priority,
            if d.enabled { "yes" } else { "no" },
            if d.credential_present { "present" } else { "missing" },
        );
    }
}
