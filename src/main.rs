use std::io::{self, BufRead, Write};

use storeql::{Database, EngineConfig};

/// Runs one query per line from stdin and prints each result as a JSON array.
///
/// An optional first argument names a JSON configuration file.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut db = Database::with_config(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() || query.starts_with("--") {
            continue;
        }

        match db.query(query) {
            Ok(result) => writeln!(out, "{}", serde_json::to_string(&result.rows)?)?,
            Err(err) => eprintln!("error: {err}"),
        }
    }

    Ok(())
}
