//! services/api/src/bin/openapi.rs
//!
//! Exports the portal's OpenAPI document. Pass a file path to write it there,
//! or `-` to print it. Defaults to `openapi.json`.

use learning_api_lib::web::rest::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = ApiDoc::openapi();
    let route_count = document.paths.paths.len();
    let json = document.to_pretty_json()?;

    match std::env::args().nth(1).as_deref() {
        Some("-") => writeln!(std::io::stdout().lock(), "{json}")?,
        target => {
            let path = target.unwrap_or("openapi.json");
            std::fs::write(path, json)?;
            println!("✅ Wrote {route_count} routes to {path}");
        }
    }
    Ok(())
}
