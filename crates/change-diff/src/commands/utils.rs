use crate::utils::config::{DEFAULT_ID_FIELD, DEFAULT_PORT, PORT_ENV_VAR, REQUEST_TYPE, SCHEMA_VERSION};

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Change Diff Request/Response Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Request:");
        println!("  request_type: string        - Must be '{}'", REQUEST_TYPE);
        println!("  id_field: string?           - Identity field (default '{}')", DEFAULT_ID_FIELD);
        println!("  fields_to_compare: string[] - Non-empty list of tracked fields");
        println!("  before: object[]            - Earlier snapshot");
        println!("  after: object[]             - Later snapshot");
        println!();
        println!("Success response:");
        println!("  status: \"ok\"");
        println!("  id_field, fields_to_compare - Echoed from the request");
        println!("  added_items: object[]       - Only in 'after'");
        println!("  removed_items: object[]     - Only in 'before'");
        println!("  modified_items: object[]    - {{<id_field>, before, after, changed_fields}}");
        println!();
        println!("Error response:");
        println!("  status: \"error\"");
        println!("  error: string               - Human-readable message");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Change Diff v{}", env!("CARGO_PKG_VERSION"));
    println!("Protocol Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Deterministic snapshot reconciliation service.");
    println!("Default port {} (override with {}).", DEFAULT_PORT, PORT_ENV_VAR);
}
